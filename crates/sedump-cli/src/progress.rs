//! Terminal progress reporting for long imports

use indicatif::{ProgressBar, ProgressStyle};
use std::time::Duration;

use sedump_ingest::{EntityKind, ProgressSink};

/// Create a spinner for indeterminate operations
pub fn create_spinner(message: &str) -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    let style = ProgressStyle::default_spinner()
        .template("{spinner:.green} [{elapsed_precise}] {msg}")
        .unwrap_or_else(|_| ProgressStyle::default_spinner());
    pb.set_style(style);
    pb.set_message(message.to_string());
    pb.enable_steady_tick(Duration::from_millis(100));
    pb
}

/// Progress sink that updates a spinner with running record counts
pub struct SpinnerProgress {
    bar: ProgressBar,
}

impl SpinnerProgress {
    pub fn new() -> Self {
        Self {
            bar: create_spinner("Starting import"),
        }
    }

    pub fn finish(&self, message: &str) {
        self.bar.finish_with_message(message.to_string());
    }
}

impl Default for SpinnerProgress {
    fn default() -> Self {
        Self::new()
    }
}

impl ProgressSink for SpinnerProgress {
    fn records_loaded(&self, entity: EntityKind, records: u64) {
        self.bar
            .set_message(format!("{entity}: {} records", format_count(records)));
    }
}

/// Format a count with thousands separators
pub fn format_count(n: u64) -> String {
    let digits = n.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(c);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_count() {
        assert_eq!(format_count(0), "0");
        assert_eq!(format_count(999), "999");
        assert_eq!(format_count(10_000), "10,000");
        assert_eq!(format_count(1_234_567), "1,234,567");
    }

    #[test]
    fn test_spinner_sink_updates_message() {
        let sink = SpinnerProgress {
            bar: ProgressBar::hidden(),
        };
        sink.records_loaded(EntityKind::Votes, 20_000);
        assert_eq!(sink.bar.message(), "Votes: 20,000 records");
    }
}
