//! Archive extraction through an external tool

use std::path::Path;
use tokio::process::Command;
use tracing::{debug, info};

use crate::error::{IngestError, IngestResult};

/// Unpack `archive` into `out_dir` with `<program> x <archive> -o<out_dir> -y`
pub async fn extract_archive(program: &str, archive: &Path, out_dir: &Path) -> IngestResult<()> {
    if !archive.is_file() {
        return Err(IngestError::Extraction {
            archive: archive.to_path_buf(),
            exit_code: None,
            output: "archive not found".to_string(),
        });
    }

    tokio::fs::create_dir_all(out_dir)
        .await
        .map_err(IngestError::io(out_dir))?;

    info!(
        archive = %archive.display(),
        out_dir = %out_dir.display(),
        "Extracting archive"
    );

    let output = Command::new(program)
        .arg("x")
        .arg(archive)
        .arg(format!("-o{}", out_dir.display()))
        .arg("-y")
        .output()
        .await
        .map_err(|e| IngestError::Extraction {
            archive: archive.to_path_buf(),
            exit_code: None,
            output: format!("failed to run {program}: {e}"),
        })?;

    let mut combined = String::from_utf8_lossy(&output.stdout).into_owned();
    combined.push_str(&String::from_utf8_lossy(&output.stderr));

    if !output.status.success() {
        return Err(IngestError::Extraction {
            archive: archive.to_path_buf(),
            exit_code: output.status.code(),
            output: combined,
        });
    }

    debug!(output = %combined.trim(), "Extractor finished");
    Ok(())
}

#[cfg(all(test, unix))]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_missing_archive() {
        let dir = TempDir::new().unwrap();
        let err = extract_archive("true", &dir.path().join("site.7z"), dir.path())
            .await
            .unwrap_err();
        assert!(matches!(err, IngestError::Extraction { exit_code: None, .. }));
    }

    #[tokio::test]
    async fn test_successful_tool_creates_output_dir() {
        let dir = TempDir::new().unwrap();
        let archive = dir.path().join("site.7z");
        std::fs::write(&archive, b"7z").unwrap();
        let out_dir = dir.path().join("site");

        extract_archive("true", &archive, &out_dir).await.unwrap();
        assert!(out_dir.is_dir());
    }

    #[tokio::test]
    async fn test_failing_tool_reports_exit_code() {
        let dir = TempDir::new().unwrap();
        let archive = dir.path().join("site.7z");
        std::fs::write(&archive, b"7z").unwrap();

        let err = extract_archive("false", &archive, &dir.path().join("site"))
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            IngestError::Extraction {
                exit_code: Some(1),
                ..
            }
        ));
    }

    #[tokio::test]
    async fn test_missing_tool() {
        let dir = TempDir::new().unwrap();
        let archive = dir.path().join("site.7z");
        std::fs::write(&archive, b"7z").unwrap();

        let err = extract_archive("sedump-no-such-extractor", &archive, dir.path())
            .await
            .unwrap_err();
        assert!(err.to_string().contains("failed to run"));
    }
}
