//! Streaming record decoder
//!
//! Dump files are a single root element holding one `<row .../>` element per
//! record, with every field carried as an attribute. [`RecordReader`] pulls
//! those elements one at a time so memory use stays bounded by the largest
//! single record rather than the file size.
//!
//! The same reader works over a blocking [`BufRead`] as an [`Iterator`] and
//! over a tokio [`AsyncBufRead`] through [`RecordReader::next_async`].

use quick_xml::events::{attributes::AttrError, BytesStart, Event};
use quick_xml::encoding::Decoder;
use quick_xml::Reader;
use std::collections::HashMap;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::iter::FusedIterator;
use std::path::Path;
use thiserror::Error;
use tokio::io::AsyncBufRead;

/// Local name of the per-record element
pub const RECORD_ELEMENT: &[u8] = b"row";

const READ_BUFFER_CAPACITY: usize = 1 << 20;

/// Malformed input encountered while decoding
#[derive(Error, Debug)]
pub enum DecodeError {
    #[error("XML syntax error at byte {offset}: {source}")]
    Syntax {
        offset: u64,
        #[source]
        source: quick_xml::Error,
    },

    #[error("malformed attribute at byte {offset}: {source}")]
    Attribute {
        offset: u64,
        #[source]
        source: AttrError,
    },

    #[error("unexpected end of input at byte {offset}: {open} element(s) left unclosed")]
    UnexpectedEof { offset: u64, open: u64 },
}

impl DecodeError {
    /// Byte offset in the input where decoding failed
    pub fn offset(&self) -> u64 {
        match self {
            DecodeError::Syntax { offset, .. }
            | DecodeError::Attribute { offset, .. }
            | DecodeError::UnexpectedEof { offset, .. } => *offset,
        }
    }
}

/// Attribute name to unescaped value mapping for one record
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Attributes {
    values: HashMap<String, String>,
}

impl Attributes {
    pub fn get(&self, name: &str) -> Option<&str> {
        self.values.get(name).map(String::as_str)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.values.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

impl<K, V> FromIterator<(K, V)> for Attributes
where
    K: Into<String>,
    V: Into<String>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            values: iter.into_iter().map(|(k, v)| (k.into(), v.into())).collect(),
        }
    }
}

type ProgressFn = Box<dyn FnMut(u64) + Send>;

/// Outcome of a single reader event
enum Step {
    Record(Attributes),
    Skip,
    End,
}

/// Pull-based reader over the record elements of a dump file
///
/// Yields records in document order. Elements other than `row` are skipped
/// at any depth. Input that ends while elements are still open is an error.
/// After the first error the reader is exhausted.
pub struct RecordReader<R> {
    reader: Reader<R>,
    buf: Vec<u8>,
    depth: u64,
    records: u64,
    progress_interval: u64,
    on_progress: Option<ProgressFn>,
    finished: bool,
}

impl RecordReader<BufReader<File>> {
    /// Open a dump file for blocking reads
    pub fn open(path: &Path) -> std::io::Result<Self> {
        let file = File::open(path)?;
        Ok(Self::new(BufReader::with_capacity(READ_BUFFER_CAPACITY, file)))
    }
}

impl RecordReader<tokio::io::BufReader<tokio::fs::File>> {
    /// Open a dump file for reads on the tokio runtime
    pub async fn open_async(path: &Path) -> std::io::Result<Self> {
        let file = tokio::fs::File::open(path).await?;
        Ok(Self::new(tokio::io::BufReader::with_capacity(
            READ_BUFFER_CAPACITY,
            file,
        )))
    }
}

impl<R> RecordReader<R> {
    pub fn new(inner: R) -> Self {
        Self {
            reader: Reader::from_reader(inner),
            buf: Vec::with_capacity(4096),
            depth: 0,
            records: 0,
            progress_interval: 0,
            on_progress: None,
            finished: false,
        }
    }

    /// Invoke `callback` with the running count every `interval` records
    ///
    /// An interval of zero disables progress reporting.
    pub fn with_progress<F>(mut self, interval: u64, callback: F) -> Self
    where
        F: FnMut(u64) + Send + 'static,
    {
        self.progress_interval = interval;
        self.on_progress = Some(Box::new(callback));
        self
    }

    /// Number of records decoded so far
    pub fn records_read(&self) -> u64 {
        self.records
    }

    fn step(&mut self, event: quick_xml::Result<Event<'_>>) -> Result<Step, DecodeError> {
        let event = event.map_err(|source| DecodeError::Syntax {
            offset: self.reader.error_position() as u64,
            source,
        })?;

        match event {
            Event::Start(element) => {
                self.depth += 1;
                if element.local_name().as_ref() == RECORD_ELEMENT {
                    self.record(&element).map(Step::Record)
                } else {
                    Ok(Step::Skip)
                }
            }
            Event::Empty(element) if element.local_name().as_ref() == RECORD_ELEMENT => {
                self.record(&element).map(Step::Record)
            }
            Event::End(_) => {
                self.depth = self.depth.saturating_sub(1);
                Ok(Step::Skip)
            }
            Event::Eof if self.depth > 0 => Err(DecodeError::UnexpectedEof {
                offset: self.reader.buffer_position() as u64,
                open: self.depth,
            }),
            Event::Eof => Ok(Step::End),
            _ => Ok(Step::Skip),
        }
    }

    fn record(&mut self, element: &BytesStart<'_>) -> Result<Attributes, DecodeError> {
        let offset = self.reader.buffer_position() as u64;
        let attributes = collect_attributes(element, self.reader.decoder(), offset)?;
        self.records += 1;
        self.report_progress();
        Ok(attributes)
    }

    fn report_progress(&mut self) {
        if self.progress_interval == 0 || self.records % self.progress_interval != 0 {
            return;
        }
        if let Some(callback) = self.on_progress.as_mut() {
            callback(self.records);
        }
    }

    fn finish(
        &mut self,
        result: Result<Option<Attributes>, DecodeError>,
    ) -> Option<Result<Attributes, DecodeError>> {
        match result {
            Ok(Some(attributes)) => Some(Ok(attributes)),
            Ok(None) => {
                self.finished = true;
                None
            }
            Err(e) => {
                self.finished = true;
                Some(Err(e))
            }
        }
    }
}

impl<R: BufRead> RecordReader<R> {
    fn next_record(&mut self) -> Result<Option<Attributes>, DecodeError> {
        loop {
            let mut buf = std::mem::take(&mut self.buf);
            buf.clear();
            let event = self.reader.read_event_into(&mut buf);
            let step = self.step(event);
            self.buf = buf;

            match step? {
                Step::Record(attributes) => return Ok(Some(attributes)),
                Step::End => return Ok(None),
                Step::Skip => {}
            }
        }
    }
}

impl<R: AsyncBufRead + Unpin> RecordReader<R> {
    /// Decode the next record without blocking the runtime
    ///
    /// Returns `None` once the input is exhausted or after an error.
    pub async fn next_async(&mut self) -> Option<Result<Attributes, DecodeError>> {
        if self.finished {
            return None;
        }
        let result = self.next_record_async().await;
        self.finish(result)
    }

    async fn next_record_async(&mut self) -> Result<Option<Attributes>, DecodeError> {
        loop {
            let mut buf = std::mem::take(&mut self.buf);
            buf.clear();
            let event = self.reader.read_event_into_async(&mut buf).await;
            let step = self.step(event);
            self.buf = buf;

            match step? {
                Step::Record(attributes) => return Ok(Some(attributes)),
                Step::End => return Ok(None),
                Step::Skip => {}
            }
        }
    }
}

fn collect_attributes(
    element: &BytesStart<'_>,
    decoder: Decoder,
    offset: u64,
) -> Result<Attributes, DecodeError> {
    let mut values = HashMap::new();

    for attribute in element.attributes() {
        let attribute = attribute.map_err(|source| DecodeError::Attribute { offset, source })?;
        let name = String::from_utf8_lossy(attribute.key.local_name().as_ref()).into_owned();
        let value = attribute
            .decode_and_unescape_value(decoder)
            .map_err(|source| DecodeError::Syntax { offset, source })?
            .into_owned();
        values.insert(name, value);
    }

    Ok(Attributes { values })
}

impl<R: BufRead> Iterator for RecordReader<R> {
    type Item = Result<Attributes, DecodeError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.finished {
            return None;
        }
        let result = self.next_record();
        self.finish(result)
    }
}

impl<R: BufRead> FusedIterator for RecordReader<R> {}
