//! Event feed readers.
//!
//! The aggregation pass consumes events one record at a time through the
//! [`EventSource`] seam, so the same engine runs over a JSON-lines file, an
//! in-memory slice in tests, or one shard of a partitioned feed.

use jetspec_core::{Error, EventRecord, Result};
use std::fs::File;
use std::io::{self, BufRead, BufReader};
use std::path::Path;

/// Ordered source of event records.
pub trait EventSource {
    /// Next event, or `None` at end of feed.
    fn next_event(&mut self) -> Result<Option<EventRecord>>;
}

/// Event feed stored as one JSON object per line.
pub struct JsonLinesSource<R> {
    reader: R,
    line_no: u64,
    buf: String,
}

impl JsonLinesSource<BufReader<File>> {
    /// Open a JSON-lines event feed from a file.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let file = File::open(path.as_ref())?;
        Ok(Self::new(BufReader::new(file)))
    }
}

impl<R: BufRead> JsonLinesSource<R> {
    /// Wrap any buffered reader producing one JSON event per line.
    pub fn new(reader: R) -> Self {
        Self {
            reader,
            line_no: 0,
            buf: String::new(),
        }
    }
}

impl<R: BufRead> EventSource for JsonLinesSource<R> {
    fn next_event(&mut self) -> Result<Option<EventRecord>> {
        loop {
            self.buf.clear();
            let n = self.reader.read_line(&mut self.buf)?;
            if n == 0 {
                return Ok(None);
            }
            self.line_no += 1;

            let line = self.buf.trim();
            if line.is_empty() {
                continue;
            }

            // A malformed feed is fatal; no partial aggregate is worth
            // emitting over a corrupt input.
            return match serde_json::from_str(line) {
                Ok(event) => Ok(Some(event)),
                Err(e) => Err(Error::Io(io::Error::new(
                    io::ErrorKind::InvalidData,
                    format!("event feed line {}: {e}", self.line_no),
                ))),
            };
        }
    }
}

/// In-memory event source, for tests and shard replay.
pub struct VecSource {
    events: std::vec::IntoIter<EventRecord>,
}

impl VecSource {
    /// Create a source over the given events.
    pub fn new(events: Vec<EventRecord>) -> Self {
        Self {
            events: events.into_iter(),
        }
    }
}

impl EventSource for VecSource {
    fn next_event(&mut self) -> Result<Option<EventRecord>> {
        Ok(self.events.next())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use jetspec_core::JetKinematics;
    use std::io::Cursor;

    fn make_event(run: u32, section: u32) -> EventRecord {
        EventRecord {
            run,
            section,
            event: 1,
            trigger_names: vec!["jt30".to_string()],
            fired: vec![true],
            prescales: vec![1],
            jets: vec![JetKinematics::new(45.0, 0.2, 1.0, 46.0)],
            gen_jets: Vec::new(),
            weight: 1.0,
        }
    }

    #[test]
    fn test_json_lines_roundtrip() {
        let mut text = String::new();
        for ev in [make_event(1, 1), make_event(1, 2)] {
            text.push_str(&serde_json::to_string(&ev).unwrap());
            text.push('\n');
        }

        let mut source = JsonLinesSource::new(Cursor::new(text));
        assert_eq!(source.next_event().unwrap().unwrap().section, 1);
        assert_eq!(source.next_event().unwrap().unwrap().section, 2);
        assert!(source.next_event().unwrap().is_none());
    }

    #[test]
    fn test_blank_lines_skipped() {
        let text = format!(
            "\n{}\n\n",
            serde_json::to_string(&make_event(1, 1)).unwrap()
        );
        let mut source = JsonLinesSource::new(Cursor::new(text));
        assert!(source.next_event().unwrap().is_some());
        assert!(source.next_event().unwrap().is_none());
    }

    #[test]
    fn test_malformed_line_is_io_error() {
        let mut source = JsonLinesSource::new(Cursor::new("not json\n"));
        let err = source.next_event().unwrap_err();
        assert!(matches!(err, Error::Io(_)));
        assert!(err.to_string().contains("line 1"));
    }

    #[test]
    fn test_vec_source_drains() {
        let mut source = VecSource::new(vec![make_event(1, 1)]);
        assert!(source.next_event().unwrap().is_some());
        assert!(source.next_event().unwrap().is_none());
        assert!(source.next_event().unwrap().is_none());
    }
}
