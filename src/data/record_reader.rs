// ============================================================
// Layer 4 — Record Cursor
// ============================================================
// Reads a class .ndjson file as a forward-only stream of lines.
// The cursor tracks the 0-based index of the next line so that
// a part can skip straight to its offset and every error can
// report the 1-based line it happened on.
//
// Running out of lines is never treated as an empty record:
// both `skip` and `next_record` fail with ShortClassFile.
//
// Records end at end of file or at the first whitespace-only
// line, whichever comes first. QuickDraw exports often carry a
// trailing newline or two; counting those as records would let
// a short file pass the up-front length check and then fail
// half way through a run with a JSON error. `count_records` and
// the cursor share `is_blank`, so both see the same length.

use std::{
    fs::File,
    io::{BufRead, BufReader},
    path::{Path, PathBuf},
};

use crate::data::stroke_parser::parse_line;
use crate::domain::error::PrepareError;
use crate::domain::sketch::StrokeDeltas;

pub struct RecordCursor<R: BufRead> {
    reader: R,
    path:   PathBuf,
    line:   usize,
    buf:    String,
    ended:  bool,
}

impl RecordCursor<BufReader<File>> {
    pub fn open(path: &Path) -> Result<Self, PrepareError> {
        let file = File::open(path).map_err(|source| PrepareError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Ok(Self::from_reader(BufReader::new(file), path))
    }
}

impl<R: BufRead> RecordCursor<R> {
    pub fn from_reader(reader: R, path: impl Into<PathBuf>) -> Self {
        Self {
            reader,
            path: path.into(),
            line: 0,
            buf: String::new(),
            ended: false,
        }
    }

    /// Advance past `n` lines without parsing them.
    pub fn skip(&mut self, n: usize) -> Result<(), PrepareError> {
        let target = self.line + n;
        while self.line < target {
            if !self.read_raw()? {
                return Err(self.short(target));
            }
        }
        Ok(())
    }

    /// Read and parse the next line.
    pub fn next_record(&mut self) -> Result<(StrokeDeltas, String), PrepareError> {
        if !self.read_raw()? {
            return Err(self.short(self.line + 1));
        }
        parse_line(&self.buf).map_err(|e| PrepareError::MalformedRecord {
            path:   self.path.clone(),
            line:   self.line,
            reason: e.to_string(),
        })
    }

    /// Reads one line into `buf`; false once the records end.
    fn read_raw(&mut self) -> Result<bool, PrepareError> {
        if self.ended {
            return Ok(false);
        }
        self.buf.clear();
        let n = self
            .reader
            .read_line(&mut self.buf)
            .map_err(|source| PrepareError::Io {
                path: self.path.clone(),
                source,
            })?;
        if n == 0 || is_blank(self.buf.as_bytes()) {
            self.ended = true;
            return Ok(false);
        }
        self.line += 1;
        Ok(true)
    }

    fn short(&self, required: usize) -> PrepareError {
        PrepareError::ShortClassFile {
            path:      self.path.clone(),
            required,
            available: self.line,
        }
    }
}

fn is_blank(line: &[u8]) -> bool {
    line.iter().all(u8::is_ascii_whitespace)
}

/// Number of records in a file, counted up to `limit`.
///
/// A final record without a trailing newline still counts.
/// Counting stops at the first blank line, and as soon as
/// `limit` is reached: the caller only needs to know whether a
/// file is long enough, and class files run to hundreds of MB.
pub fn count_records(path: &Path, limit: usize) -> Result<usize, PrepareError> {
    let io_err = |source: std::io::Error| PrepareError::Io {
        path: path.to_path_buf(),
        source,
    };
    let reader = BufReader::new(File::open(path).map_err(io_err)?);
    let mut count = 0usize;
    for chunk in reader.split(b'\n') {
        if count == limit {
            break;
        }
        if is_blank(&chunk.map_err(io_err)?) {
            break;
        }
        count += 1;
    }
    Ok(count)
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;
    use std::{fs, io::{Cursor, Write}};

    fn record(x: u32) -> String {
        format!(r#"{{"word":"w{x}","drawing":[[[0,{x}],[0,1]]]}}"#)
    }

    fn cursor(lines: usize) -> RecordCursor<Cursor<Vec<u8>>> {
        let text: String = (0..lines).map(|i| record(i as u32 + 1) + "\n").collect();
        RecordCursor::from_reader(Cursor::new(text.into_bytes()), "mem.ndjson")
    }

    #[test]
    fn test_skip_then_read() {
        let mut c = cursor(5);
        c.skip(3).unwrap();
        let (_, word) = c.next_record().unwrap();
        assert_eq!(word, "w4");
    }

    #[test]
    fn test_read_past_end_is_short_file() {
        let mut c = cursor(2);
        c.next_record().unwrap();
        c.next_record().unwrap();
        match c.next_record() {
            Err(PrepareError::ShortClassFile { required, available, .. }) => {
                assert_eq!(required, 3);
                assert_eq!(available, 2);
            }
            other => panic!("expected ShortClassFile, got {other:?}"),
        }
    }

    #[test]
    fn test_skip_past_end_is_short_file() {
        let mut c = cursor(2);
        assert!(matches!(
            c.skip(5),
            Err(PrepareError::ShortClassFile { required: 5, available: 2, .. })
        ));
    }

    #[test]
    fn test_malformed_line_reports_line_number() {
        let text = format!("{}\nnot json\n", record(1));
        let mut c = RecordCursor::from_reader(Cursor::new(text.into_bytes()), "bad.ndjson");
        c.next_record().unwrap();
        match c.next_record() {
            Err(PrepareError::MalformedRecord { line, .. }) => assert_eq!(line, 2),
            other => panic!("expected MalformedRecord, got {other:?}"),
        }
    }

    #[test]
    fn test_count_records() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("a.ndjson");
        let mut f = File::create(&path).unwrap();
        write!(f, "{}\n{}\n{}", record(1), record(2), record(3)).unwrap();
        drop(f);
        assert_eq!(count_records(&path, 10).unwrap(), 3);
    }

    #[test]
    fn test_count_records_stops_at_limit() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("a.ndjson");
        let text: String = (0..50).map(|i| record(i) + "\n").collect();
        fs::write(&path, text).unwrap();
        assert_eq!(count_records(&path, 20).unwrap(), 20);
        assert_eq!(count_records(&path, 100).unwrap(), 50);
    }

    #[test]
    fn test_trailing_blank_line_is_not_a_record() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("a.ndjson");
        let text = format!("{}\n{}\n{}\n\n  \n", record(1), record(2), record(3));
        fs::write(&path, &text).unwrap();
        assert_eq!(count_records(&path, 10).unwrap(), 3);

        let mut c = RecordCursor::from_reader(Cursor::new(text.into_bytes()), "a.ndjson");
        c.skip(3).unwrap();
        assert!(matches!(
            c.next_record(),
            Err(PrepareError::ShortClassFile { required: 4, available: 3, .. })
        ));
    }

    #[test]
    fn test_blank_line_ends_records() {
        let text = format!("{}\n\n{}\n", record(1), record(2));
        let mut c = RecordCursor::from_reader(Cursor::new(text.into_bytes()), "gap.ndjson");
        c.next_record().unwrap();
        assert!(matches!(c.next_record(), Err(PrepareError::ShortClassFile { .. })));
        // stays ended; the record after the gap is never reached
        assert!(matches!(c.next_record(), Err(PrepareError::ShortClassFile { .. })));
    }
}
