//! Line-oriented access-log input.
//!
//! Accepts gzip-compressed or plain-text logs from a path or any reader.
//! The gzip magic bytes decide which decoder to use.

use std::fs::File;
use std::io::{self, BufRead, BufReader, Read};
use std::path::Path;

use flate2::bufread::MultiGzDecoder;

use crate::error::LogError;

const GZIP_MAGIC: [u8; 2] = [0x1f, 0x8b];

/// A buffered, decompressing line source over an access log.
pub struct LogSource {
    reader: Box<dyn BufRead + Send>,
    compressed: bool,
}

impl std::fmt::Debug for LogSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LogSource")
            .field("compressed", &self.compressed)
            .finish_non_exhaustive()
    }
}

impl LogSource {
    /// Opens a log file.
    ///
    /// # Errors
    ///
    /// Returns `LogError::InputNotFound` when the path does not exist.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, LogError> {
        let path = path.as_ref();
        let file = File::open(path).map_err(|err| match err.kind() {
            io::ErrorKind::NotFound => LogError::InputNotFound(path.to_path_buf()),
            _ => LogError::Io(err),
        })?;
        let source = Self::from_reader(file)?;
        tracing::debug!(path = %path.display(), compressed = source.compressed, "Opened access log");
        Ok(source)
    }

    /// Wraps an arbitrary reader, sniffing for gzip compression.
    pub fn from_reader<R>(reader: R) -> Result<Self, LogError>
    where
        R: Read + Send + 'static,
    {
        let mut buffered = BufReader::new(reader);
        let compressed = {
            let head = buffered.fill_buf()?;
            head.len() >= GZIP_MAGIC.len() && head[..GZIP_MAGIC.len()] == GZIP_MAGIC
        };

        let reader: Box<dyn BufRead + Send> = if compressed {
            Box::new(BufReader::new(MultiGzDecoder::new(buffered)))
        } else {
            Box::new(buffered)
        };

        Ok(Self { reader, compressed })
    }

    /// Whether the underlying stream is gzip-compressed.
    pub fn is_compressed(&self) -> bool {
        self.compressed
    }

    /// Yields `(line_number, line)` pairs in arrival order, numbered from 1.
    pub fn lines(self) -> impl Iterator<Item = (usize, io::Result<String>)> {
        self.reader
            .lines()
            .enumerate()
            .map(|(idx, line)| (idx + 1, line))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use flate2::write::GzEncoder;
    use flate2::Compression;
    use std::io::{Cursor, Write};

    fn gzip(text: &str) -> Vec<u8> {
        let mut encoder = GzEncoder::new(Vec::new(), Compression::default());
        encoder.write_all(text.as_bytes()).unwrap();
        encoder.finish().unwrap()
    }

    #[test]
    fn test_plain_text_source() {
        let source = LogSource::from_reader(Cursor::new(b"first\nsecond\n".to_vec())).unwrap();
        assert!(!source.is_compressed());
        let lines: Vec<_> = source.lines().map(|(n, l)| (n, l.unwrap())).collect();
        assert_eq!(
            lines,
            vec![(1, "first".to_string()), (2, "second".to_string())]
        );
    }

    #[test]
    fn test_gzip_source() {
        let source = LogSource::from_reader(Cursor::new(gzip("a\r\nb\n"))).unwrap();
        assert!(source.is_compressed());
        let lines: Vec<String> = source.lines().map(|(_, l)| l.unwrap()).collect();
        assert_eq!(lines, vec!["a", "b"]);
    }

    #[test]
    fn test_empty_source_yields_nothing() {
        let source = LogSource::from_reader(Cursor::new(Vec::new())).unwrap();
        assert_eq!(source.lines().count(), 0);
    }

    #[test]
    fn test_missing_file() {
        let err = LogSource::open("/definitely/not/here.log.gz").unwrap_err();
        assert!(matches!(err, LogError::InputNotFound(_)));
    }
}
