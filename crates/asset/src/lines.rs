//! Line reader tolerant of non-UTF-8 bytes (Latin-1 comments and names from exporters).

use std::borrow::Cow;
use std::io::BufRead;

use crate::error::{ParseError, ParseResult, SourceKind};

/// Yields `(1-based line number, text)`; invalid UTF-8 is replaced with U+FFFD.
pub(crate) struct LossyLines<R> {
    reader: R,
    origin: SourceKind,
    line: usize,
    buf: Vec<u8>,
}

impl<R: BufRead> LossyLines<R> {
    pub(crate) fn new(reader: R, origin: SourceKind) -> Self {
        Self {
            reader,
            origin,
            line: 0,
            buf: Vec::new(),
        }
    }
}

impl<R: BufRead> Iterator for LossyLines<R> {
    type Item = ParseResult<(usize, String)>;

    fn next(&mut self) -> Option<Self::Item> {
        self.buf.clear();
        self.line += 1;
        match self.reader.read_until(b'\n', &mut self.buf) {
            Ok(0) => None,
            Ok(_) => {
                let text = match String::from_utf8_lossy(&self.buf) {
                    Cow::Borrowed(s) => s.to_owned(),
                    Cow::Owned(s) => {
                        log::debug!("{} line {}: invalid UTF-8 replaced", self.origin, self.line);
                        s
                    }
                };
                Some(Ok((self.line, text)))
            }
            Err(source) => Some(Err(ParseError::Io {
                origin: self.origin,
                line: self.line,
                source,
            })),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn numbers_lines_and_replaces_bad_bytes() {
        let src: &[u8] = b"# Caf\xE9\r\nv 1 2 3\nlast";
        let lines: Vec<_> = LossyLines::new(Cursor::new(src), SourceKind::Geometry)
            .collect::<ParseResult<_>>()
            .unwrap();
        assert_eq!(lines.len(), 3);
        assert_eq!(lines[0].0, 1);
        assert_eq!(lines[0].1.trim(), "# Caf\u{FFFD}");
        assert_eq!(lines[1], (2, "v 1 2 3\n".to_owned()));
        assert_eq!(lines[2], (3, "last".to_owned()));
    }

    #[test]
    fn empty_input_has_no_lines() {
        let src: &[u8] = b"";
        assert_eq!(LossyLines::new(Cursor::new(src), SourceKind::Material).count(), 0);
    }
}
