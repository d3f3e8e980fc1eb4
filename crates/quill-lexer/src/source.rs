//! Positioned byte sources feeding the lexer.
//!
//! A [`Source`] presents the input as a stream of bytes with one byte of
//! lookahead (`peek`) and one byte of guaranteed pushback (`unget`). The
//! position reported by [`Source::pos`] is always that of the *next* byte to
//! be read: a `\n` consumed by `get` increments the line and resets the
//! column to 1, every other byte increments the column.

use std::fs::File;
use std::io::{self, BufReader, Read};
use std::path::Path;

use quill_syntax::token::Pos;

/// A byte stream with single-byte lookahead and pushback.
pub trait Source {
    /// Returns the next byte without consuming it, or `None` at end of input.
    fn peek(&mut self) -> Option<u8>;
    /// Consumes and returns the next byte, advancing the position.
    fn get(&mut self) -> Option<u8>;
    /// Reverses the most recent `get`. At most one byte of pushback is
    /// guaranteed; a no-op at end of input or before the first `get`.
    fn unget(&mut self);
    /// Position of the next byte to be read.
    fn pos(&self) -> Pos;
}

/// An in-memory string source.
pub struct StringSource {
    bytes: Vec<u8>,
    idx: usize,
    line: usize,
    col: usize,
    last: Option<u8>,
}

impl StringSource {
    pub fn new(input: &str) -> Self {
        Self {
            bytes: input.as_bytes().to_vec(),
            idx: 0,
            line: 1,
            col: 1,
            last: None,
        }
    }
}

impl Source for StringSource {
    fn peek(&mut self) -> Option<u8> {
        self.bytes.get(self.idx).copied()
    }

    fn get(&mut self) -> Option<u8> {
        let b = self.bytes.get(self.idx).copied()?;
        self.idx += 1;
        if b == b'\n' {
            self.line += 1;
            self.col = 1;
        } else {
            self.col += 1;
        }
        self.last = Some(b);
        Some(b)
    }

    fn unget(&mut self) {
        if let Some(b) = self.last.take() {
            self.idx -= 1;
            if b == b'\n' {
                self.line -= 1;
            } else {
                self.col -= 1;
            }
        }
    }

    fn pos(&self) -> Pos {
        Pos::new(self.line, self.col)
    }
}

/// A streaming file source backed by a buffered reader.
///
/// The underlying reader does not support pushback, so a one-byte lookahead
/// buffer backs both `peek` and `unget`; the observable contract stays
/// single-byte.
pub struct FileSource {
    reader: BufReader<File>,
    lookahead: Option<u8>,
    line: usize,
    col: usize,
    last: Option<u8>,
}

impl FileSource {
    pub fn open(path: impl AsRef<Path>) -> io::Result<Self> {
        Ok(Self {
            reader: BufReader::new(File::open(path)?),
            lookahead: None,
            line: 1,
            col: 1,
            last: None,
        })
    }

    fn fill(&mut self) {
        if self.lookahead.is_none() {
            let mut buf = [0u8; 1];
            if let Ok(1) = self.reader.read(&mut buf) {
                self.lookahead = Some(buf[0]);
            }
        }
    }
}

impl Source for FileSource {
    fn peek(&mut self) -> Option<u8> {
        self.fill();
        self.lookahead
    }

    fn get(&mut self) -> Option<u8> {
        self.fill();
        let b = self.lookahead.take()?;
        if b == b'\n' {
            self.line += 1;
            self.col = 1;
        } else {
            self.col += 1;
        }
        self.last = Some(b);
        Some(b)
    }

    fn unget(&mut self) {
        if let Some(b) = self.last.take() {
            debug_assert!(self.lookahead.is_none());
            self.lookahead = Some(b);
            if b == b'\n' {
                self.line -= 1;
            } else {
                self.col -= 1;
            }
        }
    }

    fn pos(&self) -> Pos {
        Pos::new(self.line, self.col)
    }
}
