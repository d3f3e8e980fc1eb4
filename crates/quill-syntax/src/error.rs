//! Error handling types and utilities for the Quill toolchain.
//!
//! Every stage of the pipeline reports failures through the same [`Error`]
//! structure: a stage tag ([`ErrorKind`]), a human-readable message, and an
//! optional 1-based source location. Errors are surfaced immediately — no
//! stage attempts recovery — and the driver renders each kind as a single
//! labeled line (`LexError: …`, `ParseError: …`, `RuntimeError: …`).
//!
//! # Examples
//!
//! ```rust
//! use quill_syntax::error::{Error, ErrorKind, Result, parse_error_at};
//!
//! let located = Error::with_span(ErrorKind::Parse, "Expected ';'", 10, 5);
//! assert_eq!(format!("{}", located), "Expected ';' at 10:5");
//!
//! fn check(balanced: bool) -> Result<()> {
//!     if balanced {
//!         Ok(())
//!     } else {
//!         parse_error_at(1, 1, "Unbalanced parentheses")
//!     }
//! }
//! assert!(check(false).is_err());
//! ```

use std::fmt;

/// Which stage of the pipeline raised the error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Lex,
    Parse,
    Runtime,
}

impl ErrorKind {
    /// The label the driver prefixes to rendered diagnostics.
    pub fn label(self) -> &'static str {
        match self {
            ErrorKind::Lex => "LexError",
            ErrorKind::Parse => "ParseError",
            ErrorKind::Runtime => "RuntimeError",
        }
    }
}

/// An error raised while lexing, parsing or evaluating Quill source.
#[derive(Debug, Clone)]
pub struct Error {
    /// The pipeline stage that raised the error
    pub kind: ErrorKind,
    /// Human-readable error message
    pub msg: String,
    /// Optional line number in the source (1-based)
    pub line: Option<usize>,
    /// Optional column number in the source (1-based)
    pub col: Option<usize>,
}

impl Error {
    /// Creates an error without source location information.
    pub fn new(kind: ErrorKind, msg: impl Into<String>) -> Self {
        Self {
            kind,
            msg: msg.into(),
            line: None,
            col: None,
        }
    }

    /// Creates an error pointing at a source location.
    pub fn with_span(kind: ErrorKind, msg: impl Into<String>, line: usize, col: usize) -> Self {
        Self {
            kind,
            msg: msg.into(),
            line: Some(line),
            col: Some(col),
        }
    }

    /// Attaches a location if the error does not already carry one.
    pub fn at(mut self, line: usize, col: usize) -> Self {
        if self.line.is_none() {
            self.line = Some(line);
            self.col = Some(col);
        }
        self
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let (Some(l), Some(c)) = (self.line, self.col) {
            write!(f, "{} at {}:{}", self.msg, l, c)
        } else {
            write!(f, "{}", self.msg)
        }
    }
}

impl std::error::Error for Error {}

impl From<String> for Error {
    fn from(s: String) -> Self {
        Error::new(ErrorKind::Runtime, s)
    }
}

impl From<&str> for Error {
    fn from(s: &str) -> Self {
        Error::new(ErrorKind::Runtime, s)
    }
}

/// A specialized `Result` type for Quill operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Convenience constructor for a located lexing error result.
pub fn lex_error_at<T>(line: usize, col: usize, msg: impl Into<String>) -> Result<T> {
    Err(Error::with_span(ErrorKind::Lex, msg, line, col))
}

/// Convenience constructor for a located parse error result.
pub fn parse_error_at<T>(line: usize, col: usize, msg: impl Into<String>) -> Result<T> {
    Err(Error::with_span(ErrorKind::Parse, msg, line, col))
}

/// Convenience constructor for an unlocated runtime error result.
pub fn runtime_error<T>(msg: impl Into<String>) -> Result<T> {
    Err(Error::new(ErrorKind::Runtime, msg))
}

/// Convenience constructor for a located runtime error result.
pub fn runtime_error_at<T>(line: usize, col: usize, msg: impl Into<String>) -> Result<T> {
    Err(Error::with_span(ErrorKind::Runtime, msg, line, col))
}
