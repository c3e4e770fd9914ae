//! Line-addressed access to the host's document.
//!
//! The sorting core only ever talks to a [`LineBuffer`]: it reads lines, and
//! issues at most one [`LineBuffer::replace_range`] per click. Lines are the
//! text between `\n` separators, so `"a\nb\n"` has three lines and the last
//! one is empty.

mod rope;

pub use rope::{Patch, RopeBuffer};

/// A `(line, column)` coordinate; the column is a byte offset into the line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Position {
    pub line: usize,
    pub column: usize,
}

impl Position {
    pub fn new(line: usize, column: usize) -> Self {
        Self { line, column }
    }

    /// Column 0 of `line`.
    pub fn line_start(line: usize) -> Self {
        Self { line, column: 0 }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum BufferError {
    #[error("line {line} is out of range (document has {line_count} lines)")]
    LineOutOfRange { line: usize, line_count: usize },

    #[error("column {column} is out of range on line {line} (line length {len})")]
    ColumnOutOfRange {
        line: usize,
        column: usize,
        len: usize,
    },

    #[error("column {column} on line {line} is not on a character boundary")]
    NotCharBoundary { line: usize, column: usize },

    #[error("range end {to:?} precedes range start {from:?}")]
    InvertedRange { from: Position, to: Position },

    #[error("buffer is read-only")]
    ReadOnly,

    #[error("document is not valid UTF-8: {0}")]
    InvalidUtf8(#[from] std::str::Utf8Error),
}

/// The document buffer owned by the host application.
///
/// Implementations must make `replace_range` atomic: either the whole range
/// is replaced or the buffer is left untouched and an error is returned.
pub trait LineBuffer {
    /// Number of lines, always at least 1 (an empty document has one empty line).
    fn line_count(&self) -> usize;

    /// Text of line `index` without its trailing `\n`.
    fn line(&self, index: usize) -> Result<String, BufferError>;

    /// Text between two positions, newlines included.
    fn range_text(&self, from: Position, to: Position) -> Result<String, BufferError>;

    /// Replace the text between two positions with `text`.
    fn replace_range(&mut self, from: Position, to: Position, text: &str)
    -> Result<(), BufferError>;
}
