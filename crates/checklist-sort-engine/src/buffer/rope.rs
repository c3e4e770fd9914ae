use std::borrow::Cow;
use std::ops::Range;

use xi_rope::delta::Builder;
use xi_rope::{LinesMetric, Rope};

use super::{BufferError, LineBuffer, Position};

/// Result of applying a replacement
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Patch {
    /// Byte range of the inserted text in the new document.
    pub changed: Range<usize>,
    pub version: u64,
}

/// A [`LineBuffer`] backed by an `xi_rope::Rope`.
///
/// The rope holds the document bytes verbatim, so saving after a sort writes
/// back exactly what was read apart from the replaced range. Each successful
/// write bumps `version`.
#[derive(Clone)]
pub struct RopeBuffer {
    rope: Rope,
    version: u64,
}

impl RopeBuffer {
    /// Create a buffer from raw bytes, which must be valid UTF-8
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, BufferError> {
        let text = std::str::from_utf8(bytes)?;
        Ok(Self::from_text(text))
    }

    pub fn from_text(text: &str) -> Self {
        Self {
            rope: Rope::from(text),
            version: 0,
        }
    }

    /// Get the current text content
    pub fn text(&self) -> String {
        self.rope.to_string()
    }

    /// Get the document's content as raw bytes (exact round-trip)
    pub fn to_bytes(&self) -> Vec<u8> {
        self.text().into_bytes()
    }

    /// Lines of the document, without their newlines.
    pub fn lines(&self) -> Vec<String> {
        (0..self.line_count())
            .map(|index| self.line_cow(index).into_owned())
            .collect()
    }

    /// Get the current version
    pub fn version(&self) -> u64 {
        self.version
    }

    /// Replace the text between two positions and report what changed.
    ///
    /// Both positions are validated before the rope is touched.
    pub fn replace(
        &mut self,
        from: Position,
        to: Position,
        text: &str,
    ) -> Result<Patch, BufferError> {
        let range = self.byte_range(from, to)?;
        let start = range.start;

        let mut builder = Builder::new(self.rope.len());
        builder.replace(range, Rope::from(text));
        let delta = builder.build();
        self.rope = delta.apply(&self.rope);
        self.version += 1;

        Ok(Patch {
            changed: start..start + text.len(),
            version: self.version,
        })
    }

    fn check_line(&self, line: usize) -> Result<(), BufferError> {
        let line_count = self.line_count();
        if line >= line_count {
            return Err(BufferError::LineOutOfRange { line, line_count });
        }
        Ok(())
    }

    /// Line text for an index already known to be in range.
    fn line_cow(&self, index: usize) -> Cow<'_, str> {
        let start = self.rope.offset_of_line(index);
        let end = self.rope.offset_of_line(index + 1);
        match self.rope.slice_to_cow(start..end) {
            Cow::Borrowed(s) => Cow::Borrowed(s.strip_suffix('\n').unwrap_or(s)),
            Cow::Owned(mut s) => {
                if s.ends_with('\n') {
                    s.pop();
                }
                Cow::Owned(s)
            }
        }
    }

    fn offset_of(&self, pos: Position) -> Result<usize, BufferError> {
        self.check_line(pos.line)?;
        let line = self.line_cow(pos.line);
        if pos.column > line.len() {
            return Err(BufferError::ColumnOutOfRange {
                line: pos.line,
                column: pos.column,
                len: line.len(),
            });
        }
        if !line.is_char_boundary(pos.column) {
            return Err(BufferError::NotCharBoundary {
                line: pos.line,
                column: pos.column,
            });
        }
        Ok(self.rope.offset_of_line(pos.line) + pos.column)
    }

    fn byte_range(&self, from: Position, to: Position) -> Result<Range<usize>, BufferError> {
        if to < from {
            return Err(BufferError::InvertedRange { from, to });
        }
        Ok(self.offset_of(from)?..self.offset_of(to)?)
    }
}

impl From<&str> for RopeBuffer {
    fn from(text: &str) -> Self {
        Self::from_text(text)
    }
}

impl LineBuffer for RopeBuffer {
    fn line_count(&self) -> usize {
        self.rope.measure::<LinesMetric>() + 1
    }

    fn line(&self, index: usize) -> Result<String, BufferError> {
        self.check_line(index)?;
        Ok(self.line_cow(index).into_owned())
    }

    fn range_text(&self, from: Position, to: Position) -> Result<String, BufferError> {
        let range = self.byte_range(from, to)?;
        Ok(self.rope.slice_to_cow(range).into_owned())
    }

    fn replace_range(
        &mut self,
        from: Position,
        to: Position,
        text: &str,
    ) -> Result<(), BufferError> {
        self.replace(from, to, text).map(|_| ())
    }
}
