use crate::buffer::BufferError;

/// Reasons a click produced no rewrite.
///
/// None of these reach the host as a failure: the toggle pipeline logs them
/// and reports [`crate::toggle::MutationOutcome::Aborted`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SortError {
    #[error("line {line} is not a list item")]
    NotAListItem { line: usize },

    #[error("list item on line {line} has no checkbox to toggle")]
    NotATask { line: usize },

    #[error("failed to read buffer: {0}")]
    Buffer(#[from] BufferError),

    #[error("buffer rejected the replacement: {0}")]
    Replace(#[source] BufferError),

    /// Internal guard: a consistent scan never produces it.
    #[error("peer subtrees starting at line {start} do not reach clicked line {clicked}")]
    Discontiguous { start: usize, clicked: usize },
}
