//! Stable two-bucket partition of a peer group and the single splice that
//! writes it back.
//!
//! Each peer's subtree moves as one block. Unchecked blocks come first, then
//! checked blocks, each bucket keeping the original peer order, so a group
//! that is already sorted never changes.

use std::ops::Range;

use crate::buffer::{BufferError, LineBuffer, Position};
use crate::error::SortError;
use crate::grammar;
use crate::scan::{PeerGroup, scan_peer_group};

/// How the clicked peer's checkbox is treated while partitioning.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ToggleMode {
    /// The click is about to flip the checkbox: flip it in the rewrite and
    /// bucket the item by its new state.
    #[default]
    Toggle,
    /// Re-sort with every item's current state.
    Keep,
}

/// One peer's subtree lines and the bucket it sorts into.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Block {
    pub lines: Vec<String>,
    pub checked: bool,
}

/// A whole-line replacement computed from one peer group.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Splice {
    /// Lines being replaced.
    pub lines: Range<usize>,
    pub from: Position,
    pub to: Position,
    pub text: String,
}

impl Splice {
    /// Issue the replacement as one `replace_range` call.
    pub fn apply<B: LineBuffer + ?Sized>(&self, buffer: &mut B) -> Result<(), SortError> {
        buffer
            .replace_range(self.from, self.to, &self.text)
            .map_err(SortError::Replace)
    }
}

/// Concatenate unchecked blocks, then checked blocks, preserving order
/// within each bucket.
pub fn partition(blocks: Vec<Block>) -> Vec<String> {
    let (unchecked, checked): (Vec<Block>, Vec<Block>) =
        blocks.into_iter().partition(|block| !block.checked);

    unchecked
        .into_iter()
        .chain(checked)
        .flat_map(|block| block.lines)
        .collect()
}

/// Read each peer's subtree, flipping the clicked peer's checkbox in
/// [`ToggleMode::Toggle`].
pub fn extract_blocks<B: LineBuffer + ?Sized>(
    buffer: &B,
    group: &PeerGroup,
    mode: ToggleMode,
) -> Result<Vec<Block>, SortError> {
    let mut blocks = Vec::with_capacity(group.subtrees.len());

    for subtree in &group.subtrees {
        let mut lines = subtree
            .lines()
            .map(|index| buffer.line(index))
            .collect::<Result<Vec<_>, _>>()?;
        let Some(first) = lines.first_mut() else {
            continue;
        };

        if mode == ToggleMode::Toggle && subtree.peer == group.clicked {
            *first = grammar::toggle_checkbox(first)
                .ok_or(SortError::NotATask { line: subtree.peer })?;
        }
        let checked = grammar::is_checked(first);

        blocks.push(Block { lines, checked });
    }

    Ok(blocks)
}

/// Work out the replacement for a click on `clicked`, or `None` when the
/// rewritten lines equal the current ones.
pub fn plan_rewrite<B: LineBuffer + ?Sized>(
    buffer: &B,
    clicked: usize,
    mode: ToggleMode,
) -> Result<Option<Splice>, SortError> {
    let group = scan_peer_group(buffer, clicked)?;
    let range = group.replace_range();

    let original = range
        .clone()
        .map(|index| buffer.line(index))
        .collect::<Result<Vec<_>, _>>()?;

    // A line at `depth` or deeper after the last subtree would have been
    // scanned as another peer, so the subtrees always fill the range.
    debug_assert_eq!(group.subtrees_end(), group.structure_end);
    let sorted = partition(extract_blocks(buffer, &group, mode)?);

    if sorted == original {
        log::debug!("lines {range:?} already sorted");
        return Ok(None);
    }

    Ok(Some(build_splice(buffer, range, &sorted)?))
}

/// Turn replacement lines into a splice over whole lines.
///
/// A range that ends before the last line is replaced up to column 0 of the
/// following line and the text keeps one trailing newline. A range reaching
/// the last line stops at that line's end, so no blank line is added.
///
/// Lines carry their `\r` when the document uses CRLF. The `\r` is taken off
/// each line and put back as part of the separator, so a line moved to or
/// from the unterminated last line keeps the document's line endings.
pub fn build_splice<B: LineBuffer + ?Sized>(
    buffer: &B,
    range: Range<usize>,
    lines: &[String],
) -> Result<Splice, BufferError> {
    let eol = line_ending(lines);
    let mut text = lines
        .iter()
        .map(|line| line.strip_suffix('\r').unwrap_or(line.as_str()))
        .collect::<Vec<_>>()
        .join(eol);

    let to = if range.end < buffer.line_count() {
        text.push_str(eol);
        Position::line_start(range.end)
    } else {
        let last = range.end.saturating_sub(1);
        let last_line = buffer.line(last)?;
        if last_line.ends_with('\r') {
            text.push('\r');
        }
        Position::new(last, last_line.len())
    };

    Ok(Splice {
        from: Position::line_start(range.start),
        to,
        text,
        lines: range,
    })
}

/// CRLF when any replaced line carries a `\r`, LF otherwise.
fn line_ending(lines: &[String]) -> &'static str {
    if lines.iter().any(|line| line.ends_with('\r')) {
        "\r\n"
    } else {
        "\n"
    }
}
