//! Peer-group and subtree boundaries inferred from raw indentation.
//!
//! Given a clicked list item at depth `d`, its peers are the other list items
//! at depth `d` reachable without crossing a shallower item or a non-list
//! line. Deeper list items between peers belong to the subtree of the peer
//! above them.

use std::ops::Range;

use crate::buffer::{BufferError, LineBuffer};
use crate::error::SortError;
use crate::grammar::ListLine;

/// One peer item plus its contiguous deeper-indented descendants.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Subtree {
    /// Line index of the peer item itself.
    pub peer: usize,
    /// Exclusive end of the descendant lines.
    pub end: usize,
}

impl Subtree {
    pub fn lines(&self) -> Range<usize> {
        self.peer..self.end
    }

    pub fn len(&self) -> usize {
        self.end - self.peer
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// The peers of a clicked item, in document order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PeerGroup {
    /// Indent depth shared by every peer.
    pub depth: usize,
    pub clicked: usize,
    pub subtrees: Vec<Subtree>,
    /// Exclusive end of the whole list structure below the first peer.
    pub structure_end: usize,
}

impl PeerGroup {
    pub fn start(&self) -> usize {
        self.subtrees.first().map_or(self.clicked, |s| s.peer)
    }

    /// End of the last peer's subtree.
    pub fn subtrees_end(&self) -> usize {
        self.subtrees.last().map_or(self.clicked + 1, |s| s.end)
    }

    /// Lines the rewrite replaces.
    pub fn replace_range(&self) -> Range<usize> {
        self.start()..self.structure_end
    }

    pub fn peers(&self) -> impl Iterator<Item = usize> + '_ {
        self.subtrees.iter().map(|s| s.peer)
    }
}

/// Depth of line `index` if it is a list item.
fn list_depth<B: LineBuffer + ?Sized>(
    buffer: &B,
    index: usize,
) -> Result<Option<usize>, BufferError> {
    let line = buffer.line(index)?;
    Ok(ListLine::parse(&line).map(|item| item.depth))
}

/// First peer line at `depth`, scanning up from `clicked`.
pub fn peer_block_start<B: LineBuffer + ?Sized>(
    buffer: &B,
    clicked: usize,
    depth: usize,
) -> Result<usize, BufferError> {
    let mut start = clicked;
    for index in (0..clicked).rev() {
        match list_depth(buffer, index)? {
            Some(d) if d == depth => start = index,
            Some(d) if d > depth => continue,
            _ => break,
        }
    }
    Ok(start)
}

/// Last peer line at `depth` (inclusive), scanning down from `clicked`.
pub fn peer_block_end<B: LineBuffer + ?Sized>(
    buffer: &B,
    clicked: usize,
    depth: usize,
) -> Result<usize, BufferError> {
    let mut end = clicked;
    for index in clicked + 1..buffer.line_count() {
        match list_depth(buffer, index)? {
            Some(d) if d == depth => end = index,
            Some(d) if d > depth => continue,
            _ => break,
        }
    }
    Ok(end)
}

/// Exclusive end of the subtree owned by the peer at `peer`: list items
/// strictly deeper than `depth`.
pub fn subtree_end<B: LineBuffer + ?Sized>(
    buffer: &B,
    peer: usize,
    depth: usize,
) -> Result<usize, BufferError> {
    let mut end = peer + 1;
    while end < buffer.line_count() {
        match list_depth(buffer, end)? {
            Some(d) if d > depth => end += 1,
            _ => break,
        }
    }
    Ok(end)
}

/// Exclusive outer bound of the list structure continuing at `from`: list
/// items at `depth` or deeper. Only used for the replacement range, never for
/// subtree ownership.
pub fn structure_end<B: LineBuffer + ?Sized>(
    buffer: &B,
    from: usize,
    depth: usize,
) -> Result<usize, BufferError> {
    let mut end = from;
    while end < buffer.line_count() {
        match list_depth(buffer, end)? {
            Some(d) if d >= depth => end += 1,
            _ => break,
        }
    }
    Ok(end)
}

/// Find the peer group around `clicked` and each peer's subtree.
pub fn scan_peer_group<B: LineBuffer + ?Sized>(
    buffer: &B,
    clicked: usize,
) -> Result<PeerGroup, SortError> {
    let line = buffer.line(clicked)?;
    let depth = ListLine::parse(&line)
        .map(|item| item.depth)
        .ok_or(SortError::NotAListItem { line: clicked })?;

    let start = peer_block_start(buffer, clicked, depth)?;
    let last = peer_block_end(buffer, clicked, depth)?;

    // Every line in [start, last] is a list item at `depth` or deeper, so
    // walking subtree ends lands on each peer in turn.
    let mut subtrees = Vec::new();
    let mut peer = start;
    while peer <= last {
        let end = subtree_end(buffer, peer, depth)?;
        subtrees.push(Subtree { peer, end });
        peer = end;
    }

    // Unreachable while the walk above lands on every peer; guards the
    // scanners drifting apart.
    if !subtrees.iter().any(|s| s.peer == clicked) {
        return Err(SortError::Discontiguous { start, clicked });
    }

    let structure_end = structure_end(buffer, peer, depth)?;
    log::debug!(
        "peer group for line {clicked}: depth {depth}, {} peers, lines {start}..{structure_end}",
        subtrees.len()
    );

    Ok(PeerGroup {
        depth,
        clicked,
        subtrees,
        structure_end,
    })
}
