//! Whether a click sorts: global default, then a document override, then the
//! nearest in-document marker above the clicked list block.
//!
//! Resolution happens fresh for every click against the current buffer, so
//! nothing here is cached.

mod frontmatter;

pub use frontmatter::Frontmatter;

use crate::buffer::{BufferError, LineBuffer};
use crate::grammar;

/// Marker line enabling sorting for the list block below it.
pub const ENABLE_MARKER: &str = "%% sort-checklist: true %%";
/// Marker line disabling sorting for the list block below it.
pub const DISABLE_MARKER: &str = "%% sort-checklist: false %%";
/// Front-matter key holding the per-document override.
pub const FRONTMATTER_KEY: &str = "sort-checklist";

/// Which layer decided the effective setting.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigSource {
    Global,
    Frontmatter,
    ListMarker,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EffectiveConfig {
    pub enabled: bool,
    pub source: ConfigSource,
}

/// Immutable snapshot of the host's persisted settings for one click.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SortPolicy {
    pub global_default: bool,
}

impl Default for SortPolicy {
    fn default() -> Self {
        Self {
            global_default: true,
        }
    }
}

impl SortPolicy {
    pub fn new(global_default: bool) -> Self {
        Self { global_default }
    }
}

/// Supplies the per-document override, e.g. from front matter.
pub trait DocumentMetadata {
    /// `None` when the document carries no well-typed override.
    fn sort_override(&self) -> Option<bool>;
}

impl DocumentMetadata for Option<bool> {
    fn sort_override(&self) -> Option<bool> {
        *self
    }
}

/// The marker state carried by a line, if any. Enable wins when a line
/// somehow contains both tokens.
pub fn marker_state(line: &str) -> Option<bool> {
    if line.contains(ENABLE_MARKER) {
        Some(true)
    } else if line.contains(DISABLE_MARKER) {
        Some(false)
    } else {
        None
    }
}

/// Nearest marker above `clicked` that still applies to its list block.
///
/// The scan walks up through list items of any depth and gives up at the
/// first non-list line that is not itself a marker.
pub fn find_list_marker<B: LineBuffer + ?Sized>(
    buffer: &B,
    clicked: usize,
) -> Result<Option<bool>, BufferError> {
    for index in (0..clicked).rev() {
        let line = buffer.line(index)?;
        if let Some(state) = marker_state(&line) {
            return Ok(Some(state));
        }
        if !grammar::is_list_item(&line) {
            break;
        }
    }
    Ok(None)
}

/// Compose the three layers for a click on `clicked`.
pub fn resolve<B: LineBuffer + ?Sized>(
    policy: SortPolicy,
    document_override: Option<bool>,
    buffer: &B,
    clicked: usize,
) -> Result<EffectiveConfig, BufferError> {
    let mut config = EffectiveConfig {
        enabled: policy.global_default,
        source: ConfigSource::Global,
    };

    if let Some(enabled) = document_override {
        config = EffectiveConfig {
            enabled,
            source: ConfigSource::Frontmatter,
        };
    }

    if let Some(enabled) = find_list_marker(buffer, clicked)? {
        config = EffectiveConfig {
            enabled,
            source: ConfigSource::ListMarker,
        };
    }

    log::debug!(
        "line {clicked}: sorting {} ({:?})",
        if config.enabled { "enabled" } else { "disabled" },
        config.source
    );
    Ok(config)
}
