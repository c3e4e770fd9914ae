pub mod buffer;
pub mod config;
pub mod error;
pub mod grammar;
pub mod io;
pub mod rewrite;
pub mod scan;
pub mod toggle;

// Re-export key types for easier usage
pub use buffer::{BufferError, LineBuffer, Patch, Position, RopeBuffer};
pub use config::{ConfigSource, DocumentMetadata, EffectiveConfig, Frontmatter, SortPolicy};
pub use error::SortError;
pub use rewrite::{Splice, ToggleMode};
pub use scan::{PeerGroup, Subtree};
pub use toggle::{MutationOutcome, handle_toggle, sort_block, sort_document, toggle_in_place};
