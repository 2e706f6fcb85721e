//! Durable artifact storage for generated comic stories.
//!
//! A story persists as two files in one directory: `story.json` (the
//! structured artifact) and `index.html` (a human-viewable rendering
//! derived purely from it). Publication is atomic: both files land or
//! neither does.

mod error;
pub mod render;
mod store;

pub use error::StorageError;
pub use store::{ArtifactStore, LocalArtifactStore, StoryLocation};
