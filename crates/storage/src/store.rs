//! Artifact store trait and the local filesystem implementation.
//!
//! [`LocalArtifactStore`] stages both story files in a hidden scratch
//! directory, then renames the directory into place. The rename is the
//! publication point: a reader never observes a story directory holding
//! only one of the two files.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use vignette_core::story::ComicStory;

use crate::error::StorageError;
use crate::render::render_html;

/// Structured artifact file name within a story directory.
pub const ARTIFACT_FILE: &str = "story.json";
/// Viewable rendering file name within a story directory.
pub const RENDERING_FILE: &str = "index.html";

/// Location handles for a persisted story.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoryLocation {
    /// Published story directory (`comic_{timestamp_millis}`).
    pub directory: PathBuf,
    /// Path to the structured JSON artifact.
    pub artifact: PathBuf,
    /// Path to the human-viewable HTML rendering.
    pub rendering: PathBuf,
}

/// Durable storage target for generated stories.
#[async_trait]
pub trait ArtifactStore: Send + Sync {
    /// Atomically publish the structured artifact and its rendering.
    ///
    /// On failure, no partially-written story directory is left behind.
    async fn persist(&self, story: &ComicStory) -> Result<StoryLocation, StorageError>;
}

/// Filesystem-backed store writing under a base directory.
#[derive(Debug, Clone)]
pub struct LocalArtifactStore {
    base_dir: PathBuf,
}

impl LocalArtifactStore {
    pub fn new(base_dir: impl Into<PathBuf>) -> Self {
        Self {
            base_dir: base_dir.into(),
        }
    }

    pub fn base_dir(&self) -> &Path {
        &self.base_dir
    }

    /// Write both story files into the staging directory.
    async fn write_staged(
        staging: &Path,
        story: &ComicStory,
    ) -> Result<(), StorageError> {
        let json = serde_json::to_vec_pretty(story)?;
        tokio::fs::write(staging.join(ARTIFACT_FILE), json).await?;
        tokio::fs::write(staging.join(RENDERING_FILE), render_html(story)).await?;
        Ok(())
    }
}

#[async_trait]
impl ArtifactStore for LocalArtifactStore {
    async fn persist(&self, story: &ComicStory) -> Result<StoryLocation, StorageError> {
        tokio::fs::create_dir_all(&self.base_dir).await?;

        let directory = self
            .base_dir
            .join(format!("comic_{}", story.created_at.timestamp_millis()));
        let staging = self
            .base_dir
            .join(format!(".staging-{}", uuid::Uuid::new_v4()));

        tokio::fs::create_dir(&staging).await?;

        if let Err(e) = Self::write_staged(&staging, story).await {
            let _ = tokio::fs::remove_dir_all(&staging).await;
            return Err(e);
        }

        if let Err(e) = tokio::fs::rename(&staging, &directory).await {
            let _ = tokio::fs::remove_dir_all(&staging).await;
            return Err(e.into());
        }

        tracing::info!(directory = %directory.display(), "Story persisted");

        Ok(StoryLocation {
            artifact: directory.join(ARTIFACT_FILE),
            rendering: directory.join(RENDERING_FILE),
            directory,
        })
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
