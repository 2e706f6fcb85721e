//! External capability seams: image generation and fallback policy.
//!
//! The core is agnostic to which provider implements [`ImageCapability`];
//! the only network-facing dependency lives behind this trait. The
//! [`FallbackPolicy`] supplies deterministic stand-in references when a
//! panel exhausts its retries, so partial provider failure never takes
//! down a whole story run.

use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Image references and sizes
// ---------------------------------------------------------------------------

/// Opaque reference to a generated (or placeholder) image: a URL, a
/// file path, or a `placeholder://` URI.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ImageRef(String);

impl ImageRef {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Whether this reference is a fallback placeholder rather than a
    /// provider-generated image.
    pub fn is_placeholder(&self) -> bool {
        self.0.starts_with("placeholder://")
    }
}

impl std::fmt::Display for ImageRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Requested output dimensions in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageSize {
    pub width: u32,
    pub height: u32,
}

impl ImageSize {
    /// Default panel size (portrait-oriented comic frame).
    pub const PANEL: ImageSize = ImageSize {
        width: 768,
        height: 1024,
    };

    /// Character portrait size.
    pub const PORTRAIT: ImageSize = ImageSize {
        width: 512,
        height: 768,
    };
}

impl Default for ImageSize {
    fn default() -> Self {
        Self::PANEL
    }
}

// ---------------------------------------------------------------------------
// Capability errors
// ---------------------------------------------------------------------------

/// Failures from an image-generation capability call. All variants are
/// transient from the pipeline's point of view: they are retried per
/// policy and then downgraded to a placeholder, never propagated as a
/// story-level failure.
#[derive(Debug, thiserror::Error)]
pub enum CapabilityError {
    /// The transport to the provider failed (network, DNS, TLS).
    #[error("Transport error: {0}")]
    Transport(String),

    /// The provider returned an error status.
    #[error("Provider error ({status}): {body}")]
    Api {
        /// HTTP status code or provider-equivalent.
        status: u16,
        /// Raw response body for debugging.
        body: String,
    },

    /// The call did not complete within the configured window.
    #[error("Generation timed out after {0:?}")]
    Timeout(Duration),
}

// ---------------------------------------------------------------------------
// Capability trait
// ---------------------------------------------------------------------------

/// An external image-generation capability.
#[async_trait]
pub trait ImageCapability: Send + Sync {
    /// Generate one image for `prompt` with a reproducible `seed`.
    async fn generate(
        &self,
        prompt: &str,
        seed: u64,
        size: ImageSize,
    ) -> Result<ImageRef, CapabilityError>;
}

// ---------------------------------------------------------------------------
// Fallback policy
// ---------------------------------------------------------------------------

/// Supplies a stand-in image reference when generation for a panel has
/// exhausted its retries.
pub trait FallbackPolicy: Send + Sync {
    /// Deterministic placeholder for the panel with this ordinal.
    /// Ordinal 0 is reserved for the character portrait.
    fn placeholder(&self, ordinal: u32) -> ImageRef;
}

/// Default policy: `placeholder://panel/{ordinal}` URIs labeled with the
/// panel ordinal, so a degraded story remains self-describing.
#[derive(Debug, Clone, Default)]
pub struct UriFallback;

impl FallbackPolicy for UriFallback {
    fn placeholder(&self, ordinal: u32) -> ImageRef {
        if ordinal == 0 {
            ImageRef::new("placeholder://portrait")
        } else {
            ImageRef::new(format!("placeholder://panel/{ordinal}"))
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
