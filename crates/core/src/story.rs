//! Story assembly: merge planned panels and generated images into one
//! terminal artifact.
//!
//! Assembly re-derives the character's description and prompt instead
//! of trusting the stored copies, and asserts the panel-sequence
//! invariants. Violations are [`CoreError::Consistency`] errors: they
//! indicate a bug upstream, not a recoverable runtime condition.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::capability::ImageRef;
use crate::character::{derive_description, derive_prompt, Character, PromptStyle};
use crate::error::CoreError;
use crate::panel::{validate_panel_sequence, PanelSpec};

/// A complete comic story. Created once per generation run and never
/// mutated afterwards.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComicStory {
    pub title: String,
    pub theme: String,
    pub main_character: Character,
    /// Standalone character portrait, if the run generated one.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub portrait: Option<ImageRef>,
    /// Panels in narrative order, every one carrying an image reference
    /// (possibly a placeholder).
    pub panels: Vec<PanelSpec>,
    pub created_at: DateTime<Utc>,
}

/// Assemble a [`ComicStory`] from its parts.
///
/// Checks, in order:
/// - the character's `description`/`prompt` match re-derivation from its
///   characteristics (stale copies must not drift into the artifact);
/// - panel ordinals are contiguous `1..=N` with no gaps or duplicates;
/// - every panel has an image reference.
pub fn assemble(
    title: impl Into<String>,
    theme: impl Into<String>,
    character: Character,
    portrait: Option<ImageRef>,
    panels: Vec<PanelSpec>,
    style: &PromptStyle,
) -> Result<ComicStory, CoreError> {
    let expected_description = derive_description(&character.characteristics);
    if character.description != expected_description {
        return Err(CoreError::Consistency(
            "Character description has drifted from its characteristics".to_string(),
        ));
    }
    if character.prompt != derive_prompt(&expected_description, style) {
        return Err(CoreError::Consistency(
            "Character prompt has drifted from its description".to_string(),
        ));
    }

    validate_panel_sequence(&panels)?;

    for panel in &panels {
        if panel.image_ref.is_none() {
            return Err(CoreError::Consistency(format!(
                "Panel {} has no image reference",
                panel.ordinal
            )));
        }
    }

    Ok(ComicStory {
        title: title.into(),
        theme: theme.into(),
        main_character: character,
        portrait,
        panels,
        created_at: Utc::now(),
    })
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
