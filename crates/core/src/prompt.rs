//! Panel prompt synthesis: a deterministic grammar from narrative role
//! to image-generation prompt.
//!
//! Each [`PanelRole`] maps to a fixed template interpolating the theme,
//! title, and the character's canonical description (never the raw
//! character prompt, which already carries style boilerplate). The
//! establishing shot must not reference the character; every later role
//! must. A template violating that contract is an authoring error and
//! is surfaced, not silently patched.

use serde::{Deserialize, Serialize};

use crate::character::Character;
use crate::error::CoreError;

// ---------------------------------------------------------------------------
// Arc roles
// ---------------------------------------------------------------------------

/// Narrative function of a panel within the fixed five-stage arc.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum PanelRole {
    Establishing,
    CharacterIntro,
    RisingAction,
    Climax,
    Resolution,
}

impl PanelRole {
    /// The fixed arc in story order. Panel count is this length.
    pub const ARC: &'static [PanelRole] = &[
        PanelRole::Establishing,
        PanelRole::CharacterIntro,
        PanelRole::RisingAction,
        PanelRole::Climax,
        PanelRole::Resolution,
    ];

    /// Kebab-case name used in artifacts.
    pub fn name(self) -> &'static str {
        match self {
            Self::Establishing => "establishing",
            Self::CharacterIntro => "character-intro",
            Self::RisingAction => "rising-action",
            Self::Climax => "climax",
            Self::Resolution => "resolution",
        }
    }

    /// Whether prompts for this role must reference the character.
    pub fn references_character(self) -> bool {
        !matches!(self, Self::Establishing)
    }
}

// ---------------------------------------------------------------------------
// Synthesis
// ---------------------------------------------------------------------------

/// Synthesize the image-generation prompt for one panel.
///
/// Pure function of its inputs: no hidden state, no network access.
/// Returns [`CoreError::Internal`] if the expanded template violates the
/// role-content policy (establishing mentions the character, or a
/// character role omits the description).
pub fn synthesize_panel_prompt(
    role: PanelRole,
    theme: &str,
    title: &str,
    character: &Character,
) -> Result<String, CoreError> {
    let description = character.description.as_str();

    let prompt = match role {
        PanelRole::Establishing => format!(
            "Wide establishing shot of the world where \"{title}\" takes place, \
             {theme} landscape, cinematic view"
        ),
        PanelRole::CharacterIntro => format!(
            "Close-up portrait of the main character: {description}, \
             introduction scene of a {theme} story"
        ),
        PanelRole::RisingAction => format!(
            "Action scene: {description} faces the first trials of \"{title}\", \
             {theme} unfolding, dramatic moment, high tension"
        ),
        PanelRole::Climax => format!(
            "Climactic scene: {description} confronts the heart of the {theme} \
             in \"{title}\", intense emotions, dramatic lighting"
        ),
        PanelRole::Resolution => format!(
            "Resolution scene: {description} finds peace as the {theme} \
             concludes, peaceful atmosphere, character growth"
        ),
    };

    if role.references_character() != prompt.contains(description) {
        return Err(CoreError::Internal(format!(
            "Template for role '{}' violates the character-reference policy",
            role.name()
        )));
    }

    Ok(prompt)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
