//! Panel planning: the fixed narrative arc sequenced into panel specs.
//!
//! Planning is deterministic for fixed inputs. Seeds for image
//! generation are drawn later by the orchestrator and are not part of a
//! [`PanelSpec`], so re-planning with identical inputs yields identical
//! specs.

use serde::{Deserialize, Serialize};

use crate::capability::ImageRef;
use crate::character::Character;
use crate::error::CoreError;
use crate::prompt::{synthesize_panel_prompt, PanelRole};

/// Number of panels in a story, fixed by the arc definition.
pub const PANEL_COUNT: usize = PanelRole::ARC.len();

// ---------------------------------------------------------------------------
// Panel spec
// ---------------------------------------------------------------------------

/// One illustrated story beat.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PanelSpec {
    /// Narrative position, 1-based and contiguous.
    pub ordinal: u32,
    pub role: PanelRole,
    /// Image-generation prompt for this panel.
    pub prompt: String,
    /// Populated by the orchestrator; a placeholder on exhausted
    /// retries, never left absent in an assembled story.
    pub image_ref: Option<ImageRef>,
    /// Human caption, decoupled from the generation prompt.
    pub description: String,
}

// ---------------------------------------------------------------------------
// Planning
// ---------------------------------------------------------------------------

/// Plan the ordered panel sequence for a story.
///
/// Iterates [`PanelRole::ARC`] in story order, assigns ordinals
/// `1..=PANEL_COUNT`, and synthesizes one prompt per role.
pub fn plan_panels(
    theme: &str,
    title: &str,
    character: &Character,
) -> Result<Vec<PanelSpec>, CoreError> {
    PanelRole::ARC
        .iter()
        .enumerate()
        .map(|(index, &role)| {
            let ordinal = index as u32 + 1;
            let prompt = synthesize_panel_prompt(role, theme, title, character)?;
            Ok(PanelSpec {
                ordinal,
                role,
                prompt,
                image_ref: None,
                description: format!("Panel {ordinal} of the comic story"),
            })
        })
        .collect()
}

/// Validate that panel ordinals are exactly `1..=len` in order.
///
/// A gap, duplicate, or out-of-order ordinal is a
/// [`CoreError::Consistency`] violation: it should never occur if the
/// planner and orchestrator contracts hold.
pub fn validate_panel_sequence(panels: &[PanelSpec]) -> Result<(), CoreError> {
    if panels.len() != PANEL_COUNT {
        return Err(CoreError::Consistency(format!(
            "Expected {PANEL_COUNT} panels, got {}",
            panels.len()
        )));
    }
    for (index, panel) in panels.iter().enumerate() {
        let expected = index as u32 + 1;
        if panel.ordinal != expected {
            return Err(CoreError::Consistency(format!(
                "Panel at position {index} has ordinal {}, expected {expected}",
                panel.ordinal
            )));
        }
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
