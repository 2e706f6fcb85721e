//! Character trait model: canonical characteristics and derived text.
//!
//! Raw trait text is normalized into a [`Characteristics`] record whose
//! iteration order is fixed by [`TraitCategory`] declaration order, so
//! the derived description is byte-identical for identical input. The
//! `description` and `prompt` fields on [`Character`] are pure
//! derivations; consumers re-derive rather than trust stored copies
//! (see [`crate::story::assemble`]).

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::CoreError;

/// Separator between trait values in a derived description.
pub const DESCRIPTION_DELIMITER: &str = ", ";

// ---------------------------------------------------------------------------
// Trait categories
// ---------------------------------------------------------------------------

/// Trait categories in canonical description order.
///
/// The derive-based `Ord` follows declaration order, which is the order
/// values appear in a derived description.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum TraitCategory {
    Appearance,
    Clothing,
    Personality,
    Background,
    Abilities,
}

impl TraitCategory {
    /// All categories in canonical order.
    pub const ALL: &'static [TraitCategory] = &[
        TraitCategory::Appearance,
        TraitCategory::Clothing,
        TraitCategory::Personality,
        TraitCategory::Background,
        TraitCategory::Abilities,
    ];

    /// Categories that must carry a non-empty value.
    pub const REQUIRED: &'static [TraitCategory] =
        &[TraitCategory::Appearance, TraitCategory::Personality];

    /// Snake_case name used in artifacts and error messages.
    pub fn name(self) -> &'static str {
        match self {
            Self::Appearance => "appearance",
            Self::Clothing => "clothing",
            Self::Personality => "personality",
            Self::Background => "background",
            Self::Abilities => "abilities",
        }
    }
}

// ---------------------------------------------------------------------------
// Characteristics
// ---------------------------------------------------------------------------

/// Mapping from trait category to free-text value.
///
/// Backed by a `BTreeMap` keyed on [`TraitCategory`], so iteration is
/// always in canonical order. Values that are empty after trimming are
/// treated as absent when deriving text.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Characteristics(BTreeMap<TraitCategory, String>);

impl Characteristics {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set a trait value, replacing any previous value for the category.
    pub fn set(&mut self, category: TraitCategory, value: impl Into<String>) -> &mut Self {
        self.0.insert(category, value.into());
        self
    }

    /// Trait value for a category, if present and non-empty after trimming.
    pub fn get(&self, category: TraitCategory) -> Option<&str> {
        self.0
            .get(&category)
            .map(|v| v.trim())
            .filter(|v| !v.is_empty())
    }

    /// Iterate present (non-empty) trait values in canonical order.
    pub fn iter(&self) -> impl Iterator<Item = (TraitCategory, &str)> {
        TraitCategory::ALL
            .iter()
            .filter_map(|&cat| self.get(cat).map(|v| (cat, v)))
    }
}

impl<S: Into<String>> FromIterator<(TraitCategory, S)> for Characteristics {
    fn from_iter<I: IntoIterator<Item = (TraitCategory, S)>>(iter: I) -> Self {
        Self(iter.into_iter().map(|(c, v)| (c, v.into())).collect())
    }
}

// ---------------------------------------------------------------------------
// Prompt style
// ---------------------------------------------------------------------------

/// Fixed style boilerplate wrapped around a character description to
/// form the character's image prompt. Configuration, not per-call state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PromptStyle {
    /// Quality/style text prepended to the description.
    pub preamble: String,
    /// Detail/quality boosters appended after the description.
    pub suffix: String,
    /// Short tag recorded on the character for artifact readers.
    pub tag: String,
}

impl Default for PromptStyle {
    fn default() -> Self {
        Self {
            preamble: "flux schnell style, highly detailed character portrait".to_string(),
            suffix: "fantasy character design, professional digital painting, \
                     intricate details, vibrant colors, cinematic lighting, 8k resolution"
                .to_string(),
            tag: "flux-schnell".to_string(),
        }
    }
}

// ---------------------------------------------------------------------------
// Character
// ---------------------------------------------------------------------------

/// A fully built character. Immutable once created.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Character {
    /// Opaque identifier, unique per process run (UUID v4; collision
    /// probability is negligible at any realistic generation volume).
    pub id: Uuid,
    pub characteristics: Characteristics,
    /// Derived: present trait values joined in canonical order.
    pub description: String,
    /// Derived: `description` wrapped in the style preamble and suffix.
    pub prompt: String,
    /// Style tag from the [`PromptStyle`] used at build time.
    pub style: String,
}

/// Derive the canonical description string for a set of characteristics.
///
/// Present categories appear in [`TraitCategory::ALL`] order, joined by
/// [`DESCRIPTION_DELIMITER`]; empty categories are omitted. Identical
/// input always yields byte-identical output.
pub fn derive_description(characteristics: &Characteristics) -> String {
    characteristics
        .iter()
        .map(|(_, v)| v)
        .collect::<Vec<_>>()
        .join(DESCRIPTION_DELIMITER)
}

/// Derive the character image prompt from a description and style.
pub fn derive_prompt(description: &str, style: &PromptStyle) -> String {
    format!(
        "{}{DESCRIPTION_DELIMITER}{description}{DESCRIPTION_DELIMITER}{}",
        style.preamble, style.suffix
    )
}

/// Build a [`Character`] from raw characteristics.
///
/// Requires non-empty (post-trim) values for every category in
/// [`TraitCategory::REQUIRED`]; fails with [`CoreError::Validation`]
/// otherwise.
pub fn build_character(
    characteristics: Characteristics,
    style: &PromptStyle,
) -> Result<Character, CoreError> {
    for &required in TraitCategory::REQUIRED {
        if characteristics.get(required).is_none() {
            return Err(CoreError::Validation(format!(
                "Trait category '{}' must have a non-empty value",
                required.name()
            )));
        }
    }

    let description = derive_description(&characteristics);
    let prompt = derive_prompt(&description, style);

    Ok(Character {
        id: Uuid::new_v4(),
        characteristics,
        description,
        prompt,
        style: style.tag.clone(),
    })
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
