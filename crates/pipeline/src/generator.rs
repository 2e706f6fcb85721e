//! End-to-end generation facade.

use std::sync::Arc;

use tokio_util::sync::CancellationToken;
use vignette_core::capability::{FallbackPolicy, ImageCapability, UriFallback};
use vignette_core::character::{build_character, Characteristics, PromptStyle};
use vignette_core::error::CoreError;
use vignette_core::panel::plan_panels;
use vignette_core::story::{assemble, ComicStory};
use vignette_storage::{ArtifactStore, StoryLocation};

use crate::error::PipelineError;
use crate::orchestrator::{generate_images, generate_portrait, GenerationConfig};

// ---------------------------------------------------------------------------
// Request / response
// ---------------------------------------------------------------------------

/// Everything one generation run needs from the caller.
#[derive(Debug, Clone, serde::Deserialize)]
pub struct GenerateRequest {
    pub title: String,
    pub theme: String,
    pub characteristics: Characteristics,
    /// Prompt style applied to the character; defaults to the house style.
    #[serde(default)]
    pub style: PromptStyle,
}

/// Outcome of a completed run: the assembled story plus where it lives.
#[derive(Debug)]
pub struct GenerateResponse {
    pub story: ComicStory,
    pub location: StoryLocation,
}

// ---------------------------------------------------------------------------
// Generator
// ---------------------------------------------------------------------------

/// Drives one comic story run end to end.
///
/// Holds the capability, fallback policy, and artifact store behind
/// trait objects so callers (worker binary, tests) can swap providers
/// without touching the pipeline.
pub struct ComicGenerator {
    capability: Arc<dyn ImageCapability>,
    fallback: Arc<dyn FallbackPolicy>,
    store: Arc<dyn ArtifactStore>,
    config: GenerationConfig,
}

impl ComicGenerator {
    pub fn new(capability: Arc<dyn ImageCapability>, store: Arc<dyn ArtifactStore>) -> Self {
        Self {
            capability,
            fallback: Arc::new(UriFallback),
            store,
            config: GenerationConfig::default(),
        }
    }

    pub fn with_config(mut self, config: GenerationConfig) -> Self {
        self.config = config;
        self
    }

    pub fn with_fallback(mut self, fallback: Arc<dyn FallbackPolicy>) -> Self {
        self.fallback = fallback;
        self
    }

    /// Run the full pipeline: character, plan, images, assembly,
    /// persistence.
    ///
    /// Fails fast on invalid input and on cancellation; image failures
    /// never abort the run (affected panels carry placeholders). On any
    /// error nothing is persisted.
    pub async fn generate(
        &self,
        request: GenerateRequest,
        cancel: &CancellationToken,
    ) -> Result<GenerateResponse, PipelineError> {
        let title = request.title.trim();
        let theme = request.theme.trim();
        if title.is_empty() {
            return Err(CoreError::Validation("Story title must not be empty".into()).into());
        }
        if theme.is_empty() {
            return Err(CoreError::Validation("Story theme must not be empty".into()).into());
        }

        let character = build_character(request.characteristics, &request.style)?;
        tracing::info!(
            character_id = %character.id,
            title,
            theme,
            "Starting comic story generation",
        );

        let panels = plan_panels(theme, title, &character)?;

        let portrait = if self.config.generate_portrait {
            if cancel.is_cancelled() {
                return Err(PipelineError::Cancelled);
            }
            Some(
                generate_portrait(
                    &character,
                    self.capability.as_ref(),
                    self.fallback.as_ref(),
                    &self.config,
                    cancel,
                )
                .await,
            )
        } else {
            None
        };

        let panels = generate_images(
            panels,
            self.capability.as_ref(),
            self.fallback.as_ref(),
            &self.config,
            cancel,
        )
        .await?;

        let story = assemble(title, theme, character, portrait, panels, &request.style)?;

        if cancel.is_cancelled() {
            return Err(PipelineError::Cancelled);
        }
        let location = self.store.persist(&story).await?;

        tracing::info!(
            title = %story.title,
            directory = %location.directory.display(),
            "Comic story persisted",
        );

        Ok(GenerateResponse { story, location })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use vignette_core::character::TraitCategory;

    fn request() -> GenerateRequest {
        let mut characteristics = Characteristics::new();
        characteristics
            .set(TraitCategory::Appearance, "elf with silver hair")
            .set(TraitCategory::Personality, "wise and curious");
        GenerateRequest {
            title: "The Quest".into(),
            theme: "adventure".into(),
            characteristics,
            style: PromptStyle::default(),
        }
    }

    #[test]
    fn request_deserializes_with_default_style() {
        let json = r#"{
            "title": "The Quest",
            "theme": "adventure",
            "characteristics": {
                "appearance": "elf with silver hair",
                "personality": "wise and curious"
            }
        }"#;
        let parsed: GenerateRequest = serde_json::from_str(json).unwrap();
        assert_eq!(parsed.title, "The Quest");
        assert_eq!(
            parsed.characteristics.get(TraitCategory::Appearance),
            Some("elf with silver hair")
        );
        assert_eq!(parsed.style, PromptStyle::default());
    }

    #[test]
    fn request_round_trips_characteristics() {
        let r = request();
        assert_eq!(
            r.characteristics.get(TraitCategory::Personality),
            Some("wise and curious")
        );
    }
}
