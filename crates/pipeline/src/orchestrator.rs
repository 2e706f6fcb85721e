//! Image generation orchestrator: timeout, retry, fallback, and bounded
//! concurrency around the external capability.
//!
//! Panels may complete in any order under concurrency; the returned
//! sequence is re-sorted by ordinal before the consistency check, so
//! completion order never leaks into output order. Transient failures
//! are contained per panel and can only degrade a panel to a
//! placeholder, never abort the run.

use std::time::Duration;

use futures::StreamExt;
use tokio_util::sync::CancellationToken;
use vignette_core::capability::{
    CapabilityError, FallbackPolicy, ImageCapability, ImageRef, ImageSize,
};
use vignette_core::character::Character;
use vignette_core::panel::{validate_panel_sequence, PanelSpec};

use crate::error::PipelineError;
use crate::job::{draw_seed, GenerationJob};

// ---------------------------------------------------------------------------
// Policy constants
// ---------------------------------------------------------------------------

/// Retries after the first failed attempt, per panel.
pub const MAX_RETRIES: u32 = 2;
/// Wall-clock bound on a single capability invocation.
pub const DEFAULT_TIMEOUT_SECS: u64 = 60;
/// Default number of panels generated concurrently.
pub const DEFAULT_CONCURRENCY: usize = 2;

// ---------------------------------------------------------------------------
// Configuration
// ---------------------------------------------------------------------------

/// Tunable parameters for one generation run.
#[derive(Debug, Clone)]
pub struct GenerationConfig {
    /// Per-attempt timeout; exceeding it counts as a transient failure.
    pub timeout: Duration,
    /// Retries after the first failed attempt.
    pub max_retries: u32,
    /// Concurrency limit for panel generation (clamped to >= 1).
    pub concurrency: usize,
    /// Output size for panel images.
    pub size: ImageSize,
    /// Pinned seeds, indexed by planning position. When set, the seed
    /// is reused across retries so the run stays reproducible; when
    /// absent, every attempt draws a fresh uniform seed.
    pub seeds: Option<Vec<u64>>,
    /// Generate a standalone character portrait before the panels.
    pub generate_portrait: bool,
    /// Portrait candidates to try; the first success is auto-selected.
    pub portrait_candidates: u32,
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            max_retries: MAX_RETRIES,
            concurrency: DEFAULT_CONCURRENCY,
            size: ImageSize::PANEL,
            seeds: None,
            generate_portrait: true,
            portrait_candidates: 1,
        }
    }
}

// ---------------------------------------------------------------------------
// Panel generation
// ---------------------------------------------------------------------------

/// Generate an image for every panel, with bounded concurrency.
///
/// Always returns a fully populated sequence on success: a panel whose
/// retries are exhausted carries the fallback placeholder. Returns
/// [`PipelineError::Cancelled`] if `cancel` fires before completion and
/// [`PipelineError::Core`] only if the resulting sequence violates the
/// ordinal invariant (an orchestrator bug, not a runtime condition).
pub async fn generate_images(
    panels: Vec<PanelSpec>,
    capability: &dyn ImageCapability,
    fallback: &dyn FallbackPolicy,
    config: &GenerationConfig,
    cancel: &CancellationToken,
) -> Result<Vec<PanelSpec>, PipelineError> {
    let concurrency = config.concurrency.max(1);

    let jobs = panels.into_iter().enumerate().map(|(index, panel)| {
        let pinned = config.seeds.as_ref().and_then(|s| s.get(index).copied());
        generate_panel(panel, pinned, capability, fallback, config, cancel)
    });

    let mut generated: Vec<PanelSpec> = futures::stream::iter(jobs)
        .buffer_unordered(concurrency)
        .collect()
        .await;

    if cancel.is_cancelled() {
        return Err(PipelineError::Cancelled);
    }

    // Completion order is unspecified under concurrency; narrative
    // order is ordinal order.
    generated.sort_by_key(|panel| panel.ordinal);
    validate_panel_sequence(&generated)?;

    Ok(generated)
}

/// Run the attempt loop for one panel.
async fn generate_panel(
    mut panel: PanelSpec,
    pinned_seed: Option<u64>,
    capability: &dyn ImageCapability,
    fallback: &dyn FallbackPolicy,
    config: &GenerationConfig,
    cancel: &CancellationToken,
) -> PanelSpec {
    let mut seed = pinned_seed.unwrap_or_else(draw_seed);

    for attempt in 0..=config.max_retries {
        if cancel.is_cancelled() {
            return panel;
        }

        let job = GenerationJob {
            ordinal: panel.ordinal,
            prompt: panel.prompt.clone(),
            seed,
            attempt,
        };

        match invoke(capability, &job.prompt, job.seed, config.size, config.timeout).await {
            Ok(image_ref) => {
                tracing::debug!(
                    ordinal = panel.ordinal,
                    attempt,
                    seed = job.seed,
                    "Panel image generated",
                );
                panel.image_ref = Some(image_ref);
                return panel;
            }
            Err(e) => {
                tracing::warn!(
                    ordinal = panel.ordinal,
                    attempt,
                    error = %e,
                    "Panel generation attempt failed",
                );
                if pinned_seed.is_none() {
                    seed = draw_seed();
                }
            }
        }
    }

    tracing::warn!(
        ordinal = panel.ordinal,
        "Retries exhausted; substituting placeholder",
    );
    panel.image_ref = Some(fallback.placeholder(panel.ordinal));
    panel
}

// ---------------------------------------------------------------------------
// Portrait generation
// ---------------------------------------------------------------------------

/// Generate a standalone character portrait.
///
/// Tries up to `portrait_candidates` invocations with fresh seeds and
/// auto-selects the first success; exhaustion degrades to the portrait
/// placeholder (ordinal 0), same as a failed panel.
pub async fn generate_portrait(
    character: &Character,
    capability: &dyn ImageCapability,
    fallback: &dyn FallbackPolicy,
    config: &GenerationConfig,
    cancel: &CancellationToken,
) -> ImageRef {
    for candidate in 0..config.portrait_candidates.max(1) {
        if cancel.is_cancelled() {
            break;
        }
        let seed = draw_seed();
        match invoke(
            capability,
            &character.prompt,
            seed,
            ImageSize::PORTRAIT,
            config.timeout,
        )
        .await
        {
            Ok(image_ref) => {
                tracing::debug!(candidate, seed, "Character portrait generated");
                return image_ref;
            }
            Err(e) => {
                tracing::warn!(candidate, error = %e, "Portrait candidate failed");
            }
        }
    }
    fallback.placeholder(0)
}

/// Invoke the capability once, bounded by the configured timeout.
async fn invoke(
    capability: &dyn ImageCapability,
    prompt: &str,
    seed: u64,
    size: ImageSize,
    timeout: Duration,
) -> Result<ImageRef, CapabilityError> {
    match tokio::time::timeout(timeout, capability.generate(prompt, seed, size)).await {
        Ok(result) => result,
        Err(_) => Err(CapabilityError::Timeout(timeout)),
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::sync::Mutex;

    use async_trait::async_trait;
    use vignette_core::capability::UriFallback;
    use vignette_core::character::{
        build_character, Characteristics, PromptStyle, TraitCategory,
    };
    use vignette_core::panel::plan_panels;

    fn character() -> Character {
        let mut c = Characteristics::new();
        c.set(TraitCategory::Appearance, "elf with silver hair")
            .set(TraitCategory::Personality, "wise and curious");
        build_character(c, &PromptStyle::default()).unwrap()
    }

    fn panels() -> Vec<PanelSpec> {
        plan_panels("adventure", "The Quest", &character()).unwrap()
    }

    fn quick_config() -> GenerationConfig {
        GenerationConfig {
            timeout: Duration::from_millis(200),
            ..Default::default()
        }
    }

    /// Capability that fails the first `failures` calls, then succeeds,
    /// recording every (prompt, seed) it sees.
    struct FailNThenSucceed {
        remaining_failures: AtomicU32,
        calls: Mutex<Vec<(String, u64)>>,
    }

    impl FailNThenSucceed {
        fn new(failures: u32) -> Self {
            Self {
                remaining_failures: AtomicU32::new(failures),
                calls: Mutex::new(Vec::new()),
            }
        }

        fn seen_seeds(&self) -> Vec<u64> {
            self.calls.lock().unwrap().iter().map(|(_, s)| *s).collect()
        }
    }

    #[async_trait]
    impl ImageCapability for FailNThenSucceed {
        async fn generate(
            &self,
            prompt: &str,
            seed: u64,
            _size: ImageSize,
        ) -> Result<ImageRef, CapabilityError> {
            self.calls.lock().unwrap().push((prompt.to_string(), seed));
            let failed = self
                .remaining_failures
                .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
                .is_ok();
            if failed {
                Err(CapabilityError::Transport("connection reset".into()))
            } else {
                Ok(ImageRef::new(format!("generated://{seed}")))
            }
        }
    }

    struct AlwaysFail;

    #[async_trait]
    impl ImageCapability for AlwaysFail {
        async fn generate(
            &self,
            _prompt: &str,
            _seed: u64,
            _size: ImageSize,
        ) -> Result<ImageRef, CapabilityError> {
            Err(CapabilityError::Api {
                status: 503,
                body: "overloaded".into(),
            })
        }
    }

    struct Hang;

    #[async_trait]
    impl ImageCapability for Hang {
        async fn generate(
            &self,
            _prompt: &str,
            _seed: u64,
            _size: ImageSize,
        ) -> Result<ImageRef, CapabilityError> {
            futures::future::pending().await
        }
    }

    // -- happy path --

    #[tokio::test]
    async fn all_panels_get_images() {
        let capability = FailNThenSucceed::new(0);
        let result = generate_images(
            panels(),
            &capability,
            &UriFallback,
            &quick_config(),
            &CancellationToken::new(),
        )
        .await
        .unwrap();

        assert_eq!(result.len(), 5);
        for panel in &result {
            let image = panel.image_ref.as_ref().unwrap();
            assert!(!image.is_placeholder());
        }
    }

    // -- retry --

    #[tokio::test]
    async fn transient_failures_are_retried_with_new_seeds() {
        let capability = FailNThenSucceed::new(2);
        let config = GenerationConfig {
            concurrency: 1,
            ..quick_config()
        };
        let result = generate_images(
            panels(),
            &capability,
            &UriFallback,
            &config,
            &CancellationToken::new(),
        )
        .await
        .unwrap();

        // 2 failed attempts + 5 successes.
        assert_eq!(capability.calls.lock().unwrap().len(), 7);
        assert!(result.iter().all(|p| p.image_ref.is_some()));

        // Retries for the first panel drew fresh seeds.
        let seeds = capability.seen_seeds();
        assert_ne!(seeds[0], seeds[1]);
        assert_ne!(seeds[1], seeds[2]);
    }

    #[tokio::test]
    async fn pinned_seeds_are_reused_across_retries() {
        let capability = FailNThenSucceed::new(1);
        let config = GenerationConfig {
            concurrency: 1,
            seeds: Some(vec![11, 22, 33, 44, 55]),
            ..quick_config()
        };
        generate_images(
            panels(),
            &capability,
            &UriFallback,
            &config,
            &CancellationToken::new(),
        )
        .await
        .unwrap();

        let seeds = capability.seen_seeds();
        // First panel: failed attempt and retry both used seed 11.
        assert_eq!(&seeds[..3], &[11, 11, 22]);
    }

    // -- fallback --

    #[tokio::test]
    async fn exhausted_retries_substitute_labeled_placeholders() {
        let result = generate_images(
            panels(),
            &AlwaysFail,
            &UriFallback,
            &quick_config(),
            &CancellationToken::new(),
        )
        .await
        .unwrap();

        assert_eq!(result.len(), 5);
        for panel in &result {
            assert_eq!(
                panel.image_ref.as_ref().unwrap().as_str(),
                format!("placeholder://panel/{}", panel.ordinal)
            );
        }
    }

    // -- timeout --

    #[tokio::test]
    async fn hanging_capability_times_out_to_placeholder() {
        let config = GenerationConfig {
            timeout: Duration::from_millis(20),
            max_retries: 1,
            ..Default::default()
        };
        let result = generate_images(
            panels(),
            &Hang,
            &UriFallback,
            &config,
            &CancellationToken::new(),
        )
        .await
        .unwrap();

        assert!(result
            .iter()
            .all(|p| p.image_ref.as_ref().unwrap().is_placeholder()));
    }

    // -- ordering under concurrency --

    #[tokio::test]
    async fn output_order_matches_planning_order_at_any_concurrency() {
        for concurrency in [1usize, 4] {
            let capability = FailNThenSucceed::new(0);
            let config = GenerationConfig {
                concurrency,
                seeds: Some(vec![1, 2, 3, 4, 5]),
                ..quick_config()
            };
            let result = generate_images(
                panels(),
                &capability,
                &UriFallback,
                &config,
                &CancellationToken::new(),
            )
            .await
            .unwrap();

            let ordinals: Vec<u32> = result.iter().map(|p| p.ordinal).collect();
            assert_eq!(ordinals, vec![1, 2, 3, 4, 5], "concurrency {concurrency}");
            let refs: Vec<&str> = result
                .iter()
                .map(|p| p.image_ref.as_ref().unwrap().as_str())
                .collect();
            assert_eq!(
                refs,
                vec![
                    "generated://1",
                    "generated://2",
                    "generated://3",
                    "generated://4",
                    "generated://5"
                ]
            );
        }
    }

    #[tokio::test]
    async fn zero_concurrency_is_clamped_to_one() {
        let capability = FailNThenSucceed::new(0);
        let config = GenerationConfig {
            concurrency: 0,
            ..quick_config()
        };
        let result = generate_images(
            panels(),
            &capability,
            &UriFallback,
            &config,
            &CancellationToken::new(),
        )
        .await
        .unwrap();
        assert_eq!(result.len(), 5);
    }

    // -- cancellation --

    #[tokio::test]
    async fn cancelled_run_returns_cancelled() {
        let cancel = CancellationToken::new();
        cancel.cancel();

        let capability = FailNThenSucceed::new(0);
        let result = generate_images(
            panels(),
            &capability,
            &UriFallback,
            &quick_config(),
            &cancel,
        )
        .await;

        assert!(matches!(result, Err(PipelineError::Cancelled)));
        // No capability calls were made after cancellation.
        assert!(capability.calls.lock().unwrap().is_empty());
    }

    // -- portrait --

    #[tokio::test]
    async fn portrait_auto_selects_first_success() {
        let capability = FailNThenSucceed::new(0);
        let portrait = generate_portrait(
            &character(),
            &capability,
            &UriFallback,
            &quick_config(),
            &CancellationToken::new(),
        )
        .await;
        assert!(!portrait.is_placeholder());
        // The portrait uses the styled character prompt.
        let calls = capability.calls.lock().unwrap();
        assert!(calls[0].0.contains("flux schnell style"));
    }

    #[tokio::test]
    async fn portrait_degrades_to_placeholder() {
        let portrait = generate_portrait(
            &character(),
            &AlwaysFail,
            &UriFallback,
            &quick_config(),
            &CancellationToken::new(),
        )
        .await;
        assert_eq!(portrait.as_str(), "placeholder://portrait");
    }
}
