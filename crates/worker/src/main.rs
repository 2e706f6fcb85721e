//! `vignette-worker` -- one-shot comic story generation worker.
//!
//! Reads a generation request from a JSON file, runs the full pipeline
//! against the Fireworks image API, and writes the finished story under
//! the output directory.
//!
//! Usage: `vignette-worker <request.json>`
//!
//! # Environment variables
//!
//! | Variable                | Required | Default    | Description                             |
//! |-------------------------|----------|------------|-----------------------------------------|
//! | `FIREWORKS_API_KEY`     | yes      | --         | Fireworks AI API key                    |
//! | `FIREWORKS_BASE_URL`    | no       | see config | Fireworks API base URL                  |
//! | `FIREWORKS_MODEL`       | no       | see config | Image model identifier                  |
//! | `FIREWORKS_STEPS`       | no       | `4`        | Diffusion steps per image               |
//! | `VIGNETTE_OUTPUT_DIR`   | no       | `output`   | Base directory for story directories    |
//! | `VIGNETTE_CONCURRENCY`  | no       | `2`        | Panels generated concurrently           |
//! | `VIGNETTE_TIMEOUT_SECS` | no       | `60`       | Per-attempt generation timeout          |
//! | `VIGNETTE_PORTRAIT`     | no       | `1`        | Set to `0` to skip the portrait         |

use std::sync::Arc;
use std::time::Duration;

use tokio_util::sync::CancellationToken;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use vignette_fireworks::{FireworksClient, FireworksConfig};
use vignette_pipeline::{ComicGenerator, GenerateRequest, GenerationConfig};
use vignette_storage::LocalArtifactStore;

const DEFAULT_OUTPUT_DIR: &str = "output";

fn generation_config_from_env() -> GenerationConfig {
    let mut config = GenerationConfig::default();

    if let Some(concurrency) = std::env::var("VIGNETTE_CONCURRENCY")
        .ok()
        .and_then(|v| v.parse().ok())
    {
        config.concurrency = concurrency;
    }
    if let Some(secs) = std::env::var("VIGNETTE_TIMEOUT_SECS")
        .ok()
        .and_then(|v| v.parse().ok())
    {
        config.timeout = Duration::from_secs(secs);
    }
    if let Ok(portrait) = std::env::var("VIGNETTE_PORTRAIT") {
        config.generate_portrait = !matches!(portrait.as_str(), "0" | "false");
    }

    config
}

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "vignette_worker=info,vignette_pipeline=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let request_path = std::env::args().nth(1).unwrap_or_else(|| {
        tracing::error!("Usage: vignette-worker <request.json>");
        std::process::exit(2);
    });

    let request: GenerateRequest = match tokio::fs::read(&request_path).await {
        Ok(bytes) => match serde_json::from_slice(&bytes) {
            Ok(request) => request,
            Err(e) => {
                tracing::error!(path = %request_path, error = %e, "Invalid request file");
                std::process::exit(2);
            }
        },
        Err(e) => {
            tracing::error!(path = %request_path, error = %e, "Failed to read request file");
            std::process::exit(2);
        }
    };

    let fireworks = FireworksConfig::from_env();
    if fireworks.api_key.is_empty() {
        tracing::error!("FIREWORKS_API_KEY environment variable is required");
        std::process::exit(1);
    }

    let output_dir = std::env::var("VIGNETTE_OUTPUT_DIR")
        .unwrap_or_else(|_| DEFAULT_OUTPUT_DIR.to_string());

    tracing::info!(
        title = %request.title,
        theme = %request.theme,
        output_dir = %output_dir,
        "Starting vignette-worker",
    );

    let generator = ComicGenerator::new(
        Arc::new(FireworksClient::new(fireworks)),
        Arc::new(LocalArtifactStore::new(output_dir)),
    )
    .with_config(generation_config_from_env());

    // Ctrl-C cancels the run; nothing is persisted for a cancelled run.
    let cancel = CancellationToken::new();
    {
        let cancel = cancel.clone();
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                tracing::warn!("Interrupt received, cancelling run");
                cancel.cancel();
            }
        });
    }

    match generator.generate(request, &cancel).await {
        Ok(response) => {
            let placeholders = response
                .story
                .panels
                .iter()
                .filter(|p| p.image_ref.as_ref().is_some_and(|r| r.is_placeholder()))
                .count();
            tracing::info!(
                directory = %response.location.directory.display(),
                panels = response.story.panels.len(),
                placeholders,
                "Comic story complete",
            );
        }
        Err(e) => {
            tracing::error!(error = %e, "Generation run failed");
            std::process::exit(1);
        }
    }
}
