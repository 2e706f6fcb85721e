//! HTTP client for the Fireworks image-generation endpoint.
//!
//! Wraps the `POST {base_url}/image_generation` call using [`reqwest`]
//! and maps transport and non-2xx failures into the provider-agnostic
//! [`CapabilityError`] taxonomy.

use async_trait::async_trait;
use serde::Deserialize;
use vignette_core::capability::{CapabilityError, ImageCapability, ImageRef, ImageSize};

use crate::config::FireworksConfig;

/// HTTP client for a single Fireworks account/model.
pub struct FireworksClient {
    client: reqwest::Client,
    config: FireworksConfig,
}

/// Response body of a successful generation call.
#[derive(Debug, Deserialize)]
struct GenerationResponse {
    data: Vec<GeneratedImage>,
}

#[derive(Debug, Deserialize)]
struct GeneratedImage {
    url: String,
}

impl FireworksClient {
    /// Create a new client with its own connection pool.
    pub fn new(config: FireworksConfig) -> Self {
        Self {
            client: reqwest::Client::new(),
            config,
        }
    }

    /// Create a client reusing an existing [`reqwest::Client`] (useful
    /// for connection pooling across providers).
    pub fn with_client(client: reqwest::Client, config: FireworksConfig) -> Self {
        Self { client, config }
    }

    /// Ensure the response has a success status code. Returns the
    /// response unchanged on success, or [`CapabilityError::Api`] with
    /// the status and body text on failure.
    async fn ensure_success(
        response: reqwest::Response,
    ) -> Result<reqwest::Response, CapabilityError> {
        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "<unreadable body>".to_string());
            return Err(CapabilityError::Api {
                status: status.as_u16(),
                body,
            });
        }
        Ok(response)
    }
}

#[async_trait]
impl ImageCapability for FireworksClient {
    async fn generate(
        &self,
        prompt: &str,
        seed: u64,
        size: ImageSize,
    ) -> Result<ImageRef, CapabilityError> {
        let body = serde_json::json!({
            "model": self.config.model,
            "prompt": prompt,
            "width": size.width,
            "height": size.height,
            "steps": self.config.steps,
            "seed": seed,
        });

        let response = self
            .client
            .post(format!("{}/image_generation", self.config.base_url))
            .bearer_auth(&self.config.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| CapabilityError::Transport(e.to_string()))?;

        let response = Self::ensure_success(response).await?;

        let parsed: GenerationResponse = response
            .json()
            .await
            .map_err(|e| CapabilityError::Transport(e.to_string()))?;

        let image = parsed.data.into_iter().next().ok_or_else(|| {
            CapabilityError::Api {
                status: 200,
                body: "Response contained no generated images".to_string(),
            }
        })?;

        tracing::debug!(seed, url = %image.url, "Fireworks generation succeeded");

        Ok(ImageRef::new(image.url))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn generation_response_parses_first_image() {
        let json = r#"{"data":[{"url":"https://img.example/a.png"},{"url":"https://img.example/b.png"}]}"#;
        let parsed: GenerationResponse = serde_json::from_str(json).unwrap();
        assert_eq!(parsed.data[0].url, "https://img.example/a.png");
    }

    #[tokio::test]
    async fn unreachable_host_maps_to_transport_error() {
        let client = FireworksClient::new(FireworksConfig {
            api_key: "test".into(),
            // Reserved TEST-NET-1 address; connection fails fast.
            base_url: "http://192.0.2.1:9".into(),
            model: "test-model".into(),
            steps: 4,
        });
        let err = tokio::time::timeout(
            std::time::Duration::from_secs(5),
            client.generate("a prompt", 1, ImageSize::PANEL),
        )
        .await;
        match err {
            Ok(Err(CapabilityError::Transport(_))) => {}
            Ok(other) => panic!("expected transport error, got {other:?}"),
            // Some sandboxes black-hole the address instead of refusing.
            Err(_) => {}
        }
    }
}
