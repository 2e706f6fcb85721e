//! Fireworks client configuration.

/// Connection settings for the Fireworks inference API.
///
/// The API key is always an explicit configuration value passed in by
/// the caller; it is never read from a module constant.
#[derive(Debug, Clone)]
pub struct FireworksConfig {
    /// Bearer token for the Fireworks API.
    pub api_key: String,
    /// Base URL (default: `https://api.fireworks.ai/inference/v1`).
    pub base_url: String,
    /// Model identifier submitted with each generation request.
    pub model: String,
    /// Diffusion step count (default: `4`, the schnell fast path).
    pub steps: u32,
}

impl FireworksConfig {
    /// Load configuration from environment variables.
    ///
    /// | Env Var              | Default                                  |
    /// |----------------------|------------------------------------------|
    /// | `FIREWORKS_API_KEY`  | *(empty)*                                |
    /// | `FIREWORKS_BASE_URL` | `https://api.fireworks.ai/inference/v1`  |
    /// | `FIREWORKS_MODEL`    | `accounts/fireworks/models/flux-1-schnell-fp8` |
    /// | `FIREWORKS_STEPS`    | `4`                                      |
    pub fn from_env() -> Self {
        let api_key = std::env::var("FIREWORKS_API_KEY").unwrap_or_default();
        let base_url = std::env::var("FIREWORKS_BASE_URL")
            .unwrap_or_else(|_| "https://api.fireworks.ai/inference/v1".into());
        let model = std::env::var("FIREWORKS_MODEL")
            .unwrap_or_else(|_| "accounts/fireworks/models/flux-1-schnell-fp8".into());
        let steps: u32 = std::env::var("FIREWORKS_STEPS")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(4);

        Self {
            api_key,
            base_url,
            model,
            steps,
        }
    }
}
