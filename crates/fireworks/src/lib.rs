//! Fireworks AI image-generation client.
//!
//! Implements the core [`ImageCapability`] trait against the Fireworks
//! inference API. This is the only network-facing crate in the
//! workspace; everything provider-specific stays behind the trait.
//!
//! [`ImageCapability`]: vignette_core::capability::ImageCapability

mod client;
mod config;

pub use client::FireworksClient;
pub use config::FireworksConfig;
