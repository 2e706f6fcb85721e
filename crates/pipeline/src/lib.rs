//! Comic story generation pipeline.
//!
//! Drives one generation run end to end: build the character from raw
//! traits, plan the fixed panel arc, fan out image generation to the
//! capability with timeout/retry/fallback, assemble the story, and
//! persist it. The [`generator::ComicGenerator`] facade is the single
//! entry point any CLI or server layer calls.

pub mod error;
pub mod generator;
pub mod job;
pub mod orchestrator;

pub use error::PipelineError;
pub use generator::{ComicGenerator, GenerateRequest, GenerateResponse};
pub use orchestrator::{generate_images, generate_portrait, GenerationConfig};
