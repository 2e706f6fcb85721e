//! Pure domain logic for the comic story generation pipeline.
//!
//! Nothing in this crate performs I/O. The trait model, prompt
//! synthesizer, panel planner, and story assembler are pure functions
//! over their inputs; the image-generation and fallback seams in
//! [`capability`] are trait definitions implemented elsewhere.

pub mod capability;
pub mod character;
pub mod error;
pub mod panel;
pub mod prompt;
pub mod story;
