//! Ephemeral generation jobs: one capability invocation per attempt.

use rand::Rng;

/// Binds one panel to one invocation of the image capability.
///
/// Jobs are never stored; they exist only for the duration of a single
/// attempt and carry the seed that makes the attempt reproducible.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenerationJob {
    /// Ordinal of the panel being generated (0 for the portrait).
    pub ordinal: u32,
    pub prompt: String,
    /// Seed forwarded to the capability for reproducibility.
    pub seed: u64,
    /// Zero-based attempt counter (0 = first try).
    pub attempt: u32,
}

/// Draw a fresh seed, uniformly distributed over the full `u64` range.
pub fn draw_seed() -> u64 {
    rand::rng().random()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn seeds_are_not_constant() {
        let seeds: std::collections::HashSet<u64> = (0..16).map(|_| draw_seed()).collect();
        assert!(seeds.len() > 1);
    }
}
