use serde::{Deserialize, Serialize};

/// ±5% of the 0–100 scale, expressed on the 0–1 alignment scale.
pub const DEFAULT_JITTER_AMPLITUDE: f64 = 0.05;

/// Scoring knobs that vary between deployments.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoringConfig {
    pub jitter_enabled: bool,
    pub jitter_amplitude: f64,
    pub jitter_seed: Option<u64>,
}

impl ScoringConfig {
    /// Jitter off: identical inputs give bit-identical rankings.
    pub fn deterministic() -> Self {
        Self {
            jitter_enabled: false,
            jitter_amplitude: DEFAULT_JITTER_AMPLITUDE,
            jitter_seed: None,
        }
    }

    pub fn with_jitter(seed: Option<u64>) -> Self {
        Self {
            jitter_enabled: true,
            jitter_amplitude: DEFAULT_JITTER_AMPLITUDE,
            jitter_seed: seed,
        }
    }
}

impl Default for ScoringConfig {
    fn default() -> Self {
        Self::deterministic()
    }
}
