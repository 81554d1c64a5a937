use rand::{Rng, RngCore, SeedableRng};
use rand_chacha::ChaCha8Rng;

use super::config::ScoringConfig;

/// Bounded per-question perturbation applied to stance alignment before ranking.
///
/// Keeps small, stable embedding-level biases from permanently favoring the same
/// candidate. A disabled jitter draws nothing from the source.
pub struct Jitter<'a> {
    amplitude: f64,
    source: Option<&'a mut dyn RngCore>,
}

impl<'a> Jitter<'a> {
    pub fn disabled() -> Self {
        Self {
            amplitude: 0.0,
            source: None,
        }
    }

    pub fn new(amplitude: f64, source: &'a mut dyn RngCore) -> Self {
        let amplitude = if amplitude.is_finite() { amplitude.abs() } else { 0.0 };
        Self {
            amplitude,
            source: Some(source),
        }
    }

    pub fn is_active(&self) -> bool {
        self.source.is_some() && self.amplitude > 0.0
    }

    pub fn perturb(&mut self, alignment: f64) -> f64 {
        if self.amplitude <= 0.0 {
            return alignment;
        }
        match self.source.as_mut() {
            Some(rng) => alignment + rng.gen_range(-self.amplitude..=self.amplitude),
            None => alignment,
        }
    }
}

/// Random source for one invocation: seeded when configured, OS entropy otherwise.
pub(crate) fn rng_for(config: &ScoringConfig) -> ChaCha8Rng {
    match config.jitter_seed {
        Some(seed) => ChaCha8Rng::seed_from_u64(seed),
        None => ChaCha8Rng::from_entropy(),
    }
}
