/// Lower bound applied to every baseline standard deviation.
pub const MIN_STD_DEV: f64 = 1e-3;

/// Per-candidate distribution of raw similarity used to z-score its stances.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CandidateBaseline {
    pub mean: f64,
    pub std_dev: f64,
    /// Population spread of the raw similarities (0 without samples).
    pub spread: f64,
    pub samples: usize,
}

impl CandidateBaseline {
    /// Baseline that leaves raw similarity untouched.
    pub const NEUTRAL: CandidateBaseline = CandidateBaseline {
        mean: 0.0,
        std_dev: 1.0,
        spread: 0.0,
        samples: 0,
    };

    /// Build a baseline from every raw similarity the candidate produced this call.
    ///
    /// With fewer than two samples no spread can be estimated, so the neutral
    /// mean/std pair is kept and raw similarity passes through unscaled.
    pub fn from_samples(samples: &[f64]) -> Self {
        let finite: Vec<f64> = samples.iter().copied().filter(|s| s.is_finite()).collect();
        let count = finite.len();
        if count == 0 {
            return Self::NEUTRAL;
        }

        let mean = finite.iter().sum::<f64>() / count as f64;
        let squared: f64 = finite.iter().map(|s| (s - mean).powi(2)).sum();
        let spread = (squared / count as f64).sqrt();

        if count < 2 {
            return Self {
                spread,
                samples: count,
                ..Self::NEUTRAL
            };
        }

        let std_dev = (squared / (count - 1) as f64).sqrt().max(MIN_STD_DEV);
        Self {
            mean,
            std_dev,
            spread,
            samples: count,
        }
    }

    /// Z-score of a raw similarity against this baseline.
    pub fn z_score(&self, raw_similarity: f64) -> f64 {
        (raw_similarity - self.mean) / self.std_dev
    }
}

/// Population standard deviation, 0 for fewer than two values.
pub(crate) fn population_std_dev(values: &[f64]) -> f64 {
    if values.len() < 2 {
        return 0.0;
    }
    let mean = values.iter().sum::<f64>() / values.len() as f64;
    let variance = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / values.len() as f64;
    variance.sqrt()
}
