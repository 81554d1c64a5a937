use serde::{Deserialize, Serialize};

use super::domain::Topic;
use super::normalize::NEUTRAL_ANSWER;
use super::ranking::CandidateTally;
use super::stance::user_stance;

const RANK_WEIGHT: f64 = 0.7;
const VARIANCE_BONUS_MAX: f64 = 30.0;
const VARIANCE_BONUS_DECAY: f64 = 3.0;
const COMPREHENSIVENESS_BONUS_MAX: f64 = 35.0;
const CONSISTENCY_FLOOR_WEIGHT: f64 = 0.4;
const CONSISTENCY_MEAN_WEIGHT: f64 = 0.6;
const NEUTRAL_BAND: f64 = 0.01;

/// Independent scoring heuristics; the final score is the best of them.
///
/// Each favors a different candidate archetype: narrow specialists, broad generalists
/// and candidates whose text simply matches the quiz best.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Pathway {
    RankBased,
    Consistency,
    DirectCorrelation,
}

impl Pathway {
    pub const ALL: [Pathway; 3] = [
        Pathway::RankBased,
        Pathway::Consistency,
        Pathway::DirectCorrelation,
    ];

    pub fn label(self) -> &'static str {
        match self {
            Pathway::RankBased => "rank-based",
            Pathway::Consistency => "consistency",
            Pathway::DirectCorrelation => "direct correlation",
        }
    }

    pub fn score(self, evidence: &CandidateEvidence<'_>) -> f64 {
        match self {
            Pathway::RankBased => rank_based(evidence),
            Pathway::Consistency => consistency(evidence),
            Pathway::DirectCorrelation => direct_correlation(evidence),
        }
    }
}

/// One answered question as seen by a candidate with a position on its topic.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DirectSample {
    pub normalized_answer: f64,
    pub raw_similarity: f64,
}

/// Everything the pathways need to know about one candidate after ranking.
#[derive(Debug, Clone)]
pub struct CandidateEvidence<'a> {
    pub tally: &'a CandidateTally,
    /// Population spread of the candidate's raw similarities; `None` without samples.
    pub similarity_spread: Option<f64>,
    /// Population spread of the user's normalized answers.
    pub answer_spread: f64,
    pub topics_covered: usize,
    pub direct: &'a [DirectSample],
}

fn comprehensiveness_bonus(topics_covered: usize) -> f64 {
    let covered = topics_covered.min(Topic::ALL.len()) as f64;
    covered / Topic::ALL.len() as f64 * COMPREHENSIVENESS_BONUS_MAX
}

/// No similarity samples means no spread to compare, so no bonus.
fn variance_bonus(similarity_spread: Option<f64>, answer_spread: f64) -> f64 {
    match similarity_spread {
        Some(spread) => {
            (-VARIANCE_BONUS_DECAY * (spread - answer_spread).abs()).exp() * VARIANCE_BONUS_MAX
        }
        None => 0.0,
    }
}

pub(crate) fn rank_based(evidence: &CandidateEvidence<'_>) -> f64 {
    RANK_WEIGHT * evidence.tally.average_points()
        + variance_bonus(evidence.similarity_spread, evidence.answer_spread)
        + comprehensiveness_bonus(evidence.topics_covered)
}

pub(crate) fn consistency(evidence: &CandidateEvidence<'_>) -> f64 {
    if evidence.tally.points.is_empty() {
        return comprehensiveness_bonus(evidence.topics_covered);
    }
    CONSISTENCY_FLOOR_WEIGHT * evidence.tally.min_points()
        + CONSISTENCY_MEAN_WEIGHT * evidence.tally.average_points()
        + comprehensiveness_bonus(evidence.topics_covered)
}

pub(crate) fn direct_correlation(evidence: &CandidateEvidence<'_>) -> f64 {
    if evidence.direct.is_empty() {
        return 0.0;
    }

    let total: f64 = evidence
        .direct
        .iter()
        .map(|sample| {
            if (sample.normalized_answer - NEUTRAL_ANSWER).abs() < NEUTRAL_BAND {
                sample.raw_similarity
            } else {
                user_stance(sample.normalized_answer) * (sample.raw_similarity - 0.5) + 0.5
            }
        })
        .sum();

    total / evidence.direct.len() as f64 * 100.0
}

/// Winning pathway for one candidate.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PathwayChoice {
    pub pathway: Pathway,
    /// Final score, clamped to [0, 100].
    pub score: f64,
    /// The winning pathway's value before clamping; orders candidates tied at a bound.
    pub strength: f64,
}

/// Best pathway for the candidate.
///
/// A non-finite pathway result counts as 0 so one degenerate input cannot poison the
/// final score.
pub fn select_best(evidence: &CandidateEvidence<'_>) -> PathwayChoice {
    let mut best = (Pathway::RankBased, f64::NEG_INFINITY);
    for pathway in Pathway::ALL {
        let score = pathway.score(evidence);
        let score = if score.is_finite() { score } else { 0.0 };
        if score > best.1 {
            best = (pathway, score);
        }
    }
    PathwayChoice {
        pathway: best.0,
        score: best.1.clamp(0.0, 100.0),
        strength: best.1,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::matching::ranking::QuestionRanker;

    fn tally_with(points: &[(f64, f64)]) -> CandidateTally {
        // Two-candidate ranking per question reproduces 100/0 points.
        let mut ranker = QuestionRanker::new(2);
        for &(first, weight) in points {
            ranker.record(Topic::Economy, weight, &[first, 0.5]);
        }
        ranker.into_tallies().remove(0)
    }

    fn evidence<'a>(
        tally: &'a CandidateTally,
        direct: &'a [DirectSample],
        topics_covered: usize,
    ) -> CandidateEvidence<'a> {
        CandidateEvidence {
            tally,
            similarity_spread: Some(0.2),
            answer_spread: 0.2,
            topics_covered,
            direct,
        }
    }

    #[test]
    fn rank_based_adds_both_bonuses() {
        let tally = tally_with(&[(0.9, 1.0), (0.1, 1.0)]);
        let evidence = evidence(&tally, &[], 7);

        let score = Pathway::RankBased.score(&evidence);

        assert!((score - (0.7 * 50.0 + 30.0 + 35.0)).abs() < 1e-9);
    }

    #[test]
    fn variance_bonus_decays_with_spread_gap() {
        assert_eq!(variance_bonus(Some(0.3), 0.3), 30.0);
        assert!((variance_bonus(Some(0.0), 1.0) - 30.0 * (-3.0f64).exp()).abs() < 1e-12);
    }

    #[test]
    fn candidates_without_samples_earn_no_variance_bonus() {
        let tally = tally_with(&[(0.9, 1.0)]);
        let mut bare = evidence(&tally, &[], 0);
        bare.similarity_spread = None;
        bare.answer_spread = 0.0;

        assert_eq!(variance_bonus(None, 0.0), 0.0);
        assert!((Pathway::RankBased.score(&bare) - 70.0).abs() < 1e-9);
    }

    #[test]
    fn consistency_rewards_the_weakest_question() {
        let steady = tally_with(&[(0.9, 1.0), (0.9, 1.0)]);
        let uneven = tally_with(&[(0.9, 1.0), (0.1, 1.0)]);

        let steady_score = Pathway::Consistency.score(&evidence(&steady, &[], 1));
        let uneven_score = Pathway::Consistency.score(&evidence(&uneven, &[], 1));

        assert!((steady_score - (100.0 + 5.0)).abs() < 1e-9);
        assert!((uneven_score - (0.6 * 50.0 + 5.0)).abs() < 1e-9);
    }

    #[test]
    fn direct_correlation_uses_raw_similarity_for_neutral_answers() {
        let tally = CandidateTally::default();
        let samples = [
            DirectSample {
                normalized_answer: 0.5,
                raw_similarity: 0.8,
            },
            DirectSample {
                normalized_answer: 1.0,
                raw_similarity: 0.9,
            },
            DirectSample {
                normalized_answer: 0.0,
                raw_similarity: 0.9,
            },
        ];

        let score = Pathway::DirectCorrelation.score(&evidence(&tally, &samples, 0));

        let expected = (0.8 + 0.9 + 0.1) / 3.0 * 100.0;
        assert!((score - expected).abs() < 1e-9);
    }

    #[test]
    fn direct_correlation_without_positions_is_zero() {
        let tally = CandidateTally::default();

        assert_eq!(Pathway::DirectCorrelation.score(&evidence(&tally, &[], 0)), 0.0);
    }

    #[test]
    fn selection_takes_the_maximum_and_clamps() {
        let tally = tally_with(&[(0.9, 1.0), (0.9, 1.0)]);
        let choice = select_best(&evidence(&tally, &[], 7));

        assert_eq!(choice.pathway, Pathway::RankBased);
        assert_eq!(choice.score, 100.0);
        assert!((choice.strength - 135.0).abs() < 1e-9);

        let empty = CandidateTally::default();
        let samples = [DirectSample {
            normalized_answer: 1.0,
            raw_similarity: 0.95,
        }];
        let mut sparse = evidence(&empty, &samples, 0);
        sparse.similarity_spread = Some(5.0);
        let choice = select_best(&sparse);

        assert_eq!(choice.pathway, Pathway::DirectCorrelation);
        assert!((choice.score - 95.0).abs() < 1e-9);
        assert_eq!(choice.score, choice.strength);
    }
}
