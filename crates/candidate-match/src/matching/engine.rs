use std::collections::HashMap;

use rand::RngCore;
use tracing::{debug, warn};

use super::assemble::{candidate_match, candidate_roster, sort_matches, RankedMatch};
use super::baseline::{population_std_dev, CandidateBaseline};
use super::config::ScoringConfig;
use super::domain::{CandidateMatch, CandidatePosition, Question, QuestionId, UserAnswer};
use super::jitter::{rng_for, Jitter};
use super::normalize::normalize_answer;
use super::pathways::{select_best, CandidateEvidence, DirectSample};
use super::ranking::QuestionRanker;
use super::similarity::{cosine_similarity, SimilarityError};
use super::stance::{candidate_stance, stance_alignment, user_stance};

/// The one failure the engine propagates: embeddings that cannot be compared.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum MatchError {
    #[error("question {question} cannot be compared with candidate {candidate}: {source}")]
    ShapeMismatch {
        question: String,
        candidate: String,
        #[source]
        source: SimilarityError,
    },
}

/// An answer that survived question lookup, with its normalized value.
struct ResolvedAnswer<'a> {
    question: &'a Question,
    normalized: f64,
    stance: f64,
    embedding: &'a [f32],
}

/// Stateless scorer turning quiz answers into a ranked candidate list.
#[derive(Debug, Clone, Default)]
pub struct MatchEngine {
    config: ScoringConfig,
}

impl MatchEngine {
    pub fn new(config: ScoringConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &ScoringConfig {
        &self.config
    }

    /// Rank every candidate in `positions` against the answers.
    ///
    /// Jitter follows the configuration; with jitter disabled the output is a pure
    /// function of the three inputs.
    pub fn rank(
        &self,
        questions: &[Question],
        positions: &[CandidatePosition],
        answers: &[UserAnswer],
    ) -> Result<Vec<CandidateMatch>, MatchError> {
        if self.config.jitter_enabled {
            let mut rng = rng_for(&self.config);
            self.rank_with_rng(questions, positions, answers, &mut rng)
        } else {
            self.score(questions, positions, answers, Jitter::disabled())
        }
    }

    /// Rank with an explicitly injected random source for the alignment jitter.
    pub fn rank_with_rng(
        &self,
        questions: &[Question],
        positions: &[CandidatePosition],
        answers: &[UserAnswer],
        rng: &mut dyn RngCore,
    ) -> Result<Vec<CandidateMatch>, MatchError> {
        let jitter = Jitter::new(self.config.jitter_amplitude, rng);
        self.score(questions, positions, answers, jitter)
    }

    fn score(
        &self,
        questions: &[Question],
        positions: &[CandidatePosition],
        answers: &[UserAnswer],
        mut jitter: Jitter<'_>,
    ) -> Result<Vec<CandidateMatch>, MatchError> {
        if answers.is_empty() || positions.is_empty() || questions.is_empty() {
            warn!(
                answers = answers.len(),
                positions = positions.len(),
                questions = questions.len(),
                "empty matching input; returning no matches"
            );
            return Ok(Vec::new());
        }

        let resolved = resolve_answers(questions, answers);
        if resolved.is_empty() {
            warn!(
                answers = answers.len(),
                "no answer referenced a known question; returning no matches"
            );
            return Ok(Vec::new());
        }

        let roster = candidate_roster(positions);

        // similarities[c][a]: raw similarity of candidate c for resolved answer a.
        let mut similarities: Vec<Vec<Option<f64>>> = Vec::with_capacity(roster.len());
        for candidate in &roster {
            let mut row = Vec::with_capacity(resolved.len());
            for answer in &resolved {
                let similarity = match candidate.position(answer.question.topic) {
                    Some(position) => Some(
                        cosine_similarity(answer.embedding, &position.embedding).map_err(
                            |source| MatchError::ShapeMismatch {
                                question: answer.question.id.0.clone(),
                                candidate: candidate.id.0.clone(),
                                source,
                            },
                        )?,
                    ),
                    None => None,
                };
                row.push(similarity);
            }
            similarities.push(row);
        }

        let baselines: Vec<CandidateBaseline> = similarities
            .iter()
            .map(|row| {
                let samples: Vec<f64> = row.iter().flatten().copied().collect();
                CandidateBaseline::from_samples(&samples)
            })
            .collect();

        // Candidates without a position on the topic rank below everyone with one.
        let mut ranker = QuestionRanker::new(roster.len());
        let mut alignments: Vec<Option<f64>> = vec![None; roster.len()];
        for (index, answer) in resolved.iter().enumerate() {
            for (candidate, alignment) in alignments.iter_mut().enumerate() {
                let similarity = similarities[candidate][index];
                *alignment = similarity.map(|raw| {
                    let stance = candidate_stance(Some(raw), &baselines[candidate]);
                    jitter.perturb(stance_alignment(stance, answer.stance))
                });
            }
            ranker.record_with_gaps(answer.question.topic, answer.question.weight, &alignments);
        }

        let normalized: Vec<f64> = resolved.iter().map(|answer| answer.normalized).collect();
        let answer_spread = population_std_dev(&normalized);
        let tallies = ranker.into_tallies();

        let mut ranked = Vec::with_capacity(roster.len());
        for (candidate, entry) in roster.iter().enumerate() {
            let direct: Vec<DirectSample> = resolved
                .iter()
                .zip(&similarities[candidate])
                .filter_map(|(answer, similarity)| {
                    similarity.map(|raw_similarity| DirectSample {
                        normalized_answer: answer.normalized,
                        raw_similarity,
                    })
                })
                .collect();

            let evidence = CandidateEvidence {
                tally: &tallies[candidate],
                similarity_spread: (baselines[candidate].samples > 0)
                    .then_some(baselines[candidate].spread),
                answer_spread,
                topics_covered: entry.topics_covered(),
                direct: &direct,
            };
            let choice = select_best(&evidence);

            ranked.push(RankedMatch {
                entry: candidate_match(
                    entry,
                    choice.score,
                    direct.len(),
                    tallies[candidate].alignment_by_area(),
                    choice.pathway,
                ),
                strength: choice.strength,
            });
        }

        let matches = sort_matches(ranked);
        debug!(
            candidates = matches.len(),
            answers = resolved.len(),
            skipped = answers.len() - resolved.len(),
            jitter = jitter.is_active(),
            "ranked candidates"
        );
        Ok(matches)
    }
}

fn resolve_answers<'a>(questions: &'a [Question], answers: &'a [UserAnswer]) -> Vec<ResolvedAnswer<'a>> {
    let by_id: HashMap<&QuestionId, &Question> =
        questions.iter().map(|question| (&question.id, question)).collect();

    answers
        .iter()
        .filter_map(|answer| {
            let Some(question) = by_id.get(&answer.question_id).copied() else {
                warn!(question = %answer.question_id, "answer references unknown question; skipped");
                return None;
            };

            if question.topic != answer.topic {
                warn!(
                    question = %answer.question_id,
                    expected = question.topic.label(),
                    found = answer.topic.label(),
                    "answer topic disagrees with question; skipped"
                );
                return None;
            }

            let normalized = normalize_answer(&question.id, &answer.answer, &question.response_type);
            let embedding = if answer.embedding.is_empty() {
                question.embedding.as_slice()
            } else {
                answer.embedding.as_slice()
            };

            Some(ResolvedAnswer {
                question,
                normalized,
                stance: user_stance(normalized),
                embedding,
            })
        })
        .collect()
}
