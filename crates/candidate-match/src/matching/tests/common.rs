use std::sync::Arc;

use axum::response::Response;
use serde_json::Value;

use crate::matching::catalog::StaticCatalog;
use crate::matching::config::ScoringConfig;
use crate::matching::domain::{
    CandidateId, CandidateMatch, CandidatePosition, Question, QuestionId, RawAnswer,
    ResponseType, Topic, UserAnswer,
};
use crate::matching::engine::MatchEngine;
use crate::matching::service::MatchService;

pub(super) const DIM: usize = 3;

pub(super) fn basis(axis: usize) -> Vec<f32> {
    let mut v = vec![0.0; DIM];
    v[axis % DIM] = 1.0;
    v
}

/// Unit vector whose cosine similarity with `basis(axis)` is `similarity`.
pub(super) fn vector_with_similarity(axis: usize, similarity: f32) -> Vec<f32> {
    let mut v = vec![0.0; DIM];
    v[axis % DIM] = similarity;
    v[(axis + 1) % DIM] = (1.0 - similarity * similarity).sqrt();
    v
}

pub(super) fn question(id: &str, topic: Topic, axis: usize) -> Question {
    Question {
        id: QuestionId(id.to_string()),
        topic,
        response_type: ResponseType::AgreementScale,
        embedding: basis(axis),
        weight: 1.0,
    }
}

pub(super) fn position(
    candidate: &str,
    topic: Topic,
    axis: usize,
    similarity: f32,
) -> CandidatePosition {
    CandidatePosition {
        candidate_id: CandidateId(candidate.to_string()),
        topic,
        name: format!("Candidate {}", candidate.to_uppercase()),
        party: format!("{candidate} party"),
        position: format!("{} platform on {}", candidate, topic.label()),
        embedding: vector_with_similarity(axis, similarity),
    }
}

pub(super) fn answer(question: &Question, value: f64) -> UserAnswer {
    UserAnswer {
        question_id: question.id.clone(),
        topic: question.topic,
        answer: RawAnswer::Number(value),
        embedding: question.embedding.clone(),
    }
}

pub(super) fn answers_for(questions: &[Question], values: &[f64]) -> Vec<UserAnswer> {
    questions
        .iter()
        .zip(values)
        .map(|(question, value)| answer(question, *value))
        .collect()
}

pub(super) fn engine() -> MatchEngine {
    MatchEngine::new(ScoringConfig::deterministic())
}

pub(super) const TOPICS: [Topic; 3] = [Topic::Economy, Topic::Healthcare, Topic::Environment];

pub(super) fn three_questions() -> Vec<Question> {
    TOPICS
        .iter()
        .enumerate()
        .map(|(axis, topic)| question(&format!("q{}", axis + 1), *topic, axis))
        .collect()
}

fn positions_from(table: &[(&str, [f32; 3])]) -> Vec<CandidatePosition> {
    table
        .iter()
        .flat_map(|(candidate, similarities)| {
            TOPICS
                .iter()
                .enumerate()
                .map(move |(axis, topic)| position(candidate, *topic, axis, similarities[axis]))
        })
        .collect()
}

/// Three specialists, each strongly aligned with exactly one question.
pub(super) fn specialist_positions() -> Vec<CandidatePosition> {
    positions_from(&[
        ("x", [0.9, 0.1, 0.1]),
        ("y", [0.1, 0.9, 0.1]),
        ("z", [0.1, 0.1, 0.9]),
    ])
}

/// Three candidates with clearly separated overall similarity levels.
pub(super) fn graded_positions() -> Vec<CandidatePosition> {
    positions_from(&[
        ("x", [0.9, 0.8, 0.7]),
        ("y", [0.5, 0.4, 0.6]),
        ("z", [0.2, 0.3, 0.1]),
    ])
}

pub(super) fn find<'a>(matches: &'a [CandidateMatch], candidate: &str) -> &'a CandidateMatch {
    matches
        .iter()
        .find(|entry| entry.candidate_id.0 == candidate)
        .unwrap_or_else(|| panic!("candidate {candidate} missing from results"))
}

pub(super) fn assert_bounded(matches: &[CandidateMatch]) {
    for entry in matches {
        assert!(
            entry.score.is_finite() && (0.0..=100.0).contains(&entry.score),
            "score out of range for {}: {}",
            entry.candidate_id,
            entry.score
        );
    }
}

pub(super) fn specialist_service() -> Arc<MatchService<StaticCatalog>> {
    let catalog = StaticCatalog::new(three_questions(), specialist_positions());
    Arc::new(MatchService::new(
        Arc::new(catalog),
        ScoringConfig::deterministic(),
    ))
}

pub(super) async fn read_json_body(response: Response) -> Value {
    let body = axum::body::to_bytes(response.into_body(), 64 * 1024)
        .await
        .expect("read body");
    serde_json::from_slice(&body).expect("json payload")
}
