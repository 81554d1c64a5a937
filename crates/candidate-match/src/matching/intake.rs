use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use tracing::warn;

use super::domain::{
    CandidateId, CandidatePosition, Question, QuestionId, RawAnswer, ResponseType, Topic,
    UserAnswer,
};

/// Loosely typed question row as delivered by the persistence layer.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct QuestionRecord {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub topic: Option<String>,
    #[serde(default, alias = "responseType")]
    pub response_type: Option<String>,
    #[serde(default)]
    pub options: Option<Vec<String>>,
    #[serde(default)]
    pub embedding: Option<Vec<f32>>,
    #[serde(default)]
    pub weight: Option<f64>,
}

/// Loosely typed candidate position row.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CandidatePositionRecord {
    #[serde(default, alias = "candidateId")]
    pub candidate_id: Option<String>,
    #[serde(default)]
    pub topic: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub party: Option<String>,
    #[serde(default)]
    pub position: Option<String>,
    #[serde(default)]
    pub embedding: Option<Vec<f32>>,
}

/// Answer as submitted by the quiz client. Topic and embedding may be omitted and are
/// then taken from the referenced question.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UserAnswerRecord {
    #[serde(default, alias = "questionId")]
    pub question_id: Option<String>,
    #[serde(default)]
    pub topic: Option<String>,
    #[serde(default)]
    pub answer: Option<RawAnswer>,
    #[serde(default)]
    pub embedding: Option<Vec<f32>>,
}

/// Validation errors raised at the input boundary.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum IntakeError {
    #[error("{record} #{index} is missing required field `{field}`")]
    MissingField {
        record: &'static str,
        index: usize,
        field: &'static str,
    },
    #[error("{record} #{index} has unknown topic '{value}'")]
    UnknownTopic {
        record: &'static str,
        index: usize,
        value: String,
    },
    #[error("question {question_id} has invalid weight {weight}")]
    InvalidWeight { question_id: String, weight: f64 },
    #[error("{record} #{index} has an empty embedding")]
    EmptyEmbedding { record: &'static str, index: usize },
    #[error("{record} #{index} embedding has {found} dimensions, expected {expected}")]
    DimensionMismatch {
        record: &'static str,
        index: usize,
        expected: usize,
        found: usize,
    },
}

const QUESTION: &str = "question";
const POSITION: &str = "position";
const ANSWER: &str = "answer";

/// Converts loosely typed records into the typed inputs the engine consumes.
///
/// All embeddings in one catalog must share a dimension; it is taken from the guard
/// when configured and from the first question otherwise.
#[derive(Debug, Clone, Default)]
pub struct IntakeGuard {
    expected_dimension: Option<usize>,
}

impl IntakeGuard {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_dimension(dimension: usize) -> Self {
        Self {
            expected_dimension: Some(dimension),
        }
    }

    pub fn questions(&self, records: Vec<QuestionRecord>) -> Result<Vec<Question>, IntakeError> {
        let mut dimension = self.expected_dimension;
        records
            .into_iter()
            .enumerate()
            .map(|(index, record)| question_from_record(index, record, &mut dimension))
            .collect()
    }

    pub fn positions(
        &self,
        records: Vec<CandidatePositionRecord>,
        dimension: Option<usize>,
    ) -> Result<Vec<CandidatePosition>, IntakeError> {
        let mut dimension = self.expected_dimension.or(dimension);
        records
            .into_iter()
            .enumerate()
            .map(|(index, record)| position_from_record(index, record, &mut dimension))
            .collect()
    }

    /// Validate a full catalog so questions and positions agree on dimension.
    pub fn catalog(
        &self,
        questions: Vec<QuestionRecord>,
        positions: Vec<CandidatePositionRecord>,
    ) -> Result<(Vec<Question>, Vec<CandidatePosition>), IntakeError> {
        let questions = self.questions(questions)?;
        let dimension = questions.first().map(|question| question.embedding.len());
        let positions = self.positions(positions, dimension)?;
        Ok((questions, positions))
    }

    /// Validate submitted answers against the catalog's questions.
    ///
    /// Answers naming an unknown question are kept when they carry a topic (the
    /// engine skips them) and dropped with a warning otherwise.
    pub fn answers(
        &self,
        records: Vec<UserAnswerRecord>,
        questions: &[Question],
    ) -> Result<Vec<UserAnswer>, IntakeError> {
        let by_id: HashMap<&str, &Question> = questions
            .iter()
            .map(|question| (question.id.0.as_str(), question))
            .collect();
        let dimension = self
            .expected_dimension
            .or_else(|| questions.first().map(|question| question.embedding.len()));

        let mut answers = Vec::with_capacity(records.len());
        for (index, record) in records.into_iter().enumerate() {
            let question_id = required(record.question_id, ANSWER, index, "question_id")?;
            let answer = required(record.answer, ANSWER, index, "answer")?;
            let question = by_id.get(question_id.as_str()).copied();

            let topic = match (record.topic, question) {
                (Some(raw), _) => parse_topic(&raw, ANSWER, index)?,
                (None, Some(question)) => question.topic,
                (None, None) => {
                    warn!(question = %question_id, "answer for unknown question without topic dropped");
                    continue;
                }
            };

            let embedding = match (record.embedding, question) {
                (Some(embedding), _) if !embedding.is_empty() => {
                    check_dimension(&embedding, ANSWER, index, dimension)?;
                    embedding
                }
                (_, Some(question)) => question.embedding.clone(),
                (_, None) => Vec::new(),
            };

            answers.push(UserAnswer {
                question_id: QuestionId(question_id),
                topic,
                answer,
                embedding,
            });
        }

        Ok(answers)
    }
}

fn question_from_record(
    index: usize,
    record: QuestionRecord,
    dimension: &mut Option<usize>,
) -> Result<Question, IntakeError> {
    let id = required(record.id, QUESTION, index, "id")?;
    let topic = parse_topic(&required(record.topic, QUESTION, index, "topic")?, QUESTION, index)?;
    let response_type = parse_response_type(
        &required(record.response_type, QUESTION, index, "response_type")?,
        record.options,
    );
    let embedding = required(record.embedding, QUESTION, index, "embedding")?;
    check_embedding(&embedding, QUESTION, index, dimension)?;

    let weight = record.weight.unwrap_or(1.0);
    if !weight.is_finite() || weight < 0.0 {
        return Err(IntakeError::InvalidWeight {
            question_id: id,
            weight,
        });
    }

    Ok(Question {
        id: QuestionId(id),
        topic,
        response_type,
        embedding,
        weight,
    })
}

fn position_from_record(
    index: usize,
    record: CandidatePositionRecord,
    dimension: &mut Option<usize>,
) -> Result<CandidatePosition, IntakeError> {
    let candidate_id = required(record.candidate_id, POSITION, index, "candidate_id")?;
    let topic = parse_topic(&required(record.topic, POSITION, index, "topic")?, POSITION, index)?;
    let name = required(record.name, POSITION, index, "name")?;
    let embedding = required(record.embedding, POSITION, index, "embedding")?;
    check_embedding(&embedding, POSITION, index, dimension)?;

    Ok(CandidatePosition {
        candidate_id: CandidateId(candidate_id),
        topic,
        name,
        party: record.party.unwrap_or_default(),
        position: record.position.unwrap_or_default(),
        embedding,
    })
}

fn required<T>(
    value: Option<T>,
    record: &'static str,
    index: usize,
    field: &'static str,
) -> Result<T, IntakeError> {
    value.ok_or(IntakeError::MissingField {
        record,
        index,
        field,
    })
}

fn parse_topic(raw: &str, record: &'static str, index: usize) -> Result<Topic, IntakeError> {
    Topic::from_label(raw).ok_or_else(|| IntakeError::UnknownTopic {
        record,
        index,
        value: raw.to_string(),
    })
}

fn parse_response_type(raw: &str, options: Option<Vec<String>>) -> ResponseType {
    match raw.trim().to_ascii_lowercase().replace('-', "_").as_str() {
        "agreement_scale" | "agreement" | "scale" | "likert" => ResponseType::AgreementScale,
        "specific_choice" | "choice" | "multiple_choice" => ResponseType::SpecificChoice {
            options: options.unwrap_or_default(),
        },
        _ => ResponseType::Unrecognized {
            label: raw.to_string(),
        },
    }
}

/// Rejects empty embeddings and pins the catalog dimension on first sight.
fn check_embedding(
    embedding: &[f32],
    record: &'static str,
    index: usize,
    dimension: &mut Option<usize>,
) -> Result<(), IntakeError> {
    if embedding.is_empty() {
        return Err(IntakeError::EmptyEmbedding { record, index });
    }
    check_dimension(embedding, record, index, *dimension)?;
    dimension.get_or_insert(embedding.len());
    Ok(())
}

fn check_dimension(
    embedding: &[f32],
    record: &'static str,
    index: usize,
    expected: Option<usize>,
) -> Result<(), IntakeError> {
    match expected {
        Some(expected) if expected != embedding.len() => Err(IntakeError::DimensionMismatch {
            record,
            index,
            expected,
            found: embedding.len(),
        }),
        _ => Ok(()),
    }
}
