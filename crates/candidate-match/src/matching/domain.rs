use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

/// Identifier wrapper for quiz questions.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct QuestionId(pub String);

/// Identifier wrapper for candidates; several position rows share one id.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct CandidateId(pub String);

impl fmt::Display for QuestionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl fmt::Display for CandidateId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Policy areas used to bucket questions and candidate positions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Topic {
    Economy,
    Healthcare,
    Immigration,
    Environment,
    Education,
    Security,
    SocialPolicy,
}

impl Topic {
    pub const ALL: [Topic; 7] = [
        Topic::Economy,
        Topic::Healthcare,
        Topic::Immigration,
        Topic::Environment,
        Topic::Education,
        Topic::Security,
        Topic::SocialPolicy,
    ];

    pub fn label(self) -> &'static str {
        match self {
            Topic::Economy => "Economy",
            Topic::Healthcare => "Healthcare",
            Topic::Immigration => "Immigration",
            Topic::Environment => "Environment",
            Topic::Education => "Education",
            Topic::Security => "Security",
            Topic::SocialPolicy => "Social Policy",
        }
    }

    /// Lenient parse accepting case and separator variants ("Social Policy", "social-policy").
    pub fn from_label(raw: &str) -> Option<Self> {
        let key: String = raw
            .trim()
            .chars()
            .map(|c| match c {
                ' ' | '-' => '_',
                other => other.to_ascii_lowercase(),
            })
            .collect();

        match key.as_str() {
            "economy" => Some(Topic::Economy),
            "healthcare" | "health_care" | "health" => Some(Topic::Healthcare),
            "immigration" => Some(Topic::Immigration),
            "environment" => Some(Topic::Environment),
            "education" => Some(Topic::Education),
            "security" => Some(Topic::Security),
            "social_policy" | "social" => Some(Topic::SocialPolicy),
            _ => None,
        }
    }
}

/// How a question expects to be answered.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "kind")]
pub enum ResponseType {
    /// Ordinal 1..=5 from "strongly disagree" to "strongly agree".
    AgreementScale,
    /// One entry from an ordered option list.
    SpecificChoice { options: Vec<String> },
    /// A type label the engine does not know how to interpret.
    Unrecognized { label: String },
}

/// Immutable quiz question supplied by the catalog.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Question {
    pub id: QuestionId,
    pub topic: Topic,
    pub response_type: ResponseType,
    pub embedding: Vec<f32>,
    pub weight: f64,
}

/// A candidate's documented position on one topic.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CandidatePosition {
    pub candidate_id: CandidateId,
    pub topic: Topic,
    pub name: String,
    pub party: String,
    pub position: String,
    pub embedding: Vec<f32>,
}

/// The value a user picked; numbers for scales, text for choices.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RawAnswer {
    Number(f64),
    Text(String),
}

impl fmt::Display for RawAnswer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RawAnswer::Number(value) => write!(f, "{value}"),
            RawAnswer::Text(value) => f.write_str(value),
        }
    }
}

/// A single answered question for the current session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserAnswer {
    pub question_id: QuestionId,
    pub topic: Topic,
    pub answer: RawAnswer,
    /// Copy of the referenced question's embedding, carried as a cache.
    pub embedding: Vec<f32>,
}

/// Public-facing ranking entry for one candidate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CandidateMatch {
    pub candidate_id: CandidateId,
    pub name: String,
    pub party: String,
    pub score: f64,
    pub matched_positions: usize,
    pub alignment_by_area: BTreeMap<Topic, f64>,
    pub winning_pathway: super::pathways::Pathway,
}
