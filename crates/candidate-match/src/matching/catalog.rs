use std::collections::BTreeSet;
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

use serde::{Deserialize, Serialize};

use super::domain::{CandidateId, CandidatePosition, Question, Topic};
use super::intake::{CandidatePositionRecord, IntakeError, IntakeGuard, QuestionRecord};

/// Storage abstraction supplying the read-only question and position snapshots.
pub trait CandidateCatalog: Send + Sync {
    fn questions(&self) -> Result<Vec<Question>, CatalogError>;
    fn positions(&self) -> Result<Vec<CandidatePosition>, CatalogError>;
}

/// Error enumeration for catalog failures.
#[derive(Debug, thiserror::Error)]
pub enum CatalogError {
    #[error("catalog unavailable: {0}")]
    Unavailable(String),
    #[error("catalog io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("catalog document is not valid JSON: {0}")]
    Parse(#[from] serde_json::Error),
    #[error(transparent)]
    Invalid(#[from] IntakeError),
}

/// On-disk catalog layout: raw rows exactly as the offline pipeline exports them.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CatalogDocument {
    #[serde(default)]
    pub questions: Vec<QuestionRecord>,
    #[serde(default)]
    pub positions: Vec<CandidatePositionRecord>,
}

/// Counts surfaced by the catalog summary endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CatalogSummary {
    pub question_count: usize,
    pub candidate_count: usize,
    pub topics: Vec<Topic>,
}

/// Validated, immutable catalog held in memory.
#[derive(Debug, Clone, Default)]
pub struct StaticCatalog {
    questions: Vec<Question>,
    positions: Vec<CandidatePosition>,
}

impl StaticCatalog {
    pub fn new(questions: Vec<Question>, positions: Vec<CandidatePosition>) -> Self {
        Self {
            questions,
            positions,
        }
    }

    pub fn from_document(document: CatalogDocument) -> Result<Self, CatalogError> {
        let (questions, positions) =
            IntakeGuard::new().catalog(document.questions, document.positions)?;
        Ok(Self::new(questions, positions))
    }

    pub fn from_reader<R: Read>(reader: R) -> Result<Self, CatalogError> {
        let document: CatalogDocument = serde_json::from_reader(reader)?;
        Self::from_document(document)
    }

    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, CatalogError> {
        let file = File::open(path)?;
        Self::from_reader(BufReader::new(file))
    }

    pub fn summary(&self) -> CatalogSummary {
        let candidates: BTreeSet<&CandidateId> = self
            .positions
            .iter()
            .map(|position| &position.candidate_id)
            .collect();
        let topics: BTreeSet<Topic> = self
            .questions
            .iter()
            .map(|question| question.topic)
            .chain(self.positions.iter().map(|position| position.topic))
            .collect();

        CatalogSummary {
            question_count: self.questions.len(),
            candidate_count: candidates.len(),
            topics: topics.into_iter().collect(),
        }
    }
}

impl CandidateCatalog for StaticCatalog {
    fn questions(&self) -> Result<Vec<Question>, CatalogError> {
        Ok(self.questions.clone())
    }

    fn positions(&self) -> Result<Vec<CandidatePosition>, CatalogError> {
        Ok(self.positions.clone())
    }
}
