//! Quiz-to-candidate matching: answer normalization, per-candidate bias removal,
//! per-question relative ranking and the multi-pathway final score.
//!
//! The engine itself is a pure function of questions, positions and answers (plus an
//! optional injected random source). Intake, catalog, service and router wrap it for
//! callers holding loosely typed records.

mod assemble;
pub mod baseline;
pub mod catalog;
pub mod config;
pub mod domain;
mod engine;
pub mod intake;
pub(crate) mod jitter;
pub mod normalize;
pub mod pathways;
pub mod ranking;
pub mod report;
pub mod router;
pub mod service;
pub mod similarity;
pub mod stance;

#[cfg(test)]
mod tests;

pub use catalog::{CandidateCatalog, CatalogDocument, CatalogError, CatalogSummary, StaticCatalog};
pub use config::ScoringConfig;
pub use domain::{
    CandidateId, CandidateMatch, CandidatePosition, Question, QuestionId, RawAnswer,
    ResponseType, Topic, UserAnswer,
};
pub use engine::{MatchEngine, MatchError};
pub use intake::{
    CandidatePositionRecord, IntakeError, IntakeGuard, QuestionRecord, UserAnswerRecord,
};
pub use pathways::Pathway;
pub use report::{write_csv, MatchReport, NarrationBrief};
pub use router::{match_router, MatchRequest};
pub use service::{MatchService, MatchServiceError};
pub use similarity::{cosine_similarity, SimilarityError};
