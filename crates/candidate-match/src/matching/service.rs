use std::sync::Arc;

use tracing::info;

use super::catalog::{CandidateCatalog, CatalogError};
use super::config::ScoringConfig;
use super::engine::{MatchEngine, MatchError};
use super::intake::{IntakeError, IntakeGuard, UserAnswerRecord};
use super::report::MatchReport;

/// Service composing the catalog, intake guard and scoring engine.
pub struct MatchService<C> {
    catalog: Arc<C>,
    guard: IntakeGuard,
    engine: Arc<MatchEngine>,
}

impl<C> MatchService<C>
where
    C: CandidateCatalog + 'static,
{
    pub fn new(catalog: Arc<C>, config: ScoringConfig) -> Self {
        Self {
            catalog,
            guard: IntakeGuard::new(),
            engine: Arc::new(MatchEngine::new(config)),
        }
    }

    pub fn engine(&self) -> &MatchEngine {
        &self.engine
    }

    pub fn catalog(&self) -> &C {
        &self.catalog
    }

    /// Validate submitted answers and rank every catalog candidate against them.
    pub fn match_answers(
        &self,
        records: Vec<UserAnswerRecord>,
    ) -> Result<MatchReport, MatchServiceError> {
        let questions = self.catalog.questions()?;
        let positions = self.catalog.positions()?;
        let answers = self.guard.answers(records, &questions)?;

        let matches = self.engine.rank(&questions, &positions, &answers)?;
        if let Some(leader) = matches.first() {
            info!(
                answers = answers.len(),
                candidates = matches.len(),
                leader = %leader.candidate_id,
                score = leader.score,
                "quiz ranked"
            );
        }

        Ok(MatchReport::new(answers.len(), matches))
    }
}

/// Error raised by the match service.
#[derive(Debug, thiserror::Error)]
pub enum MatchServiceError {
    #[error(transparent)]
    Intake(#[from] IntakeError),
    #[error(transparent)]
    Catalog(#[from] CatalogError),
    #[error(transparent)]
    Match(#[from] MatchError),
}
