use crate::demo::demo_catalog;
use candidate_match::config::CatalogConfig;
use candidate_match::error::AppError;
use candidate_match::matching::{MatchRequest, ScoringConfig, StaticCatalog, UserAnswerRecord};
use metrics_exporter_prometheus::PrometheusHandle;
use serde::Deserialize;
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;
use std::sync::atomic::AtomicBool;
use std::sync::Arc;
use tracing::info;

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
}

/// Catalog named by `MATCH_CATALOG_PATH`, or the built-in demo catalog.
pub(crate) fn load_catalog(config: &CatalogConfig) -> Result<StaticCatalog, AppError> {
    match &config.path {
        Some(path) => {
            let catalog = StaticCatalog::from_path(path)?;
            info!(path = %path.display(), "loaded candidate catalog");
            Ok(catalog)
        }
        None => {
            info!("no catalog path configured; serving the demo catalog");
            Ok(demo_catalog())
        }
    }
}

/// Answer files hold either a bare array of answers or a match request body.
#[derive(Deserialize)]
#[serde(untagged)]
enum AnswersFile {
    Request(MatchRequest),
    Answers(Vec<UserAnswerRecord>),
}

pub(crate) fn read_answers<R: Read>(reader: R) -> Result<Vec<UserAnswerRecord>, AppError> {
    let parsed: AnswersFile = serde_json::from_reader(reader).map_err(std::io::Error::from)?;
    Ok(match parsed {
        AnswersFile::Request(request) => request.answers,
        AnswersFile::Answers(answers) => answers,
    })
}

pub(crate) fn load_answers(path: &Path) -> Result<Vec<UserAnswerRecord>, AppError> {
    read_answers(BufReader::new(File::open(path)?))
}

pub(crate) fn scoring_config(jitter: bool, seed: Option<u64>) -> ScoringConfig {
    if jitter {
        ScoringConfig::with_jitter(seed)
    } else {
        ScoringConfig::deterministic()
    }
}
