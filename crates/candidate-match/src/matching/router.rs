use std::sync::Arc;

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Router,
};
use serde::{Deserialize, Serialize};
use serde_json::json;

use super::catalog::{CandidateCatalog, StaticCatalog};
use super::intake::UserAnswerRecord;
use super::service::{MatchService, MatchServiceError};

/// Body accepted by the match endpoint.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MatchRequest {
    #[serde(default)]
    pub answers: Vec<UserAnswerRecord>,
}

/// Router exposing the quiz ranking and catalog summary endpoints.
pub fn match_router(service: Arc<MatchService<StaticCatalog>>) -> Router {
    Router::new()
        .route("/api/v1/matches", post(match_handler::<StaticCatalog>))
        .route("/api/v1/catalog/summary", get(summary_handler))
        .with_state(service)
}

pub(crate) async fn match_handler<C>(
    State(service): State<Arc<MatchService<C>>>,
    axum::Json(request): axum::Json<MatchRequest>,
) -> Response
where
    C: CandidateCatalog + 'static,
{
    match service.match_answers(request.answers) {
        Ok(report) if report.is_empty() => {
            let payload = json!({
                "error": "unable to compute matches for this quiz",
            });
            (StatusCode::UNPROCESSABLE_ENTITY, axum::Json(payload)).into_response()
        }
        Ok(report) => (StatusCode::OK, axum::Json(report)).into_response(),
        Err(MatchServiceError::Intake(error)) => {
            let payload = json!({
                "error": error.to_string(),
            });
            (StatusCode::UNPROCESSABLE_ENTITY, axum::Json(payload)).into_response()
        }
        Err(MatchServiceError::Match(error)) => {
            let payload = json!({
                "error": error.to_string(),
            });
            (StatusCode::UNPROCESSABLE_ENTITY, axum::Json(payload)).into_response()
        }
        Err(other) => {
            let payload = json!({
                "error": other.to_string(),
            });
            (StatusCode::INTERNAL_SERVER_ERROR, axum::Json(payload)).into_response()
        }
    }
}

pub(crate) async fn summary_handler(
    State(service): State<Arc<MatchService<StaticCatalog>>>,
) -> Response {
    (StatusCode::OK, axum::Json(service.catalog().summary())).into_response()
}
