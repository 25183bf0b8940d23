//! Request handlers for the ask pipeline.

use crate::db::{self, Row};
use crate::server::AppState;
use crate::types::error::ServiceError;
use crate::{extract, rules};
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

#[derive(Debug, Deserialize)]
pub struct AskRequest {
    pub question: String,
}

#[derive(Debug, Serialize)]
pub struct AskResponse {
    pub question: String,
    pub generated_sql: String,
    pub results: Vec<Row>,
    pub method: &'static str,
}

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub model_loaded: bool,
}

#[derive(Debug, Serialize)]
pub struct SchemaResponse {
    pub schema: String,
}

impl IntoResponse for ServiceError {
    fn into_response(self) -> Response {
        let status = StatusCode::from_u16(self.status_code())
            .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        let body = Json(serde_json::json!({ "error": self.to_string() }));
        (status, body).into_response()
    }
}

/// Answer a natural-language question.
///
/// Rules run first; only on no match does the model generate, with the SQL
/// candidate extracted from its free-text output. Either way the candidate
/// executes as-is against the database.
pub async fn ask(
    State(state): State<Arc<AppState>>,
    Json(request): Json<AskRequest>,
) -> Result<Json<AskResponse>, ServiceError> {
    // The readiness gate applies even to questions a rule would answer.
    if !state.model_loaded().await {
        return Err(ServiceError::ModelNotReady);
    }

    let db_path = &state.config.database_path;

    let (sql, method) = match rules::rule_based_sql(&request.question) {
        Some(sql) => {
            tracing::info!(question = %request.question, sql = %sql, "using rule-based SQL");
            (sql, "rule-based")
        }
        None => {
            let schema = db::schema_text(db_path)?;

            let guard = state.generator.read().await;
            let generator = guard.as_ref().ok_or(ServiceError::ModelNotReady)?;
            let generated = generator.generate(&request.question, &schema).await?;
            tracing::debug!(generated = %generated, "model output");

            let sql = extract::extract_sql(&generated);
            tracing::info!(question = %request.question, sql = %sql, "using model-generated SQL");
            (sql, "model-generated")
        }
    };

    if sql.len() < 5 {
        return Err(ServiceError::NoSqlDerived);
    }

    let results = db::execute(db_path, &sql)?;

    Ok(Json(AskResponse {
        question: request.question,
        generated_sql: sql,
        results,
        method,
    }))
}

/// Service health and model readiness.
pub async fn health(State(state): State<Arc<AppState>>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        model_loaded: state.model_loaded().await,
    })
}

/// The table definitions the model is prompted with.
pub async fn schema(
    State(state): State<Arc<AppState>>,
) -> Result<Json<SchemaResponse>, ServiceError> {
    let schema = db::schema_text(&state.config.database_path)?;
    Ok(Json(SchemaResponse { schema }))
}
