//! Log level endpoints.
//!
//! Both answer in plain text and write nothing to the todo channel.

use axum::extract::{rejection::QueryRejection, Query, State};
use serde::Deserialize;

use crate::http::response::ApiError;
use crate::http::server::AppState;
use crate::observability::logging::LoggingError;

#[derive(Debug, Deserialize)]
pub struct LevelParams {
    #[serde(rename = "logger-name")]
    pub logger_name: Option<String>,
    #[serde(rename = "logger-level")]
    pub logger_level: Option<String>,
}

fn level_params(
    query: Result<Query<LevelParams>, QueryRejection>,
) -> Result<LevelParams, ApiError> {
    let Query(params) = query.map_err(|e| LoggingError::InvalidQuery(e.body_text()))?;
    Ok(params)
}

/// `GET /logs/level?logger-name=`
pub async fn get_level(
    State(state): State<AppState>,
    query: Result<Query<LevelParams>, QueryRejection>,
) -> Result<String, ApiError> {
    let params = level_params(query)?;
    let level = state
        .logging
        .get_level(params.logger_name.as_deref().unwrap_or_default())?;
    Ok(format!("result:{}", level))
}

/// `PUT /logs/level?logger-name=&logger-level=`
pub async fn set_level(
    State(state): State<AppState>,
    query: Result<Query<LevelParams>, QueryRejection>,
) -> Result<String, ApiError> {
    let params = level_params(query)?;
    let level = state.logging.set_level(
        params.logger_name.as_deref().unwrap_or_default(),
        params.logger_level.as_deref().unwrap_or_default(),
    )?;
    Ok(format!("result:{}", level))
}
