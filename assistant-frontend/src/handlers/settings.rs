use crate::models::settings::{QueryConfig, DEFAULT_SYSTEM_PROMPT};
use crate::AppState;
use assistant_core::error::AppError;
use axum::{extract::State, Json};
use validator::Validate;

pub async fn get_settings(State(state): State<AppState>) -> Json<QueryConfig> {
    Json(state.query_config.read().await.clone())
}

/// Replace the query configuration. Ranges mirror the original input
/// widgets; out-of-range values are rejected rather than clamped.
pub async fn update_settings(
    State(state): State<AppState>,
    Json(body): Json<QueryConfig>,
) -> Result<Json<QueryConfig>, AppError> {
    body.validate()?;

    *state.query_config.write().await = body.clone();
    tracing::info!(model = %body.model, top_k = body.top_k, "Updated query configuration");

    Ok(Json(body))
}

pub async fn reset_prompt(State(state): State<AppState>) -> Json<QueryConfig> {
    let mut config = state.query_config.write().await;
    config.system_prompt = DEFAULT_SYSTEM_PROMPT.to_string();
    Json(config.clone())
}
