use crate::AppState;
use axum::{extract::State, response::IntoResponse};
use service_core::error::AppError;

pub async fn metrics(State(state): State<AppState>) -> Result<impl IntoResponse, AppError> {
    let handle = state
        .metrics
        .as_ref()
        .ok_or_else(|| AppError::NotFound(anyhow::anyhow!("metrics recorder not installed")))?;

    Ok((
        [("content-type", "text/plain; charset=utf-8")],
        handle.render(),
    ))
}
