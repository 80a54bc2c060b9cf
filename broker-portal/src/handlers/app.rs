use crate::error::PortalError;
use crate::handlers::{account::open, render};
use crate::models::Authenticated;
use crate::AppState;
use askama::Template;
use axum::{extract::State, response::Html};

#[derive(Template)]
#[template(path = "dashboard.html")]
pub struct DashboardTemplate {
    pub summary: String,
    pub trades: String,
}

/// Account summary and trade history on one page.
pub async fn index(
    State(state): State<AppState>,
    Authenticated(token): Authenticated,
) -> Result<Html<String>, PortalError> {
    let account = open(&state, &token).await?;

    let summary = account.summary().await.map_err(PortalError::Upstream)?;
    let trades = account
        .trade_history()
        .await
        .map_err(PortalError::Upstream)?;

    render(&DashboardTemplate {
        summary: summary.to_display(),
        trades: trades.to_display(),
    })
}

pub async fn health_check() -> &'static str {
    "OK"
}
