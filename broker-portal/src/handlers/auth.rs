use crate::error::PortalError;
use crate::handlers::render;
use crate::models::{PortalSession, RequestToken};
use crate::AppState;
use askama::Template;
use axum::{
    extract::{RawQuery, State},
    response::{Html, IntoResponse, Redirect, Response},
};

#[derive(Template)]
#[template(path = "logged_out.html")]
pub struct LoggedOutTemplate {}

/// Callback parameters from the vendor's hosted login.
#[derive(Debug, Default)]
pub struct LoginParams {
    pub request_id: Option<String>,
    /// Older `requestId` spelling, still sent by some vendor configurations.
    pub legacy_request_id: Option<String>,
}

impl LoginParams {
    /// The first occurrence of each parameter is used; repeats are ignored.
    pub fn from_query(query: Option<&str>) -> Self {
        let pairs: Vec<(String, String)> = query
            .and_then(|query| serde_urlencoded::from_str(query).ok())
            .unwrap_or_default();
        let first = |name: &str| {
            pairs
                .iter()
                .find(|(key, _)| key == name)
                .map(|(_, value)| value.clone())
        };

        Self {
            request_id: first("request_id"),
            legacy_request_id: first("requestId"),
        }
    }

    /// `request_id` wins when both spellings are present.
    pub fn token(&self) -> Option<RequestToken> {
        if let Some(token) = self.request_id.as_deref().and_then(RequestToken::parse) {
            return Some(token);
        }

        let token = self
            .legacy_request_id
            .as_deref()
            .and_then(RequestToken::parse)?;
        tracing::warn!("Login callback used deprecated `requestId` parameter");
        Some(token)
    }
}

/// Complete the vendor login handshake, or start it when no token came back.
pub async fn login_handler(
    State(state): State<AppState>,
    session: PortalSession,
    RawQuery(query): RawQuery,
) -> Result<Response, PortalError> {
    let params = LoginParams::from_query(query.as_deref());
    let Some(token) = params.token() else {
        tracing::info!("No request token on login, redirecting to broker login");
        return Ok(Redirect::to(&state.login.vendor_login_url()).into_response());
    };

    if state.login.verify_login {
        let account = state
            .gateway
            .open(&token)
            .await
            .map_err(PortalError::Authentication)?;

        tracing::debug!(metadata = %account.metadata().0, "Broker session verified");
    }

    session.store_token(token).await?;
    tracing::info!("User logged in successfully");

    Ok(Redirect::to("/").into_response())
}

pub async fn logout_handler(session: PortalSession) -> Result<Html<String>, PortalError> {
    session.clear_token().await?;
    tracing::info!("User logged out");

    render(&LoggedOutTemplate {})
}
