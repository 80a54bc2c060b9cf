use crate::services::GatewayError;
use askama::Template;
use axum::{
    http::StatusCode,
    response::{Html, IntoResponse, Response},
};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum PortalError {
    /// The vendor refused the request token during login.
    #[error("{0}")]
    Authentication(GatewayError),

    /// A vendor query failed while serving an account page.
    #[error("{0}")]
    Upstream(GatewayError),

    #[error("Session error: {0}")]
    Session(#[from] tower_sessions::session::Error),

    #[error("Template error: {0}")]
    Render(#[from] askama::Error),
}

impl PortalError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            PortalError::Authentication(_) => StatusCode::UNAUTHORIZED,
            PortalError::Upstream(_) | PortalError::Session(_) | PortalError::Render(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    fn heading(&self) -> &'static str {
        match self {
            PortalError::Authentication(_) => "Login failed",
            PortalError::Upstream(_) => "Broker request failed",
            PortalError::Session(_) | PortalError::Render(_) => "Something went wrong",
        }
    }
}

#[derive(Template)]
#[template(path = "error.html")]
struct ErrorTemplate<'a> {
    heading: &'a str,
    message: String,
}

impl IntoResponse for PortalError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let template = ErrorTemplate {
            heading: self.heading(),
            message: self.to_string(),
        };

        match template.render() {
            Ok(body) => (status, Html(body)).into_response(),
            Err(e) => {
                tracing::error!(error = %e, "Failed to render error page");
                (status, self.to_string()).into_response()
            }
        }
    }
}
