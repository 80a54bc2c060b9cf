pub mod account;
pub mod app;
pub mod auth;
pub mod metrics;

use crate::error::PortalError;
use askama::Template;
use axum::response::Html;

/// Render an askama template into an HTML response body.
pub(crate) fn render<T: Template>(template: &T) -> Result<Html<String>, PortalError> {
    Ok(Html(template.render()?))
}
