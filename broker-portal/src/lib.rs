pub mod config;
pub mod error;
pub mod handlers;
pub mod models;
pub mod services;
pub mod startup;

use crate::config::PortalSettings;
use crate::services::{AccountGateway, BrokerConnector};
use metrics_exporter_prometheus::PrometheusHandle;
use std::sync::Arc;

/// Shared application state handed to every handler.
#[derive(Clone)]
pub struct AppState {
    pub gateway: AccountGateway,
    pub login: Arc<LoginEntry>,
    pub metrics: Option<PrometheusHandle>,
}

impl AppState {
    pub fn new(settings: &PortalSettings, connector: Arc<dyn BrokerConnector>) -> Self {
        Self {
            gateway: AccountGateway::new(settings.credentials(), connector),
            login: Arc::new(LoginEntry {
                login_url: settings.vendor.login_url.clone(),
                api_key: settings.vendor.api_key.clone(),
                callback_url: settings.callback_url(),
                verify_login: settings.vendor.verify_login,
            }),
            metrics: None,
        }
    }

    pub fn with_metrics(mut self, handle: PrometheusHandle) -> Self {
        self.metrics = Some(handle);
        self
    }
}

/// Where and how visitors are sent to the vendor's hosted login.
pub struct LoginEntry {
    pub login_url: String,
    pub api_key: String,
    pub callback_url: String,
    pub verify_login: bool,
}

impl LoginEntry {
    /// `<login_url>?api_key=<KEY>&redirect_uri=<BASE_URL>/login`
    pub fn vendor_login_url(&self) -> String {
        let query = serde_urlencoded::to_string([
            ("api_key", self.api_key.as_str()),
            ("redirect_uri", self.callback_url.as_str()),
        ])
        .unwrap_or_default();

        let separator = if self.login_url.contains('?') { '&' } else { '?' };
        format!("{}{}{}", self.login_url, separator, query)
    }
}
