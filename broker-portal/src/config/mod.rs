use secrecy::{ExposeSecret, Secret};
use serde::Deserialize;
use service_core::config::ConfigLoader;
use service_core::error::AppError;

/// Minimum length of the cookie-signing secret, in bytes.
pub const MIN_SESSION_SECRET_LEN: usize = 32;

#[derive(Deserialize, Clone)]
pub struct PortalSettings {
    pub server: ServerSettings,
    pub vendor: VendorSettings,
    #[serde(default)]
    pub telemetry: TelemetrySettings,
}

#[derive(Deserialize, Clone)]
pub struct ServerSettings {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
    /// Externally visible URL of this portal, used to build the vendor callback.
    pub base_url: String,
    pub session_secret: Secret<String>,
    #[serde(default)]
    pub secure_cookies: bool,
    /// Unset keeps the cookie for the browser session only.
    #[serde(default)]
    pub session_idle_hours: Option<i64>,
}

#[derive(Deserialize, Clone)]
pub struct VendorSettings {
    pub api_key: String,
    pub api_secret: Secret<String>,
    /// Hosted login page the user is sent to when no token is present.
    #[serde(default = "default_login_url")]
    pub login_url: String,
    /// Root of the vendor REST API.
    #[serde(default = "default_api_url")]
    pub api_url: String,
    /// Exchange the request token once at login before storing it.
    #[serde(default = "default_verify_login")]
    pub verify_login: bool,
    /// No timeout when unset.
    #[serde(default)]
    pub request_timeout_secs: Option<u64>,
}

#[derive(Deserialize, Clone)]
pub struct TelemetrySettings {
    #[serde(default = "default_log_level")]
    pub log_level: String,
    #[serde(default)]
    pub otlp_endpoint: Option<String>,
}

impl Default for TelemetrySettings {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
            otlp_endpoint: None,
        }
    }
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8080
}

fn default_login_url() -> String {
    "https://www.nuvamawealth.com/api-connect/login".to_string()
}

fn default_api_url() -> String {
    "https://www.nuvamawealth.com/api-connect/api".to_string()
}

fn default_verify_login() -> bool {
    true
}

fn default_log_level() -> String {
    "info".to_string()
}

/// Vendor API credentials, fixed for the life of the process.
#[derive(Clone)]
pub struct Credentials {
    pub api_key: String,
    pub api_secret: Secret<String>,
}

impl PortalSettings {
    /// Load from `broker-portal/config/base.yaml`, the legacy `NUVAMA_*`
    /// variables and `APP_*` overrides, then validate.
    pub fn load() -> Result<Self, AppError> {
        let settings: PortalSettings = ConfigLoader::new("broker-portal")
            .with_env_alias("vendor.api_key", "NUVAMA_API_KEY")
            .with_env_alias("vendor.api_secret", "NUVAMA_API_SECRET")
            .load()?;

        settings.validate()?;
        Ok(settings)
    }

    /// Reject settings the portal cannot serve a single request with.
    pub fn validate(&self) -> Result<(), AppError> {
        let mut missing = Vec::new();

        if self.vendor.api_key.trim().is_empty() {
            missing.push("vendor.api_key");
        }
        if self.vendor.api_secret.expose_secret().trim().is_empty() {
            missing.push("vendor.api_secret");
        }
        if self.server.base_url.trim().is_empty() {
            missing.push("server.base_url");
        }

        if !missing.is_empty() {
            return Err(AppError::ConfigError(anyhow::anyhow!(
                "missing required settings: {}",
                missing.join(", ")
            )));
        }

        if self.server.session_secret.expose_secret().len() < MIN_SESSION_SECRET_LEN {
            return Err(AppError::ConfigError(anyhow::anyhow!(
                "server.session_secret must be at least {} bytes",
                MIN_SESSION_SECRET_LEN
            )));
        }

        Ok(())
    }

    pub fn credentials(&self) -> Credentials {
        Credentials {
            api_key: self.vendor.api_key.clone(),
            api_secret: self.vendor.api_secret.clone(),
        }
    }

    /// Callback the vendor redirects back to after login.
    pub fn callback_url(&self) -> String {
        format!("{}/login", self.server.base_url.trim_end_matches('/'))
    }

    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }
}
