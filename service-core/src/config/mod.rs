use crate::error::AppError;
use config::{Config as Cfg, Environment, File};
use serde::de::DeserializeOwned;
use std::path::PathBuf;

/// Layered configuration sources for a service binary.
///
/// Precedence, lowest first: `config/base.yaml` (optional), env aliases,
/// then `APP_`-prefixed environment variables using `__` as the nesting
/// separator (`APP_SERVER__PORT=9000`).
pub struct ConfigLoader {
    service_dir: String,
    overrides: Vec<(String, String)>,
}

impl ConfigLoader {
    pub fn new(service_dir: impl Into<String>) -> Self {
        Self {
            service_dir: service_dir.into(),
            overrides: Vec::new(),
        }
    }

    /// Set `key` from the environment variable `var` when it is present.
    ///
    /// Used for unprefixed variable names that deployments already export.
    /// The `APP_` variable for the same key still wins.
    pub fn with_env_alias(mut self, key: &str, var: &str) -> Self {
        if std::env::var_os(prefixed_variable(key)).is_some() {
            return self;
        }
        if let Ok(value) = std::env::var(var) {
            self.overrides.push((key.to_string(), value));
        }
        self
    }

    /// Resolve the directory holding `base.yaml`, whether the binary runs
    /// from the workspace root or from inside the service crate.
    pub fn configuration_directory(&self) -> Result<PathBuf, AppError> {
        let base_path = std::env::current_dir()?;

        Ok(if base_path.ends_with(&self.service_dir) {
            base_path.join("config")
        } else {
            base_path.join(&self.service_dir).join("config")
        })
    }

    pub fn load<T: DeserializeOwned>(self) -> Result<T, AppError> {
        dotenvy::dotenv().ok();

        let directory = self.configuration_directory()?;
        let mut builder = Cfg::builder()
            .add_source(File::from(directory.join("base.yaml")).required(false));

        for (key, value) in self.overrides {
            builder = builder.set_override(key, value)?;
        }

        let settings = builder
            .add_source(
                Environment::with_prefix("APP")
                    .prefix_separator("_")
                    .separator("__"),
            )
            .build()?;

        Ok(settings.try_deserialize()?)
    }
}

/// `vendor.api_key` -> `APP_VENDOR__API_KEY`
fn prefixed_variable(key: &str) -> String {
    format!("APP_{}", key.replace('.', "__").to_uppercase())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;

    #[derive(Debug, Deserialize)]
    struct AliasSettings {
        #[serde(default)]
        alias: AliasSection,
    }

    #[derive(Debug, Default, Deserialize)]
    struct AliasSection {
        both_set: Option<String>,
        alias_only: Option<String>,
    }

    #[test]
    fn configuration_directory_nests_under_service_dir() {
        let loader = ConfigLoader::new("some-service-that-is-not-cwd");
        let directory = loader.configuration_directory().unwrap();
        assert!(directory.ends_with("some-service-that-is-not-cwd/config"));
    }

    #[test]
    fn missing_alias_variable_adds_no_override() {
        let loader = ConfigLoader::new("svc")
            .with_env_alias("vendor.api_key", "SERVICE_CORE_TEST_UNSET_VARIABLE");
        assert!(loader.overrides.is_empty());
    }

    #[test]
    fn prefixed_variable_nests_with_double_underscore() {
        assert_eq!(prefixed_variable("vendor.api_key"), "APP_VENDOR__API_KEY");
    }

    #[test]
    fn prefixed_environment_beats_alias() {
        unsafe {
            std::env::set_var("SERVICE_CORE_TEST_LEGACY_BOTH", "legacy");
            std::env::set_var("APP_ALIAS__BOTH_SET", "app");
        }

        let settings: AliasSettings = ConfigLoader::new("svc")
            .with_env_alias("alias.both_set", "SERVICE_CORE_TEST_LEGACY_BOTH")
            .load()
            .unwrap();

        assert_eq!(settings.alias.both_set.as_deref(), Some("app"));
    }

    #[test]
    fn alias_applies_when_prefixed_variable_is_unset() {
        unsafe {
            std::env::set_var("SERVICE_CORE_TEST_LEGACY_ONLY", "legacy");
        }

        let settings: AliasSettings = ConfigLoader::new("svc")
            .with_env_alias("alias.alias_only", "SERVICE_CORE_TEST_LEGACY_ONLY")
            .load()
            .unwrap();

        assert_eq!(settings.alias.alias_only.as_deref(), Some("legacy"));
    }
}
