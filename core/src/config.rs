use figment::{
    providers::{Env, Format, Serialized, Yaml},
    Figment,
};
use serde::{Deserialize, Serialize};

use crate::error::ApiError;

pub const DEFAULT_BASE_URL: &str = "https://petfriends.skillfactory.ru";

/// Where the service lives and which account the suite logs in with.
///
/// Loaded in priority order (lowest to highest):
/// 1. Struct defaults
/// 2. petfriends.yaml (if it exists)
/// 3. Environment variables with the PETFRIENDS_ prefix
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Settings {
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Account email (required, no compiled-in default).
    #[serde(default)]
    pub valid_email: String,

    /// Account password (required, no compiled-in default).
    #[serde(default)]
    pub valid_password: String,
}

fn default_base_url() -> String {
    DEFAULT_BASE_URL.to_string()
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            valid_email: String::new(),
            valid_password: String::new(),
        }
    }
}

impl Settings {
    /// # Errors
    /// Returns an error if a source cannot be parsed or the result is invalid.
    pub fn load() -> Result<Self, ApiError> {
        Self::load_from("petfriends.yaml")
    }

    /// Load with a custom YAML file path.
    ///
    /// # Errors
    /// Returns an error if a source cannot be parsed or the result is invalid.
    pub fn load_from(yaml_path: &str) -> Result<Self, ApiError> {
        let settings: Self = Figment::new()
            .merge(Serialized::defaults(Self::default()))
            .merge(Yaml::file(yaml_path))
            .merge(Env::prefixed("PETFRIENDS_"))
            .extract()?;

        settings.validate()?;
        tracing::debug!(base_url = %settings.base_url, "settings loaded");
        Ok(settings)
    }

    /// # Errors
    /// Returns an error naming the first invalid value.
    pub fn validate(&self) -> Result<(), ApiError> {
        if self.valid_email.is_empty() {
            return Err(ApiError::Config(
                "valid_email is required. Set PETFRIENDS_VALID_EMAIL or configure it in petfriends.yaml.".into(),
            ));
        }
        if self.valid_password.is_empty() {
            return Err(ApiError::Config(
                "valid_password is required. Set PETFRIENDS_VALID_PASSWORD or configure it in petfriends.yaml.".into(),
            ));
        }
        if !self.base_url.starts_with("http://") && !self.base_url.starts_with("https://") {
            return Err(ApiError::Config(format!(
                "base_url '{}' must start with http:// or https://",
                self.base_url
            )));
        }
        Ok(())
    }
}
