use std::time::Duration;

use thiserror::Error;

use crate::constants;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("API keys are missing! Set {} in the environment or a .env file.", .0.join(" and "))]
    MissingKeys(Vec<&'static str>),
}

/// Resolved runtime settings for both external services.
#[derive(Debug, Clone)]
pub struct Config {
    pub groq_api_key: String,
    pub nasa_api_key: String,
    pub groq_base_url: String,
    pub model: String,
    pub nasa_feed_url: String,
    pub timeout: Duration,
}

impl Config {
    /// Builds a config from optional keys. A key that is absent or blank is
    /// reported; both are checked before failing so the message names all of them.
    pub fn from_keys(
        groq_api_key: Option<String>,
        nasa_api_key: Option<String>,
    ) -> Result<Self, ConfigError> {
        let groq = groq_api_key.filter(|k| !k.trim().is_empty());
        let nasa = nasa_api_key.filter(|k| !k.trim().is_empty());

        match (groq, nasa) {
            (Some(groq_api_key), Some(nasa_api_key)) => Ok(Self {
                groq_api_key,
                nasa_api_key,
                groq_base_url: constants::GROQ_BASE_URL.clone(),
                model: constants::GROQ_MODEL.clone(),
                nasa_feed_url: constants::NASA_FEED_URL.clone(),
                timeout: Duration::from_secs(constants::DEFAULT_TIMEOUT_SECS),
            }),
            (groq, nasa) => {
                let mut missing = Vec::new();
                if groq.is_none() {
                    missing.push("GROQ_API_KEY");
                }
                if nasa.is_none() {
                    missing.push("NASA_API_KEY");
                }
                Err(ConfigError::MissingKeys(missing))
            }
        }
    }

    pub fn with_groq_base_url(mut self, url: impl Into<String>) -> Self {
        self.groq_base_url = url.into();
        self
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    pub fn with_nasa_feed_url(mut self, url: impl Into<String>) -> Self {
        self.nasa_feed_url = url.into();
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}
