use std::time::Duration;

use reqwest::Client;

use crate::error::ConfigError;

/// Environment variable holding the marketplace API base URL.
pub const API_URL_VAR: &str = "API_URL";

#[derive(Debug, Clone, PartialEq)]
pub struct ApiConfig {
    base_url: String,
    /// No timeout unless set; a hung request only blocks its own caller.
    timeout: Option<Duration>,
}

impl ApiConfig {
    pub fn new(base_url: &str) -> Result<Self, ConfigError> {
        let trimmed = base_url.trim().trim_end_matches('/');
        if !(trimmed.starts_with("http://") || trimmed.starts_with("https://")) {
            return Err(ConfigError::InvalidUrl(base_url.to_string()));
        }
        Ok(Self {
            base_url: trimmed.to_string(),
            timeout: None,
        })
    }

    pub fn from_env() -> Result<Self, ConfigError> {
        let url = std::env::var(API_URL_VAR).map_err(|_| ConfigError::MissingVar(API_URL_VAR))?;
        Self::new(&url)
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    pub fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    pub(crate) fn http_client(&self) -> Client {
        let mut builder = Client::builder();
        if let Some(timeout) = self.timeout {
            builder = builder.timeout(timeout);
        }
        builder.build().unwrap_or_default()
    }
}
