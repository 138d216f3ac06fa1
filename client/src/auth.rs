use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::{error, info};

use crate::config::ApiConfig;
use crate::error::AuthError;
use crate::error_message;

const AUTH_FALLBACK_MESSAGE: &str = "Error in the authentication request";

/// Body of `POST /auth`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Credentials {
    pub email: String,
    pub password: String,
}

impl Credentials {
    pub fn new(email: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            email: email.into(),
            password: password.into(),
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct LoginResponse {
    access_token: String,
}

/// Exchanges credentials for an access token.
#[cfg_attr(feature = "mock", mockall::automock)]
#[async_trait]
pub trait Authenticator: Send + Sync {
    async fn login(&self, credentials: Credentials) -> Result<String, AuthError>;
}

pub struct AuthClient {
    config: ApiConfig,
    http_client: Client,
}

impl AuthClient {
    pub fn new(config: ApiConfig) -> Self {
        let http_client = config.http_client();
        Self {
            config,
            http_client,
        }
    }

    /// POST /auth
    ///
    /// Single attempt; the caller decides whether to let the user retry.
    pub async fn login(&self, credentials: &Credentials) -> Result<String, AuthError> {
        self.request_token(credentials).await.inspect_err(|e| {
            error!(error = %e, email = %credentials.email, "authentication failed");
        })
    }

    async fn request_token(&self, credentials: &Credentials) -> Result<String, AuthError> {
        let url = self.config.url("auth");
        info!(email = %credentials.email, "requesting access token");

        let resp = self.http_client.post(&url).json(credentials).send().await?;

        if !resp.status().is_success() {
            let status = resp.status().as_u16();
            let body = resp.text().await.unwrap_or_default();
            return Err(AuthError::Rejected {
                status,
                message: error_message(&body, AUTH_FALLBACK_MESSAGE),
            });
        }

        // the body is {"accessToken": "..."}; nothing else is kept
        let result: LoginResponse = resp
            .json()
            .await
            .map_err(|e| AuthError::Deserialize(e.to_string()))?;

        Ok(result.access_token)
    }
}

#[async_trait]
impl Authenticator for AuthClient {
    async fn login(&self, credentials: Credentials) -> Result<String, AuthError> {
        AuthClient::login(self, &credentials).await
    }
}
