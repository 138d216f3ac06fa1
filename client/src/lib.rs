//! Marketplace API client
//!
//! Thin wrappers around the two remote endpoints (`/auth` and
//! `/freelancers`) plus the session context that carries the access token
//! between them.

pub mod auth;
pub mod config;
pub mod error;
pub mod freelancers;
pub mod session;

pub use auth::{AuthClient, Authenticator, Credentials};
pub use config::ApiConfig;
pub use error::{AuthError, ConfigError, FetchError, SessionError};
pub use freelancers::{FreelancerClient, FreelancerQuery, FreelancerSource};
pub use session::{FileStore, KeyValueStore, MemoryStore, Session, SessionStore};

#[cfg(feature = "mock")]
pub use auth::MockAuthenticator;
#[cfg(feature = "mock")]
pub use freelancers::MockFreelancerSource;

/// Pulls `message` out of a JSON error body, falling back to `fallback` when
/// the body is not JSON or the message is missing or empty.
pub(crate) fn error_message(body: &str, fallback: &str) -> String {
    #[derive(serde::Deserialize)]
    struct ErrorBody {
        message: Option<String>,
    }

    serde_json::from_str::<ErrorBody>(body)
        .ok()
        .and_then(|b| b.message)
        .filter(|m| !m.is_empty())
        .unwrap_or_else(|| fallback.to_string())
}
