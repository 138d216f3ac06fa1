use async_trait::async_trait;
use common::{Freelancer, FreelancerFilter};
use reqwest::Client;
use tracing::{error, info};

use crate::config::ApiConfig;
use crate::error::FetchError;
use crate::error_message;
use crate::session::Session;

const FETCH_FALLBACK_MESSAGE: &str = "Error fetching freelancers";

pub const DEFAULT_PAGE: u32 = 1;
pub const DEFAULT_LIMIT: u32 = 10;

/// Everything one `POST /freelancers` call needs. The token is captured when
/// the query is built, so a later logout does not affect a request already in
/// flight.
#[derive(Debug, Clone, PartialEq)]
pub struct FreelancerQuery {
    pub page: u32,
    pub limit: u32,
    pub filter: FreelancerFilter,
    pub access_token: Option<String>,
}

impl FreelancerQuery {
    pub fn new(filter: FreelancerFilter) -> Self {
        Self {
            page: DEFAULT_PAGE,
            limit: DEFAULT_LIMIT,
            filter,
            access_token: None,
        }
    }

    pub fn with_page(mut self, page: u32, limit: u32) -> Self {
        self.page = page;
        self.limit = limit;
        self
    }

    pub fn with_session(mut self, session: Option<&Session>) -> Self {
        self.access_token = session
            .map(|s| s.access_token.clone())
            .filter(|t| !t.is_empty());
        self
    }
}

/// Anything that can answer a freelancer query.
#[cfg_attr(feature = "mock", mockall::automock)]
#[async_trait]
pub trait FreelancerSource: Send + Sync {
    async fn list_freelancers(&self, query: FreelancerQuery) -> Result<Vec<Freelancer>, FetchError>;
}

pub struct FreelancerClient {
    config: ApiConfig,
    http_client: Client,
}

impl FreelancerClient {
    pub fn new(config: ApiConfig) -> Self {
        let http_client = config.http_client();
        Self {
            config,
            http_client,
        }
    }

    /// POST /freelancers?page=:page&limit=:limit
    ///
    /// Without a token the request goes out unauthenticated and the remote
    /// side is expected to refuse it.
    pub async fn list_freelancers(
        &self,
        query: &FreelancerQuery,
    ) -> Result<Vec<Freelancer>, FetchError> {
        self.send(query).await.inspect_err(|e| {
            error!(error = %e, page = query.page, limit = query.limit, "fetching freelancers failed");
        })
    }

    async fn send(&self, query: &FreelancerQuery) -> Result<Vec<Freelancer>, FetchError> {
        let url = self.config.url("freelancers");
        info!(page = query.page, limit = query.limit, filter = ?query.filter, "fetching freelancers");

        // pagination in the query string, filter as the JSON body
        let mut request = self
            .http_client
            .post(&url)
            .query(&[("page", query.page), ("limit", query.limit)])
            .json(&query.filter);
        if let Some(token) = &query.access_token {
            request = request.bearer_auth(token);
        }

        let resp = request.send().await?;

        // non-2xx: surface the remote message if the body has one
        if !resp.status().is_success() {
            let status = resp.status().as_u16();
            let body = resp.text().await.unwrap_or_default();
            return Err(FetchError::Rejected {
                status,
                message: error_message(&body, FETCH_FALLBACK_MESSAGE),
            });
        }

        let freelancers: Vec<Freelancer> = resp
            .json()
            .await
            .map_err(|e| FetchError::Deserialize(e.to_string()))?;

        info!(count = freelancers.len(), "fetched freelancers");
        Ok(freelancers)
    }
}

#[async_trait]
impl FreelancerSource for FreelancerClient {
    async fn list_freelancers(&self, query: FreelancerQuery) -> Result<Vec<Freelancer>, FetchError> {
        FreelancerClient::list_freelancers(self, &query).await
    }
}
