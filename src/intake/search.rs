//! Lawyer-directory gateway: wraps the external search API and translates
//! transport and quota failures into the typed taxonomy the middleware
//! pattern-matches on.

use async_trait::async_trait;
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use url::Url;

use crate::config::SearchConfig;
use crate::error::{ConfigError, LawyerSearchError};
use crate::types::{LawyerProfile, SearchResult};

#[async_trait]
pub trait LawyerSearch: Send + Sync {
    async fn search(
        &self,
        matter_type: &str,
        location: Option<&str>,
    ) -> Result<SearchResult, LawyerSearchError>;
}

#[derive(Debug, Deserialize)]
struct SearchResponseBody {
    #[serde(default)]
    lawyers: Vec<LawyerProfile>,
    #[serde(default)]
    total: usize,
}

/// HTTP implementation over the public lawyer directory.
#[derive(Debug, Clone)]
pub struct HttpLawyerSearch {
    client: reqwest::Client,
    endpoint: Url,
    api_key: Option<SecretString>,
    timeout: std::time::Duration,
}

impl HttpLawyerSearch {
    pub fn new(config: &SearchConfig) -> Result<Self, ConfigError> {
        let endpoint = config
            .base_url
            .join("lawyers/search")
            .map_err(|e| ConfigError::InvalidValue {
                key: "LAWYER_SEARCH_BASE_URL".to_string(),
                message: e.to_string(),
            })?;
        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| ConfigError::InvalidValue {
                key: "LAWYER_SEARCH_TIMEOUT_SECS".to_string(),
                message: format!("failed to build HTTP client: {e}"),
            })?;
        Ok(Self {
            client,
            endpoint,
            api_key: config.api_key.clone(),
            timeout: config.timeout,
        })
    }
}

#[async_trait]
impl LawyerSearch for HttpLawyerSearch {
    async fn search(
        &self,
        matter_type: &str,
        location: Option<&str>,
    ) -> Result<SearchResult, LawyerSearchError> {
        // Configuration errors never reach the network.
        let api_key = self.api_key.as_ref().ok_or(LawyerSearchError::MissingApiKey)?;

        let mut query: Vec<(&str, &str)> = vec![("matter_type", matter_type)];
        if let Some(location) = location {
            query.push(("location", location));
        }

        let response = self
            .client
            .get(self.endpoint.clone())
            .bearer_auth(api_key.expose_secret())
            .query(&query)
            .timeout(self.timeout)
            .send()
            .await
            .map_err(|err| {
                if err.is_timeout() {
                    LawyerSearchError::Timeout(format!(
                        "lawyer search timed out after {}s",
                        self.timeout.as_secs()
                    ))
                } else {
                    LawyerSearchError::Transport(err.to_string())
                }
            })?;

        let status = response.status();
        if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
            let detail = response.text().await.unwrap_or_default();
            let message = if detail.trim().is_empty() {
                "lawyer search quota exceeded".to_string()
            } else {
                detail.trim().to_string()
            };
            return Err(LawyerSearchError::QuotaExceeded(message));
        }
        if !status.is_success() {
            return Err(LawyerSearchError::Service(format!(
                "lawyer search returned status {status}"
            )));
        }

        let body: SearchResponseBody = response
            .json()
            .await
            .map_err(|e| LawyerSearchError::Service(format!("invalid lawyer search payload: {e}")))?;

        Ok(SearchResult {
            lawyers: body.lawyers,
            total: body.total,
        })
    }
}
