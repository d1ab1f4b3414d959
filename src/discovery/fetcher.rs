//! Bindings document fetching.
//!
//! # Responsibilities
//! - Fetch a service's bindings JSON from its resolved URL
//! - Enforce the per-service timeout
//! - Map every failure mode into a per-service error, never a panic
//!
//! # Design Decisions
//! - Unresolved endpoints fail immediately without touching the network
//! - Single attempt per aggregation cycle; the cache TTL decides when a
//!   failed service is tried again
//! - JSON parse failures are the same error category as transport failures

use std::time::Duration;

use serde_json::Value;
use thiserror::Error;

use crate::discovery::resolver::{Resolution, ResolvedEndpoint};

/// Why a bindings fetch produced no data.
#[derive(Debug, Error)]
pub enum FetchError {
    /// The resolver could not derive a URL from the environment.
    #[error("{0}")]
    Unresolved(String),

    /// The service answered with a non-2xx status.
    #[error("upstream returned HTTP {status} from {url}")]
    Status { url: String, status: u16 },

    /// The request failed at the transport level, or the body was not JSON.
    #[error("request to {url} failed: {message}")]
    Transport { url: String, message: String },

    /// The fetch exceeded the configured per-service timeout.
    #[error("bindings fetch from {url} timed out after {seconds}s")]
    Timeout { url: String, seconds: u64 },
}

/// Outcome of one fetch attempt for one service.
#[derive(Debug)]
pub struct ServiceFetchResult {
    /// Service key the result belongs to.
    pub key: String,
    /// The URL that was (or would have been) fetched.
    pub url: Option<String>,
    /// Bindings document, or the per-service failure.
    pub outcome: Result<Value, FetchError>,
}

/// Fetches bindings documents over HTTP.
pub struct BindingsFetcher {
    client: reqwest::Client,
}

impl BindingsFetcher {
    /// Create a fetcher with a fresh HTTP client.
    ///
    /// Bindings URLs point at internal services, so proxy environment
    /// variables are ignored.
    pub fn new() -> Self {
        Self {
            client: reqwest::Client::builder()
                .no_proxy()
                .build()
                .expect("failed to build bindings HTTP client"),
        }
    }

    /// Fetch the bindings document for a resolved endpoint.
    ///
    /// Never returns an error at the call level; failures are carried in
    /// the result so the aggregator can degrade per service.
    pub async fn fetch(&self, endpoint: &ResolvedEndpoint, timeout: Duration) -> ServiceFetchResult {
        let url = match &endpoint.resolution {
            Resolution::Url(url) => url.clone(),
            Resolution::Unresolved { reason } => {
                return ServiceFetchResult {
                    key: endpoint.key.clone(),
                    url: None,
                    outcome: Err(FetchError::Unresolved(reason.clone())),
                };
            }
        };

        let outcome = match tokio::time::timeout(timeout, self.get_json(&url)).await {
            Ok(result) => result,
            Err(_) => Err(FetchError::Timeout {
                url: url.clone(),
                seconds: timeout.as_secs(),
            }),
        };

        ServiceFetchResult {
            key: endpoint.key.clone(),
            url: Some(url),
            outcome,
        }
    }

    async fn get_json(&self, url: &str) -> Result<Value, FetchError> {
        let response = self
            .client
            .get(url)
            .header(reqwest::header::ACCEPT, "application/json")
            .send()
            .await
            .map_err(|e| FetchError::Transport {
                url: url.to_string(),
                message: e.to_string(),
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        response.json::<Value>().await.map_err(|e| FetchError::Transport {
            url: url.to_string(),
            message: e.to_string(),
        })
    }
}

impl Default for BindingsFetcher {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_unresolved_endpoint_fails_without_network() {
        let fetcher = BindingsFetcher::new();
        let endpoint = ResolvedEndpoint {
            key: "users".to_string(),
            resolution: Resolution::Unresolved {
                reason: "neither A nor B is set".to_string(),
            },
        };

        let result = fetcher.fetch(&endpoint, Duration::from_secs(5)).await;

        assert_eq!(result.key, "users");
        assert!(result.url.is_none());
        match result.outcome {
            Err(FetchError::Unresolved(reason)) => {
                assert_eq!(reason, "neither A nor B is set");
            }
            other => panic!("expected unresolved error, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_connection_refused_is_transport_error() {
        let fetcher = BindingsFetcher::new();
        // Port 1 on localhost is assumed closed.
        let endpoint = ResolvedEndpoint {
            key: "deals".to_string(),
            resolution: Resolution::Url("http://127.0.0.1:1/.well-known/bindings".to_string()),
        };

        let result = fetcher.fetch(&endpoint, Duration::from_secs(5)).await;

        assert_eq!(result.url.as_deref(), Some("http://127.0.0.1:1/.well-known/bindings"));
        assert!(matches!(result.outcome, Err(FetchError::Transport { .. })));
    }
}
