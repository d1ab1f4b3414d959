//! Config aggregation with caching.
//!
//! # Responsibilities
//! - Serve the aggregated bindings document, from cache when fresh
//! - Fan out to every configured service concurrently on a miss
//! - Partition per-service successes and failures, never failing outright
//!
//! # Design Decisions
//! - Settle-all join: the aggregate composes once every fetch settled,
//!   and a single failing service never aborts the others
//! - Partial aggregates are cached like complete ones; callers detect
//!   degradation through the errors list
//! - Fan-out latency is bounded by the slowest service, itself bounded
//!   by the per-service timeout

use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::{Duration, Instant, SystemTime, UNIX_EPOCH};

use arc_swap::ArcSwap;
use futures_util::future::join_all;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::config::schema::GatewayConfig;
use crate::discovery::cache::ConfigCache;
use crate::discovery::fetcher::BindingsFetcher;
use crate::discovery::resolver::{resolve, EnvLookup};
use crate::observability::metrics;

/// The aggregated bindings document served under /api/config.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AggregatedConfig {
    /// Bindings per service key, successful fetches only.
    pub services: BTreeMap<String, Value>,

    /// Aggregation metadata.
    pub meta: AggregationMeta,

    /// Per-service failures, in service configuration order.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub errors: Vec<ServiceError>,
}

/// Metadata recorded for every aggregation cycle.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AggregationMeta {
    /// When the aggregate was composed, unix epoch milliseconds.
    pub fetched_at: u64,

    /// Resolved bindings URL per service key; null when unresolved.
    pub sources: BTreeMap<String, Option<String>>,
}

/// A single service's failure within an otherwise valid aggregate.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServiceError {
    /// Service key the error belongs to.
    pub key: String,
    /// Human-readable failure description.
    pub message: String,
}

/// Aggregates per-service bindings behind a TTL cache.
pub struct ConfigAggregator {
    config: Arc<ArcSwap<GatewayConfig>>,
    cache: ConfigCache,
    fetcher: BindingsFetcher,
    env: EnvLookup,
}

impl ConfigAggregator {
    /// Create an aggregator reading service descriptors from the shared config.
    pub fn new(config: Arc<ArcSwap<GatewayConfig>>, env: EnvLookup) -> Self {
        Self {
            config,
            cache: ConfigCache::new(),
            fetcher: BindingsFetcher::new(),
            env,
        }
    }

    /// The cache owned by this aggregator.
    pub fn cache(&self) -> &ConfigCache {
        &self.cache
    }

    /// Return the aggregated config, fetching on a cache miss.
    ///
    /// A hit performs zero I/O. On a miss every configured service is
    /// resolved and fetched concurrently; the fresh aggregate is cached
    /// with `expires_at = now + ttl` before it is returned.
    pub async fn get(&self, now: Instant) -> Arc<AggregatedConfig> {
        if let Some(cached) = self.cache.get(now) {
            metrics::record_config_cache(true);
            tracing::debug!("Serving aggregated config from cache");
            return cached;
        }
        metrics::record_config_cache(false);

        let config = self.config.load();
        let ttl = Duration::from_secs(config.cache.ttl_secs);
        let timeout = Duration::from_secs(config.upstream.bindings_timeout_secs);

        let endpoints: Vec<_> = config
            .services
            .iter()
            .map(|descriptor| resolve(descriptor, &*self.env))
            .collect();

        tracing::debug!(services = endpoints.len(), "Aggregating service bindings");

        let results = join_all(
            endpoints
                .iter()
                .map(|endpoint| self.fetcher.fetch(endpoint, timeout)),
        )
        .await;

        let mut services = BTreeMap::new();
        let mut sources = BTreeMap::new();
        let mut errors = Vec::new();

        for result in results {
            sources.insert(result.key.clone(), result.url.clone());
            match result.outcome {
                Ok(data) => {
                    metrics::record_bindings_fetch(&result.key, true);
                    services.insert(result.key, data);
                }
                Err(e) => {
                    metrics::record_bindings_fetch(&result.key, false);
                    tracing::warn!(
                        service = %result.key,
                        error = %e,
                        "Bindings fetch failed"
                    );
                    errors.push(ServiceError {
                        key: result.key,
                        message: e.to_string(),
                    });
                }
            }
        }

        let aggregated = Arc::new(AggregatedConfig {
            services,
            meta: AggregationMeta {
                fetched_at: epoch_millis(),
                sources,
            },
            errors,
        });

        self.cache.set(aggregated.clone(), now + ttl);

        aggregated
    }
}

fn epoch_millis() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_millis() as u64
}
