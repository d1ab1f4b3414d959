//! Service discovery subsystem.
//!
//! # Data Flow
//! ```text
//! GET /api/config
//!     → aggregator.rs (cache check)
//!     → on miss, for every configured service:
//!         resolver.rs (env vars → bindings URL, or unresolved reason)
//!         → fetcher.rs (HTTP GET, JSON parse, per-service timeout)
//!       all fetches run concurrently; results joined when every one settles
//!     → successes merged under services[key], failures listed under errors
//!     → cache.rs (store until TTL expiry)
//!     → Return aggregated document
//! ```
//!
//! # Design Decisions
//! - Resolution happens per cycle, so environment changes take effect
//!   at the next cache miss
//! - One failing service never aborts the others (settle-all join)
//! - Partial aggregates are valid and cached like complete ones
//! - The cache is an explicit object injected into the aggregator, not
//!   module-global state

pub mod aggregator;
pub mod cache;
pub mod fetcher;
pub mod resolver;

pub use aggregator::{AggregatedConfig, AggregationMeta, ConfigAggregator, ServiceError};
pub use cache::ConfigCache;
pub use fetcher::{BindingsFetcher, FetchError, ServiceFetchResult};
pub use resolver::{process_env, resolve, EnvLookup, ResolvedEndpoint, Resolution};
