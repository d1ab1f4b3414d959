//! Upstream service resolution.
//!
//! # Responsibilities
//! - Turn a service descriptor into a bindings URL using environment state
//! - Prefer an explicit bindings URL over a derived one
//! - Report unresolved services with a reason naming the missing variables
//!
//! # Design Decisions
//! - Pure function of an environment lookup; no caching at this layer,
//!   the environment may change between aggregation cycles
//! - An env var set to the empty string counts as unset
//! - Explicit Unresolved variant rather than a silent default

use std::sync::Arc;

use crate::config::schema::ServiceDescriptor;

/// Well-known path every service exposes its bindings document under.
pub const WELL_KNOWN_BINDINGS_PATH: &str = "/.well-known/bindings";

/// Environment lookup used by the resolver.
///
/// Injected so tests can resolve against a synthetic environment; the
/// default reads the process environment at call time.
pub type EnvLookup = Arc<dyn Fn(&str) -> Option<String> + Send + Sync>;

/// An environment lookup backed by the process environment.
pub fn process_env() -> EnvLookup {
    Arc::new(|key| std::env::var(key).ok())
}

/// Outcome of resolving a service descriptor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution {
    /// The bindings URL to fetch.
    Url(String),
    /// No URL could be derived from the environment.
    Unresolved { reason: String },
}

/// A service descriptor resolved against the current environment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedEndpoint {
    /// Service key the endpoint belongs to.
    pub key: String,
    /// Resolution outcome.
    pub resolution: Resolution,
}

impl ResolvedEndpoint {
    /// The resolved URL, if any.
    pub fn url(&self) -> Option<&str> {
        match &self.resolution {
            Resolution::Url(url) => Some(url),
            Resolution::Unresolved { .. } => None,
        }
    }
}

/// Resolve a service descriptor to a bindings URL.
///
/// An explicit bindings URL wins; otherwise the base URL gets the
/// well-known path appended.
pub fn resolve<F>(descriptor: &ServiceDescriptor, env: F) -> ResolvedEndpoint
where
    F: Fn(&str) -> Option<String>,
{
    if let Some(url) = env(&descriptor.bindings_env).filter(|v| !v.is_empty()) {
        return ResolvedEndpoint {
            key: descriptor.key.clone(),
            resolution: Resolution::Url(url),
        };
    }

    if let Some(base) = env(&descriptor.base_env).filter(|v| !v.is_empty()) {
        let base = base.trim_end_matches('/');
        return ResolvedEndpoint {
            key: descriptor.key.clone(),
            resolution: Resolution::Url(format!("{}{}", base, WELL_KNOWN_BINDINGS_PATH)),
        };
    }

    ResolvedEndpoint {
        key: descriptor.key.clone(),
        resolution: Resolution::Unresolved {
            reason: format!(
                "neither {} nor {} is set",
                descriptor.bindings_env, descriptor.base_env
            ),
        },
    }
}
