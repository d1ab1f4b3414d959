//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the gateway.
//! All types derive Serde traits for deserialization from config files.

use serde::{Deserialize, Serialize};

/// Root configuration for the gateway.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct GatewayConfig {
    /// Listener configuration (bind address).
    pub listener: ListenerConfig,

    /// Backend services whose bindings are aggregated under /api/config.
    pub services: Vec<ServiceDescriptor>,

    /// Aggregated-config cache settings.
    pub cache: CacheConfig,

    /// Upstream fetch settings.
    pub upstream: UpstreamConfig,

    /// Path proxy mount settings.
    pub proxy: ProxyMountConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            listener: ListenerConfig::default(),
            services: default_services(),
            cache: CacheConfig::default(),
            upstream: UpstreamConfig::default(),
            proxy: ProxyMountConfig::default(),
            observability: ObservabilityConfig::default(),
        }
    }
}

/// Listener configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ListenerConfig {
    /// Bind address (e.g., "0.0.0.0:8080").
    pub bind_address: String,
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0:8080".to_string(),
        }
    }
}

/// A backend service whose discovery document is aggregated.
///
/// The environment variables named here are looked up when a request is
/// served, so the environment may change between aggregation cycles.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ServiceDescriptor {
    /// Unique service name (e.g., "users", "deals").
    pub key: String,

    /// Environment variable holding an explicit bindings URL.
    pub bindings_env: String,

    /// Environment variable holding the service base URL.
    pub base_env: String,
}

fn default_services() -> Vec<ServiceDescriptor> {
    vec![
        ServiceDescriptor {
            key: "users".to_string(),
            bindings_env: "USERS_BINDINGS_URL".to_string(),
            base_env: "USERS_SERVICE_BASE_URL".to_string(),
        },
        ServiceDescriptor {
            key: "deals".to_string(),
            bindings_env: "DEALS_BINDINGS_URL".to_string(),
            base_env: "DEALS_SERVICE_BASE_URL".to_string(),
        },
    ]
}

/// Aggregated-config cache settings.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct CacheConfig {
    /// Time-to-live for the aggregated config in seconds.
    pub ttl_secs: u64,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self { ttl_secs: 300 }
    }
}

/// Upstream fetch settings.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct UpstreamConfig {
    /// Per-service timeout for a bindings fetch in seconds.
    pub bindings_timeout_secs: u64,
}

impl Default for UpstreamConfig {
    fn default() -> Self {
        Self {
            bindings_timeout_secs: 10,
        }
    }
}

/// Path proxy mount settings.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ProxyMountConfig {
    /// Path prefix the proxy is mounted under.
    pub mount_prefix: String,

    /// Environment variable holding the proxied service's base URL.
    pub base_env: String,

    /// Base URL used when the environment variable is unset.
    pub default_base: String,
}

impl Default for ProxyMountConfig {
    fn default() -> Self {
        Self {
            mount_prefix: "/api/deals".to_string(),
            base_env: "DEALS_SERVICE_BASE_URL".to_string(),
            default_base: "deals".to_string(),
        }
    }
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,

    /// Enable metrics endpoint.
    pub metrics_enabled: bool,

    /// Metrics endpoint bind address.
    pub metrics_address: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            metrics_enabled: true,
            metrics_address: "0.0.0.0:9090".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_services() {
        let config = GatewayConfig::default();
        let keys: Vec<&str> = config.services.iter().map(|s| s.key.as_str()).collect();
        assert_eq!(keys, vec!["users", "deals"]);
        assert_eq!(config.services[0].bindings_env, "USERS_BINDINGS_URL");
        assert_eq!(config.services[1].base_env, "DEALS_SERVICE_BASE_URL");
    }

    #[test]
    fn test_minimal_toml_uses_defaults() {
        let config: GatewayConfig = toml::from_str("").unwrap();
        assert_eq!(config.cache.ttl_secs, 300);
        assert_eq!(config.upstream.bindings_timeout_secs, 10);
        assert_eq!(config.proxy.mount_prefix, "/api/deals");
        assert_eq!(config.proxy.default_base, "deals");
        assert_eq!(config.services.len(), 2);
    }

    #[test]
    fn test_toml_overrides() {
        let toml = r#"
            [listener]
            bind_address = "127.0.0.1:9999"

            [cache]
            ttl_secs = 60

            [[services]]
            key = "catalog"
            bindings_env = "CATALOG_BINDINGS_URL"
            base_env = "CATALOG_SERVICE_BASE_URL"
        "#;
        let config: GatewayConfig = toml::from_str(toml).unwrap();
        assert_eq!(config.listener.bind_address, "127.0.0.1:9999");
        assert_eq!(config.cache.ttl_secs, 60);
        assert_eq!(config.services.len(), 1);
        assert_eq!(config.services[0].key, "catalog");
    }
}
