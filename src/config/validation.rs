//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Check service descriptors (unique keys, env var names present)
//! - Validate value ranges (TTL and timeouts nonzero, addresses parseable)
//! - Check the proxy mount prefix shape
//!
//! # Design Decisions
//! - Returns all validation errors, not just the first
//! - Validation is a pure function: GatewayConfig → Result<(), Vec<ValidationError>>
//! - Runs before config is accepted into the system

use std::collections::HashSet;
use std::net::SocketAddr;

use crate::config::schema::GatewayConfig;

/// A single semantic validation failure.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    InvalidBindAddress { value: String },
    InvalidMetricsAddress { value: String },
    EmptyServiceKey,
    DuplicateServiceKey { key: String },
    EmptyEnvVarName { key: String },
    ZeroCacheTtl,
    ZeroBindingsTimeout,
    InvalidMountPrefix { value: String },
    EmptyProxyBaseEnv,
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ValidationError::InvalidBindAddress { value } => {
                write!(f, "listener.bind_address '{}' is not a valid socket address", value)
            }
            ValidationError::InvalidMetricsAddress { value } => {
                write!(f, "observability.metrics_address '{}' is not a valid socket address", value)
            }
            ValidationError::EmptyServiceKey => write!(f, "service key must not be empty"),
            ValidationError::DuplicateServiceKey { key } => {
                write!(f, "duplicate service key '{}'", key)
            }
            ValidationError::EmptyEnvVarName { key } => {
                write!(f, "service '{}' has an empty environment variable name", key)
            }
            ValidationError::ZeroCacheTtl => write!(f, "cache.ttl_secs must be greater than zero"),
            ValidationError::ZeroBindingsTimeout => {
                write!(f, "upstream.bindings_timeout_secs must be greater than zero")
            }
            ValidationError::InvalidMountPrefix { value } => {
                write!(f, "proxy.mount_prefix '{}' must start with '/' and not end with '/'", value)
            }
            ValidationError::EmptyProxyBaseEnv => {
                write!(f, "proxy.base_env must not be empty")
            }
        }
    }
}

/// Validate a configuration, collecting every semantic error.
pub fn validate_config(config: &GatewayConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.listener.bind_address.parse::<SocketAddr>().is_err() {
        errors.push(ValidationError::InvalidBindAddress {
            value: config.listener.bind_address.clone(),
        });
    }

    if config.observability.metrics_enabled
        && config.observability.metrics_address.parse::<SocketAddr>().is_err()
    {
        errors.push(ValidationError::InvalidMetricsAddress {
            value: config.observability.metrics_address.clone(),
        });
    }

    let mut seen = HashSet::new();
    for service in &config.services {
        if service.key.is_empty() {
            errors.push(ValidationError::EmptyServiceKey);
            continue;
        }
        if !seen.insert(service.key.as_str()) {
            errors.push(ValidationError::DuplicateServiceKey {
                key: service.key.clone(),
            });
        }
        if service.bindings_env.is_empty() || service.base_env.is_empty() {
            errors.push(ValidationError::EmptyEnvVarName {
                key: service.key.clone(),
            });
        }
    }

    if config.cache.ttl_secs == 0 {
        errors.push(ValidationError::ZeroCacheTtl);
    }

    if config.upstream.bindings_timeout_secs == 0 {
        errors.push(ValidationError::ZeroBindingsTimeout);
    }

    let prefix = &config.proxy.mount_prefix;
    if !prefix.starts_with('/') || prefix.len() < 2 || prefix.ends_with('/') {
        errors.push(ValidationError::InvalidMountPrefix {
            value: prefix.clone(),
        });
    }

    if config.proxy.base_env.is_empty() {
        errors.push(ValidationError::EmptyProxyBaseEnv);
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::schema::ServiceDescriptor;

    #[test]
    fn test_default_config_is_valid() {
        assert!(validate_config(&GatewayConfig::default()).is_ok());
    }

    #[test]
    fn test_collects_all_errors() {
        let mut config = GatewayConfig::default();
        config.listener.bind_address = "not-an-address".to_string();
        config.cache.ttl_secs = 0;
        config.proxy.mount_prefix = "api/deals/".to_string();

        let errors = validate_config(&config).unwrap_err();
        assert_eq!(errors.len(), 3);
        assert!(errors.contains(&ValidationError::ZeroCacheTtl));
    }

    #[test]
    fn test_duplicate_service_key() {
        let mut config = GatewayConfig::default();
        config.services.push(ServiceDescriptor {
            key: "users".to_string(),
            bindings_env: "OTHER_BINDINGS_URL".to_string(),
            base_env: "OTHER_BASE_URL".to_string(),
        });

        let errors = validate_config(&config).unwrap_err();
        assert_eq!(
            errors,
            vec![ValidationError::DuplicateServiceKey {
                key: "users".to_string()
            }]
        );
    }

    #[test]
    fn test_empty_env_var_name() {
        let mut config = GatewayConfig::default();
        config.services[0].base_env = String::new();

        let errors = validate_config(&config).unwrap_err();
        assert_eq!(
            errors,
            vec![ValidationError::EmptyEnvVarName {
                key: "users".to_string()
            }]
        );
    }
}
