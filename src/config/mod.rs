//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! config file (TOML)
//!     → loader.rs (parse & deserialize)
//!     → validation.rs (semantic checks)
//!     → GatewayConfig (validated, immutable)
//!     → shared via ArcSwap to the server and aggregator
//!
//! On reload:
//!     watcher.rs detects change
//!     → loader.rs loads new config
//!     → validation.rs validates
//!     → atomic swap of Arc<GatewayConfig>
//!     → aggregator cache cleared so new services take effect
//! ```
//!
//! # Design Decisions
//! - Config is immutable once loaded; changes require a reload
//! - All fields have defaults so the gateway runs with no config file
//! - Validation separates syntactic (serde) from semantic checks
//! - Environment variables named here are read per request, not at load time

pub mod loader;
pub mod schema;
pub mod validation;
pub mod watcher;

pub use schema::CacheConfig;
pub use schema::GatewayConfig;
pub use schema::ListenerConfig;
pub use schema::ProxyMountConfig;
pub use schema::ServiceDescriptor;
pub use schema::UpstreamConfig;
