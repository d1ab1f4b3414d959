//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! All subsystems produce:
//!     → logging.rs (structured log events)
//!     → metrics.rs (counters, histograms)
//!
//! Consumers:
//!     → Log aggregation (stdout)
//!     → Metrics endpoint (Prometheus scrape)
//! ```
//!
//! # Design Decisions
//! - Structured logging via tracing with field syntax
//! - Request ID flows through all subsystems
//! - Metrics are cheap (atomic increments), recorded even when no
//!   exporter is installed

pub mod logging;
pub mod metrics;
