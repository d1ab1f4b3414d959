//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (Axum setup, route mounts)
//!     → request.rs (add request ID)
//!     → /api/config  → aggregator (discovery subsystem)
//!     → /api/deals/* → proxy.rs (strip hop-by-hop, forward, stream back)
//!     → Send to client
//! ```

pub mod proxy;
pub mod request;
pub mod server;

pub use request::{RequestId, RequestIdExt, RequestIdLayer, X_REQUEST_ID};
pub use server::HttpServer;
