//! Lifecycle management subsystem.
//!
//! # Data Flow
//! ```text
//! Shutdown (shutdown.rs):
//!     Signal received → broadcast to tasks → stop accepting → drain → exit
//! ```
//!
//! # Design Decisions
//! - One broadcast channel fans the signal out to every long-running task
//! - Ctrl+C handling lives in main; tests trigger shutdown directly

pub mod shutdown;

pub use shutdown::Shutdown;
