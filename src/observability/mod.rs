//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! All subsystems produce:
//!     → tracing events (route registration, matches, chain failures)
//!     → logging.rs (subscriber: filter + plain or JSON formatter)
//!
//! Request correlation:
//!     → RequestIdMiddleware stamps x-request-id
//!     → AccessLogMiddleware logs it with status and latency
//! ```
//!
//! # Design Decisions
//! - Structured logging (JSON) for machine parsing
//! - Request ID flows through the middleware chain as an extension

pub mod logging;

pub use logging::init_logging;
