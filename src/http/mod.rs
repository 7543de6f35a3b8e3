//! HTTP integration subsystem.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (Axum setup, trace + timeout layers, body buffering)
//!     → routing::Router::dispatch (match, attributes, middleware chain)
//!     → middleware/ (request id, access log)
//!     → route handler
//!     → response.rs (RouterError → status code)
//!     → Send to client
//! ```
//!
//! # Design Decisions
//! - Requests are buffered (`Request<Bytes>`) so the chain stays synchronous
//! - Route parameters travel as request attributes in the extensions

pub mod middleware;
pub mod request;
pub mod response;
pub mod server;

/// Buffered request seen by routes, middleware and handlers.
pub type Request = axum::http::Request<axum::body::Bytes>;

/// Response produced by handlers.
pub type Response = axum::response::Response;

pub use request::{Attributes, RequestExt, RequestId, X_REQUEST_ID};
pub use server::{router_service, HttpServer};
