//! Built-in middleware for the request-handler chain.
//!
//! Both types implement [`Middleware`](crate::handler::Middleware) and can
//! be registered directly or bound in a container under an identifier.

pub mod access_log;
pub mod request_id;

pub use access_log::AccessLogMiddleware;
pub use request_id::RequestIdMiddleware;
