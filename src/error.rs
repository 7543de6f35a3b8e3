//! Error taxonomy for route matching, reverse routing and chain dispatch.
//!
//! # Design Decisions
//! - "No route matched" is an error value, not a synthesized response;
//!   the HTTP adapter renders it as 404 (see `http::response`)
//! - Handler failures are wrapped in `Handler` so callers can always tell
//!   them apart from a missed match
//! - Nothing in the core retries; errors unwind to the caller unchanged

use axum::http::Method;
use thiserror::Error;

use crate::handler::container::ContainerError;

/// Boxed error returned by application handlers and middleware.
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Errors produced by the router and the request-handler chain.
#[derive(Debug, Error)]
pub enum RouterError {
    /// No registered route satisfies method, path and header constraints.
    #[error("no route matches {method} {path}")]
    NoRouteMatched { method: Method, path: String },

    /// Reverse routing was asked for a route parameter with no value.
    #[error("unresolved route parameter '{0}'")]
    UnresolvedParameter(String),

    /// A supplied reverse-routing value does not satisfy its sub-pattern.
    #[error("value '{value}' for parameter '{name}' does not match '{pattern}'")]
    ParameterConstraintViolation {
        name: String,
        value: String,
        pattern: String,
    },

    /// A middleware entry resolved to something that cannot process requests.
    #[error("unresolvable middleware '{0}'")]
    UnresolvableMiddleware(String),

    /// The fallback entry resolved to something that cannot handle requests.
    #[error("unresolvable fallback handler '{0}'")]
    UnresolvableFallback(String),

    /// Reverse routing was asked for a name nobody registered.
    #[error("route '{0}' does not exist")]
    UnknownRouteName(String),

    #[error("invalid route pattern '{pattern}': {reason}")]
    InvalidPattern { pattern: String, reason: String },

    #[error("invalid HTTP method '{0}'")]
    InvalidMethod(String),

    #[error("generated URI '{uri}' is invalid: {reason}")]
    InvalidUri { uri: String, reason: String },

    #[error(transparent)]
    Container(#[from] ContainerError),

    /// A route handler or middleware failed after the route matched.
    #[error("handler failed: {0}")]
    Handler(#[source] BoxError),
}

impl RouterError {
    /// Wrap an application error raised by a handler or middleware.
    pub fn handler(err: impl Into<BoxError>) -> Self {
        RouterError::Handler(err.into())
    }

    pub(crate) fn invalid_pattern(pattern: &str, reason: impl Into<String>) -> Self {
        RouterError::InvalidPattern {
            pattern: pattern.to_string(),
            reason: reason.into(),
        }
    }

    /// True when the router found no route at all.
    pub fn is_not_found(&self) -> bool {
        matches!(self, RouterError::NoRouteMatched { .. })
    }
}

/// Result type of every handler, middleware and chain step.
pub type HandlerResult = Result<crate::http::Response, RouterError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_found_is_distinct_from_handler_failure() {
        let missing = RouterError::NoRouteMatched {
            method: Method::GET,
            path: "/nowhere".into(),
        };
        assert!(missing.is_not_found());
        assert_eq!(missing.to_string(), "no route matches GET /nowhere");

        let failed = RouterError::handler("database offline");
        assert!(!failed.is_not_found());
        assert_eq!(failed.to_string(), "handler failed: database offline");
    }
}
