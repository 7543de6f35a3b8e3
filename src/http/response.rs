//! Response mapping for router errors.
//!
//! # Design Decisions
//! - `NoRouteMatched` becomes 404 Not Found
//! - Every other error becomes 500; details go to the log, not the client

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};

use crate::error::RouterError;

impl RouterError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            RouterError::NoRouteMatched { .. } => StatusCode::NOT_FOUND,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for RouterError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status == StatusCode::NOT_FOUND {
            tracing::debug!(error = %self, "Responding 404");
            return (status, "No matching route found").into_response();
        }

        tracing::error!(error = %self, "Request dispatch failed");
        (status, "Internal Server Error").into_response()
    }
}
