//! Access log middleware.
//! Logs method, path, status and latency around the inner chain.

use std::time::Instant;

use crate::error::HandlerResult;
use crate::handler::{Middleware, RequestHandler};
use crate::http::{Request, RequestExt};

#[derive(Debug, Clone, Copy, Default)]
pub struct AccessLogMiddleware;

impl Middleware for AccessLogMiddleware {
    fn process(&self, request: Request, next: &mut RequestHandler) -> HandlerResult {
        let start = Instant::now();
        let method = request.method().clone();
        let path = request.uri().path().to_string();
        let request_id = request.request_id().map(|id| id.to_string());

        let result = next.handle(request);
        let elapsed_ms = start.elapsed().as_secs_f64() * 1000.0;

        match &result {
            Ok(response) => tracing::info!(
                request_id = ?request_id,
                method = %method,
                path = %path,
                status = response.status().as_u16(),
                elapsed_ms,
                "Request handled"
            ),
            Err(e) => tracing::warn!(
                request_id = ?request_id,
                method = %method,
                path = %path,
                error = %e,
                elapsed_ms,
                "Request failed"
            ),
        }
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::RouterError;
    use crate::handler::{handler_fn, MiddlewareEntry};
    use axum::body::Bytes;
    use axum::http::StatusCode;
    use axum::response::IntoResponse;

    #[test]
    fn test_passes_result_through() {
        let request = axum::http::Request::builder().uri("/ok").body(Bytes::new()).unwrap();
        let mut chain = RequestHandler::new(handler_fn(|_req| Ok(StatusCode::CREATED.into_response())))
            .with_middleware([MiddlewareEntry::object(AccessLogMiddleware)]);
        assert_eq!(chain.handle(request).unwrap().status(), StatusCode::CREATED);

        let request = axum::http::Request::builder().uri("/err").body(Bytes::new()).unwrap();
        let mut chain = RequestHandler::new(handler_fn(|_req| Err(RouterError::handler("boom"))))
            .with_middleware([MiddlewareEntry::object(AccessLogMiddleware)]);
        assert!(chain.handle(request).is_err());
    }
}
