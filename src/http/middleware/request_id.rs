//! Request ID middleware.
//! Reuses an incoming `x-request-id` or generates a UUID v4, and echoes it
//! on the response.

use axum::http::{HeaderName, HeaderValue};

use crate::error::HandlerResult;
use crate::handler::{Middleware, RequestHandler};
use crate::http::request::{RequestId, X_REQUEST_ID};
use crate::http::Request;

#[derive(Debug, Clone, Copy, Default)]
pub struct RequestIdMiddleware;

impl Middleware for RequestIdMiddleware {
    fn process(&self, mut request: Request, next: &mut RequestHandler) -> HandlerResult {
        let header = HeaderName::from_static(X_REQUEST_ID);

        let id = request
            .headers()
            .get(&header)
            .and_then(|v| v.to_str().ok())
            .filter(|v| !v.is_empty())
            .map(|v| RequestId(v.to_string()))
            .unwrap_or_default();

        // A UUID or a value read from a header is always a valid header value.
        let value = HeaderValue::from_str(id.as_str()).ok();
        if let Some(value) = value.clone() {
            request.headers_mut().insert(header.clone(), value);
        }
        request.extensions_mut().insert(id);

        let mut response = next.handle(request)?;
        if let Some(value) = value {
            response.headers_mut().insert(header, value);
        }
        Ok(response)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::handler::{handler_fn, MiddlewareEntry};
    use crate::http::RequestExt;
    use axum::body::Bytes;
    use axum::response::IntoResponse;

    fn chain() -> RequestHandler {
        RequestHandler::new(handler_fn(|req: Request| {
            let id = req.request_id().map(|id| id.to_string()).unwrap_or_default();
            Ok(id.into_response())
        }))
        .with_middleware([MiddlewareEntry::object(RequestIdMiddleware)])
    }

    #[test]
    fn test_generates_id_when_missing() {
        let request = axum::http::Request::builder().uri("/").body(Bytes::new()).unwrap();
        let response = chain().handle(request).unwrap();
        let header = response.headers().get(X_REQUEST_ID).unwrap().to_str().unwrap();
        assert_eq!(header.len(), 36);
    }

    #[test]
    fn test_reuses_incoming_id() {
        let request = axum::http::Request::builder()
            .uri("/")
            .header(X_REQUEST_ID, "abc-123")
            .body(Bytes::new())
            .unwrap();
        let response = chain().handle(request).unwrap();
        assert_eq!(response.headers().get(X_REQUEST_ID).unwrap(), "abc-123");
    }
}
