//! Shared utilities for integration tests.

#![allow(dead_code)]

use std::sync::Arc;

use axum::body::Bytes;
use axum::http::{Method, Request};
use axum::response::IntoResponse;
use parking_lot::Mutex;

use lazy_router::{handler_fn, middleware_fn, HandlerEntry, MiddlewareEntry, Response};

/// Build a buffered request with an empty body.
pub fn request(method: Method, path: &str) -> lazy_router::Request {
    Request::builder()
        .method(method)
        .uri(path)
        .body(Bytes::new())
        .unwrap()
}

/// Build a buffered request carrying one header.
pub fn request_with_header(method: Method, path: &str, name: &str, value: &str) -> lazy_router::Request {
    Request::builder()
        .method(method)
        .uri(path)
        .header(name, value)
        .body(Bytes::new())
        .unwrap()
}

/// Handler answering 200 with a fixed body.
pub fn reply(body: &'static str) -> HandlerEntry {
    handler_fn(move |_req| Ok(body.into_response()))
}

/// Handler answering with `name=value` pairs for the given attributes.
pub fn echo_attributes(names: &'static [&'static str]) -> HandlerEntry {
    use lazy_router::RequestExt;
    handler_fn(move |req| {
        let pairs: Vec<String> = names
            .iter()
            .map(|name| format!("{name}={}", req.attribute(name).unwrap_or("-")))
            .collect();
        Ok(pairs.join("&").into_response())
    })
}

/// Middleware recording `label in` / `label out` around the rest of the chain.
pub fn recording(label: &'static str, log: Arc<Mutex<Vec<String>>>) -> MiddlewareEntry {
    middleware_fn(move |req, next| {
        log.lock().push(format!("{label} in"));
        let response = next.handle(req);
        log.lock().push(format!("{label} out"));
        response
    })
}

/// Read a whole response body as UTF-8.
pub async fn body_text(response: Response) -> String {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
    String::from_utf8(bytes.to_vec()).unwrap()
}
