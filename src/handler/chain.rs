//! The request-handler chain.
//!
//! A chain holds an ordered list of middleware, a cursor into it and one
//! fallback handler. `handle` runs the entry under the cursor and advances
//! it; once every entry is consumed, the fallback produces the response.
//! Middleware continues the chain by calling `handle` on the chain it was
//! given, which is what nests pre- and post-logic like onion layers.
//!
//! A chain is single-use: build a fresh one per request.

use std::fmt;
use std::sync::Arc;

use crate::error::{HandlerResult, RouterError};
use crate::handler::container::{Container, Service, ServiceContainer};
use crate::handler::entry::{HandlerEntry, MiddlewareEntry};
use crate::http::Request;

pub struct RequestHandler {
    container: Arc<dyn Container>,
    middleware: Vec<MiddlewareEntry>,
    cursor: usize,
    fallback: HandlerEntry,
}

impl RequestHandler {
    /// Create a chain with an empty container and no middleware.
    pub fn new(fallback: impl Into<HandlerEntry>) -> Self {
        Self {
            container: Arc::new(ServiceContainer::new()),
            middleware: Vec::new(),
            cursor: 0,
            fallback: fallback.into(),
        }
    }

    pub fn with_container(mut self, container: Arc<dyn Container>) -> Self {
        self.container = container;
        self
    }

    pub fn with_middleware(mut self, middleware: impl IntoIterator<Item = MiddlewareEntry>) -> Self {
        self.middleware.extend(middleware);
        self
    }

    /// Append middleware to the end of the queue.
    pub fn use_middleware(&mut self, entry: impl Into<MiddlewareEntry>) -> &mut Self {
        self.middleware.push(entry.into());
        self
    }

    pub fn container(&self) -> &Arc<dyn Container> {
        &self.container
    }

    /// Middleware entries not consumed yet.
    pub fn remaining(&self) -> usize {
        self.middleware.len() - self.cursor
    }

    pub fn is_terminal(&self) -> bool {
        self.remaining() == 0
    }

    /// Run the next step of the chain.
    pub fn handle(&mut self, request: Request) -> HandlerResult {
        let Some(entry) = self.middleware.get(self.cursor).cloned() else {
            return self.handle_fallback(request);
        };
        self.cursor += 1;

        match entry {
            MiddlewareEntry::Closure(f) => f(request, self),
            MiddlewareEntry::Object(middleware) => middleware.process(request, self),
            MiddlewareEntry::Deferred(id) => match self.container.resolve(&id)? {
                Service::Middleware(middleware) => {
                    tracing::trace!(id = %id, "Resolved middleware");
                    middleware.process(request, self)
                }
                other => {
                    tracing::warn!(id = %id, kind = other.kind(), "Identifier does not resolve to middleware");
                    Err(RouterError::UnresolvableMiddleware(id))
                }
            },
        }
    }

    fn handle_fallback(&self, request: Request) -> HandlerResult {
        match &self.fallback {
            HandlerEntry::Closure(f) => f(request),
            HandlerEntry::Object(handler) => handler.handle(request),
            HandlerEntry::Deferred(id) => match self.container.resolve(id)? {
                Service::Handler(handler) => handler.handle(request),
                other => {
                    tracing::warn!(id = %id, kind = other.kind(), "Identifier does not resolve to a handler");
                    Err(RouterError::UnresolvableFallback(id.clone()))
                }
            },
        }
    }
}

impl fmt::Debug for RequestHandler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RequestHandler")
            .field("middleware", &self.middleware)
            .field("cursor", &self.cursor)
            .field("fallback", &self.fallback)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::handler::entry::{handler_fn, middleware_fn, Handler, Middleware};
    use crate::http::Response;
    use axum::body::Bytes;
    use axum::http::StatusCode;
    use axum::response::IntoResponse;
    use parking_lot::Mutex;

    fn request() -> Request {
        axum::http::Request::builder().uri("/").body(Bytes::new()).unwrap()
    }

    fn ok(body: &'static str) -> HandlerResult {
        Ok(body.into_response())
    }

    struct Tracing {
        label: &'static str,
        log: Arc<Mutex<Vec<String>>>,
    }

    impl Middleware for Tracing {
        fn process(&self, request: Request, next: &mut RequestHandler) -> HandlerResult {
            self.log.lock().push(format!("{} in", self.label));
            let response = next.handle(request);
            self.log.lock().push(format!("{} out", self.label));
            response
        }
    }

    struct Teapot;

    impl Handler for Teapot {
        fn handle(&self, _request: Request) -> HandlerResult {
            Ok(StatusCode::IM_A_TEAPOT.into_response())
        }
    }

    #[test]
    fn test_onion_order() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let fallback_log = log.clone();
        let a = MiddlewareEntry::object(Tracing { label: "A", log: log.clone() });
        let b = MiddlewareEntry::object(Tracing { label: "B", log: log.clone() });

        let mut chain = RequestHandler::new(handler_fn(move |_req| {
            fallback_log.lock().push("F".to_string());
            ok("done")
        }))
        .with_middleware([a, b]);

        chain.handle(request()).unwrap();
        assert_eq!(*log.lock(), ["A in", "B in", "F", "B out", "A out"]);
        assert!(chain.is_terminal());
    }

    #[test]
    fn test_closure_middleware_can_short_circuit() {
        let reached = Arc::new(Mutex::new(false));
        let flag = reached.clone();
        let mut chain = RequestHandler::new(handler_fn(move |_req| {
            *flag.lock() = true;
            ok("fallback")
        }))
        .with_middleware([middleware_fn(|_req, _next| {
            Ok((StatusCode::UNAUTHORIZED, "denied").into_response())
        })]);

        let response: Response = chain.handle(request()).unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        assert!(!*reached.lock());
    }

    #[test]
    fn test_entries_are_consumed_once() {
        let mut chain = RequestHandler::new(HandlerEntry::object(Teapot))
            .with_middleware([middleware_fn(|req, next| next.handle(req))]);
        chain.use_middleware(middleware_fn(|req, next| next.handle(req)));
        assert_eq!(chain.remaining(), 2);

        chain.handle(request()).unwrap();
        assert_eq!(chain.remaining(), 0);

        // A second call goes straight to the fallback.
        let response = chain.handle(request()).unwrap();
        assert_eq!(response.status(), StatusCode::IM_A_TEAPOT);
    }

    #[test]
    fn test_deferred_entries_resolve_through_container() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let container = ServiceContainer::new();
        let mw_log = log.clone();
        container.bind("trace", move || {
            Service::middleware(Tracing { label: "T", log: mw_log.clone() })
        });
        container.instance("teapot", Service::handler(Teapot));

        let mut chain = RequestHandler::new("teapot")
            .with_container(Arc::new(container))
            .with_middleware([MiddlewareEntry::from("trace")]);

        let response = chain.handle(request()).unwrap();
        assert_eq!(response.status(), StatusCode::IM_A_TEAPOT);
        assert_eq!(*log.lock(), ["T in", "T out"]);
    }

    #[test]
    fn test_unresolvable_entries() {
        let container = Arc::new(ServiceContainer::new());
        container.instance("settings", Service::value(42u32));
        container.instance("teapot", Service::handler(Teapot));

        let mut chain = RequestHandler::new("teapot")
            .with_container(container.clone())
            .with_middleware([MiddlewareEntry::from("settings")]);
        let err = chain.handle(request()).unwrap_err();
        assert!(matches!(err, RouterError::UnresolvableMiddleware(ref id) if id == "settings"));

        let mut chain = RequestHandler::new("settings").with_container(container.clone());
        let err = chain.handle(request()).unwrap_err();
        assert!(matches!(err, RouterError::UnresolvableFallback(ref id) if id == "settings"));

        let mut chain = RequestHandler::new("missing").with_container(container);
        let err = chain.handle(request()).unwrap_err();
        assert!(matches!(err, RouterError::Container(_)));
    }

    #[test]
    fn test_handler_errors_propagate_through_middleware() {
        let mut chain = RequestHandler::new(handler_fn(|_req| Err(RouterError::handler("boom"))))
            .with_middleware([middleware_fn(|req, next| next.handle(req))]);
        let err = chain.handle(request()).unwrap_err();
        assert!(matches!(err, RouterError::Handler(_)));
    }
}
