//! Handler and middleware shapes accepted by the chain.
//!
//! Each entry is one of three variants:
//! - `Closure`: an in-process function
//! - `Object`: a value implementing [`Handler`] or [`Middleware`]
//! - `Deferred`: a string identifier resolved through the container when
//!   the chain reaches it

use std::fmt;
use std::sync::Arc;

use crate::error::HandlerResult;
use crate::handler::chain::RequestHandler;
use crate::http::Request;

/// Terminal request handler.
pub trait Handler: Send + Sync {
    fn handle(&self, request: Request) -> HandlerResult;
}

/// Request middleware.
///
/// Call `next.handle(request)` to continue the chain, or return a response
/// directly to short-circuit it. Code before the call runs on the way in,
/// code after it on the way out.
pub trait Middleware: Send + Sync {
    fn process(&self, request: Request, next: &mut RequestHandler) -> HandlerResult;
}

pub type HandlerFn = dyn Fn(Request) -> HandlerResult + Send + Sync;
pub type MiddlewareFn = dyn Fn(Request, &mut RequestHandler) -> HandlerResult + Send + Sync;

/// A terminal handler in one of its three shapes.
#[derive(Clone)]
pub enum HandlerEntry {
    Closure(Arc<HandlerFn>),
    Object(Arc<dyn Handler>),
    Deferred(String),
}

/// A middleware in one of its three shapes.
#[derive(Clone)]
pub enum MiddlewareEntry {
    Closure(Arc<MiddlewareFn>),
    Object(Arc<dyn Middleware>),
    Deferred(String),
}

/// Wrap a closure as a handler entry.
pub fn handler_fn<F>(f: F) -> HandlerEntry
where
    F: Fn(Request) -> HandlerResult + Send + Sync + 'static,
{
    HandlerEntry::Closure(Arc::new(f))
}

/// Wrap a closure as a middleware entry.
pub fn middleware_fn<F>(f: F) -> MiddlewareEntry
where
    F: Fn(Request, &mut RequestHandler) -> HandlerResult + Send + Sync + 'static,
{
    MiddlewareEntry::Closure(Arc::new(f))
}

impl HandlerEntry {
    pub fn object(handler: impl Handler + 'static) -> Self {
        HandlerEntry::Object(Arc::new(handler))
    }

    pub fn deferred(id: impl Into<String>) -> Self {
        HandlerEntry::Deferred(id.into())
    }
}

impl MiddlewareEntry {
    pub fn object(middleware: impl Middleware + 'static) -> Self {
        MiddlewareEntry::Object(Arc::new(middleware))
    }

    pub fn deferred(id: impl Into<String>) -> Self {
        MiddlewareEntry::Deferred(id.into())
    }
}

impl From<&str> for HandlerEntry {
    fn from(id: &str) -> Self {
        HandlerEntry::Deferred(id.to_string())
    }
}

impl From<String> for HandlerEntry {
    fn from(id: String) -> Self {
        HandlerEntry::Deferred(id)
    }
}

impl From<Arc<dyn Handler>> for HandlerEntry {
    fn from(handler: Arc<dyn Handler>) -> Self {
        HandlerEntry::Object(handler)
    }
}

impl From<&str> for MiddlewareEntry {
    fn from(id: &str) -> Self {
        MiddlewareEntry::Deferred(id.to_string())
    }
}

impl From<String> for MiddlewareEntry {
    fn from(id: String) -> Self {
        MiddlewareEntry::Deferred(id)
    }
}

impl From<Arc<dyn Middleware>> for MiddlewareEntry {
    fn from(middleware: Arc<dyn Middleware>) -> Self {
        MiddlewareEntry::Object(middleware)
    }
}

impl fmt::Debug for HandlerEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HandlerEntry::Closure(_) => f.write_str("HandlerEntry::Closure"),
            HandlerEntry::Object(_) => f.write_str("HandlerEntry::Object"),
            HandlerEntry::Deferred(id) => f.debug_tuple("HandlerEntry::Deferred").field(id).finish(),
        }
    }
}

impl fmt::Debug for MiddlewareEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MiddlewareEntry::Closure(_) => f.write_str("MiddlewareEntry::Closure"),
            MiddlewareEntry::Object(_) => f.write_str("MiddlewareEntry::Object"),
            MiddlewareEntry::Deferred(id) => {
                f.debug_tuple("MiddlewareEntry::Deferred").field(id).finish()
            }
        }
    }
}
