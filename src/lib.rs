//! Lazy HTTP request router.
//!
//! Routes are described by brace patterns (`/users/{id:[0-9]+}`), matched
//! in registration order against method, path and headers, and dispatched
//! through an onion-style middleware chain whose entries may be closures,
//! objects, or identifiers resolved lazily from a service container.

pub mod config;
pub mod error;
pub mod handler;
pub mod http;
pub mod observability;
pub mod routing;

pub use config::AppConfig;
pub use error::{HandlerResult, RouterError};
pub use handler::{
    handler_fn, middleware_fn, Container, Handler, HandlerEntry, Middleware, MiddlewareEntry,
    RequestHandler, Service, ServiceContainer,
};
pub use http::{HttpServer, Request, RequestExt, Response};
pub use routing::{Parameter, ParameterSet, Route, RouteGroup, RouteMatch, Router};
