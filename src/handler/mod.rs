//! Request-handler chain subsystem.
//!
//! # Data Flow
//! ```text
//! Router::dispatch
//!     → chain.rs (RequestHandler: [router mw..., route mw...] + fallback)
//!     → entry.rs (Closure | Object | Deferred)
//!     → container.rs (Deferred identifiers resolved at dispatch time)
//!     → Middleware::process(request, next) ... next.handle(request)
//!     → Handler::handle(request) once the queue is exhausted
//! ```
//!
//! # Design Decisions
//! - Entries are tagged variants, never inspected at runtime
//! - The queue is consumed through a cursor; one chain per request
//! - Middleware and handlers are synchronous; the chain never suspends

pub mod chain;
pub mod container;
pub mod entry;

pub use chain::RequestHandler;
pub use container::{Container, ContainerError, Service, ServiceContainer};
pub use entry::{handler_fn, middleware_fn, Handler, HandlerEntry, Middleware, MiddlewareEntry};
