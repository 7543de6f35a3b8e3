//! Routing subsystem.
//!
//! # Data Flow
//! ```text
//! Registration (at startup):
//!     Router::get/post/map/group
//!     → route.rs (Route: methods, pattern, handler, constraints)
//!     → collection.rs (ordered storage + name index)
//!
//! Incoming Request (method, path, headers)
//!     → router.rs (strip base path, scan routes in order)
//!     → route.rs (method → path → headers → parameter constraints)
//!     → pattern.rs (compiled regex, captured ParameterSet)
//!     → Return: RouteMatch or NoRouteMatched
//!
//! Reverse routing:
//!     Router::uri_for(name, params)
//!     → collection.rs (name lookup)
//!     → pattern.rs (render segments, optional groups only when supplied)
//! ```
//!
//! # Design Decisions
//! - First match wins (registration order)
//! - Patterns compile lazily and are memoised per route; mutation resets them
//! - Deterministic: same input always matches same route

pub mod collection;
pub mod group;
pub mod methods;
pub mod parameter;
pub mod pattern;
pub mod route;
pub mod router;

pub use collection::RouteCollection;
pub use group::RouteGroup;
pub use methods::{MethodSet, ANY_METHODS};
pub use parameter::{Parameter, ParameterSet};
pub use pattern::{compile, CompiledPattern};
pub use route::{HeaderConstraint, Route};
pub use router::{RouteMatch, Router};
