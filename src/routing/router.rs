//! Route registration, lookup and dispatch.
//!
//! # Responsibilities
//! - Register routes (with HTTP-verb shortcuts and groups)
//! - Own router-level middleware and the service container
//! - Strip the configured base path before matching
//! - Find the first matching route and drive the middleware chain
//! - Build URIs for named routes
//!
//! # Design Decisions
//! - Registration order is the tie-break for overlapping patterns
//! - A missed match is `Err(RouterError::NoRouteMatched)`, never a
//!   synthesized response; the HTTP adapter turns it into 404
//! - Dispatch takes `&self`; share the router as `Arc<Router>`

use std::sync::Arc;

use axum::http::{Method, Request, Uri};

use crate::config::RouterSettings;
use crate::error::{HandlerResult, RouterError};
use crate::handler::{Container, HandlerEntry, MiddlewareEntry, RequestHandler, ServiceContainer};
use crate::http::RequestExt;
use crate::routing::collection::RouteCollection;
use crate::routing::group::RouteGroup;
use crate::routing::methods::{MethodSet, ANY_METHODS};
use crate::routing::parameter::ParameterSet;
use crate::routing::route::{to_uri, Route};

/// A route that matched a request, with its captured parameters.
#[derive(Debug)]
pub struct RouteMatch<'r> {
    route: &'r Route,
    parameters: ParameterSet,
}

impl<'r> RouteMatch<'r> {
    pub fn route(&self) -> &'r Route {
        self.route
    }

    pub fn parameters(&self) -> &ParameterSet {
        &self.parameters
    }

    pub fn into_parameters(self) -> ParameterSet {
        self.parameters
    }
}

pub struct Router {
    routes: RouteCollection,
    container: Arc<dyn Container>,
    base_path: String,
    middleware: Vec<MiddlewareEntry>,
    groups: Vec<RouteGroup>,
}

impl Router {
    pub fn new() -> Self {
        Self {
            routes: RouteCollection::new(),
            container: Arc::new(ServiceContainer::new()),
            base_path: String::new(),
            middleware: Vec::new(),
            groups: Vec::new(),
        }
    }

    pub fn from_settings(settings: &RouterSettings) -> Self {
        Self::new().with_base_path(&settings.base_path)
    }

    pub fn with_container(mut self, container: Arc<dyn Container>) -> Self {
        self.container = container;
        self
    }

    /// Prefix removed from request paths before matching, e.g. `/app`.
    pub fn with_base_path(mut self, base_path: &str) -> Self {
        self.base_path = base_path.trim_end_matches('/').to_string();
        self
    }

    pub fn base_path(&self) -> &str {
        &self.base_path
    }

    pub fn container(&self) -> &Arc<dyn Container> {
        &self.container
    }

    pub fn routes(&self) -> &RouteCollection {
        &self.routes
    }

    /// Add router-level middleware; it runs before any route middleware.
    pub fn middleware(&mut self, entry: impl Into<MiddlewareEntry>) -> &mut Self {
        self.middleware.push(entry.into());
        self
    }

    /// Register a prebuilt route.
    pub fn add(&mut self, mut route: Route) -> &mut Route {
        if let Some(group) = self.groups.last() {
            route.apply_group(group);
        }
        tracing::debug!(
            pattern = %route.pattern(),
            methods = ?route.methods(),
            "Route registered"
        );
        self.routes.add(route)
    }

    pub fn add_route(
        &mut self,
        methods: impl Into<MethodSet>,
        pattern: impl Into<String>,
        handler: impl Into<HandlerEntry>,
    ) -> &mut Route {
        self.add(Route::new(methods, pattern, handler))
    }

    /// Register with a `|`-separated method list, e.g. `"GET|POST"`.
    pub fn map(
        &mut self,
        methods: &str,
        pattern: impl Into<String>,
        handler: impl Into<HandlerEntry>,
    ) -> Result<&mut Route, RouterError> {
        let methods = MethodSet::parse(methods)?;
        Ok(self.add_route(methods, pattern, handler))
    }

    pub fn get(&mut self, pattern: impl Into<String>, handler: impl Into<HandlerEntry>) -> &mut Route {
        self.add_route(Method::GET, pattern, handler)
    }

    pub fn post(&mut self, pattern: impl Into<String>, handler: impl Into<HandlerEntry>) -> &mut Route {
        self.add_route(Method::POST, pattern, handler)
    }

    pub fn put(&mut self, pattern: impl Into<String>, handler: impl Into<HandlerEntry>) -> &mut Route {
        self.add_route(Method::PUT, pattern, handler)
    }

    pub fn patch(&mut self, pattern: impl Into<String>, handler: impl Into<HandlerEntry>) -> &mut Route {
        self.add_route(Method::PATCH, pattern, handler)
    }

    pub fn delete(&mut self, pattern: impl Into<String>, handler: impl Into<HandlerEntry>) -> &mut Route {
        self.add_route(Method::DELETE, pattern, handler)
    }

    pub fn options(&mut self, pattern: impl Into<String>, handler: impl Into<HandlerEntry>) -> &mut Route {
        self.add_route(Method::OPTIONS, pattern, handler)
    }

    pub fn head(&mut self, pattern: impl Into<String>, handler: impl Into<HandlerEntry>) -> &mut Route {
        self.add_route(Method::HEAD, pattern, handler)
    }

    pub fn any(&mut self, pattern: impl Into<String>, handler: impl Into<HandlerEntry>) -> &mut Route {
        self.add_route(ANY_METHODS, pattern, handler)
    }

    /// Register the routes added by `register` under the attributes of `group`.
    pub fn group<F>(&mut self, group: RouteGroup, register: F) -> &mut Self
    where
        F: FnOnce(&mut Router),
    {
        let merged = match self.groups.last() {
            Some(outer) => outer.nest(&group),
            None => group,
        };
        self.groups.push(merged);
        register(self);
        self.groups.pop();
        self
    }

    /// Compile every route once, surfacing invalid patterns at startup.
    pub fn validate(&self) -> Result<(), RouterError> {
        for route in &self.routes {
            route.compiled()?;
        }
        self.routes.update_named_routes();
        Ok(())
    }

    /// First route, in registration order, that matches `request`.
    pub fn find<'r, B>(&'r self, request: &Request<B>) -> Result<Option<RouteMatch<'r>>, RouterError> {
        let path = self.strip_base_path(request.uri().path());

        for route in &self.routes {
            if let Some(parameters) = route.match_parts(request.method(), path, request.headers())? {
                tracing::debug!(
                    method = %request.method(),
                    path = %path,
                    pattern = %route.pattern(),
                    name = ?route.name(),
                    "Route matched"
                );
                return Ok(Some(RouteMatch { route, parameters }));
            }
        }
        Ok(None)
    }

    /// Match `request` and run it through the middleware chain.
    pub fn dispatch(&self, request: crate::http::Request) -> HandlerResult {
        let Some(matched) = self.find(&request)? else {
            tracing::debug!(method = %request.method(), path = %request.uri().path(), "No route matched");
            return Err(RouterError::NoRouteMatched {
                method: request.method().clone(),
                path: request.uri().path().to_string(),
            });
        };

        let route = matched.route();
        let mut request = request;
        for parameter in matched.parameters() {
            if let Some(value) = parameter.value() {
                request = request.with_attribute(parameter.name(), value);
            }
        }

        let middleware = self
            .middleware
            .iter()
            .chain(route.middleware_entries())
            .cloned();
        let mut chain = RequestHandler::new(route.resolved_handler())
            .with_container(self.container.clone())
            .with_middleware(middleware);

        chain.handle(request)
    }

    /// Build the URI of the route registered under `name`.
    pub fn uri_for<I, K, V>(&self, name: &str, params: I) -> Result<Uri, RouterError>
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        self.routes.update_named_routes();
        let route = self
            .routes
            .get(name)
            .ok_or_else(|| RouterError::UnknownRouteName(name.to_string()))?;
        let path = route.path(params)?;
        to_uri(format!("{}{}", self.base_path, path))
    }

    // Only strips on a segment boundary: base `/app` leaves `/application` alone.
    fn strip_base_path<'p>(&self, path: &'p str) -> &'p str {
        if self.base_path.is_empty() {
            return path;
        }
        match path.strip_prefix(self.base_path.as_str()) {
            Some("") => "/",
            Some(rest) if rest.starts_with('/') => rest,
            _ => path,
        }
    }
}

impl Default for Router {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for Router {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Router")
            .field("routes", &self.routes.len())
            .field("base_path", &self.base_path)
            .field("middleware", &self.middleware)
            .finish()
    }
}
