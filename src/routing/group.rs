//! Route groups.
//!
//! A group carries attributes shared by every route registered inside it:
//! a path prefix, a name prefix, a handler namespace, parameter patterns
//! and middleware. Groups nest; see [`Router::group`](crate::routing::Router::group).

use std::collections::HashMap;

use crate::handler::MiddlewareEntry;
use crate::routing::route::normalize_namespace;

#[derive(Debug, Clone, Default)]
pub struct RouteGroup {
    prefix: String,
    name_prefix: String,
    namespace: Option<String>,
    patterns: HashMap<String, String>,
    middleware: Vec<MiddlewareEntry>,
}

impl RouteGroup {
    pub fn new() -> Self {
        Self::default()
    }

    /// Path prefix, e.g. `/admin`. A trailing slash is dropped.
    pub fn with_prefix(mut self, prefix: &str) -> Self {
        self.prefix = prefix.trim_end_matches('/').to_string();
        self
    }

    /// Prefix for route names, e.g. `admin.`.
    pub fn with_name_prefix(mut self, name: impl Into<String>) -> Self {
        self.name_prefix = name.into();
        self
    }

    pub fn with_namespace(mut self, namespace: &str) -> Self {
        self.namespace = normalize_namespace(namespace);
        self
    }

    pub fn with_pattern(mut self, param: impl Into<String>, regex: impl Into<String>) -> Self {
        self.patterns.insert(param.into(), regex.into());
        self
    }

    pub fn with_middleware(mut self, entry: impl Into<MiddlewareEntry>) -> Self {
        self.middleware.push(entry.into());
        self
    }

    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    pub fn name_prefix(&self) -> &str {
        &self.name_prefix
    }

    pub fn namespace(&self) -> Option<&str> {
        self.namespace.as_deref()
    }

    pub fn patterns(&self) -> &HashMap<String, String> {
        &self.patterns
    }

    pub fn middleware(&self) -> &[MiddlewareEntry] {
        &self.middleware
    }

    /// Combine `self` (outer) with `inner`. Prefixes and namespaces
    /// concatenate, inner patterns win, outer middleware runs first.
    pub fn nest(&self, inner: &RouteGroup) -> RouteGroup {
        let namespace = match (&self.namespace, &inner.namespace) {
            (Some(outer_ns), Some(inner_ns)) => Some(format!("{outer_ns}::{inner_ns}")),
            (outer_ns, inner_ns) => inner_ns.clone().or_else(|| outer_ns.clone()),
        };

        let mut patterns = self.patterns.clone();
        patterns.extend(inner.patterns.clone());

        let mut middleware = self.middleware.clone();
        middleware.extend(inner.middleware.iter().cloned());

        RouteGroup {
            prefix: format!("{}{}", self.prefix, inner.prefix),
            name_prefix: format!("{}{}", self.name_prefix, inner.name_prefix),
            namespace,
            patterns,
            middleware,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_nesting_combines_attributes() {
        let outer = RouteGroup::new()
            .with_prefix("/admin/")
            .with_name_prefix("admin.")
            .with_namespace("admin")
            .with_pattern("id", "[0-9]+")
            .with_middleware("auth");
        let inner = RouteGroup::new()
            .with_prefix("/users")
            .with_name_prefix("users.")
            .with_namespace("users")
            .with_pattern("id", "[a-f0-9]{8}")
            .with_middleware("audit");

        let merged = outer.nest(&inner);
        assert_eq!(merged.prefix(), "/admin/users");
        assert_eq!(merged.name_prefix(), "admin.users.");
        assert_eq!(merged.namespace(), Some("admin::users"));
        assert_eq!(merged.patterns()["id"], "[a-f0-9]{8}");

        let ids: Vec<_> = merged
            .middleware()
            .iter()
            .map(|entry| match entry {
                MiddlewareEntry::Deferred(id) => id.as_str(),
                _ => "?",
            })
            .collect();
        assert_eq!(ids, ["auth", "audit"]);
    }

    #[test]
    fn test_nesting_keeps_single_namespace() {
        let outer = RouteGroup::new().with_namespace("api");
        let merged = outer.nest(&RouteGroup::new());
        assert_eq!(merged.namespace(), Some("api"));
    }
}
