//! Ordered route registry with a name index for reverse routing.
//!
//! # Design Decisions
//! - Routes keep registration order; that order is the match precedence
//! - The name index can be rebuilt through `&self`, because routes may be
//!   named after they were appended
//! - A later route registered under an existing name replaces it in the index

use std::collections::HashMap;

use parking_lot::RwLock;

use crate::routing::route::Route;

#[derive(Debug, Default)]
pub struct RouteCollection {
    routes: Vec<Route>,
    named: RwLock<HashMap<String, usize>>,
}

impl RouteCollection {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a route, indexing it if it already carries a name.
    pub fn add(&mut self, route: Route) -> &mut Route {
        let idx = self.routes.len();
        if let Some(name) = route.name() {
            self.named.get_mut().insert(name.to_string(), idx);
        }
        self.routes.push(route);
        &mut self.routes[idx]
    }

    pub fn get(&self, name: &str) -> Option<&Route> {
        let idx = *self.named.read().get(name)?;
        self.routes.get(idx)
    }

    pub fn has(&self, name: &str) -> bool {
        self.named.read().contains_key(name)
    }

    /// Rebuild the name index from the full route sequence.
    pub fn update_named_routes(&self) {
        let mut named = self.named.write();
        named.clear();
        for (idx, route) in self.routes.iter().enumerate() {
            if let Some(name) = route.name() {
                named.insert(name.to_string(), idx);
            }
        }
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Route> {
        self.routes.iter()
    }

    pub fn len(&self) -> usize {
        self.routes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }
}

impl<'a> IntoIterator for &'a RouteCollection {
    type Item = &'a Route;
    type IntoIter = std::slice::Iter<'a, Route>;

    fn into_iter(self) -> Self::IntoIter {
        self.routes.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::Method;

    #[test]
    fn test_names_assigned_after_add_need_rebuild() {
        let mut routes = RouteCollection::new();
        routes.add(Route::new(Method::GET, "/users/{id}", "users.show")).named("user.show");

        assert!(!routes.has("user.show"));
        routes.update_named_routes();
        assert!(routes.has("user.show"));
        assert_eq!(routes.get("user.show").unwrap().pattern(), "/users/{id}");
    }

    #[test]
    fn test_last_registered_name_wins() {
        let mut routes = RouteCollection::new();
        let mut first = Route::new(Method::GET, "/v1", "v1");
        first.named("home");
        let mut second = Route::new(Method::GET, "/v2", "v2");
        second.named("home");

        routes.add(first);
        routes.add(second);
        assert_eq!(routes.get("home").unwrap().pattern(), "/v2");

        routes.update_named_routes();
        assert_eq!(routes.get("home").unwrap().pattern(), "/v2");
        assert_eq!(routes.len(), 2);
    }
}
