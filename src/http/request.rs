//! Request attributes and request identifiers.
//!
//! # Responsibilities
//! - Carry matched route parameters as named request attributes
//! - Carry the request ID assigned by `RequestIdMiddleware`
//!
//! # Design Decisions
//! - Attributes live in the request extensions, so adding one consumes and
//!   returns the request instead of mutating shared state

use std::collections::HashMap;
use std::fmt;

use axum::http::Request;
use uuid::Uuid;

/// Header carrying the request ID.
pub const X_REQUEST_ID: &str = "x-request-id";

/// Unique identifier attached to each request.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RequestId(pub String);

impl RequestId {
    /// Generate a new UUID v4 request ID.
    pub fn new() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for RequestId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for RequestId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Named attributes attached to a request.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Attributes {
    values: HashMap<String, String>,
}

impl Attributes {
    pub fn get(&self, name: &str) -> Option<&str> {
        self.values.get(name).map(String::as_str)
    }

    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.values.insert(name.into(), value.into());
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.values.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

/// Attribute and request-ID accessors for requests.
pub trait RequestExt: Sized {
    fn attribute(&self, name: &str) -> Option<&str>;

    fn attributes(&self) -> Option<&Attributes>;

    /// Return the request with `name` set to `value`.
    fn with_attribute(self, name: impl Into<String>, value: impl Into<String>) -> Self;

    fn request_id(&self) -> Option<&RequestId>;
}

impl<B> RequestExt for Request<B> {
    fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes().and_then(|attrs| attrs.get(name))
    }

    fn attributes(&self) -> Option<&Attributes> {
        self.extensions().get::<Attributes>()
    }

    fn with_attribute(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        let extensions = self.extensions_mut();
        match extensions.get_mut::<Attributes>() {
            Some(attrs) => attrs.insert(name, value),
            None => {
                let mut attrs = Attributes::default();
                attrs.insert(name, value);
                extensions.insert(attrs);
            }
        }
        self
    }

    fn request_id(&self) -> Option<&RequestId> {
        self.extensions().get::<RequestId>()
    }
}
