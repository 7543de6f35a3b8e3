//! HTTP method sets accepted by a route.

use axum::http::Method;

use crate::error::RouterError;

/// Methods registered by [`Router::any`](crate::routing::Router::any).
pub const ANY_METHODS: &[Method] = &[
    Method::GET,
    Method::HEAD,
    Method::POST,
    Method::PUT,
    Method::PATCH,
    Method::DELETE,
    Method::OPTIONS,
    Method::CONNECT,
    Method::TRACE,
];

/// Normalized, duplicate-free set of methods.
///
/// Every constructor upper-cases the methods, drops duplicates and adds
/// `HEAD` whenever `GET` is present.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MethodSet {
    methods: Vec<Method>,
}

impl MethodSet {
    pub fn new(methods: impl IntoIterator<Item = Method>) -> Self {
        let mut normalized: Vec<Method> = Vec::new();
        for method in methods {
            let method = upper_case(method);
            if !normalized.contains(&method) {
                normalized.push(method);
            }
        }
        if normalized.contains(&Method::GET) && !normalized.contains(&Method::HEAD) {
            normalized.push(Method::HEAD);
        }
        Self {
            methods: normalized,
        }
    }

    /// Parse the `|`-separated form, e.g. `"get|post"`.
    pub fn parse(spec: &str) -> Result<Self, RouterError> {
        let methods = spec
            .split('|')
            .map(str::trim)
            .filter(|token| !token.is_empty())
            .map(|token| {
                Method::from_bytes(token.to_ascii_uppercase().as_bytes())
                    .map_err(|_| RouterError::InvalidMethod(token.to_string()))
            })
            .collect::<Result<Vec<_>, _>>()?;
        if methods.is_empty() {
            return Err(RouterError::InvalidMethod(spec.to_string()));
        }
        Ok(Self::new(methods))
    }

    pub fn contains(&self, method: &Method) -> bool {
        self.methods.contains(method)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Method> {
        self.methods.iter()
    }

    pub fn len(&self) -> usize {
        self.methods.len()
    }

    pub fn is_empty(&self) -> bool {
        self.methods.is_empty()
    }
}

// Extension methods keep their original spelling in `http`; re-parse those
// upper-cased so "get" and GET compare equal.
fn upper_case(method: Method) -> Method {
    let raw = method.as_str();
    if raw.bytes().any(|b| b.is_ascii_lowercase()) {
        Method::from_bytes(raw.to_ascii_uppercase().as_bytes()).unwrap_or(method)
    } else {
        method
    }
}

impl From<Method> for MethodSet {
    fn from(method: Method) -> Self {
        Self::new([method])
    }
}

impl From<&[Method]> for MethodSet {
    fn from(methods: &[Method]) -> Self {
        Self::new(methods.iter().cloned())
    }
}

impl<const N: usize> From<[Method; N]> for MethodSet {
    fn from(methods: [Method; N]) -> Self {
        Self::new(methods)
    }
}

impl From<Vec<Method>> for MethodSet {
    fn from(methods: Vec<Method>) -> Self {
        Self::new(methods)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_get_implies_head_once() {
        let set = MethodSet::from(Method::GET);
        assert_eq!(set.iter().cloned().collect::<Vec<_>>(), [Method::GET, Method::HEAD]);

        let set = MethodSet::from([Method::HEAD, Method::GET, Method::GET]);
        assert_eq!(set.len(), 2);
    }

    #[test]
    fn test_post_does_not_add_head() {
        let set = MethodSet::from(Method::POST);
        assert!(!set.contains(&Method::HEAD));
    }

    #[test]
    fn test_parse_pipe_separated_lower_case() {
        let set = MethodSet::parse("get|post|GET").unwrap();
        assert!(set.contains(&Method::GET));
        assert!(set.contains(&Method::POST));
        assert!(set.contains(&Method::HEAD));
        assert_eq!(set.len(), 3);

        let purge = MethodSet::parse("purge").unwrap();
        assert!(purge.contains(&Method::from_bytes(b"PURGE").unwrap()));

        assert!(MethodSet::parse("").is_err());
        assert!(MethodSet::parse("GE T").is_err());
    }

    #[test]
    fn test_lower_case_extension_method_is_normalized() {
        let set = MethodSet::from(Method::from_bytes(b"get").unwrap());
        assert!(set.contains(&Method::GET));
        assert!(set.contains(&Method::HEAD));
    }
}
