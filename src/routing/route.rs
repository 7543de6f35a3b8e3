//! A single routable unit.
//!
//! # Responsibilities
//! - Hold methods, pattern, handler and the optional name and namespace
//! - Hold per-parameter pattern overrides, header constraints and middleware
//! - Match a request and return the captured parameters as a value
//! - Build a concrete URI from parameter values
//!
//! # Design Decisions
//! - Matching never mutates the route; a `Route` can be shared across
//!   threads and matched concurrently
//! - The compiled pattern is memoised and dropped on every mutation
//! - Checks run cheapest first: method, path, required headers, forbidden headers

use std::collections::HashMap;
use std::sync::OnceLock;

use axum::http::{HeaderMap, Method, Request, Uri};
use regex::Regex;

use crate::error::RouterError;
use crate::handler::{HandlerEntry, MiddlewareEntry};
use crate::routing::group::RouteGroup;
use crate::routing::methods::MethodSet;
use crate::routing::parameter::ParameterSet;
use crate::routing::pattern::{self, CompiledPattern};

/// Header condition checked after method and path matched.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HeaderConstraint {
    /// Header must be present and its value must fully match `pattern`.
    Require { name: String, pattern: String },
    /// Header must be absent.
    Forbid { name: String },
}

#[derive(Debug, Clone)]
struct CompiledRoute {
    pattern: CompiledPattern,
    required: Vec<(String, Regex)>,
    forbidden: Vec<String>,
}

#[derive(Debug, Clone)]
pub struct Route {
    methods: MethodSet,
    pattern: String,
    handler: HandlerEntry,
    name: Option<String>,
    name_prefix: String,
    namespace: Option<String>,
    patterns: HashMap<String, String>,
    headers: Vec<HeaderConstraint>,
    middleware: Vec<MiddlewareEntry>,
    compiled: OnceLock<CompiledRoute>,
}

impl Route {
    pub fn new(
        methods: impl Into<MethodSet>,
        pattern: impl Into<String>,
        handler: impl Into<HandlerEntry>,
    ) -> Self {
        Self {
            methods: methods.into(),
            pattern: pattern.into(),
            handler: handler.into(),
            name: None,
            name_prefix: String::new(),
            namespace: None,
            patterns: HashMap::new(),
            headers: Vec::new(),
            middleware: Vec::new(),
            compiled: OnceLock::new(),
        }
    }

    pub fn methods(&self) -> &MethodSet {
        &self.methods
    }

    pub fn pattern(&self) -> &str {
        &self.pattern
    }

    pub fn handler(&self) -> &HandlerEntry {
        &self.handler
    }

    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    pub fn namespace(&self) -> Option<&str> {
        self.namespace.as_deref()
    }

    pub fn header_constraints(&self) -> &[HeaderConstraint] {
        &self.headers
    }

    pub fn middleware_entries(&self) -> &[MiddlewareEntry] {
        &self.middleware
    }

    /// Name the route for reverse routing. Group name prefixes apply.
    pub fn named(&mut self, name: impl Into<String>) -> &mut Self {
        self.name = Some(format!("{}{}", self.name_prefix, name.into()));
        self
    }

    /// Prefix deferred handler identifiers with `namespace::`.
    pub fn in_namespace(&mut self, namespace: &str) -> &mut Self {
        self.namespace = normalize_namespace(namespace);
        self
    }

    /// Sub-pattern for `{param}` occurrences that declare none inline.
    pub fn pattern_for(&mut self, param: impl Into<String>, regex: impl Into<String>) -> &mut Self {
        self.patterns.insert(param.into(), regex.into());
        self.invalidate()
    }

    /// Require a header whose value fully matches `pattern`.
    pub fn with_header(&mut self, name: &str, pattern: impl Into<String>) -> &mut Self {
        self.headers.push(HeaderConstraint::Require {
            name: name.to_ascii_lowercase(),
            pattern: pattern.into(),
        });
        self.invalidate()
    }

    /// Require a header with any value.
    pub fn require_header(&mut self, name: &str) -> &mut Self {
        self.with_header(name, ".*")
    }

    /// Reject requests that carry `name`.
    pub fn without_header(&mut self, name: &str) -> &mut Self {
        self.headers.push(HeaderConstraint::Forbid {
            name: name.to_ascii_lowercase(),
        });
        self.invalidate()
    }

    pub fn middleware(&mut self, entry: impl Into<MiddlewareEntry>) -> &mut Self {
        self.middleware.push(entry.into());
        self
    }

    /// Handler with the route namespace applied to deferred identifiers.
    pub fn resolved_handler(&self) -> HandlerEntry {
        match (&self.handler, &self.namespace) {
            (HandlerEntry::Deferred(id), Some(namespace)) => {
                HandlerEntry::Deferred(format!("{namespace}::{id}"))
            }
            (handler, _) => handler.clone(),
        }
    }

    /// Compile the pattern and header constraints, reusing a previous result.
    pub fn compiled(&self) -> Result<&CompiledPattern, RouterError> {
        self.compile().map(|compiled| &compiled.pattern)
    }

    pub fn match_request<B>(&self, request: &Request<B>) -> Result<Option<ParameterSet>, RouterError> {
        self.match_parts(request.method(), request.uri().path(), request.headers())
    }

    /// Match method, path and headers. `Ok(None)` is a plain mismatch;
    /// `Err` means the pattern or a header constraint does not compile.
    pub fn match_parts(
        &self,
        method: &Method,
        path: &str,
        headers: &HeaderMap,
    ) -> Result<Option<ParameterSet>, RouterError> {
        if !self.methods.contains(method) {
            return Ok(None);
        }

        let compiled = self.compile()?;
        let Some(captures) = compiled.pattern.match_path(path) else {
            return Ok(None);
        };

        for (name, regex) in &compiled.required {
            let satisfied = header_line(headers, name).is_some_and(|value| regex.is_match(&value));
            if !satisfied {
                tracing::trace!(pattern = %self.pattern, header = %name, "Required header missing or invalid");
                return Ok(None);
            }
        }
        for name in &compiled.forbidden {
            if headers.contains_key(name.as_str()) {
                tracing::trace!(pattern = %self.pattern, header = %name, "Forbidden header present");
                return Ok(None);
            }
        }

        Ok(Some(compiled.pattern.parameters_from(&captures)))
    }

    /// Render the path for `params` without wrapping it in a URI.
    pub fn path<I, K, V>(&self, params: I) -> Result<String, RouterError>
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        let values: HashMap<String, String> = params
            .into_iter()
            .map(|(k, v)| (k.into(), v.into()))
            .collect();
        self.compiled()?.render(&values)
    }

    /// Build a URI from parameter values.
    pub fn uri<I, K, V>(&self, params: I) -> Result<Uri, RouterError>
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        to_uri(self.path(params)?)
    }

    /// Merge the attributes of the enclosing group into this route.
    pub(crate) fn apply_group(&mut self, group: &RouteGroup) {
        if !group.prefix().is_empty() {
            self.pattern = if self.pattern == "/" || self.pattern.is_empty() {
                group.prefix().to_string()
            } else {
                format!("{}{}", group.prefix(), self.pattern)
            };
        }

        self.name_prefix = group.name_prefix().to_string();
        if let Some(name) = self.name.take() {
            self.name = Some(format!("{}{name}", self.name_prefix));
        }

        if self.namespace.is_none() {
            self.namespace = group.namespace().map(str::to_string);
        }

        for (param, regex) in group.patterns() {
            self.patterns
                .entry(param.clone())
                .or_insert_with(|| regex.clone());
        }

        let mut middleware = group.middleware().to_vec();
        middleware.append(&mut self.middleware);
        self.middleware = middleware;

        self.invalidate();
    }

    fn invalidate(&mut self) -> &mut Self {
        self.compiled = OnceLock::new();
        self
    }

    fn compile(&self) -> Result<&CompiledRoute, RouterError> {
        if let Some(compiled) = self.compiled.get() {
            return Ok(compiled);
        }

        let pattern = pattern::compile(&self.pattern, &self.patterns)?;
        let mut required = Vec::new();
        let mut forbidden = Vec::new();
        for constraint in &self.headers {
            match constraint {
                HeaderConstraint::Require { name, pattern } => {
                    let regex = Regex::new(&format!("^(?:{pattern})$")).map_err(|e| {
                        RouterError::invalid_pattern(pattern, format!("header '{name}': {e}"))
                    })?;
                    required.push((name.clone(), regex));
                }
                HeaderConstraint::Forbid { name } => forbidden.push(name.clone()),
            }
        }

        Ok(self.compiled.get_or_init(|| CompiledRoute {
            pattern,
            required,
            forbidden,
        }))
    }
}

pub(crate) fn normalize_namespace(namespace: &str) -> Option<String> {
    let namespace = namespace.trim().replace('/', "::");
    let namespace = namespace.trim_matches(':');
    (!namespace.is_empty()).then(|| namespace.to_string())
}

pub(crate) fn to_uri(path: String) -> Result<Uri, RouterError> {
    let uri = Uri::try_from(path.as_str()).map_err(|e| RouterError::InvalidUri {
        uri: path.clone(),
        reason: e.to_string(),
    })?;
    // `?` or `#` in a value would otherwise leak into the query or fragment.
    if uri.path() != path {
        return Err(RouterError::InvalidUri {
            reason: format!("path would be parsed as '{}'", uri.path()),
            uri: path,
        });
    }
    Ok(uri)
}

// Multiple values are joined the way a single header line would read.
fn header_line(headers: &HeaderMap, name: &str) -> Option<String> {
    let values: Vec<_> = headers
        .get_all(name)
        .iter()
        .map(|value| String::from_utf8_lossy(value.as_bytes()))
        .collect();
    if values.is_empty() {
        None
    } else {
        Some(values.join(", "))
    }
}
