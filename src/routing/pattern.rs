//! Route pattern compiler.
//!
//! Application authors write patterns directly, so this grammar is part of
//! the public route-registration API.
//!
//! # Grammar
//! ```text
//! /users/{id}                 named parameter, matches one segment ([^/]+)
//! /users/{id:[0-9]+}          named parameter with an inline sub-pattern
//! /archive/{year:[0-9]{4}}    sub-patterns may contain balanced braces
//! /files/[{ext}]              optional group, rendered as (?:...)?
//! /posts[/{page}[/{size}]]    optional groups nest
//! /legacy/[id:[0-9]+] ...     NOT supported: see below
//! /legacy/[id:\d+]            legacy form, normalized to {id:\d+}
//! /legacy/[:id]               legacy form, normalized to {id}
//! ```
//!
//! # Rules
//! - Literal text is matched verbatim (it is regex-escaped)
//! - Parameter names are ASCII alphanumerics and `_`
//! - An optional group that directly follows a `/` absorbs that slash,
//!   unless the slash is the first character of the pattern; `/files/[{ext}]`
//!   therefore matches both `/files` and `/files/pdf`
//! - An inline sub-pattern wins over a per-route override, which wins over
//!   the default `[^/]+`
//! - Legacy bracket parameters cannot contain brackets in their sub-pattern
//! - A name may repeat; the match keeps the last captured occurrence
//! - The whole path must match (`^...$`)

use std::collections::HashMap;

use regex::{Captures, Regex};

use crate::error::RouterError;
use crate::routing::parameter::{Parameter, ParameterSet};

/// Sub-pattern used when neither the pattern nor the route supplies one.
pub const DEFAULT_PARAMETER_PATTERN: &str = "[^/]+";

/// One node of a parsed route pattern.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Segment {
    Literal(String),
    Parameter {
        name: String,
        pattern: Option<String>,
    },
    Optional(Vec<Segment>),
}

/// A parameter occurrence in a compiled pattern.
#[derive(Debug, Clone)]
pub struct ParameterSpec {
    name: String,
    pattern: String,
    group: String,
    constraint: Regex,
}

impl ParameterSpec {
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Effective sub-pattern after overrides were applied.
    pub fn pattern(&self) -> &str {
        &self.pattern
    }

    /// True if `value` fully satisfies the sub-pattern.
    pub fn accepts(&self, value: &str) -> bool {
        self.constraint.is_match(value)
    }
}

/// Executable form of a route pattern.
#[derive(Debug, Clone)]
pub struct CompiledPattern {
    source: String,
    regex: Regex,
    parameters: Vec<ParameterSpec>,
    segments: Vec<Segment>,
}

/// Compile `pattern`, taking sub-patterns from `overrides` for parameters
/// that do not declare one inline.
pub fn compile(
    pattern: &str,
    overrides: &HashMap<String, String>,
) -> Result<CompiledPattern, RouterError> {
    let normalized = normalize(pattern);
    let segments = Parser::new(pattern, &normalized).parse()?;

    let mut body = String::with_capacity(normalized.len() * 2);
    let mut parameters = Vec::new();
    render_regex(pattern, &segments, overrides, &mut body, &mut parameters)?;

    let regex = Regex::new(&format!("^{body}$"))
        .map_err(|e| RouterError::invalid_pattern(pattern, e.to_string()))?;

    Ok(CompiledPattern {
        source: pattern.to_string(),
        regex,
        parameters,
        segments,
    })
}

impl CompiledPattern {
    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn regex(&self) -> &Regex {
        &self.regex
    }

    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    /// Parameter occurrences in order of appearance.
    pub fn parameters(&self) -> &[ParameterSpec] {
        &self.parameters
    }

    pub fn is_static(&self) -> bool {
        self.parameters.is_empty()
    }

    /// Match a full path, returning the raw captures.
    pub fn match_path<'p>(&self, path: &'p str) -> Option<Captures<'p>> {
        self.regex.captures(path)
    }

    /// Build the parameter set from captures returned by [`match_path`].
    ///
    /// Every declared parameter is present; parameters inside optional
    /// groups that did not participate keep no value.
    ///
    /// [`match_path`]: CompiledPattern::match_path
    pub fn parameters_from(&self, captures: &Captures<'_>) -> ParameterSet {
        let mut set = ParameterSet::new();
        for spec in &self.parameters {
            let value = captures.name(&spec.group).map(|m| m.as_str().to_string());
            match set.get_mut(&spec.name) {
                Some(existing) if value.is_some() => existing.set_value(value),
                Some(_) => {}
                None => {
                    let mut parameter = Parameter::new(spec.name.clone());
                    parameter.set_value(value);
                    set.add(parameter);
                }
            }
        }
        set
    }

    /// Convenience wrapper over [`match_path`] and [`parameters_from`].
    ///
    /// [`match_path`]: CompiledPattern::match_path
    /// [`parameters_from`]: CompiledPattern::parameters_from
    pub fn captures(&self, path: &str) -> Option<ParameterSet> {
        self.match_path(path).map(|caps| self.parameters_from(&caps))
    }

    /// Render a concrete path from parameter values (reverse routing).
    pub fn render(&self, values: &HashMap<String, String>) -> Result<String, RouterError> {
        let mut out = String::with_capacity(self.source.len());
        let mut cursor = 0;
        self.render_segments(&self.segments, values, &mut cursor, &mut out)?;
        Ok(out)
    }

    fn render_segments(
        &self,
        segments: &[Segment],
        values: &HashMap<String, String>,
        cursor: &mut usize,
        out: &mut String,
    ) -> Result<(), RouterError> {
        for segment in segments {
            match segment {
                Segment::Literal(text) => out.push_str(text),
                Segment::Parameter { name, .. } => {
                    let spec = &self.parameters[*cursor];
                    *cursor += 1;

                    let value = values
                        .get(name)
                        .ok_or_else(|| RouterError::UnresolvedParameter(name.clone()))?;
                    if !spec.accepts(value) {
                        return Err(RouterError::ParameterConstraintViolation {
                            name: name.clone(),
                            value: value.clone(),
                            pattern: spec.pattern.clone(),
                        });
                    }
                    out.push_str(value);
                }
                Segment::Optional(inner) => {
                    if mentions_any(inner, values) {
                        self.render_segments(inner, values, cursor, out)?;
                    } else {
                        *cursor += count_parameters(inner);
                    }
                }
            }
        }
        Ok(())
    }
}

/// Rewrite legacy bracket parameters (`[name:regex]`, `[:name]`) into the
/// brace form. Everything else is returned unchanged.
pub fn normalize(pattern: &str) -> String {
    let mut out = String::with_capacity(pattern.len());
    let mut rest = pattern;

    while let Some(c) = rest.chars().next() {
        match c {
            '{' => {
                let end = closing_brace(rest).unwrap_or(rest.len());
                out.push_str(&rest[..end]);
                rest = &rest[end..];
            }
            '[' => {
                let legacy = rest[1..].find(']').and_then(|close| {
                    legacy_parameter(&rest[1..1 + close]).map(|param| (param, close + 2))
                });
                match legacy {
                    Some((param, consumed)) => {
                        out.push_str(&param);
                        rest = &rest[consumed..];
                    }
                    None => {
                        out.push('[');
                        rest = &rest[1..];
                    }
                }
            }
            _ => {
                out.push(c);
                rest = &rest[c.len_utf8()..];
            }
        }
    }
    out
}

/// Byte offset just past the `}` closing the group `s` starts with.
fn closing_brace(s: &str) -> Option<usize> {
    let mut depth = 0usize;
    let mut escaped = false;
    for (i, c) in s.char_indices() {
        if escaped {
            escaped = false;
            continue;
        }
        match c {
            '\\' => escaped = true,
            '{' => depth += 1,
            '}' => {
                depth = depth.saturating_sub(1);
                if depth == 0 {
                    return Some(i + 1);
                }
            }
            _ => {}
        }
    }
    None
}

fn legacy_parameter(content: &str) -> Option<String> {
    if content.contains(|c| matches!(c, '[' | '{' | '}')) {
        return None;
    }
    let (name, pattern) = content.split_once(':')?;
    if pattern.is_empty() {
        return None;
    }
    if name.is_empty() {
        return is_valid_name(pattern).then(|| format!("{{{pattern}}}"));
    }
    is_valid_name(name).then(|| format!("{{{name}:{pattern}}}"))
}

pub(crate) fn is_valid_name(name: &str) -> bool {
    !name.is_empty() && name.chars().all(|c| c.is_ascii_alphanumeric() || c == '_')
}

fn count_parameters(segments: &[Segment]) -> usize {
    segments
        .iter()
        .map(|segment| match segment {
            Segment::Literal(_) => 0,
            Segment::Parameter { .. } => 1,
            Segment::Optional(inner) => count_parameters(inner),
        })
        .sum()
}

fn mentions_any(segments: &[Segment], values: &HashMap<String, String>) -> bool {
    segments.iter().any(|segment| match segment {
        Segment::Literal(_) => false,
        Segment::Parameter { name, .. } => values.contains_key(name),
        Segment::Optional(inner) => mentions_any(inner, values),
    })
}

fn render_regex(
    source: &str,
    segments: &[Segment],
    overrides: &HashMap<String, String>,
    out: &mut String,
    parameters: &mut Vec<ParameterSpec>,
) -> Result<(), RouterError> {
    for segment in segments {
        match segment {
            Segment::Literal(text) => out.push_str(&regex::escape(text)),
            Segment::Parameter { name, pattern } => {
                let sub = pattern
                    .as_deref()
                    .or_else(|| overrides.get(name).map(String::as_str))
                    .unwrap_or(DEFAULT_PARAMETER_PATTERN);
                let constraint = Regex::new(&format!("^(?:{sub})$")).map_err(|e| {
                    RouterError::invalid_pattern(source, format!("parameter '{name}': {e}"))
                })?;
                let group = format!("__p{}", parameters.len());

                out.push_str("(?P<");
                out.push_str(&group);
                out.push('>');
                out.push_str(sub);
                out.push(')');

                parameters.push(ParameterSpec {
                    name: name.clone(),
                    pattern: sub.to_string(),
                    group,
                    constraint,
                });
            }
            Segment::Optional(inner) => {
                out.push_str("(?:");
                render_regex(source, inner, overrides, out, parameters)?;
                out.push_str(")?");
            }
        }
    }
    Ok(())
}

struct Parser<'a> {
    source: &'a str,
    chars: Vec<char>,
    pos: usize,
}

impl<'a> Parser<'a> {
    fn new(source: &'a str, normalized: &str) -> Self {
        Self {
            source,
            chars: normalized.chars().collect(),
            pos: 0,
        }
    }

    fn parse(mut self) -> Result<Vec<Segment>, RouterError> {
        self.parse_sequence(0)
    }

    fn parse_sequence(&mut self, depth: usize) -> Result<Vec<Segment>, RouterError> {
        let mut segments = Vec::new();
        let mut literal = String::new();

        while self.pos < self.chars.len() {
            match self.chars[self.pos] {
                '{' => {
                    flush(&mut literal, &mut segments);
                    let parameter = self.parse_parameter()?;
                    segments.push(parameter);
                }
                '[' => {
                    let absorb_slash = literal.ends_with('/') && self.pos > 1;
                    if absorb_slash {
                        literal.pop();
                    }
                    flush(&mut literal, &mut segments);
                    self.pos += 1;

                    let mut inner = self.parse_sequence(depth + 1)?;
                    if absorb_slash {
                        match inner.first_mut() {
                            Some(Segment::Literal(text)) => text.insert(0, '/'),
                            _ => inner.insert(0, Segment::Literal("/".into())),
                        }
                    }
                    segments.push(Segment::Optional(inner));
                }
                ']' => {
                    if depth == 0 {
                        return Err(self.error("unmatched ']'"));
                    }
                    self.pos += 1;
                    flush(&mut literal, &mut segments);
                    return Ok(segments);
                }
                '}' => return Err(self.error("unmatched '}'")),
                c => {
                    literal.push(c);
                    self.pos += 1;
                }
            }
        }

        if depth > 0 {
            return Err(self.error("unclosed '['"));
        }
        flush(&mut literal, &mut segments);
        Ok(segments)
    }

    fn parse_parameter(&mut self) -> Result<Segment, RouterError> {
        // Skip the opening brace.
        self.pos += 1;
        let mut depth = 1usize;
        let mut body = String::new();

        while self.pos < self.chars.len() {
            let c = self.chars[self.pos];
            self.pos += 1;
            match c {
                '\\' => {
                    body.push(c);
                    if let Some(&next) = self.chars.get(self.pos) {
                        body.push(next);
                        self.pos += 1;
                    }
                }
                '{' => {
                    depth += 1;
                    body.push(c);
                }
                '}' => {
                    depth -= 1;
                    if depth == 0 {
                        return self.parameter(&body);
                    }
                    body.push(c);
                }
                _ => body.push(c),
            }
        }
        Err(self.error("unclosed '{'"))
    }

    fn parameter(&self, body: &str) -> Result<Segment, RouterError> {
        let (name, pattern) = match body.split_once(':') {
            Some((name, pattern)) => (name, Some(pattern)),
            None => (body, None),
        };
        if !is_valid_name(name) {
            return Err(self.error(format!("invalid parameter name '{name}'")));
        }
        if pattern == Some("") {
            return Err(self.error(format!("empty sub-pattern for parameter '{name}'")));
        }
        Ok(Segment::Parameter {
            name: name.to_string(),
            pattern: pattern.map(str::to_string),
        })
    }

    fn error(&self, reason: impl Into<String>) -> RouterError {
        RouterError::invalid_pattern(self.source, reason)
    }
}

fn flush(literal: &mut String, segments: &mut Vec<Segment>) {
    if !literal.is_empty() {
        segments.push(Segment::Literal(std::mem::take(literal)));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn plain(pattern: &str) -> CompiledPattern {
        compile(pattern, &HashMap::new()).unwrap()
    }

    fn values(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_static_pattern_is_anchored_literal() {
        let compiled = plain("/health.json");
        assert!(compiled.is_static());
        assert_eq!(compiled.regex().as_str(), r"^/health\.json$");
        assert!(compiled.captures("/health.json").is_some());
        assert!(compiled.captures("/healthxjson").is_none());
        assert!(compiled.captures("/health.json/extra").is_none());
    }

    #[test]
    fn test_default_and_inline_sub_patterns() {
        let compiled = plain("/users/{id:[0-9]+}/posts/{slug}");
        let names: Vec<_> = compiled.parameters().iter().map(ParameterSpec::name).collect();
        assert_eq!(names, ["id", "slug"]);

        let params = compiled.captures("/users/42/posts/hello-world").unwrap();
        assert_eq!(params.value("id"), Some("42"));
        assert_eq!(params.value("slug"), Some("hello-world"));

        assert!(compiled.captures("/users/abc/posts/x").is_none());
        assert!(compiled.captures("/users/42/posts/a/b").is_none());
    }

    #[test]
    fn test_sub_pattern_with_braces() {
        let compiled = plain("/archive/{year:[0-9]{4}}");
        assert_eq!(
            compiled.captures("/archive/2024").unwrap().value("year"),
            Some("2024")
        );
        assert!(compiled.captures("/archive/24").is_none());
    }

    #[test]
    fn test_override_applies_only_without_inline_pattern() {
        let overrides = values(&[("id", "[a-f]+"), ("slug", "[0-9]+")]);
        let compiled = compile("/{id}/{slug:[a-z]+}", &overrides).unwrap();
        assert!(compiled.captures("/abc/xyz").is_some());
        assert!(compiled.captures("/xyz/xyz").is_none());
        assert!(compiled.captures("/abc/123").is_none());
    }

    #[test]
    fn test_optional_group_absorbs_preceding_slash() {
        let compiled = plain("/files/[{ext}]");
        let bare = compiled.captures("/files").unwrap();
        assert!(bare.has("ext"));
        assert_eq!(bare.value("ext"), None);

        let with_ext = compiled.captures("/files/pdf").unwrap();
        assert_eq!(with_ext.value("ext"), Some("pdf"));
    }

    #[test]
    fn test_optional_at_root_keeps_leading_slash() {
        let compiled = plain("/[{page}]");
        assert!(compiled.captures("/").is_some());
        assert_eq!(compiled.captures("/7").unwrap().value("page"), Some("7"));
    }

    #[test]
    fn test_nested_optional_groups() {
        let compiled = plain("/posts[/{page:[0-9]+}[/{size:[0-9]+}]]");
        assert!(compiled.captures("/posts").is_some());
        assert_eq!(compiled.captures("/posts/2").unwrap().value("page"), Some("2"));
        let both = compiled.captures("/posts/2/50").unwrap();
        assert_eq!(both.value("size"), Some("50"));
    }

    #[test]
    fn test_legacy_syntax_is_normalized() {
        assert_eq!(normalize(r"/users/[id:\d+]"), r"/users/{id:\d+}");
        assert_eq!(normalize("/users/[:id]"), "/users/{id}");
        assert_eq!(normalize("/files/[{ext}]"), "/files/[{ext}]");
        assert_eq!(normalize("/a/{id:[0-9]+}"), "/a/{id:[0-9]+}");

        let compiled = plain("/users/[:id]/[n:[a-z]]");
        // `[n:[a-z]]` is not legacy (nested bracket), so it stays an optional literal.
        assert_eq!(compiled.captures("/users/7").unwrap().value("id"), Some("7"));
        assert!(compiled.captures("/users/7/n:a-z").is_some());

        let legacy = plain(r"/users/[id:\d+]");
        assert_eq!(legacy.captures("/users/9").unwrap().value("id"), Some("9"));
    }

    #[test]
    fn test_user_capture_groups_do_not_shift_parameters() {
        let compiled = plain("/{kind:(post|page)}/{id}");
        let params = compiled.captures("/page/12").unwrap();
        assert_eq!(params.value("kind"), Some("page"));
        assert_eq!(params.value("id"), Some("12"));
    }

    #[test]
    fn test_repeated_name_keeps_last_capture() {
        let compiled = plain("/{v}/{v}");
        let params = compiled.captures("/first/second").unwrap();
        assert_eq!(params.len(), 1);
        assert_eq!(params.value("v"), Some("second"));
    }

    #[test]
    fn test_invalid_patterns_are_rejected() {
        let invalid = [
            "/users/{id",
            "/users/id}",
            "/files/[{ext}",
            "/a]",
            "/{}",
            "/{bad-name}",
            "/{id:}",
            "/{id:(}",
        ];
        for pattern in invalid {
            let err = compile(pattern, &HashMap::new()).unwrap_err();
            assert!(
                matches!(err, RouterError::InvalidPattern { .. }),
                "{pattern} should be invalid, got {err:?}"
            );
        }
    }

    #[test]
    fn test_compilation_is_deterministic() {
        let a = plain("/users/{id:[0-9]+}[/{tab}]");
        let b = plain("/users/{id:[0-9]+}[/{tab}]");
        assert_eq!(a.regex().as_str(), b.regex().as_str());
        assert_eq!(a.segments(), b.segments());
    }

    #[test]
    fn test_render_required_and_optional() {
        let compiled = plain("/users/{id:[0-9]+}[/{tab}]");
        assert_eq!(compiled.render(&values(&[("id", "7")])).unwrap(), "/users/7");
        assert_eq!(
            compiled.render(&values(&[("id", "7"), ("tab", "posts")])).unwrap(),
            "/users/7/posts"
        );

        let missing = compiled.render(&values(&[("tab", "posts")])).unwrap_err();
        assert!(matches!(missing, RouterError::UnresolvedParameter(ref n) if n == "id"));

        let invalid = compiled.render(&values(&[("id", "abc")])).unwrap_err();
        assert!(matches!(
            invalid,
            RouterError::ParameterConstraintViolation { ref name, .. } if name == "id"
        ));
    }

    #[test]
    fn test_render_then_match_round_trip() {
        let compiled = plain("/shop/{category:[a-z]+}/{sku:[A-Z0-9-]+}[/{variant}]");
        let input = values(&[("category", "shoes"), ("sku", "AB-12"), ("variant", "red")]);
        let path = compiled.render(&input).unwrap();
        let matched = compiled.captures(&path).unwrap();

        let output: HashMap<String, String> = matched
            .iter()
            .filter_map(|p| p.value().map(|v| (p.name().to_string(), v.to_string())))
            .collect();
        assert_eq!(output, input);
    }
}
