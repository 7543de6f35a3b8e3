//! Route parameters captured by a successful match.

/// A single named value captured from a request path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Parameter {
    name: String,
    value: Option<String>,
}

impl Parameter {
    /// Create a parameter with no value yet.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: None,
        }
    }

    pub fn with_value(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: Some(value.into()),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Captured value; `None` when the parameter sits in an optional
    /// group that did not participate in the match.
    pub fn value(&self) -> Option<&str> {
        self.value.as_deref()
    }

    pub fn set_value(&mut self, value: Option<String>) {
        self.value = value;
    }
}

/// Ordered, name-keyed collection of parameters for one route match.
///
/// Order is the order of appearance in the route pattern. Adding a name
/// that is already present overwrites that entry in place: the last write
/// wins and the original position is kept. A pattern that repeats a
/// parameter name therefore exposes only the last captured occurrence.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParameterSet {
    parameters: Vec<Parameter>,
}

impl ParameterSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or overwrite a parameter.
    pub fn add(&mut self, parameter: Parameter) -> &mut Parameter {
        let idx = match self.position(parameter.name()) {
            Some(idx) => {
                self.parameters[idx] = parameter;
                idx
            }
            None => {
                self.parameters.push(parameter);
                self.parameters.len() - 1
            }
        };
        &mut self.parameters[idx]
    }

    pub fn get(&self, name: &str) -> Option<&Parameter> {
        self.parameters.iter().find(|p| p.name == name)
    }

    pub fn get_mut(&mut self, name: &str) -> Option<&mut Parameter> {
        self.parameters.iter_mut().find(|p| p.name == name)
    }

    pub fn has(&self, name: &str) -> bool {
        self.position(name).is_some()
    }

    /// Shortcut for the captured value of `name`.
    pub fn value(&self, name: &str) -> Option<&str> {
        self.get(name).and_then(Parameter::value)
    }

    pub fn remove(&mut self, name: &str) -> Option<Parameter> {
        self.position(name).map(|idx| self.parameters.remove(idx))
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Parameter> {
        self.parameters.iter()
    }

    pub fn len(&self) -> usize {
        self.parameters.len()
    }

    pub fn is_empty(&self) -> bool {
        self.parameters.is_empty()
    }

    fn position(&self, name: &str) -> Option<usize> {
        self.parameters.iter().position(|p| p.name == name)
    }
}

impl<'a> IntoIterator for &'a ParameterSet {
    type Item = &'a Parameter;
    type IntoIter = std::slice::Iter<'a, Parameter>;

    fn into_iter(self) -> Self::IntoIter {
        self.parameters.iter()
    }
}

impl IntoIterator for ParameterSet {
    type Item = Parameter;
    type IntoIter = std::vec::IntoIter<Parameter>;

    fn into_iter(self) -> Self::IntoIter {
        self.parameters.into_iter()
    }
}

impl FromIterator<Parameter> for ParameterSet {
    fn from_iter<I: IntoIterator<Item = Parameter>>(iter: I) -> Self {
        let mut set = ParameterSet::new();
        for parameter in iter {
            set.add(parameter);
        }
        set
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_duplicate_name_overwrites_in_place() {
        let mut set = ParameterSet::new();
        set.add(Parameter::with_value("a", "1"));
        set.add(Parameter::with_value("b", "2"));
        set.add(Parameter::with_value("a", "3"));

        assert_eq!(set.len(), 2);
        let names: Vec<_> = set.iter().map(Parameter::name).collect();
        assert_eq!(names, ["a", "b"]);
        assert_eq!(set.value("a"), Some("3"));
    }

    #[test]
    fn test_unset_value_and_removal() {
        let mut set = ParameterSet::new();
        set.add(Parameter::new("ext"));
        assert!(set.has("ext"));
        assert_eq!(set.value("ext"), None);

        set.get_mut("ext").unwrap().set_value(Some("pdf".into()));
        assert_eq!(set.value("ext"), Some("pdf"));

        let removed = set.remove("ext").unwrap();
        assert_eq!(removed.value(), Some("pdf"));
        assert!(set.is_empty());
        assert!(set.remove("ext").is_none());
    }
}
