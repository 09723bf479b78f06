//! Variable definitions and assignment enumeration.
//!
//! `Definitions` maps each template variable to its ordered list of
//! candidate values. Enumeration produces the cartesian product of the
//! candidate lists as a list of total assignments, in a deterministic
//! order: variables in insertion order, values in their given order.

use std::sync::OnceLock;

use regex::Regex;
use serde_json::Value;

use crate::config::EmptyDomainPolicy;

/// Regex pattern for a well-formed variable name.
const VARIABLE_NAME_PATTERN: &str = r"^[A-Za-z_][A-Za-z0-9_]*$";

static VARIABLE_NAME_REGEX: OnceLock<Regex> = OnceLock::new();

fn variable_name_regex() -> &'static Regex {
    VARIABLE_NAME_REGEX
        .get_or_init(|| Regex::new(VARIABLE_NAME_PATTERN).expect("invalid regex pattern"))
}

/// Returns true if `name` is a well-formed variable name.
pub fn is_valid_variable_name(name: &str) -> bool {
    variable_name_regex().is_match(name)
}

/// One total mapping from every defined variable to one concrete value.
pub type Assignment = Vec<(String, Value)>;

/// Insertion-ordered mapping of variable name to candidate values.
///
/// Redefining a name overrides its candidate list in place, keeping the
/// original insertion position so enumeration order is stable across
/// redefinitions.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Definitions {
    entries: Vec<(String, Vec<Value>)>,
}

impl Definitions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn get(&self, name: &str) -> Option<&[Value]> {
        self.entries
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v.as_slice())
    }

    /// Variable names in insertion order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(n, _)| n.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &[Value])> {
        self.entries
            .iter()
            .map(|(n, v)| (n.as_str(), v.as_slice()))
    }

    /// Defines or redefines a variable's candidate list.
    pub fn insert(&mut self, name: impl Into<String>, values: Vec<Value>) {
        let name = name.into();
        match self.entries.iter_mut().find(|(n, _)| *n == name) {
            Some((_, existing)) => *existing = values,
            None => self.entries.push((name, values)),
        }
    }

    /// Removes a variable. Returns false if the name was not defined.
    pub fn remove(&mut self, name: &str) -> bool {
        let before = self.entries.len();
        self.entries.retain(|(n, _)| n != name);
        self.entries.len() < before
    }

    /// Enumerates every total assignment: the cartesian product of the
    /// candidate lists.
    ///
    /// An empty `Definitions` yields no assignments, which callers treat as
    /// "no substitution applicable". Under [`EmptyDomainPolicy::Strict`] a
    /// variable with an empty candidate list also empties the product;
    /// under [`EmptyDomainPolicy::Skip`] such variables are left out of the
    /// assignments entirely.
    pub fn assignments(&self, policy: EmptyDomainPolicy) -> Vec<Assignment> {
        if self.entries.is_empty() {
            return Vec::new();
        }
        let mut partial: Vec<Assignment> = vec![Vec::new()];
        for (name, values) in &self.entries {
            if values.is_empty() {
                match policy {
                    EmptyDomainPolicy::Strict => return Vec::new(),
                    EmptyDomainPolicy::Skip => continue,
                }
            }
            let mut extended = Vec::with_capacity(partial.len() * values.len());
            for value in values {
                for assignment in &partial {
                    let mut next = assignment.clone();
                    next.push((name.clone(), value.clone()));
                    extended.push(next);
                }
            }
            partial = extended;
        }
        // Every domain was empty under Skip: nothing to assign.
        partial.retain(|a| !a.is_empty());
        partial
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn defs(pairs: &[(&str, &[&str])]) -> Definitions {
        let mut d = Definitions::new();
        for (name, values) in pairs {
            d.insert(*name, values.iter().map(|v| json!(v)).collect());
        }
        d
    }

    #[test]
    fn test_empty_definitions_yield_no_assignments() {
        assert!(Definitions::new()
            .assignments(EmptyDomainPolicy::Strict)
            .is_empty());
    }

    #[test]
    fn test_product_cardinality() {
        let d = defs(&[("a", &["a1", "a2"]), ("b", &["b1", "b2", "b3"])]);
        let assignments = d.assignments(EmptyDomainPolicy::Strict);
        assert_eq!(assignments.len(), 6);
        for a in &assignments {
            assert_eq!(a.len(), 2);
        }
    }

    #[test]
    fn test_enumeration_is_deterministic() {
        let d = defs(&[("a", &["a1", "a2"]), ("b", &["b1", "b2"])]);
        let first = d.assignments(EmptyDomainPolicy::Strict);
        let second = d.assignments(EmptyDomainPolicy::Strict);
        assert_eq!(first, second);
        // Insertion order over variables, given order over values.
        assert_eq!(first[0], vec![("a".into(), json!("a1")), ("b".into(), json!("b1"))]);
    }

    #[test]
    fn test_empty_domain_strict_empties_product() {
        let mut d = defs(&[("a", &["a1", "a2"])]);
        d.insert("b", Vec::new());
        assert!(d.assignments(EmptyDomainPolicy::Strict).is_empty());
    }

    #[test]
    fn test_empty_domain_skip_ignores_variable() {
        let mut d = defs(&[("a", &["a1", "a2"])]);
        d.insert("b", Vec::new());
        let assignments = d.assignments(EmptyDomainPolicy::Skip);
        assert_eq!(assignments.len(), 2);
        for a in &assignments {
            assert_eq!(a.len(), 1);
            assert_eq!(a[0].0, "a");
        }
    }

    #[test]
    fn test_all_domains_empty_skip() {
        let mut d = Definitions::new();
        d.insert("a", Vec::new());
        assert!(d.assignments(EmptyDomainPolicy::Skip).is_empty());
    }

    #[test]
    fn test_redefinition_overrides_in_place() {
        let mut d = defs(&[("a", &["a1"]), ("b", &["b1"])]);
        d.insert("a", vec![json!("a2")]);
        assert_eq!(d.get("a"), Some(&[json!("a2")][..]));
        // Position retained: 'a' still enumerates first.
        let names: Vec<&str> = d.names().collect();
        assert_eq!(names, vec!["a", "b"]);
    }

    #[test]
    fn test_remove() {
        let mut d = defs(&[("a", &["a1"])]);
        assert!(d.remove("a"));
        assert!(!d.remove("a"));
        assert!(d.is_empty());
    }

    #[test]
    fn test_variable_name_validation() {
        assert!(is_valid_variable_name("a"));
        assert!(is_valid_variable_name("_x9"));
        assert!(is_valid_variable_name("long_name"));
        assert!(!is_valid_variable_name("9a"));
        assert!(!is_valid_variable_name("a-b"));
        assert!(!is_valid_variable_name(""));
        assert!(!is_valid_variable_name("a b"));
    }
}
