//! Processor configuration: delimiters, warning threshold, enumeration policy.
//!
//! Every value is consulted once at construction time; changing delimiters
//! mid-document is unsupported. All fields have serde defaults so a partial
//! YAML configuration file deserializes cleanly.

use serde::Deserialize;

/// Number of assignments above which an advisory warning is emitted.
pub const DEFAULT_WARNING_ASSIGNMENTS: usize = 10_000;

/// Delimiter characters recognized in template text.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
#[serde(default, deny_unknown_fields)]
pub struct Delimiters {
    /// Opens a template expression.
    pub expression_start: String,
    /// Closes a template expression.
    pub expression_end: String,
    /// Opens a command line.
    pub command_start: String,
    /// Closes a command line.
    pub command_end: String,
    /// Marks a comment line (and comment-audit passthrough output).
    pub comment: String,
    /// Trailing marker joining a physical line to the next.
    pub continuation: String,
    /// Separates physical lines in input and output.
    pub line_separator: String,
}

impl Default for Delimiters {
    fn default() -> Self {
        Self {
            expression_start: "{".to_string(),
            expression_end: "}".to_string(),
            command_start: "{{".to_string(),
            command_end: "}}".to_string(),
            comment: "#".to_string(),
            continuation: "\\".to_string(),
            line_separator: "\n".to_string(),
        }
    }
}

/// How a variable bound to an empty candidate list affects enumeration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EmptyDomainPolicy {
    /// Strict cartesian product: one empty domain empties the whole product.
    Strict,
    /// Treat the variable as absent and enumerate over the rest.
    Skip,
}

/// Configuration for template processing.
#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    /// Delimiter set recognized in the template.
    pub delimiters: Delimiters,
    /// Assignment count above which an advisory warning is generated.
    pub warning_assignments: usize,
    /// Enumeration behavior for empty candidate lists.
    pub empty_domain: EmptyDomainPolicy,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            delimiters: Delimiters::default(),
            warning_assignments: DEFAULT_WARNING_ASSIGNMENTS,
            empty_domain: EmptyDomainPolicy::Strict,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_default_delimiters() {
        let d = Delimiters::default();
        assert_eq!(d.expression_start, "{");
        assert_eq!(d.expression_end, "}");
        assert_eq!(d.command_start, "{{");
        assert_eq!(d.command_end, "}}");
        assert_eq!(d.comment, "#");
        assert_eq!(d.continuation, "\\");
        assert_eq!(d.line_separator, "\n");
    }

    #[test]
    fn test_partial_yaml_uses_defaults() {
        let yaml = "delimiters:\n  comment: \"%\"\n";
        let config: Config = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(config.delimiters.comment, "%");
        assert_eq!(config.delimiters.expression_start, "{");
        assert_eq!(config.warning_assignments, DEFAULT_WARNING_ASSIGNMENTS);
        assert_eq!(config.empty_domain, EmptyDomainPolicy::Strict);
    }

    #[test]
    fn test_policy_from_yaml() {
        let config: Config = serde_yaml::from_str("empty_domain: skip\n").unwrap();
        assert_eq!(config.empty_domain, EmptyDomainPolicy::Skip);
    }
}
