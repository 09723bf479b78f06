//! Command-line parsing for the template processor.
//!
//! A command line has the form `{{ Verb [Start|Begin|End] [args...] }}`.
//! Recognized verbs:
//!
//! - `DefineVariables` — paired. The enclosed lines form a Starlark script
//!   executed when the block ends; the script registers variable domains
//!   through the capability functions.
//! - `SetVersion <version>` — singular. Declares the template-language
//!   version, checked against the processor's supported version.

use crate::config::Delimiters;
use crate::error::TemplateError;

/// The closed set of recognized command verbs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verb {
    DefineVariables,
    SetVersion,
}

impl Verb {
    /// The token spelling in template text.
    pub fn name(&self) -> &'static str {
        match self {
            Verb::DefineVariables => "DefineVariables",
            Verb::SetVersion => "SetVersion",
        }
    }
}

impl std::fmt::Display for Verb {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Whether a paired command opens or closes its block.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Qualifier {
    Begin,
    End,
}

/// Arity and pairing descriptor for one verb.
struct VerbSpec {
    verb: Verb,
    paired: bool,
    arity: usize,
}

/// Table-driven verb registry; parsing dispatches over this rather than
/// chained type checks.
const VERBS: &[VerbSpec] = &[
    VerbSpec {
        verb: Verb::DefineVariables,
        paired: true,
        arity: 0,
    },
    VerbSpec {
        verb: Verb::SetVersion,
        paired: false,
        arity: 1,
    },
];

/// One parsed command directive.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Command {
    pub verb: Verb,
    /// `Some` for paired commands, `None` for singular ones.
    pub qualifier: Option<Qualifier>,
    pub args: Vec<String>,
}

impl Command {
    /// Parses a command line.
    ///
    /// The line is tokenized by whitespace; the first token must equal the
    /// command-start delimiter and the last the command-end delimiter.
    /// `line_no` is attached to any syntax error.
    pub fn parse(
        text: &str,
        line_no: usize,
        delimiters: &Delimiters,
    ) -> Result<Command, TemplateError> {
        let syntax = |message: String| TemplateError::Syntax {
            line: line_no,
            text: text.to_string(),
            message,
        };

        let tokens: Vec<&str> = text.split_whitespace().collect();
        if tokens.len() < 3
            || tokens[0] != delimiters.command_start
            || tokens[tokens.len() - 1] != delimiters.command_end
        {
            return Err(syntax(format!(
                "command must be delimited by '{}' and '{}'",
                delimiters.command_start, delimiters.command_end
            )));
        }
        let inner = &tokens[1..tokens.len() - 1];

        let spec = VERBS
            .iter()
            .find(|s| s.verb.name() == inner[0])
            .ok_or_else(|| syntax(format!("unknown command '{}'", inner[0])))?;

        if spec.paired {
            let qualifier = match inner.get(1).copied() {
                Some("Start") | Some("Begin") => Qualifier::Begin,
                Some("End") => Qualifier::End,
                Some(other) => {
                    return Err(syntax(format!(
                        "unknown qualifier '{}' for {}; expected Begin, Start, or End",
                        other, spec.verb
                    )))
                }
                None => {
                    return Err(syntax(format!("{} requires a Begin/End qualifier", spec.verb)))
                }
            };
            let args = &inner[2..];
            if args.len() != spec.arity {
                return Err(syntax(format!(
                    "{} expects {} argument(s), got {}",
                    spec.verb,
                    spec.arity,
                    args.len()
                )));
            }
            Ok(Command {
                verb: spec.verb,
                qualifier: Some(qualifier),
                args: args.iter().map(|s| s.to_string()).collect(),
            })
        } else {
            let args = &inner[1..];
            if args.len() != spec.arity {
                return Err(syntax(format!(
                    "{} expects {} argument(s), got {}",
                    spec.verb,
                    spec.arity,
                    args.len()
                )));
            }
            Ok(Command {
                verb: spec.verb,
                qualifier: None,
                args: args.iter().map(|s| s.to_string()).collect(),
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn parse(text: &str) -> Result<Command, TemplateError> {
        Command::parse(text, 1, &Delimiters::default())
    }

    #[test]
    fn test_define_variables_begin() {
        let cmd = parse("{{ DefineVariables Begin }}").unwrap();
        assert_eq!(cmd.verb, Verb::DefineVariables);
        assert_eq!(cmd.qualifier, Some(Qualifier::Begin));
        assert!(cmd.args.is_empty());
    }

    #[test]
    fn test_start_is_begin_alias() {
        let cmd = parse("{{ DefineVariables Start }}").unwrap();
        assert_eq!(cmd.qualifier, Some(Qualifier::Begin));
    }

    #[test]
    fn test_define_variables_end() {
        let cmd = parse("{{ DefineVariables End }}").unwrap();
        assert_eq!(cmd.qualifier, Some(Qualifier::End));
    }

    #[test]
    fn test_set_version() {
        let cmd = parse("{{ SetVersion 1.1 }}").unwrap();
        assert_eq!(cmd.verb, Verb::SetVersion);
        assert_eq!(cmd.qualifier, None);
        assert_eq!(cmd.args, vec!["1.1".to_string()]);
    }

    #[test]
    fn test_unknown_verb() {
        let err = parse("{{ Frobnicate Begin }}").unwrap_err();
        assert_eq!(err.code(), "T001");
        assert!(err.to_string().contains("Frobnicate"));
    }

    #[test]
    fn test_bad_qualifier() {
        let err = parse("{{ DefineVariables Stop }}").unwrap_err();
        assert!(err.to_string().contains("Stop"));
    }

    #[test]
    fn test_missing_qualifier() {
        assert!(parse("{{ DefineVariables }}").is_err());
    }

    #[test]
    fn test_wrong_arity_paired() {
        assert!(parse("{{ DefineVariables Begin extra }}").is_err());
    }

    #[test]
    fn test_wrong_arity_singular() {
        assert!(parse("{{ SetVersion }}").is_err());
        assert!(parse("{{ SetVersion 1.1 2.2 }}").is_err());
    }

    #[test]
    fn test_missing_delimiters() {
        assert!(parse("DefineVariables Begin").is_err());
        assert!(parse("{{ DefineVariables Begin").is_err());
    }
}
