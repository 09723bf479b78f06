//! rxpander-core — line-oriented template expansion for reaction models.
//!
//! A template is an ordinary text document (typically an Antimony/SBML-style
//! reaction listing) carrying two kinds of embedded structure:
//!
//! - **Expressions** — `{a}`-delimited fragments inside a line, evaluated
//!   against the current variable definitions. A line containing expressions
//!   expands into one copy per combination of variable assignments.
//! - **Commands** — `{{ ... }}` lines driving the processor, notably the
//!   `DefineVariables Begin`/`End` block whose body is a Starlark script
//!   that registers variable domains via `add_definitions()`.
//!
//! # Example
//!
//! ```
//! use rxpander_core::{Config, TemplateProcessor};
//!
//! let template = "\
//! {{ DefineVariables Begin }}
//! add_definitions({'a': ['1', '2', '3']})
//! {{ DefineVariables End }}
//! J{a}: S{a} -> S{a}_p; k{a}*S{a}";
//!
//! let mut processor = TemplateProcessor::new(Config::default());
//! let result = processor.process(template).unwrap();
//! assert!(result.text.contains("J1: S1 -> S1_p; k1*S1"));
//! assert!(result.text.contains("J3: S3 -> S3_p; k3*S3"));
//! ```
//!
//! Processing is a single synchronous forward pass; the first error aborts
//! the run with a line-numbered [`TemplateError`], and advisory
//! [`ProcessWarning`]s ride along in the [`ProcessResult`].

pub mod command;
pub mod config;
pub mod definitions;
pub mod error;
pub mod eval;
pub mod expand;
pub mod line;
pub mod processor;

pub use config::{Config, Delimiters, EmptyDomainPolicy};
pub use definitions::{Assignment, Definitions};
pub use error::{ProcessWarning, TemplateError};
pub use eval::ScriptEngine;
pub use expand::Expander;
pub use line::{LineExtractor, LineKind, LogicalLine};
pub use processor::{ProcessResult, TemplateProcessor, SUPPORTED_VERSION};
