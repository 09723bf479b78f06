//! Expression extraction and line expansion.
//!
//! The expander finds the delimited expressions in a substitution line,
//! evaluates each one under every assignment of the template variables,
//! and splices the results into one output line per assignment,
//! deduplicated by exact text.

use std::collections::{HashMap, HashSet};

use crate::config::Config;
use crate::error::{ProcessWarning, TemplateError};
use crate::eval::convert::render;
use crate::eval::ScriptEngine;
use crate::line::LogicalLine;

/// One extracted expression occurrence.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Expression {
    /// The delimited text as it appears in the line, e.g. `{ a }`.
    pub raw: String,
    /// The expression with delimiters stripped and whitespace trimmed.
    pub text: String,
}

/// Finds the delimited expressions in `text` with a non-nesting scan: each
/// start delimiter captures up to the nearest following end delimiter, and
/// a later start delimiter before that end restarts the capture. Empty and
/// whitespace-only captures are skipped; occurrences are deduplicated by
/// raw text.
pub fn extract_expressions(text: &str, start: &str, end: &str) -> Vec<Expression> {
    let mut found = Vec::new();
    let mut seen = HashSet::new();
    let mut from = 0;
    while let Some(open) = text[from..].find(start) {
        let open = from + open;
        let body_start = open + start.len();
        let Some(close) = text[body_start..].find(end) else {
            break;
        };
        let close = body_start + close;
        // A nested start restarts the capture from the inner delimiter.
        if let Some(inner) = text[body_start..close].find(start) {
            from = body_start + inner;
            continue;
        }
        let body = text[body_start..close].trim();
        let raw = &text[open..close + end.len()];
        if !body.is_empty() && seen.insert(raw.to_string()) {
            found.push(Expression {
                raw: raw.to_string(),
                text: body.to_string(),
            });
        }
        from = close + end.len();
    }
    found
}

/// Expands substitution lines against the engine's variable definitions.
pub struct Expander<'a> {
    engine: &'a mut ScriptEngine,
    config: &'a Config,
}

impl<'a> Expander<'a> {
    pub fn new(engine: &'a mut ScriptEngine, config: &'a Config) -> Self {
        Self { engine, config }
    }

    /// Expands one logical line into one output string per assignment,
    /// deduplicated in enumeration order.
    ///
    /// With no assignments the line passes through verbatim; the
    /// post-condition scan then rejects any line still carrying a delimited
    /// expression. Assignment counts above the configured threshold push an
    /// advisory warning and proceed.
    pub fn expand(
        &mut self,
        line: &LogicalLine,
        warnings: &mut Vec<ProcessWarning>,
    ) -> Result<Vec<String>, TemplateError> {
        let delims = &self.config.delimiters;
        let definitions = self.engine.definitions().clone();
        let assignments = definitions.assignments(self.config.empty_domain);
        if assignments.len() > self.config.warning_assignments {
            warnings.push(ProcessWarning::new(
                line.line_no,
                format!("number of assignments is {}", assignments.len()),
            ));
        }

        let expressions = extract_expressions(
            &line.text,
            &delims.expression_start,
            &delims.expression_end,
        );

        let mut outputs: Vec<String> = Vec::new();
        if assignments.is_empty() {
            outputs.push(line.text.clone());
        } else {
            let mut emitted = HashSet::new();
            for assignment in assignments {
                let names: Vec<String> =
                    assignment.iter().map(|(n, _)| n.clone()).collect();
                self.engine.add_bindings(assignment);
                let result = self.substitute(line, &expressions);
                // Assignment bindings are scoped to this iteration.
                self.engine
                    .remove_bindings(names.iter().map(|n| n.as_str()))
                    .map_err(|e| TemplateError::Evaluation {
                        line: line.line_no,
                        text: line.text.clone(),
                        message: e.to_string(),
                    })?;
                let candidate = result?;
                if emitted.insert(candidate.clone()) {
                    outputs.push(candidate);
                }
            }
        }

        // No output may carry an unresolved expression.
        for output in &outputs {
            if let Some(expr) = extract_expressions(
                output,
                &delims.expression_start,
                &delims.expression_end,
            )
            .into_iter()
            .next()
            {
                return Err(TemplateError::UnresolvedExpression {
                    line: line.line_no,
                    text: line.text.clone(),
                    expression: expr.text,
                });
            }
        }
        Ok(outputs)
    }

    /// Evaluates each distinct expression once and splices the rendered
    /// value over every raw occurrence.
    fn substitute(
        &self,
        line: &LogicalLine,
        expressions: &[Expression],
    ) -> Result<String, TemplateError> {
        let mut result = line.text.clone();
        let mut cache: HashMap<&str, String> = HashMap::new();
        for expression in expressions {
            let rendered = match cache.get(expression.text.as_str()) {
                Some(r) => r.clone(),
                None => {
                    let value = self.engine.evaluate(&expression.text).map_err(|e| {
                        TemplateError::Evaluation {
                            line: line.line_no,
                            text: line.text.clone(),
                            message: format!("in expression '{}': {}", expression.text, e),
                        }
                    })?;
                    let rendered = render(&value);
                    cache.insert(&expression.text, rendered.clone());
                    rendered
                }
            };
            result = result.replace(&expression.raw, &rendered);
        }
        Ok(result)
    }
}
