//! The template-processing driver.
//!
//! A single forward pass over the logical lines of a document: transparent
//! lines pass through, command lines drive the block state machine, and
//! substitution lines are expanded against the current variable
//! definitions. Command lines and script-block bodies are echoed into the
//! output as comment-marked lines so the expansion stays auditable against
//! its templated source.

use crate::command::{Command, Qualifier, Verb};
use crate::config::Config;
use crate::error::{ProcessWarning, TemplateError};
use crate::eval::ScriptEngine;
use crate::expand::Expander;
use crate::line::{LineExtractor, LineKind, LogicalLine};

/// Template-language version this processor supports. A template declaring
/// a newer version via `SetVersion` is rejected.
pub const SUPPORTED_VERSION: f64 = 1.2;

/// The outcome of a successful processing run.
#[derive(Debug, Clone)]
pub struct ProcessResult {
    /// The fully expanded text, line-separator-joined.
    pub text: String,
    /// Advisory diagnostics gathered along the way.
    pub warnings: Vec<ProcessWarning>,
}

/// An open Begin/End block.
struct ActiveBlock {
    verb: Verb,
    opened_at: usize,
    statements: Vec<String>,
}

/// Processes a template document into its expanded form.
pub struct TemplateProcessor {
    config: Config,
    engine: ScriptEngine,
}

impl TemplateProcessor {
    pub fn new(config: Config) -> Self {
        Self {
            config,
            engine: ScriptEngine::new(),
        }
    }

    fn comment(&self, line: &str) -> String {
        format!("{}{}", self.config.delimiters.comment, line)
    }

    /// Expands `source` and returns the output text plus warnings.
    ///
    /// Fail-fast: the first error aborts the run and no output is produced.
    pub fn process(&mut self, source: &str) -> Result<ProcessResult, TemplateError> {
        let mut extractor = LineExtractor::new(source, self.config.delimiters.clone());
        let mut output: Vec<String> = Vec::new();
        let mut warnings: Vec<ProcessWarning> = Vec::new();
        let mut block: Option<ActiveBlock> = None;

        // Inside a block, physical lines keep their whitespace so script
        // indentation survives.
        while let Some(line) = extractor.next(block.is_none()) {
            match block.take() {
                Some(active) => {
                    block = self.handle_block_line(active, &line, &mut output)?;
                }
                None => match line.kind {
                    LineKind::Transparent => output.push(line.text),
                    LineKind::Command => {
                        block = self.handle_command(&line, &mut output)?;
                    }
                    LineKind::Substitution => {
                        let expanded =
                            Expander::new(&mut self.engine, &self.config)
                                .expand(&line, &mut warnings)?;
                        // Echo the original so multiplicities are traceable.
                        if expanded.len() > 1 {
                            output.push(self.comment(&line.text));
                        }
                        output.extend(expanded);
                    }
                },
            }
        }

        if let Some(active) = block {
            return Err(TemplateError::UnterminatedBlock {
                verb: active.verb.to_string(),
                opened_at: active.opened_at,
            });
        }

        Ok(ProcessResult {
            text: output.join(&self.config.delimiters.line_separator),
            warnings,
        })
    }

    /// Handles a command line encountered outside any block. Returns the
    /// block it opened, if any.
    fn handle_command(
        &mut self,
        line: &LogicalLine,
        output: &mut Vec<String>,
    ) -> Result<Option<ActiveBlock>, TemplateError> {
        let command = Command::parse(&line.text, line.line_no, &self.config.delimiters)?;
        output.push(self.comment(&line.text));
        match (command.verb, command.qualifier) {
            (verb, Some(Qualifier::Begin)) => Ok(Some(ActiveBlock {
                verb,
                opened_at: line.line_no,
                statements: Vec::new(),
            })),
            (verb, Some(Qualifier::End)) => Err(TemplateError::Syntax {
                line: line.line_no,
                text: line.text.clone(),
                message: format!("{} End without a matching Begin", verb),
            }),
            (Verb::SetVersion, None) => {
                self.check_version(line, &command.args[0])?;
                Ok(None)
            }
            (verb, None) => Err(TemplateError::Syntax {
                line: line.line_no,
                text: line.text.clone(),
                message: format!("{} cannot be used as a singular command", verb),
            }),
        }
    }

    /// Routes a logical line while a block is active: a matching End closes
    /// the block and runs its accumulated statements; any other command is
    /// a nesting error; everything else accumulates into the block body.
    /// Returns the still-active block, or `None` once closed.
    fn handle_block_line(
        &mut self,
        mut active: ActiveBlock,
        line: &LogicalLine,
        output: &mut Vec<String>,
    ) -> Result<Option<ActiveBlock>, TemplateError> {
        if line.kind == LineKind::Command {
            let command = Command::parse(&line.text, line.line_no, &self.config.delimiters)?;
            if command.verb == active.verb && command.qualifier == Some(Qualifier::End) {
                output.push(self.comment(&line.text));
                self.close_block(active, line)?;
                return Ok(None);
            }
            return Err(TemplateError::NestedBlock {
                line: line.line_no,
                text: line.text.clone(),
                verb: command.verb.to_string(),
                active: active.verb.to_string(),
            });
        }
        output.push(self.comment(&line.text));
        active.statements.push(line.text.clone());
        Ok(Some(active))
    }

    /// Block-completion action: run the accumulated statements as one
    /// script, which registers variable domains through the capability
    /// functions.
    fn close_block(
        &mut self,
        active: ActiveBlock,
        end_line: &LogicalLine,
    ) -> Result<(), TemplateError> {
        match active.verb {
            Verb::DefineVariables => {
                let script = active.statements.join("\n");
                self.engine
                    .run(&script)
                    .map_err(|e| TemplateError::Evaluation {
                        line: active.opened_at,
                        text: script.clone(),
                        message: e.to_string(),
                    })?;
                Ok(())
            }
            // Only paired verbs can open a block; SetVersion never gets here.
            Verb::SetVersion => Err(TemplateError::Syntax {
                line: end_line.line_no,
                text: end_line.text.clone(),
                message: "SetVersion does not form a block".to_string(),
            }),
        }
    }

    fn check_version(&self, line: &LogicalLine, declared: &str) -> Result<(), TemplateError> {
        let version: f64 = declared.parse().map_err(|_| TemplateError::Syntax {
            line: line.line_no,
            text: line.text.clone(),
            message: format!("unrecognized version number '{}'", declared),
        })?;
        if version > SUPPORTED_VERSION {
            return Err(TemplateError::UnsupportedVersion {
                line: line.line_no,
                declared: declared.to_string(),
                supported: SUPPORTED_VERSION.to_string(),
            });
        }
        Ok(())
    }
}

impl Default for TemplateProcessor {
    fn default() -> Self {
        Self::new(Config::default())
    }
}
