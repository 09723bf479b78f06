//! Script and expression evaluation.
//!
//! `ScriptEngine` wraps the Starlark interpreter behind the narrow
//! interface the expander and processor need: evaluate one expression
//! against the namespace, or run a multi-statement script that registers
//! variable domains through the capability functions. The dialect is
//! locked down for safety: `def` and lambdas are available, `load()` is
//! disabled, recursion is disabled.

mod api;
pub mod convert;

use std::collections::BTreeMap;

use starlark::environment::{Globals, GlobalsBuilder, Module};
use starlark::eval::Evaluator;
use starlark::syntax::{AstModule, Dialect};
use thiserror::Error;

use crate::definitions::{is_valid_variable_name, Definitions};
use api::{Edit, EditLog};

/// Errors from the embedded evaluator. The processor wraps these into
/// `TemplateError::Evaluation` with line context attached.
#[derive(Debug, Error)]
pub enum EvalError {
    /// The source failed to parse.
    #[error("syntax error: {message}")]
    Syntax { message: String },

    /// Evaluation raised (division by zero, undefined name, ...). The
    /// message carries the interpreter's location (`<script>:line:col`).
    #[error("{message}")]
    Runtime { message: String },

    /// A value could not cross the Starlark/JSON boundary.
    #[error("cannot convert value: {message}")]
    Conversion { message: String },

    /// A script registered a malformed variable name.
    #[error("invalid variable name '{name}'")]
    BadVariableName { name: String },

    /// A script or caller removed a name that was never defined.
    #[error("cannot remove undefined name '{name}'")]
    UndefinedName { name: String },
}

/// Evaluates expressions and scripts against a persistent namespace, and
/// owns the variable definitions the scripts register.
pub struct ScriptEngine {
    namespace: BTreeMap<String, serde_json::Value>,
    definitions: Definitions,
    globals: Globals,
}

impl ScriptEngine {
    pub fn new() -> Self {
        let globals = GlobalsBuilder::standard().with(api::register_api).build();
        Self {
            namespace: BTreeMap::new(),
            definitions: Definitions::new(),
            globals,
        }
    }

    /// Dialect configuration: functions and lambdas for abstraction,
    /// top-level statements for scripts, no external loads, no recursion.
    fn dialect() -> Dialect {
        Dialect {
            enable_def: true,
            enable_lambda: true,
            enable_load: false,
            enable_top_level_stmt: true,
            ..Dialect::Standard
        }
    }

    /// The variable domains registered so far.
    pub fn definitions(&self) -> &Definitions {
        &self.definitions
    }

    /// Merges bindings into the namespace; later entries override earlier
    /// same-named ones.
    pub fn add_bindings(
        &mut self,
        bindings: impl IntoIterator<Item = (String, serde_json::Value)>,
    ) {
        for (name, value) in bindings {
            self.namespace.insert(name, value);
        }
    }

    /// Deletes bindings from the namespace. Removing an absent name is an
    /// error: it would hide typos in template scripts.
    pub fn remove_bindings<'a>(
        &mut self,
        names: impl IntoIterator<Item = &'a str>,
    ) -> Result<(), EvalError> {
        for name in names {
            if self.namespace.remove(name).is_none() {
                return Err(EvalError::UndefinedName {
                    name: name.to_string(),
                });
            }
        }
        Ok(())
    }

    /// Copies the namespace into a fresh module.
    fn seed(&self, module: &Module) -> Result<(), EvalError> {
        for (name, value) in &self.namespace {
            let value = convert::json_to_starlark(module.heap(), value)?;
            module.set(name, value);
        }
        Ok(())
    }

    /// Evaluates a single expression against the namespace.
    pub fn evaluate(&self, expression: &str) -> Result<serde_json::Value, EvalError> {
        let ast = AstModule::parse(
            "<expression>",
            expression.to_string(),
            &Self::dialect(),
        )
        .map_err(|e| EvalError::Syntax {
            message: e.to_string(),
        })?;
        let module = Module::new();
        self.seed(&module)?;
        let mut eval = Evaluator::new(&module);
        let value = eval
            .eval_module(ast, &self.globals)
            .map_err(|e| EvalError::Runtime {
                message: e.to_string(),
            })?;
        convert::starlark_to_json(value)
    }

    /// Executes a multi-statement script against the namespace.
    ///
    /// The capability functions record definition edits during the run;
    /// both the edits and any JSON-representable top-level bindings are
    /// committed only after the whole script succeeds, so a failing block
    /// leaves the engine exactly as it was.
    pub fn run(&mut self, script: &str) -> Result<(), EvalError> {
        let ast = AstModule::parse("<script>", script.to_string(), &Self::dialect()).map_err(
            |e| EvalError::Syntax {
                message: e.to_string(),
            },
        )?;
        let module = Module::new();
        self.seed(&module)?;
        let log = EditLog::default();
        {
            let mut eval = Evaluator::new(&module);
            eval.extra = Some(&log);
            eval.eval_module(ast, &self.globals)
                .map_err(|e| EvalError::Runtime {
                    message: e.to_string(),
                })?;
        }

        // Stage the definition edits in script order; commit only if every
        // edit is valid.
        let mut staged = self.definitions.clone();
        for edit in log.0.into_inner() {
            match edit {
                Edit::Add(name, values) => {
                    if !is_valid_variable_name(&name) {
                        return Err(EvalError::BadVariableName { name });
                    }
                    staged.insert(name, values);
                }
                Edit::Remove(name) => {
                    if !staged.remove(&name) {
                        return Err(EvalError::UndefinedName { name });
                    }
                }
            }
        }

        // Harvest top-level bindings so later blocks and expressions see
        // them; values that cannot cross the boundary (functions) are
        // skipped.
        let names: Vec<String> = module.names().map(|n| n.as_str().to_string()).collect();
        for name in names {
            if let Some(value) = module.get(&name) {
                if let Ok(json) = convert::starlark_to_json(value) {
                    self.namespace.insert(name, json);
                }
            }
        }

        self.definitions = staged;
        Ok(())
    }
}

impl Default for ScriptEngine {
    fn default() -> Self {
        Self::new()
    }
}
