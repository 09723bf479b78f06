//! Capability functions exposed to template scripts.
//!
//! Scripts inside a `DefineVariables` block register variable domains by
//! calling `add_definitions({...})` and `remove_definitions([...])`. The
//! calls are recorded through `Evaluator::extra` and applied to the
//! engine's definitions only after the whole script succeeds, so a failing
//! block commits nothing.

use std::cell::RefCell;

use starlark::any::ProvidesStaticType;
use starlark::environment::GlobalsBuilder;
use starlark::eval::Evaluator;
use starlark::starlark_module;
use starlark::values::dict::DictRef;
use starlark::values::list::ListRef;
use starlark::values::none::NoneType;
use starlark::values::Value;

use super::convert::starlark_to_json;

/// One recorded definition edit, in script order.
#[derive(Debug)]
pub(crate) enum Edit {
    Add(String, Vec<serde_json::Value>),
    Remove(String),
}

/// Edit log for one script run.
#[derive(Debug, Default, ProvidesStaticType)]
pub(crate) struct EditLog(pub RefCell<Vec<Edit>>);

fn edit_log<'v, 'a>(eval: &Evaluator<'v, 'a>) -> anyhow::Result<&'a EditLog> {
    eval.extra
        .ok_or_else(|| anyhow::anyhow!("definition edit log not installed"))?
        .downcast_ref::<EditLog>()
        .ok_or_else(|| anyhow::anyhow!("evaluator extra is not an edit log"))
}

/// Registers the capability functions into a `GlobalsBuilder`.
pub(crate) fn register_api(builder: &mut GlobalsBuilder) {
    register_api_functions(builder);
}

#[starlark_module]
fn register_api_functions(builder: &mut GlobalsBuilder) {
    /// Registers variable domains.
    ///
    /// `definitions` is a dict mapping each variable name to the list of
    /// candidate values it may assume:
    ///
    /// ```starlark
    /// add_definitions({"a": ["a", "b", "c"], "n": [1, 2]})
    /// ```
    fn add_definitions<'v>(
        definitions: Value<'v>,
        eval: &mut Evaluator<'v, '_>,
    ) -> anyhow::Result<NoneType> {
        let dict = DictRef::from_value(definitions).ok_or_else(|| {
            anyhow::anyhow!(
                "add_definitions() expects a dict, got {}",
                definitions.get_type()
            )
        })?;
        let log = edit_log(eval)?;
        for (name, values) in dict.iter() {
            let name = name.unpack_str().ok_or_else(|| {
                anyhow::anyhow!("variable name must be a string, got {}", name.get_type())
            })?;
            let list = ListRef::from_value(values).ok_or_else(|| {
                anyhow::anyhow!(
                    "values for '{}' must be a list, got {}",
                    name,
                    values.get_type()
                )
            })?;
            let values: Vec<serde_json::Value> = list
                .iter()
                .map(starlark_to_json)
                .collect::<Result<_, _>>()?;
            log.0
                .borrow_mut()
                .push(Edit::Add(name.to_string(), values));
        }
        Ok(NoneType)
    }

    /// Revokes variable domains. Removing an undefined name fails the block.
    ///
    /// ```starlark
    /// remove_definitions(["a", "n"])
    /// ```
    fn remove_definitions<'v>(
        names: Value<'v>,
        eval: &mut Evaluator<'v, '_>,
    ) -> anyhow::Result<NoneType> {
        let list = ListRef::from_value(names).ok_or_else(|| {
            anyhow::anyhow!("remove_definitions() expects a list, got {}", names.get_type())
        })?;
        let log = edit_log(eval)?;
        for name in list.iter() {
            let name = name.unpack_str().ok_or_else(|| {
                anyhow::anyhow!("variable name must be a string, got {}", name.get_type())
            })?;
            log.0.borrow_mut().push(Edit::Remove(name.to_string()));
        }
        Ok(NoneType)
    }
}
