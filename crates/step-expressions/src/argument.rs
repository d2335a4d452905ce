//! Binding matched groups to parameter types.

use std::sync::Arc;

use crate::capture::Group;
use crate::errors::ExpressionError;
use crate::expression::ParameterSlot;
use crate::parameter::{ParameterType, TransformError, Value};
use crate::tree_regex::TreeRegex;

/// A matched group bound to the parameter type that converts it.
#[derive(Debug, Clone)]
pub struct Argument {
    group: Group,
    parameter_type: Arc<ParameterType>,
    name: Option<String>,
}

impl Argument {
    /// Match `text` and pair each top-level group with its parameter slot.
    ///
    /// Returns `Ok(None)` when the text does not match.
    ///
    /// # Errors
    /// Returns [`ExpressionError::CaptureGroupMismatch`] when the match has a
    /// different number of top-level groups than there are slots.
    pub fn build(
        tree_regex: &TreeRegex,
        text: &str,
        parameters: &[ParameterSlot],
    ) -> Result<Option<Vec<Self>>, ExpressionError> {
        let Some(root) = tree_regex.match_text(text) else {
            return Ok(None);
        };
        if root.children.len() != parameters.len() {
            return Err(ExpressionError::CaptureGroupMismatch {
                groups: root.children.len(),
                parameter_types: parameters.len(),
            });
        }
        let arguments = root
            .children
            .into_iter()
            .zip(parameters)
            .map(|(group, slot)| Self {
                name: slot.name.clone().or_else(|| group.name.clone()),
                group,
                parameter_type: Arc::clone(&slot.parameter_type),
            })
            .collect();
        Ok(Some(arguments))
    }

    /// The matched group.
    #[must_use]
    pub const fn group(&self) -> &Group {
        &self.group
    }

    /// The type converting this argument.
    #[must_use]
    pub const fn parameter_type(&self) -> &Arc<ParameterType> {
        &self.parameter_type
    }

    /// Capture name from `{name:type}` or a named regex group.
    #[must_use]
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    /// Convert the group through the parameter type's transformer.
    ///
    /// The transformer runs on every call.
    ///
    /// # Errors
    /// Propagates the transformer's failure unchanged.
    pub fn value(&self) -> Result<Value, TransformError> {
        self.parameter_type.transform(&self.group.values())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parameter::ParameterTypeRegistry;

    fn slot(registry: &ParameterTypeRegistry, name: &str) -> ParameterSlot {
        let Some(parameter_type) = registry.lookup_by_type_name(name) else {
            panic!("{name} should be registered");
        };
        ParameterSlot {
            parameter_type: Arc::clone(parameter_type),
            name: None,
        }
    }

    fn tree(pattern: &str) -> TreeRegex {
        TreeRegex::new(pattern).unwrap_or_else(|err| panic!("{pattern:?} should compile: {err}"))
    }

    #[test]
    fn no_match_is_not_an_error() {
        let registry = ParameterTypeRegistry::new();
        let result = Argument::build(&tree(r"^(\d+)$"), "nope", &[slot(&registry, "int")]);
        assert!(matches!(result, Ok(None)));
    }

    #[test]
    fn mismatched_slot_count_is_reported() {
        let registry = ParameterTypeRegistry::new();
        let result = Argument::build(&tree(r"^(\d+) (\d+)$"), "1 2", &[slot(&registry, "int")]);
        assert!(matches!(
            result,
            Err(ExpressionError::CaptureGroupMismatch {
                groups: 2,
                parameter_types: 1
            })
        ));
    }

    #[test]
    fn binds_groups_positionally() {
        let registry = ParameterTypeRegistry::new();
        let slots = [slot(&registry, "int"), slot(&registry, "word")];
        let Ok(Some(arguments)) = Argument::build(&tree(r"^(\d+) (\w+)$"), "3 mice", &slots) else {
            panic!("text should match");
        };
        let values: Vec<_> = arguments.iter().filter_map(|a| a.value().ok()).collect();
        assert_eq!(values, [Value::I32(3), Value::Str("mice".into())]);
    }

    #[test]
    fn transformer_failures_surface_on_read() {
        let registry = ParameterTypeRegistry::new();
        let Ok(Some(arguments)) =
            Argument::build(&tree(r"^(\d+)$"), "99999999999", &[slot(&registry, "int")])
        else {
            panic!("text should match");
        };
        assert!(arguments.first().is_some_and(|a| a.value().is_err()));
    }

    #[test]
    fn named_group_supplies_the_name() {
        let registry = ParameterTypeRegistry::new();
        let Ok(Some(arguments)) =
            Argument::build(&tree(r"^(?P<count>\d+)$"), "4", &[slot(&registry, "int")])
        else {
            panic!("text should match");
        };
        assert_eq!(arguments.first().and_then(Argument::name), Some("count"));
    }
}
