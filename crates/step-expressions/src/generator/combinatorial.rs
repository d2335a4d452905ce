//! Bounded expansion of per-slot parameter type choices.

use std::sync::Arc;

use log::trace;

use crate::parameter::ParameterType;

use super::GeneratedExpression;

/// Upper bound on expressions produced for one sample text.
pub const MAX_EXPRESSIONS: usize = 256;

/// Expand `choices` (one candidate list per placeholder) into concrete
/// expressions, depth first, stopping at [`MAX_EXPRESSIONS`].
pub(crate) fn generate_expressions(
    template: &str,
    choices: &[Vec<Arc<ParameterType>>],
) -> Vec<GeneratedExpression> {
    let mut generated = Vec::new();
    let mut current = Vec::with_capacity(choices.len());
    expand(template, choices, &mut current, &mut generated);
    if generated.len() >= MAX_EXPRESSIONS {
        trace!("stopped expanding {template:?} at {MAX_EXPRESSIONS} expressions");
    }
    generated
}

fn expand(
    template: &str,
    choices: &[Vec<Arc<ParameterType>>],
    current: &mut Vec<Arc<ParameterType>>,
    generated: &mut Vec<GeneratedExpression>,
) {
    if generated.len() >= MAX_EXPRESSIONS {
        return;
    }
    let Some((slot, rest)) = choices.split_first() else {
        generated.push(GeneratedExpression::new(template, current.clone()));
        return;
    };
    for parameter_type in slot {
        if generated.len() >= MAX_EXPRESSIONS {
            return;
        }
        current.push(Arc::clone(parameter_type));
        expand(template, rest, current, generated);
        current.pop();
    }
}
