//! Parameter type registration and lookup.
//!
//! Types are indexed by name and by each pattern source they contribute.
//! Candidates sharing a pattern stay ranked by [`ParameterType::compare`].

use std::sync::Arc;

use hashbrown::HashMap;
use log::debug;

use crate::errors::{AmbiguousParameterType, ExpressionError};
use crate::generator::ExpressionGenerator;

use super::{ParameterType, builtin};

/// Owns every parameter type known to expressions compiled against it.
///
/// Reads are safe from many threads; definitions need `&mut self`.
///
/// # Examples
/// ```
/// use step_expressions::{ParameterType, ParameterTypeRegistry, Value};
///
/// let mut registry = ParameterTypeRegistry::new();
/// let colour = ParameterType::new("colour", ["red|blue"], "String", |values| {
///     Ok(values.first().copied().flatten().map_or(Value::Nil, Value::from))
/// })
/// .expect("valid name");
/// registry.define_parameter_type(colour).expect("new name");
/// assert!(registry.lookup_by_type_name("colour").is_some());
/// assert!(registry.lookup_by_type_name("int").is_some());
/// ```
#[derive(Debug)]
pub struct ParameterTypeRegistry {
    parameter_types: Vec<Arc<ParameterType>>,
    by_name: HashMap<String, Arc<ParameterType>>,
    by_regexp: HashMap<String, Vec<Arc<ParameterType>>>,
}

impl Default for ParameterTypeRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl ParameterTypeRegistry {
    /// Create a registry holding the built-in types.
    #[must_use]
    pub fn new() -> Self {
        let mut registry = Self {
            parameter_types: Vec::new(),
            by_name: HashMap::new(),
            by_regexp: HashMap::new(),
        };
        for parameter_type in builtin::parameter_types() {
            registry.insert(Arc::new(parameter_type));
        }
        registry
    }

    /// Register `parameter_type`, returning the shared handle expressions
    /// will hold.
    ///
    /// # Errors
    /// Returns [`ExpressionError::DuplicateParameterTypeName`] or
    /// [`ExpressionError::DuplicateAnonymousParameterType`] when the name is
    /// taken, and [`ExpressionError::DuplicatePreferredParameterType`] when a
    /// pattern already has a preferential owner and the new type is
    /// preferential too. Nothing is registered on error.
    pub fn define_parameter_type(
        &mut self,
        parameter_type: ParameterType,
    ) -> Result<Arc<ParameterType>, ExpressionError> {
        self.check_definition(&parameter_type)?;
        debug!(
            "defining parameter type {{{}}} for {:?}",
            parameter_type.name(),
            parameter_type.patterns()
        );
        let parameter_type = Arc::new(parameter_type);
        self.insert(Arc::clone(&parameter_type));
        Ok(parameter_type)
    }

    fn check_definition(&self, parameter_type: &ParameterType) -> Result<(), ExpressionError> {
        if self.by_name.contains_key(parameter_type.name()) {
            return Err(if parameter_type.is_anonymous() {
                ExpressionError::DuplicateAnonymousParameterType
            } else {
                ExpressionError::DuplicateParameterTypeName(parameter_type.name().to_owned())
            });
        }
        if !parameter_type.prefer_for_regexp_match() {
            return Ok(());
        }
        for pattern in parameter_type.patterns() {
            let existing = self
                .by_regexp
                .get(pattern)
                .and_then(|candidates| candidates.first())
                .filter(|first| first.prefer_for_regexp_match());
            if let Some(existing) = existing {
                return Err(ExpressionError::DuplicatePreferredParameterType {
                    regexp: pattern.clone(),
                    existing: existing.name().to_owned(),
                    candidate: parameter_type.name().to_owned(),
                });
            }
        }
        Ok(())
    }

    fn insert(&mut self, parameter_type: Arc<ParameterType>) {
        self.by_name
            .insert(parameter_type.name().to_owned(), Arc::clone(&parameter_type));
        for pattern in parameter_type.patterns() {
            let candidates = self.by_regexp.entry(pattern.clone()).or_default();
            if !candidates.iter().any(|c| Arc::ptr_eq(c, &parameter_type)) {
                candidates.push(Arc::clone(&parameter_type));
                candidates.sort_by(|a, b| ParameterType::compare(a, b));
            }
        }
        self.parameter_types.push(parameter_type);
    }

    /// Find a type by name; `""` names the anonymous type.
    #[must_use]
    pub fn lookup_by_type_name(&self, name: &str) -> Option<&Arc<ParameterType>> {
        self.by_name.get(name)
    }

    /// Find the type owning `parameter_type_regexp`.
    ///
    /// `expression_regexp` and `text` only feed the ambiguity diagnostic.
    ///
    /// # Errors
    /// Returns [`ExpressionError::AmbiguousParameterType`] when several
    /// non-preferential types own the pattern.
    pub fn lookup_by_regexp(
        &self,
        parameter_type_regexp: &str,
        expression_regexp: &str,
        text: &str,
    ) -> Result<Option<Arc<ParameterType>>, ExpressionError> {
        let Some(candidates) = self.by_regexp.get(parameter_type_regexp) else {
            return Ok(None);
        };
        let Some(first) = candidates.first() else {
            return Ok(None);
        };
        if candidates.len() > 1 && !first.prefer_for_regexp_match() {
            let generated_expressions = ExpressionGenerator::new(self).generate_expressions(text);
            return Err(ExpressionError::AmbiguousParameterType(Box::new(
                AmbiguousParameterType {
                    parameter_type_regexp: parameter_type_regexp.to_owned(),
                    expression_regexp: expression_regexp.to_owned(),
                    parameter_types: candidates.clone(),
                    generated_expressions,
                },
            )));
        }
        Ok(Some(Arc::clone(first)))
    }

    /// Every registered type in definition order, built-ins first.
    pub fn parameter_types(&self) -> impl Iterator<Item = &Arc<ParameterType>> {
        self.parameter_types.iter()
    }
}
