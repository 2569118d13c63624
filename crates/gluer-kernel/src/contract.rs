//! Traits: named callable contracts.
//!
//! A trait names the member an implementation must expose, the ordered
//! schemas its positional arguments are checked against, and an optional
//! return description. Traits are immutable and compared structurally.

use crate::error::GlueError;
use crate::schema::Schema;
use crate::value::{Function, Object};
use serde_json::Value as Json;
use std::sync::Arc;

/// The raw `{name, args?, returns?}` description of a trait.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TraitDefinition {
    pub name: String,
    pub args: Vec<Schema>,
    pub returns: Option<Schema>,
}

impl TraitDefinition {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    pub fn arg(mut self, schema: impl Into<Schema>) -> Self {
        self.args.push(schema.into());
        self
    }

    pub fn returns(mut self, schema: impl Into<Schema>) -> Self {
        self.returns = Some(schema.into());
        self
    }

    /// Parse a definition from its JSON form.
    ///
    /// `name` must be present and a string; `args` defaults to empty.
    pub fn from_json(value: &Json) -> Result<Self, GlueError> {
        let name = match value.get("name") {
            Some(Json::String(name)) => name.clone(),
            Some(other) => {
                return Err(GlueError::InvalidTraitDefinition {
                    reason: format!("the \"name\" property must be a string, got {other}"),
                });
            }
            None => {
                return Err(GlueError::InvalidTraitDefinition {
                    reason: "the \"name\" property is required".to_string(),
                });
            }
        };

        let args = match value.get("args") {
            None | Some(Json::Null) => Vec::new(),
            Some(Json::Array(items)) => items.iter().cloned().map(Schema).collect(),
            Some(_) => {
                return Err(GlueError::InvalidTraitDefinition {
                    reason: format!("the \"args\" property of the trait \"{name}\" must be an array"),
                });
            }
        };

        let returns = value
            .get("returns")
            .filter(|v| !v.is_null())
            .cloned()
            .map(Schema);

        Ok(Self {
            name,
            args,
            returns,
        })
    }
}

/// An immutable, cheaply clonable trait.
#[derive(Debug, Clone, PartialEq)]
pub struct Trait {
    inner: Arc<TraitDefinition>,
}

impl Trait {
    /// Build a trait, rejecting an empty or blank name.
    pub fn new(definition: TraitDefinition) -> Result<Self, GlueError> {
        if definition.name.trim().is_empty() {
            return Err(GlueError::InvalidTraitDefinition {
                reason: "the \"name\" property of a trait is required and must be a non-empty string"
                    .to_string(),
            });
        }
        Ok(Self::unchecked(definition))
    }

    pub(crate) fn unchecked(definition: TraitDefinition) -> Self {
        Self {
            inner: Arc::new(definition),
        }
    }

    pub fn name(&self) -> &str {
        &self.inner.name
    }

    pub fn args(&self) -> &[Schema] {
        &self.inner.args
    }

    pub fn returns(&self) -> Option<&Schema> {
        self.inner.returns.as_ref()
    }

    pub fn definition(&self) -> &TraitDefinition {
        &self.inner
    }

    /// The member implementing this trait, if it is callable.
    pub fn impl_fn<'a>(&self, object: &'a Object) -> Option<&'a Function> {
        object.function(self.name())
    }

    pub fn is_implemented_by(&self, object: &Object) -> bool {
        self.impl_fn(object).is_some()
    }
}

/// Names of the traits in `traits` that `object` does not implement.
pub fn missing_traits(traits: &[Trait], object: &Object) -> Vec<String> {
    traits
        .iter()
        .filter(|trait_| !trait_.is_implemented_by(object))
        .map(|trait_| trait_.name().to_string())
        .collect()
}
