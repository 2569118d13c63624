//! Caller-owned trait registry with name uniqueness.
//!
//! Bare [`Trait::new`] never consults shared state. Code that wants one
//! definition per name builds its traits through a registry instead.

use crate::contract::{Trait, TraitDefinition};
use crate::error::GlueError;
use std::collections::BTreeMap;

#[derive(Debug, Clone, Default)]
pub struct TraitRegistry {
    traits: BTreeMap<String, Trait>,
}

impl TraitRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Define a trait, or return the registered one if the definition is
    /// identical. A different definition under a taken name is rejected.
    pub fn define(&mut self, definition: TraitDefinition) -> Result<Trait, GlueError> {
        if let Some(existing) = self.traits.get(&definition.name) {
            if existing.definition() == &definition {
                return Ok(existing.clone());
            }
            return Err(GlueError::DuplicateTraitName {
                name: definition.name,
            });
        }
        let trait_ = Trait::new(definition)?;
        self.traits
            .insert(trait_.name().to_string(), trait_.clone());
        Ok(trait_)
    }

    pub fn get(&self, name: &str) -> Option<&Trait> {
        self.traits.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.traits.contains_key(name)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Trait> {
        self.traits.values()
    }

    pub fn len(&self) -> usize {
        self.traits.len()
    }

    pub fn is_empty(&self) -> bool {
        self.traits.is_empty()
    }
}
