//! Implementation-factory wrapping.
//!
//! A factory declares the traits its product implements, the traits its
//! dependencies must implement, and schemas for its own arguments. The
//! wrapped factory checks all three on every call:
//!
//! 1. the dependency bag (first argument) against `depends_on`, gluing
//!    each conforming dependency,
//! 2. the argument list against `args`; when `depends_on` is non-empty and
//!    `args` is empty, the bag position is left out of this check,
//! 3. the produced object against `implements`, gluing each trait in order.

use crate::config::Mode;
use crate::contract::{Trait, missing_traits};
use crate::error::{GlueError, Owner};
use crate::glue::Gluer;
use crate::schema::Schema;
use crate::value::{Object, Value};
use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

/// Signature of an unwrapped factory.
pub type FactoryFn = dyn Fn(&[Value]) -> Result<Object, GlueError> + Send + Sync;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct FactoryDeclaration {
    pub name: String,
    pub implements: Vec<Trait>,
    pub depends_on: BTreeMap<String, Trait>,
    pub args: Vec<Schema>,
}

impl FactoryDeclaration {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    pub fn implements(mut self, trait_: Trait) -> Self {
        self.implements.push(trait_);
        self
    }

    pub fn depends_on(mut self, name: impl Into<String>, trait_: Trait) -> Self {
        self.depends_on.insert(name.into(), trait_);
        self
    }

    pub fn arg(mut self, schema: impl Into<Schema>) -> Self {
        self.args.push(schema.into());
        self
    }

    fn check(&self) -> Result<(), GlueError> {
        if self.name.trim().is_empty() {
            return Err(GlueError::InvalidFactoryDeclaration {
                field: "name",
                message: "The \"name\" option of an implFactory is required and must be a string."
                    .to_string(),
            });
        }
        if self.implements.is_empty() {
            return Err(GlueError::InvalidFactoryDeclaration {
                field: "implements",
                message: format!(
                    "The \"implements\" option of the implFactory \"{}\" must be a non-empty list of traits.",
                    self.name
                ),
            });
        }
        Ok(())
    }
}

impl Gluer {
    /// Wrap `factory` according to `declaration`.
    ///
    /// Malformed declarations fail here, before any call, in every mode but
    /// `Off`.
    pub fn glue_impl_factory<F>(
        &self,
        declaration: FactoryDeclaration,
        factory: F,
    ) -> Result<ImplFactory, GlueError>
    where
        F: Fn(&[Value]) -> Result<Object, GlueError> + Send + Sync + 'static,
    {
        if self.mode() != Mode::Off {
            declaration.check()?;
        }
        Ok(ImplFactory {
            gluer: self.clone(),
            declaration: Arc::new(declaration),
            factory: Arc::new(factory),
        })
    }
}

/// A wrapped factory. Stateless; call it as often as needed.
#[derive(Clone)]
pub struct ImplFactory {
    gluer: Gluer,
    declaration: Arc<FactoryDeclaration>,
    factory: Arc<FactoryFn>,
}

impl ImplFactory {
    pub fn name(&self) -> &str {
        &self.declaration.name
    }

    pub fn declaration(&self) -> &FactoryDeclaration {
        &self.declaration
    }

    pub fn call(&self, args: &[Value]) -> Result<Object, GlueError> {
        if self.gluer.mode() == Mode::Off {
            return (self.factory)(args);
        }

        let mut call_args = args.to_vec();
        if !self.declaration.depends_on.is_empty() {
            let bag = args
                .first()
                .and_then(Value::as_object)
                .cloned()
                .unwrap_or_default();
            let (glued_bag, failures) = self.check_dependencies(&bag);
            if !failures.is_empty() {
                self.gluer.surface(
                    GlueError::DependencyValidationFailed {
                        factory: self.name().to_string(),
                        failures,
                    },
                    (),
                )?;
            }
            if let Some(first) = call_args
                .first_mut()
                .filter(|first| first.as_object().is_some())
            {
                *first = Value::Object(glued_bag);
            }
        }

        if let Err(error) = self.gluer.validate_arguments(
            Owner::Factory(self.name().to_string()),
            &self.declaration.args,
            self.own_arguments(args),
        ) {
            self.gluer.surface(error, ())?;
        }

        let produced = (self.factory)(&call_args)?;
        self.bind_implements(produced)
    }

    /// The arguments checked against `args`. A factory with dependencies but
    /// no declared schemas only has its arguments after the bag checked.
    fn own_arguments<'a>(&self, args: &'a [Value]) -> &'a [Value] {
        if self.declaration.depends_on.is_empty() || !self.declaration.args.is_empty() {
            return args;
        }
        args.get(1..).unwrap_or_default()
    }

    /// Check the bag against `depends_on`.
    ///
    /// Returns the bag with every conforming dependency glued, plus every
    /// failure found. Name failures come first, then per-dependency ones.
    fn check_dependencies(&self, bag: &Object) -> (Object, Vec<GlueError>) {
        let factory = self.name();
        let depends_on = &self.declaration.depends_on;
        let mut failures = Vec::new();

        let missing: Vec<&str> = depends_on
            .keys()
            .map(String::as_str)
            .filter(|name| !bag.contains(name))
            .collect();
        let unexpected: Vec<&str> = bag
            .keys()
            .filter(|name| !depends_on.contains_key(*name))
            .collect();

        // Only a single missing name against a single unexpected one reads
        // as a misspelling; anything else is reported name by name.
        let paired = if let ([expected], [found]) = (missing.as_slice(), unexpected.as_slice()) {
            failures.push(GlueError::DependencyNameMismatch {
                factory: factory.to_string(),
                expected: expected.to_string(),
                found: found.to_string(),
            });
            1
        } else {
            0
        };
        for dependency in &missing[paired..] {
            failures.push(GlueError::MissingDependency {
                factory: factory.to_string(),
                dependency: dependency.to_string(),
                trait_name: depends_on[*dependency].name().to_string(),
            });
        }
        for dependency in &unexpected[paired..] {
            failures.push(GlueError::UnexpectedDependency {
                factory: factory.to_string(),
                dependency: dependency.to_string(),
            });
        }

        let mut glued_bag = bag.clone();
        for (dependency, trait_) in depends_on {
            let Some(provided) = bag.get(dependency) else {
                continue;
            };
            let conforming = provided
                .as_object()
                .filter(|object| trait_.is_implemented_by(object));
            let Some(object) = conforming else {
                failures.push(GlueError::DependencyDoesNotImplementTrait {
                    factory: factory.to_string(),
                    dependency: dependency.clone(),
                    trait_name: trait_.name().to_string(),
                });
                continue;
            };
            match self.gluer.try_glue(trait_, object) {
                Ok(glued) => glued_bag = glued_bag.replaced(dependency, Value::Object(glued)),
                Err(error) => failures.push(error),
            }
        }

        (glued_bag, failures)
    }

    fn bind_implements(&self, produced: Object) -> Result<Object, GlueError> {
        let missing = missing_traits(&self.declaration.implements, &produced);
        if !missing.is_empty() {
            return self.gluer.surface(
                GlueError::IncompleteImplementation {
                    factory: self.name().to_string(),
                    missing,
                },
                produced,
            );
        }

        let mut object = produced;
        for trait_ in &self.declaration.implements {
            object = match self.gluer.try_glue(trait_, &object) {
                Ok(glued) => glued,
                Err(cause) => self.gluer.surface(
                    GlueError::FactoryFailed {
                        factory: self.name().to_string(),
                        cause: Box::new(cause),
                    },
                    object,
                )?,
            };
        }
        Ok(object)
    }
}

impl fmt::Debug for ImplFactory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ImplFactory")
            .field("declaration", &self.declaration)
            .field("mode", &self.gluer.mode())
            .finish_non_exhaustive()
    }
}
