//! The glue engine.
//!
//! Gluing a trait onto an object:
//!
//! 1. finds the callable member named after the trait,
//! 2. refuses a member already bound to a different trait and leaves a
//!    member bound to the same trait alone,
//! 3. wraps the member so every call validates its arguments first,
//! 4. tags the wrapper with [`GlueMeta`],
//! 5. returns a copy of the object with the member replaced.
//!
//! Failures either come back as `Err` ([`Mode::Throwing`]) or go to the
//! reporter while the caller receives the best object available
//! ([`Mode::Reporting`]). [`Mode::Off`] skips everything.

use crate::arguments::validate_argument_list;
use crate::config::{GluerConfig, Mode};
use crate::contract::{Trait, TraitDefinition};
use crate::error::{GlueError, Owner};
use crate::report::{ReportValidationError, TracingReporter};
use crate::schema::Schema;
use crate::validate::Validate;
use crate::value::{Function, GlueMeta, Object, Value};
use std::fmt;
use std::sync::Arc;

struct Engine {
    config: GluerConfig,
    validator: Arc<dyn Validate>,
    reporter: Arc<dyn ReportValidationError>,
}

/// A configured glue engine. Clones share configuration.
#[derive(Clone)]
pub struct Gluer {
    engine: Arc<Engine>,
}

pub struct GluerBuilder {
    config: GluerConfig,
    validator: Arc<dyn Validate>,
    reporter: Option<Arc<dyn ReportValidationError>>,
}

impl GluerBuilder {
    pub fn config(mut self, config: GluerConfig) -> Self {
        self.config = config;
        self
    }

    pub fn mode(mut self, mode: Mode) -> Self {
        self.config.mode = mode;
        self
    }

    pub fn reporter(mut self, reporter: Arc<dyn ReportValidationError>) -> Self {
        self.reporter = Some(reporter);
        self
    }

    pub fn build(self) -> Gluer {
        Gluer {
            engine: Arc::new(Engine {
                config: self.config,
                validator: self.validator,
                reporter: self.reporter.unwrap_or_else(|| Arc::new(TracingReporter)),
            }),
        }
    }
}

impl Gluer {
    /// A throwing engine with the default `tracing` reporter.
    pub fn new(validator: impl Validate + 'static) -> Self {
        Self::builder(Arc::new(validator)).build()
    }

    pub fn builder(validator: Arc<dyn Validate>) -> GluerBuilder {
        GluerBuilder {
            config: GluerConfig::default(),
            validator,
            reporter: None,
        }
    }

    pub fn config(&self) -> &GluerConfig {
        &self.engine.config
    }

    pub fn mode(&self) -> Mode {
        self.engine.config.mode
    }

    /// Construct a trait. Malformed definitions fail in every mode but `Off`,
    /// where the definition is accepted unchecked.
    pub fn make_trait(&self, definition: TraitDefinition) -> Result<Trait, GlueError> {
        if self.mode() == Mode::Off {
            return Ok(Trait::unchecked(definition));
        }
        Trait::new(definition)
    }

    /// Glue `trait_` onto `object`, returning the glued copy.
    pub fn glue(&self, trait_: &Trait, object: &Object) -> Result<Object, GlueError> {
        if self.mode() == Mode::Off {
            return Ok(object.clone());
        }
        match self.try_glue(trait_, object) {
            Ok(glued) => Ok(glued),
            Err(error) => self.surface(error, object.clone()),
        }
    }

    /// Curried form of [`Gluer::glue`].
    pub fn glue_trait(&self, trait_: &Trait) -> TraitGlue {
        TraitGlue {
            gluer: self.clone(),
            trait_: trait_.clone(),
        }
    }

    /// Glue without applying the failure mode.
    pub(crate) fn try_glue(&self, trait_: &Trait, object: &Object) -> Result<Object, GlueError> {
        let original = trait_
            .impl_fn(object)
            .ok_or_else(|| GlueError::TraitNotImplemented {
                trait_name: trait_.name().to_string(),
            })?;

        if let Some(meta) = original.glue_meta() {
            if meta.is_bound_to(trait_) {
                tracing::debug!(trait_name = trait_.name(), "member already glued, skipping");
                return Ok(object.clone());
            }
            return Err(GlueError::ConflictingTraitBinding {
                trait_name: trait_.name().to_string(),
                bound_trait: meta.trait_name().to_string(),
            });
        }

        let wrapper = self.wrap(trait_, original.clone());
        tracing::debug!(trait_name = trait_.name(), "glued member");
        Ok(object.replaced(trait_.name(), Value::Function(wrapper)))
    }

    fn wrap(&self, trait_: &Trait, original: Function) -> Function {
        let gluer = self.clone();
        let bound = trait_.clone();
        Function::glued(GlueMeta::new(trait_.clone()), move |this, args| {
            if let Err(error) = gluer.validate_arguments(
                Owner::Trait(bound.name().to_string()),
                bound.args(),
                args,
            ) {
                gluer.surface(error, ())?;
            }
            original.call(this, args)
        })
    }

    pub(crate) fn validate_arguments(
        &self,
        owner: Owner,
        schemas: &[Schema],
        args: &[Value],
    ) -> Result<(), GlueError> {
        validate_argument_list(
            owner,
            schemas,
            args,
            self.engine.validator.as_ref(),
            self.engine.config.argument_failures,
        )
    }

    /// Apply the failure mode: return the error, or report it and hand back
    /// `fallback`.
    pub(crate) fn surface<T>(&self, error: GlueError, fallback: T) -> Result<T, GlueError> {
        match self.mode() {
            Mode::Throwing => Err(error),
            Mode::Reporting => {
                self.engine.reporter.report(&error);
                Ok(fallback)
            }
            Mode::Off => Ok(fallback),
        }
    }
}

impl fmt::Debug for Gluer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Gluer")
            .field("config", &self.engine.config)
            .finish_non_exhaustive()
    }
}

/// A trait bound to an engine, ready to be applied to objects.
#[derive(Debug, Clone)]
pub struct TraitGlue {
    gluer: Gluer,
    trait_: Trait,
}

impl TraitGlue {
    pub fn trait_(&self) -> &Trait {
        &self.trait_
    }

    pub fn apply(&self, object: &Object) -> Result<Object, GlueError> {
        self.gluer.glue(&self.trait_, object)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{ErrorKind, ValidationError};
    use crate::report::RecordingReporter;
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicUsize, Ordering};

    const SCHEMA: &str = "test schema";
    const ARGUMENT: &str = "some argument";

    struct Port {
        calls: Mutex<Vec<(Schema, Value)>>,
        failure: Option<&'static str>,
    }

    impl Port {
        fn passing() -> Arc<Self> {
            Arc::new(Self {
                calls: Mutex::new(Vec::new()),
                failure: None,
            })
        }

        fn failing(message: &'static str) -> Arc<Self> {
            Arc::new(Self {
                calls: Mutex::new(Vec::new()),
                failure: Some(message),
            })
        }

        fn calls(&self) -> Vec<(Schema, Value)> {
            self.calls.lock().unwrap().clone()
        }
    }

    impl Validate for Port {
        fn validate(&self, schema: &Schema, value: &Value) -> Result<(), ValidationError> {
            self.calls
                .lock()
                .unwrap()
                .push((schema.clone(), value.clone()));
            match self.failure {
                Some(message) => Err(ValidationError::new(message)),
                None => Ok(()),
            }
        }
    }

    fn throwing(port: Arc<Port>) -> Gluer {
        Gluer::builder(port).build()
    }

    fn reporting(port: Arc<Port>) -> (Gluer, Arc<RecordingReporter>) {
        let reporter = Arc::new(RecordingReporter::new());
        let gluer = Gluer::builder(port)
            .mode(Mode::Reporting)
            .reporter(reporter.clone())
            .build();
        (gluer, reporter)
    }

    fn test_trait(name: &str, args: &[&str]) -> Trait {
        let mut def = TraitDefinition::new(name);
        for arg in args {
            def = def.arg(*arg);
        }
        Trait::new(def).unwrap()
    }

    fn returning(result: &'static str) -> Object {
        Object::new().with_fn("callTestFunction", move |_, _| Ok(Value::from(result)))
    }

    #[test]
    fn throws_when_the_impl_does_not_implement_the_trait() {
        let gluer = throwing(Port::failing("Validation error"));
        let err = gluer
            .glue(&test_trait("callTestFunction", &[]), &Object::new())
            .unwrap_err();
        assert_eq!(
            err.to_string(),
            "The trait \"callTestFunction\" is not implemented."
        );
    }

    #[test]
    fn reports_a_missing_member_and_returns_the_original() {
        let (gluer, reporter) = reporting(Port::failing("VALIDATION_ERROR_MESSAGE"));
        let object = Object::new().with("callTestFunction", "data");
        let glued = gluer
            .glue(&test_trait("callTestFunction", &[]), &object)
            .unwrap();

        assert_eq!(glued, object);
        assert_eq!(
            reporter.messages(),
            vec!["The trait \"callTestFunction\" is not implemented."]
        );
    }

    #[test]
    fn no_arguments_and_no_schemas_is_fine() {
        let gluer = throwing(Port::failing("Validation error"));
        let glued = gluer
            .glue(&test_trait("callTestFunction", &[]), &returning("RESULT"))
            .unwrap();
        assert_eq!(
            glued.call("callTestFunction", &[]).unwrap(),
            Value::from("RESULT")
        );
    }

    #[test]
    fn throws_when_called_with_undeclared_arguments() {
        let port = Port::failing("Validation error");
        let gluer = throwing(port.clone());
        let glued = gluer
            .glue(&test_trait("callTestFunction", &[]), &returning("RESULT"))
            .unwrap();

        let err = glued
            .call("callTestFunction", &[Value::from(ARGUMENT)])
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::TooManyArguments);
        assert!(
            err.to_string()
                .starts_with("Failed arguments validation for the trait \"callTestFunction\".")
        );
        assert!(port.calls().is_empty());
    }

    #[test]
    fn calls_the_validator_with_schema_and_value() {
        let port = Port::passing();
        let gluer = throwing(port.clone());
        let glued = gluer
            .glue(&test_trait("callTestFunction", &[SCHEMA]), &returning("RESULT"))
            .unwrap();

        glued
            .call("callTestFunction", &[Value::from(ARGUMENT)])
            .unwrap();
        assert_eq!(
            port.calls(),
            vec![(Schema::from(SCHEMA), Value::from(ARGUMENT))]
        );
    }

    #[test]
    fn throws_with_the_validator_message_and_skips_the_body() {
        let invoked = Arc::new(AtomicUsize::new(0));
        let counter = invoked.clone();
        let object = Object::new().with_fn("callTestFunction", move |_, _| {
            counter.fetch_add(1, Ordering::SeqCst);
            Ok(Value::null())
        });
        let gluer = throwing(Port::failing("VALIDATION_ERROR_MESSAGE"));
        let glued = gluer
            .glue(&test_trait("callTestFunction", &[SCHEMA]), &object)
            .unwrap();

        let err = glued
            .call("callTestFunction", &[Value::from(ARGUMENT)])
            .unwrap_err();
        assert_eq!(
            err.to_string(),
            "Failed arguments validation for the trait \"callTestFunction\". Cause error: VALIDATION_ERROR_MESSAGE"
        );
        assert_eq!(invoked.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn reporting_still_returns_the_result() {
        let (gluer, reporter) = reporting(Port::failing("CUSTOM_VALIDATION_ERROR_MESSAGE"));
        let glued = gluer
            .glue(&test_trait("callTestFunction", &[SCHEMA]), &returning("RESULT"))
            .unwrap();

        let result = glued
            .call("callTestFunction", &[Value::from(ARGUMENT)])
            .unwrap();
        assert_eq!(result, Value::from("RESULT"));
        assert_eq!(
            reporter.messages(),
            vec![
                "Failed arguments validation for the trait \"callTestFunction\". Cause error: CUSTOM_VALIDATION_ERROR_MESSAGE"
            ]
        );
    }

    #[test]
    fn generator_handles_pass_through_unchanged() {
        struct Countdown(u32);
        let object =
            Object::new().with_fn("callTestFunction", |_, _| Ok(Value::opaque(Countdown(3))));
        let (gluer, reporter) = reporting(Port::failing("VALIDATION_ERROR_MESSAGE"));
        let glued = gluer
            .glue(&test_trait("callTestFunction", &[]), &object)
            .unwrap();

        let result = glued
            .call("callTestFunction", &[Value::from(ARGUMENT)])
            .unwrap();
        assert_eq!(result.downcast_opaque::<Countdown>().map(|c| c.0), Some(3));
        assert_eq!(reporter.len(), 1);
    }

    #[test]
    fn wraps_only_once_when_glued_twice() {
        let port = Port::passing();
        let gluer = throwing(port.clone());
        let trait_ = test_trait("callTestFunction", &[SCHEMA]);
        let once = gluer.glue(&trait_, &returning("RESULT")).unwrap();
        let twice = gluer
            .glue(&test_trait("callTestFunction", &[SCHEMA]), &once)
            .unwrap();

        assert_eq!(once, twice);
        twice
            .call("callTestFunction", &[Value::from(ARGUMENT)])
            .unwrap();
        assert_eq!(port.calls().len(), 1);
    }

    #[test]
    fn refuses_a_function_bound_to_another_trait() {
        let gluer = throwing(Port::passing());
        let first = gluer
            .glue(&test_trait("callTestFunction", &[SCHEMA]), &returning("RESULT"))
            .unwrap();
        let moved = Object::new().with(
            "callTestFunction2",
            first.get("callTestFunction").unwrap().clone(),
        );

        let err = gluer
            .glue(&test_trait("callTestFunction2", &[SCHEMA]), &moved)
            .unwrap_err();
        assert_eq!(
            err.to_string(),
            "The implFn for the trait \"callTestFunction2\" already implements another trait \"callTestFunction\"."
        );
    }

    #[test]
    fn never_mutates_the_input() {
        let gluer = throwing(Port::passing());
        let object = returning("RESULT");
        let before = object.function("callTestFunction").unwrap().clone();
        let glued = gluer
            .glue(&test_trait("callTestFunction", &[]), &object)
            .unwrap();

        assert!(object.function("callTestFunction").unwrap().ptr_eq(&before));
        assert!(object.function("callTestFunction").unwrap().glue_meta().is_none());
        let meta = glued.function("callTestFunction").unwrap().glue_meta().unwrap();
        assert_eq!(meta.trait_name(), "callTestFunction");
    }

    #[test]
    fn wrapper_forwards_the_receiver() {
        let gluer = throwing(Port::passing());
        let object = Object::new()
            .with("greeting", "hi ")
            .with_fn("greet", |this, args| {
                let greeting = this.get("greeting").and_then(Value::as_str).unwrap_or("");
                let name = args.first().and_then(Value::as_str).unwrap_or("");
                Ok(Value::from(format!("{greeting}{name}")))
            });
        let glued = gluer
            .glue(&test_trait("greet", &["name"]), &object)
            .unwrap();
        assert_eq!(
            glued.call("greet", &[Value::from("Sam")]).unwrap(),
            Value::from("hi Sam")
        );
    }

    #[test]
    fn off_mode_is_identity() {
        let port = Port::failing("never");
        let gluer = Gluer::builder(port.clone()).mode(Mode::Off).build();
        let object = returning("RESULT");
        let glued = gluer
            .glue(&test_trait("callTestFunction", &[]), &object)
            .unwrap();
        assert_eq!(glued, object);
        assert!(gluer.glue(&test_trait("missing", &[]), &object).is_ok());
        assert!(gluer.make_trait(TraitDefinition::new("")).is_ok());
        assert!(port.calls().is_empty());
    }

    #[test]
    fn curried_glue_matches_direct_glue() {
        let gluer = throwing(Port::passing());
        let glue = gluer.glue_trait(&test_trait("callTestFunction", &[]));
        let glued = glue.apply(&returning("RESULT")).unwrap();
        assert!(
            glued
                .function("callTestFunction")
                .unwrap()
                .glue_meta()
                .is_some()
        );
        assert_eq!(glue.trait_().name(), "callTestFunction");
    }
}
