//! The validator port and the schema/value orchestrator.
//!
//! `validate_values_by_schemas` is the one place that walks an argument list.
//! Trait methods and factory calls both go through it.

use crate::error::{ArgumentError, ArgumentFailure, ValidationError};
use crate::schema::Schema;
use crate::value::Value;
use serde::{Deserialize, Serialize};

/// External schema validator.
///
/// Must be reentrant: glued functions may be called from several threads.
pub trait Validate: Send + Sync {
    fn validate(&self, schema: &Schema, value: &Value) -> Result<(), ValidationError>;
}

impl<F> Validate for F
where
    F: Fn(&Schema, &Value) -> Result<(), ValidationError> + Send + Sync,
{
    fn validate(&self, schema: &Schema, value: &Value) -> Result<(), ValidationError> {
        self(schema, value)
    }
}

/// How many validator failures one argument list may produce.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureStrategy {
    /// Stop at the first rejected argument.
    #[default]
    FirstFailure,
    /// Validate every supplied argument and report all rejections.
    CollectAll,
}

/// Validate `values` against `schemas` position by position.
///
/// More values than schemas fails before the validator is consulted. Fewer
/// values is fine; missing trailing arguments are never validated.
pub fn validate_values_by_schemas(
    validator: &dyn Validate,
    schemas: &[Schema],
    values: &[Value],
    strategy: FailureStrategy,
) -> Result<(), ArgumentError> {
    if values.len() > schemas.len() {
        return Err(ArgumentError::TooManyArguments {
            expected: schemas.len(),
            actual: values.len(),
        });
    }

    let mut failures = Vec::new();
    for (index, (schema, value)) in schemas.iter().zip(values).enumerate() {
        if let Err(error) = validator.validate(schema, value) {
            failures.push(ArgumentFailure { index, error });
            if strategy == FailureStrategy::FirstFailure {
                break;
            }
        }
    }

    if failures.is_empty() {
        Ok(())
    } else {
        Err(ArgumentError::Rejected(failures))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    struct Recording {
        calls: Mutex<Vec<(Schema, Value)>>,
        reject: Vec<usize>,
    }

    impl Recording {
        fn rejecting(reject: Vec<usize>) -> Self {
            Self {
                calls: Mutex::new(Vec::new()),
                reject,
            }
        }

        fn calls(&self) -> Vec<(Schema, Value)> {
            self.calls.lock().unwrap().clone()
        }
    }

    impl Validate for Recording {
        fn validate(&self, schema: &Schema, value: &Value) -> Result<(), ValidationError> {
            let mut calls = self.calls.lock().unwrap();
            let index = calls.len();
            calls.push((schema.clone(), value.clone()));
            if self.reject.contains(&index) {
                Err(ValidationError::new(format!("rejected {index}")))
            } else {
                Ok(())
            }
        }
    }

    fn schemas(n: usize) -> Vec<Schema> {
        (0..n).map(|i| Schema::from(format!("s{i}"))).collect()
    }

    #[test]
    fn too_many_values_fails_before_any_validator_call() {
        let validator = Recording::rejecting(vec![]);
        let err = validate_values_by_schemas(
            &validator,
            &schemas(1),
            &[Value::from("a"), Value::from("b")],
            FailureStrategy::FirstFailure,
        )
        .unwrap_err();

        assert_eq!(
            err,
            ArgumentError::TooManyArguments {
                expected: 1,
                actual: 2
            }
        );
        assert!(validator.calls().is_empty());
    }

    #[test]
    fn fewer_values_validates_only_supplied_positions() {
        let validator = Recording::rejecting(vec![]);
        validate_values_by_schemas(
            &validator,
            &schemas(3),
            &[Value::from("a")],
            FailureStrategy::FirstFailure,
        )
        .unwrap();

        assert_eq!(
            validator.calls(),
            vec![(Schema::from("s0"), Value::from("a"))]
        );
    }

    #[test]
    fn first_failure_short_circuits_left_to_right() {
        let validator = Recording::rejecting(vec![1, 2]);
        let values = [Value::from("a"), Value::from("b"), Value::from("c")];
        let err = validate_values_by_schemas(
            &validator,
            &schemas(3),
            &values,
            FailureStrategy::FirstFailure,
        )
        .unwrap_err();

        assert_eq!(validator.calls().len(), 2);
        assert_eq!(err.failures().len(), 1);
        assert_eq!(err.failures()[0].index, 1);
        assert_eq!(err.to_string(), "rejected 1");
    }

    #[test]
    fn collect_all_keeps_validating() {
        let validator = Recording::rejecting(vec![0, 2]);
        let values = [Value::from("a"), Value::from("b"), Value::from("c")];
        let err =
            validate_values_by_schemas(&validator, &schemas(3), &values, FailureStrategy::CollectAll)
                .unwrap_err();

        assert_eq!(validator.calls().len(), 3);
        let indices: Vec<usize> = err.failures().iter().map(|f| f.index).collect();
        assert_eq!(indices, vec![0, 2]);
    }

    #[test]
    fn closures_are_validators() {
        let always_bad = |_: &Schema, _: &Value| -> Result<(), ValidationError> {
            Err(ValidationError::new("bad"))
        };
        let err = validate_values_by_schemas(
            &always_bad,
            &schemas(1),
            &[Value::null()],
            FailureStrategy::FirstFailure,
        )
        .unwrap_err();
        assert_eq!(err.to_string(), "bad");
    }
}
