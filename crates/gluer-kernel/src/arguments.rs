//! Argument-list validation bound to an owner.
//!
//! Wraps the orchestrator's outcome with the trait or factory whose
//! signature was violated, so the surfaced error names it.

use crate::contract::Trait;
use crate::error::{GlueError, Owner};
use crate::schema::Schema;
use crate::validate::{FailureStrategy, Validate, validate_values_by_schemas};
use crate::value::Value;

pub fn validate_argument_list(
    owner: Owner,
    schemas: &[Schema],
    args: &[Value],
    validator: &dyn Validate,
    strategy: FailureStrategy,
) -> Result<(), GlueError> {
    validate_values_by_schemas(validator, schemas, args, strategy)
        .map_err(|cause| GlueError::ArgumentValidationFailed { owner, cause })
}

/// Validate a call to the member implementing `trait_`.
pub fn validate_trait_arguments(
    trait_: &Trait,
    args: &[Value],
    validator: &dyn Validate,
    strategy: FailureStrategy,
) -> Result<(), GlueError> {
    validate_argument_list(
        Owner::Trait(trait_.name().to_string()),
        trait_.args(),
        args,
        validator,
        strategy,
    )
}
