//! Error types for glue operations.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Failure returned by a schema validator for one value.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{message}")]
pub struct ValidationError {
    pub message: String,
}

impl ValidationError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// The owner of an argument list: a trait method or a factory call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Owner {
    Trait(String),
    Factory(String),
}

impl Owner {
    pub fn name(&self) -> &str {
        match self {
            Owner::Trait(name) | Owner::Factory(name) => name,
        }
    }
}

impl fmt::Display for Owner {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Owner::Trait(name) => write!(f, "the trait \"{name}\""),
            Owner::Factory(name) => write!(f, "the implFactory \"{name}\""),
        }
    }
}

/// A single rejected positional argument.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArgumentFailure {
    pub index: usize,
    pub error: ValidationError,
}

/// Why an argument list did not match its schemas.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ArgumentError {
    /// More actual arguments than declared schemas.
    #[error("Provided {actual} arguments, but at most {expected} are declared.")]
    TooManyArguments { expected: usize, actual: usize },

    /// The validator rejected one or more arguments, in positional order.
    #[error("{}", join_failures(.0))]
    Rejected(Vec<ArgumentFailure>),
}

impl ArgumentError {
    /// Validator failures carried by this error (empty for arity errors).
    pub fn failures(&self) -> &[ArgumentFailure] {
        match self {
            ArgumentError::TooManyArguments { .. } => &[],
            ArgumentError::Rejected(failures) => failures,
        }
    }
}

fn join_failures(failures: &[ArgumentFailure]) -> String {
    match failures {
        [single] => single.error.message.clone(),
        many => many
            .iter()
            .map(|failure| format!("argument {}: {}", failure.index, failure.error))
            .collect::<Vec<_>>()
            .join("; "),
    }
}

fn join_errors(errors: &[GlueError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(" ")
}

fn quote_list(names: &[String]) -> String {
    names
        .iter()
        .map(|name| format!("\"{name}\""))
        .collect::<Vec<_>>()
        .join(", ")
}

/// Errors arising from trait construction, gluing and glued calls.
#[derive(Debug, Clone, thiserror::Error)]
pub enum GlueError {
    /// A trait definition is malformed.
    #[error("Invalid trait definition: {reason}")]
    InvalidTraitDefinition { reason: String },

    /// A factory declaration is malformed.
    #[error("{message}")]
    InvalidFactoryDeclaration {
        field: &'static str,
        message: String,
    },

    /// The implementation has no callable member named after the trait.
    #[error("The trait \"{trait_name}\" is not implemented.")]
    TraitNotImplemented { trait_name: String },

    /// The member is already a wrapper bound to a different trait.
    #[error(
        "The implFn for the trait \"{trait_name}\" already implements another trait \"{bound_trait}\"."
    )]
    ConflictingTraitBinding {
        trait_name: String,
        bound_trait: String,
    },

    /// A call's arguments did not satisfy the owner's schemas.
    #[error("Failed arguments validation for {owner}. Cause error: {cause}")]
    ArgumentValidationFailed {
        owner: Owner,
        #[source]
        cause: ArgumentError,
    },

    #[error(
        "The implFactory \"{factory}\" requires the dependency \"{dependency}\" implementing the trait \"{trait_name}\", but it was not provided."
    )]
    MissingDependency {
        factory: String,
        dependency: String,
        trait_name: String,
    },

    #[error("The implFactory \"{factory}\" received the undeclared dependency \"{dependency}\".")]
    UnexpectedDependency { factory: String, dependency: String },

    #[error(
        "The implFactory \"{factory}\" expected the dependency \"{expected}\", but received \"{found}\"."
    )]
    DependencyNameMismatch {
        factory: String,
        expected: String,
        found: String,
    },

    #[error(
        "The dependency \"{dependency}\" of the implFactory \"{factory}\" does not implement the trait \"{trait_name}\"."
    )]
    DependencyDoesNotImplementTrait {
        factory: String,
        dependency: String,
        trait_name: String,
    },

    /// Every dependency failure of one factory call, in detection order.
    #[error(
        "The implFactory \"{factory}\" failed dependency validation. Cause error: {}",
        join_errors(.failures)
    )]
    DependencyValidationFailed {
        factory: String,
        failures: Vec<GlueError>,
    },

    /// The produced object lacks callable members for declared traits.
    #[error(
        "The implFactory \"{factory}\" produced an implementation missing the traits {}.",
        quote_list(.missing)
    )]
    IncompleteImplementation {
        factory: String,
        missing: Vec<String>,
    },

    /// Gluing a declared trait onto the produced object failed.
    #[error("The implFactory \"{factory}\" failed. {cause}")]
    FactoryFailed {
        factory: String,
        #[source]
        cause: Box<GlueError>,
    },

    #[error("A different trait named \"{name}\" is already defined.")]
    DuplicateTraitName { name: String },

    #[error("The member \"{member}\" is not callable.")]
    NotCallable { member: String },

    /// A failure raised by an implementation function itself.
    #[error("{message}")]
    Raised { message: String },
}

impl GlueError {
    pub fn raised(message: impl Into<String>) -> Self {
        GlueError::Raised {
            message: message.into(),
        }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            GlueError::InvalidTraitDefinition { .. } => ErrorKind::InvalidTraitDefinition,
            GlueError::InvalidFactoryDeclaration { .. } => ErrorKind::InvalidFactoryDeclaration,
            GlueError::TraitNotImplemented { .. } => ErrorKind::TraitNotImplemented,
            GlueError::ConflictingTraitBinding { .. } => ErrorKind::ConflictingTraitBinding,
            GlueError::ArgumentValidationFailed {
                cause: ArgumentError::TooManyArguments { .. },
                ..
            } => ErrorKind::TooManyArguments,
            GlueError::ArgumentValidationFailed { .. } => ErrorKind::ArgumentValidationFailed,
            GlueError::MissingDependency { .. } => ErrorKind::MissingDependency,
            GlueError::UnexpectedDependency { .. } => ErrorKind::UnexpectedDependency,
            GlueError::DependencyNameMismatch { .. } => ErrorKind::DependencyNameMismatch,
            GlueError::DependencyDoesNotImplementTrait { .. } => {
                ErrorKind::DependencyDoesNotImplementTrait
            }
            GlueError::DependencyValidationFailed { .. } => ErrorKind::DependencyValidationFailed,
            GlueError::IncompleteImplementation { .. } => ErrorKind::IncompleteImplementation,
            GlueError::FactoryFailed { .. } => ErrorKind::FactoryFailed,
            GlueError::DuplicateTraitName { .. } => ErrorKind::DuplicateTraitName,
            GlueError::NotCallable { .. } => ErrorKind::NotCallable,
            GlueError::Raised { .. } => ErrorKind::Raised,
        }
    }

    /// Nested causes: aggregated dependency failures or the wrapped glue error.
    pub fn causes(&self) -> Vec<&GlueError> {
        match self {
            GlueError::DependencyValidationFailed { failures, .. } => failures.iter().collect(),
            GlueError::FactoryFailed { cause, .. } => vec![cause.as_ref()],
            _ => Vec::new(),
        }
    }
}

/// Stable classification of a [`GlueError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    InvalidTraitDefinition,
    InvalidFactoryDeclaration,
    TraitNotImplemented,
    ConflictingTraitBinding,
    ArgumentValidationFailed,
    TooManyArguments,
    MissingDependency,
    UnexpectedDependency,
    DependencyNameMismatch,
    DependencyDoesNotImplementTrait,
    DependencyValidationFailed,
    IncompleteImplementation,
    FactoryFailed,
    DuplicateTraitName,
    NotCallable,
    Raised,
}
