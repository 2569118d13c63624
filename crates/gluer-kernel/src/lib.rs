//! # Gluer Kernel
//!
//! Runtime contract enforcement for dynamically shaped implementations.
//!
//! A trait is a named callable contract. Gluing a trait onto an object
//! replaces the member named after the trait with a wrapper that validates
//! every call's arguments against the trait's schemas before delegating.
//! Implementation factories are wrapped the same way: their dependencies,
//! their own arguments and their product are all checked.
//!
//! The kernel is **schema-agnostic**: schemas are opaque values handed to an
//! injected [`Validate`] port. Failures are either returned or sent to an
//! injected [`ReportValidationError`] port, depending on [`Mode`].
//!
//! ## Architecture
//!
//! ```text
//! Trait / TraitDefinition    ← name + argument schemas (+ return schema)
//!     │
//! validate_values_by_schemas ← arity check, then one validator call per arg
//!     │
//! Gluer::glue                ← wraps the member, tags it with GlueMeta
//!     │
//! ImplFactory                ← dependency bag → own args → implements
//! ```

pub mod arguments;
pub mod config;
pub mod contract;
pub mod error;
pub mod factory;
pub mod glue;
pub mod registry;
pub mod report;
pub mod schema;
pub mod toy;
pub mod validate;
pub mod value;
pub mod vector;

pub use arguments::{validate_argument_list, validate_trait_arguments};
pub use config::{ConfigError, GluerConfig, Mode};
pub use contract::{Trait, TraitDefinition, missing_traits};
pub use error::{ArgumentError, ArgumentFailure, ErrorKind, GlueError, Owner, ValidationError};
pub use factory::{FactoryDeclaration, ImplFactory};
pub use glue::{Gluer, GluerBuilder, TraitGlue};
pub use registry::TraitRegistry;
pub use report::{RecordingReporter, ReportValidationError, TracingReporter};
pub use schema::Schema;
pub use validate::{FailureStrategy, Validate, validate_values_by_schemas};
pub use value::{Function, GlueMeta, Object, Value};
pub use vector::{VectorCase, VectorError, VectorOutcome, run_case};
