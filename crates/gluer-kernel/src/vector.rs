//! Conformance vectors: JSON-described glue scenarios.
//!
//! A case names traits, an implementation object, what to glue (or a
//! factory to wrap and invoke), and calls to make on the result:
//!
//! ```json
//! {
//!   "config": { "mode": "reporting" },
//!   "traits": [{ "name": "greet", "args": ["string"] }],
//!   "impl": { "greet": { "fn": "prefix", "with": "hi " } },
//!   "glue": ["greet"],
//!   "calls": [{ "member": "greet", "args": ["Sam"] }]
//! }
//! ```
//!
//! With a `factory` block, `impl` is what the factory body produces and
//! `factory.invoke` holds the arguments it is called with. Values use the
//! fixture encoding from [`crate::toy`]. Schemas are checked by
//! [`TypeTagValidator`].

use crate::config::GluerConfig;
use crate::contract::{Trait, TraitDefinition};
use crate::error::{ErrorKind, GlueError};
use crate::factory::FactoryDeclaration;
use crate::glue::Gluer;
use crate::registry::TraitRegistry;
use crate::report::RecordingReporter;
use crate::schema::Schema;
use crate::toy::{self, TypeTagValidator};
use crate::value::{Object, Value};
use serde::Serialize;
use serde_json::Value as Json;
use std::sync::Arc;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum VectorError {
    #[error("malformed vector: {0}")]
    Malformed(String),

    #[error("invalid vector config: {0}")]
    Config(#[from] serde_json::Error),

    #[error(transparent)]
    Glue(#[from] GlueError),
}

fn malformed(message: impl Into<String>) -> VectorError {
    VectorError::Malformed(message.into())
}

#[derive(Debug, Clone)]
struct FactoryCase {
    name: String,
    implements: Vec<String>,
    depends_on: Vec<(String, String)>,
    args: Vec<Schema>,
    invoke: Vec<Value>,
}

#[derive(Debug, Clone)]
struct CallCase {
    member: String,
    args: Vec<Value>,
}

/// A parsed vector.
#[derive(Debug, Clone)]
pub struct VectorCase {
    config: GluerConfig,
    traits: Vec<TraitDefinition>,
    implementation: Object,
    glue: Option<Vec<String>>,
    factory: Option<FactoryCase>,
    calls: Vec<CallCase>,
}

impl VectorCase {
    pub fn from_fixture(case: &Json) -> Result<Self, VectorError> {
        let config = match case.get("config") {
            None | Some(Json::Null) => GluerConfig::default(),
            Some(config) => serde_json::from_value(config.clone())?,
        };

        let traits = case
            .get("traits")
            .and_then(Json::as_array)
            .ok_or_else(|| malformed("\"traits\" must be an array"))?
            .iter()
            .map(TraitDefinition::from_json)
            .collect::<Result<Vec<_>, _>>()?;

        let implementation = toy::object(case.get("impl").unwrap_or(&Json::Null))
            .ok_or_else(|| malformed("\"impl\" must be an object of fixture values"))?;

        let glue = match case.get("glue") {
            None | Some(Json::Null) => None,
            Some(list) => Some(string_list(list, "glue")?),
        };

        let factory = match case.get("factory") {
            None | Some(Json::Null) => None,
            Some(factory) => Some(parse_factory(factory)?),
        };

        let calls = match case.get("calls") {
            None | Some(Json::Null) => Vec::new(),
            Some(Json::Array(calls)) => calls
                .iter()
                .map(parse_call)
                .collect::<Result<Vec<_>, _>>()?,
            Some(_) => return Err(malformed("\"calls\" must be an array")),
        };

        Ok(Self {
            config,
            traits,
            implementation,
            glue,
            factory,
            calls,
        })
    }

    pub fn config(&self) -> &GluerConfig {
        &self.config
    }

    /// Run with the case's own config.
    pub fn run(&self) -> Result<VectorOutcome, VectorError> {
        self.run_with_config(self.config)
    }

    pub fn run_with_config(&self, config: GluerConfig) -> Result<VectorOutcome, VectorError> {
        let reporter = Arc::new(RecordingReporter::new());
        let gluer = Gluer::builder(Arc::new(TypeTagValidator))
            .config(config)
            .reporter(reporter.clone())
            .build();

        let mut registry = TraitRegistry::new();
        for definition in &self.traits {
            registry.define(definition.clone())?;
        }
        let lookup = |name: &str| -> Result<Trait, VectorError> {
            registry
                .get(name)
                .cloned()
                .ok_or_else(|| malformed(format!("unknown trait \"{name}\"")))
        };

        tracing::debug!(
            mode = %config.mode,
            traits = registry.len(),
            calls = self.calls.len(),
            "running vector"
        );

        let produced = match &self.factory {
            Some(factory) => {
                let mut declaration = FactoryDeclaration::new(factory.name.clone());
                for name in &factory.implements {
                    declaration = declaration.implements(lookup(name)?);
                }
                for (dependency, trait_name) in &factory.depends_on {
                    declaration = declaration.depends_on(dependency.clone(), lookup(trait_name)?);
                }
                for schema in &factory.args {
                    declaration = declaration.arg(schema.clone());
                }
                let product = self.implementation.clone();
                gluer
                    .glue_impl_factory(declaration, move |_| Ok(product.clone()))
                    .and_then(|wrapped| wrapped.call(&factory.invoke))
            }
            None => {
                let names: Vec<&str> = match &self.glue {
                    Some(names) => names.iter().map(String::as_str).collect(),
                    None => self.traits.iter().map(|t| t.name.as_str()).collect(),
                };
                let mut object = Ok(self.implementation.clone());
                for name in names {
                    let trait_ = lookup(name)?;
                    object = object.and_then(|current| gluer.glue(&trait_, &current));
                }
                object
            }
        };

        let (glue, calls): (StepOutcome, Vec<CallOutcome>) = match produced {
            Ok(object) => (
                StepOutcome::accepted(),
                self.calls
                    .iter()
                    .map(|call| {
                        CallOutcome::from_result(&call.member, object.call(&call.member, &call.args))
                    })
                    .collect(),
            ),
            Err(error) => (StepOutcome::rejected(&error), Vec::new()),
        };

        let reports = reporter
            .reports()
            .iter()
            .map(|error| ReportOutcome {
                kind: error.kind(),
                message: error.to_string(),
            })
            .collect();

        Ok(VectorOutcome {
            glue,
            calls,
            reports,
        })
    }
}

fn string_list(value: &Json, field: &str) -> Result<Vec<String>, VectorError> {
    value
        .as_array()
        .and_then(|items| {
            items
                .iter()
                .map(|item| item.as_str().map(str::to_string))
                .collect::<Option<Vec<_>>>()
        })
        .ok_or_else(|| malformed(format!("\"{field}\" must be an array of strings")))
}

fn value_list(value: Option<&Json>, field: &str) -> Result<Vec<Value>, VectorError> {
    match value {
        None | Some(Json::Null) => Ok(Vec::new()),
        Some(Json::Array(items)) => items
            .iter()
            .map(|item| {
                toy::value(item).ok_or_else(|| {
                    malformed(format!("unsupported fixture value in \"{field}\": {item}"))
                })
            })
            .collect(),
        Some(_) => Err(malformed(format!("\"{field}\" must be an array"))),
    }
}

fn parse_factory(factory: &Json) -> Result<FactoryCase, VectorError> {
    let name = factory
        .get("name")
        .and_then(Json::as_str)
        .unwrap_or_default()
        .to_string();
    let implements = match factory.get("implements") {
        None | Some(Json::Null) => Vec::new(),
        Some(list) => string_list(list, "factory.implements")?,
    };
    let depends_on = match factory.get("dependsOn") {
        None | Some(Json::Null) => Vec::new(),
        Some(Json::Object(map)) => map
            .iter()
            .map(|(dependency, trait_name)| {
                trait_name
                    .as_str()
                    .map(|trait_name| (dependency.clone(), trait_name.to_string()))
                    .ok_or_else(|| malformed("\"factory.dependsOn\" values must be trait names"))
            })
            .collect::<Result<Vec<_>, _>>()?,
        Some(_) => return Err(malformed("\"factory.dependsOn\" must be an object")),
    };
    let args = match factory.get("args") {
        None | Some(Json::Null) => Vec::new(),
        Some(Json::Array(items)) => items.iter().cloned().map(Schema).collect(),
        Some(_) => return Err(malformed("\"factory.args\" must be an array")),
    };
    let invoke = value_list(factory.get("invoke"), "factory.invoke")?;

    Ok(FactoryCase {
        name,
        implements,
        depends_on,
        args,
        invoke,
    })
}

fn parse_call(call: &Json) -> Result<CallCase, VectorError> {
    let member = call
        .get("member")
        .and_then(Json::as_str)
        .ok_or_else(|| malformed("every call needs a \"member\""))?
        .to_string();
    let args = value_list(call.get("args"), "args")?;
    Ok(CallCase { member, args })
}

/// Parse and run a case with its own config.
pub fn run_case(case: &Json) -> Result<VectorOutcome, VectorError> {
    VectorCase::from_fixture(case)?.run()
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StepOutcome {
    pub result: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub kind: Option<ErrorKind>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl StepOutcome {
    fn accepted() -> Self {
        Self {
            result: "accepted".to_string(),
            kind: None,
            message: None,
        }
    }

    fn rejected(error: &GlueError) -> Self {
        Self {
            result: "rejected".to_string(),
            kind: Some(error.kind()),
            message: Some(error.to_string()),
        }
    }

    pub fn is_accepted(&self) -> bool {
        self.result == "accepted"
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CallOutcome {
    pub member: String,
    #[serde(flatten)]
    pub step: StepOutcome,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value: Option<Json>,
}

impl CallOutcome {
    fn from_result(member: &str, result: Result<Value, GlueError>) -> Self {
        match result {
            Ok(value) => Self {
                member: member.to_string(),
                step: StepOutcome::accepted(),
                value: Some(toy::render(&value)),
            },
            Err(error) => Self {
                member: member.to_string(),
                step: StepOutcome::rejected(&error),
                value: None,
            },
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReportOutcome {
    pub kind: ErrorKind,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VectorOutcome {
    pub glue: StepOutcome,
    pub calls: Vec<CallOutcome>,
    pub reports: Vec<ReportOutcome>,
}

impl VectorOutcome {
    /// True when the glue step and every call were accepted.
    pub fn is_accepted(&self) -> bool {
        self.glue.is_accepted() && self.calls.iter().all(|call| call.step.is_accepted())
    }
}
