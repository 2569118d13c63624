//! Opaque argument schemas.
//!
//! The kernel never looks inside a schema. It only threads it from a trait
//! declaration to the validator port, position by position.

use serde::{Deserialize, Serialize};
use serde_json::Value as Json;
use std::fmt;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Schema(pub Json);

impl Schema {
    pub fn new(value: impl Into<Json>) -> Self {
        Self(value.into())
    }

    pub fn as_json(&self) -> &Json {
        &self.0
    }
}

impl From<&str> for Schema {
    fn from(value: &str) -> Self {
        Self(Json::String(value.to_string()))
    }
}

impl From<String> for Schema {
    fn from(value: String) -> Self {
        Self(Json::String(value))
    }
}

impl From<Json> for Schema {
    fn from(value: Json) -> Self {
        Self(value)
    }
}

impl fmt::Display for Schema {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
