//! Toy validator and toy functions for conformance vectors.
//!
//! The glue engine never interprets schemas. These helpers give the
//! fixtures something concrete to validate against and something concrete
//! to call.
//!
//! ## Schemas
//!
//! A schema is a type tag (`"string"`, `"number"`, `"integer"`,
//! `"boolean"`, `"null"`, `"object"`, `"array"`, `"function"`, `"any"`),
//! `{"type": tag}`, or `{"oneOf": [schema, ...]}`.
//!
//! ## Fixture values
//!
//! - `{"fn": "echo"}` and friends become callables (see [`function`]),
//! - `{"$object": {...}}` becomes an [`Object`] with converted members,
//! - everything else is plain data.

use crate::error::{GlueError, ValidationError};
use crate::schema::Schema;
use crate::validate::Validate;
use crate::value::{Function, Object, Value};
use serde_json::Value as Json;

/// Validates the type-tag schema language.
#[derive(Debug, Clone, Copy, Default)]
pub struct TypeTagValidator;

impl Validate for TypeTagValidator {
    fn validate(&self, schema: &Schema, value: &Value) -> Result<(), ValidationError> {
        if matches(schema.as_json(), value)? {
            Ok(())
        } else {
            Err(ValidationError::new(format!(
                "expected {}, got {}",
                describe(schema.as_json()),
                type_name(value)
            )))
        }
    }
}

fn matches(schema: &Json, value: &Value) -> Result<bool, ValidationError> {
    match schema {
        Json::String(tag) => matches_tag(tag, value),
        Json::Object(map) => {
            if let Some(Json::Array(options)) = map.get("oneOf") {
                for option in options {
                    if matches(option, value)? {
                        return Ok(true);
                    }
                }
                return Ok(false);
            }
            match map.get("type") {
                Some(Json::String(tag)) => matches_tag(tag, value),
                _ => Err(unsupported(schema)),
            }
        }
        _ => Err(unsupported(schema)),
    }
}

fn matches_tag(tag: &str, value: &Value) -> Result<bool, ValidationError> {
    let data = value.as_data();
    let ok = match tag {
        "any" => true,
        "string" => data.is_some_and(Json::is_string),
        "number" => data.is_some_and(Json::is_number),
        "integer" => data.is_some_and(|json| json.is_i64() || json.is_u64()),
        "boolean" => data.is_some_and(Json::is_boolean),
        "null" => data.is_some_and(Json::is_null),
        "array" => data.is_some_and(Json::is_array),
        "object" => data.is_some_and(Json::is_object) || value.as_object().is_some(),
        "function" => value.is_callable(),
        _ => return Err(unsupported(&Json::String(tag.to_string()))),
    };
    Ok(ok)
}

fn unsupported(schema: &Json) -> ValidationError {
    ValidationError::new(format!("unsupported schema: {schema}"))
}

fn describe(schema: &Json) -> String {
    match schema {
        Json::String(tag) => tag.clone(),
        Json::Object(map) => {
            if let Some(Json::Array(options)) = map.get("oneOf") {
                let parts: Vec<String> = options.iter().map(describe).collect();
                return format!("one of [{}]", parts.join(", "));
            }
            match map.get("type") {
                Some(Json::String(tag)) => tag.clone(),
                _ => schema.to_string(),
            }
        }
        other => other.to_string(),
    }
}

/// The type tag a value would satisfy.
pub fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Data(Json::Null) => "null",
        Value::Data(Json::Bool(_)) => "boolean",
        Value::Data(Json::Number(_)) => "number",
        Value::Data(Json::String(_)) => "string",
        Value::Data(Json::Array(_)) => "array",
        Value::Data(Json::Object(_)) | Value::Object(_) => "object",
        Value::Function(_) => "function",
        Value::Opaque(_) => "opaque",
    }
}

/// Build a toy callable from its fixture form.
///
/// - `{"fn": "echo"}` returns its first argument, or null,
/// - `{"fn": "prefix", "with": "hi "}` prepends `with` to its first argument,
///   falling back to the receiver's `prefix` member,
/// - `{"fn": "const", "value": v}` always returns `v`,
/// - `{"fn": "count_args"}` returns the number of arguments,
/// - `{"fn": "fail", "message": m}` always raises `m`.
pub fn function(fixture: &Json) -> Option<Function> {
    let name = fixture.get("fn")?.as_str()?;
    let function = match name {
        "echo" => Function::new(|_, args| Ok(args.first().cloned().unwrap_or_else(Value::null))),
        "prefix" => {
            let with = fixture.get("with").and_then(Json::as_str).map(str::to_string);
            Function::new(move |this, args| {
                let prefix = match &with {
                    Some(prefix) => prefix.clone(),
                    None => this
                        .get("prefix")
                        .and_then(Value::as_str)
                        .unwrap_or_default()
                        .to_string(),
                };
                let rest = args.first().map(render).unwrap_or(Json::Null);
                let rest = match rest {
                    Json::String(text) => text,
                    other => other.to_string(),
                };
                Ok(Value::from(format!("{prefix}{rest}")))
            })
        }
        "const" => {
            let value = fixture.get("value").cloned().unwrap_or(Json::Null);
            Function::new(move |_, _| Ok(Value::Data(value.clone())))
        }
        "count_args" => Function::new(|_, args| Ok(Value::from(args.len() as i64))),
        "fail" => {
            let message = fixture
                .get("message")
                .and_then(Json::as_str)
                .unwrap_or("toy failure")
                .to_string();
            Function::new(move |_, _| Err(GlueError::raised(message.clone())))
        }
        _ => return None,
    };
    Some(function)
}

/// Convert a fixture value. `None` means a malformed `fn` or `$object`.
pub fn value(fixture: &Json) -> Option<Value> {
    if let Json::Object(map) = fixture {
        if map.contains_key("fn") {
            return function(fixture).map(Value::Function);
        }
        if let Some(members) = map.get("$object") {
            return object(members).map(Value::Object);
        }
    }
    Some(Value::Data(fixture.clone()))
}

/// Convert a JSON map of fixture values into an [`Object`].
pub fn object(fixture: &Json) -> Option<Object> {
    let map = fixture.as_object()?;
    map.iter()
        .map(|(name, member)| value(member).map(|converted| (name.clone(), converted)))
        .collect()
}

/// Render a value back to JSON for outcomes.
pub fn render(value: &Value) -> Json {
    match value {
        Value::Data(json) => json.clone(),
        Value::Object(object) => {
            let members: serde_json::Map<String, Json> = object
                .iter()
                .map(|(name, member)| (name.to_string(), render(member)))
                .collect();
            serde_json::json!({ "$object": members })
        }
        Value::Function(function) => match function.glue_meta() {
            Some(meta) => Json::String(format!("<glued {}>", meta.trait_name())),
            None => Json::String("<function>".to_string()),
        },
        Value::Opaque(_) => Json::String("<opaque>".to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn check(schema: Json, value: Value) -> Result<(), ValidationError> {
        TypeTagValidator.validate(&Schema(schema), &value)
    }

    #[test]
    fn type_tags_accept_matching_values() {
        assert!(check(json!("string"), Value::from("Sam")).is_ok());
        assert!(check(json!("integer"), Value::from(3i64)).is_ok());
        assert!(check(json!("number"), Value::Data(json!(1.5))).is_ok());
        assert!(check(json!("object"), Value::Object(Object::new())).is_ok());
        assert!(check(json!({"type": "null"}), Value::null()).is_ok());
        assert!(check(json!("any"), Value::opaque(7u8)).is_ok());
    }

    #[test]
    fn mismatches_name_both_sides() {
        let err = check(json!("string"), Value::from(5i64)).unwrap_err();
        assert_eq!(err.message, "expected string, got number");

        let err = check(json!({"oneOf": ["string", "null"]}), Value::from(true)).unwrap_err();
        assert_eq!(err.message, "expected one of [string, null], got boolean");
    }

    #[test]
    fn integer_rejects_fractions() {
        assert!(check(json!("integer"), Value::Data(json!(1.5))).is_err());
    }

    #[test]
    fn unknown_tags_are_errors() {
        let err = check(json!("uuid"), Value::from("x")).unwrap_err();
        assert_eq!(err.message, "unsupported schema: \"uuid\"");
        assert!(check(json!(42), Value::from("x")).is_err());
    }

    #[test]
    fn toy_functions_behave() {
        let this = Object::new().with("prefix", "yo ");
        let call = |fixture: Json, args: &[Value]| function(&fixture).unwrap().call(&this, args);

        assert_eq!(
            call(json!({"fn": "prefix", "with": "hi "}), &[Value::from("Sam")]).unwrap(),
            Value::from("hi Sam")
        );
        assert_eq!(
            call(json!({"fn": "prefix"}), &[Value::from("Sam")]).unwrap(),
            Value::from("yo Sam")
        );
        assert_eq!(
            call(json!({"fn": "count_args"}), &[Value::null(), Value::null()]).unwrap(),
            Value::from(2i64)
        );
        assert_eq!(call(json!({"fn": "echo"}), &[]).unwrap(), Value::null());
        let err = call(json!({"fn": "fail", "message": "boom"}), &[]).unwrap_err();
        assert_eq!(err.to_string(), "boom");
        assert!(function(&json!({"fn": "teleport"})).is_none());
    }

    #[test]
    fn fixture_values_convert_recursively() {
        let converted = value(&json!({"$object": {
            "log": {"fn": "echo"},
            "level": "info",
        }}))
        .unwrap();
        let object = converted.as_object().unwrap();
        assert!(object.get("log").unwrap().is_callable());
        assert_eq!(object.get("level"), Some(&Value::from("info")));
        assert_eq!(
            render(&converted),
            json!({"$object": {"level": "info", "log": "<function>"}})
        );

        assert!(value(&json!({"$object": {"bad": {"fn": "nope"}}})).is_none());
        assert_eq!(value(&json!([1, 2])), Some(Value::Data(json!([1, 2]))));
    }
}
