//! Dynamic values, implementation objects and callables.
//!
//! An implementation is an [`Object`]: a mapping from member name to
//! [`Value`]. Trait methods are [`Function`] members. A function receives the
//! object it was called through (the receiver) plus the positional
//! arguments, so wrappers can forward both unchanged.
//!
//! Objects are persistent in the copy-on-write sense: nothing in this crate
//! mutates an object it was handed. Gluing produces a new object.

use crate::contract::Trait;
use crate::error::GlueError;
use serde_json::Value as Json;
use std::any::Any;
use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

/// Signature shared by every callable member.
pub type NativeFn = dyn Fn(&Object, &[Value]) -> Result<Value, GlueError> + Send + Sync;

/// A value flowing through a call.
#[derive(Clone)]
pub enum Value {
    /// Plain data.
    Data(Json),
    /// An implementation object (e.g. a dependency bag or a collaborator).
    Object(Object),
    /// A callable.
    Function(Function),
    /// A host handle the kernel never inspects, such as a generator.
    Opaque(Arc<dyn Any + Send + Sync>),
}

impl Value {
    pub fn null() -> Self {
        Value::Data(Json::Null)
    }

    pub fn opaque<T: Any + Send + Sync>(value: T) -> Self {
        Value::Opaque(Arc::new(value))
    }

    pub fn as_data(&self) -> Option<&Json> {
        match self {
            Value::Data(json) => Some(json),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        self.as_data().and_then(Json::as_str)
    }

    pub fn as_object(&self) -> Option<&Object> {
        match self {
            Value::Object(object) => Some(object),
            _ => None,
        }
    }

    pub fn as_function(&self) -> Option<&Function> {
        match self {
            Value::Function(function) => Some(function),
            _ => None,
        }
    }

    pub fn downcast_opaque<T: Any>(&self) -> Option<&T> {
        match self {
            Value::Opaque(handle) => handle.downcast_ref::<T>(),
            _ => None,
        }
    }

    pub fn is_callable(&self) -> bool {
        matches!(self, Value::Function(_))
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Value::Data(a), Value::Data(b)) => a == b,
            (Value::Object(a), Value::Object(b)) => a == b,
            (Value::Function(a), Value::Function(b)) => a.ptr_eq(b),
            (Value::Opaque(a), Value::Opaque(b)) => Arc::ptr_eq(a, b),
            _ => false,
        }
    }
}

impl fmt::Debug for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Data(json) => write!(f, "{json}"),
            Value::Object(object) => fmt::Debug::fmt(object, f),
            Value::Function(function) => fmt::Debug::fmt(function, f),
            Value::Opaque(_) => f.write_str("<opaque>"),
        }
    }
}

impl From<Json> for Value {
    fn from(value: Json) -> Self {
        Value::Data(value)
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Value::Data(Json::String(value.to_string()))
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Value::Data(Json::String(value))
    }
}

impl From<i64> for Value {
    fn from(value: i64) -> Self {
        Value::Data(Json::from(value))
    }
}

impl From<bool> for Value {
    fn from(value: bool) -> Self {
        Value::Data(Json::Bool(value))
    }
}

impl From<Object> for Value {
    fn from(value: Object) -> Self {
        Value::Object(value)
    }
}

impl From<Function> for Value {
    fn from(value: Function) -> Self {
        Value::Function(value)
    }
}

/// Record of which trait a wrapper function was built for.
#[derive(Debug, Clone, PartialEq)]
pub struct GlueMeta {
    trait_: Trait,
}

impl GlueMeta {
    pub(crate) fn new(trait_: Trait) -> Self {
        Self { trait_ }
    }

    pub fn bound_trait(&self) -> &Trait {
        &self.trait_
    }

    pub fn trait_name(&self) -> &str {
        self.trait_.name()
    }

    /// Traits are matched by name, never by schema list.
    pub fn is_bound_to(&self, trait_: &Trait) -> bool {
        self.trait_name() == trait_.name()
    }
}

struct FunctionInner {
    body: Box<NativeFn>,
    glue_meta: Option<GlueMeta>,
}

/// A shared callable. Clones share identity.
#[derive(Clone)]
pub struct Function {
    inner: Arc<FunctionInner>,
}

impl Function {
    pub fn new<F>(body: F) -> Self
    where
        F: Fn(&Object, &[Value]) -> Result<Value, GlueError> + Send + Sync + 'static,
    {
        Self {
            inner: Arc::new(FunctionInner {
                body: Box::new(body),
                glue_meta: None,
            }),
        }
    }

    pub(crate) fn glued<F>(meta: GlueMeta, body: F) -> Self
    where
        F: Fn(&Object, &[Value]) -> Result<Value, GlueError> + Send + Sync + 'static,
    {
        Self {
            inner: Arc::new(FunctionInner {
                body: Box::new(body),
                glue_meta: Some(meta),
            }),
        }
    }

    pub fn call(&self, this: &Object, args: &[Value]) -> Result<Value, GlueError> {
        (self.inner.body)(this, args)
    }

    /// Glue metadata, present only on wrappers produced by the glue engine.
    pub fn glue_meta(&self) -> Option<&GlueMeta> {
        self.inner.glue_meta.as_ref()
    }

    pub fn ptr_eq(&self, other: &Function) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }
}

impl PartialEq for Function {
    fn eq(&self, other: &Self) -> bool {
        self.ptr_eq(other)
    }
}

impl fmt::Debug for Function {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Function")
            .field("glued", &self.glue_meta().map(GlueMeta::trait_name))
            .finish()
    }
}

/// An implementation object.
#[derive(Clone, Default, PartialEq)]
pub struct Object {
    members: BTreeMap<String, Value>,
}

impl Object {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.members.insert(name.into(), value.into());
        self
    }

    pub fn with_fn<F>(self, name: impl Into<String>, body: F) -> Self
    where
        F: Fn(&Object, &[Value]) -> Result<Value, GlueError> + Send + Sync + 'static,
    {
        self.with(name, Function::new(body))
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        self.members.get(name)
    }

    pub fn function(&self, name: &str) -> Option<&Function> {
        self.get(name).and_then(Value::as_function)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.members.contains_key(name)
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.members.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.members.iter().map(|(name, value)| (name.as_str(), value))
    }

    pub fn len(&self) -> usize {
        self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    /// A copy of this object with one member replaced.
    pub fn replaced(&self, name: &str, value: Value) -> Object {
        let mut members = self.members.clone();
        members.insert(name.to_string(), value);
        Object { members }
    }

    /// Call the member `name` with this object as receiver.
    pub fn call(&self, name: &str, args: &[Value]) -> Result<Value, GlueError> {
        let function = self.function(name).ok_or_else(|| GlueError::NotCallable {
            member: name.to_string(),
        })?;
        function.call(self, args)
    }
}

impl fmt::Debug for Object {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map().entries(self.members.iter()).finish()
    }
}

impl<K: Into<String>> FromIterator<(K, Value)> for Object {
    fn from_iter<I: IntoIterator<Item = (K, Value)>>(iter: I) -> Self {
        Self {
            members: iter
                .into_iter()
                .map(|(name, value)| (name.into(), value))
                .collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn hello() -> Function {
        Function::new(|_, _| Ok(Value::from("hello")))
    }

    #[test]
    fn replaced_leaves_the_source_untouched() {
        let original = Object::new().with("greet", hello()).with("count", 3i64);
        let other = hello();
        let copy = original.replaced("greet", Value::Function(other.clone()));

        assert!(copy.function("greet").unwrap().ptr_eq(&other));
        assert!(!original.function("greet").unwrap().ptr_eq(&other));
        assert_eq!(copy.get("count"), original.get("count"));
    }

    #[test]
    fn call_passes_the_receiver() {
        let object = Object::new()
            .with("prefix", "hi ")
            .with_fn("greet", |this, args| {
                let prefix = this.get("prefix").and_then(Value::as_str).unwrap_or("");
                let name = args.first().and_then(Value::as_str).unwrap_or("");
                Ok(Value::from(format!("{prefix}{name}")))
            });

        let result = object.call("greet", &[Value::from("Sam")]).unwrap();
        assert_eq!(result, Value::from("hi Sam"));
    }

    #[test]
    fn calling_data_member_is_not_callable() {
        let object = Object::new().with("greet", "not a function");
        let err = object.call("greet", &[]).unwrap_err();
        assert!(matches!(err, GlueError::NotCallable { member } if member == "greet"));
    }

    #[test]
    fn function_equality_is_identity() {
        let a = hello();
        let b = hello();
        assert_eq!(Value::Function(a.clone()), Value::Function(a.clone()));
        assert_ne!(Value::Function(a), Value::Function(b));
    }

    #[test]
    fn opaque_values_downcast() {
        let value = Value::opaque(vec![1u8, 2, 3]);
        assert_eq!(value.downcast_opaque::<Vec<u8>>(), Some(&vec![1u8, 2, 3]));
        assert!(value.downcast_opaque::<String>().is_none());
    }
}
