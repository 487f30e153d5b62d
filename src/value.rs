//! Dynamic value model shared by the forward and reverse mappers.
//!
//! Request payloads arrive as loosely typed key/value structures, so the
//! mappers move data around as [`Value`] instead of concrete field types.
//! Scalars and containers compare by value; the object variants (`Body`,
//! `Target`, `Source`, `Response`) are shared handles that compare by
//! reference identity, which is what the reverse mapper's cycle detection
//! relies on.

use std::cell::RefCell;
use std::collections::BTreeMap;
use std::fmt;
use std::rc::Rc;

use chrono::{DateTime, Utc};

use crate::populate::{BodyRef, BodyTarget, RequestBody, TargetRef};
use crate::response::{ResponseBody, ResponseRef, SourceRef};

/// A dynamically typed value flowing between bodies, targets, sources and
/// responses.
#[derive(Clone)]
pub enum Value {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    String(String),
    DateTime(DateTime<Utc>),
    List(Vec<Value>),
    Map(BTreeMap<String, Value>),
    /// A nested request body (forward direction source value).
    Body(BodyRef),
    /// A target-capable object (forward direction target value).
    Target(TargetRef),
    /// A response source object (reverse direction source value).
    Source(SourceRef),
    /// A response body under construction (reverse direction result value).
    Response(ResponseRef),
}

impl Value {
    #[must_use]
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// Scalar in the request-body sense: bool, integer, float or string.
    #[must_use]
    pub fn is_scalar(&self) -> bool {
        matches!(
            self,
            Value::Bool(_) | Value::Int(_) | Value::Float(_) | Value::String(_)
        )
    }

    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Value::Int(i) => Some(*i),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Float(f) => Some(*f),
            Value::Int(i) => Some(*i as f64),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_datetime(&self) -> Option<DateTime<Utc>> {
        match self {
            Value::DateTime(dt) => Some(*dt),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_list(&self) -> Option<&[Value]> {
        match self {
            Value::List(items) => Some(items),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_map(&self) -> Option<&BTreeMap<String, Value>> {
        match self {
            Value::Map(entries) => Some(entries),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_body(&self) -> Option<&BodyRef> {
        match self {
            Value::Body(body) => Some(body),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_target(&self) -> Option<&TargetRef> {
        match self {
            Value::Target(target) => Some(target),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_response(&self) -> Option<&ResponseRef> {
        match self {
            Value::Response(response) => Some(response),
            _ => None,
        }
    }

    /// Renders scalarish values as a string, mirroring a `__toString` call.
    /// Strings pass through; non-stringifiable values yield `None`.
    #[must_use]
    pub fn stringify(&self) -> Option<String> {
        match self {
            Value::String(s) => Some(s.clone()),
            Value::Bool(b) => Some(b.to_string()),
            Value::Int(i) => Some(i.to_string()),
            Value::Float(f) => Some(f.to_string()),
            Value::DateTime(dt) => Some(dt.to_rfc3339()),
            _ => None,
        }
    }
}

/// Address of a thin or fat pointer's data segment, used as an identity
/// token for shared handles.
pub(crate) fn identity<T: ?Sized>(rc: &Rc<T>) -> usize {
    Rc::as_ptr(rc).cast::<()>() as usize
}

/// Reference-identity comparison for shared request bodies.
#[must_use]
pub fn same_body(a: &BodyRef, b: &BodyRef) -> bool {
    identity(a) == identity(b)
}

/// Reference-identity comparison for shared targets.
#[must_use]
pub fn same_target(a: &TargetRef, b: &TargetRef) -> bool {
    identity(a) == identity(b)
}

/// Reference-identity comparison for shared responses.
#[must_use]
pub fn same_response(a: &ResponseRef, b: &ResponseRef) -> bool {
    identity(a) == identity(b)
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Value::Null, Value::Null) => true,
            (Value::Bool(a), Value::Bool(b)) => a == b,
            (Value::Int(a), Value::Int(b)) => a == b,
            (Value::Float(a), Value::Float(b)) => a == b,
            (Value::String(a), Value::String(b)) => a == b,
            (Value::DateTime(a), Value::DateTime(b)) => a == b,
            (Value::List(a), Value::List(b)) => a == b,
            (Value::Map(a), Value::Map(b)) => a == b,
            (Value::Body(a), Value::Body(b)) => identity(a) == identity(b),
            (Value::Target(a), Value::Target(b)) => identity(a) == identity(b),
            (Value::Source(a), Value::Source(b)) => identity(a) == identity(b),
            (Value::Response(a), Value::Response(b)) => identity(a) == identity(b),
            _ => false,
        }
    }
}

impl fmt::Debug for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => write!(f, "Null"),
            Value::Bool(b) => write!(f, "Bool({b})"),
            Value::Int(i) => write!(f, "Int({i})"),
            Value::Float(v) => write!(f, "Float({v})"),
            Value::String(s) => write!(f, "String({s:?})"),
            Value::DateTime(dt) => write!(f, "DateTime({})", dt.to_rfc3339()),
            Value::List(items) => f.debug_tuple("List").field(items).finish(),
            Value::Map(entries) => f.debug_tuple("Map").field(entries).finish(),
            Value::Body(body) => write!(f, "Body({})", body.body_type()),
            Value::Target(target) => write!(f, "Target({})", target.borrow().target_type()),
            Value::Source(source) => write!(f, "Source({})", source.source_type()),
            Value::Response(response) => {
                write!(f, "Response({})", response.borrow().response_type())
            }
        }
    }
}

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Value::Bool(v)
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Value::Int(v)
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Value::Float(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::String(v.to_string())
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Value::String(v)
    }
}

impl From<DateTime<Utc>> for Value {
    fn from(v: DateTime<Utc>) -> Self {
        Value::DateTime(v)
    }
}

impl From<Vec<Value>> for Value {
    fn from(v: Vec<Value>) -> Self {
        Value::List(v)
    }
}

impl From<BTreeMap<String, Value>> for Value {
    fn from(v: BTreeMap<String, Value>) -> Self {
        Value::Map(v)
    }
}

impl<T> From<Option<T>> for Value
where
    T: Into<Value>,
{
    fn from(v: Option<T>) -> Self {
        v.map_or(Value::Null, Into::into)
    }
}

impl From<Rc<RefCell<dyn BodyTarget>>> for Value {
    fn from(v: Rc<RefCell<dyn BodyTarget>>) -> Self {
        Value::Target(v)
    }
}

impl From<Rc<dyn RequestBody>> for Value {
    fn from(v: Rc<dyn RequestBody>) -> Self {
        Value::Body(v)
    }
}

/// Position of an element inside a collection-valued field, handed to the
/// child-population hook so overrides can key their own lookups.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum CollectionKey {
    Index(usize),
    Key(String),
}

impl fmt::Display for CollectionKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CollectionKey::Index(i) => write!(f, "{i}"),
            CollectionKey::Key(k) => write!(f, "{k}"),
        }
    }
}
