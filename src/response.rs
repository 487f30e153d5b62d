//! Reverse mapper: projects a source object into a response body.
//!
//! [`create_response_from_source`] walks the *response* type's declared
//! fields, reads same-named values from the source, converts shapes (nested
//! sources, collections, stringifiable values) and assigns them. Projection
//! is best-effort: a field whose conversion fails is skipped, the rest of
//! the object is still populated.
//!
//! Cycle safety comes from the [`ProcessedSet`]: every (source identity,
//! response type) pair is converted at most once per top-level call, and a
//! repeat encounter returns the shared, possibly still-being-populated
//! response instance instead of recursing. The set must be fresh per
//! top-level call; reusing it across unrelated conversions would
//! short-circuit them incorrectly.

use std::any::Any;
use std::cell::RefCell;
use std::collections::{BTreeMap, HashMap};
use std::rc::Rc;

use tracing::{debug, trace};

use crate::field::{FieldSpec, ResponseType, TypeTag};
use crate::value::{Value, identity};

/// Shared handle to a response source.
pub type SourceRef = Rc<dyn ResponseSource>;

/// Shared mutable handle to a response body.
pub type ResponseRef = Rc<RefCell<dyn ResponseBody>>;

/// An object convertible into a response body.
pub trait ResponseSource {
    /// Type name used in logs.
    fn source_type(&self) -> &'static str;

    /// Reads a named value. `None` means the field is not readable on this
    /// source and the response field is skipped.
    fn get(&self, field: &str) -> Option<Value>;

    /// Factory for a fresh, empty response of the declared subtype.
    /// Returning `None` makes the whole conversion yield nothing; that is
    /// an absence, not an error.
    fn create_response(&self) -> Option<ResponseRef>;
}

/// A response body destined for external emission.
pub trait ResponseBody {
    /// Concrete response type name; part of the cycle-detection key.
    fn response_type(&self) -> &'static str;

    /// Declared fields with their accepted types.
    fn fields(&self) -> &'static [FieldSpec];

    /// Current value of a field, for emission.
    fn get(&self, field: &str) -> Value;

    /// Assigns a field. Returning `false` rejects the value and skips only
    /// that field.
    fn set(&mut self, field: &str, value: Value) -> bool;

    fn as_any(&self) -> &dyn Any;
}

/// Memoization map from (source reference identity, response type name) to
/// the response already created for that pair within one top-level call.
#[derive(Default)]
pub struct ProcessedSet {
    entries: HashMap<(usize, &'static str), ResponseRef>,
}

impl ProcessedSet {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn get(&self, source: &SourceRef, response_type: &'static str) -> Option<ResponseRef> {
        self.entries
            .get(&(identity(source), response_type))
            .cloned()
    }

    fn insert(&mut self, source: &SourceRef, response_type: &'static str, response: ResponseRef) {
        self.entries
            .insert((identity(source), response_type), response);
    }
}

/// Converts `source` into a response body.
///
/// The concrete response type is the explicit `response_type` override when
/// given, otherwise whatever the source's factory manufactures; a factory
/// yielding nothing makes the conversion yield `None`. Encountering a
/// (source, type) pair already registered in `processed` returns the
/// previously created instance, which breaks cycles in mutually referential
/// object graphs by sharing a possibly incomplete response.
pub fn create_response_from_source(
    source: &SourceRef,
    processed: &mut ProcessedSet,
    response_type: Option<&'static ResponseType>,
) -> Option<ResponseRef> {
    let response = match response_type {
        Some(rt) => rt.construct(),
        None => source.create_response()?,
    };
    let type_name = response.borrow().response_type();
    if let Some(existing) = processed.get(source, type_name) {
        trace!(
            source = source.source_type(),
            response = type_name,
            "returning already-processed response for source"
        );
        return Some(existing);
    }
    // Register before populating so a field cycling back to this pair
    // observes the in-progress instance.
    processed.insert(source, type_name, response.clone());

    let fields = response.borrow().fields();
    for spec in fields {
        if !spec.writable {
            continue;
        }
        let Some(source_value) = source.get(spec.name) else {
            trace!(field = spec.name, "skipping field not readable on source");
            continue;
        };
        let Some(converted) = convert_source_value(spec.types, spec.elem, source_value, processed)
        else {
            debug!(field = spec.name, "skipping field: conversion failed");
            continue;
        };
        if !response.borrow_mut().set(spec.name, converted) {
            debug!(field = spec.name, "skipping field: response rejected value");
        }
    }
    Some(response)
}

/// Recursive, type-directed conversion of one source value into the
/// response field's declared shape. `None` skips the field.
fn convert_source_value(
    types: &[TypeTag],
    elem: &[TypeTag],
    value: Value,
    processed: &mut ProcessedSet,
) -> Option<Value> {
    match value {
        Value::Source(source) => {
            let override_type = types.iter().find_map(TypeTag::response_type);
            match create_response_from_source(&source, processed, override_type) {
                Some(response) => Some(Value::Response(response)),
                // Absent factory propagates as absence, not an error.
                None => Some(Value::Null),
            }
        }
        Value::List(items) if has_tag(types, TypeTag::List) => {
            let converted = items
                .into_iter()
                .filter_map(|item| convert_source_value(elem, &[], item, processed))
                .collect();
            Some(Value::List(converted))
        }
        Value::Map(entries) if has_tag(types, TypeTag::Map) => {
            let mut converted = BTreeMap::new();
            for (key, item) in entries {
                if let Some(item) = convert_source_value(elem, &[], item, processed) {
                    converted.insert(key, item);
                }
            }
            Some(Value::Map(converted))
        }
        other => {
            if has_tag(types, TypeTag::String) && !matches!(other, Value::String(_)) {
                if let Some(text) = other.stringify() {
                    return Some(Value::String(text));
                }
            }
            Some(other)
        }
    }
}

fn has_tag(types: &[TypeTag], tag: TypeTag) -> bool {
    types.iter().any(|t| *t == tag)
}

/// Emits a response graph as plain JSON data, driven by the field registry.
///
/// Responses already on the emission path serialize as `null`, so cyclic
/// graphs produced by the shared-instance cycle breaking still terminate.
#[must_use]
pub fn response_to_json(response: &ResponseRef) -> serde_json::Value {
    let mut visiting = Vec::new();
    emit_response(response, &mut visiting)
}

fn emit_response(response: &ResponseRef, visiting: &mut Vec<usize>) -> serde_json::Value {
    let id = identity(response);
    if visiting.contains(&id) {
        return serde_json::Value::Null;
    }
    visiting.push(id);
    let mut object = serde_json::Map::new();
    for spec in response.borrow().fields() {
        let value = response.borrow().get(spec.name);
        object.insert(spec.name.to_string(), emit_value(value, visiting));
    }
    visiting.pop();
    serde_json::Value::Object(object)
}

fn emit_value(value: Value, visiting: &mut Vec<usize>) -> serde_json::Value {
    match value {
        Value::Null | Value::Body(_) | Value::Target(_) | Value::Source(_) => {
            serde_json::Value::Null
        }
        Value::Bool(b) => serde_json::Value::Bool(b),
        Value::Int(i) => serde_json::Value::Number(i.into()),
        Value::Float(f) => serde_json::Number::from_f64(f)
            .map_or(serde_json::Value::Null, serde_json::Value::Number),
        Value::String(s) => serde_json::Value::String(s),
        Value::DateTime(dt) => serde_json::Value::String(dt.to_rfc3339()),
        Value::List(items) => serde_json::Value::Array(
            items
                .into_iter()
                .map(|item| emit_value(item, visiting))
                .collect(),
        ),
        Value::Map(entries) => serde_json::Value::Object(
            entries
                .into_iter()
                .map(|(key, item)| (key, emit_value(item, visiting)))
                .collect(),
        ),
        Value::Response(nested) => emit_response(&nested, visiting),
    }
}
