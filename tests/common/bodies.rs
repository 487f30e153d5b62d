//! Forward-mapper fixtures: a generic map-backed body/target pair for
//! focused property tests, and typed sample body/target types mirroring a
//! realistic nested request payload.

use std::any::Any;
use std::collections::BTreeMap;
use std::rc::Rc;

use bodymap::{
    BodyRef, BodyTarget, Context, FieldSpec, PopulateError, PopulateHooks, Populator, RequestBody,
    TargetRef, TypeTag, Value,
};
use chrono::{DateTime, Utc};

use super::target_ref;

/// A request body backed by a value map. A field present in `values` is
/// initialized; anything else is uninitialized and skipped by the mapper.
pub struct ValueBody {
    type_name: &'static str,
    field_names: &'static [&'static str],
    values: BTreeMap<String, Value>,
}

impl ValueBody {
    pub fn new(type_name: &'static str, field_names: &'static [&'static str]) -> Self {
        Self {
            type_name,
            field_names,
            values: BTreeMap::new(),
        }
    }

    #[must_use]
    pub fn with(mut self, field: &str, value: Value) -> Self {
        self.values.insert(field.to_string(), value);
        self
    }
}

impl RequestBody for ValueBody {
    fn body_type(&self) -> &'static str {
        self.type_name
    }

    fn field_names(&self) -> &'static [&'static str] {
        self.field_names
    }

    fn get(&self, field: &str) -> Option<Value> {
        self.values.get(field).cloned()
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

/// A populate target backed by a value map and an explicit field registry.
pub struct ValueTarget {
    type_name: &'static str,
    fields: &'static [FieldSpec],
    values: BTreeMap<String, Value>,
}

impl ValueTarget {
    pub fn new(type_name: &'static str, fields: &'static [FieldSpec]) -> Self {
        Self {
            type_name,
            fields,
            values: BTreeMap::new(),
        }
    }

    #[must_use]
    pub fn with(mut self, field: &str, value: Value) -> Self {
        self.values.insert(field.to_string(), value);
        self
    }
}

impl BodyTarget for ValueTarget {
    fn target_type(&self) -> &'static str {
        self.type_name
    }

    fn fields(&self) -> &'static [FieldSpec] {
        self.fields
    }

    fn get(&self, field: &str) -> Value {
        self.values.get(field).cloned().unwrap_or(Value::Null)
    }

    fn set(&mut self, field: &str, value: Value) {
        if value.is_null() {
            self.values.remove(field);
        } else {
            self.values.insert(field.to_string(), value);
        }
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}

/// Typed sample request body, the shape a JSON payload deserializes into.
#[derive(Default)]
pub struct SampleBody {
    pub name: Option<String>,
    pub age: Option<f64>,
    pub comment: Option<String>,
    pub nested: Option<Rc<SampleBody>>,
    pub children: Option<BTreeMap<String, Rc<SampleBody>>>,
    pub from_scalar: Option<String>,
    pub string_to_array: Option<String>,
    pub date: Option<bool>,
}

const SAMPLE_BODY_FIELDS: &[&str] = &[
    "name",
    "age",
    "comment",
    "nested",
    "children",
    "from_scalar",
    "string_to_array",
    "date",
];

impl RequestBody for SampleBody {
    fn body_type(&self) -> &'static str {
        "SampleBody"
    }

    fn field_names(&self) -> &'static [&'static str] {
        SAMPLE_BODY_FIELDS
    }

    fn get(&self, field: &str) -> Option<Value> {
        match field {
            "name" => self.name.clone().map(Value::from),
            "age" => self.age.map(Value::from),
            "comment" => self.comment.clone().map(Value::from),
            "nested" => self.nested.clone().map(|nested| {
                let body: BodyRef = nested;
                Value::Body(body)
            }),
            "children" => self.children.clone().map(|children| {
                let entries = children
                    .into_iter()
                    .map(|(key, child)| {
                        let body: BodyRef = child;
                        (key, Value::Body(body))
                    })
                    .collect();
                Value::Map(entries)
            }),
            "from_scalar" => self.from_scalar.clone().map(Value::from),
            "string_to_array" => self.string_to_array.clone().map(Value::from),
            "date" => self.date.map(Value::from),
            _ => None,
        }
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

/// Typed sample target, the entity/DTO side of the forward mapping.
pub struct SampleTarget {
    pub name: Option<String>,
    pub age: Option<f64>,
    pub comment: Option<String>,
    pub nested: Option<TargetRef>,
    pub from_scalar: Option<TargetRef>,
    pub children: BTreeMap<String, Value>,
    pub string_to_array: Option<Vec<String>>,
    pub date: Option<DateTime<Utc>>,
}

impl Default for SampleTarget {
    fn default() -> Self {
        Self {
            name: Some("default".to_string()),
            age: None,
            comment: None,
            nested: None,
            from_scalar: None,
            children: BTreeMap::new(),
            string_to_array: None,
            date: None,
        }
    }
}

pub static SAMPLE_TARGET_FIELDS: &[FieldSpec] = &[
    FieldSpec::new("name", &[TypeTag::String]),
    FieldSpec::new("age", &[TypeTag::Float]),
    FieldSpec::new("comment", &[TypeTag::String]),
    FieldSpec::new("nested", &[TypeTag::Target("SampleTarget")]),
    FieldSpec::new("from_scalar", &[TypeTag::Target("SampleTarget")]),
    FieldSpec::with_elem(
        "children",
        &[TypeTag::Map],
        &[TypeTag::Target("SampleTarget")],
    ),
    FieldSpec::new("string_to_array", &[TypeTag::List]),
    FieldSpec::new("date", &[TypeTag::DateTime]),
];

impl BodyTarget for SampleTarget {
    fn target_type(&self) -> &'static str {
        "SampleTarget"
    }

    fn fields(&self) -> &'static [FieldSpec] {
        SAMPLE_TARGET_FIELDS
    }

    fn get(&self, field: &str) -> Value {
        match field {
            "name" => Value::from(self.name.clone()),
            "age" => Value::from(self.age),
            "comment" => Value::from(self.comment.clone()),
            "nested" => self.nested.clone().map_or(Value::Null, Value::Target),
            "from_scalar" => self.from_scalar.clone().map_or(Value::Null, Value::Target),
            "children" => Value::Map(self.children.clone()),
            "string_to_array" => self.string_to_array.clone().map_or(Value::Null, |items| {
                Value::List(items.into_iter().map(Value::from).collect())
            }),
            "date" => Value::from(self.date),
            _ => Value::Null,
        }
    }

    fn set(&mut self, field: &str, value: Value) {
        match (field, value) {
            ("name", Value::String(s)) => self.name = Some(s),
            ("name", Value::Null) => self.name = None,
            ("age", value) => {
                self.age = match value {
                    Value::Null => None,
                    other => other.as_f64(),
                }
            }
            ("comment", Value::String(s)) => self.comment = Some(s),
            ("comment", Value::Null) => self.comment = None,
            ("nested", Value::Target(t)) => self.nested = Some(t),
            ("nested", Value::Null) => self.nested = None,
            ("from_scalar", Value::Target(t)) => self.from_scalar = Some(t),
            ("from_scalar", Value::Null) => self.from_scalar = None,
            ("children", Value::Map(entries)) => self.children = entries,
            ("string_to_array", Value::List(items)) => {
                self.string_to_array = Some(
                    items
                        .iter()
                        .filter_map(|item| item.as_str().map(str::to_string))
                        .collect(),
                );
            }
            ("string_to_array", Value::Null) => self.string_to_array = None,
            ("date", Value::DateTime(dt)) => self.date = Some(dt),
            ("date", Value::Null) => self.date = None,
            _ => {}
        }
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}

/// Hooks for the sample pair: constructs missing target children and
/// resolves scalars into fresh named targets (standing in for an entity
/// lookup).
pub struct SampleHooks;

impl PopulateHooks for SampleHooks {
    fn populate_child(
        &self,
        mapper: &Populator<'_>,
        _target: &TargetRef,
        _field: &str,
        child: &BodyRef,
        existing: Option<TargetRef>,
        _key: Option<&bodymap::CollectionKey>,
        ctx: Context<'_>,
    ) -> Result<TargetRef, PopulateError> {
        let child_target = existing.unwrap_or_else(|| target_ref(SampleTarget::default()));
        mapper.populate(child.as_ref(), &child_target, ctx)?;
        Ok(child_target)
    }

    fn target_from_scalar(
        &self,
        _mapper: &Populator<'_>,
        _target: &TargetRef,
        _field: &str,
        value: &Value,
        target_type: &'static str,
        _ctx: Context<'_>,
    ) -> Result<Option<TargetRef>, PopulateError> {
        if target_type != "SampleTarget" {
            return Ok(None);
        }
        Ok(value.stringify().map(|name| {
            target_ref(SampleTarget {
                name: Some(name),
                ..SampleTarget::default()
            })
        }))
    }
}

/// Downcast helper for asserting on populated sample targets.
pub fn as_sample(target: &TargetRef) -> std::cell::Ref<'_, SampleTarget> {
    std::cell::Ref::map(target.borrow(), |t| {
        t.as_any()
            .downcast_ref::<SampleTarget>()
            .expect("target should be a SampleTarget")
    })
}
