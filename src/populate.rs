//! Forward mapper: populates a target object from a request body.
//!
//! [`Populator::populate`] walks the source body's declared fields and, for
//! every field the target also declares, converts and assigns the value.
//! Conversion is type-directed: each candidate tag of the target field's
//! declared union is tried in order and the first succeeding rule wins. When
//! no rule matches, the raw source value is assigned as-is.
//!
//! Customization happens through [`PopulateHooks`], an injected strategy
//! with three extension points: constructing/populating nested target
//! children, resolving scalars into target objects (e.g. identifier
//! lookups), and a post-assignment side-effect hook.
//!
//! The forward mapper performs **no cycle detection**: request bodies are
//! deserialized from JSON and therefore acyclic. Feeding it a cyclic body
//! graph recurses until the stack overflows.

use std::any::Any;
use std::cell::RefCell;
use std::collections::BTreeMap;
use std::rc::Rc;

use chrono::Utc;
use tracing::trace;

use crate::errors::PopulateError;
use crate::field::{FieldSpec, TypeTag, find_field};
use crate::value::{CollectionKey, Value};

/// Shared handle to a request body, used for nested body values.
pub type BodyRef = Rc<dyn RequestBody>;

/// Shared mutable handle to a populate target.
pub type TargetRef = Rc<RefCell<dyn BodyTarget>>;

/// Opaque caller-supplied context threaded through every recursive call.
/// The engine never inspects it; hooks downcast it as they see fit.
pub type Context<'a> = Option<&'a dyn Any>;

/// A request body: the source side of the forward mapper.
///
/// Implementors expose their declared fields in declaration order and a
/// per-field accessor that distinguishes "never set on the payload"
/// (`None`) from an explicit null (`Some(Value::Null)`).
pub trait RequestBody {
    /// Registered type name, used in error messages and logs.
    fn body_type(&self) -> &'static str;

    /// Declared field names in declaration order.
    fn field_names(&self) -> &'static [&'static str];

    /// Current value of a field. `None` means the field was not initialized
    /// on the incoming payload and must be skipped.
    fn get(&self, field: &str) -> Option<Value>;

    fn as_any(&self) -> &dyn Any;
}

/// A populatable target: the destination side of the forward mapper.
///
/// Any object advertising this capability can be constructed or populated
/// by the mapper; there are no structural constraints beyond the field
/// registry and accessors.
pub trait BodyTarget {
    /// Registered type name, matched against [`TypeTag::Target`] tags.
    fn target_type(&self) -> &'static str;

    /// Declared fields with their accepted types and nullability.
    fn fields(&self) -> &'static [FieldSpec];

    /// Current value of a field; `Value::Null` when unset.
    fn get(&self, field: &str) -> Value;

    /// Assigns a field. Implementors may ignore values whose shape does not
    /// fit the underlying storage.
    fn set(&mut self, field: &str, value: Value);

    fn as_any(&self) -> &dyn Any;
    fn as_any_mut(&mut self) -> &mut dyn Any;
}

/// Strategy hooks customizing the forward mapper.
///
/// The defaults implement the base behavior: nested bodies populate into an
/// existing target child and fail with [`PopulateError::UnhandledChild`]
/// when there is none, scalars never resolve to targets, and the
/// post-assignment hook is a no-op. Each method receives the running
/// [`Populator`] so overrides can recurse.
pub trait PopulateHooks {
    /// Converts a nested request body into a (possibly fresh) target child.
    ///
    /// `existing` is the target's current child at the field (or collection
    /// key), when it is target-capable. `key` is set for collection
    /// elements.
    fn populate_child(
        &self,
        mapper: &Populator<'_>,
        target: &TargetRef,
        field: &str,
        child: &BodyRef,
        existing: Option<TargetRef>,
        key: Option<&CollectionKey>,
        ctx: Context<'_>,
    ) -> Result<TargetRef, PopulateError> {
        let _ = (target, key);
        match existing {
            Some(child_target) => {
                mapper.populate(child.as_ref(), &child_target, ctx)?;
                Ok(child_target)
            }
            None => Err(PopulateError::unhandled_child(child.body_type(), field)),
        }
    }

    /// Resolves a scalar source value into a target object, e.g. by looking
    /// up an entity by identifier. `Ok(None)` means "not handled" and the
    /// conversion falls through.
    fn target_from_scalar(
        &self,
        mapper: &Populator<'_>,
        target: &TargetRef,
        field: &str,
        value: &Value,
        target_type: &'static str,
        ctx: Context<'_>,
    ) -> Result<Option<TargetRef>, PopulateError> {
        let _ = (mapper, target, field, value, target_type, ctx);
        Ok(None)
    }

    /// Side-effect extension point invoked after every assignment.
    fn after_set(&self, target: &TargetRef, field: &str, value: &Value, ctx: Context<'_>) {
        let _ = (target, field, value, ctx);
    }
}

/// The default strategy: no scalar resolution, no child construction.
pub struct DefaultHooks;

impl PopulateHooks for DefaultHooks {}

/// The forward mapping engine, parameterized by a hook strategy.
pub struct Populator<'h> {
    hooks: &'h dyn PopulateHooks,
}

impl Default for Populator<'static> {
    fn default() -> Self {
        Self::new()
    }
}

impl<'h> Populator<'h> {
    /// An engine with the default hooks.
    #[must_use]
    pub fn new() -> Populator<'static> {
        Populator {
            hooks: &DefaultHooks,
        }
    }

    /// An engine with a custom hook strategy.
    #[must_use]
    pub fn with_hooks(hooks: &'h dyn PopulateHooks) -> Self {
        Populator { hooks }
    }

    /// Populates `target` fields from same-named `source` fields.
    ///
    /// A field is written only when it is initialized and readable on the
    /// source and declared writable on the target. A null value is assigned
    /// only when the target field is nullable; otherwise the target keeps
    /// its prior value.
    ///
    /// # Errors
    ///
    /// Fails with [`PopulateError::UnhandledChild`] when a nested body has
    /// no existing target child and the hook strategy supplied no
    /// construction logic, or with whatever error a custom hook raises.
    pub fn populate(
        &self,
        source: &dyn RequestBody,
        target: &TargetRef,
        ctx: Context<'_>,
    ) -> Result<(), PopulateError> {
        for &name in source.field_names() {
            let Some(source_value) = source.get(name) else {
                trace!(field = name, "skipping uninitialized source field");
                continue;
            };
            let spec = {
                let borrowed = target.borrow();
                match find_field(borrowed.fields(), name) {
                    Some(spec) if spec.writable => *spec,
                    _ => {
                        trace!(field = name, "skipping field not writable on target");
                        continue;
                    }
                }
            };
            let current = target.borrow().get(name);

            let mut converted = None;
            for tag in spec.types {
                if let Some(value) =
                    self.convert_value(target, &spec, *tag, &source_value, &current, ctx)?
                {
                    converted = Some(value);
                    break;
                }
            }
            // No rule matched: intentional permissiveness, assign as-is.
            let value = converted.unwrap_or(source_value);

            if value.is_null() && !spec.nullable {
                trace!(field = name, "discarding null for non-nullable field");
                continue;
            }
            target.borrow_mut().set(name, value.clone());
            self.hooks.after_set(target, name, &value, ctx);
        }
        Ok(())
    }

    /// Applies the conversion rule chain for one candidate target type.
    /// `Ok(None)` means no rule matched for this tag.
    fn convert_value(
        &self,
        target: &TargetRef,
        spec: &FieldSpec,
        tag: TypeTag,
        source_value: &Value,
        current: &Value,
        ctx: Context<'_>,
    ) -> Result<Option<Value>, PopulateError> {
        match tag {
            TypeTag::Target(type_name) => {
                self.convert_to_target(target, spec, type_name, source_value, current, ctx)
            }
            TypeTag::List => match source_value {
                Value::List(items) => self
                    .reconcile_list(target, spec, items, current, ctx)
                    .map(Some),
                Value::String(text) => Ok(split_lines(text).map(Value::List)),
                _ => Ok(None),
            },
            TypeTag::Map => match source_value {
                Value::Map(entries) => self
                    .reconcile_map(target, spec, entries, current, ctx)
                    .map(Some),
                _ => Ok(None),
            },
            TypeTag::DateTime => Ok(bool_to_datetime(spec, source_value, current)),
            _ => Ok(None),
        }
    }

    /// Rules for target-capable declared types: scalar resolution via the
    /// hook, or nested-body child population.
    fn convert_to_target(
        &self,
        target: &TargetRef,
        spec: &FieldSpec,
        type_name: &'static str,
        source_value: &Value,
        current: &Value,
        ctx: Context<'_>,
    ) -> Result<Option<Value>, PopulateError> {
        if source_value.is_scalar() {
            if let Some(found) = self.hooks.target_from_scalar(
                self,
                target,
                spec.name,
                source_value,
                type_name,
                ctx,
            )? {
                return Ok(Some(Value::Target(found)));
            }
            return Ok(None);
        }
        if let Value::Body(child) = source_value {
            let existing = match current {
                Value::Target(child_target) => Some(child_target.clone()),
                Value::Null => None,
                _ => return Ok(None),
            };
            let populated =
                self.hooks
                    .populate_child(self, target, spec.name, child, existing, None, ctx)?;
            return Ok(Some(Value::Target(populated)));
        }
        Ok(None)
    }

    /// Keyed reconciliation for map-valued fields: upsert non-null results,
    /// remove keys whose converted value is null, leave other keys alone.
    fn reconcile_map(
        &self,
        target: &TargetRef,
        spec: &FieldSpec,
        entries: &BTreeMap<String, Value>,
        current: &Value,
        ctx: Context<'_>,
    ) -> Result<Value, PopulateError> {
        let mut container = match current {
            Value::Map(existing) => existing.clone(),
            _ => BTreeMap::new(),
        };
        for (key, item) in entries {
            let value = match item {
                Value::Body(child) => {
                    // An existing element of the wrong shape counts as absent.
                    let existing = container.get(key).and_then(|v| v.as_target().cloned());
                    let collection_key = CollectionKey::Key(key.clone());
                    Value::Target(self.hooks.populate_child(
                        self,
                        target,
                        spec.name,
                        child,
                        existing,
                        Some(&collection_key),
                        ctx,
                    )?)
                }
                other => other.clone(),
            };
            if value.is_null() {
                container.remove(key);
            } else {
                container.insert(key.clone(), value);
            }
        }
        Ok(Value::Map(container))
    }

    /// Positional reconciliation for list-valued fields, mirroring the
    /// keyed variant with indices as keys.
    fn reconcile_list(
        &self,
        target: &TargetRef,
        spec: &FieldSpec,
        items: &[Value],
        current: &Value,
        ctx: Context<'_>,
    ) -> Result<Value, PopulateError> {
        let mut container = match current {
            Value::List(existing) => existing.clone(),
            _ => Vec::new(),
        };
        let mut removals = Vec::new();
        for (index, item) in items.iter().enumerate() {
            let value = match item {
                Value::Body(child) => {
                    let existing = container.get(index).and_then(|v| v.as_target().cloned());
                    let collection_key = CollectionKey::Index(index);
                    Value::Target(self.hooks.populate_child(
                        self,
                        target,
                        spec.name,
                        child,
                        existing,
                        Some(&collection_key),
                        ctx,
                    )?)
                }
                other => other.clone(),
            };
            if !value.is_null() {
                if index < container.len() {
                    container[index] = value;
                } else {
                    container.push(value);
                }
            } else if index < container.len() {
                removals.push(index);
            }
        }
        for index in removals.into_iter().rev() {
            container.remove(index);
        }
        Ok(Value::List(container))
    }
}

/// Populates `target` from `source` with the default hooks.
///
/// # Errors
///
/// See [`Populator::populate`].
pub fn populate(
    source: &dyn RequestBody,
    target: &TargetRef,
    ctx: Context<'_>,
) -> Result<(), PopulateError> {
    Populator::new().populate(source, target, ctx)
}

/// Splits a string into trimmed, non-empty lines. An all-empty result is a
/// failed conversion and yields `None`.
fn split_lines(text: &str) -> Option<Vec<Value>> {
    let lines: Vec<Value> = text
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(Value::from)
        .collect();
    if lines.is_empty() { None } else { Some(lines) }
}

/// Boolean to date coercion: `true` stamps "now" onto an unset field,
/// `false` clears a set nullable field.
fn bool_to_datetime(spec: &FieldSpec, source_value: &Value, current: &Value) -> Option<Value> {
    match source_value {
        Value::Bool(true) if current.is_null() => Some(Value::DateTime(Utc::now())),
        Value::Bool(false) if !current.is_null() && spec.nullable => Some(Value::Null),
        _ => None,
    }
}
