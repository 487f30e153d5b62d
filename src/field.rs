//! Static field registry for mappable types.
//!
//! The host application describes each mappable type once, as an ordered
//! table of [`FieldSpec`] entries, instead of relying on runtime reflection.
//! A field may accept a union of types; the forward mapper tries the tags in
//! declaration order and the first conversion rule that succeeds wins.

use std::fmt;

use crate::response::ResponseRef;

/// Declared type of a field, or one member of a field's type union.
#[derive(Clone, Copy)]
pub enum TypeTag {
    Bool,
    Int,
    Float,
    String,
    DateTime,
    /// An ordered list container.
    List,
    /// A string-keyed container.
    Map,
    /// A target-capable object, identified by its registered type name.
    /// The forward mapper may construct or populate values of this type
    /// through the child-population and scalar-to-target hooks.
    Target(&'static str),
    /// A response body type the reverse mapper can construct for this field.
    Response(&'static ResponseType),
}

impl TypeTag {
    /// Registered type name for target-capable tags.
    #[must_use]
    pub fn target_type(&self) -> Option<&'static str> {
        match self {
            TypeTag::Target(name) => Some(name),
            _ => None,
        }
    }

    /// Response type descriptor for response-typed tags.
    #[must_use]
    pub fn response_type(&self) -> Option<&'static ResponseType> {
        match self {
            TypeTag::Response(rt) => Some(rt),
            _ => None,
        }
    }
}

impl PartialEq for TypeTag {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (TypeTag::Bool, TypeTag::Bool)
            | (TypeTag::Int, TypeTag::Int)
            | (TypeTag::Float, TypeTag::Float)
            | (TypeTag::String, TypeTag::String)
            | (TypeTag::DateTime, TypeTag::DateTime)
            | (TypeTag::List, TypeTag::List)
            | (TypeTag::Map, TypeTag::Map) => true,
            (TypeTag::Target(a), TypeTag::Target(b)) => a == b,
            (TypeTag::Response(a), TypeTag::Response(b)) => a.name == b.name,
            _ => false,
        }
    }
}

impl fmt::Debug for TypeTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TypeTag::Bool => write!(f, "Bool"),
            TypeTag::Int => write!(f, "Int"),
            TypeTag::Float => write!(f, "Float"),
            TypeTag::String => write!(f, "String"),
            TypeTag::DateTime => write!(f, "DateTime"),
            TypeTag::List => write!(f, "List"),
            TypeTag::Map => write!(f, "Map"),
            TypeTag::Target(name) => write!(f, "Target({name})"),
            TypeTag::Response(rt) => write!(f, "Response({})", rt.name),
        }
    }
}

/// A response body type the reverse mapper knows how to construct.
///
/// Declared as a `static` per response type so field registries can point at
/// it from [`TypeTag::Response`]; the constructor yields a fresh, empty
/// response instance.
pub struct ResponseType {
    pub name: &'static str,
    pub construct: fn() -> ResponseRef,
}

impl ResponseType {
    #[must_use]
    pub fn construct(&self) -> ResponseRef {
        (self.construct)()
    }
}

impl fmt::Debug for ResponseType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ResponseType").field("name", &self.name).finish()
    }
}

/// One declared field of a mappable type.
#[derive(Clone, Copy, Debug)]
pub struct FieldSpec {
    /// Field name; source and destination fields match by name.
    pub name: &'static str,
    /// Accepted types, in declaration order.
    pub types: &'static [TypeTag],
    /// Declared element types for container fields; empty otherwise.
    pub elem: &'static [TypeTag],
    /// Whether assigning null is allowed. A null conversion result is
    /// discarded when this is false and the field keeps its prior value.
    pub nullable: bool,
    /// Whether the mappers may write this field.
    pub writable: bool,
}

impl FieldSpec {
    /// A writable, nullable field.
    #[must_use]
    pub const fn new(name: &'static str, types: &'static [TypeTag]) -> Self {
        Self {
            name,
            types,
            elem: &[],
            nullable: true,
            writable: true,
        }
    }

    /// A writable, non-nullable field.
    #[must_use]
    pub const fn required(name: &'static str, types: &'static [TypeTag]) -> Self {
        Self {
            name,
            types,
            elem: &[],
            nullable: false,
            writable: true,
        }
    }

    /// A container field with declared element types.
    #[must_use]
    pub const fn with_elem(
        name: &'static str,
        types: &'static [TypeTag],
        elem: &'static [TypeTag],
    ) -> Self {
        Self {
            name,
            types,
            elem,
            nullable: true,
            writable: true,
        }
    }

    /// A read-only field; the mappers never assign it.
    #[must_use]
    pub const fn read_only(name: &'static str, types: &'static [TypeTag]) -> Self {
        Self {
            name,
            types,
            elem: &[],
            nullable: true,
            writable: false,
        }
    }
}

/// Looks up a field spec by name in a registry table. Unknown names yield
/// `None`; there is no catch-all fallback.
#[must_use]
pub fn find_field<'a>(fields: &'a [FieldSpec], name: &str) -> Option<&'a FieldSpec> {
    fields.iter().find(|spec| spec.name == name)
}
