//! Request and response body mapping helpers for Axum + Sea-ORM APIs.
//!
//! Two symmetric engines form the core:
//!
//! - the **forward mapper** ([`populate()`]/[`Populator`]) copies a request
//!   body's declared fields onto a target entity/DTO, with type-directed
//!   conversion, collection reconciliation and strategy hooks for nested
//!   object construction and scalar lookups;
//! - the **reverse mapper** ([`response::create_response_from_source`])
//!   projects an entity graph into response bodies, sharing one response
//!   instance per (source, type) pair so cyclic graphs terminate.
//!
//! Field access goes through a static registry ([`FieldSpec`]) declared per
//! mappable type; there is no runtime reflection. [`pagination`], [`search`]
//! and [`models`] carry the listing helpers that usually sit next to the
//! mappers in an API handler.

pub mod errors;
pub mod field;
pub mod lookup;
pub mod models;
pub mod pagination;
pub mod populate;
pub mod response;
pub mod search;
pub mod value;

pub use errors::PopulateError;
pub use field::{FieldSpec, ResponseType, TypeTag, find_field};
pub use lookup::{EntityLookup, LookupHooks};
pub use models::ListParams;
pub use pagination::{PageMeta, Paginator, calculate_content_range};
pub use populate::{
    BodyRef, BodyTarget, Context, DefaultHooks, PopulateHooks, Populator, RequestBody, TargetRef,
    populate,
};
pub use response::{
    ProcessedSet, ResponseBody, ResponseRef, ResponseSource, SourceRef,
    create_response_from_source, response_to_json,
};
pub use search::SearchQuery;
pub use value::{CollectionKey, Value, same_body, same_response, same_target};
