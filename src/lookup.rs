//! External entity lookup seam for the scalar-to-target conversion.
//!
//! When a request body carries a scalar (say, an identifier) for a field
//! whose declared type is target-capable, something has to resolve that
//! scalar into an existing object — typically a database or cache lookup.
//! The engine treats that call as an opaque synchronous lookup with no
//! timeout contract; callers own any timeout policy.

use crate::errors::PopulateError;
use crate::populate::{Context, PopulateHooks, Populator, TargetRef};
use crate::value::Value;

/// Resolves a scalar into an existing target-capable object.
pub trait EntityLookup {
    /// Finds an existing instance of `target_type` matching `scalar`, or
    /// `None` when there is no match. Lookup failures worth aborting the
    /// whole population should be reported via `Err`.
    fn find(
        &self,
        target_type: &'static str,
        scalar: &Value,
    ) -> Result<Option<TargetRef>, PopulateError>;
}

/// Hook strategy whose scalar-to-target conversion queries an
/// [`EntityLookup`]; everything else keeps the default behavior.
pub struct LookupHooks<'l> {
    lookup: &'l dyn EntityLookup,
}

impl<'l> LookupHooks<'l> {
    #[must_use]
    pub fn new(lookup: &'l dyn EntityLookup) -> Self {
        Self { lookup }
    }
}

impl PopulateHooks for LookupHooks<'_> {
    fn target_from_scalar(
        &self,
        _mapper: &Populator<'_>,
        _target: &TargetRef,
        field: &str,
        value: &Value,
        target_type: &'static str,
        _ctx: Context<'_>,
    ) -> Result<Option<TargetRef>, PopulateError> {
        let found = self.lookup.find(target_type, value)?;
        if found.is_none() {
            tracing::trace!(field, target_type, "entity lookup found no match");
        }
        Ok(found)
    }
}
