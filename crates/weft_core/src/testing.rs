//! Test doubles.

use crate::container::Resolve;
use crate::error::{Error, Result};
use crate::id::{ResolutionTrail, ServiceId};
use crate::value::Value;
use hashbrown::HashMap;

/// A fixed map of pre-built values implementing [`Resolve`].
///
/// Useful for exercising services and functions without compiling a module.
///
/// ```
/// use weft_core::testing::MapResolver;
/// use weft_core::{Resolve, Value};
///
/// let r = MapResolver::new().with("answer", Value::new(42));
/// assert!(r.has("answer"));
/// assert!(r.get("question").is_err());
/// ```
#[derive(Debug, Clone, Default)]
pub struct MapResolver {
    values: HashMap<ServiceId, Value>,
}

impl MapResolver {
    /// Creates an empty resolver.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a value under `id`.
    #[must_use]
    pub fn with(mut self, id: impl Into<ServiceId>, value: Value) -> Self {
        self.values.insert(id.into(), value);
        self
    }
}

impl Resolve for MapResolver {
    fn get(&self, id: &str) -> Result<Value> {
        self.values.get(id).cloned().ok_or_else(|| Error::NotFound {
            id: id.into(),
            trail: ResolutionTrail::new(vec![id.into()]),
        })
    }

    fn has(&self, id: &str) -> bool {
        self.values.contains_key(id)
    }
}
