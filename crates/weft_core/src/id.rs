//! Service identifiers and resolution trails.

use core::borrow::Borrow;
use core::fmt;
use std::sync::Arc;

/// The name a service is registered and resolved under.
///
/// Cheap to clone (the string is reference-counted) and usable as a map key
/// that can be looked up with a plain `&str`.
///
/// # Example
///
/// ```
/// use weft_core::ServiceId;
///
/// let id = ServiceId::from("db/pool");
/// assert_eq!(id.as_str(), "db/pool");
/// assert_eq!(id, "db/pool");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ServiceId(Arc<str>);

impl ServiceId {
    /// Creates an identifier from any string-like value.
    #[must_use]
    pub fn new(id: impl AsRef<str>) -> Self {
        Self(Arc::from(id.as_ref()))
    }

    /// Returns the identifier as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Borrow<str> for ServiceId {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl AsRef<str> for ServiceId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ServiceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ServiceId {
    fn from(id: &str) -> Self {
        Self(Arc::from(id))
    }
}

impl From<String> for ServiceId {
    fn from(id: String) -> Self {
        Self(Arc::from(id))
    }
}

impl From<&String> for ServiceId {
    fn from(id: &String) -> Self {
        Self::new(id)
    }
}

impl From<&ServiceId> for ServiceId {
    fn from(id: &ServiceId) -> Self {
        id.clone()
    }
}

impl PartialEq<str> for ServiceId {
    fn eq(&self, other: &str) -> bool {
        &*self.0 == other
    }
}

impl PartialEq<&str> for ServiceId {
    fn eq(&self, other: &&str) -> bool {
        &*self.0 == *other
    }
}

/// The chain of service ids under active resolution, outermost first.
///
/// Carried by [`Error::NotFound`](crate::Error::NotFound) and
/// [`Error::CircularDependency`](crate::Error::CircularDependency), and
/// displayed as `a -> b -> a`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResolutionTrail(Vec<ServiceId>);

impl ResolutionTrail {
    /// Creates a trail from an ordered list of ids.
    #[must_use]
    pub fn new(ids: Vec<ServiceId>) -> Self {
        Self(ids)
    }

    /// Returns the ids in resolution order.
    #[must_use]
    pub fn ids(&self) -> &[ServiceId] {
        &self.0
    }

    /// Returns the id whose resolution triggered the error.
    #[must_use]
    pub fn last(&self) -> Option<&ServiceId> {
        self.0.last()
    }

    /// Returns the number of ids in the trail.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns `true` if the trail is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Display for ResolutionTrail {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, id) in self.0.iter().enumerate() {
            if i > 0 {
                f.write_str(" -> ")?;
            }
            f.write_str(id.as_str())?;
        }
        Ok(())
    }
}
