//! Dependency references.

use crate::container::Resolve;
use crate::error::Result;
use crate::id::ServiceId;
use crate::service::Service;
use crate::value::Value;

/// A dependency of a service or bound function.
///
/// Either the id of a registered service, or an inline [`Service`] that is
/// never registered and is built on demand every time it is resolved.
#[derive(Clone)]
pub enum Dep {
    /// A reference to a registered service.
    Id(ServiceId),
    /// An anonymous service definition.
    Inline(Service),
}

impl Dep {
    /// Resolves the dependency against `resolver`.
    ///
    /// # Errors
    ///
    /// Propagates any resolution or build error.
    pub fn resolve(&self, resolver: &dyn Resolve) -> Result<Value> {
        match self {
            Self::Id(id) => resolver.get(id.as_str()),
            Self::Inline(service) => service.resolve(resolver, None),
        }
    }

    /// Returns the referenced id, or `None` for inline services.
    #[must_use]
    pub fn id(&self) -> Option<&ServiceId> {
        match self {
            Self::Id(id) => Some(id),
            Self::Inline(_) => None,
        }
    }
}

impl core::fmt::Debug for Dep {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::Id(id) => f.debug_tuple("Id").field(id).finish(),
            Self::Inline(service) => f.debug_tuple("Inline").field(service).finish(),
        }
    }
}

impl From<ServiceId> for Dep {
    fn from(id: ServiceId) -> Self {
        Self::Id(id)
    }
}

impl From<&ServiceId> for Dep {
    fn from(id: &ServiceId) -> Self {
        Self::Id(id.clone())
    }
}

impl From<&str> for Dep {
    fn from(id: &str) -> Self {
        Self::Id(id.into())
    }
}

impl From<String> for Dep {
    fn from(id: String) -> Self {
        Self::Id(id.into())
    }
}

impl From<&String> for Dep {
    fn from(id: &String) -> Self {
        Self::Id(id.into())
    }
}

impl From<Service> for Dep {
    fn from(service: Service) -> Self {
        Self::Inline(service)
    }
}

/// Resolves a list of dependencies, strictly left to right.
///
/// Stops at the first error.
///
/// # Errors
///
/// Propagates the first resolution or build error.
pub fn resolve_deps(resolver: &dyn Resolve, deps: &[Dep]) -> Result<Vec<Value>> {
    deps.iter().map(|dep| dep.resolve(resolver)).collect()
}

/// Builds a `Vec<Dep>` from ids and inline services.
///
/// # Example
///
/// ```
/// use weft_core::{deps, value};
///
/// let list = deps!["db", "cache", value(3)];
/// assert_eq!(list.len(), 3);
/// assert!(list[2].id().is_none());
/// ```
#[macro_export]
macro_rules! deps {
    () => {
        ::std::vec::Vec::<$crate::Dep>::new()
    };
    ($($dep:expr),+ $(,)?) => {
        ::std::vec![$($crate::Dep::from($dep)),+]
    };
}
