//! Modules: ordered bundles of service definitions.
//!
//! A [`Module`] maps ids (or anonymous keys) to [`Service`]s in insertion
//! order, optionally followed by setup services that run once the
//! container is assembled.
//!
//! Two rules make modules composable:
//!
//! - anonymous entries get a unique id from the compiler, so they can carry
//!   extensions and callbacks without claiming a name;
//! - registering an id that already exists layers the new service on top of
//!   the old one instead of replacing it.
//!
//! # Example
//!
//! ```
//! use weft_core::{bind, deps, extend, value, App, Module, ResolveExt};
//!
//! let base = Module::new().with("port", value(8080_u16));
//! let tweaks = Module::new()
//!     .with_anonymous(extend("port", bind(|p: u16| p + 1, deps![])));
//!
//! let c = App::new().add_module(base).add_module(tweaks).run().unwrap();
//! assert_eq!(c.get_as::<u16>("port").unwrap(), 8081);
//! ```

mod group;

pub use group::{IntoModules, ModuleGroup, ModuleGroupBuilder};

use crate::id::ServiceId;
use crate::service::Service;
use core::fmt;

/// The key of a module entry.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum EntryKey {
    /// An addressable id.
    Id(ServiceId),
    /// No id; the compiler assigns one.
    Anonymous,
}

impl EntryKey {
    /// Returns the id, or `None` for anonymous entries.
    #[must_use]
    pub fn id(&self) -> Option<&ServiceId> {
        match self {
            Self::Id(id) => Some(id),
            Self::Anonymous => None,
        }
    }
}

impl fmt::Display for EntryKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Id(id) => f.write_str(id.as_str()),
            Self::Anonymous => f.write_str("<anonymous>"),
        }
    }
}

impl From<ServiceId> for EntryKey {
    fn from(id: ServiceId) -> Self {
        Self::Id(id)
    }
}

impl From<&str> for EntryKey {
    fn from(id: &str) -> Self {
        Self::Id(id.into())
    }
}

impl From<String> for EntryKey {
    fn from(id: String) -> Self {
        Self::Id(id.into())
    }
}

impl From<Option<ServiceId>> for EntryKey {
    fn from(id: Option<ServiceId>) -> Self {
        id.map_or(Self::Anonymous, Self::Id)
    }
}

/// An ordered bundle of services with optional trailing setups.
#[derive(Clone, Default)]
pub struct Module {
    pub(crate) entries: Vec<(EntryKey, Service)>,
    pub(crate) setups: Vec<Service>,
}

impl Module {
    /// Creates an empty module.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a service under `id`.
    ///
    /// Adding the same id twice keeps both entries; the second layers over
    /// the first when compiled.
    #[must_use]
    pub fn with(mut self, id: impl Into<ServiceId>, service: Service) -> Self {
        self.entries.push((EntryKey::Id(id.into()), service));
        self
    }

    /// Appends a service without an id.
    #[must_use]
    pub fn with_anonymous(mut self, service: Service) -> Self {
        self.entries.push((EntryKey::Anonymous, service));
        self
    }

    /// Appends an entry with an explicit key.
    #[must_use]
    pub fn with_entry(mut self, key: impl Into<EntryKey>, service: Service) -> Self {
        self.entries.push((key.into(), service));
        self
    }

    /// Sets the setup service, resolved once after the container is built.
    ///
    /// The setup is compiled like an anonymous entry, so its own callbacks,
    /// extensions and actions take effect too. Replaces any previous setup.
    #[must_use]
    pub fn with_setup(mut self, setup: Service) -> Self {
        self.setups = vec![setup];
        self
    }

    /// Returns the entries in insertion order.
    #[must_use]
    pub fn entries(&self) -> &[(EntryKey, Service)] {
        &self.entries
    }

    /// Returns the setup services in run order.
    ///
    /// A module built with [`with_setup`](Self::with_setup) has at most one;
    /// [`group`] collects those of its members.
    #[must_use]
    pub fn setups(&self) -> &[Service] {
        &self.setups
    }

    /// Returns the number of entries (setups are not counted).
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` if the module has no entries.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Returns the addressable ids in insertion order.
    pub fn ids(&self) -> impl Iterator<Item = &ServiceId> {
        self.entries.iter().filter_map(|(key, _)| key.id())
    }

    /// Splits the module into its entries and setups.
    #[must_use]
    pub fn into_parts(self) -> (Vec<(EntryKey, Service)>, Vec<Service>) {
        (self.entries, self.setups)
    }
}

impl<K: Into<EntryKey>> FromIterator<(K, Service)> for Module {
    fn from_iter<I: IntoIterator<Item = (K, Service)>>(iter: I) -> Self {
        Self {
            entries: iter.into_iter().map(|(k, s)| (k.into(), s)).collect(),
            setups: Vec::new(),
        }
    }
}

impl<K: Into<EntryKey>> Extend<(K, Service)> for Module {
    fn extend<I: IntoIterator<Item = (K, Service)>>(&mut self, iter: I) {
        self.entries
            .extend(iter.into_iter().map(|(k, s)| (k.into(), s)));
    }
}

impl IntoIterator for Module {
    type Item = (EntryKey, Service);
    type IntoIter = std::vec::IntoIter<(EntryKey, Service)>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.into_iter()
    }
}

impl fmt::Debug for Module {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Module")
            .field(
                "entries",
                &self.entries.iter().map(|(k, _)| k.to_string()).collect::<Vec<_>>(),
            )
            .field("setups", &self.setups.len())
            .finish()
    }
}

/// Concatenates modules into one.
///
/// Entries keep their order. The members' setups run in member order.
#[must_use]
pub fn group(modules: impl IntoIterator<Item = Module>) -> Module {
    let mut entries = Vec::new();
    let mut setups = Vec::new();
    for module in modules {
        entries.extend(module.entries);
        setups.extend(module.setups);
    }
    Module { entries, setups }
}
