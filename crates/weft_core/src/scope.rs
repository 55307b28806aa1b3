//! Namespacing modules.
//!
//! [`scope`] mounts a module under a prefix: every entry id and every
//! dependency reference inside the module is rewritten, including the
//! dependencies of inline services, of extensions, actions and callbacks,
//! and of the module's setup. Extension and action targets are rewritten
//! too, so a scoped module extends its own services.
//!
//! A reference starting with [`ESCAPE_MARKER`] is not prefixed. The marker
//! is stripped and the reference points at the outer namespace, which is how
//! a scoped module reaches shared services.
//!
//! # Example
//!
//! ```
//! use weft_core::{deps, factory, scope, value, App, Module, Resolve, ResolveExt};
//!
//! let counter = Module::new()
//!     .with("start", value(10_i32))
//!     .with("next", factory(|s: i32, step: i32| s + step, deps!["start", "@step"]));
//!
//! let c = App::new()
//!     .add_module(Module::new().with("step", value(5_i32)))
//!     .add_module(scope("left/", &counter))
//!     .add_module(scope("right/", &counter))
//!     .run()
//!     .unwrap();
//!
//! assert_eq!(c.get_as::<i32>("left/next").unwrap(), 15);
//! assert!(c.has("right/start"));
//! assert!(!c.has("start"));
//! ```

use crate::dep::Dep;
use crate::func::Func;
use crate::id::ServiceId;
use crate::module::{EntryKey, Module};
use crate::service::Service;
use std::sync::Arc;

/// Leading character that exempts a reference from prefixing.
pub const ESCAPE_MARKER: char = '@';

/// Prefixes `id`, or strips the escape marker if it has one.
///
/// The empty reference is prefixed like any other, and a bare marker
/// unescapes to the empty id.
///
/// ```
/// use weft_core::prefix_id;
///
/// assert_eq!(prefix_id("m/", "db"), "m/db");
/// assert_eq!(prefix_id("m/", "@db"), "db");
/// assert_eq!(prefix_id("m/", "@@db"), "@db");
/// ```
#[must_use]
pub fn prefix_id(prefix: &str, id: &str) -> ServiceId {
    match id.strip_prefix(ESCAPE_MARKER) {
        Some(outer) => ServiceId::from(outer),
        None => ServiceId::from(format!("{prefix}{id}")),
    }
}

/// Structural rewriting of every id reference inside a value.
pub trait RewriteRefs {
    /// Returns a copy with every reference passed through `rewrite`.
    #[must_use]
    fn rewrite_refs(&self, rewrite: &dyn Fn(&ServiceId) -> ServiceId) -> Self;
}

impl RewriteRefs for Dep {
    fn rewrite_refs(&self, rewrite: &dyn Fn(&ServiceId) -> ServiceId) -> Self {
        match self {
            Self::Id(id) => Self::Id(rewrite(id)),
            Self::Inline(service) => Self::Inline(service.rewrite_refs(rewrite)),
        }
    }
}

impl RewriteRefs for Func {
    fn rewrite_refs(&self, rewrite: &dyn Fn(&ServiceId) -> ServiceId) -> Self {
        self.map_deps(|deps| rewrite_all(deps, rewrite))
    }
}

impl RewriteRefs for Service {
    fn rewrite_refs(&self, rewrite: &dyn Fn(&ServiceId) -> ServiceId) -> Self {
        let attached = |list: &[(ServiceId, Func)]| {
            list.iter()
                .map(|(target, func)| (rewrite(target), func.rewrite_refs(rewrite)))
                .collect::<Vec<_>>()
        };

        Self {
            build: Arc::clone(&self.build),
            deps: Arc::new(rewrite_all(&self.deps, rewrite)),
            extensions: Arc::new(attached(self.extensions.as_slice())),
            actions: Arc::new(attached(self.actions.as_slice())),
            callbacks: Arc::new(
                self.callbacks
                    .iter()
                    .map(|f| f.rewrite_refs(rewrite))
                    .collect(),
            ),
        }
    }
}

impl RewriteRefs for Module {
    fn rewrite_refs(&self, rewrite: &dyn Fn(&ServiceId) -> ServiceId) -> Self {
        let entries = self
            .entries
            .iter()
            .map(|(key, service)| {
                let key = match key {
                    EntryKey::Id(id) => EntryKey::Id(rewrite(id)),
                    EntryKey::Anonymous => EntryKey::Anonymous,
                };
                (key, service.rewrite_refs(rewrite))
            })
            .collect();

        Self {
            entries,
            setups: self.setups.iter().map(|s| s.rewrite_refs(rewrite)).collect(),
        }
    }
}

fn rewrite_all(deps: &[Dep], rewrite: &dyn Fn(&ServiceId) -> ServiceId) -> Vec<Dep> {
    deps.iter().map(|dep| dep.rewrite_refs(rewrite)).collect()
}

/// Prefixes every dependency reference inside `service`.
///
/// Covers the service's own deps, nested inline services, and the deps and
/// targets of its extensions, actions and callbacks.
#[must_use]
pub fn prefix_deps(prefix: &str, service: &Service) -> Service {
    service.rewrite_refs(&|id| prefix_id(prefix, id.as_str()))
}

/// Mounts `module` under `prefix`.
///
/// Anonymous entries keep no id and are never prefixed.
#[must_use]
pub fn scope(prefix: &str, module: &Module) -> Module {
    tracing::debug!(prefix, entries = module.len(), "scoping module");
    module.rewrite_refs(&|id| prefix_id(prefix, id.as_str()))
}

/// Mounts each named module under `name + delimiter`.
///
/// ```
/// use weft_core::{scope_assoc, value, Module};
///
/// let db = Module::new().with("url", value("postgres://"));
/// let scoped = scope_assoc("::", [("primary", db.clone()), ("replica", db)]);
///
/// let ids: Vec<_> = scoped.iter().flat_map(|m| m.ids()).map(|id| id.to_string()).collect();
/// assert_eq!(ids, ["primary::url", "replica::url"]);
/// ```
pub fn scope_assoc<N, I>(delimiter: &str, modules: I) -> Vec<Module>
where
    N: AsRef<str>,
    I: IntoIterator<Item = (N, Module)>,
{
    modules
        .into_iter()
        .map(|(name, module)| scope(&format!("{}{delimiter}", name.as_ref()), &module))
        .collect()
}
