//! Merging modules into resolvable output.
//!
//! A [`Compiler`] folds any number of [`Module`]s into three outputs:
//!
//! 1. a factory per id ([`Factories`]),
//! 2. an extension chain per target id ([`Extensions`]),
//! 3. one ordered [`CallbackList`].
//!
//! The first two build a [`Container`]; the third runs against it.
//!
//! Registration rules, applied entry by entry in module order:
//!
//! - an anonymous entry gets the next synthetic id (`#anon-0`, `#anon-1`,
//!   ...), counted per compiler;
//! - an id registered a second time is layered: the new service is built
//!   with the earlier factory's value as its previous value;
//! - extensions and actions are appended to their target's chain, and
//!   callbacks to the callback list. Bound functions get the registering
//!   id appended to their dependencies, so they receive the registering
//!   service's own value last;
//! - a module's setups are registered after its entries under anonymous ids,
//!   each followed by a callback that resolves it. A setup's own callbacks,
//!   extensions and actions are compiled like any other entry's.
//!
//! Synthetic ids share the `#anon-` namespace with user ids. A named entry
//! such as `#anon-0` layers over the anonymous entry given that id, so
//! adding one logs a warning.

use crate::container::{Container, ContainerConfig, Extensions, Factories, Factory, Resolve};
use crate::error::Result;
use crate::func::Func;
use crate::id::ServiceId;
use crate::module::{EntryKey, IntoModules, Module};
use crate::service::Service;
use std::sync::Arc;

/// Prefix of the ids given to anonymous entries and setups.
pub const ANONYMOUS_PREFIX: &str = "#anon-";

// ─────────────────────────────────────────────────────────────────────────────
// CallbackList
// ─────────────────────────────────────────────────────────────────────────────

/// Post-build callbacks in collection order.
#[derive(Clone, Debug, Default)]
pub struct CallbackList {
    callbacks: Vec<Func>,
}

impl CallbackList {
    /// Creates an empty list.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a callback.
    pub fn add(&mut self, callback: Func) -> &mut Self {
        self.callbacks.push(callback);
        self
    }

    /// Returns the number of callbacks.
    #[must_use]
    pub fn len(&self) -> usize {
        self.callbacks.len()
    }

    /// Returns `true` if the list is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.callbacks.is_empty()
    }

    /// Returns the callbacks in order.
    pub fn iter(&self) -> impl Iterator<Item = &Func> {
        self.callbacks.iter()
    }

    /// Runs every callback against `resolver`, in order.
    ///
    /// # Errors
    ///
    /// Returns the first error. Remaining callbacks are skipped; side effects
    /// of those that already ran are kept.
    pub fn call(&self, resolver: &dyn Resolve) -> Result<()> {
        tracing::debug!(callbacks = self.callbacks.len(), "running callbacks");
        for callback in &self.callbacks {
            callback.invoke(resolver, &[])?;
        }
        Ok(())
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Compiler
// ─────────────────────────────────────────────────────────────────────────────

/// Accumulates modules into factories, extensions and callbacks.
#[derive(Default)]
pub struct Compiler {
    factories: Factories,
    extensions: Extensions,
    callback: CallbackList,
    next_anonymous: usize,
}

impl Compiler {
    /// Creates an empty compiler.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a compiler and adds `modules`.
    #[must_use]
    pub fn with_modules(modules: impl IntoModules) -> Self {
        let mut compiler = Self::new();
        compiler.add_modules(modules);
        compiler
    }

    /// Adds every module in order.
    pub fn add_modules(&mut self, modules: impl IntoModules) -> &mut Self {
        for module in modules.into_modules() {
            self.add_module(module);
        }
        self
    }

    /// Adds one module.
    pub fn add_module(&mut self, module: Module) -> &mut Self {
        tracing::debug!(
            entries = module.len(),
            setups = module.setups().len(),
            "adding module"
        );

        let (entries, setups) = module.into_parts();
        for (key, service) in entries {
            let id = match key {
                EntryKey::Id(id) => {
                    if id.as_str().starts_with(ANONYMOUS_PREFIX) {
                        tracing::warn!(service = %id, "named entry uses the anonymous id prefix");
                    }
                    id
                }
                EntryKey::Anonymous => self.anonymous_id(),
            };
            self.add_service(id, service);
        }

        for setup in setups {
            let id = self.anonymous_id();
            let target = id.clone();
            self.callback
                .add(Func::raw(move |resolver, _| resolver.get(target.as_str())));
            self.add_service(id, setup);
        }
        self
    }

    /// Registers `service` under `id`, layering over an existing
    /// registration.
    pub fn add_service(&mut self, id: impl Into<ServiceId>, service: Service) -> &mut Self {
        let id = id.into();

        let layer = service.clone();
        let factory: Factory = match self.factories.remove(&id) {
            Some(previous) => {
                tracing::debug!(service = %id, "layering over existing registration");
                Arc::new(move |resolver: &dyn Resolve| {
                    let prev = previous(resolver)?;
                    layer.resolve(resolver, Some(prev))
                })
            }
            None => Arc::new(move |resolver: &dyn Resolve| layer.resolve(resolver, None)),
        };
        self.factories.insert(id.clone(), factory);

        for (target, extension) in service.extensions() {
            self.extensions
                .entry(target.clone())
                .or_default()
                .add_extension(extension.add_dep(&id));
        }
        for (target, action) in service.actions() {
            self.extensions
                .entry(target.clone())
                .or_default()
                .add_action(action.add_dep(&id));
        }
        for callback in service.callbacks() {
            self.callback.add(callback.add_dep(&id));
        }
        self
    }

    fn anonymous_id(&mut self) -> ServiceId {
        let id = ServiceId::from(format!("{ANONYMOUS_PREFIX}{}", self.next_anonymous));
        self.next_anonymous += 1;
        id
    }

    /// Returns the compiled factories.
    #[must_use]
    pub fn factories(&self) -> &Factories {
        &self.factories
    }

    /// Returns the compiled extension chains.
    #[must_use]
    pub fn extensions(&self) -> &Extensions {
        &self.extensions
    }

    /// Returns the collected callbacks.
    #[must_use]
    pub fn callback(&self) -> &CallbackList {
        &self.callback
    }

    /// Runs the collected callbacks against `resolver`.
    ///
    /// # Errors
    ///
    /// See [`CallbackList::call`].
    pub fn run_callback(&self, resolver: &dyn Resolve) -> Result<()> {
        self.callback.call(resolver)
    }

    /// Returns extension targets that have no factory, sorted.
    ///
    /// Their chains are kept but never run.
    #[must_use]
    pub fn orphaned_targets(&self) -> Vec<&ServiceId> {
        let mut orphans: Vec<_> = self
            .extensions
            .keys()
            .filter(|target| !self.factories.contains_key(*target))
            .collect();
        orphans.sort();
        orphans
    }

    /// Builds a container from the current factories and extensions.
    #[must_use]
    pub fn build_container(&self) -> Container {
        self.build_container_with(ContainerConfig::default())
    }

    /// Like [`build_container`](Self::build_container), with explicit
    /// configuration.
    #[must_use]
    pub fn build_container_with(&self, config: ContainerConfig) -> Container {
        for target in self.orphaned_targets() {
            tracing::warn!(service = %target, "extensions registered for unknown service");
        }
        tracing::debug!(
            services = self.factories.len(),
            extended = self.extensions.len(),
            "building container"
        );
        Container::new(self.factories.clone(), self.extensions.clone()).with_config(config)
    }

    /// Consumes the compiler, returning its three outputs.
    #[must_use]
    pub fn into_parts(self) -> (Factories, Extensions, CallbackList) {
        (self.factories, self.extensions, self.callback)
    }
}

impl core::fmt::Debug for Compiler {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        let mut ids: Vec<_> = self.factories.keys().collect();
        ids.sort();
        f.debug_struct("Compiler")
            .field("services", &ids)
            .field("extended", &self.extensions.len())
            .field("callbacks", &self.callback.len())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::deps;
    use crate::func::bind;
    use crate::service::helpers::{extend, factory, service, value};
    use crate::value::Value;
    use parking_lot::Mutex;

    #[test]
    fn anonymous_ids_are_sequential() {
        let mut compiler = Compiler::new();
        compiler
            .add_module(Module::new().with_anonymous(value(1)).with_anonymous(value(2)))
            .add_module(Module::new().with_anonymous(value(3)));

        let mut ids: Vec<_> = compiler.factories().keys().map(ServiceId::as_str).collect();
        ids.sort_unstable();
        assert_eq!(ids, ["#anon-0", "#anon-1", "#anon-2"]);
    }

    #[test]
    fn anonymous_ids_restart_per_compiler() {
        for _ in 0..2 {
            let compiler = Compiler::with_modules(Module::new().with_anonymous(value(())));
            assert!(compiler.factories().contains_key("#anon-0"));
        }
    }

    #[test]
    fn layering_feeds_previous_value() {
        let compiler = Compiler::with_modules(vec![
            Module::new().with("a", value(1_i32)),
            Module::new().with("a", factory(|prev: i32| prev + 1, deps![])),
            Module::new().with("a", factory(|prev: i32| prev * 10, deps![])),
        ]);

        let c = compiler.build_container();
        assert_eq!(c.get("a").unwrap().downcast_ref::<i32>(), Some(&20));
        assert_eq!(compiler.factories().len(), 1);
    }

    #[test]
    fn bound_functions_get_registering_id() {
        let compiler = Compiler::with_modules(
            Module::new()
                .with("t", value(0))
                .with("s", value(0).extends("t", |p: i32| p, deps!["d"]).then(|| (), deps![])),
        );

        let chain = &compiler.extensions()["t"];
        let deps: Vec<_> = chain.extensions()[0]
            .deps()
            .iter()
            .filter_map(|d| d.id().map(ServiceId::as_str))
            .collect();
        assert_eq!(deps, ["d", "s"]);

        let cb = compiler.callback().iter().next().unwrap();
        assert_eq!(cb.deps()[0].id().map(ServiceId::as_str), Some("s"));
    }

    #[test]
    fn raw_functions_are_not_bound() {
        let compiler = Compiler::with_modules(
            Module::new().with("s", value(0).with_action("t", Func::raw(|_, _| Ok(Value::unit())))),
        );
        assert!(compiler.extensions()["t"].actions()[0].deps().is_empty());
    }

    #[test]
    fn setup_runs_after_entry_callbacks() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let (from_callback, from_setup) = (Arc::clone(&log), Arc::clone(&log));

        let module = Module::new()
            .with(
                "s",
                value(()).then(move || from_callback.lock().push("callback"), deps![]),
            )
            .with_setup(service(move |_, _| {
                from_setup.lock().push("setup");
                Ok(Value::unit())
            }));

        let compiler = Compiler::with_modules(module);
        assert_eq!(compiler.callback().len(), 2);

        compiler.run_callback(&compiler.build_container()).unwrap();
        assert_eq!(*log.lock(), ["callback", "setup"]);
    }

    #[test]
    fn setups_are_registered_under_anonymous_ids() {
        let module = Module::new()
            .with_anonymous(value(0))
            .with_setup(value(()).then(|| (), deps![]));

        let compiler = Compiler::with_modules(module);
        assert!(compiler.factories().contains_key("#anon-1"));
        // resolve-the-setup, then the setup's own callback
        assert_eq!(compiler.callback().len(), 2);
        let own = compiler.callback().iter().nth(1).unwrap();
        assert_eq!(own.deps()[0].id().map(ServiceId::as_str), Some("#anon-1"));
    }

    #[test]
    fn named_entry_with_anonymous_prefix_layers() {
        let compiler = Compiler::with_modules(
            Module::new()
                .with_anonymous(value(1_i32))
                .with("#anon-0", factory(|prev: i32| prev + 1, deps![])),
        );

        assert_eq!(compiler.factories().len(), 1);
        let c = compiler.build_container();
        assert_eq!(c.get("#anon-0").unwrap().downcast_ref::<i32>(), Some(&2));
    }

    #[test]
    fn orphans_are_reported() {
        let compiler = Compiler::with_modules(
            Module::new()
                .with("x", value(0))
                .with_anonymous(extend("nobody", bind(|p: i32| p, deps![])))
                .with_anonymous(extend("x", bind(|p: i32| p, deps![]))),
        );

        let orphans: Vec<_> = compiler
            .orphaned_targets()
            .into_iter()
            .map(ServiceId::as_str)
            .collect();
        assert_eq!(orphans, ["nobody"]);

        let c = compiler.build_container();
        assert!(!c.has("nobody"));
    }

    #[test]
    fn callback_errors_stop_the_list() {
        let ran = Arc::new(Mutex::new(0));
        let counter = Arc::clone(&ran);
        let mut list = CallbackList::new();
        list.add(Func::raw(|_, _| Err(crate::Error::custom("first fails"))))
            .add(Func::raw(move |_, _| {
                *counter.lock() += 1;
                Ok(Value::unit())
            }));

        let compiler = Compiler::new();
        let err = list.call(&compiler.build_container()).unwrap_err();
        assert_eq!(err.to_string(), "first fails");
        assert_eq!(*ran.lock(), 0);
    }
}
