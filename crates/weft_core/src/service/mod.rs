//! Service definitions.
//!
//! A [`Service`] describes how to build one value: a build function, the
//! ordered dependencies it is fed with, and optional extensions, actions and
//! callbacks that it attaches to other ids. Services are plain data. Nothing
//! runs until a container resolves them.
//!
//! Every fluent method takes `&self` and returns a new `Service`; the
//! receiver is never changed. Unchanged fields are shared between the copies.
//!
//! # Example
//!
//! ```
//! use weft_core::{deps, factory, value, App, Module, ResolveExt};
//!
//! let module = Module::new()
//!     .with("greeting", value(String::from("hello")))
//!     .with(
//!         "shout",
//!         value(String::from("!"))
//!             // greeting = greeting + shout
//!             .extends("greeting", |prev: String, own: String| prev + &own, deps![]),
//!     );
//!
//! let container = App::new().add_module(module).run().unwrap();
//! assert_eq!(container.get_as::<String>("greeting").unwrap(), "hello!");
//! ```

pub mod helpers;

use crate::container::Resolve;
use crate::dep::{Dep, resolve_deps};
use crate::error::{Error, Result};
use crate::func::{BoundFn, Func, Handler, bind};
use crate::id::ServiceId;
use crate::value::Value;
use core::fmt;
use std::sync::Arc;

/// The build step of a [`Service`].
///
/// Receives the resolved dependencies, the resolver, and the value of the
/// layer registered earlier under the same id (if any).
pub type BuildFn =
    Arc<dyn Fn(&[Value], &dyn Resolve, Option<Value>) -> Result<Value> + Send + Sync>;

/// Functions keyed by target id, in attachment order.
pub(crate) type Attached = Vec<(ServiceId, Func)>;

/// A buildable unit with its dependencies and attached functions.
#[derive(Clone)]
pub struct Service {
    pub(crate) build: BuildFn,
    pub(crate) deps: Arc<Vec<Dep>>,
    pub(crate) extensions: Arc<Attached>,
    pub(crate) actions: Arc<Attached>,
    pub(crate) callbacks: Arc<Vec<Func>>,
}

impl Service {
    /// Creates a service from a build function and its dependencies.
    pub fn new<F>(build: F, deps: Vec<Dep>) -> Self
    where
        F: Fn(&[Value], &dyn Resolve, Option<Value>) -> Result<Value> + Send + Sync + 'static,
    {
        Self {
            build: Arc::new(build),
            deps: Arc::new(deps),
            extensions: Arc::default(),
            actions: Arc::default(),
            callbacks: Arc::default(),
        }
    }

    /// A service whose value is [`Value::unit`].
    ///
    /// Used as the carrier for extensions or callbacks that have no value of
    /// their own.
    #[must_use]
    pub fn noop() -> Self {
        Self::new(|_, _, _| Ok(Value::unit()), Vec::new())
    }

    /// Returns the declared dependencies.
    #[must_use]
    pub fn deps(&self) -> &[Dep] {
        &self.deps
    }

    /// Returns the attached extensions as `(target, function)` pairs.
    #[must_use]
    pub fn extensions(&self) -> &[(ServiceId, Func)] {
        &self.extensions
    }

    /// Returns the attached actions as `(target, function)` pairs.
    #[must_use]
    pub fn actions(&self) -> &[(ServiceId, Func)] {
        &self.actions
    }

    /// Returns the post-build callbacks in attachment order.
    #[must_use]
    pub fn callbacks(&self) -> &[Func] {
        &self.callbacks
    }

    /// Returns a copy with `deps` in place of the current dependencies.
    #[must_use]
    pub fn with_deps(&self, deps: Vec<Dep>) -> Self {
        Self {
            deps: Arc::new(deps),
            ..self.clone()
        }
    }

    /// Resolves the dependencies in order and runs the build function.
    ///
    /// # Errors
    ///
    /// Propagates dependency and build errors.
    pub fn resolve(&self, resolver: &dyn Resolve, previous: Option<Value>) -> Result<Value> {
        let deps = resolve_deps(resolver, &self.deps)?;
        (self.build)(&deps, resolver, previous)
    }

    // ─────────────────────────────────────────────────────────────────────
    // Callbacks
    // ─────────────────────────────────────────────────────────────────────

    /// Adds a post-build callback.
    ///
    /// Callbacks run once the whole container is assembled, in the order they
    /// were added. `handler` receives the resolved `deps` followed by this
    /// service's own value.
    #[must_use]
    pub fn then<H, Args>(&self, handler: H, deps: Vec<Dep>) -> Self
    where
        H: Handler<Args>,
    {
        self.with_callback(bind(handler, deps))
    }

    /// Adds a post-build callback given as a [`Func`].
    #[must_use]
    pub fn with_callback(&self, callback: impl Into<Func>) -> Self {
        let mut next = self.clone();
        Arc::make_mut(&mut next.callbacks).push(callback.into());
        next
    }

    /// Adds a callback that passes this service's value to the callable
    /// service `id`.
    ///
    /// The callback fails with [`Error::Logic`] if `id` does not resolve to a
    /// [`Callable`](crate::Callable).
    #[must_use]
    pub fn then_use(&self, id: impl Into<ServiceId>) -> Self {
        let target = id.into();
        let name = target.clone();
        let callback = BoundFn::new(
            move |args| {
                let callable = args.first().and_then(Value::as_callable).ok_or_else(|| {
                    Error::logic(format!(
                        "cannot use non-callable service \"{name}\" as a callback"
                    ))
                })?;
                callable.call(args.get(1..).unwrap_or_default())?;
                Ok(Value::unit())
            },
            vec![Dep::Id(target)],
        );
        self.with_callback(callback)
    }

    // ─────────────────────────────────────────────────────────────────────
    // Extensions and actions
    // ─────────────────────────────────────────────────────────────────────

    /// Registers an extension of `id`.
    ///
    /// When `id` is built, `handler` receives its current value, the resolved
    /// `deps`, and this service's own value, and returns `id`'s new value.
    /// A later call for the same target replaces the earlier one.
    #[must_use]
    pub fn extends<H, Args>(&self, id: impl Into<ServiceId>, handler: H, deps: Vec<Dep>) -> Self
    where
        H: Handler<Args>,
    {
        self.with_extension(id, bind(handler, deps))
    }

    /// Registers an extension given as a [`Func`].
    #[must_use]
    pub fn with_extension(&self, id: impl Into<ServiceId>, extension: impl Into<Func>) -> Self {
        let mut next = self.clone();
        attach(Arc::make_mut(&mut next.extensions), id.into(), extension.into());
        next
    }

    /// Registers a read-only observer of `id`.
    ///
    /// Runs after all of `id`'s extensions with the same arguments an
    /// extension would get. Its return value is discarded.
    #[must_use]
    pub fn on<H, Args>(&self, id: impl Into<ServiceId>, handler: H, deps: Vec<Dep>) -> Self
    where
        H: Handler<Args>,
    {
        self.with_action(id, bind(handler, deps))
    }

    /// Registers an action given as a [`Func`].
    #[must_use]
    pub fn with_action(&self, id: impl Into<ServiceId>, action: impl Into<Func>) -> Self {
        let mut next = self.clone();
        attach(Arc::make_mut(&mut next.actions), id.into(), action.into());
        next
    }
}

fn attach(list: &mut Attached, id: ServiceId, func: Func) {
    match list.iter_mut().find(|(target, _)| *target == id) {
        Some((_, existing)) => *existing = func,
        None => list.push((id, func)),
    }
}

impl fmt::Debug for Service {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let targets = |list: &Attached| list.iter().map(|(id, _)| id.clone()).collect::<Vec<_>>();
        f.debug_struct("Service")
            .field("deps", &self.deps)
            .field("extends", &targets(&self.extensions))
            .field("on", &targets(&self.actions))
            .field("callbacks", &self.callbacks.len())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::helpers::{callback, factory, value};
    use super::*;
    use crate::deps;
    use crate::testing::MapResolver;

    #[test]
    fn fluent_methods_leave_receiver_untouched() {
        let base = value(1_i32);
        let extended = base
            .then(|_: i32| (), deps![])
            .extends("x", |prev: i32| prev, deps![])
            .on("y", |_: i32| (), deps![]);

        assert!(base.callbacks().is_empty());
        assert!(base.extensions().is_empty());
        assert!(base.actions().is_empty());

        assert_eq!(extended.callbacks().len(), 1);
        assert_eq!(extended.extensions()[0].0, "x");
        assert_eq!(extended.actions()[0].0, "y");
    }

    #[test]
    fn unchanged_fields_are_shared() {
        let base = factory(|a: i32| a, deps!["a"]).extends("x", |p: i32| p, deps![]);
        let next = base.then(|| (), deps![]);

        assert!(Arc::ptr_eq(&base.deps, &next.deps));
        assert!(Arc::ptr_eq(&base.extensions, &next.extensions));
        assert!(!Arc::ptr_eq(&base.callbacks, &next.callbacks));
    }

    #[test]
    fn callbacks_accumulate_in_order() {
        let s = Service::noop()
            .then(|| 1_u8, deps![])
            .then(|| 2_u8, deps![])
            .then(|| 3_u8, deps![]);
        let resolver = MapResolver::new();

        let out: Vec<u8> = s
            .callbacks()
            .iter()
            .map(|f| *f.invoke(&resolver, &[]).unwrap().downcast_ref::<u8>().unwrap())
            .collect();
        assert_eq!(out, [1, 2, 3]);
    }

    #[test]
    fn extends_same_target_replaces() {
        let s = Service::noop()
            .extends("x", |p: i32| p + 1, deps![])
            .extends("x", |p: i32| p + 2, deps![]);
        let resolver = MapResolver::new();

        assert_eq!(s.extensions().len(), 1);
        let out = s.extensions()[0].1.invoke(&resolver, &[Value::new(0_i32)]).unwrap();
        assert_eq!(out.downcast_ref::<i32>(), Some(&2));
    }

    #[test]
    fn resolve_passes_previous_value() {
        let s = factory(|own: i32, prev: i32| own + prev, deps!["own"]);
        let resolver = MapResolver::new().with("own", Value::new(10_i32));

        let out = s.resolve(&resolver, Some(Value::new(5_i32))).unwrap();
        assert_eq!(out.downcast_ref::<i32>(), Some(&15));
    }

    #[test]
    fn then_use_calls_target_with_own_value() {
        let seen = Arc::new(parking_lot::Mutex::new(Vec::<String>::new()));
        let log = Arc::clone(&seen);
        let resolver = MapResolver::new()
            .with(
                "sink",
                callback(
                    move |item: String| {
                        log.lock().push(item);
                    },
                    deps![],
                )
                .resolve(&MapResolver::new(), None)
                .unwrap(),
            )
            .with("own", Value::new(String::from("payload")));

        let s = value(()).then_use("sink");
        // the compiler appends the registering id
        let cb = s.callbacks()[0].add_dep("own");
        cb.invoke(&resolver, &[]).unwrap();

        assert_eq!(*seen.lock(), ["payload"]);
    }

    #[test]
    fn then_use_rejects_non_callable() {
        let resolver = MapResolver::new()
            .with("sink", Value::new(3_i32))
            .with("own", Value::unit());
        let cb = Service::noop().then_use("sink").callbacks()[0].add_dep("own");

        let err = cb.invoke(&resolver, &[]).unwrap_err();
        assert!(matches!(err, Error::Logic(_)));
        assert_eq!(
            err.to_string(),
            "cannot use non-callable service \"sink\" as a callback"
        );
    }
}
