//! Lazy, memoizing service resolution.
//!
//! A [`Container`] is built from the two maps a [`Compiler`](crate::Compiler)
//! produces: factories keyed by id, and extension chains keyed by target id.
//! Nothing is built up front. The first [`get`](Resolve::get) for an id runs
//! its factory, pipes the result through the id's extension chain and caches
//! the final value; every later `get` returns the cached handle.
//!
//! Factories resolve their own dependencies by calling back into the
//! container, so the graph is walked depth-first. Each container keeps a
//! stack of the ids currently being resolved. Requesting an id that is
//! already on the stack fails with
//! [`Error::CircularDependency`](crate::Error::CircularDependency) instead of
//! recursing forever.
//!
//! # Example
//!
//! ```
//! use weft_core::{deps, factory, value, Compiler, Module, Resolve, Value};
//!
//! let mut compiler = Compiler::new();
//! compiler.add_module(
//!     Module::new()
//!         .with("a", value(1_i32))
//!         .with("b", factory(|a: i32| a + 1, deps!["a"])),
//! );
//!
//! let container = compiler.build_container();
//! let b = container.get("b").unwrap();
//! assert_eq!(b.downcast_ref::<i32>(), Some(&2));
//! assert!(Value::ptr_eq(&b, &container.get("b").unwrap()));
//! ```
//!
//! # Threads
//!
//! `Container` is `Send + Sync`, but the resolution stack is shared by every
//! caller. Resolving from several threads at once can report spurious cycles;
//! callers that need that must serialize access themselves.

mod extension;

pub use extension::ExtensionList;

use crate::error::{Error, Result};
use crate::id::{ResolutionTrail, ServiceId};
use crate::value::{FromValue, Value};
use hashbrown::HashMap;
use parking_lot::Mutex;
use std::sync::Arc;

/// A builder of one service's raw value.
pub type Factory = Arc<dyn Fn(&dyn Resolve) -> Result<Value> + Send + Sync>;

/// Factories keyed by service id.
pub type Factories = HashMap<ServiceId, Factory>;

/// Extension chains keyed by target id.
pub type Extensions = HashMap<ServiceId, ExtensionList>;

// ─────────────────────────────────────────────────────────────────────────────
// Resolve
// ─────────────────────────────────────────────────────────────────────────────

/// The capability factories, extensions and callbacks are given.
///
/// [`Container`] is the engine's implementation; any type providing these
/// two operations can stand in for it.
pub trait Resolve {
    /// Returns the value registered under `id`.
    ///
    /// # Errors
    ///
    /// Fails if `id` is unknown, or if building it fails.
    fn get(&self, id: &str) -> Result<Value>;

    /// Returns `true` if a factory is registered under `id`.
    fn has(&self, id: &str) -> bool;
}

/// Typed access on top of [`Resolve`].
pub trait ResolveExt: Resolve {
    /// Resolves `id` and extracts it as a `T`.
    ///
    /// # Errors
    ///
    /// Fails like [`Resolve::get`], or with
    /// [`Error::TypeMismatch`] if the value is not a `T`.
    fn get_as<T: FromValue>(&self, id: &str) -> Result<T> {
        T::from_value(&self.get(id)?)
    }
}

impl<R: Resolve + ?Sized> ResolveExt for R {}

// ─────────────────────────────────────────────────────────────────────────────
// Configuration
// ─────────────────────────────────────────────────────────────────────────────

/// Tunables for a [`Container`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ContainerConfig {
    /// Maximum length of the resolution stack. `None` means unbounded.
    pub max_depth: Option<usize>,
}

impl ContainerConfig {
    /// Creates the default configuration (unbounded depth).
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Limits the resolution stack to `max_depth` nested ids.
    ///
    /// Deeper graphs fail with [`Error::DepthLimitExceeded`] rather than
    /// exhausting the native call stack.
    #[must_use]
    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = Some(max_depth);
        self
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Container
// ─────────────────────────────────────────────────────────────────────────────

/// A registry of factories with lazy, memoized, cycle-checked resolution.
pub struct Container {
    factories: Factories,
    extensions: Extensions,
    cache: Mutex<HashMap<ServiceId, Value>>,
    stack: Mutex<Vec<ServiceId>>,
    config: ContainerConfig,
}

impl Container {
    /// Creates a container from compiled factories and extension chains.
    #[must_use]
    pub fn new(factories: Factories, extensions: Extensions) -> Self {
        Self {
            factories,
            extensions,
            cache: Mutex::new(HashMap::new()),
            stack: Mutex::new(Vec::new()),
            config: ContainerConfig::default(),
        }
    }

    /// Replaces the container's configuration.
    #[must_use]
    pub fn with_config(mut self, config: ContainerConfig) -> Self {
        self.config = config;
        self
    }

    /// Returns the active configuration.
    #[must_use]
    pub fn config(&self) -> &ContainerConfig {
        &self.config
    }

    /// Returns `true` if `id` has been resolved at least once.
    #[must_use]
    pub fn is_cached(&self, id: &str) -> bool {
        self.cache.lock().contains_key(id)
    }

    /// Returns the number of registered factories.
    #[must_use]
    pub fn len(&self) -> usize {
        self.factories.len()
    }

    /// Returns `true` if no factories are registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.factories.is_empty()
    }

    /// Returns the registered ids in sorted order.
    #[must_use]
    pub fn ids(&self) -> Vec<&ServiceId> {
        let mut ids: Vec<_> = self.factories.keys().collect();
        ids.sort();
        ids
    }

    fn trail_with(&self, id: &ServiceId) -> ResolutionTrail {
        let mut ids = self.stack.lock().clone();
        ids.push(id.clone());
        ResolutionTrail::new(ids)
    }

    fn build(&self, id: &ServiceId, factory: &Factory) -> Result<Value> {
        let _guard = self.enter(id)?;

        tracing::debug!(service = %id, "building service");
        let raw = factory(self as &dyn Resolve)?;
        let value = match self.extensions.get(id) {
            Some(chain) => {
                tracing::debug!(
                    service = %id,
                    extensions = chain.extensions().len(),
                    actions = chain.actions().len(),
                    "applying extension chain"
                );
                chain.apply(self, raw)?
            }
            None => raw,
        };

        self.cache.lock().insert(id.clone(), value.clone());
        Ok(value)
    }

    fn enter(&self, id: &ServiceId) -> Result<StackGuard<'_>> {
        let mut stack = self.stack.lock();
        if let Some(max) = self.config.max_depth
            && stack.len() >= max
        {
            return Err(Error::DepthLimitExceeded {
                depth: stack.len() + 1,
                max,
            });
        }
        stack.push(id.clone());
        Ok(StackGuard { stack: &self.stack })
    }
}

impl Resolve for Container {
    fn get(&self, id: &str) -> Result<Value> {
        tracing::trace!(service = id, "get");

        let id = ServiceId::from(id);
        if self.stack.lock().contains(&id) {
            return Err(Error::CircularDependency(self.trail_with(&id)));
        }

        let Some(factory) = self.factories.get(&id) else {
            return Err(Error::NotFound {
                trail: self.trail_with(&id),
                id,
            });
        };

        if let Some(cached) = self.cache.lock().get(&id) {
            return Ok(cached.clone());
        }

        self.build(&id, factory)
    }

    fn has(&self, id: &str) -> bool {
        self.factories.contains_key(id)
    }
}

impl core::fmt::Debug for Container {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Container")
            .field("services", &self.ids())
            .field("cached", &self.cache.lock().len())
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

/// Pops the resolution stack when a build finishes, successfully or not.
struct StackGuard<'a> {
    stack: &'a Mutex<Vec<ServiceId>>,
}

impl Drop for StackGuard<'_> {
    fn drop(&mut self) {
        self.stack.lock().pop();
    }
}
