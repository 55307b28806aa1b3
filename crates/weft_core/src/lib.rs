//! The resolution engine of Weft.
//!
//! `weft_core` turns independently written bundles of service definitions
//! into one lazily built object graph:
//!
//! - [`mod@value`] - Type-erased, shareable service values
//! - [`mod@service`] - Service definitions and helper constructors
//! - [`func`] - Extensions, actions and callbacks
//! - [`mod@module`] - Modules and module groups
//! - [`compiler`] - Merging modules into factories, extensions and callbacks
//! - [`container`] - Lazy, memoized, cycle-checked resolution
//! - [`mod@scope`] - Mounting modules under a namespace
//! - [`app`] - Compile, build and run in one call
//!
//! # Example
//!
//! ```
//! use weft_core::prelude::*;
//!
//! #[derive(Clone, Default)]
//! struct Mailer {
//!     sender: String,
//! }
//!
//! let mail = Module::new()
//!     .with("sender", value(String::from("noreply@example.com")))
//!     .with("mailer", factory(|sender: String| Mailer { sender }, deps!["sender"]));
//!
//! let container = App::new()
//!     .add_module(mail.clone())
//!     .add_module(scope("backup/", &mail))
//!     .run()
//!     .unwrap();
//!
//! let mailer = container.get("mailer").unwrap().downcast::<Mailer>().unwrap();
//! assert_eq!(mailer.sender, "noreply@example.com");
//! assert!(container.has("backup/mailer"));
//! ```

/// Bootstrapping a container from modules.
pub mod app;

/// Merging modules.
pub mod compiler;

/// Service resolution.
pub mod container;

/// Dependency references.
pub mod dep;

/// Error types.
pub mod error;

/// Extensions, actions and callbacks.
pub mod func;

/// Service identifiers.
pub mod id;

/// Modules and module groups.
pub mod module;

/// Namespacing modules.
pub mod scope;

/// Service definitions.
pub mod service;

/// Type-erased values.
pub mod value;

/// Test doubles.
#[cfg(any(test, feature = "test-utils"))]
pub mod testing;

pub use app::App;
pub use compiler::{ANONYMOUS_PREFIX, CallbackList, Compiler};
pub use container::{
    Container, ContainerConfig, ExtensionList, Extensions, Factories, Factory, Resolve, ResolveExt,
};
pub use dep::{Dep, resolve_deps};
pub use error::{BoxError, Error, Result};
pub use func::{BoundFn, Func, Handler, HandlerFn, RawFn, TryHandler, bind, try_bind};
pub use id::{ResolutionTrail, ServiceId};
pub use module::{EntryKey, IntoModules, Module, ModuleGroup, ModuleGroupBuilder, group};
pub use scope::{ESCAPE_MARKER, RewriteRefs, prefix_deps, prefix_id, scope, scope_assoc};
pub use service::helpers::{
    alias, callback, collect, env, extend, factory, instance, invoke, run, service, template,
    try_factory, value,
};
pub use service::{BuildFn, Service};
pub use value::{Callable, FromValue, ServiceValue, Value};

/// Re-export all common types for easy access.
pub mod prelude {
    pub use crate::deps;
    pub use crate::module::group;
    pub use crate::scope::{prefix_deps, scope, scope_assoc};
    pub use crate::service::helpers::*;
    pub use crate::{
        App, BoundFn, Callable, Compiler, Container, ContainerConfig, Dep, Error, Func, Module,
        ModuleGroup, ModuleGroupBuilder, Resolve, ResolveExt, Service, ServiceId, Value, bind,
        try_bind,
    };
}
