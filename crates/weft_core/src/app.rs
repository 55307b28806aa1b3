//! Bootstrapping a container from modules.
//!
//! [`App`] is the smallest useful runner: it compiles the added modules,
//! builds a [`Container`] from the compiled factories and extensions, runs
//! the collected callbacks against it, and hands the container back.
//!
//! ```
//! use weft_core::{deps, factory, value, App, Module, ResolveExt};
//!
//! let container = App::new()
//!     .add_module(
//!         Module::new()
//!             .with("a", value(1_i32))
//!             .with("b", factory(|a: i32| a + 1, deps!["a"])),
//!     )
//!     .run()
//!     .unwrap();
//!
//! assert_eq!(container.get_as::<i32>("b").unwrap(), 2);
//! ```

use crate::compiler::Compiler;
use crate::container::{Container, ContainerConfig};
use crate::error::Result;
use crate::module::{IntoModules, Module};

/// Compiles modules, builds a container and runs its callbacks.
#[derive(Debug, Default)]
pub struct App {
    compiler: Compiler,
    config: ContainerConfig,
}

impl App {
    /// Creates an app with no modules.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the configuration of the container built by [`run`](Self::run).
    #[must_use]
    pub fn with_container_config(mut self, config: ContainerConfig) -> Self {
        self.config = config;
        self
    }

    /// Adds one module.
    #[must_use]
    pub fn add_module(mut self, module: Module) -> Self {
        self.compiler.add_module(module);
        self
    }

    /// Adds a batch of modules (a list, or a
    /// [`ModuleGroupBuilder`](crate::ModuleGroupBuilder)).
    #[must_use]
    pub fn add_modules(mut self, modules: impl IntoModules) -> Self {
        self.compiler.add_modules(modules);
        self
    }

    /// Returns the underlying compiler.
    #[must_use]
    pub fn compiler(&self) -> &Compiler {
        &self.compiler
    }

    /// Builds the container and runs every callback against it.
    ///
    /// # Errors
    ///
    /// Returns the first callback error. Callbacks that ran before it are not
    /// rolled back.
    pub fn run(self) -> Result<Container> {
        let container = self.compiler.build_container_with(self.config);
        self.compiler.run_callback(&container)?;
        tracing::debug!(services = container.len(), "app ready");
        Ok(container)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::container::Resolve;
    use crate::deps;
    use crate::service::helpers::{factory, value};
    use crate::Error;

    #[test]
    fn run_returns_container() {
        let c = App::new()
            .add_module(Module::new().with("a", value(1_i32)))
            .run()
            .unwrap();
        assert!(c.has("a"));
    }

    #[test]
    fn callbacks_run_before_returning() {
        let c = App::new()
            .add_module(Module::new().with("a", value(1_i32).then(|_: i32| (), deps![])))
            .run()
            .unwrap();
        assert!(c.is_cached("a"));
    }

    #[test]
    fn callback_errors_abort_run() {
        let result = App::new()
            .add_module(Module::new().with("a", value(0).then_use("missing")))
            .run();
        assert!(matches!(result, Err(Error::NotFound { .. })));
    }

    #[test]
    fn container_config_is_applied() {
        let c = App::new()
            .with_container_config(ContainerConfig::new().with_max_depth(1))
            .add_module(
                Module::new()
                    .with("a", value(1_i32))
                    .with("b", factory(|a: i32| a, deps!["a"])),
            )
            .run()
            .unwrap();

        assert_eq!(c.config().max_depth, Some(1));
        assert!(matches!(
            c.get("b"),
            Err(Error::DepthLimitExceeded { depth: 2, max: 1 })
        ));
    }
}
