//! Ready-made infrastructure modules for Weft.
//!
//! - [`TracingModule`] - Logging and observability via the `tracing` crate
//! - [`DefaultModules`] - Bundle of every infrastructure module
//!
//! # Example
//!
//! ```
//! use weft_core::prelude::*;
//! use weft_core_modules::DefaultModules;
//!
//! let container = App::new()
//!     .add_modules(DefaultModules.build())
//!     .add_module(Module::new().with("answer", value(42_i32)))
//!     .run()
//!     .unwrap();
//!
//! assert!(container.has(weft_core_modules::CONFIG_ID));
//! ```

mod tracing_module;

pub use tracing_module::{CONFIG_ID, TracingConfig, TracingFormat, TracingModule};

use weft_core::{ModuleGroup, ModuleGroupBuilder};

/// Default modules for most Weft applications.
///
/// Includes:
/// - [`TracingModule`] (as `"tracing"`) - Logging and observability
///
/// # Customization
///
/// ```
/// use weft_core::prelude::*;
/// use weft_core_modules::DefaultModules;
///
/// let container = App::new()
///     .add_modules(DefaultModules.build().disable("tracing"))
///     .run()
///     .unwrap();
/// assert!(container.is_empty());
/// ```
pub struct DefaultModules;

impl ModuleGroup for DefaultModules {
    fn build(self) -> ModuleGroupBuilder {
        ModuleGroupBuilder::new().add("tracing", TracingModule::default().into_module())
    }
}
