//! # Weft Internal Library
//!
//! Re-exports the core Weft crates for convenience.

/// The resolution engine: values, services, modules, compiler and container.
pub use weft_core;

/// Ready-made infrastructure modules.
pub use weft_core_modules;

/// Re-export all common types for easy access.
pub mod prelude {
    pub use weft_core::prelude::*;
    pub use weft_core_modules::{DefaultModules, TracingFormat, TracingModule};
}
