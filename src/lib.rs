//! Lazy, memoizing service resolution with composable modules.
//!
//! Weft assembles an application's object graph from independently written
//! modules. Each module maps ids to service definitions; modules can layer
//! over each other's services, extend them, observe them, and be mounted
//! under a namespace so the same module can be reused side by side.
//!
//! ```
//! use weft::prelude::*;
//!
//! let greeting = Module::new()
//!     .with("name", value(String::from("world")))
//!     .with("greeting", factory(|name: String| format!("hello, {name}"), deps!["name"]));
//!
//! let container = App::new()
//!     .add_module(greeting)
//!     .add_module(Module::new().with("name", factory(|prev: String| prev.to_uppercase(), deps![])))
//!     .run()
//!     .unwrap();
//!
//! assert_eq!(container.get_as::<String>("greeting").unwrap(), "hello, WORLD");
//! ```

pub use weft_internal::*;

/// Re-export all common types for easy access.
pub mod prelude {
    pub use weft_internal::prelude::*;
}
