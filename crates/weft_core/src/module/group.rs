//! Named collections of modules.

use crate::module::Module;
use crate::scope::scope;

/// Types that can be added to an [`App`](crate::App) or
/// [`Compiler`](crate::Compiler) as a batch of modules.
///
/// Implemented for single modules, module lists and
/// [`ModuleGroupBuilder`]. Users typically don't implement this trait
/// directly.
pub trait IntoModules {
    /// Returns the modules in registration order.
    fn into_modules(self) -> Vec<Module>;
}

impl IntoModules for Module {
    fn into_modules(self) -> Vec<Module> {
        vec![self]
    }
}

impl IntoModules for Vec<Module> {
    fn into_modules(self) -> Vec<Module> {
        self
    }
}

impl<const N: usize> IntoModules for [Module; N] {
    fn into_modules(self) -> Vec<Module> {
        self.into()
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// ModuleGroup Trait
// ─────────────────────────────────────────────────────────────────────────────

/// A reusable bundle of named modules.
///
/// # Example
///
/// ```
/// use weft_core::{value, App, Module, ModuleGroup, ModuleGroupBuilder, Resolve};
///
/// struct Storage;
///
/// impl ModuleGroup for Storage {
///     fn build(self) -> ModuleGroupBuilder {
///         let bucket = Module::new().with("root", value("/tmp"));
///         ModuleGroupBuilder::new()
///             .add_scoped("cache", "/", bucket.clone())
///             .add_scoped("uploads", "/", bucket)
///     }
/// }
///
/// let c = App::new()
///     .add_modules(Storage.build().disable("uploads"))
///     .run()
///     .unwrap();
/// assert!(c.has("cache/root"));
/// assert!(!c.has("uploads/root"));
/// ```
pub trait ModuleGroup {
    /// Returns the modules in this group.
    fn build(self) -> ModuleGroupBuilder;
}

// ─────────────────────────────────────────────────────────────────────────────
// ModuleGroupBuilder
// ─────────────────────────────────────────────────────────────────────────────

/// One member of a [`ModuleGroupBuilder`].
#[derive(Debug, Clone)]
struct Member {
    name: String,
    prefix: Option<String>,
    module: Module,
}

impl Member {
    fn into_module(self) -> Module {
        match self.prefix {
            Some(prefix) => scope(&prefix, &self.module),
            None => self.module,
        }
    }
}

/// Builder for customizing module groups.
///
/// Members are identified by name, which is used for ordering and removal.
/// Members added with [`add_scoped`](Self::add_scoped) are mounted under
/// `name + delimiter`.
#[derive(Debug, Clone, Default)]
pub struct ModuleGroupBuilder {
    members: Vec<Member>,
}

impl ModuleGroupBuilder {
    /// Creates an empty builder.
    #[must_use]
    pub fn new() -> Self {
        Self {
            members: Vec::new(),
        }
    }

    /// Adds a module to the end of the group, unscoped.
    #[must_use]
    #[expect(
        clippy::should_implement_trait,
        reason = "This is a builder method, not std::ops::Add"
    )]
    pub fn add(mut self, name: impl Into<String>, module: Module) -> Self {
        self.members.push(Member {
            name: name.into(),
            prefix: None,
            module,
        });
        self
    }

    /// Adds a module to the end of the group, mounted under
    /// `name + delimiter`.
    #[must_use]
    pub fn add_scoped(mut self, name: impl Into<String>, delimiter: &str, module: Module) -> Self {
        let name = name.into();
        self.members.push(Member {
            prefix: Some(format!("{name}{delimiter}")),
            name,
            module,
        });
        self
    }

    /// Adds a module before the member named `target`.
    ///
    /// If `target` is not found, the module is added at the beginning.
    #[must_use]
    pub fn add_before(mut self, target: &str, name: impl Into<String>, module: Module) -> Self {
        let position = self.position(target).unwrap_or(0);
        self.members.insert(
            position,
            Member {
                name: name.into(),
                prefix: None,
                module,
            },
        );
        self
    }

    /// Adds a module after the member named `target`.
    ///
    /// If `target` is not found, the module is added at the end.
    #[must_use]
    pub fn add_after(mut self, target: &str, name: impl Into<String>, module: Module) -> Self {
        let position = self
            .position(target)
            .map_or(self.members.len(), |i| i + 1);
        self.members.insert(
            position,
            Member {
                name: name.into(),
                prefix: None,
                module,
            },
        );
        self
    }

    /// Removes every member named `name`.
    ///
    /// If no member matches, this is a no-op.
    #[must_use]
    pub fn disable(mut self, name: &str) -> Self {
        self.members.retain(|m| m.name != name);
        self
    }

    /// Returns the member names in order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.members.iter().map(|m| m.name.as_str())
    }

    /// Returns the number of members.
    #[must_use]
    pub fn len(&self) -> usize {
        self.members.len()
    }

    /// Returns true if the group has no members.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    fn position(&self, name: &str) -> Option<usize> {
        self.members.iter().position(|m| m.name == name)
    }
}

impl IntoModules for ModuleGroupBuilder {
    fn into_modules(self) -> Vec<Module> {
        self.members.into_iter().map(Member::into_module).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::id::ServiceId;
    use crate::service::helpers::value;

    fn module(id: &str) -> Module {
        Module::new().with(id, value(()))
    }

    fn ids(builder: ModuleGroupBuilder) -> Vec<String> {
        builder
            .into_modules()
            .iter()
            .flat_map(|m| m.ids().map(ServiceId::to_string).collect::<Vec<_>>())
            .collect()
    }

    #[test]
    fn add_keeps_order() {
        let builder = ModuleGroupBuilder::new().add("a", module("x")).add("b", module("y"));
        assert_eq!(builder.len(), 2);
        assert_eq!(builder.names().collect::<Vec<_>>(), ["a", "b"]);
    }

    #[test]
    fn add_scoped_prefixes_ids() {
        let builder = ModuleGroupBuilder::new()
            .add_scoped("one", "/", module("x"))
            .add_scoped("two", ".", module("x"))
            .add("plain", module("x"));

        assert_eq!(ids(builder), ["one/x", "two.x", "x"]);
    }

    #[test]
    fn add_before_and_after() {
        let builder = ModuleGroupBuilder::new()
            .add("a", module("a"))
            .add("b", module("b"))
            .add_before("b", "c", module("c"))
            .add_after("a", "d", module("d"));

        // Order: a, d, c, b
        assert_eq!(builder.names().collect::<Vec<_>>(), ["a", "d", "c", "b"]);
    }

    #[test]
    fn add_before_and_after_missing_target() {
        let builder = ModuleGroupBuilder::new()
            .add("a", module("a"))
            .add_before("zz", "first", module("f"))
            .add_after("zz", "last", module("l"));

        assert_eq!(builder.names().collect::<Vec<_>>(), ["first", "a", "last"]);
    }

    #[test]
    fn disable_removes_by_name() {
        let builder = ModuleGroupBuilder::new()
            .add("a", module("a"))
            .add("b", module("b"))
            .disable("a")
            .disable("missing");

        assert_eq!(builder.names().collect::<Vec<_>>(), ["b"]);
    }

    #[test]
    fn empty_group() {
        let builder = ModuleGroupBuilder::new();
        assert!(builder.is_empty());
        assert!(builder.into_modules().is_empty());
    }

    struct Pair;

    impl ModuleGroup for Pair {
        fn build(self) -> ModuleGroupBuilder {
            ModuleGroupBuilder::new().add("a", module("a")).add("b", module("b"))
        }
    }

    #[test]
    fn module_group_build() {
        assert_eq!(Pair.build().len(), 2);
    }
}
