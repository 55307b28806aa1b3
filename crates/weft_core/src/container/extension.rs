//! Per-id extension chains.

use crate::container::Resolve;
use crate::error::Result;
use crate::func::Func;
use crate::value::Value;

/// The extensions and actions registered against one target id.
///
/// Extensions run in registration order, each receiving the previous
/// extension's output. Actions run afterwards with the final value; their
/// results are discarded.
#[derive(Clone, Debug, Default)]
pub struct ExtensionList {
    extensions: Vec<Func>,
    actions: Vec<Func>,
}

impl ExtensionList {
    /// Creates an empty chain.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends an extension.
    pub fn add_extension(&mut self, extension: Func) -> &mut Self {
        self.extensions.push(extension);
        self
    }

    /// Appends an action.
    pub fn add_action(&mut self, action: Func) -> &mut Self {
        self.actions.push(action);
        self
    }

    /// Returns the extensions in registration order.
    #[must_use]
    pub fn extensions(&self) -> &[Func] {
        &self.extensions
    }

    /// Returns the actions in registration order.
    #[must_use]
    pub fn actions(&self) -> &[Func] {
        &self.actions
    }

    /// Returns `true` if neither extensions nor actions are registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.extensions.is_empty() && self.actions.is_empty()
    }

    /// Runs the chain over `value` and returns the extended value.
    ///
    /// # Errors
    ///
    /// Stops at and returns the first error raised by an extension or action.
    pub fn apply(&self, resolver: &dyn Resolve, value: Value) -> Result<Value> {
        let mut current = value;
        for extension in &self.extensions {
            current = extension.invoke(resolver, core::slice::from_ref(&current))?;
        }
        for action in &self.actions {
            action.invoke(resolver, core::slice::from_ref(&current))?;
        }
        Ok(current)
    }
}
