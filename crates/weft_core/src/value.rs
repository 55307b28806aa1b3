//! Type-erased service values.
//!
//! Everything a container hands out is a [`Value`]: a reference-counted,
//! shareable handle to some `Send + Sync` data. Cloning a [`Value`] never
//! clones the underlying data, so two `get` calls for a memoized id return
//! handles to the same allocation (see [`Value::ptr_eq`]).
//!
//! # Example
//!
//! ```
//! use weft_core::Value;
//!
//! let v = Value::new(42_i32);
//! assert!(v.is::<i32>());
//! assert_eq!(v.downcast_ref::<i32>(), Some(&42));
//!
//! let copy = v.clone();
//! assert!(Value::ptr_eq(&v, &copy));
//! ```

use crate::error::{Error, Result};
use crate::id::ServiceId;
use core::any::Any;
use core::fmt;
use downcast_rs::{DowncastSync, impl_downcast};
use std::sync::Arc;

/// Data that can be stored in a [`Value`].
///
/// Implemented for every `Any + Send + Sync` type.
pub trait ServiceValue: DowncastSync {
    /// Returns the name of the concrete type, for diagnostics.
    fn type_name(&self) -> &'static str {
        core::any::type_name::<Self>()
    }
}

impl<T: Any + Send + Sync> ServiceValue for T {}

impl_downcast!(sync ServiceValue);

/// A resolved, shareable service value.
#[derive(Clone)]
pub struct Value(Arc<dyn ServiceValue>);

impl Value {
    /// Wraps `value`.
    ///
    /// Passing a [`Value`] returns it unchanged instead of nesting it.
    #[must_use]
    pub fn new<T: Any + Send + Sync>(value: T) -> Self {
        let mut slot = Some(value);
        let any: &mut dyn Any = &mut slot;
        if let Some(inner) = any.downcast_mut::<Option<Value>>() {
            return inner.take().unwrap_or_else(Value::unit);
        }
        slot.map_or_else(Value::unit, |value| Self(Arc::new(value)))
    }

    /// Wraps an already shared value without re-allocating.
    #[must_use]
    pub fn from_arc<T: Any + Send + Sync>(value: Arc<T>) -> Self {
        Self(value)
    }

    /// The empty value returned by actions and callbacks.
    #[must_use]
    pub fn unit() -> Self {
        Self(Arc::new(()))
    }

    /// Returns `true` if this is the empty value.
    #[must_use]
    pub fn is_unit(&self) -> bool {
        self.is::<()>()
    }

    /// Returns `true` if the stored value is a `T`.
    #[must_use]
    pub fn is<T: Any + Send + Sync>(&self) -> bool {
        self.inner().is::<T>()
    }

    /// Borrows the stored value as a `T`.
    #[must_use]
    pub fn downcast_ref<T: Any + Send + Sync>(&self) -> Option<&T> {
        self.inner().downcast_ref::<T>()
    }

    /// Returns a shared handle to the stored `T`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::TypeMismatch`] if the value is not a `T`.
    pub fn downcast<T: Any + Send + Sync>(&self) -> Result<Arc<T>> {
        let found = self.type_name();
        Arc::clone(&self.0)
            .downcast_arc::<T>()
            .map_err(|_| Error::TypeMismatch {
                expected: core::any::type_name::<T>(),
                found,
            })
    }

    /// Returns the name of the stored type.
    #[must_use]
    pub fn type_name(&self) -> &'static str {
        self.inner().type_name()
    }

    /// Returns `true` if both handles point at the same allocation.
    #[must_use]
    pub fn ptr_eq(a: &Value, b: &Value) -> bool {
        Arc::ptr_eq(&a.0, &b.0)
    }

    /// Returns the stored [`Callable`], if any.
    #[must_use]
    pub fn as_callable(&self) -> Option<&Callable> {
        self.downcast_ref::<Callable>()
    }

    /// Returns `true` if the value holds a [`Callable`].
    #[must_use]
    pub fn is_callable(&self) -> bool {
        self.is::<Callable>()
    }

    /// Renders common scalar and string types.
    ///
    /// Returns `None` for any other stored type.
    #[must_use]
    pub fn display(&self) -> Option<String> {
        macro_rules! render {
            ($($ty:ty),* $(,)?) => {
                $(
                    if let Some(v) = self.downcast_ref::<$ty>() {
                        return Some(v.to_string());
                    }
                )*
            };
        }

        render!(
            String,
            &'static str,
            Arc<str>,
            ServiceId,
            char,
            bool,
            i8,
            i16,
            i32,
            i64,
            i128,
            isize,
            u8,
            u16,
            u32,
            u64,
            u128,
            usize,
            f32,
            f64,
        );
        None
    }

    fn inner(&self) -> &dyn ServiceValue {
        &*self.0
    }
}

impl Default for Value {
    fn default() -> Self {
        Self::unit()
    }
}

impl fmt::Debug for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.display() {
            Some(rendered) => write!(f, "Value({}: {rendered:?})", self.type_name()),
            None => write!(f, "Value({})", self.type_name()),
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Typed extraction
// ─────────────────────────────────────────────────────────────────────────────

/// Extracts a typed argument from a [`Value`].
///
/// Implemented for every `Clone` type: the stored value is cloned out. Taking
/// a [`Value`] yields the handle itself.
///
/// Extraction matches the stored type exactly. `Arc<T>` extracts a value that
/// was stored as an `Arc<T>` (e.g. `value(Arc::new(x))`). A value stored as a
/// `T`, including one wrapped with [`Value::from_arc`], extracts as `T`; take
/// a [`Value`] and call [`Value::downcast`] to share it without cloning.
pub trait FromValue: Sized {
    /// Performs the extraction.
    ///
    /// # Errors
    ///
    /// Returns [`Error::TypeMismatch`] if the value has the wrong type.
    fn from_value(value: &Value) -> Result<Self>;
}

impl<T: Any + Clone + Send + Sync> FromValue for T {
    fn from_value(value: &Value) -> Result<Self> {
        let any: &dyn Any = value;
        if let Some(handle) = any.downcast_ref::<T>() {
            return Ok(handle.clone());
        }
        value
            .downcast_ref::<T>()
            .cloned()
            .ok_or_else(|| Error::TypeMismatch {
                expected: core::any::type_name::<T>(),
                found: value.type_name(),
            })
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Callable
// ─────────────────────────────────────────────────────────────────────────────

type CallableFn = dyn Fn(&[Value]) -> Result<Value> + Send + Sync;

/// A function stored as a service value.
///
/// A service is "callable" when its resolved value holds a `Callable`.
///
/// # Example
///
/// ```
/// use weft_core::{Callable, Value};
///
/// let double = Callable::new(|args: &[Value]| {
///     let n = args[0].downcast_ref::<i32>().copied().unwrap_or_default();
///     Ok(Value::new(n * 2))
/// });
///
/// let out = double.call(&[Value::new(21)]).unwrap();
/// assert_eq!(out.downcast_ref::<i32>(), Some(&42));
/// ```
#[derive(Clone)]
pub struct Callable(Arc<CallableFn>);

impl Callable {
    /// Wraps a function.
    pub fn new<F>(f: F) -> Self
    where
        F: Fn(&[Value]) -> Result<Value> + Send + Sync + 'static,
    {
        Self(Arc::new(f))
    }

    /// Calls the function with positional arguments.
    ///
    /// # Errors
    ///
    /// Propagates whatever the function returns.
    pub fn call(&self, args: &[Value]) -> Result<Value> {
        (self.0)(args)
    }
}

impl fmt::Debug for Callable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Callable")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Clone, PartialEq)]
    struct Config {
        name: String,
    }

    #[test]
    fn new_does_not_nest_values() {
        let inner = Value::new(7_u8);
        let outer = Value::new(inner.clone());

        assert!(Value::ptr_eq(&inner, &outer));
        assert!(outer.is::<u8>());
    }

    #[test]
    fn downcast_checks_type() {
        let v = Value::new(Config {
            name: "main".to_owned(),
        });

        assert_eq!(v.downcast_ref::<Config>().map(|c| c.name.as_str()), Some("main"));
        assert!(v.downcast_ref::<String>().is_none());

        let err = v.downcast::<String>().unwrap_err();
        assert!(matches!(err, Error::TypeMismatch { .. }));
        assert!(err.to_string().contains("Config"));
    }

    #[test]
    fn downcast_shares_allocation() {
        let v = Value::new(String::from("shared"));
        let a = v.downcast::<String>().unwrap();
        let b = v.downcast::<String>().unwrap();
        assert!(Arc::ptr_eq(&a, &b));
    }

    #[test]
    fn type_name_reports_concrete_type() {
        assert_eq!(Value::new(1_i64).type_name(), "i64");
        assert!(Value::new(Config { name: String::new() })
            .type_name()
            .ends_with("Config"));
    }

    #[test]
    fn from_value_clones_out() {
        let v = Value::new(Config {
            name: "x".to_owned(),
        });
        let c = Config::from_value(&v).unwrap();
        assert_eq!(c.name, "x");

        assert!(i32::from_value(&v).is_err());
    }

    #[test]
    fn from_arc_shares_without_arc_extraction() {
        let shared = Arc::new(5_i32);
        let v = Value::from_arc(Arc::clone(&shared));

        assert_eq!(i32::from_value(&v).unwrap(), 5);
        assert!(matches!(
            <Arc<i32>>::from_value(&v),
            Err(Error::TypeMismatch { found: "i32", .. })
        ));
        assert!(Arc::ptr_eq(&v.downcast::<i32>().unwrap(), &shared));
    }

    #[test]
    fn stored_arcs_extract_as_arcs() {
        let shared = Arc::new(5_i32);
        let v = Value::new(Arc::clone(&shared));
        assert!(Arc::ptr_eq(&<Arc<i32>>::from_value(&v).unwrap(), &shared));
    }

    #[test]
    fn from_value_passes_values_through() {
        let v = Value::new(3_u32);
        let same = Value::from_value(&v).unwrap();
        assert!(Value::ptr_eq(&v, &same));
    }

    #[test]
    fn display_renders_scalars() {
        assert_eq!(Value::new("hi").display().as_deref(), Some("hi"));
        assert_eq!(Value::new(String::from("yo")).display().as_deref(), Some("yo"));
        assert_eq!(Value::new(2.5_f64).display().as_deref(), Some("2.5"));
        assert_eq!(Value::new(Config { name: String::new() }).display(), None);
    }

    #[test]
    fn unit_is_default() {
        assert!(Value::default().is_unit());
        assert!(!Value::new(0).is_unit());
    }

    #[test]
    fn callable_is_detected() {
        let f = Value::new(Callable::new(|_| Ok(Value::unit())));
        assert!(f.is_callable());
        assert!(f.as_callable().unwrap().call(&[]).unwrap().is_unit());
        assert!(!Value::new(1).is_callable());
    }
}
