//! Functions attached to services: extensions, actions and callbacks.
//!
//! A [`Func`] has two shapes that share one invocation contract
//! ([`Func::invoke`]):
//!
//! - [`Func::Raw`] receives the resolver and the positional arguments, and
//!   nothing else.
//! - [`Func::Bound`] carries its own dependency list. It receives the
//!   positional arguments followed by its resolved dependencies, and does not
//!   see the resolver. When a service attaches a bound function, the compiler
//!   appends the service's own id to that list.
//!
//! Bound functions are usually built from typed closures with [`bind`]:
//!
//! ```
//! use weft_core::{bind, deps, value, Compiler, Func, Module, Value};
//!
//! let add = bind(|prev: i32, step: i32| prev + step, deps!["step"]);
//! let container = Compiler::with_modules(Module::new().with("step", value(5_i32)))
//!     .build_container();
//!
//! let out = Func::from(add).invoke(&container, &[Value::new(1_i32)]).unwrap();
//! assert_eq!(out.downcast_ref::<i32>(), Some(&6));
//! ```

use crate::container::Resolve;
use crate::dep::{Dep, resolve_deps};
use crate::error::{Error, Result};
use crate::value::{FromValue, Value};
use core::any::Any;
use core::fmt;
use std::sync::Arc;
use variadics_please::all_tuples;

/// A function receiving the resolver and positional arguments.
pub type RawFn = Arc<dyn Fn(&dyn Resolve, &[Value]) -> Result<Value> + Send + Sync>;

/// The type-erased body of a [`BoundFn`].
pub type HandlerFn = Arc<dyn Fn(&[Value]) -> Result<Value> + Send + Sync>;

// ─────────────────────────────────────────────────────────────────────────────
// BoundFn
// ─────────────────────────────────────────────────────────────────────────────

/// A function with a declared dependency list.
#[derive(Clone)]
pub struct BoundFn {
    handler: HandlerFn,
    deps: Vec<Dep>,
}

impl BoundFn {
    /// Creates a bound function from an untyped handler.
    pub fn new<F>(handler: F, deps: Vec<Dep>) -> Self
    where
        F: Fn(&[Value]) -> Result<Value> + Send + Sync + 'static,
    {
        Self {
            handler: Arc::new(handler),
            deps,
        }
    }

    /// Returns the declared dependencies.
    #[must_use]
    pub fn deps(&self) -> &[Dep] {
        &self.deps
    }

    /// Appends a dependency.
    pub fn add_dep(&mut self, dep: impl Into<Dep>) {
        self.deps.push(dep.into());
    }

    /// Returns a copy with `deps` in place of the current list.
    #[must_use]
    pub fn with_deps(&self, deps: Vec<Dep>) -> Self {
        Self {
            handler: Arc::clone(&self.handler),
            deps,
        }
    }

    /// Calls the handler with `args` followed by the resolved dependencies.
    ///
    /// # Errors
    ///
    /// Propagates dependency resolution errors and the handler's own errors.
    pub fn invoke(&self, resolver: &dyn Resolve, args: &[Value]) -> Result<Value> {
        let mut all = Vec::with_capacity(args.len() + self.deps.len());
        all.extend_from_slice(args);
        all.extend(resolve_deps(resolver, &self.deps)?);
        (self.handler)(&all)
    }
}

impl fmt::Debug for BoundFn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BoundFn").field("deps", &self.deps).finish_non_exhaustive()
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Func
// ─────────────────────────────────────────────────────────────────────────────

/// An extension, action or callback.
#[derive(Clone)]
pub enum Func {
    /// Receives the resolver and positional arguments.
    Raw(RawFn),
    /// Receives positional arguments and its resolved dependencies.
    Bound(BoundFn),
}

impl Func {
    /// Creates a [`Func::Raw`] from a closure.
    ///
    /// # Example
    ///
    /// ```
    /// use weft_core::{value, Compiler, Func, Module};
    ///
    /// let f = Func::raw(|resolver, _args| resolver.get("name"));
    /// let container = Compiler::with_modules(Module::new().with("name", value("weft")))
    ///     .build_container();
    /// assert_eq!(f.invoke(&container, &[]).unwrap().downcast_ref::<&str>(), Some(&"weft"));
    /// ```
    pub fn raw<F>(f: F) -> Self
    where
        F: Fn(&dyn Resolve, &[Value]) -> Result<Value> + Send + Sync + 'static,
    {
        Self::Raw(Arc::new(f))
    }

    /// Returns the declared dependencies (always empty for raw functions).
    #[must_use]
    pub fn deps(&self) -> &[Dep] {
        match self {
            Self::Raw(_) => &[],
            Self::Bound(bound) => bound.deps(),
        }
    }

    /// Appends a dependency to a bound function. Raw functions are unchanged.
    #[must_use]
    pub fn add_dep(&self, dep: impl Into<Dep>) -> Self {
        match self {
            Self::Raw(_) => self.clone(),
            Self::Bound(bound) => {
                let mut bound = bound.clone();
                bound.add_dep(dep);
                Self::Bound(bound)
            }
        }
    }

    /// Returns a copy whose dependencies are rewritten by `f`.
    #[must_use]
    pub fn map_deps(&self, f: impl FnOnce(&[Dep]) -> Vec<Dep>) -> Self {
        match self {
            Self::Raw(_) => self.clone(),
            Self::Bound(bound) => Self::Bound(bound.with_deps(f(bound.deps()))),
        }
    }

    /// Invokes the function.
    ///
    /// # Errors
    ///
    /// Propagates dependency resolution errors and the function's own errors.
    pub fn invoke(&self, resolver: &dyn Resolve, args: &[Value]) -> Result<Value> {
        match self {
            Self::Raw(f) => f(resolver, args),
            Self::Bound(bound) => bound.invoke(resolver, args),
        }
    }
}

impl From<BoundFn> for Func {
    fn from(bound: BoundFn) -> Self {
        Self::Bound(bound)
    }
}

impl fmt::Debug for Func {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Raw(_) => f.write_str("Func::Raw"),
            Self::Bound(bound) => f.debug_tuple("Func::Bound").field(bound).finish(),
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Typed handlers
// ─────────────────────────────────────────────────────────────────────────────

/// A typed closure usable as the body of a bound function or factory.
///
/// Implemented for `Fn(A0, .., An) -> R` with up to eight arguments, where
/// every argument implements [`FromValue`]. Surplus positional values are
/// ignored; missing ones fail with [`Error::Logic`].
pub trait Handler<Args>: Send + Sync + 'static {
    /// Calls the closure with values extracted from `args`.
    ///
    /// # Errors
    ///
    /// Fails if an argument is missing or has the wrong type.
    fn call(&self, args: &[Value]) -> Result<Value>;
}

/// Like [`Handler`], for closures returning `Result<R, E>`.
pub trait TryHandler<Args>: Send + Sync + 'static {
    /// Calls the closure with values extracted from `args`.
    ///
    /// # Errors
    ///
    /// Fails if an argument is missing or has the wrong type, or if the
    /// closure itself returns an error.
    fn call(&self, args: &[Value]) -> Result<Value>;
}

fn missing_argument(expected: usize, given: usize) -> Error {
    Error::logic(format!(
        "handler expects {expected} argument(s) but only {given} were supplied"
    ))
}

macro_rules! count {
    () => { 0usize };
    ($head:ident $($tail:ident)*) => { 1usize + count!($($tail)*) };
}

macro_rules! impl_handler {
    ($($arg:ident),*) => {
        #[allow(
            non_snake_case,
            unused_mut,
            unused_variables,
            reason = "generated for every arity, including zero"
        )]
        impl<F, R, $($arg,)*> Handler<($($arg,)*)> for F
        where
            F: Fn($($arg),*) -> R + Send + Sync + 'static,
            R: Any + Send + Sync,
            $($arg: FromValue,)*
        {
            fn call(&self, args: &[Value]) -> Result<Value> {
                let expected = count!($($arg)*);
                let mut iter = args.iter();
                $(
                    let $arg = <$arg as FromValue>::from_value(
                        iter.next().ok_or_else(|| missing_argument(expected, args.len()))?,
                    )?;
                )*
                Ok(Value::new((self)($($arg),*)))
            }
        }

        #[allow(
            non_snake_case,
            unused_mut,
            unused_variables,
            reason = "generated for every arity, including zero"
        )]
        impl<F, R, E, $($arg,)*> TryHandler<($($arg,)*)> for F
        where
            F: Fn($($arg),*) -> core::result::Result<R, E> + Send + Sync + 'static,
            R: Any + Send + Sync,
            E: Into<Error>,
            $($arg: FromValue,)*
        {
            fn call(&self, args: &[Value]) -> Result<Value> {
                let expected = count!($($arg)*);
                let mut iter = args.iter();
                $(
                    let $arg = <$arg as FromValue>::from_value(
                        iter.next().ok_or_else(|| missing_argument(expected, args.len()))?,
                    )?;
                )*
                (self)($($arg),*).map(Value::new).map_err(Into::into)
            }
        }
    };
}

all_tuples!(impl_handler, 0, 8, A);

/// Binds a typed closure to a dependency list.
///
/// The closure receives the invocation's positional arguments first, then
/// the resolved dependencies.
pub fn bind<H, Args>(handler: H, deps: Vec<Dep>) -> BoundFn
where
    H: Handler<Args>,
{
    BoundFn::new(move |args| handler.call(args), deps)
}

/// Binds a fallible typed closure to a dependency list.
///
/// # Example
///
/// ```
/// use weft_core::{deps, try_bind, Compiler, Error, Func, Value};
///
/// let parse = try_bind(
///     |raw: String| raw.parse::<u16>().map_err(Error::custom),
///     deps![],
/// );
/// let resolver = Compiler::new().build_container();
///
/// let out = Func::from(parse.clone())
///     .invoke(&resolver, &[Value::new(String::from("8080"))])
///     .unwrap();
/// assert_eq!(out.downcast_ref::<u16>(), Some(&8080));
///
/// assert!(Func::from(parse).invoke(&resolver, &[Value::new(String::from("x"))]).is_err());
/// ```
pub fn try_bind<H, Args>(handler: H, deps: Vec<Dep>) -> BoundFn
where
    H: TryHandler<Args>,
{
    BoundFn::new(move |args| handler.call(args), deps)
}
