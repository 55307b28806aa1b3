//! Constructors for common kinds of services.
//!
//! ```
//! use weft_core::{alias, deps, factory, template, value, App, Module, ResolveExt};
//!
//! let module = Module::new()
//!     .with("name", value("weft"))
//!     .with("greeting", template("hello, {}", deps!["name"]))
//!     .with("len", factory(|s: String| s.len(), deps!["greeting"]))
//!     .with("size", alias("len"));
//!
//! let c = App::new().add_module(module).run().unwrap();
//! assert_eq!(c.get_as::<String>("greeting").unwrap(), "hello, weft");
//! assert_eq!(c.get_as::<usize>("size").unwrap(), 11);
//! ```

use crate::container::Resolve;
use crate::dep::Dep;
use crate::error::{Error, Result};
use crate::func::{Func, Handler, TryHandler};
use crate::id::ServiceId;
use crate::service::Service;
use crate::value::{Callable, Value};
use core::any::Any;
use std::sync::Arc;

/// A service that always yields the same value.
///
/// Every resolution returns a handle to one shared allocation.
pub fn value<T: Any + Send + Sync>(value: T) -> Service {
    let value = Value::new(value);
    Service::new(move |_, _, _| Ok(value.clone()), Vec::new())
}

/// A service built by a closure with direct access to the resolver.
///
/// The closure also receives the previous layer's value when the service is
/// layered over an earlier registration.
pub fn service<F>(build: F) -> Service
where
    F: Fn(&dyn Resolve, Option<Value>) -> Result<Value> + Send + Sync + 'static,
{
    Service::new(move |_, resolver, previous| build(resolver, previous), Vec::new())
}

/// A service that yields the value of another id.
pub fn alias(id: impl Into<ServiceId>) -> Service {
    let id = id.into();
    let name = id.clone();
    Service::new(
        move |deps, _, _| {
            deps.first()
                .cloned()
                .ok_or_else(|| Error::logic(format!("alias of \"{name}\" resolved no value")))
        },
        vec![Dep::Id(id)],
    )
}

/// A service built by a typed closure.
///
/// The closure receives the resolved `deps`, followed by the previous
/// layer's value when there is one.
///
/// ```
/// use weft_core::{deps, factory, value, App, Module, ResolveExt};
///
/// let c = App::new()
///     .add_module(Module::new().with("greeting", value(String::from("hi"))))
///     .add_module(Module::new().with("greeting", factory(|prev: String| prev + "!", deps![])))
///     .run()
///     .unwrap();
///
/// assert_eq!(c.get_as::<String>("greeting").unwrap(), "hi!");
/// ```
pub fn factory<H, Args>(handler: H, deps: Vec<Dep>) -> Service
where
    H: Handler<Args>,
{
    Service::new(
        move |deps, _, previous| handler.call(&with_previous(deps, previous)),
        deps,
    )
}

/// Like [`factory`], for closures returning a `Result`.
pub fn try_factory<H, Args>(handler: H, deps: Vec<Dep>) -> Service
where
    H: TryHandler<Args>,
{
    Service::new(
        move |deps, _, previous| handler.call(&with_previous(deps, previous)),
        deps,
    )
}

fn with_previous(deps: &[Value], previous: Option<Value>) -> Vec<Value> {
    let mut args = deps.to_vec();
    args.extend(previous);
    args
}

/// A service yielding a fresh `T::default()`.
pub fn instance<T: Default + Any + Send + Sync>() -> Service {
    Service::new(|_, _, _| Ok(Value::new(T::default())), Vec::new())
}

/// A service whose value is a [`Callable`].
///
/// Calling it with some arguments runs `handler` with those arguments
/// followed by the resolved `deps`.
pub fn callback<H, Args>(handler: H, deps: Vec<Dep>) -> Service
where
    H: Handler<Args>,
{
    let handler = Arc::new(handler);
    Service::new(
        move |deps, _, _| {
            let handler = Arc::clone(&handler);
            let bound = deps.to_vec();
            Ok(Value::new(Callable::new(move |args| {
                let mut all = Vec::with_capacity(args.len() + bound.len());
                all.extend_from_slice(args);
                all.extend_from_slice(&bound);
                Handler::call(&*handler, &all)
            })))
        },
        deps,
    )
}

/// A service yielding its resolved dependencies as a `Vec<Value>`.
pub fn collect(deps: Vec<Dep>) -> Service {
    Service::new(|deps, _, _| Ok(Value::new(deps.to_vec())), deps)
}

/// A service rendering a string template.
///
/// Each `{}` is replaced by the next resolved dependency. `{{` and `}}`
/// produce literal braces. Dependencies must hold strings, numbers, booleans
/// or chars.
pub fn template(template: impl Into<String>, deps: Vec<Dep>) -> Service {
    let template: String = template.into();
    Service::new(move |deps, _, _| render(&template, deps).map(Value::new), deps)
}

fn render(template: &str, values: &[Value]) -> Result<String> {
    let mut out = String::with_capacity(template.len());
    let mut values = values.iter();
    let mut chars = template.chars().peekable();

    while let Some(c) = chars.next() {
        let next = chars.peek().copied();
        match (c, next) {
            ('{', Some('{')) | ('}', Some('}')) => {
                chars.next();
                out.push(c);
            }
            ('{', Some('}')) => {
                chars.next();
                let value = values.next().ok_or_else(|| {
                    Error::logic(format!("template \"{template}\" has more placeholders than values"))
                })?;
                let rendered = value.display().ok_or_else(|| {
                    Error::logic(format!(
                        "template value of type `{}` cannot be displayed",
                        value.type_name()
                    ))
                })?;
                out.push_str(&rendered);
            }
            _ => out.push(c),
        }
    }
    Ok(out)
}

/// A service reading the environment variable `name`.
///
/// Resolution fails if the variable is unset or not valid unicode.
pub fn env(name: impl Into<String>) -> Service {
    let name: String = name.into();
    Service::new(
        move |_, _, _| {
            std::env::var(&name)
                .map(Value::new)
                .map_err(|e| Error::custom(format!("environment variable \"{name}\": {e}")))
        },
        Vec::new(),
    )
}

/// An anonymous carrier for one extension of `id`.
///
/// This attaches to `id` rather than replacing it. To override `id` with
/// access to its previous value (`fn(prev, ...deps)`), register a
/// [`factory`] under the same id instead; it is layered over the earlier
/// registration.
///
/// ```
/// use weft_core::{bind, deps, extend, factory, value, App, Module, ResolveExt};
///
/// let c = App::new()
///     .add_module(Module::new().with("n", value(1_i32)))
///     .add_module(Module::new().with_anonymous(extend("n", bind(|n: i32| n * 10, deps![]))))
///     .add_module(Module::new().with("n", factory(|prev: i32| prev + 1, deps![])))
///     .run()
///     .unwrap();
///
/// // layers build first, then the extension chain runs
/// assert_eq!(c.get_as::<i32>("n").unwrap(), 20);
/// ```
pub fn extend(id: impl Into<ServiceId>, extension: impl Into<Func>) -> Service {
    Service::noop().with_extension(id, extension)
}

/// An anonymous carrier for one post-build callback.
pub fn run(callback: impl Into<Func>) -> Service {
    Service::noop().with_callback(callback)
}

/// A service yielding the result of calling the callable service `id` with
/// the resolved `deps`.
pub fn invoke(id: impl Into<ServiceId>, deps: Vec<Dep>) -> Service {
    let id = id.into();
    let name = id.clone();
    let mut all = Vec::with_capacity(deps.len() + 1);
    all.push(Dep::Id(id));
    all.extend(deps);

    Service::new(
        move |deps, _, _| {
            let (target, args) = deps
                .split_first()
                .ok_or_else(|| Error::logic(format!("\"{name}\" resolved no value")))?;
            let callable = target.as_callable().ok_or_else(|| {
                Error::logic(format!("cannot invoke non-callable service \"{name}\""))
            })?;
            callable.call(args)
        },
        all,
    )
}
