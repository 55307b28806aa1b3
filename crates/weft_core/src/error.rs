//! Errors raised while compiling modules and resolving services.

use crate::id::{ResolutionTrail, ServiceId};

/// A boxed error returned by user code (factories, extensions, callbacks).
pub type BoxError = Box<dyn core::error::Error + Send + Sync + 'static>;

/// Convenience alias used throughout the crate.
pub type Result<T, E = Error> = core::result::Result<T, E>;

/// Errors that can occur during service resolution and callback execution.
///
/// Nothing in the engine catches, wraps or retries these: an error raised by
/// a factory, extension, action or callback reaches the caller of
/// [`Resolve::get`](crate::Resolve::get) or
/// [`CallbackList::call`](crate::CallbackList::call) as-is.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The requested id has no registered factory.
    #[error("service \"{id}\" not found (stack: {trail})")]
    NotFound {
        /// The id that was requested.
        id: ServiceId,
        /// The resolution stack at the time of the request, ending with `id`.
        trail: ResolutionTrail,
    },

    /// An id was requested while it was already being resolved.
    #[error("circular dependency detected: {0}")]
    CircularDependency(ResolutionTrail),

    /// Misuse detected at call time, e.g. invoking a non-callable service.
    #[error("{0}")]
    Logic(String),

    /// A resolved value did not have the type the caller asked for.
    #[error("type mismatch: expected `{expected}`, found `{found}`")]
    TypeMismatch {
        /// The requested type.
        expected: &'static str,
        /// The type actually stored.
        found: &'static str,
    },

    /// The resolution stack grew past the container's configured limit.
    #[error("resolution depth ({depth}) exceeds the configured maximum of {max}")]
    DepthLimitExceeded {
        /// The depth that would have been reached.
        depth: usize,
        /// The configured maximum.
        max: usize,
    },

    /// An error raised by user code.
    #[error(transparent)]
    Build(BoxError),
}

impl Error {
    /// Wraps any error (or message) raised by user code.
    ///
    /// # Example
    ///
    /// ```
    /// use weft_core::Error;
    ///
    /// let err = Error::custom("connection refused");
    /// assert_eq!(err.to_string(), "connection refused");
    /// ```
    pub fn custom(error: impl Into<BoxError>) -> Self {
        Self::Build(error.into())
    }

    /// Creates a [`Error::Logic`] error.
    pub fn logic(message: impl Into<String>) -> Self {
        Self::Logic(message.into())
    }

    /// Returns `true` for [`Error::NotFound`].
    #[must_use]
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }

    /// Returns `true` for [`Error::CircularDependency`].
    #[must_use]
    pub fn is_circular(&self) -> bool {
        matches!(self, Self::CircularDependency(_))
    }
}
