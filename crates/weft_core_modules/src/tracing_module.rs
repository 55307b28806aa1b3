//! Tracing and observability module.
//!
//! Provides [`TracingModule`] which configures the `tracing` subscriber and
//! exposes its configuration as a service.
//!
//! # Lifecycle
//!
//! - The module registers a [`TracingConfig`] under [`CONFIG_ID`] so other
//!   services can read the intended configuration.
//! - Its setup runs once the container is built and installs the subscriber
//!   from whatever `tracing/config` resolves to at that point. A later module
//!   can layer over `tracing/config` to change the settings before anything
//!   is installed.
//!
//! # Example
//!
//! ```
//! use weft_core::prelude::*;
//! use weft_core_modules::{TracingConfig, TracingFormat, TracingModule, CONFIG_ID};
//! use tracing::Level;
//!
//! let container = App::new()
//!     .add_module(
//!         TracingModule::new()
//!             .with_level(Level::DEBUG)
//!             .with_format(TracingFormat::Compact)
//!             .into_module(),
//!     )
//!     .run()
//!     .unwrap();
//!
//! let config = container.get_as::<TracingConfig>(CONFIG_ID).unwrap();
//! assert_eq!(config.level, Level::DEBUG);
//! ```

use tracing::Level;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::fmt::format::FmtSpan;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use weft_core::{Module, deps, factory, value};

/// Id of the [`TracingConfig`] service.
pub const CONFIG_ID: &str = "tracing/config";

// ─────────────────────────────────────────────────────────────────────────────
// TracingFormat
// ─────────────────────────────────────────────────────────────────────────────

/// Tracing output format.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum TracingFormat {
    /// Human-readable colored output (default).
    #[default]
    Pretty,
    /// Compact single-line output.
    Compact,
    /// JSON structured output for log aggregation.
    Json,
}

// ─────────────────────────────────────────────────────────────────────────────
// TracingConfig
// ─────────────────────────────────────────────────────────────────────────────

/// Tracing configuration, registered as the `tracing/config` service.
///
/// Services can depend on it to adapt their own logging:
///
/// ```
/// use weft_core::prelude::*;
/// use weft_core_modules::{TracingConfig, TracingModule, CONFIG_ID};
/// use tracing::Level;
///
/// let verbose = Module::new().with(
///     "verbose",
///     factory(|config: TracingConfig| config.level >= Level::DEBUG, deps![CONFIG_ID]),
/// );
///
/// let container = App::new()
///     .add_module(TracingModule::new().into_module())
///     .add_module(verbose)
///     .run()
///     .unwrap();
/// assert!(!container.get_as::<bool>("verbose").unwrap());
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TracingConfig {
    /// Maximum log level, used when no filter is set or the filter is invalid.
    pub level: Level,
    /// Output format.
    pub format: TracingFormat,
    /// Target-specific filter directives (e.g. `"weft_core=debug,hyper=warn"`).
    pub env_filter: Option<String>,
    /// Whether span enter/exit events are logged.
    pub span_events: bool,
}

impl Default for TracingConfig {
    fn default() -> Self {
        Self {
            level: Level::INFO,
            format: TracingFormat::Pretty,
            env_filter: None,
            span_events: false,
        }
    }
}

impl TracingConfig {
    /// Builds the filter for this configuration.
    ///
    /// An unparsable `env_filter` falls back to `level`.
    #[must_use]
    pub fn filter(&self) -> EnvFilter {
        match &self.env_filter {
            Some(filter) => {
                EnvFilter::try_new(filter).unwrap_or_else(|_| EnvFilter::new(self.level.as_str()))
            }
            None => EnvFilter::new(self.level.as_str()),
        }
    }

    fn span_events(&self) -> FmtSpan {
        if self.span_events {
            FmtSpan::ENTER | FmtSpan::EXIT
        } else {
            FmtSpan::NONE
        }
    }

    /// Installs a global subscriber for this configuration.
    ///
    /// Does nothing if a global subscriber is already set.
    pub fn install(&self) {
        let filter = self.filter();
        let span_events = self.span_events();

        // try_init fails if a subscriber is already installed; keep that one.
        let installed = match self.format {
            TracingFormat::Pretty => tracing_subscriber::registry()
                .with(filter)
                .with(
                    tracing_subscriber::fmt::layer()
                        .pretty()
                        .with_span_events(span_events),
                )
                .try_init()
                .is_ok(),
            TracingFormat::Compact => tracing_subscriber::registry()
                .with(filter)
                .with(
                    tracing_subscriber::fmt::layer()
                        .compact()
                        .with_span_events(span_events),
                )
                .try_init()
                .is_ok(),
            TracingFormat::Json => tracing_subscriber::registry()
                .with(filter)
                .with(
                    tracing_subscriber::fmt::layer()
                        .json()
                        .with_span_events(span_events),
                )
                .try_init()
                .is_ok(),
        };

        tracing::info!(
            level = %self.level,
            format = ?self.format,
            installed,
            "tracing configured"
        );
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// TracingModule
// ─────────────────────────────────────────────────────────────────────────────

/// Logging module.
///
/// Configures the `tracing` subscriber via [`tracing_subscriber`].
///
/// # Services Provided
///
/// | Id | Value | Description |
/// |----|-------|-------------|
/// | `tracing/config` | [`TracingConfig`] | Tracing configuration |
///
/// # Configuration Options
///
/// ```
/// use weft_core_modules::{TracingFormat, TracingModule};
/// use tracing::Level;
///
/// // Development: pretty output with span events
/// let dev = TracingModule::new()
///     .with_level(Level::DEBUG)
///     .with_span_events(true);
///
/// // Production: JSON for log aggregation
/// let prod = TracingModule::new()
///     .with_format(TracingFormat::Json)
///     .with_env_filter("weft_core=info,my_app=debug");
/// ```
#[derive(Debug, Clone, Default)]
pub struct TracingModule {
    config: TracingConfig,
}

impl TracingModule {
    /// Creates a `TracingModule` with default settings.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the maximum log level.
    #[must_use]
    pub fn with_level(mut self, level: Level) -> Self {
        self.config.level = level;
        self
    }

    /// Sets the output format.
    #[must_use]
    pub fn with_format(mut self, format: TracingFormat) -> Self {
        self.config.format = format;
        self
    }

    /// Sets filter directives, in `target=level,target=level` form.
    #[must_use]
    pub fn with_env_filter(mut self, filter: impl Into<String>) -> Self {
        self.config.env_filter = Some(filter.into());
        self
    }

    /// Enables span enter/exit events in output.
    #[must_use]
    pub fn with_span_events(mut self, enabled: bool) -> Self {
        self.config.span_events = enabled;
        self
    }

    /// Returns the configuration the module will register.
    #[must_use]
    pub fn config(&self) -> &TracingConfig {
        &self.config
    }

    /// Converts the builder into a module.
    #[must_use]
    pub fn into_module(self) -> Module {
        Module::new()
            .with(CONFIG_ID, value(self.config))
            .with_setup(factory(|config: TracingConfig| config.install(), deps![CONFIG_ID]))
    }
}

impl From<TracingModule> for Module {
    fn from(module: TracingModule) -> Self {
        module.into_module()
    }
}
