//! Logging setup for vidjot.
//!
//! Installs a `tracing` subscriber covering the application and the HTTP
//! request spans emitted by `tower-http`.

use tracing::Level;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// How chatty the process is, as picked on the command line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Verbosity {
    /// `-q`: errors only.
    Quiet,
    /// No flag: startup, mutations and warnings.
    #[default]
    Normal,
    /// `-v`: adds rejected forms, session churn and schema steps.
    Verbose,
    /// `-vv` and up: everything, including per-request spans.
    Trace,
}

impl Verbosity {
    /// Map the `-q` flag and the `-v` count to a level. `-q` wins.
    #[must_use]
    pub fn from_flags(quiet: bool, verbose: u8) -> Self {
        match (quiet, verbose) {
            (true, _) => Self::Quiet,
            (false, 0) => Self::Normal,
            (false, 1) => Self::Verbose,
            (false, _) => Self::Trace,
        }
    }

    /// Level applied to vidjot's own events.
    #[must_use]
    pub fn level(self) -> Level {
        match self {
            Self::Quiet => Level::ERROR,
            Self::Normal => Level::INFO,
            Self::Verbose => Level::DEBUG,
            Self::Trace => Level::TRACE,
        }
    }
}

/// Default filter directives for a verbosity level.
///
/// Request tracing from `tower_http` follows the application level, except
/// at `Normal`, where per-request spans would drown out everything else.
#[must_use]
pub fn default_directives(verbosity: Verbosity) -> String {
    let app = verbosity.level();
    let http = match verbosity {
        Verbosity::Normal => Level::WARN,
        other => other.level(),
    };
    format!("vidjot={app},tower_http={http}")
}

/// Install the global subscriber.
///
/// `RUST_LOG`, when set, replaces the directives derived from `verbosity`.
/// A second call is a no-op.
///
/// ```no_run
/// use vidjot::{init_logging, logging::Verbosity};
///
/// init_logging(Verbosity::from_flags(false, 1));
/// ```
pub fn init_logging(verbosity: Verbosity) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_directives(verbosity)));

    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().compact().with_target(true))
        .try_init();
}

/// Warn-level logging captured by the test harness.
#[cfg(test)]
pub fn init_test_logging() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter("vidjot=warn")
        .with_test_writer()
        .try_init();
}
