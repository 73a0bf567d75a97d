#![forbid(unsafe_code)]

//! Unified error for applications embedding Waymark.
//!
//! Tour and hint operations report [`TourError`]; loading configuration
//! reports [`ConfigError`]. [`Error`] wraps both so an app can use one `?`
//! path, and [`Error::action`] says what the app should do about it.

use std::fmt;

use waymark_core::{Recovery, TourError};
use waymark_runtime::ConfigError;

/// Top-level error type for Waymark apps.
#[derive(Debug)]
pub enum Error {
    /// Tour sequencing or hint failure.
    Tour(TourError),
    /// Configuration could not be loaded or failed validation.
    Config(ConfigError),
}

/// Standard result type for Waymark APIs.
pub type Result<T> = std::result::Result<T, Error>;

/// What the embedding app should do when an error reaches it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppAction {
    /// The engine already recovered; at most log it.
    Ignore,
    /// Show the user that the tour could not run.
    Notify,
    /// Fall back to default options and carry on.
    UseDefaults,
    /// A bug in the calling code.
    Fix,
}

impl Error {
    #[must_use]
    pub fn action(&self) -> AppAction {
        match self {
            Self::Tour(err) => match err.recovery() {
                Recovery::SkipStep | Recovery::KeepState | Recovery::ProceedBestEffort => {
                    AppAction::Ignore
                }
                Recovery::StayIdle => AppAction::Notify,
                Recovery::CallerBug => AppAction::Fix,
            },
            Self::Config(_) => AppAction::UseDefaults,
        }
    }

    /// Error type label for metrics and tracing.
    #[must_use]
    pub fn error_type(&self) -> &'static str {
        match self {
            Self::Tour(err) => err.error_type(),
            Self::Config(ConfigError::Io(_)) => "config_io",
            Self::Config(ConfigError::Validation(_)) => "config_validation",
            #[allow(unreachable_patterns)]
            Self::Config(_) => "config_parse",
        }
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Tour(err) => write!(f, "{err}"),
            Self::Config(err) => write!(f, "config: {err}"),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Tour(err) => Some(err),
            Self::Config(err) => Some(err),
        }
    }
}

impl From<TourError> for Error {
    fn from(err: TourError) -> Self {
        Self::Tour(err)
    }
}

impl From<ConfigError> for Error {
    fn from(err: ConfigError) -> Self {
        Self::Config(err)
    }
}
