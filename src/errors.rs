//! Debouncer Error Hierarchy
//!
//! Construction-time argument failures, configuration loading failures and
//! invocation-time guard violations, all surfaced synchronously.

use config::ConfigError;

#[doc(hidden)]
pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Rejected construction arguments (missing callable, negative wait,
    /// legacy boolean options)
    #[error(transparent)]
    InvalidArgument(#[from] InvalidArgument),

    /// Configuration file or environment parsing failures
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// One shared debouncer driven by two distinct receivers of the same type
    #[error("Debounced method called with different contexts of the same blueprint `{blueprint}`")]
    ContextMismatch { blueprint: &'static str },

    /// A deferred caller's execution was discarded before it ran
    #[error("Debounced execution was cancelled before it ran")]
    Cancelled,
}

/// Whether an argument was of the wrong shape or out of range.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArgumentErrorKind {
    Type,
    Range,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum InvalidArgument {
    #[error("Expected a callable to debounce")]
    NotCallable,

    #[error("`wait` must not be negative, got {0}ms")]
    NegativeWait(i64),

    /// Legacy positional-boolean convention; callers must pass `{ immediate: bool }`
    #[error("The `options` argument must be an object, got boolean `{0}`")]
    BooleanOptions(bool),
}

impl InvalidArgument {
    pub fn kind(&self) -> ArgumentErrorKind {
        match self {
            InvalidArgument::NotCallable | InvalidArgument::BooleanOptions(_) => ArgumentErrorKind::Type,
            InvalidArgument::NegativeWait(_) => ArgumentErrorKind::Range,
        }
    }
}
