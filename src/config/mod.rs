//! Configuration management for debouncers.
//!
//! Provides hierarchical configuration loading and validation with:
//! - Default values as code base
//! - Configuration file support
//! - Environment variable overrides
mod options;
pub use options::*;

use std::env;
use std::time::Duration;

use config::Config;
use config::Environment;
use config::File;
use serde::Deserialize;
use serde::Serialize;

use crate::constants::CONFIG_PATH_ENV;
use crate::constants::DEFAULT_WAIT_MS;
use crate::constants::ENV_PREFIX;
use crate::InvalidArgument;
use crate::Result;

/// Construction parameters for a debouncer
///
/// Merged from, in increasing priority:
/// 1. Default values from code implementation
/// 2. Configuration file specified by `CONFIG_PATH`
/// 3. Environment variables with the `DEBOUNCE__` prefix
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct DebounceConfig {
    /// Quiet window in milliseconds. Signed so that a negative value coming
    /// from a file or the environment can be rejected rather than wrapped.
    #[serde(default = "default_wait_ms")]
    pub wait_ms: i64,

    /// Either `{ immediate = bool }` or the rejected legacy boolean form
    #[serde(default)]
    pub options: OptionsArg,
}

impl Default for DebounceConfig {
    fn default() -> Self {
        Self {
            wait_ms: default_wait_ms(),
            options: OptionsArg::default(),
        }
    }
}

impl DebounceConfig {
    /// Loads configuration from hierarchical sources without validation.
    ///
    /// # Note
    /// Validation is deferred so further overrides can be applied via
    /// `with_override_config()`. Callers MUST call `validate()` before use.
    ///
    /// # Examples
    /// ```ignore
    /// std::env::set_var("DEBOUNCE__WAIT_MS", "250");
    /// let cfg = DebounceConfig::new()?.validate()?;
    /// ```
    pub fn new() -> Result<Self> {
        let mut builder = Config::builder();

        if let Ok(config_path) = env::var(CONFIG_PATH_ENV) {
            builder = builder.add_source(File::with_name(&config_path).required(true));
        }

        builder = builder.add_source(environment());

        let config: Self = builder.build()?.try_deserialize()?;
        Ok(config)
    }

    /// Applies additional configuration overrides from file without validation.
    ///
    /// Merging order (later sources override earlier):
    /// 1. Current configuration values
    /// 2. New configuration file
    /// 3. Latest environment variables
    pub fn with_override_config(
        &self,
        path: &str,
    ) -> Result<Self> {
        let config: Self = Config::builder()
            .add_source(Config::try_from(self)?)
            .add_source(File::with_name(path))
            .add_source(environment())
            .build()?
            .try_deserialize()?;
        Ok(config)
    }

    /// Validates configuration and returns validated instance.
    ///
    /// # Errors
    /// - `InvalidArgument::NegativeWait` for a negative `wait_ms`
    /// - `InvalidArgument::BooleanOptions` for the legacy `options = true|false`
    pub fn validate(self) -> Result<Self> {
        validate_wait_ms(self.wait_ms)?;
        self.options.resolve()?;
        Ok(self)
    }

    pub fn wait(&self) -> Result<Duration> {
        validate_wait_ms(self.wait_ms)
    }

    pub fn resolved_options(&self) -> Result<DebounceOptions> {
        self.options.resolve()
    }
}

/// Converts a signed millisecond count into a quiet window
pub(crate) fn validate_wait_ms(wait_ms: i64) -> Result<Duration> {
    if wait_ms < 0 {
        return Err(InvalidArgument::NegativeWait(wait_ms).into());
    }
    Ok(Duration::from_millis(wait_ms as u64))
}

fn environment() -> Environment {
    Environment::with_prefix(ENV_PREFIX)
        .separator("__")
        .ignore_empty(true)
        .try_parsing(true)
}

fn default_wait_ms() -> i64 {
    DEFAULT_WAIT_MS
}
