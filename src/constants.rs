// -
// Debounce defaults

/// Quiet window used when no wait is supplied
pub const DEFAULT_WAIT_MS: i64 = 100;

/// Environment variable naming an extra configuration file
pub(crate) const CONFIG_PATH_ENV: &str = "CONFIG_PATH";

/// Prefix for environment overrides, e.g. `DEBOUNCE__WAIT_MS=250`
pub(crate) const ENV_PREFIX: &str = "DEBOUNCE";
