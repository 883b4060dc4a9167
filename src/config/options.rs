use serde::Deserialize;
use serde::Serialize;

use crate::InvalidArgument;
use crate::Result;

/// Policy flags recognised by a debouncer
#[derive(Debug, Serialize, Deserialize, Clone, Copy, Default, PartialEq, Eq)]
pub struct DebounceOptions {
    /// Fire at the start of a quiet window instead of the end
    #[serde(default)]
    pub immediate: bool,
}

impl DebounceOptions {
    pub fn immediate() -> Self {
        Self { immediate: true }
    }
}

/// The raw `options` argument as a caller (or a config file) supplied it.
///
/// A bare boolean is the legacy positional convention for `immediate`; it is
/// still representable so it can be rejected with a precise error instead of
/// being silently reinterpreted.
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(untagged)]
pub enum OptionsArg {
    Object(DebounceOptions),
    Boolean(bool),
}

impl OptionsArg {
    pub fn resolve(self) -> Result<DebounceOptions> {
        match self {
            OptionsArg::Object(options) => Ok(options),
            OptionsArg::Boolean(flag) => Err(InvalidArgument::BooleanOptions(flag).into()),
        }
    }
}

impl Default for OptionsArg {
    fn default() -> Self {
        OptionsArg::Object(DebounceOptions::default())
    }
}

impl From<DebounceOptions> for OptionsArg {
    fn from(options: DebounceOptions) -> Self {
        OptionsArg::Object(options)
    }
}

impl From<bool> for OptionsArg {
    fn from(flag: bool) -> Self {
        OptionsArg::Boolean(flag)
    }
}
