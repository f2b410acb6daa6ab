#![forbid(unsafe_code)]

//! JSON parsing for values handed over from JavaScript.
//!
//! The JS API stringifies its arguments with `JSON.stringify` and passes the
//! text through here, so every shape check runs natively and is unit-tested
//! without a browser.

use core::fmt;

use aero_core::{BreakpointTable, ConfigError, InstanceConfig};

/// A JS argument that could not be turned into an engine value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BridgeError {
    /// The instance config object was rejected.
    Config(ConfigError),
    /// The breakpoint table object was rejected.
    Table(String),
    /// The argument could not be stringified on the JS side.
    NotSerializable,
    /// No instance with the given id exists.
    UnknownInstance(u32),
    /// Every id representable on the JS side is taken.
    InstanceLimit,
}

impl fmt::Display for BridgeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Config(err) => write!(f, "{err}"),
            Self::Table(msg) => write!(f, "invalid breakpoint table: {msg}"),
            Self::NotSerializable => write!(f, "argument is not JSON-serializable"),
            Self::UnknownInstance(id) => write!(f, "no instance with id {id}"),
            Self::InstanceLimit => write!(f, "instance id space exhausted"),
        }
    }
}

impl std::error::Error for BridgeError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Config(err) => Some(err),
            _ => None,
        }
    }
}

impl From<ConfigError> for BridgeError {
    fn from(err: ConfigError) -> Self {
        Self::Config(err)
    }
}

/// Parse an instance config. A missing argument (`undefined` on the JS side,
/// which stringifies to nothing) means the class-mode default.
///
/// # Errors
///
/// [`BridgeError::Config`] when the object is not a valid config.
pub fn config_from_json(json: Option<&str>) -> Result<InstanceConfig, BridgeError> {
    match json.map(str::trim) {
        None | Some("" | "null") => Ok(InstanceConfig::default()),
        Some(text) => Ok(InstanceConfig::from_json(text)?),
    }
}

/// Parse a `{ name: minWidth, ... }` table, keeping key order for ties.
///
/// # Errors
///
/// [`BridgeError::Table`] for malformed JSON, non-integer widths, or a table
/// the engine rejects (no `0` entry, duplicate or empty names).
pub fn table_from_json(json: &str) -> Result<BreakpointTable, BridgeError> {
    serde_json::from_str(json).map_err(|err| BridgeError::Table(err.to_string()))
}
