#![forbid(unsafe_code)]

//! Construction-time errors.
//!
//! Runtime evaluation never fails: selector misses, unknown placement
//! methods and unconfigured breakpoints are reported as
//! [`SkipReason`](crate::SkipReason) values instead. Only building a
//! [`BreakpointTable`](crate::BreakpointTable) or an
//! [`InstanceConfig`](crate::InstanceConfig) can be rejected.

/// Rejected breakpoint table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TableError {
    /// The table has no entries at all.
    Empty,
    /// No entry has a minimum width of `0`, so some widths would not resolve.
    MissingCatchAll,
    /// An entry has an empty name.
    EmptyName,
    /// The same name appears twice.
    DuplicateName(String),
}

impl core::fmt::Display for TableError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::Empty => write!(f, "breakpoint table is empty"),
            Self::MissingCatchAll => {
                write!(f, "breakpoint table needs an entry with minimum width 0")
            }
            Self::EmptyName => write!(f, "breakpoint name must not be empty"),
            Self::DuplicateName(name) => write!(f, "duplicate breakpoint name: {name}"),
        }
    }
}

impl std::error::Error for TableError {}

/// Rejected instance configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// Reorder-mode requires an `element` selector.
    MissingElement,
    /// The `type` field names neither `reorder` nor `start`.
    UnknownType(String),
    /// A breakpoint entry is not a `[target, method]` pair of strings.
    MalformedAction(String),
    /// The input was not valid JSON for a config object.
    Json(String),
}

impl core::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::MissingElement => write!(f, "reorder config requires an `element` selector"),
            Self::UnknownType(kind) => write!(f, "unknown config type: {kind}"),
            Self::MalformedAction(name) => {
                write!(f, "breakpoint `{name}` must map to [target, method]")
            }
            Self::Json(msg) => write!(f, "invalid config json: {msg}"),
        }
    }
}

impl std::error::Error for ConfigError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn messages_name_the_offender() {
        assert_eq!(
            TableError::DuplicateName("md".into()).to_string(),
            "duplicate breakpoint name: md"
        );
        assert_eq!(
            ConfigError::MalformedAction("lg".into()).to_string(),
            "breakpoint `lg` must map to [target, method]"
        );
    }
}
