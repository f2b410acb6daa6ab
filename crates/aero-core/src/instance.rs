#![forbid(unsafe_code)]

//! Instance configuration and per-instance state.
//!
//! An [`Instance`] is one configured reflow unit. It owns its breakpoint
//! table, its transition gate and its insertion watcher; nothing is shared
//! between instances.
//!
//! # Config shapes
//!
//! ```ignore
//! // class-mode: toggle a body class per breakpoint
//! {}
//! { "type": "start" }
//!
//! // reorder-mode: move `element` per breakpoint
//! {
//!   "element": ".element-to-move",
//!   "type": "reorder",
//!   "lg": [".region-container", "prependTo"],
//!   "md": ["#top > .content", "insertBefore"]
//! }
//! ```

use serde::Deserialize;
use serde_json::{Map, Value};

use crate::breakpoint::BreakpointTable;
use crate::error::ConfigError;
use crate::placement::{Placement, ReorderAction};
use crate::tracker::TransitionTracker;
use crate::watcher::DynamicElementWatcher;

/// Class-mode settings.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ClassConfig {
    root: Option<String>,
}

impl ClassConfig {
    #[must_use]
    pub const fn new() -> Self {
        Self { root: None }
    }

    /// Re-resolve whenever a node matching `selector` is inserted.
    #[must_use]
    pub fn with_root(mut self, selector: impl Into<String>) -> Self {
        self.root = Some(selector.into());
        self
    }

    #[must_use]
    pub fn root(&self) -> Option<&str> {
        self.root.as_deref()
    }
}

/// Reorder-mode settings: the element to move and one optional action per
/// breakpoint name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReorderConfig {
    element: String,
    actions: Vec<(String, ReorderAction)>,
}

impl ReorderConfig {
    #[must_use]
    pub fn new(element: impl Into<String>) -> Self {
        Self {
            element: element.into(),
            actions: Vec::new(),
        }
    }

    /// Move the element relative to `target` at `breakpoint` (builder pattern).
    #[must_use]
    pub fn at(
        self,
        breakpoint: impl AsRef<str>,
        target: impl Into<String>,
        placement: Placement,
    ) -> Self {
        self.with_action(breakpoint, ReorderAction::new(target, placement))
    }

    /// Set the action for `breakpoint`, replacing any earlier one.
    #[must_use]
    pub fn with_action(mut self, breakpoint: impl AsRef<str>, action: ReorderAction) -> Self {
        let name = breakpoint.as_ref();
        match self.actions.iter_mut().find(|(bp, _)| bp == name) {
            Some(slot) => slot.1 = action,
            None => self.actions.push((name.to_owned(), action)),
        }
        self
    }

    #[must_use]
    pub fn element(&self) -> &str {
        &self.element
    }

    /// Action configured for `breakpoint`, if any.
    #[must_use]
    pub fn action(&self, breakpoint: &str) -> Option<&ReorderAction> {
        self.actions
            .iter()
            .find(|(bp, _)| bp == breakpoint)
            .map(|(_, action)| action)
    }

    pub fn actions(&self) -> impl Iterator<Item = (&str, &ReorderAction)> {
        self.actions.iter().map(|(bp, action)| (bp.as_str(), action))
    }
}

/// Immutable description of one instance.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(try_from = "RawConfig")]
pub enum InstanceConfig {
    Class(ClassConfig),
    Reorder(ReorderConfig),
}

impl InstanceConfig {
    /// Parse the JS-style config object.
    ///
    /// # Errors
    ///
    /// [`ConfigError::Json`] for malformed JSON, otherwise the shape errors
    /// listed on [`ConfigError`].
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let raw: RawConfig =
            serde_json::from_str(json).map_err(|err| ConfigError::Json(err.to_string()))?;
        Self::try_from(raw)
    }

    /// Same as [`Self::from_json`] for an already-parsed value.
    ///
    /// # Errors
    ///
    /// See [`Self::from_json`].
    pub fn from_value(value: Value) -> Result<Self, ConfigError> {
        let raw: RawConfig =
            serde_json::from_value(value).map_err(|err| ConfigError::Json(err.to_string()))?;
        Self::try_from(raw)
    }

    #[must_use]
    pub const fn is_reorder(&self) -> bool {
        matches!(self, Self::Reorder(_))
    }

    /// Selector whose insertion forces a re-resolution.
    #[must_use]
    pub fn root_selector(&self) -> Option<&str> {
        match self {
            Self::Class(class) => class.root(),
            Self::Reorder(reorder) => Some(reorder.element()),
        }
    }
}

impl Default for InstanceConfig {
    fn default() -> Self {
        Self::Class(ClassConfig::new())
    }
}

impl From<ClassConfig> for InstanceConfig {
    fn from(config: ClassConfig) -> Self {
        Self::Class(config)
    }
}

impl From<ReorderConfig> for InstanceConfig {
    fn from(config: ReorderConfig) -> Self {
        Self::Reorder(config)
    }
}

#[derive(Debug, Deserialize)]
struct RawConfig {
    #[serde(rename = "type", default)]
    kind: Option<String>,
    #[serde(default)]
    element: Option<String>,
    #[serde(flatten)]
    breakpoints: Map<String, Value>,
}

impl TryFrom<RawConfig> for InstanceConfig {
    type Error = ConfigError;

    fn try_from(raw: RawConfig) -> Result<Self, Self::Error> {
        match raw.kind.as_deref() {
            None | Some("start") => Ok(Self::Class(ClassConfig { root: raw.element })),
            Some("reorder") => {
                let element = raw
                    .element
                    .filter(|selector| !selector.trim().is_empty())
                    .ok_or(ConfigError::MissingElement)?;
                let mut config = ReorderConfig::new(element);
                for (name, value) in raw.breakpoints {
                    if let Some(action) = parse_action(&name, &value)? {
                        config = config.with_action(name, action);
                    }
                }
                Ok(Self::Reorder(config))
            }
            Some(other) => Err(ConfigError::UnknownType(other.to_owned())),
        }
    }
}

/// `[target, method]` → action; `null` means "no action".
fn parse_action(name: &str, value: &Value) -> Result<Option<ReorderAction>, ConfigError> {
    if value.is_null() {
        return Ok(None);
    }
    match value.as_array().map(Vec::as_slice) {
        Some([Value::String(target), Value::String(method)]) => {
            Ok(Some(ReorderAction::from_parts(target.as_str(), method.as_str())))
        }
        _ => Err(ConfigError::MalformedAction(name.to_owned())),
    }
}

/// One configured reflow unit and its private state.
#[derive(Debug, Clone)]
pub struct Instance {
    pub(crate) config: InstanceConfig,
    pub(crate) table: BreakpointTable,
    pub(crate) tracker: TransitionTracker,
    pub(crate) watcher: DynamicElementWatcher,
}

impl Instance {
    #[must_use]
    pub fn new(config: InstanceConfig, table: BreakpointTable) -> Self {
        let watcher = DynamicElementWatcher::for_config(&config);
        Self {
            config,
            table,
            tracker: TransitionTracker::new(),
            watcher,
        }
    }

    #[must_use]
    pub fn config(&self) -> &InstanceConfig {
        &self.config
    }

    #[must_use]
    pub fn table(&self) -> &BreakpointTable {
        &self.table
    }

    /// Last breakpoint this instance entered.
    #[must_use]
    pub fn active_breakpoint(&self) -> Option<&str> {
        self.tracker.active()
    }

    #[must_use]
    pub fn watcher(&self) -> &DynamicElementWatcher {
        &self.watcher
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::breakpoint::Breakpoint;
    use pretty_assertions::assert_eq;

    #[test]
    fn empty_object_is_class_mode() {
        assert_eq!(InstanceConfig::from_json("{}"), Ok(InstanceConfig::default()));
        assert_eq!(
            InstanceConfig::from_json(r#"{"type": "start"}"#),
            Ok(InstanceConfig::default())
        );
    }

    #[test]
    fn class_mode_keeps_optional_root() {
        let config = InstanceConfig::from_json(r##"{"element": "#app"}"##).unwrap();
        assert_eq!(config.root_selector(), Some("#app"));
        assert!(!config.is_reorder());
    }

    #[test]
    fn parses_reorder_config() {
        let config = InstanceConfig::from_json(
            r##"{
                "element": ".element-to-move",
                "type": "reorder",
                "xs": ["#top > .content", "insertAfter"],
                "md": ["#top > .content", "insertBefore"],
                "lg": [".region-container", "prependTo"]
            }"##,
        )
        .unwrap();

        let expected = ReorderConfig::new(".element-to-move")
            .at(Breakpoint::Lg, ".region-container", Placement::Prepend)
            .at(Breakpoint::Md, "#top > .content", Placement::InsertBefore)
            .at(Breakpoint::Xs, "#top > .content", Placement::InsertAfter);
        let InstanceConfig::Reorder(reorder) = &config else {
            panic!("expected reorder config, got {config:?}");
        };
        for bp in ["xs", "md", "lg"] {
            assert_eq!(reorder.action(bp), expected.action(bp), "{bp}");
        }
        assert_eq!(reorder.action("sm"), None);
        assert_eq!(config.root_selector(), Some(".element-to-move"));
    }

    #[test]
    fn null_entry_means_no_action() {
        let config =
            InstanceConfig::from_json(r#"{"element": ".x", "type": "reorder", "sm": null}"#)
                .unwrap();
        let InstanceConfig::Reorder(reorder) = config else {
            panic!("expected reorder config");
        };
        assert_eq!(reorder.actions().count(), 0);
    }

    #[test]
    fn unknown_method_survives_parsing() {
        let config = InstanceConfig::from_json(
            r#"{"element": ".x", "type": "reorder", "md": [".y", "teleportTo"]}"#,
        )
        .unwrap();
        let InstanceConfig::Reorder(reorder) = config else {
            panic!("expected reorder config");
        };
        let action = reorder.action("md").unwrap();
        assert_eq!(action.method(), "teleportTo");
        assert_eq!(action.placement(), None);
    }

    #[test]
    fn rejects_bad_shapes() {
        assert_eq!(
            InstanceConfig::from_json(r#"{"type": "reorder"}"#),
            Err(ConfigError::MissingElement)
        );
        assert_eq!(
            InstanceConfig::from_json(r#"{"type": "reorder", "element": "  "}"#),
            Err(ConfigError::MissingElement)
        );
        assert_eq!(
            InstanceConfig::from_json(r#"{"type": "shuffle"}"#),
            Err(ConfigError::UnknownType("shuffle".into()))
        );
        assert_eq!(
            InstanceConfig::from_json(r#"{"type": "reorder", "element": ".x", "md": ".y"}"#),
            Err(ConfigError::MalformedAction("md".into()))
        );
        assert_eq!(
            InstanceConfig::from_json(
                r#"{"type": "reorder", "element": ".x", "md": [".y", "appendTo", 3]}"#
            ),
            Err(ConfigError::MalformedAction("md".into()))
        );
        assert!(matches!(
            InstanceConfig::from_json("[1, 2"),
            Err(ConfigError::Json(_))
        ));
    }

    #[test]
    fn deserialize_goes_through_validation() {
        let err = serde_json::from_str::<InstanceConfig>(r#"{"type": "reorder"}"#).unwrap_err();
        assert!(err.to_string().contains("element"), "{err}");
    }

    #[test]
    fn later_action_replaces_earlier() {
        let config = ReorderConfig::new(".x")
            .at("md", ".a", Placement::Append)
            .at("md", ".b", Placement::Prepend);
        assert_eq!(config.actions().count(), 1);
        assert_eq!(config.action("md").map(ReorderAction::target), Some(".b"));
    }

    #[test]
    fn new_instance_has_no_active_breakpoint() {
        let instance = Instance::new(InstanceConfig::default(), BreakpointTable::default());
        assert_eq!(instance.active_breakpoint(), None);
        assert_eq!(instance.table(), &BreakpointTable::default());
    }
}
