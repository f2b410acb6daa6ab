#![forbid(unsafe_code)]

//! Breakpoint tiers and the width → breakpoint resolver.
//!
//! A [`BreakpointTable`] is an ordered list of `(name, min_width)` entries
//! kept sorted widest first. Resolution walks the table from the widest
//! threshold down and returns the first entry the width satisfies.
//!
//! # Invariants
//!
//! 1. At least one entry has `min_width == 0`, so [`BreakpointTable::resolve`]
//!    is total.
//! 2. Entries are sorted descending by `min_width`. The sort is stable:
//!    entries that share a threshold keep declaration order, and the first
//!    one declared wins.
//! 3. Names are non-empty and unique.
//! 4. A table is replaced as a whole; there are no partial updates.
//!
//! # Failure Modes
//!
//! - Duplicate thresholds are accepted and reported through
//!   [`BreakpointTable::duplicate_thresholds`] and a `warn!` log line.

use core::fmt;
use core::str::FromStr;

use serde::de::{self, Deserialize, Deserializer, MapAccess, Visitor};
use serde::ser::{Serialize, SerializeMap, Serializer};

use crate::error::TableError;

#[cfg(feature = "tracing")]
use crate::logging::warn;
#[cfg(not(feature = "tracing"))]
use crate::warn;

/// The six standard breakpoint tiers, ordered narrowest to widest.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Breakpoint {
    Xs = 0,
    Sm = 1,
    Md = 2,
    Lg = 3,
    Xl = 4,
    Xxl = 5,
}

impl Breakpoint {
    /// All tiers, narrowest first.
    pub const ALL: [Self; 6] = [Self::Xs, Self::Sm, Self::Md, Self::Lg, Self::Xl, Self::Xxl];

    /// Lowercase name used in tables, configs and body classes.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Xs => "xs",
            Self::Sm => "sm",
            Self::Md => "md",
            Self::Lg => "lg",
            Self::Xl => "xl",
            Self::Xxl => "xxl",
        }
    }

    /// Minimum width (px) of this tier in the default table.
    #[must_use]
    pub const fn default_min_width(self) -> u32 {
        match self {
            Self::Xs => 0,
            Self::Sm => 641,
            Self::Md => 768,
            Self::Lg => 1024,
            Self::Xl => 1280,
            Self::Xxl => 1536,
        }
    }
}

impl fmt::Display for Breakpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl AsRef<str> for Breakpoint {
    fn as_ref(&self) -> &str {
        self.as_str()
    }
}

impl FromStr for Breakpoint {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|bp| bp.as_str() == s)
            .ok_or_else(|| format!("unknown breakpoint: {s}"))
    }
}

/// One `(name, min_width)` row of a [`BreakpointTable`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BreakpointEntry {
    name: String,
    min_width: u32,
}

impl BreakpointEntry {
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub const fn min_width(&self) -> u32 {
        self.min_width
    }
}

/// Ordered breakpoint thresholds, widest first.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BreakpointTable {
    entries: Vec<BreakpointEntry>,
}

impl BreakpointTable {
    /// Build a table from `(name, min_width)` pairs in declaration order.
    ///
    /// # Errors
    ///
    /// Returns a [`TableError`] when the table is empty, has no `0` entry,
    /// or contains an empty or repeated name.
    pub fn new<I, S>(entries: I) -> Result<Self, TableError>
    where
        I: IntoIterator<Item = (S, u32)>,
        S: Into<String>,
    {
        let mut rows: Vec<BreakpointEntry> = Vec::new();
        for (name, min_width) in entries {
            let name = name.into();
            if name.is_empty() {
                return Err(TableError::EmptyName);
            }
            if rows.iter().any(|row| row.name == name) {
                return Err(TableError::DuplicateName(name));
            }
            rows.push(BreakpointEntry { name, min_width });
        }
        if rows.is_empty() {
            return Err(TableError::Empty);
        }
        if !rows.iter().any(|row| row.min_width == 0) {
            return Err(TableError::MissingCatchAll);
        }
        // Stable: ties keep declaration order.
        rows.sort_by(|a, b| b.min_width.cmp(&a.min_width));

        let table = Self { entries: rows };
        let dups = table.duplicate_thresholds();
        if !dups.is_empty() {
            warn!(thresholds = ?dups, "breakpoint table repeats a threshold, first entry wins");
        }
        Ok(table)
    }

    /// Resolve a viewport width to the active breakpoint name.
    ///
    /// Total: the catch-all `0` entry matches every width.
    #[must_use]
    pub fn resolve(&self, width: u32) -> &str {
        let idx = self
            .entries
            .iter()
            .position(|entry| entry.min_width <= width)
            .unwrap_or(self.entries.len() - 1);
        &self.entries[idx].name
    }

    /// Entries, widest first.
    #[must_use]
    pub fn entries(&self) -> &[BreakpointEntry] {
        &self.entries
    }

    /// Names, widest first.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(BreakpointEntry::name)
    }

    /// Minimum width of a named breakpoint.
    #[must_use]
    pub fn min_width(&self, name: &str) -> Option<u32> {
        self.entries
            .iter()
            .find(|entry| entry.name == name)
            .map(BreakpointEntry::min_width)
    }

    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.min_width(name).is_some()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Always false; a table has at least its catch-all entry.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Thresholds shared by more than one entry, widest first.
    #[must_use]
    pub fn duplicate_thresholds(&self) -> Vec<u32> {
        let mut dups: Vec<u32> = Vec::new();
        for pair in self.entries.windows(2) {
            let width = pair[0].min_width;
            if width == pair[1].min_width && dups.last() != Some(&width) {
                dups.push(width);
            }
        }
        dups
    }
}

impl Default for BreakpointTable {
    /// xxl=1536, xl=1280, lg=1024, md=768, sm=641, xs=0.
    fn default() -> Self {
        let entries = Breakpoint::ALL
            .iter()
            .rev()
            .map(|bp| BreakpointEntry {
                name: bp.as_str().to_owned(),
                min_width: bp.default_min_width(),
            })
            .collect();
        Self { entries }
    }
}

/// Resolve `width` against `table`. Equivalent to [`BreakpointTable::resolve`].
#[must_use]
pub fn resolve(width: u32, table: &BreakpointTable) -> &str {
    table.resolve(width)
}

/// Convert a camelCase breakpoint name into its hyphen-case body class.
///
/// Every ASCII uppercase letter is preceded by a hyphen, including one in
/// first position, and the result is lowercased: `extraLarge` →
/// `extra-large`, `Wide` → `-wide`, `lg` → `lg`.
#[must_use]
pub fn hyphenate(name: &str) -> String {
    let mut out = String::with_capacity(name.len() + 4);
    for ch in name.chars() {
        if ch.is_ascii_uppercase() {
            out.push('-');
            out.push(ch.to_ascii_lowercase());
        } else {
            out.extend(ch.to_lowercase());
        }
    }
    out
}

impl Serialize for BreakpointTable {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for entry in &self.entries {
            map.serialize_entry(&entry.name, &entry.min_width)?;
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for BreakpointTable {
    /// Reads `{ "xxl": 1800, "xl": 1400, ... }`, keeping key order for ties.
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct TableVisitor;

        impl<'de> Visitor<'de> for TableVisitor {
            type Value = BreakpointTable;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a map of breakpoint names to minimum widths")
            }

            fn visit_map<A: MapAccess<'de>>(self, mut map: A) -> Result<Self::Value, A::Error> {
                let mut rows: Vec<(String, u32)> = Vec::with_capacity(map.size_hint().unwrap_or(6));
                while let Some((name, min_width)) = map.next_entry::<String, u32>()? {
                    rows.push((name, min_width));
                }
                BreakpointTable::new(rows).map_err(de::Error::custom)
            }
        }

        deserializer.deserialize_map(TableVisitor)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn custom() -> BreakpointTable {
        BreakpointTable::new([
            ("xxl", 1800),
            ("xl", 1400),
            ("lg", 1200),
            ("md", 900),
            ("sm", 600),
            ("xs", 0),
        ])
        .unwrap()
    }

    #[test]
    fn default_thresholds() {
        let table = BreakpointTable::default();
        let names: Vec<_> = table.names().collect();
        assert_eq!(names, ["xxl", "xl", "lg", "md", "sm", "xs"]);
        assert_eq!(table.min_width("sm"), Some(641));
        assert_eq!(table.min_width("xxl"), Some(1536));
    }

    #[test]
    fn resolves_widest_first() {
        let table = BreakpointTable::default();
        assert_eq!(table.resolve(0), "xs");
        assert_eq!(table.resolve(640), "xs");
        assert_eq!(table.resolve(641), "sm");
        assert_eq!(table.resolve(767), "sm");
        assert_eq!(table.resolve(768), "md");
        assert_eq!(table.resolve(1024), "lg");
        assert_eq!(table.resolve(1300), "xl");
        assert_eq!(table.resolve(1600), "xxl");
        assert_eq!(table.resolve(u32::MAX), "xxl");
    }

    #[test]
    fn declaration_order_does_not_matter() {
        let shuffled =
            BreakpointTable::new([("sm", 600), ("xxl", 1800), ("xs", 0), ("md", 900)]).unwrap();
        assert_eq!(shuffled.resolve(650), "sm");
        assert_eq!(shuffled.resolve(1000), "md");
        assert_eq!(shuffled.resolve(2000), "xxl");
        assert_eq!(shuffled.entries()[0].name(), "xxl");
    }

    #[test]
    fn free_function_matches_method() {
        let table = custom();
        for width in [0, 599, 600, 899, 900, 1200, 1399, 1400, 1800] {
            assert_eq!(resolve(width, &table), table.resolve(width));
        }
    }

    #[test]
    fn tie_goes_to_first_declared() {
        let table = BreakpointTable::new([("md", 800), ("tablet", 800), ("xs", 0)]).unwrap();
        assert_eq!(table.resolve(900), "md");
        assert_eq!(table.duplicate_thresholds(), vec![800]);
    }

    #[test]
    fn several_catch_alls_are_a_warning() {
        let table = BreakpointTable::new([("xs", 0), ("base", 0)]).unwrap();
        assert_eq!(table.resolve(10), "xs");
        assert_eq!(table.duplicate_thresholds(), vec![0]);
    }

    #[test]
    fn rejects_invalid_tables() {
        assert_eq!(
            BreakpointTable::new(Vec::<(String, u32)>::new()),
            Err(TableError::Empty)
        );
        assert_eq!(
            BreakpointTable::new([("md", 768), ("sm", 641)]),
            Err(TableError::MissingCatchAll)
        );
        assert_eq!(
            BreakpointTable::new([("", 0)]),
            Err(TableError::EmptyName)
        );
        assert_eq!(
            BreakpointTable::new([("xs", 0), ("xs", 10)]),
            Err(TableError::DuplicateName("xs".into()))
        );
    }

    #[test]
    fn hyphenates_camel_case() {
        assert_eq!(hyphenate("lg"), "lg");
        assert_eq!(hyphenate("extraLarge"), "extra-large");
        assert_eq!(hyphenate("tabletPortraitUp"), "tablet-portrait-up");
        assert_eq!(hyphenate("xl2Wide"), "xl2-wide");
        assert_eq!(hyphenate("Desktop"), "-desktop");
        assert_eq!(hyphenate("XLarge"), "-x-large");
        assert_eq!(hyphenate("mdÜber"), "mdüber");
    }

    #[test]
    fn breakpoint_names_round_trip() {
        for bp in Breakpoint::ALL {
            assert_eq!(bp.as_str().parse::<Breakpoint>(), Ok(bp));
            assert_eq!(bp.to_string(), bp.as_str());
        }
        assert!("huge".parse::<Breakpoint>().is_err());
    }

    #[test]
    fn deserializes_in_key_order() {
        let table: BreakpointTable =
            serde_json::from_str(r#"{"xl": 1400, "wide": 1400, "xs": 0}"#).unwrap();
        assert_eq!(table.resolve(1500), "xl");

        let err = serde_json::from_str::<BreakpointTable>(r#"{"md": 900}"#).unwrap_err();
        assert!(err.to_string().contains("minimum width 0"), "{err}");
    }

    #[test]
    fn serializes_widest_first() {
        let json = serde_json::to_string(&custom()).unwrap();
        assert_eq!(
            json,
            r#"{"xxl":1800,"xl":1400,"lg":1200,"md":900,"sm":600,"xs":0}"#
        );
    }
}
