//! Compiler configuration.
//!
//! ## Exclusion list
//!
//! Members are excluded by `(interface, kind, name)`. A rule without a name
//! is the wildcard for its `(interface, kind)` pair. Kinds:
//!
//! - `member`: the whole method or attribute
//! - `getter` / `setter`: one accessor of an attribute
//!
//! Rules match the exact interface name; they are not inherited.
//!
//! ## Loading
//!
//! ```ignore
//! let config = CompilerConfig::from_json_str(r#"{
//!     "exclusions": [
//!         { "interface": "Document", "kind": "member", "name": "close" },
//!         { "interface": "Window", "kind": "setter" }
//!     ]
//! }"#)?;
//! ```

use rustc_hash::FxHashSet;
use serde::{Deserialize, Serialize};

use crate::error::CompileError;

/// Member kinds an exclusion rule can target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MemberKind {
    Member,
    Getter,
    Setter,
}

/// One exclusion entry.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ExclusionRule {
    pub interface: String,
    pub kind: MemberKind,
    /// `None` excludes every member of this kind.
    #[serde(default)]
    pub name: Option<String>,
}

impl ExclusionRule {
    pub fn exact(interface: impl Into<String>, kind: MemberKind, name: impl Into<String>) -> Self {
        Self {
            interface: interface.into(),
            kind,
            name: Some(name.into()),
        }
    }

    pub fn wildcard(interface: impl Into<String>, kind: MemberKind) -> Self {
        Self {
            interface: interface.into(),
            kind,
            name: None,
        }
    }
}

/// Structured exclusion lookup: exact entries plus a wildcard set.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "Vec<ExclusionRule>", into = "Vec<ExclusionRule>")]
pub struct ExclusionList {
    exact: FxHashSet<(String, MemberKind, String)>,
    wildcards: FxHashSet<(String, MemberKind)>,
}

impl ExclusionList {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, rule: ExclusionRule) {
        match rule.name {
            Some(name) => {
                self.exact.insert((rule.interface, rule.kind, name));
            }
            None => {
                self.wildcards.insert((rule.interface, rule.kind));
            }
        }
    }

    pub fn with_rule(mut self, rule: ExclusionRule) -> Self {
        self.insert(rule);
        self
    }

    pub fn len(&self) -> usize {
        self.exact.len() + self.wildcards.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Direct lookup of one `(interface, kind, name)` triple.
    pub fn matches(&self, interface: &str, kind: MemberKind, name: &str) -> bool {
        self.wildcards.contains(&(interface.to_string(), kind))
            || self
                .exact
                .contains(&(interface.to_string(), kind, name.to_string()))
    }

    /// Method (or whole attribute) exclusion.
    pub fn excludes_member(&self, interface: &str, name: &str) -> bool {
        self.matches(interface, MemberKind::Member, name)
    }

    pub fn excludes_getter(&self, interface: &str, name: &str) -> bool {
        self.matches(interface, MemberKind::Getter, name) || self.excludes_member(interface, name)
    }

    pub fn excludes_setter(&self, interface: &str, name: &str) -> bool {
        self.matches(interface, MemberKind::Setter, name) || self.excludes_member(interface, name)
    }

    /// An attribute disappears only when both accessors are excluded.
    pub fn excludes_attribute(&self, interface: &str, name: &str) -> bool {
        self.excludes_getter(interface, name) && self.excludes_setter(interface, name)
    }

    /// Every rule, in a stable order.
    pub fn rules(&self) -> Vec<ExclusionRule> {
        let mut rules: Vec<ExclusionRule> = self
            .exact
            .iter()
            .map(|(interface, kind, name)| ExclusionRule::exact(interface.clone(), *kind, name.clone()))
            .chain(
                self.wildcards
                    .iter()
                    .map(|(interface, kind)| ExclusionRule::wildcard(interface.clone(), *kind)),
            )
            .collect();
        rules.sort();
        rules
    }
}

impl FromIterator<ExclusionRule> for ExclusionList {
    fn from_iter<I: IntoIterator<Item = ExclusionRule>>(iter: I) -> Self {
        let mut list = ExclusionList::new();
        for rule in iter {
            list.insert(rule);
        }
        list
    }
}

impl From<Vec<ExclusionRule>> for ExclusionList {
    fn from(rules: Vec<ExclusionRule>) -> Self {
        rules.into_iter().collect()
    }
}

impl From<ExclusionList> for Vec<ExclusionRule> {
    fn from(list: ExclusionList) -> Self {
        list.rules()
    }
}

/// Named types that are plain objects at the script boundary even when they
/// are registered as interfaces.
pub const DEFAULT_NON_WRAPPER_TYPES: &[&str] = &[
    "Dictionary",
    "EventHandler",
    "EventListener",
    "MediaQueryListListener",
    "NodeFilter",
    "SerializedScriptValue",
];

/// Configuration consumed by a compilation pass.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CompilerConfig {
    pub exclusions: ExclusionList,
    /// Replaces [`DEFAULT_NON_WRAPPER_TYPES`] when given.
    pub non_wrapper_types: FxHashSet<String>,
}

impl Default for CompilerConfig {
    fn default() -> Self {
        Self {
            exclusions: ExclusionList::default(),
            non_wrapper_types: DEFAULT_NON_WRAPPER_TYPES
                .iter()
                .map(|name| name.to_string())
                .collect(),
        }
    }
}

impl CompilerConfig {
    pub fn from_json_str(json: &str) -> Result<Self, CompileError> {
        serde_json::from_str(json).map_err(|e| CompileError::Config {
            message: e.to_string(),
        })
    }

    pub fn with_exclusions(mut self, exclusions: ExclusionList) -> Self {
        self.exclusions = exclusions;
        self
    }

    pub fn is_non_wrapper_type(&self, name: &str) -> bool {
        self.non_wrapper_types.contains(name)
    }
}
