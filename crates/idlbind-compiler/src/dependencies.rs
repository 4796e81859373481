//! External declarations required by generated bindings.
//!
//! Descriptor builders take `&mut Dependencies` and record what the emitted
//! glue will need. One accumulator is created per interface and returned in
//! its descriptor set; batch drivers merge them with [`Dependencies::merge`].

use std::collections::BTreeSet;

use serde::Serialize;

use crate::classify::{TypeCategory, TypeInfo};

/// Namespace of reflected content-attribute names.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub enum ContentNamespace {
    #[serde(rename = "HTMLNames")]
    Html,
    #[serde(rename = "SVGNames")]
    Svg,
}

impl ContentNamespace {
    /// `SVGNames` for interfaces named `SVG*`, `HTMLNames` otherwise.
    pub fn for_interface(interface: &str) -> Self {
        if interface.starts_with("SVG") {
            ContentNamespace::Svg
        } else {
            ContentNamespace::Html
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            ContentNamespace::Html => "HTMLNames",
            ContentNamespace::Svg => "SVGNames",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(tag = "kind", content = "name", rename_all = "snake_case")]
pub enum Dependency {
    /// Binding declarations for a referenced interface or callback type.
    Interface(String),
    BindingSecurity,
    ScriptState,
    ScriptArguments,
    ContentAttributeNames(ContentNamespace),
    CustomElementCallbacks,
    EventListener,
    SerializedScriptValue,
    Dictionary,
    /// Window access for constructors.
    DomWindow,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct Dependencies(BTreeSet<Dependency>);

impl Dependencies {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, dependency: Dependency) {
        self.0.insert(dependency);
    }

    pub fn contains(&self, dependency: &Dependency) -> bool {
        self.0.contains(dependency)
    }

    pub fn merge(&mut self, other: Dependencies) {
        self.0.extend(other.0);
    }

    pub fn iter(&self) -> impl Iterator<Item = &Dependency> {
        self.0.iter()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Record whatever a value of type `info` needs, recursing into
    /// sequences and unions.
    pub fn add_type(&mut self, info: &TypeInfo) {
        match info.category {
            TypeCategory::Wrapper | TypeCategory::Callback => {
                self.insert(Dependency::Interface(info.base_name.clone()));
            }
            TypeCategory::Object => match info.base_name.as_str() {
                "Dictionary" => self.insert(Dependency::Dictionary),
                "SerializedScriptValue" => self.insert(Dependency::SerializedScriptValue),
                "EventListener" | "EventHandler" => self.insert(Dependency::EventListener),
                _ => {}
            },
            TypeCategory::Sequence => {
                if let Some(element) = &info.element {
                    self.add_type(element);
                }
            }
            TypeCategory::Union => {
                for member in &info.members {
                    self.add_type(member);
                }
            }
            _ => {}
        }
    }
}

impl Extend<Dependency> for Dependencies {
    fn extend<I: IntoIterator<Item = Dependency>>(&mut self, iter: I) {
        self.0.extend(iter);
    }
}
