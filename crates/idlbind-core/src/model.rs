//! Parsed interface definitions.
//!
//! These are read-only inputs produced by an external IDL parser. The
//! `with_*` builders exist for embedders and tests that assemble definitions
//! in code; JSON input goes through serde.

use std::fmt;

use bitflags::bitflags;
use serde::{Deserialize, Serialize};

use crate::extended_attributes::ExtendedAttributes;
use crate::idl_type::IdlType;

bitflags! {
    /// Special-operation keywords on an operation.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
    pub struct Specials: u8 {
        const GETTER = 1 << 0;
        const SETTER = 1 << 1;
        const DELETER = 1 << 2;
        const CREATOR = 1 << 3;
        const LEGACY_CALLER = 1 << 4;
        const STRINGIFIER = 1 << 5;
    }
}

/// The six special-operation shapes recognized on an interface.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SpecialShape {
    IndexedGetter,
    IndexedSetter,
    IndexedDeleter,
    NamedGetter,
    NamedSetter,
    NamedDeleter,
}

impl SpecialShape {
    pub const ALL: [SpecialShape; 6] = [
        SpecialShape::IndexedGetter,
        SpecialShape::IndexedSetter,
        SpecialShape::IndexedDeleter,
        SpecialShape::NamedGetter,
        SpecialShape::NamedSetter,
        SpecialShape::NamedDeleter,
    ];

    /// Identifier given to an anonymous operation of this shape.
    pub fn placeholder_name(self) -> &'static str {
        match self {
            SpecialShape::IndexedGetter => "anonymousIndexedGetter",
            SpecialShape::IndexedSetter => "anonymousIndexedSetter",
            SpecialShape::IndexedDeleter => "anonymousIndexedDeleter",
            SpecialShape::NamedGetter => "anonymousNamedGetter",
            SpecialShape::NamedSetter => "anonymousNamedSetter",
            SpecialShape::NamedDeleter => "anonymousNamedDeleter",
        }
    }

    pub fn is_indexed(self) -> bool {
        matches!(
            self,
            SpecialShape::IndexedGetter | SpecialShape::IndexedSetter | SpecialShape::IndexedDeleter
        )
    }
}

impl fmt::Display for SpecialShape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            SpecialShape::IndexedGetter => "indexed getter",
            SpecialShape::IndexedSetter => "indexed setter",
            SpecialShape::IndexedDeleter => "indexed deleter",
            SpecialShape::NamedGetter => "named getter",
            SpecialShape::NamedSetter => "named setter",
            SpecialShape::NamedDeleter => "named deleter",
        })
    }
}

/// A literal default value on an optional argument.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DefaultValue {
    Null,
    Value(String),
}

impl DefaultValue {
    pub fn is_null(&self) -> bool {
        matches!(self, DefaultValue::Null)
    }
}

// ============================================================================
// Interface
// ============================================================================

/// One interface definition.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Interface {
    pub name: String,
    /// Single-inheritance parent.
    #[serde(default)]
    pub parent: Option<String>,
    #[serde(default)]
    pub attributes: Vec<Attribute>,
    /// Methods and special operations, in declaration order.
    #[serde(default)]
    pub operations: Vec<Operation>,
    #[serde(default)]
    pub constructors: Vec<Operation>,
    /// `[CustomConstructor]` signatures; the native side implements these by hand.
    #[serde(default)]
    pub custom_constructors: Vec<Operation>,
    #[serde(default)]
    pub constants: Vec<Constant>,
    #[serde(default)]
    pub extended_attributes: ExtendedAttributes,
    /// `callback interface`.
    #[serde(default)]
    pub is_callback: bool,
}

impl Interface {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            parent: None,
            attributes: Vec::new(),
            operations: Vec::new(),
            constructors: Vec::new(),
            custom_constructors: Vec::new(),
            constants: Vec::new(),
            extended_attributes: ExtendedAttributes::default(),
            is_callback: false,
        }
    }

    pub fn with_parent(mut self, parent: impl Into<String>) -> Self {
        self.parent = Some(parent.into());
        self
    }

    pub fn with_attribute(mut self, attribute: Attribute) -> Self {
        self.attributes.push(attribute);
        self
    }

    pub fn with_operation(mut self, operation: Operation) -> Self {
        self.operations.push(operation);
        self
    }

    pub fn with_constructor(mut self, constructor: Operation) -> Self {
        self.constructors.push(constructor);
        self
    }

    pub fn with_custom_constructor(mut self, constructor: Operation) -> Self {
        self.custom_constructors.push(constructor);
        self
    }

    pub fn with_constant(mut self, constant: Constant) -> Self {
        self.constants.push(constant);
        self
    }

    pub fn with_extended_attributes(mut self, attrs: ExtendedAttributes) -> Self {
        self.extended_attributes = attrs;
        self
    }

    pub fn callback(mut self) -> Self {
        self.is_callback = true;
        self
    }

    /// Find an attribute declared directly on this interface.
    pub fn attribute(&self, name: &str) -> Option<&Attribute> {
        self.attributes.iter().find(|a| a.name == name)
    }
}

// ============================================================================
// Members
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Attribute {
    pub name: String,
    pub idl_type: IdlType,
    #[serde(default)]
    pub is_read_only: bool,
    #[serde(default)]
    pub is_static: bool,
    #[serde(default)]
    pub extended_attributes: ExtendedAttributes,
}

impl Attribute {
    pub fn new(name: impl Into<String>, idl_type: IdlType) -> Self {
        Self {
            name: name.into(),
            idl_type,
            is_read_only: false,
            is_static: false,
            extended_attributes: ExtendedAttributes::default(),
        }
    }

    pub fn read_only(mut self) -> Self {
        self.is_read_only = true;
        self
    }

    pub fn static_member(mut self) -> Self {
        self.is_static = true;
        self
    }

    pub fn with_extended_attributes(mut self, attrs: ExtendedAttributes) -> Self {
        self.extended_attributes = attrs;
        self
    }
}

/// A method, special operation or constructor.
///
/// Constructors have no return type. Special operations may have an empty
/// name.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Operation {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub return_type: Option<IdlType>,
    #[serde(default)]
    pub arguments: Vec<Argument>,
    #[serde(default)]
    pub is_static: bool,
    #[serde(default)]
    pub specials: Specials,
    #[serde(default)]
    pub extended_attributes: ExtendedAttributes,
}

impl Operation {
    pub fn new(name: impl Into<String>, return_type: IdlType) -> Self {
        Self {
            name: name.into(),
            return_type: Some(return_type),
            arguments: Vec::new(),
            is_static: false,
            specials: Specials::empty(),
            extended_attributes: ExtendedAttributes::default(),
        }
    }

    pub fn constructor() -> Self {
        Self {
            name: String::new(),
            return_type: None,
            arguments: Vec::new(),
            is_static: false,
            specials: Specials::empty(),
            extended_attributes: ExtendedAttributes::default(),
        }
    }

    /// Append an argument, assigning its position index.
    pub fn with_argument(mut self, mut argument: Argument) -> Self {
        argument.index = self.arguments.len();
        self.arguments.push(argument);
        self
    }

    pub fn with_specials(mut self, specials: Specials) -> Self {
        self.specials |= specials;
        self
    }

    pub fn static_member(mut self) -> Self {
        self.is_static = true;
        self
    }

    pub fn with_extended_attributes(mut self, attrs: ExtendedAttributes) -> Self {
        self.extended_attributes = attrs;
        self
    }

    pub fn is_anonymous(&self) -> bool {
        self.name.is_empty()
    }

    /// True when the final argument is variadic.
    pub fn is_variadic(&self) -> bool {
        self.arguments.last().is_some_and(|a| a.is_variadic)
    }

    /// Arguments a caller must always supply: neither optional without a
    /// default nor variadic.
    pub fn required_argument_count(&self) -> usize {
        self.arguments.iter().filter(|a| a.is_required()).count()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Argument {
    pub name: String,
    pub idl_type: IdlType,
    /// Zero-based position in the parameter list.
    #[serde(default)]
    pub index: usize,
    #[serde(default)]
    pub is_optional: bool,
    #[serde(default)]
    pub is_variadic: bool,
    #[serde(default)]
    pub default_value: Option<DefaultValue>,
    #[serde(default)]
    pub extended_attributes: ExtendedAttributes,
}

impl Argument {
    pub fn new(name: impl Into<String>, idl_type: IdlType) -> Self {
        Self {
            name: name.into(),
            idl_type,
            index: 0,
            is_optional: false,
            is_variadic: false,
            default_value: None,
            extended_attributes: ExtendedAttributes::default(),
        }
    }

    pub fn optional(mut self) -> Self {
        self.is_optional = true;
        self
    }

    pub fn variadic(mut self) -> Self {
        self.is_variadic = true;
        self
    }

    pub fn with_default(mut self, value: DefaultValue) -> Self {
        self.is_optional = true;
        self.default_value = Some(value);
        self
    }

    pub fn with_extended_attributes(mut self, attrs: ExtendedAttributes) -> Self {
        self.extended_attributes = attrs;
        self
    }

    /// A default value or `[Default]` supplies an implicit value.
    pub fn has_default(&self) -> bool {
        self.default_value.is_some() || self.extended_attributes.default.is_some()
    }

    /// Optional with no implicit value: omission is observable.
    pub fn is_effectively_optional(&self) -> bool {
        self.is_optional && !self.has_default()
    }

    pub fn is_required(&self) -> bool {
        !(self.is_effectively_optional() || self.is_variadic)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Constant {
    pub name: String,
    pub idl_type: IdlType,
    /// Literal value as written, unquoted for strings.
    pub value: String,
    #[serde(default)]
    pub extended_attributes: ExtendedAttributes,
}

impl Constant {
    pub fn new(name: impl Into<String>, idl_type: IdlType, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            idl_type,
            value: value.into(),
            extended_attributes: ExtendedAttributes::default(),
        }
    }

    pub fn with_extended_attributes(mut self, attrs: ExtendedAttributes) -> Self {
        self.extended_attributes = attrs;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extended_attributes::RawExtendedAttribute;
    use crate::idl_type::NumericKind;

    fn long() -> IdlType {
        IdlType::Numeric(NumericKind::Long)
    }

    #[test]
    fn with_argument_assigns_positions() {
        let op = Operation::new("f", IdlType::Void)
            .with_argument(Argument::new("a", long()))
            .with_argument(Argument::new("b", long()).optional());
        assert_eq!(op.arguments[0].index, 0);
        assert_eq!(op.arguments[1].index, 1);
    }

    #[test]
    fn required_count_treats_defaults_as_required() {
        let default_attr =
            ExtendedAttributes::from_raw(vec![RawExtendedAttribute::single("Default", "Undefined")])
                .unwrap();
        let op = Operation::new("f", IdlType::Void)
            .with_argument(Argument::new("a", long()))
            .with_argument(Argument::new("b", long()).with_default(DefaultValue::Value("0".into())))
            .with_argument(Argument::new("c", long()).optional().with_extended_attributes(default_attr))
            .with_argument(Argument::new("d", long()).optional())
            .with_argument(Argument::new("rest", long()).variadic());
        assert_eq!(op.required_argument_count(), 3);
        assert!(op.is_variadic());
        assert!(!op.arguments[1].is_effectively_optional());
        assert!(op.arguments[3].is_effectively_optional());
    }

    #[test]
    fn placeholder_names_cover_every_shape() {
        let names: Vec<_> = SpecialShape::ALL.iter().map(|s| s.placeholder_name()).collect();
        assert_eq!(names.len(), 6);
        assert!(names.contains(&"anonymousIndexedGetter"));
        assert!(names.contains(&"anonymousNamedDeleter"));
        assert!(SpecialShape::IndexedSetter.is_indexed());
        assert!(!SpecialShape::NamedSetter.is_indexed());
    }

    #[test]
    fn interface_deserializes_from_json() {
        let json = r#"{
            "name": "NodeList",
            "parent": null,
            "attributes": [{"name": "length", "idl_type": "unsigned long", "is_read_only": true}],
            "operations": [{
                "name": "item",
                "return_type": "Node?",
                "specials": "GETTER",
                "arguments": [{"name": "index", "idl_type": "unsigned long"}]
            }],
            "extended_attributes": [{"name": "CheckSecurity"}]
        }"#;
        let iface: Interface = serde_json::from_str(json).unwrap();
        assert_eq!(iface.name, "NodeList");
        assert!(iface.attributes[0].is_read_only);
        assert_eq!(iface.operations[0].specials, Specials::GETTER);
        assert_eq!(iface.operations[0].return_type, Some(IdlType::named("Node").nullable()));
        assert!(iface.attribute("length").is_some());
        assert!(iface.attribute("missing").is_none());
    }
}
