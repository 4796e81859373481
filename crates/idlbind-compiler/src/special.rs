//! Special-operation extraction.
//!
//! Indexed and named property getters, setters and deleters are recognized
//! by shape:
//!
//! | Shape           | Tag      | Arguments                      |
//! |-----------------|----------|--------------------------------|
//! | indexed getter  | getter   | `(unsigned long)`              |
//! | indexed setter  | setter   | `(unsigned long, T)`           |
//! | indexed deleter | deleter  | `(unsigned long)` → `boolean`  |
//! | named getter    | getter   | `(DOMString)`                  |
//! | named setter    | setter   | `(DOMString, T)`               |
//! | named deleter   | deleter  | `(DOMString)` → `boolean`      |
//!
//! Operations are scanned once. When several operations match a shape, the
//! first in declaration order is kept and a
//! [`CompileWarning::AmbiguousSpecialOperation`] is recorded. A deleter of
//! either kind with a non-boolean return type is a fatal error.

use std::fmt;

use idlbind_core::{
    CompileError, CompileWarning, CustomTargets, IdlType, Interface, MemberFlags, NumericKind,
    Operation, SpecialShape, Specials,
};
use serde::Serialize;
use tracing::{debug, warn};

use crate::classify::{TypeInfo, classify};
use crate::coercion::{
    ArgumentCoercion, ArgumentFacts, CoercionFlags, ReturnCoercion, argument_coercion,
    return_coercion,
};
use crate::context::CompilationContext;
use crate::dependencies::Dependencies;

// ============================================================================
// Descriptors
// ============================================================================

/// Test for "the getter produced nothing".
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "flags", rename_all = "snake_case")]
pub enum NullCheck {
    /// The result category has no null state.
    None,
    /// Identity types: null reference.
    NullReference,
    /// Strings: the null-string sentinel.
    NullString,
    /// Unions: every per-member enabled flag is false.
    AllArmsDisabled(Vec<String>),
}

impl NullCheck {
    pub fn for_type(info: &TypeInfo) -> Self {
        if info.is_union() {
            NullCheck::AllArmsDisabled(
                (0..info.members.len())
                    .map(|i| format!("result{i}Enabled"))
                    .collect(),
            )
        } else if info.is_string() {
            NullCheck::NullString
        } else if info.is_interface_like() {
            NullCheck::NullReference
        } else {
            NullCheck::None
        }
    }

    /// Number of conjuncts in the rendered expression.
    pub fn term_count(&self) -> usize {
        match self {
            NullCheck::None => 0,
            NullCheck::NullReference | NullCheck::NullString => 1,
            NullCheck::AllArmsDisabled(flags) => flags.len(),
        }
    }
}

impl fmt::Display for NullCheck {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NullCheck::None => Ok(()),
            NullCheck::NullReference => f.write_str("!result"),
            NullCheck::NullString => f.write_str("result.isNull()"),
            NullCheck::AllArmsDisabled(flags) => {
                for (i, flag) in flags.iter().enumerate() {
                    if i > 0 {
                        f.write_str(" && ")?;
                    }
                    write!(f, "!{flag}")?;
                }
                Ok(())
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PropertyGetter {
    pub name: String,
    pub native_name: String,
    /// Native name of the key argument (`index` or `propertyName`).
    pub key: &'static str,
    pub return_value: Option<ReturnCoercion>,
    pub is_custom: bool,
    pub is_custom_property_enumerator: bool,
    pub is_custom_property_query: bool,
    pub is_enumerable: bool,
    pub is_raises_exception: bool,
    pub is_null: NullCheck,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PropertySetter {
    pub name: String,
    pub native_name: String,
    pub key: &'static str,
    pub value_type: IdlType,
    pub value: ArgumentCoercion,
    pub is_custom: bool,
    pub has_strict_type_checking: bool,
    pub has_exception_state: bool,
    pub is_raises_exception: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PropertyDeleter {
    pub name: String,
    pub native_name: String,
    pub key: &'static str,
    pub is_custom: bool,
    pub is_raises_exception: bool,
}

/// At most one descriptor per shape. Absent shapes are `None`, never an
/// empty placeholder.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SpecialOperations {
    pub indexed_getter: Option<PropertyGetter>,
    pub indexed_setter: Option<PropertySetter>,
    pub indexed_deleter: Option<PropertyDeleter>,
    pub named_getter: Option<PropertyGetter>,
    pub named_setter: Option<PropertySetter>,
    pub named_deleter: Option<PropertyDeleter>,
}

impl SpecialOperations {
    pub fn is_empty(&self) -> bool {
        self.indexed_getter.is_none()
            && self.indexed_setter.is_none()
            && self.indexed_deleter.is_none()
            && self.named_getter.is_none()
            && self.named_setter.is_none()
            && self.named_deleter.is_none()
    }

    /// Name of the operation kept for `shape`.
    pub fn name_of(&self, shape: SpecialShape) -> Option<&str> {
        match shape {
            SpecialShape::IndexedGetter => self.indexed_getter.as_ref().map(|g| g.name.as_str()),
            SpecialShape::IndexedSetter => self.indexed_setter.as_ref().map(|s| s.name.as_str()),
            SpecialShape::IndexedDeleter => self.indexed_deleter.as_ref().map(|d| d.name.as_str()),
            SpecialShape::NamedGetter => self.named_getter.as_ref().map(|g| g.name.as_str()),
            SpecialShape::NamedSetter => self.named_setter.as_ref().map(|s| s.name.as_str()),
            SpecialShape::NamedDeleter => self.named_deleter.as_ref().map(|d| d.name.as_str()),
        }
    }
}

// ============================================================================
// Shape recognition
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum KeyKind {
    Index,
    Name,
}

fn key_kind(ty: &IdlType) -> Option<KeyKind> {
    match ty {
        IdlType::Numeric(NumericKind::UnsignedLong) => Some(KeyKind::Index),
        IdlType::DomString => Some(KeyKind::Name),
        _ => None,
    }
}

/// Every shape `op` matches. An operation tagged both getter and deleter
/// can match two shapes.
fn shapes_of(op: &Operation) -> Vec<SpecialShape> {
    let mut shapes = Vec::new();
    let Some(key) = op.arguments.first().and_then(|a| key_kind(&a.idl_type)) else {
        return shapes;
    };
    let indexed = key == KeyKind::Index;
    let arity = op.arguments.len();

    if op.specials.contains(Specials::GETTER) && arity == 1 {
        shapes.push(if indexed {
            SpecialShape::IndexedGetter
        } else {
            SpecialShape::NamedGetter
        });
    }
    if op.specials.contains(Specials::SETTER) && arity == 2 {
        shapes.push(if indexed {
            SpecialShape::IndexedSetter
        } else {
            SpecialShape::NamedSetter
        });
    }
    if op.specials.contains(Specials::DELETER) && arity == 1 {
        shapes.push(if indexed {
            SpecialShape::IndexedDeleter
        } else {
            SpecialShape::NamedDeleter
        });
    }
    shapes
}

fn shape_slot(shape: SpecialShape) -> usize {
    SpecialShape::ALL
        .iter()
        .position(|s| *s == shape)
        .unwrap_or_default()
}

fn display_name(op: &Operation, shape: SpecialShape) -> String {
    if op.is_anonymous() {
        shape.placeholder_name().to_string()
    } else {
        op.name.clone()
    }
}

fn native_name(op: &Operation, name: &str) -> String {
    op.extended_attributes
        .implemented_as
        .clone()
        .unwrap_or_else(|| name.to_string())
}

fn key_name(shape: SpecialShape) -> &'static str {
    if shape.is_indexed() {
        "index"
    } else {
        "propertyName"
    }
}

// ============================================================================
// Extraction
// ============================================================================

/// Scan `interface.operations` for special operations.
#[cfg_attr(feature = "profiling", profiling::function)]
pub fn extract_special_operations(
    interface: &Interface,
    ctx: &CompilationContext<'_>,
    deps: &mut Dependencies,
    warnings: &mut Vec<CompileWarning>,
) -> Result<SpecialOperations, CompileError> {
    let mut candidates: [Vec<&Operation>; 6] = Default::default();
    for op in &interface.operations {
        for shape in shapes_of(op) {
            candidates[shape_slot(shape)].push(op);
        }
    }

    let mut result = SpecialOperations::default();
    for shape in SpecialShape::ALL {
        let found = &candidates[shape_slot(shape)];
        let Some(first) = found.first() else {
            continue;
        };

        if matches!(shape, SpecialShape::IndexedDeleter | SpecialShape::NamedDeleter) {
            for op in found {
                check_deleter_return(interface, op, shape)?;
            }
        }

        if found.len() > 1 {
            let warning = CompileWarning::AmbiguousSpecialOperation {
                interface: interface.name.clone(),
                shape,
                kept: display_name(first, shape),
                ignored: found[1..].iter().map(|op| display_name(op, shape)).collect(),
            };
            warn!("{warning}");
            warnings.push(warning);
        }

        debug!(
            interface = %interface.name,
            %shape,
            name = %display_name(first, shape),
            "special operation"
        );

        match shape {
            SpecialShape::IndexedGetter => {
                result.indexed_getter = Some(property_getter(first, shape, ctx, deps))
            }
            SpecialShape::NamedGetter => {
                result.named_getter = Some(property_getter(first, shape, ctx, deps))
            }
            SpecialShape::IndexedSetter => {
                result.indexed_setter = Some(property_setter(first, shape, ctx, deps))
            }
            SpecialShape::NamedSetter => {
                result.named_setter = Some(property_setter(first, shape, ctx, deps))
            }
            SpecialShape::IndexedDeleter => {
                result.indexed_deleter = Some(property_deleter(first, shape))
            }
            SpecialShape::NamedDeleter => result.named_deleter = Some(property_deleter(first, shape)),
        }
    }
    Ok(result)
}

fn check_deleter_return(
    interface: &Interface,
    op: &Operation,
    shape: SpecialShape,
) -> Result<(), CompileError> {
    match &op.return_type {
        Some(IdlType::Boolean) => Ok(()),
        other => Err(CompileError::InvalidDeleterReturnType {
            interface: interface.name.clone(),
            member: display_name(op, shape),
            found: other
                .as_ref()
                .map(ToString::to_string)
                .unwrap_or_else(|| "void".to_string()),
        }),
    }
}

fn property_getter(
    op: &Operation,
    shape: SpecialShape,
    ctx: &CompilationContext<'_>,
    deps: &mut Dependencies,
) -> PropertyGetter {
    let attrs = &op.extended_attributes;
    let name = display_name(op, shape);
    let return_type = op.return_type.clone().unwrap_or(IdlType::Void);
    let info = classify(&return_type, ctx);
    deps.add_type(&info);

    PropertyGetter {
        native_name: native_name(op, &name),
        name,
        key: key_name(shape),
        return_value: return_coercion(&info, true),
        is_custom: matches!(attrs.custom, Some(t) if t.is_empty())
            || attrs.names_custom(CustomTargets::PROPERTY_GETTER),
        is_custom_property_enumerator: attrs.names_custom(CustomTargets::PROPERTY_ENUMERATOR),
        is_custom_property_query: attrs.names_custom(CustomTargets::PROPERTY_QUERY),
        is_enumerable: !attrs.has(MemberFlags::NOT_ENUMERABLE),
        is_raises_exception: attrs.raises_exception.is_some(),
        is_null: NullCheck::for_type(&info),
    }
}

fn property_setter(
    op: &Operation,
    shape: SpecialShape,
    ctx: &CompilationContext<'_>,
    deps: &mut Dependencies,
) -> PropertySetter {
    let attrs = &op.extended_attributes;
    let name = display_name(op, shape);
    // Shape recognition guarantees two arguments.
    let value_arg = &op.arguments[1];
    let info = classify(&value_arg.idl_type, ctx);
    deps.add_type(&info);

    let strict = attrs.has(MemberFlags::STRICT_TYPE_CHECKING);
    let mut flags = CoercionFlags::empty();
    flags.set(CoercionFlags::STRICT, strict);
    flags.set(
        CoercionFlags::CLAMP,
        value_arg.extended_attributes.has(MemberFlags::CLAMP),
    );
    let raises = attrs.raises_exception.is_some();

    PropertySetter {
        native_name: native_name(op, &name),
        name,
        key: key_name(shape),
        value_type: value_arg.idl_type.clone(),
        value: argument_coercion(&info, &ArgumentFacts::required(), flags),
        is_custom: attrs.custom.is_some(),
        has_strict_type_checking: strict && info.is_wrapper(),
        has_exception_state: raises || info.is_integer(),
        is_raises_exception: raises,
    }
}

fn property_deleter(op: &Operation, shape: SpecialShape) -> PropertyDeleter {
    let attrs = &op.extended_attributes;
    let name = display_name(op, shape);
    PropertyDeleter {
        native_name: native_name(op, &name),
        name,
        key: key_name(shape),
        is_custom: attrs.custom.is_some(),
        is_raises_exception: attrs.raises_exception.is_some(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use idlbind_core::{
        Argument, CompilerConfig, ExtendedAttributes, RawExtendedAttribute,
    };
    use idlbind_registry::InterfaceRegistry;

    fn index() -> Argument {
        Argument::new("index", IdlType::Numeric(NumericKind::UnsignedLong))
    }

    fn name_key() -> Argument {
        Argument::new("name", IdlType::DomString)
    }

    fn registry() -> InterfaceRegistry {
        let mut r = InterfaceRegistry::new();
        r.register_interface(Interface::new("Node")).unwrap();
        r
    }

    fn extract(
        iface: &Interface,
    ) -> Result<(SpecialOperations, Vec<CompileWarning>, Dependencies), CompileError> {
        let registry = registry();
        let config = CompilerConfig::default();
        let ctx = CompilationContext::new(&registry, &config);
        let mut deps = Dependencies::new();
        let mut warnings = Vec::new();
        let ops = extract_special_operations(iface, &ctx, &mut deps, &mut warnings)?;
        Ok((ops, warnings, deps))
    }

    #[test]
    fn indexed_getter_without_setter() {
        let iface = Interface::new("NodeList").with_operation(
            Operation::new("item", IdlType::named("Node"))
                .with_specials(Specials::GETTER)
                .with_argument(index()),
        );
        let (ops, warnings, deps) = extract(&iface).unwrap();
        let getter = ops.indexed_getter.as_ref().unwrap();
        assert_eq!(getter.name, "item");
        assert_eq!(getter.key, "index");
        assert_eq!(getter.is_null, NullCheck::NullReference);
        assert!(getter.is_enumerable);
        assert!(ops.indexed_setter.is_none());
        assert!(ops.named_getter.is_none());
        assert!(warnings.is_empty());
        assert!(deps.contains(&crate::dependencies::Dependency::Interface("Node".into())));
    }

    #[test]
    fn anonymous_operations_get_placeholder_names() {
        let iface = Interface::new("Storage")
            .with_operation(
                Operation::new("", IdlType::DomString.nullable())
                    .with_specials(Specials::GETTER)
                    .with_argument(name_key()),
            )
            .with_operation(
                Operation::new("", IdlType::Void)
                    .with_specials(Specials::SETTER)
                    .with_argument(name_key())
                    .with_argument(Argument::new("value", IdlType::DomString)),
            )
            .with_operation(
                Operation::new("", IdlType::Boolean)
                    .with_specials(Specials::DELETER)
                    .with_argument(name_key()),
            );
        let (ops, _, _) = extract(&iface).unwrap();
        assert_eq!(ops.name_of(SpecialShape::NamedGetter), Some("anonymousNamedGetter"));
        assert_eq!(ops.name_of(SpecialShape::NamedSetter), Some("anonymousNamedSetter"));
        assert_eq!(ops.name_of(SpecialShape::NamedDeleter), Some("anonymousNamedDeleter"));
        assert_eq!(ops.named_getter.unwrap().is_null, NullCheck::NullString);
        assert_eq!(ops.named_setter.unwrap().key, "propertyName");
    }

    #[test]
    fn non_boolean_deleter_is_fatal() {
        let iface = Interface::new("Storage").with_operation(
            Operation::new("removeItem", IdlType::Void)
                .with_specials(Specials::DELETER)
                .with_argument(name_key()),
        );
        let err = extract(&iface).unwrap_err();
        assert_eq!(
            err,
            CompileError::InvalidDeleterReturnType {
                interface: "Storage".into(),
                member: "removeItem".into(),
                found: "void".into(),
            }
        );
    }

    #[test]
    fn ambiguous_shape_keeps_first_and_warns() {
        let iface = Interface::new("HTMLCollection")
            .with_operation(
                Operation::new("item", IdlType::named("Node"))
                    .with_specials(Specials::GETTER)
                    .with_argument(index()),
            )
            .with_operation(
                Operation::new("at", IdlType::named("Node"))
                    .with_specials(Specials::GETTER)
                    .with_argument(index()),
            );
        let (ops, warnings, _) = extract(&iface).unwrap();
        assert_eq!(ops.name_of(SpecialShape::IndexedGetter), Some("item"));
        assert_eq!(warnings.len(), 1);
        assert!(matches!(
            &warnings[0],
            CompileWarning::AmbiguousSpecialOperation { kept, ignored, shape: SpecialShape::IndexedGetter, .. }
                if kept == "item" && ignored == &vec!["at".to_string()]
        ));
    }

    #[test]
    fn wrong_arity_or_key_type_is_not_special() {
        let iface = Interface::new("Odd")
            .with_operation(
                Operation::new("get", IdlType::named("Node"))
                    .with_specials(Specials::GETTER)
                    .with_argument(Argument::new("i", IdlType::Numeric(NumericKind::Long))),
            )
            .with_operation(
                Operation::new("set", IdlType::Void)
                    .with_specials(Specials::SETTER)
                    .with_argument(index()),
            );
        let (ops, _, _) = extract(&iface).unwrap();
        assert!(ops.is_empty());
    }

    #[test]
    fn union_getter_null_check_conjoins_every_arm() {
        let union: IdlType = "(Node or DOMString or long)".parse().unwrap();
        let iface = Interface::new("Collection").with_operation(
            Operation::new("namedItem", union)
                .with_specials(Specials::GETTER)
                .with_argument(name_key()),
        );
        let (ops, _, _) = extract(&iface).unwrap();
        let getter = ops.named_getter.unwrap();
        assert_eq!(getter.is_null.term_count(), 3);
        assert_eq!(
            getter.is_null.to_string(),
            "!result0Enabled && !result1Enabled && !result2Enabled"
        );
        assert_eq!(getter.return_value.unwrap().union_slots.len(), 3);
    }

    #[test]
    fn getter_and_setter_metadata() {
        let custom = ExtendedAttributes::from_raw(vec![
            RawExtendedAttribute::single("Custom", "PropertyGetter|PropertyEnumerator"),
            RawExtendedAttribute::bare("NotEnumerable"),
            RawExtendedAttribute::bare("RaisesException"),
        ])
        .unwrap();
        let strict = ExtendedAttributes::from_raw(vec![RawExtendedAttribute::bare(
            "StrictTypeChecking",
        )])
        .unwrap();
        let iface = Interface::new("Options")
            .with_operation(
                Operation::new("item", IdlType::named("Node"))
                    .with_specials(Specials::GETTER)
                    .with_argument(index())
                    .with_extended_attributes(custom),
            )
            .with_operation(
                Operation::new("setItem", IdlType::Void)
                    .with_specials(Specials::SETTER)
                    .with_argument(index())
                    .with_argument(Argument::new("option", IdlType::named("Node")))
                    .with_extended_attributes(strict),
            );
        let (ops, _, _) = extract(&iface).unwrap();
        let getter = ops.indexed_getter.unwrap();
        assert!(getter.is_custom);
        assert!(getter.is_custom_property_enumerator);
        assert!(!getter.is_custom_property_query);
        assert!(!getter.is_enumerable);
        assert!(getter.is_raises_exception);

        let setter = ops.indexed_setter.unwrap();
        assert!(setter.has_strict_type_checking);
        assert!(!setter.has_exception_state);
        assert_eq!(setter.value_type, IdlType::named("Node"));
    }

    #[test]
    fn integer_setter_needs_exception_state() {
        let iface = Interface::new("Int32List").with_operation(
            Operation::new("set", IdlType::Void)
                .with_specials(Specials::SETTER)
                .with_argument(index())
                .with_argument(Argument::new("v", IdlType::Numeric(NumericKind::Long))),
        );
        let (ops, _, _) = extract(&iface).unwrap();
        assert!(ops.indexed_setter.unwrap().has_exception_state);
    }
}
