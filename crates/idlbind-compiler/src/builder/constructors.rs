//! Constructor and constant descriptors.

use idlbind_core::{
    AccessorScope, CallWith, CompileWarning, Constant, IdlType, Interface, MemberFlags, Operation,
    Reflect,
};
use serde::Serialize;

use super::methods::{
    ArgumentDescriptor, NativeEntry, argument_needs_exception_state, native_entries,
    required_argument_count,
};
use crate::classify::classify;
use crate::coercion::{ArgumentFacts, CoercionFlags, argument_coercion};
use crate::context::CompilationContext;
use crate::dependencies::Dependencies;
use crate::overload::{OverloadInfo, Signature, resolve_overloads};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ConstructorDescriptor {
    pub arguments: Vec<ArgumentDescriptor>,
    pub number_of_arguments: usize,
    pub number_of_required_arguments: usize,
    pub has_exception_state: bool,
    pub is_raises_exception: bool,
    /// `[ConstructorCallWith]` contexts passed ahead of the arguments.
    pub call_with: CallWith,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub overload: Option<OverloadInfo>,
    pub native_entries: Vec<NativeEntry>,
}

/// Argument of a hand-written constructor: only what the resolver needs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CustomConstructorArgument {
    pub name: String,
    pub idl_type: IdlType,
}

/// `[CustomConstructor]` entry point. The body is native code, so there is
/// no coercion or exception-state analysis.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CustomConstructorDescriptor {
    pub arguments: Vec<CustomConstructorArgument>,
    pub number_of_arguments: usize,
    pub number_of_required_arguments: usize,
    pub native_entries: Vec<NativeEntry>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ConstantDescriptor {
    pub name: String,
    /// `[Reflect]` name, or the IDL name.
    pub reflected_name: String,
    /// Literal as emitted; string constants are re-quoted.
    pub value: String,
    pub idl_type: IdlType,
    pub runtime_enabled: Option<String>,
    /// `[PartialInterfaceImplementedAs]` class holding the constant.
    pub implemented_in: Option<String>,
}

fn build_constructor(
    interface: &Interface,
    constructor: &Operation,
    overload: Option<OverloadInfo>,
    ctx: &CompilationContext<'_>,
    deps: &mut Dependencies,
) -> ConstructorDescriptor {
    let iface_attrs = &interface.extended_attributes;
    // Only the explicit `[RaisesException=Constructor]` form applies here.
    let raises =
        matches!(iface_attrs.raises_exception, Some(s) if s.contains(AccessorScope::CONSTRUCTOR));

    let arguments = constructor
        .arguments
        .iter()
        .map(|argument| {
            let info = classify(&argument.idl_type, ctx);
            deps.add_type(&info);
            let mut flags = CoercionFlags::empty();
            flags.set(CoercionFlags::CLAMP, argument.extended_attributes.has(MemberFlags::CLAMP));
            ArgumentDescriptor {
                name: argument.name.clone(),
                index: argument.index,
                idl_type: argument.idl_type.clone(),
                coercion: argument_coercion(&info, &ArgumentFacts::from_argument(argument), flags),
                type_info: info,
                is_strict_type_checking: false,
                is_clamp: flags.contains(CoercionFlags::CLAMP),
                has_event_listener_argument: false,
            }
        })
        .collect();

    ConstructorDescriptor {
        arguments,
        number_of_arguments: constructor.arguments.len(),
        number_of_required_arguments: required_argument_count(&constructor.arguments),
        has_exception_state: raises
            || constructor
                .arguments
                .iter()
                .any(argument_needs_exception_state),
        is_raises_exception: raises,
        call_with: iface_attrs.constructor_call_with,
        overload,
        native_entries: native_entries(&constructor.arguments),
    }
}

/// Constructors in declaration order, with a shared overload resolver when
/// there is more than one.
pub(crate) fn build_constructors(
    interface: &Interface,
    ctx: &CompilationContext<'_>,
    deps: &mut Dependencies,
    warnings: &mut Vec<CompileWarning>,
) -> Vec<ConstructorDescriptor> {
    let signatures: Vec<Signature> = interface
        .constructors
        .iter()
        .map(|c| {
            let mut signature = Signature::from_operation(c, ctx);
            signature.name = "constructor".to_string();
            signature
        })
        .collect();
    let overloads = resolve_overloads(&interface.name, &signatures, warnings);

    interface
        .constructors
        .iter()
        .zip(overloads)
        .map(|(constructor, overload)| build_constructor(interface, constructor, overload, ctx, deps))
        .collect()
}

pub(crate) fn build_custom_constructors(interface: &Interface) -> Vec<CustomConstructorDescriptor> {
    interface
        .custom_constructors
        .iter()
        .map(|constructor| CustomConstructorDescriptor {
            arguments: constructor
                .arguments
                .iter()
                .map(|argument| CustomConstructorArgument {
                    name: argument.name.clone(),
                    idl_type: argument.idl_type.clone(),
                })
                .collect(),
            number_of_arguments: constructor.arguments.len(),
            number_of_required_arguments: required_argument_count(&constructor.arguments),
            native_entries: native_entries(&constructor.arguments),
        })
        .collect()
}

/// `[NamedConstructor]`, built from the first declared constructor.
pub(crate) fn build_named_constructor(
    interface: &Interface,
    ctx: &CompilationContext<'_>,
    deps: &mut Dependencies,
) -> Option<ConstructorDescriptor> {
    interface.extended_attributes.named_constructor.as_ref()?;
    let first = interface.constructors.first()?;
    Some(build_constructor(interface, first, None, ctx, deps))
}

/// Value of the interface object's `length` property.
pub fn interface_length(interface: &Interface, constructors: &[ConstructorDescriptor]) -> usize {
    if interface
        .extended_attributes
        .has(MemberFlags::EVENT_CONSTRUCTOR)
    {
        return 1;
    }
    constructors
        .iter()
        .map(|c| c.number_of_required_arguments)
        .min()
        .unwrap_or(0)
}

pub(crate) fn build_constant(constant: &Constant) -> ConstantDescriptor {
    let attrs = &constant.extended_attributes;
    let value = if constant.idl_type.inner() == &IdlType::DomString {
        format!("\"{}\"", constant.value)
    } else {
        constant.value.clone()
    };
    let reflected_name = match &attrs.reflect {
        Some(Reflect::Named(name)) => name.clone(),
        _ => constant.name.clone(),
    };
    ConstantDescriptor {
        name: constant.name.clone(),
        reflected_name,
        value,
        idl_type: constant.idl_type.clone(),
        runtime_enabled: attrs.runtime_enabled.clone(),
        implemented_in: attrs.partial_interface_implemented_as.clone(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use idlbind_core::{
        Argument, CompilerConfig, ExtendedAttributes, NumericKind, RawExtendedAttribute,
    };
    use idlbind_registry::InterfaceRegistry;

    fn ext(raw: Vec<RawExtendedAttribute>) -> ExtendedAttributes {
        ExtendedAttributes::from_raw(raw).unwrap()
    }

    fn constructors(interface: &Interface) -> (Vec<ConstructorDescriptor>, Vec<CompileWarning>) {
        let registry = InterfaceRegistry::new();
        let config = CompilerConfig::default();
        let ctx = CompilationContext::new(&registry, &config);
        let mut deps = Dependencies::new();
        let mut warnings = Vec::new();
        let built = build_constructors(interface, &ctx, &mut deps, &mut warnings);
        (built, warnings)
    }

    #[test]
    fn single_constructor_has_no_overload() {
        let iface = Interface::new("Blob").with_constructor(
            Operation::constructor().with_argument(Argument::new("parts", IdlType::DomString).optional()),
        );
        let (built, _) = constructors(&iface);
        assert_eq!(built.len(), 1);
        assert!(built[0].overload.is_none());
        assert_eq!(built[0].number_of_required_arguments, 0);
        assert_eq!(interface_length(&iface, &built), 0);
    }

    #[test]
    fn multiple_constructors_share_resolver() {
        let iface = Interface::new("Image")
            .with_constructor(Operation::constructor())
            .with_constructor(Operation::constructor().with_argument(Argument::new(
                "width",
                IdlType::Numeric(NumericKind::UnsignedLong),
            )));
        let (built, warnings) = constructors(&iface);
        assert_eq!(built[0].overload.as_ref().unwrap().overload_index, 1);
        let last = built[1].overload.as_ref().unwrap();
        assert_eq!(last.overload_index, 2);
        assert_eq!(last.group.as_ref().unwrap().minimum_required_arguments, 0);
        assert!(warnings.is_empty());
        assert!(built[1].has_exception_state);
        assert_eq!(interface_length(&iface, &built), 0);
    }

    #[test]
    fn raises_exception_constructor() {
        let iface = Interface::new("Worker")
            .with_extended_attributes(ext(vec![
                RawExtendedAttribute::single("RaisesException", "Constructor"),
                RawExtendedAttribute::single("ConstructorCallWith", "ExecutionContext"),
            ]))
            .with_constructor(
                Operation::constructor().with_argument(Argument::new("url", IdlType::DomString)),
            );
        let (built, _) = constructors(&iface);
        assert!(built[0].is_raises_exception);
        assert!(built[0].has_exception_state);
        assert_eq!(built[0].call_with, CallWith::EXECUTION_CONTEXT);
        assert_eq!(interface_length(&iface, &built), 1);
    }

    #[test]
    fn bare_raises_exception_does_not_mark_constructor() {
        let iface = Interface::new("Foo")
            .with_extended_attributes(ext(vec![RawExtendedAttribute::bare("RaisesException")]))
            .with_constructor(Operation::constructor());
        let (built, _) = constructors(&iface);
        assert!(!built[0].is_raises_exception);
    }

    #[test]
    fn event_constructor_length_is_one() {
        let iface = Interface::new("CustomEvent")
            .with_extended_attributes(ext(vec![RawExtendedAttribute::bare("EventConstructor")]));
        assert_eq!(interface_length(&iface, &[]), 1);
    }

    #[test]
    fn named_constructor_uses_first_constructor() {
        let registry = InterfaceRegistry::new();
        let config = CompilerConfig::default();
        let ctx = CompilationContext::new(&registry, &config);
        let mut deps = Dependencies::new();

        let iface = Interface::new("HTMLImageElement")
            .with_extended_attributes(ext(vec![RawExtendedAttribute::single("NamedConstructor", "Image")]))
            .with_constructor(
                Operation::constructor()
                    .with_argument(Argument::new("w", IdlType::Numeric(NumericKind::UnsignedLong)).optional()),
            );
        let named = build_named_constructor(&iface, &ctx, &mut deps).unwrap();
        assert_eq!(named.number_of_arguments, 1);
        assert!(named.overload.is_none());

        let plain = Interface::new("Foo").with_constructor(Operation::constructor());
        assert!(build_named_constructor(&plain, &ctx, &mut deps).is_none());
    }

    #[test]
    fn custom_constructors_keep_signature_only() {
        let iface = Interface::new("Audio")
            .with_custom_constructor(Operation::constructor())
            .with_custom_constructor(
                Operation::constructor()
                    .with_argument(Argument::new("src", IdlType::DomString))
                    .with_argument(Argument::new("volume", IdlType::Numeric(NumericKind::Double)).optional()),
            );
        let built = build_custom_constructors(&iface);
        assert_eq!(built.len(), 2);
        assert_eq!(built[0].number_of_arguments, 0);
        assert_eq!(built[1].number_of_arguments, 2);
        assert_eq!(built[1].number_of_required_arguments, 1);
        assert_eq!(built[1].arguments[0].name, "src");
        let counts: Vec<_> = built[1].native_entries.iter().map(|e| e.argument_count).collect();
        assert_eq!(counts, vec![1, 2]);
    }

    #[test]
    fn constants_requote_strings_and_reflect() {
        let c = build_constant(&Constant::new("NAME", IdlType::DomString, "hello"));
        assert_eq!(c.value, "\"hello\"");
        assert_eq!(c.reflected_name, "NAME");

        let c = build_constant(
            &Constant::new("ELEMENT_NODE", IdlType::Numeric(NumericKind::UnsignedShort), "1")
                .with_extended_attributes(ext(vec![RawExtendedAttribute::single("Reflect", "ELEMENT")])),
        );
        assert_eq!(c.value, "1");
        assert_eq!(c.reflected_name, "ELEMENT");
    }
}
