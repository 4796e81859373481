//! Attribute descriptors.
//!
//! ## Accessor names
//!
//! | Attribute                  | Getter                         | Setter                          |
//! |----------------------------|--------------------------------|---------------------------------|
//! | plain                      | `uncapitalize(native)`         | `set` + `capitalize(native)`    |
//! | `[Reflect]` class/id/name  | `get<Name>Attribute`           | `setAttribute`                  |
//! | `[Reflect]` boolean        | `hasAttribute`                 | `setBooleanAttribute`           |
//! | `[Reflect]` long           | `getIntegralAttribute`         | `setIntegralAttribute`          |
//! | `[Reflect]` unsigned long  | `getUnsignedIntegralAttribute` | `setUnsignedIntegralAttribute`  |
//! | `[Reflect] [URL]`          | `getURLAttribute`              | `setAttribute`                  |
//! | other `[Reflect]`          | `getAttribute`                 | `setAttribute`                  |
//!
//! The native name is `[ImplementedAs]` or the IDL name. Reflected accessors
//! other than the class/id/name getters take the scoped content attribute
//! name as their first argument.

use idlbind_core::{
    AccessorScope, Attribute, CallWith, CompileError, CustomTargets, IdlType, Interface,
    MemberFlags, NumericKind, Reflect, TypeChecking,
};
use serde::Serialize;

use super::suppression::AttributeSuppression;
use super::{AccessControl, PropertyAttributes, capitalize, inherits, uncapitalize, world_suffixes};
use crate::classify::{TypeInfo, classify};
use crate::coercion::{
    ArgumentCoercion, ArgumentFacts, CoercionFlags, ReturnCoercion, argument_coercion,
    return_coercion,
};
use crate::context::CompilationContext;
use crate::dependencies::{ContentNamespace, Dependencies, Dependency};

// ============================================================================
// Descriptors
// ============================================================================

/// Reflected content attribute, e.g. `HTMLNames::valueAttr`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ContentAttribute {
    pub namespace: ContentNamespace,
    pub name: String,
}

impl ContentAttribute {
    pub fn scoped_name(&self) -> String {
        format!("{}::{}Attr", self.namespace.as_str(), self.name)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SetterCallback {
    /// Read-only: assignments are ignored.
    None,
    Default,
    /// `[Replaceable]` and constructor attributes shadow on assignment.
    Replaceable,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AttributeGetter {
    pub native_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content_attribute: Option<ContentAttribute>,
    pub is_custom: bool,
    /// The native result is stored in a local before boxing.
    pub uses_result_local: bool,
    /// The native getter reports nullness through an `isNull` out-argument.
    pub passes_is_null: bool,
    pub is_raises_exception: bool,
    pub call_with: CallWith,
    pub return_value: Option<ReturnCoercion>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AttributeSetter {
    pub native_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content_attribute: Option<ContentAttribute>,
    pub is_custom: bool,
    pub value_type: IdlType,
    pub value: ArgumentCoercion,
    /// `[PutForwards]` target attribute on the value's interface.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub forwards_to: Option<String>,
    pub is_raises_exception: bool,
    pub has_strict_type_checking: bool,
    pub has_exception_state: bool,
    pub call_with: CallWith,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AttributeDescriptor {
    pub name: String,
    pub native_name: String,
    pub idl_type: IdlType,
    pub type_info: TypeInfo,
    pub is_static: bool,
    /// Declared read-only, or writable with its setter suppressed.
    pub is_read_only: bool,
    pub is_nullable: bool,
    pub getter: Option<AttributeGetter>,
    pub setter: Option<AttributeSetter>,
    pub setter_callback: SetterCallback,
    pub access_control: AccessControl,
    pub property_attributes: PropertyAttributes,
    pub is_keep_alive_for_gc: bool,
    pub is_reflect: bool,
    pub reflect_only: Option<Vec<String>>,
    pub reflect_empty: Option<String>,
    pub reflect_invalid: Option<String>,
    pub reflect_missing: Option<String>,
    pub cached_attribute: Option<String>,
    pub is_replaceable: bool,
    pub is_expose_js_accessors: bool,
    pub is_per_world_bindings: bool,
    pub is_unforgeable: bool,
    pub is_check_security_for_node: bool,
    pub is_custom_element_callbacks: bool,
    pub is_initialized_by_event_constructor: bool,
    pub is_partial_interface_member: bool,
    pub is_url: bool,
    pub runtime_enabled: Option<String>,
    pub per_context_enabled: Option<String>,
    pub conditional: Option<String>,
    pub measure_as: Option<String>,
    pub deprecate_as: Option<String>,
    pub world_suffixes: Vec<&'static str>,
}

/// Attribute whose type names an interface object, e.g. `FooConstructor`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ConstructorAttribute {
    pub name: String,
    /// Type name with the `Constructor` suffix stripped.
    pub constructor_type: String,
    pub needs_getter_callback: bool,
    pub measure_as: Option<String>,
    pub deprecate_as: Option<String>,
    pub runtime_enabled: Option<String>,
}

// ============================================================================
// Construction
// ============================================================================

const CONSTRUCTOR_SUFFIX: &str = "Constructor";

pub fn is_constructor_attribute(attribute: &Attribute) -> bool {
    attribute.idl_type.base_name().ends_with(CONSTRUCTOR_SUFFIX)
}

pub(crate) fn constructor_attribute(attribute: &Attribute) -> ConstructorAttribute {
    let attrs = &attribute.extended_attributes;
    let base = attribute.idl_type.base_name();
    ConstructorAttribute {
        name: attribute.name.clone(),
        constructor_type: base
            .strip_suffix(CONSTRUCTOR_SUFFIX)
            .unwrap_or(&base)
            .to_string(),
        needs_getter_callback: attrs.measure_as.is_some() || attrs.deprecate_as.is_some(),
        measure_as: attrs.measure_as.clone(),
        deprecate_as: attrs.deprecate_as.clone(),
        runtime_enabled: attrs.runtime_enabled.clone(),
    }
}

fn native_name(attribute: &Attribute) -> String {
    attribute
        .extended_attributes
        .implemented_as
        .clone()
        .unwrap_or_else(|| attribute.name.clone())
}

fn content_attribute(interface: &Interface, attribute: &Attribute) -> Option<ContentAttribute> {
    let name = match attribute.extended_attributes.reflect.as_ref()? {
        Reflect::SameName => attribute.name.to_lowercase(),
        Reflect::Named(name) => name.clone(),
    };
    Some(ContentAttribute {
        namespace: ContentNamespace::for_interface(&interface.name),
        name,
    })
}

fn reflected_getter_name(attribute: &Attribute, content: &ContentAttribute) -> String {
    match content.name.as_str() {
        "class" | "id" | "name" => format!("get{}Attribute", capitalize(&content.name)),
        _ => match attribute.idl_type.inner() {
            IdlType::Boolean => "hasAttribute".into(),
            IdlType::Numeric(NumericKind::Long) => "getIntegralAttribute".into(),
            IdlType::Numeric(NumericKind::UnsignedLong) => "getUnsignedIntegralAttribute".into(),
            _ if attribute.extended_attributes.has(MemberFlags::URL) => "getURLAttribute".into(),
            _ => "getAttribute".into(),
        },
    }
}

fn reflected_setter_name(attribute: &Attribute) -> String {
    match attribute.idl_type.inner() {
        IdlType::Boolean => "setBooleanAttribute".into(),
        IdlType::Numeric(NumericKind::Long) => "setIntegralAttribute".into(),
        IdlType::Numeric(NumericKind::UnsignedLong) => "setUnsignedIntegralAttribute".into(),
        _ => "setAttribute".into(),
    }
}

/// Content attributes passed to a reflected getter; the class/id/name fast
/// paths take none.
fn getter_content_argument(content: &ContentAttribute) -> Option<ContentAttribute> {
    match content.name.as_str() {
        "class" | "id" | "name" => None,
        _ => Some(content.clone()),
    }
}

fn is_keep_alive_for_gc(
    interface: &Interface,
    attribute: &Attribute,
    info: &TypeInfo,
    ctx: &CompilationContext<'_>,
) -> bool {
    let base = info.base_name.as_str();
    attribute.is_read_only
        && info.is_wrapper()
        && !(inherits(interface, "Node", ctx)
            || ctx.registry.inherits_interface(base, "Node")
            || attribute.name == "self"
            || matches!(base, "EventTarget" | "Window")
            || base.starts_with("HTML")
            || base.starts_with("SVG"))
}

fn access_control(attribute: &Attribute) -> AccessControl {
    let attrs = &attribute.extended_attributes;
    let mut acl = AccessControl::empty();
    if let Some(scope) = attrs.do_not_check_security {
        if scope.contains(AccessorScope::SETTER) {
            acl |= AccessControl::ALL_CAN_WRITE;
        } else {
            acl |= AccessControl::ALL_CAN_READ;
            if !attribute.is_read_only || attrs.has(MemberFlags::REPLACEABLE) {
                acl |= AccessControl::ALL_CAN_WRITE;
            }
        }
    }
    if attrs.has(MemberFlags::UNFORGEABLE) {
        acl |= AccessControl::PROHIBITS_OVERWRITING;
    }
    acl
}

fn property_attributes(attribute: &Attribute) -> PropertyAttributes {
    let attrs = &attribute.extended_attributes;
    let mut flags = PropertyAttributes::empty();
    flags.set(PropertyAttributes::DONT_ENUM, attrs.has(MemberFlags::NOT_ENUMERABLE));
    flags.set(PropertyAttributes::DONT_DELETE, attrs.has(MemberFlags::UNFORGEABLE));
    flags
}

fn build_getter(
    interface: &Interface,
    attribute: &Attribute,
    info: &TypeInfo,
) -> AttributeGetter {
    let attrs = &attribute.extended_attributes;
    let raises = attrs.raises_for(AccessorScope::GETTER);
    let is_event_handler = info.base_name == "EventHandler";

    let uses_result_local = info.nullable
        || is_event_handler
        || attrs.cached_attribute.is_some()
        || attrs.reflect_only.is_some()
        || raises;
    let release = uses_result_local && !is_event_handler && info.is_interface_like();

    let type_checks_nullable = (interface.extended_attributes.type_checking
        | attrs.type_checking)
        .contains(TypeChecking::NULLABLE)
        && info.is_wrapper();

    let (native_name, content_attribute) = match content_attribute(interface, attribute) {
        Some(content) => (
            reflected_getter_name(attribute, &content),
            getter_content_argument(&content),
        ),
        None => (uncapitalize(&native_name(attribute)), None),
    };

    AttributeGetter {
        native_name,
        content_attribute,
        is_custom: attrs.is_custom_for(CustomTargets::GETTER),
        uses_result_local,
        passes_is_null: info.nullable && !type_checks_nullable,
        is_raises_exception: raises,
        call_with: attrs.call_with,
        return_value: return_coercion(info, release),
    }
}

fn build_setter(
    interface: &Interface,
    attribute: &Attribute,
    ctx: &CompilationContext<'_>,
    deps: &mut Dependencies,
) -> Result<AttributeSetter, CompileError> {
    let attrs = &attribute.extended_attributes;

    // [PutForwards] assigns through to an attribute of the value's interface.
    let target = match &attrs.put_forwards {
        Some(target_name) => Some(put_forwards_target(interface, attribute, target_name, ctx)?),
        None => None,
    };
    let source = target.unwrap_or(attribute);
    let info = classify(&source.idl_type, ctx);
    deps.add_type(&info);

    let strict_flag = attrs.has(MemberFlags::STRICT_TYPE_CHECKING)
        || interface
            .extended_attributes
            .has(MemberFlags::STRICT_TYPE_CHECKING);
    let has_strict_type_checking = strict_flag && info.is_wrapper();
    let raises = attrs.raises_for(AccessorScope::SETTER);

    let mut flags = CoercionFlags::empty();
    flags.set(CoercionFlags::STRICT, strict_flag);
    flags.set(CoercionFlags::CLAMP, source.extended_attributes.has(MemberFlags::CLAMP));

    let (native_name, content_attribute) = match content_attribute(interface, source) {
        Some(content) => (reflected_setter_name(source), Some(content)),
        None => (format!("set{}", capitalize(&native_name(source))), None),
    };

    Ok(AttributeSetter {
        native_name,
        content_attribute,
        is_custom: !attribute.is_read_only && attrs.is_custom_for(CustomTargets::SETTER),
        value_type: source.idl_type.clone(),
        value: argument_coercion(&info, &ArgumentFacts::required(), flags),
        forwards_to: target.map(|t| t.name.clone()),
        is_raises_exception: raises,
        has_strict_type_checking,
        has_exception_state: raises || has_strict_type_checking || info.is_integer(),
        call_with: attrs.setter_call_with,
    })
}

fn put_forwards_target<'r>(
    interface: &Interface,
    attribute: &Attribute,
    target_name: &str,
    ctx: &CompilationContext<'r>,
) -> Result<&'r Attribute, CompileError> {
    let target_interface = attribute.idl_type.base_name();
    let Some(target) = ctx.registry.get(&target_interface) else {
        return Err(CompileError::PutForwardsTargetUnknownInterface {
            interface: interface.name.clone(),
            attribute: attribute.name.clone(),
            target_interface,
        });
    };
    target
        .attribute(target_name)
        .ok_or_else(|| CompileError::PutForwardsTargetNotFound {
            interface: interface.name.clone(),
            attribute: attribute.name.clone(),
            target_interface: target.name.clone(),
            target_attribute: target_name.to_string(),
        })
}

/// Build the descriptor for a non-constructor attribute that survived
/// suppression.
pub(crate) fn build_attribute(
    interface: &Interface,
    attribute: &Attribute,
    suppression: AttributeSuppression,
    ctx: &CompilationContext<'_>,
    deps: &mut Dependencies,
) -> Result<AttributeDescriptor, CompileError> {
    let attrs = &attribute.extended_attributes;
    let info = classify(&attribute.idl_type, ctx);
    deps.add_type(&info);

    if attrs.has(MemberFlags::CHECK_SECURITY) {
        deps.insert(Dependency::BindingSecurity);
    }
    let is_reflect = attrs.reflect.is_some();
    if is_reflect {
        deps.insert(Dependency::ContentAttributeNames(ContentNamespace::for_interface(
            &interface.name,
        )));
    }
    if is_reflect || attrs.has(MemberFlags::CUSTOM_ELEMENT_CALLBACKS) {
        deps.insert(Dependency::CustomElementCallbacks);
    }
    if (attrs.call_with | attrs.setter_call_with).contains(CallWith::SCRIPT_STATE) {
        deps.insert(Dependency::ScriptState);
    }

    let is_read_only = attribute.is_read_only || suppression.setter;
    let has_put_forwards = attrs.put_forwards.is_some();

    let getter = if suppression.getter {
        None
    } else {
        Some(build_getter(interface, attribute, &info))
    };
    let setter = if suppression.setter || (attribute.is_read_only && !has_put_forwards) {
        None
    } else {
        Some(build_setter(interface, attribute, ctx, deps)?)
    };

    let is_replaceable = attrs.has(MemberFlags::REPLACEABLE);
    let setter_callback = if is_replaceable && !has_put_forwards {
        SetterCallback::Replaceable
    } else if setter.is_none() {
        SetterCallback::None
    } else {
        SetterCallback::Default
    };

    Ok(AttributeDescriptor {
        name: attribute.name.clone(),
        native_name: native_name(attribute),
        idl_type: attribute.idl_type.clone(),
        is_static: attribute.is_static,
        is_read_only,
        is_nullable: info.nullable,
        getter,
        setter,
        setter_callback,
        access_control: access_control(attribute),
        property_attributes: property_attributes(attribute),
        is_keep_alive_for_gc: is_keep_alive_for_gc(interface, attribute, &info, ctx),
        is_reflect,
        reflect_only: attrs.reflect_only.clone(),
        reflect_empty: attrs.reflect_empty.clone(),
        reflect_invalid: attrs.reflect_invalid.clone(),
        reflect_missing: attrs.reflect_missing.clone(),
        cached_attribute: attrs.cached_attribute.clone(),
        is_replaceable,
        is_expose_js_accessors: attrs.has(MemberFlags::EXPOSE_JS_ACCESSORS),
        is_per_world_bindings: attrs.has(MemberFlags::PER_WORLD_BINDINGS),
        is_unforgeable: attrs.has(MemberFlags::UNFORGEABLE),
        is_check_security_for_node: attrs.has(MemberFlags::CHECK_SECURITY),
        is_custom_element_callbacks: attrs.has(MemberFlags::CUSTOM_ELEMENT_CALLBACKS),
        is_initialized_by_event_constructor: attrs
            .has(MemberFlags::INITIALIZED_BY_EVENT_CONSTRUCTOR),
        is_partial_interface_member: attrs.partial_interface_implemented_as.is_some(),
        is_url: attrs.has(MemberFlags::URL),
        runtime_enabled: attrs.runtime_enabled.clone(),
        per_context_enabled: attrs.per_context_enabled.clone(),
        conditional: attrs.conditional.clone(),
        measure_as: attrs.measure_as.clone(),
        deprecate_as: attrs.deprecate_as.clone(),
        world_suffixes: world_suffixes(attrs),
        type_info: info,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::coercion::NullPolicy;
    use idlbind_core::{CompilerConfig, ExtendedAttributes, RawExtendedAttribute};
    use idlbind_registry::InterfaceRegistry;

    fn registry() -> InterfaceRegistry {
        let mut r = InterfaceRegistry::new();
        r.register_interface(Interface::new("Node")).unwrap();
        r.register_interface(Interface::new("Element").with_parent("Node"))
            .unwrap();
        r.register_interface(
            Interface::new("CSSStyleDeclaration")
                .with_attribute(Attribute::new("cssText", IdlType::DomString)),
        )
        .unwrap();
        r.register_interface(Interface::new("Location")).unwrap();
        r
    }

    fn ext(raw: Vec<RawExtendedAttribute>) -> ExtendedAttributes {
        ExtendedAttributes::from_raw(raw).unwrap()
    }

    fn build(interface: &Interface, attribute: &Attribute) -> Result<AttributeDescriptor, CompileError> {
        let registry = registry();
        let config = CompilerConfig::default();
        let ctx = CompilationContext::new(&registry, &config);
        let mut deps = Dependencies::new();
        build_attribute(interface, attribute, AttributeSuppression::default(), &ctx, &mut deps)
    }

    #[test]
    fn plain_accessor_names() {
        let iface = Interface::new("Foo");
        let attr = Attribute::new("TextContent", IdlType::DomString);
        let d = build(&iface, &attr).unwrap();
        assert_eq!(d.getter.as_ref().unwrap().native_name, "textContent");
        assert_eq!(d.setter.as_ref().unwrap().native_name, "setTextContent");
        assert_eq!(d.setter_callback, SetterCallback::Default);
    }

    #[test]
    fn implemented_as_renames_native_accessors() {
        let iface = Interface::new("Foo");
        let attr = Attribute::new("type", IdlType::DomString).with_extended_attributes(ext(vec![
            RawExtendedAttribute::single("ImplementedAs", "typeForBindings"),
        ]));
        let d = build(&iface, &attr).unwrap();
        assert_eq!(d.getter.unwrap().native_name, "typeForBindings");
        assert_eq!(d.setter.unwrap().native_name, "setTypeForBindings");
    }

    #[test]
    fn reflected_readonly_string_uses_get_attribute() {
        let iface = Interface::new("HTMLInputElement");
        let attr = Attribute::new("value", IdlType::DomString)
            .read_only()
            .with_extended_attributes(ext(vec![RawExtendedAttribute::bare("Reflect")]));
        let d = build(&iface, &attr).unwrap();
        let getter = d.getter.unwrap();
        assert_eq!(getter.native_name, "getAttribute");
        assert_eq!(
            getter.content_attribute.unwrap().scoped_name(),
            "HTMLNames::valueAttr"
        );
        assert!(d.setter.is_none());
        assert_eq!(d.setter_callback, SetterCallback::None);
    }

    #[test]
    fn reflected_accessors_by_type() {
        let iface = Interface::new("SVGElement");
        let attr = Attribute::new("hidden", IdlType::Boolean)
            .with_extended_attributes(ext(vec![RawExtendedAttribute::bare("Reflect")]));
        let d = build(&iface, &attr).unwrap();
        assert_eq!(d.getter.as_ref().unwrap().native_name, "hasAttribute");
        let setter = d.setter.unwrap();
        assert_eq!(setter.native_name, "setBooleanAttribute");
        assert_eq!(setter.content_attribute.unwrap().scoped_name(), "SVGNames::hiddenAttr");

        let attr = Attribute::new("tabIndex", IdlType::Numeric(NumericKind::UnsignedLong))
            .with_extended_attributes(ext(vec![RawExtendedAttribute::single("Reflect", "tabindex")]));
        let d = build(&iface, &attr).unwrap();
        assert_eq!(d.getter.unwrap().native_name, "getUnsignedIntegralAttribute");
        assert_eq!(d.setter.unwrap().native_name, "setUnsignedIntegralAttribute");

        let attr = Attribute::new("href", IdlType::DomString).with_extended_attributes(ext(vec![
            RawExtendedAttribute::bare("Reflect"),
            RawExtendedAttribute::bare("URL"),
        ]));
        assert_eq!(build(&iface, &attr).unwrap().getter.unwrap().native_name, "getURLAttribute");
    }

    #[test]
    fn class_id_name_use_fast_path_getters() {
        let iface = Interface::new("Element");
        let attr = Attribute::new("className", IdlType::DomString)
            .with_extended_attributes(ext(vec![RawExtendedAttribute::single("Reflect", "class")]));
        let getter = build(&iface, &attr).unwrap().getter.unwrap();
        assert_eq!(getter.native_name, "getClassAttribute");
        assert!(getter.content_attribute.is_none());
    }

    #[test]
    fn nullable_getter_uses_result_local_and_is_null() {
        let iface = Interface::new("Foo");
        let attr = Attribute::new("parent", IdlType::named("Element").nullable()).read_only();
        let getter = build(&iface, &attr).unwrap().getter.unwrap();
        assert!(getter.uses_result_local);
        assert!(getter.passes_is_null);
        assert!(getter.return_value.unwrap().release_ownership);
    }

    #[test]
    fn type_checking_nullable_drops_is_null_for_wrappers() {
        let iface = Interface::new("Foo").with_extended_attributes(ext(vec![
            RawExtendedAttribute::single("TypeChecking", "Nullable"),
        ]));
        let attr = Attribute::new("parent", IdlType::named("Element").nullable()).read_only();
        assert!(!build(&iface, &attr).unwrap().getter.unwrap().passes_is_null);
    }

    #[test]
    fn event_handler_never_releases() {
        let iface = Interface::new("Foo");
        let attr = Attribute::new("onload", IdlType::named("EventHandler"));
        let getter = build(&iface, &attr).unwrap().getter.unwrap();
        assert!(getter.uses_result_local);
        assert!(!getter.return_value.unwrap().release_ownership);
    }

    #[test]
    fn put_forwards_adds_forwarding_setter() {
        let iface = Interface::new("Foo");
        let attr = Attribute::new("style", IdlType::named("CSSStyleDeclaration"))
            .read_only()
            .with_extended_attributes(ext(vec![RawExtendedAttribute::single("PutForwards", "cssText")]));
        let d = build(&iface, &attr).unwrap();
        let setter = d.setter.unwrap();
        assert_eq!(setter.forwards_to.as_deref(), Some("cssText"));
        assert_eq!(setter.native_name, "setCssText");
        assert_eq!(setter.value_type, IdlType::DomString);
        assert_eq!(setter.value.null_policy, NullPolicy::Coerce);
        assert_eq!(d.setter_callback, SetterCallback::Default);
    }

    #[test]
    fn put_forwards_missing_target_is_fatal() {
        let iface = Interface::new("Foo");
        let attr = Attribute::new("style", IdlType::named("CSSStyleDeclaration"))
            .read_only()
            .with_extended_attributes(ext(vec![RawExtendedAttribute::single("PutForwards", "nope")]));
        assert!(matches!(
            build(&iface, &attr),
            Err(CompileError::PutForwardsTargetNotFound { target_attribute, .. }) if target_attribute == "nope"
        ));

        let attr = Attribute::new("thing", IdlType::named("Unknown"))
            .read_only()
            .with_extended_attributes(ext(vec![RawExtendedAttribute::single("PutForwards", "x")]));
        assert!(matches!(
            build(&iface, &attr),
            Err(CompileError::PutForwardsTargetUnknownInterface { .. })
        ));
    }

    #[test]
    fn access_control_and_property_attributes() {
        let iface = Interface::new("Window");
        let attr = Attribute::new("location", IdlType::named("Location"))
            .read_only()
            .with_extended_attributes(ext(vec![
                RawExtendedAttribute::bare("DoNotCheckSecurity"),
                RawExtendedAttribute::bare("Unforgeable"),
            ]));
        let d = build(&iface, &attr).unwrap();
        assert_eq!(
            d.access_control,
            AccessControl::ALL_CAN_READ | AccessControl::PROHIBITS_OVERWRITING
        );
        assert_eq!(d.property_attributes, PropertyAttributes::DONT_DELETE);

        let attr = Attribute::new("name", IdlType::DomString).with_extended_attributes(ext(vec![
            RawExtendedAttribute::single("DoNotCheckSecurity", "Setter"),
            RawExtendedAttribute::bare("NotEnumerable"),
        ]));
        let d = build(&iface, &attr).unwrap();
        assert_eq!(d.access_control, AccessControl::ALL_CAN_WRITE);
        assert_eq!(d.property_attributes, PropertyAttributes::DONT_ENUM);
    }

    #[test]
    fn keep_alive_for_readonly_wrappers_outside_node_trees() {
        let iface = Interface::new("Window");
        let attr = Attribute::new("location", IdlType::named("Location")).read_only();
        assert!(build(&iface, &attr).unwrap().is_keep_alive_for_gc);

        let attr = Attribute::new("firstChild", IdlType::named("Element")).read_only();
        assert!(!build(&iface, &attr).unwrap().is_keep_alive_for_gc);

        let node_child = Interface::new("Attr").with_parent("Node");
        let attr = Attribute::new("location", IdlType::named("Location")).read_only();
        assert!(!build(&node_child, &attr).unwrap().is_keep_alive_for_gc);
    }

    #[test]
    fn replaceable_uses_replaceable_callback() {
        let iface = Interface::new("Window");
        let attr = Attribute::new("screenX", IdlType::Numeric(NumericKind::Long))
            .read_only()
            .with_extended_attributes(ext(vec![RawExtendedAttribute::bare("Replaceable")]));
        let d = build(&iface, &attr).unwrap();
        assert_eq!(d.setter_callback, SetterCallback::Replaceable);
        assert!(d.setter.is_none());
    }

    #[test]
    fn integer_setter_needs_exception_state() {
        let iface = Interface::new("Foo");
        let attr = Attribute::new("width", IdlType::Numeric(NumericKind::Long));
        let setter = build(&iface, &attr).unwrap().setter.unwrap();
        assert!(setter.has_exception_state);
        assert!(!setter.has_strict_type_checking);
    }

    #[test]
    fn per_world_bindings_add_main_world_suffix() {
        let iface = Interface::new("Foo");
        let attr = Attribute::new("x", IdlType::DomString)
            .with_extended_attributes(ext(vec![RawExtendedAttribute::bare("PerWorldBindings")]));
        assert_eq!(build(&iface, &attr).unwrap().world_suffixes, vec!["", "ForMainWorld"]);
    }

    #[test]
    fn custom_accessors_follow_named_targets() {
        let iface = Interface::new("Foo");
        let new_only = Attribute::new("x", IdlType::DomString)
            .with_extended_attributes(ext(vec![RawExtendedAttribute::single("Custom", "New")]));
        let d = build(&iface, &new_only).unwrap();
        assert!(!d.getter.unwrap().is_custom);
        assert!(!d.setter.unwrap().is_custom);

        let getter = Attribute::new("y", IdlType::DomString)
            .with_extended_attributes(ext(vec![RawExtendedAttribute::single("Custom", "Getter")]));
        let d = build(&iface, &getter).unwrap();
        assert!(d.getter.unwrap().is_custom);
        assert!(!d.setter.unwrap().is_custom);

        let bare = Attribute::new("z", IdlType::DomString)
            .read_only()
            .with_extended_attributes(ext(vec![RawExtendedAttribute::bare("Custom")]));
        let d = build(&iface, &bare).unwrap();
        assert!(d.getter.unwrap().is_custom);
        assert!(d.setter.is_none());
    }

    #[test]
    fn constructor_attribute_strips_suffix() {
        let attr = Attribute::new("Image", IdlType::named("HTMLImageElementConstructor"));
        assert!(is_constructor_attribute(&attr));
        let c = constructor_attribute(&attr);
        assert_eq!(c.constructor_type, "HTMLImageElement");
        assert!(!c.needs_getter_callback);
    }
}
