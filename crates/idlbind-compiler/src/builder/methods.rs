//! Method descriptors.

use idlbind_core::{Argument, CallWith, IdlType, Interface, MemberFlags, Operation};
use serde::Serialize;

use super::{PropertyAttributes, world_suffixes};
use crate::classify::{TypeInfo, classify};
use crate::coercion::{
    ArgumentCoercion, ArgumentFacts, CoercionFlags, ReturnCoercion, argument_coercion,
    return_coercion,
};
use crate::context::CompilationContext;
use crate::dependencies::{Dependencies, Dependency};
use crate::overload::OverloadInfo;

/// Template the method is installed on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FunctionTemplate {
    /// Static members live on the interface object.
    Interface,
    /// `[Unforgeable]` members live on each instance.
    Instance,
    Prototype,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ArgumentDescriptor {
    pub name: String,
    pub index: usize,
    pub idl_type: IdlType,
    pub type_info: TypeInfo,
    pub coercion: ArgumentCoercion,
    pub is_strict_type_checking: bool,
    pub is_clamp: bool,
    /// An `EventListener` argument precedes this one.
    pub has_event_listener_argument: bool,
}

/// One native entry point for a given argument count.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NativeEntry {
    pub argument_count: usize,
    /// `total - count + 1` when the method has several entries.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub optional_index: Option<usize>,
    pub argument_names: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MethodDescriptor {
    pub name: String,
    pub native_name: String,
    pub is_static: bool,
    pub return_type: IdlType,
    pub return_value: Option<ReturnCoercion>,
    pub arguments: Vec<ArgumentDescriptor>,
    pub function_template: FunctionTemplate,
    pub needs_signature_check: bool,
    pub has_exception_state: bool,
    pub has_event_listener_argument: bool,
    pub is_check_security_for_frame: bool,
    pub is_check_security_for_node: bool,
    pub is_custom: bool,
    pub is_custom_element_callbacks: bool,
    pub is_do_not_check_security: bool,
    pub is_do_not_check_signature: bool,
    pub is_partial_interface_member: bool,
    pub is_per_world_bindings: bool,
    pub is_raises_exception: bool,
    pub is_read_only: bool,
    pub is_strict_type_checking: bool,
    pub is_variadic: bool,
    pub call_with: CallWith,
    pub number_of_arguments: usize,
    pub number_of_required_arguments: usize,
    pub number_of_required_or_variadic_arguments: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub overload: Option<OverloadInfo>,
    pub generates_method_configuration: bool,
    pub property_attributes: PropertyAttributes,
    pub native_entries: Vec<NativeEntry>,
    pub world_suffixes: Vec<&'static str>,
    pub runtime_enabled: Option<String>,
    pub per_context_enabled: Option<String>,
    pub conditional: Option<String>,
    pub measure_as: Option<String>,
    pub deprecate_as: Option<String>,
}

impl MethodDescriptor {
    pub fn overload_index(&self) -> Option<usize> {
        self.overload.as_ref().map(|o| o.overload_index)
    }
}

/// Arguments that are neither optional-without-default nor variadic.
pub fn required_argument_count(arguments: &[Argument]) -> usize {
    arguments.iter().filter(|a| a.is_required()).count()
}

/// Type names that force an exception state on their callee.
pub(crate) fn argument_needs_exception_state(argument: &Argument) -> bool {
    argument.idl_type.is_named("SerializedScriptValue") || argument.idl_type.is_integer()
}

pub(crate) fn native_entries(arguments: &[Argument]) -> Vec<NativeEntry> {
    let total = arguments.len();
    let required = required_argument_count(arguments);
    let names = |count: usize| arguments[..count].iter().map(|a| a.name.clone()).collect();

    if required == total {
        return vec![NativeEntry {
            argument_count: total,
            optional_index: None,
            argument_names: names(total),
        }];
    }
    (required..=total)
        .map(|count| NativeEntry {
            argument_count: count,
            optional_index: Some(total - count + 1),
            argument_names: names(count),
        })
        .collect()
}

/// Flags that exempt a method from receiver signature checks.
const SIGNATURE_EXEMPT: MemberFlags = MemberFlags::DO_NOT_CHECK_SIGNATURE
    .union(MemberFlags::NOT_ENUMERABLE)
    .union(MemberFlags::READ_ONLY)
    .union(MemberFlags::UNFORGEABLE);

fn property_attributes(operation: &Operation) -> PropertyAttributes {
    let attrs = &operation.extended_attributes;
    let mut flags = PropertyAttributes::empty();
    flags.set(PropertyAttributes::DONT_ENUM, attrs.has(MemberFlags::NOT_ENUMERABLE));
    flags.set(PropertyAttributes::READ_ONLY, attrs.has(MemberFlags::READ_ONLY));
    if !flags.is_empty() {
        flags |= PropertyAttributes::DONT_DELETE;
    }
    flags
}

fn build_argument(
    argument: &Argument,
    method_strict: bool,
    ctx: &CompilationContext<'_>,
    deps: &mut Dependencies,
    preceded_by_listener: bool,
) -> ArgumentDescriptor {
    let attrs = &argument.extended_attributes;
    let info = classify(&argument.idl_type, ctx);
    deps.add_type(&info);

    let is_strict = attrs.has(MemberFlags::STRICT_TYPE_CHECKING);
    let is_clamp = attrs.has(MemberFlags::CLAMP);
    let mut flags = CoercionFlags::empty();
    flags.set(CoercionFlags::STRICT, is_strict || method_strict);
    flags.set(CoercionFlags::CLAMP, is_clamp);

    ArgumentDescriptor {
        name: argument.name.clone(),
        index: argument.index,
        idl_type: argument.idl_type.clone(),
        coercion: argument_coercion(&info, &ArgumentFacts::from_argument(argument), flags),
        type_info: info,
        is_strict_type_checking: is_strict,
        is_clamp,
        has_event_listener_argument: preceded_by_listener,
    }
}

/// Build the descriptor for a named, unsuppressed operation.
pub(crate) fn build_method(
    interface: &Interface,
    operation: &Operation,
    overload: Option<OverloadInfo>,
    ctx: &CompilationContext<'_>,
    deps: &mut Dependencies,
) -> MethodDescriptor {
    let attrs = &operation.extended_attributes;
    let arguments = &operation.arguments;
    let is_static = operation.is_static;

    let is_strict_type_checking = attrs.has(MemberFlags::STRICT_TYPE_CHECKING)
        || interface
            .extended_attributes
            .has(MemberFlags::STRICT_TYPE_CHECKING);

    let mut argument_descriptors = Vec::with_capacity(arguments.len());
    let mut seen_listener = false;
    for argument in arguments {
        argument_descriptors.push(build_argument(
            argument,
            is_strict_type_checking,
            ctx,
            deps,
            seen_listener,
        ));
        seen_listener |= argument.idl_type.is_named("EventListener");
    }

    let return_type = operation.return_type.clone().unwrap_or(IdlType::Void);
    let return_info = classify(&return_type, ctx);
    deps.add_type(&return_info);

    if attrs.call_with.contains(CallWith::SCRIPT_ARGUMENTS) {
        deps.insert(Dependency::ScriptArguments);
    }
    if attrs.call_with.contains(CallWith::SCRIPT_STATE) {
        deps.insert(Dependency::ScriptState);
    }
    if attrs.has(MemberFlags::CHECK_SECURITY) {
        deps.insert(Dependency::BindingSecurity);
    }
    if attrs.has(MemberFlags::CUSTOM_ELEMENT_CALLBACKS) {
        deps.insert(Dependency::CustomElementCallbacks);
    }

    let has_event_listener_argument = arguments
        .iter()
        .any(|a| a.idl_type.is_named("EventListener"));
    let is_check_security_for_frame = interface
        .extended_attributes
        .has(MemberFlags::CHECK_SECURITY)
        && attrs.do_not_check_security.is_none();
    let is_raises_exception = attrs.raises_exception.is_some();

    let needs_signature_check = !(is_static
        || attrs.do_not_check_security.is_some()
        || attrs.runtime_enabled.is_some()
        || attrs.flags.intersects(SIGNATURE_EXEMPT));

    let function_template = if is_static {
        FunctionTemplate::Interface
    } else if attrs.has(MemberFlags::UNFORGEABLE) {
        FunctionTemplate::Instance
    } else {
        FunctionTemplate::Prototype
    };

    let generates_method_configuration = needs_signature_check
        && attrs.per_context_enabled.is_none()
        && overload.as_ref().is_none_or(|o| o.overload_index == 1);

    MethodDescriptor {
        name: operation.name.clone(),
        native_name: attrs
            .implemented_as
            .clone()
            .unwrap_or_else(|| operation.name.clone()),
        is_static,
        return_value: return_coercion(&return_info, false),
        return_type,
        arguments: argument_descriptors,
        function_template,
        needs_signature_check,
        has_exception_state: has_event_listener_argument
            || is_raises_exception
            || is_check_security_for_frame
            || arguments.iter().any(argument_needs_exception_state),
        has_event_listener_argument,
        is_check_security_for_frame,
        is_check_security_for_node: attrs.has(MemberFlags::CHECK_SECURITY),
        is_custom: attrs.custom.is_some(),
        is_custom_element_callbacks: attrs.has(MemberFlags::CUSTOM_ELEMENT_CALLBACKS),
        is_do_not_check_security: attrs.do_not_check_security.is_some(),
        is_do_not_check_signature: attrs.has(MemberFlags::DO_NOT_CHECK_SIGNATURE),
        is_partial_interface_member: attrs.partial_interface_implemented_as.is_some(),
        is_per_world_bindings: attrs.has(MemberFlags::PER_WORLD_BINDINGS),
        is_raises_exception,
        is_read_only: attrs.has(MemberFlags::READ_ONLY),
        is_strict_type_checking,
        is_variadic: operation.is_variadic(),
        call_with: attrs.call_with,
        number_of_arguments: arguments.len(),
        number_of_required_arguments: required_argument_count(arguments),
        number_of_required_or_variadic_arguments: arguments
            .iter()
            .filter(|a| !a.is_optional)
            .count(),
        overload,
        generates_method_configuration,
        property_attributes: property_attributes(operation),
        native_entries: native_entries(arguments),
        world_suffixes: world_suffixes(attrs),
        runtime_enabled: attrs.runtime_enabled.clone(),
        per_context_enabled: attrs.per_context_enabled.clone(),
        conditional: attrs.conditional.clone(),
        measure_as: attrs.measure_as.clone(),
        deprecate_as: attrs.deprecate_as.clone(),
    }
}
