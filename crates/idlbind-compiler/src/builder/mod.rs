//! Member descriptor builder.
//!
//! [`compile_interface`] runs every other component over one interface and
//! assembles the [`InterfaceDescriptor`] handed to the renderer.
//!
//! ## Pipeline
//!
//! ```text
//! validate arguments ──► special operations ──► attributes
//!                                              │
//!                      constants ◄── constructors ◄── methods + overloads
//!                          │
//!                          └──► interface facts ──► aggregate flags
//! ```
//!
//! Suppressed members are filtered before anything else looks at them, so a
//! suppressed member never contributes errors or warnings.

mod attributes;
mod constructors;
mod methods;
mod suppression;

pub use attributes::{
    AttributeDescriptor, AttributeGetter, AttributeSetter, ConstructorAttribute, ContentAttribute,
    SetterCallback, is_constructor_attribute,
};
pub use constructors::{
    ConstantDescriptor, ConstructorDescriptor, CustomConstructorArgument,
    CustomConstructorDescriptor, interface_length,
};
pub use methods::{
    ArgumentDescriptor, FunctionTemplate, MethodDescriptor, NativeEntry, required_argument_count,
};
pub use suppression::{AttributeSuppression, suppresses_method};

use bitflags::bitflags;
use idlbind_core::{
    CallWith, CompileError, CompileWarning, CustomTargets, ExtendedAttributes, IdlType, Interface,
    MemberFlags, Operation, WrapperReference,
};
use serde::Serialize;
use tracing::{debug, debug_span, trace};

use crate::classify::classify;
use crate::context::CompilationContext;
use crate::dependencies::{Dependencies, Dependency};
use crate::overload::{Signature, resolve_overloads};
use crate::special::{SpecialOperations, extract_special_operations};

// ============================================================================
// Flags
// ============================================================================

bitflags! {
    /// Cross-origin access for an accessor. Empty means the engine default.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
    pub struct AccessControl: u8 {
        const ALL_CAN_READ = 1 << 0;
        const ALL_CAN_WRITE = 1 << 1;
        const PROHIBITS_OVERWRITING = 1 << 2;
    }
}

bitflags! {
    /// Script property attributes. Empty means none.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
    pub struct PropertyAttributes: u8 {
        const DONT_ENUM = 1 << 0;
        const READ_ONLY = 1 << 1;
        const DONT_DELETE = 1 << 2;
    }
}

bitflags! {
    /// Facts derived from the final member descriptors.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
    pub struct InterfaceAggregates: u16 {
        const HAS_ACCESSORS = 1 << 0;
        const HAS_ATTRIBUTE_CONFIGURATION = 1 << 1;
        const HAS_CONSTRUCTOR_ATTRIBUTES = 1 << 2;
        const HAS_PER_CONTEXT_ENABLED_ATTRIBUTES = 1 << 3;
        const HAS_REPLACEABLE_ATTRIBUTES = 1 << 4;
        const HAS_PER_WORLD_BINDINGS = 1 << 5;
        const HAS_ORIGIN_SAFE_METHOD_SETTER = 1 << 6;
        const HAS_METHOD_CONFIGURATION = 1 << 7;
        const HAS_PER_CONTEXT_ENABLED_METHODS = 1 << 8;
    }
}

// ============================================================================
// Interface descriptors
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum WrapperConfiguration {
    Dependent,
    Independent,
}

/// Interface-level facts read from its own flags and the registry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct InterfaceFacts {
    pub name: String,
    pub parent: Option<String>,
    pub is_callback: bool,
    pub is_active_dom_object: bool,
    pub is_check_security: bool,
    pub is_dependent_lifetime: bool,
    pub has_custom_wrap: bool,
    pub has_custom_to_v8: bool,
    pub has_custom_legacy_call_as_function: bool,
    pub has_visit_dom_wrapper: bool,
    /// `[SetWrapperReferenceFrom]` function.
    pub reachable_node_function: Option<String>,
    /// `[SetWrapperReferenceTo]` arguments.
    pub set_wrapper_reference_to: Vec<WrapperReference>,
    pub wrapper_configuration: WrapperConfiguration,
    pub is_node: bool,
    pub is_event_target: bool,
    pub is_document: bool,
    pub special_wrap_for: Vec<String>,
    pub is_override_builtins: bool,
    pub has_event_constructor: bool,
    pub has_custom_constructor: bool,
    /// Names of `any`-typed attributes.
    pub any_type_attributes: Vec<String>,
    pub do_not_check_constants: bool,
    pub constructor_call_with: CallWith,
    pub conditional: Option<String>,
    pub runtime_enabled: Option<String>,
    pub measure_as: Option<String>,
}

/// Everything the renderer needs for one interface.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct InterfaceDescriptor {
    pub facts: InterfaceFacts,
    pub attributes: Vec<AttributeDescriptor>,
    pub constructor_attributes: Vec<ConstructorAttribute>,
    pub methods: Vec<MethodDescriptor>,
    pub constructors: Vec<ConstructorDescriptor>,
    pub named_constructor: Option<ConstructorDescriptor>,
    pub custom_constructors: Vec<CustomConstructorDescriptor>,
    pub interface_length: usize,
    pub constants: Vec<ConstantDescriptor>,
    pub special_operations: SpecialOperations,
    pub aggregates: InterfaceAggregates,
    pub dependencies: Dependencies,
    pub warnings: Vec<CompileWarning>,
}

impl InterfaceDescriptor {
    pub fn name(&self) -> &str {
        &self.facts.name
    }

    pub fn attribute(&self, name: &str) -> Option<&AttributeDescriptor> {
        self.attributes.iter().find(|a| a.name == name)
    }

    /// Every overload of `name`, in declaration order.
    pub fn methods_named<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a MethodDescriptor> {
        self.methods.iter().filter(move |m| m.name == name)
    }

    pub fn has(&self, aggregate: InterfaceAggregates) -> bool {
        self.aggregates.contains(aggregate)
    }
}

// ============================================================================
// Helpers
// ============================================================================

pub(crate) fn capitalize(name: &str) -> String {
    let mut chars = name.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

pub(crate) fn uncapitalize(name: &str) -> String {
    let mut chars = name.chars();
    match chars.next() {
        Some(first) => first.to_lowercase().chain(chars).collect(),
        None => String::new(),
    }
}

pub(crate) fn world_suffixes(attrs: &ExtendedAttributes) -> Vec<&'static str> {
    if attrs.has(MemberFlags::PER_WORLD_BINDINGS) {
        vec!["", "ForMainWorld"]
    } else {
        vec![""]
    }
}

/// `interface` is `ancestor` or derives from it. The interface itself need
/// not be registered; its parent chain is resolved through the registry.
pub(crate) fn inherits(interface: &Interface, ancestor: &str, ctx: &CompilationContext<'_>) -> bool {
    interface.name == ancestor
        || ctx.registry.inherits_interface(&interface.name, ancestor)
        || interface
            .parent
            .as_deref()
            .is_some_and(|parent| ctx.registry.inherits_interface(parent, ancestor))
}

fn member_label(operation: &Operation) -> &str {
    if operation.is_anonymous() {
        "(anonymous)"
    } else {
        &operation.name
    }
}

/// Reject argument lists where a required argument follows an optional one
/// without a default, or where a variadic argument is not last.
pub fn validate_arguments(interface: &Interface, operation: &Operation) -> Result<(), CompileError> {
    let count = operation.arguments.len();
    let mut optional_seen = false;
    for (position, argument) in operation.arguments.iter().enumerate() {
        if argument.is_variadic && position + 1 != count {
            return Err(CompileError::VariadicArgumentNotLast {
                interface: interface.name.clone(),
                member: member_label(operation).to_string(),
                argument: argument.name.clone(),
            });
        }
        if argument.is_effectively_optional() {
            optional_seen = true;
        } else if optional_seen && !argument.is_variadic {
            return Err(CompileError::RequiredArgumentAfterOptional {
                interface: interface.name.clone(),
                member: member_label(operation).to_string(),
                argument: argument.name.clone(),
            });
        }
    }
    Ok(())
}

fn interface_facts(
    interface: &Interface,
    ctx: &CompilationContext<'_>,
    deps: &mut Dependencies,
) -> InterfaceFacts {
    let attrs = &interface.extended_attributes;

    if let Some(parent) = &interface.parent {
        deps.insert(Dependency::Interface(parent.clone()));
    }
    let is_check_security = attrs.has(MemberFlags::CHECK_SECURITY);
    if is_check_security {
        deps.insert(Dependency::BindingSecurity);
    }
    for special in &attrs.special_wrap_for {
        deps.insert(Dependency::Interface(special.clone()));
    }

    let is_event_target = inherits(interface, "EventTarget", ctx);
    if is_event_target {
        deps.insert(Dependency::EventListener);
    }

    let has_event_constructor = attrs.has(MemberFlags::EVENT_CONSTRUCTOR);
    let any_type_attributes: Vec<String> = interface
        .attributes
        .iter()
        .filter(|a| a.idl_type.inner() == &IdlType::Any)
        .map(|a| a.name.clone())
        .collect();
    if has_event_constructor {
        deps.insert(Dependency::Dictionary);
        if !any_type_attributes.is_empty() {
            deps.insert(Dependency::SerializedScriptValue);
        }
    }
    let has_custom_constructor = !interface.custom_constructors.is_empty();
    if !interface.constructors.is_empty()
        || has_custom_constructor
        || has_event_constructor
        || attrs.named_constructor.is_some()
    {
        deps.insert(Dependency::DomWindow);
    }

    let reachable_node_function = attrs.set_wrapper_reference_from.clone();
    for reference in &attrs.set_wrapper_reference_to {
        deps.add_type(&classify(&reference.idl_type, ctx));
    }
    let has_visit_dom_wrapper = attrs.names_custom(CustomTargets::VISIT_DOM_WRAPPER)
        || reachable_node_function.is_some()
        || !attrs.set_wrapper_reference_to.is_empty();
    let is_active_dom_object = attrs.has(MemberFlags::ACTIVE_DOM_OBJECT);
    let is_dependent_lifetime = attrs.has(MemberFlags::DEPENDENT_LIFETIME);

    InterfaceFacts {
        name: interface.name.clone(),
        parent: interface.parent.clone(),
        is_callback: interface.is_callback,
        is_active_dom_object,
        is_check_security,
        is_dependent_lifetime,
        has_custom_wrap: attrs.names_custom(CustomTargets::WRAP),
        has_custom_to_v8: attrs.names_custom(CustomTargets::TO_V8),
        has_custom_legacy_call_as_function: attrs
            .names_custom(CustomTargets::LEGACY_CALL_AS_FUNCTION),
        has_visit_dom_wrapper,
        reachable_node_function,
        set_wrapper_reference_to: attrs.set_wrapper_reference_to.clone(),
        wrapper_configuration: if has_visit_dom_wrapper || is_active_dom_object || is_dependent_lifetime
        {
            WrapperConfiguration::Dependent
        } else {
            WrapperConfiguration::Independent
        },
        is_node: inherits(interface, "Node", ctx),
        is_event_target,
        is_document: inherits(interface, "Document", ctx),
        special_wrap_for: attrs.special_wrap_for.clone(),
        is_override_builtins: attrs.has(MemberFlags::OVERRIDE_BUILTINS),
        has_event_constructor,
        has_custom_constructor,
        any_type_attributes,
        do_not_check_constants: attrs.has(MemberFlags::DO_NOT_CHECK_CONSTANTS),
        constructor_call_with: attrs.constructor_call_with,
        conditional: attrs.conditional.clone(),
        runtime_enabled: attrs.runtime_enabled.clone(),
        measure_as: attrs.measure_as.clone(),
    }
}

fn aggregates(
    attributes: &[AttributeDescriptor],
    constructor_attributes: &[ConstructorAttribute],
    methods: &[MethodDescriptor],
) -> InterfaceAggregates {
    let mut flags = InterfaceAggregates::empty();
    flags.set(
        InterfaceAggregates::HAS_ACCESSORS,
        attributes.iter().any(|a| a.is_expose_js_accessors),
    );
    flags.set(
        InterfaceAggregates::HAS_ATTRIBUTE_CONFIGURATION,
        attributes.iter().any(|a| {
            !(a.is_expose_js_accessors
                || a.is_static
                || a.runtime_enabled.is_some()
                || a.per_context_enabled.is_some())
        }),
    );
    flags.set(
        InterfaceAggregates::HAS_CONSTRUCTOR_ATTRIBUTES,
        !constructor_attributes.is_empty(),
    );
    flags.set(
        InterfaceAggregates::HAS_PER_CONTEXT_ENABLED_ATTRIBUTES,
        attributes.iter().any(|a| a.per_context_enabled.is_some()),
    );
    flags.set(
        InterfaceAggregates::HAS_REPLACEABLE_ATTRIBUTES,
        attributes.iter().any(|a| a.is_replaceable),
    );
    flags.set(
        InterfaceAggregates::HAS_PER_WORLD_BINDINGS,
        attributes.iter().any(|a| a.is_per_world_bindings)
            || methods.iter().any(|m| m.is_per_world_bindings),
    );
    flags.set(
        InterfaceAggregates::HAS_ORIGIN_SAFE_METHOD_SETTER,
        methods
            .iter()
            .any(|m| m.is_check_security_for_frame && !m.is_read_only),
    );
    flags.set(
        InterfaceAggregates::HAS_METHOD_CONFIGURATION,
        methods.iter().any(|m| m.generates_method_configuration),
    );
    flags.set(
        InterfaceAggregates::HAS_PER_CONTEXT_ENABLED_METHODS,
        methods.iter().any(|m| m.per_context_enabled.is_some()),
    );
    flags
}

// ============================================================================
// Compilation
// ============================================================================

/// Compile one interface into its descriptor set.
///
/// Fails on the first malformed member; there is no partial result.
#[cfg_attr(feature = "profiling", profiling::function)]
pub fn compile_interface(
    interface: &Interface,
    ctx: &CompilationContext<'_>,
) -> Result<InterfaceDescriptor, CompileError> {
    let _span = debug_span!("compile_interface", interface = %interface.name).entered();

    let suppressed = |op: &Operation| suppresses_method(&interface.name, op, ctx.config);
    for operation in interface
        .operations
        .iter()
        .filter(|op| !suppressed(op))
        .chain(&interface.constructors)
        .chain(&interface.custom_constructors)
    {
        validate_arguments(interface, operation)?;
    }

    let mut deps = Dependencies::new();
    let mut warnings = Vec::new();

    let special_operations = extract_special_operations(interface, ctx, &mut deps, &mut warnings)?;

    let mut attributes = Vec::new();
    let mut constructor_attributes = Vec::new();
    for attribute in &interface.attributes {
        if is_constructor_attribute(attribute) {
            constructor_attributes.push(attributes::constructor_attribute(attribute));
            continue;
        }
        let suppression = AttributeSuppression::of(&interface.name, attribute, ctx.config);
        if suppression.drops_attribute() {
            trace!(attribute = %attribute.name, "attribute suppressed");
            continue;
        }
        attributes.push(attributes::build_attribute(
            interface,
            attribute,
            suppression,
            ctx,
            &mut deps,
        )?);
    }

    let kept: Vec<&Operation> = interface
        .operations
        .iter()
        .filter(|op| !op.is_anonymous())
        .filter(|op| {
            let dropped = suppressed(op);
            if dropped {
                trace!(method = %op.name, "method suppressed");
            }
            !dropped
        })
        .collect();
    let signatures: Vec<Signature> = kept
        .iter()
        .map(|op| Signature::from_operation(op, ctx))
        .collect();
    let overloads = resolve_overloads(&interface.name, &signatures, &mut warnings);
    let methods: Vec<MethodDescriptor> = kept
        .iter()
        .zip(overloads)
        .map(|(op, overload)| methods::build_method(interface, op, overload, ctx, &mut deps))
        .collect();

    let constructors = constructors::build_constructors(interface, ctx, &mut deps, &mut warnings);
    let named_constructor = constructors::build_named_constructor(interface, ctx, &mut deps);
    let custom_constructors = constructors::build_custom_constructors(interface);
    let interface_length = interface_length(interface, &constructors);
    let constants = interface
        .constants
        .iter()
        .map(constructors::build_constant)
        .collect();

    let facts = interface_facts(interface, ctx, &mut deps);
    let aggregates = aggregates(&attributes, &constructor_attributes, &methods);

    debug!(
        attributes = attributes.len(),
        methods = methods.len(),
        constructors = constructors.len(),
        warnings = warnings.len(),
        "interface compiled"
    );

    Ok(InterfaceDescriptor {
        facts,
        attributes,
        constructor_attributes,
        methods,
        constructors,
        named_constructor,
        custom_constructors,
        interface_length,
        constants,
        special_operations,
        aggregates,
        dependencies: deps,
        warnings,
    })
}
