//! Shared fixtures for the integration tests.

#![allow(dead_code)]

use idlbind::prelude::*;
use tracing_subscriber::EnvFilter;

/// Route compiler logs to the test writer; `RUST_LOG` selects the level.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

pub fn long() -> IdlType {
    IdlType::Numeric(NumericKind::Long)
}

pub fn ext(raw: Vec<RawExtendedAttribute>) -> ExtendedAttributes {
    ExtendedAttributes::from_raw(raw).expect("valid extended attributes")
}

/// A small DOM-shaped registry: `EventTarget <- Node <- Element`, plus
/// `CSSStyleDeclaration` as a `[PutForwards]` target.
pub fn dom_registry() -> InterfaceRegistry {
    let mut registry = InterfaceRegistry::new();
    for interface in [
        Interface::new("EventTarget"),
        Interface::new("Node").with_parent("EventTarget"),
        Interface::new("Element").with_parent("Node"),
        Interface::new("CSSStyleDeclaration")
            .with_attribute(Attribute::new("cssText", IdlType::DomString)),
    ] {
        registry.register_interface(interface).expect("fresh registry");
    }
    registry.register_callback("EventListener").expect("fresh registry");
    registry
}

pub fn compile(interface: &Interface) -> Result<InterfaceDescriptor, CompileError> {
    compile_with(interface, &CompilerConfig::default())
}

pub fn compile_with(
    interface: &Interface,
    config: &CompilerConfig,
) -> Result<InterfaceDescriptor, CompileError> {
    let registry = dom_registry();
    let ctx = CompilationContext::new(&registry, config);
    compile_interface(interface, &ctx)
}
