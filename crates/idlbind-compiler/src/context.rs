//! Read-only inputs shared by one compilation pass.

use idlbind_core::CompilerConfig;
use idlbind_registry::InterfaceRegistry;

/// Everything an interface compilation reads besides the interface itself.
///
/// Both parts are borrowed immutably, so one context can be shared across
/// threads compiling different interfaces.
#[derive(Debug, Clone, Copy)]
pub struct CompilationContext<'a> {
    pub registry: &'a InterfaceRegistry,
    pub config: &'a CompilerConfig,
}

impl<'a> CompilationContext<'a> {
    pub fn new(registry: &'a InterfaceRegistry, config: &'a CompilerConfig) -> Self {
        Self { registry, config }
    }
}
