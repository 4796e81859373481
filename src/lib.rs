//! idlbind: compile interface definitions into script binding descriptors.
//!
//! This is the facade crate. It re-exports the input model, the registry and
//! the compiler, and adds batch compilation over many interfaces.
//!
//! ## Usage
//!
//! ```ignore
//! use idlbind::prelude::*;
//!
//! let mut registry = InterfaceRegistry::new();
//! registry.register_interface(Interface::new("Node"))?;
//! let config = CompilerConfig::default();
//! let ctx = CompilationContext::new(&registry, &config);
//!
//! for result in compile_all(&interfaces, &ctx) {
//!     let descriptor = result?;
//!     println!("{}", to_json(&descriptor)?);
//! }
//! ```

use rayon::prelude::*;
use thiserror::Error;
use tracing::{debug, info_span};

pub use idlbind_compiler as compiler;
pub use idlbind_core as core;
pub use idlbind_registry as registry;

pub use idlbind_compiler::{CompilationContext, InterfaceDescriptor, compile_interface};
pub use idlbind_core::{
    CompileError, CompileWarning, CompilerConfig, Interface, RegistrationError,
};
pub use idlbind_registry::InterfaceRegistry;

pub mod prelude {
    pub use crate::{Error, compile_all, registry_for, to_json};
    pub use idlbind_compiler::{
        CompilationContext, Dependencies, Dependency, InterfaceDescriptor, compile_interface,
    };
    pub use idlbind_core::{
        Argument, Attribute, CompileError, CompileWarning, CompilerConfig, Constant,
        ExtendedAttributes, IdlType, Interface, NumericKind, Operation, RawExtendedAttribute,
        RegistrationError,
    };
    pub use idlbind_registry::InterfaceRegistry;
}

/// Errors surfaced by the facade.
#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Registration(#[from] RegistrationError),

    #[error(transparent)]
    Compile(#[from] CompileError),

    #[error("descriptor serialization failed: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, Error>;

/// Compile every interface in parallel. Results keep input order; one
/// failing interface does not affect the others.
#[cfg_attr(feature = "profiling", profiling::function)]
pub fn compile_all(
    interfaces: &[Interface],
    ctx: &CompilationContext<'_>,
) -> Vec<std::result::Result<InterfaceDescriptor, CompileError>> {
    let _span = info_span!("compile_all", interfaces = interfaces.len()).entered();
    let results: Vec<_> = interfaces
        .par_iter()
        .map(|interface| compile_interface(interface, ctx))
        .collect();
    debug!(
        failed = results.iter().filter(|r| r.is_err()).count(),
        "batch compiled"
    );
    results
}

/// Render a descriptor set as pretty JSON for an external renderer.
pub fn to_json(descriptor: &InterfaceDescriptor) -> Result<String> {
    Ok(serde_json::to_string_pretty(descriptor)?)
}

/// Build a registry from a batch, registering every interface.
pub fn registry_for(interfaces: &[Interface]) -> Result<InterfaceRegistry> {
    let mut registry = InterfaceRegistry::new();
    for interface in interfaces {
        registry.register_interface(interface.clone())?;
    }
    Ok(registry)
}
