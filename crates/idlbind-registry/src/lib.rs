//! Cross-interface name table for the idlbind compiler.
//!
//! [`InterfaceRegistry`] is built once and shared read-only by every
//! interface compilation, so it is `Sync` and can be used from parallel
//! batch compilation.

mod inheritance;
mod registry;

pub use inheritance::InheritanceGraph;
pub use registry::InterfaceRegistry;
