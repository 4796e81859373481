//! Interface compiler: turns parsed interface definitions into binding
//! descriptors.
//!
//! | Module | Role |
//! |--------|------|
//! | [`classify`] | map a declared type to its category and facts |
//! | [`coercion`] | argument conversion and return wrapping recipes |
//! | [`special`] | indexed and named getter/setter/deleter extraction |
//! | [`overload`] | overload groups and dispatch predicates |
//! | [`builder`] | per-member descriptors and interface aggregates |
//!
//! The entry point is [`compile_interface`]. Each call is independent and
//! reads the shared [`CompilationContext`] without mutating it.
//!
//! ```ignore
//! let ctx = CompilationContext::new(&registry, &config);
//! let descriptor = compile_interface(&interface, &ctx)?;
//! for method in &descriptor.methods {
//!     println!("{} ({} args)", method.name, method.number_of_arguments);
//! }
//! ```

pub mod builder;
pub mod classify;
pub mod coercion;
pub mod context;
pub mod dependencies;
pub mod overload;
pub mod special;

pub use builder::{
    AccessControl, AttributeDescriptor, ConstantDescriptor, ConstructorAttribute,
    ConstructorDescriptor, CustomConstructorDescriptor, InterfaceAggregates, InterfaceDescriptor, InterfaceFacts,
    MethodDescriptor, PropertyAttributes, WrapperConfiguration, compile_interface,
};
pub use classify::{TypeCategory, TypeInfo, classify};
pub use coercion::{ArgumentCoercion, ReturnCoercion, argument_coercion, return_coercion};
pub use context::CompilationContext;
pub use dependencies::{ContentNamespace, Dependencies, Dependency};
pub use overload::{DispatchPredicate, OverloadGroup, OverloadInfo, resolve_overloads};
pub use special::{NullCheck, SpecialOperations, extract_special_operations};
