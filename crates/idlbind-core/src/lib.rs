//! Core types for the idlbind interface compiler.
//!
//! This crate holds everything the compiler consumes but does not compute:
//!
//! - [`model`]: parsed interface definitions
//! - [`idl_type`]: declared types and their textual form
//! - [`extended_attributes`]: the typed metadata-flag vocabulary
//! - [`config`]: exclusion rules and wrapper-type configuration
//! - [`error`]: the error and warning taxonomy

pub mod config;
pub mod error;
pub mod extended_attributes;
pub mod idl_type;
pub mod model;

pub use config::{CompilerConfig, DEFAULT_NON_WRAPPER_TYPES, ExclusionList, ExclusionRule, MemberKind};
pub use error::{CompileError, CompileWarning, RegistrationError};
pub use extended_attributes::{
    AccessorScope, CallWith, CustomTargets, DefaultKind, ExtendedAttributes, MemberFlags,
    RawExtendedAttribute, RawValue, Reflect, TypeChecking, WrapperReference,
};
pub use idl_type::{IdlType, NumericKind};
pub use model::{
    Argument, Attribute, Constant, DefaultValue, Interface, Operation, SpecialShape, Specials,
};
