//! Error and warning types shared by every idlbind phase.
//!
//! ## Error Hierarchy
//!
//! ```text
//! RegistrationError - building the cross-interface registry
//! CompileError      - fatal problems that abort one interface's compilation
//! CompileWarning    - recoverable conditions, resolved locally and reported
//! ```
//!
//! A `CompileError` always names the interface and member it was raised for,
//! so a batch driver can report it without extra context.

use std::fmt;

use serde::Serialize;
use thiserror::Error;

use crate::model::SpecialShape;

// ============================================================================
// Registration Errors
// ============================================================================

/// Errors raised while populating an interface registry.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RegistrationError {
    /// The same interface name was registered twice.
    #[error("interface '{name}' is already registered")]
    DuplicateInterface { name: String },

    /// A name was registered under two different kinds.
    #[error("'{name}' is already registered as a {existing}")]
    NameConflict { name: String, existing: &'static str },
}

// ============================================================================
// Compile Errors
// ============================================================================

/// Fatal errors. Any of these aborts compilation of the enclosing interface;
/// there is no partial descriptor set.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CompileError {
    /// A deleter special operation must return `boolean`.
    #[error("{interface}.{member}: deleters must return boolean, found '{found}'")]
    InvalidDeleterReturnType {
        interface: String,
        member: String,
        found: String,
    },

    /// `[PutForwards=x]` names an attribute missing from the target interface.
    #[error(
        "{interface}.{attribute}: [PutForwards] target '{target_attribute}' is not an attribute of '{target_interface}'"
    )]
    PutForwardsTargetNotFound {
        interface: String,
        attribute: String,
        target_interface: String,
        target_attribute: String,
    },

    /// `[PutForwards]` on an attribute whose type is not a registered interface.
    #[error("{interface}.{attribute}: [PutForwards] target interface '{target_interface}' is not registered")]
    PutForwardsTargetUnknownInterface {
        interface: String,
        attribute: String,
        target_interface: String,
    },

    /// A required argument follows an optional argument that has no default.
    #[error("{interface}.{member}: required argument '{argument}' follows an optional argument")]
    RequiredArgumentAfterOptional {
        interface: String,
        member: String,
        argument: String,
    },

    /// A variadic argument that is not the final argument.
    #[error("{interface}.{member}: variadic argument '{argument}' must be the last argument")]
    VariadicArgumentNotLast {
        interface: String,
        member: String,
        argument: String,
    },

    /// A recognized extended attribute carried a payload it does not accept.
    #[error("invalid extended attribute [{name}]: {reason}")]
    InvalidExtendedAttribute { name: String, reason: String },

    /// Declared type text that could not be parsed.
    #[error("invalid type '{text}': {reason}")]
    InvalidType { text: String, reason: String },

    /// Compiler configuration could not be loaded.
    #[error("invalid configuration: {message}")]
    Config { message: String },
}

impl CompileError {
    /// Shorthand for an extended-attribute payload error.
    pub fn invalid_attribute(name: impl Into<String>, reason: impl Into<String>) -> Self {
        CompileError::InvalidExtendedAttribute {
            name: name.into(),
            reason: reason.into(),
        }
    }

    /// Shorthand for a type-text error.
    pub fn invalid_type(text: impl Into<String>, reason: impl Into<String>) -> Self {
        CompileError::InvalidType {
            text: text.into(),
            reason: reason.into(),
        }
    }

    /// The interface this error was raised for, if it is tied to one.
    pub fn interface(&self) -> Option<&str> {
        match self {
            CompileError::InvalidDeleterReturnType { interface, .. }
            | CompileError::PutForwardsTargetNotFound { interface, .. }
            | CompileError::PutForwardsTargetUnknownInterface { interface, .. }
            | CompileError::RequiredArgumentAfterOptional { interface, .. }
            | CompileError::VariadicArgumentNotLast { interface, .. } => Some(interface),
            CompileError::InvalidExtendedAttribute { .. }
            | CompileError::InvalidType { .. }
            | CompileError::Config { .. } => None,
        }
    }
}

// ============================================================================
// Warnings
// ============================================================================

/// Recoverable conditions. Compilation continues with the stated tie-break
/// and the warning is attached to the interface's descriptor set.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum CompileWarning {
    /// Several operations match one special-operation shape. The first in
    /// declaration order is kept.
    AmbiguousSpecialOperation {
        interface: String,
        shape: SpecialShape,
        /// Name of the operation that was kept.
        kept: String,
        /// Names of the later candidates that were ignored.
        ignored: Vec<String>,
    },

    /// Two members of one overload group have an identical dispatch term,
    /// so the later one can never be selected for that argument count.
    OverloadCollision {
        interface: String,
        name: String,
        is_static: bool,
        /// Overload index of the member that wins the tie.
        first: usize,
        /// Overload index of the shadowed member.
        second: usize,
        /// Rendered argument-count test both terms share.
        argument_count: String,
    },
}

impl CompileWarning {
    /// The interface the warning was raised for.
    pub fn interface(&self) -> &str {
        match self {
            CompileWarning::AmbiguousSpecialOperation { interface, .. }
            | CompileWarning::OverloadCollision { interface, .. } => interface,
        }
    }
}

impl fmt::Display for CompileWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CompileWarning::AmbiguousSpecialOperation {
                interface,
                shape,
                kept,
                ignored,
            } => write!(
                f,
                "{interface}: multiple {shape} operations, keeping '{kept}' and ignoring {}",
                ignored
                    .iter()
                    .map(|name| format!("'{name}'"))
                    .collect::<Vec<_>>()
                    .join(", ")
            ),
            CompileWarning::OverloadCollision {
                interface,
                name,
                is_static,
                first,
                second,
                argument_count,
            } => write!(
                f,
                "{interface}.{name}{}: overload {second} is shadowed by overload {first} at {argument_count}",
                if *is_static { " (static)" } else { "" }
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn compile_error_names_interface_and_member() {
        let err = CompileError::InvalidDeleterReturnType {
            interface: "Storage".into(),
            member: "removeItem".into(),
            found: "void".into(),
        };
        let msg = err.to_string();
        assert!(msg.contains("Storage.removeItem"));
        assert!(msg.contains("void"));
        assert_eq!(err.interface(), Some("Storage"));
    }

    #[test]
    fn put_forwards_errors_display() {
        let err = CompileError::PutForwardsTargetNotFound {
            interface: "Document".into(),
            attribute: "location".into(),
            target_interface: "Location".into(),
            target_attribute: "hreff".into(),
        };
        assert!(err.to_string().contains("'hreff'"));
        assert!(err.to_string().contains("'Location'"));
    }

    #[test]
    fn ingestion_errors_have_no_interface() {
        let err = CompileError::invalid_attribute("CallWith", "unknown value 'Bogus'");
        assert_eq!(err.interface(), None);
        assert_eq!(
            err.to_string(),
            "invalid extended attribute [CallWith]: unknown value 'Bogus'"
        );
    }

    #[test]
    fn ambiguous_special_warning_display() {
        let warning = CompileWarning::AmbiguousSpecialOperation {
            interface: "NodeList".into(),
            shape: SpecialShape::IndexedGetter,
            kept: "item".into(),
            ignored: vec!["at".into()],
        };
        assert_eq!(warning.interface(), "NodeList");
        assert_eq!(
            warning.to_string(),
            "NodeList: multiple indexed getter operations, keeping 'item' and ignoring 'at'"
        );
    }

    #[test]
    fn registration_error_display() {
        let err = RegistrationError::NameConflict {
            name: "EventListener".into(),
            existing: "callback",
        };
        assert_eq!(
            err.to_string(),
            "'EventListener' is already registered as a callback"
        );
    }
}
