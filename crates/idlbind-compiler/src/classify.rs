//! Type classification.
//!
//! Maps a declared [`IdlType`] onto the category that drives coercion and
//! overload discrimination. Named types are resolved against the registry:
//!
//! | Named type is...                           | Category   |
//! |--------------------------------------------|------------|
//! | a registered callback                      | `Callback` |
//! | in the configured non-wrapper set          | `Object`   |
//! | a registered dictionary                    | `Object`   |
//! | a registered (non-callback) interface      | `Wrapper`  |
//! | anything else                              | `Object`   |
//!
//! Classification never fails; unknown names fall through to `Object`.

use idlbind_core::{IdlType, NumericKind};
use serde::Serialize;

use crate::context::CompilationContext;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(tag = "category", content = "kind", rename_all = "snake_case")]
pub enum TypeCategory {
    Numeric(NumericKind),
    Boolean,
    String,
    /// `sequence<T>` or `T[]`.
    Sequence,
    Union,
    Callback,
    /// Native object with identity; checked by instance type.
    Wrapper,
    /// Duck-typed object (dictionary, record, non-wrapper interface).
    Object,
    Any,
    Void,
}

/// Classification result for one declared type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TypeInfo {
    pub category: TypeCategory,
    pub nullable: bool,
    /// Type text with nullability removed; the interface name for named types.
    pub base_name: String,
    /// Element type of a sequence.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub element: Option<Box<TypeInfo>>,
    /// Member types of a union, in declaration order.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub members: Vec<TypeInfo>,
}

impl TypeInfo {
    pub fn is_nullable(&self) -> bool {
        self.nullable
    }

    pub fn is_union(&self) -> bool {
        self.category == TypeCategory::Union
    }

    pub fn is_sequence(&self) -> bool {
        self.category == TypeCategory::Sequence
    }

    pub fn is_wrapper(&self) -> bool {
        self.category == TypeCategory::Wrapper
    }

    pub fn is_callback(&self) -> bool {
        self.category == TypeCategory::Callback
    }

    pub fn is_string(&self) -> bool {
        self.category == TypeCategory::String
    }

    pub fn is_void(&self) -> bool {
        self.category == TypeCategory::Void
    }

    /// Wrapper, callback or plain object: anything with reference semantics
    /// on the native side.
    pub fn is_interface_like(&self) -> bool {
        matches!(
            self.category,
            TypeCategory::Wrapper | TypeCategory::Callback | TypeCategory::Object
        )
    }

    pub fn is_integer(&self) -> bool {
        matches!(self.category, TypeCategory::Numeric(kind) if kind.is_integer())
    }

    /// Any non-void type may terminate a variadic parameter list.
    pub fn is_variadic_compatible(&self) -> bool {
        !self.is_void()
    }

    pub fn member_types(&self) -> &[TypeInfo] {
        &self.members
    }
}

/// Classify `ty`.
pub fn classify(ty: &IdlType, ctx: &CompilationContext<'_>) -> TypeInfo {
    let nullable = ty.is_nullable();
    let inner = ty.inner();
    let base_name = inner.to_string();

    let (category, element, members) = match inner {
        IdlType::Numeric(kind) => (TypeCategory::Numeric(*kind), None, Vec::new()),
        IdlType::Boolean => (TypeCategory::Boolean, None, Vec::new()),
        IdlType::DomString => (TypeCategory::String, None, Vec::new()),
        IdlType::Void => (TypeCategory::Void, None, Vec::new()),
        IdlType::Any => (TypeCategory::Any, None, Vec::new()),
        IdlType::Sequence(element) | IdlType::Array(element) => (
            TypeCategory::Sequence,
            Some(Box::new(classify(element, ctx))),
            Vec::new(),
        ),
        IdlType::Union(members) => (
            TypeCategory::Union,
            None,
            members.iter().map(|m| classify(m, ctx)).collect(),
        ),
        IdlType::Named(name) => (classify_named(name, ctx), None, Vec::new()),
        // `inner()` strips the only nullable layer the parser allows.
        IdlType::Nullable(_) => (TypeCategory::Object, None, Vec::new()),
    };

    TypeInfo {
        category,
        nullable,
        base_name,
        element,
        members,
    }
}

fn classify_named(name: &str, ctx: &CompilationContext<'_>) -> TypeCategory {
    let registry = ctx.registry;
    if registry.is_callback(name) {
        TypeCategory::Callback
    } else if ctx.config.is_non_wrapper_type(name) || registry.is_dictionary(name) {
        TypeCategory::Object
    } else if registry.is_interface(name) {
        TypeCategory::Wrapper
    } else {
        TypeCategory::Object
    }
}
