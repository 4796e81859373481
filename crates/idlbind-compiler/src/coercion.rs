//! Coercion descriptor synthesis.
//!
//! ## Argument direction
//!
//! [`argument_coercion`] states how a dynamic script value becomes a native
//! value: the native storage type, what null/undefined map to, the numeric
//! range policy, and the condition under which conversion fails.
//!
//! ## Return direction
//!
//! [`return_coercion`] states how a native value is boxed back into a script
//! value, what an empty native result becomes, and, for unions, the
//! per-member `resultNEnabled` / `resultN` slots. `void` has no return
//! descriptor.
//!
//! Exactly one union slot is expected to be enabled at run time. That is an
//! invariant of the native callee and is not checked here.

use bitflags::bitflags;
use idlbind_core::{Argument, DefaultKind, DefaultValue, NumericKind};
use serde::Serialize;

use crate::classify::{TypeCategory, TypeInfo};

// ============================================================================
// Native types
// ============================================================================

/// Native storage type materialized for a value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum NativeType {
    Void,
    Bool,
    Int8,
    UInt8,
    Int16,
    UInt16,
    Int32,
    UInt32,
    Int64,
    UInt64,
    Float32,
    Float64,
    String,
    /// Opaque script value (`any`).
    ScriptValue,
    Vector(Box<NativeType>),
    /// Reference to a native object with identity.
    Reference(String),
    Callback(String),
    /// Owned plain object (dictionary or non-wrapper interface).
    Object(String),
    Union(Vec<NativeType>),
}

impl NativeType {
    pub fn of(info: &TypeInfo) -> Self {
        match info.category {
            TypeCategory::Numeric(kind) => numeric_native(kind),
            TypeCategory::Boolean => NativeType::Bool,
            TypeCategory::String => NativeType::String,
            TypeCategory::Any => NativeType::ScriptValue,
            TypeCategory::Void => NativeType::Void,
            TypeCategory::Sequence => NativeType::Vector(Box::new(
                info.element
                    .as_deref()
                    .map(NativeType::of)
                    .unwrap_or(NativeType::ScriptValue),
            )),
            TypeCategory::Union => NativeType::Union(info.members.iter().map(NativeType::of).collect()),
            TypeCategory::Wrapper => NativeType::Reference(info.base_name.clone()),
            TypeCategory::Callback => NativeType::Callback(info.base_name.clone()),
            TypeCategory::Object => NativeType::Object(info.base_name.clone()),
        }
    }
}

fn numeric_native(kind: NumericKind) -> NativeType {
    match kind {
        NumericKind::Byte => NativeType::Int8,
        NumericKind::Octet => NativeType::UInt8,
        NumericKind::Short => NativeType::Int16,
        NumericKind::UnsignedShort => NativeType::UInt16,
        NumericKind::Long => NativeType::Int32,
        NumericKind::UnsignedLong => NativeType::UInt32,
        NumericKind::LongLong => NativeType::Int64,
        NumericKind::UnsignedLongLong => NativeType::UInt64,
        NumericKind::Float | NumericKind::UnrestrictedFloat => NativeType::Float32,
        NumericKind::Double | NumericKind::UnrestrictedDouble => NativeType::Float64,
    }
}

// ============================================================================
// Argument direction
// ============================================================================

bitflags! {
    /// Metadata that alters argument conversion.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct CoercionFlags: u8 {
        /// `[StrictTypeChecking]` / `[TypeChecking=Interface]` in scope.
        const STRICT = 1 << 0;
        /// `[Clamp]` on the argument.
        const CLAMP = 1 << 1;
    }
}

/// Optionality facts about the value being converted.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ArgumentFacts {
    pub is_optional: bool,
    pub is_variadic: bool,
    pub default_value: Option<DefaultValue>,
    pub default_kind: Option<DefaultKind>,
}

impl ArgumentFacts {
    pub fn from_argument(argument: &Argument) -> Self {
        Self {
            is_optional: argument.is_optional,
            is_variadic: argument.is_variadic,
            default_value: argument.default_value.clone(),
            default_kind: argument.extended_attributes.default,
        }
    }

    /// A plain required value, such as an attribute setter's input.
    pub fn required() -> Self {
        Self::default()
    }

    pub fn has_default(&self) -> bool {
        self.default_value.is_some() || self.default_kind.is_some()
    }

    pub fn is_effectively_optional(&self) -> bool {
        self.is_optional && !self.has_default()
    }
}

/// What a null or undefined script value turns into.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum NullPolicy {
    /// Null is a conversion failure.
    Reject,
    /// Null/undefined become the native null value.
    MapToNull,
    /// Undefined becomes the declared default.
    UseDefault,
    /// Undefined is treated as the argument being absent.
    TreatAsMissing,
    /// Null converts by ordinary script rules (`"null"`, `0`, `false`).
    Coerce,
}

/// Integer range handling.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RangePolicy {
    NotApplicable,
    /// `[Clamp]`: saturate to the native range.
    Clamp,
    /// Out-of-range values raise through the exception state.
    Raise,
}

/// Condition under which conversion fails.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum FailureCondition {
    /// Value is not an instance of the wrapper interface.
    NotInstanceOf { interface: String },
    NotCallable,
    NotObject,
    NotArrayLike,
    NoMatchingUnionMember,
    OutOfRange,
    /// NaN or infinity for a restricted floating-point type.
    NotFinite,
    /// Strict string checking rejects non-string primitives.
    NotStringLike,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ArgumentCoercion {
    pub native_type: NativeType,
    pub category: TypeCategory,
    pub is_nullable: bool,
    /// Optional without a default value.
    pub is_optional: bool,
    pub is_variadic: bool,
    pub null_policy: NullPolicy,
    pub range: RangePolicy,
    pub failure: Option<FailureCondition>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default_value: Option<DefaultValue>,
}

impl ArgumentCoercion {
    pub fn can_fail(&self) -> bool {
        self.failure.is_some()
    }
}

pub fn argument_coercion(
    info: &TypeInfo,
    facts: &ArgumentFacts,
    flags: CoercionFlags,
) -> ArgumentCoercion {
    let effectively_optional = facts.is_effectively_optional();
    let null_default = facts.default_value.as_ref().is_some_and(DefaultValue::is_null);

    let null_policy = if info.nullable
        || null_default
        || (effectively_optional && matches!(info.category, TypeCategory::Callback | TypeCategory::Object))
    {
        NullPolicy::MapToNull
    } else if facts.has_default() {
        NullPolicy::UseDefault
    } else if effectively_optional {
        NullPolicy::TreatAsMissing
    } else {
        match info.category {
            TypeCategory::Numeric(_)
            | TypeCategory::Boolean
            | TypeCategory::String
            | TypeCategory::Any => NullPolicy::Coerce,
            _ => NullPolicy::Reject,
        }
    };

    let range = match info.category {
        TypeCategory::Numeric(kind) if kind.is_integer() => {
            if flags.contains(CoercionFlags::CLAMP) {
                RangePolicy::Clamp
            } else {
                RangePolicy::Raise
            }
        }
        _ => RangePolicy::NotApplicable,
    };

    let failure = match info.category {
        TypeCategory::Wrapper => Some(FailureCondition::NotInstanceOf {
            interface: info.base_name.clone(),
        }),
        TypeCategory::Callback => Some(FailureCondition::NotCallable),
        TypeCategory::Object => Some(FailureCondition::NotObject),
        TypeCategory::Sequence => Some(FailureCondition::NotArrayLike),
        TypeCategory::Union => Some(FailureCondition::NoMatchingUnionMember),
        TypeCategory::Numeric(_) if range == RangePolicy::Raise => Some(FailureCondition::OutOfRange),
        TypeCategory::Numeric(NumericKind::Float | NumericKind::Double) => {
            Some(FailureCondition::NotFinite)
        }
        TypeCategory::String if flags.contains(CoercionFlags::STRICT) => {
            Some(FailureCondition::NotStringLike)
        }
        _ => None,
    };

    let element = NativeType::of(info);
    let native_type = if facts.is_variadic {
        NativeType::Vector(Box::new(element))
    } else {
        element
    };

    ArgumentCoercion {
        native_type,
        category: info.category,
        is_nullable: info.nullable,
        is_optional: effectively_optional,
        is_variadic: facts.is_variadic,
        null_policy,
        range,
        failure,
        default_value: facts.default_value.clone(),
    }
}

// ============================================================================
// Return direction
// ============================================================================

/// How a native value is boxed into a script value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Boxing {
    Primitive,
    String,
    /// Look up or create the wrapper for a native object.
    Wrap { interface: String },
    Object,
    ScriptValue,
    Sequence,
    /// Box whichever union slot is enabled.
    Union,
}

/// What an empty native result becomes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum NullResult {
    ScriptNull,
    Undefined,
    NotApplicable,
}

/// One member of a union return value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UnionSlot {
    pub enabled: String,
    pub value: String,
    pub native_type: NativeType,
    pub release_ownership: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReturnCoercion {
    pub native_type: NativeType,
    pub category: TypeCategory,
    pub boxing: Boxing,
    pub null_result: NullResult,
    /// The native result is handed over rather than shared.
    pub release_ownership: bool,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub union_slots: Vec<UnionSlot>,
}

impl ReturnCoercion {
    /// Native out-parameter names for a union result, in slot order:
    /// `result0Enabled, result0, result1Enabled, ...`.
    pub fn union_arguments(&self) -> Vec<&str> {
        self.union_slots
            .iter()
            .flat_map(|slot| [slot.enabled.as_str(), slot.value.as_str()])
            .collect()
    }
}

/// Return descriptor for `info`, or `None` for `void`.
///
/// `release` asks for ownership transfer of identity-bearing results.
/// Union slots decide this per member.
pub fn return_coercion(info: &TypeInfo, release: bool) -> Option<ReturnCoercion> {
    if info.is_void() {
        return None;
    }

    let boxing = match info.category {
        TypeCategory::Numeric(_) | TypeCategory::Boolean => Boxing::Primitive,
        TypeCategory::String => Boxing::String,
        TypeCategory::Wrapper => Boxing::Wrap {
            interface: info.base_name.clone(),
        },
        TypeCategory::Callback | TypeCategory::Object => Boxing::Object,
        TypeCategory::Any => Boxing::ScriptValue,
        TypeCategory::Sequence => Boxing::Sequence,
        TypeCategory::Union => Boxing::Union,
        TypeCategory::Void => Boxing::ScriptValue,
    };

    let null_result = if info.nullable || info.is_interface_like() || info.is_union() {
        NullResult::ScriptNull
    } else if info.category == TypeCategory::Any {
        NullResult::Undefined
    } else {
        NullResult::NotApplicable
    };

    let union_slots: Vec<UnionSlot> = info
        .members
        .iter()
        .enumerate()
        .map(|(i, member)| UnionSlot {
            enabled: format!("result{i}Enabled"),
            value: format!("result{i}"),
            native_type: NativeType::of(member),
            release_ownership: member.is_interface_like(),
        })
        .collect();

    let release_ownership = if info.is_union() {
        union_slots.iter().any(|slot| slot.release_ownership)
    } else {
        release && info.is_interface_like()
    };

    Some(ReturnCoercion {
        native_type: NativeType::of(info),
        category: info.category,
        boxing,
        null_result,
        release_ownership,
        union_slots,
    })
}
