//! Typed extended attributes.
//!
//! Extended attributes arrive from the parser as a raw `name → value` list
//! ([`RawExtendedAttribute`]). They are validated once, on ingestion, into an
//! [`ExtendedAttributes`] value whose fields carry typed payloads:
//!
//! - bare flags collapse into [`MemberFlags`]
//! - optional-value flags are `Option<...>` where an empty set means "bare"
//! - single-value flags are `Option<String>`
//! - list-value flags are bitflags or `Vec<String>`
//!
//! `|`-separated values are accepted wherever a list is allowed. Names that
//! are not part of the vocabulary are kept verbatim in `other`.

use bitflags::bitflags;
use serde::{Deserialize, Serialize};

use crate::error::CompileError;
use crate::idl_type::IdlType;

// ============================================================================
// Raw form
// ============================================================================

/// A raw extended-attribute payload as produced by the parser.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RawValue {
    Single(String),
    List(Vec<String>),
}

/// One `[Name]`, `[Name=Value]` or `[Name=(A, B)]` entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawExtendedAttribute {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<RawValue>,
}

impl RawExtendedAttribute {
    pub fn bare(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: None,
        }
    }

    pub fn single(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: Some(RawValue::Single(value.into())),
        }
    }

    pub fn list<I, S>(name: impl Into<String>, values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            name: name.into(),
            value: Some(RawValue::List(values.into_iter().map(Into::into).collect())),
        }
    }

    /// Payload values, with `|`-separated singles split into a list.
    fn values(&self) -> Vec<&str> {
        match &self.value {
            None => Vec::new(),
            Some(RawValue::Single(value)) => value
                .split('|')
                .map(str::trim)
                .filter(|v| !v.is_empty())
                .collect(),
            Some(RawValue::List(values)) => values
                .iter()
                .flat_map(|value| value.split('|'))
                .map(str::trim)
                .filter(|v| !v.is_empty())
                .collect(),
        }
    }
}

// ============================================================================
// Flag sets
// ============================================================================

bitflags! {
    /// Extended attributes that never carry a value.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
    pub struct MemberFlags: u32 {
        const CHECK_SECURITY = 1 << 0;
        const CLAMP = 1 << 1;
        const CUSTOM_ELEMENT_CALLBACKS = 1 << 2;
        const DO_NOT_CHECK_SIGNATURE = 1 << 3;
        const EXPOSE_JS_ACCESSORS = 1 << 4;
        const INITIALIZED_BY_EVENT_CONSTRUCTOR = 1 << 5;
        const NO_AUTO_SCOPE = 1 << 6;
        const NOT_ENUMERABLE = 1 << 7;
        const PER_WORLD_BINDINGS = 1 << 8;
        const READ_ONLY = 1 << 9;
        const REPLACEABLE = 1 << 10;
        const STRICT_TYPE_CHECKING = 1 << 11;
        const URL = 1 << 12;
        const UNFORGEABLE = 1 << 13;
        const ACTIVE_DOM_OBJECT = 1 << 14;
        const DEPENDENT_LIFETIME = 1 << 15;
        const EVENT_CONSTRUCTOR = 1 << 16;
        const OVERRIDE_BUILTINS = 1 << 17;
        const DO_NOT_CHECK_CONSTANTS = 1 << 18;
    }
}

bitflags! {
    /// Targets of `[Custom=...]`. An empty set is a bare `[Custom]`.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
    pub struct CustomTargets: u16 {
        const GETTER = 1 << 0;
        const SETTER = 1 << 1;
        const NEW = 1 << 2;
        const PROPERTY_GETTER = 1 << 3;
        const PROPERTY_ENUMERATOR = 1 << 4;
        const PROPERTY_QUERY = 1 << 5;
        const VISIT_DOM_WRAPPER = 1 << 6;
        const WRAP = 1 << 7;
        const TO_V8 = 1 << 8;
        const LEGACY_CALL_AS_FUNCTION = 1 << 9;
    }
}

bitflags! {
    /// Accessor scopes for `[DoNotCheckSecurity]`, `[RaisesException]` and
    /// `[Suppress]`. An empty set is the bare form.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
    pub struct AccessorScope: u8 {
        const GETTER = 1 << 0;
        const SETTER = 1 << 1;
        const CONSTRUCTOR = 1 << 2;
    }
}

bitflags! {
    /// Extra native arguments requested by `[CallWith]`, `[SetterCallWith]`
    /// and `[ConstructorCallWith]`.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
    pub struct CallWith: u8 {
        const SCRIPT_STATE = 1 << 0;
        const EXECUTION_CONTEXT = 1 << 1;
        const SCRIPT_ARGUMENTS = 1 << 2;
        const DOCUMENT = 1 << 3;
        const ACTIVE_WINDOW = 1 << 4;
        const FIRST_WINDOW = 1 << 5;
    }
}

bitflags! {
    /// `[TypeChecking=...]` modes.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
    pub struct TypeChecking: u8 {
        const INTERFACE = 1 << 0;
        const NULLABLE = 1 << 1;
        const UNRESTRICTED = 1 << 2;
    }
}

const BARE_FLAGS: &[(&str, MemberFlags)] = &[
    ("CheckSecurity", MemberFlags::CHECK_SECURITY),
    ("Clamp", MemberFlags::CLAMP),
    ("CustomElementCallbacks", MemberFlags::CUSTOM_ELEMENT_CALLBACKS),
    ("DoNotCheckSignature", MemberFlags::DO_NOT_CHECK_SIGNATURE),
    ("ExposeJSAccessors", MemberFlags::EXPOSE_JS_ACCESSORS),
    ("InitializedByEventConstructor", MemberFlags::INITIALIZED_BY_EVENT_CONSTRUCTOR),
    ("NoAutoScope", MemberFlags::NO_AUTO_SCOPE),
    ("NotEnumerable", MemberFlags::NOT_ENUMERABLE),
    ("PerWorldBindings", MemberFlags::PER_WORLD_BINDINGS),
    ("ReadOnly", MemberFlags::READ_ONLY),
    ("Replaceable", MemberFlags::REPLACEABLE),
    ("StrictTypeChecking", MemberFlags::STRICT_TYPE_CHECKING),
    ("URL", MemberFlags::URL),
    ("Unforgeable", MemberFlags::UNFORGEABLE),
    ("ActiveDOMObject", MemberFlags::ACTIVE_DOM_OBJECT),
    ("DependentLifetime", MemberFlags::DEPENDENT_LIFETIME),
    ("EventConstructor", MemberFlags::EVENT_CONSTRUCTOR),
    ("OverrideBuiltins", MemberFlags::OVERRIDE_BUILTINS),
    ("DoNotCheckConstants", MemberFlags::DO_NOT_CHECK_CONSTANTS),
];

const CUSTOM_TARGETS: &[(&str, CustomTargets)] = &[
    ("Getter", CustomTargets::GETTER),
    ("Setter", CustomTargets::SETTER),
    ("New", CustomTargets::NEW),
    ("PropertyGetter", CustomTargets::PROPERTY_GETTER),
    ("PropertyEnumerator", CustomTargets::PROPERTY_ENUMERATOR),
    ("PropertyQuery", CustomTargets::PROPERTY_QUERY),
    ("VisitDOMWrapper", CustomTargets::VISIT_DOM_WRAPPER),
    ("Wrap", CustomTargets::WRAP),
    ("ToV8", CustomTargets::TO_V8),
    ("LegacyCallAsFunction", CustomTargets::LEGACY_CALL_AS_FUNCTION),
];

const SETTER_ONLY: &[(&str, AccessorScope)] = &[("Setter", AccessorScope::SETTER)];

const GETTER_OR_SETTER: &[(&str, AccessorScope)] = &[
    ("Getter", AccessorScope::GETTER),
    ("Setter", AccessorScope::SETTER),
];

const RAISES_SCOPES: &[(&str, AccessorScope)] = &[
    ("Getter", AccessorScope::GETTER),
    ("Setter", AccessorScope::SETTER),
    ("Constructor", AccessorScope::CONSTRUCTOR),
];

const CALL_WITH: &[(&str, CallWith)] = &[
    ("ScriptState", CallWith::SCRIPT_STATE),
    ("ExecutionContext", CallWith::EXECUTION_CONTEXT),
    ("ScriptArguments", CallWith::SCRIPT_ARGUMENTS),
    ("Document", CallWith::DOCUMENT),
    ("ActiveWindow", CallWith::ACTIVE_WINDOW),
    ("FirstWindow", CallWith::FIRST_WINDOW),
];

const TYPE_CHECKING: &[(&str, TypeChecking)] = &[
    ("Interface", TypeChecking::INTERFACE),
    ("Nullable", TypeChecking::NULLABLE),
    ("Unrestricted", TypeChecking::UNRESTRICTED),
];

// ============================================================================
// Typed payloads
// ============================================================================

/// `[Reflect]` / `[Reflect=name]`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum Reflect {
    /// Reflects the content attribute named like the IDL attribute (lowercased).
    SameName,
    /// Reflects an explicitly named content attribute.
    Named(String),
}

/// `[Default]` / `[Default=Undefined]` / `[Default=NullString]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum DefaultKind {
    Unspecified,
    Undefined,
    NullString,
}

/// One `Type name` entry of `[SetWrapperReferenceTo]`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WrapperReference {
    pub name: String,
    pub idl_type: IdlType,
}

impl WrapperReference {
    fn parse(attribute: &str, text: &str) -> Result<Self, CompileError> {
        let (type_text, name) = text.rsplit_once(char::is_whitespace).ok_or_else(|| {
            CompileError::invalid_attribute(attribute, format!("expects 'Type name', found '{text}'"))
        })?;
        Ok(Self {
            name: name.to_string(),
            idl_type: type_text.trim().parse()?,
        })
    }
}

/// Validated extended attributes of one interface, member or argument.
///
/// Built through [`ExtendedAttributes::from_raw`] (or serde, which routes
/// through the same validation). Serialization emits the entries as they
/// were ingested.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "Vec<RawExtendedAttribute>", into = "Vec<RawExtendedAttribute>")]
pub struct ExtendedAttributes {
    /// Bare flags.
    pub flags: MemberFlags,
    /// `[Custom]`; empty set for the bare form.
    pub custom: Option<CustomTargets>,
    /// `[DoNotCheckSecurity]`; empty set for the bare form.
    pub do_not_check_security: Option<AccessorScope>,
    /// `[RaisesException]`; empty set for the bare form.
    pub raises_exception: Option<AccessorScope>,
    /// `[Suppress]`; empty set for the bare form.
    pub suppress: Option<AccessorScope>,
    pub reflect: Option<Reflect>,
    pub default: Option<DefaultKind>,

    pub cached_attribute: Option<String>,
    pub conditional: Option<String>,
    pub deprecate_as: Option<String>,
    pub implemented_as: Option<String>,
    pub measure_as: Option<String>,
    pub named_constructor: Option<String>,
    pub partial_interface_implemented_as: Option<String>,
    pub per_context_enabled: Option<String>,
    pub put_forwards: Option<String>,
    pub reflect_empty: Option<String>,
    pub reflect_invalid: Option<String>,
    pub reflect_missing: Option<String>,
    pub runtime_enabled: Option<String>,
    pub script_name: Option<String>,
    pub set_wrapper_reference_from: Option<String>,
    /// `[SetWrapperReferenceTo]` arguments, in declaration order.
    pub set_wrapper_reference_to: Vec<WrapperReference>,

    pub call_with: CallWith,
    pub setter_call_with: CallWith,
    pub constructor_call_with: CallWith,
    /// `[ReflectOnly]` keyword list; `None` when absent.
    pub reflect_only: Option<Vec<String>>,
    pub special_wrap_for: Vec<String>,
    pub type_checking: TypeChecking,

    /// Entries outside the known vocabulary, kept verbatim.
    pub other: Vec<RawExtendedAttribute>,

    source: Vec<RawExtendedAttribute>,
}

impl ExtendedAttributes {
    /// Validate a raw attribute list.
    pub fn from_raw(raw: Vec<RawExtendedAttribute>) -> Result<Self, CompileError> {
        let mut attrs = ExtendedAttributes::default();
        for entry in &raw {
            attrs.ingest(entry)?;
        }
        attrs.source = raw;
        Ok(attrs)
    }

    pub fn has(&self, flag: MemberFlags) -> bool {
        self.flags.contains(flag)
    }

    /// `[Custom]` bare, or `[Custom=...]` naming `target`.
    pub fn is_custom_for(&self, target: CustomTargets) -> bool {
        matches!(self.custom, Some(t) if t.is_empty() || t.contains(target))
    }

    /// `[Custom=...]` explicitly naming `target` (the bare form does not count).
    pub fn names_custom(&self, target: CustomTargets) -> bool {
        matches!(self.custom, Some(t) if t.contains(target))
    }

    /// `[RaisesException]` bare, or naming `scope`.
    pub fn raises_for(&self, scope: AccessorScope) -> bool {
        matches!(self.raises_exception, Some(s) if s.is_empty() || s.contains(scope))
    }

    /// `[Suppress]` with no value.
    pub fn is_suppressed(&self) -> bool {
        matches!(self.suppress, Some(s) if s.is_empty())
    }

    /// `[Suppress=Getter]` / `[Suppress=Setter]`.
    pub fn suppresses(&self, scope: AccessorScope) -> bool {
        matches!(self.suppress, Some(s) if s.contains(scope))
    }

    /// Raw entries as ingested.
    pub fn source(&self) -> &[RawExtendedAttribute] {
        &self.source
    }

    fn ingest(&mut self, entry: &RawExtendedAttribute) -> Result<(), CompileError> {
        let name = entry.name.as_str();

        if let Some((_, flag)) = BARE_FLAGS.iter().find(|(n, _)| *n == name) {
            if entry.value.is_some() {
                return Err(CompileError::invalid_attribute(name, "takes no value"));
            }
            self.flags |= *flag;
            return Ok(());
        }

        match name {
            "Custom" => self.custom = Some(parse_set(entry, CUSTOM_TARGETS)?),
            "DoNotCheckSecurity" => {
                self.do_not_check_security = Some(parse_set(entry, SETTER_ONLY)?)
            }
            "RaisesException" => self.raises_exception = Some(parse_set(entry, RAISES_SCOPES)?),
            "Suppress" => self.suppress = Some(parse_set(entry, GETTER_OR_SETTER)?),
            "Reflect" => {
                self.reflect = Some(match optional_single(entry)? {
                    None => Reflect::SameName,
                    Some(value) => Reflect::Named(value),
                })
            }
            "Default" => {
                self.default = Some(match optional_single(entry)?.as_deref() {
                    None => DefaultKind::Unspecified,
                    Some("Undefined") => DefaultKind::Undefined,
                    Some("NullString") => DefaultKind::NullString,
                    Some(other) => {
                        return Err(CompileError::invalid_attribute(
                            name,
                            format!("unknown value '{other}'"),
                        ));
                    }
                })
            }
            "CachedAttribute" => self.cached_attribute = Some(required_single(entry)?),
            "Conditional" => self.conditional = Some(required_single(entry)?),
            "DeprecateAs" => self.deprecate_as = Some(required_single(entry)?),
            "ImplementedAs" => self.implemented_as = Some(required_single(entry)?),
            "MeasureAs" => self.measure_as = Some(required_single(entry)?),
            "NamedConstructor" => self.named_constructor = Some(required_single(entry)?),
            "PartialInterfaceImplementedAs" => {
                self.partial_interface_implemented_as = Some(required_single(entry)?)
            }
            "PerContextEnabled" => self.per_context_enabled = Some(required_single(entry)?),
            "PutForwards" => self.put_forwards = Some(required_single(entry)?),
            "ReflectEmpty" => self.reflect_empty = Some(required_single(entry)?),
            "ReflectInvalid" => self.reflect_invalid = Some(required_single(entry)?),
            "ReflectMissing" => self.reflect_missing = Some(required_single(entry)?),
            "RuntimeEnabled" => self.runtime_enabled = Some(required_single(entry)?),
            "ScriptName" => self.script_name = Some(required_single(entry)?),
            "SetWrapperReferenceFrom" => {
                self.set_wrapper_reference_from = Some(required_single(entry)?)
            }
            "SetWrapperReferenceTo" => {
                self.set_wrapper_reference_to = required_list(entry)?
                    .iter()
                    .map(|text| WrapperReference::parse(name, text))
                    .collect::<Result<_, _>>()?
            }
            "CallWith" => self.call_with = parse_required_set(entry, CALL_WITH)?,
            "SetterCallWith" => self.setter_call_with = parse_required_set(entry, CALL_WITH)?,
            "ConstructorCallWith" => {
                self.constructor_call_with = parse_required_set(entry, CALL_WITH)?
            }
            "TypeChecking" => self.type_checking = parse_required_set(entry, TYPE_CHECKING)?,
            "ReflectOnly" => self.reflect_only = Some(required_list(entry)?),
            "SpecialWrapFor" => self.special_wrap_for = required_list(entry)?,
            _ => self.other.push(entry.clone()),
        }
        Ok(())
    }
}

impl TryFrom<Vec<RawExtendedAttribute>> for ExtendedAttributes {
    type Error = CompileError;

    fn try_from(raw: Vec<RawExtendedAttribute>) -> Result<Self, Self::Error> {
        ExtendedAttributes::from_raw(raw)
    }
}

impl From<ExtendedAttributes> for Vec<RawExtendedAttribute> {
    fn from(attrs: ExtendedAttributes) -> Self {
        attrs.source
    }
}

fn parse_set<F>(entry: &RawExtendedAttribute, table: &[(&str, F)]) -> Result<F, CompileError>
where
    F: bitflags::Flags + Copy,
{
    let mut set = F::empty();
    for value in entry.values() {
        match table.iter().find(|(n, _)| *n == value) {
            Some((_, flag)) => set.insert(*flag),
            None => {
                return Err(CompileError::invalid_attribute(
                    &entry.name,
                    format!("unknown value '{value}'"),
                ));
            }
        }
    }
    Ok(set)
}

fn parse_required_set<F>(
    entry: &RawExtendedAttribute,
    table: &[(&str, F)],
) -> Result<F, CompileError>
where
    F: bitflags::Flags + Copy,
{
    if entry.value.is_none() {
        return Err(CompileError::invalid_attribute(&entry.name, "requires a value"));
    }
    parse_set(entry, table)
}

fn optional_single(entry: &RawExtendedAttribute) -> Result<Option<String>, CompileError> {
    match &entry.value {
        None => Ok(None),
        Some(RawValue::Single(value)) => Ok(Some(value.trim().to_string())),
        Some(RawValue::List(_)) => Err(CompileError::invalid_attribute(
            &entry.name,
            "expects a single value, not a list",
        )),
    }
}

fn required_single(entry: &RawExtendedAttribute) -> Result<String, CompileError> {
    match optional_single(entry)? {
        Some(value) if !value.is_empty() => Ok(value),
        _ => Err(CompileError::invalid_attribute(&entry.name, "requires a value")),
    }
}

fn required_list(entry: &RawExtendedAttribute) -> Result<Vec<String>, CompileError> {
    let values: Vec<String> = entry.values().into_iter().map(str::to_string).collect();
    if values.is_empty() {
        return Err(CompileError::invalid_attribute(&entry.name, "requires a value"));
    }
    Ok(values)
}
