//! Declared IDL types.
//!
//! `IdlType` is the structural form of a declared type. The textual form
//! (`unsigned long`, `DOMString?`, `sequence<Node>`, `(Node or DOMString)`,
//! `long[]`) is accepted through [`FromStr`] and produced by [`Display`], and
//! is also what the serde representation uses.
//!
//! [`Display`]: std::fmt::Display

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::CompileError;

/// Numeric primitive kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NumericKind {
    Byte,
    Octet,
    Short,
    UnsignedShort,
    Long,
    UnsignedLong,
    LongLong,
    UnsignedLongLong,
    Float,
    UnrestrictedFloat,
    Double,
    UnrestrictedDouble,
}

impl NumericKind {
    const ALL: [NumericKind; 12] = [
        NumericKind::Byte,
        NumericKind::Octet,
        NumericKind::Short,
        NumericKind::UnsignedShort,
        NumericKind::Long,
        NumericKind::UnsignedLong,
        NumericKind::LongLong,
        NumericKind::UnsignedLongLong,
        NumericKind::Float,
        NumericKind::UnrestrictedFloat,
        NumericKind::Double,
        NumericKind::UnrestrictedDouble,
    ];

    /// The IDL keyword for this kind.
    pub fn as_str(self) -> &'static str {
        match self {
            NumericKind::Byte => "byte",
            NumericKind::Octet => "octet",
            NumericKind::Short => "short",
            NumericKind::UnsignedShort => "unsigned short",
            NumericKind::Long => "long",
            NumericKind::UnsignedLong => "unsigned long",
            NumericKind::LongLong => "long long",
            NumericKind::UnsignedLongLong => "unsigned long long",
            NumericKind::Float => "float",
            NumericKind::UnrestrictedFloat => "unrestricted float",
            NumericKind::Double => "double",
            NumericKind::UnrestrictedDouble => "unrestricted double",
        }
    }

    /// Look up a kind by its IDL keyword (whitespace already normalized).
    pub fn from_keyword(keyword: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|kind| kind.as_str() == keyword)
    }

    pub fn is_integer(self) -> bool {
        !self.is_floating_point()
    }

    pub fn is_floating_point(self) -> bool {
        matches!(
            self,
            NumericKind::Float
                | NumericKind::UnrestrictedFloat
                | NumericKind::Double
                | NumericKind::UnrestrictedDouble
        )
    }

    pub fn is_unsigned(self) -> bool {
        matches!(
            self,
            NumericKind::Octet
                | NumericKind::UnsignedShort
                | NumericKind::UnsignedLong
                | NumericKind::UnsignedLongLong
        )
    }
}

/// A declared type.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum IdlType {
    Numeric(NumericKind),
    Boolean,
    DomString,
    Void,
    Any,
    /// `T?`
    Nullable(Box<IdlType>),
    /// `sequence<T>`
    Sequence(Box<IdlType>),
    /// `T[]`
    Array(Box<IdlType>),
    /// `(A or B or ...)`, members in declaration order.
    Union(Vec<IdlType>),
    /// Any other identifier: interfaces, callbacks, dictionaries, enums.
    Named(String),
}

impl IdlType {
    pub fn named(name: impl Into<String>) -> Self {
        IdlType::Named(name.into())
    }

    /// Wrap this type as `T?`. Already-nullable types are returned unchanged.
    pub fn nullable(self) -> Self {
        match self {
            IdlType::Nullable(_) => self,
            other => IdlType::Nullable(Box::new(other)),
        }
    }

    pub fn sequence_of(element: IdlType) -> Self {
        IdlType::Sequence(Box::new(element))
    }

    pub fn is_nullable(&self) -> bool {
        matches!(self, IdlType::Nullable(_))
    }

    /// The type with one level of nullability removed.
    pub fn inner(&self) -> &IdlType {
        match self {
            IdlType::Nullable(inner) => inner,
            other => other,
        }
    }

    pub fn is_void(&self) -> bool {
        matches!(self, IdlType::Void)
    }

    pub fn is_integer(&self) -> bool {
        matches!(self.inner(), IdlType::Numeric(kind) if kind.is_integer())
    }

    /// The identifier of a named type, looking through nullability.
    pub fn name(&self) -> Option<&str> {
        match self.inner() {
            IdlType::Named(name) => Some(name),
            _ => None,
        }
    }

    /// True when this is the named type `name` (nullable or not).
    pub fn is_named(&self, name: &str) -> bool {
        self.name() == Some(name)
    }

    /// Union member types, looking through nullability.
    pub fn union_members(&self) -> Option<&[IdlType]> {
        match self.inner() {
            IdlType::Union(members) => Some(members),
            _ => None,
        }
    }

    /// Element type of a sequence or array, looking through nullability.
    pub fn element_type(&self) -> Option<&IdlType> {
        match self.inner() {
            IdlType::Sequence(element) | IdlType::Array(element) => Some(element),
            _ => None,
        }
    }

    /// Textual form with nullability removed, e.g. `Node` for `Node?`.
    pub fn base_name(&self) -> String {
        self.inner().to_string()
    }
}

impl fmt::Display for IdlType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IdlType::Numeric(kind) => f.write_str(kind.as_str()),
            IdlType::Boolean => f.write_str("boolean"),
            IdlType::DomString => f.write_str("DOMString"),
            IdlType::Void => f.write_str("void"),
            IdlType::Any => f.write_str("any"),
            IdlType::Nullable(inner) => write!(f, "{inner}?"),
            IdlType::Sequence(element) => write!(f, "sequence<{element}>"),
            IdlType::Array(element) => write!(f, "{element}[]"),
            IdlType::Union(members) => {
                f.write_str("(")?;
                for (i, member) in members.iter().enumerate() {
                    if i > 0 {
                        f.write_str(" or ")?;
                    }
                    write!(f, "{member}")?;
                }
                f.write_str(")")
            }
            IdlType::Named(name) => f.write_str(name),
        }
    }
}

impl FromStr for IdlType {
    type Err = CompileError;

    fn from_str(text: &str) -> Result<Self, Self::Err> {
        parse_type(text.trim(), text)
    }
}

impl TryFrom<String> for IdlType {
    type Error = CompileError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<IdlType> for String {
    fn from(value: IdlType) -> Self {
        value.to_string()
    }
}

fn parse_type(text: &str, original: &str) -> Result<IdlType, CompileError> {
    if text.is_empty() {
        return Err(CompileError::invalid_type(original, "empty type"));
    }

    if let Some(rest) = text.strip_suffix('?') {
        let inner = parse_type(rest.trim_end(), original)?;
        if inner.is_nullable() {
            return Err(CompileError::invalid_type(original, "nested nullable type"));
        }
        return Ok(IdlType::Nullable(Box::new(inner)));
    }

    if let Some(rest) = text.strip_suffix("[]") {
        return Ok(IdlType::Array(Box::new(parse_type(rest.trim_end(), original)?)));
    }

    if text.starts_with('(') && text.ends_with(')') && encloses(text) {
        let body = &text[1..text.len() - 1];
        let members = split_union(body)
            .into_iter()
            .map(|member| parse_type(member.trim(), original))
            .collect::<Result<Vec<_>, _>>()?;
        if members.len() < 2 {
            return Err(CompileError::invalid_type(
                original,
                "union needs at least two member types",
            ));
        }
        return Ok(IdlType::Union(members));
    }

    if let Some(body) = text
        .strip_prefix("sequence")
        .map(str::trim_start)
        .and_then(|rest| rest.strip_prefix('<'))
        .and_then(|rest| rest.strip_suffix('>'))
    {
        return Ok(IdlType::Sequence(Box::new(parse_type(body.trim(), original)?)));
    }

    let keyword = text.split_whitespace().collect::<Vec<_>>().join(" ");
    if let Some(kind) = NumericKind::from_keyword(&keyword) {
        return Ok(IdlType::Numeric(kind));
    }
    match keyword.as_str() {
        "boolean" => Ok(IdlType::Boolean),
        "DOMString" => Ok(IdlType::DomString),
        "void" => Ok(IdlType::Void),
        "any" => Ok(IdlType::Any),
        name if is_identifier(name) => Ok(IdlType::Named(name.to_string())),
        _ => Err(CompileError::invalid_type(original, "unrecognized type syntax")),
    }
}

/// True when the opening parenthesis at index 0 closes at the final character.
fn encloses(text: &str) -> bool {
    let mut depth = 0usize;
    for (i, ch) in text.char_indices() {
        match ch {
            '(' => depth += 1,
            ')' => {
                depth = depth.saturating_sub(1);
                if depth == 0 {
                    return i == text.len() - 1;
                }
            }
            _ => {}
        }
    }
    false
}

/// Split a union body on top-level ` or ` separators.
fn split_union(body: &str) -> Vec<&str> {
    let mut parts = Vec::new();
    let mut depth = 0usize;
    let mut start = 0;
    let bytes = body.as_bytes();
    let mut i = 0;
    while i < bytes.len() {
        match bytes[i] {
            b'(' | b'<' => depth += 1,
            b')' | b'>' => depth = depth.saturating_sub(1),
            b' ' if depth == 0 && body[i..].starts_with(" or ") => {
                parts.push(&body[start..i]);
                i += 4;
                start = i;
                continue;
            }
            _ => {}
        }
        i += 1;
    }
    parts.push(&body[start..]);
    parts
}

fn is_identifier(text: &str) -> bool {
    let mut chars = text.chars();
    matches!(chars.next(), Some(c) if c.is_ascii_alphabetic() || c == '_')
        && chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}
