//! Dispatch predicates.
//!
//! A predicate is a disjunction of terms. Each term pairs an argument-count
//! test with zero or more per-argument type tests:
//!
//! ```text
//! (argc == 1) || (argc == 2 && isArray(args[1]))
//! ```
//!
//! Predicates are data. [`Display`] renders them as an expression for the
//! emitted glue, and [`DispatchPredicate::matches`] evaluates them against a
//! list of runtime value shapes.
//!
//! [`Display`]: std::fmt::Display

use std::fmt;

use idlbind_registry::InterfaceRegistry;
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(tag = "kind", content = "count", rename_all = "snake_case")]
pub enum ArgumentCount {
    Exactly(usize),
    /// Variadic members accept any count from the minimum upward.
    AtLeast(usize),
}

impl ArgumentCount {
    pub fn accepts(self, count: usize) -> bool {
        match self {
            ArgumentCount::Exactly(n) => count == n,
            ArgumentCount::AtLeast(n) => count >= n,
        }
    }
}

impl fmt::Display for ArgumentCount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ArgumentCount::Exactly(n) => write!(f, "argc == {n}"),
            ArgumentCount::AtLeast(n) => write!(f, "argc >= {n}"),
        }
    }
}

/// Which null-ish sentinels an object test also lets through.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum NullAllowance {
    None,
    Null,
    Undefined,
    UndefinedOrNull,
}

/// Type discrimination test for one argument position.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum TypeTest {
    /// Null, undefined, string or object (objects coerce later).
    StringLike,
    ArrayLike,
    NullOrFunction,
    /// Instance of the wrapper interface (or a subclass).
    InstanceOf { interface: String, allow_null: bool },
    /// Any object.
    Object { allow: NullAllowance },
}

impl TypeTest {
    pub fn accepts(&self, value: &ValueShape, registry: &InterfaceRegistry) -> bool {
        match self {
            TypeTest::StringLike => !matches!(value, ValueShape::Boolean | ValueShape::Number),
            TypeTest::ArrayLike => matches!(value, ValueShape::Array),
            TypeTest::NullOrFunction => matches!(value, ValueShape::Null | ValueShape::Function),
            TypeTest::InstanceOf {
                interface,
                allow_null,
            } => match value {
                ValueShape::Instance(name) => registry.inherits_interface(name, interface),
                ValueShape::Null => *allow_null,
                _ => false,
            },
            TypeTest::Object { allow } => {
                value.is_object()
                    || matches!(
                        (allow, value),
                        (NullAllowance::Null, ValueShape::Null)
                            | (NullAllowance::Undefined, ValueShape::Undefined)
                            | (
                                NullAllowance::UndefinedOrNull,
                                ValueShape::Null | ValueShape::Undefined
                            )
                    )
            }
        }
    }

    fn render(&self, index: usize, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let v = format!("args[{index}]");
        match self {
            TypeTest::StringLike => {
                write!(f, "isUndefinedOrNull({v}) || isString({v}) || isObject({v})")
            }
            TypeTest::ArrayLike => write!(f, "isArray({v})"),
            TypeTest::NullOrFunction => write!(f, "isNull({v}) || isFunction({v})"),
            TypeTest::InstanceOf {
                interface,
                allow_null,
            } => {
                if *allow_null {
                    write!(f, "isNull({v}) || ")?;
                }
                write!(f, "isInstanceOf({v}, {interface})")
            }
            TypeTest::Object { allow } => {
                match allow {
                    NullAllowance::None => {}
                    NullAllowance::Null => write!(f, "isNull({v}) || ")?,
                    NullAllowance::Undefined => write!(f, "isUndefined({v}) || ")?,
                    NullAllowance::UndefinedOrNull => write!(f, "isUndefinedOrNull({v}) || ")?,
                }
                write!(f, "isObject({v})")
            }
        }
    }

    fn is_disjunction(&self) -> bool {
        match self {
            TypeTest::StringLike | TypeTest::NullOrFunction => true,
            TypeTest::InstanceOf { allow_null, .. } => *allow_null,
            TypeTest::Object { allow } => *allow != NullAllowance::None,
            TypeTest::ArrayLike => false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct ArgumentCheck {
    pub index: usize,
    pub test: TypeTest,
}

impl fmt::Display for ArgumentCheck {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.test.is_disjunction() {
            f.write_str("(")?;
            self.test.render(self.index, f)?;
            f.write_str(")")
        } else {
            self.test.render(self.index, f)
        }
    }
}

/// One accepted argument count plus the type tests that apply at it.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct DispatchTerm {
    pub count: ArgumentCount,
    pub checks: Vec<ArgumentCheck>,
}

impl DispatchTerm {
    pub fn matches(&self, args: &[ValueShape], registry: &InterfaceRegistry) -> bool {
        self.count.accepts(args.len())
            && self.checks.iter().all(|check| {
                args.get(check.index)
                    .is_some_and(|value| check.test.accepts(value, registry))
            })
    }
}

impl fmt::Display for DispatchTerm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.count)?;
        for check in &self.checks {
            write!(f, " && {check}")?;
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize)]
pub struct DispatchPredicate {
    pub terms: Vec<DispatchTerm>,
}

impl DispatchPredicate {
    pub fn term_count(&self) -> usize {
        self.terms.len()
    }

    pub fn matches(&self, args: &[ValueShape], registry: &InterfaceRegistry) -> bool {
        self.terms.iter().any(|term| term.matches(args, registry))
    }
}

impl fmt::Display for DispatchPredicate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.terms.as_slice() {
            [] => f.write_str("false"),
            [only] => write!(f, "{only}"),
            terms => {
                for (i, term) in terms.iter().enumerate() {
                    if i > 0 {
                        f.write_str(" || ")?;
                    }
                    write!(f, "({term})")?;
                }
                Ok(())
            }
        }
    }
}

/// Runtime shape of one script argument, for predicate evaluation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValueShape {
    Undefined,
    Null,
    Boolean,
    Number,
    String,
    Function,
    Array,
    /// Plain object.
    Object,
    /// Wrapper of the named interface.
    Instance(String),
}

impl ValueShape {
    pub fn instance(interface: impl Into<String>) -> Self {
        ValueShape::Instance(interface.into())
    }

    pub fn is_object(&self) -> bool {
        matches!(
            self,
            ValueShape::Function | ValueShape::Array | ValueShape::Object | ValueShape::Instance(_)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use idlbind_core::Interface;

    fn registry() -> InterfaceRegistry {
        let mut r = InterfaceRegistry::new();
        r.register_interface(Interface::new("Node")).unwrap();
        r.register_interface(Interface::new("Element").with_parent("Node"))
            .unwrap();
        r
    }

    fn term(count: ArgumentCount, checks: Vec<(usize, TypeTest)>) -> DispatchTerm {
        DispatchTerm {
            count,
            checks: checks
                .into_iter()
                .map(|(index, test)| ArgumentCheck { index, test })
                .collect(),
        }
    }

    #[test]
    fn count_only_terms_render_bare() {
        let p = DispatchPredicate {
            terms: vec![term(ArgumentCount::Exactly(1), vec![])],
        };
        assert_eq!(p.to_string(), "argc == 1");
    }

    #[test]
    fn disjunction_renders_each_term_parenthesized() {
        let p = DispatchPredicate {
            terms: vec![
                term(ArgumentCount::Exactly(0), vec![]),
                term(
                    ArgumentCount::Exactly(1),
                    vec![(
                        0,
                        TypeTest::InstanceOf {
                            interface: "Node".into(),
                            allow_null: true,
                        },
                    )],
                ),
            ],
        };
        assert_eq!(
            p.to_string(),
            "(argc == 0) || (argc == 1 && (isNull(args[0]) || isInstanceOf(args[0], Node)))"
        );
    }

    #[test]
    fn object_test_renders_null_allowance() {
        let t = term(
            ArgumentCount::AtLeast(1),
            vec![
                (0, TypeTest::Object { allow: NullAllowance::Undefined }),
                (1, TypeTest::ArrayLike),
            ],
        );
        assert_eq!(
            t.to_string(),
            "argc >= 1 && (isUndefined(args[0]) || isObject(args[0])) && isArray(args[1])"
        );
    }

    #[test]
    fn instance_test_follows_inheritance() {
        let r = registry();
        let test = TypeTest::InstanceOf {
            interface: "Node".into(),
            allow_null: false,
        };
        assert!(test.accepts(&ValueShape::instance("Element"), &r));
        assert!(!test.accepts(&ValueShape::Null, &r));
        assert!(!test.accepts(&ValueShape::Object, &r));
    }

    #[test]
    fn string_like_accepts_objects_but_not_numbers() {
        let r = registry();
        assert!(TypeTest::StringLike.accepts(&ValueShape::Undefined, &r));
        assert!(TypeTest::StringLike.accepts(&ValueShape::Object, &r));
        assert!(!TypeTest::StringLike.accepts(&ValueShape::Number, &r));
    }

    #[test]
    fn predicate_evaluation_uses_count_and_checks() {
        let r = registry();
        let p = DispatchPredicate {
            terms: vec![
                term(ArgumentCount::Exactly(1), vec![(0, TypeTest::ArrayLike)]),
                term(ArgumentCount::AtLeast(2), vec![]),
            ],
        };
        assert!(p.matches(&[ValueShape::Array], &r));
        assert!(!p.matches(&[ValueShape::Object], &r));
        assert!(p.matches(&[ValueShape::Number, ValueShape::Number, ValueShape::Null], &r));
        assert!(!p.matches(&[], &r));
    }

    #[test]
    fn empty_predicate_never_matches() {
        let p = DispatchPredicate::default();
        assert_eq!(p.to_string(), "false");
        assert!(!p.matches(&[], &registry()));
    }
}
