//! Overload resolution for same-named operations.
//!
//! Script calls carry no static types, so an overloaded operation needs a
//! runtime dispatcher. This module computes, per member, the predicate that
//! selects it and, per group, the table the dispatcher walks.
//!
//! ## Algorithm
//!
//! 1. Partition signatures by `(name, is_static)`; instance members first
//! 2. Leave singleton groups undecorated
//! 3. Number group members `1..=N` in declaration order
//! 4. Build each member's predicate: one term per accepted argument count,
//!    each term carrying the type tests for the arguments at that count
//! 5. Attach the group summary to member `N`
//!
//! A variadic member contributes a single `argc >= required` term. The
//! dispatch order lists fixed-arity members before variadic ones so a
//! fixed-arity overload wins when both accept the same count.

mod predicate;

pub use predicate::{
    ArgumentCheck, ArgumentCount, DispatchPredicate, DispatchTerm, NullAllowance, TypeTest,
    ValueShape,
};

use idlbind_core::{CompileWarning, MemberFlags, Operation};
use rustc_hash::FxHashMap;
use serde::Serialize;
use tracing::{debug, warn};

use crate::classify::{TypeCategory, TypeInfo, classify};
use crate::context::CompilationContext;

/// Dispatch-relevant view of one argument.
#[derive(Debug, Clone, PartialEq)]
pub struct SignatureArgument {
    pub name: String,
    pub info: TypeInfo,
    /// Optional without a default value.
    pub is_optional: bool,
    pub is_variadic: bool,
    pub is_strict: bool,
}

/// Dispatch-relevant view of one operation or constructor.
#[derive(Debug, Clone, PartialEq)]
pub struct Signature {
    pub name: String,
    pub is_static: bool,
    pub arguments: Vec<SignatureArgument>,
}

impl Signature {
    pub fn from_operation(operation: &Operation, ctx: &CompilationContext<'_>) -> Self {
        let method_strict = operation
            .extended_attributes
            .has(MemberFlags::STRICT_TYPE_CHECKING);
        let arguments = operation
            .arguments
            .iter()
            .map(|argument| SignatureArgument {
                name: argument.name.clone(),
                info: classify(&argument.idl_type, ctx),
                is_optional: argument.is_effectively_optional(),
                is_variadic: argument.is_variadic,
                is_strict: method_strict
                    || argument
                        .extended_attributes
                        .has(MemberFlags::STRICT_TYPE_CHECKING),
            })
            .collect();
        Self {
            name: operation.name.clone(),
            is_static: operation.is_static,
            arguments,
        }
    }

    pub fn is_variadic(&self) -> bool {
        self.arguments.last().is_some_and(|a| a.is_variadic)
    }

    pub fn required_arguments(&self) -> usize {
        self.arguments
            .iter()
            .filter(|a| !a.is_optional && !a.is_variadic)
            .count()
    }
}

/// Type test for one argument, or `None` when count alone discriminates.
pub fn type_test(argument: &SignatureArgument) -> Option<TypeTest> {
    let info = &argument.info;
    match info.category {
        TypeCategory::String if argument.is_strict => Some(TypeTest::StringLike),
        TypeCategory::Sequence => Some(TypeTest::ArrayLike),
        TypeCategory::Callback => Some(TypeTest::NullOrFunction),
        TypeCategory::Wrapper => Some(TypeTest::InstanceOf {
            interface: info.base_name.clone(),
            allow_null: info.nullable,
        }),
        TypeCategory::Object => {
            let allow = match (info.nullable, argument.is_optional) {
                (true, true) => NullAllowance::UndefinedOrNull,
                (true, false) => NullAllowance::Null,
                (false, true) => NullAllowance::Undefined,
                (false, false) => NullAllowance::None,
            };
            Some(TypeTest::Object { allow })
        }
        _ => None,
    }
}

fn checks_for(arguments: &[SignatureArgument]) -> Vec<ArgumentCheck> {
    arguments
        .iter()
        .enumerate()
        .filter_map(|(index, argument)| type_test(argument).map(|test| ArgumentCheck { index, test }))
        .collect()
}

/// Predicate selecting `signature` among its overloads.
pub fn dispatch_predicate(signature: &Signature) -> DispatchPredicate {
    let args = &signature.arguments;

    if signature.is_variadic() {
        let required = signature.required_arguments();
        return DispatchPredicate {
            terms: vec![DispatchTerm {
                count: ArgumentCount::AtLeast(required),
                checks: checks_for(&args[..required]),
            }],
        };
    }

    let mut terms: Vec<DispatchTerm> = args
        .iter()
        .enumerate()
        .filter(|(_, argument)| argument.is_optional)
        .map(|(count, _)| DispatchTerm {
            count: ArgumentCount::Exactly(count),
            checks: checks_for(&args[..count]),
        })
        .collect();
    terms.push(DispatchTerm {
        count: ArgumentCount::Exactly(args.len()),
        checks: checks_for(args),
    });
    DispatchPredicate { terms }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OverloadMember {
    pub overload_index: usize,
    pub required_arguments: usize,
    pub is_variadic: bool,
}

/// Resolution table for one overloaded group.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OverloadGroup {
    pub name: String,
    pub is_static: bool,
    /// Declaration order.
    pub members: Vec<OverloadMember>,
    /// Overload indices in the order the dispatcher tests them.
    pub dispatch_order: Vec<usize>,
    pub minimum_required_arguments: usize,
    pub has_exception_state: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OverloadInfo {
    /// 1-based position within the group.
    pub overload_index: usize,
    pub predicate: DispatchPredicate,
    /// Present only on the member whose index equals the group size.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub group: Option<OverloadGroup>,
}

/// Resolve every overload group among `signatures`.
///
/// The result is parallel to `signatures`; members of singleton groups get
/// `None`. Members whose predicates share an identical term are reported as
/// collisions in `warnings`.
#[cfg_attr(feature = "profiling", profiling::function)]
pub fn resolve_overloads(
    interface: &str,
    signatures: &[Signature],
    warnings: &mut Vec<CompileWarning>,
) -> Vec<Option<OverloadInfo>> {
    let mut resolved: Vec<Option<OverloadInfo>> = vec![None; signatures.len()];

    for is_static in [false, true] {
        let mut order: Vec<&str> = Vec::new();
        let mut groups: FxHashMap<&str, Vec<usize>> = FxHashMap::default();
        for (position, signature) in signatures.iter().enumerate() {
            if signature.is_static != is_static {
                continue;
            }
            groups
                .entry(signature.name.as_str())
                .or_insert_with(|| {
                    order.push(signature.name.as_str());
                    Vec::new()
                })
                .push(position);
        }

        for name in order {
            let positions = &groups[name];
            if positions.len() < 2 {
                continue;
            }
            debug!(interface, name, is_static, members = positions.len(), "overload group");

            let predicates: Vec<DispatchPredicate> = positions
                .iter()
                .map(|&p| dispatch_predicate(&signatures[p]))
                .collect();
            report_collisions(interface, name, is_static, &predicates, warnings);

            let members: Vec<OverloadMember> = positions
                .iter()
                .enumerate()
                .map(|(i, &p)| OverloadMember {
                    overload_index: i + 1,
                    required_arguments: signatures[p].required_arguments(),
                    is_variadic: signatures[p].is_variadic(),
                })
                .collect();
            let minimum_required_arguments = members
                .iter()
                .map(|m| m.required_arguments)
                .min()
                .unwrap_or_default();
            let dispatch_order = members
                .iter()
                .filter(|m| !m.is_variadic)
                .chain(members.iter().filter(|m| m.is_variadic))
                .map(|m| m.overload_index)
                .collect();
            let mut group = Some(OverloadGroup {
                name: name.to_string(),
                is_static,
                members,
                dispatch_order,
                minimum_required_arguments,
                has_exception_state: minimum_required_arguments > 0,
            });

            let size = positions.len();
            for (i, (&position, predicate)) in positions.iter().zip(predicates).enumerate() {
                let overload_index = i + 1;
                resolved[position] = Some(OverloadInfo {
                    overload_index,
                    predicate,
                    group: if overload_index == size { group.take() } else { None },
                });
            }
        }
    }

    resolved
}

fn report_collisions(
    interface: &str,
    name: &str,
    is_static: bool,
    predicates: &[DispatchPredicate],
    warnings: &mut Vec<CompileWarning>,
) {
    for (i, first) in predicates.iter().enumerate() {
        for (j, second) in predicates.iter().enumerate().skip(i + 1) {
            let shared = first
                .terms
                .iter()
                .find(|term| second.terms.contains(term));
            if let Some(term) = shared {
                let warning = CompileWarning::OverloadCollision {
                    interface: interface.to_string(),
                    name: name.to_string(),
                    is_static,
                    first: i + 1,
                    second: j + 1,
                    argument_count: term.count.to_string(),
                };
                warn!("{warning}");
                warnings.push(warning);
            }
        }
    }
}
