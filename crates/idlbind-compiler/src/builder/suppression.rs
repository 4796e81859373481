//! Member suppression.
//!
//! A member is suppressed by a configured exclusion rule or by its own
//! `[Suppress]` flag. Attributes are suppressed per accessor and only vanish
//! when both accessors are suppressed.

use idlbind_core::{AccessorScope, Attribute, CompilerConfig, Operation};

/// Per-accessor suppression of one attribute.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct AttributeSuppression {
    pub getter: bool,
    pub setter: bool,
}

impl AttributeSuppression {
    pub fn of(interface: &str, attribute: &Attribute, config: &CompilerConfig) -> Self {
        let attrs = &attribute.extended_attributes;
        let name = attribute.name.as_str();
        let everything = attrs.is_suppressed();
        Self {
            getter: everything
                || attrs.suppresses(AccessorScope::GETTER)
                || config.exclusions.excludes_getter(interface, name),
            setter: everything
                || attrs.suppresses(AccessorScope::SETTER)
                || config.exclusions.excludes_setter(interface, name),
        }
    }

    /// Both accessors gone: the attribute is dropped entirely.
    pub fn drops_attribute(self) -> bool {
        self.getter && self.setter
    }
}

/// Methods have no accessor split; any `[Suppress]` form drops them.
pub fn suppresses_method(interface: &str, operation: &Operation, config: &CompilerConfig) -> bool {
    operation.extended_attributes.suppress.is_some()
        || config.exclusions.excludes_member(interface, &operation.name)
}

#[cfg(test)]
mod tests {
    use super::*;
    use idlbind_core::{
        ExclusionList, ExclusionRule, ExtendedAttributes, IdlType, MemberKind, RawExtendedAttribute,
    };

    fn config(rules: Vec<ExclusionRule>) -> CompilerConfig {
        CompilerConfig::default().with_exclusions(rules.into_iter().collect::<ExclusionList>())
    }

    fn attribute(raw: Vec<RawExtendedAttribute>) -> Attribute {
        Attribute::new("value", IdlType::DomString)
            .with_extended_attributes(ExtendedAttributes::from_raw(raw).unwrap())
    }

    #[test]
    fn exclusion_rules_suppress_per_accessor() {
        let cfg = config(vec![ExclusionRule::exact("Input", MemberKind::Setter, "value")]);
        let s = AttributeSuppression::of("Input", &attribute(vec![]), &cfg);
        assert!(!s.getter);
        assert!(s.setter);
        assert!(!s.drops_attribute());
    }

    #[test]
    fn member_rule_suppresses_both_accessors() {
        let cfg = config(vec![ExclusionRule::wildcard("Input", MemberKind::Member)]);
        let s = AttributeSuppression::of("Input", &attribute(vec![]), &cfg);
        assert!(s.drops_attribute());
        assert!(!AttributeSuppression::of("Other", &attribute(vec![]), &cfg).drops_attribute());
    }

    #[test]
    fn suppress_flag_forms() {
        let cfg = CompilerConfig::default();
        let bare = attribute(vec![RawExtendedAttribute::bare("Suppress")]);
        assert!(AttributeSuppression::of("I", &bare, &cfg).drops_attribute());

        let getter = attribute(vec![RawExtendedAttribute::single("Suppress", "Getter")]);
        let s = AttributeSuppression::of("I", &getter, &cfg);
        assert!(s.getter && !s.setter);
    }

    #[test]
    fn getter_rule_plus_setter_flag_drops_attribute() {
        let cfg = config(vec![ExclusionRule::exact("I", MemberKind::Getter, "value")]);
        let attr = attribute(vec![RawExtendedAttribute::single("Suppress", "Setter")]);
        assert!(AttributeSuppression::of("I", &attr, &cfg).drops_attribute());
    }

    #[test]
    fn methods_suppressed_by_rule_or_any_flag() {
        let cfg = config(vec![ExclusionRule::exact("I", MemberKind::Member, "gone")]);
        assert!(suppresses_method("I", &Operation::new("gone", IdlType::Void), &cfg));
        assert!(!suppresses_method("I", &Operation::new("kept", IdlType::Void), &cfg));

        let flagged = Operation::new("kept", IdlType::Void).with_extended_attributes(
            ExtendedAttributes::from_raw(vec![RawExtendedAttribute::single("Suppress", "Getter")])
                .unwrap(),
        );
        assert!(suppresses_method("I", &flagged, &cfg));
    }
}
