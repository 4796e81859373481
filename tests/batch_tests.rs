mod common;

use common::{dom_registry, long};
use idlbind::core::MemberKind;
use idlbind::prelude::*;

#[test]
fn compile_all_preserves_input_order() {
    let registry = dom_registry();
    let config = CompilerConfig::default();
    let ctx = CompilationContext::new(&registry, &config);

    let interfaces: Vec<Interface> = (0..32)
        .map(|i| {
            Interface::new(format!("Iface{i}"))
                .with_attribute(Attribute::new("value", long()))
                .with_operation(Operation::new("run", IdlType::Void))
        })
        .collect();
    let results = compile_all(&interfaces, &ctx);
    assert_eq!(results.len(), interfaces.len());
    for (i, result) in results.iter().enumerate() {
        assert_eq!(result.as_ref().unwrap().name(), format!("Iface{i}"));
    }
}

#[test]
fn one_failure_does_not_poison_the_batch() {
    let registry = dom_registry();
    let config = CompilerConfig::default();
    let ctx = CompilationContext::new(&registry, &config);

    let interfaces = vec![
        Interface::new("Good"),
        Interface::new("Bad").with_operation(
            Operation::new("m", IdlType::Void)
                .with_argument(Argument::new("rest", long()).variadic())
                .with_argument(Argument::new("tail", long())),
        ),
        Interface::new("AlsoGood"),
    ];
    let results = compile_all(&interfaces, &ctx);
    assert!(results[0].is_ok());
    assert!(matches!(
        results[1],
        Err(CompileError::VariadicArgumentNotLast { .. })
    ));
    assert!(results[2].is_ok());
}

#[test]
fn batch_matches_sequential_compilation() {
    let registry = dom_registry();
    let config = CompilerConfig::default();
    let ctx = CompilationContext::new(&registry, &config);

    let interfaces = vec![
        Interface::new("A").with_operation(
            Operation::new("f", IdlType::Void).with_argument(Argument::new("n", long()).optional()),
        ),
        Interface::new("B").with_parent("Node"),
    ];
    let batch = compile_all(&interfaces, &ctx);
    for (interface, result) in interfaces.iter().zip(batch) {
        assert_eq!(result, compile_interface(interface, &ctx));
    }
}

#[test]
fn registry_for_rejects_duplicates() {
    let interfaces = vec![Interface::new("Dup"), Interface::new("Dup")];
    assert!(matches!(
        registry_for(&interfaces),
        Err(Error::Registration(RegistrationError::DuplicateInterface { .. }))
    ));
    let ok = registry_for(&[Interface::new("A"), Interface::new("B").with_parent("A")]).unwrap();
    assert!(ok.inherits_interface("B", "A"));
}

#[test]
fn compile_errors_convert_into_facade_error() {
    let interface = Interface::new("Foo").with_operation(
        Operation::new("m", IdlType::Void)
            .with_argument(Argument::new("a", long()).optional())
            .with_argument(Argument::new("b", long())),
    );
    let run = || -> idlbind::Result<InterfaceDescriptor> {
        let registry = registry_for(std::slice::from_ref(&interface))?;
        let config = CompilerConfig::default();
        let ctx = CompilationContext::new(&registry, &config);
        Ok(compile_interface(&interface, &ctx)?)
    };
    assert!(matches!(run(), Err(Error::Compile(_))));
}

#[test]
fn interfaces_and_config_load_from_json() {
    let interface: Interface = serde_json::from_str(
        r#"{
            "name": "HTMLAnchorElement",
            "parent": "Element",
            "attributes": [
                {
                    "name": "href",
                    "idl_type": "DOMString",
                    "extended_attributes": [
                        { "name": "Reflect" },
                        { "name": "URL" }
                    ]
                },
                { "name": "rel", "idl_type": "DOMString" }
            ]
        }"#,
    )
    .unwrap();
    let config = CompilerConfig::from_json_str(
        r#"{ "exclusions": [ { "interface": "HTMLAnchorElement", "kind": "member", "name": "rel" } ] }"#,
    )
    .unwrap();
    assert!(config.exclusions.matches("HTMLAnchorElement", MemberKind::Member, "rel"));

    let registry = dom_registry();
    let ctx = CompilationContext::new(&registry, &config);
    let descriptor = compile_interface(&interface, &ctx).unwrap();
    assert!(descriptor.attribute("rel").is_none());
    let href = descriptor.attribute("href").unwrap();
    assert_eq!(href.getter.as_ref().unwrap().native_name, "getURLAttribute");
    assert!(descriptor.facts.is_node);
}

#[test]
fn invalid_config_is_reported() {
    assert!(matches!(
        CompilerConfig::from_json_str(r#"{ "exclusions": [ { "kind": "member" } ] }"#),
        Err(CompileError::Config { .. })
    ));
}

#[test]
fn descriptors_serialize_to_json() {
    let registry = dom_registry();
    let config = CompilerConfig::default();
    let ctx = CompilationContext::new(&registry, &config);
    let interface = Interface::new("Foo")
        .with_operation(Operation::new("bar", IdlType::Void).with_argument(Argument::new("a", long())))
        .with_operation(
            Operation::new("bar", IdlType::Void)
                .with_argument(Argument::new("a", long()))
                .with_argument(Argument::new("b", long())),
        );
    let descriptor = compile_interface(&interface, &ctx).unwrap();
    let json = to_json(&descriptor).unwrap();
    let value: serde_json::Value = serde_json::from_str(&json).unwrap();
    assert_eq!(value["facts"]["name"], "Foo");
    assert_eq!(value["methods"][1]["overload"]["overload_index"], 2);
    assert_eq!(
        value["methods"][1]["overload"]["group"]["minimum_required_arguments"],
        1
    );
    assert!(value["methods"][0]["overload"].get("group").is_none());
}
