//! Standard runtime types for NetDL.
//!
//! This crate provides the types a configuration can instantiate with
//! `new`, and the registry that makes them available to the evaluator.

mod actions;
mod functions;
mod network;
mod node;

use netdl_eval::Registry;

pub use actions::{fail_action, stdout_output, Output, PrintAction};
pub use functions::{numeric_function, string_function};
pub use network::ComputationNetwork;
pub use node::{as_node, ComputationNode, NodeAttrs, Operation};

/// A registry with every standard runtime type, printing to stdout.
pub fn standard_registry() -> Registry {
    registry_with_output(stdout_output())
}

/// A registry with every standard runtime type, sending `PrintAction`
/// output to `output`.
pub fn registry_with_output(output: Output) -> Registry {
    let mut registry = Registry::new();
    register_all(&mut registry, output);
    registry
}

/// Register every standard runtime type.
pub fn register_all(registry: &mut Registry, output: Output) {
    registry
        .register("ComputationNode", false, ComputationNode::construct)
        .register("ComputationNetwork", true, ComputationNetwork::construct)
        .register("NDLComputationNetwork", true, ComputationNetwork::construct)
        .register("StringFunction", false, string_function)
        .register("NumericFunction", false, numeric_function)
        .register("PrintAction", false, move |fields, location, path| {
            PrintAction::construct(&output, fields, location, path)
        })
        .register("FailAction", false, fail_action)
        .set_graph_node_type("ComputationNode");
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::rc::Rc;
    use netdl_eval::{downcast, Evaluator, ValueKind};
    use netdl_syntax::build::*;

    #[test]
    fn test_all_types_registered() {
        let registry = standard_registry();
        let names: Vec<_> = registry.type_names().collect();
        for name in [
            "ComputationNode",
            "ComputationNetwork",
            "NDLComputationNetwork",
            "StringFunction",
            "NumericFunction",
            "PrintAction",
            "FailAction",
        ] {
            assert!(names.contains(&name), "{name} not registered");
        }
        assert!(registry.get("NDLComputationNetwork").unwrap().is_record_like);
        assert!(!registry.get("ComputationNode").unwrap().is_record_like);
    }

    #[test]
    fn test_node_named_after_member() {
        let root = record([(
            "x",
            new_object("ComputationNode", record([("class", string("InputValue"))])),
        )]);
        let evaluator = Evaluator::new(standard_registry());
        let x = evaluator.evaluate_member(&root, "x").unwrap();
        let ValueKind::Object(object) = &x.kind else {
            panic!("expected an object");
        };
        assert_eq!(downcast::<ComputationNode>(object).unwrap().name(), "$.x");
    }

    #[test]
    fn test_print_output_is_captured() {
        let lines = Rc::new(std::cell::RefCell::new(Vec::new()));
        let sink = lines.clone();
        let output: Output = Rc::new(move |line: &str| sink.borrow_mut().push(line.to_string()));
        let registry = registry_with_output(output);
        let root = record([("do", new_object("PrintAction", record([("what", string("hello"))])))]);
        Evaluator::new(registry).run(&root).unwrap();
        assert_eq!(*lines.borrow(), ["hello"]);
    }
}
