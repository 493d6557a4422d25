//! Integration tests for the standard runtime types: computation graphs,
//! networks, functions and actions.

use std::cell::RefCell;
use std::rc::Rc;

use netdl_common::Location;
use netdl_eval::{
    downcast, object_id, EvalError, EvalErrorKind, Evaluator, ObjectRef, Value, ValueKind,
};
use netdl_std::{
    registry_with_output, standard_registry, ComputationNetwork, ComputationNode, NodeAttrs,
    Operation, Output,
};
use netdl_syntax::build::*;
use netdl_syntax::{BinOp, Expr, UnaryOp};

fn node_expr(class: &str, fields: Vec<(&str, Rc<Expr>)>) -> Rc<Expr> {
    let mut entries = vec![("class", string(class))];
    entries.extend(fields);
    new_object("ComputationNode", record(entries))
}

fn input() -> Rc<Expr> {
    node_expr("InputValue", vec![])
}

fn parameter(out_dim: f64, in_dim: f64) -> Rc<Expr> {
    node_expr("LearnableParameterNode", vec![("outDim", num(out_dim)), ("inDim", num(in_dim))])
}

fn delay(input: Rc<Expr>) -> Rc<Expr> {
    node_expr("DelayNode", vec![("input", input), ("deltaT", num(1.0))])
}

fn eval(root: &Rc<Expr>, id: &str) -> Result<Value, EvalError> {
    Evaluator::new(standard_registry()).evaluate_member(root, id)
}

fn object(value: &Value) -> ObjectRef {
    match &value.kind {
        ValueKind::Object(object) => object.clone(),
        _ => panic!("expected an object, got {}", value.type_name()),
    }
}

fn with_node<R>(value: &Value, f: impl FnOnce(&ComputationNode) -> R) -> R {
    let object = object(value);
    f(downcast::<ComputationNode>(&object).expect("not a computation node"))
}

fn with_network<R>(value: &Value, f: impl FnOnce(&ComputationNetwork) -> R) -> R {
    let object = object(value);
    f(downcast::<ComputationNetwork>(&object).expect("not a network"))
}

// ============================================================================
// Graph operators
// ============================================================================

#[test]
fn test_scaling_commutes() {
    let root = record([
        ("x", input()),
        ("a", mul(num(3.0), var("x"))),
        ("b", mul(var("x"), num(3.0))),
    ]);
    let rec = Evaluator::new(standard_registry())
        .evaluate_top_level(&root)
        .unwrap()
        .as_record()
        .unwrap();
    let x = object(&rec.get("x").unwrap());

    for id in ["a", "b"] {
        let value = rec.get(id).unwrap();
        with_node(&value, |node| {
            assert_eq!(node.operation(), Operation::Scale);
            assert_eq!(node.attrs(), NodeAttrs::Scale { factor: 3.0 });
            let inputs = node.inputs();
            assert_eq!(inputs.len(), 1);
            assert_eq!(object_id(&inputs[0]), object_id(&x));
            assert_eq!(node.name(), format!("$.{id}"));
        });
    }
}

#[test]
fn test_node_operators() {
    let root = record([
        ("x", input()),
        ("W", parameter(2.0, 3.0)),
        ("sum", add(var("x"), var("x"))),
        ("diff", binary(BinOp::Sub, var("x"), var("x"))),
        ("prod", mul(var("W"), var("x"))),
        ("elem", binary(BinOp::ElemMul, var("x"), var("x"))),
    ]);
    let cases = [
        ("sum", Operation::Plus),
        ("diff", Operation::Minus),
        ("prod", Operation::Times),
        ("elem", Operation::DiagTimes),
    ];
    for (id, operation) in cases {
        let value = eval(&root, id).unwrap();
        with_node(&value, |node| {
            assert_eq!(node.operation(), operation);
            assert_eq!(node.inputs().len(), 2);
        });
    }
}

#[test]
fn test_negating_a_node_scales_by_minus_one() {
    let root = record([("x", input()), ("n", unary(UnaryOp::Neg, var("x")))]);
    let value = eval(&root, "n").unwrap();
    with_node(&value, |node| {
        assert_eq!(node.attrs(), NodeAttrs::Scale { factor: -1.0 });
    });
}

#[test]
fn test_unsupported_node_operator() {
    let root = record([("x", input()), ("r", binary(BinOp::Div, var("x"), num(2.0)))]);
    let err = eval(&root, "r").unwrap_err();
    assert!(matches!(err.kind, EvalErrorKind::InvalidOperandTypes { .. }));

    let root = record([("x", input()), ("r", add(num(1.0), var("x")))]);
    let err = eval(&root, "r").unwrap_err();
    assert!(matches!(err.kind, EvalErrorKind::InvalidOperandTypes { .. }));
}

// ============================================================================
// Networks
// ============================================================================

#[test]
fn test_recurrent_network() {
    // net = new NDLComputationNetwork [
    //     x = InputValue ; W = Parameter(3, 3)
    //     h = Delay(z) ; z = W * x + h
    // ]
    let net = new_object(
        "NDLComputationNetwork",
        record([
            ("x", input()),
            ("W", parameter(3.0, 3.0)),
            ("h", delay(var("z"))),
            ("z", add(mul(var("W"), var("x")), var("h"))),
        ]),
    );
    let root = record([("net", net)]);
    let value = eval(&root, "net").unwrap();

    with_network(&value, |network| {
        assert_eq!(network.len(), 5);
        assert_eq!(network.inputs(), ["x"]);
        assert_eq!(network.parameters(), ["W"]);
        for name in ["x", "W", "h", "z"] {
            assert!(network.node(name).is_some(), "{name} missing");
        }

        let h = network.node("h").unwrap();
        let z = network.node("z").unwrap();
        let h_inputs = downcast::<ComputationNode>(h).unwrap().inputs();
        assert_eq!(h_inputs.len(), 1);
        assert_eq!(object_id(&h_inputs[0]), object_id(z));
    });
}

#[test]
fn test_delay_nodes_referencing_each_other() {
    let net = new_object(
        "ComputationNetwork",
        record([("P", delay(var("Q"))), ("Q", delay(var("P")))]),
    );
    let root = record([("net", net)]);
    let value = eval(&root, "net").unwrap();
    with_network(&value, |network| {
        assert_eq!(network.len(), 2);
        let p = downcast::<ComputationNode>(network.node("P").unwrap()).unwrap();
        assert_eq!(p.inputs().len(), 1);
    });
}

#[test]
fn test_member_access_into_network() {
    let net = new_object(
        "NDLComputationNetwork",
        record([("x", input()), ("dim", num(3.0)), ("y", mul(num(2.0), var("x")))]),
    );
    let root = record([
        ("net", net),
        ("dim", member(var("net"), "dim")),
        ("x", member(var("net"), "x")),
    ]);
    assert_eq!(eval(&root, "dim").unwrap().as_number().unwrap(), 3.0);
    let x = eval(&root, "x").unwrap();
    with_node(&x, |node| assert_eq!(node.operation(), Operation::InputValue));
}

#[test]
fn test_delay_input_must_be_a_node() {
    let net = new_object("ComputationNetwork", record([("d", delay(num(1.0)))]));
    let root = record([("net", net)]);
    let err = eval(&root, "net").unwrap_err();
    assert!(matches!(err.kind, EvalErrorKind::TypeMismatch { expected: "ComputationNode", .. }));
}

// ============================================================================
// Functions and actions
// ============================================================================

#[test]
fn test_functions_through_evaluator() {
    let root = record([
        (
            "s",
            new_object(
                "StringFunction",
                record([
                    ("what", string("Replace")),
                    ("arg", string("a.b")),
                    ("replacewhat", string(".")),
                    ("withwhat", string("_")),
                ]),
            ),
        ),
        (
            "n",
            new_object(
                "NumericFunction",
                record([
                    ("what", string("Length")),
                    ("arg", array(vec![num(1.0), num(2.0), num(3.0)])),
                ]),
            ),
        ),
    ]);
    assert_eq!(eval(&root, "s").unwrap().as_str().unwrap(), "a_b");
    assert_eq!(eval(&root, "n").unwrap().as_number().unwrap(), 3.0);
}

#[test]
fn test_print_action_runs_once() {
    let lines = Rc::new(RefCell::new(Vec::<String>::new()));
    let sink = lines.clone();
    let output: Output = Rc::new(move |line| sink.borrow_mut().push(line.to_string()));

    let root = record([
        ("greeting", add(string("hello "), string("world"))),
        ("do", new_object("PrintAction", record([("what", var("greeting"))]))),
        ("again", var("do")),
    ]);
    let evaluator = Evaluator::new(registry_with_output(output));
    evaluator.run(&root).unwrap();
    evaluator.evaluate_member(&root, "again").unwrap();

    // `run` and `evaluate_member` each evaluate the configuration afresh.
    assert_eq!(*lines.borrow(), ["hello world", "hello world"]);
}

#[test]
fn test_print_action_formats_non_strings() {
    let lines = Rc::new(RefCell::new(Vec::<String>::new()));
    let sink = lines.clone();
    let output: Output = Rc::new(move |line| sink.borrow_mut().push(line.to_string()));

    let print = new_object("PrintAction", record([("what", add(num(1.0), num(1.0)))]));
    let root = record([("do", print)]);
    Evaluator::new(registry_with_output(output)).run(&root).unwrap();
    assert_eq!(*lines.borrow(), ["2"]);
}

#[test]
fn test_fail_action_reported_at_new_expression() {
    let fail = located(
        new_object("FailAction", record([("what", string("stop here"))])),
        Location::at(4, 6),
    );
    let root = located(record([("do", fail)]), Location::at(1, 1));
    let err = Evaluator::new(standard_registry()).run(&root).unwrap_err();
    assert_eq!(err.kind, EvalErrorKind::UserRaised("stop here".into()));
    assert_eq!(err.location, Location::at(4, 6));
    assert_eq!(err.trail, vec![Location::at(1, 1)]);
}
