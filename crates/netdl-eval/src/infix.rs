//! Infix operators, dispatched on the runtime types of both operands.
//!
//! Each operator has one optional handler per operand-type pair. A pair
//! without a handler is an `InvalidOperandTypes` error. Operands involving
//! objects do not compute anything directly: they instantiate the registry's
//! graph-node type with a class naming the operation, so `a + b` on two graph
//! nodes yields a new node representing the sum.

use std::cmp::Ordering;
use std::collections::HashMap;
use std::rc::Rc;

use netdl_common::Location;
use netdl_syntax::BinOp;

use crate::{Array, EvalError, EvalErrorKind, Evaluator, Record, Value, ValueKind};

/// Where an operator is being applied.
#[derive(Debug, Clone, Copy)]
pub struct InfixSite<'a> {
    pub op: BinOp,
    pub location: Location,
    /// Expression path of the operator expression.
    pub path: &'a str,
}

/// Handler for one operator applied to one operand-type pair.
pub type InfixFn = fn(&Evaluator, &InfixSite<'_>, Value, Value) -> Result<Value, EvalError>;

/// Classification of an operand pair for dispatch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OperandPair {
    Numbers,
    Strings,
    Bools,
    Objects,
    NumberObject,
    ObjectNumber,
    Unsupported,
}

impl OperandPair {
    pub fn of(left: &Value, right: &Value) -> Self {
        use ValueKind::*;
        match (&left.kind, &right.kind) {
            (Number(_), Number(_)) => OperandPair::Numbers,
            (String(_), String(_)) => OperandPair::Strings,
            (Bool(_), Bool(_)) => OperandPair::Bools,
            (Object(_), Object(_)) => OperandPair::Objects,
            (Number(_), Object(_)) => OperandPair::NumberObject,
            (Object(_), Number(_)) => OperandPair::ObjectNumber,
            (
                Number(_) | String(_) | Bool(_) | Record(_) | Array(_) | Lambda(_) | Object(_),
                Number(_) | String(_) | Bool(_) | Record(_) | Array(_) | Lambda(_) | Object(_),
            ) => OperandPair::Unsupported,
        }
    }
}

/// Handlers of one operator, by operand-type pair.
#[derive(Clone, Copy, Default)]
pub struct InfixOps {
    pub numbers: Option<InfixFn>,
    pub strings: Option<InfixFn>,
    pub bools: Option<InfixFn>,
    pub objects: Option<InfixFn>,
    pub number_object: Option<InfixFn>,
    pub object_number: Option<InfixFn>,
}

impl InfixOps {
    pub fn handler(&self, pair: OperandPair) -> Option<InfixFn> {
        match pair {
            OperandPair::Numbers => self.numbers,
            OperandPair::Strings => self.strings,
            OperandPair::Bools => self.bools,
            OperandPair::Objects => self.objects,
            OperandPair::NumberObject => self.number_object,
            OperandPair::ObjectNumber => self.object_number,
            OperandPair::Unsupported => None,
        }
    }
}

/// Operator symbol to handlers.
#[derive(Clone, Default)]
pub struct InfixTable {
    ops: HashMap<BinOp, InfixOps>,
}

impl InfixTable {
    pub fn empty() -> Self {
        Self::default()
    }

    /// The built-in operator set.
    pub fn standard() -> Self {
        let num = Some(number_op as InfixFn);
        let string = Some(string_op as InfixFn);
        let boolean = Some(bool_op as InfixFn);
        let graph = Some(graph_op as InfixFn);

        let mut table = Self::empty();
        table.set(
            BinOp::Mul,
            InfixOps {
                numbers: num,
                objects: graph,
                number_object: graph,
                object_number: graph,
                ..InfixOps::default()
            },
        );
        for op in [BinOp::Div, BinOp::Pow, BinOp::Rem] {
            table.set(op, InfixOps { numbers: num, ..InfixOps::default() });
        }
        table.set(BinOp::ElemMul, InfixOps { objects: graph, ..InfixOps::default() });
        table.set(
            BinOp::Add,
            InfixOps {
                numbers: num,
                strings: string,
                objects: graph,
                ..InfixOps::default()
            },
        );
        table.set(
            BinOp::Sub,
            InfixOps {
                numbers: num,
                objects: graph,
                ..InfixOps::default()
            },
        );
        for op in [BinOp::Eq, BinOp::Ne, BinOp::Lt, BinOp::Gt, BinOp::Le, BinOp::Ge] {
            table.set(
                op,
                InfixOps {
                    numbers: num,
                    strings: string,
                    bools: boolean,
                    ..InfixOps::default()
                },
            );
        }
        for op in [BinOp::And, BinOp::Or, BinOp::Xor] {
            table.set(op, InfixOps { bools: boolean, ..InfixOps::default() });
        }
        table
    }

    pub fn get(&self, op: BinOp) -> Option<&InfixOps> {
        self.ops.get(&op)
    }

    pub fn set(&mut self, op: BinOp, ops: InfixOps) {
        self.ops.insert(op, ops);
    }

    /// Apply `site.op` to two evaluated operands.
    pub fn apply(
        &self,
        evaluator: &Evaluator,
        site: &InfixSite<'_>,
        left: Value,
        right: Value,
    ) -> Result<Value, EvalError> {
        let handler = self
            .get(site.op)
            .and_then(|ops| ops.handler(OperandPair::of(&left, &right)));
        match handler {
            Some(handler) => handler(evaluator, site, left, right),
            None => Err(invalid_operands(site, &left, &right)),
        }
    }
}

fn invalid_operands(site: &InfixSite<'_>, left: &Value, right: &Value) -> EvalError {
    EvalError::new(
        EvalErrorKind::InvalidOperandTypes {
            op: site.op.symbol().to_string(),
            left: left.type_name(),
            right: right.type_name(),
        },
        site.location,
    )
}

fn compare<T: PartialOrd + ?Sized>(site: &InfixSite<'_>, left: &T, right: &T) -> Option<Value> {
    let ordering = left.partial_cmp(right);
    let result = match site.op {
        BinOp::Eq => ordering == Some(Ordering::Equal),
        BinOp::Ne => ordering != Some(Ordering::Equal),
        BinOp::Lt => ordering == Some(Ordering::Less),
        BinOp::Gt => ordering == Some(Ordering::Greater),
        BinOp::Le => matches!(ordering, Some(Ordering::Less | Ordering::Equal)),
        BinOp::Ge => matches!(ordering, Some(Ordering::Greater | Ordering::Equal)),
        _ => return None,
    };
    Some(Value::boolean(result, site.location, site.path))
}

fn number_op(
    _: &Evaluator,
    site: &InfixSite<'_>,
    left: Value,
    right: Value,
) -> Result<Value, EvalError> {
    let (l, r) = (left.as_number()?, right.as_number()?);
    let result = match site.op {
        BinOp::Add => l + r,
        BinOp::Sub => l - r,
        BinOp::Mul => l * r,
        BinOp::Div => l / r,
        BinOp::Rem => l % r,
        BinOp::Pow => l.powf(r),
        _ => return compare(site, &l, &r).ok_or_else(|| invalid_operands(site, &left, &right)),
    };
    Ok(Value::number(result, site.location, site.path))
}

fn string_op(
    _: &Evaluator,
    site: &InfixSite<'_>,
    left: Value,
    right: Value,
) -> Result<Value, EvalError> {
    let (l, r) = (left.as_str()?, right.as_str()?);
    if site.op == BinOp::Add {
        return Ok(Value::string(format!("{l}{r}"), site.location, site.path));
    }
    compare(site, l, r).ok_or_else(|| invalid_operands(site, &left, &right))
}

fn bool_op(
    _: &Evaluator,
    site: &InfixSite<'_>,
    left: Value,
    right: Value,
) -> Result<Value, EvalError> {
    let (l, r) = (left.as_bool()?, right.as_bool()?);
    let result = match site.op {
        BinOp::And => l && r,
        BinOp::Or => l || r,
        BinOp::Xor => l ^ r,
        _ => return compare(site, &l, &r).ok_or_else(|| invalid_operands(site, &left, &right)),
    };
    Ok(Value::boolean(result, site.location, site.path))
}

/// Instantiate the graph-node type for an operator applied to graph nodes.
///
/// A number operand is moved to the left, so `node * 3` and `3 * node` both
/// become a scale node with inputs `(3 : node)`.
fn graph_op(
    evaluator: &Evaluator,
    site: &InfixSite<'_>,
    left: Value,
    right: Value,
) -> Result<Value, EvalError> {
    let (left, right) = if right.is_number() { (right, left) } else { (left, right) };
    let class = if left.is_number() {
        match site.op {
            BinOp::Mul => "ScaleNode",
            _ => return Err(invalid_operands(site, &left, &right)),
        }
    } else {
        match site.op {
            BinOp::Add => "PlusNode",
            BinOp::Sub => "MinusNode",
            BinOp::Mul => "TimesNode",
            BinOp::ElemMul => "DiagTimesNode",
            _ => return Err(invalid_operands(site, &left, &right)),
        }
    };

    // The synthesized field record has no enclosing scope: the constructor
    // must find everything it needs right here.
    let fields = Rc::new(Record::new(None));
    fields.add_value("class", Value::string(class, site.location, site.path));
    let inputs_location = left.location;
    fields.add_value(
        "inputs",
        Value::array(Array::from_values([left, right]), inputs_location, site.path),
    );
    evaluator.construct(
        evaluator.registry().graph_node_type(),
        &fields,
        site.location,
        site.path,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Registry;

    fn site(op: BinOp) -> InfixSite<'static> {
        InfixSite {
            op,
            location: Location::at(1, 1),
            path: "$.x",
        }
    }

    fn n(x: f64) -> Value {
        Value::number(x, Location::NONE, "")
    }

    fn s(x: &str) -> Value {
        Value::string(x, Location::NONE, "")
    }

    fn b(x: bool) -> Value {
        Value::boolean(x, Location::NONE, "")
    }

    fn apply(op: BinOp, left: Value, right: Value) -> Result<Value, EvalError> {
        let evaluator = Evaluator::new(Registry::new());
        evaluator.registry().infix().apply(&evaluator, &site(op), left, right)
    }

    #[test]
    fn test_numbers() {
        let num = |op, l, r| apply(op, n(l), n(r)).unwrap().as_number().unwrap();
        assert_eq!(num(BinOp::Add, 2.0, 3.0), 5.0);
        assert_eq!(num(BinOp::Sub, 2.0, 3.0), -1.0);
        assert_eq!(num(BinOp::Div, 3.0, 2.0), 1.5);
        assert_eq!(num(BinOp::Rem, 7.0, 4.0), 3.0);
        assert_eq!(num(BinOp::Pow, 2.0, 10.0), 1024.0);
        assert!(apply(BinOp::Le, n(2.0), n(2.0)).unwrap().as_bool().unwrap());
        assert!(!apply(BinOp::Gt, n(2.0), n(2.0)).unwrap().as_bool().unwrap());
    }

    #[test]
    fn test_result_takes_operator_location_and_path() {
        let v = apply(BinOp::Mul, n(2.0), n(3.0)).unwrap();
        assert_eq!(v.location, Location::at(1, 1));
        assert_eq!(&*v.path, "$.x");
    }

    #[test]
    fn test_strings() {
        assert_eq!(apply(BinOp::Add, s("ab"), s("cd")).unwrap().as_str().unwrap(), "abcd");
        assert!(apply(BinOp::Lt, s("ab"), s("b")).unwrap().as_bool().unwrap());
        assert!(apply(BinOp::Sub, s("ab"), s("b")).is_err());
    }

    #[test]
    fn test_bools() {
        assert!(apply(BinOp::Xor, b(true), b(false)).unwrap().as_bool().unwrap());
        assert!(!apply(BinOp::And, b(true), b(false)).unwrap().as_bool().unwrap());
        assert!(apply(BinOp::Ne, b(true), b(false)).unwrap().as_bool().unwrap());
    }

    #[test]
    fn test_mixed_types_rejected() {
        let err = apply(BinOp::Add, n(1.0), s("a")).unwrap_err();
        assert_eq!(
            err.kind,
            EvalErrorKind::InvalidOperandTypes {
                op: "+".into(),
                left: "number".into(),
                right: "string".into()
            }
        );
        assert_eq!(err.location, Location::at(1, 1));
    }

    #[test]
    fn test_pair_classification() {
        assert_eq!(OperandPair::of(&n(1.0), &n(2.0)), OperandPair::Numbers);
        assert_eq!(OperandPair::of(&b(true), &n(2.0)), OperandPair::Unsupported);
    }
}
