//! Helpers for constructing expression trees by hand.
//!
//! Drivers that embed the evaluator without a parser, and tests, build trees
//! with these. Every node gets `Location::NONE`; use [`located`] to attach a
//! real location.

use std::rc::Rc;

use netdl_common::Location;

use crate::{ArgList, BinOp, Binding, Expr, ExprKind, Ident, ParamList, UnaryOp};

fn node(kind: ExprKind) -> Rc<Expr> {
    Rc::new(Expr::new(kind, Location::NONE))
}

fn bindings<'a>(entries: impl IntoIterator<Item = (&'a str, Rc<Expr>)>) -> Vec<Binding> {
    entries
        .into_iter()
        .map(|(name, value)| Binding {
            name: Ident::new(name, Location::NONE),
            value,
        })
        .collect()
}

/// Return a copy of `expr` carrying `location`.
pub fn located(expr: Rc<Expr>, location: Location) -> Rc<Expr> {
    let mut expr = Rc::unwrap_or_clone(expr);
    expr.location = location;
    Rc::new(expr)
}

pub fn num(n: f64) -> Rc<Expr> {
    node(ExprKind::Number(n))
}

pub fn string(s: &str) -> Rc<Expr> {
    node(ExprKind::String(s.to_string()))
}

pub fn boolean(b: bool) -> Rc<Expr> {
    node(ExprKind::Bool(b))
}

pub fn var(name: &str) -> Rc<Expr> {
    node(ExprKind::Var(name.to_string()))
}

/// `[ name = value ; ... ]`
pub fn record<'a>(entries: impl IntoIterator<Item = (&'a str, Rc<Expr>)>) -> Rc<Expr> {
    node(ExprKind::Record(bindings(entries)))
}

/// `base.member`
pub fn member(base: Rc<Expr>, name: &str) -> Rc<Expr> {
    node(ExprKind::Member {
        base,
        member: Ident::new(name, Location::NONE),
    })
}

/// `new TypeName fields`
pub fn new_object(type_name: &str, fields: Rc<Expr>) -> Rc<Expr> {
    node(ExprKind::New {
        type_name: Ident::new(type_name, Location::NONE),
        fields,
    })
}

pub fn if_then_else(condition: Rc<Expr>, then_branch: Rc<Expr>, else_branch: Rc<Expr>) -> Rc<Expr> {
    node(ExprKind::If {
        condition,
        then_branch,
        else_branch,
    })
}

/// `(p1, p2) => body`
pub fn lambda(params: &[&str], body: Rc<Expr>) -> Rc<Expr> {
    lambda_with_defaults(params, [], body)
}

/// `(p1, opt = default) => body`
pub fn lambda_with_defaults<'a>(
    params: &[&str],
    defaults: impl IntoIterator<Item = (&'a str, Rc<Expr>)>,
    body: Rc<Expr>,
) -> Rc<Expr> {
    node(ExprKind::Lambda {
        params: ParamList {
            positional: params
                .iter()
                .map(|p| Ident::new(*p, Location::NONE))
                .collect(),
            named: bindings(defaults),
        },
        body,
    })
}

/// `f(a, b)`
pub fn apply(func: Rc<Expr>, args: Vec<Rc<Expr>>) -> Rc<Expr> {
    apply_named(func, args, [])
}

/// `f(a, name = b)`
pub fn apply_named<'a>(
    func: Rc<Expr>,
    args: Vec<Rc<Expr>>,
    named: impl IntoIterator<Item = (&'a str, Rc<Expr>)>,
) -> Rc<Expr> {
    node(ExprKind::Apply {
        func,
        args: ArgList {
            positional: args,
            named: bindings(named),
            location: Location::NONE,
        },
    })
}

/// `a : b : c`
pub fn array(items: Vec<Rc<Expr>>) -> Rc<Expr> {
    node(ExprKind::Array(items))
}

/// `array [first..last] (init)`
pub fn array_of(first: Rc<Expr>, last: Rc<Expr>, init: Rc<Expr>) -> Rc<Expr> {
    node(ExprKind::ArrayComprehension { first, last, init })
}

/// `base[index]`
pub fn index(base: Rc<Expr>, index: Rc<Expr>) -> Rc<Expr> {
    node(ExprKind::Index { base, index })
}

pub fn unary(op: UnaryOp, operand: Rc<Expr>) -> Rc<Expr> {
    node(ExprKind::Unary { op, operand })
}

pub fn binary(op: BinOp, left: Rc<Expr>, right: Rc<Expr>) -> Rc<Expr> {
    node(ExprKind::Binary { op, left, right })
}

pub fn add(left: Rc<Expr>, right: Rc<Expr>) -> Rc<Expr> {
    binary(BinOp::Add, left, right)
}

pub fn mul(left: Rc<Expr>, right: Rc<Expr>) -> Rc<Expr> {
    binary(BinOp::Mul, left, right)
}
