//! Expression tree nodes.
//! 表达式树节点。
//!
//! The tree is produced by an external parser and never mutated afterwards.
//! Children are reference counted so that deferred computations can hold on
//! to the sub-expression they will evaluate later.

use std::fmt;
use std::rc::Rc;

use netdl_common::Location;
use serde::{Deserialize, Serialize};

/// An expression.
/// 表达式。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Expr {
    pub kind: ExprKind,
    #[serde(default)]
    pub location: Location,
}

impl Expr {
    pub fn new(kind: ExprKind, location: Location) -> Self {
        Self { kind, location }
    }
}

/// An identifier together with where it was written.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Ident {
    pub name: String,
    #[serde(default)]
    pub location: Location,
}

impl Ident {
    pub fn new(name: impl Into<String>, location: Location) -> Self {
        Self {
            name: name.into(),
            location,
        }
    }
}

/// A named child expression: a record member, a named argument, or a
/// named parameter's default value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Binding {
    pub name: Ident,
    pub value: Rc<Expr>,
}

/// Parameter list of a lambda.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ParamList {
    #[serde(default)]
    pub positional: Vec<Ident>,
    /// Optional parameters with their default-value expressions.
    #[serde(default)]
    pub named: Vec<Binding>,
}

/// Argument list of a function application.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ArgList {
    #[serde(default)]
    pub positional: Vec<Rc<Expr>>,
    #[serde(default)]
    pub named: Vec<Binding>,
    #[serde(default)]
    pub location: Location,
}

/// Expression kind.
/// 表达式类型。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ExprKind {
    /// Number literal / 数字字面量
    Number(f64),
    /// String literal / 字符串字面量
    String(String),
    /// Boolean literal / 布尔字面量
    Bool(bool),

    /// Runtime object instantiation `new T [ a = 1 ]` / 运行时对象实例化
    New { type_name: Ident, fields: Rc<Expr> },

    /// Conditional `if c then a else b` / 条件表达式
    If {
        condition: Rc<Expr>,
        then_branch: Rc<Expr>,
        else_branch: Rc<Expr>,
    },

    /// Lambda `(x, y, opt = 1) => body` / Lambda 表达式
    Lambda { params: ParamList, body: Rc<Expr> },

    /// Function application `f(x, name = y)` / 函数调用
    Apply { func: Rc<Expr>, args: ArgList },

    /// Record `[ a = 1 ; b = a ]`; members see each other / 记录
    Record(Vec<Binding>),

    /// Identifier reference / 标识符引用
    Var(String),

    /// Member access `r.x` / 成员访问
    Member { base: Rc<Expr>, member: Ident },

    /// Array concatenation `a : b : c`; array operands are spliced / 数组
    Array(Vec<Rc<Expr>>),

    /// Array comprehension `array [first..last] (i => f(i))` / 数组构造
    ArrayComprehension {
        first: Rc<Expr>,
        last: Rc<Expr>,
        init: Rc<Expr>,
    },

    /// Index `xs[i]` / 索引访问
    Index { base: Rc<Expr>, index: Rc<Expr> },

    /// Unary operation / 一元运算
    Unary { op: UnaryOp, operand: Rc<Expr> },

    /// Binary operation / 二元运算
    Binary {
        op: BinOp,
        left: Rc<Expr>,
        right: Rc<Expr>,
    },
}

/// Unary operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum UnaryOp {
    /// `+x`
    Plus,
    /// `-x`
    Neg,
    /// `!x`
    Not,
}

impl UnaryOp {
    pub fn symbol(self) -> &'static str {
        match self {
            UnaryOp::Plus => "+",
            UnaryOp::Neg => "-",
            UnaryOp::Not => "!",
        }
    }
}

/// Infix operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BinOp {
    Mul,
    Div,
    /// `.*`, element-wise product
    ElemMul,
    /// `**`
    Pow,
    /// `%`
    Rem,
    Add,
    Sub,
    Eq,
    Ne,
    Lt,
    Gt,
    Le,
    Ge,
    And,
    Or,
    /// `^`, logical exclusive or
    Xor,
}

impl BinOp {
    pub const ALL: [BinOp; 16] = [
        BinOp::Mul,
        BinOp::Div,
        BinOp::ElemMul,
        BinOp::Pow,
        BinOp::Rem,
        BinOp::Add,
        BinOp::Sub,
        BinOp::Eq,
        BinOp::Ne,
        BinOp::Lt,
        BinOp::Gt,
        BinOp::Le,
        BinOp::Ge,
        BinOp::And,
        BinOp::Or,
        BinOp::Xor,
    ];

    pub fn symbol(self) -> &'static str {
        match self {
            BinOp::Mul => "*",
            BinOp::Div => "/",
            BinOp::ElemMul => ".*",
            BinOp::Pow => "**",
            BinOp::Rem => "%",
            BinOp::Add => "+",
            BinOp::Sub => "-",
            BinOp::Eq => "==",
            BinOp::Ne => "!=",
            BinOp::Lt => "<",
            BinOp::Gt => ">",
            BinOp::Le => "<=",
            BinOp::Ge => ">=",
            BinOp::And => "&&",
            BinOp::Or => "||",
            BinOp::Xor => "^",
        }
    }

    pub fn from_symbol(symbol: &str) -> Option<BinOp> {
        BinOp::ALL.into_iter().find(|op| op.symbol() == symbol)
    }

    pub fn is_comparison(self) -> bool {
        matches!(
            self,
            BinOp::Eq | BinOp::Ne | BinOp::Lt | BinOp::Gt | BinOp::Le | BinOp::Ge
        )
    }
}

impl fmt::Display for BinOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.symbol())
    }
}

impl fmt::Display for UnaryOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.symbol())
    }
}
