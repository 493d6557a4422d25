//! Expression evaluation.
//!
//! A tree-walking evaluator over [`Expr`]. Record members, array elements
//! and named-parameter defaults are evaluated on first access through
//! [`Thunk`]s; everything else is evaluated eagerly when reached.

use std::cell::Cell;
use std::rc::Rc;

use indexmap::IndexMap;
use netdl_common::Location;
use netdl_syntax::{ArgList, BinOp, Expr, ExprKind, UnaryOp};
use tracing::debug;

use crate::infix::InfixSite;
use crate::{
    Array, EvalConfig, EvalError, EvalErrorKind, Lambda, Record, Registry, RuntimeType, Thunk,
    Value, ValueKind,
};

/// Separator between the segments of an expression path.
pub const PATH_SEPARATOR: char = '.';

/// Join an expression path and the id of a sub-expression.
pub fn join_path(path: &str, id: &str) -> String {
    match (path.is_empty(), id.is_empty()) {
        (true, _) => id.to_string(),
        (false, true) => path.to_string(),
        (false, false) => format!("{path}{PATH_SEPARATOR}{id}"),
    }
}

/// Stack space left below which evaluation moves to a fresh stack segment.
const RED_ZONE: usize = 128 * 1024;

/// Size of each stack segment allocated when the red zone is reached.
const STACK_SEGMENT: usize = 1024 * 1024;

/// Run `f`, growing the stack first if little of it remains. Nesting is
/// bounded by `EvalConfig::max_depth`, not by the thread's stack size.
#[inline]
fn ensure_sufficient_stack<R>(f: impl FnOnce() -> R) -> R {
    stacker::maybe_grow(RED_ZONE, STACK_SEGMENT, f)
}

struct Context {
    registry: Registry,
    config: EvalConfig,
    depth: Cell<usize>,
}

/// The evaluator.
///
/// Cloning is cheap; clones share the registry and are what deferred
/// computations hold on to.
#[derive(Clone)]
pub struct Evaluator {
    ctx: Rc<Context>,
}

/// Decrements the nesting depth when an evaluation frame is left.
struct DepthGuard<'a>(&'a Cell<usize>);

impl Drop for DepthGuard<'_> {
    fn drop(&mut self) {
        self.0.set(self.0.get() - 1);
    }
}

impl Evaluator {
    pub fn new(registry: Registry) -> Self {
        Self::with_config(registry, EvalConfig::default())
    }

    pub fn with_config(registry: Registry, config: EvalConfig) -> Self {
        Self {
            ctx: Rc::new(Context {
                registry,
                config,
                depth: Cell::new(0),
            }),
        }
    }

    pub fn registry(&self) -> &Registry {
        &self.ctx.registry
    }

    pub fn config(&self) -> &EvalConfig {
        &self.ctx.config
    }

    /// Evaluate a whole configuration under an empty outermost scope.
    #[tracing::instrument(level = "debug", skip_all)]
    pub fn evaluate_top_level(&self, root: &Rc<Expr>) -> Result<Value, EvalError> {
        self.evaluate(root, &Record::root(), "", &self.ctx.config.root_path)
    }

    /// Evaluate a configuration and fetch one of its top-level members.
    #[tracing::instrument(level = "debug", skip(self, root))]
    pub fn evaluate_member(&self, root: &Rc<Expr>, member: &str) -> Result<Value, EvalError> {
        let value = self.evaluate_top_level(root)?;
        self.member_of(&value, member, root.location)
            .map_err(|e| e.at(root.location))
    }

    /// Evaluate the action a configuration designates as `do`.
    pub fn run(&self, root: &Rc<Expr>) -> Result<Value, EvalError> {
        self.evaluate_member(root, "do")
    }

    /// Call a function with already evaluated arguments.
    ///
    /// The body runs in a fresh scope whose parent is the scope the lambda
    /// was defined in, under `caller_path` tagged with the lambda's name.
    pub fn apply(
        &self,
        lambda: &Lambda,
        args: Vec<Value>,
        named_args: IndexMap<String, Value>,
        caller_path: &str,
        location: Location,
    ) -> Result<Value, EvalError> {
        debug!(function = lambda.name(), args = args.len(), "applying function");
        let scope = lambda.bind_arguments(args, named_args, location)?;
        let id = format!("[{}]", lambda.name());
        self.evaluate(lambda.body(), &scope, caller_path, &id)
    }

    /// Instantiate a registered runtime type from a field record.
    pub fn construct(
        &self,
        type_name: &str,
        fields: &Rc<Record>,
        location: Location,
        path: &str,
    ) -> Result<Value, EvalError> {
        let runtime_type = self.runtime_type(type_name, location)?;
        self.construct_with(&runtime_type, type_name, fields, location, path)
    }

    fn runtime_type(&self, type_name: &str, location: Location) -> Result<RuntimeType, EvalError> {
        self.registry()
            .get(type_name)
            .cloned()
            .ok_or_else(|| {
                EvalError::new(EvalErrorKind::UnknownType(type_name.to_string()), location)
            })
    }

    fn construct_with(
        &self,
        runtime_type: &RuntimeType,
        type_name: &str,
        fields: &Rc<Record>,
        location: Location,
        path: &str,
    ) -> Result<Value, EvalError> {
        debug!(type_name, path, "constructing runtime object");
        let value = (runtime_type.construct)(fields, location, path)?;
        if let ValueKind::Object(object) = &value.kind {
            if let Some(nameable) = object.as_nameable() {
                nameable.set_name(path);
            }
        }
        Ok(value)
    }

    fn enter(&self, location: Location) -> Result<DepthGuard<'_>, EvalError> {
        let depth = &self.ctx.depth;
        if depth.get() >= self.ctx.config.max_depth {
            return Err(EvalError::new(
                EvalErrorKind::RecursionLimit(self.ctx.config.max_depth),
                location,
            ));
        }
        depth.set(depth.get() + 1);
        Ok(DepthGuard(depth))
    }

    /// Evaluate `expr` in `scope`. Its expression path is `path` joined with
    /// `id`.
    pub fn evaluate(
        &self,
        expr: &Rc<Expr>,
        scope: &Rc<Record>,
        path: &str,
        id: &str,
    ) -> Result<Value, EvalError> {
        let _guard = self.enter(expr.location)?;
        let path = join_path(path, id);
        ensure_sufficient_stack(|| self.eval_kind(expr, scope, &path))
            .map_err(|e| e.at(expr.location))
    }

    /// A thunk evaluating `expr` in `scope` on first access.
    fn deferred(&self, expr: &Rc<Expr>, scope: &Rc<Record>, path: &str, id: &str) -> Thunk {
        let evaluator = self.clone();
        let expr = expr.clone();
        let scope = scope.clone();
        let location = expr.location;
        let thunk_path = join_path(path, id);
        let (path, id) = (path.to_string(), id.to_string());
        Thunk::deferred(
            move || evaluator.evaluate(&expr, &scope, &path, &id),
            location,
            thunk_path,
        )
    }

    fn eval_kind(
        &self,
        expr: &Rc<Expr>,
        scope: &Rc<Record>,
        path: &str,
    ) -> Result<Value, EvalError> {
        let loc = expr.location;
        match &expr.kind {
            ExprKind::Number(n) => Ok(Value::number(*n, loc, path)),
            ExprKind::String(s) => Ok(Value::string(s, loc, path)),
            ExprKind::Bool(b) => Ok(Value::boolean(*b, loc, path)),

            ExprKind::New { type_name, fields } => {
                let type_location = if type_name.location.is_none() {
                    loc
                } else {
                    type_name.location
                };
                let runtime_type = self.runtime_type(&type_name.name, type_location)?;
                // Types that act as scopes themselves name their members
                // from scratch.
                let fields_path = if runtime_type.is_record_like { "" } else { path };
                let fields = self.evaluate(fields, scope, fields_path, "")?.as_record()?;
                self.construct_with(&runtime_type, &type_name.name, &fields, loc, path)
            }

            ExprKind::If {
                condition,
                then_branch,
                else_branch,
            } => {
                let branch = if self.evaluate(condition, scope, path, "if")?.as_bool()? {
                    then_branch
                } else {
                    else_branch
                };
                self.evaluate(branch, scope, path, "")
            }

            ExprKind::Lambda { params, body } => {
                let named = params
                    .named
                    .iter()
                    .map(|b| {
                        let name = b.name.name.clone();
                        let default = self.deferred(&b.value, scope, path, &name);
                        (name, default)
                    })
                    .collect();
                let positional = params.positional.iter().map(|p| p.name.clone()).collect();
                let lambda = Lambda::new(positional, named, body.clone(), scope.clone(), path);
                Ok(Value::new(ValueKind::Lambda(Rc::new(lambda)), loc, path))
            }

            ExprKind::Apply { func, args } => self.eval_apply(func, args, scope, path, loc),

            ExprKind::Record(bindings) => {
                let record = Record::child(scope);
                for binding in bindings {
                    let name = &binding.name.name;
                    if record.contains(name) {
                        return Err(EvalError::invalid_argument(
                            format!("duplicate record member {name}"),
                            binding.name.location,
                        ));
                    }
                    let thunk = self.deferred(&binding.value, &record, path, name);
                    record.add(name.clone(), binding.name.location, thunk);
                }
                Ok(Value::record(record, loc, path))
            }

            ExprKind::Var(id) => scope.lookup(id, loc),

            ExprKind::Member { base, member } => {
                let base = self.evaluate(base, scope, path, "")?;
                let location = if member.location.is_none() { loc } else { member.location };
                self.member_of(&base, &member.name, location)
            }

            ExprKind::Array(items) => {
                let mut array = Array::default();
                for (i, item) in items.iter().enumerate() {
                    let value = self.evaluate(item, scope, path, &format!("_vecelem{i}"))?;
                    match &value.kind {
                        ValueKind::Array(inner) => array.extend_from(inner),
                        _ => array.push(Thunk::ready(value)),
                    }
                }
                Ok(Value::array(array, loc, path))
            }

            ExprKind::ArrayComprehension { first, last, init } => {
                self.eval_comprehension(first, last, init, scope, path, loc)
            }

            ExprKind::Index { base, index } => {
                let array = self.evaluate(base, scope, path, "_vector")?.as_array()?;
                let index_value = self.evaluate(index, scope, path, "_index")?;
                array.at(index_value.as_int()?, index.location)
            }

            ExprKind::Unary { op, operand } => self.eval_unary(*op, operand, scope, path, loc),

            ExprKind::Binary { op, left, right } => {
                let left = self.evaluate(left, scope, path, &format!("[{op}](left)"))?;
                let right = self.evaluate(right, scope, path, &format!("[{op}](right)"))?;
                let site = InfixSite {
                    op: *op,
                    location: loc,
                    path,
                };
                self.registry().infix().apply(self, &site, left, right)
            }
        }
    }

    /// Look up `id` through the scope chain of a record or in a record-like
    /// object.
    fn member_of(&self, base: &Value, id: &str, location: Location) -> Result<Value, EvalError> {
        let found = match &base.kind {
            ValueKind::Record(record) => record.find(id),
            ValueKind::Object(object) => match object.as_record_like() {
                Some(record_like) => record_like.find_member(id),
                None => return Err(EvalError::type_mismatch("record", base.type_name(), location)),
            },
            _ => return Err(EvalError::type_mismatch("record", base.type_name(), location)),
        };
        found
            .ok_or_else(|| EvalError::unknown_identifier(id, location))?
            .force()
    }

    fn eval_apply(
        &self,
        func: &Rc<Expr>,
        args: &ArgList,
        scope: &Rc<Record>,
        path: &str,
        loc: Location,
    ) -> Result<Value, EvalError> {
        let lambda = self.evaluate(func, scope, path, "_lambda")?.as_lambda()?;
        let args_location = if args.location.is_none() { loc } else { args.location };
        if args.positional.len() != lambda.arity() {
            return Err(EvalError::new(
                EvalErrorKind::ArityMismatch {
                    expected: lambda.arity(),
                    given: args.positional.len(),
                },
                args_location,
            ));
        }

        let positional = args
            .positional
            .iter()
            .zip(lambda.params())
            .map(|(arg, param)| self.evaluate(arg, scope, path, &format!("({param})")))
            .collect::<Result<Vec<_>, _>>()?;
        let mut named = IndexMap::with_capacity(args.named.len());
        for binding in &args.named {
            let name = &binding.name.name;
            let value = self.evaluate(&binding.value, scope, path, name)?;
            if named.insert(name.clone(), value).is_some() {
                return Err(EvalError::invalid_argument(
                    format!("argument {name} is passed more than once"),
                    binding.name.location,
                ));
            }
        }
        self.apply(&lambda, positional, named, path, loc)
    }

    fn eval_comprehension(
        &self,
        first: &Rc<Expr>,
        last: &Rc<Expr>,
        init: &Rc<Expr>,
        scope: &Rc<Record>,
        path: &str,
        loc: Location,
    ) -> Result<Value, EvalError> {
        let first_index = self.evaluate(first, scope, path, "array_first")?.as_int()?;
        let last_index = self.evaluate(last, scope, path, "array_last")?.as_int()?;
        let lambda = self.evaluate(init, scope, path, "_initializer")?.as_lambda()?;
        if lambda.arity() != 1 {
            return Err(EvalError::new(
                EvalErrorKind::ArityMismatch {
                    expected: lambda.arity(),
                    given: 1,
                },
                init.location,
            ));
        }

        // Both bounds are exact integers, so the difference cannot overflow.
        let count = (last_index - first_index).saturating_add(1).max(0);
        let max_len = self.ctx.config.max_array_len;
        if count as u64 > max_len as u64 {
            return Err(EvalError::invalid_argument(
                format!(
                    "array [{first_index}..{last_index}] has {count} elements, \
                     more than the limit of {max_len}"
                ),
                loc,
            ));
        }

        let mut items = Vec::with_capacity(count as usize);
        for index in first_index..=last_index {
            let element_path = if path.is_empty() {
                String::new()
            } else {
                format!("{path}[{index}]")
            };
            let evaluator = self.clone();
            let lambda = lambda.clone();
            let index_value = Value::number(index as f64, loc, &element_path);
            let call_path = element_path.clone();
            let location = init.location;
            items.push(Thunk::deferred(
                move || {
                    evaluator
                        .apply(
                            &lambda,
                            vec![index_value.clone()],
                            IndexMap::new(),
                            &call_path,
                            location,
                        )
                        .map_err(|e| e.at(location))
                },
                location,
                element_path,
            ));
        }
        Ok(Value::array(Array::new(first_index, items), loc, path))
    }

    fn eval_unary(
        &self,
        op: UnaryOp,
        operand: &Rc<Expr>,
        scope: &Rc<Record>,
        path: &str,
        loc: Location,
    ) -> Result<Value, EvalError> {
        match op {
            UnaryOp::Not => {
                let b = self.evaluate(operand, scope, path, "_not")?.as_bool()?;
                Ok(Value::boolean(!b, loc, path))
            }
            UnaryOp::Plus => {
                let value = self.evaluate(operand, scope, path, "")?;
                match value.kind {
                    ValueKind::Number(_) | ValueKind::Object(_) => Ok(value),
                    _ => Err(EvalError::type_mismatch("number", value.type_name(), loc)),
                }
            }
            UnaryOp::Neg => {
                let value = self.evaluate(operand, scope, path, "_negate")?;
                match value.kind {
                    ValueKind::Number(n) => Ok(Value::number(-n, loc, path)),
                    ValueKind::Object(_) => {
                        let site = InfixSite {
                            op: BinOp::Mul,
                            location: loc,
                            path,
                        };
                        let minus_one = Value::number(-1.0, loc, path);
                        self.registry().infix().apply(self, &site, minus_one, value)
                    }
                    _ => Err(EvalError::type_mismatch("number", value.type_name(), loc)),
                }
            }
        }
    }
}
