//! Function values.

use std::rc::Rc;

use indexmap::IndexMap;
use netdl_common::Location;
use netdl_syntax::Expr;

use crate::{EvalError, EvalErrorKind, Record, Thunk, Value};

/// A closure: parameters, body, and the record it was defined in.
///
/// Free identifiers in the body resolve through the defining record's scope
/// chain, never through the caller's.
pub struct Lambda {
    params: Vec<String>,
    named_params: IndexMap<String, Thunk>,
    body: Rc<Expr>,
    scope: Rc<Record>,
    name: String,
}

impl Lambda {
    /// `named_params` maps each optional parameter to its default value,
    /// which is evaluated lazily in the defining scope.
    pub fn new(
        params: Vec<String>,
        named_params: IndexMap<String, Thunk>,
        body: Rc<Expr>,
        scope: Rc<Record>,
        definition_path: &str,
    ) -> Self {
        let name = match definition_path.rsplit('.').next() {
            Some(last) if !last.is_empty() => last.to_string(),
            _ => "lambda".to_string(),
        };
        Self {
            params,
            named_params,
            body,
            scope,
            name,
        }
    }

    pub fn params(&self) -> &[String] {
        &self.params
    }

    /// Number of positional parameters.
    pub fn arity(&self) -> usize {
        self.params.len()
    }

    pub fn named_params(&self) -> &IndexMap<String, Thunk> {
        &self.named_params
    }

    /// Last segment of the expression path the lambda was defined under.
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn body(&self) -> &Rc<Expr> {
        &self.body
    }

    /// Build the scope a call evaluates the body in.
    ///
    /// The scope is a child of the defining record and holds the positional
    /// arguments, every passed named argument, and the defaults of declared
    /// named parameters that were not passed.
    pub fn bind_arguments(
        &self,
        args: Vec<Value>,
        named_args: IndexMap<String, Value>,
        location: Location,
    ) -> Result<Rc<Record>, EvalError> {
        if args.len() != self.params.len() {
            return Err(EvalError::new(
                EvalErrorKind::ArityMismatch {
                    expected: self.params.len(),
                    given: args.len(),
                },
                location,
            ));
        }

        let scope = Record::child(&self.scope);
        for (param, arg) in self.params.iter().zip(args) {
            scope.add_value(param.clone(), arg);
        }
        for (id, default) in &self.named_params {
            if !named_args.contains_key(id) && !scope.contains(id) {
                scope.add(id.clone(), default.location(), default.clone());
            }
        }
        for (id, arg) in named_args {
            if scope.contains(&id) {
                return Err(EvalError::invalid_argument(
                    format!("argument {id} is passed both by position and by name"),
                    location,
                ));
            }
            scope.add_value(id, arg);
        }
        Ok(scope)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use netdl_syntax::build::var;

    fn n(x: f64) -> Value {
        Value::number(x, Location::NONE, "")
    }

    fn lambda(params: &[&str], defaults: &[(&str, f64)]) -> Lambda {
        let named = defaults
            .iter()
            .map(|(id, v)| (id.to_string(), Thunk::ready(n(*v))))
            .collect();
        Lambda::new(
            params.iter().map(|p| p.to_string()).collect(),
            named,
            var("x"),
            Record::root(),
            "$.cfg.F",
        )
    }

    #[test]
    fn test_name_is_last_path_segment() {
        assert_eq!(lambda(&[], &[]).name(), "F");
        let anon = Lambda::new(vec![], IndexMap::new(), var("x"), Record::root(), "");
        assert_eq!(anon.name(), "lambda");
    }

    #[test]
    fn test_arity_mismatch() {
        let f = lambda(&["a", "b"], &[]);
        for given in [1, 3] {
            let args = (0..given).map(|i| n(i as f64)).collect();
            let err = f.bind_arguments(args, IndexMap::new(), Location::NONE).unwrap_err();
            assert_eq!(err.kind, EvalErrorKind::ArityMismatch { expected: 2, given });
        }
    }

    #[test]
    fn test_defaults_and_overrides() {
        let f = lambda(&["a"], &[("scale", 2.0), ("bias", 0.5)]);
        let mut named = IndexMap::new();
        named.insert("bias".to_string(), n(9.0));
        named.insert("extra".to_string(), n(1.0));
        let scope = f.bind_arguments(vec![n(1.0)], named, Location::NONE).unwrap();

        let get = |id: &str| scope.get(id).unwrap().as_number().unwrap();
        assert_eq!(get("a"), 1.0);
        assert_eq!(get("scale"), 2.0);
        assert_eq!(get("bias"), 9.0);
        assert_eq!(get("extra"), 1.0);
    }
}
