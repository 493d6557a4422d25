//! Runtime values.

use std::fmt;
use std::rc::Rc;

use netdl_common::Location;

use crate::{EvalError, EvalErrorKind, Lambda, ObjectRef, Record, Thunk};

/// Largest integer magnitude a number holds exactly (2^53).
const MAX_EXACT_INT: f64 = 9_007_199_254_740_992.0;

/// A resolved runtime value.
///
/// Besides its payload a value remembers where it was defined and under which
/// expression path, so that errors can point back at the definition and
/// constructed objects can be named after it.
#[derive(Clone)]
pub struct Value {
    pub kind: ValueKind,
    pub location: Location,
    pub path: Rc<str>,
}

/// The payload of a value.
#[derive(Clone)]
pub enum ValueKind {
    /// Number value
    Number(f64),
    /// String value
    String(Rc<str>),
    /// Boolean value
    Bool(bool),
    /// Record (lexical scope)
    Record(Rc<Record>),
    /// Array with its own index range
    Array(Rc<Array>),
    /// Function value
    Lambda(Rc<Lambda>),
    /// Object built by a registered runtime type
    Object(ObjectRef),
}

impl Value {
    pub fn new(kind: ValueKind, location: Location, path: &str) -> Self {
        Self {
            kind,
            location,
            path: Rc::from(path),
        }
    }

    pub fn number(n: f64, location: Location, path: &str) -> Self {
        Self::new(ValueKind::Number(n), location, path)
    }

    pub fn string(s: impl AsRef<str>, location: Location, path: &str) -> Self {
        Self::new(ValueKind::String(Rc::from(s.as_ref())), location, path)
    }

    pub fn boolean(b: bool, location: Location, path: &str) -> Self {
        Self::new(ValueKind::Bool(b), location, path)
    }

    pub fn record(record: Rc<Record>, location: Location, path: &str) -> Self {
        Self::new(ValueKind::Record(record), location, path)
    }

    pub fn array(array: Array, location: Location, path: &str) -> Self {
        Self::new(ValueKind::Array(Rc::new(array)), location, path)
    }

    pub fn object(object: ObjectRef, location: Location, path: &str) -> Self {
        Self::new(ValueKind::Object(object), location, path)
    }

    /// Name of the value's type as used in error messages.
    pub fn type_name(&self) -> String {
        match &self.kind {
            ValueKind::Number(_) => "number".to_string(),
            ValueKind::String(_) => "string".to_string(),
            ValueKind::Bool(_) => "boolean".to_string(),
            ValueKind::Record(_) => "record".to_string(),
            ValueKind::Array(_) => "array".to_string(),
            ValueKind::Lambda(_) => "function".to_string(),
            ValueKind::Object(obj) => obj.type_name().to_string(),
        }
    }

    fn mismatch(&self, expected: &'static str) -> EvalError {
        EvalError::type_mismatch(expected, self.type_name(), self.location)
    }

    pub fn is_number(&self) -> bool {
        matches!(self.kind, ValueKind::Number(_))
    }

    pub fn is_string(&self) -> bool {
        matches!(self.kind, ValueKind::String(_))
    }

    pub fn is_object(&self) -> bool {
        matches!(self.kind, ValueKind::Object(_))
    }

    pub fn as_number(&self) -> Result<f64, EvalError> {
        match self.kind {
            ValueKind::Number(n) => Ok(n),
            _ => Err(self.mismatch("number")),
        }
    }

    /// The value as an integer. Fractional numbers and numbers too large to
    /// be represented exactly are rejected.
    pub fn as_int(&self) -> Result<i64, EvalError> {
        let n = self.as_number()?;
        if n.fract() != 0.0 || !n.is_finite() || n.abs() > MAX_EXACT_INT {
            return Err(EvalError::type_mismatch("integer", n.to_string(), self.location));
        }
        Ok(n as i64)
    }

    pub fn as_bool(&self) -> Result<bool, EvalError> {
        match self.kind {
            ValueKind::Bool(b) => Ok(b),
            _ => Err(self.mismatch("boolean")),
        }
    }

    pub fn as_str(&self) -> Result<&str, EvalError> {
        match &self.kind {
            ValueKind::String(s) => Ok(s),
            _ => Err(self.mismatch("string")),
        }
    }

    pub fn as_record(&self) -> Result<Rc<Record>, EvalError> {
        match &self.kind {
            ValueKind::Record(r) => Ok(r.clone()),
            _ => Err(self.mismatch("record")),
        }
    }

    pub fn as_array(&self) -> Result<Rc<Array>, EvalError> {
        match &self.kind {
            ValueKind::Array(a) => Ok(a.clone()),
            _ => Err(self.mismatch("array")),
        }
    }

    pub fn as_lambda(&self) -> Result<Rc<Lambda>, EvalError> {
        match &self.kind {
            ValueKind::Lambda(l) => Ok(l.clone()),
            _ => Err(self.mismatch("function")),
        }
    }

    pub fn as_object(&self) -> Result<ObjectRef, EvalError> {
        match &self.kind {
            ValueKind::Object(o) => Ok(o.clone()),
            _ => Err(self.mismatch("object")),
        }
    }
}

impl fmt::Debug for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.kind {
            ValueKind::Number(n) => write!(f, "{n}"),
            ValueKind::String(s) => write!(f, "\"{s}\""),
            ValueKind::Bool(b) => write!(f, "{b}"),
            ValueKind::Record(r) => {
                write!(f, "[")?;
                for (i, name) in r.member_names().iter().enumerate() {
                    if i > 0 {
                        write!(f, ";")?;
                    }
                    write!(f, " {name}")?;
                }
                write!(f, " ]")
            }
            ValueKind::Array(a) => write!(f, "<array {}..{}>", a.first(), a.last()),
            ValueKind::Lambda(l) => write!(f, "<function {}>", l.name()),
            ValueKind::Object(o) => write!(f, "<{}>", o.type_name()),
        }
    }
}

/// An array of lazily computed elements indexed from `first` to `last`.
#[derive(Clone, Default)]
pub struct Array {
    first: i64,
    items: Vec<Thunk>,
}

impl Array {
    pub fn new(first: i64, items: Vec<Thunk>) -> Self {
        Self { first, items }
    }

    /// A zero-based array of already computed values.
    pub fn from_values(values: impl IntoIterator<Item = Value>) -> Self {
        Self::new(0, values.into_iter().map(Thunk::ready).collect())
    }

    pub fn first(&self) -> i64 {
        self.first
    }

    /// Last valid index; `first - 1` when empty.
    pub fn last(&self) -> i64 {
        let len = i64::try_from(self.items.len()).unwrap_or(i64::MAX);
        self.first.saturating_add(len).saturating_sub(1)
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn push(&mut self, item: Thunk) {
        self.items.push(item);
    }

    /// Append every element of `other`, keeping unresolved elements lazy.
    pub fn extend_from(&mut self, other: &Array) {
        self.items.extend(other.items.iter().cloned());
    }

    pub fn thunks(&self) -> &[Thunk] {
        &self.items
    }

    /// Resolve and return the element at `index`.
    pub fn at(&self, index: i64, location: Location) -> Result<Value, EvalError> {
        let item = index
            .checked_sub(self.first)
            .and_then(|offset| usize::try_from(offset).ok())
            .and_then(|offset| self.items.get(offset));
        match item {
            Some(item) => item.force(),
            None => Err(EvalError::new(
                EvalErrorKind::IndexOutOfBounds {
                    index,
                    first: self.first,
                    last: self.last(),
                },
                location,
            )),
        }
    }

    /// Resolve every element, in index order.
    pub fn values(&self) -> Result<Vec<Value>, EvalError> {
        self.items.iter().map(Thunk::force).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn n(x: f64) -> Value {
        Value::number(x, Location::NONE, "")
    }

    #[test]
    fn test_coercion_failure_names_expected_type() {
        let v = Value::string("a", Location::at(3, 9), "$.s");
        let err = v.as_number().unwrap_err();
        assert_eq!(
            err.kind,
            EvalErrorKind::TypeMismatch {
                expected: "number",
                found: "string".to_string()
            }
        );
        assert_eq!(err.location, Location::at(3, 9));
    }

    #[test]
    fn test_as_int_rejects_fractions() {
        assert_eq!(n(4.0).as_int().unwrap(), 4);
        assert!(n(4.5).as_int().is_err());
    }

    #[test]
    fn test_as_int_rejects_huge_numbers() {
        assert_eq!(n(-9_007_199_254_740_992.0).as_int().unwrap(), -9_007_199_254_740_992);
        for x in [1e300, -1e20, f64::INFINITY] {
            let err = n(x).as_int().unwrap_err();
            assert!(matches!(err.kind, EvalErrorKind::TypeMismatch { expected: "integer", .. }));
        }
    }

    #[test]
    fn test_index_at_extreme_bounds() {
        let arr = Array::new(i64::MAX, vec![Thunk::ready(n(1.0))]);
        assert_eq!(arr.at(i64::MAX, Location::NONE).unwrap().as_number().unwrap(), 1.0);
        assert!(arr.at(i64::MIN, Location::NONE).is_err());

        let empty = Array::new(i64::MIN, Vec::new());
        assert!(empty.at(i64::MIN, Location::NONE).is_err());
    }

    #[test]
    fn test_array_range() {
        let arr = Array::new(1, vec![Thunk::ready(n(10.0)), Thunk::ready(n(20.0))]);
        assert_eq!((arr.first(), arr.last()), (1, 2));
        assert_eq!(arr.at(2, Location::NONE).unwrap().as_number().unwrap(), 20.0);
        let err = arr.at(0, Location::at(1, 1)).unwrap_err();
        assert_eq!(
            err.kind,
            EvalErrorKind::IndexOutOfBounds {
                index: 0,
                first: 1,
                last: 2
            }
        );
    }

    #[test]
    fn test_empty_array_range() {
        let arr = Array::default();
        assert!(arr.is_empty());
        assert_eq!(arr.last(), -1);
        assert!(arr.at(0, Location::NONE).is_err());
    }
}
