//! Records: ordered member tables that double as lexical scopes.

use std::cell::RefCell;
use std::rc::Rc;

use indexmap::IndexMap;
use netdl_common::Location;

use crate::{EvalError, RecordLike, Thunk, Value};

/// A record member: where it was declared and its (possibly pending) value.
#[derive(Clone, Debug)]
pub struct Member {
    pub location: Location,
    pub value: Thunk,
}

/// An ordered mapping from identifier to value slot, with an optional
/// lexically enclosing record.
///
/// Members are installed up front, usually as pending thunks that capture the
/// record itself, so that siblings can refer to each other regardless of
/// order. Lookups that miss locally continue in the enclosing record.
#[derive(Debug, Default)]
pub struct Record {
    members: RefCell<IndexMap<String, Member>>,
    parent: Option<Rc<Record>>,
}

impl Record {
    pub fn new(parent: Option<Rc<Record>>) -> Self {
        Self {
            members: RefCell::new(IndexMap::new()),
            parent,
        }
    }

    /// An outermost scope with no enclosing record.
    pub fn root() -> Rc<Self> {
        Rc::new(Self::new(None))
    }

    /// A new empty record enclosed by `parent`.
    pub fn child(parent: &Rc<Record>) -> Rc<Self> {
        Rc::new(Self::new(Some(parent.clone())))
    }

    pub fn parent(&self) -> Option<&Rc<Record>> {
        self.parent.as_ref()
    }

    /// Install a member. Identifiers are unique within one record.
    pub fn add(&self, id: impl Into<String>, location: Location, value: Thunk) {
        let id = id.into();
        let previous = self
            .members
            .borrow_mut()
            .insert(id, Member { location, value });
        debug_assert!(previous.is_none(), "duplicate record member");
    }

    /// Install an already computed member.
    pub fn add_value(&self, id: impl Into<String>, value: Value) {
        let location = value.location;
        self.add(id, location, Thunk::ready(value));
    }

    pub fn contains(&self, id: &str) -> bool {
        self.members.borrow().contains_key(id)
    }

    /// Find a member of this record only, without forcing it.
    pub fn find_local(&self, id: &str) -> Option<Thunk> {
        self.members.borrow().get(id).map(|m| m.value.clone())
    }

    /// Find a member here or in any enclosing record, without forcing it.
    pub fn find(&self, id: &str) -> Option<Thunk> {
        let mut scope = self;
        loop {
            if let Some(found) = scope.find_local(id) {
                return Some(found);
            }
            scope = scope.parent.as_deref()?;
        }
    }

    /// Find a member through the scope chain and resolve it.
    pub fn lookup(&self, id: &str, location: Location) -> Result<Value, EvalError> {
        self.find(id)
            .ok_or_else(|| EvalError::unknown_identifier(id, location))?
            .force()
    }

    /// Resolve a member that must be present in this record itself.
    ///
    /// Runtime-object constructors read their parameters through this; a
    /// missing parameter is reported without a location so that the `new`
    /// expression's location is used.
    pub fn get(&self, id: &str) -> Result<Value, EvalError> {
        self.find_local(id)
            .ok_or_else(|| EvalError::unknown_identifier(id, Location::NONE))?
            .force()
    }

    /// Resolve an optional member of this record.
    pub fn get_optional(&self, id: &str) -> Result<Option<Value>, EvalError> {
        self.find_local(id).map(|t| t.force()).transpose()
    }

    pub fn member_names(&self) -> Vec<String> {
        self.members.borrow().keys().cloned().collect()
    }

    /// Members in declaration order.
    pub fn members(&self) -> Vec<(String, Member)> {
        self.members
            .borrow()
            .iter()
            .map(|(id, m)| (id.clone(), m.clone()))
            .collect()
    }

    pub fn len(&self) -> usize {
        self.members.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.borrow().is_empty()
    }
}

impl RecordLike for Record {
    fn find_member(&self, id: &str) -> Option<Thunk> {
        self.find(id)
    }

    fn member_names(&self) -> Vec<String> {
        Record::member_names(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn n(x: f64) -> Value {
        Value::number(x, Location::NONE, "")
    }

    #[test]
    fn test_lookup_walks_enclosing_records() {
        let outer = Record::root();
        outer.add_value("x", n(1.0));
        outer.add_value("y", n(2.0));
        let inner = Record::child(&outer);
        inner.add_value("x", n(10.0));

        assert_eq!(inner.lookup("x", Location::NONE).unwrap().as_number().unwrap(), 10.0);
        assert_eq!(inner.lookup("y", Location::NONE).unwrap().as_number().unwrap(), 2.0);
        assert_eq!(outer.lookup("x", Location::NONE).unwrap().as_number().unwrap(), 1.0);
    }

    #[test]
    fn test_unknown_identifier() {
        let rec = Record::root();
        let err = rec.lookup("nope", Location::at(5, 5)).unwrap_err();
        assert_eq!(err.to_string(), "unknown identifier nope");
        assert_eq!(err.location, Location::at(5, 5));
    }

    #[test]
    fn test_get_is_local_only() {
        let outer = Record::root();
        outer.add_value("tag", n(1.0));
        let inner = Record::child(&outer);
        assert!(inner.get("tag").is_err());
        assert!(inner.get_optional("tag").unwrap().is_none());
        assert!(inner.find("tag").is_some());
    }

    #[test]
    fn test_members_keep_declaration_order() {
        let rec = Record::root();
        rec.add_value("b", n(1.0));
        rec.add_value("a", n(2.0));
        rec.add_value("c", n(3.0));
        assert_eq!(rec.member_names(), ["b", "a", "c"]);
        assert_eq!(rec.len(), 3);
    }
}
