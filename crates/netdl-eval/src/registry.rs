//! The runtime-type registry consulted by `new` expressions.

use std::fmt;
use std::rc::Rc;

use indexmap::IndexMap;
use netdl_common::Location;

use crate::{EvalError, InfixTable, Record, Value};

/// Builds a value from the record of fields written after `new T`.
///
/// Arguments are the field record, the location of the `new` expression and
/// the expression path the result is defined under.
pub type ConstructFn = Rc<dyn Fn(&Rc<Record>, Location, &str) -> Result<Value, EvalError>>;

/// A registered runtime type.
#[derive(Clone)]
pub struct RuntimeType {
    /// Constructed objects behave as records themselves; their fields are
    /// evaluated with an empty expression path.
    pub is_record_like: bool,
    pub construct: ConstructFn,
}

impl fmt::Debug for RuntimeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RuntimeType")
            .field("is_record_like", &self.is_record_like)
            .finish_non_exhaustive()
    }
}

/// Everything the evaluator looks up by name: runtime types, infix operator
/// handlers, and which runtime type the graph operators instantiate.
///
/// A driver builds one registry before evaluation starts and hands it to the
/// evaluator; it is not modified afterwards.
pub struct Registry {
    types: IndexMap<String, RuntimeType>,
    infix: InfixTable,
    graph_node_type: String,
}

impl Default for Registry {
    fn default() -> Self {
        Self::new()
    }
}

impl Registry {
    /// A registry with no runtime types and the standard operator table.
    pub fn new() -> Self {
        Self {
            types: IndexMap::new(),
            infix: InfixTable::standard(),
            graph_node_type: "ComputationNode".to_string(),
        }
    }

    /// Register a runtime type, replacing any previous one of that name.
    pub fn register(
        &mut self,
        name: impl Into<String>,
        is_record_like: bool,
        construct: impl Fn(&Rc<Record>, Location, &str) -> Result<Value, EvalError> + 'static,
    ) -> &mut Self {
        self.types.insert(
            name.into(),
            RuntimeType {
                is_record_like,
                construct: Rc::new(construct),
            },
        );
        self
    }

    pub fn get(&self, name: &str) -> Option<&RuntimeType> {
        self.types.get(name)
    }

    pub fn type_names(&self) -> impl Iterator<Item = &str> {
        self.types.keys().map(String::as_str)
    }

    pub fn infix(&self) -> &InfixTable {
        &self.infix
    }

    pub fn infix_mut(&mut self) -> &mut InfixTable {
        &mut self.infix
    }

    /// Runtime type instantiated for `node + node`, `3 * node` and the like.
    pub fn graph_node_type(&self) -> &str {
        &self.graph_node_type
    }

    pub fn set_graph_node_type(&mut self, name: impl Into<String>) -> &mut Self {
        self.graph_node_type = name.into();
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_register_and_lookup() {
        let mut registry = Registry::new();
        registry
            .register("Answer", false, |_, loc, path| Ok(Value::number(42.0, loc, path)))
            .register("Scope", true, |fields, loc, path| {
                Ok(Value::record(fields.clone(), loc, path))
            });

        assert!(registry.get("Missing").is_none());
        assert!(!registry.get("Answer").unwrap().is_record_like);
        assert!(registry.get("Scope").unwrap().is_record_like);
        assert_eq!(registry.type_names().collect::<Vec<_>>(), ["Answer", "Scope"]);

        let answer = registry.get("Answer").unwrap();
        let value = (answer.construct)(&Record::root(), Location::NONE, "$.a").unwrap();
        assert_eq!(value.as_number().unwrap(), 42.0);
        assert_eq!(&*value.path, "$.a");
    }

    #[test]
    fn test_graph_node_type_default() {
        let mut registry = Registry::new();
        assert_eq!(registry.graph_node_type(), "ComputationNode");
        registry.set_graph_node_type("Node");
        assert_eq!(registry.graph_node_type(), "Node");
    }
}
