//! Computation networks: the set of nodes reachable from a network record.

use std::any::Any;
use std::collections::HashSet;
use std::rc::Rc;

use indexmap::IndexMap;
use netdl_common::Location;
use netdl_eval::{
    downcast, finalize_graph, nest_string, object_id, EvalError, Nameable, Object, ObjectRef,
    Record, RecordLike, Stringify, Thunk, Value, ValueKind,
};
use tracing::debug;

use crate::node::{ComputationNode, Operation};

/// A network built from `new ComputationNetwork [ ... ]`.
///
/// Every member of the field record that evaluates to a computation node
/// seeds the graph walk; the network holds every node reachable from them,
/// indexed by node name.
pub struct ComputationNetwork {
    nodes: IndexMap<String, ObjectRef>,
    inputs: Vec<String>,
    parameters: Vec<String>,
    outputs: Vec<String>,
    fields: Rc<Record>,
    location: Location,
}

impl ComputationNetwork {
    pub fn construct(
        fields: &Rc<Record>,
        location: Location,
        path: &str,
    ) -> Result<Value, EvalError> {
        let network = Self::build(fields, location)?;
        debug!(
            path,
            nodes = network.nodes.len(),
            inputs = network.inputs.len(),
            parameters = network.parameters.len(),
            outputs = network.outputs.len(),
            "built computation network"
        );
        Ok(Value::object(Rc::new(network), location, path))
    }

    fn build(fields: &Rc<Record>, location: Location) -> Result<Self, EvalError> {
        let mut roots = Vec::new();
        for (_, member) in fields.members() {
            let value = member.value.force()?;
            if let ValueKind::Object(object) = &value.kind {
                if downcast::<ComputationNode>(object).is_some() {
                    roots.push(object.clone());
                }
            }
        }

        let mut nodes: IndexMap<String, ObjectRef> = IndexMap::new();
        let mut child_ids = HashSet::new();
        let mut anonymous = 0;
        for object in finalize_graph(roots)? {
            let Some(node) = downcast::<ComputationNode>(&object) else {
                continue;
            };
            if !node.is_named() {
                anonymous += 1;
                node.set_name(&format!("anonymousNode{anonymous}"));
            }
            let name = node.name();
            if nodes.contains_key(&name) {
                return Err(EvalError::invalid_argument(
                    format!("multiple nodes with the name {name}"),
                    location,
                ));
            }
            for child in node.inputs() {
                child_ids.insert(object_id(&child));
            }
            nodes.insert(name, object);
        }

        let mut inputs = Vec::new();
        let mut parameters = Vec::new();
        let mut outputs = Vec::new();
        for (name, object) in &nodes {
            let Some(node) = downcast::<ComputationNode>(object) else {
                continue;
            };
            if node.inputs().is_empty() {
                match node.operation() {
                    Operation::InputValue => inputs.push(name.clone()),
                    Operation::LearnableParameter => parameters.push(name.clone()),
                    op => {
                        return Err(EvalError::invalid_argument(
                            format!(
                                "node {name} ({}) has no inputs but is neither \
                                 an InputValue nor a LearnableParameter",
                                op.name()
                            ),
                            location,
                        ));
                    }
                }
            }
            if !child_ids.contains(&object_id(object)) {
                outputs.push(name.clone());
            }
        }

        Ok(Self {
            nodes,
            inputs,
            parameters,
            outputs,
            fields: fields.clone(),
            location,
        })
    }

    pub fn node(&self, name: &str) -> Option<&ObjectRef> {
        self.nodes.get(name)
    }

    pub fn node_names(&self) -> impl Iterator<Item = &str> {
        self.nodes.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn inputs(&self) -> &[String] {
        &self.inputs
    }

    pub fn parameters(&self) -> &[String] {
        &self.parameters
    }

    /// Nodes no other node takes as input.
    pub fn outputs(&self) -> &[String] {
        &self.outputs
    }
}

impl Object for ComputationNetwork {
    fn type_name(&self) -> &str {
        "ComputationNetwork"
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_stringify(&self) -> Option<&dyn Stringify> {
        Some(self)
    }

    fn as_record_like(&self) -> Option<&dyn RecordLike> {
        Some(self)
    }

    fn children(&self) -> Vec<ObjectRef> {
        self.nodes.values().cloned().collect()
    }
}

impl RecordLike for ComputationNetwork {
    fn find_member(&self, id: &str) -> Option<Thunk> {
        match self.nodes.get(id) {
            Some(node) => Some(Thunk::ready(Value::object(node.clone(), self.location, id))),
            None => self.fields.find_local(id),
        }
    }

    fn member_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.nodes.keys().cloned().collect();
        for name in self.fields.member_names() {
            if !self.nodes.contains_key(&name) {
                names.push(name);
            }
        }
        names
    }
}

impl Stringify for ComputationNetwork {
    fn to_display_string(&self) -> String {
        let nodes: Vec<String> = self
            .nodes
            .values()
            .map(|node| match node.as_stringify() {
                Some(s) => s.to_display_string(),
                None => node.type_name().to_string(),
            })
            .collect();
        format!("NDLComputationNetwork {}", nest_string(&nodes.join("\n"), '[', true, ']'))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use netdl_eval::{Array, EvalErrorKind};

    fn s(x: &str) -> Value {
        Value::string(x, Location::NONE, "")
    }

    fn record(entries: Vec<(&str, Value)>) -> Rc<Record> {
        let record = Rc::new(Record::new(None));
        for (id, value) in entries {
            record.add_value(id, value);
        }
        record
    }

    fn named_node(name: &str, entries: Vec<(&str, Value)>) -> Value {
        let value = ComputationNode::construct(&record(entries), Location::NONE, name).unwrap();
        if let ValueKind::Object(object) = &value.kind {
            object.as_nameable().unwrap().set_name(name);
        }
        value
    }

    fn network(entries: Vec<(&str, Value)>) -> Result<ComputationNetwork, EvalError> {
        ComputationNetwork::build(&record(entries), Location::NONE)
    }

    #[test]
    fn test_classifies_nodes() {
        let x = named_node("x", vec![("class", s("InputValue"))]);
        let w = named_node(
            "W",
            vec![
                ("class", s("LearnableParameterNode")),
                ("outDim", Value::number(2.0, Location::NONE, "")),
                ("inDim", Value::number(3.0, Location::NONE, "")),
            ],
        );
        let inputs = Value::array(Array::from_values([w.clone(), x.clone()]), Location::NONE, "");
        let z = named_node("z", vec![("class", s("TimesNode")), ("inputs", inputs)]);

        // Only z is a member; x and W are found through it.
        let net = network(vec![("z", z), ("dim", Value::number(3.0, Location::NONE, ""))]).unwrap();
        assert_eq!(net.len(), 3);
        assert_eq!(net.inputs(), ["x"]);
        assert_eq!(net.parameters(), ["W"]);
        assert_eq!(net.outputs(), ["z"]);

        assert!(net.find_member("W").is_some());
        assert_eq!(net.find_member("dim").unwrap().force().unwrap().as_number().unwrap(), 3.0);
        assert!(net.find_member("nope").is_none());
        assert!(net.to_display_string().starts_with("NDLComputationNetwork [\n"));
    }

    #[test]
    fn test_duplicate_names_rejected() {
        let a = named_node("same", vec![("class", s("InputValue"))]);
        let b = named_node("same", vec![("class", s("InputValue"))]);
        let err = network(vec![("a", a), ("b", b)]).err().unwrap();
        assert!(matches!(err.kind, EvalErrorKind::InvalidArgument(_)));
    }

    #[test]
    fn test_same_node_twice_is_fine() {
        let a = named_node("a", vec![("class", s("InputValue"))]);
        let net = network(vec![("a", a.clone()), ("alias", a)]).unwrap();
        assert_eq!(net.len(), 1);
    }

    #[test]
    fn test_unnamed_nodes_numbered_per_network() {
        let unnamed = || {
            let fields = record(vec![("class", s("InputValue"))]);
            ComputationNode::construct(&fields, Location::NONE, "").unwrap()
        };
        for _ in 0..2 {
            let net = network(vec![("a", unnamed()), ("b", unnamed())]).unwrap();
            assert_eq!(net.inputs(), ["anonymousNode1", "anonymousNode2"]);
        }
    }
}
