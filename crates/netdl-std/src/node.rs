//! Computation nodes: the vertices of a network description.
//!
//! A node is created by `new ComputationNode [ class = "..." ; inputs = ... ]`
//! or implicitly by the graph operators (`a + b`, `3 * a`). Nodes only
//! describe the network; nothing is computed.

use std::any::Any;
use std::cell::RefCell;
use std::rc::Rc;

use netdl_common::Location;
use netdl_eval::{
    downcast, nest_string, DeferredInit, EvalError, Nameable, Object, ObjectRef, Record, Stringify,
    Thunk, Value, ValueKind,
};

/// Node operations, by the `class` that selects them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    LearnableParameter,
    InputValue,
    Plus,
    Minus,
    Times,
    DiagTimes,
    Scale,
    Log,
    Sigmoid,
    Mean,
    InvStdDev,
    PerDimMeanVarNormalization,
    RowSlice,
    CrossEntropyWithSoftmax,
    ErrorPrediction,
    Delay,
}

impl Operation {
    pub const ALL: [Operation; 16] = [
        Operation::LearnableParameter,
        Operation::InputValue,
        Operation::Plus,
        Operation::Minus,
        Operation::Times,
        Operation::DiagTimes,
        Operation::Scale,
        Operation::Log,
        Operation::Sigmoid,
        Operation::Mean,
        Operation::InvStdDev,
        Operation::PerDimMeanVarNormalization,
        Operation::RowSlice,
        Operation::CrossEntropyWithSoftmax,
        Operation::ErrorPrediction,
        Operation::Delay,
    ];

    /// The operation name as shown when printing a network.
    pub fn name(self) -> &'static str {
        match self {
            Operation::LearnableParameter => "LearnableParameter",
            Operation::InputValue => "InputValue",
            Operation::Plus => "Plus",
            Operation::Minus => "Minus",
            Operation::Times => "Times",
            Operation::DiagTimes => "DiagTimes",
            Operation::Scale => "Scale",
            Operation::Log => "Log",
            Operation::Sigmoid => "Sigmoid",
            Operation::Mean => "Mean",
            Operation::InvStdDev => "InvStdDev",
            Operation::PerDimMeanVarNormalization => "PerDimMeanVarNormalization",
            Operation::RowSlice => "RowSlice",
            Operation::CrossEntropyWithSoftmax => "CrossEntropyWithSoftmax",
            Operation::ErrorPrediction => "ErrorPrediction",
            Operation::Delay => "Delay",
        }
    }

    /// The `class` value selecting this operation.
    pub fn class(self) -> String {
        match self {
            Operation::InputValue => "InputValue".to_string(),
            Operation::LearnableParameter => "LearnableParameterNode".to_string(),
            op => format!("{}Node", op.name()),
        }
    }

    pub fn from_class(class: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|op| op.class() == class)
    }

    /// Number of `inputs` a node of this class takes. Parameters, inputs and
    /// delays do not read `inputs`.
    pub fn input_count(self) -> Option<usize> {
        match self {
            Operation::LearnableParameter | Operation::InputValue | Operation::Delay => None,
            Operation::Log
            | Operation::Sigmoid
            | Operation::Mean
            | Operation::InvStdDev
            | Operation::RowSlice => Some(1),
            Operation::Plus
            | Operation::Minus
            | Operation::Times
            | Operation::DiagTimes
            | Operation::Scale
            | Operation::CrossEntropyWithSoftmax
            | Operation::ErrorPrediction => Some(2),
            Operation::PerDimMeanVarNormalization => Some(3),
        }
    }
}

/// Class-specific node settings.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum NodeAttrs {
    None,
    Parameter { out_dim: usize, in_dim: usize },
    Scale { factor: f64 },
    RowSlice { first: usize, num: usize },
    Delay { delta_t: i64 },
}

/// A node of a computation network.
pub struct ComputationNode {
    operation: Operation,
    name: RefCell<String>,
    tag: String,
    attrs: NodeAttrs,
    children: RefCell<Vec<ObjectRef>>,
    /// Input of a delay node, resolved by `finalize`.
    pending_input: RefCell<Option<Thunk>>,
}

impl ComputationNode {
    fn new(operation: Operation, tag: String, attrs: NodeAttrs, children: Vec<ObjectRef>) -> Self {
        Self {
            operation,
            name: RefCell::new(String::new()),
            tag,
            attrs,
            children: RefCell::new(children),
            pending_input: RefCell::new(None),
        }
    }

    pub fn operation(&self) -> Operation {
        self.operation
    }

    /// The node's name; empty until it is named after the expression that
    /// defines it or by the network that holds it.
    pub fn name(&self) -> String {
        self.name.borrow().clone()
    }

    pub fn is_named(&self) -> bool {
        !self.name.borrow().is_empty()
    }

    pub fn tag(&self) -> &str {
        &self.tag
    }

    pub fn attrs(&self) -> NodeAttrs {
        self.attrs
    }

    pub fn inputs(&self) -> Vec<ObjectRef> {
        self.children.borrow().clone()
    }

    /// Build a node from the fields of a `new ComputationNode` expression.
    pub fn construct(
        fields: &Rc<Record>,
        location: Location,
        path: &str,
    ) -> Result<Value, EvalError> {
        let class_value = fields.get("class")?;
        let class = class_value.as_str()?;
        let operation = Operation::from_class(class).ok_or_else(|| {
            EvalError::invalid_argument(
                format!("unknown ComputationNode class {class}"),
                class_value.location,
            )
        })?;
        let tag = match fields.get_optional("optionalTag")? {
            Some(tag) => tag.as_str()?.to_string(),
            None => String::new(),
        };

        let node = match operation {
            Operation::LearnableParameter => {
                let out_dim = dimension(fields, "outDim")?;
                let in_dim = dimension(fields, "inDim")?;
                Self::new(operation, tag, NodeAttrs::Parameter { out_dim, in_dim }, Vec::new())
            }
            Operation::InputValue => Self::new(operation, tag, NodeAttrs::None, Vec::new()),
            Operation::Delay => {
                // The input may not exist yet; it is resolved by finalize.
                let input = fields
                    .find_local("input")
                    .ok_or_else(|| EvalError::unknown_identifier("input", Location::NONE))?;
                let delta_t = fields.get("deltaT")?.as_int()?;
                let node = Self::new(operation, tag, NodeAttrs::Delay { delta_t }, Vec::new());
                *node.pending_input.borrow_mut() = Some(input);
                node
            }
            Operation::Scale => {
                // inputs = (factor : node)
                let inputs = input_values(fields, operation, class)?;
                let factor = inputs[0].as_number()?;
                Self::new(operation, tag, NodeAttrs::Scale { factor }, vec![as_node(&inputs[1])?])
            }
            Operation::RowSlice => {
                let first = dimension(fields, "first")?;
                let num = dimension(fields, "num")?;
                let inputs = input_nodes(fields, operation, class)?;
                Self::new(operation, tag, NodeAttrs::RowSlice { first, num }, inputs)
            }
            _ => {
                let inputs = input_nodes(fields, operation, class)?;
                Self::new(operation, tag, NodeAttrs::None, inputs)
            }
        };

        tracing::trace!(operation = operation.name(), path, "created computation node");
        Ok(Value::object(Rc::new(node), location, path))
    }
}

/// A non-negative integer field.
fn dimension(fields: &Record, id: &str) -> Result<usize, EvalError> {
    let value = fields.get(id)?;
    let n = value.as_int()?;
    usize::try_from(n).map_err(|_| {
        EvalError::invalid_argument(format!("{id} must not be negative, got {n}"), value.location)
    })
}

/// The `inputs` field: a single value or an array of them, checked against
/// the class's input count.
fn input_values(
    fields: &Record,
    operation: Operation,
    class: &str,
) -> Result<Vec<Value>, EvalError> {
    let inputs = fields.get("inputs")?;
    let values = match &inputs.kind {
        ValueKind::Array(array) => array.values()?,
        _ => vec![inputs.clone()],
    };
    let expected = operation.input_count().unwrap_or(0);
    if values.len() != expected {
        return Err(EvalError::invalid_argument(
            format!(
                "unexpected number of inputs to ComputationNode class {class}: \
                 expected {expected}, got {}",
                values.len()
            ),
            inputs.location,
        ));
    }
    Ok(values)
}

fn input_nodes(
    fields: &Record,
    operation: Operation,
    class: &str,
) -> Result<Vec<ObjectRef>, EvalError> {
    input_values(fields, operation, class)?
        .iter()
        .map(as_node)
        .collect()
}

/// Coerce a value to a computation node.
pub fn as_node(value: &Value) -> Result<ObjectRef, EvalError> {
    match &value.kind {
        ValueKind::Object(object) if downcast::<ComputationNode>(object).is_some() => {
            Ok(object.clone())
        }
        _ => Err(EvalError::type_mismatch(
            "ComputationNode",
            value.type_name(),
            value.location,
        )),
    }
}

fn node_name(object: &ObjectRef) -> String {
    downcast::<ComputationNode>(object)
        .map(ComputationNode::name)
        .unwrap_or_else(|| object.type_name().to_string())
}

impl Object for ComputationNode {
    fn type_name(&self) -> &str {
        "ComputationNode"
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_nameable(&self) -> Option<&dyn Nameable> {
        Some(self)
    }

    fn as_stringify(&self) -> Option<&dyn Stringify> {
        Some(self)
    }

    fn as_deferred_init(&self) -> Option<&dyn DeferredInit> {
        match self.operation {
            Operation::Delay => Some(self),
            _ => None,
        }
    }

    fn children(&self) -> Vec<ObjectRef> {
        self.inputs()
    }
}

impl Nameable for ComputationNode {
    fn set_name(&self, name: &str) {
        *self.name.borrow_mut() = name.to_string();
    }
}

impl Stringify for ComputationNode {
    fn to_display_string(&self) -> String {
        let name = self.name();
        let op = self.operation.name();
        match self.attrs {
            NodeAttrs::Parameter { out_dim, in_dim } => {
                return format!("{name} : {op} ({out_dim}, {in_dim})")
            }
            NodeAttrs::None
            | NodeAttrs::Scale { .. }
            | NodeAttrs::RowSlice { .. }
            | NodeAttrs::Delay { .. } => {}
        }

        let mut args: Vec<String> = Vec::new();
        if let NodeAttrs::Scale { factor } = self.attrs {
            args.push(factor.to_string());
        }
        args.extend(self.children.borrow().iter().map(node_name));
        if args.is_empty() {
            format!("{name} : {op}()")
        } else {
            format!("{name} : {op} {}", nest_string(&args.join("\n"), '(', true, ')'))
        }
    }
}

impl DeferredInit for ComputationNode {
    fn finalize(&self) -> Result<(), EvalError> {
        let pending = self.pending_input.borrow().clone();
        let Some(input) = pending else {
            return Ok(());
        };
        let node = as_node(&input.force()?)?;
        self.children.borrow_mut().push(node);
        *self.pending_input.borrow_mut() = None;
        Ok(())
    }

    fn is_finalized(&self) -> bool {
        self.pending_input.borrow().is_none()
    }
}
