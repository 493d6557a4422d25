//! Lazy evaluator for NetDL.
//!
//! This crate evaluates an already parsed expression tree. Record members
//! are computed on first access and memoized, functions are closures over
//! the record they were defined in, and `new T [ ... ]` hands a field
//! record to a runtime type looked up in a [`Registry`].

mod config;
mod error;
mod eval;
mod format;
mod graph;
mod infix;
mod lambda;
mod object;
mod record;
mod registry;
mod thunk;
mod value;

pub use config::EvalConfig;
pub use error::{EvalError, EvalErrorKind};
pub use eval::{join_path, Evaluator, PATH_SEPARATOR};
pub use format::{format_value, indent_string, nest_string};
pub use graph::finalize_graph;
pub use infix::{InfixFn, InfixOps, InfixSite, InfixTable, OperandPair};
pub use lambda::Lambda;
pub use object::{
    downcast, object_id, DeferredInit, Nameable, Object, ObjectRef, RecordLike, Stringify,
};
pub use record::{Member, Record};
pub use registry::{ConstructFn, Registry, RuntimeType};
pub use thunk::{Computation, Thunk};
pub use value::{Array, Value, ValueKind};
