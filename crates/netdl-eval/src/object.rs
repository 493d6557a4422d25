//! Objects built by registered runtime types, and the capabilities they may
//! expose to the evaluator.
//!
//! The evaluator never inspects concrete object types. It only asks an object
//! for one of the capability views below; each defaults to "not supported".

use std::any::Any;
use std::rc::Rc;

use crate::{EvalError, Thunk};

/// Shared handle to a constructed object.
pub type ObjectRef = Rc<dyn Object>;

/// A constructed runtime object.
pub trait Object: Any {
    /// Type name for diagnostics and `format_value`.
    fn type_name(&self) -> &str;

    fn as_any(&self) -> &dyn Any;

    fn as_nameable(&self) -> Option<&dyn Nameable> {
        None
    }

    fn as_stringify(&self) -> Option<&dyn Stringify> {
        None
    }

    fn as_record_like(&self) -> Option<&dyn RecordLike> {
        None
    }

    fn as_deferred_init(&self) -> Option<&dyn DeferredInit> {
        None
    }

    /// Objects this one references, for graph traversal. Objects with
    /// deferred initialization only report children once finalized.
    fn children(&self) -> Vec<ObjectRef> {
        Vec::new()
    }
}

/// Accepts the expression path it was defined under as its name.
pub trait Nameable {
    fn set_name(&self, name: &str);
}

/// Produces its own human-readable form.
pub trait Stringify {
    fn to_display_string(&self) -> String;
}

/// Exposes named members to `.` lookup as if it were a record.
pub trait RecordLike {
    fn find_member(&self, id: &str) -> Option<Thunk>;

    fn member_names(&self) -> Vec<String>;
}

/// Holds unresolved values after construction that must be resolved by a
/// separate `finalize` step before its children are valid. This is what lets
/// objects reference each other in cycles.
pub trait DeferredInit {
    /// Resolve the held values. Must be idempotent.
    fn finalize(&self) -> Result<(), EvalError>;

    fn is_finalized(&self) -> bool;
}

/// Identity of an object, for visited sets.
pub fn object_id(object: &ObjectRef) -> *const () {
    Rc::as_ptr(object) as *const ()
}

/// Downcast an object handle to a concrete type.
pub fn downcast<T: Object>(object: &ObjectRef) -> Option<&T> {
    object.as_any().downcast_ref::<T>()
}
