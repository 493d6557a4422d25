//! Deferred, memoized values.
//!
//! Every record member, array element and named-parameter default starts out
//! as a [`Thunk`]. Forcing it runs the computation once and replaces it with
//! the resulting value; all clones of a thunk share that state.

use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

use netdl_common::Location;

use crate::{EvalError, EvalErrorKind, Value};

/// The computation behind a pending thunk.
pub type Computation = Rc<dyn Fn() -> Result<Value, EvalError>>;

enum ThunkState {
    Pending(Computation),
    InProgress,
    Done(Value),
}

struct ThunkCell {
    state: RefCell<ThunkState>,
    location: Location,
    path: Rc<str>,
}

/// A value slot that may not have been computed yet.
#[derive(Clone)]
pub struct Thunk(Rc<ThunkCell>);

impl Thunk {
    /// A thunk that computes its value on first access.
    pub fn deferred(
        compute: impl Fn() -> Result<Value, EvalError> + 'static,
        location: Location,
        path: impl Into<Rc<str>>,
    ) -> Self {
        Self(Rc::new(ThunkCell {
            state: RefCell::new(ThunkState::Pending(Rc::new(compute))),
            location,
            path: path.into(),
        }))
    }

    /// A thunk that already holds its value.
    pub fn ready(value: Value) -> Self {
        let location = value.location;
        let path = value.path.clone();
        Self(Rc::new(ThunkCell {
            state: RefCell::new(ThunkState::Done(value)),
            location,
            path,
        }))
    }

    pub fn location(&self) -> Location {
        self.0.location
    }

    /// Expression path the value is defined under.
    pub fn path(&self) -> &str {
        &self.0.path
    }

    pub fn is_resolved(&self) -> bool {
        matches!(*self.0.state.borrow(), ThunkState::Done(_))
    }

    /// Return the value, computing it if this is the first access.
    ///
    /// Re-entering a thunk whose computation is still running fails with
    /// `CyclicEvaluation`. A failed computation leaves the thunk pending.
    pub fn force(&self) -> Result<Value, EvalError> {
        let compute = {
            let mut state = self.0.state.borrow_mut();
            match &*state {
                ThunkState::Done(value) => return Ok(value.clone()),
                ThunkState::InProgress => {
                    let name = if self.0.path.is_empty() { "<anonymous>" } else { &*self.0.path };
                    return Err(EvalError::new(
                        EvalErrorKind::CyclicEvaluation(name.to_string()),
                        self.0.location,
                    ));
                }
                ThunkState::Pending(compute) => {
                    let compute = compute.clone();
                    *state = ThunkState::InProgress;
                    compute
                }
            }
        };

        tracing::trace!(path = %self.0.path, location = %self.0.location, "executing thunk");
        match compute() {
            Ok(value) => {
                *self.0.state.borrow_mut() = ThunkState::Done(value.clone());
                Ok(value)
            }
            Err(err) => {
                *self.0.state.borrow_mut() = ThunkState::Pending(compute);
                Err(err)
            }
        }
    }
}

impl fmt::Debug for Thunk {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &*self.0.state.borrow() {
            ThunkState::Pending(_) => write!(f, "<pending {}>", self.0.path),
            ThunkState::InProgress => write!(f, "<in progress {}>", self.0.path),
            ThunkState::Done(value) => write!(f, "{value:?}"),
        }
    }
}
