//! Finalization of object graphs whose nodes may reference each other in
//! cycles.

use std::collections::{HashSet, VecDeque};

use tracing::debug;

use crate::{object_id, EvalError, ObjectRef};

/// Finalize every object reachable from `roots`.
///
/// Objects with deferred initialization only know their children after
/// being finalized, and finalizing one may construct objects not seen
/// before, so the graph is walked with a work list rather than recursively.
/// Each object is visited once, by identity. Returns the visited objects in
/// discovery order.
pub fn finalize_graph(
    roots: impl IntoIterator<Item = ObjectRef>,
) -> Result<Vec<ObjectRef>, EvalError> {
    let mut work: VecDeque<ObjectRef> = roots.into_iter().collect();
    let mut visited = HashSet::new();
    let mut nodes = Vec::new();
    let mut finalized = 0usize;

    while let Some(object) = work.pop_front() {
        if !visited.insert(object_id(&object)) {
            continue;
        }
        if let Some(deferred) = object.as_deferred_init() {
            if !deferred.is_finalized() {
                deferred.finalize()?;
                finalized += 1;
            }
        }
        for child in object.children() {
            if !visited.contains(&object_id(&child)) {
                work.push_back(child);
            }
        }
        nodes.push(object);
    }

    debug!(nodes = nodes.len(), finalized, "finalized object graph");
    Ok(nodes)
}
