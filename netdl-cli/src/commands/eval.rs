//! The `netdl eval` command.

use std::path::Path;

use netdl_eval::{format_value, Evaluator};
use netdl_std::standard_registry;

use super::{load_tree, report};
use crate::output;

pub fn run(file: &Path, member: Option<&str>, source: Option<&Path>, how: &str) -> Result<(), String> {
    let root = load_tree(file)?;
    tracing::debug!(file = %file.display(), ?member, "evaluating");
    let evaluator = Evaluator::new(standard_registry());

    let result = match member {
        Some(member) => evaluator.evaluate_member(&root, member),
        None => evaluator.evaluate_top_level(&root),
    }
    .and_then(|value| format_value(&value, how));

    match result {
        Ok(text) => {
            output::success(&text);
            Ok(())
        }
        Err(e) => {
            report(&e, source);
            Err("evaluation failed".to_string())
        }
    }
}
