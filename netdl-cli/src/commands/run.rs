//! The `netdl run` command.

use std::path::Path;

use netdl_eval::{format_value, Evaluator};
use netdl_std::standard_registry;

use super::{load_tree, report};
use crate::output;

pub fn run(file: &Path, member: &str, source: Option<&Path>, verbose: bool) -> Result<(), String> {
    let root = load_tree(file)?;
    tracing::debug!(file = %file.display(), member, "running");
    let evaluator = Evaluator::new(standard_registry());

    match evaluator.evaluate_member(&root, member) {
        Ok(value) => {
            if verbose {
                let text = format_value(&value, "").unwrap_or_else(|_| value.type_name());
                output::info(&format!("{member} = {text}"));
            }
            Ok(())
        }
        Err(e) => {
            report(&e, source);
            Err("evaluation failed".to_string())
        }
    }
}
