//! CLI command implementations.

pub mod eval;
pub mod run;
pub mod types;

use std::fs;
use std::path::Path;
use std::rc::Rc;

use netdl_common::Location;
use netdl_diagnostic::{emit, Diagnostic, DiagnosticKind, ErrorCode};
use netdl_eval::EvalError;
use netdl_syntax::{load_file, Expr, LoadError};

/// Load an expression tree, reporting why it could not be loaded.
pub fn load_tree(file: &Path) -> Result<Rc<Expr>, String> {
    load_file(file).map_err(|e| {
        let code = match e {
            LoadError::Io { .. } => ErrorCode::UnreadableInput,
            LoadError::Json(_) => ErrorCode::MalformedTree,
        };
        let diagnostic = Diagnostic::error(DiagnosticKind::Input, Location::NONE, e.to_string()).with_code(code);
        eprintln!("{diagnostic}");
        format!("cannot load '{}'", file.display())
    })
}

/// Report an evaluation error, with source excerpts when the source text is
/// available.
pub fn report(err: &EvalError, source: Option<&Path>) {
    let diagnostic = err.to_diagnostic();
    match source.map(|path| (path, fs::read_to_string(path))) {
        Some((path, Ok(text))) => emit(&text, &path.display().to_string(), &diagnostic),
        Some((path, Err(e))) => {
            tracing::warn!("cannot read source file '{}': {}", path.display(), e);
            eprintln!("{diagnostic}");
        }
        None => eprintln!("{diagnostic}"),
    }
}
