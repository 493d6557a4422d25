//! Loading expression trees serialized by an out-of-process parser.

use std::path::{Path, PathBuf};
use std::rc::Rc;

use thiserror::Error;

use crate::Expr;

/// Errors raised while reading a serialized expression tree.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("cannot read '{}': {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed expression tree at line {}, column {}: {}", .0.line(), .0.column(), .0)]
    Json(#[from] serde_json::Error),
}

/// Parse an expression tree from its JSON form.
pub fn from_json(text: &str) -> Result<Rc<Expr>, LoadError> {
    let expr: Expr = serde_json::from_str(text)?;
    Ok(Rc::new(expr))
}

/// Read and parse an expression tree from a JSON file.
pub fn load_file(path: &Path) -> Result<Rc<Expr>, LoadError> {
    let text = std::fs::read_to_string(path).map_err(|source| LoadError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    from_json(&text)
}
