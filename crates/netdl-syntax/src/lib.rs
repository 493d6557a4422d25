//! Expression tree definitions for netdl.
//!
//! This crate defines the tree an external parser hands to the evaluator,
//! helpers for building such trees in code, and JSON loading of trees that
//! were produced out of process.

pub mod build;
mod expr;
mod load;

pub use expr::*;
pub use load::{from_json, load_file, LoadError};
