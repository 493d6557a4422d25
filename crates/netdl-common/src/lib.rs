//! Common utilities and data structures for netdl.
//!
//! This crate provides the source-position types used across the workspace:
//! - `Span`: byte range in the configuration source
//! - `Location`: a span plus the line/column the parser resolved for it

mod location;
mod span;

pub use location::Location;
pub use span::Span;
