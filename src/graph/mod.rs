//! Dependency graph between named items

mod engine;
mod error;


pub use engine::{DependencyGraph, Lookup};
pub use error::{GraphError, GraphResult};
