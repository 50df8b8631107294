//! Error types for dependency graph operations

use thiserror::Error;

/// Result type for graph operations
pub type GraphResult<T> = Result<T, GraphError>;

/// Errors raised while building or querying a dependency graph
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum GraphError {
    /// The same name was added twice to one graph
    #[error("{name} already added")]
    DuplicateItem {
        /// The name that was added again
        name: String,
    },

    /// Adding the item would have closed a dependency loop
    #[error("Dependency cycle detected in {name}")]
    CycleDetected {
        /// The item whose insertion was rejected
        name: String,
    },

    /// A query named an item that was never added
    #[error("Dependent item {name} not found")]
    UnknownItem {
        /// The name that was queried
        name: String,
    },
}

impl GraphError {
    pub fn duplicate(name: impl Into<String>) -> Self {
        Self::DuplicateItem { name: name.into() }
    }

    pub fn cycle(name: impl Into<String>) -> Self {
        Self::CycleDetected { name: name.into() }
    }

    pub fn unknown(name: impl Into<String>) -> Self {
        Self::UnknownItem { name: name.into() }
    }

    /// The item name this error is about
    pub fn name(&self) -> &str {
        match self {
            Self::DuplicateItem { name }
            | Self::CycleDetected { name }
            | Self::UnknownItem { name } => name,
        }
    }
}
