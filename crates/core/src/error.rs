//! Error taxonomy for the store and the graph layer.
//!
//! Fatal conditions are [`GraphError`]s. Structural drift discovered while a
//! cascade is running is not an error; see [`crate::ConsistencyWarning`].

use thiserror::Error;

use crate::types::{EntityKind, NodeId};

/// Errors raised by a key-value store backend.
///
/// The graph layer never retries these; they propagate to the caller
/// wrapped in [`GraphError::Store`].
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum StoreError {
    /// A primitive was applied to a key holding a different data type.
    #[error("wrong type for key '{key}': expected {expected}, found {found}")]
    WrongType {
        /// Offending key
        key: String,
        /// Type the primitive operates on
        expected: &'static str,
        /// Type currently stored under the key
        found: &'static str,
    },
    /// An increment was applied to a scalar that is not an integer.
    #[error("value at key '{key}' is not an integer")]
    NotAnInteger {
        /// Offending key
        key: String,
    },
    /// The store could not be reached or refused the request.
    #[error("store unavailable: {0}")]
    Unavailable(String),
}

/// Errors returned by graph operations.
#[derive(Debug, Error)]
pub enum GraphError {
    /// The referenced node or edge is not in its membership set.
    #[error("unknown {kind} {id}")]
    UnknownEntity {
        /// Node or edge
        kind: EntityKind,
        /// Raw id that was referenced
        id: u64,
    },

    /// An edge endpoint does not exist.
    #[error("edge endpoint node {id} does not exist")]
    UnknownEndpoint {
        /// The missing node
        id: NodeId,
    },

    /// A lookup was issued without filters.
    #[error("invalid query: {0}")]
    InvalidQuery(String),

    /// Property deletion on a key that is not set.
    #[error("{kind} {id} has no property '{key}'")]
    NotFound {
        /// Node or edge
        kind: EntityKind,
        /// Raw entity id
        id: u64,
        /// The unset property key
        key: String,
    },

    /// A namespace or property key violates the key naming rules.
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// A regex filter did not compile.
    #[error("invalid pattern for property '{key}': {source}")]
    InvalidPattern {
        /// Property the pattern was given for
        key: String,
        /// Compile error
        source: regex::Error,
    },

    /// A stored value could not be decoded (e.g. a non-numeric id member).
    #[error("corrupt data at '{key}': {reason}")]
    Corrupt {
        /// Store key holding the bad value
        key: String,
        /// What was wrong with it
        reason: String,
    },

    /// The underlying store failed.
    #[error(transparent)]
    Store(#[from] StoreError),
}

impl GraphError {
    /// Unknown node error.
    pub fn unknown_node(id: impl Into<NodeId>) -> Self {
        GraphError::UnknownEntity {
            kind: EntityKind::Node,
            id: id.into().as_u64(),
        }
    }

    /// Unknown edge error.
    pub fn unknown_edge(id: impl Into<crate::EdgeId>) -> Self {
        GraphError::UnknownEntity {
            kind: EntityKind::Edge,
            id: id.into().as_u64(),
        }
    }

    /// Invalid input error.
    pub fn invalid_input(reason: impl Into<String>) -> Self {
        GraphError::InvalidInput(reason.into())
    }

    /// Invalid query error.
    pub fn invalid_query(reason: impl Into<String>) -> Self {
        GraphError::InvalidQuery(reason.into())
    }

    /// Corrupt data error.
    pub fn corrupt(key: impl Into<String>, reason: impl Into<String>) -> Self {
        GraphError::Corrupt {
            key: key.into(),
            reason: reason.into(),
        }
    }
}

/// Result type for graph operations.
pub type Result<T> = std::result::Result<T, GraphError>;
