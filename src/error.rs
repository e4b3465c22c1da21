//! Error types for the hypergraph store and the refinement driver.
//!
//! Only structural problems are errors. A production whose left-hand side is not
//! present in the graph reports an empty match list instead.

use crate::core::{Label, NodeId, NodeKind};

/// Failure raised by the construction, query, and driver APIs.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum GraphError {
    /// No node with this id exists.
    #[error("node {0} does not exist")]
    NodeNotFound(NodeId),

    /// The node exists but is of the other kind.
    #[error("node {id} is not a {expected}")]
    WrongKind { id: NodeId, expected: NodeKind },

    /// A node with this id is already present.
    #[error("node {0} already exists")]
    DuplicateNode(NodeId),

    /// A hyperedge is incident to a number of points other than its label's arity.
    #[error("{label} hyperedge {id} spans {found} points, expected {expected}")]
    ArityMismatch {
        id: NodeId,
        label: Label,
        expected: usize,
        found: usize,
    },

    /// The two directions of the incidence relation disagree, or one side is gone.
    #[error("incidence between hyperedge {hyperedge} and point {point} is dangling")]
    DanglingIncidence { hyperedge: NodeId, point: NodeId },

    /// Refinement was requested for a hyperedge that is not a mesh element.
    #[error("hyperedge {0} is an edge, not a mesh element")]
    NotAnElement(NodeId),

    /// Every `u64` id is in use.
    #[error("no free node id left")]
    IdSpaceExhausted,

    /// Edge breaking kept producing matches past the configured round limit.
    #[error("edge breaking did not reach a fixed point within {rounds} rounds")]
    NoFixedPoint { rounds: usize },
}
