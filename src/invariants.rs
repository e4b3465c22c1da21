//! Structural invariants of a mesh hypergraph.
//!
//! Productions preserve these on their own; the checker exists for callers
//! that build meshes by hand and for tests that want to assert nothing
//! drifted after a long derivation.
//!
//! # Citations
//! - Well-formedness of typed hypergraphs: Habel, "Hyperedge Replacement: Grammars and Languages" (1992)

use crate::core::{Hypergraph, Node, NodeId};
use crate::error::GraphError;

/// Validates the whole graph.
///
/// Checks, in ascending id order:
/// - every incidence joins an existing hyperedge to an existing point,
/// - every incidence is recorded in both directions,
/// - every hyperedge spans exactly its label's arity.
///
/// The first violation found is returned.
pub fn check_well_formed(graph: &Hypergraph) -> Result<(), GraphError> {
    for (owner, incident) in graph.incidence_sets() {
        for &other in incident {
            let (hyperedge, point) = orient(graph, owner, other)?;
            let kinds_ok = matches!(graph.node(hyperedge), Ok(Node::Hyperedge(_)))
                && matches!(graph.node(point), Ok(Node::Point(_)));
            if !kinds_ok || !graph.is_linked(other, owner) {
                return Err(GraphError::DanglingIncidence { hyperedge, point });
            }
        }
    }

    for h in graph.hyperedges() {
        let found = graph.degree(h.id);
        let expected = h.label.arity();
        if found != expected {
            return Err(GraphError::ArityMismatch {
                id: h.id,
                label: h.label,
                expected,
                found,
            });
        }
    }
    Ok(())
}

/// `true` if [`check_well_formed`] passes.
pub fn is_well_formed(graph: &Hypergraph) -> bool {
    check_well_formed(graph).is_ok()
}

/// Orders an incidence pair as `(hyperedge, point)` using whichever end
/// still exists.
fn orient(graph: &Hypergraph, a: NodeId, b: NodeId) -> Result<(NodeId, NodeId), GraphError> {
    match (graph.node(a), graph.node(b)) {
        (Ok(Node::Hyperedge(_)), _) | (_, Ok(Node::Point(_))) => Ok((a, b)),
        (Ok(Node::Point(_)), _) | (_, Ok(Node::Hyperedge(_))) => Ok((b, a)),
        (Err(_), Err(_)) => Err(GraphError::NodeNotFound(a)),
    }
}
