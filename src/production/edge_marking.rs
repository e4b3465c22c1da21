//! Edge marking: flags the sides of a marked element for breaking.

use super::{candidates, is_closed, sides, ElementMatch, Production, ProductionKind};
use crate::config::EdgeMarkingStrategy;
use crate::core::{Hypergraph, Label, Node, NodeId};
use crate::error::GraphError;
use std::collections::BTreeSet;
use tracing::debug;

/// Sets R on the `Edge` hyperedges bounding a marked element.
///
/// With [`EdgeMarkingStrategy::Sides`] the element must pass the closure
/// check and each consecutive corner pair has its joining `Edge`s flagged.
/// A side a neighbour has already broken has no such `Edge` and is left
/// alone. With [`EdgeMarkingStrategy::PointSet`] only the arity is checked
/// and every unflagged `Edge` between two of the element's corners is
/// flagged.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MarkEdges {
    pub shape: Label,
    pub strategy: EdgeMarkingStrategy,
}

impl MarkEdges {
    pub fn new(shape: Label) -> Self {
        Self {
            shape,
            strategy: EdgeMarkingStrategy::default(),
        }
    }

    pub fn with_strategy(shape: Label, strategy: EdgeMarkingStrategy) -> Self {
        Self { shape, strategy }
    }

    /// The `Edge`s this production would flag for the given match.
    pub fn edges_to_mark(&self, graph: &Hypergraph, m: &ElementMatch) -> Vec<NodeId> {
        let edges: BTreeSet<NodeId> = match self.strategy {
            EdgeMarkingStrategy::Sides => sides(&m.corners)
                .flat_map(|(a, b)| graph.edges_joining(a, b).collect::<Vec<_>>())
                .collect(),
            EdgeMarkingStrategy::PointSet => {
                let corners: BTreeSet<NodeId> = m.corners.iter().copied().collect();
                m.corners
                    .iter()
                    .flat_map(|&c| graph.incident(c))
                    .filter(|&h| {
                        matches!(graph.node(h), Ok(Node::Hyperedge(e)) if e.is_edge() && !e.refine)
                            && graph.degree(h) == 2
                            && graph.incident(h).all(|p| corners.contains(&p))
                    })
                    .collect()
            }
        };
        edges.into_iter().collect()
    }
}

impl Production for MarkEdges {
    type Match = ElementMatch;

    fn kind(&self) -> ProductionKind {
        ProductionKind::MarkEdges(self.shape)
    }

    fn find_matches(&self, graph: &Hypergraph, target: Option<NodeId>) -> Vec<ElementMatch> {
        if !self.shape.is_element() {
            return Vec::new();
        }
        candidates(graph, target, self.shape)
            .into_iter()
            .filter(|h| h.refine && graph.degree(h.id) == self.shape.arity())
            .filter_map(|h| {
                let corners = graph.corners_ccw(h.id);
                let accepted = match self.strategy {
                    EdgeMarkingStrategy::Sides => is_closed(graph, h.id, &corners),
                    EdgeMarkingStrategy::PointSet => true,
                };
                accepted.then_some(ElementMatch {
                    element: h.id,
                    corners,
                })
            })
            .collect()
    }

    fn rewrite(&self, graph: &mut Hypergraph, m: &ElementMatch) -> Result<Vec<NodeId>, GraphError> {
        let edges = self.edges_to_mark(graph, m);
        debug!(element = %m.element, edges = edges.len(), "marking sides");
        for edge in edges {
            graph.set_refine(edge, true)?;
        }
        Ok(Vec::new())
    }
}
