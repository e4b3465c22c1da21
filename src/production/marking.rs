//! Element marking: flags one closed, unmarked element for refinement.

use super::{candidates, is_closed, Production, ProductionKind};
use crate::core::{Hypergraph, Label, NodeId};
use crate::error::GraphError;

/// An element matched by a marking production, with its corners in
/// counter-clockwise order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ElementMatch {
    pub element: NodeId,
    pub corners: Vec<NodeId>,
}

/// Sets R on an unmarked element of the given shape.
///
/// Left-hand side: a hyperedge labelled `shape` with R unset, spanning
/// exactly `shape.arity()` points, whose sides pass the closure check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MarkElement {
    pub shape: Label,
}

impl MarkElement {
    pub fn new(shape: Label) -> Self {
        Self { shape }
    }
}

impl Production for MarkElement {
    type Match = ElementMatch;

    fn kind(&self) -> ProductionKind {
        ProductionKind::MarkElement(self.shape)
    }

    fn find_matches(&self, graph: &Hypergraph, target: Option<NodeId>) -> Vec<ElementMatch> {
        if !self.shape.is_element() {
            return Vec::new();
        }
        candidates(graph, target, self.shape)
            .into_iter()
            .filter(|h| !h.refine && graph.degree(h.id) == self.shape.arity())
            .filter_map(|h| {
                let corners = graph.corners_ccw(h.id);
                is_closed(graph, h.id, &corners).then_some(ElementMatch {
                    element: h.id,
                    corners,
                })
            })
            .collect()
    }

    fn rewrite(&self, graph: &mut Hypergraph, m: &ElementMatch) -> Result<Vec<NodeId>, GraphError> {
        graph.set_refine(m.element, true)?;
        Ok(Vec::new())
    }
}
