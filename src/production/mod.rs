//! Productions: left-hand-side matching and right-hand-side rewriting.
//!
//! Every production follows the same two-phase contract. `find_matches`
//! scans the graph (or a single target node) and returns owned match records
//! without touching the graph; `rewrite` consumes one record and mutates the
//! graph. [`Production::apply`] chains the two.
//!
//! A production whose precondition does not hold simply returns no matches.
//! Applying any production speculatively is therefore always safe.
//!
//! # Citations
//! - Graph transformation rules: Rozenberg, "Handbook of Graph Grammars and Computing by Graph Transformation" (1997)
//! - Double-pushout rewriting: Ehrig et al., "Fundamentals of Algebraic Graph Transformation" (2006)
//! - Mesh refinement grammars: Paszyński et al., "Graph grammar-driven parallel adaptive PDE solvers" (2010)

pub mod breaking;
pub mod edge_marking;
pub mod marking;
pub mod splitting;

pub use breaking::{EdgeMatch, SplitBoundaryEdge, SplitSharedEdge, SyncMatch, SyncSharedEdge};
pub use edge_marking::MarkEdges;
pub use marking::{ElementMatch, MarkElement};
pub use splitting::{SplitElement, SplitMatch};

use crate::core::{Hyperedge, Hypergraph, Label, NodeId};
use crate::error::GraphError;
use std::fmt;
use tracing::{debug, trace};

/// Identifies a production for logs and derivation traces.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ProductionKind {
    MarkElement(Label),
    MarkEdges(Label),
    SplitBoundaryEdge,
    SplitSharedEdge,
    SyncSharedEdge,
    SplitElement(Label),
}

impl fmt::Display for ProductionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProductionKind::MarkElement(label) => write!(f, "mark-element[{label}]"),
            ProductionKind::MarkEdges(label) => write!(f, "mark-edges[{label}]"),
            ProductionKind::SplitBoundaryEdge => f.write_str("split-boundary-edge"),
            ProductionKind::SplitSharedEdge => f.write_str("split-shared-edge"),
            ProductionKind::SyncSharedEdge => f.write_str("sync-shared-edge"),
            ProductionKind::SplitElement(label) => write!(f, "split-element[{label}]"),
        }
    }
}

/// Summary of one [`Production::apply`] call.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Applied {
    /// Number of matches rewritten.
    pub rewrites: usize,
    /// Nodes created by those rewrites, in creation order.
    pub created: Vec<NodeId>,
}

impl Applied {
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.rewrites == 0
    }

    /// Folds another summary into this one.
    pub fn merge(&mut self, other: Applied) {
        self.rewrites += other.rewrites;
        self.created.extend(other.created);
    }
}

/// A graph grammar production.
pub trait Production {
    /// Owned description of one occurrence of the left-hand side.
    type Match: fmt::Debug;

    /// Name used in logs and traces.
    fn kind(&self) -> ProductionKind;

    /// Finds every occurrence of the left-hand side, in ascending id order.
    ///
    /// With `target` set, only that node is considered. An absent target, or
    /// one that does not fit the pattern, yields no matches.
    fn find_matches(&self, graph: &Hypergraph, target: Option<NodeId>) -> Vec<Self::Match>;

    /// Replaces one occurrence with the right-hand side and returns the ids
    /// of the nodes it created.
    fn rewrite(&self, graph: &mut Hypergraph, m: &Self::Match) -> Result<Vec<NodeId>, GraphError>;

    /// Matches once, then rewrites every match in match-list order.
    fn apply(&self, graph: &mut Hypergraph, target: Option<NodeId>) -> Result<Applied, GraphError> {
        let matches = self.find_matches(graph, target);
        if matches.is_empty() {
            trace!(production = %self.kind(), ?target, "no match");
            return Ok(Applied::default());
        }
        debug!(production = %self.kind(), matches = matches.len(), "applying right-hand side");
        let mut applied = Applied::default();
        for m in &matches {
            trace!(production = %self.kind(), ?m, "rewrite");
            applied.created.extend(self.rewrite(graph, m)?);
            applied.rewrites += 1;
        }
        Ok(applied)
    }
}

/// Hyperedges with `label` that a production should look at.
pub(crate) fn candidates(
    graph: &Hypergraph,
    target: Option<NodeId>,
    label: Label,
) -> Vec<&Hyperedge> {
    match target {
        Some(id) => graph
            .hyperedge(id)
            .ok()
            .filter(|h| h.label == label)
            .into_iter()
            .collect(),
        None => graph.hyperedges_labelled(label).collect(),
    }
}

/// Consecutive corner pairs of a closed polygon, wrapping around.
pub(crate) fn sides(corners: &[NodeId]) -> impl Iterator<Item = (NodeId, NodeId)> + '_ {
    let n = corners.len();
    (0..n).map(move |i| (corners[i], corners[(i + 1) % n]))
}

/// Topological closure of an element.
///
/// Each side must be joined by the element itself, and any other hyperedge
/// joining the two corners must come with at least one `Edge`: a neighbour
/// sharing both corners without an `Edge` between them is malformed.
pub(crate) fn is_closed(graph: &Hypergraph, element: NodeId, corners: &[NodeId]) -> bool {
    sides(corners).all(|(a, b)| {
        let mut joined_by_element = false;
        let mut others = 0usize;
        let mut edges = 0usize;
        for h in graph.joining(a, b) {
            if h == element {
                joined_by_element = true;
                continue;
            }
            others += 1;
            if graph.hyperedge(h).is_ok_and(Hyperedge::is_edge) {
                edges += 1;
            }
        }
        joined_by_element && (others == 0 || edges > 0)
    })
}

/// Creates a hyperedge spanning `points`.
pub(crate) fn span(
    graph: &mut Hypergraph,
    label: Label,
    refine: bool,
    boundary: bool,
    points: &[NodeId],
) -> Result<NodeId, GraphError> {
    let id = graph.insert_hyperedge(label, refine, boundary)?;
    for &p in points {
        graph.link(id, p)?;
    }
    Ok(id)
}

/// The two endpoints of an `Edge`, if it has exactly two.
pub(crate) fn endpoints(graph: &Hypergraph, edge: NodeId) -> Option<(NodeId, NodeId)> {
    let mut points = graph.incident(edge);
    match (points.next(), points.next(), points.next()) {
        (Some(a), Some(b), None) => Some((a, b)),
        _ => None,
    }
}
