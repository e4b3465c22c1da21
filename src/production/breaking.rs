//! Edge breaking: the three rewrites that put a midpoint on a marked side.
//!
//! - [`SplitBoundaryEdge`] splits a marked boundary side.
//! - [`SyncSharedEdge`] breaks a marked shared side at the midpoint its
//!   neighbour already created.
//! - [`SplitSharedEdge`] breaks a marked shared side no neighbour has touched.
//!
//! The synchronising rewrite must run before the uncoordinated one in every
//! round, and the two match disjoint sets of edges: a shared side either has
//! a midpoint between its endpoints or it does not. Breaking one side can
//! expose another, so callers drive these to a fixed point (see
//! [`Refiner::break_marked_edges`](crate::derivation::Refiner::break_marked_edges)).

use super::{candidates, endpoints, span, Production, ProductionKind};
use crate::config::SharedEdgePolicy;
use crate::core::{Hyperedge, Hypergraph, Label, NodeId};
use crate::error::GraphError;
use crate::geometry::midpoint;
use tracing::debug;

/// A marked `Edge` and its two endpoints.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EdgeMatch {
    pub edge: NodeId,
    pub endpoints: (NodeId, NodeId),
}

/// A marked shared `Edge` together with the midpoint its neighbour created.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SyncMatch {
    pub edge: NodeId,
    pub endpoints: (NodeId, NodeId),
    pub midpoint: NodeId,
}

/// Marked two-point `Edge`s with the given boundary flag.
fn marked_edges(
    graph: &Hypergraph,
    target: Option<NodeId>,
    boundary: bool,
) -> impl Iterator<Item = (&Hyperedge, (NodeId, NodeId))> {
    candidates(graph, target, Label::Edge)
        .into_iter()
        .filter(move |e| e.refine && e.boundary == boundary)
        .filter_map(move |e| endpoints(graph, e.id).map(|ends| (e, ends)))
}

/// Inserts a point halfway between `a` and `b`.
fn insert_midpoint(
    graph: &mut Hypergraph,
    (a, b): (NodeId, NodeId),
    hanging: bool,
) -> Result<NodeId, GraphError> {
    let (x, y) = midpoint(graph.point(a)?.position(), graph.point(b)?.position());
    graph.insert_point(x, y, hanging)
}

/// Splits a marked boundary `Edge` at its midpoint.
///
/// Right-hand side: a new non-hanging point halfway between the endpoints,
/// two boundary `Edge`s (R=0, B=1) joining it to each endpoint. The original
/// edge is removed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SplitBoundaryEdge;

impl Production for SplitBoundaryEdge {
    type Match = EdgeMatch;

    fn kind(&self) -> ProductionKind {
        ProductionKind::SplitBoundaryEdge
    }

    fn find_matches(&self, graph: &Hypergraph, target: Option<NodeId>) -> Vec<EdgeMatch> {
        marked_edges(graph, target, true)
            .map(|(e, endpoints)| EdgeMatch {
                edge: e.id,
                endpoints,
            })
            .collect()
    }

    fn rewrite(&self, graph: &mut Hypergraph, m: &EdgeMatch) -> Result<Vec<NodeId>, GraphError> {
        let (a, b) = m.endpoints;
        let mid = insert_midpoint(graph, m.endpoints, false)?;
        let first = span(graph, Label::Edge, false, true, &[a, mid])?;
        let second = span(graph, Label::Edge, false, true, &[mid, b])?;
        graph.remove(m.edge)?;
        debug!(edge = %m.edge, midpoint = %mid, "split boundary edge");
        Ok(vec![mid, first, second])
    }
}

/// Splits a marked shared `Edge` that no neighbour has broken yet.
///
/// Right-hand side: a new hanging point halfway between the endpoints and two
/// shared `Edge`s (R=0, B=0) joining it to each endpoint. The coarse edge is
/// removed under [`SharedEdgePolicy::Replace`] and kept with R cleared under
/// [`SharedEdgePolicy::Retain`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SplitSharedEdge {
    pub policy: SharedEdgePolicy,
}

impl SplitSharedEdge {
    pub fn new(policy: SharedEdgePolicy) -> Self {
        Self { policy }
    }
}

impl Production for SplitSharedEdge {
    type Match = EdgeMatch;

    fn kind(&self) -> ProductionKind {
        ProductionKind::SplitSharedEdge
    }

    fn find_matches(&self, graph: &Hypergraph, target: Option<NodeId>) -> Vec<EdgeMatch> {
        marked_edges(graph, target, false)
            .filter(|&(_, (a, b))| graph.midpoint_between(a, b).is_none())
            .map(|(e, endpoints)| EdgeMatch {
                edge: e.id,
                endpoints,
            })
            .collect()
    }

    fn rewrite(&self, graph: &mut Hypergraph, m: &EdgeMatch) -> Result<Vec<NodeId>, GraphError> {
        let (a, b) = m.endpoints;
        let mid = insert_midpoint(graph, m.endpoints, true)?;
        let first = span(graph, Label::Edge, false, false, &[a, mid])?;
        let second = span(graph, Label::Edge, false, false, &[mid, b])?;
        match self.policy {
            SharedEdgePolicy::Replace => {
                graph.remove(m.edge)?;
            }
            SharedEdgePolicy::Retain => graph.set_refine(m.edge, false)?,
        }
        debug!(edge = %m.edge, midpoint = %mid, policy = ?self.policy, "split shared edge");
        Ok(vec![mid, first, second])
    }
}

/// Breaks a marked shared `Edge` at the midpoint its neighbour already made.
///
/// Left-hand side: a marked shared `Edge` `a`–`b` and a third point `m`
/// joined to both `a` and `b` by `Edge`s. Right-hand side: the coarse edge is
/// removed and two fresh shared `Edge`s `a`–`m`, `m`–`b` (R=0, B=0) are
/// created, so both elements end up on the same midpoint.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SyncSharedEdge;

impl Production for SyncSharedEdge {
    type Match = SyncMatch;

    fn kind(&self) -> ProductionKind {
        ProductionKind::SyncSharedEdge
    }

    fn find_matches(&self, graph: &Hypergraph, target: Option<NodeId>) -> Vec<SyncMatch> {
        marked_edges(graph, target, false)
            .filter_map(|(e, (a, b))| {
                graph.midpoint_between(a, b).map(|midpoint| SyncMatch {
                    edge: e.id,
                    endpoints: (a, b),
                    midpoint,
                })
            })
            .collect()
    }

    fn rewrite(&self, graph: &mut Hypergraph, m: &SyncMatch) -> Result<Vec<NodeId>, GraphError> {
        let (a, b) = m.endpoints;
        graph.point(m.midpoint)?;
        graph.remove(m.edge)?;
        let first = span(graph, Label::Edge, false, false, &[a, m.midpoint])?;
        let second = span(graph, Label::Edge, false, false, &[m.midpoint, b])?;
        debug!(edge = %m.edge, midpoint = %m.midpoint, "synchronised shared edge");
        Ok(vec![first, second])
    }
}
