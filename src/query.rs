//! Derived lookups over the incidence relation.
//!
//! Everything here is a pure read built on [`Hypergraph`]'s incidence sets.
//! The public methods validate node kinds and report structural errors; the
//! crate-internal variants assume well-typed ids and are what production
//! matching uses on hot paths.
//!
//! Results are returned in ascending id order.

use crate::core::{Hypergraph, Label, Node, NodeId};
use crate::error::GraphError;
use crate::geometry::sort_counter_clockwise;
use std::collections::BTreeSet;

impl Hypergraph {
    /// Points spanned by a hyperedge.
    pub fn points_of(&self, hyperedge: NodeId) -> Result<Vec<NodeId>, GraphError> {
        self.hyperedge(hyperedge)?;
        Ok(self.incident(hyperedge).collect())
    }

    /// Hyperedges incident to a point.
    pub fn hyperedges_of(&self, point: NodeId) -> Result<Vec<NodeId>, GraphError> {
        self.point(point)?;
        Ok(self.incident(point).collect())
    }

    /// Points sharing at least one hyperedge with `point`, excluding itself.
    pub fn neighbors_of(&self, point: NodeId) -> Result<Vec<NodeId>, GraphError> {
        self.point(point)?;
        let neighbors: BTreeSet<NodeId> = self
            .incident(point)
            .flat_map(|h| self.incident(h))
            .filter(|&p| p != point)
            .collect();
        Ok(neighbors.into_iter().collect())
    }

    /// Hyperedges incident to both points. Typically the element they belong
    /// to and/or the `Edge` joining them.
    pub fn hyperedges_between(&self, a: NodeId, b: NodeId) -> Result<Vec<NodeId>, GraphError> {
        self.point(a)?;
        self.point(b)?;
        Ok(self.joining(a, b).collect())
    }

    /// `Edge`-labelled hyperedges incident to both points.
    pub fn edges_between(&self, a: NodeId, b: NodeId) -> Result<Vec<NodeId>, GraphError> {
        self.point(a)?;
        self.point(b)?;
        Ok(self.edges_joining(a, b).collect())
    }

    /// A point `m`, distinct from `a` and `b`, joined to both by `Edge`
    /// hyperedges: the midpoint left behind when the side `a`–`b` was broken.
    /// The smallest such id wins.
    pub fn find_midpoint(&self, a: NodeId, b: NodeId) -> Result<Option<NodeId>, GraphError> {
        self.point(a)?;
        self.point(b)?;
        Ok(self.midpoint_between(a, b))
    }

    /// Corners of a hyperedge ordered counter-clockwise around their centroid.
    pub fn sorted_corners(&self, hyperedge: NodeId) -> Result<Vec<NodeId>, GraphError> {
        self.hyperedge(hyperedge)?;
        Ok(self.corners_ccw(hyperedge))
    }

    pub(crate) fn joining(&self, a: NodeId, b: NodeId) -> impl Iterator<Item = NodeId> + '_ {
        self.incident(a).filter(move |&h| self.is_linked(h, b))
    }

    pub(crate) fn edges_joining(&self, a: NodeId, b: NodeId) -> impl Iterator<Item = NodeId> + '_ {
        self.joining(a, b).filter(move |&h| self.is_edge(h))
    }

    pub(crate) fn midpoint_between(&self, a: NodeId, b: NodeId) -> Option<NodeId> {
        let candidates: BTreeSet<NodeId> = self
            .incident(a)
            .filter(|&h| self.is_edge(h))
            .flat_map(|h| self.incident(h))
            .filter(|&m| m != a && m != b)
            .collect();
        candidates
            .into_iter()
            .find(|&m| self.edges_joining(m, b).next().is_some())
    }

    pub(crate) fn corners_ccw(&self, hyperedge: NodeId) -> Vec<NodeId> {
        let mut corners: Vec<_> = self
            .incident(hyperedge)
            .filter_map(|p| self.point(p).ok())
            .collect();
        sort_counter_clockwise(&mut corners);
        corners.into_iter().map(|p| p.id).collect()
    }

    fn is_edge(&self, id: NodeId) -> bool {
        matches!(self.node(id), Ok(Node::Hyperedge(h)) if h.label == Label::Edge)
    }
}
