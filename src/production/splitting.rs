//! Element splitting: replaces a marked element whose sides are all broken
//! by one quad per corner around a new center point.

use super::{candidates, sides, span, Production, ProductionKind};
use crate::core::{Hypergraph, Label, NodeId};
use crate::error::GraphError;
use crate::geometry::centroid;
use tracing::debug;

/// A marked element ready to split.
///
/// `midpoints[i]` sits on the side `corners[i]`–`corners[i + 1]` (wrapping).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SplitMatch {
    pub element: NodeId,
    pub corners: Vec<NodeId>,
    pub midpoints: Vec<NodeId>,
}

/// Splits a marked element of the given shape into `shape.arity()` quads.
///
/// Left-hand side: a hyperedge labelled `shape` with R set, spanning exactly
/// `shape.arity()` points, every side of which has a midpoint. Right-hand
/// side: a center point at the mean of the corners, and for each `i` a
/// `Quad` spanning `corners[i+1]`, `midpoints[i]`, the center and
/// `midpoints[i+1]`, plus an interior `Edge` from the center to
/// `midpoints[i+1]`. The element itself is removed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SplitElement {
    pub shape: Label,
}

impl SplitElement {
    pub fn new(shape: Label) -> Self {
        Self { shape }
    }
}

impl Production for SplitElement {
    type Match = SplitMatch;

    fn kind(&self) -> ProductionKind {
        ProductionKind::SplitElement(self.shape)
    }

    fn find_matches(&self, graph: &Hypergraph, target: Option<NodeId>) -> Vec<SplitMatch> {
        if !self.shape.is_element() {
            return Vec::new();
        }
        candidates(graph, target, self.shape)
            .into_iter()
            .filter(|h| h.refine && graph.degree(h.id) == self.shape.arity())
            .filter_map(|h| {
                let corners = graph.corners_ccw(h.id);
                let midpoints = sides(&corners)
                    .map(|(a, b)| graph.midpoint_between(a, b))
                    .collect::<Option<Vec<_>>>()?;
                Some(SplitMatch {
                    element: h.id,
                    corners,
                    midpoints,
                })
            })
            .collect()
    }

    fn rewrite(&self, graph: &mut Hypergraph, m: &SplitMatch) -> Result<Vec<NodeId>, GraphError> {
        let positions = m
            .corners
            .iter()
            .map(|&c| graph.point(c).map(|p| p.position()))
            .collect::<Result<Vec<_>, _>>()?;
        let (x, y) = centroid(positions);
        let center = graph.insert_point(x, y, false)?;
        graph.remove(m.element)?;

        let n = m.corners.len();
        let mut created = Vec::with_capacity(2 * n + 1);
        created.push(center);
        for i in 0..n {
            let next = (i + 1) % n;
            let quad = span(
                graph,
                Label::Quad,
                false,
                false,
                &[m.corners[next], m.midpoints[i], center, m.midpoints[next]],
            )?;
            let interior = span(graph, Label::Edge, false, false, &[center, m.midpoints[next]])?;
            created.extend([quad, interior]);
        }
        debug!(element = %m.element, %center, quads = n, "split element");
        Ok(created)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::production::fixtures::*;
    use crate::production::{MarkEdges, MarkElement, SplitBoundaryEdge};
    use std::collections::BTreeSet;

    /// Marks an isolated element, its sides, and breaks them.
    fn broken(mut g: Hypergraph, shape: Label) -> Hypergraph {
        MarkElement::new(shape).apply(&mut g, None).unwrap();
        MarkEdges::new(shape).apply(&mut g, None).unwrap();
        SplitBoundaryEdge.apply(&mut g, None).unwrap();
        g
    }

    fn position(g: &Hypergraph, p: NodeId) -> (f64, f64) {
        g.point(p).unwrap().position()
    }

    #[test]
    fn unit_square_splits_into_four_quads() {
        let mut g = broken(unit_square(), Label::Quad);
        let applied = SplitElement::new(Label::Quad).apply(&mut g, None).unwrap();
        assert_eq!(applied.rewrites, 1);
        assert!(!g.contains(id(20)));

        let center = applied.created[0];
        assert_eq!(position(&g, center), (1.0, 1.0));
        assert!(!g.point(center).unwrap().hanging);

        let quads: Vec<_> = g.hyperedges_labelled(Label::Quad).map(|q| q.id).collect();
        assert_eq!(quads.len(), 4);
        for q in &quads {
            let points = g.points_of(*q).unwrap();
            assert_eq!(points.len(), 4);
            assert!(points.contains(&center));
            let corners = points.iter().filter(|p| p.as_u64() <= 4).count();
            assert_eq!(corners, 1, "quad {q} spans exactly one original corner");
            assert!(!g.hyperedge(*q).unwrap().refine);
        }

        let mut spokes: Vec<(f64, f64)> = g
            .hyperedges_of(center)
            .unwrap()
            .into_iter()
            .filter(|h| g.hyperedge(*h).unwrap().is_edge())
            .map(|h| {
                let far = g.points_of(h).unwrap().into_iter().find(|&p| p != center);
                position(&g, far.unwrap())
            })
            .collect();
        spokes.sort_by(|a, b| a.partial_cmp(b).unwrap());
        assert_eq!(spokes, vec![(0.0, 1.0), (1.0, 0.0), (1.0, 2.0), (2.0, 1.0)]);
    }

    #[test]
    fn unmarked_element_is_left_alone() {
        let mut g = broken(unit_square(), Label::Quad);
        g.set_refine(id(20), false).unwrap();
        let before = (g.point_count(), g.hyperedge_count());
        let applied = SplitElement::new(Label::Quad).apply(&mut g, None).unwrap();
        assert!(applied.is_empty());
        assert_eq!(before, (g.point_count(), g.hyperedge_count()));
    }

    #[test]
    fn missing_midpoint_blocks_the_split() {
        let mut g = unit_square();
        MarkElement::new(Label::Quad).apply(&mut g, None).unwrap();
        // only the bottom side gets broken
        g.set_refine(id(11), true).unwrap();
        SplitBoundaryEdge.apply(&mut g, None).unwrap();
        assert!(SplitElement::new(Label::Quad).find_matches(&g, None).is_empty());
    }

    #[test]
    fn match_lists_midpoints_in_corner_order() {
        let g = broken(unit_square(), Label::Quad);
        let matches = SplitElement::new(Label::Quad).find_matches(&g, Some(id(20)));
        assert_eq!(matches.len(), 1);
        let m = &matches[0];
        assert_eq!(m.corners, vec![id(1), id(2), id(3), id(4)]);
        let mids: Vec<_> = m.midpoints.iter().map(|&p| position(&g, p)).collect();
        assert_eq!(mids, vec![(1.0, 0.0), (2.0, 1.0), (1.0, 2.0), (0.0, 1.0)]);
    }

    #[test]
    fn every_arity_yields_n_quads_and_n_spokes() {
        for label in Label::ELEMENTS {
            let n = label.arity();
            let mut g = broken(polygon(n), label);
            let edges_before = g.hyperedges_labelled(Label::Edge).count();

            SplitElement::new(label).apply(&mut g, None).unwrap();
            assert!(!g.contains(id(1000)), "{label}");
            assert_eq!(g.hyperedges_labelled(label).filter(|h| h.refine).count(), 0);
            assert_eq!(g.hyperedges_labelled(Label::Quad).count(), n, "{label}");
            assert_eq!(
                g.hyperedges_labelled(Label::Edge).count(),
                edges_before + n,
                "{label}"
            );
        }
    }

    #[test]
    fn every_quad_spans_corner_midpoints_and_center() {
        for label in Label::ELEMENTS {
            let n = label.arity();
            let mut g = broken(polygon(n), label);
            let split = SplitElement::new(label);
            let matches = split.find_matches(&g, None);
            assert_eq!(matches.len(), 1, "{label}");
            let m = matches[0].clone();

            let created = split.rewrite(&mut g, &m).unwrap();
            assert_eq!(created.len(), 2 * n + 1, "{label}");
            let center = created[0];

            for i in 0..n {
                let next = (i + 1) % n;
                let quad = created[1 + 2 * i];
                assert_eq!(g.hyperedge(quad).unwrap().label, Label::Quad);
                let spanned: BTreeSet<NodeId> = g.points_of(quad).unwrap().into_iter().collect();
                let expected: BTreeSet<NodeId> =
                    [m.corners[next], m.midpoints[i], center, m.midpoints[next]]
                        .into_iter()
                        .collect();
                assert_eq!(spanned, expected, "{label} quad {i}");

                let interior = created[2 + 2 * i];
                let ends: BTreeSet<NodeId> = g.points_of(interior).unwrap().into_iter().collect();
                assert_eq!(ends, BTreeSet::from([center, m.midpoints[next]]), "{label}");
            }

            let spokes: BTreeSet<BTreeSet<NodeId>> = g
                .hyperedges_of(center)
                .unwrap()
                .into_iter()
                .filter(|h| g.hyperedge(*h).unwrap().is_edge())
                .map(|h| g.points_of(h).unwrap().into_iter().collect())
                .collect();
            let expected: BTreeSet<BTreeSet<NodeId>> = m
                .midpoints
                .iter()
                .map(|&mid| BTreeSet::from([center, mid]))
                .collect();
            assert_eq!(spokes, expected, "{label}");
            assert_eq!(
                g.hyperedges_of(center)
                    .unwrap()
                    .into_iter()
                    .filter(|h| g.hyperedge(*h).unwrap().is_edge())
                    .count(),
                n,
                "{label}"
            );
        }
    }
}
