//! The refinement driver.
//!
//! [`Refiner`] sequences the productions into one refinement cycle per
//! element: mark the element, mark its sides, break every marked side until
//! nothing matches, then split the element. All scans run in ascending id
//! order, so the same graph and the same calls always produce the same
//! sequence of rewrites.

use crate::config::RefinementConfig;
use crate::core::{Hypergraph, Label, NodeId};
use crate::error::GraphError;
use crate::fingerprint::mesh_fingerprint;
use crate::production::{
    Applied, MarkEdges, MarkElement, Production, SplitBoundaryEdge, SplitElement, SplitSharedEdge,
    SyncSharedEdge,
};
use crate::trace::{DerivationStep, DerivationTrace};
use tracing::{debug, info, warn};

/// What one call to [`Refiner::refine`] did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RefinementOutcome {
    /// The element that was refined.
    pub element: NodeId,
    /// Whether the marking production fired. `false` if the element was
    /// already marked or failed the closure check.
    pub marked: bool,
    /// Edge-breaking rewrites performed while driving to a fixed point.
    pub edges_broken: usize,
    /// Whether the element was split.
    pub split: bool,
    /// Quads that replaced the element, in creation order.
    pub new_elements: Vec<NodeId>,
}

/// Drives productions over a mesh and optionally records a derivation trace.
#[derive(Debug, Clone, Default)]
pub struct Refiner {
    config: RefinementConfig,
    trace: DerivationTrace,
}

impl Refiner {
    pub fn new(config: RefinementConfig) -> Self {
        Self {
            config,
            trace: DerivationTrace::new(),
        }
    }

    pub fn config(&self) -> &RefinementConfig {
        &self.config
    }

    /// The steps recorded so far. Empty unless `record_trace` is set.
    pub fn trace(&self) -> &DerivationTrace {
        &self.trace
    }

    /// Hands over the recorded trace and starts a fresh one.
    pub fn take_trace(&mut self) -> DerivationTrace {
        std::mem::take(&mut self.trace)
    }

    /// Applies a single production, recording a step when tracing.
    pub fn apply<P: Production>(
        &mut self,
        graph: &mut Hypergraph,
        production: &P,
        target: Option<NodeId>,
    ) -> Result<Applied, GraphError> {
        if !self.config.record_trace {
            return production.apply(graph, target);
        }
        let pre = mesh_fingerprint(graph);
        let applied = production.apply(graph, target)?;
        let post = if applied.is_empty() {
            pre
        } else {
            mesh_fingerprint(graph)
        };
        self.trace.record(DerivationStep {
            production: production.kind(),
            target,
            rewrites: applied.rewrites,
            pre,
            post,
        });
        Ok(applied)
    }

    /// Breaks every marked `Edge` in the graph.
    ///
    /// Each round tries synchronisation against an existing midpoint first,
    /// then the uncoordinated shared split, then the boundary split. Rounds
    /// repeat until one applies nothing. Returns the total number of
    /// rewrites.
    ///
    /// # Errors
    /// [`GraphError::NoFixedPoint`] once more than `max_breaking_rounds`
    /// rounds have changed the graph.
    pub fn break_marked_edges(&mut self, graph: &mut Hypergraph) -> Result<usize, GraphError> {
        let sync = SyncSharedEdge;
        let shared = SplitSharedEdge::new(self.config.shared_edge_policy);
        let boundary = SplitBoundaryEdge;
        let limit = self.config.max_breaking_rounds;

        let mut total = 0;
        let mut rounds = 0;
        loop {
            let mut round = self.apply(graph, &sync, None)?;
            round.merge(self.apply(graph, &shared, None)?);
            round.merge(self.apply(graph, &boundary, None)?);
            if round.is_empty() {
                debug!(rounds, rewrites = total, "edge breaking reached a fixed point");
                return Ok(total);
            }
            total += round.rewrites;
            rounds += 1;
            if rounds > limit {
                return Err(GraphError::NoFixedPoint { rounds: limit });
            }
        }
    }

    /// Runs a full refinement cycle on one element.
    ///
    /// # Errors
    /// - [`GraphError::NodeNotFound`] if `element` does not exist.
    /// - [`GraphError::WrongKind`] if it is a point.
    /// - [`GraphError::NotAnElement`] if it is an `Edge`.
    /// - [`GraphError::NoFixedPoint`] from edge breaking.
    pub fn refine(
        &mut self,
        graph: &mut Hypergraph,
        element: NodeId,
    ) -> Result<RefinementOutcome, GraphError> {
        let shape = graph.hyperedge(element)?.label;
        if !shape.is_element() {
            return Err(GraphError::NotAnElement(element));
        }

        let marked = !self
            .apply(graph, &MarkElement::new(shape), Some(element))?
            .is_empty();
        let edge_marking = MarkEdges::with_strategy(shape, self.config.edge_marking);
        self.apply(graph, &edge_marking, Some(element))?;
        let edges_broken = self.break_marked_edges(graph)?;
        let split = self.apply(graph, &SplitElement::new(shape), Some(element))?;

        let new_elements: Vec<NodeId> = split
            .created
            .iter()
            .copied()
            .filter(|&id| graph.hyperedge(id).is_ok_and(|h| h.label == Label::Quad))
            .collect();
        if split.is_empty() {
            if graph.hyperedge(element).is_ok_and(|h| h.refine) {
                // a side broken more than once has no single midpoint
                warn!(%element, %shape, "marked element has a side without a midpoint");
            } else {
                debug!(%element, %shape, "element not split");
            }
        }
        info!(
            %element,
            %shape,
            edges_broken,
            new_elements = new_elements.len(),
            "refinement cycle finished"
        );
        Ok(RefinementOutcome {
            element,
            marked,
            edges_broken,
            split: !split.is_empty(),
            new_elements,
        })
    }

    /// Refines every element currently labelled `shape`, in ascending id
    /// order. Elements created along the way are not visited.
    pub fn refine_all(
        &mut self,
        graph: &mut Hypergraph,
        shape: Label,
    ) -> Result<Vec<RefinementOutcome>, GraphError> {
        let targets: Vec<NodeId> = graph.hyperedges_labelled(shape).map(|h| h.id).collect();
        targets
            .into_iter()
            .map(|element| self.refine(graph, element))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SharedEdgePolicy;
    use crate::core::NodeKind;
    use crate::invariants::check_well_formed;
    use crate::production::fixtures::*;
    use crate::production::ProductionKind;

    fn points_at(g: &Hypergraph, x: f64, y: f64) -> Vec<NodeId> {
        g.points()
            .filter(|p| p.position() == (x, y))
            .map(|p| p.id)
            .collect()
    }

    fn no_flags_left(g: &Hypergraph) -> bool {
        g.hyperedges().all(|h| !h.refine)
    }

    #[test]
    fn refines_the_unit_square() {
        let mut g = unit_square();
        let outcome = Refiner::default().refine(&mut g, id(20)).unwrap();

        assert!(outcome.marked && outcome.split);
        assert_eq!(outcome.edges_broken, 4);
        assert_eq!(outcome.new_elements.len(), 4);
        assert_eq!(g.point_count(), 9);
        assert_eq!(g.hyperedges_labelled(Label::Quad).count(), 4);
        assert_eq!(g.hyperedges_labelled(Label::Edge).count(), 12);
        assert_eq!(points_at(&g, 1.0, 1.0).len(), 1);
        assert!(no_flags_left(&g));
        check_well_formed(&g).unwrap();
    }

    #[test]
    fn refine_rejects_non_elements() {
        let mut g = unit_square();
        let mut refiner = Refiner::default();
        assert_eq!(
            refiner.refine(&mut g, id(99)),
            Err(GraphError::NodeNotFound(id(99)))
        );
        assert_eq!(
            refiner.refine(&mut g, id(1)),
            Err(GraphError::WrongKind {
                id: id(1),
                expected: NodeKind::Hyperedge
            })
        );
        assert_eq!(refiner.refine(&mut g, id(11)), Err(GraphError::NotAnElement(id(11))));
    }

    #[test]
    fn neighbours_share_one_midpoint() {
        let mut g = two_squares();
        let mut refiner = Refiner::default();
        refiner.refine(&mut g, id(20)).unwrap();
        let second = refiner.refine(&mut g, id(21)).unwrap();
        assert!(second.split);

        let shared = points_at(&g, 2.0, 1.0);
        assert_eq!(shared.len(), 1);
        assert!(g.point(shared[0]).unwrap().hanging);
        assert_eq!(g.edges_between(id(2), shared[0]).unwrap().len(), 1);
        assert_eq!(g.edges_between(id(3), shared[0]).unwrap().len(), 1);
        assert!(g.edges_between(id(2), id(3)).unwrap().is_empty());

        assert_eq!(g.hyperedges_labelled(Label::Quad).count(), 8);
        assert_eq!(g.hyperedges_labelled(Label::Edge).count(), 22);
        assert!(no_flags_left(&g));
        check_well_formed(&g).unwrap();
    }

    #[test]
    fn retained_shared_edge_is_synchronised() {
        let config = RefinementConfig::default().with_shared_edge_policy(SharedEdgePolicy::Retain);
        let mut g = two_squares();
        let mut refiner = Refiner::new(config.with_trace(true));
        refiner.refine(&mut g, id(20)).unwrap();
        assert!(g.contains(id(12)));

        refiner.refine(&mut g, id(21)).unwrap();
        assert!(!g.contains(id(12)));
        assert_eq!(
            refiner
                .trace()
                .steps_of(ProductionKind::SyncSharedEdge)
                .map(|s| s.rewrites)
                .sum::<usize>(),
            1
        );

        let shared = points_at(&g, 2.0, 1.0);
        assert_eq!(shared.len(), 1);
        // the neighbour's halves plus the synchronised pair
        assert_eq!(g.edges_between(id(2), shared[0]).unwrap().len(), 2);
        check_well_formed(&g).unwrap();
    }

    #[test]
    fn refinement_order_does_not_change_the_mesh() {
        for policy in [SharedEdgePolicy::Replace, SharedEdgePolicy::Retain] {
            let config = RefinementConfig::default().with_shared_edge_policy(policy);

            let mut forward = two_squares();
            let mut refiner = Refiner::new(config.clone());
            refiner.refine(&mut forward, id(20)).unwrap();
            refiner.refine(&mut forward, id(21)).unwrap();

            let mut backward = two_squares();
            let mut refiner = Refiner::new(config);
            refiner.refine(&mut backward, id(21)).unwrap();
            refiner.refine(&mut backward, id(20)).unwrap();

            assert_eq!(
                mesh_fingerprint(&forward),
                mesh_fingerprint(&backward),
                "{policy:?}"
            );
        }
    }

    #[test]
    fn refine_all_visits_existing_elements_only() {
        let mut g = two_squares();
        let outcomes = Refiner::default().refine_all(&mut g, Label::Quad).unwrap();
        let refined: Vec<NodeId> = outcomes.iter().map(|o| o.element).collect();
        assert_eq!(refined, vec![id(20), id(21)]);
        assert!(outcomes.iter().all(|o| o.split));
        assert_eq!(g.hyperedges_labelled(Label::Quad).count(), 8);
    }

    #[test]
    fn refines_every_polygon() {
        for label in Label::ELEMENTS {
            let n = label.arity();
            let mut g = polygon(n);
            let outcome = Refiner::default().refine(&mut g, id(1000)).unwrap();
            assert_eq!(outcome.edges_broken, n, "{label}");
            assert_eq!(outcome.new_elements.len(), n, "{label}");
            assert_eq!(g.point_count(), 2 * n + 1, "{label}");
            check_well_formed(&g).unwrap();
        }
    }

    #[test]
    fn trace_records_every_application() {
        let mut g = unit_square();
        let mut refiner = Refiner::new(RefinementConfig::default().with_trace(true));
        refiner.refine(&mut g, id(20)).unwrap();

        let trace = refiner.take_trace();
        // mark, mark edges, two breaking rounds of three, split
        assert_eq!(trace.len(), 9);
        assert_eq!(trace.rewrite_count(), 7);
        assert_eq!(trace.last_fingerprint(), Some(mesh_fingerprint(&g)));
        assert_eq!(
            trace.steps()[0].production,
            ProductionKind::MarkElement(Label::Quad)
        );
        assert!(refiner.trace().is_empty());
    }

    #[test]
    fn untraced_refiner_records_nothing() {
        let mut g = unit_square();
        let mut refiner = Refiner::default();
        refiner.refine(&mut g, id(20)).unwrap();
        assert!(refiner.trace().is_empty());
    }

    #[test]
    fn breaking_respects_the_round_limit() {
        let mut g = unit_square();
        let mut refiner = Refiner::new(RefinementConfig::default().with_max_breaking_rounds(0));
        assert_eq!(
            refiner.refine(&mut g, id(20)),
            Err(GraphError::NoFixedPoint { rounds: 0 })
        );
    }

    #[test]
    fn unclosed_element_is_left_alone() {
        let mut g = two_squares();
        // glue 20 and 21 along 2-3 with nothing in between
        g.remove(id(12)).unwrap();
        let outcome = Refiner::default().refine(&mut g, id(20)).unwrap();
        assert!(!outcome.marked && !outcome.split);
        assert_eq!(outcome.edges_broken, 0);
        assert!(g.contains(id(20)));
    }

    #[test]
    fn side_broken_twice_leaves_the_element_marked() {
        // right side 2-3 already carries two points: 2-5, 5-6, 6-3
        let mut g = unit_square();
        g.remove(id(12)).unwrap();
        g.add_point(id(5), 2.0, 0.5).unwrap();
        g.add_point(id(6), 2.0, 1.5).unwrap();
        for (e, a, b) in [(15, 2, 5), (16, 5, 6), (17, 6, 3)] {
            edge(&mut g, e, a, b, true);
        }

        let outcome = Refiner::default().refine(&mut g, id(20)).unwrap();
        assert!(outcome.marked);
        assert!(!outcome.split);
        assert_eq!(outcome.edges_broken, 3);
        assert!(outcome.new_elements.is_empty());
        assert!(g.hyperedge(id(20)).unwrap().refine);
        assert_eq!(g.hyperedges_labelled(Label::Quad).count(), 1);
        check_well_formed(&g).unwrap();
    }

    #[test]
    fn breaking_counts_rewrites_across_rounds() {
        let mut g = two_squares();
        let mut refiner = Refiner::default();
        for e in [11, 12, 13, 14] {
            g.set_refine(id(e), true).unwrap();
        }
        // round one: 12 split as shared, 11/13/14 as boundary
        assert_eq!(refiner.break_marked_edges(&mut g).unwrap(), 4);
        assert_eq!(refiner.break_marked_edges(&mut g).unwrap(), 0);
        assert!(no_flags_left(&g));
    }
}
