//! Derivation traces.
//!
//! A trace is the linear history of production applications performed by a
//! [`Refiner`](crate::derivation::Refiner): which production ran, where, how
//! many rewrites it made, and the mesh fingerprint on either side. Two
//! traces ending in the same fingerprint derived the same mesh.
//!
//! # Citations
//! - Graph transformation traceability: Varro et al., "Model transformation by example" (2006)
//! - Derivations in graph grammars: Ehrig et al., "Fundamentals of Algebraic Graph Transformation" (2006)

use crate::core::NodeId;
use crate::fingerprint::HashValue;
use crate::production::ProductionKind;

/// One production application.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DerivationStep {
    /// The production that was applied.
    pub production: ProductionKind,
    /// The node the search was restricted to, if any.
    pub target: Option<NodeId>,
    /// Number of matches rewritten.
    pub rewrites: usize,
    /// Mesh fingerprint before the application.
    pub pre: HashValue,
    /// Mesh fingerprint after the application.
    pub post: HashValue,
}

impl DerivationStep {
    /// Whether the application left the mesh unchanged.
    pub fn is_noop(&self) -> bool {
        self.pre == self.post
    }
}

/// Ordered record of [`DerivationStep`]s.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DerivationTrace {
    steps: Vec<DerivationStep>,
}

impl DerivationTrace {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a step.
    pub fn record(&mut self, step: DerivationStep) {
        self.steps.push(step);
    }

    /// Steps in application order.
    pub fn steps(&self) -> &[DerivationStep] {
        &self.steps
    }

    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    /// Total rewrites over all steps.
    pub fn rewrite_count(&self) -> usize {
        self.steps.iter().map(|s| s.rewrites).sum()
    }

    /// Fingerprint of the mesh after the last recorded step.
    pub fn last_fingerprint(&self) -> Option<HashValue> {
        self.steps.last().map(|s| s.post)
    }

    /// Steps that applied the given production.
    pub fn steps_of(&self, production: ProductionKind) -> impl Iterator<Item = &DerivationStep> {
        self.steps.iter().filter(move |s| s.production == production)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::Label;

    fn step(production: ProductionKind, rewrites: usize, post: u8) -> DerivationStep {
        DerivationStep {
            production,
            target: None,
            rewrites,
            pre: HashValue::zero(),
            post: HashValue([post; 32]),
        }
    }

    #[test]
    fn empty_trace() {
        let trace = DerivationTrace::new();
        assert!(trace.is_empty());
        assert_eq!(trace.rewrite_count(), 0);
        assert_eq!(trace.last_fingerprint(), None);
    }

    #[test]
    fn records_in_order() {
        let mut trace = DerivationTrace::new();
        trace.record(step(ProductionKind::MarkElement(Label::Quad), 1, 1));
        trace.record(step(ProductionKind::SplitBoundaryEdge, 4, 2));
        trace.record(step(ProductionKind::SplitBoundaryEdge, 0, 0));

        assert_eq!(trace.len(), 3);
        assert_eq!(trace.rewrite_count(), 5);
        assert_eq!(trace.last_fingerprint(), Some(HashValue::zero()));
        assert_eq!(trace.steps()[1].production, ProductionKind::SplitBoundaryEdge);
        assert_eq!(trace.steps_of(ProductionKind::SplitBoundaryEdge).count(), 2);
        assert!(trace.steps()[2].is_noop());
        assert!(!trace.steps()[0].is_noop());
    }
}
