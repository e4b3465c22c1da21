//! Refinement settings.
//!
//! The library reads no files; callers build a [`RefinementConfig`] in code
//! or deserialize it with whichever serde format they already use. Missing
//! fields fall back to the defaults below.

use serde::{Deserialize, Serialize};

/// What happens to a shared side when it is split without a neighbour's midpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SharedEdgePolicy {
    /// The coarse edge is removed and replaced by its two halves.
    #[default]
    Replace,
    /// The coarse edge stays with its refine flag cleared, next to the two
    /// halves. The neighbour later synchronises against it.
    Retain,
}

/// How edge marking finds the sides of a marked element.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EdgeMarkingStrategy {
    /// Walk consecutive corners and flag the `Edge` joining each pair.
    #[default]
    Sides,
    /// Flag every unmarked `Edge` whose endpoints both belong to the element.
    PointSet,
}

/// Settings for [`Refiner`](crate::derivation::Refiner).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RefinementConfig {
    pub shared_edge_policy: SharedEdgePolicy,
    pub edge_marking: EdgeMarkingStrategy,
    /// Upper bound on edge-breaking rounds before giving up.
    pub max_breaking_rounds: usize,
    /// Record a [`DerivationStep`](crate::trace::DerivationStep) per applied production.
    pub record_trace: bool,
}

impl Default for RefinementConfig {
    fn default() -> Self {
        Self {
            shared_edge_policy: SharedEdgePolicy::Replace,
            edge_marking: EdgeMarkingStrategy::Sides,
            max_breaking_rounds: 64,
            record_trace: false,
        }
    }
}

impl RefinementConfig {
    pub fn with_shared_edge_policy(mut self, policy: SharedEdgePolicy) -> Self {
        self.shared_edge_policy = policy;
        self
    }

    pub fn with_edge_marking(mut self, strategy: EdgeMarkingStrategy) -> Self {
        self.edge_marking = strategy;
        self
    }

    pub fn with_max_breaking_rounds(mut self, rounds: usize) -> Self {
        self.max_breaking_rounds = rounds;
        self
    }

    pub fn with_trace(mut self, record: bool) -> Self {
        self.record_trace = record;
        self
    }
}
