//! Hypergrammar: adaptive refinement of 2-D polygonal meshes by hypergraph
//! grammar productions.
//!
//! A mesh is a hypergraph whose vertices are geometric points and whose
//! hyperedges are either mesh sides (`Edge`, two points) or polygonal
//! elements (`Quad` through `Heptagon`). Refinement is a sequence of local
//! rewrites:
//! - marking an element and then its sides,
//! - breaking every marked side at its midpoint, reusing a midpoint a
//!   neighbour has already created on a shared side,
//! - splitting the element into one quad per corner around its center.
//!
//! Every production is generic over the element's arity, so one
//! implementation serves all polygon shapes.
//!
//! # Citations
//! - Hyperedge replacement: Habel, "Hyperedge Replacement: Grammars and Languages" (1992)
//! - Hypergraph grammars for mesh refinement: Ślusarczyk & Paszyński, "Hypergraph grammars in hp-adaptive finite element method" (2013)
//! - Graph grammar driven adaptivity: Paszyński et al., "Graph grammar-driven parallel adaptive PDE solvers" (2010)
//!
//! # Example
//!
//! ```
//! use hypergrammar::prelude::*;
//!
//! let mut mesh = Hypergraph::new();
//! for (id, x, y) in [(1, 0.0, 0.0), (2, 2.0, 0.0), (3, 2.0, 2.0), (4, 0.0, 2.0)] {
//!     mesh.add_point(NodeId::new(id), x, y)?;
//! }
//! for (id, a, b) in [(11, 1, 2), (12, 2, 3), (13, 3, 4), (14, 4, 1)] {
//!     mesh.add_hyperedge(NodeId::new(id), Label::Edge, false, true)?;
//!     mesh.link(NodeId::new(id), NodeId::new(a))?;
//!     mesh.link(NodeId::new(id), NodeId::new(b))?;
//! }
//! mesh.add_hyperedge(NodeId::new(20), Label::Quad, false, false)?;
//! for corner in 1..=4 {
//!     mesh.link(NodeId::new(20), NodeId::new(corner))?;
//! }
//!
//! let outcome = Refiner::default().refine(&mut mesh, NodeId::new(20))?;
//! assert_eq!(outcome.new_elements.len(), 4);
//! assert!(is_well_formed(&mesh));
//! # Ok::<(), GraphError>(())
//! ```

pub mod config;
pub mod core;
pub mod derivation;
pub mod error;
pub mod fingerprint;
pub mod geometry;
pub mod invariants;
pub mod production;
pub mod query;
pub mod trace;

pub use crate::config::{EdgeMarkingStrategy, RefinementConfig, SharedEdgePolicy};
pub use crate::core::{Hyperedge, Hypergraph, Label, Node, NodeId, NodeKind, Point};
pub use crate::derivation::{RefinementOutcome, Refiner};
pub use crate::error::GraphError;
pub use crate::fingerprint::{mesh_fingerprint, HashValue};
pub use crate::production::{Applied, Production, ProductionKind};
pub use crate::trace::{DerivationStep, DerivationTrace};

/// Prelude for convenient usage.
pub mod prelude {
    pub use crate::config::{EdgeMarkingStrategy, RefinementConfig, SharedEdgePolicy};
    pub use crate::core::{Hyperedge, Hypergraph, Label, Node, NodeId, NodeKind, Point};
    pub use crate::derivation::{RefinementOutcome, Refiner};
    pub use crate::error::GraphError;
    pub use crate::fingerprint::{mesh_fingerprint, HashValue};
    pub use crate::invariants::{check_well_formed, is_well_formed};
    pub use crate::production::{
        Applied, MarkEdges, MarkElement, Production, ProductionKind, SplitBoundaryEdge,
        SplitElement, SplitSharedEdge, SyncSharedEdge,
    };
    pub use crate::trace::{DerivationStep, DerivationTrace};
}
