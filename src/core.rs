//! Core data structures for mesh hypergraphs.
//!
//! A mesh is stored as a bipartite incidence structure: points on one side,
//! labelled hyperedges (mesh elements and their sides) on the other. Every
//! higher-level relation is derived from the incidence sets kept here.
//!
//! # Citations
//! - Hypergraph theory: Berge, "Graphs and Hypergraphs" (1973)
//! - Hyperedge replacement: Habel, "Hyperedge Replacement: Grammars and Languages" (1992)
//! - Mesh hypergraphs: Ślusarczyk & Paszyński, "Hypergraph grammars in hp-adaptive finite element method" (2013)

use crate::error::GraphError;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

/// Unique identifier for a point or hyperedge.
///
/// Ids are opaque and stable for the lifetime of the node. Callers may pick
/// them when building a graph; rewrites allocate fresh ones above every id
/// the graph has seen.
#[repr(transparent)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NodeId(u64);

impl NodeId {
    /// Creates a new `NodeId` from a raw `u64`.
    #[inline]
    pub const fn new(raw: u64) -> Self {
        Self(raw)
    }

    /// Returns the raw `u64` representation.
    #[inline]
    pub const fn as_u64(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "NodeId({})", self.0)
    }
}

/// Shape label of a hyperedge.
///
/// `Edge` represents one side of the mesh; the other labels are mesh
/// elements whose arity is fixed by the label.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Label {
    Edge,
    Quad,
    Pentagon,
    Hexagon,
    Heptagon,
}

impl Label {
    /// All element labels, in increasing arity.
    pub const ELEMENTS: [Label; 4] = [
        Label::Quad,
        Label::Pentagon,
        Label::Hexagon,
        Label::Heptagon,
    ];

    /// Number of points a hyperedge with this label spans.
    #[inline]
    pub const fn arity(self) -> usize {
        match self {
            Label::Edge => 2,
            Label::Quad => 4,
            Label::Pentagon => 5,
            Label::Hexagon => 6,
            Label::Heptagon => 7,
        }
    }

    /// Inverse of [`Label::arity`].
    pub const fn from_arity(arity: usize) -> Option<Label> {
        match arity {
            2 => Some(Label::Edge),
            4 => Some(Label::Quad),
            5 => Some(Label::Pentagon),
            6 => Some(Label::Hexagon),
            7 => Some(Label::Heptagon),
            _ => None,
        }
    }

    /// Returns `true` for mesh elements (everything except `Edge`).
    #[inline]
    pub const fn is_element(self) -> bool {
        !matches!(self, Label::Edge)
    }
}

impl fmt::Display for Label {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Label::Edge => "Edge",
            Label::Quad => "Quad",
            Label::Pentagon => "Pentagon",
            Label::Hexagon => "Hexagon",
            Label::Heptagon => "Heptagon",
        };
        f.write_str(name)
    }
}

/// Discriminant of [`Node`], used in error reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum NodeKind {
    Point,
    Hyperedge,
}

impl fmt::Display for NodeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NodeKind::Point => f.write_str("point"),
            NodeKind::Hyperedge => f.write_str("hyperedge"),
        }
    }
}

/// A 2-D mesh point.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Point {
    /// Unique identifier.
    pub id: NodeId,
    pub x: f64,
    pub y: f64,
    /// Set when the point was created as the midpoint of a shared side.
    /// Informational only; no production matches on it.
    pub hanging: bool,
}

impl Point {
    /// Returns the coordinates as a tuple.
    #[inline]
    pub fn position(&self) -> (f64, f64) {
        (self.x, self.y)
    }
}

/// A labelled hyperedge: a mesh element or one of its sides.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Hyperedge {
    /// Unique identifier.
    pub id: NodeId,
    /// Shape label; fixes the arity.
    pub label: Label,
    /// Marked for the current refinement step (R).
    pub refine: bool,
    /// Lies on the mesh boundary (B). Only meaningful for `Edge`.
    pub boundary: bool,
}

impl Hyperedge {
    /// Returns `true` if this hyperedge is labelled `Edge`.
    #[inline]
    pub fn is_edge(&self) -> bool {
        self.label == Label::Edge
    }
}

/// A node of the incidence structure.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Node {
    Point(Point),
    Hyperedge(Hyperedge),
}

impl Node {
    /// Returns the node's id.
    pub fn id(&self) -> NodeId {
        match self {
            Node::Point(p) => p.id,
            Node::Hyperedge(h) => h.id,
        }
    }

    /// Returns which side of the incidence structure this node lives on.
    pub fn kind(&self) -> NodeKind {
        match self {
            Node::Point(_) => NodeKind::Point,
            Node::Hyperedge(_) => NodeKind::Hyperedge,
        }
    }

    pub fn as_point(&self) -> Option<&Point> {
        match self {
            Node::Point(p) => Some(p),
            Node::Hyperedge(_) => None,
        }
    }

    pub fn as_hyperedge(&self) -> Option<&Hyperedge> {
        match self {
            Node::Point(_) => None,
            Node::Hyperedge(h) => Some(h),
        }
    }
}

/// The mesh hypergraph.
///
/// Owns every point, every hyperedge and the incidence relation between
/// them. Productions receive it by exclusive reference and mutate it in
/// place.
///
/// # Invariants
/// - Node ids are unique.
/// - Incidences only ever join a hyperedge to a point, and both endpoints exist.
/// - The incidence relation is stored in both directions and the two agree.
/// - Fresh ids never collide with a live node. They are taken above every id
///   seen so far until the top of the id space is in use, then from the
///   lowest free id.
///
/// Nodes and incidence sets are kept in ordered maps so every traversal
/// visits ids in ascending order.
#[derive(Debug, Clone, Default)]
pub struct Hypergraph {
    nodes: BTreeMap<NodeId, Node>,
    incidence: BTreeMap<NodeId, BTreeSet<NodeId>>,
    next_id: u64,
}

impl Hypergraph {
    /// Creates an empty hypergraph.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a point with a caller-chosen id.
    pub fn add_point(&mut self, id: NodeId, x: f64, y: f64) -> Result<(), GraphError> {
        self.insert_node(Node::Point(Point {
            id,
            x,
            y,
            hanging: false,
        }))
    }

    /// Adds a hyperedge with a caller-chosen id.
    pub fn add_hyperedge(
        &mut self,
        id: NodeId,
        label: Label,
        refine: bool,
        boundary: bool,
    ) -> Result<(), GraphError> {
        self.insert_node(Node::Hyperedge(Hyperedge {
            id,
            label,
            refine,
            boundary,
        }))
    }

    /// Adds a point under a freshly allocated id.
    pub fn insert_point(&mut self, x: f64, y: f64, hanging: bool) -> Result<NodeId, GraphError> {
        let id = self.fresh_id()?;
        self.nodes.insert(id, Node::Point(Point { id, x, y, hanging }));
        Ok(id)
    }

    /// Adds a hyperedge under a freshly allocated id.
    pub fn insert_hyperedge(
        &mut self,
        label: Label,
        refine: bool,
        boundary: bool,
    ) -> Result<NodeId, GraphError> {
        let id = self.fresh_id()?;
        self.nodes.insert(
            id,
            Node::Hyperedge(Hyperedge {
                id,
                label,
                refine,
                boundary,
            }),
        );
        Ok(id)
    }

    /// Records that `hyperedge` spans `point`. Linking twice is a no-op.
    pub fn link(&mut self, hyperedge: NodeId, point: NodeId) -> Result<(), GraphError> {
        self.hyperedge(hyperedge)?;
        self.point(point)?;
        self.incidence.entry(hyperedge).or_default().insert(point);
        self.incidence.entry(point).or_default().insert(hyperedge);
        Ok(())
    }

    /// Removes a node and every incidence touching it, returning the node.
    ///
    /// Nothing else is removed: dropping a point leaves its hyperedges in
    /// place with one point fewer, and vice versa.
    pub fn remove(&mut self, id: NodeId) -> Result<Node, GraphError> {
        let node = self.nodes.remove(&id).ok_or(GraphError::NodeNotFound(id))?;
        if let Some(incident) = self.incidence.remove(&id) {
            for other in incident {
                if let Some(set) = self.incidence.get_mut(&other) {
                    set.remove(&id);
                }
            }
        }
        Ok(node)
    }

    /// Sets the refine flag (R) of a hyperedge.
    pub fn set_refine(&mut self, id: NodeId, refine: bool) -> Result<(), GraphError> {
        self.hyperedge_mut(id)?.refine = refine;
        Ok(())
    }

    /// Sets the boundary flag (B) of a hyperedge.
    pub fn set_boundary(&mut self, id: NodeId, boundary: bool) -> Result<(), GraphError> {
        self.hyperedge_mut(id)?.boundary = boundary;
        Ok(())
    }

    /// Moves a point.
    pub fn set_point_position(&mut self, id: NodeId, x: f64, y: f64) -> Result<(), GraphError> {
        let point = self.point_mut(id)?;
        point.x = x;
        point.y = y;
        Ok(())
    }

    /// Looks up a node by id.
    pub fn node(&self, id: NodeId) -> Result<&Node, GraphError> {
        self.nodes.get(&id).ok_or(GraphError::NodeNotFound(id))
    }

    /// Looks up a point by id.
    pub fn point(&self, id: NodeId) -> Result<&Point, GraphError> {
        match self.node(id)? {
            Node::Point(p) => Ok(p),
            Node::Hyperedge(_) => Err(GraphError::WrongKind {
                id,
                expected: NodeKind::Point,
            }),
        }
    }

    /// Looks up a hyperedge by id.
    pub fn hyperedge(&self, id: NodeId) -> Result<&Hyperedge, GraphError> {
        match self.node(id)? {
            Node::Hyperedge(h) => Ok(h),
            Node::Point(_) => Err(GraphError::WrongKind {
                id,
                expected: NodeKind::Hyperedge,
            }),
        }
    }

    /// Checks whether a node with the given id exists.
    #[inline]
    pub fn contains(&self, id: NodeId) -> bool {
        self.nodes.contains_key(&id)
    }

    /// Returns an iterator over all nodes in ascending id order.
    pub fn nodes(&self) -> impl Iterator<Item = &Node> {
        self.nodes.values()
    }

    /// Returns an iterator over all points in ascending id order.
    pub fn points(&self) -> impl Iterator<Item = &Point> {
        self.nodes.values().filter_map(Node::as_point)
    }

    /// Returns an iterator over all hyperedges in ascending id order.
    pub fn hyperedges(&self) -> impl Iterator<Item = &Hyperedge> {
        self.nodes.values().filter_map(Node::as_hyperedge)
    }

    /// Returns the hyperedges carrying `label`, in ascending id order.
    pub fn hyperedges_labelled(&self, label: Label) -> impl Iterator<Item = &Hyperedge> {
        self.hyperedges().filter(move |h| h.label == label)
    }

    pub fn point_count(&self) -> usize {
        self.points().count()
    }

    pub fn hyperedge_count(&self) -> usize {
        self.hyperedges().count()
    }

    /// Number of hyperedge–point incidences.
    pub fn incidence_count(&self) -> usize {
        self.hyperedges()
            .map(|h| self.incidence.get(&h.id).map_or(0, BTreeSet::len))
            .sum()
    }

    /// Raw incidence set of a node, empty if it has none.
    pub(crate) fn incident(&self, id: NodeId) -> impl Iterator<Item = NodeId> + '_ {
        self.incidence.get(&id).into_iter().flatten().copied()
    }

    /// Number of nodes incident to `id`.
    pub(crate) fn degree(&self, id: NodeId) -> usize {
        self.incidence.get(&id).map_or(0, BTreeSet::len)
    }

    /// Whether `a` lists `b` among its incident nodes.
    pub(crate) fn is_linked(&self, a: NodeId, b: NodeId) -> bool {
        self.incidence.get(&a).is_some_and(|set| set.contains(&b))
    }

    /// Every stored incidence set, keyed by the node that owns it.
    pub(crate) fn incidence_sets(&self) -> impl Iterator<Item = (NodeId, &BTreeSet<NodeId>)> {
        self.incidence.iter().map(|(id, set)| (*id, set))
    }

    /// Drops `b` from `a`'s incidence set only, leaving the reverse entry.
    #[cfg(test)]
    pub(crate) fn unlink_one_way(&mut self, a: NodeId, b: NodeId) {
        if let Some(set) = self.incidence.get_mut(&a) {
            set.remove(&b);
        }
    }

    fn insert_node(&mut self, node: Node) -> Result<(), GraphError> {
        let id = node.id();
        if self.nodes.contains_key(&id) {
            return Err(GraphError::DuplicateNode(id));
        }
        self.next_id = self.next_id.max(id.as_u64().saturating_add(1));
        self.nodes.insert(id, node);
        Ok(())
    }

    fn fresh_id(&mut self) -> Result<NodeId, GraphError> {
        let mut raw = self.next_id;
        while self.nodes.contains_key(&NodeId::new(raw)) {
            match raw.checked_add(1) {
                Some(next) => raw = next,
                None => return self.lowest_free_id(),
            }
        }
        self.next_id = raw.saturating_add(1);
        Ok(NodeId::new(raw))
    }

    /// Smallest id not in use. Only reached once `u64::MAX` is taken.
    fn lowest_free_id(&self) -> Result<NodeId, GraphError> {
        let mut expected = 0u64;
        for id in self.nodes.keys() {
            if id.as_u64() != expected {
                break;
            }
            expected = expected.checked_add(1).ok_or(GraphError::IdSpaceExhausted)?;
        }
        Ok(NodeId::new(expected))
    }

    fn point_mut(&mut self, id: NodeId) -> Result<&mut Point, GraphError> {
        match self.nodes.get_mut(&id) {
            Some(Node::Point(p)) => Ok(p),
            Some(Node::Hyperedge(_)) => Err(GraphError::WrongKind {
                id,
                expected: NodeKind::Point,
            }),
            None => Err(GraphError::NodeNotFound(id)),
        }
    }

    fn hyperedge_mut(&mut self, id: NodeId) -> Result<&mut Hyperedge, GraphError> {
        match self.nodes.get_mut(&id) {
            Some(Node::Hyperedge(h)) => Ok(h),
            Some(Node::Point(_)) => Err(GraphError::WrongKind {
                id,
                expected: NodeKind::Hyperedge,
            }),
            None => Err(GraphError::NodeNotFound(id)),
        }
    }
}
