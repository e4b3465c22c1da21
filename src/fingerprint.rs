//! Structural fingerprints of meshes.
//!
//! A fingerprint is a domain-separated SHA-256 over a canonical encoding of
//! the mesh. Node ids never enter the encoding: points are described by
//! their coordinates and hyperedges by the coordinates they span, so two
//! derivations that build the same mesh under different ids compare equal.
//!
//! # Citations
//! - SHA-256: NIST FIPS 180-4 (2015)
//! - Domain separation & length prefixing: Bernstein et al., "How to hash into elliptic curves" (2009)

use crate::core::{Hyperedge, Hypergraph, Label};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::fmt;

/// A 256-bit hash value.
#[repr(transparent)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct HashValue(pub [u8; 32]);

impl HashValue {
    /// Creates a zero hash (all zeros).
    #[inline]
    pub fn zero() -> Self {
        Self([0u8; 32])
    }

    /// Returns the raw byte array.
    #[inline]
    pub const fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    /// Computes SHA-256 of `data` under a domain tag.
    ///
    /// The hashed message is `b"HGR:<domain>:v1" || len(data) as u64 LE || data`.
    pub fn hash_with_domain(domain: &[u8], data: &[u8]) -> Self {
        let mut hasher = Sha256::new();
        hasher.update(b"HGR:");
        hasher.update(domain);
        hasher.update(b":v1");
        hasher.update((data.len() as u64).to_le_bytes());
        hasher.update(data);
        Self(hasher.finalize().into())
    }
}

impl fmt::Display for HashValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "HashValue({:02x}{:02x}{:02x}{:02x}…)",
            self.0[0], self.0[1], self.0[2], self.0[3]
        )
    }
}

/// Coordinate bits with `-0.0` folded into `0.0`.
fn coordinate_key(x: f64, y: f64) -> (u64, u64) {
    ((x + 0.0).to_bits(), (y + 0.0).to_bits())
}

fn label_tag(label: Label) -> u8 {
    match label {
        Label::Edge => 0,
        Label::Quad => 1,
        Label::Pentagon => 2,
        Label::Hexagon => 3,
        Label::Heptagon => 4,
    }
}

fn hyperedge_record(graph: &Hypergraph, h: &Hyperedge) -> Vec<u8> {
    let mut spanned: Vec<(u64, u64)> = graph
        .incident(h.id)
        .filter_map(|p| graph.point(p).ok())
        .map(|p| coordinate_key(p.x, p.y))
        .collect();
    spanned.sort_unstable();

    let mut record = Vec::with_capacity(11 + spanned.len() * 16);
    record.push(label_tag(h.label));
    record.push(u8::from(h.refine));
    record.push(u8::from(h.boundary));
    record.extend_from_slice(&(spanned.len() as u64).to_le_bytes());
    for (x, y) in spanned {
        record.extend_from_slice(&x.to_le_bytes());
        record.extend_from_slice(&y.to_le_bytes());
    }
    record
}

/// Id-independent fingerprint of a whole mesh.
///
/// Hashes the sorted multiset of points `(x, y, hanging)` followed by the
/// sorted multiset of hyperedges `(label, R, B, spanned coordinates)`.
/// Parallel duplicates are counted, so a mesh with two identical `Edge`s
/// differs from one with a single `Edge`.
pub fn mesh_fingerprint(graph: &Hypergraph) -> HashValue {
    let mut points: Vec<(u64, u64, bool)> = graph
        .points()
        .map(|p| {
            let (x, y) = coordinate_key(p.x, p.y);
            (x, y, p.hanging)
        })
        .collect();
    points.sort_unstable();

    let mut hyperedges: Vec<Vec<u8>> = graph
        .hyperedges()
        .map(|h| hyperedge_record(graph, h))
        .collect();
    hyperedges.sort_unstable();

    let mut data = Vec::new();
    data.extend_from_slice(&(points.len() as u64).to_le_bytes());
    for (x, y, hanging) in points {
        data.extend_from_slice(&x.to_le_bytes());
        data.extend_from_slice(&y.to_le_bytes());
        data.push(u8::from(hanging));
    }
    data.extend_from_slice(&(hyperedges.len() as u64).to_le_bytes());
    for record in hyperedges {
        data.extend_from_slice(&(record.len() as u64).to_le_bytes());
        data.extend_from_slice(&record);
    }

    HashValue::hash_with_domain(b"MESH_FINGERPRINT", &data)
}
