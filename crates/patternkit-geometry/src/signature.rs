//! Content signatures used as staleness and cache keys.
//!
//! Signatures are persisted on seam figures, so the byte stream and the
//! hash (64-bit FNV-1a) are fixed and must not change between releases.

use crate::model::{EdgeKind, Figure, NodeMode, Point};

const FNV_OFFSET: u64 = 0xcbf2_9ce4_8422_2325;
const FNV_PRIME: u64 = 0x0000_0100_0000_01b3;

struct Fnv1a(u64);

impl Fnv1a {
    fn new() -> Self {
        Self(FNV_OFFSET)
    }

    fn bytes(&mut self, bytes: &[u8]) {
        for b in bytes {
            self.0 ^= u64::from(*b);
            self.0 = self.0.wrapping_mul(FNV_PRIME);
        }
    }

    fn u8(&mut self, v: u8) {
        self.bytes(&[v]);
    }

    fn count(&mut self, n: usize) {
        self.bytes(&(n as u64).to_le_bytes());
    }

    fn str(&mut self, s: &str) {
        self.count(s.len());
        self.bytes(s.as_bytes());
    }

    fn f64(&mut self, v: f64) {
        // -0.0 and 0.0 describe the same geometry
        self.bytes(&(v + 0.0).to_bits().to_le_bytes());
    }

    fn handle(&mut self, h: &Option<Point>) {
        match h {
            Some(p) => {
                self.u8(1);
                self.f64(p.x);
                self.f64(p.y);
            }
            None => self.u8(0),
        }
    }
}

/// Raw 64-bit hash of the nodes, edges and closed flag.
///
/// Style, transform and classification metadata are not part of the
/// signature: changing them does not make derived geometry stale.
pub fn signature_hash(figure: &Figure) -> u64 {
    let mut h = Fnv1a::new();
    h.count(figure.nodes.len());
    for node in &figure.nodes {
        h.str(&node.id);
        h.f64(node.x);
        h.f64(node.y);
        h.u8(match node.mode {
            NodeMode::Smooth => 0,
            NodeMode::Corner => 1,
        });
        h.handle(&node.in_handle);
        h.handle(&node.out_handle);
    }
    h.count(figure.edges.len());
    for edge in &figure.edges {
        h.str(&edge.id);
        h.str(&edge.from);
        h.str(&edge.to);
        h.u8(match edge.kind {
            EdgeKind::Line => 0,
            EdgeKind::Cubic => 1,
        });
    }
    h.u8(u8::from(figure.closed));
    h.0
}

/// Signature as 16 lowercase hex digits, the form stored on seam figures.
pub fn source_signature(figure: &Figure) -> String {
    format!("{:016x}", signature_hash(figure))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_signature_tracks_geometry_only() {
        let rect = Figure::rectangle("r", 0.0, 0.0, 10.0, 10.0);
        let sig = source_signature(&rect);
        assert_eq!(sig.len(), 16);

        let mut styled = rect.clone();
        styled.style.stroke = "#ff0000".into();
        styled.transform.x = 40.0;
        assert_eq!(source_signature(&styled), sig);

        let mut moved = rect.clone();
        moved.nodes[0].x = 1.0;
        assert_ne!(source_signature(&moved), sig);

        let mut opened = rect;
        opened.closed = false;
        assert_ne!(source_signature(&opened), sig);
    }

    #[test]
    fn test_signature_is_pinned() {
        // stored in saved documents; a change here makes every seam stale
        let rect = Figure::rectangle("r", 0.0, 0.0, 10.0, 10.0);
        assert_eq!(source_signature(&rect), "3f042a8547725608");

        let mut negated = rect.clone();
        negated.nodes[0].x = -0.0;
        assert_eq!(source_signature(&negated), "3f042a8547725608");
    }
}
