//! Mirror engine
//!
//! Reflects a figure across an arbitrary axis. Reflection reverses winding,
//! so the edge sequence is reversed and every edge flipped to restore it.

use nalgebra::{Matrix2, Vector2};
use patternkit_core::{Result, UnsupportedGeometryError};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::bounds::bounds;
use crate::model::{validate, CurveType, Figure, FigureEdge, Point};

/// Mirror line through `origin` along `direction`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MirrorAxis {
    pub origin: Point,
    pub direction: Point,
}

impl MirrorAxis {
    pub fn new(origin: Point, direction: Point) -> Self {
        Self { origin, direction }
    }

    /// Vertical line `x = x`; mirrors left and right.
    pub fn vertical(x: f64) -> Self {
        Self::new(Point::new(x, 0.0), Point::new(0.0, 1.0))
    }

    /// Horizontal line `y = y`; mirrors top and bottom.
    pub fn horizontal(y: f64) -> Self {
        Self::new(Point::new(0.0, y), Point::new(1.0, 0.0))
    }

    /// Vertical axis through the centre of the figure's local bounds.
    pub fn vertical_through_center(figure: &Figure) -> Self {
        Self::vertical(bounds(figure).center().x)
    }

    pub fn horizontal_through_center(figure: &Figure) -> Self {
        Self::horizontal(bounds(figure).center().y)
    }

    /// Householder reflection matrix `2·d·dᵀ − I`.
    fn matrix(&self) -> Option<Matrix2<f64>> {
        let d = self.direction.normalized()?;
        let d = Vector2::new(d.x, d.y);
        Some(d * d.transpose() * 2.0 - Matrix2::identity())
    }
}

fn apply(m: &Matrix2<f64>, v: Point) -> Point {
    let r = m * Vector2::new(v.x, v.y);
    Point::new(r.x, r.y)
}

/// Reflects every node and handle of `figure` across `axis`.
///
/// Node and edge ids, edge kinds and node modes are kept. A styled curve
/// comes back as a custom curve and derivation metadata is dropped.
pub fn mirror_figure(figure: &Figure, axis: &MirrorAxis) -> Result<Figure> {
    validate(figure)?;
    let m = axis
        .matrix()
        .ok_or_else(|| UnsupportedGeometryError::InvalidParameter {
            name: "axis".to_string(),
            reason: "direction must be non-zero".to_string(),
        })?;

    let mut out = figure.clone().without_caches();
    out.id = Figure::derived_id(&figure.id, "mirror");
    for node in &mut out.nodes {
        let p = axis.origin + apply(&m, node.position() - axis.origin);
        node.set_position(p);
        let in_handle = node.in_handle.map(|h| apply(&m, h));
        let out_handle = node.out_handle.map(|h| apply(&m, h));
        // edges are flipped below, so incoming becomes outgoing
        node.in_handle = out_handle;
        node.out_handle = in_handle;
    }
    out.edges = figure
        .edges
        .iter()
        .rev()
        .map(|e| FigureEdge::new(e.id.clone(), e.to.clone(), e.from.clone(), e.kind))
        .collect();

    if out.closed {
        // restart the cycle at the original first node
        out.nodes.reverse();
        out.nodes.rotate_right(1);
    } else {
        out.nodes.reverse();
    }

    out.derivation = None;
    if out.curve_type == Some(CurveType::Styled) {
        out.curve_type = Some(CurveType::Custom);
        out.styled_data = None;
    }
    debug!("Mirrored {} into {}", figure.id, out.id);
    Ok(out)
}
