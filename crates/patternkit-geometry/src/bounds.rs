//! Axis-aligned bounds of figures.

use serde::{Deserialize, Serialize};

use crate::model::{Figure, Point};

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BoundingBox {
    pub min_x: f64,
    pub min_y: f64,
    pub max_x: f64,
    pub max_y: f64,
}

impl BoundingBox {
    pub fn new(min_x: f64, min_y: f64, max_x: f64, max_y: f64) -> Self {
        Self {
            min_x,
            min_y,
            max_x,
            max_y,
        }
    }

    /// Zero-size box at `p`.
    pub fn at(p: Point) -> Self {
        Self::new(p.x, p.y, p.x, p.y)
    }

    /// Smallest box containing every point, `None` for an empty iterator.
    pub fn from_points(points: impl IntoIterator<Item = Point>) -> Option<Self> {
        let mut iter = points.into_iter();
        let first = iter.next()?;
        Some(iter.fold(Self::at(first), |bb, p| bb.including(p)))
    }

    pub fn including(self, p: Point) -> Self {
        Self::new(
            self.min_x.min(p.x),
            self.min_y.min(p.y),
            self.max_x.max(p.x),
            self.max_y.max(p.y),
        )
    }

    pub fn union(&self, other: &BoundingBox) -> Self {
        Self::new(
            self.min_x.min(other.min_x),
            self.min_y.min(other.min_y),
            self.max_x.max(other.max_x),
            self.max_y.max(other.max_y),
        )
    }

    pub fn width(&self) -> f64 {
        self.max_x - self.min_x
    }

    pub fn height(&self) -> f64 {
        self.max_y - self.min_y
    }

    pub fn center(&self) -> Point {
        Point::new(
            (self.min_x + self.max_x) * 0.5,
            (self.min_y + self.max_y) * 0.5,
        )
    }

    pub fn contains(&self, p: Point) -> bool {
        p.x >= self.min_x && p.x <= self.max_x && p.y >= self.min_y && p.y <= self.max_y
    }

    pub fn corners(&self) -> [Point; 4] {
        [
            Point::new(self.min_x, self.min_y),
            Point::new(self.max_x, self.min_y),
            Point::new(self.max_x, self.max_y),
            Point::new(self.min_x, self.max_y),
        ]
    }
}

fn hull_points(figure: &Figure) -> impl Iterator<Item = Point> + '_ {
    let nodes = figure.nodes.iter().map(|n| n.position());
    let controls = figure
        .segments()
        .into_iter()
        .flat_map(|(_, seg)| seg.control_points());
    nodes.chain(controls)
}

/// Local bounds from node positions plus the control points of cubic edges.
///
/// The control hull encloses the curve, so the box is conservative for
/// cubics. An empty figure yields a zero box at the local origin.
pub fn bounds(figure: &Figure) -> BoundingBox {
    BoundingBox::from_points(hull_points(figure)).unwrap_or_default()
}

/// Bounds in page coordinates. Points are transformed before boxing so a
/// rotated figure still gets a snug box.
pub fn world_bounds(figure: &Figure) -> BoundingBox {
    BoundingBox::from_points(hull_points(figure).map(|p| figure.to_world(p)))
        .unwrap_or_else(|| BoundingBox::at(figure.to_world(Point::ZERO)))
}
