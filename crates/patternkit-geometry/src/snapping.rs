//! Snapping engine
//!
//! Ranks the targets near a candidate point. Nodes beat guides, guides beat
//! the nearest point of an edge; within a priority the closer target wins and
//! ties keep insertion order.

use serde::{Deserialize, Serialize};
use tracing::trace;

use crate::model::{Figure, Point};
use crate::primitives::{closest_point_on_segment, Segment, Tolerances, EPSILON};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SnapTargetKind {
    Node,
    Guide,
    Edge,
}

impl SnapTargetKind {
    /// Lower is preferred.
    pub fn priority(self) -> u8 {
        match self {
            SnapTargetKind::Node => 0,
            SnapTargetKind::Guide => 1,
            SnapTargetKind::Edge => 2,
        }
    }
}

/// Guide geometry in page coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum GuideLine {
    Horizontal { y: f64 },
    Vertical { x: f64 },
    Line { point: Point, direction: Point },
}

impl GuideLine {
    /// Foot of the perpendicular from `p`, `None` for a zero direction.
    pub fn project(&self, p: Point) -> Option<Point> {
        match *self {
            GuideLine::Horizontal { y } => Some(Point::new(p.x, y)),
            GuideLine::Vertical { x } => Some(Point::new(x, p.y)),
            GuideLine::Line { point, direction } => {
                let d = direction.normalized()?;
                Some(point + d * (p - point).dot(d))
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Guide {
    pub id: String,
    #[serde(flatten)]
    pub line: GuideLine,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SnapNode {
    pub id: String,
    pub figure_id: String,
    pub point: Point,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SnapSegment {
    pub id: String,
    pub figure_id: String,
    pub segment: Segment,
}

/// User-facing snapping switches.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SnapOptions {
    /// Snap radius in screen pixels.
    pub tolerance_px: f64,
    pub nodes: bool,
    pub guides: bool,
    pub edges: bool,
}

impl Default for SnapOptions {
    fn default() -> Self {
        Self {
            tolerance_px: 8.0,
            nodes: true,
            guides: true,
            edges: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SnapResult {
    pub point: Point,
    pub kind: SnapTargetKind,
    pub target_id: String,
    /// World distance from the candidate.
    pub distance: f64,
}

/// Everything a snap query can land on, in world coordinates.
#[derive(Debug, Clone, PartialEq)]
pub struct SnapContext {
    pub nodes: Vec<SnapNode>,
    pub segments: Vec<SnapSegment>,
    pub guides: Vec<Guide>,
    pub options: SnapOptions,
    pub zoom: f64,
    pub tolerances: Tolerances,
}

impl Default for SnapContext {
    fn default() -> Self {
        Self {
            nodes: Vec::new(),
            segments: Vec::new(),
            guides: Vec::new(),
            options: SnapOptions::default(),
            zoom: 1.0,
            tolerances: Tolerances::default(),
        }
    }
}

impl SnapContext {
    pub fn new(options: SnapOptions, zoom: f64) -> Self {
        Self {
            options,
            zoom,
            ..Self::default()
        }
    }

    /// Collects nodes and edges of `figures` in page coordinates.
    ///
    /// `exclude` names a `(figure_id, node_id)` being dragged: the node and
    /// the edges attached to it are left out so a drag never snaps to itself.
    pub fn from_figures(
        figures: &[Figure],
        exclude: Option<(&str, &str)>,
        options: SnapOptions,
        zoom: f64,
    ) -> Self {
        let mut ctx = Self::new(options, zoom);
        for figure in figures {
            let excluded_node = exclude
                .filter(|(fig, _)| *fig == figure.id)
                .map(|(_, node)| node);
            for node in &figure.nodes {
                if Some(node.id.as_str()) == excluded_node {
                    continue;
                }
                ctx.nodes.push(SnapNode {
                    id: node.id.clone(),
                    figure_id: figure.id.clone(),
                    point: figure.to_world(node.position()),
                });
            }
            for (edge, seg) in figure.segments() {
                if excluded_node.is_some_and(|n| edge.from == n || edge.to == n) {
                    continue;
                }
                ctx.segments.push(SnapSegment {
                    id: edge.id.clone(),
                    figure_id: figure.id.clone(),
                    segment: world_segment(figure, &seg),
                });
            }
        }
        ctx
    }

    pub fn with_guides(mut self, guides: impl IntoIterator<Item = Guide>) -> Self {
        self.guides.extend(guides);
        self
    }

    pub fn with_tolerances(mut self, tolerances: Tolerances) -> Self {
        self.tolerances = tolerances;
        self
    }

    /// Snap radius in world units.
    pub fn world_tolerance(&self) -> Option<f64> {
        if self.zoom.is_finite() && self.zoom > EPSILON {
            Some(self.options.tolerance_px / self.zoom)
        } else {
            None
        }
    }
}

fn world_segment(figure: &Figure, seg: &Segment) -> Segment {
    let w = |p: Point| figure.to_world(p);
    match *seg {
        Segment::Line { from, to } => Segment::Line {
            from: w(from),
            to: w(to),
        },
        Segment::Cubic {
            from,
            ctrl1,
            ctrl2,
            to,
        } => Segment::Cubic {
            from: w(from),
            ctrl1: w(ctrl1),
            ctrl2: w(ctrl2),
            to: w(to),
        },
    }
}

/// All targets within tolerance, best first.
pub fn snap_candidates(candidate: Point, ctx: &SnapContext) -> Vec<SnapResult> {
    let Some(tolerance) = ctx.world_tolerance() else {
        trace!("Invalid zoom {}, snapping disabled", ctx.zoom);
        return Vec::new();
    };
    let mut hits = Vec::new();
    let mut consider = |point: Point, kind: SnapTargetKind, id: &str| {
        let distance = point.distance_to(&candidate);
        if distance <= tolerance {
            hits.push(SnapResult {
                point,
                kind,
                target_id: id.to_string(),
                distance,
            });
        }
    };

    if ctx.options.nodes {
        for node in &ctx.nodes {
            consider(node.point, SnapTargetKind::Node, &node.id);
        }
    }
    if ctx.options.guides {
        for guide in &ctx.guides {
            if let Some(p) = guide.line.project(candidate) {
                consider(p, SnapTargetKind::Guide, &guide.id);
            }
        }
    }
    if ctx.options.edges {
        for seg in &ctx.segments {
            let p = match seg.segment {
                Segment::Line { from, to } => closest_point_on_segment(candidate, from, to).0,
                _ => seg.segment.closest_point(candidate, &ctx.tolerances).0,
            };
            consider(p, SnapTargetKind::Edge, &seg.id);
        }
    }

    // sort_by is stable, so equal keys keep insertion order
    hits.sort_by(|a, b| {
        a.kind
            .priority()
            .cmp(&b.kind.priority())
            .then(a.distance.total_cmp(&b.distance))
    });
    hits
}

/// Best target within tolerance, if any.
pub fn snap(candidate: Point, ctx: &SnapContext) -> Option<SnapResult> {
    snap_candidates(candidate, ctx).into_iter().next()
}
