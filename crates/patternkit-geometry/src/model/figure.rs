use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{CurveOrigin, CurveType, Point, StyledCurveData};
use crate::measures::FigureMeasures;
use crate::primitives::Segment;

/// Handle symmetry of a node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NodeMode {
    /// Handles stay collinear through the node.
    Smooth,
    /// Handles move independently.
    #[default]
    Corner,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EdgeKind {
    #[default]
    Line,
    Cubic,
}

/// Tool that committed the figure. Informational, used by export filters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DrawingTool {
    Rectangle,
    Circle,
    Line,
    #[default]
    Curve,
    Dart,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FigureNode {
    pub id: String,
    pub x: f64,
    pub y: f64,
    #[serde(default)]
    pub mode: NodeMode,
    /// Offset of the incoming control point, relative to the node.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub in_handle: Option<Point>,
    /// Offset of the outgoing control point, relative to the node.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub out_handle: Option<Point>,
}

impl FigureNode {
    pub fn new(id: impl Into<String>, x: f64, y: f64) -> Self {
        Self {
            id: id.into(),
            x,
            y,
            mode: NodeMode::Corner,
            in_handle: None,
            out_handle: None,
        }
    }

    pub fn with_handles(mut self, in_handle: Option<Point>, out_handle: Option<Point>) -> Self {
        self.in_handle = in_handle;
        self.out_handle = out_handle;
        self
    }

    pub fn with_mode(mut self, mode: NodeMode) -> Self {
        self.mode = mode;
        self
    }

    pub fn position(&self) -> Point {
        Point::new(self.x, self.y)
    }

    pub fn set_position(&mut self, p: Point) {
        self.x = p.x;
        self.y = p.y;
    }

    /// Absolute incoming control point (the node itself when there is no handle).
    pub fn in_control(&self) -> Point {
        self.position() + self.in_handle.unwrap_or(Point::ZERO)
    }

    /// Absolute outgoing control point (the node itself when there is no handle).
    pub fn out_control(&self) -> Point {
        self.position() + self.out_handle.unwrap_or(Point::ZERO)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FigureEdge {
    pub id: String,
    pub from: String,
    pub to: String,
    #[serde(default)]
    pub kind: EdgeKind,
}

impl FigureEdge {
    pub fn new(
        id: impl Into<String>,
        from: impl Into<String>,
        to: impl Into<String>,
        kind: EdgeKind,
    ) -> Self {
        Self {
            id: id.into(),
            from: from.into(),
            to: to.into(),
            kind,
        }
    }

    pub fn line(id: impl Into<String>, from: impl Into<String>, to: impl Into<String>) -> Self {
        Self::new(id, from, to, EdgeKind::Line)
    }

    pub fn cubic(id: impl Into<String>, from: impl Into<String>, to: impl Into<String>) -> Self {
        Self::new(id, from, to, EdgeKind::Cubic)
    }
}

/// Placement of the figure's local frame on the page.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct FigureTransform {
    pub x: f64,
    pub y: f64,
    /// Rotation in degrees about the local origin.
    #[serde(default)]
    pub rotation: f64,
}

impl FigureTransform {
    /// Maps a local point to page coordinates.
    pub fn apply(&self, p: Point) -> Point {
        p.rotated(self.rotation.to_radians()) + Point::new(self.x, self.y)
    }

    /// Maps a page point back into the local frame.
    pub fn invert(&self, p: Point) -> Point {
        (p - Point::new(self.x, self.y)).rotated(-self.rotation.to_radians())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FigureStyle {
    pub stroke: String,
    pub width: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fill: Option<String>,
    pub opacity: f64,
    #[serde(default)]
    pub dash: Vec<f64>,
}

impl Default for FigureStyle {
    fn default() -> Self {
        Self {
            stroke: "#1f2933".to_string(),
            width: 1.5,
            fill: None,
            opacity: 1.0,
            dash: Vec::new(),
        }
    }
}

/// How a figure was derived from another one.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind")]
pub enum Derivation {
    #[serde(rename = "seam", rename_all = "camelCase")]
    Seam {
        parent_id: String,
        offset_cm: f64,
        /// Content signature of the parent at derivation time.
        source_signature: String,
    },
}

/// Baseline geometry kept for "revert to custom".
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FigureSnapshot {
    pub nodes: Vec<FigureNode>,
    pub edges: Vec<FigureEdge>,
    pub closed: bool,
}

/// One drawn pattern piece.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Figure {
    pub id: String,
    #[serde(default)]
    pub tool: DrawingTool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub derivation: Option<Derivation>,
    #[serde(default)]
    pub transform: FigureTransform,
    #[serde(default)]
    pub style: FigureStyle,
    #[serde(default)]
    pub nodes: Vec<FigureNode>,
    #[serde(default)]
    pub edges: Vec<FigureEdge>,
    #[serde(default)]
    pub closed: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub curve_type: Option<CurveType>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub styled_data: Option<StyledCurveData>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub derived_from: Option<CurveOrigin>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub custom_snapshot: Option<FigureSnapshot>,
    #[serde(default)]
    pub custom_snapshot_dirty: bool,
    /// Cached measurements. Never read by the engines.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub measures: Option<FigureMeasures>,
}

/// Fresh random id for a tool commit.
pub fn new_figure_id() -> String {
    Uuid::new_v4().to_string()
}

impl Figure {
    pub fn new(id: impl Into<String>, tool: DrawingTool) -> Self {
        Self {
            id: id.into(),
            tool,
            derivation: None,
            transform: FigureTransform::default(),
            style: FigureStyle::default(),
            nodes: Vec::new(),
            edges: Vec::new(),
            closed: false,
            curve_type: None,
            styled_data: None,
            derived_from: None,
            custom_snapshot: None,
            custom_snapshot_dirty: false,
            measures: None,
        }
    }

    /// Stable id for a figure derived from `parent_id` by `operation`.
    ///
    /// Recomputing the same derivation yields the same id, so the host can
    /// replace the previous value in place.
    pub fn derived_id(parent_id: &str, operation: &str) -> String {
        let name = format!("{}:{}", parent_id, operation);
        Uuid::new_v5(&Uuid::NAMESPACE_OID, name.as_bytes()).to_string()
    }

    pub fn is_seam(&self) -> bool {
        matches!(self.derivation, Some(Derivation::Seam { .. }))
    }

    /// Parent id of a seam figure.
    pub fn parent_id(&self) -> Option<&str> {
        match &self.derivation {
            Some(Derivation::Seam { parent_id, .. }) => Some(parent_id.as_str()),
            None => None,
        }
    }

    /// Linear lookup; use [`Figure::node_index`] for repeated lookups.
    pub fn node(&self, id: &str) -> Option<&FigureNode> {
        self.nodes.iter().find(|n| n.id == id)
    }

    pub fn node_mut(&mut self, id: &str) -> Option<&mut FigureNode> {
        self.nodes.iter_mut().find(|n| n.id == id)
    }

    pub fn edge(&self, id: &str) -> Option<&FigureEdge> {
        self.edges.iter().find(|e| e.id == id)
    }

    /// Geometry of every edge whose endpoints resolve, in edge-list order.
    pub fn segments(&self) -> Vec<(&FigureEdge, Segment)> {
        let index = self.node_index();
        self.edges
            .iter()
            .filter_map(|edge| index.segment(edge).map(|seg| (edge, seg)))
            .collect()
    }

    pub fn to_world(&self, p: Point) -> Point {
        self.transform.apply(p)
    }

    pub fn snapshot(&self) -> FigureSnapshot {
        FigureSnapshot {
            nodes: self.nodes.clone(),
            edges: self.edges.clone(),
            closed: self.closed,
        }
    }

    pub fn matches_snapshot(&self, snapshot: &FigureSnapshot) -> bool {
        self.closed == snapshot.closed && self.nodes == snapshot.nodes && self.edges == snapshot.edges
    }

    /// Returns the figure with its cached `measures` block recomputed.
    pub fn with_measures(mut self) -> Self {
        self.measures = Some(crate::measures::compute_measures(&self));
        self
    }

    /// Returns the figure with all caches that depend on geometry dropped.
    pub(crate) fn without_caches(mut self) -> Self {
        self.measures = None;
        self
    }
}
