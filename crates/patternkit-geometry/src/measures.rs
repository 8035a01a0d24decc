//! Measurement engine
//!
//! Lengths, angles and shape-specific metrics of a figure, in local canvas
//! pixels. Measuring never fails: degenerate input yields zero or omitted
//! fields.

use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

use crate::model::{EdgeKind, Figure, FigureEdge, Point};
use crate::primitives::{cubic_curvature, Segment, Tolerances, EPSILON};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EdgeMeasure {
    pub edge_id: String,
    pub length_px: f64,
    /// Direction of a line edge relative to the local x-axis, in (-180, 180].
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub angle_deg: Option<f64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CircleMeasures {
    pub rx_px: f64,
    pub ry_px: f64,
    pub width_px: f64,
    pub height_px: f64,
    pub circumference_px: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub radius_px: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub diameter_px: Option<f64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RectangleMeasures {
    pub width_px: f64,
    pub height_px: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CurveMeasures {
    pub length_px: f64,
    /// Tangent direction at the arc-length midpoint.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tangent_angle_deg: Option<f64>,
    /// Osculating circle radius at the arc-length midpoint.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub curvature_radius_px: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FigureMeasures {
    pub figure_length_px: f64,
    #[serde(default)]
    pub per_edge: Vec<EdgeMeasure>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub circle: Option<CircleMeasures>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rectangle: Option<RectangleMeasures>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub curve: Option<CurveMeasures>,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MeasureOptions {
    #[serde(skip)]
    pub tolerances: Tolerances,
    /// Allowed deviation of sampled points from the bounding ellipse,
    /// in normalised radius units.
    pub circle_tolerance: f64,
    /// rx and ry closer than this fraction are reported as a circle.
    pub round_tolerance: f64,
    pub right_angle_tolerance_deg: f64,
    pub circle_samples_per_edge: u32,
}

impl Default for MeasureOptions {
    fn default() -> Self {
        Self {
            tolerances: Tolerances::default(),
            circle_tolerance: 0.01,
            round_tolerance: 0.005,
            right_angle_tolerance_deg: 1.0,
            circle_samples_per_edge: 8,
        }
    }
}

pub fn compute_measures(figure: &Figure) -> FigureMeasures {
    compute_measures_with(figure, &MeasureOptions::default())
}

pub fn compute_measures_with(figure: &Figure, options: &MeasureOptions) -> FigureMeasures {
    if figure.nodes.len() < 2 {
        trace!("Figure {} has fewer than 2 nodes, nothing to measure", figure.id);
        return FigureMeasures::default();
    }

    let tol = &options.tolerances;
    let index = figure.node_index();
    let mut resolved: Vec<(&FigureEdge, Segment)> = Vec::with_capacity(figure.edges.len());
    let mut per_edge = Vec::with_capacity(figure.edges.len());
    let mut total = 0.0;

    for edge in &figure.edges {
        let Some(seg) = index.segment(edge) else {
            debug!("Skipping dangling edge {} in figure {}", edge.id, figure.id);
            continue;
        };
        let length_px = seg.length(tol);
        let angle_deg = match (edge.kind, length_px > EPSILON) {
            (EdgeKind::Line, true) => Some(direction_deg(seg.end() - seg.start())),
            _ => None,
        };
        total += length_px;
        per_edge.push(EdgeMeasure {
            edge_id: edge.id.clone(),
            length_px,
            angle_deg,
        });
        resolved.push((edge, seg));
    }

    let mut measures = FigureMeasures {
        figure_length_px: total,
        per_edge,
        ..FigureMeasures::default()
    };
    if total <= EPSILON {
        debug!("Figure {} has zero length", figure.id);
        return measures;
    }

    measures.circle = detect_circle(figure, &resolved, options);
    if measures.circle.is_none() {
        measures.rectangle = detect_rectangle(figure, options);
        if resolved.len() == 1 || !figure.closed {
            measures.curve = Some(curve_measures(figure, &resolved, total, tol));
        }
    }
    measures
}

fn direction_deg(v: Point) -> f64 {
    v.y.atan2(v.x).to_degrees()
}

fn detect_circle(
    figure: &Figure,
    segments: &[(&FigureEdge, Segment)],
    options: &MeasureOptions,
) -> Option<CircleMeasures> {
    if !figure.closed
        || segments.len() < 2
        || segments.len() != figure.edges.len()
        || segments.iter().any(|(e, _)| e.kind != EdgeKind::Cubic)
    {
        return None;
    }

    let (mut min, mut max) = (
        Point::new(f64::INFINITY, f64::INFINITY),
        Point::new(f64::NEG_INFINITY, f64::NEG_INFINITY),
    );
    for (_, seg) in segments {
        let bb = seg.as_bezier()?.bounding_box();
        min = Point::new(min.x.min(bb.min.x), min.y.min(bb.min.y));
        max = Point::new(max.x.max(bb.max.x), max.y.max(bb.max.y));
    }
    let rx = (max.x - min.x) * 0.5;
    let ry = (max.y - min.y) * 0.5;
    if rx <= EPSILON || ry <= EPSILON {
        return None;
    }
    let center = Point::new(min.x + rx, min.y + ry);

    let samples = options.circle_samples_per_edge.max(2);
    for (_, seg) in segments {
        for i in 0..samples {
            let p = seg.point_at(i as f64 / samples as f64);
            let nx = (p.x - center.x) / rx;
            let ny = (p.y - center.y) / ry;
            if (nx * nx + ny * ny - 1.0).abs() > options.circle_tolerance {
                return None;
            }
        }
    }

    let round = (rx - ry).abs() <= options.round_tolerance * rx.max(ry);
    let circumference_px = if round {
        std::f64::consts::PI * (rx + ry)
    } else {
        // Ramanujan's first approximation
        let (a, b) = (rx, ry);
        std::f64::consts::PI * (3.0 * (a + b) - ((3.0 * a + b) * (a + 3.0 * b)).sqrt())
    };
    let radius = round.then(|| (rx + ry) * 0.5);
    Some(CircleMeasures {
        rx_px: rx,
        ry_px: ry,
        width_px: rx * 2.0,
        height_px: ry * 2.0,
        circumference_px,
        radius_px: radius,
        diameter_px: radius.map(|r| r * 2.0),
    })
}

fn detect_rectangle(figure: &Figure, options: &MeasureOptions) -> Option<RectangleMeasures> {
    if !figure.closed || figure.edges.len() != 4 {
        return None;
    }
    let edges = figure.ordered_edges().ok()?;
    if edges.iter().any(|e| e.kind != EdgeKind::Line) {
        return None;
    }
    let index = figure.node_index();
    let mut vectors = [Point::ZERO; 4];
    for (slot, edge) in vectors.iter_mut().zip(&edges) {
        let seg = index.segment(edge)?;
        *slot = seg.end() - seg.start();
    }
    let max_cos = options.right_angle_tolerance_deg.to_radians().sin();
    for i in 0..4 {
        let a = vectors[i].normalized()?;
        let b = vectors[(i + 1) % 4].normalized()?;
        if a.dot(b).abs() > max_cos {
            return None;
        }
    }

    let len = |v: Point| v.length();
    let alignment = |v: Point| v.normalized().map_or(0.0, |n| n.x.abs());
    let pair_a = (len(vectors[0]) + len(vectors[2])) * 0.5;
    let pair_b = (len(vectors[1]) + len(vectors[3])) * 0.5;
    let align_a = alignment(vectors[0]) + alignment(vectors[2]);
    let align_b = alignment(vectors[1]) + alignment(vectors[3]);
    let (width_px, height_px) = if align_a >= align_b {
        (pair_a, pair_b)
    } else {
        (pair_b, pair_a)
    };
    Some(RectangleMeasures {
        width_px,
        height_px,
    })
}

fn curve_measures(
    figure: &Figure,
    segments: &[(&FigureEdge, Segment)],
    total: f64,
    tol: &Tolerances,
) -> CurveMeasures {
    // walk in outline order when the figure allows it
    let ordered: Vec<Segment> = match figure.ordered_edges() {
        Ok(edges) if edges.len() == segments.len() => {
            let index = figure.node_index();
            edges.iter().filter_map(|e| index.segment(e)).collect()
        }
        _ => segments.iter().map(|(_, s)| *s).collect(),
    };

    let half = total * 0.5;
    let mut covered = 0.0;
    let mut at_mid = None;
    for seg in &ordered {
        let len = seg.length(tol);
        if covered + len >= half && len > EPSILON {
            at_mid = Some((*seg, seg.param_at_length(half - covered, tol)));
            break;
        }
        covered += len;
    }

    let mut measures = CurveMeasures {
        length_px: total,
        tangent_angle_deg: None,
        curvature_radius_px: None,
    };
    if let Some((seg, t)) = at_mid {
        let tangent = seg.tangent_at(t);
        if tangent.length() > EPSILON {
            measures.tangent_angle_deg = Some(direction_deg(tangent));
        }
        measures.curvature_radius_px = seg
            .as_bezier()
            .and_then(|c| cubic_curvature(&c, t))
            .filter(|k| k.abs() > EPSILON)
            .map(|k| 1.0 / k.abs());
    }
    measures
}
