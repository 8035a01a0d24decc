//! Styled curves
//!
//! Each [`TechnicalCurveId`] owns a fixed template in a unit chord frame:
//! `u` runs along the chord from the first node (0) to the last node (1) and
//! `v` is the perpendicular offset on the +90° side, as a ratio of the chord
//! length. Templates are normalised so their largest bulge is 1; `height`
//! then sets the real bulge.
//!
//! Parameters are applied in a fixed order: bias warp, height, flipX, flipY,
//! mapping onto the chord, rotation about the first node.

use patternkit_core::{Result, UnsupportedGeometryError};
use tracing::debug;

use crate::model::{
    validate, CurveOrigin, CurveType, EdgeKind, Figure, FigureEdge, FigureNode, NodeMode, Point,
    StyledCurveData, StyledCurveParams, TechnicalCurveId,
};

/// One template node in the unit chord frame. Handles are relative vectors.
#[derive(Debug, Clone, Copy, PartialEq)]
struct TemplateNode {
    u: f64,
    v: f64,
    in_handle: Point,
    out_handle: Point,
}

const fn tn(u: f64, v: f64, in_handle: (f64, f64), out_handle: (f64, f64)) -> TemplateNode {
    TemplateNode {
        u,
        v,
        in_handle: Point {
            x: in_handle.0,
            y: in_handle.1,
        },
        out_handle: Point {
            x: out_handle.0,
            y: out_handle.1,
        },
    }
}

const FOUR_THIRDS: f64 = 4.0 / 3.0;
const SIXTH: f64 = 1.0 / 6.0;

const SHALLOW_ARC: [TemplateNode; 2] = [
    tn(0.0, 0.0, (0.0, 0.0), (0.3, FOUR_THIRDS)),
    tn(1.0, 0.0, (-0.3, FOUR_THIRDS), (0.0, 0.0)),
];

const DEEP_ARC: [TemplateNode; 3] = [
    tn(0.0, 0.0, (0.0, 0.0), (0.0, 0.55)),
    tn(0.5, 1.0, (-0.28, 0.0), (0.28, 0.0)),
    tn(1.0, 0.0, (0.0, 0.55), (0.0, 0.0)),
];

const S_CURVE: [TemplateNode; 3] = [
    tn(0.0, 0.0, (0.0, 0.0), (SIXTH, FOUR_THIRDS)),
    tn(0.5, 0.0, (-SIXTH, FOUR_THIRDS), (SIXTH, -FOUR_THIRDS)),
    tn(1.0, 0.0, (-SIXTH, -FOUR_THIRDS), (0.0, 0.0)),
];

const J_CURVE: [TemplateNode; 3] = [
    tn(0.0, 0.0, (0.0, 0.0), (0.3, 0.6)),
    tn(0.62, 1.0, (-0.22, 0.0), (0.16, 0.0)),
    tn(1.0, 0.0, (0.0, 0.45), (0.0, 0.0)),
];

const OGEE: [TemplateNode; 3] = [
    tn(0.0, 0.0, (0.0, 0.0), (0.65 / 3.0, FOUR_THIRDS)),
    tn(0.65, 0.0, (-0.65 / 3.0, FOUR_THIRDS), (0.13, -0.8)),
    tn(1.0, 0.0, (-0.35 / 3.0, -0.8), (0.0, 0.0)),
];

fn template(id: TechnicalCurveId) -> &'static [TemplateNode] {
    match id {
        TechnicalCurveId::ShallowArc => &SHALLOW_ARC,
        TechnicalCurveId::DeepArc => &DEEP_ARC,
        TechnicalCurveId::SCurve => &S_CURVE,
        TechnicalCurveId::JCurve => &J_CURVE,
        TechnicalCurveId::Ogee => &OGEE,
    }
}

/// A named design intent with its default technical shape.
#[derive(Debug, Clone, PartialEq)]
pub struct SemanticPreset {
    pub id: &'static str,
    pub label: &'static str,
    pub technical_id: TechnicalCurveId,
    pub params: StyledCurveParams,
}

impl SemanticPreset {
    pub fn styled_data(&self) -> StyledCurveData {
        StyledCurveData {
            semantic_id: self.id.to_string(),
            technical_id: self.technical_id,
            params: self.params,
        }
    }
}

const fn params(height: f64, bias: f64) -> StyledCurveParams {
    StyledCurveParams {
        height,
        bias,
        flip_x: false,
        flip_y: false,
        rotation_deg: 0.0,
    }
}

const PRESETS: [SemanticPreset; 8] = [
    SemanticPreset {
        id: "armhole-classic-front",
        label: "Armhole - classic front",
        technical_id: TechnicalCurveId::JCurve,
        params: params(0.22, 0.15),
    },
    SemanticPreset {
        id: "armhole-classic-back",
        label: "Armhole - classic back",
        technical_id: TechnicalCurveId::JCurve,
        params: params(0.16, 0.1),
    },
    SemanticPreset {
        id: "neckline-front",
        label: "Neckline - front",
        technical_id: TechnicalCurveId::DeepArc,
        params: params(0.35, 0.0),
    },
    SemanticPreset {
        id: "neckline-back",
        label: "Neckline - back",
        technical_id: TechnicalCurveId::ShallowArc,
        params: params(0.08, 0.0),
    },
    SemanticPreset {
        id: "sleeve-cap",
        label: "Sleeve cap",
        technical_id: TechnicalCurveId::DeepArc,
        params: params(0.4, -0.1),
    },
    SemanticPreset {
        id: "hip-line",
        label: "Hip line",
        technical_id: TechnicalCurveId::Ogee,
        params: params(0.06, 0.0),
    },
    SemanticPreset {
        id: "crotch-front",
        label: "Crotch - front",
        technical_id: TechnicalCurveId::JCurve,
        params: params(0.3, 0.25),
    },
    SemanticPreset {
        id: "hem-curve",
        label: "Hem curve",
        technical_id: TechnicalCurveId::ShallowArc,
        params: params(0.04, 0.0),
    },
];

/// Catalog of design intents offered by the curve tool.
pub fn semantic_presets() -> &'static [SemanticPreset] {
    &PRESETS
}

pub fn semantic_preset(id: &str) -> Option<&'static SemanticPreset> {
    PRESETS.iter().find(|p| p.id == id)
}

fn check_params(p: &StyledCurveParams) -> Result<()> {
    let invalid = |name: &str, reason: &str| UnsupportedGeometryError::InvalidParameter {
        name: name.to_string(),
        reason: reason.to_string(),
    };
    if !p.height.is_finite() {
        return Err(invalid("height", "must be finite").into());
    }
    if !(-1.0..=1.0).contains(&p.bias) {
        return Err(invalid("bias", "must lie in [-1, 1]").into());
    }
    if !p.rotation_deg.is_finite() {
        return Err(invalid("rotationDeg", "must be finite").into());
    }
    Ok(())
}

/// Template nodes after bias, height and flips, still in the chord frame.
fn shape(technical_id: TechnicalCurveId, p: &StyledCurveParams) -> Vec<TemplateNode> {
    let mut nodes: Vec<TemplateNode> = template(technical_id)
        .iter()
        .map(|n| {
            let warp = 1.0 + p.bias * (1.0 - 2.0 * n.u);
            TemplateNode {
                u: n.u + p.bias * n.u * (1.0 - n.u),
                v: n.v * p.height,
                in_handle: Point::new(n.in_handle.x * warp, n.in_handle.y * p.height),
                out_handle: Point::new(n.out_handle.x * warp, n.out_handle.y * p.height),
            }
        })
        .collect();

    if p.flip_x {
        nodes.reverse();
        for n in &mut nodes {
            n.u = 1.0 - n.u;
            let flip = |h: Point| Point::new(-h.x, h.y);
            let (inh, outh) = (flip(n.in_handle), flip(n.out_handle));
            n.in_handle = outh;
            n.out_handle = inh;
        }
    }
    if p.flip_y {
        for n in &mut nodes {
            n.v = -n.v;
            n.in_handle.y = -n.in_handle.y;
            n.out_handle.y = -n.out_handle.y;
        }
    }
    nodes
}

/// Composites a technical template onto an open figure.
///
/// The first and last outline nodes keep their ids and positions; every
/// other node and edge is replaced. Fails when the figure is closed, has
/// fewer than two nodes or a zero-length chord.
pub fn apply_styled_curve(figure: &Figure, data: StyledCurveData) -> Result<Figure> {
    validate(figure)?;
    check_params(&data.params)?;
    if figure.closed {
        return Err(UnsupportedGeometryError::Degenerate {
            figure_id: figure.id.clone(),
            reason: "styled curves apply to open figures only".to_string(),
        }
        .into());
    }
    if figure.nodes.len() < 2 {
        return Err(UnsupportedGeometryError::TooFewNodes {
            figure_id: figure.id.clone(),
            operation: "styled curve".to_string(),
            found: figure.nodes.len(),
            required: 2,
        }
        .into());
    }

    let ids = figure.outline_node_ids()?;
    let index = figure.node_index();
    let (first, last) = match (
        ids.first().and_then(|id| index.get(id)),
        ids.last().and_then(|id| index.get(id)),
    ) {
        (Some(a), Some(b)) if ids.len() >= 2 => (a.clone(), b.clone()),
        _ => {
            return Err(UnsupportedGeometryError::Degenerate {
                figure_id: figure.id.clone(),
                reason: "no distinct end nodes".to_string(),
            }
            .into())
        }
    };

    let origin = first.position();
    let chord = last.position() - origin;
    if chord.length() <= crate::primitives::EPSILON {
        return Err(UnsupportedGeometryError::Degenerate {
            figure_id: figure.id.clone(),
            reason: "end nodes coincide".to_string(),
        }
        .into());
    }

    let normal = chord.perp();
    let angle = data.params.rotation_deg.to_radians();
    let place = |u: f64, v: f64| origin + (chord * u + normal * v).rotated(angle);
    let place_vec = |h: Point| (chord * h.x + normal * h.y).rotated(angle);

    let shaped = shape(data.technical_id, &data.params);
    let count = shaped.len();
    let mut nodes = Vec::with_capacity(count);
    for (i, t) in shaped.iter().enumerate() {
        let node = if i == 0 {
            let mut n = first.clone();
            n.set_position(place(t.u, t.v));
            n.in_handle = None;
            n.out_handle = Some(place_vec(t.out_handle));
            n
        } else if i + 1 == count {
            let mut n = last.clone();
            n.set_position(place(t.u, t.v));
            n.in_handle = Some(place_vec(t.in_handle));
            n.out_handle = None;
            n
        } else {
            let p = place(t.u, t.v);
            FigureNode::new(format!("{}-s{}", figure.id, i), p.x, p.y)
                .with_mode(NodeMode::Smooth)
                .with_handles(Some(place_vec(t.in_handle)), Some(place_vec(t.out_handle)))
        };
        nodes.push(node);
    }
    let edges = nodes
        .windows(2)
        .enumerate()
        .map(|(i, pair)| {
            FigureEdge::new(
                format!("{}-e{}", figure.id, i),
                pair[0].id.clone(),
                pair[1].id.clone(),
                EdgeKind::Cubic,
            )
        })
        .collect();

    debug!(
        "Applied {} ({}) to figure {}",
        data.technical_id, data.semantic_id, figure.id
    );

    let mut out = figure.clone().without_caches();
    out.nodes = nodes;
    out.edges = edges;
    out.curve_type = Some(CurveType::Styled);
    out.derived_from = Some(CurveOrigin {
        semantic_id: data.semantic_id.clone(),
        technical_id: data.technical_id,
    });
    out.styled_data = Some(data);
    refresh_custom_dirty(&mut out);
    Ok(out)
}

fn require_styled(figure: &Figure) -> Result<&StyledCurveData> {
    figure.styled_data.as_ref().ok_or_else(|| {
        UnsupportedGeometryError::InvalidParameter {
            name: "styledData".to_string(),
            reason: format!("figure {} is not a styled curve", figure.id),
        }
        .into()
    })
}

/// Regenerates a styled curve with another technical shape, keeping the
/// semantic id and params.
pub fn switch_technical(figure: &Figure, technical_id: TechnicalCurveId) -> Result<Figure> {
    let mut data = require_styled(figure)?.clone();
    data.technical_id = technical_id;
    apply_styled_curve(figure, data)
}

/// Re-applies a styled curve with new params.
pub fn update_params(figure: &Figure, params: StyledCurveParams) -> Result<Figure> {
    let mut data = require_styled(figure)?.clone();
    data.params = params;
    apply_styled_curve(figure, data)
}

/// Turns the figure into a free-form curve and freezes its current geometry
/// as the custom baseline. `derivedFrom` is kept as provenance.
pub fn switch_to_custom(figure: &Figure) -> Figure {
    let mut out = figure.clone();
    out.curve_type = Some(CurveType::Custom);
    out.styled_data = None;
    out.custom_snapshot = Some(figure.snapshot());
    out.custom_snapshot_dirty = false;
    out
}

/// Explicit "capture as custom": the live geometry becomes the baseline.
pub fn capture_custom(figure: &Figure) -> Figure {
    let mut out = figure.clone();
    out.custom_snapshot = Some(figure.snapshot());
    out.custom_snapshot_dirty = false;
    out
}

/// Restores the custom baseline geometry.
pub fn revert_to_custom(figure: &Figure) -> Result<Figure> {
    let snapshot = figure.custom_snapshot.as_ref().ok_or_else(|| {
        UnsupportedGeometryError::InvalidParameter {
            name: "customSnapshot".to_string(),
            reason: format!("figure {} has no custom baseline", figure.id),
        }
    })?;
    let mut out = figure.clone().without_caches();
    out.nodes = snapshot.nodes.clone();
    out.edges = snapshot.edges.clone();
    out.closed = snapshot.closed;
    out.curve_type = Some(CurveType::Custom);
    out.styled_data = None;
    out.custom_snapshot_dirty = false;
    Ok(out)
}

/// Whether the live geometry differs from the custom baseline.
pub fn is_custom_dirty(figure: &Figure) -> bool {
    figure
        .custom_snapshot
        .as_ref()
        .is_some_and(|s| !figure.matches_snapshot(s))
}

/// Raises `customSnapshotDirty` after an edit. Never clears it; only
/// [`capture_custom`] and [`revert_to_custom`] do.
pub fn refresh_custom_dirty(figure: &mut Figure) {
    if is_custom_dirty(figure) {
        figure.custom_snapshot_dirty = true;
    }
}
