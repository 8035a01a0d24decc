//! Dart-unfold engine
//!
//! Closes a dart by swinging the outline beyond the far leg about the apex
//! until both legs lie on the same ray, then merging them.

use std::collections::HashSet;

use patternkit_core::{InvalidDartSpecError, Result, UnsupportedGeometryError};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::model::{rotate_point, validate, Figure, FigureEdge, FigureNode, Point};
use crate::primitives::EPSILON;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DartSpec {
    pub apex: String,
    pub left_leg: String,
    pub right_leg: String,
}

impl DartSpec {
    pub fn new(apex: impl Into<String>, left_leg: impl Into<String>, right_leg: impl Into<String>) -> Self {
        Self {
            apex: apex.into(),
            left_leg: left_leg.into(),
            right_leg: right_leg.into(),
        }
    }
}

fn not_on_outline(figure: &Figure, node_id: &str) -> InvalidDartSpecError {
    InvalidDartSpecError::NotOnOutline {
        figure_id: figure.id.clone(),
        node_id: node_id.to_string(),
    }
}

/// Wraps an angle into (-π, π].
fn wrap_angle(a: f64) -> f64 {
    let tau = std::f64::consts::TAU;
    let mut a = a % tau;
    if a <= -std::f64::consts::PI {
        a += tau;
    } else if a > std::f64::consts::PI {
        a -= tau;
    }
    a
}

/// Unfolds the dart described by `spec` into a single flat outline.
///
/// Walking the cycle forward from the apex, the first leg met is the near
/// leg and the other the far leg. Nodes from the far leg back to the apex are
/// rotated about the apex onto the near leg's ray, the legs merge at the
/// midpoint of their distances (keeping the near leg's id), and nodes
/// strictly between the legs are removed.
///
/// The legs bound the dart opening as seen from the apex, so a V notch
/// drawn as `leg -> apex -> leg` is not a dart here: merging its legs
/// leaves two nodes and fails with `WouldCollapse { remaining: 2 }`.
pub fn unfold_dart(figure: &Figure, spec: &DartSpec) -> Result<Figure> {
    validate(figure)?;
    if !figure.closed {
        return Err(UnsupportedGeometryError::OpenOutline {
            figure_id: figure.id.clone(),
            operation: "dart unfold".to_string(),
        }
        .into());
    }

    if spec.apex == spec.left_leg || spec.apex == spec.right_leg {
        return Err(InvalidDartSpecError::CoincidentNodes {
            node_id: spec.apex.clone(),
        }
        .into());
    }
    if spec.left_leg == spec.right_leg {
        return Err(InvalidDartSpecError::CoincidentNodes {
            node_id: spec.left_leg.clone(),
        }
        .into());
    }

    let ids = figure.outline_node_ids()?;
    let m = ids.len();
    let position = |id: &str| {
        ids.iter()
            .position(|n| *n == id)
            .ok_or_else(|| not_on_outline(figure, id))
    };
    let pa = position(&spec.apex)?;
    let pl = position(&spec.left_leg)?;
    let pr = position(&spec.right_leg)?;

    let index = figure.node_index();
    let node = |id: &str| index.get(id).ok_or_else(|| not_on_outline(figure, id));
    let apex = node(&spec.apex)?.position();
    for leg in [&spec.left_leg, &spec.right_leg] {
        if node(leg)?.position().distance_to(&apex) <= EPSILON {
            return Err(InvalidDartSpecError::DegenerateLeg {
                node_id: leg.clone(),
            }
            .into());
        }
    }

    let ol = (pl + m - pa) % m;
    let or = (pr + m - pa) % m;
    let (near_off, far_off) = if ol < or { (ol, or) } else { (or, ol) };
    let remaining = m - (far_off - near_off);
    if remaining < 3 {
        return Err(InvalidDartSpecError::WouldCollapse { remaining }.into());
    }

    // cycle order starting at the apex
    let seq: Vec<&str> = (0..m).map(|k| ids[(pa + k) % m]).collect();
    let near_id = seq[near_off];
    let far_id = seq[far_off];
    let near = node(near_id)?;
    let far = node(far_id)?;

    let near_vec = near.position() - apex;
    let far_vec = far.position() - apex;
    let angle = wrap_angle(near_vec.y.atan2(near_vec.x) - far_vec.y.atan2(far_vec.x));
    let angle_deg = angle.to_degrees();

    let rotated: HashSet<&str> = seq[far_off..].iter().copied().collect();
    let removed: HashSet<&str> = seq[near_off + 1..=far_off].iter().copied().collect();

    let rotate_handle = |h: Option<Point>| h.map(|v| v.rotated(angle));
    let far_out = rotate_handle(far.out_handle);
    let merge_at = match near_vec.normalized() {
        Some(dir) => apex + dir * ((near_vec.length() + far_vec.length()) * 0.5),
        None => near.position(),
    };

    let nodes: Vec<FigureNode> = figure
        .nodes
        .iter()
        .filter(|n| !removed.contains(n.id.as_str()))
        .map(|n| {
            let mut n = n.clone();
            if n.id == near_id {
                n.set_position(merge_at);
                n.out_handle = far_out;
            } else if n.id == spec.apex {
                // closing control point of the swung edge into the apex
                n.in_handle = rotate_handle(n.in_handle);
            } else if rotated.contains(n.id.as_str()) {
                n.set_position(rotate_point(n.position(), apex, angle_deg));
                n.in_handle = rotate_handle(n.in_handle);
                n.out_handle = rotate_handle(n.out_handle);
            }
            n
        })
        .collect();

    // edges leaving a removed node disappear, except the far leg's outgoing
    // edge which now leaves the merged node
    let edges: Vec<FigureEdge> = figure
        .edges
        .iter()
        .filter_map(|e| {
            if e.from == far_id {
                let mut e = e.clone();
                e.from = near_id.to_string();
                Some(e)
            } else if e.from == near_id || removed.contains(e.from.as_str()) {
                None
            } else {
                Some(e.clone())
            }
        })
        .collect();

    debug!(
        "Unfolded dart at {} in {}: {} -> {} nodes, rotation {:.2} deg",
        spec.apex,
        figure.id,
        m,
        nodes.len(),
        angle_deg
    );

    let mut out = figure.clone().without_caches();
    out.id = Figure::derived_id(&figure.id, &format!("unfold:{}", spec.apex));
    out.nodes = nodes;
    out.edges = edges;
    out.derivation = None;
    validate(&out)?;
    Ok(out)
}
