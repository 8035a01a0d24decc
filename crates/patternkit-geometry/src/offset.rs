//! Seam-offset engine
//!
//! Builds a seam-allowance figure around a closed outline.
//!
//! # Algorithm
//!
//! 1. Flatten the outline in cycle order, remembering which source edge every
//!    vertex came from.
//! 2. Offset every vertex along the outward normals of its two segments.
//!    Corners on the opening side get a miter up to `miter_limit`, else a
//!    bevel; closing corners use the intersection of the offset lines.
//! 3. Trim self-intersections between segments a few steps apart.
//! 4. Re-fit each run of vertices that came from one cubic edge to a single
//!    cubic when the fit stays within tolerance; otherwise keep lines.
//!
//! Global self-intersections (far-apart parts of the outline crossing after
//! a large offset) are not detected.

use nalgebra::{Matrix2, Vector2};
use patternkit_core::{MalformedFigureError, Result, UnsupportedGeometryError, DEFAULT_PX_PER_CM};
use serde::{Deserialize, Serialize};
use smallvec::{smallvec, SmallVec};
use tracing::{debug, trace};

use crate::model::{
    validate, Derivation, EdgeKind, Figure, FigureEdge, FigureNode, FigureStyle, NodeMode, Point,
};
use crate::primitives::{
    bezier, closest_point_on_cubic, segment_intersection, signed_area, Segment, Tolerances,
    EPSILON,
};
use crate::signature::source_signature;

/// Intersections this close to a segment end are treated as touching.
const PARAM_EPSILON: f64 = 1e-9;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OffsetOptions {
    pub px_per_cm: f64,
    /// Longest miter allowed, as a multiple of the offset distance.
    pub miter_limit: f64,
    pub flatten_tolerance_px: f64,
    pub refit_curves: bool,
    /// Largest deviation accepted when re-fitting a cubic.
    pub refit_tolerance_px: f64,
    /// Runs shorter than this stay as lines.
    pub min_refit_points: usize,
    /// How many segments ahead loop trimming looks.
    pub trim_window: usize,
    /// Supplied by the engine configuration's shared geometry block.
    #[serde(skip)]
    pub tolerances: Tolerances,
}

impl Default for OffsetOptions {
    fn default() -> Self {
        Self {
            px_per_cm: DEFAULT_PX_PER_CM,
            miter_limit: 4.0,
            flatten_tolerance_px: 0.25,
            refit_curves: true,
            refit_tolerance_px: 0.5,
            min_refit_points: 4,
            trim_window: 16,
            tolerances: Tolerances::default(),
        }
    }
}

impl OffsetOptions {
    fn check(&self) -> Result<()> {
        let invalid = |name: &str, reason: &str| UnsupportedGeometryError::InvalidParameter {
            name: name.to_string(),
            reason: reason.to_string(),
        };
        if !(self.px_per_cm.is_finite() && self.px_per_cm > 0.0) {
            return Err(invalid("pxPerCm", "must be positive").into());
        }
        if !(self.miter_limit >= 1.0) {
            return Err(invalid("miterLimit", "must be at least 1").into());
        }
        if !(self.flatten_tolerance_px.is_finite() && self.flatten_tolerance_px > 0.0) {
            return Err(invalid("flattenTolerancePx", "must be positive").into());
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum VertexKind {
    /// Offset of an outline node, starts its edge.
    Join,
    /// Offset of a flattening point, or a trim intersection.
    Interior,
    /// Bevel point ending the incoming edge.
    BevelIn,
    /// Bevel point starting the outgoing edge.
    BevelOut,
}

#[derive(Debug, Clone, Copy)]
struct OffsetVertex {
    point: Point,
    /// Index of the source edge in cycle order.
    edge: usize,
    kind: VertexKind,
}

/// Flattened source outline.
struct Outline {
    points: Vec<Point>,
    /// `(edge index, starts the edge)` per point.
    tags: Vec<(usize, bool)>,
    segments: Vec<Segment>,
    kinds: Vec<EdgeKind>,
    /// Mode of the node each edge starts from.
    modes: Vec<NodeMode>,
}

fn degenerate(figure: &Figure, reason: impl Into<String>) -> patternkit_core::Error {
    UnsupportedGeometryError::Degenerate {
        figure_id: figure.id.clone(),
        reason: reason.into(),
    }
    .into()
}

fn flatten_outline(parent: &Figure, tolerance_px: f64) -> Result<Outline> {
    let edges = parent.ordered_edges()?;
    let index = parent.node_index();
    let mut outline = Outline {
        points: Vec::new(),
        tags: Vec::new(),
        segments: Vec::with_capacity(edges.len()),
        kinds: Vec::with_capacity(edges.len()),
        modes: Vec::with_capacity(edges.len()),
    };

    for (k, edge) in edges.iter().enumerate() {
        let seg = index
            .segment(edge)
            .ok_or_else(|| MalformedFigureError::MissingNode {
                edge_id: edge.id.clone(),
                node_id: edge.to.clone(),
            })?;
        let pts = seg.flatten(tolerance_px);
        let body = if pts.len() > 1 {
            &pts[..pts.len() - 1]
        } else {
            &pts[..]
        };
        for (i, p) in body.iter().enumerate() {
            let tag = (k, i == 0);
            // zero-length pieces: keep the node-tagged point
            match outline.points.last() {
                Some(last) if last.distance_to(p) <= EPSILON => {
                    if tag.1 {
                        if let Some(t) = outline.tags.last_mut() {
                            *t = tag;
                        }
                    }
                }
                _ => {
                    outline.points.push(*p);
                    outline.tags.push(tag);
                }
            }
        }
        outline.segments.push(seg);
        outline.kinds.push(edge.kind);
        outline
            .modes
            .push(index.get(&edge.from).map(|n| n.mode).unwrap_or_default());
    }

    while outline.points.len() > 1 {
        match (outline.points.first(), outline.points.last()) {
            (Some(first), Some(last)) if first.distance_to(last) <= EPSILON => {
                outline.points.pop();
                outline.tags.pop();
            }
            _ => break,
        }
    }
    Ok(outline)
}

/// Outward unit normal of the direction `d` for an outline with area sign `sign`.
fn outward(d: Point, sign: f64) -> Point {
    Point::new(d.y, -d.x) * sign
}

/// Offset points for one vertex. Two points mean a bevel.
fn join(
    p: Point,
    d0: Point,
    d1: Point,
    sign: f64,
    distance: f64,
    miter_limit: f64,
) -> SmallVec<[Point; 2]> {
    let n0 = outward(d0, sign);
    let n1 = outward(d1, sign);
    let cross = d0.cross(d1);
    let denom = 1.0 + n0.dot(n1);

    if cross.abs() <= 1e-12 && d0.dot(d1) > 0.0 {
        return smallvec![p + n0 * distance];
    }
    let hairpin = denom < 1e-6;
    let opening = cross * sign * distance > 0.0;
    if hairpin || (opening && (2.0 / denom).sqrt() > miter_limit) {
        trace!("Bevel at ({:.3}, {:.3})", p.x, p.y);
        return smallvec![p + n0 * distance, p + n1 * distance];
    }
    smallvec![p + (n0 + n1) * (distance / denom)]
}

fn offset_vertices(outline: &Outline, sign: f64, distance: f64, miter_limit: f64) -> Vec<OffsetVertex> {
    let pts = &outline.points;
    let n = pts.len();
    let mut out = Vec::with_capacity(n + n / 4);
    for i in 0..n {
        let prev = pts[(i + n - 1) % n];
        let cur = pts[i];
        let next = pts[(i + 1) % n];
        let (Some(d0), Some(d1)) = ((cur - prev).normalized(), (next - cur).normalized()) else {
            continue;
        };
        let (edge, at_node) = outline.tags[i];
        let prev_edge = outline.tags[(i + n - 1) % n].0;
        let joined = join(cur, d0, d1, sign, distance, miter_limit);
        match (joined.as_slice(), at_node) {
            ([p], true) => out.push(OffsetVertex {
                point: *p,
                edge,
                kind: VertexKind::Join,
            }),
            ([p], false) => out.push(OffsetVertex {
                point: *p,
                edge,
                kind: VertexKind::Interior,
            }),
            ([a, b], true) => {
                debug!("Bevel fallback at the start of edge {}", edge);
                out.push(OffsetVertex {
                    point: *a,
                    edge: prev_edge,
                    kind: VertexKind::BevelIn,
                });
                out.push(OffsetVertex {
                    point: *b,
                    edge,
                    kind: VertexKind::BevelOut,
                });
            }
            (points, _) => out.extend(points.iter().map(|p| OffsetVertex {
                point: *p,
                edge,
                kind: VertexKind::Interior,
            })),
        }
    }
    out
}

/// Removes consecutive duplicates, keeping the vertex that starts an edge.
fn dedupe(verts: Vec<OffsetVertex>) -> Vec<OffsetVertex> {
    let starts_edge = |v: &OffsetVertex| matches!(v.kind, VertexKind::Join | VertexKind::BevelOut);
    let mut out: Vec<OffsetVertex> = Vec::with_capacity(verts.len());
    for v in verts {
        match out.last_mut() {
            Some(last) if last.point.distance_to(&v.point) <= EPSILON => {
                if starts_edge(&v) {
                    *last = v;
                }
            }
            _ => out.push(v),
        }
    }
    while out.len() > 1 {
        let n = out.len();
        if out[0].point.distance_to(&out[n - 1].point) > EPSILON {
            break;
        }
        let last = out[n - 1];
        if starts_edge(&last) && !starts_edge(&out[0]) {
            out[0] = last;
        }
        out.pop();
    }
    out
}

/// Cuts loops formed by segments at most `window` steps apart.
fn trim_local_loops(mut verts: Vec<OffsetVertex>, window: usize) -> Vec<OffsetVertex> {
    let limit = verts.len() * 4 + 16;
    let mut i = 0;
    let mut steps = 0;
    while i < verts.len() && verts.len() > 3 && steps < limit {
        steps += 1;
        let n = verts.len();
        let reach = window.min(n / 2);
        let a1 = verts[i].point;
        let a2 = verts[(i + 1) % n].point;

        let mut cut = None;
        for k in (2..=reach).rev() {
            let j = (i + k) % n;
            let b1 = verts[j].point;
            let b2 = verts[(j + 1) % n].point;
            if let Some((p, t, u)) = segment_intersection(a1, a2, b1, b2) {
                let inside = |s: f64| s > PARAM_EPSILON && s < 1.0 - PARAM_EPSILON;
                if inside(t) && inside(u) {
                    cut = Some((k, p));
                    break;
                }
            }
        }

        let Some((k, p)) = cut else {
            i += 1;
            continue;
        };
        trace!("Trimming loop of {} vertices after vertex {}", k, i);
        let removed = |idx: usize| (idx + n - i - 1) % n < k;
        let crossing = OffsetVertex {
            point: p,
            edge: verts[i].edge,
            kind: VertexKind::Interior,
        };
        let mut next = Vec::with_capacity(n - k + 1);
        let mut new_i = 0;
        for (idx, v) in verts.iter().enumerate() {
            if removed(idx) {
                continue;
            }
            next.push(*v);
            if idx == i {
                new_i = next.len() - 1;
                next.push(crossing);
            }
        }
        verts = next;
        i = new_i;
    }
    verts
}

/// Unit tangents leaving the start and entering the end of a segment, the
/// latter pointing back into the curve.
fn end_tangents(seg: &Segment) -> Option<(Point, Point)> {
    let cps = seg.control_points();
    let (first, last) = (cps[0], cps[cps.len() - 1]);
    let start = cps[1..].iter().find_map(|c| (*c - first).normalized())?;
    let end = cps[..cps.len() - 1]
        .iter()
        .rev()
        .find_map(|c| (*c - last).normalized())?;
    Some((start, end))
}

/// Least-squares cubic through `points` with fixed end tangents.
fn fit_cubic(points: &[Point], t_start: Point, t_end: Point) -> Option<(Point, Point)> {
    let p0 = *points.first()?;
    let p3 = *points.last()?;
    let chord = p0.distance_to(&p3);

    let mut cumulative = Vec::with_capacity(points.len());
    let mut total = 0.0;
    for (i, p) in points.iter().enumerate() {
        if i > 0 {
            total += points[i - 1].distance_to(p);
        }
        cumulative.push(total);
    }
    if total <= EPSILON {
        return None;
    }

    let mut c = Matrix2::<f64>::zeros();
    let mut x = Vector2::<f64>::zeros();
    for (p, s) in points.iter().zip(&cumulative) {
        let u = s / total;
        let mu = 1.0 - u;
        let (b0, b1, b2, b3) = (mu * mu * mu, 3.0 * u * mu * mu, 3.0 * u * u * mu, u * u * u);
        let a1 = t_start * b1;
        let a2 = t_end * b2;
        c[(0, 0)] += a1.dot(a1);
        c[(0, 1)] += a1.dot(a2);
        c[(1, 1)] += a2.dot(a2);
        let rest = *p - (p0 * (b0 + b1) + p3 * (b2 + b3));
        x[0] += a1.dot(rest);
        x[1] += a2.dot(rest);
    }
    c[(1, 0)] = c[(0, 1)];

    let fallback = chord / 3.0;
    let (mut alpha1, mut alpha2) = match c.try_inverse() {
        Some(inv) => {
            let s = inv * x;
            (s[0], s[1])
        }
        None => (fallback, fallback),
    };
    let floor = chord * 1e-6;
    if !(alpha1 > floor && alpha2 > floor) {
        alpha1 = fallback;
        alpha2 = fallback;
    }
    Some((p0 + t_start * alpha1, p3 + t_end * alpha2))
}

fn fit_error(points: &[Point], c1: Point, c2: Point, tol: &Tolerances) -> f64 {
    let (Some(p0), Some(p3)) = (points.first(), points.last()) else {
        return f64::INFINITY;
    };
    let curve = bezier(*p0, c1, c2, *p3);
    points
        .iter()
        .map(|p| closest_point_on_cubic(*p, &curve, tol).0.distance_to(p))
        .fold(0.0, f64::max)
}

/// Builds the seam figure's nodes and edges from the trimmed vertex ring.
fn assemble(
    verts: &[OffsetVertex],
    outline: &Outline,
    id: &str,
    options: &OffsetOptions,
) -> (Vec<FigureNode>, Vec<FigureEdge>) {
    let n = verts.len();
    let starts_run = |i: usize| {
        let prev = &verts[(i + n - 1) % n];
        matches!(verts[i].kind, VertexKind::Join | VertexKind::BevelOut) || verts[i].edge != prev.edge
    };
    let mut starts: Vec<usize> = (0..n).filter(|&i| starts_run(i)).collect();
    if starts.is_empty() {
        starts.push(0);
    }

    let mut keep = vec![true; n];
    let mut cubic_from: Vec<Option<(Point, Point)>> = vec![None; n];

    if options.refit_curves && starts.len() > 1 {
        for (r, &s) in starts.iter().enumerate() {
            let next_start = starts[(r + 1) % starts.len()];
            let last = (next_start + n - 1) % n;
            let span_end = if verts[last].kind == VertexKind::BevelIn && last != s {
                last
            } else {
                next_start
            };
            let edge = verts[s].edge;
            if outline.kinds.get(edge) != Some(&EdgeKind::Cubic) {
                continue;
            }
            let span_len = (span_end + n - s) % n + 1;
            if span_len < options.min_refit_points.max(3) {
                continue;
            }
            let span: Vec<Point> = (0..span_len).map(|o| verts[(s + o) % n].point).collect();
            let Some((t0, t1)) = outline.segments.get(edge).and_then(end_tangents) else {
                continue;
            };
            let Some((c1, c2)) = fit_cubic(&span, t0, t1) else {
                continue;
            };
            let err = fit_error(&span, c1, c2, &options.tolerances);
            if err > options.refit_tolerance_px {
                debug!(
                    "Refit of edge {} rejected, deviation {:.3}px over {} points",
                    edge, err, span_len
                );
                continue;
            }
            for o in 1..span_len - 1 {
                keep[(s + o) % n] = false;
            }
            cubic_from[s] = Some((c1, c2));
        }
    }

    let kept: Vec<usize> = (0..n).filter(|&i| keep[i]).collect();
    let mut nodes: Vec<FigureNode> = kept
        .iter()
        .enumerate()
        .map(|(j, &i)| {
            let v = &verts[i];
            let smooth = v.kind == VertexKind::Join
                && outline.modes.get(v.edge) == Some(&NodeMode::Smooth);
            FigureNode::new(format!("{}-n{}", id, j), v.point.x, v.point.y).with_mode(if smooth {
                NodeMode::Smooth
            } else {
                NodeMode::Corner
            })
        })
        .collect();

    let count = kept.len();
    let mut edges = Vec::with_capacity(count);
    for j in 0..count {
        let next = (j + 1) % count;
        let kind = match cubic_from[kept[j]] {
            Some((c1, c2)) => {
                let from = verts[kept[j]].point;
                let to = verts[kept[next]].point;
                nodes[j].out_handle = Some(c1 - from);
                nodes[next].in_handle = Some(c2 - to);
                EdgeKind::Cubic
            }
            None => EdgeKind::Line,
        };
        edges.push(FigureEdge::new(
            format!("{}-e{}", id, j),
            nodes[j].id.clone(),
            nodes[next].id.clone(),
            kind,
        ));
    }
    (nodes, edges)
}

fn seam_style(parent: &FigureStyle) -> FigureStyle {
    FigureStyle {
        fill: None,
        dash: vec![6.0, 4.0],
        ..parent.clone()
    }
}

fn offset_with_id(
    parent: &Figure,
    offset_cm: f64,
    options: &OffsetOptions,
    id: &str,
) -> Result<Figure> {
    options.check()?;
    if !offset_cm.is_finite() {
        return Err(UnsupportedGeometryError::InvalidParameter {
            name: "offsetCm".to_string(),
            reason: "must be finite".to_string(),
        }
        .into());
    }
    validate(parent)?;
    if !parent.closed {
        return Err(UnsupportedGeometryError::OpenOutline {
            figure_id: parent.id.clone(),
            operation: "seam offset".to_string(),
        }
        .into());
    }
    if parent.nodes.len() < 3 {
        return Err(UnsupportedGeometryError::TooFewNodes {
            figure_id: parent.id.clone(),
            operation: "seam offset".to_string(),
            found: parent.nodes.len(),
            required: 3,
        }
        .into());
    }

    let outline = flatten_outline(parent, options.flatten_tolerance_px)?;
    if outline.points.len() < 3 {
        return Err(degenerate(parent, "outline has fewer than 3 distinct points"));
    }
    let area = signed_area(&outline.points);
    if area.abs() <= EPSILON {
        return Err(degenerate(parent, "outline encloses no area"));
    }
    let sign = area.signum();
    let distance = offset_cm * options.px_per_cm;

    let raw = dedupe(offset_vertices(&outline, sign, distance, options.miter_limit));
    let trimmed = dedupe(trim_local_loops(raw, options.trim_window));
    if trimmed.len() < 3 {
        return Err(degenerate(parent, "offset collapsed"));
    }
    let points: Vec<Point> = trimmed.iter().map(|v| v.point).collect();
    let new_area = signed_area(&points);
    if new_area.abs() <= EPSILON || new_area.signum() != sign {
        return Err(degenerate(parent, "offset collapsed or turned inside out"));
    }

    let (nodes, edges) = assemble(&trimmed, &outline, id, options);
    if nodes.len() < 3 {
        return Err(degenerate(parent, "offset collapsed"));
    }
    debug!(
        "Offset {} by {} cm: {} source points, {} nodes",
        parent.id,
        offset_cm,
        outline.points.len(),
        nodes.len()
    );

    let mut seam = Figure::new(id, parent.tool);
    seam.transform = parent.transform;
    seam.style = seam_style(&parent.style);
    seam.nodes = nodes;
    seam.edges = edges;
    seam.closed = true;
    seam.derivation = Some(Derivation::Seam {
        parent_id: parent.id.clone(),
        offset_cm,
        source_signature: source_signature(parent),
    });
    Ok(seam)
}

/// Seam-allowance figure `offset_cm` outside `parent` with default options.
pub fn offset_figure(parent: &Figure, offset_cm: f64) -> Result<Figure> {
    offset_figure_with(parent, offset_cm, &OffsetOptions::default())
}

/// Seam-allowance figure `offset_cm` outside `parent`.
///
/// Positive offsets grow the outline whatever its winding; negative offsets
/// shrink it. The result id is derived from the parent id and the offset, so
/// recomputing yields the same id.
pub fn offset_figure_with(parent: &Figure, offset_cm: f64, options: &OffsetOptions) -> Result<Figure> {
    let id = Figure::derived_id(&parent.id, &format!("seam:{}", offset_cm));
    offset_with_id(parent, offset_cm, options, &id)
}

/// Whether `seam` was derived from a different version of `parent`.
///
/// Figures that are not seams of `parent` are never stale.
pub fn is_stale(seam: &Figure, parent: &Figure) -> bool {
    match &seam.derivation {
        Some(Derivation::Seam {
            parent_id,
            source_signature: sig,
            ..
        }) if *parent_id == parent.id => *sig != source_signature(parent),
        _ => false,
    }
}

/// Recomputes a seam from its current parent, keeping the seam's id and style.
pub fn refresh_seam(seam: &Figure, parent: &Figure, options: &OffsetOptions) -> Result<Figure> {
    let offset_cm = match &seam.derivation {
        Some(Derivation::Seam {
            parent_id,
            offset_cm,
            ..
        }) if *parent_id == parent.id => *offset_cm,
        _ => {
            return Err(UnsupportedGeometryError::InvalidParameter {
                name: "derivation".to_string(),
                reason: format!("{} is not a seam of {}", seam.id, parent.id),
            }
            .into())
        }
    };
    let mut fresh = offset_with_id(parent, offset_cm, options, &seam.id)?;
    fresh.style = seam.style.clone();
    Ok(fresh)
}
