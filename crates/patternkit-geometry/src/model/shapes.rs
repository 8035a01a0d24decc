//! Constructors used by the drawing tools when they commit a figure.

use super::{DrawingTool, Figure, FigureEdge, FigureNode, NodeMode, Point};

/// Handle length of a quarter-circle cubic, relative to the radius.
pub(crate) const KAPPA: f64 = 0.552_284_749_8;

fn node_id(figure_id: &str, i: usize) -> String {
    format!("{}-n{}", figure_id, i)
}

fn edge_id(figure_id: &str, i: usize) -> String {
    format!("{}-e{}", figure_id, i)
}

impl Figure {
    /// Axis-aligned rectangle, clockwise on screen starting at the top-left.
    pub fn rectangle(id: impl Into<String>, x: f64, y: f64, width: f64, height: f64) -> Self {
        let corners = [
            Point::new(x, y),
            Point::new(x + width, y),
            Point::new(x + width, y + height),
            Point::new(x, y + height),
        ];
        Figure::polyline(id, DrawingTool::Rectangle, &corners, true)
    }

    /// Ellipse from four smooth nodes joined by cubic quarter arcs.
    pub fn ellipse(id: impl Into<String>, cx: f64, cy: f64, rx: f64, ry: f64) -> Self {
        let id = id.into();
        let mut figure = Figure::new(id.clone(), DrawingTool::Circle);
        for i in 0..4 {
            let theta = i as f64 * std::f64::consts::FRAC_PI_2;
            let (s, c) = theta.sin_cos();
            // tangent of the parametric ellipse, scaled per axis
            let tangent = Point::new(-s * rx * KAPPA, c * ry * KAPPA);
            figure.nodes.push(
                FigureNode::new(node_id(&id, i), cx + rx * c, cy + ry * s)
                    .with_mode(NodeMode::Smooth)
                    .with_handles(Some(-tangent), Some(tangent)),
            );
        }
        for i in 0..4 {
            figure.edges.push(FigureEdge::cubic(
                edge_id(&id, i),
                node_id(&id, i),
                node_id(&id, (i + 1) % 4),
            ));
        }
        figure.closed = true;
        figure
    }

    pub fn circle(id: impl Into<String>, cx: f64, cy: f64, r: f64) -> Self {
        Figure::ellipse(id, cx, cy, r, r)
    }

    /// Single straight segment.
    pub fn line(id: impl Into<String>, a: Point, b: Point) -> Self {
        Figure::polyline(id, DrawingTool::Line, &[a, b], false)
    }

    /// Chain of line edges through `points`, optionally closed.
    pub fn polyline(
        id: impl Into<String>,
        tool: DrawingTool,
        points: &[Point],
        closed: bool,
    ) -> Self {
        let id = id.into();
        let mut figure = Figure::new(id.clone(), tool);
        figure.nodes = points
            .iter()
            .enumerate()
            .map(|(i, p)| FigureNode::new(node_id(&id, i), p.x, p.y))
            .collect();

        let n = points.len();
        let edge_count = match (closed, n) {
            (_, 0) | (_, 1) => 0,
            (true, _) => n,
            (false, _) => n - 1,
        };
        figure.edges = (0..edge_count)
            .map(|i| FigureEdge::line(edge_id(&id, i), node_id(&id, i), node_id(&id, (i + 1) % n)))
            .collect();
        figure.closed = closed && n > 1;
        figure
    }

    /// Open single cubic from `a` to `b` with absolute control points.
    pub fn cubic_curve(id: impl Into<String>, a: Point, c1: Point, c2: Point, b: Point) -> Self {
        let id = id.into();
        let mut figure = Figure::new(id.clone(), DrawingTool::Curve);
        figure.nodes = vec![
            FigureNode::new(node_id(&id, 0), a.x, a.y).with_handles(None, Some(c1 - a)),
            FigureNode::new(node_id(&id, 1), b.x, b.y).with_handles(Some(c2 - b), None),
        ];
        figure.edges = vec![FigureEdge::cubic(
            edge_id(&id, 0),
            node_id(&id, 0),
            node_id(&id, 1),
        )];
        figure
    }
}
