use patternkit_geometry::{
    bounds, compute_measures, mirror_figure, offset_figure_with, snap, validate, DrawingTool,
    Figure, MirrorAxis, OffsetOptions, Point, SnapContext, SnapOptions, SnapTargetKind,
};
use proptest::prelude::*;

fn regular_polygon(n: usize, cx: f64, cy: f64, r: f64, phase: f64) -> Figure {
    let points: Vec<Point> = (0..n)
        .map(|i| {
            let a = phase + std::f64::consts::TAU * i as f64 / n as f64;
            Point::new(cx + r * a.cos(), cy + r * a.sin())
        })
        .collect();
    Figure::polyline("poly", DrawingTool::Curve, &points, true)
}

fn scaled(figure: &Figure, k: f64) -> Figure {
    let mut out = figure.clone();
    for node in &mut out.nodes {
        node.x *= k;
        node.y *= k;
        node.in_handle = node.in_handle.map(|h| h * k);
        node.out_handle = node.out_handle.map(|h| h * k);
    }
    out
}

fn options() -> OffsetOptions {
    OffsetOptions {
        px_per_cm: 10.0,
        ..OffsetOptions::default()
    }
}

proptest! {
    #[test]
    fn prop_double_mirror_preserves_bounds(
        cx in -500.0f64..500.0,
        cy in -500.0f64..500.0,
        rx in 5.0f64..200.0,
        ry in 5.0f64..200.0,
        angle in 0.0f64..std::f64::consts::PI,
        ox in -100.0f64..100.0,
    ) {
        let piece = Figure::ellipse("e", cx, cy, rx, ry);
        let axis = MirrorAxis::new(Point::new(ox, 0.0), Point::new(angle.cos(), angle.sin()));
        let once = mirror_figure(&piece, &axis).unwrap();
        let twice = mirror_figure(&once, &axis).unwrap();
        let a = bounds(&piece);
        let b = bounds(&twice);
        let tol = 1e-6 * (1.0 + cx.abs() + cy.abs() + rx + ry);
        prop_assert!((a.min_x - b.min_x).abs() < tol);
        prop_assert!((a.min_y - b.min_y).abs() < tol);
        prop_assert!((a.max_x - b.max_x).abs() < tol);
        prop_assert!((a.max_y - b.max_y).abs() < tol);
    }

    #[test]
    fn prop_mirrored_outline_stays_valid(
        x in -100.0f64..100.0,
        w in 1.0f64..300.0,
        h in 1.0f64..300.0,
        angle in 0.0f64..std::f64::consts::PI,
    ) {
        let rect = Figure::rectangle("r", x, 0.0, w, h);
        let axis = MirrorAxis::new(Point::ZERO, Point::new(angle.cos(), angle.sin()));
        let mirrored = mirror_figure(&rect, &axis).unwrap();
        prop_assert!(validate(&mirrored).is_ok());
        prop_assert_eq!(mirrored.nodes.len(), 4);
    }

    #[test]
    fn prop_offset_out_and_back_restores_polygon(
        n in 3usize..12,
        r in 50.0f64..300.0,
        d in 0.1f64..2.0,
        phase in 0.0f64..1.0,
    ) {
        let poly = regular_polygon(n, 0.0, 0.0, r, phase);
        let grown = offset_figure_with(&poly, d, &options()).unwrap();
        let back = offset_figure_with(&grown, -d, &options()).unwrap();
        prop_assert_eq!(back.nodes.len(), n);
        for node in &poly.nodes {
            let p = node.position();
            let nearest = back
                .nodes
                .iter()
                .map(|m| m.position().distance_to(&p))
                .fold(f64::INFINITY, f64::min);
            prop_assert!(nearest < 1e-6, "node {} off by {}", node.id, nearest);
        }
    }

    #[test]
    fn prop_measures_are_deterministic(
        w in 1.0f64..500.0,
        h in 1.0f64..500.0,
        r in 1.0f64..300.0,
    ) {
        let rect = Figure::rectangle("r", 0.0, 0.0, w, h);
        prop_assert_eq!(compute_measures(&rect), compute_measures(&rect));
        let circle = Figure::circle("c", w, h, r);
        let first = compute_measures(&circle);
        prop_assert_eq!(&first, &compute_measures(&circle));
        prop_assert_eq!(&first, &compute_measures(&circle.clone().with_measures()));
    }

    #[test]
    fn prop_lengths_scale_linearly(
        r in 5.0f64..200.0,
        k in 0.1f64..10.0,
    ) {
        for piece in [Figure::circle("c", 10.0, 20.0, r), regular_polygon(5, 0.0, 0.0, r, 0.3)] {
            let base = compute_measures(&piece).figure_length_px;
            let grown = compute_measures(&scaled(&piece, k)).figure_length_px;
            prop_assert!(((grown - base * k) / (base * k)).abs() < 1e-6);
        }
    }

    #[test]
    fn prop_snap_picks_nearby_node(
        x in -200.0f64..200.0,
        y in -200.0f64..200.0,
        w in 50.0f64..300.0,
        h in 50.0f64..300.0,
        corner in 0usize..4,
        dx in -3.0f64..3.0,
        dy in -3.0f64..3.0,
    ) {
        let rect = Figure::rectangle("r", x, y, w, h);
        let target = rect.nodes[corner].clone();
        let ctx = SnapContext::from_figures(&[rect], None, SnapOptions::default(), 1.0);

        let hit = snap(Point::new(target.x + dx, target.y + dy), &ctx).unwrap();
        prop_assert_eq!(hit.kind, SnapTargetKind::Node);
        prop_assert_eq!(hit.target_id, target.id);

        prop_assert!(snap(Point::new(x + w + 100.0, y + h + 100.0), &ctx).is_none());
    }
}
