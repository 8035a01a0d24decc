use approx::assert_relative_eq;
use patternkit_geometry::{
    apply_styled_curve, bounds, compute_measures, is_stale, mirror_figure, offset_figure_with,
    semantic_preset, snap, unfold_dart, validate, world_bounds, CurveType, DartSpec, Derivation,
    DrawingTool, EdgeKind, Figure, GeometryCache, MeasureOptions, MirrorAxis, OffsetOptions,
    Point, SnapContext, SnapOptions, SnapTargetKind,
};

fn options() -> OffsetOptions {
    OffsetOptions {
        px_per_cm: 10.0,
        ..OffsetOptions::default()
    }
}

#[test]
fn test_rectangle_measures_match_reference() {
    let rect = Figure::polyline(
        "r",
        DrawingTool::Rectangle,
        &[
            Point::new(0.0, 0.0),
            Point::new(200.0, 0.0),
            Point::new(200.0, 120.0),
            Point::new(0.0, 120.0),
        ],
        true,
    );
    let m = compute_measures(&rect);
    let r = m.rectangle.expect("rectangle block");
    assert_relative_eq!(r.width_px, 200.0);
    assert_relative_eq!(r.height_px, 120.0);
    assert_eq!(m.per_edge.len(), 4);
}

#[test]
fn test_rotated_rectangle_width_follows_x_axis() {
    let rect = Figure::polyline(
        "r",
        DrawingTool::Rectangle,
        &[
            Point::new(0.0, 0.0),
            Point::new(0.0, 80.0),
            Point::new(-30.0, 80.0),
            Point::new(-30.0, 0.0),
        ],
        true,
    );
    let r = compute_measures(&rect).rectangle.unwrap();
    assert_relative_eq!(r.width_px, 30.0);
    assert_relative_eq!(r.height_px, 80.0);
}

#[test]
fn test_styled_armhole_then_measure() {
    let base = Figure::line("armhole", Point::new(0.0, 0.0), Point::new(120.0, 160.0));
    let preset = semantic_preset("armhole-classic-front").unwrap();
    let styled = apply_styled_curve(&base, preset.styled_data()).unwrap();
    assert_eq!(styled.curve_type, Some(CurveType::Styled));
    assert!(styled.edges.iter().all(|e| e.kind == EdgeKind::Cubic));

    let m = compute_measures(&styled);
    let curve = m.curve.unwrap();
    // a bent curve is longer than its 200px chord
    assert!(curve.length_px > 200.0);
    assert!(curve.tangent_angle_deg.is_some());
}

#[test]
fn test_seam_of_circle_stays_round() {
    let circle = Figure::circle("c", 0.0, 0.0, 80.0);
    let seam = offset_figure_with(&circle, 1.5, &options()).unwrap();
    assert!(validate(&seam).is_ok());
    let m = compute_measures(&seam);
    let c = m.circle.expect("seam of a circle is a circle");
    assert_relative_eq!(c.rx_px, 95.0, epsilon = 0.5);
    assert!(matches!(
        seam.derivation,
        Some(Derivation::Seam { ref parent_id, offset_cm, .. }) if parent_id == "c" && offset_cm == 1.5
    ));
}

#[test]
fn test_concave_outline_offset() {
    // L-shaped piece
    let piece = Figure::polyline(
        "l",
        DrawingTool::Curve,
        &[
            Point::new(0.0, 0.0),
            Point::new(100.0, 0.0),
            Point::new(100.0, 40.0),
            Point::new(40.0, 40.0),
            Point::new(40.0, 100.0),
            Point::new(0.0, 100.0),
        ],
        true,
    );
    let seam = offset_figure_with(&piece, 1.0, &options()).unwrap();
    assert_eq!(seam.nodes.len(), 6);
    // the inner corner moves diagonally outward
    assert!(seam
        .nodes
        .iter()
        .any(|n| (n.x - 50.0).abs() < 1e-9 && (n.y - 50.0).abs() < 1e-9));
    let bb = bounds(&seam);
    assert_relative_eq!(bb.min_x, -10.0, epsilon = 1e-9);
    assert_relative_eq!(bb.max_x, 110.0, epsilon = 1e-9);
}

#[test]
fn test_seam_goes_stale_after_edit() {
    let mut piece = Figure::rectangle("p", 0.0, 0.0, 100.0, 60.0);
    let seam = offset_figure_with(&piece, 1.0, &options()).unwrap();
    assert!(!is_stale(&seam, &piece));

    piece.style.stroke = "#000".into();
    assert!(!is_stale(&seam, &piece));

    piece.nodes[0].y = -5.0;
    assert!(is_stale(&seam, &piece));
}

#[test]
fn test_mirror_keeps_bounds_size() {
    let piece = Figure::ellipse("e", 50.0, 20.0, 40.0, 10.0);
    let mirrored = mirror_figure(&piece, &MirrorAxis::vertical_through_center(&piece)).unwrap();
    let a = bounds(&piece);
    let b = bounds(&mirrored);
    assert_relative_eq!(a.min_x, b.min_x, epsilon = 1e-9);
    assert_relative_eq!(a.max_y, b.max_y, epsilon = 1e-9);
    assert!(validate(&mirrored).is_ok());
}

#[test]
fn test_unfold_then_offset() {
    let piece = Figure::polyline(
        "skirt",
        DrawingTool::Dart,
        &[
            Point::new(0.0, 0.0),
            Point::new(200.0, 0.0),
            Point::new(200.0, 300.0),
            Point::new(110.0, 300.0),
            Point::new(90.0, 300.0),
            Point::new(0.0, 300.0),
        ],
        true,
    );
    let spec = DartSpec::new("skirt-n0", "skirt-n3", "skirt-n4");
    let flat = unfold_dart(&piece, &spec).unwrap();
    assert_eq!(flat.nodes.len(), 5);
    assert!(flat.closed);
    assert!(offset_figure_with(&flat, 1.0, &options()).is_ok());
}

#[test]
fn test_snap_across_figures() {
    let mut sleeve = Figure::rectangle("sleeve", 0.0, 0.0, 50.0, 50.0);
    sleeve.transform.x = 300.0;
    let bodice = Figure::rectangle("bodice", 0.0, 0.0, 100.0, 100.0);
    let ctx = SnapContext::from_figures(&[bodice, sleeve], None, SnapOptions::default(), 2.0);

    let hit = snap(Point::new(302.0, 1.0), &ctx).unwrap();
    assert_eq!(hit.kind, SnapTargetKind::Node);
    assert_eq!(hit.target_id, "sleeve-n0");

    assert!(snap(Point::new(200.0, 200.0), &ctx).is_none());
}

#[test]
fn test_world_bounds_with_rotation() {
    let mut piece = Figure::rectangle("p", 0.0, 0.0, 100.0, 10.0);
    piece.transform.rotation = 90.0;
    let bb = world_bounds(&piece);
    assert_relative_eq!(bb.width(), 10.0, epsilon = 1e-9);
    assert_relative_eq!(bb.height(), 100.0, epsilon = 1e-9);
}

#[test]
fn test_cache_follows_edits() {
    let cache = GeometryCache::new();
    let mut piece = Figure::rectangle("p", 0.0, 0.0, 100.0, 60.0);
    let before = cache.measures(&piece, &MeasureOptions::default());
    piece.nodes[1].x = 150.0;
    piece.nodes[2].x = 150.0;
    let after = cache.measures(&piece, &MeasureOptions::default());
    assert_relative_eq!(before.rectangle.unwrap().width_px, 100.0);
    assert_relative_eq!(after.rectangle.unwrap().width_px, 150.0);
    assert_eq!(cache.stats().misses, 2);
}
