use patternkit_core::MalformedFigureError;
use patternkit_geometry::{
    validate, DrawingTool, EdgeKind, Figure, FigureEdge, FigureNode, NodeMode, Point,
};

fn bodice() -> Figure {
    let mut f = Figure::new("bodice", DrawingTool::Curve);
    f.nodes = vec![
        FigureNode::new("shoulder", 40.0, 0.0),
        FigureNode::new("side", 180.0, 30.0)
            .with_mode(NodeMode::Smooth)
            .with_handles(Some(Point::new(-10.0, -20.0)), Some(Point::new(10.0, 20.0))),
        FigureNode::new("hem", 180.0, 300.0),
        FigureNode::new("cf", 0.0, 300.0),
    ];
    f.edges = vec![
        FigureEdge::cubic("armhole", "shoulder", "side"),
        FigureEdge::line("side-seam", "side", "hem"),
        FigureEdge::line("hemline", "hem", "cf"),
        FigureEdge::line("centre", "cf", "shoulder"),
    ];
    f.closed = true;
    f
}

#[test]
fn test_bodice_is_valid() {
    let f = bodice();
    assert!(validate(&f).is_ok());
    assert_eq!(
        f.outline_node_ids().unwrap(),
        vec!["shoulder", "side", "hem", "cf"]
    );
}

#[test]
fn test_ordered_edges_start_at_first_node() {
    let mut f = bodice();
    f.edges.rotate_left(2);
    let order: Vec<&str> = f
        .ordered_edges()
        .unwrap()
        .iter()
        .map(|e| e.id.as_str())
        .collect();
    assert_eq!(order, vec!["armhole", "side-seam", "hemline", "centre"]);
}

#[test]
fn test_cubic_segment_uses_handles() {
    let f = bodice();
    let segments = f.segments();
    let (edge, seg) = &segments[0];
    assert_eq!(edge.kind, EdgeKind::Cubic);
    let cps = seg.control_points();
    assert_eq!(cps[1], Point::new(40.0, 0.0));
    assert_eq!(cps[2], Point::new(170.0, 10.0));
}

#[test]
fn test_closed_figure_with_extra_edge_rejected() {
    let mut f = bodice();
    f.edges.push(FigureEdge::line("dart", "shoulder", "hem"));
    let err = validate(&f).unwrap_err();
    assert!(err.is_malformed());
}

#[test]
fn test_closed_figure_with_reversed_edge_rejected() {
    let mut f = bodice();
    let e = &mut f.edges[1];
    std::mem::swap(&mut e.from, &mut e.to);
    assert!(matches!(
        validate(&f),
        Err(patternkit_core::Error::Malformed(
            MalformedFigureError::BrokenCycle { .. }
        ))
    ));
}

#[test]
fn test_open_figure_validation_is_lenient() {
    let mut f = bodice();
    f.closed = false;
    f.edges.pop();
    assert!(validate(&f).is_ok());
    assert_eq!(
        f.outline_node_ids().unwrap(),
        vec!["shoulder", "side", "hem", "cf"]
    );
}

#[test]
fn test_world_transform() {
    let mut f = Figure::rectangle("r", 0.0, 0.0, 10.0, 10.0);
    f.transform.x = 100.0;
    f.transform.rotation = 90.0;
    let p = f.to_world(Point::new(10.0, 0.0));
    assert!((p.x - 100.0).abs() < 1e-9);
    assert!((p.y - 10.0).abs() < 1e-9);
    let back = f.transform.invert(p);
    assert!((back.x - 10.0).abs() < 1e-9);
    assert!(back.y.abs() < 1e-9);
}

#[test]
fn test_derived_ids_are_stable() {
    let a = Figure::derived_id("bodice", "mirror");
    let b = Figure::derived_id("bodice", "mirror");
    let c = Figure::derived_id("sleeve", "mirror");
    assert_eq!(a, b);
    assert_ne!(a, c);
    assert_ne!(patternkit_geometry::new_figure_id(), patternkit_geometry::new_figure_id());
}
