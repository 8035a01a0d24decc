use patternkit_geometry::{
    apply_styled_curve, compute_measures, offset_figure, semantic_preset, Figure, Guide,
    GuideLine, Point,
};
use serde_json::{json, Value};

#[test]
fn test_figure_json_uses_camel_case() {
    let base = Figure::line("hem", Point::new(0.0, 0.0), Point::new(100.0, 0.0));
    let styled = apply_styled_curve(&base, semantic_preset("hem-curve").unwrap().styled_data())
        .unwrap();
    let value = serde_json::to_value(&styled).unwrap();

    assert_eq!(value["curveType"], "styled");
    assert!(value["styledData"]["technicalId"].is_string());
    assert!(value["customSnapshotDirty"].is_boolean());
    assert!(value.get("measures").is_none());
    assert!(value.get("derivation").is_none());

    let back: Figure = serde_json::from_value(value).unwrap();
    assert_eq!(back.styled_data, styled.styled_data);
    assert_eq!(back.edges, styled.edges);
    for (a, b) in back.nodes.iter().zip(&styled.nodes) {
        assert_eq!(a.id, b.id);
        assert!((a.x - b.x).abs() < 1e-9 && (a.y - b.y).abs() < 1e-9);
    }
}

#[test]
fn test_seam_derivation_is_tagged() {
    let rect = Figure::rectangle("front", 0.0, 0.0, 200.0, 300.0);
    let seam = offset_figure(&rect, 1.0).unwrap();
    let value = serde_json::to_value(&seam).unwrap();
    let derivation = &value["derivation"];
    assert_eq!(derivation["kind"], "seam");
    assert_eq!(derivation["parentId"], "front");
    assert_eq!(derivation["offsetCm"], 1.0);
    assert_eq!(derivation["sourceSignature"].as_str().map(str::len), Some(16));
}

#[test]
fn test_minimal_figure_json_fills_defaults() {
    let value = json!({
        "id": "piece",
        "nodes": [
            { "id": "a", "x": 0.0, "y": 0.0 },
            { "id": "b", "x": 10.0, "y": 0.0, "mode": "smooth", "inHandle": { "x": -2.0, "y": 0.0 } }
        ],
        "edges": [
            { "id": "ab", "from": "a", "to": "b", "kind": "cubic" }
        ]
    });
    let figure: Figure = serde_json::from_value(value).unwrap();
    assert!(!figure.closed);
    assert_eq!(figure.style.width, 1.5);
    assert_eq!(figure.nodes[1].in_handle, Some(Point::new(-2.0, 0.0)));
    assert_eq!(compute_measures(&figure).per_edge.len(), 1);
}

#[test]
fn test_cached_measures_round_trip() {
    let circle = Figure::circle("c", 0.0, 0.0, 50.0).with_measures();
    let text = serde_json::to_string(&circle).unwrap();
    let value: Value = serde_json::from_str(&text).unwrap();
    assert!(value["measures"]["circle"]["radiusPx"].is_number());
    let back: Figure = serde_json::from_str(&text).unwrap();
    let radius = |f: &Figure| f.measures.as_ref().and_then(|m| m.circle).and_then(|c| c.radius_px);
    assert!((radius(&back).unwrap() - radius(&circle).unwrap()).abs() < 1e-9);
}

#[test]
fn test_guide_json() {
    let guides = vec![
        Guide {
            id: "waist".into(),
            line: GuideLine::Horizontal { y: 120.0 },
        },
        Guide {
            id: "bias".into(),
            line: GuideLine::Line {
                point: Point::ZERO,
                direction: Point::new(1.0, 1.0),
            },
        },
    ];
    let value = serde_json::to_value(&guides).unwrap();
    assert_eq!(value[0], json!({ "id": "waist", "kind": "horizontal", "y": 120.0 }));
    assert_eq!(value[1]["kind"], "line");

    let back: Vec<Guide> = serde_json::from_value(value).unwrap();
    assert_eq!(back, guides);
}
