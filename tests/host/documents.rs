use patternkit::{
    offset_figure_with, Figure, Guide, GuideLine, OffsetOptions, PatternDocument, Point,
    DOCUMENT_VERSION,
};
use tempfile::TempDir;

#[test]
fn test_save_and_load() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("skirt.json");

    let mut doc = PatternDocument::new("skirt");
    doc.page.px_per_cm = 10.0;
    doc.guides.push(Guide {
        id: "hip".into(),
        line: GuideLine::Horizontal { y: 200.0 },
    });
    doc.upsert_figure(Figure::rectangle("panel", 0.0, 0.0, 300.0, 600.0));
    doc.save(&path).unwrap();

    let loaded = PatternDocument::load(&path).unwrap();
    assert_eq!(loaded.name, "skirt");
    assert_eq!(loaded.version, DOCUMENT_VERSION);
    assert_eq!(loaded.guides, doc.guides);
    assert_eq!(loaded.figures.len(), 1);
    assert_eq!(loaded.page.px_per_cm, 10.0);
}

#[test]
fn test_newer_version_rejected() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("future.json");
    std::fs::write(&path, r#"{ "version": 99, "figures": [] }"#).unwrap();
    let err = PatternDocument::load(&path).unwrap_err();
    assert!(err.to_string().contains("version 99"));
}

#[test]
fn test_malformed_figure_still_loads() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("broken.json");
    std::fs::write(
        &path,
        r#"{
            "version": 1,
            "figures": [{
                "id": "bad",
                "closed": true,
                "nodes": [{ "id": "a", "x": 0, "y": 0 }],
                "edges": [{ "id": "e", "from": "a", "to": "ghost" }]
            }]
        }"#,
    )
    .unwrap();
    let doc = PatternDocument::load(&path).unwrap();
    assert_eq!(doc.figures.len(), 1);
}

#[test]
fn test_nested_seams_refresh_and_cascade() {
    let mut doc = PatternDocument::new("bodice");
    doc.page.px_per_cm = 10.0;
    let options = doc.offset_options(&OffsetOptions::default());

    let front = Figure::rectangle("front", 0.0, 0.0, 200.0, 300.0);
    let seam = offset_figure_with(&front, 1.0, &options).unwrap();
    let outer = offset_figure_with(&seam, 0.5, &options).unwrap();
    let seam_id = seam.id.clone();
    doc.upsert_figure(front);
    doc.upsert_figure(seam);
    doc.upsert_figure(outer);

    let mut edited = doc.figure("front").unwrap().clone();
    edited.nodes[2].set_position(Point::new(220.0, 320.0));
    doc.upsert_figure(edited);
    assert_eq!(doc.stale_seams().len(), 1);

    let refreshed = doc.refresh_seams(&OffsetOptions::default()).unwrap();
    assert_eq!(refreshed.len(), 2);
    assert_eq!(refreshed[0], seam_id);
    assert!(doc.stale_seams().is_empty());

    let removed = doc.remove_figure("front");
    assert_eq!(removed.len(), 3);
    assert!(doc.figures.is_empty());
}
