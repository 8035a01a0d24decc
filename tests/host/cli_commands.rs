use clap::Parser;
use patternkit::cli::{run, Cli};
use patternkit::{EngineConfig, Figure, PatternDocument};
use serde_json::Value;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

struct Workspace {
    _dir: TempDir,
    doc: PathBuf,
    config: PathBuf,
}

fn workspace() -> Workspace {
    let dir = TempDir::new().unwrap();
    let doc = dir.path().join("bodice.json");
    let config = dir.path().join("engine.toml");

    let mut pattern = PatternDocument::new("bodice");
    pattern.page.px_per_cm = 10.0;
    pattern.upsert_figure(Figure::rectangle("front", 0.0, 0.0, 200.0, 120.0));
    pattern.save(&doc).unwrap();
    EngineConfig::default().save_to_file(&config).unwrap();

    Workspace {
        _dir: dir,
        doc,
        config,
    }
}

fn exec(ws: &Workspace, args: &[&str]) -> anyhow::Result<Value> {
    let config = ws.config.to_string_lossy().to_string();
    let mut argv = vec!["patternkit", "--config", config.as_str()];
    argv.extend_from_slice(args);
    run(Cli::try_parse_from(argv)?)
}

fn doc_arg(ws: &Workspace) -> String {
    ws.doc.to_string_lossy().to_string()
}

fn reload(path: &Path) -> PatternDocument {
    PatternDocument::load(path).unwrap()
}

#[test]
fn test_measure_command() {
    let ws = workspace();
    let out = exec(&ws, &["measure", &doc_arg(&ws), "front"]).unwrap();
    assert_eq!(out["measures"]["rectangle"]["widthPx"], 200.0);
    assert_eq!(out["figureLength"], "64.00 cm");
}

#[test]
fn test_bounds_command() {
    let ws = workspace();
    let out = exec(&ws, &["bounds", &doc_arg(&ws), "front", "--world"]).unwrap();
    assert_eq!(out["maxX"], 200.0);
    assert_eq!(out["maxY"], 120.0);
}

#[test]
fn test_offset_write_then_refresh() {
    let ws = workspace();
    let seam = exec(&ws, &["offset", &doc_arg(&ws), "front", "--cm", "1", "--write"]).unwrap();
    assert_eq!(seam["derivation"]["parentId"], "front");

    let mut doc = reload(&ws.doc);
    assert_eq!(doc.figures.len(), 2);
    let seam_id = seam["id"].as_str().unwrap().to_string();
    let bb = patternkit::bounds(doc.figure(&seam_id).unwrap());
    assert!((bb.min_x + 10.0).abs() < 1e-9);

    // edit the parent behind the seam's back
    let mut front = doc.figure("front").unwrap().clone();
    front.nodes[1].x = 300.0;
    front.nodes[2].x = 300.0;
    doc.upsert_figure(front);
    doc.save(&ws.doc).unwrap();

    let dry = exec(&ws, &["refresh-seams", &doc_arg(&ws), "--dry-run"]).unwrap();
    assert_eq!(dry["stale"][0], seam_id.as_str());

    let out = exec(&ws, &["refresh-seams", &doc_arg(&ws)]).unwrap();
    assert_eq!(out["refreshed"][0], seam_id.as_str());
    assert!(reload(&ws.doc).stale_seams().is_empty());
}

#[test]
fn test_offset_of_missing_figure_fails() {
    let ws = workspace();
    let err = exec(&ws, &["offset", &doc_arg(&ws), "back", "--cm", "1"]).unwrap_err();
    assert!(err.to_string().contains("back"));
}

#[test]
fn test_mirror_command() {
    let ws = workspace();
    let out = exec(
        &ws,
        &["mirror", &doc_arg(&ws), "front", "--axis", "vertical", "--at", "0"],
    )
    .unwrap();
    let xs: Vec<f64> = out["nodes"]
        .as_array()
        .unwrap()
        .iter()
        .map(|n| n["x"].as_f64().unwrap())
        .collect();
    assert!(xs.iter().all(|x| *x <= 0.0));
    // nothing written without --write
    assert_eq!(reload(&ws.doc).figures.len(), 1);
}

#[test]
fn test_unfold_rejects_bad_spec() {
    let ws = workspace();
    let err = exec(
        &ws,
        &[
            "unfold",
            &doc_arg(&ws),
            "front",
            "--apex",
            "front-n0",
            "--left",
            "front-n0",
            "--right",
            "front-n2",
        ],
    )
    .unwrap_err();
    assert!(err.to_string().contains("unfold"));
}

#[test]
fn test_signature_tracks_geometry() {
    let ws = workspace();
    let first = exec(&ws, &["signature", &doc_arg(&ws), "front"]).unwrap();
    assert_eq!(first["signature"].as_str().unwrap().len(), 16);

    let mut doc = reload(&ws.doc);
    let mut front = doc.figure("front").unwrap().clone();
    front.style.stroke = "#ff0000".into();
    doc.upsert_figure(front);
    doc.save(&ws.doc).unwrap();
    let second = exec(&ws, &["signature", &doc_arg(&ws), "front"]).unwrap();
    assert_eq!(first["signature"], second["signature"]);
}

#[test]
fn test_snap_command() {
    let ws = workspace();
    let hit = exec(&ws, &["snap", &doc_arg(&ws), "--x", "198", "--y", "2"]).unwrap();
    assert_eq!(hit["kind"], "node");
    assert_eq!(hit["targetId"], "front-n1");

    let dragged = exec(
        &ws,
        &[
            "snap",
            &doc_arg(&ws),
            "--x",
            "198",
            "--y",
            "2",
            "--exclude-figure",
            "front",
            "--exclude-node",
            "front-n1",
        ],
    )
    .unwrap();
    assert_eq!(dragged, Value::Null);

    let miss = exec(&ws, &["snap", &doc_arg(&ws), "--x", "-500", "--y", "-500"]).unwrap();
    assert_eq!(miss, Value::Null);
}
