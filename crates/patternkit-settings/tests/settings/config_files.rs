use patternkit_settings::{EngineConfig, SettingsError};
use tempfile::TempDir;

fn tuned() -> EngineConfig {
    let mut config = EngineConfig::default();
    config.offset.px_per_cm = 10.0;
    config.offset.miter_limit = 2.0;
    config.snapping.tolerance_px = 12.0;
    config.snapping.edges = false;
    config.measures.circle_samples_per_edge = 16;
    config
}

#[test]
fn test_toml_round_trip() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("engine.toml");
    let config = tuned();
    config.save_to_file(&path).unwrap();

    let text = std::fs::read_to_string(&path).unwrap();
    assert!(text.contains("[offset]"));
    assert_eq!(EngineConfig::load_from_file(&path).unwrap(), config);
}

#[test]
fn test_json_round_trip() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("nested").join("engine.json");
    let config = tuned();
    config.save_to_file(&path).unwrap();

    let value: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
    assert_eq!(value["offset"]["pxPerCm"], 10.0);
    assert_eq!(EngineConfig::load_from_file(&path).unwrap(), config);
}

#[test]
fn test_partial_file_uses_defaults() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("engine.toml");
    std::fs::write(
        &path,
        "[snapping]\ntolerancePx = 4.0\nnodes = true\nguides = false\nedges = true\n",
    )
    .unwrap();

    let config = EngineConfig::load_from_file(&path).unwrap();
    assert_eq!(config.snapping.tolerance_px, 4.0);
    assert!(!config.snapping.guides);
    assert_eq!(config.offset, EngineConfig::default().offset);
}

#[test]
fn test_invalid_file_rejected() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("engine.json");
    let mut config = EngineConfig::default();
    config.offset.px_per_cm = 0.0;
    std::fs::write(&path, serde_json::to_string(&config).unwrap()).unwrap();
    assert!(EngineConfig::load_from_file(&path).is_err());

    // refuses to write it either
    assert!(config.save_to_file(&path).is_err());

    std::fs::write(&path, "{ not json").unwrap();
    assert!(matches!(
        EngineConfig::load_from_file(&path),
        Err(SettingsError::JsonError(_))
    ));
}

#[test]
fn test_missing_file_falls_back() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("absent.toml");
    assert_eq!(
        EngineConfig::load_or_default(&path).unwrap(),
        EngineConfig::default()
    );
    assert!(matches!(
        EngineConfig::load_from_file(&path),
        Err(SettingsError::LoadError(_))
    ));
}

#[test]
fn test_unknown_extension() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("engine.yaml");
    assert!(matches!(
        EngineConfig::default().save_to_file(&path),
        Err(SettingsError::Config(_))
    ));
}
