//! Engine configuration for PatternKit
//!
//! Tolerances and option sets the geometry engines run with, loaded from
//! and saved to JSON or TOML files chosen by extension.
//!
//! Configuration is organized into sections:
//! - Geometry tolerances (arc length, closest point), shared by every engine
//! - Seam offset options
//! - Snapping switches
//! - Measurement thresholds

use patternkit_geometry::{MeasureOptions, OffsetOptions, SnapOptions, Tolerances};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

use crate::error::{ConfigError, SettingsError, SettingsResult};

const APP_DIR: &str = "patternkit";
const CONFIG_FILE: &str = "engine.toml";

/// On-disk format, picked from the file extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigFormat {
    Json,
    Toml,
}

impl ConfigFormat {
    pub fn from_path(path: &Path) -> SettingsResult<Self> {
        match path.extension().and_then(|ext| ext.to_str()) {
            Some("json") => Ok(Self::Json),
            Some("toml") => Ok(Self::Toml),
            other => Err(ConfigError::UnsupportedFormat(other.unwrap_or("").to_string()).into()),
        }
    }
}

/// Complete engine configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct EngineConfig {
    /// Tolerances for the curve primitives, applied to every engine
    pub geometry: Tolerances,
    /// Seam allowance generation
    pub offset: OffsetOptions,
    /// Pointer snapping
    pub snapping: SnapOptions,
    /// Circle, rectangle and curve detection
    pub measures: MeasureOptions,
}

fn out_of_range(key: &str, value: impl ToString) -> SettingsError {
    ConfigError::ValueOutOfRange {
        key: key.to_string(),
        value: value.to_string(),
    }
    .into()
}

fn check_positive(key: &str, value: f64) -> SettingsResult<()> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(out_of_range(key, value))
    }
}

fn check_tolerances(prefix: &str, t: &Tolerances) -> SettingsResult<()> {
    check_positive(&format!("{}.arcLengthRelative", prefix), t.arc_length_relative)?;
    if t.max_subdivision_depth == 0 || t.max_subdivision_depth > 32 {
        return Err(out_of_range(
            &format!("{}.maxSubdivisionDepth", prefix),
            t.max_subdivision_depth,
        ));
    }
    if t.closest_point_samples < 2 {
        return Err(out_of_range(
            &format!("{}.closestPointSamples", prefix),
            t.closest_point_samples,
        ));
    }
    Ok(())
}

impl EngineConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load config from file (JSON or TOML)
    pub fn load_from_file(path: &Path) -> SettingsResult<Self> {
        let format = ConfigFormat::from_path(path)?;
        let content = std::fs::read_to_string(path).map_err(|e| {
            SettingsError::LoadError(format!("{}: {}", path.display(), e))
        })?;

        let config: Self = match format {
            ConfigFormat::Json => serde_json::from_str(&content)?,
            ConfigFormat::Toml => toml::from_str(&content)?,
        };
        config.validate()?;
        debug!("Loaded engine config from {}", path.display());
        Ok(config)
    }

    /// Loads `path` when it exists, otherwise returns the defaults.
    pub fn load_or_default(path: &Path) -> SettingsResult<Self> {
        if path.exists() {
            Self::load_from_file(path)
        } else {
            info!("No engine config at {}, using defaults", path.display());
            Ok(Self::default())
        }
    }

    /// Save config to file (JSON or TOML)
    pub fn save_to_file(&self, path: &Path) -> SettingsResult<()> {
        self.validate()?;
        let content = match ConfigFormat::from_path(path)? {
            ConfigFormat::Json => serde_json::to_string_pretty(self)?,
            ConfigFormat::Toml => toml::to_string_pretty(self)?,
        };

        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(|e| {
                SettingsError::ConfigDirectory(format!("{}: {}", parent.display(), e))
            })?;
        }
        std::fs::write(path, content)
            .map_err(|e| SettingsError::SaveError(format!("{}: {}", path.display(), e)))?;
        debug!("Saved engine config to {}", path.display());
        Ok(())
    }

    /// Offset options carrying the shared geometry tolerances.
    pub fn offset_options(&self) -> OffsetOptions {
        OffsetOptions {
            tolerances: self.geometry,
            ..self.offset
        }
    }

    /// Measure options carrying the shared geometry tolerances.
    pub fn measure_options(&self) -> MeasureOptions {
        MeasureOptions {
            tolerances: self.geometry,
            ..self.measures
        }
    }

    /// Validate configuration
    pub fn validate(&self) -> SettingsResult<()> {
        check_tolerances("geometry", &self.geometry)?;

        let offset = &self.offset;
        check_positive("offset.pxPerCm", offset.px_per_cm)?;
        check_positive("offset.flattenTolerancePx", offset.flatten_tolerance_px)?;
        check_positive("offset.refitTolerancePx", offset.refit_tolerance_px)?;
        if !(offset.miter_limit.is_finite() && offset.miter_limit >= 1.0) {
            return Err(SettingsError::InvalidSetting {
                key: "offset.miterLimit".to_string(),
                reason: "must be at least 1".to_string(),
            });
        }

        check_positive("snapping.tolerancePx", self.snapping.tolerance_px)?;

        let measures = &self.measures;
        check_positive("measures.circleTolerance", measures.circle_tolerance)?;
        check_positive("measures.roundTolerance", measures.round_tolerance)?;
        if !(measures.right_angle_tolerance_deg >= 0.0 && measures.right_angle_tolerance_deg < 45.0)
        {
            return Err(out_of_range(
                "measures.rightAngleToleranceDeg",
                measures.right_angle_tolerance_deg,
            ));
        }
        Ok(())
    }
}

/// Platform config location, e.g. `~/.config/patternkit/engine.toml`.
pub fn default_config_path() -> SettingsResult<PathBuf> {
    dirs::config_dir()
        .map(|dir| dir.join(APP_DIR).join(CONFIG_FILE))
        .ok_or_else(|| ConfigError::UnsupportedPlatform(std::env::consts::OS.to_string()).into())
}
