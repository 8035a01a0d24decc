//! # PatternKit
//!
//! A vector pattern-geometry engine for garment pieces:
//! - Figures of nodes and line/cubic edges, validated as outlines
//! - Styled curves built from named technical templates
//! - Seam allowances, mirrored pieces and unfolded darts
//! - Measurements, bounds and snapping
//!
//! ## Architecture
//!
//! PatternKit is organized as a workspace with multiple crates:
//!
//! 1. **patternkit-core** - Error taxonomy and unit conversion
//! 2. **patternkit-geometry** - Figure model and the geometry engines
//! 3. **patternkit-settings** - Engine configuration files
//! 4. **patternkit** - Pattern documents and the command-line front end

pub mod cli;
pub mod document;

pub use document::{PageSettings, PatternDocument, DOCUMENT_VERSION};

pub use patternkit_core::{
    Error, InvalidDartSpecError, LengthUnit, MalformedFigureError, Result,
    UnsupportedGeometryError,
};

pub use patternkit_geometry::{
    apply_styled_curve, bounds, compute_measures, compute_measures_with, is_stale, mirror_figure,
    offset_figure, offset_figure_with, refresh_seam, snap, source_signature, unfold_dart,
    validate, world_bounds, BoundingBox, DartSpec, Figure, FigureEdge, FigureMeasures, FigureNode,
    GeometryCache, Guide, GuideLine, MeasureOptions, MirrorAxis, OffsetOptions, Point,
    SnapContext, SnapOptions, SnapResult, Tolerances,
};

pub use patternkit_settings::{EngineConfig, SettingsError};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Build date (set at compile time)
pub const BUILD_DATE: &str = env!("BUILD_DATE");

/// Initialize logging with the default configuration
///
/// Logs go to stderr so command output on stdout stays machine-readable.
/// `RUST_LOG` overrides the default `warn` level.
pub fn init_logging() -> anyhow::Result<()> {
    use tracing_subscriber::fmt;
    use tracing_subscriber::prelude::*;
    use tracing_subscriber::EnvFilter;

    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));

    let fmt_layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(true)
        .with_level(true)
        .with_line_number(true);

    tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt_layer)
        .try_init()?;

    Ok(())
}
