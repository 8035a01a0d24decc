//! Command-line front end
//!
//! Every command reads a pattern document, runs one engine on it and returns
//! a JSON value; `main` prints it. Commands that derive a figure can write
//! it back into the document with `--write`.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use patternkit_core::units::format_length;
use patternkit_core::LengthUnit;
use patternkit_geometry::{
    bounds, compute_measures_with, mirror_figure, offset_figure_with, snap, source_signature,
    unfold_dart, world_bounds, DartSpec, Figure, MirrorAxis, Point,
};
use patternkit_settings::{default_config_path, EngineConfig};
use serde_json::{json, Value};
use tracing::{debug, warn};

use crate::document::PatternDocument;

#[derive(Parser, Debug)]
#[command(name = "patternkit", version, about = "Pattern-piece geometry tools")]
pub struct Cli {
    /// Engine configuration (JSON or TOML); defaults to the platform config file
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Axis {
    Vertical,
    Horizontal,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Lengths, angles and shape metrics of a figure
    Measure {
        document: PathBuf,
        figure: String,
        /// Unit for the formatted total length
        #[arg(long, default_value = "cm")]
        unit: LengthUnit,
    },
    /// Bounding box of a figure, local or on the page
    Bounds {
        document: PathBuf,
        figure: String,
        #[arg(long)]
        world: bool,
    },
    /// Seam allowance around a closed figure
    Offset {
        document: PathBuf,
        figure: String,
        /// Distance in centimetres; negative shrinks
        #[arg(long, allow_hyphen_values = true)]
        cm: f64,
        #[arg(long)]
        write: bool,
    },
    /// Mirror a figure across a vertical or horizontal line
    Mirror {
        document: PathBuf,
        figure: String,
        #[arg(long, value_enum, default_value_t = Axis::Vertical)]
        axis: Axis,
        /// Axis position; defaults to the figure's centre
        #[arg(long, allow_hyphen_values = true)]
        at: Option<f64>,
        #[arg(long)]
        write: bool,
    },
    /// Close a dart into a flat outline
    Unfold {
        document: PathBuf,
        figure: String,
        #[arg(long)]
        apex: String,
        #[arg(long)]
        left: String,
        #[arg(long)]
        right: String,
        #[arg(long)]
        write: bool,
    },
    /// Content signature of a figure's geometry
    Signature { document: PathBuf, figure: String },
    /// Recompute seams whose parent changed
    RefreshSeams {
        document: PathBuf,
        /// Only list the stale seams
        #[arg(long)]
        dry_run: bool,
    },
    /// Snap a page point to the nearest target
    Snap {
        document: PathBuf,
        #[arg(long, allow_hyphen_values = true)]
        x: f64,
        #[arg(long, allow_hyphen_values = true)]
        y: f64,
        #[arg(long, default_value_t = 1.0)]
        zoom: f64,
        /// Figure of the node being dragged
        #[arg(long, requires = "exclude_node")]
        exclude_figure: Option<String>,
        #[arg(long, requires = "exclude_figure")]
        exclude_node: Option<String>,
    },
}

/// Explicit `--config`, else the platform file when present, else defaults.
pub fn load_config(path: Option<&Path>) -> Result<EngineConfig> {
    if let Some(path) = path {
        return EngineConfig::load_from_file(path)
            .with_context(|| format!("Failed to load engine config {}", path.display()));
    }
    match default_config_path() {
        Ok(path) => EngineConfig::load_or_default(&path)
            .with_context(|| format!("Failed to load engine config {}", path.display())),
        Err(e) => {
            warn!("No config directory ({}), using default engine config", e);
            Ok(EngineConfig::default())
        }
    }
}

fn to_json<T: serde::Serialize>(value: &T) -> Result<Value> {
    serde_json::to_value(value).context("Failed to serialize result")
}

/// Stores a derived figure when `write` is set and returns it as JSON.
fn emit_figure(doc: &mut PatternDocument, path: &Path, figure: Figure, write: bool) -> Result<Value> {
    let value = to_json(&figure)?;
    if write {
        let id = figure.id.clone();
        let replaced = doc.upsert_figure(figure);
        doc.save(path)?;
        debug!("Wrote {} to {} (replaced: {})", id, path.display(), replaced);
    }
    Ok(value)
}

pub fn run(cli: Cli) -> Result<Value> {
    let config = load_config(cli.config.as_deref())?;

    match cli.command {
        Command::Measure {
            document,
            figure,
            unit,
        } => {
            let doc = PatternDocument::load(&document)?;
            let fig = doc.require_figure(&figure)?;
            let measures = compute_measures_with(fig, &config.measure_options());
            let length = format_length(measures.figure_length_px, unit, doc.page.px_per_cm);
            let measures = to_json(&measures)?;
            Ok(json!({
                "figureId": fig.id,
                "measures": measures,
                "figureLength": length,
            }))
        }
        Command::Bounds {
            document,
            figure,
            world,
        } => {
            let doc = PatternDocument::load(&document)?;
            let fig = doc.require_figure(&figure)?;
            let bb = if world { world_bounds(fig) } else { bounds(fig) };
            to_json(&bb)
        }
        Command::Offset {
            document,
            figure,
            cm,
            write,
        } => {
            let mut doc = PatternDocument::load(&document)?;
            let options = doc.offset_options(&config.offset_options());
            let seam = offset_figure_with(doc.require_figure(&figure)?, cm, &options)
                .with_context(|| format!("Failed to offset {}", figure))?;
            emit_figure(&mut doc, &document, seam, write)
        }
        Command::Mirror {
            document,
            figure,
            axis,
            at,
            write,
        } => {
            let mut doc = PatternDocument::load(&document)?;
            let fig = doc.require_figure(&figure)?;
            let axis = match (axis, at) {
                (Axis::Vertical, Some(x)) => MirrorAxis::vertical(x),
                (Axis::Vertical, None) => MirrorAxis::vertical_through_center(fig),
                (Axis::Horizontal, Some(y)) => MirrorAxis::horizontal(y),
                (Axis::Horizontal, None) => MirrorAxis::horizontal_through_center(fig),
            };
            let mirrored =
                mirror_figure(fig, &axis).with_context(|| format!("Failed to mirror {}", figure))?;
            emit_figure(&mut doc, &document, mirrored, write)
        }
        Command::Unfold {
            document,
            figure,
            apex,
            left,
            right,
            write,
        } => {
            let mut doc = PatternDocument::load(&document)?;
            let spec = DartSpec::new(apex, left, right);
            let flat = unfold_dart(doc.require_figure(&figure)?, &spec)
                .with_context(|| format!("Failed to unfold dart in {}", figure))?;
            emit_figure(&mut doc, &document, flat, write)
        }
        Command::Signature { document, figure } => {
            let doc = PatternDocument::load(&document)?;
            let fig = doc.require_figure(&figure)?;
            Ok(json!({ "figureId": fig.id, "signature": source_signature(fig) }))
        }
        Command::RefreshSeams { document, dry_run } => {
            let mut doc = PatternDocument::load(&document)?;
            if dry_run {
                let stale: Vec<&str> = doc.stale_seams().iter().map(|f| f.id.as_str()).collect();
                return Ok(json!({ "stale": stale }));
            }
            let refreshed = doc.refresh_seams(&config.offset_options())?;
            if !refreshed.is_empty() {
                doc.save(&document)?;
            }
            Ok(json!({ "refreshed": refreshed }))
        }
        Command::Snap {
            document,
            x,
            y,
            zoom,
            exclude_figure,
            exclude_node,
        } => {
            let doc = PatternDocument::load(&document)?;
            let exclude = exclude_figure.as_deref().zip(exclude_node.as_deref());
            let ctx = doc
                .snap_context(exclude, config.snapping, zoom)
                .with_tolerances(config.geometry);
            match snap(Point::new(x, y), &ctx) {
                Some(hit) => to_json(&hit),
                None => Ok(Value::Null),
            }
        }
    }
}
