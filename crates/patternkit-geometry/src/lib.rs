//! # PatternKit Geometry
//!
//! The vector pattern-geometry engine: the data model for a drawn pattern
//! piece (a figure of nodes and edges) and the algorithms that derive
//! geometry from it.
//!
//! ## Components
//!
//! - **Primitives**: vector math, line and cubic Bézier evaluation, arc length
//! - **Model**: figures, nodes, edges, validation and traversal
//! - **Styled curves**: named technical curve templates composited onto a figure
//! - **Measures**: lengths, angles, circle/rectangle/curve metrics
//! - **Snapping**: ranked snap targets for a pointer position
//! - **Bounds**: axis-aligned bounding boxes
//! - **Offset**: seam-allowance figures
//! - **Mirror**: reflection across an axis
//! - **Dart**: dart unfolding
//! - **Signature / Cache**: content hashes and the memo cache keyed by them
//!
//! ## Architecture
//!
//! ```text
//! Figure (nodes + edges + style + transform)
//!   ├── validate / ordered_edges / NodeIndex
//!   └── engines (pure functions, return new values)
//!         ├── styled_curves   Figure -> Figure
//!         ├── offset          Figure -> Figure (seam)
//!         ├── mirror          Figure -> Figure
//!         ├── dart            Figure -> Figure
//!         ├── measures        Figure -> FigureMeasures
//!         ├── bounds          Figure -> BoundingBox
//!         └── snapping        SnapContext -> SnapResult
//!
//! GeometryCache (figure id, operation, signature) -> result
//! ```
//!
//! ## Usage
//!
//! ```rust
//! use patternkit_geometry::{compute_measures, offset_figure, Figure};
//!
//! let bodice = Figure::rectangle("bodice", 0.0, 0.0, 200.0, 120.0);
//! let measures = compute_measures(&bodice);
//! assert_eq!(measures.rectangle.map(|r| r.width_px), Some(200.0));
//!
//! let seam = offset_figure(&bodice, 1.0).unwrap();
//! assert!(seam.is_seam());
//! ```

pub mod bounds;
pub mod cache;
pub mod dart;
pub mod measures;
pub mod mirror;
pub mod model;
pub mod offset;
pub mod primitives;
pub mod signature;
pub mod snapping;
pub mod styled_curves;

pub use bounds::{bounds, world_bounds, BoundingBox};
pub use cache::{CacheKey, CacheStats, GeometryCache, OperationKind};
pub use dart::{unfold_dart, DartSpec};
pub use measures::{
    compute_measures, compute_measures_with, CircleMeasures, CurveMeasures, EdgeMeasure,
    FigureMeasures, MeasureOptions, RectangleMeasures,
};
pub use mirror::{mirror_figure, MirrorAxis};
pub use model::{
    new_figure_id, rotate_point, validate, CurveOrigin, CurveType, Derivation, DrawingTool,
    EdgeKind, Figure, FigureEdge, FigureNode, FigureSnapshot, FigureStyle, FigureTransform,
    NodeIndex, NodeMode, Point, StyledCurveData, StyledCurveParams, TechnicalCurveId,
};
pub use offset::{is_stale, offset_figure, offset_figure_with, refresh_seam, OffsetOptions};
pub use primitives::{Segment, Tolerances};
pub use signature::{signature_hash, source_signature};
pub use snapping::{
    snap, snap_candidates, Guide, GuideLine, SnapContext, SnapOptions, SnapResult,
    SnapTargetKind,
};
pub use styled_curves::{
    apply_styled_curve, capture_custom, is_custom_dirty, refresh_custom_dirty, revert_to_custom,
    semantic_preset, semantic_presets, switch_technical, switch_to_custom, update_params,
    SemanticPreset,
};

pub use patternkit_core::{Error, Result};
