//! # PatternKit Core
//!
//! Core types shared by every PatternKit crate: the error taxonomy returned by
//! the geometry engines and the unit conversions between canvas pixels and
//! pattern units.

pub mod error;
pub mod units;

pub use error::{
    Error, InvalidDartSpecError, MalformedFigureError, Result, UnsupportedGeometryError,
};
pub use units::{LengthUnit, DEFAULT_PX_PER_CM};
