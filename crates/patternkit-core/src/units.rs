//! Unit conversion utilities
//!
//! Figure geometry lives in canvas pixels. Pattern makers think in centimetres
//! (or inches), so seam allowances and measurements are converted through a
//! pixels-per-centimetre scale. Supports decimal and fractional inch parsing.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Canvas scale at 96 dpi.
pub const DEFAULT_PX_PER_CM: f64 = 96.0 / 2.54;

const CM_PER_INCH: f64 = 2.54;

/// Length unit used for display and input
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum LengthUnit {
    /// Centimetres
    #[default]
    Cm,
    /// Millimetres
    Mm,
    /// Inches
    In,
    /// Canvas pixels
    Px,
}

impl fmt::Display for LengthUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", unit_label(*self))
    }
}

impl FromStr for LengthUnit {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "cm" | "centimeter" | "centimetre" => Ok(Self::Cm),
            "mm" | "millimeter" | "millimetre" => Ok(Self::Mm),
            "in" | "inch" | "\"" => Ok(Self::In),
            "px" | "pixel" => Ok(Self::Px),
            _ => Err(format!("Unknown length unit: {}", s)),
        }
    }
}

/// Convert centimetres to canvas pixels
pub fn cm_to_px(cm: f64, px_per_cm: f64) -> f64 {
    cm * px_per_cm
}

/// Convert canvas pixels to centimetres
pub fn px_to_cm(px: f64, px_per_cm: f64) -> f64 {
    if px_per_cm == 0.0 {
        return 0.0;
    }
    px / px_per_cm
}

/// Convert a value in `unit` to canvas pixels
pub fn to_px(value: f64, unit: LengthUnit, px_per_cm: f64) -> f64 {
    match unit {
        LengthUnit::Cm => cm_to_px(value, px_per_cm),
        LengthUnit::Mm => cm_to_px(value / 10.0, px_per_cm),
        LengthUnit::In => cm_to_px(value * CM_PER_INCH, px_per_cm),
        LengthUnit::Px => value,
    }
}

/// Convert canvas pixels to a value in `unit`
pub fn from_px(px: f64, unit: LengthUnit, px_per_cm: f64) -> f64 {
    match unit {
        LengthUnit::Cm => px_to_cm(px, px_per_cm),
        LengthUnit::Mm => px_to_cm(px, px_per_cm) * 10.0,
        LengthUnit::In => px_to_cm(px, px_per_cm) / CM_PER_INCH,
        LengthUnit::Px => px,
    }
}

/// Format a pixel length for display in `unit`
///
/// Pixels are shown with one decimal, everything else with two.
pub fn format_length(px: f64, unit: LengthUnit, px_per_cm: f64) -> String {
    let value = from_px(px, unit, px_per_cm);
    match unit {
        LengthUnit::Px => format!("{:.1} {}", value, unit_label(unit)),
        _ => format!("{:.2} {}", value, unit_label(unit)),
    }
}

/// Parse a length string in `unit` to canvas pixels
///
/// Inches accept fractions ("1 1/2", "3/8").
pub fn parse_length(input: &str, unit: LengthUnit, px_per_cm: f64) -> Result<f64, String> {
    let input = input.trim();
    if input.is_empty() {
        return Ok(0.0);
    }

    let value = match unit {
        LengthUnit::In if input.contains('/') => parse_fractional(input)?,
        _ => input.parse::<f64>().map_err(|e| e.to_string())?,
    };

    Ok(to_px(value, unit, px_per_cm))
}

fn parse_fractional(input: &str) -> Result<f64, String> {
    let negative = input.starts_with('-');
    let body = input.trim_start_matches('-');
    let mut total = 0.0;

    for part in body.split_whitespace() {
        if part.contains('/') {
            let frac: Vec<&str> = part.split('/').collect();
            if frac.len() != 2 {
                return Err("Invalid fraction format".to_string());
            }
            let num = frac[0].parse::<f64>().map_err(|_| "Invalid numerator")?;
            let den = frac[1].parse::<f64>().map_err(|_| "Invalid denominator")?;
            if den == 0.0 {
                return Err("Division by zero".to_string());
            }
            total += num / den;
        } else {
            total += part.parse::<f64>().map_err(|_| "Invalid number part")?;
        }
    }

    Ok(if negative { -total } else { total })
}

/// Short label for a unit
pub fn unit_label(unit: LengthUnit) -> &'static str {
    match unit {
        LengthUnit::Cm => "cm",
        LengthUnit::Mm => "mm",
        LengthUnit::In => "in",
        LengthUnit::Px => "px",
    }
}
