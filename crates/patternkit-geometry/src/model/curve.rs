use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Primitive curve shapes a styled curve can be built from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TechnicalCurveId {
    /// Gentle single bow, e.g. hem lines and waist seams.
    ShallowArc,
    /// Pronounced single bow, e.g. sleeve caps.
    DeepArc,
    /// Symmetric double bend.
    SCurve,
    /// Straight run ending in a tight hook, e.g. armholes and crotch curves.
    JCurve,
    /// Asymmetric double bend with a long lead-in, e.g. hip lines.
    Ogee,
}

impl TechnicalCurveId {
    pub const ALL: [TechnicalCurveId; 5] = [
        TechnicalCurveId::ShallowArc,
        TechnicalCurveId::DeepArc,
        TechnicalCurveId::SCurve,
        TechnicalCurveId::JCurve,
        TechnicalCurveId::Ogee,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            TechnicalCurveId::ShallowArc => "shallow-arc",
            TechnicalCurveId::DeepArc => "deep-arc",
            TechnicalCurveId::SCurve => "s-curve",
            TechnicalCurveId::JCurve => "j-curve",
            TechnicalCurveId::Ogee => "ogee",
        }
    }
}

impl fmt::Display for TechnicalCurveId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TechnicalCurveId {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        TechnicalCurveId::ALL
            .iter()
            .copied()
            .find(|id| id.as_str() == s.trim())
            .ok_or_else(|| format!("Unknown technical curve: {}", s))
    }
}

/// Parameters that place a technical template onto a base figure.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StyledCurveParams {
    /// Bulge as a ratio of the chord length.
    pub height: f64,
    /// Asymmetry in [-1, 1]; positive pushes the bulge towards the end node.
    pub bias: f64,
    #[serde(default)]
    pub flip_x: bool,
    #[serde(default)]
    pub flip_y: bool,
    /// Extra rotation about the first node, in degrees.
    #[serde(default)]
    pub rotation_deg: f64,
}

impl Default for StyledCurveParams {
    fn default() -> Self {
        Self {
            height: 0.25,
            bias: 0.0,
            flip_x: false,
            flip_y: false,
            rotation_deg: 0.0,
        }
    }
}

/// Design intent bound to a technical curve.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StyledCurveData {
    pub semantic_id: String,
    pub technical_id: TechnicalCurveId,
    #[serde(default)]
    pub params: StyledCurveParams,
}

/// The semantic/technical pair a curve was last generated from.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CurveOrigin {
    pub semantic_id: String,
    pub technical_id: TechnicalCurveId,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CurveType {
    Styled,
    Custom,
}
