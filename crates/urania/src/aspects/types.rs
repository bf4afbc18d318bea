use crate::ephemeris::BodyId;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Aspect kinds, in detection order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AspectKind {
    Conjunction,
    Sextile,
    Square,
    Trine,
    Quincunx,
    Opposition,
}

impl AspectKind {
    pub const ALL: [AspectKind; 6] = [
        AspectKind::Conjunction,
        AspectKind::Sextile,
        AspectKind::Square,
        AspectKind::Trine,
        AspectKind::Quincunx,
        AspectKind::Opposition,
    ];

    /// Exact angle in degrees.
    pub fn angle(self) -> f64 {
        match self {
            AspectKind::Conjunction => 0.0,
            AspectKind::Sextile => 60.0,
            AspectKind::Square => 90.0,
            AspectKind::Trine => 120.0,
            AspectKind::Quincunx => 150.0,
            AspectKind::Opposition => 180.0,
        }
    }

    /// Trine and sextile.
    pub fn is_harmonious(self) -> bool {
        matches!(self, AspectKind::Trine | AspectKind::Sextile)
    }

    /// Square and opposition.
    pub fn is_hard(self) -> bool {
        matches!(self, AspectKind::Square | AspectKind::Opposition)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            AspectKind::Conjunction => "conjunction",
            AspectKind::Sextile => "sextile",
            AspectKind::Square => "square",
            AspectKind::Trine => "trine",
            AspectKind::Quincunx => "quincunx",
            AspectKind::Opposition => "opposition",
        }
    }
}

impl fmt::Display for AspectKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An aspect between two bodies.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Aspect {
    pub first: BodyId,
    pub second: BodyId,
    pub kind: AspectKind,
    /// Deviation from the exact angle, degrees
    pub orb: f64,
    /// Separation is moving toward the exact angle
    pub applying: bool,
    /// Within 0.1 degrees of exact
    pub is_exact: bool,
}
