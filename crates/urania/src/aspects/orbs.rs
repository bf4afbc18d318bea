use crate::error::AstroError;
use crate::ephemeris::{BodyClass, BodyId};
use serde::{Deserialize, Serialize};

/// Largest orb accepted from configuration, degrees.
pub const MAX_ORB: f64 = 15.0;

/// Whether aspects are measured within one chart or against a moving body.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OrbContext {
    Natal,
    Transit,
}

/// Orb limit per body class.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct OrbTable {
    pub luminaries: f64,
    pub personal: f64,
    pub social: f64,
    pub outer: f64,
}

impl OrbTable {
    /// Natal orbs: a fixed chart tolerates wide orbs.
    pub const fn natal() -> Self {
        Self {
            luminaries: 10.0,
            personal: 8.0,
            social: 7.0,
            outer: 6.0,
        }
    }

    /// Transit orbs: tight, to keep day-granularity triggers meaningful.
    pub const fn transit() -> Self {
        Self {
            luminaries: 2.5,
            personal: 2.0,
            social: 1.5,
            outer: 1.0,
        }
    }

    pub fn for_context(context: OrbContext) -> Self {
        match context {
            OrbContext::Natal => Self::natal(),
            OrbContext::Transit => Self::transit(),
        }
    }

    pub fn for_class(&self, class: BodyClass) -> f64 {
        match class {
            BodyClass::Luminary => self.luminaries,
            BodyClass::Personal => self.personal,
            BodyClass::Social => self.social,
            BodyClass::Outer => self.outer,
        }
    }

    pub fn orb_for(&self, body: BodyId) -> f64 {
        self.for_class(body.class())
    }

    /// Orb for a natal pair: the wider of the two.
    pub fn pair_orb(&self, a: BodyId, b: BodyId) -> f64 {
        self.orb_for(a).max(self.orb_for(b))
    }

    /// Largest orb in the table.
    pub fn widest(&self) -> f64 {
        self.luminaries
            .max(self.personal)
            .max(self.social)
            .max(self.outer)
    }

    /// Every orb must be finite and within (0, 15].
    pub fn validate(&self) -> Result<(), AstroError> {
        for (name, value) in [
            ("luminaries", self.luminaries),
            ("personal", self.personal),
            ("social", self.social),
            ("outer", self.outer),
        ] {
            if !value.is_finite() || value <= 0.0 || value > MAX_ORB {
                return Err(AstroError::invalid(
                    "orbs",
                    format!("{name} orb must be within (0, {MAX_ORB}], got {value}"),
                ));
            }
        }
        Ok(())
    }
}
