use crate::aspects::orbs::{OrbContext, OrbTable};
use crate::aspects::types::{Aspect, AspectKind};
use crate::ephemeris::BodyId;
use crate::positions::BodyPosition;
use crate::zodiac::signed_delta;

/// Orb below which an aspect counts as exact, degrees.
const EXACT_ORB: f64 = 0.1;

/// Result of testing one pair of longitudes.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AspectMatch {
    pub kind: AspectKind,
    pub orb: f64,
    pub applying: bool,
    pub is_exact: bool,
}

/// Find the tightest aspect between two longitudes within `orb_limit`.
///
/// Adjacent aspects can both admit a separation only at the 15 degree orb
/// ceiling; the smaller orb wins, then the earlier kind.
pub fn match_aspect(
    lon1: f64,
    lon2: f64,
    speed1: f64,
    speed2: f64,
    orb_limit: f64,
) -> Option<AspectMatch> {
    let separation = signed_delta(lon1, lon2).abs();
    AspectKind::ALL
        .iter()
        .map(|kind| (*kind, (separation - kind.angle()).abs()))
        .filter(|(_, orb)| *orb <= orb_limit)
        .min_by(|a, b| a.1.total_cmp(&b.1))
        .map(|(kind, orb)| AspectMatch {
            kind,
            orb,
            applying: is_applying(lon1, lon2, speed1, speed2, kind.angle()),
            is_exact: orb < EXACT_ORB,
        })
}

/// True when the separation is moving toward `aspect_angle`.
///
/// Uses the instantaneous rate of the unsigned separation `d`:
/// `d' = sign(lon1 - lon2) * (speed1 - speed2)`. The aspect is applying
/// iff `(d - angle) * d' < 0`. Zero relative motion, or a separation sitting
/// exactly on the angle, is not applying.
pub fn is_applying(lon1: f64, lon2: f64, speed1: f64, speed2: f64, aspect_angle: f64) -> bool {
    let delta = signed_delta(lon1, lon2);
    let separation = delta.abs();
    // |delta| has no derivative at a perfect conjunction
    let rate = if delta == 0.0 {
        0.0
    } else {
        delta.signum() * (speed1 - speed2)
    };
    (separation - aspect_angle) * rate < 0.0
}

/// Aspect detection for natal charts and transits.
#[derive(Debug, Clone, Copy)]
pub struct AspectCalculator {
    orbs: OrbTable,
    context: OrbContext,
}

impl AspectCalculator {
    pub fn new(orbs: OrbTable, context: OrbContext) -> Self {
        Self { orbs, context }
    }

    pub fn natal() -> Self {
        Self::new(OrbTable::natal(), OrbContext::Natal)
    }

    pub fn transit() -> Self {
        Self::new(OrbTable::transit(), OrbContext::Transit)
    }

    pub fn orbs(&self) -> &OrbTable {
        &self.orbs
    }

    pub fn context(&self) -> OrbContext {
        self.context
    }

    /// Aspects between every unordered pair of `positions`.
    ///
    /// The node axis is skipped: the two nodes are always in opposition.
    pub fn natal_aspects(&self, positions: &[BodyPosition]) -> Vec<Aspect> {
        let mut aspects = Vec::new();
        for (i, a) in positions.iter().enumerate() {
            for b in &positions[i + 1..] {
                if a.body.is_node() && b.body.is_node() {
                    continue;
                }
                let limit = self.orbs.pair_orb(a.body, b.body);
                if let Some(m) = match_aspect(a.longitude, b.longitude, a.speed, b.speed, limit) {
                    aspects.push(to_aspect(a.body, b.body, m));
                }
            }
        }
        aspects
    }

    /// Aspects from one moving body to fixed natal points.
    ///
    /// Natal points do not move; the orb is the transiting body's.
    pub fn transit_aspects(&self, transiting: &BodyPosition, natal: &[BodyPosition]) -> Vec<Aspect> {
        let limit = self.orbs.orb_for(transiting.body);
        natal
            .iter()
            .filter_map(|point| {
                match_aspect(
                    transiting.longitude,
                    point.longitude,
                    transiting.speed,
                    0.0,
                    limit,
                )
                .map(|m| to_aspect(transiting.body, point.body, m))
            })
            .collect()
    }
}

impl Default for AspectCalculator {
    fn default() -> Self {
        Self::natal()
    }
}

fn to_aspect(first: BodyId, second: BodyId, m: AspectMatch) -> Aspect {
    Aspect {
        first,
        second,
        kind: m.kind,
        orb: m.orb,
        applying: m.applying,
        is_exact: m.is_exact,
    }
}
