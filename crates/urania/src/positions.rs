//! Body positions mapped onto the zodiac.

use crate::error::AstroError;
use crate::ephemeris::{BodyId, CalcFlags, Ephemeris, RawPosition};
use crate::zodiac::{normalize_degrees, sign_position, ZodiacSign};
use log::warn;
use serde::{Deserialize, Serialize};

/// Mean regression of the lunar nodes, degrees per day.
const MEAN_NODE_MOTION: f64 = 0.052_953_808_3;

/// A body's position at one instant.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BodyPosition {
    pub body: BodyId,
    /// Ecliptic longitude, [0, 360)
    pub longitude: f64,
    pub latitude: f64,
    /// Distance in AU
    pub distance: f64,
    /// Daily motion in longitude; negative means retrograde
    pub speed: f64,
    pub sign: ZodiacSign,
    /// Degree within sign, [0, 30)
    pub degree: f64,
    pub retrograde: bool,
    /// House number 1-12, only when the birth time is known
    pub house: Option<u8>,
}

impl BodyPosition {
    pub fn from_raw(body: BodyId, raw: RawPosition) -> Result<Self, AstroError> {
        if !raw.longitude.is_finite() || !raw.speed.is_finite() {
            return Err(AstroError::CalculationFailed {
                body,
                jd_ut: f64::NAN,
                message: "engine returned a non-finite longitude or speed".to_string(),
            });
        }
        let longitude = normalize_degrees(raw.longitude);
        let (sign, degree) = sign_position(longitude);
        Ok(Self {
            body,
            longitude,
            latitude: raw.latitude,
            distance: raw.distance,
            speed: raw.speed,
            sign,
            degree,
            retrograde: raw.speed < 0.0,
            house: None,
        })
    }

    /// Fixed position with no motion, used for natal points in transit
    /// matching and in tests.
    pub fn stationary(body: BodyId, longitude: f64) -> Self {
        let longitude = normalize_degrees(longitude);
        let (sign, degree) = sign_position(longitude);
        Self {
            body,
            longitude,
            latitude: 0.0,
            distance: 0.0,
            speed: 0.0,
            sign,
            degree,
            retrograde: false,
            house: None,
        }
    }

    /// The south node mirrors the north node and always moves backward.
    /// A stationary north node lends the mean regression rate.
    pub fn south_node_from(north: &BodyPosition) -> Self {
        let longitude = normalize_degrees(north.longitude + 180.0);
        let (sign, degree) = sign_position(longitude);
        let speed = if north.speed == 0.0 {
            -MEAN_NODE_MOTION
        } else {
            -north.speed.abs()
        };
        Self {
            body: BodyId::SouthNode,
            longitude,
            latitude: -north.latitude,
            distance: north.distance,
            speed,
            sign,
            degree,
            retrograde: true,
            house: None,
        }
    }
}

/// Resolve `bodies` at `jd_ut`, in the order given.
///
/// The south node is derived from the north node rather than asked of the
/// engine. Chiron needs asteroid tables; when the engine cannot provide it
/// the body is skipped with a warning instead of failing the chart.
pub fn resolve_positions<E: Ephemeris + ?Sized>(
    eph: &E,
    jd_ut: f64,
    bodies: &[BodyId],
) -> Result<Vec<BodyPosition>, AstroError> {
    resolve_positions_with_flags(eph, jd_ut, bodies, eph.default_flags())
}

pub fn resolve_positions_with_flags<E: Ephemeris + ?Sized>(
    eph: &E,
    jd_ut: f64,
    bodies: &[BodyId],
    flags: CalcFlags,
) -> Result<Vec<BodyPosition>, AstroError> {
    let mut positions = Vec::with_capacity(bodies.len());
    let mut north: Option<BodyPosition> = None;

    for &body in bodies {
        if body == BodyId::SouthNode {
            let north_node = match &north {
                Some(n) => n.clone(),
                None => {
                    let n = compute(eph, jd_ut, BodyId::NorthNode, flags)?;
                    north = Some(n.clone());
                    n
                }
            };
            positions.push(BodyPosition::south_node_from(&north_node));
            continue;
        }

        let position = match compute(eph, jd_ut, body, flags) {
            Ok(p) => p,
            Err(AstroError::CalculationFailed { message, .. }) if body == BodyId::Chiron => {
                warn!("Chiron unavailable at JD {}: {}", jd_ut, message);
                continue;
            }
            Err(e) => return Err(e),
        };
        if body == BodyId::NorthNode {
            north = Some(position.clone());
        }
        positions.push(position);
    }

    Ok(positions)
}

fn compute<E: Ephemeris + ?Sized>(
    eph: &E,
    jd_ut: f64,
    body: BodyId,
    flags: CalcFlags,
) -> Result<BodyPosition, AstroError> {
    let raw = eph.calc_body(jd_ut, body, flags)?;
    BodyPosition::from_raw(body, raw).map_err(|e| match e {
        AstroError::CalculationFailed { body, message, .. } => {
            AstroError::CalculationFailed { body, jd_ut, message }
        }
        other => other,
    })
}

/// Find a body in a position list.
pub fn find(positions: &[BodyPosition], body: BodyId) -> Option<&BodyPosition> {
    positions.iter().find(|p| p.body == body)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn raw(longitude: f64, speed: f64) -> RawPosition {
        RawPosition {
            longitude,
            latitude: 1.5,
            distance: 1.0,
            speed,
        }
    }

    #[test]
    fn test_from_raw_normalizes_and_flags_retrograde() {
        let p = BodyPosition::from_raw(BodyId::Mercury, raw(-10.0, -0.3)).unwrap();
        assert!((p.longitude - 350.0).abs() < 1e-9);
        assert_eq!(p.sign, ZodiacSign::Pisces);
        assert!(p.retrograde);
        assert_eq!(p.house, None);

        let p = BodyPosition::from_raw(BodyId::Mars, raw(45.0, 0.0)).unwrap();
        assert!(!p.retrograde);
    }

    #[test]
    fn test_from_raw_rejects_nan() {
        assert!(BodyPosition::from_raw(BodyId::Sun, raw(f64::NAN, 1.0)).is_err());
        assert!(BodyPosition::from_raw(BodyId::Sun, raw(10.0, f64::INFINITY)).is_err());
    }

    #[test]
    fn test_south_node_derivation() {
        let north = BodyPosition::from_raw(BodyId::NorthNode, raw(200.0, 0.05)).unwrap();
        let south = BodyPosition::south_node_from(&north);
        assert!((south.longitude - 20.0).abs() < 1e-9);
        assert!(south.retrograde);
        assert!(south.speed < 0.0);
        assert_eq!(south.latitude, -1.5);
    }

    #[test]
    fn test_south_node_of_stationary_north_node_is_retrograde() {
        let north = BodyPosition::from_raw(BodyId::NorthNode, raw(10.0, 0.0)).unwrap();
        let south = BodyPosition::south_node_from(&north);
        assert!(south.retrograde);
        assert!(south.speed < 0.0);
        assert!(south.speed.is_sign_negative());
        assert!((south.longitude - 190.0).abs() < 1e-9);

        let north = BodyPosition::stationary(BodyId::NorthNode, 10.0);
        assert!(BodyPosition::south_node_from(&north).speed < 0.0);
    }
}
