//! House cusps and planet-to-house assignment.

use crate::error::AstroError;
use crate::ephemeris::{Ephemeris, GeoLocation, HouseSystem};
use crate::positions::BodyPosition;
use crate::zodiac::{normalize_degrees, sign_position, ZodiacSign};
use log::warn;
use serde::{Deserialize, Serialize};

/// Latitude beyond which semi-arc systems are not attempted.
pub const POLAR_LATITUDE: f64 = 66.56;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HouseCusp {
    /// 1-12
    pub number: u8,
    pub longitude: f64,
    pub sign: ZodiacSign,
    pub degree: f64,
}

/// Twelve cusps for one chart.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HouseSet {
    /// System the caller asked for
    pub requested: HouseSystem,
    /// System the cusps were actually built with
    pub system: HouseSystem,
    pub cusps: Vec<HouseCusp>,
    /// True when the requested system failed and whole-sign houses from the
    /// Sun's sign were substituted
    pub fallback: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fallback_reason: Option<String>,
}

impl HouseSet {
    fn from_longitudes(requested: HouseSystem, system: HouseSystem, longitudes: &[f64; 12]) -> Self {
        let cusps = longitudes
            .iter()
            .enumerate()
            .map(|(i, lon)| {
                let longitude = normalize_degrees(*lon);
                let (sign, degree) = sign_position(longitude);
                HouseCusp {
                    number: i as u8 + 1,
                    longitude,
                    sign,
                    degree,
                }
            })
            .collect();
        Self {
            requested,
            system,
            cusps,
            fallback: false,
            fallback_reason: None,
        }
    }

    /// Whole-sign houses with house 1 at 0° of the Sun's sign.
    pub fn whole_sign_from_sun(requested: HouseSystem, sun_longitude: f64, reason: String) -> Self {
        let (sun_sign, _) = sign_position(sun_longitude);
        let start = sun_sign.start_longitude();
        let mut longitudes = [0.0; 12];
        for (i, lon) in longitudes.iter_mut().enumerate() {
            *lon = normalize_degrees(start + 30.0 * i as f64);
        }
        let mut set = Self::from_longitudes(requested, HouseSystem::WholeSign, &longitudes);
        set.fallback = true;
        set.fallback_reason = Some(reason);
        set
    }

    pub fn longitudes(&self) -> Vec<f64> {
        self.cusps.iter().map(|c| c.longitude).collect()
    }

    pub fn cusp(&self, number: u8) -> Option<&HouseCusp> {
        self.cusps.iter().find(|c| c.number == number)
    }

    /// House containing `longitude`.
    pub fn house_of(&self, longitude: f64) -> Option<u8> {
        house_for_longitude(longitude, &self.longitudes())
    }
}

/// Cusps are usable when all are finite and the forward arcs between
/// consecutive cusps go once around the circle.
pub fn cusps_are_sequential(cusps: &[f64]) -> bool {
    if cusps.len() != 12 || cusps.iter().any(|c| !c.is_finite()) {
        return false;
    }
    let total: f64 = (0..12)
        .map(|i| normalize_degrees(cusps[(i + 1) % 12] - cusps[i]))
        .sum();
    (total - 360.0).abs() < 1e-6
}

/// House whose cusp was most recently passed going forward from each cusp
/// to `longitude`. Handles the house that wraps through 0°.
pub fn house_for_longitude(longitude: f64, cusps: &[f64]) -> Option<u8> {
    let lon = normalize_degrees(longitude);
    cusps
        .iter()
        .enumerate()
        .map(|(i, cusp)| (i, normalize_degrees(lon - cusp)))
        .min_by(|a, b| a.1.total_cmp(&b.1))
        .map(|(i, _)| i as u8 + 1)
}

/// Stamp every position with its house number.
pub fn assign_houses(positions: &mut [BodyPosition], houses: &HouseSet) {
    let cusps = houses.longitudes();
    for position in positions.iter_mut() {
        position.house = house_for_longitude(position.longitude, &cusps);
    }
}

/// Computes cusps through a provider, degrading to whole-sign houses.
#[derive(Debug, Clone, Copy, Default)]
pub struct HouseCalculator {
    system: HouseSystem,
}

impl HouseCalculator {
    pub fn new(system: HouseSystem) -> Self {
        Self { system }
    }

    pub fn system(&self) -> HouseSystem {
        self.system
    }

    /// Cusps at `jd_ut`, or `None` when the birth time is unknown.
    ///
    /// Invalid input fails. Engine limitations (polar latitude, unsupported
    /// system, non-finite output) fall back to whole-sign houses from the
    /// Sun's sign.
    pub fn calculate<E: Ephemeris + ?Sized>(
        &self,
        eph: &E,
        jd_ut: Option<f64>,
        location: GeoLocation,
        sun_longitude: f64,
    ) -> Result<Option<HouseSet>, AstroError> {
        let Some(jd_ut) = jd_ut else {
            return Ok(None);
        };

        if self.system.fails_at_polar_latitudes() && location.lat.abs() > POLAR_LATITUDE {
            let reason = format!(
                "{} houses are undefined at latitude {:.2}",
                self.system, location.lat
            );
            warn!("{}; using whole-sign houses", reason);
            return Ok(Some(HouseSet::whole_sign_from_sun(
                self.system,
                sun_longitude,
                reason,
            )));
        }

        let reason = match eph.houses(jd_ut, location, self.system) {
            Ok(cusps) if cusps_are_sequential(&cusps) => {
                return Ok(Some(HouseSet::from_longitudes(self.system, self.system, &cusps)))
            }
            Ok(_) => "engine returned cusps that are not sequential".to_string(),
            Err(e) if e.is_input_error() => return Err(e),
            Err(e) => e.to_string(),
        };
        warn!(
            "{} houses failed at JD {}: {}; using whole-sign houses",
            self.system, jd_ut, reason
        );
        Ok(Some(HouseSet::whole_sign_from_sun(
            self.system,
            sun_longitude,
            reason,
        )))
    }
}
