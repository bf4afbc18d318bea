//! Pure-Rust mean-elements provider.
//!
//! Circular, coplanar heliocentric orbits with J2000 mean longitudes and
//! mean daily motions. Good to a few degrees for the planets; the geocentric
//! projection still gives genuine retrograde loops. No data files, no native
//! engine.

use crate::error::AstroError;
use crate::ephemeris::adapter::Ephemeris;
use crate::ephemeris::types::{
    BodyId, CalcFlags, EngineMode, EphemerisFile, GeoLocation, HouseSystem, RawPosition,
};
use crate::time::{ensure_supported_jd, J2000_JD};
use crate::zodiac::{normalize_degrees, signed_delta};

/// Mean obliquity of the ecliptic at J2000, degrees.
const OBLIQUITY: f64 = 23.439_291_1;
/// Step for the central-difference speed, days.
const SPEED_STEP: f64 = 0.5;
/// Mean Earth-Moon distance, AU.
const MOON_DISTANCE_AU: f64 = 0.002_570;

/// (mean longitude at J2000, mean daily motion, semi-major axis in AU)
struct Orbit(f64, f64, f64);

const EARTH: Orbit = Orbit(100.464_35, 0.985_609_10, 1.0);

fn orbit(body: BodyId) -> Option<Orbit> {
    Some(match body {
        BodyId::Mercury => Orbit(252.250_84, 4.092_334_45, 0.387_098),
        BodyId::Venus => Orbit(181.979_73, 1.602_130_34, 0.723_332),
        BodyId::Mars => Orbit(355.453_32, 0.524_033_04, 1.523_679),
        BodyId::Jupiter => Orbit(34.404_38, 0.083_086_76, 5.2026),
        BodyId::Saturn => Orbit(49.944_32, 0.033_460_63, 9.554_91),
        BodyId::Uranus => Orbit(313.232_18, 0.011_731_29, 19.218_45),
        BodyId::Neptune => Orbit(304.880_03, 0.005_981_06, 30.110_39),
        BodyId::Pluto => Orbit(238.928_81, 0.003_960_00, 39.544),
        BodyId::Chiron => Orbit(251.0, 0.019_548, 13.65),
        _ => return None,
    })
}

fn heliocentric(o: &Orbit, days: f64) -> (f64, f64) {
    let lon = normalize_degrees(o.0 + o.1 * days).to_radians();
    (o.2 * lon.cos(), o.2 * lon.sin())
}

/// Geocentric (longitude, distance) at `days` since J2000.
fn geocentric(body: BodyId, days: f64) -> Option<(f64, f64)> {
    match body {
        BodyId::Sun => Some((normalize_degrees(280.460 + 0.985_647_4 * days), 1.0)),
        BodyId::Moon => Some((
            normalize_degrees(218.316 + 13.176_396 * days),
            MOON_DISTANCE_AU,
        )),
        BodyId::NorthNode => Some((normalize_degrees(125.044_52 - 0.052_953_808_3 * days), 0.0)),
        BodyId::SouthNode => None,
        other => {
            let planet = orbit(other)?;
            let (px, py) = heliocentric(&planet, days);
            let (ex, ey) = heliocentric(&EARTH, days);
            let (dx, dy) = (px - ex, py - ey);
            Some((normalize_degrees(dy.atan2(dx).to_degrees()), dx.hypot(dy)))
        }
    }
}

/// Mean-elements ephemeris. Stateless; cheap to construct.
#[derive(Debug, Clone, Copy, Default)]
pub struct MeanElementsEphemeris;

impl MeanElementsEphemeris {
    pub fn new() -> Self {
        MeanElementsEphemeris
    }

    /// Ascendant and midheaven longitudes.
    pub fn angles(jd_ut: f64, location: GeoLocation) -> (f64, f64) {
        let gmst = 280.460_618_37 + 360.985_647_366_29 * (jd_ut - J2000_JD);
        let ramc = normalize_degrees(gmst + location.lon).to_radians();
        let eps = OBLIQUITY.to_radians();
        let phi = location.lat.to_radians();

        let mc = ramc.sin().atan2(ramc.cos() * eps.cos());
        let asc = ramc
            .cos()
            .atan2(-(ramc.sin() * eps.cos() + phi.tan() * eps.sin()));
        (
            normalize_degrees(asc.to_degrees()),
            normalize_degrees(mc.to_degrees()),
        )
    }
}

impl Ephemeris for MeanElementsEphemeris {
    fn mode(&self) -> EngineMode {
        EngineMode::MeanElements
    }

    fn default_flags(&self) -> CalcFlags {
        CalcFlags::SPEED
    }

    fn data_files(&self) -> &[EphemerisFile] {
        &[]
    }

    fn calc_body(&self, jd_ut: f64, body: BodyId, _flags: CalcFlags) -> Result<RawPosition, AstroError> {
        ensure_supported_jd(jd_ut)?;
        let days = jd_ut - J2000_JD;
        let derived = || AstroError::CalculationFailed {
            body,
            jd_ut,
            message: "body is derived, not computed by the engine".to_string(),
        };
        let (longitude, distance) = geocentric(body, days).ok_or_else(derived)?;
        let (before, _) = geocentric(body, days - SPEED_STEP).ok_or_else(derived)?;
        let (after, _) = geocentric(body, days + SPEED_STEP).ok_or_else(derived)?;
        Ok(RawPosition {
            longitude,
            latitude: 0.0,
            distance,
            speed: signed_delta(after, before) / (2.0 * SPEED_STEP),
        })
    }

    fn houses(
        &self,
        jd_ut: f64,
        location: GeoLocation,
        system: HouseSystem,
    ) -> Result<[f64; 12], AstroError> {
        ensure_supported_jd(jd_ut)?;
        if location.lat.abs() >= 89.0 {
            return Err(AstroError::HouseUnavailable {
                system,
                latitude: location.lat,
                reason: "ascendant undefined at the pole".to_string(),
            });
        }
        let (asc, mc) = Self::angles(jd_ut, location);
        let mut cusps = [0.0; 12];
        match system {
            HouseSystem::Equal => {
                for (i, cusp) in cusps.iter_mut().enumerate() {
                    *cusp = normalize_degrees(asc + 30.0 * i as f64);
                }
            }
            HouseSystem::WholeSign => {
                let start = (asc / 30.0).floor() * 30.0;
                for (i, cusp) in cusps.iter_mut().enumerate() {
                    *cusp = normalize_degrees(start + 30.0 * i as f64);
                }
            }
            HouseSystem::Porphyry => {
                let ic = normalize_degrees(mc + 180.0);
                let first = normalize_degrees(ic - asc) / 3.0;
                let second = normalize_degrees(normalize_degrees(asc + 180.0) - ic) / 3.0;
                cusps[0] = asc;
                cusps[1] = normalize_degrees(asc + first);
                cusps[2] = normalize_degrees(asc + 2.0 * first);
                cusps[3] = ic;
                cusps[4] = normalize_degrees(ic + second);
                cusps[5] = normalize_degrees(ic + 2.0 * second);
                for i in 6..12 {
                    cusps[i] = normalize_degrees(cusps[i - 6] + 180.0);
                }
            }
            other => {
                return Err(AstroError::HouseUnavailable {
                    system: other,
                    latitude: location.lat,
                    reason: "not supported by the mean-elements provider".to_string(),
                })
            }
        }
        Ok(cusps)
    }
}
