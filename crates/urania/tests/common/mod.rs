#![allow(dead_code)]

use std::collections::HashMap;
use urania::ephemeris::{EphemerisFile, RawPosition};
use urania::time::ensure_supported_jd;
use urania::zodiac::normalize_degrees;
use urania::{AstroError, BodyId, CalcFlags, EngineMode, Ephemeris, GeoLocation, HouseSystem};

/// Provider with linear motion: `lon(jd) = lon0 + speed * (jd - epoch)`.
pub struct StubEphemeris {
    epoch: f64,
    bodies: HashMap<BodyId, (f64, f64)>,
    cusps: Option<[f64; 12]>,
}

impl StubEphemeris {
    pub fn new(epoch: f64) -> Self {
        Self {
            epoch,
            bodies: HashMap::new(),
            cusps: None,
        }
    }

    pub fn with_body(mut self, body: BodyId, longitude: f64, speed: f64) -> Self {
        self.bodies.insert(body, (longitude, speed));
        self
    }

    pub fn with_cusps(mut self, cusps: [f64; 12]) -> Self {
        self.cusps = Some(cusps);
        self
    }
}

impl Ephemeris for StubEphemeris {
    fn mode(&self) -> EngineMode {
        EngineMode::Moshier
    }

    fn default_flags(&self) -> CalcFlags {
        CalcFlags::MOSEPH | CalcFlags::SPEED
    }

    fn data_files(&self) -> &[EphemerisFile] {
        &[]
    }

    fn calc_body(&self, jd_ut: f64, body: BodyId, _flags: CalcFlags) -> Result<RawPosition, AstroError> {
        ensure_supported_jd(jd_ut)?;
        let (lon0, speed) = self.bodies.get(&body).copied().ok_or_else(|| {
            AstroError::CalculationFailed {
                body,
                jd_ut,
                message: "not in stub".to_string(),
            }
        })?;
        Ok(RawPosition {
            longitude: normalize_degrees(lon0 + speed * (jd_ut - self.epoch)),
            latitude: 0.0,
            distance: 1.0,
            speed,
        })
    }

    fn houses(&self, _jd_ut: f64, location: GeoLocation, system: HouseSystem) -> Result<[f64; 12], AstroError> {
        self.cusps.ok_or_else(|| AstroError::HouseUnavailable {
            system,
            latitude: location.lat,
            reason: "no cusps in stub".to_string(),
        })
    }
}

pub const EVEN_CUSPS: [f64; 12] = [
    15.0, 45.0, 75.0, 105.0, 135.0, 165.0, 195.0, 225.0, 255.0, 285.0, 315.0, 345.0,
];

/// JD of 2024-01-01 00:00 UT.
pub const JAN_2024: f64 = 2_460_310.5;

/// Transiting bodies placed so only Jupiter aspects a natal Sun at 100:
/// Jupiter trines it exactly four days after the epoch.
pub fn transit_stub() -> StubEphemeris {
    StubEphemeris::new(JAN_2024)
        .with_body(BodyId::Sun, 0.0, 1.0)
        .with_body(BodyId::Moon, 180.0, 13.0)
        .with_body(BodyId::Mercury, 300.0, -0.5)
        .with_body(BodyId::Venus, 320.0, 1.2)
        .with_body(BodyId::Mars, 25.0, 0.0)
        .with_body(BodyId::Jupiter, 218.0, 0.5)
        .with_body(BodyId::Saturn, 45.0, 0.0)
        .with_body(BodyId::Uranus, 140.0, 0.0)
        .with_body(BodyId::Neptune, 170.0, 0.0)
        .with_body(BodyId::Pluto, 200.0, 0.0)
}
