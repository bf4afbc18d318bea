//! Lunar phase, illumination and lunar day.

use crate::error::AstroError;
use crate::ephemeris::{BodyId, Ephemeris};
use crate::time::local_noon;
use crate::zodiac::{normalize_degrees, sign_position, ZodiacSign};
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Mean synodic month, days.
pub const SYNODIC_MONTH: f64 = 29.530_588_67;

/// Eight phases, each a 45° sector centred on its principal angle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LunarPhase {
    NewMoon,
    WaxingCrescent,
    FirstQuarter,
    WaxingGibbous,
    FullMoon,
    WaningGibbous,
    LastQuarter,
    WaningCrescent,
}

impl LunarPhase {
    /// Phase for a Sun-Moon elongation in degrees.
    pub fn from_angle(angle: f64) -> Self {
        let angle = normalize_degrees(angle);
        if !(22.5..337.5).contains(&angle) {
            LunarPhase::NewMoon
        } else if angle < 67.5 {
            LunarPhase::WaxingCrescent
        } else if angle < 112.5 {
            LunarPhase::FirstQuarter
        } else if angle < 157.5 {
            LunarPhase::WaxingGibbous
        } else if angle < 202.5 {
            LunarPhase::FullMoon
        } else if angle < 247.5 {
            LunarPhase::WaningGibbous
        } else if angle < 292.5 {
            LunarPhase::LastQuarter
        } else {
            LunarPhase::WaningCrescent
        }
    }

    pub fn key(self) -> &'static str {
        match self {
            LunarPhase::NewMoon => "new_moon",
            LunarPhase::WaxingCrescent => "waxing_crescent",
            LunarPhase::FirstQuarter => "first_quarter",
            LunarPhase::WaxingGibbous => "waxing_gibbous",
            LunarPhase::FullMoon => "full_moon",
            LunarPhase::WaningGibbous => "waning_gibbous",
            LunarPhase::LastQuarter => "last_quarter",
            LunarPhase::WaningCrescent => "waning_crescent",
        }
    }
}

impl fmt::Display for LunarPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LunarInfo {
    pub date: NaiveDate,
    pub timezone: String,
    pub jd_ut: f64,
    /// Local noon of `date`, in UTC
    pub sampled_at: DateTime<Utc>,
    pub sun_longitude: f64,
    pub moon_longitude: f64,
    /// (moon - sun) mod 360
    pub phase_angle: f64,
    /// Illuminated fraction, [0, 1]
    pub illumination: f64,
    pub moon_age_days: f64,
    /// 1-30
    pub lunar_day: u8,
    pub moon_sign: ZodiacSign,
    pub phase: LunarPhase,
}

/// Derived lunar quantities for a Sun and Moon longitude.
pub fn lunar_metrics(sun_longitude: f64, moon_longitude: f64) -> (f64, f64, f64, u8) {
    let phase_angle = normalize_degrees(moon_longitude - sun_longitude);
    let illumination = (1.0 - phase_angle.to_radians().cos()) / 2.0;
    let age = phase_angle / 360.0 * SYNODIC_MONTH;
    let lunar_day = (age.floor() as i64 + 1).clamp(1, 30) as u8;
    (phase_angle, illumination, age, lunar_day)
}

/// Lunar state at local noon of `date` in `timezone`.
pub fn compute_lunar<E: Ephemeris + ?Sized>(
    eph: &E,
    date: NaiveDate,
    timezone: &str,
) -> Result<LunarInfo, AstroError> {
    let noon = local_noon(date, timezone)?;
    let flags = eph.default_flags();
    let sun = eph.calc_body(noon.jd_ut, BodyId::Sun, flags)?;
    let moon = eph.calc_body(noon.jd_ut, BodyId::Moon, flags)?;
    let sun_longitude = normalize_degrees(sun.longitude);
    let moon_longitude = normalize_degrees(moon.longitude);
    let (phase_angle, illumination, moon_age_days, lunar_day) =
        lunar_metrics(sun_longitude, moon_longitude);

    Ok(LunarInfo {
        date,
        timezone: noon.timezone.name().to_string(),
        jd_ut: noon.jd_ut,
        sampled_at: noon.utc,
        sun_longitude,
        moon_longitude,
        phase_angle,
        illumination,
        moon_age_days,
        lunar_day,
        moon_sign: sign_position(moon_longitude).0,
        phase: LunarPhase::from_angle(phase_angle),
    })
}
