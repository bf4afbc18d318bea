//! Reproducibility metadata attached to every computed result.

use crate::error::AstroError;
use crate::ephemeris::{EngineMode, Ephemeris, EphemerisFile, GeoLocation, HouseSystem};
use crate::time::julian_day_to_datetime;
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Where the coordinates came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CoordinateSource {
    User,
    Geocoder,
}

/// What the external geocoder reported about a resolved place.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct GeocoderMeta {
    pub provider: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub query: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub confidence: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimeContext {
    pub timezone: String,
    pub jd_ut: f64,
    /// ISO 8601
    pub dt_utc: String,
    /// ISO 8601 in `timezone`
    pub dt_local: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LocationContext {
    pub coords: GeoLocation,
    pub coords_source: CoordinateSource,
    pub geocoder: Option<GeocoderMeta>,
}

impl LocationContext {
    pub fn user(coords: GeoLocation) -> Self {
        Self {
            coords,
            coords_source: CoordinateSource::User,
            geocoder: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Provenance {
    pub calculation_version: String,
    pub ephemeris_engine: EngineMode,
    pub ephemeris_files: Vec<EphemerisFile>,
    pub flags: String,
    /// Present for results that include houses
    pub house_system: Option<HouseSystem>,
    pub time: TimeContext,
    /// Absent for location-independent results such as transit searches
    pub location: Option<LocationContext>,
}

/// Read and trim a semver from a VERSION file, if it exists.
pub fn read_version_file(path: &Path) -> Option<String> {
    fs::read_to_string(path)
        .ok()
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
}

/// `git:<sha> | semver:<v>`, or whichever part is known, or the crate
/// version.
pub fn resolve_calculation_version(git_commit: Option<&str>, semver: Option<&str>) -> String {
    let git = git_commit.map(str::trim).filter(|s| !s.is_empty());
    let semver = semver.map(str::trim).filter(|s| !s.is_empty());
    match (git, semver) {
        (Some(git), Some(semver)) => format!("git:{git} | semver:{semver}"),
        (Some(git), None) => format!("git:{git}"),
        (None, Some(semver)) => format!("semver:{semver}"),
        (None, None) => format!("semver:{}", env!("CARGO_PKG_VERSION")),
    }
}

/// Snapshot the provider's mode and files for one result.
pub fn build_provenance<E: Ephemeris + ?Sized>(
    eph: &E,
    calculation_version: &str,
    jd_ut: f64,
    timezone: Tz,
    location: Option<LocationContext>,
    house_system: Option<HouseSystem>,
) -> Result<Provenance, AstroError> {
    let utc = julian_day_to_datetime(jd_ut)?;
    Ok(Provenance {
        calculation_version: calculation_version.to_string(),
        ephemeris_engine: eph.mode(),
        ephemeris_files: eph.data_files().to_vec(),
        flags: eph.default_flags().describe(),
        house_system,
        time: TimeContext {
            timezone: timezone.name().to_string(),
            jd_ut,
            dt_utc: utc.to_rfc3339(),
            dt_local: utc.with_timezone(&timezone).to_rfc3339(),
        },
        location,
    })
}
