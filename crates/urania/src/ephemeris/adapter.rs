use crate::error::AstroError;
use crate::ephemeris::files::DataFileCatalog;
use crate::ephemeris::types::{
    BodyId, CalcFlags, EngineMode, EphemerisFile, GeoLocation, HouseSystem, RawPosition,
};
use crate::time;

/// Contract of an ephemeris provider.
///
/// Implementations must be deterministic: the same `(jd_ut, body, flags)`
/// always yields the same position for a given configuration.
pub trait Ephemeris {
    /// Mode recorded in provenance.
    fn mode(&self) -> EngineMode;

    /// Flags used when the caller has no preference.
    fn default_flags(&self) -> CalcFlags;

    /// Data files backing the current mode (empty for analytic modes).
    fn data_files(&self) -> &[EphemerisFile];

    /// Julian Day (UT) for a proleptic Gregorian date.
    fn julian_day(&self, year: i32, month: u32, day: u32, ut_hours: f64) -> Result<f64, AstroError> {
        time::julian_day(year, month, day, ut_hours)
    }

    /// Geocentric ecliptic position and daily speed of `body`.
    fn calc_body(&self, jd_ut: f64, body: BodyId, flags: CalcFlags) -> Result<RawPosition, AstroError>;

    /// Twelve house cusp longitudes, house 1 first.
    fn houses(
        &self,
        jd_ut: f64,
        location: GeoLocation,
        system: HouseSystem,
    ) -> Result<[f64; 12], AstroError>;
}

impl<E: Ephemeris + ?Sized> Ephemeris for &E {
    fn mode(&self) -> EngineMode {
        (**self).mode()
    }

    fn default_flags(&self) -> CalcFlags {
        (**self).default_flags()
    }

    fn data_files(&self) -> &[EphemerisFile] {
        (**self).data_files()
    }

    fn julian_day(&self, year: i32, month: u32, day: u32, ut_hours: f64) -> Result<f64, AstroError> {
        (**self).julian_day(year, month, day, ut_hours)
    }

    fn calc_body(&self, jd_ut: f64, body: BodyId, flags: CalcFlags) -> Result<RawPosition, AstroError> {
        (**self).calc_body(jd_ut, body, flags)
    }

    fn houses(
        &self,
        jd_ut: f64,
        location: GeoLocation,
        system: HouseSystem,
    ) -> Result<[f64; 12], AstroError> {
        (**self).houses(jd_ut, location, system)
    }
}

/// Pick the engine mode for an optional data directory and return the
/// catalog backing it. Missing, empty or unreadable directories degrade to
/// the analytic Moshier mode.
pub fn select_mode(data_dir: Option<&std::path::Path>) -> (EngineMode, DataFileCatalog) {
    match data_dir {
        Some(dir) if dir.is_dir() => {
            let catalog = DataFileCatalog::scan(dir);
            if catalog.is_empty() {
                log::warn!(
                    "No usable ephemeris files in {}; using analytic Moshier mode",
                    dir.display()
                );
                (EngineMode::Moshier, catalog)
            } else {
                log::info!(
                    "Swiss Ephemeris data files found in {} ({} files)",
                    dir.display(),
                    catalog.files().len()
                );
                (EngineMode::SwissEph, catalog)
            }
        }
        Some(dir) => {
            log::warn!(
                "Ephemeris path {} does not exist; using analytic Moshier mode",
                dir.display()
            );
            (EngineMode::Moshier, DataFileCatalog::default())
        }
        None => {
            log::info!("No ephemeris path configured; using analytic Moshier mode");
            (EngineMode::Moshier, DataFileCatalog::default())
        }
    }
}

pub fn flags_for_mode(mode: EngineMode) -> CalcFlags {
    match mode {
        EngineMode::SwissEph => CalcFlags::SWIEPH | CalcFlags::SPEED,
        EngineMode::Moshier => CalcFlags::MOSEPH | CalcFlags::SPEED,
        EngineMode::MeanElements => CalcFlags::SPEED,
    }
}

#[cfg(feature = "swisseph")]
pub use swiss::SwissEphemerisAdapter;

#[cfg(feature = "swisseph")]
mod swiss {
    use super::{flags_for_mode, select_mode, Ephemeris};
    use crate::error::AstroError;
    use crate::ephemeris::files::DataFileCatalog;
    use crate::ephemeris::types::{
        BodyId, CalcFlags, EngineMode, EphemerisFile, GeoLocation, HouseSystem, RawPosition,
    };
    use crate::time;
    use std::path::{Path, PathBuf};
    use swisseph::swe::{calc_ut, houses_ex, julday, set_ephe_path};
    use swisseph::Cusp;

    /// Swiss Ephemeris adapter.
    ///
    /// Uses data files when a readable directory with matching tables is
    /// configured, otherwise the built-in Moshier theory.
    pub struct SwissEphemerisAdapter {
        mode: EngineMode,
        catalog: DataFileCatalog,
    }

    impl SwissEphemerisAdapter {
        /// Create an adapter for an optional data directory. Never fails:
        /// a bad directory only degrades the mode.
        pub fn new(data_dir: Option<PathBuf>) -> Self {
            let (mode, catalog) = select_mode(data_dir.as_deref());
            if mode == EngineMode::SwissEph {
                point_engine_at(catalog.dir());
            }
            Self { mode, catalog }
        }

        /// Switch data directory; rescans only when the directory changed.
        pub fn set_data_dir(&mut self, data_dir: Option<PathBuf>) {
            let unchanged = match (&data_dir, self.catalog.dir()) {
                (Some(new), Some(_)) => self.catalog.is_for(new),
                (None, None) => true,
                _ => false,
            };
            if unchanged {
                return;
            }
            let (mode, catalog) = select_mode(data_dir.as_deref());
            if mode == EngineMode::SwissEph {
                point_engine_at(catalog.dir());
            }
            self.mode = mode;
            self.catalog = catalog;
        }
    }

    /// Hand the data directory to the engine; later file opens search it.
    fn point_engine_at(dir: Option<&Path>) {
        if let Some(dir) = dir {
            set_ephe_path(&dir.to_string_lossy());
            log::debug!("Ephemeris path set to {}", dir.display());
        }
    }

    impl Ephemeris for SwissEphemerisAdapter {
        fn mode(&self) -> EngineMode {
            self.mode
        }

        fn default_flags(&self) -> CalcFlags {
            flags_for_mode(self.mode)
        }

        fn data_files(&self) -> &[EphemerisFile] {
            self.catalog.files()
        }

        fn julian_day(
            &self,
            year: i32,
            month: u32,
            day: u32,
            ut_hours: f64,
        ) -> Result<f64, AstroError> {
            // validates the calendar date and the supported range first
            time::julian_day(year, month, day, ut_hours)?;
            // GREG_CAL = 1
            Ok(julday(year, month as i32, day as i32, ut_hours, 1))
        }

        fn calc_body(
            &self,
            jd_ut: f64,
            body: BodyId,
            flags: CalcFlags,
        ) -> Result<RawPosition, AstroError> {
            time::ensure_supported_jd(jd_ut)?;
            let code = body.swe_code().ok_or_else(|| AstroError::CalculationFailed {
                body,
                jd_ut,
                message: "body is derived, not computed by the engine".to_string(),
            })?;

            let result = calc_ut(jd_ut, code as u32, flags.bits()).map_err(|e| {
                AstroError::CalculationFailed {
                    body,
                    jd_ut,
                    message: format!("Swiss Ephemeris error: {}", e),
                }
            })?;

            let out = result.out;
            Ok(RawPosition {
                longitude: out[0],
                latitude: out[1],
                distance: out[2],
                speed: out[3],
            })
        }

        fn houses(
            &self,
            jd_ut: f64,
            location: GeoLocation,
            system: HouseSystem,
        ) -> Result<[f64; 12], AstroError> {
            time::ensure_supported_jd(jd_ut)?;
            let (c, _a) = houses_ex(jd_ut, 0, location.lat, location.lon, system.code() as i32);
            let cusps = Cusp::from_array(c);
            let values = [
                cusps.first, cusps.second, cusps.third, cusps.fourth,
                cusps.fifth, cusps.sixth, cusps.seventh, cusps.eighth,
                cusps.ninth, cusps.tenth, cusps.eleventh, cusps.twelfth,
            ];
            if values.iter().any(|v| !v.is_finite()) {
                return Err(AstroError::HouseUnavailable {
                    system,
                    latitude: location.lat,
                    reason: "engine returned non-finite cusps".to_string(),
                });
            }
            Ok(values)
        }
    }
}
