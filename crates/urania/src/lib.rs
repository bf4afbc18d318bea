//! Verifiable astrological facts: positions, houses, aspects, transits and
//! event favorability, each with provenance, plus quality gates for text
//! generated from them.

pub mod aspects;
pub mod chart;
pub mod config;
pub mod ephemeris;
pub mod error;
pub mod favorability;
pub mod houses;
pub mod lunar;
pub mod positions;
pub mod provenance;
pub mod quality;
pub mod time;
pub mod transits;
pub mod zodiac;

pub use aspects::{Aspect, AspectCalculator, AspectKind, OrbContext, OrbTable};
pub use chart::{
    ChartEngine, ChartSummary, FavorabilityReport, LunarReport, NatalChart, NatalRequest, TransitReport,
};
pub use config::EngineConfig;
pub use ephemeris::{
    BodyId, CalcFlags, EngineMode, Ephemeris, GeoLocation, HouseSystem, MeanElementsEphemeris,
};
#[cfg(feature = "swisseph")]
pub use ephemeris::SwissEphemerisAdapter;
pub use error::AstroError;
pub use favorability::{EventType, FavorabilityLevel, FavorabilityResult};
pub use houses::{HouseCusp, HouseSet};
pub use lunar::{LunarInfo, LunarPhase};
pub use positions::BodyPosition;
pub use provenance::{CoordinateSource, GeocoderMeta, Provenance};
pub use quality::{check_narrative, detect_numeric_hallucination, validate, QualityReport};
pub use transits::{CancelToken, TransitInfo};
pub use zodiac::ZodiacSign;

/// Engine over Swiss Ephemeris, configured from `configs/urania.toml` and
/// the environment.
#[cfg(feature = "swisseph")]
pub fn engine_from_env() -> Result<ChartEngine<SwissEphemerisAdapter>, AstroError> {
    let settings = urania_config::load_astro_settings()
        .map_err(|e| AstroError::invalid("config", format!("{e:#}")))?;
    let config = EngineConfig::from_settings(&settings)?;
    let adapter = SwissEphemerisAdapter::new(config.ephe_path.clone());
    ChartEngine::new(adapter, config)
}
