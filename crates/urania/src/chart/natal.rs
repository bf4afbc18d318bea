use crate::aspects::{Aspect, OrbTable};
use crate::error::AstroError;
use crate::ephemeris::{BodyId, GeoLocation, HouseSystem};
use crate::houses::HouseSet;
use crate::positions::{find, BodyPosition};
use crate::provenance::{CoordinateSource, GeocoderMeta, LocationContext, Provenance};
use crate::zodiac::ZodiacSign;
use chrono::{NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};

/// Input for a natal chart. The location is already resolved; geocoding
/// happens upstream.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NatalRequest {
    pub date: NaiveDate,
    /// Local birth time; `None` when unknown
    pub time: Option<NaiveTime>,
    /// IANA zone name
    pub timezone: String,
    pub location: GeoLocation,
    pub coords_source: CoordinateSource,
    pub geocoder: Option<GeocoderMeta>,
    /// Overrides the configured house system
    pub house_system: Option<HouseSystem>,
    /// Overrides the configured natal orbs
    pub orbs: Option<OrbTable>,
}

impl NatalRequest {
    /// Request with user-supplied coordinates. Rejects out-of-range
    /// latitude or longitude.
    pub fn new(
        date: NaiveDate,
        time: Option<NaiveTime>,
        timezone: impl Into<String>,
        lat: f64,
        lon: f64,
    ) -> Result<Self, AstroError> {
        Ok(Self {
            date,
            time,
            timezone: timezone.into(),
            location: GeoLocation::new(lat, lon)?,
            coords_source: CoordinateSource::User,
            geocoder: None,
            house_system: None,
            orbs: None,
        })
    }

    pub fn with_geocoder(mut self, meta: GeocoderMeta) -> Self {
        self.coords_source = CoordinateSource::Geocoder;
        self.geocoder = Some(meta);
        self
    }

    pub fn with_house_system(mut self, system: HouseSystem) -> Self {
        self.house_system = Some(system);
        self
    }

    pub fn with_orbs(mut self, orbs: OrbTable) -> Self {
        self.orbs = Some(orbs);
        self
    }

    pub fn location_context(&self) -> LocationContext {
        LocationContext {
            coords: self.location,
            coords_source: self.coords_source,
            geocoder: self.geocoder.clone(),
        }
    }
}

/// Signs of the chart's main points.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChartSummary {
    pub sun_sign: Option<ZodiacSign>,
    pub moon_sign: Option<ZodiacSign>,
    /// From cusp 1; only with houses
    pub ascendant_sign: Option<ZodiacSign>,
    /// From cusp 10; only with houses
    pub midheaven_sign: Option<ZodiacSign>,
}

impl ChartSummary {
    pub fn from_parts(positions: &[BodyPosition], houses: Option<&HouseSet>) -> Self {
        let cusp_sign = |n: u8| houses.and_then(|h| h.cusp(n)).map(|c| c.sign);
        Self {
            sun_sign: find(positions, BodyId::Sun).map(|p| p.sign),
            moon_sign: find(positions, BodyId::Moon).map(|p| p.sign),
            ascendant_sign: cusp_sign(1),
            midheaven_sign: cusp_sign(10),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NatalChart {
    pub birth_time_known: bool,
    pub positions: Vec<BodyPosition>,
    /// `None` exactly when the birth time is unknown
    pub houses: Option<HouseSet>,
    pub aspects: Vec<Aspect>,
    pub summary: ChartSummary,
    pub provenance: Provenance,
}

impl NatalChart {
    pub fn position(&self, body: BodyId) -> Option<&BodyPosition> {
        find(&self.positions, body)
    }
}
