use crate::aspects::{AspectCalculator, OrbContext};
use crate::chart::natal::{ChartSummary, NatalChart, NatalRequest};
use crate::config::EngineConfig;
use crate::error::AstroError;
use crate::ephemeris::{BodyId, Ephemeris};
use crate::favorability::{EventType, FavorabilityResult, FavorabilityScorer};
use crate::houses::{assign_houses, HouseCalculator};
use crate::lunar::{compute_lunar, LunarInfo};
use crate::positions::{find, resolve_positions, BodyPosition};
use crate::provenance::{build_provenance, Provenance};
use crate::quality::{self, QualityReport};
use crate::time::{self, date_to_julian_day, parse_timezone};
use crate::transits::{retrograde_bodies, CancelToken, TransitInfo, TransitSearch};
use chrono::NaiveDate;
use log::{debug, info};
use serde::{Deserialize, Serialize};

/// Lunar state with the provenance of the calculation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LunarReport {
    pub lunar: LunarInfo,
    pub provenance: Provenance,
}

/// Transits found in a window, with the provenance of the search.
///
/// The provenance time is 00:00 UT of the first day of the window.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransitReport {
    pub transits: Vec<TransitInfo>,
    pub provenance: Provenance,
}

/// A favorability score with the provenance of the scored day.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FavorabilityReport {
    pub result: FavorabilityResult,
    pub provenance: Provenance,
}

/// Entry point for every calculation, generic over the ephemeris provider.
pub struct ChartEngine<E: Ephemeris> {
    eph: E,
    config: EngineConfig,
}

impl<E: Ephemeris> ChartEngine<E> {
    pub fn new(eph: E, config: EngineConfig) -> Result<Self, AstroError> {
        config.validate()?;
        info!(
            "Chart engine ready: {} ({} data files), houses {}",
            eph.mode(),
            eph.data_files().len(),
            config.house_system
        );
        Ok(Self { eph, config })
    }

    pub fn ephemeris(&self) -> &E {
        &self.eph
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Positions, houses (when the birth time is known), aspects and
    /// provenance for one birth moment.
    pub fn compute_natal(&self, request: &NatalRequest) -> Result<NatalChart, AstroError> {
        let orbs = request.orbs.unwrap_or(self.config.natal_orbs);
        orbs.validate()?;
        let system = request.house_system.unwrap_or(self.config.house_system);

        let instant = time::normalize(request.date, request.time, &request.timezone)?;
        let mut positions = resolve_positions(&self.eph, instant.jd_ut, &BodyId::ALL)?;

        let sun_longitude = find(&positions, BodyId::Sun)
            .map(|p| p.longitude)
            .ok_or_else(|| AstroError::CalculationFailed {
                body: BodyId::Sun,
                jd_ut: instant.jd_ut,
                message: "no Sun position".to_string(),
            })?;
        let birth_jd = instant.time_known.then_some(instant.jd_ut);
        let houses =
            HouseCalculator::new(system).calculate(&self.eph, birth_jd, request.location, sun_longitude)?;
        if let Some(houses) = &houses {
            assign_houses(&mut positions, houses);
        }

        let aspects = AspectCalculator::new(orbs, OrbContext::Natal).natal_aspects(&positions);
        let summary = ChartSummary::from_parts(&positions, houses.as_ref());
        let provenance = build_provenance(
            &self.eph,
            &self.config.calculation_version,
            instant.jd_ut,
            instant.timezone,
            Some(request.location_context()),
            houses.as_ref().map(|h| h.system),
        )?;

        info!(
            "Natal chart for {} ({}): {} positions, {} aspects, houses {}",
            request.date,
            request.timezone,
            positions.len(),
            aspects.len(),
            if houses.is_some() { "computed" } else { "omitted" }
        );

        Ok(NatalChart {
            birth_time_known: instant.time_known,
            positions,
            houses,
            aspects,
            summary,
            provenance,
        })
    }

    pub fn compute_transits(
        &self,
        natal: &[BodyPosition],
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<TransitReport, AstroError> {
        self.compute_transits_with_cancel(natal, start, end, CancelToken::new())
    }

    pub fn compute_transits_with_cancel(
        &self,
        natal: &[BodyPosition],
        start: NaiveDate,
        end: NaiveDate,
        cancel: CancelToken,
    ) -> Result<TransitReport, AstroError> {
        let transits = TransitSearch::new(&self.eph, self.config.transit_orbs)
            .with_cancel(cancel)
            .run(natal, start, end)?;
        debug!("{} transits between {} and {}", transits.len(), start, end);
        let provenance = self.day_provenance(start)?;
        Ok(TransitReport { transits, provenance })
    }

    pub fn daily_transits(&self, natal: &[BodyPosition], date: NaiveDate) -> Result<TransitReport, AstroError> {
        self.compute_transits(natal, date, date)
    }

    pub fn major_transit_dates(
        &self,
        natal: &[BodyPosition],
        start: NaiveDate,
        end: NaiveDate,
        body: BodyId,
    ) -> Result<TransitReport, AstroError> {
        self.major_transit_dates_with_cancel(natal, start, end, body, CancelToken::new())
    }

    /// Exact-date search that stops with `Err(Cancelled)` once `cancel`
    /// fires. Multi-year windows for the slow bodies are the long runs.
    pub fn major_transit_dates_with_cancel(
        &self,
        natal: &[BodyPosition],
        start: NaiveDate,
        end: NaiveDate,
        body: BodyId,
        cancel: CancelToken,
    ) -> Result<TransitReport, AstroError> {
        let transits = TransitSearch::new(&self.eph, self.config.transit_orbs)
            .with_cancel(cancel)
            .major_transit_dates(natal, start, end, body)?;
        debug!(
            "{} exact {} transits between {} and {}",
            transits.len(),
            body,
            start,
            end
        );
        let provenance = self.day_provenance(start)?;
        Ok(TransitReport { transits, provenance })
    }

    pub fn retrograde_bodies(&self, date: NaiveDate) -> Result<Vec<BodyId>, AstroError> {
        retrograde_bodies(&self.eph, date)
    }

    /// Lunar state at local noon of `date` in `timezone`.
    pub fn compute_lunar(&self, date: NaiveDate, timezone: &str) -> Result<LunarReport, AstroError> {
        let lunar = compute_lunar(&self.eph, date, timezone)?;
        let provenance = build_provenance(
            &self.eph,
            &self.config.calculation_version,
            lunar.jd_ut,
            parse_timezone(timezone)?,
            None,
            None,
        )?;
        Ok(LunarReport { lunar, provenance })
    }

    /// Favorability of `date` for `event`, personalised when natal
    /// positions are given.
    pub fn score_event(
        &self,
        natal: Option<&[BodyPosition]>,
        date: NaiveDate,
        event: EventType,
    ) -> Result<FavorabilityReport, AstroError> {
        self.score_event_with_cancel(natal, date, event, CancelToken::new())
    }

    pub fn score_event_with_cancel(
        &self,
        natal: Option<&[BodyPosition]>,
        date: NaiveDate,
        event: EventType,
        cancel: CancelToken,
    ) -> Result<FavorabilityReport, AstroError> {
        // fail on an unsupported date before scanning the window around it
        let provenance = self.day_provenance(date)?;
        let result =
            FavorabilityScorer::new(&self.eph, self.config.transit_orbs, &self.config.default_timezone)
                .with_cancel(cancel)
                .score_event(natal, date, event)?;
        Ok(FavorabilityReport { result, provenance })
    }

    /// Provenance for a day-level result sampled from 00:00 UT of `date`.
    fn day_provenance(&self, date: NaiveDate) -> Result<Provenance, AstroError> {
        build_provenance(
            &self.eph,
            &self.config.calculation_version,
            date_to_julian_day(date)?,
            parse_timezone(&self.config.default_timezone)?,
            None,
            None,
        )
    }

    /// Structural checks on a chart this engine produced.
    pub fn validate_chart(&self, chart: &NatalChart) -> QualityReport {
        quality::validate_chart(chart, chart.birth_time_known)
    }
}
