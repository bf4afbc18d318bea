//! Day-stepping transit search against a natal chart.

use crate::aspects::{AspectCalculator, AspectKind, OrbContext, OrbTable};
use crate::error::AstroError;
use crate::ephemeris::{BodyId, Ephemeris};
use crate::positions::{find, resolve_positions, BodyPosition};
use crate::time::date_to_julian_day;
use chrono::NaiveDate;
use log::debug;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Slow bodies stepped across the window. Inner bodies move too fast for
/// day granularity.
pub const TRANSITING_BODIES: [BodyId; 6] = [
    BodyId::Mars,
    BodyId::Jupiter,
    BodyId::Saturn,
    BodyId::Uranus,
    BodyId::Neptune,
    BodyId::Pluto,
];

/// Natal points matched by the transit search.
pub const NATAL_POINTS: [BodyId; 7] = [
    BodyId::Sun,
    BodyId::Moon,
    BodyId::Mercury,
    BodyId::Venus,
    BodyId::Mars,
    BodyId::Jupiter,
    BodyId::Saturn,
];

/// Natal points tracked by the exact-date search.
pub const MAJOR_NATAL_POINTS: [BodyId; 5] = [
    BodyId::Sun,
    BodyId::Moon,
    BodyId::Mercury,
    BodyId::Venus,
    BodyId::Mars,
];

/// Bodies that can be retrograde.
pub const RETROGRADE_CANDIDATES: [BodyId; 8] = [
    BodyId::Mercury,
    BodyId::Venus,
    BodyId::Mars,
    BodyId::Jupiter,
    BodyId::Saturn,
    BodyId::Uranus,
    BodyId::Neptune,
    BodyId::Pluto,
];

/// One transiting-to-natal aspect.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransitInfo {
    pub transiting: BodyId,
    pub natal: BodyId,
    pub aspect: AspectKind,
    /// Day of the tightest orb seen in the window
    pub date: NaiveDate,
    pub jd_ut: f64,
    pub orb: f64,
    pub applying: bool,
}

/// Cooperative cancellation flag shared with a caller-level timeout.
#[derive(Debug, Clone, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }

    pub fn check(&self) -> Result<(), AstroError> {
        if self.is_cancelled() {
            Err(AstroError::Cancelled)
        } else {
            Ok(())
        }
    }
}

/// Inclusive days from `start` to `end`, yielded one at a time;
/// `start > end` is invalid input.
pub fn date_range(
    start: NaiveDate,
    end: NaiveDate,
) -> Result<impl Iterator<Item = NaiveDate>, AstroError> {
    if start > end {
        return Err(AstroError::invalid(
            "date_range",
            format!("start {start} is after end {end}"),
        ));
    }
    Ok(start.iter_days().take_while(move |d| *d <= end))
}

/// Natal points from `natal`, in `points` order, skipping missing ones.
fn select_points(natal: &[BodyPosition], points: &[BodyId]) -> Vec<BodyPosition> {
    points
        .iter()
        .filter_map(|body| find(natal, *body).cloned())
        .collect()
}

/// Multi-day transit search. Each day is sampled at 00:00 UT.
pub struct TransitSearch<'a, E: Ephemeris + ?Sized> {
    eph: &'a E,
    calculator: AspectCalculator,
    cancel: CancelToken,
}

impl<'a, E: Ephemeris + ?Sized> TransitSearch<'a, E> {
    pub fn new(eph: &'a E, orbs: OrbTable) -> Self {
        Self {
            eph,
            calculator: AspectCalculator::new(orbs, OrbContext::Transit),
            cancel: CancelToken::new(),
        }
    }

    pub fn with_cancel(mut self, cancel: CancelToken) -> Self {
        self.cancel = cancel;
        self
    }

    /// Transits in `[start, end]`.
    ///
    /// Each (transiting, natal, aspect) triple is reported once, on its
    /// minimum-orb day; output keeps first-detection order. A cancelled
    /// search returns `Err(Cancelled)` and nothing else.
    pub fn run(
        &self,
        natal: &[BodyPosition],
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<TransitInfo>, AstroError> {
        let days = date_range(start, end)?;
        let points = select_points(natal, &NATAL_POINTS);
        let mut results: Vec<TransitInfo> = Vec::new();
        let mut seen: HashMap<(BodyId, BodyId, AspectKind), usize> = HashMap::new();

        for date in days {
            self.cancel.check()?;
            let jd_ut = date_to_julian_day(date)?;
            let transiting = resolve_positions(self.eph, jd_ut, &TRANSITING_BODIES)?;
            let mut hits = 0;

            for body in &transiting {
                for aspect in self.calculator.transit_aspects(body, &points) {
                    hits += 1;
                    let info = TransitInfo {
                        transiting: aspect.first,
                        natal: aspect.second,
                        aspect: aspect.kind,
                        date,
                        jd_ut,
                        orb: aspect.orb,
                        applying: aspect.applying,
                    };
                    match seen.get(&(info.transiting, info.natal, info.aspect)) {
                        Some(&index) => {
                            if info.orb < results[index].orb {
                                results[index] = info;
                            }
                        }
                        None => {
                            seen.insert((info.transiting, info.natal, info.aspect), results.len());
                            results.push(info);
                        }
                    }
                }
            }
            debug!("Transits on {}: {} hits", date, hits);
        }

        Ok(results)
    }

    /// Transits active on one day.
    pub fn daily(&self, natal: &[BodyPosition], date: NaiveDate) -> Result<Vec<TransitInfo>, AstroError> {
        self.run(natal, date, date)
    }

    /// Exact days of `body`'s aspects to the natal Sun through Mars.
    ///
    /// An aspect is reported on the day its orb stops shrinking, once per
    /// approach. When the minimum spans two days the later one is reported.
    /// A minimum on the last day of the window is not reported.
    pub fn major_transit_dates(
        &self,
        natal: &[BodyPosition],
        start: NaiveDate,
        end: NaiveDate,
        body: BodyId,
    ) -> Result<Vec<TransitInfo>, AstroError> {
        if body == BodyId::SouthNode {
            return Err(AstroError::invalid(
                "body",
                "the south node cannot be tracked directly",
            ));
        }
        let days = date_range(start, end)?;
        let points = select_points(natal, &MAJOR_NATAL_POINTS);
        // per natal point: yesterday's hit and whether the orb was shrinking
        let mut tracking: HashMap<BodyId, (TransitInfo, bool)> = HashMap::new();
        let mut results = Vec::new();

        for date in days {
            self.cancel.check()?;
            let jd_ut = date_to_julian_day(date)?;
            let position = resolve_positions(self.eph, jd_ut, &[body])?;
            let Some(transiting) = position.first() else {
                continue;
            };

            for point in &points {
                let hit = self
                    .calculator
                    .transit_aspects(transiting, std::slice::from_ref(point))
                    .into_iter()
                    .next();
                let Some(aspect) = hit else {
                    tracking.remove(&point.body);
                    continue;
                };
                let today = TransitInfo {
                    transiting: body,
                    natal: point.body,
                    aspect: aspect.kind,
                    date,
                    jd_ut,
                    orb: aspect.orb,
                    applying: aspect.applying,
                };
                let descending = match tracking.remove(&point.body) {
                    Some((yesterday, was_descending)) if yesterday.aspect == today.aspect => {
                        if today.orb > yesterday.orb && was_descending {
                            debug!(
                                "Exact {} {} natal {} on {}",
                                body, yesterday.aspect, point.body, yesterday.date
                            );
                            results.push(yesterday);
                            false
                        } else {
                            // equal orbs on consecutive days: still at the minimum
                            today.orb < yesterday.orb || (today.orb == yesterday.orb && was_descending)
                        }
                    }
                    _ => false,
                };
                tracking.insert(point.body, (today, descending));
            }
        }

        Ok(results)
    }
}

/// Bodies with negative daily motion at 00:00 UT of `date`.
pub fn retrograde_bodies<E: Ephemeris + ?Sized>(eph: &E, date: NaiveDate) -> Result<Vec<BodyId>, AstroError> {
    let jd_ut = date_to_julian_day(date)?;
    Ok(resolve_positions(eph, jd_ut, &RETROGRADE_CANDIDATES)?
        .into_iter()
        .filter(|p| p.retrograde)
        .map(|p| p.body)
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_date_range() {
        let start = NaiveDate::from_ymd_opt(2024, 2, 27).unwrap();
        let end = NaiveDate::from_ymd_opt(2024, 3, 2).unwrap();
        let days: Vec<NaiveDate> = date_range(start, end).unwrap().collect();
        assert_eq!(days.len(), 5);
        assert_eq!(days[2], NaiveDate::from_ymd_opt(2024, 2, 29).unwrap());
        assert_eq!(date_range(start, start).unwrap().count(), 1);
        assert!(date_range(end, start).is_err());
    }

    #[test]
    fn test_date_range_is_lazy_over_long_windows() {
        let start = NaiveDate::from_ymd_opt(1900, 1, 1).unwrap();
        let end = NaiveDate::from_ymd_opt(2099, 12, 31).unwrap();
        let mut days = date_range(start, end).unwrap();
        assert_eq!(days.next(), Some(start));
        assert_eq!(days.nth(365), NaiveDate::from_ymd_opt(1901, 1, 2));
        assert_eq!(date_range(start, end).unwrap().last(), Some(end));
    }

    #[test]
    fn test_cancel_token_is_shared() {
        let token = CancelToken::new();
        let clone = token.clone();
        assert!(token.check().is_ok());
        clone.cancel();
        assert_eq!(token.check(), Err(AstroError::Cancelled));
    }

    #[test]
    fn test_select_points_keeps_order() {
        let natal = vec![
            BodyPosition::stationary(BodyId::Saturn, 10.0),
            BodyPosition::stationary(BodyId::Pluto, 20.0),
            BodyPosition::stationary(BodyId::Sun, 30.0),
        ];
        let points = select_points(&natal, &NATAL_POINTS);
        let bodies: Vec<BodyId> = points.iter().map(|p| p.body).collect();
        assert_eq!(bodies, vec![BodyId::Sun, BodyId::Saturn]);
    }
}
