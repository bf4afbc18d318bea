//! Heuristic event favorability.

use crate::aspects::OrbTable;
use crate::error::AstroError;
use crate::ephemeris::{BodyId, Ephemeris};
use crate::lunar::{compute_lunar, LunarPhase};
use crate::positions::BodyPosition;
use crate::transits::{retrograde_bodies, CancelToken, TransitInfo, TransitSearch};
use chrono::{Duration, NaiveDate};
use log::debug;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

pub const BASE_SCORE: i32 = 50;
const ASPECT_WEIGHT: i32 = 5;
const MATCHED_RETROGRADE_PENALTY: i32 = 15;
const OTHER_RETROGRADE_PENALTY: i32 = 5;
const LUNAR_BONUS: i32 = 10;

/// Scores below this trigger the alternative-date search.
pub const ALTERNATIVE_TRIGGER: u8 = 50;
pub const ALTERNATIVE_MIN_SCORE: u8 = 60;
pub const ALTERNATIVE_WINDOW_DAYS: i64 = 7;
pub const MAX_ALTERNATIVES: usize = 3;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventType {
    Travel,
    Wedding,
    Business,
    Interview,
    Surgery,
    Moving,
    Contract,
    Exam,
    Date,
    Other,
}

impl EventType {
    pub const ALL: [EventType; 10] = [
        EventType::Travel,
        EventType::Wedding,
        EventType::Business,
        EventType::Interview,
        EventType::Surgery,
        EventType::Moving,
        EventType::Contract,
        EventType::Exam,
        EventType::Date,
        EventType::Other,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            EventType::Travel => "travel",
            EventType::Wedding => "wedding",
            EventType::Business => "business",
            EventType::Interview => "interview",
            EventType::Surgery => "surgery",
            EventType::Moving => "moving",
            EventType::Contract => "contract",
            EventType::Exam => "exam",
            EventType::Date => "date",
            EventType::Other => "other",
        }
    }
}

impl fmt::Display for EventType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for EventType {
    type Err = AstroError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_lowercase();
        EventType::ALL
            .iter()
            .copied()
            .find(|e| e.as_str() == wanted)
            .ok_or_else(|| AstroError::invalid("event_type", format!("unknown event type: {s}")))
    }
}

/// Events a retrograde body hits hardest.
fn retrograde_sensitive(body: BodyId) -> &'static [EventType] {
    match body {
        BodyId::Mercury => &[EventType::Contract, EventType::Interview, EventType::Exam],
        BodyId::Venus => &[EventType::Wedding, EventType::Date],
        BodyId::Mars => &[EventType::Surgery, EventType::Business],
        _ => &[],
    }
}

/// Events that benefit from a lunar phase.
fn favored_by(phase: LunarPhase) -> &'static [EventType] {
    match phase {
        LunarPhase::NewMoon => &[EventType::Business, EventType::Contract],
        LunarPhase::WaxingCrescent => &[EventType::Interview, EventType::Exam],
        LunarPhase::FirstQuarter => &[EventType::Business, EventType::Moving],
        LunarPhase::WaxingGibbous => &[EventType::Wedding, EventType::Date],
        LunarPhase::FullMoon => &[EventType::Travel],
        LunarPhase::WaningGibbous => &[EventType::Surgery],
        LunarPhase::LastQuarter => &[EventType::Moving],
        LunarPhase::WaningCrescent => &[EventType::Surgery],
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FavorabilityLevel {
    Difficult,
    Challenging,
    Neutral,
    Good,
    Excellent,
}

impl FavorabilityLevel {
    pub fn from_score(score: u8) -> Self {
        match score {
            80.. => FavorabilityLevel::Excellent,
            60..=79 => FavorabilityLevel::Good,
            40..=59 => FavorabilityLevel::Neutral,
            20..=39 => FavorabilityLevel::Challenging,
            _ => FavorabilityLevel::Difficult,
        }
    }
}

/// Everything the score depends on for one day.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DayFactors {
    pub date: NaiveDate,
    pub transits: Vec<TransitInfo>,
    pub retrograde: Vec<BodyId>,
    pub lunar_phase: LunarPhase,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DayScore {
    pub score: u8,
    pub positive_factors: Vec<String>,
    pub risk_factors: Vec<String>,
}

/// Score one day for one event type. Pure; clamps to [0, 100].
pub fn score_day(factors: &DayFactors, event: EventType) -> DayScore {
    let mut score = BASE_SCORE;
    let mut positive_factors = Vec::new();
    let mut risk_factors = Vec::new();

    for transit in &factors.transits {
        let label = format!(
            "{} {} natal {}",
            transit.transiting.display_name(),
            transit.aspect,
            transit.natal.display_name()
        );
        if transit.aspect.is_harmonious() {
            score += ASPECT_WEIGHT;
            positive_factors.push(label);
        } else if transit.aspect.is_hard() {
            score -= ASPECT_WEIGHT;
            risk_factors.push(label);
        }
    }

    for body in &factors.retrograde {
        let sensitive = retrograde_sensitive(*body);
        if sensitive.is_empty() {
            continue;
        }
        if sensitive.contains(&event) {
            score -= MATCHED_RETROGRADE_PENALTY;
            risk_factors.push(format!("{} retrograde", body.display_name()));
        } else {
            score -= OTHER_RETROGRADE_PENALTY;
        }
    }

    if favored_by(factors.lunar_phase).contains(&event) {
        score += LUNAR_BONUS;
        positive_factors.push(format!("Favorable lunar phase: {}", factors.lunar_phase));
    }

    DayScore {
        score: score.clamp(0, 100) as u8,
        positive_factors,
        risk_factors,
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AlternativeDate {
    pub date: NaiveDate,
    pub score: u8,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FavorabilityResult {
    pub date: NaiveDate,
    pub event_type: EventType,
    pub score: u8,
    pub level: FavorabilityLevel,
    pub positive_factors: Vec<String>,
    pub risk_factors: Vec<String>,
    pub transits: Vec<TransitInfo>,
    pub retrograde_bodies: Vec<BodyId>,
    pub lunar_phase: LunarPhase,
    /// Better days nearby, only searched when the score is below 50
    pub alternative_dates: Vec<AlternativeDate>,
}

/// Keep dates scoring at least 60, best first, at most three.
/// Ties keep calendar order.
pub fn rank_alternatives(mut candidates: Vec<AlternativeDate>) -> Vec<AlternativeDate> {
    candidates.retain(|c| c.score >= ALTERNATIVE_MIN_SCORE);
    candidates.sort_by(|a, b| b.score.cmp(&a.score));
    candidates.truncate(MAX_ALTERNATIVES);
    candidates
}

/// Gathers day factors from a provider and scores them.
pub struct FavorabilityScorer<'a, E: Ephemeris + ?Sized> {
    eph: &'a E,
    transit_orbs: OrbTable,
    timezone: String,
    cancel: CancelToken,
}

impl<'a, E: Ephemeris + ?Sized> FavorabilityScorer<'a, E> {
    /// `timezone` sets the local noon at which the lunar phase is read.
    pub fn new(eph: &'a E, transit_orbs: OrbTable, timezone: impl Into<String>) -> Self {
        Self {
            eph,
            transit_orbs,
            timezone: timezone.into(),
            cancel: CancelToken::new(),
        }
    }

    pub fn with_cancel(mut self, cancel: CancelToken) -> Self {
        self.cancel = cancel;
        self
    }

    pub fn factors(&self, natal: Option<&[BodyPosition]>, date: NaiveDate) -> Result<DayFactors, AstroError> {
        self.cancel.check()?;
        let transits = match natal {
            Some(natal) => TransitSearch::new(self.eph, self.transit_orbs)
                .with_cancel(self.cancel.clone())
                .daily(natal, date)?,
            None => Vec::new(),
        };
        let retrograde = retrograde_bodies(self.eph, date)?;
        let lunar_phase = compute_lunar(self.eph, date, &self.timezone)?.phase;
        Ok(DayFactors {
            date,
            transits,
            retrograde,
            lunar_phase,
        })
    }

    /// Score `date` for `event`, searching ±7 days when the score is low.
    pub fn score_event(
        &self,
        natal: Option<&[BodyPosition]>,
        date: NaiveDate,
        event: EventType,
    ) -> Result<FavorabilityResult, AstroError> {
        let factors = self.factors(natal, date)?;
        let day = score_day(&factors, event);
        let alternative_dates = if day.score < ALTERNATIVE_TRIGGER {
            self.alternative_dates(natal, date, event)?
        } else {
            Vec::new()
        };
        debug!(
            "{} on {}: score {}, {} alternatives",
            event,
            date,
            day.score,
            alternative_dates.len()
        );

        Ok(FavorabilityResult {
            date,
            event_type: event,
            score: day.score,
            level: FavorabilityLevel::from_score(day.score),
            positive_factors: day.positive_factors,
            risk_factors: day.risk_factors,
            transits: factors.transits,
            retrograde_bodies: factors.retrograde,
            lunar_phase: factors.lunar_phase,
            alternative_dates,
        })
    }

    /// Each day in `date ± 7`, excluding `date`, re-scored independently.
    pub fn alternative_dates(
        &self,
        natal: Option<&[BodyPosition]>,
        date: NaiveDate,
        event: EventType,
    ) -> Result<Vec<AlternativeDate>, AstroError> {
        let mut candidates = Vec::new();
        for offset in -ALTERNATIVE_WINDOW_DAYS..=ALTERNATIVE_WINDOW_DAYS {
            if offset == 0 {
                continue;
            }
            let Some(day) = date.checked_add_signed(Duration::days(offset)) else {
                continue;
            };
            let factors = match self.factors(natal, day) {
                Ok(f) => f,
                // the window can poke past the supported range
                Err(e) if e.is_input_error() => continue,
                Err(e) => return Err(e),
            };
            candidates.push(AlternativeDate {
                date: day,
                score: score_day(&factors, event).score,
            });
        }
        Ok(rank_alternatives(candidates))
    }
}
