//! Civil time to Julian Day (UT) normalization.
//!
//! All Julian Days in this crate are UT-based and use the proleptic
//! Gregorian calendar.

use crate::error::AstroError;
use chrono::{
    DateTime, Datelike, FixedOffset, LocalResult, NaiveDate, NaiveDateTime, NaiveTime, Offset,
    TimeZone, Timelike, Utc,
};
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};

/// JD of 0001-01-01 00:00 UT.
pub const MIN_SUPPORTED_JD: f64 = 1_721_425.5;
/// JD of 3001-01-01 00:00 UT (exclusive upper bound).
pub const MAX_SUPPORTED_JD: f64 = 2_817_152.5;
/// JD of the Unix epoch.
pub const UNIX_EPOCH_JD: f64 = 2_440_587.5;
/// JD of J2000.0 (2000-01-01 12:00 TT, used here as UT).
pub const J2000_JD: f64 = 2_451_545.0;

/// Time used for positions when the birth time is unknown.
pub fn unknown_time_default() -> NaiveTime {
    NaiveTime::from_hms_opt(12, 0, 0).unwrap_or(NaiveTime::MIN)
}

/// Julian Day for a proleptic Gregorian date and UT hour (Meeus, ch. 7).
pub fn julian_day(year: i32, month: u32, day: u32, ut_hours: f64) -> Result<f64, AstroError> {
    if NaiveDate::from_ymd_opt(year, month, day).is_none() {
        return Err(AstroError::invalid(
            "date",
            format!("{year:04}-{month:02}-{day:02} is not a valid Gregorian date"),
        ));
    }
    if !ut_hours.is_finite() || !(0.0..=24.0).contains(&ut_hours) {
        return Err(AstroError::invalid(
            "time",
            format!("UT hours must be within [0, 24], got {ut_hours}"),
        ));
    }
    let (mut y, mut m) = (year as f64, month as f64);
    if month <= 2 {
        y -= 1.0;
        m += 12.0;
    }
    let a = (y / 100.0).floor();
    let b = 2.0 - a + (a / 4.0).floor();
    let jd = (365.25 * (y + 4716.0)).floor() + (30.6001 * (m + 1.0)).floor() + day as f64 + b
        - 1524.5
        + ut_hours / 24.0;
    ensure_supported_jd(jd)?;
    Ok(jd)
}

/// Reject Julian Days outside the supported calendar span.
pub fn ensure_supported_jd(jd_ut: f64) -> Result<(), AstroError> {
    if !jd_ut.is_finite() || !(MIN_SUPPORTED_JD..MAX_SUPPORTED_JD).contains(&jd_ut) {
        return Err(AstroError::invalid(
            "jd_ut",
            format!(
                "Julian Day {jd_ut} is outside the supported range [{MIN_SUPPORTED_JD}, {MAX_SUPPORTED_JD})"
            ),
        ));
    }
    Ok(())
}

/// Decimal UT hours of a UTC instant.
pub fn ut_hours(dt: &DateTime<Utc>) -> f64 {
    dt.hour() as f64
        + dt.minute() as f64 / 60.0
        + dt.second() as f64 / 3600.0
        + dt.nanosecond() as f64 / 3_600_000_000_000.0
}

/// Julian Day of a UTC instant.
pub fn datetime_to_julian_day(dt: &DateTime<Utc>) -> Result<f64, AstroError> {
    julian_day(dt.year(), dt.month(), dt.day(), ut_hours(dt))
}

/// JD at 00:00 UT of a calendar date; the day-stepping searches sample here.
pub fn date_to_julian_day(date: NaiveDate) -> Result<f64, AstroError> {
    julian_day(date.year(), date.month(), date.day(), 0.0)
}

/// UTC instant of a Julian Day, to millisecond resolution.
pub fn julian_day_to_datetime(jd_ut: f64) -> Result<DateTime<Utc>, AstroError> {
    ensure_supported_jd(jd_ut)?;
    let millis = ((jd_ut - UNIX_EPOCH_JD) * 86_400_000.0).round() as i64;
    Utc.timestamp_millis_opt(millis).single().ok_or_else(|| {
        AstroError::invalid("jd_ut", format!("Julian Day {jd_ut} has no UTC representation"))
    })
}

pub fn parse_timezone(name: &str) -> Result<Tz, AstroError> {
    name.trim()
        .parse::<Tz>()
        .map_err(|e| AstroError::invalid("timezone", format!("{name:?}: {e}")))
}

/// A civil instant resolved to UT.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NormalizedInstant {
    pub jd_ut: f64,
    pub utc: DateTime<Utc>,
    pub local: DateTime<FixedOffset>,
    pub timezone: Tz,
    /// False when the caller did not know the local time; positions then use
    /// local noon and houses must not be computed.
    pub time_known: bool,
}

/// Resolve a local date, optional local time and IANA timezone to UT.
///
/// A local time inside a DST gap is rejected. An ambiguous local time (DST
/// fold) resolves to the earlier of the two instants.
pub fn normalize(
    date: NaiveDate,
    time: Option<NaiveTime>,
    timezone: &str,
) -> Result<NormalizedInstant, AstroError> {
    let tz = parse_timezone(timezone)?;
    let naive = NaiveDateTime::new(date, time.unwrap_or_else(unknown_time_default));
    let local = match tz.from_local_datetime(&naive) {
        LocalResult::Single(dt) => dt,
        LocalResult::Ambiguous(earliest, _) => earliest,
        LocalResult::None => {
            return Err(AstroError::invalid(
                "time",
                format!("{naive} does not exist in {tz} (daylight-saving gap)"),
            ))
        }
    };
    let utc = local.with_timezone(&Utc);
    let jd_ut = datetime_to_julian_day(&utc)?;
    let fixed = local.with_timezone(&local.offset().fix());
    Ok(NormalizedInstant {
        jd_ut,
        utc,
        local: fixed,
        timezone: tz,
        time_known: time.is_some(),
    })
}

/// Local noon of `date` in `tz`, as UT.
pub fn local_noon(date: NaiveDate, timezone: &str) -> Result<NormalizedInstant, AstroError> {
    normalize(date, Some(unknown_time_default()), timezone).map(|mut instant| {
        instant.time_known = false;
        instant
    })
}
