mod common;

use chrono::{Duration, NaiveDate};
use common::{transit_stub, JAN_2024};
use urania::transits::TransitSearch;
use urania::{
    AspectKind, AstroError, BodyId, BodyPosition, CancelToken, ChartEngine, EngineConfig, EngineMode, OrbTable,
};

fn jan(day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 1, day).unwrap()
}

fn natal_sun() -> Vec<BodyPosition> {
    vec![BodyPosition::stationary(BodyId::Sun, 100.0)]
}

#[test]
fn test_transit_reported_once_on_tightest_day() {
    let engine = ChartEngine::new(transit_stub(), EngineConfig::default()).unwrap();
    let transits = engine.compute_transits(&natal_sun(), jan(1), jan(11)).unwrap().transits;

    assert_eq!(transits.len(), 1, "{transits:?}");
    let trine = &transits[0];
    assert_eq!(trine.transiting, BodyId::Jupiter);
    assert_eq!(trine.natal, BodyId::Sun);
    assert_eq!(trine.aspect, AspectKind::Trine);
    assert_eq!(trine.date, jan(5));
    assert_eq!(trine.jd_ut, JAN_2024 + 4.0);
    assert!(trine.orb < 1e-9);
    assert!(!trine.applying);
}

#[test]
fn test_transits_are_idempotent() {
    let engine = ChartEngine::new(transit_stub(), EngineConfig::default()).unwrap();
    let first = engine.compute_transits(&natal_sun(), jan(1), jan(11)).unwrap();
    let second = engine.compute_transits(&natal_sun(), jan(1), jan(11)).unwrap();
    assert_eq!(first, second);
}

#[test]
fn test_daily_transits_follow_the_orb() {
    let engine = ChartEngine::new(transit_stub(), EngineConfig::default()).unwrap();

    // 118 degrees apart: outside Jupiter's 1.5 degree transit orb
    assert!(engine.daily_transits(&natal_sun(), jan(1)).unwrap().transits.is_empty());

    let day = engine.daily_transits(&natal_sun(), jan(4)).unwrap().transits;
    assert_eq!(day.len(), 1);
    assert!((day[0].orb - 0.5).abs() < 1e-9);
    assert!(day[0].applying);

    let day = engine.daily_transits(&natal_sun(), jan(7)).unwrap().transits;
    assert!(!day[0].applying);
}

#[test]
fn test_cancelled_search_returns_nothing() {
    let engine = ChartEngine::new(transit_stub(), EngineConfig::default()).unwrap();
    let token = CancelToken::new();
    token.cancel();
    let result = engine.compute_transits_with_cancel(&natal_sun(), jan(1), jan(31), token);
    assert_eq!(result, Err(AstroError::Cancelled));
}

#[test]
fn test_reversed_range_is_rejected() {
    let engine = ChartEngine::new(transit_stub(), EngineConfig::default()).unwrap();
    let err = engine.compute_transits(&natal_sun(), jan(10), jan(1)).unwrap_err();
    assert!(err.is_input_error());
}

#[test]
fn test_major_transit_dates() {
    let eph = transit_stub();
    let search = TransitSearch::new(&eph, OrbTable::transit());
    let exact = search
        .major_transit_dates(&natal_sun(), jan(1), jan(11), BodyId::Jupiter)
        .unwrap();

    assert_eq!(exact.len(), 1);
    assert_eq!(exact[0].date, jan(1) + Duration::days(4));
    assert_eq!(exact[0].aspect, AspectKind::Trine);

    // a window ending on the exact day does not confirm it
    let open = search
        .major_transit_dates(&natal_sun(), jan(1), jan(5), BodyId::Jupiter)
        .unwrap();
    assert!(open.is_empty());

    assert!(search
        .major_transit_dates(&natal_sun(), jan(1), jan(5), BodyId::SouthNode)
        .is_err());
}

#[test]
fn test_exact_date_on_two_day_minimum() {
    // orbs to the natal Sun from Jan 4 to Jan 7: 1.5, 0.5, 0.5, 1.5
    let eph = transit_stub().with_body(BodyId::Jupiter, 215.5, 1.0);
    let search = TransitSearch::new(&eph, OrbTable::transit());
    let exact = search
        .major_transit_dates(&natal_sun(), jan(1), jan(11), BodyId::Jupiter)
        .unwrap();

    assert_eq!(exact.len(), 1, "{exact:?}");
    assert_eq!(exact[0].date, jan(6));
    assert_eq!(exact[0].aspect, AspectKind::Trine);
    assert!((exact[0].orb - 0.5).abs() < 1e-9);
}

#[test]
fn test_engine_major_dates_carry_provenance() {
    let engine = ChartEngine::new(transit_stub(), EngineConfig::default()).unwrap();
    let report = engine
        .major_transit_dates(&natal_sun(), jan(1), jan(11), BodyId::Jupiter)
        .unwrap();

    assert_eq!(report.transits.len(), 1);
    assert_eq!(report.transits[0].date, jan(5));
    assert_eq!(report.provenance.ephemeris_engine, EngineMode::Moshier);
    assert_eq!(report.provenance.time.jd_ut, JAN_2024);
    assert_eq!(report.provenance.time.timezone, "UTC");
    assert!(report.provenance.location.is_none());
    assert!(report.provenance.house_system.is_none());
}

#[test]
fn test_transit_window_provenance_starts_at_first_day() {
    let engine = ChartEngine::new(transit_stub(), EngineConfig::default()).unwrap();
    let report = engine.compute_transits(&natal_sun(), jan(3), jan(11)).unwrap();

    assert_eq!(report.transits.len(), 1);
    assert_eq!(report.provenance.time.jd_ut, JAN_2024 + 2.0);
    assert!(report.provenance.time.dt_utc.starts_with("2024-01-03T00:00:00"));
    assert_eq!(report.provenance.flags, "MOSEPH|SPEED");
    assert_eq!(report.provenance.calculation_version, engine.config().calculation_version);

    let day = engine.daily_transits(&natal_sun(), jan(4)).unwrap();
    assert_eq!(day.provenance.time.jd_ut, JAN_2024 + 3.0);
}

#[test]
fn test_cancelled_major_dates_search() {
    let engine = ChartEngine::new(transit_stub(), EngineConfig::default()).unwrap();
    let token = CancelToken::new();
    token.cancel();
    let start = NaiveDate::from_ymd_opt(1900, 1, 1).unwrap();
    let end = NaiveDate::from_ymd_opt(2099, 12, 31).unwrap();
    let result = engine.major_transit_dates_with_cancel(&natal_sun(), start, end, BodyId::Saturn, token);
    assert_eq!(result, Err(AstroError::Cancelled));
}

#[test]
fn test_retrograde_bodies() {
    let engine = ChartEngine::new(transit_stub(), EngineConfig::default()).unwrap();
    assert_eq!(engine.retrograde_bodies(jan(1)).unwrap(), vec![BodyId::Mercury]);
}
