mod common;

use chrono::{Duration, NaiveDate};
use common::{transit_stub, JAN_2024};
use urania::favorability::{ALTERNATIVE_MIN_SCORE, MAX_ALTERNATIVES};
use urania::{
    BodyId, BodyPosition, ChartEngine, EngineConfig, EngineMode, EventType, FavorabilityLevel,
    LunarPhase, MeanElementsEphemeris,
};

fn jan(day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 1, day).unwrap()
}

#[test]
fn test_matched_retrograde_penalty() {
    let engine = ChartEngine::new(transit_stub(), EngineConfig::default()).unwrap();
    let result = engine.score_event(None, jan(1), EventType::Contract).unwrap().result;

    assert_eq!(result.score, 35);
    assert_eq!(result.level, FavorabilityLevel::Challenging);
    assert_eq!(result.risk_factors, vec!["Mercury retrograde".to_string()]);
    assert_eq!(result.lunar_phase, LunarPhase::FullMoon);
    assert_eq!(result.retrograde_bodies, vec![BodyId::Mercury]);
    // every day in the window carries the same retrograde Mercury
    assert!(result.alternative_dates.is_empty());
}

#[test]
fn test_lunar_bonus_and_unmatched_retrograde() {
    let engine = ChartEngine::new(transit_stub(), EngineConfig::default()).unwrap();
    let result = engine.score_event(None, jan(1), EventType::Travel).unwrap().result;

    assert_eq!(result.score, 55);
    assert_eq!(result.level, FavorabilityLevel::Neutral);
    assert_eq!(
        result.positive_factors,
        vec!["Favorable lunar phase: full_moon".to_string()]
    );
    assert!(result.risk_factors.is_empty());
    assert!(result.alternative_dates.is_empty());
}

#[test]
fn test_personal_transits_count() {
    let engine = ChartEngine::new(transit_stub(), EngineConfig::default()).unwrap();
    let natal = vec![BodyPosition::stationary(BodyId::Sun, 100.0)];
    let result = engine.score_event(Some(natal.as_slice()), jan(5), EventType::Travel).unwrap().result;

    assert_eq!(result.transits.len(), 1);
    assert_eq!(
        result.positive_factors,
        vec!["Jupiter trine natal Sun".to_string()]
    );
    assert_eq!(result.lunar_phase, LunarPhase::WaningGibbous);
    assert_eq!(result.score, 50);
}

#[test]
fn test_alternatives_are_nearby_better_days() {
    let engine = ChartEngine::new(MeanElementsEphemeris::new(), EngineConfig::default()).unwrap();
    let start = NaiveDate::from_ymd_opt(2023, 3, 1).unwrap();

    for offset in (0..120).step_by(9) {
        let date = start + Duration::days(offset);
        for event in EventType::ALL {
            let result = engine.score_event(None, date, event).unwrap().result;
            assert!(result.score <= 100);
            assert!(result.alternative_dates.len() <= MAX_ALTERNATIVES);
            if result.score >= 50 {
                assert!(result.alternative_dates.is_empty());
            }
            for pair in result.alternative_dates.windows(2) {
                assert!(pair[0].score >= pair[1].score);
            }
            for alt in &result.alternative_dates {
                assert_ne!(alt.date, date);
                assert!(alt.score >= ALTERNATIVE_MIN_SCORE);
                assert!((alt.date - date).num_days().abs() <= 7);
            }
        }
    }
}

#[test]
fn test_unsupported_date_is_rejected() {
    let engine = ChartEngine::new(transit_stub(), EngineConfig::default()).unwrap();
    let far = NaiveDate::from_ymd_opt(3500, 1, 1).unwrap();
    assert!(engine
        .score_event(None, far, EventType::Wedding)
        .unwrap_err()
        .is_input_error());
}

#[test]
fn test_score_carries_provenance() {
    let config = EngineConfig {
        default_timezone: "Europe/Moscow".to_string(),
        ..EngineConfig::default()
    };
    let engine = ChartEngine::new(transit_stub(), config).unwrap();
    let report = engine.score_event(None, jan(1), EventType::Travel).unwrap();

    assert_eq!(report.result.date, jan(1));
    assert_eq!(report.provenance.ephemeris_engine, EngineMode::Moshier);
    assert_eq!(report.provenance.time.jd_ut, JAN_2024);
    assert_eq!(report.provenance.time.timezone, "Europe/Moscow");
    assert!(report.provenance.time.dt_local.starts_with("2024-01-01T03:00:00"));
    assert!(report.provenance.location.is_none());

    let json = serde_json::to_value(&report).unwrap();
    assert_eq!(json["result"]["score"], report.result.score);
    assert!(json["provenance"]["calculation_version"].is_string());
}
