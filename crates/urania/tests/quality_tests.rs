use serde_json::json;
use urania::quality::{check_llm_output, codes};
use urania::{check_narrative, detect_numeric_hallucination, validate};

#[test]
fn test_orb_hallucination() {
    let computed = json!({"aspects": [{"first": "sun", "second": "moon", "kind": "sextile", "orb": 2.0}]});
    assert_eq!(
        detect_numeric_hallucination("orb is 5 degrees", &computed),
        vec!["5".to_string()]
    );
    let report = check_narrative("The Sun sextiles the Moon with an orb of 2 degrees.", &computed);
    assert!(report.passed());
}

#[test]
fn test_facts_without_birth_time() {
    let computed = json!({
        "positions": [
            {"body": "sun", "longitude": 280.4, "speed": 1.02, "retrograde": false, "house": null},
            {"body": "mercury", "longitude": 271.9, "speed": -0.3, "retrograde": true, "house": null}
        ],
        "houses": null,
        "provenance": {"location": {"coords": {"lat": 40.7, "lon": -74.0}, "coords_source": "user"}}
    });
    let report = validate(&computed, false);
    assert!(report.passed(), "{:?}", report.errors);
    assert!(report.has_warning(codes::HOUSES_NOT_COMPUTED_NO_BIRTHTIME));
}

#[test]
fn test_broken_facts() {
    let computed = json!({
        "positions": [
            {"body": "sun", "longitude": 361.0, "speed": 1.0, "retrograde": false},
            {"body": "mars", "longitude": 10.0, "speed": null, "retrograde": false},
            {"body": "venus", "longitude": 20.0, "speed": -0.2, "retrograde": false, "house": 3}
        ],
        "houses": [0, 30, 60, 90, 120, 150, 180, 210, 240, 270, 300],
        "provenance": {"location": {"coords": {"lat": 95.0, "lon": 0.0}, "coords_source": "geocoder"}}
    });
    let report = validate(&computed, true);
    for code in [
        codes::LONGITUDE_RANGE,
        codes::NON_FINITE_SPEED,
        codes::RETROGRADE_MISMATCH,
        codes::HOUSES_COUNT_INVALID,
        codes::COORD_RANGE,
        codes::GEOCODER_METADATA_MISSING,
    ] {
        assert!(report.has_error(code), "missing {code}");
    }
}

#[test]
fn test_structured_interpretation() {
    let computed = json!({"score": 72, "date": "2024-05-01"});
    let output = json!({
        "summary": "A score of 72 on 2024-05-01.",
        "claims": [{"text": "Supportive day", "rule_id": "fav.score.good"}]
    });
    assert!(check_llm_output(&output, &computed).passed());

    let output = json!({"claims": [{"text": "Luck rises by 40"}]});
    let report = check_llm_output(&output, &computed);
    assert!(report.has_error(codes::MISSING_RULE_ID));
    assert!(report.has_error(codes::LLM_NUMERIC_HALLUCINATION));
}
