use crate::quality::report::{codes, QualityReport};
use lazy_static::lazy_static;
use regex::Regex;
use serde_json::Value;
use std::collections::HashSet;

lazy_static! {
    // a minus sign right after a digit is a range or date separator
    static ref NUMERIC_PATTERN: Regex = Regex::new(r"(?:^|[^0-9])(-?\d+(?:\.\d+)?)").unwrap();
}

fn numeric_literals(text: &str) -> impl Iterator<Item = &str> {
    NUMERIC_PATTERN
        .captures_iter(text)
        .filter_map(|c| c.get(1))
        .map(|m| m.as_str())
}

/// Every number the computed facts can vouch for.
struct AllowSet {
    literals: HashSet<String>,
    values: Vec<f64>,
}

impl AllowSet {
    fn from_facts(facts: &Value) -> Self {
        let mut set = Self {
            literals: HashSet::new(),
            values: Vec::new(),
        };
        set.collect(facts);
        set
    }

    fn collect(&mut self, value: &Value) {
        match value {
            Value::Number(n) => {
                self.literals.insert(n.to_string());
                if let Some(v) = n.as_f64() {
                    self.values.push(v);
                }
            }
            // dates, timestamps and labels carry numbers too
            Value::String(s) => {
                for literal in numeric_literals(s) {
                    self.literals.insert(literal.to_string());
                    if let Ok(v) = literal.parse::<f64>() {
                        self.values.push(v);
                    }
                }
            }
            Value::Array(items) => items.iter().for_each(|v| self.collect(v)),
            Value::Object(map) => map.values().for_each(|v| self.collect(v)),
            Value::Bool(_) | Value::Null => {}
        }
    }

    /// A text literal is grounded when it equals a fact, or a fact rounded
    /// or truncated to the literal's number of decimals.
    fn allows(&self, literal: &str) -> bool {
        if self.literals.contains(literal) {
            return true;
        }
        let Ok(text_value) = literal.parse::<f64>() else {
            return false;
        };
        let decimals = literal.split_once('.').map_or(0, |(_, frac)| frac.len()) as i32;
        let scale = 10f64.powi(decimals);
        let scaled_text = (text_value * scale).round();
        self.values.iter().any(|fact| {
            let scaled = fact * scale;
            scaled.round() == scaled_text || scaled.trunc() == scaled_text
        })
    }
}

/// Numeric literals in `text` that no computed fact accounts for.
pub fn detect_numeric_hallucination(text: &str, computed: &Value) -> Vec<String> {
    let allowed = AllowSet::from_facts(computed);
    numeric_literals(text)
        .filter(|literal| !allowed.allows(literal))
        .map(str::to_string)
        .collect()
}

/// Screen generated text against the facts it describes.
pub fn check_narrative(text: &str, computed: &Value) -> QualityReport {
    let mut report = QualityReport::new();
    for literal in detect_numeric_hallucination(text, computed) {
        report.add_error_with(codes::LLM_NUMERIC_HALLUCINATION, literal);
    }
    report
}

/// Every entry of `output.claims` must carry a non-empty `rule_id`.
pub fn enforce_claims(output: &Value, report: &mut QualityReport) {
    let Some(claims) = output.get("claims").and_then(Value::as_array) else {
        return;
    };
    for (index, claim) in claims.iter().enumerate() {
        let has_rule = claim
            .get("rule_id")
            .and_then(Value::as_str)
            .map_or(false, |id| !id.trim().is_empty());
        if !has_rule {
            report.add_error_with(codes::MISSING_RULE_ID, format!("claims[{index}]"));
        }
    }
}

fn collect_text(value: &Value, out: &mut Vec<String>) {
    match value {
        Value::String(s) => out.push(s.clone()),
        Value::Array(items) => items.iter().for_each(|v| collect_text(v, out)),
        Value::Object(map) => {
            for (key, v) in map {
                // identifiers are not narrative
                if key != "rule_id" {
                    collect_text(v, out);
                }
            }
        }
        _ => {}
    }
}

/// Full gate for a structured interpretation: claim attribution plus a
/// numeric cross-check of all of its text.
pub fn check_llm_output(output: &Value, computed: &Value) -> QualityReport {
    let mut report = QualityReport::new();
    enforce_claims(output, &mut report);
    let mut texts = Vec::new();
    collect_text(output, &mut texts);
    report.merge(check_narrative(&texts.join("\n"), computed));
    report
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_flags_unknown_number() {
        let computed = json!({"aspects": [{"orb": 2.0}]});
        let found = detect_numeric_hallucination("orb is 5 degrees", &computed);
        assert_eq!(found, vec!["5".to_string()]);
        assert!(detect_numeric_hallucination("orb is 2.0 degrees", &computed).is_empty());
        assert!(detect_numeric_hallucination("orb is 2 degrees", &computed).is_empty());
    }

    #[test]
    fn test_rounding_and_truncation() {
        let computed = json!({"positions": [{"longitude": 123.4567}]});
        assert!(detect_numeric_hallucination("at 123.46", &computed).is_empty());
        assert!(detect_numeric_hallucination("at 123.45", &computed).is_empty());
        assert!(detect_numeric_hallucination("at 123", &computed).is_empty());
        assert_eq!(detect_numeric_hallucination("at 124.1", &computed), vec!["124.1"]);
    }

    #[test]
    fn test_numbers_in_string_facts() {
        let computed = json!({"date": "2024-03-10", "sign": "Leo"});
        assert!(detect_numeric_hallucination("on 2024-03-10", &computed).is_empty());
        assert_eq!(detect_numeric_hallucination("in 2025", &computed), vec!["2025"]);
    }

    #[test]
    fn test_ranges_are_not_negative_numbers() {
        let computed = json!({"houses": [7]});
        assert_eq!(detect_numeric_hallucination("houses 5-7", &computed), vec!["5"]);

        let computed = json!({"houses": [5, 7]});
        assert!(detect_numeric_hallucination("houses 5-7", &computed).is_empty());

        let computed = json!({"speed": -0.5});
        assert!(detect_numeric_hallucination("moving at -0.5 per day", &computed).is_empty());
        assert_eq!(detect_numeric_hallucination("moving at 0.5 per day", &computed), vec!["0.5"]);
    }

    #[test]
    fn test_check_narrative_report() {
        let computed = json!({"score": 72});
        let report = check_narrative("Score 72, luck 99", &computed);
        assert!(!report.passed());
        assert_eq!(report.errors.len(), 1);
        assert_eq!(report.errors[0].detail.as_deref(), Some("99"));
        assert!(check_narrative("No numbers here.", &computed).passed());
    }

    #[test]
    fn test_claims_need_rule_id() {
        let output = json!({"claims": [
            {"text": "Sun trine Moon", "rule_id": "aspect.trine"},
            {"text": "Big changes"},
            {"text": "More", "rule_id": "  "}
        ]});
        let mut report = QualityReport::new();
        enforce_claims(&output, &mut report);
        assert_eq!(report.errors.len(), 2);
        assert!(report.has_error(codes::MISSING_RULE_ID));
    }

    #[test]
    fn test_check_llm_output() {
        let computed = json!({"aspects": [{"orb": 1.5}]});
        let output = json!({"summary": "orb of 1.5", "claims": [{"text": "tight at 7", "rule_id": "r-101"}]});
        let report = check_llm_output(&output, &computed);
        assert!(report.has_error(codes::LLM_NUMERIC_HALLUCINATION));
        assert_eq!(report.errors.len(), 1);
        assert_eq!(report.errors[0].detail.as_deref(), Some("7"));
    }
}
