use serde::{Deserialize, Serialize};

/// Stable issue codes.
pub mod codes {
    pub const LONGITUDE_RANGE: &str = "LONGITUDE_RANGE";
    pub const NON_FINITE_SPEED: &str = "NON_FINITE_SPEED";
    pub const RETROGRADE_MISMATCH: &str = "RETROGRADE_MISMATCH";
    pub const HOUSES_SHOULD_BE_NONE: &str = "HOUSES_SHOULD_BE_NONE";
    pub const HOUSES_NOT_COMPUTED_NO_BIRTHTIME: &str = "HOUSES_NOT_COMPUTED_NO_BIRTHTIME";
    pub const HOUSES_MISSING: &str = "HOUSES_MISSING";
    pub const HOUSES_COUNT_INVALID: &str = "HOUSES_COUNT_INVALID";
    pub const HOUSE_ORDERING: &str = "HOUSE_ORDERING";
    pub const HOUSE_ASSIGNED_WITHOUT_BIRTHTIME: &str = "HOUSE_ASSIGNED_WITHOUT_BIRTHTIME";
    pub const HOUSES_WHOLE_SIGN_FALLBACK: &str = "HOUSES_WHOLE_SIGN_FALLBACK";
    pub const COORD_RANGE: &str = "COORD_RANGE";
    pub const GEOCODER_METADATA_MISSING: &str = "GEOCODER_METADATA_MISSING";
    pub const MISSING_RULE_ID: &str = "MISSING_RULE_ID";
    pub const LLM_NUMERIC_HALLUCINATION: &str = "LLM_NUMERIC_HALLUCINATION";
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QualityIssue {
    pub code: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
}

/// Accumulates hard errors and soft warnings for one validation pass.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct QualityReport {
    pub errors: Vec<QualityIssue>,
    pub warnings: Vec<QualityIssue>,
}

impl QualityReport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_error(&mut self, code: &str) {
        self.errors.push(QualityIssue {
            code: code.to_string(),
            detail: None,
        });
    }

    pub fn add_error_with(&mut self, code: &str, detail: impl Into<String>) {
        self.errors.push(QualityIssue {
            code: code.to_string(),
            detail: Some(detail.into()),
        });
    }

    pub fn add_warning(&mut self, code: &str) {
        self.warnings.push(QualityIssue {
            code: code.to_string(),
            detail: None,
        });
    }

    pub fn add_warning_with(&mut self, code: &str, detail: impl Into<String>) {
        self.warnings.push(QualityIssue {
            code: code.to_string(),
            detail: Some(detail.into()),
        });
    }

    /// No errors. Warnings do not fail a report.
    pub fn passed(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn has_error(&self, code: &str) -> bool {
        self.errors.iter().any(|i| i.code == code)
    }

    pub fn has_warning(&self, code: &str) -> bool {
        self.warnings.iter().any(|i| i.code == code)
    }

    pub fn merge(&mut self, other: QualityReport) {
        self.errors.extend(other.errors);
        self.warnings.extend(other.warnings);
    }
}
