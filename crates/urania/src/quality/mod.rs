//! Structural validation of computed facts and screening of generated text.

pub mod narrative;
pub mod report;
pub mod structural;

pub use narrative::{check_llm_output, check_narrative, detect_numeric_hallucination, enforce_claims};
pub use report::{codes, QualityIssue, QualityReport};
pub use structural::{validate, validate_chart};
