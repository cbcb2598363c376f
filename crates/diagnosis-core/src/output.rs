use crate::model::MetricSet;
use lazy_static::lazy_static;
use regex::Regex;
use thiserror::Error;

/// Marker token the evaluator prints in front of the JSON result object.
pub const RESULT_MARKER: &str = "diagnosis_result-eval";

lazy_static! {
    // `.` does not cross newlines, so the object is confined to the
    // marker's own line; the first match in the stream wins.
    static ref RESULT_RE: Regex =
        Regex::new(r"diagnosis_result-eval\s*(\{.*\})").expect("result regex");
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ParseError {
    #[error("result marker `{RESULT_MARKER}` not found in evaluator output")]
    MarkerNotFound,
    #[error("malformed result payload: {0}")]
    MalformedPayload(String),
}

/// Extract and decode the structured result line from raw evaluator stdout.
///
/// Absent metrics decode to `None` rather than failing the parse; a present
/// metric that is non-finite or outside `[0, 1]` rejects the payload.
pub fn parse(raw_stdout: &str) -> Result<MetricSet, ParseError> {
    let caps = RESULT_RE
        .captures(raw_stdout)
        .ok_or(ParseError::MarkerNotFound)?;
    let payload = &caps[1];

    let metrics: MetricSet = serde_json::from_str(payload)
        .map_err(|e| ParseError::MalformedPayload(e.to_string()))?;

    for (name, value) in metrics.named() {
        if let Some(v) = value {
            if !v.is_finite() || !(0.0..=1.0).contains(&v) {
                return Err(ParseError::MalformedPayload(format!(
                    "{} out of range: {}",
                    name, v
                )));
            }
        }
    }

    Ok(metrics)
}
