use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// A registered dataset archive. The on-disk artifact lives at
/// `<uploads_dir>/<file_name>`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatasetRow {
    pub file_id: i64,
    pub file_name: String,
    pub uploaded_at: DateTime<Utc>,
}

/// A registered model artifact at `<models_dir>/<model_name>`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelRow {
    pub model_id: i64,
    pub model_name: String,
    pub uploaded_at: DateTime<Utc>,
}

/// The five named metrics of one evaluator run. `None` means the evaluator
/// did not report that metric ("unavailable"); it renders as `N/A`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MetricSet {
    #[serde(default)]
    pub accuracy: Option<f64>,
    #[serde(default)]
    pub precision: Option<f64>,
    #[serde(default)]
    pub recall: Option<f64>,
    #[serde(default, rename = "f1")]
    pub f1_score: Option<f64>,
    #[serde(default)]
    pub specificity: Option<f64>,
}

impl MetricSet {
    /// Label/value pairs in the fixed report order.
    pub fn named(&self) -> [(&'static str, Option<f64>); 5] {
        [
            ("Accuracy", self.accuracy),
            ("Precision", self.precision),
            ("Recall", self.recall),
            ("F1 Score", self.f1_score),
            ("Specificity", self.specificity),
        ]
    }
}

/// Display form of one metric value; unavailable metrics print as `N/A`.
pub fn metric_display(value: Option<f64>) -> String {
    match value {
        Some(v) => format!("{}", v),
        None => "N/A".to_string(),
    }
}

/// Immutable product of a successful evaluator run: decoded metrics plus the
/// two image artifacts the process wrote into the reports directory.
#[derive(Debug, Clone)]
pub struct EvaluationOutcome {
    pub metrics: MetricSet,
    pub tsne_image: PathBuf,
    pub confusion_matrix_image: PathBuf,
}

/// Persisted outcome of one evaluation run. `report_id` is populated in the
/// same transaction that creates the row; readers never observe it null.
#[derive(Debug, Clone)]
pub struct DiagnosisRecordRow {
    pub record_id: i64,
    pub file_id: i64,
    pub model_id: i64,
    /// Serialized [`MetricSet`] JSON.
    pub diagnosis_result: String,
    pub tsne_path: String,
    pub confusion_matrix_path: String,
    pub report_id: Option<i64>,
    pub created_at: DateTime<Utc>,
}

/// Persisted report metadata; the rendered document lives at `report_path`.
#[derive(Debug, Clone)]
pub struct ReportRow {
    pub report_id: i64,
    pub report_name: String,
    pub report_format: String,
    pub report_path: String,
    pub created_at: DateTime<Utc>,
}

/// Success payload returned to callers of the engine.
#[derive(Debug, Clone, Serialize)]
pub struct DiagnosisOutput {
    pub record_id: i64,
    pub metrics: MetricSet,
    pub tsne_image_url: String,
    pub confusion_matrix_image_url: String,
}

/// Listing view over diagnosis records. Names of referents that have since
/// been deleted fall back to `Unknown` / `No Report`.
#[derive(Debug, Clone, Serialize)]
pub struct RecordSummary {
    pub record_id: i64,
    pub file_name: String,
    pub model_name: String,
    pub created_at: DateTime<Utc>,
    pub report_name: String,
    pub report_path: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn metric_set_decodes_wire_names_and_tolerates_unknown_fields() {
        let m: MetricSet = serde_json::from_str(
            r#"{"accuracy":0.95,"f1":0.935,"extra_field":true,"specificity":0.96}"#,
        )
        .unwrap();
        assert_eq!(m.accuracy, Some(0.95));
        assert_eq!(m.f1_score, Some(0.935));
        assert_eq!(m.specificity, Some(0.96));
        assert_eq!(m.precision, None);
        assert_eq!(m.recall, None);
    }

    #[test]
    fn metric_set_roundtrips_through_result_payload() {
        let m = MetricSet {
            accuracy: Some(0.9),
            precision: None,
            recall: Some(0.8),
            f1_score: Some(0.85),
            specificity: None,
        };
        let json = serde_json::to_string(&m).unwrap();
        assert!(json.contains("\"f1\""));
        let back: MetricSet = serde_json::from_str(&json).unwrap();
        assert_eq!(back, m);
    }

    #[test]
    fn metric_display_marks_unavailable_values() {
        assert_eq!(metric_display(Some(0.935)), "0.935");
        assert_eq!(metric_display(None), "N/A");
    }
}
