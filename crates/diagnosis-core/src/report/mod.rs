pub mod pdf;

use crate::model::{metric_display, MetricSet};
use chrono::{DateTime, Utc};

pub const REPORT_TITLE: &str = "Diagnosis Report";

/// Fixed top-to-bottom text content of one report document, title excluded.
/// Kept separate from the PDF plumbing so the layout is testable.
pub(crate) fn body_lines(
    report_name: &str,
    file_name: &str,
    model_name: &str,
    metrics: &MetricSet,
    created_at: DateTime<Utc>,
) -> Vec<String> {
    let mut lines = vec![
        format!("Report Name: {}", report_name),
        format!("File Name: {}", file_name),
        format!("Model Name: {}", model_name),
        "Diagnosis Results:".to_string(),
    ];
    for (label, value) in metrics.named() {
        lines.push(format!("{}: {}", label, metric_display(value)));
    }
    lines.push(format!(
        "Diagnosis Time: {}",
        created_at.format("%Y-%m-%d %H:%M:%S")
    ));
    lines
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn body_lists_fields_in_fixed_order() {
        let metrics = MetricSet {
            accuracy: Some(0.95),
            precision: Some(0.93),
            recall: Some(0.94),
            f1_score: Some(0.935),
            specificity: None,
        };
        let created_at = Utc.with_ymd_and_hms(2026, 3, 14, 9, 26, 53).unwrap();
        let lines = body_lines(
            "convlf.pt_vibration.zip_20260314092653",
            "vibration.zip",
            "convlf.pt",
            &metrics,
            created_at,
        );

        assert_eq!(
            lines,
            vec![
                "Report Name: convlf.pt_vibration.zip_20260314092653",
                "File Name: vibration.zip",
                "Model Name: convlf.pt",
                "Diagnosis Results:",
                "Accuracy: 0.95",
                "Precision: 0.93",
                "Recall: 0.94",
                "F1 Score: 0.935",
                "Specificity: N/A",
                "Diagnosis Time: 2026-03-14 09:26:53",
            ]
        );
    }

    #[test]
    fn empty_metrics_render_as_all_unavailable() {
        let lines = body_lines("r", "f", "m", &MetricSet::default(), Utc::now());
        assert!(lines.contains(&"Accuracy: N/A".to_string()));
        assert!(lines.contains(&"F1 Score: N/A".to_string()));
    }
}
