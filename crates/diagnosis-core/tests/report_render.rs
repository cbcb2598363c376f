//! Renderer behavior: lenient on missing visuals, hard on write failures.

use chrono::Utc;
use diagnosis_core::report::pdf::render_pdf;
use diagnosis_core::storage::store::NewDiagnosisRecord;
use diagnosis_core::storage::Store;
use std::path::Path;

const PIXEL_PNG: [u8; 70] = [
    137, 80, 78, 71, 13, 10, 26, 10, 0, 0, 0, 13, 73, 72, 68, 82, 0, 0, 0, 1, 0, 0, 0, 1, 8, 6,
    0, 0, 0, 31, 21, 196, 137, 0, 0, 0, 13, 73, 68, 65, 84, 120, 218, 99, 252, 207, 192, 80, 15,
    0, 4, 133, 1, 128, 132, 169, 140, 33, 0, 0, 0, 0, 73, 69, 78, 68, 174, 66, 96, 130,
];

fn seeded(reports_dir: &Path, confusion_matrix_path: &str) -> (Store, i64) {
    let store = Store::memory().unwrap();
    store.init_schema().unwrap();
    let file_id = store.insert_file("vibration.zip").unwrap();
    let model_id = store.insert_model("convlf.pt").unwrap();
    let new = NewDiagnosisRecord {
        file_id,
        model_id,
        diagnosis_result: r#"{"accuracy":0.95,"f1":0.935}"#,
        tsne_path: "t-SNE_Visualization.png",
        confusion_matrix_path,
    };
    let (record, _report) = store
        .create_record_with_report(
            &new,
            "convlf.pt_vibration.zip_20260101000000",
            reports_dir,
            Utc::now(),
        )
        .unwrap();
    (store, record.record_id)
}

fn fetch(store: &Store, record_id: i64) -> (diagnosis_core::model::DiagnosisRecordRow, diagnosis_core::model::ReportRow) {
    let record = store.get_record(record_id).unwrap().unwrap();
    let report = store.get_report(record.report_id.unwrap()).unwrap().unwrap();
    (record, report)
}

#[test]
fn renders_document_with_embedded_image() {
    let tmp = tempfile::tempdir().unwrap();
    let image = tmp.path().join("Confusion_Matrix.png");
    std::fs::write(&image, PIXEL_PNG).unwrap();

    let (store, record_id) = seeded(tmp.path(), &image.to_string_lossy());
    let (record, report) = fetch(&store, record_id);

    render_pdf(&store, &record, &report).unwrap();
    let pdf = std::fs::read(&report.report_path).unwrap();
    assert!(pdf.starts_with(b"%PDF"));
}

#[test]
fn missing_confusion_matrix_image_is_not_fatal() {
    let tmp = tempfile::tempdir().unwrap();
    let gone = tmp.path().join("Confusion_Matrix.png");

    let (store, record_id) = seeded(tmp.path(), &gone.to_string_lossy());
    let (record, report) = fetch(&store, record_id);

    render_pdf(&store, &record, &report).unwrap();
    assert!(Path::new(&report.report_path).exists());
}

#[test]
fn deleted_referents_render_with_placeholder_names() {
    let tmp = tempfile::tempdir().unwrap();
    let (store, record_id) = seeded(tmp.path(), "missing.png");
    {
        let conn = store.conn.lock().unwrap();
        conn.execute("DELETE FROM files", []).unwrap();
        conn.execute("DELETE FROM models", []).unwrap();
    }
    let (record, report) = fetch(&store, record_id);

    render_pdf(&store, &record, &report).unwrap();
    assert!(Path::new(&report.report_path).exists());
}

#[test]
fn unwritable_target_path_is_a_hard_error() {
    let tmp = tempfile::tempdir().unwrap();
    let (store, record_id) = seeded(&tmp.path().join("nonexistent-dir"), "missing.png");
    let (record, report) = fetch(&store, record_id);

    assert!(render_pdf(&store, &record, &report).is_err());
}
