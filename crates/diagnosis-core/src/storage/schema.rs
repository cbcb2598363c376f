pub const DDL: &str = r#"
CREATE TABLE IF NOT EXISTS files (
  file_id INTEGER PRIMARY KEY AUTOINCREMENT,
  file_name TEXT NOT NULL,
  uploaded_at TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS models (
  model_id INTEGER PRIMARY KEY AUTOINCREMENT,
  model_name TEXT NOT NULL,
  uploaded_at TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS reports (
  report_id INTEGER PRIMARY KEY AUTOINCREMENT,
  report_name TEXT NOT NULL,
  report_format TEXT NOT NULL,
  report_path TEXT NOT NULL,
  created_at TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS diagnosis_records (
  record_id INTEGER PRIMARY KEY AUTOINCREMENT,
  file_id INTEGER NOT NULL REFERENCES files(file_id),
  model_id INTEGER NOT NULL REFERENCES models(model_id),
  diagnosis_result TEXT NOT NULL,
  tsne_path TEXT NOT NULL,
  confusion_matrix_path TEXT NOT NULL,
  report_id INTEGER REFERENCES reports(report_id),
  created_at TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_records_report ON diagnosis_records(report_id);
"#;
