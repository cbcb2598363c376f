use crate::model::{DatasetRow, DiagnosisRecordRow, ModelRow, RecordSummary, ReportRow};
use anyhow::Context;
use chrono::{DateTime, Utc};
use rusqlite::{params, Connection};
use std::path::Path;
use std::sync::{Arc, Mutex};

/// Column values for a diagnosis record about to be persisted.
#[derive(Debug)]
pub struct NewDiagnosisRecord<'a> {
    pub file_id: i64,
    pub model_id: i64,
    /// Serialized metrics JSON.
    pub diagnosis_result: &'a str,
    pub tsne_path: &'a str,
    pub confusion_matrix_path: &'a str,
}

#[derive(Clone)]
pub struct Store {
    pub conn: Arc<Mutex<Connection>>,
}

impl Store {
    pub fn open(path: &Path) -> anyhow::Result<Self> {
        let conn = Connection::open(path).context("failed to open sqlite db")?;
        conn.pragma_update(None, "foreign_keys", false)
            .context("disabling foreign-key enforcement")?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    pub fn memory() -> anyhow::Result<Self> {
        // SQLite in-memory DB
        let conn = Connection::open_in_memory().context("failed to open in-memory sqlite db")?;
        conn.pragma_update(None, "foreign_keys", false)
            .context("disabling foreign-key enforcement")?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    pub fn init_schema(&self) -> anyhow::Result<()> {
        let conn = self.conn.lock().unwrap();
        conn.execute_batch(crate::storage::schema::DDL)?;
        Ok(())
    }

    pub fn insert_file(&self, file_name: &str) -> anyhow::Result<i64> {
        let conn = self.conn.lock().unwrap();
        conn.execute(
            "INSERT INTO files(file_name, uploaded_at) VALUES (?1, ?2)",
            params![file_name, Utc::now().to_rfc3339()],
        )?;
        Ok(conn.last_insert_rowid())
    }

    pub fn insert_model(&self, model_name: &str) -> anyhow::Result<i64> {
        let conn = self.conn.lock().unwrap();
        conn.execute(
            "INSERT INTO models(model_name, uploaded_at) VALUES (?1, ?2)",
            params![model_name, Utc::now().to_rfc3339()],
        )?;
        Ok(conn.last_insert_rowid())
    }

    pub fn get_file(&self, file_id: i64) -> anyhow::Result<Option<DatasetRow>> {
        let conn = self.conn.lock().unwrap();
        let mut stmt =
            conn.prepare("SELECT file_id, file_name, uploaded_at FROM files WHERE file_id=?1")?;
        let mut rows = stmt.query(params![file_id])?;
        if let Some(row) = rows.next()? {
            Ok(Some(DatasetRow {
                file_id: row.get(0)?,
                file_name: row.get(1)?,
                uploaded_at: ts_from_sql(2, row.get(2)?)?,
            }))
        } else {
            Ok(None)
        }
    }

    pub fn get_model(&self, model_id: i64) -> anyhow::Result<Option<ModelRow>> {
        let conn = self.conn.lock().unwrap();
        let mut stmt = conn
            .prepare("SELECT model_id, model_name, uploaded_at FROM models WHERE model_id=?1")?;
        let mut rows = stmt.query(params![model_id])?;
        if let Some(row) = rows.next()? {
            Ok(Some(ModelRow {
                model_id: row.get(0)?,
                model_name: row.get(1)?,
                uploaded_at: ts_from_sql(2, row.get(2)?)?,
            }))
        } else {
            Ok(None)
        }
    }

    pub fn list_files(&self) -> anyhow::Result<Vec<DatasetRow>> {
        let conn = self.conn.lock().unwrap();
        let mut stmt =
            conn.prepare("SELECT file_id, file_name, uploaded_at FROM files ORDER BY file_id")?;
        let rows = stmt.query_map([], |row| {
            Ok(DatasetRow {
                file_id: row.get(0)?,
                file_name: row.get(1)?,
                uploaded_at: ts_from_sql(2, row.get(2)?)?,
            })
        })?;
        collect_rows(rows)
    }

    pub fn list_models(&self) -> anyhow::Result<Vec<ModelRow>> {
        let conn = self.conn.lock().unwrap();
        let mut stmt = conn
            .prepare("SELECT model_id, model_name, uploaded_at FROM models ORDER BY model_id")?;
        let rows = stmt.query_map([], |row| {
            Ok(ModelRow {
                model_id: row.get(0)?,
                model_name: row.get(1)?,
                uploaded_at: ts_from_sql(2, row.get(2)?)?,
            })
        })?;
        collect_rows(rows)
    }

    /// Persist a diagnosis record, its report, and the bidirectional link as
    /// one transaction. A failure at any point rolls the whole unit back, so
    /// a report-less record is never left behind.
    ///
    /// The report filename carries the generated record id, so two runs of
    /// the same dataset/model pair completing within the same second cannot
    /// collide on the report path.
    pub fn create_record_with_report(
        &self,
        new: &NewDiagnosisRecord<'_>,
        report_name: &str,
        reports_dir: &Path,
        created_at: DateTime<Utc>,
    ) -> anyhow::Result<(DiagnosisRecordRow, ReportRow)> {
        let mut conn = self.conn.lock().unwrap();
        let tx = conn
            .transaction()
            .context("starting diagnosis transaction")?;
        let ts = created_at.to_rfc3339();

        tx.execute(
            "INSERT INTO diagnosis_records(file_id, model_id, diagnosis_result, tsne_path, confusion_matrix_path, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            params![
                new.file_id,
                new.model_id,
                new.diagnosis_result,
                new.tsne_path,
                new.confusion_matrix_path,
                ts
            ],
        )?;
        let record_id = tx.last_insert_rowid();

        let report_path = reports_dir.join(format!("{}_{}.pdf", report_name, record_id));
        let report_path = report_path.to_string_lossy().into_owned();
        tx.execute(
            "INSERT INTO reports(report_name, report_format, report_path, created_at)
             VALUES (?1, ?2, ?3, ?4)",
            params![report_name, "PDF", report_path, ts],
        )?;
        let report_id = tx.last_insert_rowid();

        tx.execute(
            "UPDATE diagnosis_records SET report_id=?1 WHERE record_id=?2",
            params![report_id, record_id],
        )?;
        tx.commit().context("committing diagnosis transaction")?;

        Ok((
            DiagnosisRecordRow {
                record_id,
                file_id: new.file_id,
                model_id: new.model_id,
                diagnosis_result: new.diagnosis_result.to_string(),
                tsne_path: new.tsne_path.to_string(),
                confusion_matrix_path: new.confusion_matrix_path.to_string(),
                report_id: Some(report_id),
                created_at,
            },
            ReportRow {
                report_id,
                report_name: report_name.to_string(),
                report_format: "PDF".to_string(),
                report_path,
                created_at,
            },
        ))
    }

    pub fn get_record(&self, record_id: i64) -> anyhow::Result<Option<DiagnosisRecordRow>> {
        let conn = self.conn.lock().unwrap();
        let mut stmt = conn.prepare(
            "SELECT record_id, file_id, model_id, diagnosis_result, tsne_path,
                    confusion_matrix_path, report_id, created_at
             FROM diagnosis_records WHERE record_id=?1",
        )?;
        let mut rows = stmt.query(params![record_id])?;
        if let Some(row) = rows.next()? {
            Ok(Some(DiagnosisRecordRow {
                record_id: row.get(0)?,
                file_id: row.get(1)?,
                model_id: row.get(2)?,
                diagnosis_result: row.get(3)?,
                tsne_path: row.get(4)?,
                confusion_matrix_path: row.get(5)?,
                report_id: row.get(6)?,
                created_at: ts_from_sql(7, row.get(7)?)?,
            }))
        } else {
            Ok(None)
        }
    }

    pub fn get_report(&self, report_id: i64) -> anyhow::Result<Option<ReportRow>> {
        let conn = self.conn.lock().unwrap();
        let mut stmt = conn.prepare(
            "SELECT report_id, report_name, report_format, report_path, created_at
             FROM reports WHERE report_id=?1",
        )?;
        let mut rows = stmt.query(params![report_id])?;
        if let Some(row) = rows.next()? {
            Ok(Some(ReportRow {
                report_id: row.get(0)?,
                report_name: row.get(1)?,
                report_format: row.get(2)?,
                report_path: row.get(3)?,
                created_at: ts_from_sql(4, row.get(4)?)?,
            }))
        } else {
            Ok(None)
        }
    }

    /// Listing view joined against files, models, and reports. Referents
    /// deleted out from under a record degrade to placeholder names.
    pub fn list_records(&self) -> anyhow::Result<Vec<RecordSummary>> {
        let conn = self.conn.lock().unwrap();
        let mut stmt = conn.prepare(
            "SELECT r.record_id,
                    COALESCE(f.file_name, 'Unknown'),
                    COALESCE(m.model_name, 'Unknown'),
                    r.created_at,
                    COALESCE(p.report_name, 'No Report'),
                    COALESCE(p.report_path, '')
             FROM diagnosis_records r
             LEFT JOIN files f ON r.file_id = f.file_id
             LEFT JOIN models m ON r.model_id = m.model_id
             LEFT JOIN reports p ON r.report_id = p.report_id
             ORDER BY r.record_id DESC",
        )?;
        let rows = stmt.query_map([], |row| {
            Ok(RecordSummary {
                record_id: row.get(0)?,
                file_name: row.get(1)?,
                model_name: row.get(2)?,
                created_at: ts_from_sql(3, row.get(3)?)?,
                report_name: row.get(4)?,
                report_path: row.get(5)?,
            })
        })?;
        collect_rows(rows)
    }

    /// Delete a record and its report row as one transaction. The caller is
    /// responsible for removing the rendered report file first.
    pub fn delete_record(&self, record_id: i64) -> anyhow::Result<()> {
        let mut conn = self.conn.lock().unwrap();
        let tx = conn.transaction().context("starting delete transaction")?;
        tx.execute(
            "DELETE FROM reports WHERE report_id IN
               (SELECT report_id FROM diagnosis_records WHERE record_id=?1)",
            params![record_id],
        )?;
        tx.execute(
            "DELETE FROM diagnosis_records WHERE record_id=?1",
            params![record_id],
        )?;
        tx.commit().context("committing delete transaction")?;
        Ok(())
    }
}

fn collect_rows<T>(
    rows: impl Iterator<Item = rusqlite::Result<T>>,
) -> anyhow::Result<Vec<T>> {
    let mut out = Vec::new();
    for r in rows {
        out.push(r?);
    }
    Ok(out)
}

fn ts_from_sql(idx: usize, raw: String) -> rusqlite::Result<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(&raw)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| {
            rusqlite::Error::FromSqlConversionFailure(idx, rusqlite::types::Type::Text, Box::new(e))
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn seeded_store() -> (Store, i64, i64) {
        let store = Store::memory().unwrap();
        store.init_schema().unwrap();
        let file_id = store.insert_file("vibration.zip").unwrap();
        let model_id = store.insert_model("convlf.pt").unwrap();
        (store, file_id, model_id)
    }

    #[test]
    fn record_and_report_are_linked_both_ways() {
        let (store, file_id, model_id) = seeded_store();
        let new = NewDiagnosisRecord {
            file_id,
            model_id,
            diagnosis_result: r#"{"accuracy":0.95}"#,
            tsne_path: "/srv/reports/t-SNE_Visualization.png",
            confusion_matrix_path: "/srv/reports/Confusion_Matrix.png",
        };
        let (record, report) = store
            .create_record_with_report(
                &new,
                "convlf.pt_vibration.zip_20260101120000",
                Path::new("/srv/reports"),
                Utc::now(),
            )
            .unwrap();

        assert_eq!(record.report_id, Some(report.report_id));
        assert_eq!(report.report_format, "PDF");
        assert!(report
            .report_path
            .ends_with(&format!("_{}.pdf", record.record_id)));

        let fetched = store.get_record(record.record_id).unwrap().unwrap();
        assert_eq!(fetched.report_id, Some(report.report_id));
        let fetched_report = store.get_report(report.report_id).unwrap().unwrap();
        assert_eq!(fetched_report.report_name, report.report_name);
    }

    #[test]
    fn listing_degrades_missing_referents_to_placeholders() {
        let (store, file_id, model_id) = seeded_store();
        let new = NewDiagnosisRecord {
            file_id,
            model_id,
            diagnosis_result: "{}",
            tsne_path: "t",
            confusion_matrix_path: "c",
        };
        store
            .create_record_with_report(&new, "r", Path::new("/tmp"), Utc::now())
            .unwrap();

        {
            let conn = store.conn.lock().unwrap();
            conn.execute("DELETE FROM files WHERE file_id=?1", params![file_id])
                .unwrap();
        }

        let records = store.list_records().unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].file_name, "Unknown");
        assert_eq!(records[0].model_name, "convlf.pt");
    }

    #[test]
    fn delete_record_removes_both_rows() {
        let (store, file_id, model_id) = seeded_store();
        let new = NewDiagnosisRecord {
            file_id,
            model_id,
            diagnosis_result: "{}",
            tsne_path: "t",
            confusion_matrix_path: "c",
        };
        let (record, report) = store
            .create_record_with_report(&new, "r", Path::new("/tmp"), Utc::now())
            .unwrap();

        store.delete_record(record.record_id).unwrap();
        assert!(store.get_record(record.record_id).unwrap().is_none());
        assert!(store.get_report(report.report_id).unwrap().is_none());
    }

    #[test]
    fn missing_lookups_return_none() {
        let (store, _, _) = seeded_store();
        assert!(store.get_file(9999).unwrap().is_none());
        assert!(store.get_model(9999).unwrap().is_none());
        assert!(store.get_record(9999).unwrap().is_none());
    }
}
