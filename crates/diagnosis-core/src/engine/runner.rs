use crate::artifacts;
use crate::config::Config;
use crate::errors::{DiagnosisError, EntityKind};
use crate::evaluator::run_evaluator;
use crate::model::{DiagnosisOutput, EvaluationOutcome, RecordSummary};
use crate::output;
use crate::report::pdf::render_pdf;
use crate::storage::store::NewDiagnosisRecord;
use crate::storage::Store;
use chrono::Utc;
use std::path::Path;
use tracing::{debug, error, warn};

pub struct Runner {
    pub store: Store,
    pub config: Config,
}

impl Runner {
    pub fn new(store: Store, config: Config) -> Self {
        Self { store, config }
    }

    /// Run one diagnosis: resolve the dataset/model pair, invoke the
    /// evaluator, decode its result line, persist the record and linked
    /// report, and render the PDF.
    ///
    /// Every call spawns exactly one evaluator process and, on success,
    /// creates one new record/report pair. There is no deduplication:
    /// callers wanting at-most-once semantics must check existing records
    /// themselves.
    pub fn run_diagnosis(
        &self,
        dataset_id: i64,
        model_id: i64,
    ) -> Result<DiagnosisOutput, DiagnosisError> {
        let file = self
            .store
            .get_file(dataset_id)
            .map_err(DiagnosisError::Persistence)?
            .ok_or(DiagnosisError::NotFound {
                entity: EntityKind::Dataset,
                id: dataset_id,
            })?;
        let model = self
            .store
            .get_model(model_id)
            .map_err(DiagnosisError::Persistence)?
            .ok_or(DiagnosisError::NotFound {
                entity: EntityKind::Model,
                id: model_id,
            })?;

        // A row pointing at a deleted file is a distinct failure from a
        // missing row.
        let dataset_path = self.config.uploads_dir.join(&file.file_name);
        if !dataset_path.exists() {
            return Err(DiagnosisError::ArtifactMissing { path: dataset_path });
        }
        let model_path = self.config.models_dir.join(&model.model_name);
        if !model_path.exists() {
            return Err(DiagnosisError::ArtifactMissing { path: model_path });
        }

        debug!(
            dataset = %dataset_path.display(),
            model = %model_path.display(),
            "invoking evaluator"
        );
        let run = run_evaluator(&self.config.evaluator, &dataset_path, &model_path)
            .map_err(|e| DiagnosisError::EvaluatorFailed {
                exit: None,
                stderr: format!("{:#}", e),
            })?;
        if run.timed_out {
            return Err(DiagnosisError::EvaluatorFailed {
                exit: None,
                stderr: format!(
                    "timed out after {}s",
                    self.config.evaluator.timeout_secs
                ),
            });
        }
        if !run.success {
            return Err(DiagnosisError::EvaluatorFailed {
                exit: run.exit_code,
                stderr: run.stderr_excerpt(),
            });
        }

        // An undecodable result line aborts before any persistence.
        let metrics = output::parse(&run.stdout)?;
        let resolved = artifacts::resolve(&self.config.reports_dir)?;
        let outcome = EvaluationOutcome {
            metrics,
            tsne_image: resolved.tsne_path,
            confusion_matrix_image: resolved.confusion_matrix_path,
        };

        let created_at = Utc::now();
        let report_name = format!(
            "{}_{}_{}",
            model.model_name,
            file.file_name,
            created_at.format("%Y%m%d%H%M%S")
        );
        let result_json = serde_json::to_string(&outcome.metrics)
            .map_err(|e| DiagnosisError::Persistence(e.into()))?;
        let tsne_path = outcome.tsne_image.to_string_lossy();
        let confusion_matrix_path = outcome.confusion_matrix_image.to_string_lossy();
        let new = NewDiagnosisRecord {
            file_id: file.file_id,
            model_id: model.model_id,
            diagnosis_result: &result_json,
            tsne_path: &tsne_path,
            confusion_matrix_path: &confusion_matrix_path,
        };
        let (record, report) = self
            .store
            .create_record_with_report(&new, &report_name, &self.config.reports_dir, created_at)
            .map_err(DiagnosisError::Persistence)?;
        debug!(
            record_id = record.record_id,
            report_id = report.report_id,
            "diagnosis persisted"
        );

        // Rendering failure leaves the committed rows in place but is still
        // an error to the caller.
        if let Err(e) = render_pdf(&self.store, &record, &report) {
            error!("report rendering failed: {:#}", e);
            return Err(DiagnosisError::Render(e));
        }

        Ok(DiagnosisOutput {
            record_id: record.record_id,
            metrics: outcome.metrics,
            tsne_image_url: resolved.tsne_url,
            confusion_matrix_image_url: resolved.confusion_matrix_url,
        })
    }

    pub fn list_records(&self) -> Result<Vec<RecordSummary>, DiagnosisError> {
        self.store.list_records().map_err(DiagnosisError::Persistence)
    }

    /// Delete one diagnosis record, its report row, and the rendered file.
    ///
    /// Only the report file is removed from disk: datasets, models, and
    /// evaluator images were not created by this pipeline and stay put.
    pub fn delete_record(&self, record_id: i64) -> Result<(), DiagnosisError> {
        let record = self
            .store
            .get_record(record_id)
            .map_err(DiagnosisError::Persistence)?
            .ok_or(DiagnosisError::NotFound {
                entity: EntityKind::Record,
                id: record_id,
            })?;

        if let Some(report_id) = record.report_id {
            if let Some(report) = self
                .store
                .get_report(report_id)
                .map_err(DiagnosisError::Persistence)?
            {
                let path = Path::new(&report.report_path);
                if path.exists() {
                    std::fs::remove_file(path).map_err(|e| {
                        DiagnosisError::Persistence(anyhow::anyhow!(
                            "removing report file {}: {}",
                            report.report_path,
                            e
                        ))
                    })?;
                } else {
                    warn!("report file already gone: {}", report.report_path);
                }
            }
        }

        self.store
            .delete_record(record_id)
            .map_err(DiagnosisError::Persistence)
    }
}
