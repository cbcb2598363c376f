use std::fmt::{Display, Formatter};
use std::path::PathBuf;
use thiserror::Error;

use crate::output::ParseError;

/// Which persisted entity a lookup failed on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntityKind {
    Dataset,
    Model,
    Record,
}

impl Display for EntityKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            EntityKind::Dataset => write!(f, "dataset"),
            EntityKind::Model => write!(f, "model"),
            EntityKind::Record => write!(f, "diagnosis record"),
        }
    }
}

/// Failure taxonomy for one diagnosis run.
///
/// Steps before persistence fail fast with no side effects. `Persistence`
/// aborts before any report row exists. `Render` is reported to the caller
/// but leaves the committed record and report rows in place.
#[derive(Debug, Error)]
pub enum DiagnosisError {
    #[error("{entity} {id} not found")]
    NotFound { entity: EntityKind, id: i64 },

    /// The row exists but the file it points at is gone from disk.
    #[error("artifact missing on disk: {}", .path.display())]
    ArtifactMissing { path: PathBuf },

    #[error("evaluator failed (exit {}): {}", exit_display(.exit), .stderr)]
    EvaluatorFailed { exit: Option<i32>, stderr: String },

    #[error("evaluator output invalid: {0}")]
    EvaluatorOutputInvalid(#[from] ParseError),

    #[error("persistence error: {0}")]
    Persistence(#[source] anyhow::Error),

    #[error("report rendering failed: {0}")]
    Render(#[source] anyhow::Error),
}

fn exit_display(exit: &Option<i32>) -> String {
    match exit {
        Some(code) => code.to_string(),
        None => "none".to_string(),
    }
}

#[derive(Debug)]
pub struct ConfigError(pub String);

impl Display for ConfigError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "ConfigError: {}", self.0)
    }
}
impl std::error::Error for ConfigError {}
