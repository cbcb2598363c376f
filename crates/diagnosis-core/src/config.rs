use crate::errors::ConfigError;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

pub const DEFAULT_TIMEOUT_SECS: u64 = 600;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    #[serde(default = "default_db_path")]
    pub db_path: PathBuf,
    #[serde(default = "default_uploads_dir")]
    pub uploads_dir: PathBuf,
    #[serde(default = "default_models_dir")]
    pub models_dir: PathBuf,
    #[serde(default = "default_reports_dir")]
    pub reports_dir: PathBuf,
    pub evaluator: EvaluatorConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EvaluatorConfig {
    /// Argv prefix; the dataset path and model path are appended as the two
    /// positional arguments.
    pub command: Vec<String>,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_db_path() -> PathBuf {
    PathBuf::from("diagnosis.db")
}
fn default_uploads_dir() -> PathBuf {
    PathBuf::from("uploads")
}
fn default_models_dir() -> PathBuf {
    PathBuf::from("models")
}
fn default_reports_dir() -> PathBuf {
    PathBuf::from("reports")
}
fn default_timeout_secs() -> u64 {
    DEFAULT_TIMEOUT_SECS
}

pub fn load_config(path: &Path) -> Result<Config, ConfigError> {
    let raw = std::fs::read_to_string(path)
        .map_err(|e| ConfigError(format!("failed to read config {}: {}", path.display(), e)))?;
    let cfg: Config = serde_yaml::from_str(&raw)
        .map_err(|e| ConfigError(format!("failed to parse YAML: {}", e)))?;
    if cfg.evaluator.command.is_empty() {
        return Err(ConfigError("evaluator.command must not be empty".into()));
    }
    Ok(cfg)
}

pub fn write_sample_config(path: &Path) -> Result<(), ConfigError> {
    std::fs::write(path, include_str!("../../../diagnosis.yaml"))
        .map_err(|e| ConfigError(format!("failed to write sample config: {}", e)))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_full_config() {
        let yaml = r#"
db_path: /var/lib/diag/diag.db
uploads_dir: /srv/uploads
models_dir: /srv/models
reports_dir: /srv/reports
evaluator:
  command: ["python3", "eval.py"]
  timeout_secs: 30
"#;
        let cfg: Config = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(cfg.db_path, PathBuf::from("/var/lib/diag/diag.db"));
        assert_eq!(cfg.evaluator.command, vec!["python3", "eval.py"]);
        assert_eq!(cfg.evaluator.timeout_secs, 30);
    }

    #[test]
    fn missing_paths_fall_back_to_defaults() {
        let yaml = r#"
evaluator:
  command: ["./evaluator"]
"#;
        let cfg: Config = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(cfg.reports_dir, PathBuf::from("reports"));
        assert_eq!(cfg.evaluator.timeout_secs, DEFAULT_TIMEOUT_SECS);
    }

    #[test]
    fn empty_evaluator_command_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("diagnosis.yaml");
        std::fs::write(&path, "evaluator:\n  command: []\n").unwrap();
        let err = load_config(&path).unwrap_err();
        assert!(err.to_string().contains("evaluator.command"));
    }

    #[test]
    fn sample_config_is_loadable() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("diagnosis.yaml");
        write_sample_config(&path).unwrap();
        let cfg = load_config(&path).unwrap();
        assert!(!cfg.evaluator.command.is_empty());
    }
}
