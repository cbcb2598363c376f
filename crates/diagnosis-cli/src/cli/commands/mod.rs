pub mod diagnose;
pub mod init;
pub mod records;
pub mod registry;

use super::args::{Cli, Command};
use crate::exit_codes;
use diagnosis_core::config::load_config;
use diagnosis_core::engine::Runner;
use diagnosis_core::errors::DiagnosisError;
use diagnosis_core::storage::Store;

pub fn dispatch(cli: Cli) -> anyhow::Result<i32> {
    if matches!(cli.cmd, Command::Init) {
        return init::run(&cli.config);
    }

    let config = match load_config(&cli.config) {
        Ok(cfg) => cfg,
        Err(e) => {
            eprintln!("{}", e);
            return Ok(exit_codes::CONFIG_ERROR);
        }
    };
    let store = Store::open(&config.db_path)?;
    store.init_schema()?;
    let runner = Runner::new(store, config);

    match cli.cmd {
        Command::Init => unreachable!("handled above"),
        Command::Diagnose(args) => diagnose::run(&runner, &args),
        Command::Records(args) => records::list(&runner, &args),
        Command::Delete(args) => records::delete(&runner, &args),
        Command::AddDataset(args) => registry::add_dataset(&runner, &args),
        Command::AddModel(args) => registry::add_model(&runner, &args),
        Command::Datasets => registry::list_datasets(&runner),
        Command::Models => registry::list_models(&runner),
    }
}

pub(crate) fn error_code(err: &DiagnosisError) -> i32 {
    match err {
        DiagnosisError::NotFound { .. } | DiagnosisError::ArtifactMissing { .. } => {
            exit_codes::NOT_FOUND
        }
        DiagnosisError::EvaluatorFailed { .. } | DiagnosisError::EvaluatorOutputInvalid(_) => {
            exit_codes::EVALUATOR_ERROR
        }
        DiagnosisError::Persistence(_) | DiagnosisError::Render(_) => exit_codes::STORAGE_ERROR,
    }
}
