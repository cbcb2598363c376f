use crate::exit_codes;
use diagnosis_core::config::{load_config, write_sample_config};
use diagnosis_core::storage::Store;
use std::path::Path;

pub fn run(config_path: &Path) -> anyhow::Result<i32> {
    if !config_path.exists() {
        write_sample_config(config_path)?;
        println!("wrote sample config to {}", config_path.display());
    }

    let config = match load_config(config_path) {
        Ok(cfg) => cfg,
        Err(e) => {
            eprintln!("{}", e);
            return Ok(exit_codes::CONFIG_ERROR);
        }
    };

    for dir in [&config.uploads_dir, &config.models_dir, &config.reports_dir] {
        std::fs::create_dir_all(dir)?;
    }
    let store = Store::open(&config.db_path)?;
    store.init_schema()?;
    println!("initialized database at {}", config.db_path.display());
    Ok(exit_codes::OK)
}
