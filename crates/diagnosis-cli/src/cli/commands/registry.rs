use crate::cli::args::AddArgs;
use crate::exit_codes;
use diagnosis_core::engine::Runner;

/// Registration assumes the artifact is already in place; a dangling row
/// would only fail later at diagnosis time, so refuse it up front.
pub fn add_dataset(runner: &Runner, args: &AddArgs) -> anyhow::Result<i32> {
    let path = runner.config.uploads_dir.join(&args.name);
    if !path.exists() {
        eprintln!("error: no such file in uploads directory: {}", path.display());
        return Ok(exit_codes::NOT_FOUND);
    }
    let id = runner.store.insert_file(&args.name)?;
    println!("dataset {} registered with id {}", args.name, id);
    Ok(exit_codes::OK)
}

pub fn add_model(runner: &Runner, args: &AddArgs) -> anyhow::Result<i32> {
    let path = runner.config.models_dir.join(&args.name);
    if !path.exists() {
        eprintln!("error: no such file in models directory: {}", path.display());
        return Ok(exit_codes::NOT_FOUND);
    }
    let id = runner.store.insert_model(&args.name)?;
    println!("model {} registered with id {}", args.name, id);
    Ok(exit_codes::OK)
}

pub fn list_datasets(runner: &Runner) -> anyhow::Result<i32> {
    let files = runner.store.list_files()?;
    if files.is_empty() {
        println!("no datasets registered");
    }
    for f in files {
        println!("{:>4}  {}", f.file_id, f.file_name);
    }
    Ok(exit_codes::OK)
}

pub fn list_models(runner: &Runner) -> anyhow::Result<i32> {
    let models = runner.store.list_models()?;
    if models.is_empty() {
        println!("no models registered");
    }
    for m in models {
        println!("{:>4}  {}", m.model_id, m.model_name);
    }
    Ok(exit_codes::OK)
}
