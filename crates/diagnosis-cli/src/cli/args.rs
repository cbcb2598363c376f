use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(
    name = "diagnosis",
    version,
    about = "Fault-diagnosis workflow: run an evaluator against stored data and models, persist records, render PDF reports"
)]
pub struct Cli {
    /// Path to the YAML configuration file
    #[arg(
        long,
        global = true,
        default_value = "diagnosis.yaml",
        env = "DIAGNOSIS_CONFIG"
    )]
    pub config: PathBuf,

    #[command(subcommand)]
    pub cmd: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Write a sample config (if absent) and initialize directories and schema
    Init,
    /// Run one diagnosis for a registered dataset/model pair
    Diagnose(DiagnoseArgs),
    /// List diagnosis records
    Records(RecordsArgs),
    /// Delete a diagnosis record, its report row, and the rendered file
    Delete(DeleteArgs),
    /// Register a dataset archive already present in the uploads directory
    AddDataset(AddArgs),
    /// Register a model artifact already present in the models directory
    AddModel(AddArgs),
    /// List registered datasets
    Datasets,
    /// List registered models
    Models,
}

#[derive(Parser, Debug)]
pub struct DiagnoseArgs {
    /// Dataset id to diagnose
    #[arg(long)]
    pub dataset: i64,
    /// Model id to evaluate with
    #[arg(long)]
    pub model: i64,
    /// Emit the success payload as JSON
    #[arg(long)]
    pub json: bool,
}

#[derive(Parser, Debug)]
pub struct RecordsArgs {
    /// Emit the listing as JSON
    #[arg(long)]
    pub json: bool,
}

#[derive(Parser, Debug)]
pub struct DeleteArgs {
    pub record_id: i64,
}

#[derive(Parser, Debug)]
pub struct AddArgs {
    /// File name under the configured directory
    pub name: String,
}
