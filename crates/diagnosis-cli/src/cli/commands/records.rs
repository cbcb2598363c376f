use super::error_code;
use crate::cli::args::{DeleteArgs, RecordsArgs};
use crate::exit_codes;
use diagnosis_core::engine::Runner;

pub fn list(runner: &Runner, args: &RecordsArgs) -> anyhow::Result<i32> {
    let records = match runner.list_records() {
        Ok(records) => records,
        Err(e) => {
            eprintln!("error: {}", e);
            return Ok(error_code(&e));
        }
    };

    if args.json {
        println!("{}", serde_json::to_string_pretty(&records)?);
    } else if records.is_empty() {
        println!("no diagnosis records");
    } else {
        for r in &records {
            println!(
                "{:>4}  {:<24} {:<24} {}  {}",
                r.record_id,
                r.file_name,
                r.model_name,
                r.created_at.format("%Y-%m-%d %H:%M:%S"),
                r.report_name,
            );
        }
    }
    Ok(exit_codes::OK)
}

pub fn delete(runner: &Runner, args: &DeleteArgs) -> anyhow::Result<i32> {
    match runner.delete_record(args.record_id) {
        Ok(()) => {
            println!("record {} deleted", args.record_id);
            Ok(exit_codes::OK)
        }
        Err(e) => {
            eprintln!("error: {}", e);
            Ok(error_code(&e))
        }
    }
}
