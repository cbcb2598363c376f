use super::error_code;
use crate::cli::args::DiagnoseArgs;
use crate::exit_codes;
use diagnosis_core::engine::Runner;
use diagnosis_core::model::metric_display;

pub fn run(runner: &Runner, args: &DiagnoseArgs) -> anyhow::Result<i32> {
    match runner.run_diagnosis(args.dataset, args.model) {
        Ok(out) => {
            if args.json {
                println!("{}", serde_json::to_string_pretty(&out)?);
            } else {
                println!("diagnosis record {} created", out.record_id);
                for (label, value) in out.metrics.named() {
                    println!("  {}: {}", label, metric_display(value));
                }
                println!("  t-SNE plot: {}", out.tsne_image_url);
                println!("  confusion matrix: {}", out.confusion_matrix_image_url);
            }
            Ok(exit_codes::OK)
        }
        Err(e) => {
            eprintln!("error: {}", e);
            Ok(error_code(&e))
        }
    }
}
