//! Blocking invocation of the external evaluator process.
//!
//! The evaluator is an opaque executable: it takes the dataset path and the
//! model path as positional arguments, writes its image artifacts into the
//! reports directory, and prints one structured result line to stdout. The
//! invocation is bounded by a hard timeout; on expiry the child is killed
//! and reaped, so a wedged evaluator cannot block the caller indefinitely.

use crate::config::EvaluatorConfig;
use anyhow::{Context, Result};
use std::io::Read;
use std::path::Path;
use std::process::{Command, Stdio};
use std::time::Duration;
use tracing::debug;

/// Stderr carried into error messages is capped at this many bytes.
pub const STDERR_EXCERPT_LIMIT: usize = 4096;

/// Captured outcome of one evaluator run.
#[derive(Debug)]
pub struct EvaluatorRun {
    pub stdout: String,
    pub stderr: String,
    /// Exit code, if the process completed and reported one.
    pub exit_code: Option<i32>,
    pub success: bool,
    /// Whether the process was killed due to timeout.
    pub timed_out: bool,
}

impl EvaluatorRun {
    /// Stderr trimmed to the excerpt cap, for embedding in error messages.
    pub fn stderr_excerpt(&self) -> String {
        let mut excerpt = self.stderr.clone();
        excerpt.truncate(STDERR_EXCERPT_LIMIT);
        excerpt
    }
}

/// Run the configured evaluator against the two resolved artifact paths.
///
/// Both output streams are drained on reader threads while waiting, so a
/// chatty evaluator cannot deadlock on a full pipe.
pub fn run_evaluator(
    cfg: &EvaluatorConfig,
    dataset_path: &Path,
    model_path: &Path,
) -> Result<EvaluatorRun> {
    let program = cfg
        .command
        .first()
        .context("evaluator command is empty")?;

    let mut child = Command::new(program)
        .args(&cfg.command[1..])
        .arg(dataset_path)
        .arg(model_path)
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .with_context(|| format!("spawning evaluator: {}", program))?;

    let stdout_reader = spawn_reader(child.stdout.take());
    let stderr_reader = spawn_reader(child.stderr.take());

    let timeout = Duration::from_secs(cfg.timeout_secs);
    let (exit_code, success, timed_out) = match child.wait_timeout(timeout) {
        Ok(Some(status)) => (status.code(), status.success(), false),
        Ok(None) => {
            // Timed out — kill the child and reap it
            let _ = child.kill();
            let _ = child.wait();
            (None, false, true)
        }
        Err(e) => {
            let _ = child.kill();
            let _ = child.wait();
            return Err(e).context("waiting for evaluator");
        }
    };

    let stdout = stdout_reader.join().unwrap_or_default();
    let stderr = stderr_reader.join().unwrap_or_default();

    debug!(exit = ?exit_code, timed_out, "evaluator finished");
    debug!("evaluator stdout: {}", stdout);
    debug!("evaluator stderr: {}", stderr);

    Ok(EvaluatorRun {
        stdout,
        stderr,
        exit_code,
        success,
        timed_out,
    })
}

fn spawn_reader<R: Read + Send + 'static>(
    stream: Option<R>,
) -> std::thread::JoinHandle<String> {
    std::thread::spawn(move || {
        let mut buf = String::new();
        if let Some(mut stream) = stream {
            let _ = stream.read_to_string(&mut buf);
        }
        buf
    })
}

/// Extension trait to add `wait_timeout` to `Child`.
trait ChildExt {
    fn wait_timeout(
        &mut self,
        timeout: Duration,
    ) -> std::io::Result<Option<std::process::ExitStatus>>;
}

impl ChildExt for std::process::Child {
    fn wait_timeout(
        &mut self,
        timeout: Duration,
    ) -> std::io::Result<Option<std::process::ExitStatus>> {
        let start = std::time::Instant::now();
        let poll_interval = Duration::from_millis(50);

        loop {
            match self.try_wait()? {
                Some(status) => return Ok(Some(status)),
                None => {
                    if start.elapsed() >= timeout {
                        return Ok(None);
                    }
                    std::thread::sleep(poll_interval);
                }
            }
        }
    }
}
