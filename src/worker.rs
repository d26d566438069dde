//! Process-pool worker boundary
//!
//! The process-pool strategy runs each item in an isolated child process, so
//! the per-item unit of work must take only serializable inputs (argv) and
//! return serializable output. A worker prints exactly one JSON
//! [`Outcome`] line on stdout; everything it logs goes to stderr. Failures
//! inside a worker come back as data, never as a live error object.

use std::path::PathBuf;
use std::sync::Arc;
use tokio::process::Command;
use url::Url;

use crate::client::MediaWikiClient;
use crate::config::{CollisionPolicy, Config};
use crate::error::{FailureKind, Result};
use crate::runner::{ItemContext, process_item};
use crate::sink::FileSink;
use crate::types::Outcome;

/// Parent-side description of one worker invocation
///
/// Everything a child needs crosses the process boundary as command-line
/// arguments; nothing here closes over runtime state.
#[derive(Clone, Debug)]
pub struct WorkerSpec {
    program: PathBuf,
    endpoint: Url,
    user_agent: String,
    output_dir: PathBuf,
    extension: String,
    collision: CollisionPolicy,
    exact_match: bool,
}

impl WorkerSpec {
    /// Derive a worker spec from configuration
    ///
    /// Uses `config.worker_program` when set, otherwise the current
    /// executable (the `worker` subcommand of this binary).
    ///
    /// # Errors
    ///
    /// Returns [`Error::Io`](crate::error::Error::Io) when the current
    /// executable path cannot be determined.
    pub fn from_config(config: &Config) -> Result<Self> {
        let program = match &config.worker_program {
            Some(path) => path.clone(),
            None => std::env::current_exe()?,
        };

        Ok(Self {
            program,
            endpoint: config.api.endpoint.clone(),
            user_agent: config.api.user_agent.clone(),
            output_dir: config.output.dir.clone(),
            extension: config.output.extension.clone(),
            collision: config.output.collision,
            exact_match: config.api.exact_match,
        })
    }

    /// Process one identifier in a child process and marshal its outcome back
    ///
    /// Total: spawn failures, crashes, and unintelligible output all fold
    /// into a [`FailureKind::Worker`] outcome for this identifier alone.
    pub async fn run(&self, identifier: String) -> Outcome {
        let mut command = Command::new(&self.program);
        command
            .arg("worker")
            .arg("--endpoint")
            .arg(self.endpoint.as_str())
            .arg("--user-agent")
            .arg(&self.user_agent)
            .arg("--output-dir")
            .arg(&self.output_dir)
            .arg("--extension")
            .arg(&self.extension);
        if self.collision == CollisionPolicy::Disambiguate {
            command.arg("--disambiguate");
        }
        if !self.exact_match {
            command.arg("--follow-redirects");
        }
        // "--" so identifiers starting with a dash stay positional
        command.arg("--").arg(&identifier);

        tracing::debug!(identifier, program = %self.program.display(), "spawning worker");

        let output = match command.output().await {
            Ok(output) => output,
            Err(e) => {
                return Outcome::failure(
                    identifier,
                    FailureKind::Worker,
                    format!("failed to spawn worker: {e}"),
                );
            }
        };

        parse_worker_output(
            &identifier,
            output.status.success(),
            &output.stdout,
            &output.stderr,
        )
    }
}

/// Recover the child's outcome from its captured streams
///
/// The outcome is the last non-empty stdout line; anything before it is
/// incidental child output. A child that produced no parseable outcome is
/// reported as a [`FailureKind::Worker`] failure carrying the last stderr
/// line as the diagnostic.
fn parse_worker_output(identifier: &str, success: bool, stdout: &[u8], stderr: &[u8]) -> Outcome {
    let stdout = String::from_utf8_lossy(stdout);
    if let Some(line) = stdout.lines().rev().find(|line| !line.trim().is_empty())
        && let Ok(outcome) = serde_json::from_str::<Outcome>(line)
    {
        return outcome;
    }

    let stderr = String::from_utf8_lossy(stderr);
    let detail = stderr
        .lines()
        .rev()
        .find(|line| !line.trim().is_empty())
        .unwrap_or("no diagnostic output");

    let message = if success {
        format!("worker produced no outcome: {detail}")
    } else {
        format!("worker crashed: {detail}")
    };
    Outcome::failure(identifier, FailureKind::Worker, message)
}

/// Child-side entry: run the shared per-item pipeline for one identifier
///
/// Builds the client and sink this worker needs from the marshaled
/// configuration. Total for the same reason [`process_item`] is; even
/// initialization failures become outcomes, so the parent never has to
/// interpret a crash.
pub async fn execute(config: &Config, identifier: &str) -> Outcome {
    let source = match MediaWikiClient::new(config) {
        Ok(client) => client,
        Err(e) => {
            return Outcome::failure(
                identifier,
                FailureKind::Worker,
                format!("worker initialization failed: {e}"),
            );
        }
    };

    let sink = FileSink::new(config.output.dir.clone(), config.output.collision);
    if let Err(e) = sink.prepare().await {
        return Outcome::failure(identifier, FailureKind::Write, e.to_string());
    }

    let context = ItemContext {
        source: Arc::new(source),
        sink: Arc::new(sink),
        extension: config.output.extension.clone(),
        exact_match: config.api.exact_match,
    };
    process_item(&context, identifier).await
}
