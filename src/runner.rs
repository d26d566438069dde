//! Batch runner
//!
//! Drives an identifier list through the per-item pipeline
//! (fetch -> extract -> write) under a selected [`Strategy`], isolating
//! per-item failures so one bad page cannot abort the batch. The pipeline
//! itself is strategy-agnostic; the strategies differ only in scheduling and
//! isolation:
//! - [`Strategy::Sequential`] - one at a time on the caller's task
//! - [`Strategy::ThreadPool`] - tasks on the shared runtime, bounded by a
//!   semaphore
//! - [`Strategy::ProcessPool`] - isolated child processes marshaling
//!   outcomes back as JSON

use std::sync::Arc;
use std::time::Instant;

use futures::stream::{self, StreamExt};
use tokio::sync::Semaphore;
use tokio::task::JoinSet;

use crate::client::{MediaWikiClient, RemoteSource};
use crate::config::Config;
use crate::error::{Error, FailureKind, Result};
use crate::extract;
use crate::sink::FileSink;
use crate::types::{Outcome, RunReport, Strategy};
use crate::worker::WorkerSpec;

/// Read-only context shared by every per-item execution
///
/// Cloned into each worker task; nothing here is mutated during a run, so
/// workers never observe each other's in-flight state.
#[derive(Clone)]
pub struct ItemContext {
    /// Remote document source
    pub source: Arc<dyn RemoteSource>,
    /// Artifact sink
    pub sink: Arc<FileSink>,
    /// Artifact file extension
    pub extension: String,
    /// Whether identifiers are fetched without redirect resolution
    pub exact_match: bool,
}

/// Executes the per-item pipeline over identifier batches
pub struct BatchRunner {
    config: Config,
    context: ItemContext,
}

impl BatchRunner {
    /// Build a runner backed by the production MediaWiki client
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] for invalid configuration and
    /// [`Error::Network`] when the HTTP client cannot be constructed.
    pub fn new(config: Config) -> Result<Self> {
        let source = Arc::new(MediaWikiClient::new(&config)?);
        Self::with_source(config, source)
    }

    /// Build a runner around any remote source (tests inject fakes here)
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] for invalid configuration.
    pub fn with_source(config: Config, source: Arc<dyn RemoteSource>) -> Result<Self> {
        config.validate()?;

        let sink = Arc::new(FileSink::new(
            config.output.dir.clone(),
            config.output.collision,
        ));
        let context = ItemContext {
            source,
            sink,
            extension: config.output.extension.clone(),
            exact_match: config.api.exact_match,
        };

        Ok(Self { config, context })
    }

    /// The sink this runner writes through
    pub fn sink(&self) -> &FileSink {
        &self.context.sink
    }

    /// Search the remote source, substituting the configured default for
    /// too-short queries
    ///
    /// # Errors
    ///
    /// A failed search is batch-fatal: without an identifier list there is
    /// nothing to run.
    pub async fn search(&self, raw_query: &str) -> Result<Vec<String>> {
        let query = self.config.search.resolve_query(raw_query);
        if query != raw_query.trim() {
            tracing::info!(query, "input query too short, using configured default");
        }
        self.context.source.search(query).await
    }

    /// Run the batch under `strategy`
    ///
    /// Always produces one outcome per identifier (duplicates included);
    /// outcomes are in input order for [`Strategy::Sequential`] and in
    /// completion order for the pooled strategies.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] for a zero-sized pool and [`Error::Io`]
    /// when the output directory cannot be created. Per-item failures are
    /// never errors.
    pub async fn run(&self, identifiers: &[String], strategy: Strategy) -> Result<RunReport> {
        validate_strategy(strategy)?;
        self.context.sink.prepare().await?;

        tracing::info!(strategy = %strategy, items = identifiers.len(), "starting batch run");
        let started = Instant::now();

        let outcomes = match strategy {
            Strategy::Sequential => self.run_sequential(identifiers).await,
            Strategy::ThreadPool { max_workers } => {
                self.run_thread_pool(identifiers, max_workers).await
            }
            Strategy::ProcessPool { max_workers } => {
                self.run_process_pool(identifiers, max_workers).await?
            }
        };

        let report = RunReport {
            strategy,
            outcomes,
            elapsed: started.elapsed(),
        };
        tracing::info!(
            strategy = %strategy,
            elapsed_ms = report.elapsed.as_millis() as u64,
            succeeded = report.succeeded(),
            failed = report.failed(),
            "batch run complete"
        );
        Ok(report)
    }

    async fn run_sequential(&self, identifiers: &[String]) -> Vec<Outcome> {
        let mut outcomes = Vec::with_capacity(identifiers.len());
        for identifier in identifiers {
            outcomes.push(process_item(&self.context, identifier).await);
        }
        outcomes
    }

    async fn run_thread_pool(&self, identifiers: &[String], max_workers: usize) -> Vec<Outcome> {
        let limit = Arc::new(Semaphore::new(max_workers));
        let mut tasks = JoinSet::new();

        for identifier in identifiers {
            let ctx = self.context.clone();
            let identifier = identifier.clone();
            let limit = Arc::clone(&limit);
            tasks.spawn(async move {
                let Ok(_permit) = limit.acquire_owned().await else {
                    return Outcome::failure(identifier, FailureKind::Worker, "worker pool closed");
                };
                process_item(&ctx, &identifier).await
            });
        }

        let mut outcomes = Vec::with_capacity(identifiers.len());
        while let Some(joined) = tasks.join_next().await {
            match joined {
                Ok(outcome) => outcomes.push(outcome),
                // process_item is total, so this only fires if a task was
                // aborted or panicked outside the pipeline
                Err(e) => tracing::error!(error = %e, "worker task died"),
            }
        }
        outcomes
    }

    async fn run_process_pool(
        &self,
        identifiers: &[String],
        max_workers: usize,
    ) -> Result<Vec<Outcome>> {
        let spec = WorkerSpec::from_config(&self.config)?;

        let outcomes = stream::iter(identifiers.iter().cloned())
            .map(|identifier| spec.run(identifier))
            .buffer_unordered(max_workers)
            .collect()
            .await;
        Ok(outcomes)
    }
}

fn validate_strategy(strategy: Strategy) -> Result<()> {
    match strategy {
        Strategy::Sequential => Ok(()),
        Strategy::ThreadPool { max_workers } | Strategy::ProcessPool { max_workers } => {
            if max_workers == 0 {
                Err(Error::Config {
                    message: format!("{} needs at least one worker", strategy.name()),
                    key: Some("max_workers".into()),
                })
            } else {
                Ok(())
            }
        }
    }
}

/// Execute fetch -> extract -> write for one identifier
///
/// Total: every failure at any stage folds into the returned outcome, so
/// callers can run items concurrently without one failure tearing down the
/// pool. Each occurrence of a duplicated identifier is processed
/// independently.
pub async fn process_item(ctx: &ItemContext, identifier: &str) -> Outcome {
    let record = match ctx.source.fetch_detail(identifier, ctx.exact_match).await {
        Ok(record) => record,
        Err(e) => {
            tracing::warn!(identifier, kind = %e.kind(), error = %e, "skipping item: fetch failed");
            return Outcome::failure(identifier, e.kind(), e.to_string());
        }
    };

    let artifact = match extract::extract(&record, &ctx.extension) {
        Ok(artifact) => artifact,
        Err(e) => {
            tracing::warn!(identifier, error = %e, "skipping item: extraction failed");
            return Outcome::failure(identifier, FailureKind::Serialization, e.to_string());
        }
    };

    match ctx.sink.write(&artifact).await {
        Ok(path) => {
            tracing::debug!(identifier, path = %path.display(), "artifact written");
            // Report the name actually used, which can differ from the
            // artifact's under CollisionPolicy::Disambiguate
            let file_name = path
                .file_name()
                .and_then(|name| name.to_str())
                .map(str::to_owned)
                .unwrap_or(artifact.file_name);
            Outcome::Success {
                identifier: identifier.to_string(),
                file_name,
            }
        }
        Err(e) => {
            tracing::warn!(identifier, error = %e, "skipping item: write failed");
            Outcome::failure(identifier, FailureKind::Write, e.to_string())
        }
    }
}
