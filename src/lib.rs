//! # wiki-dl
//!
//! Concurrent Wikipedia reference downloader: search for a topic, fetch each
//! matching page, and save its external-reference list to its own UTF-8 text
//! file - under a selectable execution strategy so throughput can be
//! compared.
//!
//! ## Design Philosophy
//!
//! - **Failure isolation** - one bad page never aborts the batch; every
//!   identifier gets exactly one typed outcome
//! - **Swappable strategies** - sequential, thread-pool, and process-pool
//!   execution share the identical per-item pipeline
//! - **Explicit policies** - worker counts, the short-query default, and
//!   file-name collision handling are validated configuration, not accidents
//!
//! ## Quick Start
//!
//! ```no_run
//! use wiki_dl::{BatchRunner, Config, Strategy};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let runner = BatchRunner::new(Config::default())?;
//!
//!     let identifiers = runner.search("general artificial intelligence").await?;
//!     let report = runner
//!         .run(&identifiers, Strategy::ThreadPool { max_workers: 8 })
//!         .await?;
//!
//!     println!("{} succeeded, {} failed", report.succeeded(), report.failed());
//!     Ok(())
//! }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::unwrap_used)]
#![warn(clippy::expect_used)]

/// Remote source client (trait + MediaWiki implementation)
pub mod client;
/// Configuration types
pub mod config;
/// Error types
pub mod error;
/// Artifact extraction (name sanitization + payload serialization)
pub mod extract;
/// Batch orchestration and strategy dispatch
pub mod runner;
/// File sink
pub mod sink;
/// Core types and outcomes
pub mod types;
/// Process-pool worker boundary
pub mod worker;

// Re-export commonly used types
pub use client::{MediaWikiClient, RemoteSource};
pub use config::{CollisionPolicy, Config};
pub use error::{Error, ExtractError, FailureKind, FetchError, Result, WriteError};
pub use runner::{BatchRunner, ItemContext, process_item};
pub use sink::FileSink;
pub use types::{Artifact, DetailRecord, Outcome, Payload, RunReport, Strategy};
