//! Error types for wiki-dl
//!
//! Errors are split by blast radius:
//! - [`Error`] - batch-fatal failures (configuration, the initial search,
//!   plumbing I/O). These abort the run.
//! - [`FetchError`] - per-page lookup failures. These become per-item
//!   [`Outcome`](crate::types::Outcome)s and never abort the batch.
//! - [`WriteError`] - filesystem failures at the sink, also per-item.
//! - [`FailureKind`] - the serializable classification carried inside a
//!   failure outcome (it crosses the process-pool boundary as JSON).

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for wiki-dl operations
pub type Result<T> = std::result::Result<T, Error>;

/// Batch-fatal error type
///
/// A value of this type means the run as a whole cannot proceed (or could not
/// be configured). Per-item failures are *not* represented here; they are
/// recorded as [`Outcome::Failure`](crate::types::Outcome) values instead.
#[derive(Debug, Error)]
pub enum Error {
    /// Configuration error with context about which setting is invalid
    #[error("configuration error: {message}")]
    Config {
        /// Human-readable error message describing the configuration issue
        message: String,
        /// The configuration key that caused the error (e.g., "max_workers")
        key: Option<String>,
    },

    /// The initial search call failed; without an identifier list the batch
    /// cannot start
    #[error("search failed: {0}")]
    Search(String),

    /// Network error
    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization error
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Per-page lookup failure
///
/// Returned by [`RemoteSource::fetch_detail`](crate::client::RemoteSource),
/// converted into a failure outcome by the runner. Each variant carries the
/// identifier it concerns so pooled strategies can attribute failures after
/// reordering.
#[derive(Debug, Error)]
pub enum FetchError {
    /// No page exists for the identifier
    #[error("page \"{identifier}\" not found")]
    NotFound {
        /// The identifier that had no matching page
        identifier: String,
    },

    /// The identifier names a disambiguation page with multiple equally-valid
    /// targets. The batch never silently picks one; it records the failure
    /// together with the candidate titles.
    #[error("\"{identifier}\" is ambiguous: {} candidate pages", .candidates.len())]
    Ambiguous {
        /// The ambiguous identifier
        identifier: String,
        /// Candidate page titles the disambiguation points at
        candidates: Vec<String>,
    },

    /// Transport-level or server-side failure (connect error, 5xx, 429)
    #[error("network error fetching \"{identifier}\": {message}")]
    Network {
        /// The identifier whose fetch failed
        identifier: String,
        /// Transport or status description
        message: String,
    },

    /// The response arrived but could not be decoded into a detail record
    #[error("malformed detail for \"{identifier}\": {message}")]
    Malformed {
        /// The identifier whose response was malformed
        identifier: String,
        /// What was wrong with the payload
        message: String,
    },
}

impl FetchError {
    /// The identifier this failure concerns
    pub fn identifier(&self) -> &str {
        match self {
            Self::NotFound { identifier }
            | Self::Ambiguous { identifier, .. }
            | Self::Network { identifier, .. }
            | Self::Malformed { identifier, .. } => identifier,
        }
    }

    /// Outcome classification for this failure
    pub fn kind(&self) -> FailureKind {
        match self {
            Self::NotFound { .. } => FailureKind::NotFound,
            Self::Ambiguous { .. } => FailureKind::AmbiguousMatch,
            Self::Network { .. } => FailureKind::Network,
            Self::Malformed { .. } => FailureKind::Serialization,
        }
    }
}

/// Malformed detail record rejected by the extractor
///
/// Maps to [`FailureKind::Serialization`] in the item's outcome.
#[derive(Debug, Error)]
pub enum ExtractError {
    /// The record's title is empty after trimming, so no file name can be
    /// derived from it
    #[error("detail record has a blank title")]
    BlankTitle,
}

/// Filesystem failure while persisting an artifact
#[derive(Debug, Error)]
#[error("failed to write {}: {source}", .path.display())]
pub struct WriteError {
    /// The path that could not be written
    pub path: PathBuf,
    /// The underlying I/O error
    #[source]
    pub source: std::io::Error,
}

/// Classification of a per-item failure, carried inside a failure outcome
///
/// Serialized as snake_case strings so outcomes marshal cleanly across the
/// process-pool boundary and into logs.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureKind {
    /// The remote source has no page for the identifier
    NotFound,
    /// The identifier resolved to a disambiguation page
    AmbiguousMatch,
    /// Transient transport or server failure
    Network,
    /// The fetched detail record could not be decoded or extracted
    Serialization,
    /// The artifact could not be written to the output directory
    Write,
    /// A pool worker process crashed or returned unintelligible output
    Worker,
}

impl FailureKind {
    /// Stable string form, matching the serde representation
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::NotFound => "not_found",
            Self::AmbiguousMatch => "ambiguous_match",
            Self::Network => "network",
            Self::Serialization => "serialization",
            Self::Write => "write",
            Self::Worker => "worker",
        }
    }
}

impl std::fmt::Display for FailureKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
