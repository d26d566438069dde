//! Core types for wiki-dl

use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::error::FailureKind;

/// Full detail for one fetched page
///
/// Owned by the fetch step that produced it, immutable thereafter, and dropped
/// as soon as the artifact has been extracted.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DetailRecord {
    /// Page title as the remote source reports it (normalization applied)
    pub title: String,
    /// The page's reference list
    pub references: Payload,
}

/// Serializable payload shapes a detail record can carry
///
/// A closed union: anything else the remote source might hand back is rejected
/// during extraction instead of silently producing an empty artifact.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Payload {
    /// A single value, stringified directly
    Scalar(String),
    /// An ordered sequence, joined with newlines (no trailing newline)
    Sequence(Vec<String>),
}

impl Payload {
    /// Serialize to the text persisted by the sink
    ///
    /// An empty sequence yields an empty string; a single-element sequence
    /// yields exactly that element.
    pub fn to_text(&self) -> String {
        match self {
            Self::Scalar(value) => value.clone(),
            Self::Sequence(items) => items.join("\n"),
        }
    }

    /// Number of elements (1 for a scalar)
    pub fn len(&self) -> usize {
        match self {
            Self::Scalar(_) => 1,
            Self::Sequence(items) => items.len(),
        }
    }

    /// Whether the payload carries no elements at all
    pub fn is_empty(&self) -> bool {
        matches!(self, Self::Sequence(items) if items.is_empty())
    }
}

/// The derived (name, payload) pair ready to persist
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Artifact {
    /// Filesystem-safe file name, extension included
    pub file_name: String,
    /// UTF-8 text to write
    pub payload: String,
}

/// Per-identifier result of the pipeline
///
/// Serde round-trippable: process-pool workers marshal exactly one of these
/// back to the coordinator as a JSON line.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "result", rename_all = "snake_case")]
pub enum Outcome {
    /// The artifact was written
    Success {
        /// The identifier this outcome belongs to
        identifier: String,
        /// File name the artifact was persisted under
        file_name: String,
    },
    /// The item failed at some stage; the rest of the batch is unaffected
    Failure {
        /// The identifier this outcome belongs to
        identifier: String,
        /// Failure classification
        kind: FailureKind,
        /// Human-readable description
        message: String,
    },
}

impl Outcome {
    /// Build a failure outcome
    pub fn failure(
        identifier: impl Into<String>,
        kind: FailureKind,
        message: impl Into<String>,
    ) -> Self {
        Self::Failure {
            identifier: identifier.into(),
            kind,
            message: message.into(),
        }
    }

    /// The identifier this outcome belongs to
    pub fn identifier(&self) -> &str {
        match self {
            Self::Success { identifier, .. } | Self::Failure { identifier, .. } => identifier,
        }
    }

    /// True for [`Outcome::Success`]
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success { .. })
    }

    /// `(identifier, kind)` pair for cross-strategy comparison; `None` kind
    /// means success
    pub fn key(&self) -> (&str, Option<FailureKind>) {
        match self {
            Self::Success { identifier, .. } => (identifier, None),
            Self::Failure {
                identifier, kind, ..
            } => (identifier, Some(*kind)),
        }
    }
}

/// Execution strategy for a batch run
///
/// All three run the identical per-item pipeline; they differ only in how the
/// items are scheduled and isolated.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Strategy {
    /// One item at a time on the caller's task; outcomes in input order
    Sequential,
    /// Up to `max_workers` items in flight as tasks on the shared runtime;
    /// outcomes in completion order
    ThreadPool {
        /// Maximum concurrent in-flight items
        max_workers: usize,
    },
    /// Up to `max_workers` isolated worker processes, one item per invocation;
    /// outcomes in completion order
    ProcessPool {
        /// Maximum concurrent worker processes
        max_workers: usize,
    },
}

impl Strategy {
    /// Human-readable name for logging
    pub fn name(&self) -> &'static str {
        match self {
            Self::Sequential => "sequential",
            Self::ThreadPool { .. } => "thread-pool",
            Self::ProcessPool { .. } => "process-pool",
        }
    }
}

impl std::fmt::Display for Strategy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Sequential => f.write_str("sequential"),
            Self::ThreadPool { max_workers } => write!(f, "thread-pool({max_workers})"),
            Self::ProcessPool { max_workers } => write!(f, "process-pool({max_workers})"),
        }
    }
}

/// Result of one batch run
#[derive(Clone, Debug)]
pub struct RunReport {
    /// The strategy the batch ran under
    pub strategy: Strategy,
    /// Per-identifier outcomes; input order for [`Strategy::Sequential`],
    /// completion order otherwise
    pub outcomes: Vec<Outcome>,
    /// Wall-clock duration of the whole batch
    pub elapsed: Duration,
}

impl RunReport {
    /// Number of items that succeeded
    pub fn succeeded(&self) -> usize {
        self.outcomes.iter().filter(|o| o.is_success()).count()
    }

    /// Number of items that failed
    pub fn failed(&self) -> usize {
        self.outcomes.len() - self.succeeded()
    }
}
