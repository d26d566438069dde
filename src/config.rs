//! Configuration types for wiki-dl

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use url::Url;

use crate::error::{Error, Result};

/// Default MediaWiki Action API endpoint (English Wikipedia)
pub const DEFAULT_ENDPOINT: &str = "https://en.wikipedia.org/w/api.php";

/// Remote API configuration
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ApiConfig {
    /// MediaWiki Action API endpoint (default: English Wikipedia)
    #[serde(default = "default_endpoint")]
    pub endpoint: Url,

    /// User-Agent header sent with every request
    #[serde(default = "default_user_agent")]
    pub user_agent: String,

    /// Fetch identifiers exactly as given instead of following redirects
    /// (default: true)
    #[serde(default = "default_true")]
    pub exact_match: bool,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            endpoint: default_endpoint(),
            user_agent: default_user_agent(),
            exact_match: true,
        }
    }
}

/// Search behavior configuration
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct SearchConfig {
    /// Query used when the caller's input is too short (default:
    /// "generative artificial intelligence")
    #[serde(default = "default_query")]
    pub default_query: String,

    /// Minimum number of characters an input query must have before the
    /// default kicks in (default: 4)
    #[serde(default = "default_min_query_chars")]
    pub min_query_chars: usize,

    /// Maximum number of search results to request (default: 10)
    #[serde(default = "default_max_results")]
    pub max_results: usize,
}

impl SearchConfig {
    /// Resolve the effective query: trimmed input, or the configured default
    /// when the input is shorter than `min_query_chars`
    pub fn resolve_query<'a>(&'a self, input: &'a str) -> &'a str {
        let trimmed = input.trim();
        if trimmed.chars().count() < self.min_query_chars {
            &self.default_query
        } else {
            trimmed
        }
    }
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            default_query: default_query(),
            min_query_chars: default_min_query_chars(),
            max_results: default_max_results(),
        }
    }
}

/// Output configuration (directory, extension, collision handling)
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct OutputConfig {
    /// Directory artifacts are written to, created idempotently before a run
    /// (default: "./wiki_dl")
    #[serde(default = "default_output_dir")]
    pub dir: PathBuf,

    /// Artifact file extension, without the leading dot (default: "txt")
    #[serde(default = "default_extension")]
    pub extension: String,

    /// What to do when two artifacts resolve to the same file name
    #[serde(default)]
    pub collision: CollisionPolicy,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            dir: default_output_dir(),
            extension: default_extension(),
            collision: CollisionPolicy::default(),
        }
    }
}

/// How the sink handles a file name that already exists
///
/// Colliding titles under concurrent strategies race on the same path; the
/// policy decides what that race means.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CollisionPolicy {
    /// Truncate-create the path; the last writer wins, silently
    #[default]
    Overwrite,
    /// Append " (1)", " (2)", ... before the extension until the name is free
    Disambiguate,
}

/// Top-level configuration
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct Config {
    /// Remote API settings
    #[serde(default)]
    pub api: ApiConfig,

    /// Search behavior
    #[serde(default)]
    pub search: SearchConfig,

    /// Output settings
    #[serde(default)]
    pub output: OutputConfig,

    /// Program spawned for process-pool workers; `None` means the current
    /// executable
    #[serde(default)]
    pub worker_program: Option<PathBuf>,
}

impl Config {
    /// Check cross-field invariants that serde defaults alone cannot enforce
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] naming the offending key.
    pub fn validate(&self) -> Result<()> {
        match self.api.endpoint.scheme() {
            "http" | "https" => {}
            other => {
                return Err(Error::Config {
                    message: format!("endpoint scheme must be http or https, got \"{other}\""),
                    key: Some("api.endpoint".into()),
                });
            }
        }

        if self.api.user_agent.trim().is_empty() {
            return Err(Error::Config {
                message: "user_agent must not be empty".into(),
                key: Some("api.user_agent".into()),
            });
        }

        // The default must itself survive the short-query substitution,
        // otherwise resolve_query can hand back an unusable query.
        if self.search.default_query.trim().chars().count() < self.search.min_query_chars {
            return Err(Error::Config {
                message: format!(
                    "default_query must be at least {} characters",
                    self.search.min_query_chars
                ),
                key: Some("search.default_query".into()),
            });
        }

        if self.search.max_results == 0 {
            return Err(Error::Config {
                message: "max_results must be at least 1".into(),
                key: Some("search.max_results".into()),
            });
        }

        let ext = &self.output.extension;
        if ext.is_empty() || ext.contains(['/', '\\', '.']) {
            return Err(Error::Config {
                message: format!("\"{ext}\" is not a valid extension"),
                key: Some("output.extension".into()),
            });
        }

        Ok(())
    }
}

fn default_true() -> bool {
    true
}

#[allow(clippy::expect_used)]
fn default_endpoint() -> Url {
    Url::parse(DEFAULT_ENDPOINT).expect("default endpoint is a valid URL")
}

fn default_user_agent() -> String {
    concat!("wiki-dl/", env!("CARGO_PKG_VERSION")).to_string()
}

fn default_query() -> String {
    "generative artificial intelligence".to_string()
}

fn default_min_query_chars() -> usize {
    4
}

fn default_max_results() -> usize {
    10
}

fn default_output_dir() -> PathBuf {
    PathBuf::from("./wiki_dl")
}

fn default_extension() -> String {
    "txt".to_string()
}

#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_valid() {
        let config = Config::default();
        config.validate().expect("defaults must validate");

        assert_eq!(config.api.endpoint.as_str(), DEFAULT_ENDPOINT);
        assert!(config.api.exact_match);
        assert_eq!(config.output.extension, "txt");
        assert_eq!(config.output.collision, CollisionPolicy::Overwrite);
        assert!(config.worker_program.is_none());
    }

    // --- resolve_query ---

    #[test]
    fn resolve_query_keeps_input_at_minimum_length() {
        let search = SearchConfig::default();
        assert_eq!(search.resolve_query("ai models"), "ai models");
        assert_eq!(search.resolve_query("rust"), "rust", "4 chars is enough");
    }

    #[test]
    fn resolve_query_substitutes_default_below_minimum() {
        let search = SearchConfig::default();
        assert_eq!(search.resolve_query("ai"), search.default_query);
        assert_eq!(search.resolve_query(""), search.default_query);
    }

    #[test]
    fn resolve_query_trims_before_measuring() {
        let search = SearchConfig::default();
        // 3 meaningful chars padded with whitespace still falls back
        assert_eq!(search.resolve_query("  ai \n"), search.default_query);
        assert_eq!(search.resolve_query("  rust  "), "rust");
    }

    // --- validate ---

    #[test]
    fn validate_rejects_non_http_endpoint() {
        let mut config = Config::default();
        config.api.endpoint = Url::parse("ftp://example.org/api").unwrap();

        match config.validate() {
            Err(Error::Config { key, .. }) => {
                assert_eq!(key.as_deref(), Some("api.endpoint"));
            }
            other => panic!("expected Config error, got: {other:?}"),
        }
    }

    #[test]
    fn validate_rejects_short_default_query() {
        let mut config = Config::default();
        config.search.default_query = "ai".into();

        match config.validate() {
            Err(Error::Config { key, .. }) => {
                assert_eq!(key.as_deref(), Some("search.default_query"));
            }
            other => panic!("expected Config error, got: {other:?}"),
        }
    }

    #[test]
    fn validate_rejects_dotted_extension() {
        let mut config = Config::default();
        config.output.extension = ".txt".into();

        match config.validate() {
            Err(Error::Config { key, .. }) => {
                assert_eq!(key.as_deref(), Some("output.extension"));
            }
            other => panic!("expected Config error, got: {other:?}"),
        }
    }

    // --- Config JSON round-trip ---

    #[test]
    fn config_default_survives_json_round_trip() {
        let original = Config::default();

        let json = serde_json::to_string(&original).expect("Config must serialize to JSON");
        let restored: Config =
            serde_json::from_str(&json).expect("Config must deserialize from its own JSON");

        assert_eq!(
            restored.api.endpoint, original.api.endpoint,
            "endpoint must survive round-trip"
        );
        assert_eq!(
            restored.search.default_query, original.search.default_query,
            "default_query must survive round-trip"
        );
        assert_eq!(
            restored.search.min_query_chars, original.search.min_query_chars,
            "min_query_chars must survive round-trip"
        );
        assert_eq!(
            restored.output.dir, original.output.dir,
            "output dir must survive round-trip"
        );
        assert_eq!(
            restored.output.collision, original.output.collision,
            "collision policy must survive round-trip"
        );
    }

    #[test]
    fn empty_json_object_fills_every_default() {
        let config: Config = serde_json::from_str("{}").expect("empty object must deserialize");
        assert_eq!(config.search.min_query_chars, 4);
        assert_eq!(config.search.max_results, 10);
        assert_eq!(config.output.dir, PathBuf::from("./wiki_dl"));
    }
}
