//! Remote source client
//!
//! The batch pipeline talks to its document source through the
//! [`RemoteSource`] trait so tests (and alternative backends) can swap the
//! implementation. [`MediaWikiClient`] is the production implementation,
//! speaking the MediaWiki Action API over HTTP.

use async_trait::async_trait;
use serde::Deserialize;
use url::Url;

use crate::config::Config;
use crate::error::{Error, FetchError, Result};
use crate::types::{DetailRecord, Payload};

/// A remote document source: keyword search plus per-identifier detail fetch
///
/// `search` failures are batch-fatal (no identifier list, no batch);
/// `fetch_detail` failures concern one identifier only and are isolated by
/// the runner.
#[async_trait]
pub trait RemoteSource: Send + Sync {
    /// Find identifiers matching a free-text query
    ///
    /// # Errors
    ///
    /// Returns [`Error::Search`] when the source rejects the query and
    /// [`Error::Network`] on transport failures.
    async fn search(&self, query: &str) -> Result<Vec<String>>;

    /// Fetch the detail record for one identifier
    ///
    /// With `exact_match` the identifier is looked up verbatim; otherwise
    /// redirects are followed.
    ///
    /// # Errors
    ///
    /// Returns a [`FetchError`] classifying the failure (not found,
    /// ambiguous, network, malformed).
    async fn fetch_detail(
        &self,
        identifier: &str,
        exact_match: bool,
    ) -> std::result::Result<DetailRecord, FetchError>;

    /// Human-readable name for logging
    fn name(&self) -> &'static str;
}

/// MediaWiki Action API client
///
/// Reference lists come from `prop=extlinks`; disambiguation pages are
/// detected via `prop=pageprops` and reported as ambiguous together with the
/// page's outgoing link titles as candidates.
#[derive(Clone, Debug)]
pub struct MediaWikiClient {
    http: reqwest::Client,
    endpoint: Url,
    max_results: usize,
}

impl MediaWikiClient {
    /// Build a client from configuration
    ///
    /// # Errors
    ///
    /// Returns [`Error::Network`] if the underlying HTTP client cannot be
    /// constructed.
    pub fn new(config: &Config) -> Result<Self> {
        let http = reqwest::Client::builder()
            .user_agent(config.api.user_agent.clone())
            .build()?;

        Ok(Self {
            http,
            endpoint: config.api.endpoint.clone(),
            max_results: config.search.max_results,
        })
    }
}

#[async_trait]
impl RemoteSource for MediaWikiClient {
    async fn search(&self, query: &str) -> Result<Vec<String>> {
        tracing::debug!(query, endpoint = %self.endpoint, "searching");

        let response = self
            .http
            .get(self.endpoint.clone())
            .query(&[
                ("action", "query"),
                ("list", "search"),
                ("format", "json"),
                ("formatversion", "2"),
            ])
            .query(&[("srsearch", query)])
            .query(&[("srlimit", self.max_results.to_string())])
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(Error::Search(format!("search returned HTTP {status}")));
        }

        let body: ApiResponse = response.json().await?;
        if let Some(err) = body.error {
            return Err(Error::Search(format!("{}: {}", err.code, err.info)));
        }

        let hits = body.query.unwrap_or_default().search;
        tracing::debug!(query, hits = hits.len(), "search complete");
        Ok(hits.into_iter().map(|hit| hit.title).collect())
    }

    async fn fetch_detail(
        &self,
        identifier: &str,
        exact_match: bool,
    ) -> std::result::Result<DetailRecord, FetchError> {
        let network = |message: String| FetchError::Network {
            identifier: identifier.to_string(),
            message,
        };
        let malformed = |message: String| FetchError::Malformed {
            identifier: identifier.to_string(),
            message,
        };

        let mut request = self
            .http
            .get(self.endpoint.clone())
            .query(&[
                ("action", "query"),
                ("prop", "extlinks|links|pageprops"),
                ("ellimit", "max"),
                ("pllimit", "max"),
                ("format", "json"),
                ("formatversion", "2"),
            ])
            .query(&[("titles", identifier)]);
        if !exact_match {
            request = request.query(&[("redirects", "1")]);
        }

        let response = request.send().await.map_err(|e| network(e.to_string()))?;

        let status = response.status();
        if status.is_server_error() || status == reqwest::StatusCode::TOO_MANY_REQUESTS {
            return Err(network(format!("HTTP {status}")));
        }
        if !status.is_success() {
            return Err(malformed(format!("unexpected HTTP {status}")));
        }

        let body: ApiResponse = response
            .json()
            .await
            .map_err(|e| malformed(format!("invalid JSON: {e}")))?;
        if let Some(err) = body.error {
            return Err(malformed(format!("{}: {}", err.code, err.info)));
        }

        let page = body
            .query
            .unwrap_or_default()
            .pages
            .into_iter()
            .next()
            .ok_or_else(|| malformed("response contains no pages".to_string()))?;

        if page.missing || page.invalid {
            return Err(FetchError::NotFound {
                identifier: identifier.to_string(),
            });
        }

        if page
            .pageprops
            .as_ref()
            .is_some_and(|props| props.disambiguation.is_some())
        {
            return Err(FetchError::Ambiguous {
                identifier: identifier.to_string(),
                candidates: page.links.into_iter().map(|link| link.title).collect(),
            });
        }

        Ok(DetailRecord {
            title: page.title,
            references: Payload::Sequence(
                page.extlinks.into_iter().map(|link| link.url).collect(),
            ),
        })
    }

    fn name(&self) -> &'static str {
        "mediawiki"
    }
}

// --- Action API response shapes (formatversion=2) ---

#[derive(Debug, Default, Deserialize)]
struct ApiResponse {
    #[serde(default)]
    error: Option<ApiErrorBody>,
    #[serde(default)]
    query: Option<QueryBody>,
}

#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    code: String,
    info: String,
}

#[derive(Debug, Default, Deserialize)]
struct QueryBody {
    #[serde(default)]
    search: Vec<SearchHit>,
    #[serde(default)]
    pages: Vec<Page>,
}

#[derive(Debug, Deserialize)]
struct SearchHit {
    title: String,
}

#[derive(Debug, Deserialize)]
struct Page {
    title: String,
    #[serde(default)]
    missing: bool,
    #[serde(default)]
    invalid: bool,
    #[serde(default)]
    pageprops: Option<PageProps>,
    #[serde(default)]
    extlinks: Vec<ExtLink>,
    #[serde(default)]
    links: Vec<PageLink>,
}

#[derive(Debug, Deserialize)]
struct PageProps {
    #[serde(default)]
    disambiguation: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ExtLink {
    url: String,
}

#[derive(Debug, Deserialize)]
struct PageLink {
    title: String,
}
