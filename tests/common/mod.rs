//! Common test utilities: a scripted MediaWiki Action API on wiremock

#![allow(dead_code)]

use serde_json::json;
use std::path::{Path, PathBuf};
use url::Url;
use wiremock::matchers::{method, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use wiki_dl::Config;

/// Configuration pointed at the mock server, writing into `output_dir`,
/// with the process-pool worker resolved to this package's binary
pub fn config_for(server: &MockServer, output_dir: &Path) -> Config {
    let mut config = Config::default();
    config.api.endpoint = Url::parse(&format!("{}/w/api.php", server.uri()))
        .expect("mock server uri is a valid URL");
    config.output.dir = output_dir.to_path_buf();
    config.worker_program = Some(PathBuf::from(env!("CARGO_BIN_EXE_wiki-dl")));
    config
}

/// Mount a search result list for any query
pub async fn mount_search(server: &MockServer, titles: &[&str]) {
    let hits: Vec<_> = titles.iter().map(|t| json!({"title": t})).collect();
    Mock::given(method("GET"))
        .and(query_param("list", "search"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "query": {"search": hits}
        })))
        .mount(server)
        .await;
}

/// Mount a page with the given title and external links
pub async fn mount_page(server: &MockServer, identifier: &str, title: &str, references: &[&str]) {
    let extlinks: Vec<_> = references.iter().map(|r| json!({"url": r})).collect();
    Mock::given(method("GET"))
        .and(query_param("titles", identifier))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "query": {"pages": [{"title": title, "extlinks": extlinks}]}
        })))
        .mount(server)
        .await;
}

/// Mount a missing page
pub async fn mount_missing(server: &MockServer, identifier: &str) {
    Mock::given(method("GET"))
        .and(query_param("titles", identifier))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "query": {"pages": [{"title": identifier, "missing": true}]}
        })))
        .mount(server)
        .await;
}

/// Mount a disambiguation page with candidate link titles
pub async fn mount_disambiguation(server: &MockServer, identifier: &str, candidates: &[&str]) {
    let links: Vec<_> = candidates.iter().map(|c| json!({"ns": 0, "title": c})).collect();
    Mock::given(method("GET"))
        .and(query_param("titles", identifier))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "query": {"pages": [{
                "title": identifier,
                "pageprops": {"disambiguation": ""},
                "links": links
            }]}
        })))
        .mount(server)
        .await;
}

/// Mount a server-side failure for one identifier
pub async fn mount_flaky(server: &MockServer, identifier: &str) {
    Mock::given(method("GET"))
        .and(query_param("titles", identifier))
        .respond_with(ResponseTemplate::new(503))
        .mount(server)
        .await;
}
