/*!
 * Client for the AUR RPC interface.
 *
 * GET {AUR_URL}/rpc?v=5&type=search&arg={pkg} -> { resultcount, results: [...] }
 * GET {AUR_URL}{URLPath}                        -> snapshot tarball
 */
use std::io::Read;
use std::time::Duration;

use reqwest::blocking::Client;
use reqwest::header::CONTENT_TYPE;
use serde_derive::Deserialize;
use serde_json::{Map, Value};

use crate::{printinfo, AcquisitionError, QueryError, ResultRecord, SearchOutcome};

pub const AUR_URL: &str = "https://aur.archlinux.org";
pub const RPC_VERSION: &str = "5";
pub const RPC_TIMEOUT: Duration = Duration::from_secs(30);

/// search: match name and description. info: exact name lookup.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequestType {
    Search,
    Info,
}

impl RequestType {
    pub fn as_str(&self) -> &'static str {
        return match self {
            RequestType::Search => "search",
            RequestType::Info => "info",
        };
    }
}

/**
 * Everything the core needs from a package repository.
 * AurClient talks to the real thing, tests use an in-memory one.
 */
pub trait Repository {
    fn search(&self, pkg_name: &str, request_type: RequestType) -> Result<SearchOutcome, QueryError>;

    /// Open a byte stream for an artifact. Callers copy it out in chunks.
    fn fetch_artifact(&self, url_path: &str) -> Result<Box<dyn Read>, AcquisitionError>;

    fn artifact_url(&self, url_path: &str) -> String;
}

#[derive(Debug, Clone)]
pub struct AurClient {
    base_url: String,
    http: Client,
}

#[derive(Debug, Deserialize)]
struct RpcResponse {
    #[serde(rename = "type", default)]
    response_type: Option<String>,
    #[serde(default)]
    error: Option<String>,
    #[serde(default)]
    resultcount: usize,
    #[serde(default)]
    results: Vec<Map<String, Value>>,
}

impl AurClient {
    pub fn new(base_url: &str, timeout: Duration) -> Result<AurClient, QueryError> {
        let http = Client::builder()
            .timeout(timeout)
            .user_agent(concat!("acheron/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|err| QueryError::Search(format!("could not build HTTP client: {err}")))?;

        return Ok(AurClient { base_url: base_url.trim_end_matches('/').to_string(), http });
    }

    pub fn rpc_url(&self) -> String {
        return format!("{}/rpc", self.base_url);
    }
}

impl Repository for AurClient {
    fn search(&self, pkg_name: &str, request_type: RequestType) -> Result<SearchOutcome, QueryError> {
        let url = self.rpc_url();
        printinfo!("Querying {url} for '{pkg_name}'");

        let response = self.http
            .get(&url)
            .query(&[("v", RPC_VERSION), ("type", request_type.as_str()), ("arg", pkg_name)])
            .send()
            .and_then(|res| res.error_for_status())
            .map_err(|err| QueryError::Search(err.to_string()))?;

        let content_type = response.headers()
            .get(CONTENT_TYPE)
            .and_then(|val| val.to_str().ok())
            .unwrap_or_default()
            .to_string();
        if !content_type.starts_with("application/json") {
            return Err(QueryError::Search(format!("expected a JSON response, got '{content_type}'")));
        }

        let body = response.text().map_err(|err| QueryError::Search(err.to_string()))?;
        return parse_search_body(&body);
    }

    fn fetch_artifact(&self, url_path: &str) -> Result<Box<dyn Read>, AcquisitionError> {
        let url = self.artifact_url(url_path);
        let response = self.http
            .get(&url)
            .send()
            .and_then(|res| res.error_for_status())
            .map_err(|err| AcquisitionError::Download { url: url.to_owned(), reason: err.to_string() })?;

        return Ok(Box::new(response));
    }

    fn artifact_url(&self, url_path: &str) -> String {
        return format!("{}{}", self.base_url, url_path);
    }
}

pub fn parse_search_body(body: &str) -> Result<SearchOutcome, QueryError> {
    /*!
     * RPC body -> SearchOutcome.
     * Error envelopes ({"type":"error","error":"Too many package results."}) become Search errors.
     */
    let response: RpcResponse = serde_json::from_str(body)
        .map_err(|err| QueryError::Search(format!("could not parse response: {err}")))?;

    if response.response_type.as_deref() == Some("error") {
        let msg = response.error.unwrap_or_else(|| "unknown error".into());
        return Err(QueryError::Search(msg));
    }

    let records = response.results
        .into_iter()
        .map(ResultRecord::from_fields)
        .collect::<Result<Vec<ResultRecord>, QueryError>>()?;

    return Ok(SearchOutcome { total_count: response.resultcount, records });
}

#[cfg(test)]
mod tests {
    use super::*;

    const SEARCH_BODY: &str = r#"{
        "resultcount": 2,
        "results": [
            {"ID": 1, "Name": "foo", "Version": "1.0-1", "Description": null, "Maintainer": "someone",
             "Popularity": 5, "URLPath": "/cgit/aur.git/snapshot/foo.tar.gz"},
            {"ID": 2, "Name": "foobar", "Version": "2.0-1", "Description": "bar", "Maintainer": null,
             "Popularity": 9.25, "URLPath": "/cgit/aur.git/snapshot/foobar.tar.gz"}
        ],
        "type": "search",
        "version": 5
    }"#;

    #[test]
    fn test_parse_search_body() {
        let outcome = parse_search_body(SEARCH_BODY).unwrap();
        assert_eq!(outcome.total_count, 2);
        assert_eq!(outcome.records.len(), 2);
        assert_eq!(outcome.records[0].name(), "foo");
        assert_eq!(outcome.records[0].description(), None);
        assert_eq!(outcome.records[1].maintainer(), None);
        assert_eq!(outcome.records[1].url_path(), Some("/cgit/aur.git/snapshot/foobar.tar.gz"));
    }

    #[test]
    fn test_parse_empty_body() {
        let outcome = parse_search_body(r#"{"resultcount":0,"results":[],"type":"search","version":5}"#).unwrap();
        assert_eq!(outcome.total_count, 0);
        assert!(outcome.records.is_empty());
    }

    #[test]
    fn test_parse_error_envelope() {
        let body = r#"{"error":"Too many package results.","resultcount":0,"results":[],"type":"error","version":5}"#;
        match parse_search_body(body) {
            Err(QueryError::Search(msg)) => assert_eq!(msg, "Too many package results."),
            other => panic!("unexpected: {other:?}"),
        }
    }

    #[test]
    fn test_parse_garbage() {
        assert!(matches!(parse_search_body("<html>502</html>"), Err(QueryError::Search(_))));
        assert!(matches!(parse_search_body(r#"{"resultcount":1,"results":[{"Version":"1"}]}"#), Err(QueryError::DataFormat(_))));
    }

    #[test]
    fn test_urls() {
        let client = AurClient::new("https://aur.example.org/", RPC_TIMEOUT).unwrap();
        assert_eq!(client.rpc_url(), "https://aur.example.org/rpc");
        assert_eq!(client.artifact_url("/cgit/aur.git/snapshot/foo.tar.gz"), "https://aur.example.org/cgit/aur.git/snapshot/foo.tar.gz");
        assert_eq!(AurClient::new(AUR_URL, RPC_TIMEOUT).unwrap().rpc_url(), "https://aur.archlinux.org/rpc");
    }

    #[test]
    fn test_request_type() {
        assert_eq!(RequestType::Search.as_str(), "search");
        assert_eq!(RequestType::Info.as_str(), "info");
    }
}
