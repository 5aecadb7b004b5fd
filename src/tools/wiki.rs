//! Wikipedia Summary Tool
//!
//! Information Hiding:
//! - MediaWiki action API details hidden behind a classified outcome
//! - Disambiguation candidates fetched through a follow-up search query
//! - Timeouts and transport errors internalized as `Failed`

use reqwest::Client;
use tokio::time::{timeout, Duration};

use serde::Deserialize;

/// Classified result of a summary lookup.
#[derive(Debug, Clone, PartialEq)]
pub enum WikiOutcome {
    /// Intro summary of the page, capped at three sentences
    Summary(String),
    /// No page with that title exists
    NotFound,
    /// The title is a disambiguation page; up to five candidate titles
    Ambiguous(Vec<String>),
    /// Transport, decode, or timeout failure
    Failed(String),
}

#[derive(Debug, Deserialize)]
struct QueryResponse {
    query: Option<Query>,
}

#[derive(Debug, Deserialize)]
struct Query {
    #[serde(default)]
    pages: Vec<Page>,
    #[serde(default)]
    search: Vec<SearchHit>,
}

#[derive(Debug, Deserialize)]
struct Page {
    #[serde(default)]
    missing: bool,
    extract: Option<String>,
    pageprops: Option<PageProps>,
}

#[derive(Debug, Deserialize)]
struct PageProps {
    disambiguation: Option<String>,
}

#[derive(Debug, Deserialize)]
struct SearchHit {
    title: String,
}

const MAX_CANDIDATES: &str = "5";

/// Wikipedia lookup tool over the MediaWiki action API
pub struct WikiTool {
    client: Client,
    endpoint: String,
    timeout_secs: u64,
}

impl WikiTool {
    pub fn new(endpoint: impl Into<String>, timeout_secs: u64) -> Self {
        Self {
            client: Client::new(),
            endpoint: endpoint.into(),
            timeout_secs,
        }
    }

    fn api_url(&self) -> String {
        format!("{}/w/api.php", self.endpoint)
    }

    /// Fetch a plain-text intro summary for `topic` and classify the result.
    pub async fn lookup(&self, topic: &str) -> WikiOutcome {
        tracing::debug!("[WikiTool] Looking up '{}'", topic);

        let request = self
            .client
            .get(self.api_url())
            .query(&[
                ("action", "query"),
                ("format", "json"),
                ("formatversion", "2"),
                ("redirects", "1"),
                ("prop", "extracts|pageprops"),
                ("ppprop", "disambiguation"),
                ("exintro", "1"),
                ("explaintext", "1"),
                ("exsentences", "3"),
                ("titles", topic),
            ])
            .send();

        let response = match timeout(Duration::from_secs(self.timeout_secs), request).await {
            Ok(Ok(response)) => response,
            Ok(Err(e)) => return WikiOutcome::Failed(format!("request failed: {}", e)),
            Err(_) => {
                return WikiOutcome::Failed(format!(
                    "request timed out after {} seconds",
                    self.timeout_secs
                ))
            }
        };

        let status = response.status();
        if !status.is_success() {
            return WikiOutcome::Failed(format!("Wikipedia returned status {}", status));
        }

        let body = match response.json::<QueryResponse>().await {
            Ok(body) => body,
            Err(e) => return WikiOutcome::Failed(format!("could not decode response: {}", e)),
        };

        let page = match body.query.and_then(|q| q.pages.into_iter().next()) {
            Some(page) => page,
            None => return WikiOutcome::NotFound,
        };

        if page.missing {
            return WikiOutcome::NotFound;
        }

        if page
            .pageprops
            .as_ref()
            .is_some_and(|props| props.disambiguation.is_some())
        {
            return WikiOutcome::Ambiguous(self.candidates(topic).await);
        }

        match page.extract {
            Some(extract) if !extract.trim().is_empty() => {
                WikiOutcome::Summary(extract.trim().to_string())
            }
            _ => WikiOutcome::Failed("page has no extract".to_string()),
        }
    }

    /// Best-effort candidate titles for an ambiguous topic. Errors here
    /// degrade to an empty candidate list, not a failed lookup.
    async fn candidates(&self, topic: &str) -> Vec<String> {
        let request = self
            .client
            .get(self.api_url())
            .query(&[
                ("action", "query"),
                ("format", "json"),
                ("formatversion", "2"),
                ("list", "search"),
                ("srsearch", topic),
                ("srlimit", MAX_CANDIDATES),
            ])
            .send();

        let response = match timeout(Duration::from_secs(self.timeout_secs), request).await {
            Ok(Ok(response)) => response,
            _ => return Vec::new(),
        };

        match response.json::<QueryResponse>().await {
            Ok(body) => body
                .query
                .map(|q| q.search.into_iter().map(|hit| hit.title).collect())
                .unwrap_or_default(),
            Err(_) => Vec::new(),
        }
    }
}
