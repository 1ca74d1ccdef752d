//! HTTP search backend.
//!
//! `GET {base}/search?start=&count=&q=` returning a JSON page:
//!
//! ```json
//! { "total": 124, "results": [ { "id": "4451", "owner": "a", "thumb": "…", "title": "…" } ] }
//! ```

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use tracing::debug;

use chromasthesia_core::config::EndpointSettings;
use chromasthesia_core::error::BackendError;
use chromasthesia_core::traits::SearchBackend;
use chromasthesia_core::types::{PhotoId, ResultItem, SearchPage, SearchQuery};

use super::{normalized_base, status_error, transport_error, with_auth};
use crate::error::PipelineResult;

/// [`SearchBackend`] over the image search service's HTTP API.
pub struct HttpSearchBackend {
    client: Client,
    base_url: String,
    api_key: Option<String>,
}

impl HttpSearchBackend {
    /// # Errors
    ///
    /// `CoreError::Config` (wrapped) for an empty base URL.
    pub fn new(client: Client, endpoint: EndpointSettings) -> PipelineResult<Self> {
        endpoint.validate("search")?;
        Ok(Self {
            client,
            base_url: normalized_base(&endpoint.base_url),
            api_key: endpoint.api_key,
        })
    }
}

#[async_trait]
impl SearchBackend for HttpSearchBackend {
    async fn search(&self, query: &SearchQuery) -> Result<SearchPage, BackendError> {
        let url = format!("{}/search", self.base_url);
        let q = query.to_query_string();
        debug!(%url, start = query.start, count = query.page_size, %q, "issuing search");

        let request = self.client.get(&url).query(&[
            ("start", query.start.to_string()),
            ("count", query.page_size.to_string()),
            ("q", q),
        ]);
        let response = with_auth(request, self.api_key.as_deref())
            .send()
            .await
            .map_err(transport_error)?;

        let status = response.status();
        if !status.is_success() {
            return Err(status_error(status, "search"));
        }
        let body = response.bytes().await.map_err(transport_error)?;
        parse_page(&body)
    }
}

#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    total: Option<u64>,
    #[serde(default)]
    results: Vec<SearchResult>,
}

#[derive(Debug, Deserialize)]
struct SearchResult {
    id: String,
    owner: String,
    thumb: String,
    #[serde(default)]
    title: String,
}

/// Decode one search response body into a [`SearchPage`].
fn parse_page(body: &[u8]) -> Result<SearchPage, BackendError> {
    let response: SearchResponse =
        serde_json::from_slice(body).map_err(|e| BackendError::Decode(e.to_string()))?;
    Ok(SearchPage {
        total: response.total,
        items: response
            .results
            .into_iter()
            .map(|r| ResultItem {
                photo_id: PhotoId::new(r.id),
                owner: r.owner,
                thumbnail: r.thumb,
                title: r.title,
            })
            .collect(),
    })
}
