//! HTTP photo size-lookup backend.
//!
//! `GET {base}/photos/{id}/sizes`. The service reports failures both via
//! HTTP status and via an in-body status envelope:
//!
//! ```json
//! { "stat": "ok", "sizes": { "size": [ { "label": "Large", "width": 1024, "height": 768, "source": "…" } ] } }
//! { "stat": "fail", "code": 1, "message": "Photo not found" }
//! ```
//!
//! In-body failure code 1 means the photo is gone and code 2 means access
//! is refused; both map to the benign-capable variants, matching the HTTP
//! 404/403 mapping.

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;

use chromasthesia_core::config::EndpointSettings;
use chromasthesia_core::error::BackendError;
use chromasthesia_core::traits::PhotoResolver;
use chromasthesia_core::types::{PhotoId, PhotoSize};

use super::{normalized_base, status_error, transport_error, with_auth};
use crate::error::PipelineResult;

/// [`PhotoResolver`] over the photo service's HTTP API.
pub struct HttpPhotoResolver {
    client: Client,
    base_url: String,
    api_key: Option<String>,
}

impl HttpPhotoResolver {
    /// # Errors
    ///
    /// `CoreError::Config` (wrapped) for an empty base URL.
    pub fn new(client: Client, endpoint: EndpointSettings) -> PipelineResult<Self> {
        endpoint.validate("photos")?;
        Ok(Self {
            client,
            base_url: normalized_base(&endpoint.base_url),
            api_key: endpoint.api_key,
        })
    }
}

#[async_trait]
impl PhotoResolver for HttpPhotoResolver {
    async fn sizes_for(&self, id: &PhotoId) -> Result<Vec<PhotoSize>, BackendError> {
        let url = format!("{}/photos/{}/sizes", self.base_url, id);
        let request = self.client.get(&url);
        let response = with_auth(request, self.api_key.as_deref())
            .send()
            .await
            .map_err(transport_error)?;

        let status = response.status();
        if !status.is_success() {
            return Err(status_error(status, &format!("photo {id}")));
        }
        let body = response.bytes().await.map_err(transport_error)?;
        parse_sizes(id, &body)
    }
}

#[derive(Debug, Deserialize)]
struct SizesResponse {
    #[serde(default)]
    stat: Option<String>,
    #[serde(default)]
    code: Option<u32>,
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    sizes: Option<SizesPayload>,
}

#[derive(Debug, Deserialize)]
struct SizesPayload {
    #[serde(default)]
    size: Vec<SizeEntry>,
}

#[derive(Debug, Deserialize)]
struct SizeEntry {
    label: String,
    width: u32,
    height: u32,
    source: String,
}

/// Decode one sizes response body, mapping the in-body status envelope.
fn parse_sizes(id: &PhotoId, body: &[u8]) -> Result<Vec<PhotoSize>, BackendError> {
    let response: SizesResponse =
        serde_json::from_slice(body).map_err(|e| BackendError::Decode(e.to_string()))?;

    if response.stat.as_deref() == Some("fail") {
        let message = response
            .message
            .unwrap_or_else(|| "size lookup failed".to_string());
        return Err(match response.code {
            Some(1) => BackendError::NotFound {
                resource: format!("photo {id}"),
            },
            Some(2) => BackendError::Forbidden {
                resource: format!("photo {id}"),
            },
            _ => BackendError::Service {
                status: None,
                message,
            },
        });
    }

    // An "ok" answer with no size table is legal; the pipeline treats an
    // empty table like a benign skip downstream.
    Ok(response
        .sizes
        .map(|payload| {
            payload
                .size
                .into_iter()
                .map(|s| PhotoSize {
                    label: s.label,
                    width: s.width,
                    height: s.height,
                    source: s.source,
                })
                .collect()
        })
        .unwrap_or_default())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn id() -> PhotoId {
        PhotoId::from("4451")
    }

    #[test]
    fn test_parse_size_table() {
        let body = br#"{
            "stat": "ok",
            "sizes": { "size": [
                { "label": "Small", "width": 240, "height": 180, "source": "https://i/s.jpg" },
                { "label": "Large", "width": 1024, "height": 768, "source": "https://i/l.jpg" }
            ] }
        }"#;
        let sizes = parse_sizes(&id(), body).unwrap();
        assert_eq!(sizes.len(), 2);
        assert_eq!(PhotoSize::largest(&sizes).unwrap().label, "Large");
    }

    #[test]
    fn test_fail_code_one_is_not_found() {
        let body = br#"{ "stat": "fail", "code": 1, "message": "Photo not found" }"#;
        let err = parse_sizes(&id(), body).unwrap_err();
        assert_eq!(
            err,
            BackendError::NotFound {
                resource: "photo 4451".to_string(),
            }
        );
        assert!(err.is_benign());
    }

    #[test]
    fn test_fail_code_two_is_forbidden() {
        let body = br#"{ "stat": "fail", "code": 2, "message": "Permission denied" }"#;
        assert!(parse_sizes(&id(), body).unwrap_err().is_benign());
    }

    #[test]
    fn test_other_fail_codes_are_service_errors() {
        let body = br#"{ "stat": "fail", "code": 105, "message": "Service unavailable" }"#;
        let err = parse_sizes(&id(), body).unwrap_err();
        assert!(!err.is_benign());
        assert!(matches!(err, BackendError::Service { status: None, .. }));
    }

    #[test]
    fn test_ok_with_missing_table_is_empty() {
        let sizes = parse_sizes(&id(), br#"{ "stat": "ok" }"#).unwrap();
        assert!(sizes.is_empty());
    }
}
