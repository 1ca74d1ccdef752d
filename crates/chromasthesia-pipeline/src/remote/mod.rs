//! HTTP implementations of the remote boundary traits.
//!
//! All three backends share one `reqwest::Client` (connection pooling, one
//! timeout policy). Endpoints carry an optional API key sent as a bearer
//! token. Response parsing and status mapping live in pure functions so
//! they are testable on fixtures without a server.

mod images;
mod photos;
mod search;

pub use images::HttpImageFetcher;
pub use photos::HttpPhotoResolver;
pub use search::HttpSearchBackend;

use std::time::Duration;

use reqwest::{Client, RequestBuilder, StatusCode};

use chromasthesia_core::config::RetrievalSettings;
use chromasthesia_core::error::{BackendError, CoreError};

use crate::error::PipelineResult;

/// Build the shared HTTP client from retrieval settings.
///
/// # Errors
///
/// `CoreError::Config` (wrapped) when the TLS backend cannot be
/// initialized.
pub fn build_client(settings: &RetrievalSettings) -> PipelineResult<Client> {
    let client = Client::builder()
        .timeout(Duration::from_secs(settings.request_timeout_secs))
        .user_agent(concat!("chromasthesia/", env!("CARGO_PKG_VERSION")))
        .build()
        .map_err(|e| CoreError::Config(format!("failed to build HTTP client: {e}")))?;
    Ok(client)
}

/// Map a transport-level `reqwest` failure into the backend taxonomy.
pub(crate) fn transport_error(err: reqwest::Error) -> BackendError {
    if err.is_decode() {
        BackendError::Decode(err.to_string())
    } else {
        BackendError::Network(err.to_string())
    }
}

/// Map a non-success HTTP status into the backend taxonomy.
///
/// 404 and 403 become the benign-capable `NotFound`/`Forbidden`; everything
/// else is a `Service` failure carrying the status.
pub(crate) fn status_error(status: StatusCode, resource: &str) -> BackendError {
    match status {
        StatusCode::NOT_FOUND => BackendError::NotFound {
            resource: resource.to_string(),
        },
        StatusCode::FORBIDDEN => BackendError::Forbidden {
            resource: resource.to_string(),
        },
        _ => BackendError::Service {
            status: Some(status.as_u16()),
            message: format!("request for {resource} failed"),
        },
    }
}

/// Attach the endpoint's bearer token, when configured.
pub(crate) fn with_auth(request: RequestBuilder, api_key: Option<&str>) -> RequestBuilder {
    match api_key {
        Some(key) => request.bearer_auth(key),
        None => request,
    }
}

/// Base URL with any trailing slash removed, so path joins are uniform.
pub(crate) fn normalized_base(base_url: &str) -> String {
    base_url.trim_end_matches('/').to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_mapping() {
        assert!(status_error(StatusCode::NOT_FOUND, "photo 1").is_benign());
        assert!(status_error(StatusCode::FORBIDDEN, "photo 1").is_benign());
        assert_eq!(
            status_error(StatusCode::INTERNAL_SERVER_ERROR, "photo 1"),
            BackendError::Service {
                status: Some(500),
                message: "request for photo 1 failed".to_string(),
            }
        );
    }

    #[test]
    fn test_base_normalization() {
        assert_eq!(normalized_base("http://host/"), "http://host");
        assert_eq!(normalized_base("http://host"), "http://host");
    }
}
