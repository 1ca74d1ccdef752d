//! HTTP image download backend.
//!
//! Plain `GET` against the resolved source URL; the body is the image. No
//! bearer token, the source URLs are pre-signed by the photo service.

use async_trait::async_trait;
use bytes::Bytes;
use reqwest::header::CONTENT_TYPE;
use reqwest::Client;
use tracing::debug;

use chromasthesia_core::error::BackendError;
use chromasthesia_core::traits::ImageFetcher;

use super::{status_error, transport_error};

/// [`ImageFetcher`] downloading image bodies over HTTP.
pub struct HttpImageFetcher {
    client: Client,
}

impl HttpImageFetcher {
    #[must_use]
    pub fn new(client: Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl ImageFetcher for HttpImageFetcher {
    async fn download(&self, url: &str) -> Result<(Bytes, Option<String>), BackendError> {
        let response = self.client.get(url).send().await.map_err(transport_error)?;

        let status = response.status();
        if !status.is_success() {
            return Err(status_error(status, url));
        }
        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);
        let bytes = response.bytes().await.map_err(transport_error)?;
        debug!(%url, len = bytes.len(), "image downloaded");
        Ok((bytes, content_type))
    }
}
