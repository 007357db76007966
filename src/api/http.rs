//! Reqwest-backed gateway.
//!
//! Owns transport details only: URL layout, the fixed JSON content type,
//! status mapping and body decoding.

use async_trait::async_trait;
use reqwest::header::{CONTENT_TYPE, HeaderMap, HeaderValue};
use reqwest::{Client, Response, Url};
use serde::de::DeserializeOwned;
use tracing::{debug, warn};

use super::{RecordId, RemoteGateway, Resource};
use crate::error::TransportError;

/// Gateway that talks to the BookHub REST API rooted at one base URL.
#[derive(Clone, Debug)]
pub struct HttpGateway {
    client: Client,
    base: String,
    root: Url,
}

impl HttpGateway {
    /// Build a gateway for `base_url` (for example `http://localhost:8001/api`).
    ///
    /// # Errors
    ///
    /// Fails when the URL does not parse, cannot carry a path, or the client
    /// cannot be constructed.
    pub fn new(base_url: &str) -> anyhow::Result<Self> {
        let parsed = Url::parse(base_url)?;
        let base = parsed.as_str().trim_end_matches('/').to_string();
        let root = Url::parse(&base)?;
        anyhow::ensure!(!root.cannot_be_a_base(), "base URL {base_url} cannot carry a path");
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        let client = Client::builder().default_headers(headers).build()?;
        Ok(Self { client, base, root })
    }

    pub fn base_url(&self) -> &str {
        &self.base
    }

    fn collection_url(&self, path: &str) -> String {
        format!("{}/{}/", self.base, path)
    }

    /// The id is pushed as a single percent-encoded path segment.
    fn record_url(&self, path: &str, id: &RecordId) -> String {
        let mut url = self.root.clone();
        if let Ok(mut segments) = url.path_segments_mut() {
            segments.pop_if_empty().push(path).push(&id.to_string()).push("");
        }
        url.into()
    }
}

#[async_trait]
impl<R: Resource> RemoteGateway<R> for HttpGateway {
    async fn list(&self) -> Result<Vec<R>, TransportError> {
        let url = self.collection_url(R::PATH);
        debug!(%url, "GET");
        let response = self.client.get(&url).send().await.map_err(map_transport_error)?;
        decode_json(response).await
    }

    async fn create(&self, draft: &R::Draft) -> Result<R, TransportError> {
        let url = self.collection_url(R::PATH);
        debug!(%url, "POST");
        let response = self
            .client
            .post(&url)
            .json(draft)
            .send()
            .await
            .map_err(map_transport_error)?;
        decode_json(response).await
    }

    async fn update(&self, id: &RecordId, draft: &R::Draft) -> Result<(), TransportError> {
        let url = self.record_url(R::PATH, id);
        debug!(%url, "PUT");
        let response = self
            .client
            .put(&url)
            .json(draft)
            .send()
            .await
            .map_err(map_transport_error)?;
        expect_success(response).await
    }

    async fn delete(&self, id: &RecordId) -> Result<(), TransportError> {
        let url = self.record_url(R::PATH, id);
        debug!(%url, "DELETE");
        let response = self
            .client
            .delete(&url)
            .send()
            .await
            .map_err(map_transport_error)?;
        expect_success(response).await
    }
}

async fn decode_json<T: DeserializeOwned>(response: Response) -> Result<T, TransportError> {
    let status = response.status();
    let body = response.bytes().await.map_err(map_transport_error)?;
    if !status.is_success() {
        return Err(map_status_error(status.as_u16(), &body));
    }
    parse_body(&body)
}

async fn expect_success(response: Response) -> Result<(), TransportError> {
    let status = response.status();
    if status.is_success() {
        return Ok(());
    }
    let body = response.bytes().await.map_err(map_transport_error)?;
    Err(map_status_error(status.as_u16(), &body))
}

fn parse_body<T: DeserializeOwned>(body: &[u8]) -> Result<T, TransportError> {
    serde_json::from_slice(body).map_err(|e| TransportError::Decode(e.to_string()))
}

fn map_transport_error(error: reqwest::Error) -> TransportError {
    warn!(error = %error, "request failed");
    TransportError::Network(error.to_string())
}

fn map_status_error(status: u16, body: &[u8]) -> TransportError {
    let preview = body_preview(body);
    warn!(status, body = %preview, "backend rejected request");
    TransportError::status(status, preview)
}

fn body_preview(body: &[u8]) -> String {
    const PREVIEW_CHAR_LIMIT: usize = 160;

    let compact = String::from_utf8_lossy(body)
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ");
    let preview: String = compact.chars().take(PREVIEW_CHAR_LIMIT).collect();
    if compact.chars().count() > PREVIEW_CHAR_LIMIT {
        format!("{preview}...")
    } else {
        preview
    }
}
