//! Reqwest-backed item transport adapter.
//!
//! This adapter owns transport details only: route building, request
//! serialisation, timeout and connection error mapping, and JSON decoding of
//! reply bodies into domain items. Status codes are passed through untouched.

use std::time::Duration;

use async_trait::async_trait;
use outcome::ProtocolStatus;
use reqwest::header::{ACCEPT, CONTENT_TYPE};
use reqwest::{Client, RequestBuilder, StatusCode, Url};
use serde::de::DeserializeOwned;
use tracing::debug;

use super::dto::{ItemDto, ItemUpdateDto, NewItemDto, into_domain_items};
use crate::domain::ports::{ItemTransport, ReplyBody, TransportError, TransportReply};
use crate::domain::{Item, ItemId, ItemUpdate, NewItem, PatchDocument};

const DEFAULT_USER_AGENT: &str = "item-client/0.1";
const APPLICATION_JSON: &str = "application/json";
const APPLICATION_JSON_PATCH: &str = "application/json-patch+json";

/// Item transport that talks to the catalogue service over HTTP.
pub struct HttpItemTransport {
    client: Client,
    base_url: Url,
}

impl HttpItemTransport {
    /// Build an adapter using a reqwest client with an explicit request
    /// timeout.
    ///
    /// A trailing slash is added to `base_url` when missing so that routes
    /// resolve below its path.
    /// ```rust,ignore
    /// let transport = HttpItemTransport::new(base_url, Duration::from_secs(10));
    /// assert!(transport.is_ok() || transport.is_err());
    /// ```
    /// # Errors
    ///
    /// Returns an error when the reqwest client cannot be constructed.
    pub fn new(base_url: Url, timeout: Duration) -> Result<Self, reqwest::Error> {
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(DEFAULT_USER_AGENT)
            .build()?;
        Ok(Self {
            client,
            base_url: with_trailing_slash(base_url),
        })
    }

    /// Base URL routes are resolved against.
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    fn items_url(&self) -> Result<Url, TransportError> {
        join_route(&self.base_url, "items")
    }

    fn item_url(&self, id: &ItemId) -> Result<Url, TransportError> {
        join_route(&self.base_url, &format!("items/{id}"))
    }
}

#[async_trait]
impl ItemTransport for HttpItemTransport {
    async fn fetch_all(&self) -> Result<TransportReply<Vec<Item>>, TransportError> {
        let request = self.client.get(self.items_url()?);
        exchange(request, into_domain_items).await
    }

    async fn fetch_one(&self, id: &ItemId) -> Result<TransportReply<Item>, TransportError> {
        let request = self.client.get(self.item_url(id)?);
        exchange(request, ItemDto::into_domain).await
    }

    async fn create(&self, item: &NewItem) -> Result<TransportReply<Item>, TransportError> {
        let request = self
            .client
            .post(self.items_url()?)
            .json(&NewItemDto::from(item));
        exchange(request, ItemDto::into_domain).await
    }

    async fn replace(
        &self,
        id: &ItemId,
        update: &ItemUpdate,
    ) -> Result<TransportReply<()>, TransportError> {
        let request = self
            .client
            .put(self.item_url(id)?)
            .json(&ItemUpdateDto::new(*id, update));
        exchange_without_body(request).await
    }

    async fn apply_patch(
        &self,
        id: &ItemId,
        patch: &PatchDocument,
    ) -> Result<TransportReply<Item>, TransportError> {
        let payload = serde_json::to_vec(patch)
            .map_err(|error| TransportError::encode(format!("invalid patch document: {error}")))?;
        let request = self
            .client
            .patch(self.item_url(id)?)
            .header(CONTENT_TYPE, APPLICATION_JSON_PATCH)
            .body(payload);
        exchange(request, ItemDto::into_domain).await
    }

    async fn delete(&self, id: &ItemId) -> Result<TransportReply<()>, TransportError> {
        let request = self.client.delete(self.item_url(id)?);
        exchange_without_body(request).await
    }
}

async fn exchange<D, T>(
    request: RequestBuilder,
    into_domain: impl FnOnce(D) -> Result<T, String>,
) -> Result<TransportReply<T>, TransportError>
where
    D: DeserializeOwned,
{
    let (status, body) = send(request).await?;
    if status.is_error() {
        return Ok(TransportReply::empty(status));
    }
    Ok(TransportReply::new(status, classify_body(&body, into_domain)))
}

async fn exchange_without_body(
    request: RequestBuilder,
) -> Result<TransportReply<()>, TransportError> {
    let (status, _body) = send(request).await?;
    Ok(TransportReply::empty(status))
}

async fn send(request: RequestBuilder) -> Result<(ProtocolStatus, Vec<u8>), TransportError> {
    let response = request
        .header(ACCEPT, APPLICATION_JSON)
        .send()
        .await
        .map_err(|error| map_transport_error(error, None))?;

    let status = map_status(response.status())?;
    let body = match response.bytes().await {
        Ok(body) => body.to_vec(),
        // Error bodies are never decoded, so a broken one still yields the status.
        Err(error) if status.is_error() => {
            debug!(%status, %error, "item service error body could not be read");
            Vec::new()
        }
        Err(error) => return Err(map_transport_error(error, status.code())),
    };
    if status.is_error() {
        debug!(
            %status,
            body = %body_preview(&body),
            "item service returned an error status"
        );
    }
    Ok((status, body))
}

fn classify_body<D, T>(body: &[u8], into_domain: impl FnOnce(D) -> Result<T, String>) -> ReplyBody<T>
where
    D: DeserializeOwned,
{
    if body.iter().all(u8::is_ascii_whitespace) {
        return ReplyBody::Empty;
    }
    let decoded = serde_json::from_slice::<D>(body)
        .map_err(|error| format!("invalid item JSON payload: {error}"))
        .and_then(into_domain);
    match decoded {
        Ok(value) => ReplyBody::Decoded(value),
        Err(message) => ReplyBody::Undecodable { message },
    }
}

fn map_status(status: StatusCode) -> Result<ProtocolStatus, TransportError> {
    ProtocolStatus::from_u16(status.as_u16()).map_err(|error| {
        TransportError::connection(format!("unsupported response status: {error}"), None)
    })
}

/// Map a reqwest failure, keeping `received` when the status line had
/// already arrived.
fn map_transport_error(error: reqwest::Error, received: Option<u16>) -> TransportError {
    if error.is_timeout() {
        TransportError::timeout(error.to_string())
    } else {
        let status = error.status().map(|status| status.as_u16()).or(received);
        TransportError::connection(error.to_string(), status)
    }
}

fn join_route(base: &Url, route: &str) -> Result<Url, TransportError> {
    base.join(route).map_err(|error| {
        TransportError::connection(format!("invalid request url for {route}: {error}"), None)
    })
}

fn with_trailing_slash(mut url: Url) -> Url {
    if !url.path().ends_with('/') {
        let path = format!("{}/", url.path());
        url.set_path(&path);
    }
    url
}

fn body_preview(body: &[u8]) -> String {
    const PREVIEW_CHAR_LIMIT: usize = 160;

    let compact = String::from_utf8_lossy(body)
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ");
    let preview = compact.chars().take(PREVIEW_CHAR_LIMIT).collect::<String>();
    if compact.chars().count() > PREVIEW_CHAR_LIMIT {
        format!("{preview}...")
    } else {
        preview
    }
}
