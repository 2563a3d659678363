//! reqwest-backed implementation of the backend API.

use std::time::Duration;

use async_trait::async_trait;
use serde::Serialize;
use tracing::debug;
use url::Url;

use crate::inbox::{FilterState, MessageStatus};

use super::{check_acknowledged, check_http_response, parse_envelope, ApiError, MessageApi, MessagePage};

/// Shared HTTP client bound to one API base URL.
///
/// Cheap to clone; every clone shares the same connection pool.
#[derive(Debug, Clone)]
pub struct ApiClient {
    base: Url,
    client: reqwest::Client,
}

impl ApiClient {
    /// Build a client for `base` with a per-request `timeout`.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::Request` if the TLS backend cannot be initialised,
    /// and `ApiError::InvalidUrl` if `base` cannot carry path segments.
    pub fn new(base: Url, timeout: Duration) -> Result<Self, ApiError> {
        if base.cannot_be_a_base() {
            return Err(ApiError::InvalidUrl(format!(
                "{base} cannot be used as an API base"
            )));
        }
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self { base, client })
    }

    /// The base URL endpoints are resolved against.
    pub fn base(&self) -> &Url {
        &self.base
    }

    /// Resolve `segments` below the base URL, percent-encoding each one.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::InvalidUrl` if the base URL has no path.
    pub fn endpoint(&self, segments: &[&str]) -> Result<Url, ApiError> {
        let mut url = self.base.clone();
        url.path_segments_mut()
            .map_err(|()| ApiError::InvalidUrl(format!("{} has no path", self.base)))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    /// GET `url` and return the body of a 2xx response.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError`] on transport failure or non-2xx status.
    pub async fn get_text(&self, url: Url) -> Result<String, ApiError> {
        debug!(method = "GET", %url, "api request");
        let response = self.client.get(url).send().await?;
        check_http_response(response).await
    }

    /// Send `body` as JSON with `method` and return the body of a 2xx response.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError`] on transport failure or non-2xx status.
    pub async fn send_json<B: Serialize + Sync>(
        &self,
        method: reqwest::Method,
        url: Url,
        body: &B,
    ) -> Result<String, ApiError> {
        debug!(%method, %url, "api request");
        let response = self
            .client
            .request(method, url)
            .header("content-type", "application/json")
            .json(body)
            .send()
            .await?;
        check_http_response(response).await
    }

    /// DELETE `url` and return the body of a 2xx response.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError`] on transport failure or non-2xx status.
    pub async fn delete(&self, url: Url) -> Result<String, ApiError> {
        debug!(method = "DELETE", %url, "api request");
        let response = self.client.delete(url).send().await?;
        check_http_response(response).await
    }
}

#[derive(Debug, Serialize)]
struct StatusUpdate {
    status: MessageStatus,
}

/// `/api/messages` over HTTP.
#[derive(Debug, Clone)]
pub struct HttpMessageApi {
    client: ApiClient,
}

impl HttpMessageApi {
    /// Wrap a configured [`ApiClient`].
    pub fn new(client: ApiClient) -> Self {
        Self { client }
    }

    /// Build the listing URL for `filters`.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::InvalidUrl` if the base URL has no path.
    pub fn list_url(&self, filters: &FilterState) -> Result<Url, ApiError> {
        let mut url = self.client.endpoint(&["api", "messages"])?;
        url.query_pairs_mut()
            .append_pair("status", filters.status.as_str())
            .append_pair("search", &filters.search)
            .append_pair("page", &filters.page.to_string())
            .append_pair("limit", &filters.limit.to_string());
        Ok(url)
    }
}

#[async_trait]
impl MessageApi for HttpMessageApi {
    async fn list_messages(&self, filters: &FilterState) -> Result<MessagePage, ApiError> {
        let url = self.list_url(filters)?;
        let body = self.client.get_text(url).await?;
        parse_envelope(&body)
    }

    async fn update_status(&self, id: &str, status: MessageStatus) -> Result<(), ApiError> {
        let url = self.client.endpoint(&["api", "messages", id, "status"])?;
        let body = self
            .client
            .send_json(reqwest::Method::PATCH, url, &StatusUpdate { status })
            .await?;
        check_acknowledged(&body)
    }
}
