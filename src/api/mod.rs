//! Backend API abstraction layer.
//!
//! Defines the [`MessageApi`] trait the inbox controller talks to, the
//! response envelope shared by every `/api/...` endpoint, and the error type
//! all HTTP collaborators return.
//!
//! The reqwest implementation lives in [`http`].

use std::sync::OnceLock;

use async_trait::async_trait;
use regex::Regex;
use serde::de::DeserializeOwned;
use serde::Deserialize;

use crate::inbox::{FilterState, Message, MessageStatus, Pagination};

pub mod http;

// ---------------------------------------------------------------------------
// Wire types
// ---------------------------------------------------------------------------

/// The `{success, data, message}` wrapper every inbox endpoint answers with.
#[doc(hidden)]
#[derive(Debug, Deserialize)]
pub struct Envelope<T> {
    /// Semantic success flag.
    #[serde(default)]
    pub success: bool,
    /// Payload, present on success.
    pub data: Option<T>,
    /// Human-readable reason, usually present on failure.
    #[serde(default)]
    pub message: Option<String>,
}

/// One page of messages plus pagination metadata.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct MessagePage {
    /// Messages on this page, in backend order.
    pub messages: Vec<Message>,
    /// Page count and total hits for the filter.
    #[serde(default)]
    pub pagination: Pagination,
}

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// Errors returned by backend collaborators.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// HTTP transport failure (connect, timeout, body read).
    #[error("request failed: {0}")]
    Request(#[from] reqwest::Error),
    /// Backend responded with an error status.
    #[error("API returned non-success status {status}: {body}")]
    HttpStatus {
        /// HTTP status code.
        status: u16,
        /// Sanitized response body.
        body: String,
    },
    /// Response did not match the expected schema.
    #[error("response parse error: {0}")]
    Parse(String),
    /// Backend answered `success: false`.
    #[error("API rejected request: {0}")]
    Rejected(String),
    /// An endpoint URL could not be built.
    #[error("invalid URL: {0}")]
    InvalidUrl(String),
}

impl ApiError {
    /// Whether repeating the same request could plausibly succeed.
    ///
    /// Transport failures, 5xx and 429 are retryable; schema mismatches,
    /// rejections and other client errors are not.
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Request(_) => true,
            Self::HttpStatus { status, .. } => *status >= 500 || *status == 429,
            Self::Parse(_) | Self::Rejected(_) | Self::InvalidUrl(_) => false,
        }
    }
}

// ---------------------------------------------------------------------------
// HTTP helpers
// ---------------------------------------------------------------------------

const MAX_ERROR_BODY_CHARS: usize = 256;

/// Check HTTP response status and return body text or a structured error.
///
/// # Errors
///
/// Returns `ApiError::Request` on transport failure, `ApiError::HttpStatus` on non-2xx.
pub async fn check_http_response(response: reqwest::Response) -> Result<String, ApiError> {
    let status = response.status();
    let body = response.text().await?;
    if !status.is_success() {
        return Err(ApiError::HttpStatus {
            status: status.as_u16(),
            body: sanitize_http_error_body(&body),
        });
    }
    Ok(body)
}

/// Strip markup from an error page, collapse whitespace, and truncate.
///
/// Backend error pages are often small HTML documents.
pub fn sanitize_http_error_body(raw: &str) -> String {
    static TAGS: OnceLock<Option<Regex>> = OnceLock::new();
    let stripped = match TAGS.get_or_init(|| Regex::new(r"(?s)<[^>]*>").ok()) {
        Some(tags) => tags.replace_all(raw, " ").into_owned(),
        None => raw.to_owned(),
    };
    let collapsed = stripped.split_whitespace().collect::<Vec<_>>().join(" ");

    if collapsed.chars().count() > MAX_ERROR_BODY_CHARS {
        let shortened = collapsed
            .chars()
            .take(MAX_ERROR_BODY_CHARS)
            .collect::<String>();
        return format!("{shortened}...[truncated]");
    }

    collapsed
}

/// Decode an [`Envelope`] and unwrap its payload.
///
/// # Errors
///
/// Returns `ApiError::Parse` on malformed JSON or a missing payload, and
/// `ApiError::Rejected` when the backend reports `success: false`.
pub fn parse_envelope<T: DeserializeOwned>(body: &str) -> Result<T, ApiError> {
    let envelope: Envelope<T> = serde_json::from_str(body)
        .map_err(|e| ApiError::Parse(format!("invalid response envelope: {e}")))?;
    if !envelope.success {
        return Err(ApiError::Rejected(
            envelope
                .message
                .unwrap_or_else(|| "backend reported failure".to_owned()),
        ));
    }
    envelope
        .data
        .ok_or_else(|| ApiError::Parse("response envelope has no data".to_owned()))
}

/// Accept an acknowledgement body for a write.
///
/// An empty or non-envelope body counts as success; only an explicit
/// `success: false` is a rejection.
///
/// # Errors
///
/// Returns `ApiError::Rejected` when the body carries `success: false`.
pub fn check_acknowledged(body: &str) -> Result<(), ApiError> {
    if body.trim().is_empty() {
        return Ok(());
    }
    let Ok(value) = serde_json::from_str::<serde_json::Value>(body) else {
        return Ok(());
    };
    if value.get("success").and_then(serde_json::Value::as_bool) == Some(false) {
        let reason = value
            .get("message")
            .and_then(serde_json::Value::as_str)
            .unwrap_or("backend reported failure");
        return Err(ApiError::Rejected(reason.to_owned()));
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Trait
// ---------------------------------------------------------------------------

/// Message endpoints consumed by the inbox.
///
/// Implementations must be `Send + Sync` so the controller can share them
/// across tasks.
#[async_trait]
pub trait MessageApi: Send + Sync {
    /// Fetch one page of messages matching `filters`.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError`] on transport, status, parse or semantic failure.
    async fn list_messages(&self, filters: &FilterState) -> Result<MessagePage, ApiError>;

    /// Set one message's status (partial update).
    ///
    /// # Errors
    ///
    /// Returns [`ApiError`] on transport, status or semantic failure.
    async fn update_status(&self, id: &str, status: MessageStatus) -> Result<(), ApiError>;
}
