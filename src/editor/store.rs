//! Persistence boundary for the content editor.
//!
//! The editor only talks to a [`ContentStore`]. Two implementations ship:
//! - [`InMemoryContentStore`]: process-local, optionally seeded with samples
//! - [`HttpContentStore`]: `/api/events` and `/api/sermons`

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use tokio::sync::Mutex;
use tracing::debug;
use uuid::Uuid;

use crate::api::http::ApiClient;
use crate::api::{check_acknowledged, ApiError, Envelope};

use super::draft::{Event, EventDraft, FormKind, Sermon, SermonDraft};

/// Errors returned by content stores.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// The backing API failed.
    #[error(transparent)]
    Api(#[from] ApiError),
    /// No record with that identifier.
    #[error("no {kind} with id {id:?}")]
    NotFound {
        /// Record type.
        kind: FormKind,
        /// Requested identifier.
        id: String,
    },
}

impl StoreError {
    /// Whether repeating the call could plausibly succeed.
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Api(e) => e.is_retryable(),
            Self::NotFound { .. } => false,
        }
    }
}

/// Where events and sermons are kept.
#[async_trait]
pub trait ContentStore: Send + Sync {
    /// All events.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] if the backend fails.
    async fn list_events(&self) -> Result<Vec<Event>, StoreError>;

    /// All sermons.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] if the backend fails.
    async fn list_sermons(&self) -> Result<Vec<Sermon>, StoreError>;

    /// Persist a validated event draft and return the stored record.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] if the backend fails.
    async fn create_event(&self, draft: &EventDraft) -> Result<Event, StoreError>;

    /// Persist a validated sermon draft and return the stored record.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] if the backend fails.
    async fn create_sermon(&self, draft: &SermonDraft) -> Result<Sermon, StoreError>;

    /// Remove an event.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] if the backend fails or reports no such event.
    async fn delete_event(&self, id: &str) -> Result<(), StoreError>;
}

// ---------------------------------------------------------------------------
// In-memory
// ---------------------------------------------------------------------------

#[derive(Debug, Default)]
struct Records {
    events: Vec<Event>,
    sermons: Vec<Sermon>,
}

/// Process-local store. Identifiers are random UUIDs.
///
/// Deleting an unknown event is a no-op.
#[derive(Debug, Default)]
pub struct InMemoryContentStore {
    records: Mutex<Records>,
}

impl InMemoryContentStore {
    /// An empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// A store holding two sample events and one sample sermon.
    pub fn with_demo_data() -> Self {
        let events = vec![
            Event {
                id: "1".to_owned(),
                title: "Sunday Service".to_owned(),
                date: "2023-10-15".to_owned(),
                description: "Join us for worship".to_owned(),
                images: Vec::new(),
            },
            Event {
                id: "2".to_owned(),
                title: "Bible Study".to_owned(),
                date: "2023-10-18".to_owned(),
                description: "Weekly study group".to_owned(),
                images: Vec::new(),
            },
        ];
        let sermons = vec![Sermon {
            id: "1".to_owned(),
            title: "The Power of Faith".to_owned(),
            date: "2023-10-08".to_owned(),
            audio_url: String::new(),
            video_url: String::new(),
        }];
        Self {
            records: Mutex::new(Records { events, sermons }),
        }
    }
}

fn synthetic_id() -> String {
    Uuid::new_v4().to_string()
}

#[async_trait]
impl ContentStore for InMemoryContentStore {
    async fn list_events(&self) -> Result<Vec<Event>, StoreError> {
        Ok(self.records.lock().await.events.clone())
    }

    async fn list_sermons(&self) -> Result<Vec<Sermon>, StoreError> {
        Ok(self.records.lock().await.sermons.clone())
    }

    async fn create_event(&self, draft: &EventDraft) -> Result<Event, StoreError> {
        let event = Event::from_draft(synthetic_id(), draft);
        self.records.lock().await.events.push(event.clone());
        Ok(event)
    }

    async fn create_sermon(&self, draft: &SermonDraft) -> Result<Sermon, StoreError> {
        let sermon = Sermon::from_draft(synthetic_id(), draft);
        self.records.lock().await.sermons.push(sermon.clone());
        Ok(sermon)
    }

    async fn delete_event(&self, id: &str) -> Result<(), StoreError> {
        self.records.lock().await.events.retain(|e| e.id != id);
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// HTTP
// ---------------------------------------------------------------------------

/// Either a bare payload or one wrapped in the `{success, data}` envelope.
#[derive(Deserialize)]
#[serde(untagged)]
enum Payload<T> {
    Bare(T),
    Wrapped(Envelope<T>),
}

fn decode<T: DeserializeOwned>(body: &str) -> Result<T, ApiError> {
    let payload: Payload<T> = serde_json::from_str(body)
        .map_err(|e| ApiError::Parse(format!("unexpected content response: {e}")))?;
    match payload {
        Payload::Bare(value) => Ok(value),
        Payload::Wrapped(envelope) if !envelope.success => Err(ApiError::Rejected(
            envelope
                .message
                .unwrap_or_else(|| "backend reported failure".to_owned()),
        )),
        Payload::Wrapped(envelope) => envelope
            .data
            .ok_or_else(|| ApiError::Parse("response envelope has no data".to_owned())),
    }
}

/// Events and sermons on the configured API.
#[derive(Debug, Clone)]
pub struct HttpContentStore {
    client: ApiClient,
}

impl HttpContentStore {
    /// Wrap a configured [`ApiClient`].
    pub fn new(client: ApiClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl ContentStore for HttpContentStore {
    async fn list_events(&self) -> Result<Vec<Event>, StoreError> {
        let url = self.client.endpoint(&["api", "events"])?;
        let body = self.client.get_text(url).await?;
        Ok(decode(&body)?)
    }

    async fn list_sermons(&self) -> Result<Vec<Sermon>, StoreError> {
        let url = self.client.endpoint(&["api", "sermons"])?;
        let body = self.client.get_text(url).await?;
        Ok(decode(&body)?)
    }

    async fn create_event(&self, draft: &EventDraft) -> Result<Event, StoreError> {
        let url = self.client.endpoint(&["api", "events"])?;
        let body = self
            .client
            .send_json(reqwest::Method::POST, url, &draft.trimmed())
            .await?;
        Ok(decode(&body)?)
    }

    async fn create_sermon(&self, draft: &SermonDraft) -> Result<Sermon, StoreError> {
        let url = self.client.endpoint(&["api", "sermons"])?;
        let body = self
            .client
            .send_json(reqwest::Method::POST, url, &draft.trimmed())
            .await?;
        Ok(decode(&body)?)
    }

    async fn delete_event(&self, id: &str) -> Result<(), StoreError> {
        let url = self.client.endpoint(&["api", "events", id])?;
        match self.client.delete(url).await {
            Ok(body) => Ok(check_acknowledged(&body)?),
            Err(ApiError::HttpStatus { status: 404, .. }) => {
                debug!(id, "event already gone");
                Err(StoreError::NotFound {
                    kind: FormKind::Event,
                    id: id.to_owned(),
                })
            }
            Err(e) => Err(e.into()),
        }
    }
}
