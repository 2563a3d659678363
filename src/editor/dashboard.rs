//! The content editor screen: two drafts, two lists, one banner.

use std::sync::Arc;

use tracing::{info, warn};

use crate::feedback::{Feedback, Operation};

use super::draft::{Event, EventDraft, Sermon, SermonDraft, ValidationError};
use super::store::{ContentStore, StoreError};
use super::upload::{MediaKind, MediaUploader, UploadWidget, WidgetCallback, WidgetEventKind};

/// Errors from editor actions.
#[derive(Debug, thiserror::Error)]
pub enum EditorError {
    /// The draft failed validation; nothing was stored.
    #[error(transparent)]
    Validation(#[from] ValidationError),
    /// The store failed.
    #[error(transparent)]
    Store(#[from] StoreError),
}

/// State of the events/sermons management screen.
pub struct ContentEditor {
    store: Arc<dyn ContentStore>,
    event_draft: EventDraft,
    sermon_draft: SermonDraft,
    events: Vec<Event>,
    sermons: Vec<Sermon>,
    uploading: bool,
    feedback: Option<Feedback>,
}

impl ContentEditor {
    /// An empty editor over `store`. Call [`load`](Self::load) to populate.
    pub fn new(store: Arc<dyn ContentStore>) -> Self {
        Self {
            store,
            event_draft: EventDraft::default(),
            sermon_draft: SermonDraft::default(),
            events: Vec::new(),
            sermons: Vec::new(),
            uploading: false,
            feedback: None,
        }
    }

    /// Fetch existing events and sermons.
    ///
    /// # Errors
    ///
    /// Returns the [`StoreError`]; lists are left as they were.
    pub async fn load(&mut self) -> Result<(), StoreError> {
        let loaded = async {
            let events = self.store.list_events().await?;
            let sermons = self.store.list_sermons().await?;
            Ok::<_, StoreError>((events, sermons))
        }
        .await;
        match loaded {
            Ok((events, sermons)) => {
                info!(events = events.len(), sermons = sermons.len(), "content loaded");
                self.events = events;
                self.sermons = sermons;
                Ok(())
            }
            Err(e) => {
                warn!(error = %e, "failed to load content");
                self.feedback = Some(store_failure(Operation::LoadContent, &e));
                Err(e)
            }
        }
    }

    /// Event form state.
    pub fn event_draft(&self) -> &EventDraft {
        &self.event_draft
    }

    /// Event form state, for input handlers.
    pub fn event_draft_mut(&mut self) -> &mut EventDraft {
        &mut self.event_draft
    }

    /// Sermon form state.
    pub fn sermon_draft(&self) -> &SermonDraft {
        &self.sermon_draft
    }

    /// Sermon form state, for input handlers.
    pub fn sermon_draft_mut(&mut self) -> &mut SermonDraft {
        &mut self.sermon_draft
    }

    /// Listed events.
    pub fn events(&self) -> &[Event] {
        &self.events
    }

    /// Listed sermons.
    pub fn sermons(&self) -> &[Sermon] {
        &self.sermons
    }

    /// The widget is showing.
    pub fn is_uploading(&self) -> bool {
        self.uploading
    }

    /// Current banner.
    pub fn feedback(&self) -> Option<&Feedback> {
        self.feedback.as_ref()
    }

    /// Close the banner.
    pub fn dismiss_feedback(&mut self) {
        self.feedback = None;
    }

    /// Submit the event form.
    ///
    /// An invalid draft is rejected before the store is called; the draft
    /// is kept so the user can fix it.
    ///
    /// # Errors
    ///
    /// Returns [`EditorError::Validation`] or [`EditorError::Store`].
    pub async fn submit_event(&mut self) -> Result<Event, EditorError> {
        if let Err(e) = self.event_draft.validate() {
            self.feedback = Some(Feedback::failure(Operation::CreateEvent, e.to_string(), false));
            return Err(e.into());
        }
        match self.store.create_event(&self.event_draft).await {
            Ok(event) => {
                info!(id = %event.id, title = %event.title, "event added");
                self.events.push(event.clone());
                self.event_draft = EventDraft::default();
                self.feedback = Some(Feedback::success(
                    Operation::CreateEvent,
                    "Event added successfully!",
                ));
                Ok(event)
            }
            Err(e) => {
                warn!(error = %e, "failed to add event");
                self.feedback = Some(store_failure(Operation::CreateEvent, &e));
                Err(e.into())
            }
        }
    }

    /// Submit the sermon form.
    ///
    /// # Errors
    ///
    /// Returns [`EditorError::Validation`] or [`EditorError::Store`].
    pub async fn submit_sermon(&mut self) -> Result<Sermon, EditorError> {
        if let Err(e) = self.sermon_draft.validate() {
            self.feedback = Some(Feedback::failure(Operation::CreateSermon, e.to_string(), false));
            return Err(e.into());
        }
        match self.store.create_sermon(&self.sermon_draft).await {
            Ok(sermon) => {
                info!(id = %sermon.id, title = %sermon.title, "sermon added");
                self.sermons.push(sermon.clone());
                self.sermon_draft = SermonDraft::default();
                self.feedback = Some(Feedback::success(
                    Operation::CreateSermon,
                    "Sermon added successfully!",
                ));
                Ok(sermon)
            }
            Err(e) => {
                warn!(error = %e, "failed to add sermon");
                self.feedback = Some(store_failure(Operation::CreateSermon, &e));
                Err(e.into())
            }
        }
    }

    /// Delete an event from the store, then from the list.
    ///
    /// # Errors
    ///
    /// Returns [`EditorError::Store`]; the list is left unchanged.
    pub async fn delete_event(&mut self, id: &str) -> Result<(), EditorError> {
        match self.store.delete_event(id).await {
            Ok(()) => {
                self.events.retain(|e| e.id != id);
                info!(id, "event deleted");
                self.feedback = Some(Feedback::success(
                    Operation::DeleteEvent,
                    "Event deleted successfully!",
                ));
                Ok(())
            }
            Err(e) => {
                warn!(id, error = %e, "failed to delete event");
                self.feedback = Some(store_failure(Operation::DeleteEvent, &e));
                Err(e.into())
            }
        }
    }

    /// Drop one image from the event draft.
    pub fn remove_event_image(&mut self, index: usize) -> Option<String> {
        self.event_draft.remove_image(index)
    }

    /// Apply one widget callback. Returns where a completed upload went.
    pub fn handle_upload(&mut self, callback: WidgetCallback) -> Option<MediaKind> {
        let mut routed = None;
        if let Some(upload) = callback.completed_upload() {
            self.uploading = false;
            let url = upload.secure_url.clone();
            match MediaKind::from_resource_type(&upload.resource_type) {
                Some(MediaKind::Image) => self.event_draft.images.push(url),
                Some(MediaKind::Video) => self.sermon_draft.video_url = url,
                Some(MediaKind::Audio) => self.sermon_draft.audio_url = url,
                None => {
                    warn!(resource_type = %upload.resource_type, "ignoring upload of unknown type");
                }
            }
            routed = MediaKind::from_resource_type(&upload.resource_type);
            if let Some(kind) = routed {
                info!(kind = kind.noun(), "upload routed");
                self.feedback = Some(Feedback::success(
                    Operation::Upload,
                    format!("{} uploaded successfully!", kind.noun()),
                ));
            }
        } else if let Some(error) = &callback.error {
            warn!(%error, "upload failed");
            self.uploading = false;
            self.feedback = Some(Feedback::failure(
                Operation::Upload,
                "Upload failed. Please try again.",
                true,
            ));
        }

        match callback.kind() {
            Some(WidgetEventKind::Close) => self.uploading = false,
            Some(WidgetEventKind::Show) => self.uploading = true,
            _ => {}
        }
        routed
    }

    /// Apply every callback the uploader has received. Returns how many
    /// uploads were routed into a draft.
    pub fn apply_uploads<W: UploadWidget>(&mut self, uploader: &mut MediaUploader<W>) -> usize {
        uploader
            .drain()
            .into_iter()
            .filter_map(|callback| self.handle_upload(callback))
            .count()
    }
}

fn store_failure(operation: Operation, error: &StoreError) -> Feedback {
    Feedback::failure(
        operation,
        format!("Error {}: {error}. Please try again.", operation.describe()),
        error.is_retryable(),
    )
}
