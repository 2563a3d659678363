//! Message list controller.
//!
//! Owns the inbox filter state and the displayed page. Every filter change
//! issues a fetch tagged with a sequence number; only the response to the
//! most recently issued fetch is ever applied, so a slow reply for an old
//! filter cannot overwrite a newer result.
//!
//! State lives behind a `tokio::sync::Mutex` that is never held across a
//! network call, so several operations may be in flight at once.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::Mutex;
use tracing::{debug, info, warn};

use crate::api::{ApiError, MessageApi};
use crate::config::InboxConfig;
use crate::feedback::{Feedback, Operation};

use super::filter::{FilterState, Pagination, PaginationBar};
use super::message::{Message, MessageStatus, StatusFilter};
use super::view::{DetailView, MessageCard};

/// Controller tuning.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InboxSettings {
    /// Rows per page.
    pub page_size: u32,
    /// Trailing debounce for search edits. Zero disables it.
    pub search_debounce: Duration,
}

impl Default for InboxSettings {
    fn default() -> Self {
        (&InboxConfig::default()).into()
    }
}

impl From<&InboxConfig> for InboxSettings {
    fn from(config: &InboxConfig) -> Self {
        Self {
            page_size: config.page_size,
            search_debounce: config.search_debounce(),
        }
    }
}

/// What a state-changing call did about the network.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchOutcome {
    /// A response was received and is now displayed.
    Applied,
    /// A response arrived after a newer fetch was issued and was dropped.
    Stale,
    /// An identical fetch was already in flight; nothing was sent.
    Deduplicated,
    /// The requested state is already displayed; nothing was sent.
    Unchanged,
    /// A later search edit superseded this one inside the debounce window.
    Debounced,
}

/// Everything the inbox screen renders.
#[derive(Debug, Clone, PartialEq)]
pub struct InboxState {
    /// Current filter, including edits whose fetch is still pending.
    pub filters: FilterState,
    /// Messages from the last applied response.
    pub messages: Vec<Message>,
    /// Pagination from the last applied response.
    pub pagination: Pagination,
    /// A fetch for the current state is outstanding.
    pub loading: bool,
    /// Banner for the last failure, if not yet cleared.
    pub feedback: Option<Feedback>,
    /// Detail modal.
    pub detail: DetailView,
}

impl InboxState {
    fn new(page_size: u32) -> Self {
        Self {
            filters: FilterState::new(page_size),
            messages: Vec::new(),
            pagination: Pagination::default(),
            loading: true,
            feedback: None,
            detail: DetailView::default(),
        }
    }

    /// List cards for the displayed messages.
    pub fn cards(&self) -> Vec<MessageCard> {
        self.messages.iter().map(MessageCard::from).collect()
    }

    /// Pager controls for the current page.
    pub fn pagination_bar(&self) -> PaginationBar {
        self.pagination.bar(self.filters.page)
    }
}

#[derive(Debug, Clone)]
enum RetryAction {
    Fetch,
    UpdateStatus { id: String, status: MessageStatus },
}

#[derive(Debug)]
struct Inner {
    view: InboxState,
    /// Sequence number of the most recently issued fetch.
    issued: u64,
    in_flight: Option<FilterState>,
    /// Filter whose response is on screen.
    displayed: Option<FilterState>,
    /// Page count for the current status and search. `None` until a
    /// response for them lands.
    known_pages: Option<Pagination>,
    search_generation: u64,
    retry: Option<RetryAction>,
}

/// Drives the inbox: filter edits in, fetched pages out.
pub struct MessageListController {
    api: Arc<dyn MessageApi>,
    settings: InboxSettings,
    inner: Mutex<Inner>,
}

impl MessageListController {
    /// Create a controller over `api`. Nothing is fetched until [`mount`].
    ///
    /// [`mount`]: Self::mount
    pub fn new(api: Arc<dyn MessageApi>, settings: InboxSettings) -> Self {
        Self::with_filters(api, settings, FilterState::new(settings.page_size))
    }

    /// Create a controller that starts on `filters` (a deep link).
    ///
    /// The linked page is requested as-is because only the backend knows
    /// the page count. If the first response reports fewer pages, the page
    /// is clamped and refetched.
    pub fn with_filters(
        api: Arc<dyn MessageApi>,
        settings: InboxSettings,
        filters: FilterState,
    ) -> Self {
        let mut view = InboxState::new(settings.page_size);
        view.filters = FilterState {
            page: filters.page.max(1),
            limit: settings.page_size.max(1),
            ..filters
        };
        Self {
            api,
            settings,
            inner: Mutex::new(Inner {
                view,
                issued: 0,
                in_flight: None,
                displayed: None,
                known_pages: None,
                search_generation: 0,
                retry: None,
            }),
        }
    }

    /// A copy of the displayed state.
    pub async fn snapshot(&self) -> InboxState {
        self.inner.lock().await.view.clone()
    }

    /// Initial load.
    ///
    /// # Errors
    ///
    /// Returns the [`ApiError`] if the fetch fails; the failure is also
    /// recorded as feedback.
    pub async fn mount(&self) -> Result<FetchOutcome, ApiError> {
        self.fetch(true).await
    }

    /// Re-fetch the current filter even if it is already displayed.
    ///
    /// # Errors
    ///
    /// Returns the [`ApiError`] if the fetch fails.
    pub async fn refresh(&self) -> Result<FetchOutcome, ApiError> {
        self.fetch(true).await
    }

    /// Change the status dropdown. Resets to page 1.
    ///
    /// # Errors
    ///
    /// Returns the [`ApiError`] if the resulting fetch fails.
    pub async fn set_status_filter(&self, status: StatusFilter) -> Result<FetchOutcome, ApiError> {
        {
            let mut inner = self.inner.lock().await;
            if inner.view.filters.status == status {
                return Ok(FetchOutcome::Unchanged);
            }
            let next = inner.view.filters.clone().with_status(status);
            inner.view.filters = next;
            inner.known_pages = None;
        }
        self.fetch(false).await
    }

    /// Change the search text. Resets to page 1 immediately; the fetch
    /// waits out the debounce and is skipped if another edit arrives first.
    ///
    /// # Errors
    ///
    /// Returns the [`ApiError`] if the resulting fetch fails.
    pub async fn set_search(&self, text: impl Into<String>) -> Result<FetchOutcome, ApiError> {
        let text = text.into();
        let generation = {
            let mut inner = self.inner.lock().await;
            if inner.view.filters.search == text {
                return Ok(FetchOutcome::Unchanged);
            }
            let next = inner.view.filters.clone().with_search(text);
            inner.view.filters = next;
            inner.known_pages = None;
            inner.search_generation = inner.search_generation.wrapping_add(1);
            inner.search_generation
        };

        if !self.settings.search_debounce.is_zero() {
            tokio::time::sleep(self.settings.search_debounce).await;
        }

        if self.inner.lock().await.search_generation != generation {
            debug!(generation, "search edit superseded within debounce window");
            return Ok(FetchOutcome::Debounced);
        }
        self.fetch(false).await
    }

    /// Go to `page`, clamped to `[1, pages]`.
    ///
    /// Until the current status and search have been answered only page 1
    /// is known to exist.
    ///
    /// # Errors
    ///
    /// Returns the [`ApiError`] if the resulting fetch fails.
    pub async fn set_page(&self, page: u32) -> Result<FetchOutcome, ApiError> {
        {
            let mut inner = self.inner.lock().await;
            let clamped = inner.known_pages.unwrap_or_default().clamp(page);
            if clamped != page {
                debug!(requested = page, clamped, "page request out of range");
            }
            if clamped == inner.view.filters.page {
                return Ok(FetchOutcome::Unchanged);
            }
            inner.view.filters.page = clamped;
        }
        self.fetch(false).await
    }

    /// "Next" button.
    ///
    /// # Errors
    ///
    /// Returns the [`ApiError`] if the resulting fetch fails.
    pub async fn next_page(&self) -> Result<FetchOutcome, ApiError> {
        let page = self.inner.lock().await.view.filters.page;
        self.set_page(page.saturating_add(1)).await
    }

    /// "Previous" button.
    ///
    /// # Errors
    ///
    /// Returns the [`ApiError`] if the resulting fetch fails.
    pub async fn previous_page(&self) -> Result<FetchOutcome, ApiError> {
        let page = self.inner.lock().await.view.filters.page;
        self.set_page(page.saturating_sub(1)).await
    }

    /// Change one message's status, then reload the list.
    ///
    /// The row keeps its old status until the reload lands.
    ///
    /// # Errors
    ///
    /// Returns the [`ApiError`] from the update or the reload.
    pub async fn update_status(
        &self,
        id: &str,
        status: MessageStatus,
    ) -> Result<FetchOutcome, ApiError> {
        info!(id, %status, "updating message status");
        match self.api.update_status(id, status).await {
            Ok(()) => {
                {
                    let mut inner = self.inner.lock().await;
                    if matches!(inner.retry, Some(RetryAction::UpdateStatus { .. })) {
                        inner.retry = None;
                    }
                    clear_failure(&mut inner.view, Operation::UpdateStatus);
                }
                self.fetch(true).await
            }
            Err(err) => {
                warn!(id, %status, error = %err, "failed to update message status");
                let mut inner = self.inner.lock().await;
                inner.view.feedback = Some(Feedback::from_api_error(Operation::UpdateStatus, &err));
                inner.retry = Some(RetryAction::UpdateStatus {
                    id: id.to_owned(),
                    status,
                });
                Err(err)
            }
        }
    }

    /// Repeat the last failed operation, if any.
    ///
    /// # Errors
    ///
    /// Returns the [`ApiError`] if the repeat fails again.
    pub async fn retry(&self) -> Result<FetchOutcome, ApiError> {
        let action = self.inner.lock().await.retry.clone();
        match action {
            None => Ok(FetchOutcome::Unchanged),
            Some(RetryAction::Fetch) => self.fetch(true).await,
            Some(RetryAction::UpdateStatus { id, status }) => self.update_status(&id, status).await,
        }
    }

    /// Open the detail modal for a displayed message. Returns `false` if no
    /// row has that id.
    pub async fn open_detail(&self, id: &str) -> bool {
        let mut inner = self.inner.lock().await;
        let Some(message) = inner.view.messages.iter().find(|m| m.id == id).cloned() else {
            return false;
        };
        inner.view.detail.open(message);
        true
    }

    /// Close the detail modal.
    pub async fn close_detail(&self) {
        self.inner.lock().await.view.detail.close();
    }

    /// Clear the banner.
    pub async fn dismiss_feedback(&self) {
        self.inner.lock().await.view.feedback = None;
    }

    async fn fetch(&self, force: bool) -> Result<FetchOutcome, ApiError> {
        let mut force = force;
        loop {
            let (seq, filters) = {
                let mut inner = self.inner.lock().await;
                let current = inner.view.filters.clone();
                if !force {
                    if inner.in_flight.as_ref() == Some(&current) {
                        debug!("identical fetch already in flight");
                        return Ok(FetchOutcome::Deduplicated);
                    }
                    if inner.in_flight.is_none() && inner.displayed.as_ref() == Some(&current) {
                        return Ok(FetchOutcome::Unchanged);
                    }
                }
                inner.issued = inner.issued.wrapping_add(1);
                inner.in_flight = Some(current.clone());
                inner.view.loading = true;
                (inner.issued, current)
            };

            debug!(
                seq,
                status = %filters.status,
                search = %filters.search,
                page = filters.page,
                limit = filters.limit,
                "fetching messages"
            );
            let result = self.api.list_messages(&filters).await;

            let mut guard = self.inner.lock().await;
            let inner = &mut *guard;
            if seq != inner.issued {
                debug!(seq, latest = inner.issued, "discarding stale message page");
                return Ok(FetchOutcome::Stale);
            }
            inner.in_flight = None;
            inner.view.loading = false;

            match result {
                Ok(page) => {
                    let clamped = page.pagination.clamp(filters.page);
                    inner.view.messages = page.messages;
                    inner.view.pagination = page.pagination;
                    inner.view.detail.refresh_from(&inner.view.messages);
                    if inner.view.filters.status == filters.status
                        && inner.view.filters.search == filters.search
                    {
                        inner.known_pages = Some(page.pagination);
                    }
                    if matches!(inner.retry, Some(RetryAction::Fetch)) {
                        inner.retry = None;
                    }
                    clear_failure(&mut inner.view, Operation::FetchMessages);

                    if clamped != filters.page && inner.view.filters == filters {
                        info!(
                            page = filters.page,
                            pages = page.pagination.pages,
                            "current page no longer exists, clamping"
                        );
                        inner.view.filters.page = clamped;
                        inner.displayed = None;
                        force = false;
                        continue;
                    }
                    inner.displayed = Some(filters);
                    return Ok(FetchOutcome::Applied);
                }
                Err(err) => {
                    warn!(error = %err, "failed to fetch messages");
                    inner.view.feedback =
                        Some(Feedback::from_api_error(Operation::FetchMessages, &err));
                    inner.retry = Some(RetryAction::Fetch);
                    return Err(err);
                }
            }
        }
    }
}

fn clear_failure(view: &mut InboxState, operation: Operation) {
    if view
        .feedback
        .as_ref()
        .is_some_and(|f| f.is_failure() && f.operation == operation)
    {
        view.feedback = None;
    }
}
