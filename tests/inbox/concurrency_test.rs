//! Overlapping fetches, search debounce, and duplicate suppression.

use std::sync::Arc;
use std::time::Duration;

use parish_admin::inbox::{
    FetchOutcome, InboxSettings, MessageListController, MessageStatus, StatusFilter,
};

use crate::support::{messages, settings, FakeMessageApi};

const NEW: StatusFilter = StatusFilter::Only(MessageStatus::New);
const READ: StatusFilter = StatusFilter::Only(MessageStatus::Read);

#[tokio::test(start_paused = true)]
async fn late_response_for_superseded_filter_is_discarded() {
    let api = Arc::new(FakeMessageApi::with_messages(messages(25)));
    let controller = MessageListController::new(api.clone(), settings());
    assert!(controller.mount().await.is_ok());

    // A is issued first but answers last.
    api.set_status_delay(NEW, Duration::from_millis(200));
    api.set_status_delay(READ, Duration::from_millis(10));

    let (a, b) = tokio::join!(controller.set_status_filter(NEW), async {
        tokio::time::sleep(Duration::from_millis(1)).await;
        controller.set_status_filter(READ).await
    });

    assert!(matches!(a, Ok(FetchOutcome::Stale)));
    assert!(matches!(b, Ok(FetchOutcome::Applied)));

    let state = controller.snapshot().await;
    assert_eq!(state.filters.status, READ);
    assert!(!state.messages.is_empty());
    assert!(state
        .messages
        .iter()
        .all(|m| m.status == MessageStatus::Read));
    assert!(!state.loading);
}

#[tokio::test(start_paused = true)]
async fn stale_failure_does_not_raise_feedback() {
    let api = Arc::new(FakeMessageApi::with_messages(messages(25)));
    let controller = MessageListController::new(api.clone(), settings());
    assert!(controller.mount().await.is_ok());

    api.set_status_delay(NEW, Duration::from_millis(200));
    api.set_status_delay(READ, Duration::from_millis(300));
    // The first response to resolve (NEW, at 200 ms) is the stale one and fails.
    api.fail_next_list(parish_admin::api::ApiError::HttpStatus {
        status: 500,
        body: "boom".to_owned(),
    });

    let (a, b) = tokio::join!(controller.set_status_filter(NEW), async {
        tokio::time::sleep(Duration::from_millis(1)).await;
        controller.set_status_filter(READ).await
    });

    assert!(matches!(a, Ok(FetchOutcome::Stale)));
    assert!(matches!(b, Ok(FetchOutcome::Applied)));
    assert!(controller.snapshot().await.feedback.is_none());
}

#[tokio::test(start_paused = true)]
async fn rapid_search_edits_send_one_request() {
    let api = Arc::new(FakeMessageApi::with_messages(messages(25)));
    let controller = MessageListController::new(
        api.clone(),
        InboxSettings {
            page_size: 10,
            search_debounce: Duration::from_millis(300),
        },
    );
    assert!(controller.mount().await.is_ok());

    let (first, second, third) = tokio::join!(
        controller.set_search("S"),
        async {
            tokio::time::sleep(Duration::from_millis(100)).await;
            controller.set_search("Se").await
        },
        async {
            tokio::time::sleep(Duration::from_millis(200)).await;
            controller.set_search("Sender 1").await
        },
    );

    assert!(matches!(first, Ok(FetchOutcome::Debounced)));
    assert!(matches!(second, Ok(FetchOutcome::Debounced)));
    assert!(matches!(third, Ok(FetchOutcome::Applied)));

    let sent = api.requests();
    assert_eq!(sent.len(), 2);
    assert_eq!(sent[1].search, "Sender 1");
    assert_eq!(sent[1].page, 1);
}

#[tokio::test(start_paused = true)]
async fn search_edit_resets_page_before_debounce_elapses() {
    let api = Arc::new(FakeMessageApi::with_messages(messages(25)));
    let controller = MessageListController::new(
        api.clone(),
        InboxSettings {
            page_size: 10,
            search_debounce: Duration::from_millis(300),
        },
    );
    assert!(controller.mount().await.is_ok());
    assert!(controller.set_page(3).await.is_ok());

    let (outcome, page_during_debounce) = tokio::join!(controller.set_search("Body"), async {
        tokio::time::sleep(Duration::from_millis(50)).await;
        controller.snapshot().await.filters.page
    });
    assert!(matches!(outcome, Ok(FetchOutcome::Applied)));
    assert_eq!(page_during_debounce, 1);
}

#[tokio::test(start_paused = true)]
async fn debounced_search_joins_identical_fetch_in_flight() {
    let api = Arc::new(FakeMessageApi::with_messages(messages(25)));
    let controller = MessageListController::new(
        api.clone(),
        InboxSettings {
            page_size: 10,
            search_debounce: Duration::from_millis(100),
        },
    );
    assert!(controller.mount().await.is_ok());
    api.set_delay(Duration::from_millis(200));

    // The status change fetches immediately with the new search text; when
    // the search debounce expires that same filter is already in flight.
    let (search, status) = tokio::join!(controller.set_search("Sender 1"), async {
        tokio::time::sleep(Duration::from_millis(10)).await;
        controller.set_status_filter(READ).await
    });

    assert!(matches!(search, Ok(FetchOutcome::Deduplicated)));
    assert!(matches!(status, Ok(FetchOutcome::Applied)));
    assert_eq!(api.requests().len(), 2);
}

#[tokio::test(start_paused = true)]
async fn paging_during_status_change_stays_within_new_filter() {
    let api = Arc::new(FakeMessageApi::with_messages(messages(25)));
    let controller = MessageListController::new(api.clone(), settings());
    assert!(controller.mount().await.is_ok());
    assert_eq!(controller.snapshot().await.pagination.pages, 3);

    // `new` holds 7 of the 25 rows: a single page.
    api.set_status_delay(NEW, Duration::from_millis(200));
    let (status, next) = tokio::join!(controller.set_status_filter(NEW), async {
        tokio::time::sleep(Duration::from_millis(1)).await;
        controller.next_page().await
    });

    assert!(matches!(status, Ok(FetchOutcome::Applied)));
    assert!(matches!(next, Ok(FetchOutcome::Unchanged)));
    let sent = api.requests();
    assert_eq!(sent.len(), 2);
    assert!(sent.iter().all(|f| f.page == 1));

    let state = controller.snapshot().await;
    assert_eq!(state.filters.page, 1);
    assert_eq!(state.pagination.pages, 1);
    assert!(matches!(controller.next_page().await, Ok(FetchOutcome::Unchanged)));
    assert_eq!(api.requests().len(), 2);
}

#[tokio::test(start_paused = true)]
async fn paging_during_search_debounce_does_not_reuse_old_page_count() {
    let api = Arc::new(FakeMessageApi::with_messages(messages(25)));
    let controller = MessageListController::new(
        api.clone(),
        InboxSettings {
            page_size: 10,
            search_debounce: Duration::from_millis(300),
        },
    );
    assert!(controller.mount().await.is_ok());

    let (search, page) = tokio::join!(controller.set_search("Sender 1"), async {
        tokio::time::sleep(Duration::from_millis(50)).await;
        controller.set_page(3).await
    });

    assert!(matches!(search, Ok(FetchOutcome::Applied)));
    assert!(matches!(page, Ok(FetchOutcome::Unchanged)));
    let sent = api.requests();
    assert_eq!(sent.len(), 2);
    assert_eq!(sent[1].search, "Sender 1");
    assert_eq!(sent[1].page, 1);
}
