//! `HttpContentStore` against a one-shot local server.

use std::time::Duration;

use url::Url;

use parish_admin::api::http::ApiClient;
use parish_admin::editor::{ContentStore, EventDraft, HttpContentStore, SermonDraft, StoreError};

use crate::server::{received, serve_once};

fn store_for(base_url: &str) -> HttpContentStore {
    let base = match Url::parse(base_url) {
        Ok(base) => base,
        Err(err) => panic!("base url should parse: {err}"),
    };
    match ApiClient::new(base, Duration::from_secs(5)) {
        Ok(client) => HttpContentStore::new(client),
        Err(err) => panic!("client should build: {err}"),
    }
}

#[tokio::test]
async fn list_events_reads_bare_array() {
    let served = serve_once(
        "200 OK",
        "application/json",
        r#"[{"_id":"e1","title":"Sunday Service","date":"2023-10-15","description":"Join us for worship"}]"#,
    )
    .await;
    let store = store_for(&served.base_url);

    let events = match store.list_events().await {
        Ok(events) => events,
        Err(err) => panic!("listing should succeed: {err}"),
    };
    assert_eq!(events.len(), 1);
    assert_eq!(events[0].title, "Sunday Service");
    assert!(events[0].images.is_empty());

    let request = received(served).await;
    assert!(request.starts_with("GET /api/events HTTP/1.1"));
}

#[tokio::test]
async fn create_sermon_posts_draft_json() {
    let served = serve_once(
        "201 Created",
        "application/json",
        r#"{"_id":"s9","title":"Loaves","date":"2024-05-05","audioURL":"","videoURL":"https://cdn.example/v.mp4"}"#,
    )
    .await;
    let store = store_for(&served.base_url);

    let draft = SermonDraft {
        title: "Loaves".to_owned(),
        date: "2024-05-05".to_owned(),
        audio_url: String::new(),
        video_url: "https://cdn.example/v.mp4".to_owned(),
    };
    let sermon = match store.create_sermon(&draft).await {
        Ok(sermon) => sermon,
        Err(err) => panic!("create should succeed: {err}"),
    };
    assert_eq!(sermon.id, "s9");
    assert_eq!(sermon.video_url, "https://cdn.example/v.mp4");

    let request = received(served).await;
    assert!(request.starts_with("POST /api/sermons HTTP/1.1"));
    assert!(request.contains(r#""videoURL":"https://cdn.example/v.mp4""#));
}

#[tokio::test]
async fn create_event_accepts_wrapped_record() {
    let served = serve_once(
        "200 OK",
        "application/json",
        r#"{"success":true,"data":{"_id":"e7","title":"Fete","date":"2024-07-13","description":"Stalls","images":["https://cdn.example/f.jpg"]}}"#,
    )
    .await;
    let store = store_for(&served.base_url);

    let draft = EventDraft {
        title: "Fete".to_owned(),
        date: "2024-07-13".to_owned(),
        description: "Stalls".to_owned(),
        images: vec!["https://cdn.example/f.jpg".to_owned()],
    };
    let event = match store.create_event(&draft).await {
        Ok(event) => event,
        Err(err) => panic!("create should succeed: {err}"),
    };
    assert_eq!(event.id, "e7");
    assert_eq!(event.images.len(), 1);
}

#[tokio::test]
async fn delete_missing_event_is_not_found() {
    let served = serve_once("404 Not Found", "text/plain", "Not Found").await;
    let store = store_for(&served.base_url);

    let result = store.delete_event("gone").await;
    assert!(matches!(result, Err(StoreError::NotFound { ref id, .. }) if id == "gone"));

    let request = received(served).await;
    assert!(request.starts_with("DELETE /api/events/gone HTTP/1.1"));
}

#[tokio::test]
async fn create_event_posts_trimmed_fields() {
    let served = serve_once(
        "201 Created",
        "application/json",
        r#"{"_id":"e8","title":"Fete","date":"2024-07-13","description":"Stalls"}"#,
    )
    .await;
    let store = store_for(&served.base_url);

    let draft = EventDraft {
        title: "  Fete ".to_owned(),
        date: " 2024-07-13".to_owned(),
        description: "Stalls\n".to_owned(),
        images: Vec::new(),
    };
    if let Err(err) = store.create_event(&draft).await {
        panic!("create should succeed: {err}");
    }

    let request = received(served).await;
    assert!(request.contains(r#""title":"Fete""#));
    assert!(request.contains(r#""date":"2024-07-13""#));
    assert!(request.contains(r#""description":"Stalls""#));
}
