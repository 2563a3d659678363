//! Upload widget lifecycle and callback delivery.

use std::sync::Arc;

use parish_admin::config::UploadConfig;
use parish_admin::editor::{
    ContentEditor, InMemoryContentStore, MediaKind, MediaUploader, ReplayWidget, UploadError,
    WidgetEventKind,
};

fn configured(widget: ReplayWidget) -> MediaUploader<ReplayWidget> {
    let mut uploader = MediaUploader::new(widget);
    if let Err(err) = uploader.configure(&UploadConfig::default()) {
        panic!("replay widget should configure: {err}");
    }
    uploader
}

#[test]
fn open_before_configure_is_refused() {
    let mut uploader = MediaUploader::new(ReplayWidget::new());
    assert!(!uploader.is_ready());
    assert_eq!(uploader.open(MediaKind::Image), Err(UploadError::NotConfigured));
}

#[test]
fn disposed_uploader_refuses_everything() {
    let mut uploader = configured(ReplayWidget::new());
    assert!(uploader.is_ready());
    uploader.dispose();
    uploader.dispose();

    assert!(!uploader.is_ready());
    assert_eq!(uploader.open(MediaKind::Video), Err(UploadError::Disposed));
    assert_eq!(
        uploader.configure(&UploadConfig::default()),
        Err(UploadError::Disposed)
    );
    assert!(uploader.drain().is_empty());
}

#[test]
fn open_reports_show_uploads_then_close() {
    let mut widget = ReplayWidget::new();
    widget.queue(MediaKind::Image, "https://cdn.example/1.jpg");
    widget.queue(MediaKind::Image, "https://cdn.example/2.jpg");
    widget.queue(MediaKind::Audio, "https://cdn.example/s.mp3");
    let mut uploader = configured(widget);

    if let Err(err) = uploader.open(MediaKind::Image) {
        panic!("open should succeed: {err}");
    }
    let kinds: Vec<_> = uploader.drain().iter().filter_map(|c| c.kind()).collect();
    assert_eq!(
        kinds,
        vec![
            WidgetEventKind::Show,
            WidgetEventKind::Success,
            WidgetEventKind::Success,
            WidgetEventKind::Close,
        ]
    );
}

#[test]
fn single_file_kinds_report_one_upload_per_open() {
    let mut widget = ReplayWidget::new();
    widget.queue(MediaKind::Video, "https://cdn.example/a.mp4");
    widget.queue(MediaKind::Video, "https://cdn.example/b.mp4");
    let mut uploader = configured(widget);

    if let Err(err) = uploader.open(MediaKind::Video) {
        panic!("open should succeed: {err}");
    }
    let first: Vec<_> = uploader
        .drain()
        .into_iter()
        .filter_map(|c| c.completed_upload().map(|u| u.secure_url.clone()))
        .collect();
    assert_eq!(first, vec!["https://cdn.example/a.mp4"]);

    if let Err(err) = uploader.open(MediaKind::Video) {
        panic!("second open should succeed: {err}");
    }
    let second: Vec<_> = uploader
        .drain()
        .into_iter()
        .filter_map(|c| c.completed_upload().map(|u| u.secure_url.clone()))
        .collect();
    assert_eq!(second, vec!["https://cdn.example/b.mp4"]);
}

#[tokio::test]
async fn next_callback_waits_for_delivery() {
    let mut widget = ReplayWidget::new();
    widget.queue(MediaKind::Audio, "https://cdn.example/s.mp3");
    let mut uploader = configured(widget);
    if let Err(err) = uploader.open(MediaKind::Audio) {
        panic!("open should succeed: {err}");
    }

    let shown = uploader.next_callback().await;
    assert!(matches!(shown, Some(ref c) if c.kind() == Some(WidgetEventKind::Show)));
    let uploaded = uploader.next_callback().await;
    let info = match uploaded.as_ref().and_then(|c| c.completed_upload()) {
        Some(info) => info.clone(),
        None => panic!("second callback should be the upload"),
    };
    assert_eq!(info.resource_type, "raw");
}

#[tokio::test]
async fn editor_applies_drained_uploads() {
    let mut widget = ReplayWidget::new();
    widget.queue(MediaKind::Image, "https://cdn.example/porch.jpg");
    widget.queue(MediaKind::Video, "https://cdn.example/homily.mp4");
    let mut uploader = configured(widget);
    let mut editor = ContentEditor::new(Arc::new(InMemoryContentStore::new()));

    for kind in [MediaKind::Image, MediaKind::Video] {
        if let Err(err) = uploader.open(kind) {
            panic!("open should succeed: {err}");
        }
    }
    let routed = editor.apply_uploads(&mut uploader);

    assert_eq!(routed, 2);
    assert_eq!(editor.event_draft().images, vec!["https://cdn.example/porch.jpg"]);
    assert_eq!(editor.sermon_draft().video_url, "https://cdn.example/homily.mp4");
    assert!(!editor.is_uploading());
}
