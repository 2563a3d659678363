//! Media upload widget integration.
//!
//! The hosted widget is an external collaborator. The editor never holds a
//! raw widget handle: [`MediaUploader`] owns it and exposes only
//! `configure`, `open` and `dispose`, and forwards the widget's callbacks
//! over a channel the editor drains.

use serde::{Deserialize, Deserializer, Serialize};
use tokio::sync::mpsc;
use tracing::{debug, warn};

use crate::config::UploadConfig;

/// What the widget is asked to upload, and how results are routed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MediaKind {
    /// Event photos.
    Image,
    /// Sermon video.
    Video,
    /// Sermon audio, uploaded as a raw file.
    Audio,
}

impl MediaKind {
    /// Resource type the widget is opened with.
    pub fn resource_type(self) -> &'static str {
        match self {
            Self::Image => "image",
            Self::Video => "video",
            Self::Audio => "raw",
        }
    }

    /// Route a completed upload's `resource_type`. Unknown types are `None`.
    pub fn from_resource_type(resource_type: &str) -> Option<Self> {
        match resource_type {
            "image" => Some(Self::Image),
            "video" => Some(Self::Video),
            "raw" | "auto" => Some(Self::Audio),
            _ => None,
        }
    }

    /// Only images may be picked several at a time.
    pub fn allows_multiple(self) -> bool {
        self == Self::Image
    }

    /// Word used in banners.
    pub fn noun(self) -> &'static str {
        match self {
            Self::Image => "Image",
            Self::Video => "Video",
            Self::Audio => "Audio",
        }
    }
}

/// Widget lifecycle event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum WidgetEventKind {
    /// An upload finished.
    Success,
    /// The widget window closed.
    Close,
    /// The widget window opened.
    Show,
    /// Any event the editor does not act on.
    Other,
}

impl<'de> Deserialize<'de> for WidgetEventKind {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Ok(match raw.as_str() {
            "success" => Self::Success,
            "close" => Self::Close,
            "show" => Self::Show,
            _ => Self::Other,
        })
    }
}

/// Details of a finished upload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UploadInfo {
    /// HTTPS URL of the hosted asset.
    pub secure_url: String,
    /// Resource type the host classified the asset as.
    pub resource_type: String,
}

/// The `result` half of a widget callback.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WidgetResult {
    /// What happened.
    pub event: WidgetEventKind,
    /// Present on `success`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub info: Option<UploadInfo>,
}

/// One `(error, result)` callback from the widget.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WidgetCallback {
    /// Widget-reported error, in whatever shape the widget uses.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<serde_json::Value>,
    /// Lifecycle event.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub result: Option<WidgetResult>,
}

impl WidgetCallback {
    fn event(event: WidgetEventKind, info: Option<UploadInfo>) -> Self {
        Self {
            error: None,
            result: Some(WidgetResult { event, info }),
        }
    }

    /// A completed upload.
    pub fn success(secure_url: impl Into<String>, resource_type: impl Into<String>) -> Self {
        Self::event(
            WidgetEventKind::Success,
            Some(UploadInfo {
                secure_url: secure_url.into(),
                resource_type: resource_type.into(),
            }),
        )
    }

    /// The widget window opened.
    pub fn show() -> Self {
        Self::event(WidgetEventKind::Show, None)
    }

    /// The widget window closed.
    pub fn close() -> Self {
        Self::event(WidgetEventKind::Close, None)
    }

    /// A failed upload.
    pub fn failed(reason: impl Into<String>) -> Self {
        Self {
            error: Some(serde_json::Value::String(reason.into())),
            result: None,
        }
    }

    /// Lifecycle event, if any.
    pub fn kind(&self) -> Option<WidgetEventKind> {
        self.result.as_ref().map(|r| r.event)
    }

    /// Upload details of an error-free `success` callback.
    pub fn completed_upload(&self) -> Option<&UploadInfo> {
        if self.error.is_some() {
            return None;
        }
        let result = self.result.as_ref()?;
        if result.event != WidgetEventKind::Success {
            return None;
        }
        result.info.as_ref()
    }
}

/// Per-open widget options.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OpenOptions {
    /// Resource type to upload as.
    pub resource_type: &'static str,
    /// Allow picking several files.
    pub multiple: bool,
}

impl From<MediaKind> for OpenOptions {
    fn from(kind: MediaKind) -> Self {
        Self {
            resource_type: kind.resource_type(),
            multiple: kind.allows_multiple(),
        }
    }
}

/// Errors from the upload lifecycle.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum UploadError {
    /// `open` before `configure`.
    #[error("upload widget has not been configured")]
    NotConfigured,
    /// Any call after `dispose`.
    #[error("upload widget has been disposed")]
    Disposed,
    /// The widget itself failed.
    #[error("upload widget error: {0}")]
    Widget(String),
}

/// Raw widget contract. Implementations report callbacks on the sender
/// handed to [`configure`](UploadWidget::configure).
pub trait UploadWidget: Send {
    /// Create the widget with account settings.
    ///
    /// # Errors
    ///
    /// Returns [`UploadError::Widget`] if the widget cannot be created.
    fn configure(
        &mut self,
        config: &UploadConfig,
        callbacks: mpsc::UnboundedSender<WidgetCallback>,
    ) -> Result<(), UploadError>;

    /// Replace the per-open options.
    ///
    /// # Errors
    ///
    /// Returns [`UploadError`] if the widget rejects the options.
    fn update_options(&mut self, options: &OpenOptions) -> Result<(), UploadError>;

    /// Show the widget.
    ///
    /// # Errors
    ///
    /// Returns [`UploadError`] if the widget cannot open.
    fn open(&mut self) -> Result<(), UploadError>;

    /// Tear the widget down.
    fn dispose(&mut self);
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Lifecycle {
    Idle,
    Ready,
    Disposed,
}

/// Owns one widget instance for the editor's lifetime.
pub struct MediaUploader<W: UploadWidget> {
    widget: W,
    lifecycle: Lifecycle,
    callbacks: Option<mpsc::UnboundedReceiver<WidgetCallback>>,
}

impl<W: UploadWidget> MediaUploader<W> {
    /// Take ownership of an unconfigured widget.
    pub fn new(widget: W) -> Self {
        Self {
            widget,
            lifecycle: Lifecycle::Idle,
            callbacks: None,
        }
    }

    /// Configure the widget. Reconfiguring replaces the callback channel.
    ///
    /// # Errors
    ///
    /// Returns [`UploadError::Disposed`] after `dispose`, or the widget's error.
    pub fn configure(&mut self, config: &UploadConfig) -> Result<(), UploadError> {
        if self.lifecycle == Lifecycle::Disposed {
            return Err(UploadError::Disposed);
        }
        let (tx, rx) = mpsc::unbounded_channel();
        self.widget.configure(config, tx)?;
        self.callbacks = Some(rx);
        self.lifecycle = Lifecycle::Ready;
        debug!(cloud = %config.cloud_name, "upload widget configured");
        Ok(())
    }

    /// Open the widget for `kind`.
    ///
    /// # Errors
    ///
    /// Returns [`UploadError::NotConfigured`] or [`UploadError::Disposed`]
    /// when the lifecycle forbids it, or the widget's error.
    pub fn open(&mut self, kind: MediaKind) -> Result<(), UploadError> {
        match self.lifecycle {
            Lifecycle::Idle => return Err(UploadError::NotConfigured),
            Lifecycle::Disposed => return Err(UploadError::Disposed),
            Lifecycle::Ready => {}
        }
        self.widget.update_options(&OpenOptions::from(kind))?;
        self.widget.open()
    }

    /// Callbacks received so far, without waiting.
    pub fn drain(&mut self) -> Vec<WidgetCallback> {
        let mut drained = Vec::new();
        if let Some(rx) = self.callbacks.as_mut() {
            while let Ok(callback) = rx.try_recv() {
                drained.push(callback);
            }
        }
        drained
    }

    /// Wait for the next callback. `None` once the widget is gone.
    pub async fn next_callback(&mut self) -> Option<WidgetCallback> {
        self.callbacks.as_mut()?.recv().await
    }

    /// Whether `open` is currently allowed.
    pub fn is_ready(&self) -> bool {
        self.lifecycle == Lifecycle::Ready
    }

    /// Tear down the widget. Idempotent.
    pub fn dispose(&mut self) {
        if self.lifecycle == Lifecycle::Disposed {
            return;
        }
        self.widget.dispose();
        self.callbacks = None;
        self.lifecycle = Lifecycle::Disposed;
        debug!("upload widget disposed");
    }
}

impl<W: UploadWidget> Drop for MediaUploader<W> {
    fn drop(&mut self) {
        self.dispose();
    }
}

/// Widget for headless use: replays URLs of assets that are already hosted.
///
/// Each `open` emits `show`, one `success` per queued URL of the requested
/// kind, then `close`.
#[derive(Debug, Default)]
pub struct ReplayWidget {
    queued: Vec<(MediaKind, String)>,
    options: Option<OpenOptions>,
    callbacks: Option<mpsc::UnboundedSender<WidgetCallback>>,
}

impl ReplayWidget {
    /// A widget with nothing queued.
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a hosted URL to be reported when opened for `kind`.
    pub fn queue(&mut self, kind: MediaKind, url: impl Into<String>) {
        self.queued.push((kind, url.into()));
    }

    fn emit(&self, callback: WidgetCallback) -> Result<(), UploadError> {
        let tx = self.callbacks.as_ref().ok_or(UploadError::NotConfigured)?;
        tx.send(callback)
            .map_err(|_| UploadError::Widget("callback receiver dropped".to_owned()))
    }
}

impl UploadWidget for ReplayWidget {
    fn configure(
        &mut self,
        config: &UploadConfig,
        callbacks: mpsc::UnboundedSender<WidgetCallback>,
    ) -> Result<(), UploadError> {
        if config.sources.is_empty() {
            warn!("upload widget configured with no sources");
        }
        self.callbacks = Some(callbacks);
        Ok(())
    }

    fn update_options(&mut self, options: &OpenOptions) -> Result<(), UploadError> {
        self.options = Some(*options);
        Ok(())
    }

    fn open(&mut self) -> Result<(), UploadError> {
        let options = self
            .options
            .ok_or_else(|| UploadError::Widget("opened without options".to_owned()))?;
        self.emit(WidgetCallback::show())?;

        let (matching, rest): (Vec<_>, Vec<_>) = std::mem::take(&mut self.queued)
            .into_iter()
            .partition(|(kind, _)| kind.resource_type() == options.resource_type);
        self.queued = rest;

        let take = if options.multiple { matching.len() } else { matching.len().min(1) };
        let mut matching = matching.into_iter();
        for (kind, url) in matching.by_ref().take(take) {
            self.emit(WidgetCallback::success(url, kind.resource_type()))?;
        }
        self.queued.extend(matching);

        self.emit(WidgetCallback::close())
    }

    fn dispose(&mut self) {
        self.callbacks = None;
        self.queued.clear();
    }
}
