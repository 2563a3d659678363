//! Events and sermons editor.

pub mod dashboard;
pub mod draft;
pub mod store;
pub mod upload;

pub use dashboard::{ContentEditor, EditorError};
pub use draft::{Event, EventDraft, FormKind, Sermon, SermonDraft, ValidationError};
pub use store::{ContentStore, HttpContentStore, InMemoryContentStore, StoreError};
pub use upload::{
    MediaKind, MediaUploader, OpenOptions, ReplayWidget, UploadError, UploadInfo, UploadWidget,
    WidgetCallback, WidgetEventKind, WidgetResult,
};
