//! User-visible outcome banners shared by both screens.

use std::fmt;

use crate::api::ApiError;

/// Which user action produced a [`Feedback`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    /// Loading a page of messages.
    FetchMessages,
    /// Changing one message's status.
    UpdateStatus,
    /// Loading existing events and sermons.
    LoadContent,
    /// Submitting the event form.
    CreateEvent,
    /// Submitting the sermon form.
    CreateSermon,
    /// Deleting an event.
    DeleteEvent,
    /// A media upload through the widget.
    Upload,
}

impl Operation {
    /// Short human name, used as a banner prefix.
    pub fn describe(self) -> &'static str {
        match self {
            Self::FetchMessages => "loading messages",
            Self::UpdateStatus => "updating message status",
            Self::LoadContent => "loading content",
            Self::CreateEvent => "adding event",
            Self::CreateSermon => "adding sermon",
            Self::DeleteEvent => "deleting event",
            Self::Upload => "uploading media",
        }
    }
}

/// Banner colour.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tone {
    /// Green confirmation.
    Success,
    /// Red failure.
    Danger,
}

/// A dismissible banner describing the last outcome.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Feedback {
    /// Colour.
    pub tone: Tone,
    /// The action this reports on.
    pub operation: Operation,
    /// Banner text.
    pub text: String,
    /// Whether a retry button makes sense.
    pub retryable: bool,
}

impl Feedback {
    /// A success banner.
    pub fn success(operation: Operation, text: impl Into<String>) -> Self {
        Self {
            tone: Tone::Success,
            operation,
            text: text.into(),
            retryable: false,
        }
    }

    /// A failure banner.
    pub fn failure(operation: Operation, text: impl Into<String>, retryable: bool) -> Self {
        Self {
            tone: Tone::Danger,
            operation,
            text: text.into(),
            retryable,
        }
    }

    /// A failure banner for a backend error.
    pub fn from_api_error(operation: Operation, error: &ApiError) -> Self {
        Self::failure(
            operation,
            format!("Error {}: {error}", operation.describe()),
            error.is_retryable(),
        )
    }

    /// Whether this is a failure banner.
    pub fn is_failure(&self) -> bool {
        self.tone == Tone::Danger
    }
}

impl fmt::Display for Feedback {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.text)?;
        if self.retryable {
            f.write_str(" (retryable)")?;
        }
        Ok(())
    }
}
