//! Event and sermon drafts, their validation, and the stored records.

use std::fmt;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Date format of the form's date inputs.
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// Which of the two forms.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FormKind {
    /// "Add Event".
    Event,
    /// "Add Sermon".
    Sermon,
}

impl fmt::Display for FormKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Event => "event",
            Self::Sermon => "sermon",
        })
    }
}

/// Why a draft cannot be submitted.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    /// A required field is blank.
    #[error("{form} {field} is required")]
    MissingField {
        /// Form the field belongs to.
        form: FormKind,
        /// Field name.
        field: &'static str,
    },
    /// The date is not `YYYY-MM-DD`.
    #[error("{form} date {value:?} is not a valid YYYY-MM-DD date")]
    InvalidDate {
        /// Form the field belongs to.
        form: FormKind,
        /// Rejected input.
        value: String,
    },
}

fn require(form: FormKind, field: &'static str, value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Err(ValidationError::MissingField { form, field });
    }
    Ok(())
}

fn require_date(form: FormKind, value: &str) -> Result<(), ValidationError> {
    require(form, "date", value)?;
    NaiveDate::parse_from_str(value.trim(), DATE_FORMAT)
        .map(|_| ())
        .map_err(|_| ValidationError::InvalidDate {
            form,
            value: value.to_owned(),
        })
}

/// "Add Event" form state.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventDraft {
    /// Event title (required).
    pub title: String,
    /// Event date, `YYYY-MM-DD` (required).
    pub date: String,
    /// Description (required).
    pub description: String,
    /// Uploaded image URLs, in upload order.
    #[serde(default)]
    pub images: Vec<String>,
}

impl EventDraft {
    /// Check required fields and the date format.
    ///
    /// # Errors
    ///
    /// Returns the first failing field.
    pub fn validate(&self) -> Result<(), ValidationError> {
        require(FormKind::Event, "title", &self.title)?;
        require_date(FormKind::Event, &self.date)?;
        require(FormKind::Event, "description", &self.description)
    }

    /// Copy with surrounding whitespace removed from the text fields.
    pub fn trimmed(&self) -> Self {
        Self {
            title: self.title.trim().to_owned(),
            date: self.date.trim().to_owned(),
            description: self.description.trim().to_owned(),
            images: self.images.clone(),
        }
    }

    /// Drop the image at `index`, returning its URL.
    pub fn remove_image(&mut self, index: usize) -> Option<String> {
        (index < self.images.len()).then(|| self.images.remove(index))
    }
}

/// "Add Sermon" form state.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SermonDraft {
    /// Sermon title (required).
    pub title: String,
    /// Sermon date, `YYYY-MM-DD` (required).
    pub date: String,
    /// Uploaded audio URL, empty when none.
    #[serde(rename = "audioURL", default)]
    pub audio_url: String,
    /// Uploaded video URL, empty when none.
    #[serde(rename = "videoURL", default)]
    pub video_url: String,
}

impl SermonDraft {
    /// Check required fields and the date format.
    ///
    /// # Errors
    ///
    /// Returns the first failing field.
    pub fn validate(&self) -> Result<(), ValidationError> {
        require(FormKind::Sermon, "title", &self.title)?;
        require_date(FormKind::Sermon, &self.date)
    }

    /// Copy with surrounding whitespace removed from the text fields.
    pub fn trimmed(&self) -> Self {
        Self {
            title: self.title.trim().to_owned(),
            date: self.date.trim().to_owned(),
            ..self.clone()
        }
    }
}

/// A stored event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Event {
    /// Store-assigned identifier.
    #[serde(rename = "_id", alias = "id")]
    pub id: String,
    /// Title.
    pub title: String,
    /// Date as submitted.
    pub date: String,
    /// Description.
    #[serde(default)]
    pub description: String,
    /// Image URLs.
    #[serde(default)]
    pub images: Vec<String>,
}

impl Event {
    /// Record for `draft` under `id`.
    pub fn from_draft(id: impl Into<String>, draft: &EventDraft) -> Self {
        let EventDraft {
            title,
            date,
            description,
            images,
        } = draft.trimmed();
        Self {
            id: id.into(),
            title,
            date,
            description,
            images,
        }
    }
}

impl fmt::Display for Event {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}  {}  ({})", self.date, self.title, self.id)?;
        if !self.description.is_empty() {
            write!(f, "\n  {}", self.description)?;
        }
        for image in &self.images {
            write!(f, "\n  image: {image}")?;
        }
        Ok(())
    }
}

/// A stored sermon.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Sermon {
    /// Store-assigned identifier.
    #[serde(rename = "_id", alias = "id")]
    pub id: String,
    /// Title.
    pub title: String,
    /// Date as submitted.
    pub date: String,
    /// Audio URL, empty when none.
    #[serde(rename = "audioURL", default)]
    pub audio_url: String,
    /// Video URL, empty when none.
    #[serde(rename = "videoURL", default)]
    pub video_url: String,
}

impl Sermon {
    /// Record for `draft` under `id`.
    pub fn from_draft(id: impl Into<String>, draft: &SermonDraft) -> Self {
        let SermonDraft {
            title,
            date,
            audio_url,
            video_url,
        } = draft.trimmed();
        Self {
            id: id.into(),
            title,
            date,
            audio_url,
            video_url,
        }
    }
}

impl fmt::Display for Sermon {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}  {}  ({})", self.date, self.title, self.id)?;
        if !self.audio_url.is_empty() {
            write!(f, "\n  audio: {}", self.audio_url)?;
        }
        if !self.video_url.is_empty() {
            write!(f, "\n  video: {}", self.video_url)?;
        }
        Ok(())
    }
}
