//! Contact messages and their status.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Local, Utc};
use serde::{Deserialize, Deserializer, Serialize};

/// Characters of body text shown on a list card before truncation.
pub const EXCERPT_CHARS: usize = 150;

/// Workflow status of a contact message.
///
/// Serialized lowercase. Deserialization never fails on an unknown or null
/// value: anything unrecognised is read as [`MessageStatus::New`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageStatus {
    /// Not yet looked at.
    #[default]
    New,
    /// Opened by an admin.
    Read,
    /// Answered.
    Replied,
    /// Filed away.
    Archived,
}

impl MessageStatus {
    /// Every status, in menu order.
    pub const ALL: [Self; 4] = [Self::New, Self::Read, Self::Replied, Self::Archived];

    /// Wire form.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::New => "new",
            Self::Read => "read",
            Self::Replied => "replied",
            Self::Archived => "archived",
        }
    }

    /// Human label.
    pub fn label(self) -> &'static str {
        match self {
            Self::New => "New",
            Self::Read => "Read",
            Self::Replied => "Replied",
            Self::Archived => "Archived",
        }
    }

    /// Badge colour tone for this status.
    pub fn tone(self) -> &'static str {
        match self {
            Self::New => "danger",
            Self::Read => "info",
            Self::Replied => "success",
            Self::Archived => "secondary",
        }
    }

    /// Parse a wire value, falling back to `New` for anything unknown.
    pub fn from_wire(value: &str) -> Self {
        value.parse().unwrap_or_default()
    }
}

impl FromStr for MessageStatus {
    type Err = UnknownStatus;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "new" => Ok(Self::New),
            "read" => Ok(Self::Read),
            "replied" => Ok(Self::Replied),
            "archived" => Ok(Self::Archived),
            _ => Err(UnknownStatus(s.to_owned())),
        }
    }
}

impl fmt::Display for MessageStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for MessageStatus {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = Option::<String>::deserialize(deserializer)?;
        Ok(raw.as_deref().map(Self::from_wire).unwrap_or_default())
    }
}

/// A status string that is not one of the four known values.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown message status {0:?}, expected new, read, replied or archived")]
pub struct UnknownStatus(pub String);

/// Status dropdown selection for the inbox filter.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum StatusFilter {
    /// No status restriction.
    #[default]
    All,
    /// Only messages with this status.
    Only(MessageStatus),
}

impl StatusFilter {
    /// Wire form for the `status` query parameter.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::All => "all",
            Self::Only(status) => status.as_str(),
        }
    }
}

impl FromStr for StatusFilter {
    type Err = UnknownStatus;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.trim().eq_ignore_ascii_case("all") {
            return Ok(Self::All);
        }
        s.parse().map(Self::Only)
    }
}

impl fmt::Display for StatusFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A contact-form submission as the backend stores it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    /// Backend identifier.
    #[serde(rename = "_id", alias = "id")]
    pub id: String,
    /// Sender name.
    pub name: String,
    /// Sender email.
    pub email: String,
    /// Optional phone number.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    /// Optional subject line.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subject: Option<String>,
    /// Body text.
    #[serde(rename = "message")]
    pub body: String,
    /// Workflow status.
    #[serde(default)]
    pub status: MessageStatus,
    /// When the message was submitted.
    #[serde(rename = "createdAt", default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
}

impl Message {
    /// Phone number, treating an empty string as absent.
    pub fn phone(&self) -> Option<&str> {
        non_blank(self.phone.as_deref())
    }

    /// Subject, treating an empty string as absent.
    pub fn subject(&self) -> Option<&str> {
        non_blank(self.subject.as_deref())
    }

    /// Body shortened to [`EXCERPT_CHARS`] characters with a trailing `...`.
    pub fn excerpt(&self) -> String {
        if self.body.chars().count() > EXCERPT_CHARS {
            let head: String = self.body.chars().take(EXCERPT_CHARS).collect();
            format!("{head}...")
        } else {
            self.body.clone()
        }
    }

    /// Submission time in the local timezone, or `unknown`.
    pub fn received(&self) -> String {
        self.created_at.map_or_else(
            || "unknown".to_owned(),
            |at| at.with_timezone(&Local).format("%Y-%m-%d %H:%M").to_string(),
        )
    }
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.filter(|v| !v.trim().is_empty())
}
