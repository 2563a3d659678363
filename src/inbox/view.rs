//! Read-only projections of messages for rendering.
//!
//! Nothing here touches the network; the controller hands out snapshots and
//! these types turn them into label/value layouts.

use std::fmt;

use super::message::{Message, MessageStatus};

/// Status badge: label plus colour tone.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StatusBadge {
    /// Visible text.
    pub label: &'static str,
    /// Colour tone.
    pub tone: &'static str,
}

impl From<MessageStatus> for StatusBadge {
    fn from(status: MessageStatus) -> Self {
        Self {
            label: status.label(),
            tone: status.tone(),
        }
    }
}

/// One row of the inbox list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MessageCard {
    /// Message identifier, for actions.
    pub id: String,
    /// Sender name (card title).
    pub name: String,
    /// Status badge.
    pub badge: StatusBadge,
    /// Local submission time.
    pub received: String,
    /// Sender email.
    pub email: String,
    /// Phone, only when present.
    pub phone: Option<String>,
    /// Subject, only when present.
    pub subject: Option<String>,
    /// Truncated body.
    pub excerpt: String,
    /// Current value of the row's status dropdown.
    pub status: MessageStatus,
}

impl From<&Message> for MessageCard {
    fn from(message: &Message) -> Self {
        Self {
            id: message.id.clone(),
            name: message.name.clone(),
            badge: message.status.into(),
            received: message.received(),
            email: message.email.clone(),
            phone: message.phone().map(str::to_owned),
            subject: message.subject().map(str::to_owned),
            excerpt: message.excerpt(),
            status: message.status,
        }
    }
}

impl fmt::Display for MessageCard {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "{}  [{}]  {}  ({})",
            self.name, self.badge.label, self.received, self.id
        )?;
        write!(f, "  Email: {}", self.email)?;
        if let Some(phone) = &self.phone {
            write!(f, "  Phone: {phone}")?;
        }
        writeln!(f)?;
        if let Some(subject) = &self.subject {
            writeln!(f, "  Subject: {subject}")?;
        }
        write!(f, "  Message: {}", self.excerpt)
    }
}

/// Full read-only layout of one message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MessageDetail {
    /// Ordered label/value rows.
    pub rows: Vec<(&'static str, String)>,
    /// Status badge.
    pub badge: StatusBadge,
}

impl From<&Message> for MessageDetail {
    fn from(message: &Message) -> Self {
        let mut rows = vec![
            ("From", message.name.clone()),
            ("Email", message.email.clone()),
        ];
        if let Some(phone) = message.phone() {
            rows.push(("Phone", phone.to_owned()));
        }
        rows.push(("Subject", message.subject().unwrap_or("No subject").to_owned()));
        rows.push(("Message", message.body.clone()));
        rows.push(("Received", message.received()));
        rows.push(("Status", message.status.label().to_owned()));
        Self {
            rows,
            badge: message.status.into(),
        }
    }
}

impl MessageDetail {
    /// Value of the row labelled `label`.
    pub fn value(&self, label: &str) -> Option<&str> {
        self.rows
            .iter()
            .find(|(l, _)| *l == label)
            .map(|(_, v)| v.as_str())
    }
}

impl fmt::Display for MessageDetail {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Message Details")?;
        for (label, value) in &self.rows {
            if *label == "Message" {
                writeln!(f, "{label}:")?;
                for line in value.lines() {
                    writeln!(f, "  {line}")?;
                }
            } else {
                writeln!(f, "{label}: {value}")?;
            }
        }
        Ok(())
    }
}

/// Modal state: which message is selected and whether it is shown.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DetailView {
    selected: Option<Message>,
    open: bool,
}

impl DetailView {
    /// Select `message` and show it.
    pub fn open(&mut self, message: Message) {
        self.selected = Some(message);
        self.open = true;
    }

    /// Hide the modal. The selection is kept, as the modal would.
    pub fn close(&mut self) {
        self.open = false;
    }

    /// Whether the modal is showing.
    pub fn is_open(&self) -> bool {
        self.open
    }

    /// The selected message, if any.
    pub fn selected(&self) -> Option<&Message> {
        self.selected.as_ref()
    }

    /// The layout to draw, only while open.
    pub fn layout(&self) -> Option<MessageDetail> {
        if !self.open {
            return None;
        }
        self.selected.as_ref().map(MessageDetail::from)
    }

    /// Swap the selection for its fresh copy from `messages`, if listed.
    pub(crate) fn refresh_from(&mut self, messages: &[Message]) {
        let Some(selected) = self.selected.as_mut() else {
            return;
        };
        if let Some(fresh) = messages.iter().find(|m| m.id == selected.id) {
            *selected = fresh.clone();
        }
    }
}
