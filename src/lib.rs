//! Headless admin console for a parish website.
//!
//! Two independent screens:
//! - [`inbox`]: contact-message inbox with filters, pagination, status
//!   changes and a detail view, backed by `/api/messages`
//! - [`editor`]: events and sermons editor with media uploads, backed by an
//!   injectable [`editor::ContentStore`]
//!
//! See `DESIGN.md` for the architecture notes.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod api;
pub mod config;
pub mod feedback;
pub mod logging;

pub mod editor;
pub mod inbox;
