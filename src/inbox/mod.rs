//! Contact-message inbox: filterable, paginated list with per-row status
//! changes and a detail view.

pub mod controller;
pub mod filter;
pub mod message;
pub mod view;

pub use controller::{FetchOutcome, InboxSettings, InboxState, MessageListController};
pub use filter::{FilterState, Pagination, PaginationBar};
pub use message::{Message, MessageStatus, StatusFilter, UnknownStatus};
pub use view::{DetailView, MessageCard, MessageDetail, StatusBadge};
