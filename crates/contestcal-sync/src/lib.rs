//! Contest-to-calendar synchronization.
//!
//! One run goes through four stages:
//!
//! ```text
//! sources ──fetch──▶ aggregate ──window──▶ reconcile ──new only──▶ create
//!                                             ▲
//!                        calendar ──list──▶ ExistingEventIndex
//! ```
//!
//! [`SyncDriver::run`] wires them together against any
//! [`CalendarService`](contestcal_providers::CalendarService).

pub mod aggregate;
pub mod driver;
pub mod error;
pub mod event;
pub mod index;
pub mod reconcile;
pub mod settings;

pub use aggregate::aggregate;
pub use driver::{SyncDriver, SyncReport};
pub use error::SyncError;
pub use event::build_event;
pub use index::{DuplicateKey, ExistingEventIndex, URL_SENTINEL, extract_sentinel_url};
pub use reconcile::reconcile;
pub use settings::SyncSettings;
