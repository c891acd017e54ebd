//! Run sequencing: fetch requests, load state, reconcile, emit, persist.
//!
//! `fetch_requests` drains the mail source into an `Inbox`. A `Session` holds
//! the roster, settled usage and the day's request sets; it builds call lists
//! without touching disk and persists everything in one `commit`.

pub mod inbox;
pub mod session;

pub use inbox::{fetch_requests, Inbox, Triage};
pub use session::{CallList, LedgerRow, Session};
