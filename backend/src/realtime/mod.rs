//! Realtime change notifications and live views

pub mod feed;
pub mod sync;
pub mod views;

pub use feed::{ChangeEvent, ChangeFeed, ChangeKind, Filter, Subscription, Table, Topic};
pub use sync::{LiveQuery, SyncView, ViewState};
