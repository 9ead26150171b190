//! WalkGraph core – tilstandsmaskin for gåturer, metrikkregnskap og
//! pending-sync med retry.

pub mod feed;
pub mod format;
pub mod geo;
pub mod metrics;
pub mod models;
pub mod session;
pub mod store;
pub mod sync;

pub use feed::{SensorEvent, SensorFeed};
pub use models::{Coordinate, LocationFix, Walk, WalkStatus};
pub use session::{DropReason, Ingest, SessionController, SessionError};
pub use store::{load_pending, save_pending, RemoteStore, StoreError, WalkStore};
pub use sync::{
    complete_and_persist, complete_and_persist_at, PendingSync, RetryOutcome, RetryReport,
};
