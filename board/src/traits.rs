//! Board trait definitions for dependency injection
//!
//! Every seam towards the outside world is a trait with a `mockall` mock so the
//! coordinator, the sync client and the board session can be tested without a
//! network or a presentation layer.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use shared::{Investor, Notice, ProjectId};
use crate::error::BoardResult;

/// Raw transport against the remote JSON store
///
/// Implementations move bytes; validation, retries and payload normalisation
/// live in the sync client on top of it.
#[mockall::automock]
#[async_trait]
pub trait RemoteStore: Send + Sync {
    /// Write the serialized record array under the project key
    async fn put_records(&self, project: &ProjectId, body: String) -> BoardResult<()>;

    /// Read whatever payload is stored under the project key
    async fn fetch_payload(&self, project: &ProjectId) -> BoardResult<serde_json::Value>;

    /// Record a free-text note and last-modified timestamp for the project
    async fn put_metadata(&self, project: &ProjectId, note: &str, modified_at: DateTime<Utc>) -> BoardResult<()>;
}

/// Save/load contract consumed by the persistence coordinator and the board
///
/// Never fails past its boundary: failures become `false` or an empty
/// sequence plus a notice.
#[mockall::automock]
#[async_trait]
pub trait RemoteSync: Send + Sync {
    /// Persist the full sequence; `true` only when the write was acknowledged
    async fn save(&self, records: &[Investor], project: &ProjectId) -> bool;

    /// Load and normalise the sequence stored under the project key
    async fn load(&self, project: &ProjectId) -> Vec<Investor>;

    /// Secondary metadata update fired after edits and deletions
    async fn track_update(&self, note: &str, project: &ProjectId) -> bool;
}

/// Sink for user-visible notices
#[mockall::automock]
pub trait Notifier: Send + Sync {
    fn notify(&self, notice: Notice);
}

/// Notifier shared between the board, the coordinator and the sync client
pub type SharedNotifier = Arc<dyn Notifier>;
