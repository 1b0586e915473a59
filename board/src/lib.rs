//! Investor pipeline board
//!
//! Drag-and-drop transition engine over an ordered record sequence, a debounced
//! persistence coordinator guarding remote writes, and a sync client that
//! tolerates the legacy payload shapes of the remote JSON store.

pub mod board_impl;
pub mod config;
pub mod coordinator;
pub mod core;
pub mod error;
pub mod services;
pub mod state;
pub mod traits;

// Re-export commonly used types
pub use board_impl::Board;
pub use config::{BoardConfig, RetryPolicy};
pub use coordinator::{CoordinatorHandle, CoordinatorSettings, CoordinatorStatus, PersistenceCoordinator};
pub use core::{DragGesture, DropTarget, InsertSide, Point, TransitionKind, TransitionOutcome};
pub use error::{BoardError, BoardResult};
pub use state::RecordStore;
pub use traits::{Notifier, RemoteStore, RemoteSync, SharedNotifier};
