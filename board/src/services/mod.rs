//! Service implementations
//!
//! Real implementations of the board's I/O seams: the HTTP store, the sync
//! client built on top of it, notice sinks and file export.

pub mod export;
pub mod notifier;
pub mod remote_store;
pub mod sync_client;

#[cfg(test)]
mod tests;

pub use notifier::{ChannelNotifier, LogNotifier};
pub use remote_store::RealRemoteStore;
pub use sync_client::SyncClient;
