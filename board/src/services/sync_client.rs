//! Remote sync client: validated saves, tolerant loads, metadata notes
//!
//! Wraps a raw `RemoteStore` with the completeness gate, a linear-backoff
//! retry loop and the load normalisation chain. Nothing escapes as an error:
//! callers get `bool` / `Vec<Investor>` and the cause goes to the notifier.

use std::future::Future;

use async_trait::async_trait;
use chrono::Utc;

use shared::{
    component_debug, component_error, component_info, component_warn, logging::Component, timestamp_now, Investor,
    Notice, ProjectId,
};
use crate::config::RetryPolicy;
use crate::core::{normalize_payload, validate_for_save};
use crate::error::{BoardError, BoardResult};
use crate::traits::{RemoteStore, RemoteSync, SharedNotifier};

pub struct SyncClient<S: RemoteStore> {
    store: S,
    notifier: SharedNotifier,
    retry: RetryPolicy,
}

impl<S: RemoteStore> SyncClient<S> {
    pub fn new(store: S, notifier: SharedNotifier, retry: RetryPolicy) -> Self {
        Self { store, notifier, retry }
    }

    /// Run `operation` until it succeeds, fails with a non-transport error, or
    /// the attempts are exhausted; attempt N failing waits N × base delay
    async fn with_retries<T, F, Fut>(&self, label: &str, mut operation: F) -> BoardResult<T>
    where
        F: FnMut() -> Fut + Send,
        Fut: Future<Output = BoardResult<T>> + Send,
        T: Send,
    {
        let max_attempts = self.retry.max_attempts();
        let mut attempt = 1;

        loop {
            match operation().await {
                Ok(value) => {
                    if attempt > 1 {
                        component_info!(Component::Sync, "✅ {} succeeded on attempt {}", label, attempt);
                    }
                    return Ok(value);
                }
                Err(error) if error.is_transport() && attempt < max_attempts => {
                    let delay = self.retry.delay_after(attempt);
                    component_warn!(
                        Component::Sync,
                        "⏳ {} failed (attempt {}/{}), retrying in {}ms: {}",
                        label,
                        attempt,
                        max_attempts,
                        delay.as_millis(),
                        error
                    );
                    tokio::time::sleep(delay).await;
                    attempt += 1;
                }
                Err(error) => {
                    component_error!(
                        Component::Sync,
                        "❌ {} failed (attempt {}/{}): {}",
                        label,
                        attempt,
                        max_attempts,
                        error
                    );
                    return Err(error);
                }
            }
        }
    }

    fn require_project<'a>(&self, project: &'a ProjectId) -> BoardResult<&'a ProjectId> {
        if project.is_blank() {
            return Err(BoardError::MissingProject);
        }
        Ok(project)
    }
}

#[async_trait]
impl<S: RemoteStore> RemoteSync for SyncClient<S> {
    async fn save(&self, records: &[Investor], project: &ProjectId) -> bool {
        if self.require_project(project).is_err() {
            component_warn!(Component::Sync, "Save aborted: no project identifier");
            self.notifier.notify(
                Notice::error("Save cancelled").with_description("No project id configured. Set one in the settings."),
            );
            return false;
        }

        if let Err(error) = validate_for_save(records) {
            component_error!(Component::Sync, "Save aborted to prevent data loss: {}", error);
            self.notifier.notify(
                Notice::error("Save cancelled")
                    .with_description(format!("Investor data is incomplete ({error}). Nothing was written.")),
            );
            return false;
        }

        let body = match serde_json::to_string(records) {
            Ok(body) => body,
            Err(error) => {
                component_error!(Component::Sync, "Unable to serialize {} records: {}", records.len(), error);
                self.notifier.notify(Notice::error("Save failed").with_description(error.to_string()));
                return false;
            }
        };

        let result = self
            .with_retries("Save", || self.store.put_records(project, body.clone()))
            .await;

        match result {
            Ok(()) => {
                component_info!(Component::Sync, "💾 Saved {} records to project {}", records.len(), project);
                self.notifier.notify(
                    Notice::success("Data saved").with_description(format!("{} investors saved", records.len())),
                );
                true
            }
            Err(error) => {
                self.notifier.notify(Notice::error("Save failed").with_description(format!(
                    "Unable to save after {} attempts. {error}",
                    self.retry.max_attempts()
                )));
                false
            }
        }
    }

    async fn load(&self, project: &ProjectId) -> Vec<Investor> {
        if self.require_project(project).is_err() {
            self.notifier.notify(
                Notice::warning("Load cancelled").with_description("No project id configured. Set one in the settings."),
            );
            return Vec::new();
        }

        let payload = match self.with_retries("Load", || self.store.fetch_payload(project)).await {
            Ok(payload) => payload,
            Err(error @ BoardError::Format { .. }) => {
                self.notifier.notify(Notice::warning("Unrecognised data format").with_description(error.to_string()));
                return Vec::new();
            }
            Err(error) => {
                self.notifier.notify(Notice::error("Load failed").with_description(format!(
                    "Unable to load data after {} attempts. {error}",
                    self.retry.max_attempts()
                )));
                return Vec::new();
            }
        };

        match normalize_payload(&payload, &timestamp_now()) {
            Ok((shape, records)) => {
                component_info!(
                    Component::Sync,
                    "📥 Loaded {} records for project {} ({:?})",
                    records.len(),
                    project,
                    shape
                );
                self.notifier.notify(
                    Notice::success("Data loaded").with_description(format!("{} investors loaded", records.len())),
                );
                records
            }
            Err(error) => {
                component_warn!(Component::Sync, "Load payload not recognised: {}", error);
                self.notifier.notify(
                    Notice::warning("Unrecognised data format")
                        .with_description("The server answered with an unknown shape. Loaded an empty board."),
                );
                Vec::new()
            }
        }
    }

    async fn track_update(&self, note: &str, project: &ProjectId) -> bool {
        if self.require_project(project).is_err() {
            component_debug!(Component::Sync, "Metadata update skipped: no project identifier");
            return false;
        }

        match self.store.put_metadata(project, note, Utc::now()).await {
            Ok(()) => {
                component_debug!(Component::Sync, "📝 Metadata updated: {}", note);
                true
            }
            Err(error) => {
                component_warn!(Component::Sync, "Metadata update failed: {}", error);
                false
            }
        }
    }
}
