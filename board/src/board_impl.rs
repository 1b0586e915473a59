//! Board session
//!
//! Owns the record store for one project, turns gestures and record actions
//! into new sequences, and forwards every replacement to the persistence
//! coordinator. User-visible outcomes go through the notifier.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use chrono::Utc;

use shared::{component_debug, component_info, component_warn, logging::Component, Investor, Notice, ProjectId, RecordId};
use crate::coordinator::{CoordinatorHandle, CoordinatorSettings, CoordinatorStatus, PersistenceCoordinator};
use crate::core::actions::{self, removal_note, ImportRow, Upserted};
use crate::core::analytics::{self, PipelineSummary, StatusCount};
use crate::core::layout::{BoardLayout, DropTarget, Point};
use crate::core::transition::{plan_transition, DragGesture, NoOpReason, TransitionOutcome};
use crate::error::{BoardError, BoardResult};
use crate::services::export;
use crate::state::{BoardView, RecordStore};
use crate::traits::{RemoteSync, SharedNotifier};

pub struct Board<R: RemoteSync + 'static> {
    store: RecordStore,
    view: BoardView,
    project: Option<ProjectId>,
    sync: Arc<R>,
    notifier: SharedNotifier,
    coordinator: CoordinatorHandle,
}

impl<R: RemoteSync + 'static> Board<R> {
    /// Create an empty session and start its coordinator
    pub fn new(sync: Arc<R>, notifier: SharedNotifier, settings: CoordinatorSettings) -> Self {
        let coordinator = PersistenceCoordinator::spawn(Arc::clone(&sync), Arc::clone(&notifier), settings);
        Self {
            store: RecordStore::default(),
            view: BoardView::default(),
            project: None,
            sync,
            notifier,
            coordinator,
        }
    }

    /// Switch to a project and load it; without a project the board runs locally
    pub async fn open_project(&mut self, project: Option<ProjectId>) -> BoardResult<usize> {
        self.project = project.clone();
        self.coordinator.set_project(project.clone())?;

        let loaded = match &project {
            Some(project) => {
                component_info!(Component::Board, "📂 Opening project {}", project);
                self.sync.load(project).await
            }
            None => {
                self.notifier.notify(
                    Notice::warning("Local mode")
                        .with_description("No project id configured: changes are kept in memory only."),
                );
                Vec::new()
            }
        };

        let count = loaded.len();
        self.store.replace(loaded.clone());
        self.coordinator.initial_load_finished(loaded)?;
        Ok(count)
    }

    pub fn project(&self) -> Option<&ProjectId> {
        self.project.as_ref()
    }

    pub fn records(&self) -> &[Investor] {
        self.store.records()
    }

    pub fn record(&self, id: &RecordId) -> Option<&Investor> {
        self.store.get(id)
    }

    pub fn set_query(&mut self, query: impl Into<String>) {
        self.view.query = query.into();
    }

    pub fn set_show_dropped(&mut self, show: bool) {
        self.view.show_dropped = show;
    }

    /// Geometry of the board as currently filtered
    pub fn layout(&self) -> BoardLayout {
        self.view.layout(&self.store)
    }

    /// Drop a card at a pointer position on the current layout
    pub fn drop_at(&mut self, source_id: &RecordId, pointer: Point) -> BoardResult<TransitionOutcome> {
        let target = self.layout().hit_test(pointer);
        self.drop_on(source_id, target)
    }

    /// Drop a card on an already classified target
    pub fn drop_on(&mut self, source_id: &RecordId, target: DropTarget) -> BoardResult<TransitionOutcome> {
        let Some(source) = self.store.get(source_id) else {
            component_warn!(Component::Engine, "Drop ignored: record {} not on the board", source_id);
            return Ok(TransitionOutcome::NoOp(NoOpReason::SourceMissing));
        };
        let gesture = DragGesture::new(source_id.clone(), source.status, target);
        self.apply_gesture(&gesture)
    }

    /// Run a drag gesture through the transition engine
    pub fn apply_gesture(&mut self, gesture: &DragGesture) -> BoardResult<TransitionOutcome> {
        let outcome = plan_transition(self.store.records(), gesture);

        match &outcome {
            TransitionOutcome::Applied(transition) => {
                component_debug!(Component::Engine, "Transition {:?} on {}", transition.kind, gesture.source_id);
                self.commit(transition.records.clone())?;
                self.notifier.notify(transition.kind.notice());
            }
            TransitionOutcome::NoOp(reason) => {
                component_debug!(Component::Engine, "Drop of {} ignored: {:?}", gesture.source_id, reason);
            }
        }
        Ok(outcome)
    }

    /// Save the edit form: replace an existing record or add a new one
    pub fn save_record(&mut self, record: Investor) -> BoardResult<Upserted> {
        let mut next = self.store.records().to_vec();
        let name = record.name.clone();

        let upserted = match actions::upsert(&mut next, record) {
            Ok(upserted) => upserted,
            Err(error) => {
                self.notifier.notify(
                    Notice::error("Incomplete investor data")
                        .with_description(format!("Cannot save incomplete data: {error}")),
                );
                return Err(error);
            }
        };

        self.commit(next)?;
        self.notifier.notify(Notice::success(match upserted {
            Upserted::Updated => "Investor updated",
            Upserted::Added => "New investor added",
        }));
        self.track(upserted.note(&name));
        Ok(upserted)
    }

    /// Remove a record for good; the delete zone only relabels instead
    pub fn delete_record(&mut self, id: &RecordId) -> BoardResult<Investor> {
        let mut next = self.store.records().to_vec();
        let removed = actions::remove(&mut next, id)?;

        self.commit(next)?;
        self.notifier.notify(Notice::success("Investor deleted"));
        if self.store.is_empty() && self.project.is_some() {
            // Empty boards are never written, so the remote keeps the last record
            component_warn!(Component::Board, "Last record {} deleted locally only", removed.id);
            self.notifier.notify(
                Notice::warning("Deletion not saved").with_description(
                    "The board is now empty and an empty board is never written. The remote store still holds this investor.",
                ),
            );
        }
        self.track(removal_note(&removed.name));
        Ok(removed)
    }

    /// Replace the board with imported rows and save right away
    pub async fn import_rows(&mut self, rows: &[ImportRow]) -> BoardResult<usize> {
        let imported = actions::import(rows, Utc::now());
        let count = imported.len();

        self.commit(imported.clone())?;
        self.notifier.notify(
            Notice::success("Import completed").with_description(format!("{count} investors imported")),
        );

        if self.project.is_some() && count > 0 {
            if let Err(error) = self.coordinator.save_now(imported).await {
                component_warn!(Component::Board, "Save after import failed: {}", error);
            }
        }
        Ok(count)
    }

    /// Explicit save of the current sequence
    pub async fn save_now(&self) -> BoardResult<()> {
        self.coordinator.save_now(self.store.records().to_vec()).await
    }

    /// Pretty JSON export, refused when the data is incomplete
    pub fn export_json(&self) -> BoardResult<String> {
        export::to_json(self.store.records()).map_err(|error| self.export_refused(error))
    }

    pub async fn export_to(&self, dir: &Path) -> BoardResult<PathBuf> {
        match export::export_to_file(self.store.records(), dir, self.project.as_ref()).await {
            Ok(path) => {
                self.notifier.notify(
                    Notice::success("Export completed")
                        .with_description(format!("{} investors exported to JSON", self.store.len())),
                );
                Ok(path)
            }
            Err(error) => Err(self.export_refused(error)),
        }
    }

    pub fn summary(&self) -> PipelineSummary {
        analytics::summary(self.store.records())
    }

    pub fn status_counts(&self) -> Vec<StatusCount> {
        analytics::status_counts(self.store.records())
    }

    pub async fn coordinator_status(&self) -> BoardResult<CoordinatorStatus> {
        self.coordinator.status().await
    }

    /// Tear the session down; pending auto-saves are cancelled
    pub async fn close(mut self) {
        self.coordinator.shutdown().await;
    }

    fn commit(&mut self, records: Vec<Investor>) -> BoardResult<()> {
        self.store.replace(records.clone());
        self.coordinator.changed(records)
    }

    /// Fire the metadata note without waiting for it
    fn track(&self, note: String) {
        let Some(project) = self.project.clone() else {
            return;
        };
        let sync = Arc::clone(&self.sync);
        tokio::spawn(async move {
            sync.track_update(&note, &project).await;
        });
    }

    fn export_refused(&self, error: BoardError) -> BoardError {
        let description = if error.is_validation() {
            format!("Investor data is incomplete or damaged ({error}). Nothing was exported.")
        } else {
            error.to_string()
        };
        self.notifier.notify(Notice::error("Export failed").with_description(description));
        error
    }
}
