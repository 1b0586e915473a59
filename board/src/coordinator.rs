//! Persistence coordinator
//!
//! Decides when and whether the record sequence is written to the remote store.
//! A single task owns all save state and a resettable debounce timer; the board
//! feeds it change events over a command channel. At most one save runs at a
//! time, and a save that is in flight is never cancelled.

use std::future::pending as pending_forever;
use std::pin::Pin;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{mpsc, oneshot};
use tokio::task::{JoinError, JoinHandle};
use tokio::time::{sleep, Sleep};

use shared::{
    component_debug, component_error, component_info, component_warn, logging::Component, Investor, Notice,
    ProjectId,
};
use crate::config::DEBOUNCE;
use crate::core::{validate_for_save, validate_records, Fingerprint};
use crate::error::{BoardError, BoardResult};
use crate::traits::{RemoteSync, SharedNotifier};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CoordinatorSettings {
    /// Quiet window before a change is written
    pub debounce: Duration,
}

impl Default for CoordinatorSettings {
    fn default() -> Self {
        Self { debounce: DEBOUNCE }
    }
}

/// Messages accepted by the coordinator task
#[derive(Debug)]
pub enum Command {
    /// The record sequence was replaced
    Changed(Vec<Investor>),
    /// Switch project; the load gate closes until the next load finishes
    SetProject(Option<ProjectId>),
    /// First load for the current project finished, with what it returned
    InitialLoadFinished(Vec<Investor>),
    /// Explicit save, bypassing the debounce
    SaveNow {
        records: Vec<Investor>,
        reply: oneshot::Sender<BoardResult<()>>,
    },
    Status {
        reply: oneshot::Sender<CoordinatorStatus>,
    },
    Shutdown,
}

/// Snapshot of the coordinator's bookkeeping
#[derive(Debug, Clone, PartialEq)]
pub struct CoordinatorStatus {
    pub project: Option<ProjectId>,
    pub initial_load_complete: bool,
    pub is_saving: bool,
    pub save_pending: bool,
    pub last_saved: Fingerprint,
}

/// Why an auto-save request did not arm the timer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    Empty,
    SaveInFlight,
    LoadIncomplete,
    NoProject,
    Unchanged,
}

/// Outcome of evaluating a change against the save state
#[derive(Debug)]
pub enum ChangeDecision {
    Skip(SkipReason),
    /// Completeness check failed; surfaced to the user
    Blocked(BoardError),
    Schedule(Fingerprint),
}

/// Pure save bookkeeping, separated from the task so it can be unit tested
#[derive(Debug, Clone, Default)]
pub struct SaveState {
    pub last_saved: Fingerprint,
    pub is_saving: bool,
    pub initial_load_complete: bool,
    pub project: Option<ProjectId>,
}

impl SaveState {
    /// Apply the auto-save gates in order
    pub fn evaluate_change(&self, records: &[Investor]) -> ChangeDecision {
        if records.is_empty() {
            return ChangeDecision::Skip(SkipReason::Empty);
        }
        if self.is_saving {
            return ChangeDecision::Skip(SkipReason::SaveInFlight);
        }
        if !self.initial_load_complete {
            return ChangeDecision::Skip(SkipReason::LoadIncomplete);
        }
        if self.project.is_none() {
            return ChangeDecision::Skip(SkipReason::NoProject);
        }
        if let Err(error) = validate_records(records) {
            return ChangeDecision::Blocked(error);
        }
        match Fingerprint::of(records) {
            Ok(fingerprint) if fingerprint == self.last_saved => ChangeDecision::Skip(SkipReason::Unchanged),
            Ok(fingerprint) => ChangeDecision::Schedule(fingerprint),
            Err(error) => ChangeDecision::Blocked(error),
        }
    }

    pub fn switch_project(&mut self, project: Option<ProjectId>) {
        self.project = project;
        self.initial_load_complete = false;
        self.last_saved = Fingerprint::empty();
    }

    /// Open the gate; the loaded sequence already matches the remote copy
    pub fn finish_initial_load(&mut self, loaded: &[Investor]) {
        self.initial_load_complete = true;
        if !loaded.is_empty() {
            if let Ok(fingerprint) = Fingerprint::of(loaded) {
                self.last_saved = fingerprint;
            }
        }
    }

    /// Record the result of a finished save; failures leave the fingerprint stale
    pub fn finish_save(&mut self, attempted: Fingerprint, success: bool) {
        self.is_saving = false;
        if success {
            self.last_saved = attempted;
        }
    }
}

struct InFlightSave {
    handle: JoinHandle<bool>,
    fingerprint: Fingerprint,
    reply: Option<oneshot::Sender<BoardResult<()>>>,
}

/// Scheduled auto-save: the snapshot to write once the timer fires
struct PendingSave {
    timer: Pin<Box<Sleep>>,
    records: Vec<Investor>,
}

pub struct PersistenceCoordinator<R: RemoteSync + 'static> {
    sync: Arc<R>,
    notifier: SharedNotifier,
    settings: CoordinatorSettings,
    state: SaveState,
    pending: Option<PendingSave>,
    in_flight: Option<InFlightSave>,
    /// Latest snapshot that arrived while a save was running
    deferred: Option<Vec<Investor>>,
    commands: mpsc::UnboundedReceiver<Command>,
}

impl<R: RemoteSync + 'static> PersistenceCoordinator<R> {
    /// Start the coordinator task for one board session
    pub fn spawn(sync: Arc<R>, notifier: SharedNotifier, settings: CoordinatorSettings) -> CoordinatorHandle {
        let (sender, commands) = mpsc::unbounded_channel();
        let coordinator = Self {
            sync,
            notifier,
            settings,
            state: SaveState::default(),
            pending: None,
            in_flight: None,
            deferred: None,
            commands,
        };
        let task = tokio::spawn(coordinator.run());
        CoordinatorHandle { sender, task: Some(task) }
    }

    async fn run(mut self) {
        component_debug!(Component::Coordinator, "Coordinator started (debounce {:?})", self.settings.debounce);

        loop {
            let timer = wait_for_timer(&mut self.pending);
            let save = wait_for_save(&mut self.in_flight);

            tokio::select! {
                command = self.commands.recv() => match command {
                    Some(Command::Shutdown) | None => break,
                    Some(command) => self.handle_command(command),
                },

                _ = timer => self.fire_pending(),

                result = save => {
                    let success = result.unwrap_or_else(|e| {
                        component_error!(Component::Coordinator, "Save task failed: {}", e);
                        false
                    });
                    self.complete_save(success);
                },
            }
        }

        if self.pending.take().is_some() {
            component_debug!(Component::Coordinator, "Pending auto-save cancelled by teardown");
        }
        if self.in_flight.is_some() {
            component_debug!(Component::Coordinator, "Leaving in-flight save to finish on its own");
        }
        component_debug!(Component::Coordinator, "Coordinator stopped");
    }

    fn handle_command(&mut self, command: Command) {
        match command {
            Command::Changed(records) => self.on_change(records),
            Command::SetProject(project) => {
                self.pending = None;
                self.deferred = None;
                component_debug!(Component::Coordinator, "Project set to {:?}", project.as_ref().map(ProjectId::as_str));
                self.state.switch_project(project);
            }
            Command::InitialLoadFinished(loaded) => {
                self.state.finish_initial_load(&loaded);
                component_debug!(Component::Coordinator, "Initial load complete ({} records)", loaded.len());
            }
            Command::SaveNow { records, reply } => self.save_now(records, reply),
            Command::Status { reply } => {
                let _ = reply.send(self.status());
            }
            Command::Shutdown => {}
        }
    }

    fn status(&self) -> CoordinatorStatus {
        CoordinatorStatus {
            project: self.state.project.clone(),
            initial_load_complete: self.state.initial_load_complete,
            is_saving: self.state.is_saving,
            save_pending: self.pending.is_some(),
            last_saved: self.state.last_saved.clone(),
        }
    }

    fn on_change(&mut self, records: Vec<Investor>) {
        // A newer change always supersedes the scheduled one
        self.pending = None;

        match self.state.evaluate_change(&records) {
            ChangeDecision::Schedule(_) => {
                self.pending = Some(PendingSave {
                    timer: Box::pin(sleep(self.settings.debounce)),
                    records,
                });
            }
            ChangeDecision::Skip(SkipReason::SaveInFlight) => {
                component_debug!(Component::Coordinator, "Auto-save deferred: save in flight");
                self.deferred = Some(records);
            }
            ChangeDecision::Skip(reason) => {
                component_debug!(Component::Coordinator, "Auto-save skipped: {:?}", reason);
            }
            ChangeDecision::Blocked(error) => {
                component_error!(Component::Coordinator, "Auto-save blocked: {}", error);
                self.notifier.notify(
                    Notice::error("Auto-save blocked: incomplete data")
                        .with_description("Some investor records are incomplete. Nothing was written to prevent data loss."),
                );
            }
        }
    }

    fn fire_pending(&mut self) {
        let Some(PendingSave { records, .. }) = self.pending.take() else {
            return;
        };

        // Re-check: a manual save may have written this state meanwhile
        match self.state.evaluate_change(&records) {
            ChangeDecision::Schedule(fingerprint) => {
                component_info!(Component::Coordinator, "💾 Auto-saving {} records", records.len());
                self.start_save(records, fingerprint, None);
            }
            ChangeDecision::Skip(SkipReason::SaveInFlight) => self.deferred = Some(records),
            other => {
                component_debug!(Component::Coordinator, "Auto-save dropped at fire time: {:?}", other);
            }
        }
    }

    fn save_now(&mut self, records: Vec<Investor>, reply: oneshot::Sender<BoardResult<()>>) {
        if self.state.is_saving {
            component_warn!(Component::Coordinator, "Manual save refused: a save is already running");
            let _ = reply.send(Err(BoardError::SaveInFlight));
            return;
        }

        if self.state.project.is_none() {
            self.notifier.notify(
                Notice::error("Save not possible").with_description("No project id configured. Set one in the settings."),
            );
            let _ = reply.send(Err(BoardError::MissingProject));
            return;
        }

        if let Err(error) = validate_for_save(&records) {
            component_error!(Component::Coordinator, "Manual save blocked: {}", error);
            if !matches!(error, BoardError::EmptySequence) {
                self.notifier.notify(
                    Notice::error("Save blocked: incomplete data")
                        .with_description("Some investor records are incomplete. Nothing was written to prevent data loss."),
                );
            }
            let _ = reply.send(Err(error));
            return;
        }

        match Fingerprint::of(&records) {
            Ok(fingerprint) => {
                // The manual write covers whatever was scheduled
                self.pending = None;
                self.start_save(records, fingerprint, Some(reply));
            }
            Err(error) => {
                let _ = reply.send(Err(error));
            }
        }
    }

    fn start_save(&mut self, records: Vec<Investor>, fingerprint: Fingerprint, reply: Option<oneshot::Sender<BoardResult<()>>>) {
        let Some(project) = self.state.project.clone() else {
            if let Some(reply) = reply {
                let _ = reply.send(Err(BoardError::MissingProject));
            }
            return;
        };

        self.state.is_saving = true;
        let sync = Arc::clone(&self.sync);
        let handle = tokio::spawn(async move { sync.save(&records, &project).await });
        self.in_flight = Some(InFlightSave { handle, fingerprint, reply });
    }

    fn complete_save(&mut self, success: bool) {
        let Some(InFlightSave { fingerprint, reply, .. }) = self.in_flight.take() else {
            return;
        };

        self.state.finish_save(fingerprint, success);
        if success {
            component_debug!(Component::Coordinator, "Save acknowledged");
        } else {
            component_warn!(Component::Coordinator, "Save failed; fingerprint left stale for the next attempt");
        }

        if let Some(reply) = reply {
            let _ = reply.send(if success { Ok(()) } else { Err(BoardError::SaveFailed) });
        }

        if let Some(records) = self.deferred.take() {
            self.on_change(records);
        }
    }
}

async fn wait_for_timer(pending: &mut Option<PendingSave>) {
    match pending {
        Some(save) => save.timer.as_mut().await,
        None => pending_forever().await,
    }
}

async fn wait_for_save(in_flight: &mut Option<InFlightSave>) -> Result<bool, JoinError> {
    match in_flight {
        Some(save) => (&mut save.handle).await,
        None => pending_forever().await,
    }
}

/// Sending side of a running coordinator
pub struct CoordinatorHandle {
    sender: mpsc::UnboundedSender<Command>,
    task: Option<JoinHandle<()>>,
}

impl CoordinatorHandle {
    fn send(&self, command: Command) -> BoardResult<()> {
        self.sender.send(command).map_err(|_| BoardError::CoordinatorClosed)
    }

    pub fn changed(&self, records: Vec<Investor>) -> BoardResult<()> {
        self.send(Command::Changed(records))
    }

    pub fn set_project(&self, project: Option<ProjectId>) -> BoardResult<()> {
        self.send(Command::SetProject(project))
    }

    pub fn initial_load_finished(&self, loaded: Vec<Investor>) -> BoardResult<()> {
        self.send(Command::InitialLoadFinished(loaded))
    }

    /// Save immediately; fails fast with `SaveInFlight` if a save is running
    pub async fn save_now(&self, records: Vec<Investor>) -> BoardResult<()> {
        let (reply, response) = oneshot::channel();
        self.send(Command::SaveNow { records, reply })?;
        response.await.map_err(|_| BoardError::CoordinatorClosed)?
    }

    pub async fn status(&self) -> BoardResult<CoordinatorStatus> {
        let (reply, response) = oneshot::channel();
        self.send(Command::Status { reply })?;
        response.await.map_err(|_| BoardError::CoordinatorClosed)
    }

    /// Stop the task, cancelling a pending timer; in-flight saves finish detached
    pub async fn shutdown(&mut self) {
        let _ = self.send(Command::Shutdown);
        if let Some(task) = self.task.take() {
            if let Err(e) = task.await {
                component_error!(Component::Coordinator, "Coordinator task ended abnormally: {}", e);
            }
        }
    }

    pub fn is_running(&self) -> bool {
        self.task.as_ref().is_some_and(|task| !task.is_finished())
    }
}
