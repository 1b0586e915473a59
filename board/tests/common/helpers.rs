//! Test helpers for board integration tests
//!
//! `RecordingRemote` stands in for the sync client: it keeps every save and
//! metadata note it receives, can be slowed down or made to fail, and tracks
//! how many saves overlap.

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::mpsc;

use board::{
    services::ChannelNotifier, Board, CoordinatorHandle, CoordinatorSettings, PersistenceCoordinator, RemoteSync,
    SharedNotifier,
};
use shared::{Investor, Notice, NoticeLevel, ProjectId};

use super::fixtures::TestFixtures;

#[derive(Default)]
pub struct RecordingRemote {
    stored: Mutex<Vec<Investor>>,
    saves: Mutex<Vec<Vec<Investor>>>,
    notes: Mutex<Vec<String>>,
    save_delay: Mutex<Duration>,
    fail_saves: AtomicBool,
    active: AtomicUsize,
    max_active: AtomicUsize,
}

impl RecordingRemote {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Remote already holding a board document
    pub fn with_stored(records: Vec<Investor>) -> Arc<Self> {
        let remote = Self::default();
        *remote.stored.lock().unwrap() = records;
        Arc::new(remote)
    }

    pub fn set_save_delay(&self, delay: Duration) {
        *self.save_delay.lock().unwrap() = delay;
    }

    pub fn set_failing(&self, failing: bool) {
        self.fail_saves.store(failing, Ordering::SeqCst);
    }

    pub fn saves(&self) -> Vec<Vec<Investor>> {
        self.saves.lock().unwrap().clone()
    }

    pub fn save_count(&self) -> usize {
        self.saves.lock().unwrap().len()
    }

    pub fn last_save(&self) -> Option<Vec<Investor>> {
        self.saves.lock().unwrap().last().cloned()
    }

    pub fn notes(&self) -> Vec<String> {
        self.notes.lock().unwrap().clone()
    }

    pub fn max_concurrent_saves(&self) -> usize {
        self.max_active.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl RemoteSync for RecordingRemote {
    async fn save(&self, records: &[Investor], _project: &ProjectId) -> bool {
        let active = self.active.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_active.fetch_max(active, Ordering::SeqCst);
        self.saves.lock().unwrap().push(records.to_vec());

        let delay = *self.save_delay.lock().unwrap();
        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }
        self.active.fetch_sub(1, Ordering::SeqCst);

        if self.fail_saves.load(Ordering::SeqCst) {
            return false;
        }
        *self.stored.lock().unwrap() = records.to_vec();
        true
    }

    async fn load(&self, _project: &ProjectId) -> Vec<Investor> {
        self.stored.lock().unwrap().clone()
    }

    async fn track_update(&self, note: &str, _project: &ProjectId) -> bool {
        self.notes.lock().unwrap().push(note.to_string());
        true
    }
}

/// Collects notices emitted through a `ChannelNotifier`
pub struct NoticeLog {
    receiver: mpsc::UnboundedReceiver<Notice>,
    seen: Vec<Notice>,
}

impl NoticeLog {
    pub fn new() -> (SharedNotifier, Self) {
        let (notifier, receiver) = ChannelNotifier::new();
        (Arc::new(notifier), Self { receiver, seen: Vec::new() })
    }

    /// Everything received so far
    pub fn collect(&mut self) -> &[Notice] {
        while let Ok(notice) = self.receiver.try_recv() {
            self.seen.push(notice);
        }
        &self.seen
    }

    pub fn titles(&mut self) -> Vec<String> {
        self.collect().iter().map(|notice| notice.title.clone()).collect()
    }

    pub fn errors(&mut self) -> Vec<Notice> {
        self.collect()
            .iter()
            .filter(|notice| notice.level == NoticeLevel::Error)
            .cloned()
            .collect()
    }

    pub fn clear(&mut self) {
        self.collect();
        self.seen.clear();
    }
}

pub struct TestHelpers;

impl TestHelpers {
    pub fn settings() -> CoordinatorSettings {
        CoordinatorSettings {
            debounce: TestFixtures::DEBOUNCE,
        }
    }

    /// Coordinator with a project selected and its initial load finished
    pub fn ready_coordinator(remote: &Arc<RecordingRemote>, loaded: Vec<Investor>) -> (CoordinatorHandle, NoticeLog) {
        let (notifier, log) = NoticeLog::new();
        let handle = PersistenceCoordinator::spawn(Arc::clone(remote), notifier, Self::settings());
        handle.set_project(Some(TestFixtures::project())).unwrap();
        handle.initial_load_finished(loaded).unwrap();
        (handle, log)
    }

    /// Board session opened on the test project
    pub async fn open_board(remote: &Arc<RecordingRemote>) -> (Board<RecordingRemote>, NoticeLog) {
        let (notifier, mut log) = NoticeLog::new();
        let mut board = Board::new(Arc::clone(remote), notifier, Self::settings());
        board.open_project(Some(TestFixtures::project())).await.unwrap();
        log.clear();
        (board, log)
    }

    /// Let the debounce window elapse with room to spare
    pub async fn past_debounce() {
        tokio::time::sleep(TestFixtures::DEBOUNCE + Duration::from_millis(100)).await;
    }

    /// Give spawned tasks a chance to run without moving far in time
    pub async fn settle() {
        tokio::time::sleep(Duration::from_millis(1)).await;
    }
}
