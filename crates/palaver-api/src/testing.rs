//! Fixtures shared by the unit tests.

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use anyhow::{Result, anyhow};
use chrono::{DateTime, TimeZone, Utc};
use uuid::Uuid;

use palaver_db::{ChatStore, Database};
use palaver_types::models::{Message, Participant};

use crate::clock::ManualClock;
use crate::state::AppState;

/// State over a fresh in-memory database and a hand-driven clock.
pub fn memory_state() -> (AppState, Arc<ManualClock>) {
    let start: DateTime<Utc> = Utc.with_ymd_and_hms(2024, 1, 1, 12, 0, 0).unwrap();
    let clock = Arc::new(ManualClock::new(start));
    let db = Database::open_in_memory().unwrap();
    let state = AppState::new(Arc::new(db), clock.clone(), Duration::from_secs(5));
    (state, clock)
}

/// Store whose every operation fails, counting the attempts.
#[derive(Default)]
pub struct FailingStore {
    pub calls: AtomicUsize,
}

impl FailingStore {
    fn fail<T>(&self) -> Result<T> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Err(anyhow!("store unavailable"))
    }
}

impl ChatStore for FailingStore {
    fn insert_participant(&self, _: &Participant) -> Result<bool> {
        self.fail()
    }

    fn find_participant(&self, _: &str) -> Result<Option<Participant>> {
        self.fail()
    }

    fn list_participants(&self) -> Result<Vec<Participant>> {
        self.fail()
    }

    fn touch_participant(&self, _: &str, _: DateTime<Utc>) -> Result<bool> {
        self.fail()
    }

    fn find_stale_participants(&self, _: DateTime<Utc>) -> Result<Vec<Participant>> {
        self.fail()
    }

    fn expire_participant(&self, _: &str, _: DateTime<Utc>, _: &Message) -> Result<bool> {
        self.fail()
    }

    fn insert_message(&self, _: &Message) -> Result<()> {
        self.fail()
    }

    fn find_message(&self, _: Uuid) -> Result<Option<Message>> {
        self.fail()
    }

    fn list_messages_visible_to(&self, _: &str, _: Option<u64>) -> Result<Vec<Message>> {
        self.fail()
    }

    fn delete_message_from(&self, _: Uuid, _: &str) -> Result<bool> {
        self.fail()
    }
}

/// Store that blocks for the given duration before answering anything.
pub struct SlowStore(pub Duration);

impl SlowStore {
    fn stall<T: Default>(&self) -> Result<T> {
        std::thread::sleep(self.0);
        Ok(T::default())
    }
}

impl ChatStore for SlowStore {
    fn insert_participant(&self, _: &Participant) -> Result<bool> {
        self.stall()
    }

    fn find_participant(&self, _: &str) -> Result<Option<Participant>> {
        self.stall()
    }

    fn list_participants(&self) -> Result<Vec<Participant>> {
        self.stall()
    }

    fn touch_participant(&self, _: &str, _: DateTime<Utc>) -> Result<bool> {
        self.stall()
    }

    fn find_stale_participants(&self, _: DateTime<Utc>) -> Result<Vec<Participant>> {
        self.stall()
    }

    fn expire_participant(&self, _: &str, _: DateTime<Utc>, _: &Message) -> Result<bool> {
        self.stall()
    }

    fn insert_message(&self, _: &Message) -> Result<()> {
        self.stall()
    }

    fn find_message(&self, _: Uuid) -> Result<Option<Message>> {
        self.stall()
    }

    fn list_messages_visible_to(&self, _: &str, _: Option<u64>) -> Result<Vec<Message>> {
        self.stall()
    }

    fn delete_message_from(&self, _: Uuid, _: &str) -> Result<bool> {
        self.stall()
    }
}

/// In-memory database that refuses to store messages; everything else works.
pub struct MessageWriteFailingStore(pub Database);

impl MessageWriteFailingStore {
    pub fn new() -> Self {
        Self(Database::open_in_memory().unwrap())
    }
}

impl ChatStore for MessageWriteFailingStore {
    fn insert_participant(&self, participant: &Participant) -> Result<bool> {
        self.0.insert_participant(participant)
    }

    fn find_participant(&self, name: &str) -> Result<Option<Participant>> {
        self.0.find_participant(name)
    }

    fn list_participants(&self) -> Result<Vec<Participant>> {
        self.0.list_participants()
    }

    fn touch_participant(&self, name: &str, seen_at: DateTime<Utc>) -> Result<bool> {
        self.0.touch_participant(name, seen_at)
    }

    fn find_stale_participants(&self, cutoff: DateTime<Utc>) -> Result<Vec<Participant>> {
        self.0.find_stale_participants(cutoff)
    }

    fn expire_participant(
        &self,
        name: &str,
        cutoff: DateTime<Utc>,
        notice: &Message,
    ) -> Result<bool> {
        self.0.expire_participant(name, cutoff, notice)
    }

    fn insert_message(&self, _: &Message) -> Result<()> {
        Err(anyhow!("message table unavailable"))
    }

    fn find_message(&self, id: Uuid) -> Result<Option<Message>> {
        self.0.find_message(id)
    }

    fn list_messages_visible_to(&self, viewer: &str, limit: Option<u64>) -> Result<Vec<Message>> {
        self.0.list_messages_visible_to(viewer, limit)
    }

    fn delete_message_from(&self, id: Uuid, from: &str) -> Result<bool> {
        self.0.delete_message_from(id, from)
    }
}
