// TestDependencies - in-memory implementations for testing
//
// Provides doubles that can be injected into ServerDeps for tests. The
// meeting store keeps the same locking contract as Postgres: one async mutex
// per meeting, writes staged on the guard and applied on release.

use anyhow::{bail, Result};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::OwnedMutexGuard;

use super::{
    BaseEventPublisher, BaseMeetingStore, BaseSpaceDirectory, MeetingLock, NotificationEvent,
    ServerDeps,
};
use crate::common::{ComponentId, MeetingId, ParticipatorySpaceId, UserId};
use crate::domains::meetings::models::{Meeting, Registration};
use crate::domains::meetings::MeetingStoreError;

// =============================================================================
// In-memory Meeting Store
// =============================================================================

struct MeetingRecord {
    meeting: Meeting,
    registrations: Vec<Registration>,
}

#[derive(Clone, Default)]
pub struct InMemoryMeetingStore {
    meetings: Arc<Mutex<HashMap<MeetingId, Arc<tokio::sync::Mutex<MeetingRecord>>>>>,
    /// Pause between reading the meeting and handing out the guard, to widen
    /// race windows in concurrency tests
    hold: Option<Duration>,
}

impl InMemoryMeetingStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_hold(mut self, hold: Duration) -> Self {
        self.hold = Some(hold);
        self
    }

    /// Add a meeting owned by `space_id` and return it
    pub fn add_meeting(
        &self,
        space_id: ParticipatorySpaceId,
        registrations_enabled: bool,
        available_slots: i32,
    ) -> Meeting {
        let meeting = Meeting {
            id: MeetingId::new(),
            component_id: ComponentId::new(),
            participatory_space_id: space_id,
            title: "Test meeting".to_string(),
            registrations_enabled,
            available_slots,
            created_at: chrono::Utc::now(),
        };
        self.meetings.lock().unwrap().insert(
            meeting.id,
            Arc::new(tokio::sync::Mutex::new(MeetingRecord {
                meeting: meeting.clone(),
                registrations: Vec::new(),
            })),
        );
        meeting
    }

    /// Seed existing registrations (e.g. to start a meeting half full)
    pub async fn seed_registrations(&self, meeting_id: MeetingId, count: usize) {
        let record = self.record(meeting_id).expect("unknown meeting");
        let mut record = record.lock().await;
        for _ in 0..count {
            record
                .registrations
                .push(Registration::new(meeting_id, UserId::new()));
        }
    }

    /// Committed registrations for a meeting
    pub async fn registrations(&self, meeting_id: MeetingId) -> Vec<Registration> {
        let Some(record) = self.record(meeting_id) else {
            return Vec::new();
        };
        let record = record.lock().await;
        record.registrations.clone()
    }

    /// Remaining slots as a fresh reader would see them
    pub async fn remaining_slots(&self, meeting_id: MeetingId) -> i32 {
        let record = self.record(meeting_id).expect("unknown meeting");
        let record = record.lock().await;
        record
            .meeting
            .remaining_slots(record.registrations.len() as i64)
    }

    fn record(&self, meeting_id: MeetingId) -> Option<Arc<tokio::sync::Mutex<MeetingRecord>>> {
        self.meetings.lock().unwrap().get(&meeting_id).cloned()
    }
}

#[async_trait]
impl BaseMeetingStore for InMemoryMeetingStore {
    async fn lock(&self, meeting_id: MeetingId) -> Result<Box<dyn MeetingLock>> {
        let record = self
            .record(meeting_id)
            .ok_or(MeetingStoreError::MeetingNotFound(meeting_id))?;
        let guard = record.lock_owned().await;
        let meeting = guard.meeting.clone();

        if let Some(hold) = self.hold {
            tokio::time::sleep(hold).await;
        }

        Ok(Box::new(InMemoryMeetingLock {
            guard,
            meeting,
            staged: Vec::new(),
        }))
    }
}

struct InMemoryMeetingLock {
    guard: OwnedMutexGuard<MeetingRecord>,
    meeting: Meeting,
    staged: Vec<Registration>,
}

#[async_trait]
impl MeetingLock for InMemoryMeetingLock {
    fn meeting(&self) -> &Meeting {
        &self.meeting
    }

    async fn registrations_count(&mut self) -> Result<i64> {
        Ok((self.guard.registrations.len() + self.staged.len()) as i64)
    }

    async fn create_registration(&mut self, user_id: UserId) -> Result<Registration> {
        let registration = Registration::new(self.meeting.id, user_id);
        self.staged.push(registration.clone());
        Ok(registration)
    }

    async fn release(self: Box<Self>) -> Result<()> {
        let InMemoryMeetingLock {
            mut guard, staged, ..
        } = *self;
        guard.registrations.extend(staged);
        Ok(())
    }
}

// =============================================================================
// Mock Space Directory
// =============================================================================

#[derive(Clone, Default)]
pub struct MockSpaceDirectory {
    admins: Arc<Mutex<HashMap<ParticipatorySpaceId, Vec<UserId>>>>,
}

impl MockSpaceDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_admins(self, space_id: ParticipatorySpaceId, admins: Vec<UserId>) -> Self {
        self.admins.lock().unwrap().insert(space_id, admins);
        self
    }
}

#[async_trait]
impl BaseSpaceDirectory for MockSpaceDirectory {
    async fn admin_ids(&self, space_id: ParticipatorySpaceId) -> Result<Vec<UserId>> {
        Ok(self
            .admins
            .lock()
            .unwrap()
            .get(&space_id)
            .cloned()
            .unwrap_or_default())
    }
}

// =============================================================================
// Spy Event Publisher
// =============================================================================

#[derive(Clone, Default)]
pub struct SpyEventPublisher {
    published: Arc<Mutex<Vec<NotificationEvent>>>,
    failing: Arc<AtomicBool>,
}

impl SpyEventPublisher {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every publish return an error (and record nothing) until reset
    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    /// All events published so far
    pub fn published(&self) -> Vec<NotificationEvent> {
        self.published.lock().unwrap().clone()
    }

    pub fn published_count(&self, event: &str) -> usize {
        self.published
            .lock()
            .unwrap()
            .iter()
            .filter(|e| e.event == event)
            .count()
    }
}

#[async_trait]
impl BaseEventPublisher for SpyEventPublisher {
    async fn publish(&self, event: NotificationEvent) -> Result<()> {
        if self.failing.load(Ordering::SeqCst) {
            bail!("event bus unavailable");
        }
        self.published.lock().unwrap().push(event);
        Ok(())
    }
}

// =============================================================================
// TestDependencies
// =============================================================================

/// Bundle of doubles; keep it around to inspect state after running an action
#[derive(Clone, Default)]
pub struct TestDependencies {
    pub meeting_store: InMemoryMeetingStore,
    pub space_directory: MockSpaceDirectory,
    pub event_publisher: SpyEventPublisher,
}

impl TestDependencies {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_meeting_store(mut self, store: InMemoryMeetingStore) -> Self {
        self.meeting_store = store;
        self
    }

    pub fn with_space_directory(mut self, directory: MockSpaceDirectory) -> Self {
        self.space_directory = directory;
        self
    }

    pub fn server_deps(&self) -> ServerDeps {
        ServerDeps::new(
            Arc::new(self.meeting_store.clone()),
            Arc::new(self.space_directory.clone()),
            Arc::new(self.event_publisher.clone()),
        )
    }
}
