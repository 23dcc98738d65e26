// Trait definitions for dependency injection
//
// The join action only talks to these seams. Postgres implementations live
// next to the models they query; in-memory doubles live in test_dependencies.
//
// Naming convention: Base* for trait names (e.g., BaseMeetingStore)

use anyhow::Result;
use async_trait::async_trait;

use crate::common::{MeetingId, ParticipatorySpaceId, UserId};
use crate::domains::meetings::models::{Meeting, Registration};
use crate::kernel::events::NotificationEvent;

// =============================================================================
// Meeting Store Trait (row-scoped exclusive lock)
// =============================================================================

#[async_trait]
pub trait BaseMeetingStore: Send + Sync {
    /// Acquire an exclusive lock on one meeting.
    ///
    /// Waits while another caller holds the lock for the same meeting. Locks
    /// on different meetings never contend. Fails if the meeting does not exist.
    async fn lock(&self, meeting_id: MeetingId) -> Result<Box<dyn MeetingLock>>;
}

/// Guard over a locked meeting.
///
/// Writes made through the guard become visible when `release` succeeds.
/// Dropping the guard without releasing discards them and frees the lock.
#[async_trait]
pub trait MeetingLock: Send {
    /// Meeting as read when the lock was taken
    fn meeting(&self) -> &Meeting;

    /// Number of registrations, including ones written through this guard
    async fn registrations_count(&mut self) -> Result<i64>;

    /// Remaining slots computed from a fresh count under the lock
    async fn remaining_slots(&mut self) -> Result<i32> {
        let count = self.registrations_count().await?;
        Ok(self.meeting().remaining_slots(count))
    }

    async fn create_registration(&mut self, user_id: UserId) -> Result<Registration>;

    /// Commit writes and release the lock
    async fn release(self: Box<Self>) -> Result<()>;
}

// =============================================================================
// Participatory Space Directory Trait
// =============================================================================

#[async_trait]
pub trait BaseSpaceDirectory: Send + Sync {
    /// Ids of every administrator of the given space
    async fn admin_ids(&self, space_id: ParticipatorySpaceId) -> Result<Vec<UserId>>;
}

// =============================================================================
// Event Publisher Trait (notification bus)
// =============================================================================

#[async_trait]
pub trait BaseEventPublisher: Send + Sync {
    /// Publish an event to its recipients
    async fn publish(&self, event: NotificationEvent) -> Result<()>;
}
