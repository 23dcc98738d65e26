//! Postgres-backed meeting lock store.
//!
//! A lock is a transaction holding `SELECT ... FOR UPDATE` on the meeting
//! row. Registration inserts run on the same transaction, so they commit
//! together with the lock release and roll back if the guard is dropped.

use anyhow::Result;
use async_trait::async_trait;
use sqlx::{PgPool, Postgres, Transaction};
use thiserror::Error;
use tracing::debug;

use crate::common::{MeetingId, UserId};
use crate::domains::meetings::models::{Meeting, Registration};
use crate::kernel::{BaseMeetingStore, MeetingLock};

/// Store errors callers may want to match on (via `anyhow::Error::downcast_ref`)
#[derive(Debug, Error)]
pub enum MeetingStoreError {
    #[error("Meeting not found: {0}")]
    MeetingNotFound(MeetingId),
}

#[derive(Clone)]
pub struct PgMeetingStore {
    pool: PgPool,
}

impl PgMeetingStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl BaseMeetingStore for PgMeetingStore {
    async fn lock(&self, meeting_id: MeetingId) -> Result<Box<dyn MeetingLock>> {
        let mut tx = self.pool.begin().await?;

        let meeting = Meeting::find_for_update(meeting_id, &mut *tx)
            .await?
            .ok_or(MeetingStoreError::MeetingNotFound(meeting_id))?;

        debug!(%meeting_id, "Meeting row locked");

        Ok(Box::new(PgMeetingLock { tx, meeting }))
    }
}

pub struct PgMeetingLock {
    tx: Transaction<'static, Postgres>,
    meeting: Meeting,
}

#[async_trait]
impl MeetingLock for PgMeetingLock {
    fn meeting(&self) -> &Meeting {
        &self.meeting
    }

    async fn registrations_count(&mut self) -> Result<i64> {
        Meeting::registrations_count(self.meeting.id, &mut *self.tx).await
    }

    async fn create_registration(&mut self, user_id: UserId) -> Result<Registration> {
        Registration::create(self.meeting.id, user_id, &mut *self.tx).await
    }

    async fn release(self: Box<Self>) -> Result<()> {
        let meeting_id = self.meeting.id;
        self.tx.commit().await?;
        debug!(%meeting_id, "Meeting row lock released");
        Ok(())
    }
}
