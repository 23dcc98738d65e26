use anyhow::Result;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{PgExecutor, PgPool};
use tracing::warn;
use typed_builder::TypedBuilder;

use crate::common::{ComponentId, MeetingId, ParticipatorySpaceId};

/// Meeting model - SQL persistence layer
///
/// `participatory_space_id` is not a column on `meetings`; it is joined in
/// through the owning component so the join action can look up space admins
/// without a second round trip.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Meeting {
    pub id: MeetingId,
    pub component_id: ComponentId,
    pub participatory_space_id: ParticipatorySpaceId,
    pub title: String,
    pub registrations_enabled: bool,
    /// Fixed capacity
    pub available_slots: i32,
    pub created_at: DateTime<Utc>,
}

const SELECT_MEETING: &str = "SELECT m.id, m.component_id, c.participatory_space_id, m.title,
        m.registrations_enabled, m.available_slots, m.created_at
 FROM meetings m
 JOIN components c ON c.id = m.component_id";

#[derive(TypedBuilder)]
#[builder(field_defaults(setter(into)))]
pub struct CreateMeeting {
    pub component_id: ComponentId,
    pub title: String,
    #[builder(default = true)]
    pub registrations_enabled: bool,
    pub available_slots: i32,
}

impl Meeting {
    /// Remaining capacity given the current number of registrations.
    ///
    /// Clamped to `available_slots` so the remaining count can never exceed
    /// the capacity, and to zero if rows were inserted past capacity by
    /// another path. Overbooking is logged.
    pub fn remaining_slots(&self, registrations_count: i64) -> i32 {
        let remaining = i64::from(self.available_slots) - registrations_count;
        if remaining < 0 {
            warn!(
                meeting_id = %self.id,
                registrations_count,
                available_slots = self.available_slots,
                "Meeting is overbooked"
            );
        }
        remaining.min(i64::from(self.available_slots)).max(0) as i32
    }

    pub fn has_available_slots(&self, remaining_slots: i32) -> bool {
        remaining_slots > 0
    }

    /// Whether a new registration may be written right now.
    pub fn can_join(&self, remaining_slots: i32) -> bool {
        self.registrations_enabled && self.has_available_slots(remaining_slots)
    }

    /// Fraction of capacity filled: `1 - remaining / available`, or 0 for a
    /// meeting without capacity.
    pub fn occupancy(&self, remaining_slots: i32) -> f64 {
        if self.available_slots <= 0 {
            return 0.0;
        }
        1.0 - f64::from(remaining_slots) / f64::from(self.available_slots)
    }

    /// Find meeting by ID (with its owning space)
    pub async fn find_by_id(id: MeetingId, pool: &PgPool) -> Result<Self> {
        sqlx::query_as::<_, Self>(&format!("{SELECT_MEETING} WHERE m.id = $1"))
            .bind(id)
            .fetch_one(pool)
            .await
            .map_err(Into::into)
    }

    /// Find meeting by ID and take an exclusive row lock on it.
    ///
    /// Only meaningful inside a transaction: the lock is held until that
    /// transaction commits or rolls back.
    pub async fn find_for_update<'e>(
        id: MeetingId,
        executor: impl PgExecutor<'e>,
    ) -> Result<Option<Self>> {
        sqlx::query_as::<_, Self>(&format!(
            "{SELECT_MEETING} WHERE m.id = $1 FOR UPDATE OF m"
        ))
        .bind(id)
        .fetch_optional(executor)
        .await
        .map_err(Into::into)
    }

    /// Count registrations for a meeting
    pub async fn registrations_count<'e>(
        id: MeetingId,
        executor: impl PgExecutor<'e>,
    ) -> Result<i64> {
        let count: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM meeting_registrations WHERE meeting_id = $1")
                .bind(id)
                .fetch_one(executor)
                .await?;

        Ok(count)
    }

    /// Insert new meeting
    pub async fn create(input: CreateMeeting, pool: &PgPool) -> Result<Self> {
        let id: MeetingId = sqlx::query_scalar(
            "INSERT INTO meetings (id, component_id, title, registrations_enabled, available_slots)
             VALUES ($1, $2, $3, $4, $5)
             RETURNING id",
        )
        .bind(MeetingId::new())
        .bind(input.component_id)
        .bind(&input.title)
        .bind(input.registrations_enabled)
        .bind(input.available_slots)
        .fetch_one(pool)
        .await?;

        Self::find_by_id(id, pool).await
    }

    /// Toggle whether the meeting accepts registrations
    pub async fn set_registrations_enabled(id: MeetingId, enabled: bool, pool: &PgPool) -> Result<()> {
        sqlx::query("UPDATE meetings SET registrations_enabled = $2 WHERE id = $1")
            .bind(id)
            .bind(enabled)
            .execute(pool)
            .await?;

        Ok(())
    }
}

/// True when remaining slots sit exactly on `floor(available * (1 - percentage))`.
///
/// This is a point-in-time equality test, not a "reached or passed" check:
/// it only fires on the join that lands on the mark, so it relies on slots
/// going down one at a time.
pub fn occupied_slots_over(available_slots: i32, remaining_slots: i32, percentage: f64) -> bool {
    let mark = (f64::from(available_slots) * (1.0 - percentage)).floor() as i32;
    remaining_slots == mark
}
