use anyhow::Result;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{PgExecutor, PgPool};

use crate::common::{MeetingId, RegistrationId, UserId};

/// Registration model - links one user to one meeting
///
/// No uniqueness is enforced on (meeting_id, user_id) at this layer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Registration {
    pub id: RegistrationId,
    pub meeting_id: MeetingId,
    pub user_id: UserId,
    pub created_at: DateTime<Utc>,
}

impl Registration {
    /// Build an unsaved registration (used by stores that do not round-trip SQL)
    pub fn new(meeting_id: MeetingId, user_id: UserId) -> Self {
        Self {
            id: RegistrationId::new(),
            meeting_id,
            user_id,
            created_at: Utc::now(),
        }
    }

    /// Insert new registration
    pub async fn create<'e>(
        meeting_id: MeetingId,
        user_id: UserId,
        executor: impl PgExecutor<'e>,
    ) -> Result<Self> {
        sqlx::query_as::<_, Self>(
            "INSERT INTO meeting_registrations (id, meeting_id, user_id)
             VALUES ($1, $2, $3)
             RETURNING id, meeting_id, user_id, created_at",
        )
        .bind(RegistrationId::new())
        .bind(meeting_id)
        .bind(user_id)
        .fetch_one(executor)
        .await
        .map_err(Into::into)
    }

    /// All registrations for a meeting, oldest first
    pub async fn find_by_meeting(meeting_id: MeetingId, pool: &PgPool) -> Result<Vec<Self>> {
        sqlx::query_as::<_, Self>(
            "SELECT id, meeting_id, user_id, created_at
             FROM meeting_registrations
             WHERE meeting_id = $1
             ORDER BY created_at ASC",
        )
        .bind(meeting_id)
        .fetch_all(pool)
        .await
        .map_err(Into::into)
    }
}
