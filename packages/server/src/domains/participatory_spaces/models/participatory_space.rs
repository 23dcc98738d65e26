use anyhow::Result;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;

use crate::common::{ComponentId, ParticipatorySpaceId, UserId};

/// Participatory space - owns components (and through them, meetings)
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct ParticipatorySpace {
    pub id: ParticipatorySpaceId,
    pub title: String,
    pub created_at: DateTime<Utc>,
}

/// Component - a feature instance (e.g. "meetings") inside a space
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Component {
    pub id: ComponentId,
    pub participatory_space_id: ParticipatorySpaceId,
    pub manifest_name: String,
    pub created_at: DateTime<Utc>,
}

impl ParticipatorySpace {
    pub async fn create(title: &str, pool: &PgPool) -> Result<Self> {
        sqlx::query_as::<_, Self>(
            "INSERT INTO participatory_spaces (id, title) VALUES ($1, $2) RETURNING *",
        )
        .bind(ParticipatorySpaceId::new())
        .bind(title)
        .fetch_one(pool)
        .await
        .map_err(Into::into)
    }

    /// Grant admin rights on a space. Granting twice is a no-op.
    pub async fn add_admin(id: ParticipatorySpaceId, user_id: UserId, pool: &PgPool) -> Result<()> {
        sqlx::query(
            "INSERT INTO participatory_space_admins (participatory_space_id, user_id)
             VALUES ($1, $2)
             ON CONFLICT DO NOTHING",
        )
        .bind(id)
        .bind(user_id)
        .execute(pool)
        .await?;

        Ok(())
    }

    /// Admin user ids of a space (pluck)
    pub async fn admin_ids(id: ParticipatorySpaceId, pool: &PgPool) -> Result<Vec<UserId>> {
        sqlx::query_scalar::<_, UserId>(
            "SELECT user_id FROM participatory_space_admins
             WHERE participatory_space_id = $1
             ORDER BY created_at ASC",
        )
        .bind(id)
        .fetch_all(pool)
        .await
        .map_err(Into::into)
    }
}

impl Component {
    pub async fn create(
        space_id: ParticipatorySpaceId,
        manifest_name: &str,
        pool: &PgPool,
    ) -> Result<Self> {
        sqlx::query_as::<_, Self>(
            "INSERT INTO components (id, participatory_space_id, manifest_name)
             VALUES ($1, $2, $3)
             RETURNING *",
        )
        .bind(ComponentId::new())
        .bind(space_id)
        .bind(manifest_name)
        .fetch_one(pool)
        .await
        .map_err(Into::into)
    }
}
