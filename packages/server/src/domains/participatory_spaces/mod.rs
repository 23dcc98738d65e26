//! Participatory spaces domain - spaces, their components and admins

pub mod models;

use anyhow::Result;
use async_trait::async_trait;
use sqlx::PgPool;

use crate::common::{ParticipatorySpaceId, UserId};
use crate::kernel::BaseSpaceDirectory;

pub use models::{Component, ParticipatorySpace};

/// Admin lookup backed by `participatory_space_admins`
#[derive(Clone)]
pub struct PgSpaceDirectory {
    pool: PgPool,
}

impl PgSpaceDirectory {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl BaseSpaceDirectory for PgSpaceDirectory {
    async fn admin_ids(&self, space_id: ParticipatorySpaceId) -> Result<Vec<UserId>> {
        ParticipatorySpace::admin_ids(space_id, &self.pool).await
    }
}
