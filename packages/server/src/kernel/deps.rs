//! Server dependencies for domain actions (using traits for testability)
//!
//! Every collaborator of the join action is a trait object, so actions run
//! the same against Postgres and against the in-memory doubles in
//! `test_dependencies`.

use sqlx::PgPool;
use std::sync::Arc;

use crate::domains::meetings::PgMeetingStore;
use crate::domains::participatory_spaces::PgSpaceDirectory;
use crate::kernel::{
    BaseEventPublisher, BaseMeetingStore, BaseSpaceDirectory, EventsManager, NotificationHub,
};

/// Server dependencies accessible to actions
#[derive(Clone)]
pub struct ServerDeps {
    pub meeting_store: Arc<dyn BaseMeetingStore>,
    pub space_directory: Arc<dyn BaseSpaceDirectory>,
    pub event_publisher: Arc<dyn BaseEventPublisher>,
}

impl ServerDeps {
    /// Create new ServerDeps with the given dependencies
    pub fn new(
        meeting_store: Arc<dyn BaseMeetingStore>,
        space_directory: Arc<dyn BaseSpaceDirectory>,
        event_publisher: Arc<dyn BaseEventPublisher>,
    ) -> Self {
        Self {
            meeting_store,
            space_directory,
            event_publisher,
        }
    }

    /// Wire every dependency to Postgres, fanning notifications out on `hub`
    pub fn postgres(pool: PgPool, hub: NotificationHub) -> Self {
        Self::new(
            Arc::new(PgMeetingStore::new(pool.clone())),
            Arc::new(PgSpaceDirectory::new(pool.clone())),
            Arc::new(EventsManager::new(pool, hub)),
        )
    }
}
