//! Events manager - publishes notification events to their recipients.
//!
//! Publishing persists one `notifications` row per recipient (single
//! transaction) and then fans the event out on the in-process
//! [`NotificationHub`]. Delivery beyond that (email, push) belongs to the
//! surrounding application.

use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use tracing::{debug, info};
use typed_builder::TypedBuilder;
use uuid::Uuid;

use crate::common::{MeetingId, NotificationId, UserId};
use crate::kernel::{BaseEventPublisher, NotificationHub};

/// The resource an event is about (polymorphic reference)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResourceRef {
    pub resource_type: String,
    pub resource_id: Uuid,
}

impl ResourceRef {
    pub const MEETING: &'static str = "meeting";

    pub fn meeting(id: MeetingId) -> Self {
        Self {
            resource_type: Self::MEETING.to_string(),
            resource_id: id.into_uuid(),
        }
    }
}

/// An event ready to be published
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TypedBuilder)]
pub struct NotificationEvent {
    /// Event identifier, e.g. `decidim.events.meetings.meeting_registrations_over_fifty`
    #[builder(setter(into))]
    pub event: String,
    /// Class tag used by consumers to pick a renderer
    #[builder(setter(into))]
    pub event_class: String,
    pub resource: ResourceRef,
    pub recipient_ids: Vec<UserId>,
    /// Acting user
    #[builder(default, setter(strip_option))]
    pub user: Option<UserId>,
    #[builder(default = serde_json::Value::Object(Default::default()))]
    pub extra: serde_json::Value,
}

/// Persisted notification row (one per recipient)
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Notification {
    pub id: NotificationId,
    pub event_name: String,
    pub event_class: String,
    pub resource_type: String,
    pub resource_id: Uuid,
    pub user_id: UserId,
    pub actor_id: Option<UserId>,
    pub extra: serde_json::Value,
    pub created_at: DateTime<Utc>,
}

impl Notification {
    /// Notifications addressed to a user, newest first
    pub async fn find_for_user(user_id: UserId, pool: &PgPool) -> Result<Vec<Self>> {
        sqlx::query_as::<_, Self>(
            "SELECT * FROM notifications WHERE user_id = $1 ORDER BY created_at DESC",
        )
        .bind(user_id)
        .fetch_all(pool)
        .await
        .map_err(Into::into)
    }

    /// Notifications about a resource, oldest first
    pub async fn find_for_resource(resource: &ResourceRef, pool: &PgPool) -> Result<Vec<Self>> {
        sqlx::query_as::<_, Self>(
            "SELECT * FROM notifications
             WHERE resource_type = $1 AND resource_id = $2
             ORDER BY created_at ASC",
        )
        .bind(&resource.resource_type)
        .bind(resource.resource_id)
        .fetch_all(pool)
        .await
        .map_err(Into::into)
    }
}

/// Postgres + in-process hub publisher
#[derive(Clone)]
pub struct EventsManager {
    pool: PgPool,
    hub: NotificationHub,
}

impl EventsManager {
    pub fn new(pool: PgPool, hub: NotificationHub) -> Self {
        Self { pool, hub }
    }

    pub fn hub(&self) -> &NotificationHub {
        &self.hub
    }
}

#[async_trait]
impl BaseEventPublisher for EventsManager {
    async fn publish(&self, event: NotificationEvent) -> Result<()> {
        if event.recipient_ids.is_empty() {
            debug!(event = %event.event, "No recipients, skipping publish");
            return Ok(());
        }

        let mut tx = self.pool.begin().await?;

        sqlx::query(
            "INSERT INTO notifications
                (id, event_name, event_class, resource_type, resource_id, user_id, actor_id, extra)
             SELECT gen_random_uuid(), $1, $2, $3, $4, recipient, $6, $7
             FROM UNNEST($5::uuid[]) AS recipient",
        )
        .bind(&event.event)
        .bind(&event.event_class)
        .bind(&event.resource.resource_type)
        .bind(event.resource.resource_id)
        .bind(&event.recipient_ids)
        .bind(event.user)
        .bind(&event.extra)
        .execute(&mut *tx)
        .await
        .context("Failed to persist notifications")?;

        tx.commit().await?;

        for recipient in &event.recipient_ids {
            self.hub.publish(*recipient, &event).await;
        }

        info!(
            event = %event.event,
            resource_id = %event.resource.resource_id,
            recipients = event.recipient_ids.len(),
            "Event published"
        );

        Ok(())
    }
}
