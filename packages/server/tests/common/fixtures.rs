//! Test fixtures for creating test data.
//!
//! These fixtures use the model methods directly to create test data.

use anyhow::Result;
use server_core::common::UserId;
use server_core::domains::meetings::models::{CreateMeeting, Meeting};
use server_core::domains::participatory_spaces::{Component, ParticipatorySpace};
use sqlx::PgPool;

/// A space with its own meetings component and the given admins
pub struct SpaceFixture {
    pub space: ParticipatorySpace,
    pub component: Component,
    pub admins: Vec<UserId>,
}

pub async fn create_space_with_admins(pool: &PgPool, admin_count: usize) -> Result<SpaceFixture> {
    let space = ParticipatorySpace::create("Participatory budgeting 2026", pool).await?;
    let component = Component::create(space.id, "meetings", pool).await?;

    let mut admins = Vec::with_capacity(admin_count);
    for _ in 0..admin_count {
        let admin = UserId::new();
        ParticipatorySpace::add_admin(space.id, admin, pool).await?;
        admins.push(admin);
    }

    Ok(SpaceFixture {
        space,
        component,
        admins,
    })
}

pub async fn create_meeting(
    pool: &PgPool,
    fixture: &SpaceFixture,
    registrations_enabled: bool,
    available_slots: i32,
) -> Result<Meeting> {
    Meeting::create(
        CreateMeeting::builder()
            .component_id(fixture.component.id)
            .title("Neighbourhood assembly")
            .registrations_enabled(registrations_enabled)
            .available_slots(available_slots)
            .build(),
        pool,
    )
    .await
}

/// Insert `count` registrations by fresh users, bypassing the join action
pub async fn seed_registrations(pool: &PgPool, meeting: &Meeting, count: usize) -> Result<()> {
    for _ in 0..count {
        sqlx::query("INSERT INTO meeting_registrations (meeting_id, user_id) VALUES ($1, $2)")
            .bind(meeting.id)
            .bind(UserId::new())
            .execute(pool)
            .await?;
    }
    Ok(())
}
