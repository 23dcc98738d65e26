//! Join meeting against Postgres (row lock, persistence, notifications).
//!
//! Requires Docker: the harness starts a shared Postgres container.

mod common;

use std::sync::Arc;

use crate::common::{create_meeting, create_space_with_admins, seed_registrations, TestHarness};
use server_core::common::UserId;
use server_core::domains::meetings::events::MeetingRegistrationsOverFifty;
use server_core::domains::meetings::models::{Meeting, Registration};
use server_core::domains::meetings::{join_meeting, JoinMeetingOutcome, PgMeetingStore};
use server_core::domains::participatory_spaces::PgSpaceDirectory;
use server_core::kernel::{Notification, ResourceRef, ServerDeps, SpyEventPublisher};
use test_context::test_context;

async fn remaining_slots(ctx: &TestHarness, meeting: &Meeting) -> i32 {
    let count = Meeting::registrations_count(meeting.id, &ctx.db_pool)
        .await
        .expect("Failed to count registrations");
    meeting.remaining_slots(count)
}

#[test_context(TestHarness)]
#[tokio::test]
async fn join_persists_registration(ctx: &TestHarness) {
    let fixture = create_space_with_admins(&ctx.db_pool, 1).await.unwrap();
    let meeting = create_meeting(&ctx.db_pool, &fixture, true, 10).await.unwrap();
    let user = UserId::new();

    let outcome = join_meeting(meeting.id, user, &ctx.deps()).await.unwrap();

    let registration = outcome.registration().expect("join should succeed").clone();
    let stored = Registration::find_by_meeting(meeting.id, &ctx.db_pool)
        .await
        .unwrap();
    assert_eq!(stored, vec![registration]);
    assert_eq!(stored[0].user_id, user);
    assert_eq!(remaining_slots(ctx, &meeting).await, 9);
}

#[test_context(TestHarness)]
#[tokio::test]
async fn disabled_meeting_writes_nothing(ctx: &TestHarness) {
    let fixture = create_space_with_admins(&ctx.db_pool, 1).await.unwrap();
    let meeting = create_meeting(&ctx.db_pool, &fixture, false, 10).await.unwrap();

    let outcome = join_meeting(meeting.id, UserId::new(), &ctx.deps()).await.unwrap();

    assert_eq!(outcome, JoinMeetingOutcome::Invalid);
    assert!(Registration::find_by_meeting(meeting.id, &ctx.db_pool)
        .await
        .unwrap()
        .is_empty());
}

#[test_context(TestHarness)]
#[tokio::test]
async fn full_meeting_writes_nothing(ctx: &TestHarness) {
    let fixture = create_space_with_admins(&ctx.db_pool, 1).await.unwrap();
    let meeting = create_meeting(&ctx.db_pool, &fixture, true, 2).await.unwrap();
    seed_registrations(&ctx.db_pool, &meeting, 2).await.unwrap();

    let outcome = join_meeting(meeting.id, UserId::new(), &ctx.deps()).await.unwrap();

    assert_eq!(outcome, JoinMeetingOutcome::Invalid);
    assert_eq!(remaining_slots(ctx, &meeting).await, 0);
}

#[test_context(TestHarness)]
#[tokio::test]
async fn registrations_can_be_closed_after_opening(ctx: &TestHarness) {
    let fixture = create_space_with_admins(&ctx.db_pool, 1).await.unwrap();
    let meeting = create_meeting(&ctx.db_pool, &fixture, true, 10).await.unwrap();
    let deps = ctx.deps();

    assert!(join_meeting(meeting.id, UserId::new(), &deps).await.unwrap().is_ok());

    Meeting::set_registrations_enabled(meeting.id, false, &ctx.db_pool)
        .await
        .unwrap();

    assert!(!join_meeting(meeting.id, UserId::new(), &deps).await.unwrap().is_ok());
}

#[test_context(TestHarness)]
#[tokio::test]
async fn half_capacity_notifies_space_admins(ctx: &TestHarness) {
    let fixture = create_space_with_admins(&ctx.db_pool, 2).await.unwrap();
    let meeting = create_meeting(&ctx.db_pool, &fixture, true, 10).await.unwrap();
    seed_registrations(&ctx.db_pool, &meeting, 4).await.unwrap();
    let joiner = UserId::new();

    let mut inbox = ctx.hub.subscribe(fixture.admins[0]).await;

    // 6 remaining -> 5 remaining
    let outcome = join_meeting(meeting.id, joiner, &ctx.deps()).await.unwrap();
    assert!(outcome.is_ok());

    let notifications = Notification::find_for_resource(&ResourceRef::meeting(meeting.id), &ctx.db_pool)
        .await
        .unwrap();
    assert_eq!(notifications.len(), 2);
    for notification in &notifications {
        assert_eq!(notification.event_name, MeetingRegistrationsOverFifty::EVENT);
        assert_eq!(notification.event_class, MeetingRegistrationsOverFifty::EVENT_CLASS);
        assert_eq!(notification.actor_id, Some(joiner));
        assert!(fixture.admins.contains(&notification.user_id));
    }

    let admin_inbox = Notification::find_for_user(fixture.admins[1], &ctx.db_pool)
        .await
        .unwrap();
    assert_eq!(admin_inbox.len(), 1);
    assert_eq!(
        admin_inbox[0].extra["subject"],
        MeetingRegistrationsOverFifty::subject(&meeting)
    );

    let live = inbox.try_recv().expect("admin should get a live notification");
    assert_eq!(live.resource, ResourceRef::meeting(meeting.id));
    assert_eq!(live.user, Some(joiner));
}

#[test_context(TestHarness)]
#[tokio::test]
async fn past_half_capacity_does_not_notify(ctx: &TestHarness) {
    let fixture = create_space_with_admins(&ctx.db_pool, 2).await.unwrap();
    let meeting = create_meeting(&ctx.db_pool, &fixture, true, 10).await.unwrap();
    seed_registrations(&ctx.db_pool, &meeting, 5).await.unwrap();

    // 5 remaining -> 4 remaining
    let outcome = join_meeting(meeting.id, UserId::new(), &ctx.deps()).await.unwrap();
    assert!(outcome.is_ok());

    let notifications = Notification::find_for_resource(&ResourceRef::meeting(meeting.id), &ctx.db_pool)
        .await
        .unwrap();
    assert!(notifications.is_empty());
}

#[test_context(TestHarness)]
#[tokio::test]
async fn failed_notification_rolls_back_the_transaction(ctx: &TestHarness) {
    let fixture = create_space_with_admins(&ctx.db_pool, 1).await.unwrap();
    let meeting = create_meeting(&ctx.db_pool, &fixture, true, 2).await.unwrap();
    let publisher = SpyEventPublisher::new();
    publisher.set_failing(true);
    let deps = ServerDeps::new(
        Arc::new(PgMeetingStore::new(ctx.db_pool.clone())),
        Arc::new(PgSpaceDirectory::new(ctx.db_pool.clone())),
        Arc::new(publisher.clone()),
    );
    let user = UserId::new();

    // 2 remaining -> 1 remaining triggers the publish, which fails
    assert!(join_meeting(meeting.id, user, &deps).await.is_err());
    assert!(Registration::find_by_meeting(meeting.id, &ctx.db_pool)
        .await
        .unwrap()
        .is_empty());

    publisher.set_failing(false);
    assert!(join_meeting(meeting.id, user, &deps).await.unwrap().is_ok());

    let stored = Registration::find_by_meeting(meeting.id, &ctx.db_pool)
        .await
        .unwrap();
    assert_eq!(stored.len(), 1);
    assert_eq!(remaining_slots(ctx, &meeting).await, 1);
    assert_eq!(publisher.published().len(), 1);
}

#[test_context(TestHarness)]
#[tokio::test]
async fn racing_for_the_last_slot_books_it_once(ctx: &TestHarness) {
    let fixture = create_space_with_admins(&ctx.db_pool, 1).await.unwrap();
    let meeting = create_meeting(&ctx.db_pool, &fixture, true, 3).await.unwrap();
    seed_registrations(&ctx.db_pool, &meeting, 2).await.unwrap();
    let meeting_id = meeting.id;

    let handles: Vec<_> = (0..2)
        .map(|_| {
            let deps = ctx.deps();
            tokio::spawn(async move { join_meeting(meeting_id, UserId::new(), &deps).await })
        })
        .collect();

    let mut successes = 0;
    for handle in handles {
        if handle.await.unwrap().unwrap().is_ok() {
            successes += 1;
        }
    }

    assert_eq!(successes, 1);
    assert_eq!(remaining_slots(ctx, &meeting).await, 0);
}

#[test_context(TestHarness)]
#[tokio::test]
async fn same_user_can_register_twice(ctx: &TestHarness) {
    let fixture = create_space_with_admins(&ctx.db_pool, 1).await.unwrap();
    let meeting = create_meeting(&ctx.db_pool, &fixture, true, 10).await.unwrap();
    let deps = ctx.deps();
    let user = UserId::new();

    assert!(join_meeting(meeting.id, user, &deps).await.unwrap().is_ok());
    assert!(join_meeting(meeting.id, user, &deps).await.unwrap().is_ok());

    let stored = Registration::find_by_meeting(meeting.id, &ctx.db_pool)
        .await
        .unwrap();
    assert_eq!(stored.len(), 2);
    assert!(stored.iter().all(|r| r.user_id == user));
}
