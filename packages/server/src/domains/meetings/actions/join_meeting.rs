//! Join meeting action - registers a user for a meeting

use anyhow::Result;
use tracing::{debug, info};

use crate::common::{MeetingId, UserId};
use crate::domains::meetings::events::MeetingRegistrationsOverFifty;
use crate::domains::meetings::models::{occupied_slots_over, Meeting, Registration};
use crate::kernel::ServerDeps;

/// Occupancy at which space admins get notified
pub const REGISTRATIONS_NOTIFICATION_THRESHOLD: f64 = 0.5;

/// Outcome of a join attempt.
///
/// Callers only learn whether the join went through. Why a join was rejected
/// (registrations closed or meeting full) is deliberately not exposed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum JoinMeetingOutcome {
    Ok(Registration),
    Invalid,
}

impl JoinMeetingOutcome {
    pub fn is_ok(&self) -> bool {
        matches!(self, JoinMeetingOutcome::Ok(_))
    }

    pub fn registration(&self) -> Option<&Registration> {
        match self {
            JoinMeetingOutcome::Ok(registration) => Some(registration),
            JoinMeetingOutcome::Invalid => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Rejection {
    RegistrationsDisabled,
    NoSlotsAvailable,
}

fn rejection(meeting: &Meeting, remaining_slots: i32) -> Option<Rejection> {
    if meeting.can_join(remaining_slots) {
        None
    } else if !meeting.registrations_enabled {
        Some(Rejection::RegistrationsDisabled)
    } else {
        Some(Rejection::NoSlotsAvailable)
    }
}

/// Register `user_id` for `meeting_id`.
///
/// The eligibility check and the insert run under the meeting's exclusive
/// lock, so two joins racing for the last slot cannot both succeed. When the
/// join lands remaining slots exactly on `floor(available * 0.5)`, every
/// admin of the owning participatory space is notified, with the joining user
/// as actor. The admin lookup and publish also run under the lock, so if
/// either fails the guard is dropped and the registration rolls back.
///
/// Returns:
/// - `JoinMeetingOutcome::Ok` with the new registration
/// - `JoinMeetingOutcome::Invalid` if registrations are closed or no slot is left
/// - Error propagated on storage or publish failure; nothing is committed
pub async fn join_meeting(
    meeting_id: MeetingId,
    user_id: UserId,
    deps: &ServerDeps,
) -> Result<JoinMeetingOutcome> {
    debug!(%meeting_id, %user_id, "Joining meeting");

    let mut lock = deps.meeting_store.lock(meeting_id).await?;

    let remaining_slots = lock.remaining_slots().await?;
    if let Some(reason) = rejection(lock.meeting(), remaining_slots) {
        lock.release().await?;
        info!(%meeting_id, %user_id, ?reason, remaining_slots, "Join rejected");
        return Ok(JoinMeetingOutcome::Invalid);
    }

    let registration = lock.create_registration(user_id).await?;
    let remaining_slots = lock.remaining_slots().await?;

    if occupied_slots_over(
        lock.meeting().available_slots,
        remaining_slots,
        REGISTRATIONS_NOTIFICATION_THRESHOLD,
    ) {
        notify_space_admins(lock.meeting(), user_id, deps).await?;
    }

    let occupancy = lock.meeting().occupancy(remaining_slots);
    lock.release().await?;

    info!(
        %meeting_id,
        %user_id,
        registration_id = %registration.id,
        remaining_slots,
        occupancy,
        "Registration created"
    );

    Ok(JoinMeetingOutcome::Ok(registration))
}

async fn notify_space_admins(meeting: &Meeting, user_id: UserId, deps: &ServerDeps) -> Result<()> {
    let admin_ids = deps
        .space_directory
        .admin_ids(meeting.participatory_space_id)
        .await?;

    info!(
        meeting_id = %meeting.id,
        recipients = admin_ids.len(),
        "Meeting registrations over 50%, notifying space admins"
    );

    deps.event_publisher
        .publish(MeetingRegistrationsOverFifty::build(meeting, admin_ids, user_id))
        .await
}
