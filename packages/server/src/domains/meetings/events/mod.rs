use crate::common::UserId;
use crate::domains::meetings::models::Meeting;
use crate::kernel::events::{NotificationEvent, ResourceRef};

/// Notification sent to space admins when half of a meeting's slots are taken.
pub struct MeetingRegistrationsOverFifty;

impl MeetingRegistrationsOverFifty {
    pub const EVENT: &'static str = "decidim.events.meetings.meeting_registrations_over_fifty";
    pub const EVENT_CLASS: &'static str = "MeetingRegistrationsOverFifty";

    pub fn subject(meeting: &Meeting) -> String {
        format!(
            "The meeting \"{}\" has over 50% of slots occupied",
            meeting.title
        )
    }

    pub fn build(meeting: &Meeting, recipient_ids: Vec<UserId>, user: UserId) -> NotificationEvent {
        NotificationEvent::builder()
            .event(Self::EVENT)
            .event_class(Self::EVENT_CLASS)
            .resource(ResourceRef::meeting(meeting.id))
            .recipient_ids(recipient_ids)
            .user(user)
            .extra(serde_json::json!({
                "resource_title": meeting.title,
                "subject": Self::subject(meeting),
                "available_slots": meeting.available_slots,
            }))
            .build()
    }
}
