//! Meetings domain actions - business logic functions
//!
//! Actions take their collaborators through `ServerDeps` and return plain
//! outcomes; storage errors go in `Result::Err`.

mod join_meeting;

pub use join_meeting::{join_meeting, JoinMeetingOutcome, REGISTRATIONS_NOTIFICATION_THRESHOLD};
