//! Meetings domain - meeting registrations
//!
//! Architecture:
//!   caller → actions::join_meeting(meeting, user, &ServerDeps)
//!     → BaseMeetingStore (row lock) → BaseSpaceDirectory → BaseEventPublisher

pub mod actions;
pub mod events;
pub mod models;
pub mod store;

// Re-export commonly used types
pub use actions::{join_meeting, JoinMeetingOutcome};
pub use models::{Meeting, Registration};
pub use store::{MeetingStoreError, PgMeetingStore};
