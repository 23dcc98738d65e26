//! Typed ID definitions for the entities this service touches.

pub use super::id::Id;

// ============================================================================
// Entity marker types
// ============================================================================

/// Marker type for platform users (participants and admins alike).
pub struct User;

/// Marker type for Meeting entities.
pub struct Meeting;

/// Marker type for meeting Registration entities.
pub struct Registration;

/// Marker type for Component entities (feature instances inside a space).
pub struct Component;

/// Marker type for ParticipatorySpace entities.
pub struct ParticipatorySpace;

/// Marker type for persisted Notification rows.
pub struct Notification;

// ============================================================================
// Type aliases - the primary API
// ============================================================================

pub type UserId = Id<User>;
pub type MeetingId = Id<Meeting>;
pub type RegistrationId = Id<Registration>;
pub type ComponentId = Id<Component>;
pub type ParticipatorySpaceId = Id<ParticipatorySpace>;
pub type NotificationId = Id<Notification>;
