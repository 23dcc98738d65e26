//! Kernel module - server infrastructure and dependencies.

pub mod deps;
pub mod events;
pub mod notification_hub;
pub mod test_dependencies;
pub mod traits;

pub use deps::ServerDeps;
pub use events::{EventsManager, Notification, NotificationEvent, ResourceRef};
pub use notification_hub::NotificationHub;
pub use test_dependencies::{
    InMemoryMeetingStore, MockSpaceDirectory, SpyEventPublisher, TestDependencies,
};
pub use traits::*;
