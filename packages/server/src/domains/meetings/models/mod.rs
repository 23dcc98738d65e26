pub mod meeting;
pub mod registration;

pub use meeting::{occupied_slots_over, CreateMeeting, Meeting};
pub use registration::Registration;
