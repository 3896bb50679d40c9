pub mod dto;
pub mod models;

pub use dto::attendee::{Attendee, CreateAttendeeRequest};
pub use dto::common::{Page, PageQuery};
pub use dto::event::{Event, EventList};
pub use models::{AttendanceMode, NormalizedEmail};
