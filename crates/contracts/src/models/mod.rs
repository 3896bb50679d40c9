mod attendance_mode;
mod normalized_email;

pub use attendance_mode::AttendanceMode;
pub use normalized_email::{NormalizedEmail, is_invisible};
