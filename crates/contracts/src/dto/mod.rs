pub mod attendee;
pub mod common;
pub mod event;
