use serde::{Deserialize, Serialize};
use validator::Validate;

use super::common::lenient_id;
use crate::models::AttendanceMode;

/// Attendee as returned by the list endpoint. Only the fields the import
/// pipeline relies on are modelled; everything else is ignored.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Attendee {
    #[serde(default, deserialize_with = "lenient_id")]
    pub id: Option<i64>,
    #[serde(default, deserialize_with = "lenient_id")]
    pub event: Option<i64>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub identification_number: Option<String>,
}

/// Request payload for creating one attendee
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
pub struct CreateAttendeeRequest {
    pub event: i64,

    #[validate(length(max = 50))]
    pub identification_type: String,

    #[validate(length(max = 50))]
    pub identification_number: String,

    #[validate(length(
        min = 1,
        max = 255,
        message = "Name must be between 1 and 255 characters"
    ))]
    pub name: String,

    #[validate(length(
        min = 1,
        max = 255,
        message = "Company name must be between 1 and 255 characters"
    ))]
    pub company_name: String,

    #[validate(email(message = "Email is not a valid address"))]
    pub email: String,

    #[validate(length(max = 50))]
    pub phone: String,

    #[serde(rename = "asistencia")]
    pub attendance: Option<AttendanceMode>,
}
