use crate::Result;
use contracts::{Attendee, CreateAttendeeRequest, Event, Page, PageQuery};

/// The slice of the events backend the import pipeline talks to.
///
/// The HTTP implementation lives in [`crate::api::EventsApiClient`]; tests
/// substitute an in-memory backend.
#[async_trait::async_trait]
pub trait AttendeeApi: Send + Sync {
    /// One page of attendees, filtered by event where the backend supports it.
    async fn list_attendees(&self, event_id: i64, query: PageQuery) -> Result<Page<Attendee>>;

    /// Creates a single attendee. A response carrying an `error` field is
    /// reported as [`crate::ImporterError::Rejected`].
    async fn create_attendee(&self, payload: &CreateAttendeeRequest) -> Result<()>;

    async fn list_events(&self) -> Result<Vec<Event>>;
}
