use crate::config::ApiConfig;
use crate::traits::AttendeeApi;
use crate::{ImporterError, Result};
use contracts::{Attendee, CreateAttendeeRequest, Event, EventList, Page, PageQuery};
use serde_json::Value;
use tracing::debug;
use validator::Validate;

/// HTTP client for the events backend REST API.
pub struct EventsApiClient {
    base_url: String,
    client: reqwest::Client,
}

impl EventsApiClient {
    pub fn new(config: &ApiConfig) -> Result<Self> {
        config.validate()?;

        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()?;

        Ok(Self {
            base_url: config.base_url.clone(),
            client,
        })
    }
}

#[async_trait::async_trait]
impl AttendeeApi for EventsApiClient {
    async fn list_attendees(&self, event_id: i64, query: PageQuery) -> Result<Page<Attendee>> {
        query.validate().map_err(ImporterError::ValidationError)?;

        let url = format!("{}/attendees/", self.base_url);
        debug!("GET {} page={} event={}", url, query.page, event_id);

        let response = self
            .client
            .get(&url)
            .query(&[
                ("page", query.page.to_string()),
                ("page_size", query.page_size.to_string()),
                ("event", event_id.to_string()),
            ])
            .send()
            .await?
            .error_for_status()?;

        let page = response.json::<Page<Attendee>>().await?;

        Ok(page)
    }

    async fn create_attendee(&self, payload: &CreateAttendeeRequest) -> Result<()> {
        payload.validate()?;

        let url = format!("{}/attendees/", self.base_url);
        let response = self.client.post(&url).json(payload).send().await?;

        let status = response.status();
        let body = response.text().await.unwrap_or_default();

        if let Some(message) = rejection_message(&body) {
            return Err(ImporterError::Rejected(message));
        }
        if !status.is_success() {
            return Err(ImporterError::Rejected(format!(
                "{} {}",
                status,
                body.trim()
            )));
        }

        Ok(())
    }

    async fn list_events(&self) -> Result<Vec<Event>> {
        let url = format!("{}/events/", self.base_url);

        let response = self.client.get(&url).send().await?.error_for_status()?;
        let events = response.json::<EventList>().await?;

        Ok(events.into_events())
    }
}

/// Extracts the backend's `{ "error": ... }` message, if the body carries one.
fn rejection_message(body: &str) -> Option<String> {
    let value: Value = serde_json::from_str(body).ok()?;

    match value.get("error")? {
        Value::Null => None,
        Value::String(message) => Some(message.clone()),
        other => Some(other.to_string()),
    }
}
