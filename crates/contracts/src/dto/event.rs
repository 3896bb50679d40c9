use serde::{Deserialize, Serialize};

use super::common::Page;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Event {
    pub id_event: i64,
    pub name: String,
}

/// The event endpoint answers either with a bare array or with the usual
/// paged envelope depending on the backend version.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum EventList {
    Bare(Vec<Event>),
    Paged(Page<Event>),
}

impl EventList {
    pub fn into_events(self) -> Vec<Event> {
        match self {
            EventList::Bare(events) => events,
            EventList::Paged(page) => page.results,
        }
    }
}
