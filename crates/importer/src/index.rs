//! Snapshot of the attendees already registered for an event, used to flag
//! rows that would create duplicates.
//!
//! The snapshot is taken once per event selection and never locked against
//! other writers: two imports running at the same time against the same
//! event can both pass validation for the same person.

use crate::canonical::normalize::{normalize_email, normalize_identification};
use crate::config::DEFAULT_INDEX_PAGE_SIZE;
use crate::traits::AttendeeApi;
use contracts::{Attendee, NormalizedEmail, PageQuery};
use std::collections::HashSet;
use tracing::{debug, info, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IndexSource {
    Fetched,
    /// The backend could not be reached; nothing is flagged as pre-existing.
    Unavailable,
}

#[derive(Debug, Clone)]
pub struct ExistingRecordIndex {
    event_id: i64,
    emails: HashSet<NormalizedEmail>,
    identifications: HashSet<String>,
    source: IndexSource,
}

impl ExistingRecordIndex {
    pub fn empty(event_id: i64) -> Self {
        Self {
            event_id,
            emails: HashSet::new(),
            identifications: HashSet::new(),
            source: IndexSource::Fetched,
        }
    }

    pub fn unavailable(event_id: i64) -> Self {
        Self {
            source: IndexSource::Unavailable,
            ..Self::empty(event_id)
        }
    }

    /// Builds an index from `(email, identification_number)` pairs.
    pub fn from_records<'a, I>(event_id: i64, records: I) -> Self
    where
        I: IntoIterator<Item = (&'a str, Option<&'a str>)>,
    {
        let mut index = Self::empty(event_id);
        for (email, identification) in records {
            index.insert(Some(email), identification);
        }
        index
    }

    /// Pages through the backend's attendee list for `event_id`.
    ///
    /// Never fails: if any page cannot be fetched the whole index degrades to
    /// [`IndexSource::Unavailable`], since a partial snapshot would silently
    /// miss duplicates on the pages that were not read.
    pub async fn fetch(api: &dyn AttendeeApi, event_id: i64, page_size: u32) -> Self {
        let page_size = if page_size == 0 {
            DEFAULT_INDEX_PAGE_SIZE
        } else {
            page_size
        };

        let mut index = Self::empty(event_id);
        let mut query = PageQuery::new(1, page_size);

        loop {
            let page = match api.list_attendees(event_id, query).await {
                Ok(page) => page,
                Err(e) => {
                    warn!(
                        "Could not load existing attendees for event {} (page {}): {}. \
                         Duplicate detection against the event is disabled.",
                        event_id, query.page, e
                    );
                    return Self::unavailable(event_id);
                }
            };

            debug!(
                "Attendee page {}/{} for event {}: {} row(s)",
                query.page,
                page.total_pages
                    .map(|t| t.to_string())
                    .unwrap_or_else(|| "?".to_string()),
                event_id,
                page.results.len()
            );

            for attendee in &page.results {
                index.insert_attendee(attendee);
            }

            if !page.has_more_after(query.page) {
                break;
            }
            query = query.next();
        }

        info!(
            "Loaded {} registered email(s) and {} document(s) for event {}",
            index.emails.len(),
            index.identifications.len(),
            event_id
        );

        index
    }

    /// Attendees belonging to other events are ignored, in case the backend
    /// does not honour the event filter.
    fn insert_attendee(&mut self, attendee: &Attendee) {
        if attendee.event != Some(self.event_id) {
            return;
        }
        self.insert(
            attendee.email.as_deref(),
            attendee.identification_number.as_deref(),
        );
    }

    fn insert(&mut self, email: Option<&str>, identification: Option<&str>) {
        if let Some(email) = email {
            let email = normalize_email(email);
            if !email.is_empty() {
                self.emails.insert(email);
            }
        }
        if let Some(number) = identification.and_then(normalize_identification) {
            self.identifications.insert(number);
        }
    }

    pub fn event_id(&self) -> i64 {
        self.event_id
    }

    pub fn source(&self) -> IndexSource {
        self.source
    }

    pub fn contains_email(&self, email: &NormalizedEmail) -> bool {
        self.emails.contains(email)
    }

    /// Expects an identification number already normalized.
    pub fn contains_identification(&self, number: &str) -> bool {
        self.identifications.contains(number)
    }

    pub fn email_count(&self) -> usize {
        self.emails.len()
    }

    pub fn identification_count(&self) -> usize {
        self.identifications.len()
    }
}
