use crate::submitter::CancelFlag;
use crate::traits::AttendeeApi;
use crate::{ImporterError, Result};
use async_trait::async_trait;
use contracts::{Attendee, CreateAttendeeRequest, Event, Page, PageQuery};
use std::collections::{HashMap, HashSet};
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CallEvent {
    Started(String),
    Finished(String),
}

/// In-memory backend recording every call it receives.
#[derive(Default)]
pub struct MockApi {
    existing: Vec<Attendee>,
    ignore_event_filter: bool,
    no_page_metadata: bool,
    fail_listing: bool,
    always_reject: HashSet<String>,
    transient_failures: Mutex<HashMap<String, u32>>,
    create_delay: Option<Duration>,
    delays: HashMap<String, Duration>,
    cancel_at: Option<(usize, CancelFlag)>,
    list_calls: AtomicUsize,
    create_calls: AtomicUsize,
    in_flight: AtomicUsize,
    max_in_flight: AtomicUsize,
    attempts: Mutex<HashMap<String, u32>>,
    log: Mutex<Vec<CallEvent>>,
    created: Mutex<Vec<CreateAttendeeRequest>>,
}

impl MockApi {
    pub fn with_existing(mut self, attendees: Vec<Attendee>) -> Self {
        self.existing = attendees;
        self
    }

    /// Listing returns attendees of every event, like a backend that
    /// ignores the `event` query parameter.
    pub fn ignoring_event_filter(mut self) -> Self {
        self.ignore_event_filter = true;
        self
    }

    pub fn without_page_metadata(mut self) -> Self {
        self.no_page_metadata = true;
        self
    }

    pub fn failing_listing(mut self) -> Self {
        self.fail_listing = true;
        self
    }

    pub fn rejecting(mut self, email: &str) -> Self {
        self.always_reject.insert(email.to_string());
        self
    }

    pub fn failing_times(self, email: &str, times: u32) -> Self {
        self.transient_failures
            .lock()
            .unwrap()
            .insert(email.to_string(), times);
        self
    }

    pub fn with_create_delay(mut self, delay: Duration) -> Self {
        self.create_delay = Some(delay);
        self
    }

    pub fn with_delay_for(mut self, email: &str, delay: Duration) -> Self {
        self.delays.insert(email.to_string(), delay);
        self
    }

    /// Raises `flag` when the `call`-th create request (1-based) starts.
    pub fn cancel_on_call(mut self, call: usize, flag: CancelFlag) -> Self {
        self.cancel_at = Some((call, flag));
        self
    }

    pub fn list_calls(&self) -> usize {
        self.list_calls.load(Ordering::SeqCst)
    }

    pub fn create_calls(&self) -> usize {
        self.create_calls.load(Ordering::SeqCst)
    }

    pub fn max_in_flight(&self) -> usize {
        self.max_in_flight.load(Ordering::SeqCst)
    }

    pub fn attempts(&self, email: &str) -> u32 {
        self.attempts
            .lock()
            .unwrap()
            .get(email)
            .copied()
            .unwrap_or(0)
    }

    pub fn log(&self) -> Vec<CallEvent> {
        self.log.lock().unwrap().clone()
    }

    pub fn created(&self) -> Vec<CreateAttendeeRequest> {
        self.created.lock().unwrap().clone()
    }

    fn outcome(&self, email: &str) -> Result<()> {
        if self.always_reject.contains(email) {
            return Err(ImporterError::Rejected(format!("{email} rejected")));
        }

        let mut transient = self.transient_failures.lock().unwrap();
        if let Some(remaining) = transient.get_mut(email) {
            if *remaining > 0 {
                *remaining -= 1;
                return Err(ImporterError::Rejected("temporarily unavailable".to_string()));
            }
        }
        Ok(())
    }
}

#[async_trait]
impl AttendeeApi for MockApi {
    async fn list_attendees(&self, event_id: i64, query: PageQuery) -> Result<Page<Attendee>> {
        self.list_calls.fetch_add(1, Ordering::SeqCst);

        if self.fail_listing {
            return Err(ImporterError::Rejected("503 Service Unavailable".to_string()));
        }

        let matching: Vec<Attendee> = self
            .existing
            .iter()
            .filter(|a| self.ignore_event_filter || a.event == Some(event_id))
            .cloned()
            .collect();

        let size = query.page_size as usize;
        let start = (query.page as usize - 1) * size;
        let results = matching.iter().skip(start).take(size).cloned().collect();
        let total_pages = if self.no_page_metadata {
            None
        } else {
            Some(matching.len().div_ceil(size).max(1) as u32)
        };

        Ok(Page::new(results, total_pages))
    }

    async fn create_attendee(&self, payload: &CreateAttendeeRequest) -> Result<()> {
        let call = self.create_calls.fetch_add(1, Ordering::SeqCst) + 1;
        if let Some((at, flag)) = &self.cancel_at {
            if call == *at {
                flag.cancel();
            }
        }

        let email = payload.email.clone();
        *self.attempts.lock().unwrap().entry(email.clone()).or_default() += 1;
        self.log
            .lock()
            .unwrap()
            .push(CallEvent::Started(email.clone()));

        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(now, Ordering::SeqCst);

        let delay = self.delays.get(&email).copied().or(self.create_delay);
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }

        self.in_flight.fetch_sub(1, Ordering::SeqCst);
        let result = self.outcome(&email);
        if result.is_ok() {
            self.created.lock().unwrap().push(payload.clone());
        }
        self.log.lock().unwrap().push(CallEvent::Finished(email));

        result
    }

    async fn list_events(&self) -> Result<Vec<Event>> {
        Ok(Vec::new())
    }
}
