//! Turning user-supplied JSON into calendar events.
//!
//! A payload is one JSON object or an array of objects. Shape problems reject
//! the whole message; everything after that is decided per item, and a failed
//! item never stops the ones after it.

mod draft;
mod error;
mod event;

pub use draft::{EventDraft, REQUIRED_FIELDS};
pub use error::{ItemError, PayloadError};
pub use event::{EventTime, NormalizedEvent};

use crate::components::{EventStore, StoredEvent};
use crate::error::Error;
use serde_json::Value;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::timeout;
use tracing::{debug, error, info, warn};

/// A JSON object from the payload
pub type JsonObject = serde_json::Map<String, Value>;

/// Example of a timed event, shown when asking for a payload
pub const EXAMPLE_TIMED: &str = r#"{
  "summary": "Standup",
  "description": "Daily sync",
  "start": "2025-03-05T09:00:00+01:00",
  "end":   "2025-03-05T09:15:00+01:00",
  "timezone": "Europe/Vienna",
  "all_day": false
}"#;

/// Example of an all-day event, shown when asking for a payload
pub const EXAMPLE_ALL_DAY: &str = r#"{
  "summary": "Conference day 1",
  "start": "2025-03-10",
  "end":   "2025-03-11",
  "all_day": true
}"#;

/// One failed item, with its 1-based position in the payload
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ItemFailure {
    pub index: usize,
    pub error: ItemError,
}

impl fmt::Display for ItemFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}: {}", self.index, self.error)
    }
}

/// Outcome of one payload
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BatchResult {
    /// Number of events the calendar accepted
    pub created: usize,
    /// Failed items in input order
    pub errors: Vec<ItemFailure>,
}

impl BatchResult {
    /// Neither created nor failed anything (an empty array)
    pub fn is_empty(&self) -> bool {
        self.created == 0 && self.errors.is_empty()
    }
}

/// Parse raw text and split it into candidate objects.
///
/// A single object becomes a one-element batch. Any non-object element in an
/// array rejects the whole payload.
pub fn parse_payload(raw: &str) -> Result<Vec<JsonObject>, PayloadError> {
    let value: Value = serde_json::from_str(raw)?;

    match value {
        Value::Object(object) => Ok(vec![object]),
        Value::Array(items) => items
            .into_iter()
            .enumerate()
            .map(|(i, item)| match item {
                Value::Object(object) => Ok(object),
                _ => Err(PayloadError::NotAnObject(i + 1)),
            })
            .collect(),
        _ => Err(PayloadError::UnexpectedShape),
    }
}

/// Normalizes payloads and submits the resulting events to the calendar
#[derive(Clone)]
pub struct Normalizer {
    store: Arc<dyn EventStore>,
    create_timeout: Duration,
}

impl fmt::Debug for Normalizer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Normalizer")
            .field("create_timeout", &self.create_timeout)
            .finish()
    }
}

impl Normalizer {
    /// Create a normalizer writing to `store`, giving each create call at most
    /// `create_timeout`
    pub fn new(store: Arc<dyn EventStore>, create_timeout: Duration) -> Self {
        Self {
            store,
            create_timeout,
        }
    }

    /// Process one message: parse it, then normalize and submit every item in
    /// order. Only whole-payload problems are returned as `Err`.
    pub async fn normalize(&self, raw_text: &str) -> Result<BatchResult, PayloadError> {
        let candidates = parse_payload(raw_text).inspect_err(|e| {
            info!("Rejected payload: {}", e);
        })?;

        let mut result = BatchResult::default();

        for (i, object) in candidates.iter().enumerate() {
            let index = i + 1;
            match self.submit(object).await {
                Ok(stored) => {
                    debug!(
                        "Item #{} created as event {} ({})",
                        index,
                        stored.id,
                        stored.link.as_deref().unwrap_or("no link")
                    );
                    result.created += 1;
                }
                Err(error) => {
                    if error.is_validation() {
                        warn!("Item #{} rejected: {}", index, error);
                    } else {
                        error!("Item #{} failed in the calendar: {}", index, error);
                    }
                    result.errors.push(ItemFailure { index, error });
                }
            }
        }

        info!(
            "Processed batch of {}: {} created, {} failed",
            candidates.len(),
            result.created,
            result.errors.len()
        );

        Ok(result)
    }

    /// Validate one item and, if it is well-formed, create it
    async fn submit(&self, object: &JsonObject) -> Result<StoredEvent, ItemError> {
        let draft = EventDraft::from_object(object)?;
        let event = NormalizedEvent::from_draft(&draft)?;

        match timeout(self.create_timeout, self.store.create_event(&event)).await {
            Ok(Ok(stored)) => Ok(stored),
            Ok(Err(Error::GoogleCalendar(message))) => Err(ItemError::Backend(message)),
            Ok(Err(e)) => Err(ItemError::Backend(e.to_string())),
            Err(_) => Err(ItemError::Timeout(self.create_timeout)),
        }
    }
}
