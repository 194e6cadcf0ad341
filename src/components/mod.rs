use crate::error::BotResult;
use crate::payload::NormalizedEvent;
use async_trait::async_trait;

// Export components
pub mod google_calendar;

// Re-export Google Calendar handle
pub use google_calendar::GoogleCalendarHandle;

/// An event as acknowledged by the calendar backend
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct StoredEvent {
    /// Backend identifier of the new event
    pub id: String,
    /// Link to the event in the calendar UI, if the backend returns one
    pub link: Option<String>,
}

/// Calendar backend that new events are written to.
///
/// One instance is shared by every session, so implementations must be safe
/// to call concurrently. Calls are not idempotent: retrying a call that
/// timed out may create a duplicate.
#[async_trait]
pub trait EventStore: Send + Sync {
    /// Create a single event
    async fn create_event(&self, event: &NormalizedEvent) -> BotResult<StoredEvent>;
}
