use crate::components::StoredEvent;
use crate::payload::{EventTime, NormalizedEvent};
use chrono::{Duration, NaiveDate};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Token endpoint used when the key file does not name one
pub const DEFAULT_TOKEN_URI: &str = "https://oauth2.googleapis.com/token";

fn default_token_uri() -> String {
    DEFAULT_TOKEN_URI.to_string()
}

/// The parts of a Google service account key file the bot needs
#[derive(Clone, Deserialize)]
pub struct ServiceAccountKey {
    pub client_email: String,
    pub private_key: String,
    #[serde(default = "default_token_uri")]
    pub token_uri: String,
}

impl fmt::Debug for ServiceAccountKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ServiceAccountKey")
            .field("client_email", &self.client_email)
            .field("private_key", &"<redacted>")
            .field("token_uri", &self.token_uri)
            .finish()
    }
}

/// Body of an `events.insert` request
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct EventResource {
    pub summary: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    pub start: EventDateTime,
    pub end: EventDateTime,
}

/// Start or end of an event in the API's shape
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct EventDateTime {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub date: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub date_time: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub time_zone: Option<String>,
}

impl EventDateTime {
    fn date(date: NaiveDate) -> Self {
        Self {
            date: Some(date.format("%Y-%m-%d").to_string()),
            date_time: None,
            time_zone: None,
        }
    }

    fn from_time(time: EventTime, time_zone: Option<&String>) -> Self {
        match time {
            EventTime::Date(date) => Self::date(date),
            EventTime::DateTime(dt) => Self {
                date: None,
                date_time: Some(dt.to_rfc3339()),
                time_zone: time_zone.cloned(),
            },
        }
    }
}

/// The API treats an all-day end date as exclusive
fn day_after(date: NaiveDate) -> NaiveDate {
    date.succ_opt().unwrap_or(date)
}

impl EventResource {
    /// Build the request body for a normalized event.
    ///
    /// All-day ends are inclusive on our side and shifted by one day here. A
    /// timed event without an end lasts one hour.
    pub fn from_event(event: &NormalizedEvent) -> Self {
        let time_zone = event.time_zone.as_ref();

        let end = match (event.end, event.start) {
            (Some(EventTime::Date(end)), _) => EventDateTime::date(day_after(end)),
            (Some(end), _) => EventDateTime::from_time(end, time_zone),
            (None, EventTime::Date(start)) => EventDateTime::date(day_after(start)),
            (None, EventTime::DateTime(start)) => {
                EventDateTime::from_time(EventTime::DateTime(start + Duration::hours(1)), time_zone)
            }
        };

        Self {
            summary: event.summary.clone(),
            description: event.description.clone(),
            location: event.location.clone(),
            start: EventDateTime::from_time(event.start, time_zone),
            end,
        }
    }
}

/// The fields of an `events.insert` response the bot uses
#[derive(Debug, Clone, Deserialize)]
pub struct InsertedEvent {
    pub id: String,
    #[serde(rename = "htmlLink")]
    pub html_link: Option<String>,
}

impl From<InsertedEvent> for StoredEvent {
    fn from(event: InsertedEvent) -> Self {
        StoredEvent {
            id: event.id,
            link: event.html_link,
        }
    }
}
