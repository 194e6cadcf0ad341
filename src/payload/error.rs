use std::time::Duration;
use thiserror::Error;

/// Failures that reject the whole message before any item is attempted
#[derive(Debug, Error)]
pub enum PayloadError {
    #[error("malformed JSON: {0}")]
    MalformedJson(#[from] serde_json::Error),

    #[error("item #{0} is not a JSON object")]
    NotAnObject(usize),

    #[error("expected a JSON object or an array of objects")]
    UnexpectedShape,
}

/// Failure of a single item in a batch. Never aborts the batch.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ItemError {
    #[error("missing required fields: {}", .0.join(", "))]
    MissingFields(Vec<&'static str>),

    #[error("field '{field}' must be {expected}")]
    InvalidField {
        field: &'static str,
        expected: &'static str,
    },

    #[error("'{field}' is not an ISO-8601 date or date-time: {value}")]
    UnparsableTimestamp { field: &'static str, value: String },

    #[error("unknown timezone: {0}")]
    UnknownTimezone(String),

    #[error("'{field}' ({value}) does not exist in timezone {timezone}")]
    NonexistentLocalTime {
        field: &'static str,
        value: String,
        timezone: String,
    },

    #[error("'{field}' has no timezone; add 'timezone' or an explicit offset (e.g. +01:00)")]
    MissingTimezone { field: &'static str },

    /// The calendar rejected the event; the message is shown as-is
    #[error("{0}")]
    Backend(String),

    #[error("calendar did not answer within {} seconds", .0.as_secs())]
    Timeout(Duration),
}

impl ItemError {
    /// Whether the item was rejected before reaching the calendar
    pub fn is_validation(&self) -> bool {
        !matches!(self, ItemError::Backend(_) | ItemError::Timeout(_))
    }
}
