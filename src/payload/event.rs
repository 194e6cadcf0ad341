use super::draft::EventDraft;
use super::error::ItemError;
use crate::utils::time::{parse_iso8601, ParsedTimestamp};
use chrono::{DateTime, FixedOffset, LocalResult, NaiveDate, NaiveDateTime, TimeZone};
use chrono_tz::Tz;
use std::fmt;

/// Start or end of a normalized event
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventTime {
    /// Calendar date, no time of day and no zone
    Date(NaiveDate),
    /// Instant with an explicit UTC offset
    DateTime(DateTime<FixedOffset>),
}

impl EventTime {
    pub fn is_date(&self) -> bool {
        matches!(self, EventTime::Date(_))
    }
}

impl fmt::Display for EventTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EventTime::Date(date) => write!(f, "{}", date.format("%Y-%m-%d")),
            EventTime::DateTime(dt) => write!(f, "{}", dt.to_rfc3339()),
        }
    }
}

/// An event ready to be handed to the calendar
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NormalizedEvent {
    pub summary: String,
    pub start: EventTime,
    /// Absent only for timed events submitted without an end
    pub end: Option<EventTime>,
    /// IANA zone the user asked for, kept for timed events
    pub time_zone: Option<String>,
    pub description: Option<String>,
    pub location: Option<String>,
}

impl NormalizedEvent {
    /// Interpret a draft: parse both bounds, resolve their timezone and apply
    /// all-day coercion.
    ///
    /// All-day events always end up with date-only bounds and an `end` equal
    /// to `start` when none was given. Timed events keep a missing `end`
    /// missing.
    pub fn from_draft(draft: &EventDraft) -> Result<Self, ItemError> {
        let start = parse_bound("start", &draft.start)?;
        let end = draft
            .end
            .as_deref()
            .map(|raw| parse_bound("end", raw))
            .transpose()?;

        let start = resolve("start", start, draft)?;
        let mut end = end.map(|value| resolve("end", value, draft)).transpose()?;

        // Timed events need both bounds of the same kind
        if let Some(end) = end {
            if end.is_date() != start.is_date() {
                return Err(ItemError::InvalidField {
                    field: "end",
                    expected: if start.is_date() {
                        "a date, like 'start'"
                    } else {
                        "a date-time, like 'start'"
                    },
                });
            }
        }

        if draft.all_day && end.is_none() {
            end = Some(start);
        }

        let time_zone = if draft.all_day {
            None
        } else {
            draft
                .timezone
                .as_deref()
                .and_then(|name| lookup_zone(name).ok())
                .map(|tz| tz.name().to_string())
        };

        Ok(Self {
            summary: draft.summary.clone(),
            start,
            end,
            time_zone,
            description: draft.description.clone(),
            location: draft.location.clone(),
        })
    }

    pub fn is_all_day(&self) -> bool {
        self.start.is_date()
    }
}

fn parse_bound(field: &'static str, raw: &str) -> Result<ParsedTimestamp, ItemError> {
    parse_iso8601(raw).ok_or_else(|| ItemError::UnparsableTimestamp {
        field,
        value: raw.to_string(),
    })
}

/// Apply the timezone policy to one parsed bound.
///
/// Dates and all-day bounds never consult the timezone. Values with an offset
/// keep it. Naive values take the offset of `timezone` at that local time and
/// are rejected when no timezone was given.
fn resolve(
    field: &'static str,
    parsed: ParsedTimestamp,
    draft: &EventDraft,
) -> Result<EventTime, ItemError> {
    if draft.all_day {
        let date = match parsed {
            ParsedTimestamp::Date(date) => date,
            ParsedTimestamp::Naive(naive) => naive.date(),
            ParsedTimestamp::Offset(dt) => dt.date_naive(),
        };
        return Ok(EventTime::Date(date));
    }

    match parsed {
        ParsedTimestamp::Date(date) => Ok(EventTime::Date(date)),
        ParsedTimestamp::Offset(dt) => {
            if let Some(name) = &draft.timezone {
                lookup_zone(name)?;
            }
            Ok(EventTime::DateTime(dt))
        }
        ParsedTimestamp::Naive(naive) => match &draft.timezone {
            Some(name) => attach_zone(field, naive, name).map(EventTime::DateTime),
            None => Err(ItemError::MissingTimezone { field }),
        },
    }
}

fn lookup_zone(name: &str) -> Result<Tz, ItemError> {
    name.trim()
        .parse::<Tz>()
        .map_err(|_| ItemError::UnknownTimezone(name.to_string()))
}

/// Pin a wall-clock time to a zone. A time repeated by a DST fold resolves to
/// its first occurrence; a time skipped by a DST gap is an error.
fn attach_zone(
    field: &'static str,
    naive: NaiveDateTime,
    name: &str,
) -> Result<DateTime<FixedOffset>, ItemError> {
    let tz = lookup_zone(name)?;
    match tz.from_local_datetime(&naive) {
        LocalResult::Single(dt) => Ok(dt.fixed_offset()),
        LocalResult::Ambiguous(first, second) => Ok(first.min(second).fixed_offset()),
        LocalResult::None => Err(ItemError::NonexistentLocalTime {
            field,
            value: naive.format("%Y-%m-%dT%H:%M:%S").to_string(),
            timezone: tz.name().to_string(),
        }),
    }
}
