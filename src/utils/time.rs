use chrono::{DateTime, FixedOffset, NaiveDate, NaiveDateTime, NaiveTime, TimeZone};

/// A timestamp as written by the user, before any timezone is applied
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParsedTimestamp {
    /// Calendar date with no time of day
    Date(NaiveDate),
    /// Date and time without an offset
    Naive(NaiveDateTime),
    /// Date and time with an explicit UTC offset
    Offset(DateTime<FixedOffset>),
}

const DATE_FORMATS: [&str; 2] = ["%Y-%m-%d", "%Y%m%d"];
const TIME_FORMATS: [&str; 4] = ["%H:%M:%S%.f", "%H:%M", "%H%M%S%.f", "%H%M"];

/// Parse an ISO-8601 date or date-time.
///
/// Accepts `YYYY-MM-DD` and `YYYYMMDD` dates, optionally followed by `T` (or a
/// space) and a time of `HH`, `HH:MM` or `HH:MM:SS[.fff]`. Times may end with `Z`
/// or a `±HH:MM`, `±HHMM`, `±HH` offset.
pub fn parse_iso8601(raw: &str) -> Option<ParsedTimestamp> {
    let value = raw.trim();

    // Fast path for the common full form
    if let Ok(dt) = DateTime::parse_from_rfc3339(value) {
        return Some(ParsedTimestamp::Offset(dt));
    }

    let (date_part, time_part) = match value.find(['T', 't', ' ']) {
        Some(pos) => (&value[..pos], Some(&value[pos + 1..])),
        None => (value, None),
    };

    let date = parse_date(date_part)?;
    let Some(time_part) = time_part else {
        return Some(ParsedTimestamp::Date(date));
    };

    let (clock, offset) = split_offset(time_part)?;
    let naive = date.and_time(parse_clock(clock.trim_end())?);

    match offset {
        Some(offset) => offset
            .from_local_datetime(&naive)
            .single()
            .map(ParsedTimestamp::Offset),
        None => Some(ParsedTimestamp::Naive(naive)),
    }
}

fn parse_date(value: &str) -> Option<NaiveDate> {
    DATE_FORMATS
        .iter()
        .find_map(|format| NaiveDate::parse_from_str(value, format).ok())
}

fn parse_clock(value: &str) -> Option<NaiveTime> {
    if value.is_empty() {
        return None;
    }
    // A bare hour is not something chrono parses on its own
    if value.len() == 2 && value.bytes().all(|b| b.is_ascii_digit()) {
        let hour = value.parse::<u32>().ok()?;
        return NaiveTime::from_hms_opt(hour, 0, 0);
    }
    TIME_FORMATS
        .iter()
        .find_map(|format| NaiveTime::parse_from_str(value, format).ok())
}

/// Split `09:00:00+01:00` into the clock part and its offset
fn split_offset(value: &str) -> Option<(&str, Option<FixedOffset>)> {
    if let Some(clock) = value.strip_suffix(['Z', 'z']) {
        return Some((clock, FixedOffset::east_opt(0)));
    }

    match value.rfind(['+', '-']) {
        Some(pos) => {
            let offset = parse_offset(&value[pos..])?;
            Some((&value[..pos], Some(offset)))
        }
        None => Some((value, None)),
    }
}

/// Parse `+01:00`, `+0100` or `+01`
pub fn parse_offset(value: &str) -> Option<FixedOffset> {
    let (sign, digits) = match value.as_bytes().first()? {
        b'+' => (1, &value[1..]),
        b'-' => (-1, &value[1..]),
        _ => return None,
    };

    let digits = digits.replacen(':', "", 1);
    if !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }

    let (hours, minutes) = match digits.len() {
        2 => (digits.parse::<i32>().ok()?, 0),
        4 => (digits[..2].parse::<i32>().ok()?, digits[2..].parse::<i32>().ok()?),
        _ => return None,
    };

    if hours > 23 || minutes > 59 {
        return None;
    }

    FixedOffset::east_opt(sign * (hours * 3600 + minutes * 60))
}
