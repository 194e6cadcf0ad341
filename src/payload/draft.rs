use super::error::ItemError;
use super::JsonObject;
use serde_json::Value;

/// Keys every event object must contain, in reporting order
pub const REQUIRED_FIELDS: [&str; 2] = ["summary", "start"];

/// One event object from the payload with its fields pulled out but not yet
/// interpreted
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EventDraft {
    pub summary: String,
    pub start: String,
    pub end: Option<String>,
    pub timezone: Option<String>,
    pub all_day: bool,
    pub description: Option<String>,
    pub location: Option<String>,
}

impl EventDraft {
    /// Extract a draft from a JSON object.
    ///
    /// Presence of `summary` and `start` is checked first and every missing
    /// key is reported together. `end` and `timezone` count as absent when
    /// they are `null` or empty.
    pub fn from_object(object: &JsonObject) -> Result<Self, ItemError> {
        let missing: Vec<&'static str> = REQUIRED_FIELDS
            .iter()
            .copied()
            .filter(|field| !object.contains_key(*field))
            .collect();
        if !missing.is_empty() {
            return Err(ItemError::MissingFields(missing));
        }

        let all_day = match object.get("all_day") {
            None | Some(Value::Null) => false,
            Some(Value::Bool(flag)) => *flag,
            Some(_) => {
                return Err(ItemError::InvalidField {
                    field: "all_day",
                    expected: "a boolean",
                })
            }
        };

        Ok(Self {
            summary: required_string(object, "summary")?,
            start: required_string(object, "start")?,
            end: optional_string(object, "end")?.filter(|v| !v.trim().is_empty()),
            timezone: optional_string(object, "timezone")?.filter(|v| !v.trim().is_empty()),
            all_day,
            description: optional_string(object, "description")?,
            location: optional_string(object, "location")?,
        })
    }
}

fn required_string(object: &JsonObject, field: &'static str) -> Result<String, ItemError> {
    match object.get(field) {
        Some(Value::String(value)) => Ok(value.clone()),
        _ => Err(ItemError::InvalidField {
            field,
            expected: "a string",
        }),
    }
}

fn optional_string(object: &JsonObject, field: &'static str) -> Result<Option<String>, ItemError> {
    match object.get(field) {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(value)) => Ok(Some(value.clone())),
        Some(_) => Err(ItemError::InvalidField {
            field,
            expected: "a string",
        }),
    }
}
