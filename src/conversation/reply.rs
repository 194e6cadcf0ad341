//! User-facing text for every step of the conversation

use crate::payload::{BatchResult, PayloadError, EXAMPLE_ALL_DAY, EXAMPLE_TIMED};

/// Title of the main menu
pub fn menu_text() -> String {
    t!("menu_title").to_string()
}

/// Label of the single menu button
pub fn add_event_label() -> String {
    t!("menu_add_event").to_string()
}

/// Request for a payload, with one timed and one all-day example
pub fn payload_prompt() -> String {
    t!("prompt_payload", timed = EXAMPLE_TIMED, all_day = EXAMPLE_ALL_DAY).to_string()
}

pub fn cancelled_text() -> String {
    t!("cancelled").to_string()
}

/// Reply for a message that was rejected as a whole
pub fn payload_error_text(error: &PayloadError) -> String {
    match error {
        PayloadError::MalformedJson(_) => t!("payload_malformed_json").to_string(),
        PayloadError::NotAnObject(index) => {
            t!("payload_not_an_object", index = index.to_string()).to_string()
        }
        PayloadError::UnexpectedShape => t!("payload_unexpected_shape").to_string(),
    }
}

/// Summary of a processed batch: the success count, then one `#index: reason`
/// line per failed item
pub fn batch_report(result: &BatchResult) -> String {
    let mut parts = Vec::new();

    if result.created > 0 {
        parts.push(t!("report_created", count = result.created.to_string()).to_string());
    }

    if !result.errors.is_empty() {
        let errors = result
            .errors
            .iter()
            .map(|failure| failure.to_string())
            .collect::<Vec<_>>()
            .join("\n");
        parts.push(t!("report_errors", errors = errors).to_string());
    }

    if parts.is_empty() {
        parts.push(t!("report_nothing").to_string());
    }

    parts.join("\n\n")
}
