/// Where a session is in the add-event flow
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SessionState {
    #[default]
    Idle,
    /// The next text message is the payload
    AwaitingPayload,
}

/// Inbound events from the chat transport
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Trigger {
    /// The start command
    Start,
    /// The add-event button or command
    AddEvent,
    /// The cancel command
    Cancel,
    /// A plain text message
    Text(String),
    /// Anything else (attachments, stickers, empty messages)
    Other,
}

/// What the transport should do after a transition
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    /// Show the main menu
    ShowMenu,
    /// Ask for a payload and show the examples
    PromptForPayload,
    /// Hand this text to the normalizer
    ProcessPayload(String),
    /// Confirm the cancellation
    Cancelled,
    /// Nothing to do
    Ignore,
}

/// Advance a session.
///
/// Start and cancel reset from any state. Exactly one text message is consumed
/// while awaiting a payload, whatever its content; the session is idle again
/// before the payload is even parsed.
pub fn transition(state: SessionState, trigger: Trigger) -> (SessionState, Action) {
    match (state, trigger) {
        (_, Trigger::Start) => (SessionState::Idle, Action::ShowMenu),
        (_, Trigger::AddEvent) => (SessionState::AwaitingPayload, Action::PromptForPayload),
        (_, Trigger::Cancel) => (SessionState::Idle, Action::Cancelled),
        (SessionState::AwaitingPayload, Trigger::Text(text)) => {
            (SessionState::Idle, Action::ProcessPayload(text))
        }
        (state, Trigger::Text(_) | Trigger::Other) => (state, Action::Ignore),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_start_resets() {
        assert_eq!(
            transition(SessionState::Idle, Trigger::Start),
            (SessionState::Idle, Action::ShowMenu)
        );
        assert_eq!(
            transition(SessionState::AwaitingPayload, Trigger::Start),
            (SessionState::Idle, Action::ShowMenu)
        );
    }

    #[test]
    fn test_add_event_awaits_payload() {
        assert_eq!(
            transition(SessionState::Idle, Trigger::AddEvent),
            (SessionState::AwaitingPayload, Action::PromptForPayload)
        );
        // Clicking again just shows the prompt again
        assert_eq!(
            transition(SessionState::AwaitingPayload, Trigger::AddEvent),
            (SessionState::AwaitingPayload, Action::PromptForPayload)
        );
    }

    #[test]
    fn test_text_consumed_once() {
        let (state, action) = transition(SessionState::AwaitingPayload, Trigger::Text("{}".into()));
        assert_eq!(state, SessionState::Idle);
        assert_eq!(action, Action::ProcessPayload("{}".into()));

        // The next message finds the session idle
        assert_eq!(
            transition(state, Trigger::Text("{}".into())),
            (SessionState::Idle, Action::Ignore)
        );
    }

    #[test]
    fn test_garbage_text_still_consumed() {
        let (state, action) =
            transition(SessionState::AwaitingPayload, Trigger::Text("not json".into()));
        assert_eq!(state, SessionState::Idle);
        assert_eq!(action, Action::ProcessPayload("not json".into()));
    }

    #[test]
    fn test_cancel() {
        assert_eq!(
            transition(SessionState::AwaitingPayload, Trigger::Cancel),
            (SessionState::Idle, Action::Cancelled)
        );
        assert_eq!(
            transition(SessionState::Idle, Trigger::Cancel),
            (SessionState::Idle, Action::Cancelled)
        );
    }

    #[test]
    fn test_other_messages_ignored() {
        assert_eq!(
            transition(SessionState::AwaitingPayload, Trigger::Other),
            (SessionState::AwaitingPayload, Action::Ignore)
        );
        assert_eq!(
            transition(SessionState::Idle, Trigger::Other),
            (SessionState::Idle, Action::Ignore)
        );
    }
}
