#![allow(dead_code)]

use async_trait::async_trait;
use kalenteribotti::components::{EventStore, StoredEvent};
use kalenteribotti::error::{google_calendar_error, BotResult};
use kalenteribotti::payload::{NormalizedEvent, Normalizer};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;

/// Mock calendar that records every event it is asked to create
#[derive(Debug, Default)]
pub struct MockEventStore {
    created: Mutex<Vec<NormalizedEvent>>,
    /// Fail calls for events with this summary
    fail_summary: Option<(String, String)>,
    /// Sleep this long before answering
    delay: Option<Duration>,
}

impl MockEventStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reject events named `summary` with `message`
    pub fn failing_on(summary: &str, message: &str) -> Self {
        Self {
            fail_summary: Some((summary.to_string(), message.to_string())),
            ..Self::default()
        }
    }

    pub fn slow(delay: Duration) -> Self {
        Self {
            delay: Some(delay),
            ..Self::default()
        }
    }

    /// Events that reached the calendar, in call order
    pub async fn created(&self) -> Vec<NormalizedEvent> {
        self.created.lock().await.clone()
    }
}

#[async_trait]
impl EventStore for MockEventStore {
    async fn create_event(&self, event: &NormalizedEvent) -> BotResult<StoredEvent> {
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }

        if let Some((summary, message)) = &self.fail_summary {
            if &event.summary == summary {
                return Err(google_calendar_error(message));
            }
        }

        let mut created = self.created.lock().await;
        created.push(event.clone());

        Ok(StoredEvent {
            id: format!("event{}", created.len()),
            link: None,
        })
    }
}

/// A normalizer over `store` with a generous timeout
pub fn normalizer_with(store: &Arc<MockEventStore>) -> Normalizer {
    Normalizer::new(store.clone(), Duration::from_secs(5))
}
