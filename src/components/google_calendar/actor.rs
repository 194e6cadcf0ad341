use super::models::{EventResource, InsertedEvent};
use super::token::TokenManager;
use crate::components::StoredEvent;
use crate::config::Config;
use crate::error::{google_calendar_error, BotResult};
use crate::payload::NormalizedEvent;
use reqwest::Client;
use serde_json::Value;
use tokio::sync::mpsc;
use tracing::{error, info, warn};
use url::Url;

/// The Google Calendar actor that processes messages
pub struct GoogleCalendarActor {
    api: EventsApi,
    command_rx: mpsc::Receiver<GoogleCalendarCommand>,
}

/// What one insert needs, cloned into the task running it
#[derive(Clone)]
struct EventsApi {
    calendar_id: String,
    api_base: String,
    token_manager: TokenManager,
    client: Client,
}

/// Commands that can be sent to the Google Calendar actor
pub enum GoogleCalendarCommand {
    CreateEvent(NormalizedEvent, mpsc::Sender<BotResult<StoredEvent>>),
    Shutdown,
}

/// Handle for communicating with the Google Calendar actor
#[derive(Clone)]
pub struct GoogleCalendarActorHandle {
    command_tx: mpsc::Sender<GoogleCalendarCommand>,
}

impl GoogleCalendarActorHandle {
    /// Create an event in the calendar
    pub async fn create_event(&self, event: NormalizedEvent) -> BotResult<StoredEvent> {
        let (response_tx, mut response_rx) = mpsc::channel(1);
        self.command_tx
            .send(GoogleCalendarCommand::CreateEvent(event, response_tx))
            .await
            .map_err(|e| google_calendar_error(&format!("Actor mailbox error: {}", e)))?;

        response_rx
            .recv()
            .await
            .ok_or_else(|| google_calendar_error("Response channel closed"))?
    }

    /// Shutdown the actor
    pub async fn shutdown(&self) -> BotResult<()> {
        let _ = self.command_tx.send(GoogleCalendarCommand::Shutdown).await;
        Ok(())
    }
}

impl GoogleCalendarActor {
    /// Create a new actor and return its handle
    pub fn new(config: &Config) -> BotResult<(Self, GoogleCalendarActorHandle)> {
        let (command_tx, command_rx) = mpsc::channel(32);

        let client = Client::builder()
            .timeout(config.create_event_timeout())
            .build()
            .map_err(|e| google_calendar_error(&format!("Failed to build HTTP client: {}", e)))?;

        let actor = Self {
            api: EventsApi {
                calendar_id: config.google_calendar_id.clone(),
                api_base: config.google_api_base.clone(),
                token_manager: TokenManager::new(config.service_account.clone(), client.clone()),
                client,
            },
            command_rx,
        };

        Ok((actor, GoogleCalendarActorHandle { command_tx }))
    }

    /// Start the actor's processing loop
    pub async fn run(&mut self) {
        info!("Google Calendar actor started");

        while let Some(cmd) = self.command_rx.recv().await {
            match cmd {
                GoogleCalendarCommand::CreateEvent(event, response_tx) => {
                    // Inserts run side by side so one slow request does not
                    // eat into the time budget of the ones queued behind it
                    tokio::spawn(self.api.clone().create(event, response_tx));
                }
                GoogleCalendarCommand::Shutdown => {
                    info!("Google Calendar actor shutting down");
                    break;
                }
            }
        }

        info!("Google Calendar actor shut down");
    }
}

impl EventsApi {
    /// Insert an event and report back, unless the caller stops waiting first
    async fn create(self, event: NormalizedEvent, response_tx: mpsc::Sender<BotResult<StoredEvent>>) {
        if response_tx.is_closed() {
            warn!("Skipping event '{}': caller stopped waiting", event.summary);
            return;
        }

        tokio::select! {
            result = self.insert_event(&event) => {
                if let Err(e) = &result {
                    error!("Failed to create event '{}': {}", event.summary, e);
                }
                let _ = response_tx.send(result).await;
            }
            _ = response_tx.closed() => {
                warn!("Abandoned event '{}': caller stopped waiting", event.summary);
            }
        }
    }

    /// `POST {api_base}/calendars/{calendar_id}/events`
    fn events_url(&self) -> BotResult<Url> {
        let mut url = Url::parse(&self.api_base)
            .map_err(|e| google_calendar_error(&format!("Failed to parse URL: {}", e)))?;

        url.path_segments_mut()
            .map_err(|_| google_calendar_error("API base URL cannot hold a path"))?
            .pop_if_empty()
            .push("calendars")
            .push(&self.calendar_id)
            .push("events");

        Ok(url)
    }

    /// Insert one event into the calendar
    async fn insert_event(&self, event: &NormalizedEvent) -> BotResult<StoredEvent> {
        let url = self.events_url()?;
        let access_token = self.token_manager.get_token().await?;
        let body = EventResource::from_event(event);

        let response = self
            .client
            .post(url)
            .bearer_auth(access_token)
            .json(&body)
            .send()
            .await
            .map_err(|e| google_calendar_error(&format!("Failed to create event: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let error_body = response
                .text()
                .await
                .unwrap_or_else(|_| "Could not read error response".to_string());
            return Err(google_calendar_error(&format!(
                "HTTP {} - {}",
                status,
                api_error_message(&error_body)
            )));
        }

        let inserted: InsertedEvent = response
            .json()
            .await
            .map_err(|e| google_calendar_error(&format!("Failed to parse event response: {}", e)))?;

        info!("Created event {} ('{}')", inserted.id, event.summary);

        Ok(inserted.into())
    }
}

/// Pull `error.message` out of an API error body, falling back to the raw body
fn api_error_message(body: &str) -> String {
    serde_json::from_str::<Value>(body)
        .ok()
        .and_then(|v| {
            v.get("error")
                .and_then(|e| e.get("message"))
                .and_then(|m| m.as_str())
                .map(|m| m.to_string())
        })
        .unwrap_or_else(|| body.trim().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_api_error_message() {
        let body = r#"{"error": {"code": 403, "message": "Rate Limit Exceeded", "errors": []}}"#;
        assert_eq!(api_error_message(body), "Rate Limit Exceeded");
        assert_eq!(api_error_message("  Bad Gateway\n"), "Bad Gateway");
    }
}
