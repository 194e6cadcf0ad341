use super::actor::{GoogleCalendarActor, GoogleCalendarActorHandle};
use crate::components::{EventStore, StoredEvent};
use crate::config::Config;
use crate::error::BotResult;
use crate::payload::NormalizedEvent;
use async_trait::async_trait;
use std::sync::Arc;
use tokio::task::JoinHandle;

/// Handle for interacting with the Google Calendar actor
#[derive(Clone)]
pub struct GoogleCalendarHandle {
    actor_handle: GoogleCalendarActorHandle,
    _actor_task: Arc<JoinHandle<()>>,
}

impl GoogleCalendarHandle {
    /// Create a new GoogleCalendarHandle and spawn the actor
    pub fn new(config: &Config) -> BotResult<Self> {
        // Create the actor and get its handle
        let (mut actor, handle) = GoogleCalendarActor::new(config)?;

        // Spawn a task to run the actor
        let actor_task = tokio::spawn(async move {
            actor.run().await;
        });

        Ok(Self {
            actor_handle: handle,
            _actor_task: Arc::new(actor_task),
        })
    }

    /// Shutdown the actor
    pub async fn shutdown(&self) -> BotResult<()> {
        self.actor_handle.shutdown().await
    }
}

#[async_trait]
impl EventStore for GoogleCalendarHandle {
    async fn create_event(&self, event: &NormalizedEvent) -> BotResult<StoredEvent> {
        self.actor_handle.create_event(event.clone()).await
    }
}
