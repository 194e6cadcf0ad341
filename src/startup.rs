use crate::commands::{get_all_application_commands, CommandContext};
use crate::{handlers, health, shutdown};
use kalenteribotti::components::GoogleCalendarHandle;
use kalenteribotti::config::Config;
use kalenteribotti::conversation::{spawn_sweeper, sweep_interval, SessionStore};
use kalenteribotti::error::{other_error, Error};
use kalenteribotti::payload::Normalizer;
use poise::serenity_prelude as serenity;
use std::sync::Arc;
use tokio::sync::oneshot;
use tokio_util::sync::CancellationToken;
use tracing::{error, info};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

/// Initialize logging with environment-based configuration
pub fn init_logging() -> miette::Result<()> {
    let subscriber = FmtSubscriber::builder()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info,serenity=warn,poise=warn")),
        )
        .finish();

    tracing::subscriber::set_global_default(subscriber)
        .map_err(|e| other_error(&format!("Failed to set up logging: {}", e)))?;

    Ok(())
}

/// Load and initialize the application config
pub async fn load_config() -> miette::Result<Arc<Config>> {
    match Config::load() {
        Ok(config) => Ok(Arc::new(config)),
        Err(e) => {
            error!("Failed to load configuration: {:?}", e);
            Err(e.into())
        }
    }
}

/// Initialize and start the Discord bot
pub async fn start_bot(config: Arc<Config>) -> miette::Result<()> {
    // Set locale from config
    rust_i18n::set_locale(&config.bot_locale);
    info!("Setting locale to {}", config.bot_locale);

    // Calendar backend shared by every session
    let calendar = GoogleCalendarHandle::new(&config)?;
    let normalizer = Normalizer::new(Arc::new(calendar.clone()), config.create_event_timeout());

    // Background tasks stop when this token is cancelled
    let background = CancellationToken::new();

    let sessions = Arc::new(SessionStore::new(config.session_idle_timeout()));
    let sweeper = spawn_sweeper(
        Arc::clone(&sessions),
        sweep_interval(config.session_idle_timeout()),
        background.clone(),
    );

    // Health check server
    let listener = health::bind(&config.health_addr).await?;
    let health_token = background.clone();
    tokio::spawn(async move {
        if let Err(e) = health::serve(listener, health_token).await {
            error!("Health check server error: {:?}", e);
        }
    });

    // Create shutdown channel and spawn signal handler task
    let (shutdown_send, shutdown_recv) = oneshot::channel();
    tokio::spawn(shutdown::handle_signals(
        shutdown_send,
        background.clone(),
        calendar.clone(),
    ));

    let command_data = CommandContext {
        sessions,
        normalizer,
    };

    // Set up framework options
    let options = poise::FrameworkOptions {
        commands: get_all_application_commands(),
        event_handler: |ctx, event, framework, data| {
            Box::pin(handlers::event_handler(ctx, event, framework, data))
        },
        on_error: |error| Box::pin(on_error(error)),
        prefix_options: poise::PrefixFrameworkOptions {
            prefix: Some(handlers::COMMAND_PREFIX.to_string()),
            ..Default::default()
        },
        ..Default::default()
    };

    // Payloads arrive as plain messages, so message content is needed
    let intents =
        serenity::GatewayIntents::non_privileged() | serenity::GatewayIntents::MESSAGE_CONTENT;

    let client_result = serenity::ClientBuilder::new(&config.discord_token, intents)
        .framework(poise::Framework::new(options, move |ctx, ready, framework| {
            Box::pin(async move {
                info!("{} is connected!", ready.user.name);

                // Register slash commands
                if let Err(e) =
                    poise::builtins::register_globally(ctx, &framework.options().commands).await
                {
                    error!("Failed to register slash commands: {:?}", e);
                } else {
                    info!("Slash commands registered successfully");
                }

                Ok(command_data)
            })
        }))
        .await;

    // Start the bot
    info!("Starting bot...");
    let mut client = client_result.map_err(Error::from)?;

    let shard_manager = client.shard_manager.clone();
    let client_handle = tokio::spawn(async move { client.start().await.map_err(Error::from) });

    // Wait for either the client to end or a shutdown signal
    let result: miette::Result<()> = tokio::select! {
        result = client_handle => {
            info!("Bot process ended");
            background.cancel();
            match result {
                Ok(Ok(())) => Ok(()),
                Ok(Err(e)) => Err(e.into()),
                Err(e) => {
                    error!("Client task error: {:?}", e);
                    Err(other_error(&format!("Client task error: {}", e)).into())
                }
            }
        }
        _ = shutdown_recv => {
            info!("Received shutdown signal, shutting down bot...");
            shard_manager.shutdown_all().await;
            Ok(())
        }
    };

    let _ = sweeper.await;
    result
}

/// Handle errors from commands and event handlers
async fn on_error(error: poise::FrameworkError<'_, CommandContext, Error>) {
    match error {
        poise::FrameworkError::Setup { error, .. } => {
            error!("Error during setup: {:?}", error);
        }
        poise::FrameworkError::Command { error, ctx, .. } => {
            error!("Error in command '{}': {:?}", ctx.command().name, error);
            if let Err(e) = ctx
                .send(
                    poise::CreateReply::default()
                        .content(error.to_string())
                        .ephemeral(true),
                )
                .await
            {
                error!("Error while sending error message: {:?}", e);
            }
        }
        poise::FrameworkError::EventHandler { error, event, .. } => {
            error!(
                "Error handling event {}: {:?}",
                event.snake_case_name(),
                error
            );
        }
        error => {
            error!("Other error: {:?}", error);
        }
    }
}
