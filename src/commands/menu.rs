use crate::commands::{dispatch, CommandResult, Context};
use kalenteribotti::conversation::Trigger;

/// Show the main menu
#[poise::command(slash_command, prefix_command)]
pub async fn start(ctx: Context<'_>) -> CommandResult {
    dispatch(ctx, Trigger::Start).await
}

/// Add calendar events from a JSON message
#[poise::command(slash_command, prefix_command)]
pub async fn add(ctx: Context<'_>) -> CommandResult {
    dispatch(ctx, Trigger::AddEvent).await
}

/// Stop waiting for an event payload
#[poise::command(slash_command, prefix_command)]
pub async fn cancel(ctx: Context<'_>) -> CommandResult {
    dispatch(ctx, Trigger::Cancel).await
}
