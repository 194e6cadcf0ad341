use crate::handlers::{menu_components, resolve_action};
use kalenteribotti::conversation::{SessionKey, SessionStore, Trigger};
use kalenteribotti::error::{BotResult, Error};
use kalenteribotti::payload::Normalizer;
use std::sync::Arc;

// Export submodules
pub mod menu;

/// Shared context for all commands and event handlers
#[derive(Debug)]
pub struct CommandContext {
    pub sessions: Arc<SessionStore>,
    pub normalizer: Normalizer,
}

/// Type alias for command result
pub type CommandResult = BotResult<()>;

/// Type alias for poise context
pub type Context<'a> = poise::Context<'a, CommandContext, Error>;

/// All application commands
pub fn get_all_application_commands() -> Vec<poise::Command<CommandContext, Error>> {
    vec![menu::start(), menu::add(), menu::cancel()]
}

/// Session of whoever invoked the command
fn session_key(ctx: Context<'_>) -> SessionKey {
    SessionKey::new(ctx.channel_id().get(), ctx.author().id.get())
}

/// Run a trigger through the invoker's session and answer with the result
async fn dispatch(ctx: Context<'_>, trigger: Trigger) -> CommandResult {
    let action = ctx.data().sessions.apply(session_key(ctx), trigger).await;

    if let Some(reply) = resolve_action(action, &ctx.data().normalizer).await {
        let mut builder = poise::CreateReply::default().content(reply.content);
        if reply.with_menu {
            builder = builder.components(menu_components());
        }
        ctx.send(builder).await?;
    }

    Ok(())
}
