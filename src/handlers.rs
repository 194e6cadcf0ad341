use crate::commands::CommandContext;
use kalenteribotti::conversation::{reply, Action, SessionKey, Trigger};
use kalenteribotti::error::Error;
use kalenteribotti::payload::Normalizer;
use poise::serenity_prelude as serenity;
use tracing::debug;

/// Custom id of the add-event button
pub const ADD_EVENT_ID: &str = "add_event";
/// Prefix for text commands; such messages belong to poise
pub const COMMAND_PREFIX: &str = "!";
/// Discord's limit for a single message
const MESSAGE_LIMIT: usize = 2000;

/// A message to send back to the user
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reply {
    pub content: String,
    /// Attach the add-event button
    pub with_menu: bool,
}

impl Reply {
    fn plain(content: String) -> Self {
        Self {
            content,
            with_menu: false,
        }
    }

    fn menu(content: String) -> Self {
        Self {
            content,
            with_menu: true,
        }
    }
}

/// The single-button keyboard under menu replies
pub fn menu_components() -> Vec<serenity::CreateActionRow> {
    vec![serenity::CreateActionRow::Buttons(vec![
        serenity::CreateButton::new(ADD_EVENT_ID)
            .label(reply::add_event_label())
            .style(serenity::ButtonStyle::Primary),
    ])]
}

/// Carry out an action from the state machine and produce the reply, if any
pub async fn resolve_action(action: Action, normalizer: &Normalizer) -> Option<Reply> {
    match action {
        Action::ShowMenu => Some(Reply::menu(reply::menu_text())),
        Action::PromptForPayload => Some(Reply::plain(reply::payload_prompt())),
        Action::Cancelled => Some(Reply::menu(reply::cancelled_text())),
        Action::ProcessPayload(text) => {
            let content = match normalizer.normalize(strip_code_fence(&text)).await {
                Ok(result) => reply::batch_report(&result),
                Err(e) => reply::payload_error_text(&e),
            };
            Some(Reply::menu(content))
        }
        Action::Ignore => None,
    }
}

/// Map a message's text to a trigger
pub fn message_trigger(content: &str) -> Trigger {
    let trimmed = content.trim();
    if trimmed.is_empty() || trimmed.starts_with(COMMAND_PREFIX) {
        Trigger::Other
    } else {
        Trigger::Text(content.to_string())
    }
}

/// Remove a surrounding ```json fence, as people tend to paste JSON that way
pub fn strip_code_fence(text: &str) -> &str {
    let trimmed = text.trim();
    let Some(inner) = trimmed
        .strip_prefix("```")
        .and_then(|rest| rest.strip_suffix("```"))
    else {
        return trimmed;
    };

    // Skip the language tag on the opening line
    match inner.split_once('\n') {
        Some((tag, body)) if !tag.trim_start().starts_with(['{', '[']) => body.trim(),
        _ => inner.trim(),
    }
}

/// Split text into chunks of at most `limit` characters, preferring line breaks
pub fn split_message(text: &str, limit: usize) -> Vec<String> {
    let mut chunks = Vec::new();
    let mut current = String::new();

    for mut line in text.split('\n') {
        while line.chars().count() > limit {
            let cut = line
                .char_indices()
                .nth(limit)
                .map(|(i, _)| i)
                .unwrap_or(line.len());
            if !current.is_empty() {
                chunks.push(std::mem::take(&mut current));
            }
            chunks.push(line[..cut].to_string());
            line = &line[cut..];
        }

        let separator = usize::from(!current.is_empty());
        if current.chars().count() + separator + line.chars().count() > limit {
            chunks.push(std::mem::take(&mut current));
        }
        if !current.is_empty() {
            current.push('\n');
        }
        current.push_str(line);
    }

    if !current.is_empty() || chunks.is_empty() {
        chunks.push(current);
    }

    chunks
}

/// Handle gateway events poise does not turn into commands
pub async fn event_handler(
    ctx: &serenity::Context,
    event: &serenity::FullEvent,
    _framework: poise::FrameworkContext<'_, CommandContext, Error>,
    data: &CommandContext,
) -> Result<(), Error> {
    match event {
        serenity::FullEvent::Message { new_message } => handle_message(ctx, new_message, data).await,
        serenity::FullEvent::InteractionCreate {
            interaction: serenity::Interaction::Component(component),
        } => handle_button(ctx, component, data).await,
        _ => Ok(()),
    }
}

async fn handle_message(
    ctx: &serenity::Context,
    message: &serenity::Message,
    data: &CommandContext,
) -> Result<(), Error> {
    if message.author.bot {
        return Ok(());
    }

    let key = SessionKey::new(message.channel_id.get(), message.author.id.get());
    let action = data
        .sessions
        .apply(key, message_trigger(&message.content))
        .await;

    if let Action::ProcessPayload(_) = &action {
        debug!("Processing payload from session {}", key);
        let _ = message.channel_id.broadcast_typing(&ctx.http).await;
    }

    if let Some(reply) = resolve_action(action, &data.normalizer).await {
        send_reply(ctx, message.channel_id, reply).await?;
    }

    Ok(())
}

async fn handle_button(
    ctx: &serenity::Context,
    component: &serenity::ComponentInteraction,
    data: &CommandContext,
) -> Result<(), Error> {
    if component.data.custom_id != ADD_EVENT_ID {
        return Ok(());
    }

    let key = SessionKey::new(component.channel_id.get(), component.user.id.get());
    let action = data.sessions.apply(key, Trigger::AddEvent).await;

    let response = match resolve_action(action, &data.normalizer).await {
        Some(reply) => serenity::CreateInteractionResponse::Message(
            serenity::CreateInteractionResponseMessage::new().content(reply.content),
        ),
        None => serenity::CreateInteractionResponse::Acknowledge,
    };
    component.create_response(&ctx.http, response).await?;

    Ok(())
}

/// Send a reply to a channel, split to fit, with the menu under the last part
async fn send_reply(
    ctx: &serenity::Context,
    channel_id: serenity::ChannelId,
    reply: Reply,
) -> Result<(), Error> {
    let chunks = split_message(&reply.content, MESSAGE_LIMIT);
    let last = chunks.len() - 1;

    for (i, chunk) in chunks.into_iter().enumerate() {
        let mut message = serenity::CreateMessage::new().content(chunk);
        if reply.with_menu && i == last {
            message = message.components(menu_components());
        }
        channel_id.send_message(&ctx.http, message).await?;
    }

    Ok(())
}
