pub mod meetings;
pub mod movies;

use crate::error::CommandError;
use crate::messaging::{allowed_mentions, MessageHandle, Messenger, Outgoing};
use crate::{Context, Data, Error};
use poise::serenity_prelude as serenity;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, error, warn};

/// Custom id of the button that shows the movie list.
pub const VIEW_LIST_BUTTON: &str = "view_list";

pub fn all() -> Vec<poise::Command<Data, Error>> {
    vec![
        movies::addmovie(),
        movies::listmovies(),
        movies::removemovie(),
        movies::watchedmovie(),
        movies::unwatchedmovie(),
        movies::randommovie(),
        meetings::meeting(),
        meetings::listmeetings(),
        meetings::removemeeting(),
    ]
}

pub(crate) fn guild_id(ctx: Context<'_>) -> Result<u64, Error> {
    Ok(ctx.guild_id().ok_or("Must be run in a guild")?.get())
}

pub fn view_list_row() -> serenity::CreateActionRow {
    let button = serenity::CreateButton::new(VIEW_LIST_BUTTON)
        .label("👁️ List")
        .style(serenity::ButtonStyle::Success);
    serenity::CreateActionRow::Buttons(vec![button])
}

/// A reply that cannot ping anyone, whatever user text it echoes.
pub fn quiet_reply() -> poise::CreateReply {
    poise::CreateReply::default().allowed_mentions(allowed_mentions(&[]))
}

/// Tells the invoking member why the command did nothing.
pub(crate) async fn reject(ctx: Context<'_>, err: CommandError) -> Result<(), Error> {
    match &err {
        CommandError::Persist(_) | CommandError::Messaging(_) => {
            error!("/{} failed: {}", ctx.command().name, err)
        }
        _ => debug!("/{} rejected: {}", ctx.command().name, err),
    }
    ctx.send(quiet_reply().content(err.user_message()).ephemeral(true))
        .await?;
    Ok(())
}

/// Public confirmation with the list button, deleted after the configured TTL.
pub(crate) async fn say_transient(ctx: Context<'_>, content: String) -> Result<(), Error> {
    let reply = ctx
        .send(
            quiet_reply()
                .content(content)
                .components(vec![view_list_row()]),
        )
        .await?;
    match reply.message().await {
        Ok(message) => delete_later(
            ctx.data().messenger.clone(),
            MessageHandle::from(&*message),
            ctx.data().config.confirmation_ttl,
        ),
        Err(e) => warn!("Could not resolve confirmation message: {}", e),
    }
    Ok(())
}

/// Re-renders the last list shown in `channel_id`, if any.
pub async fn refresh_list(data: &Data, channel_id: u64, guild_id: u64) {
    let Some(handle) = data.list_messages.get(channel_id) else {
        return;
    };
    let view = data.movie_view(guild_id).await;
    if let Err(e) = data
        .messenger
        .edit_message(handle, Outgoing::List(view))
        .await
    {
        warn!(
            "Failed to refresh list message {} in channel {}: {}",
            handle.message_id, channel_id, e
        );
        data.list_messages.forget(channel_id);
    }
}

pub fn delete_later(messenger: Arc<dyn Messenger>, handle: MessageHandle, ttl: Duration) {
    tokio::spawn(async move {
        tokio::time::sleep(ttl).await;
        if let Err(e) = messenger.delete_message(handle).await {
            warn!("Failed to delete message {}: {}", handle.message_id, e);
        }
    });
}
