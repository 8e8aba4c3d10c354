use crate::commands::{
    guild_id, quiet_reply, refresh_list, reject, say_transient, view_list_row,
};
use crate::error::{CommandError, CommandResult};
use crate::messaging::{list_embed, MessageHandle};
use crate::render::movie_line;
use crate::{Context, Error};
use tracing::warn;

const MAX_TITLE_CHARS: usize = 200;

/// Trims the title and checks it is neither blank nor longer than
/// `MAX_TITLE_CHARS`.
pub(crate) fn validate_title(raw: &str) -> CommandResult<&str> {
    let title = raw.trim();
    if title.is_empty() {
        return Err(CommandError::InvalidTitle(
            "Movie title cannot be empty.".to_string(),
        ));
    }
    if title.chars().count() > MAX_TITLE_CHARS {
        return Err(CommandError::InvalidTitle(format!(
            "Movie title is too long (max {} characters).",
            MAX_TITLE_CHARS
        )));
    }
    Ok(title)
}

/// Add a movie to the server list
#[poise::command(slash_command, guild_only)]
pub async fn addmovie(
    ctx: Context<'_>,
    #[description = "Movie title"] title: String,
) -> Result<(), Error> {
    let title = match validate_title(&title) {
        Ok(title) => title,
        Err(e) => return reject(ctx, e).await,
    };

    let guild_id = guild_id(ctx)?;
    let entry = match ctx
        .data()
        .movies
        .add(guild_id, title, ctx.author().id.get())
        .await
    {
        Ok(entry) => entry,
        Err(e) => return reject(ctx, e).await,
    };

    refresh_list(ctx.data(), ctx.channel_id().get(), guild_id).await;

    ctx.send(
        quiet_reply()
            .content(format!("✅ Added **{}** to the server list.", entry.title))
            .components(vec![view_list_row()])
            .ephemeral(true),
    )
    .await?;
    Ok(())
}

/// Show the server's movie list
#[poise::command(slash_command, guild_only)]
pub async fn listmovies(ctx: Context<'_>) -> Result<(), Error> {
    let guild_id = guild_id(ctx)?;
    let view = ctx.data().movie_view(guild_id).await;

    let reply = ctx
        .send(poise::CreateReply::default().embed(list_embed(&view)))
        .await?;
    match reply.message().await {
        Ok(message) => ctx
            .data()
            .list_messages
            .remember(MessageHandle::from(&*message)),
        Err(e) => warn!("Could not resolve list message: {}", e),
    }
    Ok(())
}

/// Remove a movie by its position in the list
#[poise::command(slash_command, guild_only)]
pub async fn removemovie(
    ctx: Context<'_>,
    #[description = "Position in the list"] index: i64,
) -> Result<(), Error> {
    let guild_id = guild_id(ctx)?;
    let removed = match ctx.data().movies.remove(guild_id, index).await {
        Ok(removed) => removed,
        Err(e) => return reject(ctx, e).await,
    };

    refresh_list(ctx.data(), ctx.channel_id().get(), guild_id).await;
    say_transient(
        ctx,
        format!("🗑️ Removed **{}** from the server list.", removed.title),
    )
    .await
}

/// Mark a movie as watched
#[poise::command(slash_command, guild_only)]
pub async fn watchedmovie(
    ctx: Context<'_>,
    #[description = "Position in the list"] index: i64,
) -> Result<(), Error> {
    set_watched(ctx, index, true).await
}

/// Mark a movie as not watched
#[poise::command(slash_command, guild_only)]
pub async fn unwatchedmovie(
    ctx: Context<'_>,
    #[description = "Position in the list"] index: i64,
) -> Result<(), Error> {
    set_watched(ctx, index, false).await
}

async fn set_watched(ctx: Context<'_>, index: i64, watched: bool) -> Result<(), Error> {
    let guild_id = guild_id(ctx)?;
    let entry = match ctx.data().movies.set_watched(guild_id, index, watched).await {
        Ok(entry) => entry,
        Err(e) => return reject(ctx, e).await,
    };

    refresh_list(ctx.data(), ctx.channel_id().get(), guild_id).await;
    let content = if watched {
        format!("✅ Marked **{}** as watched.", entry.title)
    } else {
        format!("🟥 Marked **{}** as not watched.", entry.title)
    };
    say_transient(ctx, content).await
}

/// Pick a random movie from the list
#[poise::command(slash_command, guild_only)]
pub async fn randommovie(ctx: Context<'_>) -> Result<(), Error> {
    let guild_id = guild_id(ctx)?;
    match ctx.data().movies.random_pick(guild_id).await {
        Ok((position, entry)) => {
            ctx.send(quiet_reply().content(format!(
                "🎲 Tonight's pick:\n{}",
                movie_line(position, &entry)
            )))
            .await?;
            Ok(())
        }
        Err(e) => reject(ctx, e).await,
    }
}
