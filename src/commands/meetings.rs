use crate::commands::{guild_id, quiet_reply, reject};
use crate::messaging::list_embed;
use crate::render::render_meetings;
use crate::{Context, Error};
use tracing::info;

/// Schedule a movie session; members RSVP with reactions
#[poise::command(slash_command, guild_only)]
pub async fn meeting(
    ctx: Context<'_>,
    #[description = "Movie title"] film: String,
    #[description = "Date (DD/MM/YYYY)"] date: String,
    #[description = "Time (HH:MM)"] time: String,
) -> Result<(), Error> {
    ctx.defer_ephemeral().await?;

    let guild_id = guild_id(ctx)?;
    let scheduled = ctx
        .data()
        .meetings
        .schedule(
            guild_id,
            film.trim(),
            date.trim(),
            time.trim(),
            ctx.channel_id().get(),
        )
        .await;

    match scheduled {
        Ok(meeting) => {
            info!(
                "{} scheduled '{}' in guild {}",
                ctx.author().name,
                meeting.record.film_title,
                guild_id
            );
            ctx.say("✅ Meeting created!").await?;
            Ok(())
        }
        Err(e) => reject(ctx, e).await,
    }
}

/// Show the scheduled meetings
#[poise::command(slash_command, guild_only)]
pub async fn listmeetings(ctx: Context<'_>) -> Result<(), Error> {
    let guild_id = guild_id(ctx)?;
    let meetings = ctx.data().meetings.list(guild_id).await;
    let view = render_meetings(&meetings).with_footer(ctx.data().config.list_footer.clone());

    ctx.send(poise::CreateReply::default().embed(list_embed(&view)))
        .await?;
    Ok(())
}

/// Cancel a scheduled meeting by its position
#[poise::command(slash_command, guild_only)]
pub async fn removemeeting(
    ctx: Context<'_>,
    #[description = "Position in the meeting list"] index: i64,
) -> Result<(), Error> {
    let guild_id = guild_id(ctx)?;
    match ctx.data().meetings.remove(guild_id, index).await {
        Ok(meeting) => {
            ctx.send(quiet_reply().content(format!(
                "🗑️ Cancelled **{}** ({}).",
                meeting.record.film_title,
                meeting.record.due_at()
            )))
            .await?;
            Ok(())
        }
        Err(e) => reject(ctx, e).await,
    }
}
