use crate::commands::VIEW_LIST_BUTTON;
use crate::messaging::{list_embed, MessageHandle};
use crate::{Data, Error};
use poise::serenity_prelude as serenity;
use tracing::{info, warn};

/// Gateway events that are not slash commands.
pub async fn handle_event(
    ctx: &serenity::Context,
    event: &serenity::FullEvent,
    data: &Data,
) -> Result<(), Error> {
    match event {
        serenity::FullEvent::Ready { data_about_bot } => {
            info!("Connected as {}", data_about_bot.user.name);
        }
        serenity::FullEvent::InteractionCreate {
            interaction: serenity::Interaction::Component(component),
        } if component.data.custom_id == VIEW_LIST_BUTTON => {
            show_list(ctx, component, data).await?;
        }
        _ => {}
    }
    Ok(())
}

async fn show_list(
    ctx: &serenity::Context,
    component: &serenity::ComponentInteraction,
    data: &Data,
) -> Result<(), Error> {
    let Some(guild_id) = component.guild_id else {
        return Ok(());
    };
    let view = data.movie_view(guild_id.get()).await;

    component
        .create_response(
            &ctx.http,
            serenity::CreateInteractionResponse::Message(
                serenity::CreateInteractionResponseMessage::new().embed(list_embed(&view)),
            ),
        )
        .await?;

    match component.get_response(&ctx.http).await {
        Ok(message) => data.list_messages.remember(MessageHandle::from(&message)),
        Err(e) => warn!("Could not resolve list message for button press: {}", e),
    }
    Ok(())
}
