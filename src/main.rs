use anyhow::Context as _;
use movienight::cache::ListMessageCache;
use movienight::meetings::MeetingDispatcher;
use movienight::messaging::{Messenger, SerenityMessenger};
use movienight::services::meetings::MeetingScheduler;
use movienight::services::movies::MovieListService;
use movienight::store::Store;
use movienight::{commands, config::Config, interactions, Data};
use poise::serenity_prelude as serenity;
use std::sync::Arc;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    // Load configuration
    let config = Config::from_env()?;
    info!("Configuration: {:?}", config);
    let discord_token = config.discord_token.clone();

    // Corrupt snapshots are fatal
    let store = Arc::new(
        Store::open(&config.movies_path, &config.meetings_path)
            .context("Failed to load persisted state")?,
    );
    let setup_store = store.clone();

    let framework = poise::Framework::builder()
        .options(poise::FrameworkOptions {
            commands: commands::all(),
            event_handler: |ctx, event, _framework, data| {
                Box::pin(interactions::handle_event(ctx, event, data))
            },
            ..Default::default()
        })
        .setup(move |ctx, _ready, framework| {
            Box::pin(async move {
                info!("Bot is ready!");
                match config.dev_guild_id {
                    Some(guild_id) => {
                        poise::builtins::register_in_guild(
                            ctx,
                            &framework.options().commands,
                            serenity::GuildId::new(guild_id),
                        )
                        .await?;
                        info!("Registered commands in guild {}", guild_id);
                    }
                    None => {
                        poise::builtins::register_globally(ctx, &framework.options().commands)
                            .await?;
                        info!("Registered commands globally");
                    }
                }

                ctx.set_activity(Some(serenity::ActivityData::custom(&config.status_message)));

                let messenger: Arc<dyn Messenger> =
                    Arc::new(SerenityMessenger::new(ctx.http.clone()));
                let movies = MovieListService::new(setup_store.clone());
                let meetings = MeetingScheduler::new(setup_store, messenger.clone());

                let dispatcher =
                    MeetingDispatcher::new(meetings.clone(), config.meeting_poll_interval_secs);
                tokio::spawn(dispatcher.run());

                let list_messages = ListMessageCache::new(config.list_cache_capacity);

                Ok(Data {
                    config,
                    movies,
                    meetings,
                    messenger,
                    list_messages,
                })
            })
        })
        .build();

    let intents = serenity::GatewayIntents::non_privileged();

    let mut client = serenity::ClientBuilder::new(&discord_token, intents)
        .framework(framework)
        .await
        .map_err(|e| anyhow::anyhow!("Failed to create client: {}", e))?;

    let shard_manager = client.shard_manager.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            info!("Ctrl-C received, shutting down...");
            shard_manager.shutdown_all().await;
        }
    });

    info!("Starting bot...");
    if let Err(why) = client.start().await {
        error!("Client error: {:?}", why);
    }

    store.flush().await.context("Failed to save state on shutdown")?;
    info!("State saved, bye");
    Ok(())
}
