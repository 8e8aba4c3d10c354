pub mod cache;
pub mod commands;
pub mod config;
pub mod error;
pub mod interactions;
pub mod meetings;
pub mod messaging;
pub mod render;
pub mod services;
pub mod store;

use services::meetings::MeetingScheduler;
use services::movies::MovieListService;
use std::sync::Arc;

/// Custom data passed to all commands
pub struct Data {
    pub config: config::Config,
    pub movies: MovieListService,
    pub meetings: MeetingScheduler,
    pub messenger: Arc<dyn messaging::Messenger>,
    /// Last list message rendered per channel
    pub list_messages: cache::ListMessageCache,
}

impl Data {
    pub async fn movie_view(&self, guild_id: u64) -> render::ListView {
        let movies = self.movies.list(guild_id).await;
        render::render_movies(&movies).with_footer(self.config.list_footer.clone())
    }
}

pub type Error = Box<dyn std::error::Error + Send + Sync>;
pub type Context<'a> = poise::Context<'a, Data, Error>;
