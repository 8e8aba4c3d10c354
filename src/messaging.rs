use crate::render::ListView;
use async_trait::async_trait;
use serenity::all::{
    ChannelId, CreateAllowedMentions, CreateEmbed, CreateEmbedFooter, CreateMessage, EditMessage,
    Message, MessageId, ReactionType, UserId,
};
use serenity::http::Http;
use std::sync::Arc;
use tracing::debug;

/// Embed colour for rendered lists.
pub const LIST_COLOR: u32 = 0xFFB400;

/// Identifies a message the bot sent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct MessageHandle {
    pub channel_id: u64,
    pub message_id: u64,
}

impl MessageHandle {
    pub fn new(channel_id: u64, message_id: u64) -> Self {
        Self {
            channel_id,
            message_id,
        }
    }
}

impl From<&Message> for MessageHandle {
    fn from(message: &Message) -> Self {
        Self::new(message.channel_id.get(), message.id.get())
    }
}

/// A user who reacted to a message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Reactor {
    pub user_id: u64,
    pub bot: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outgoing {
    /// Plain content. Only `mention_users` may be pinged; `@everyone`,
    /// `@here` and role mentions in `content` stay inert.
    Text {
        content: String,
        mention_users: Vec<u64>,
    },
    List(ListView),
}

impl Outgoing {
    pub fn text(content: impl Into<String>) -> Self {
        Outgoing::Text {
            content: content.into(),
            mention_users: Vec::new(),
        }
    }

    pub fn text_mentioning(content: impl Into<String>, users: &[u64]) -> Self {
        Outgoing::Text {
            content: content.into(),
            mention_users: users.to_vec(),
        }
    }
}

/// Allowed mentions limited to `users`; empty means nobody is pinged.
pub fn allowed_mentions(users: &[u64]) -> CreateAllowedMentions {
    CreateAllowedMentions::new().users(users.iter().map(|id| UserId::new(*id)))
}

/// The messaging operations the core needs from the chat platform.
#[async_trait]
pub trait Messenger: Send + Sync {
    async fn send_message(&self, channel_id: u64, message: Outgoing)
        -> anyhow::Result<MessageHandle>;
    async fn edit_message(&self, handle: MessageHandle, message: Outgoing) -> anyhow::Result<()>;
    async fn add_reaction(&self, handle: MessageHandle, symbol: &str) -> anyhow::Result<()>;
    async fn fetch_reactors(
        &self,
        handle: MessageHandle,
        symbol: &str,
    ) -> anyhow::Result<Vec<Reactor>>;
    async fn delete_message(&self, handle: MessageHandle) -> anyhow::Result<()>;
}

pub fn list_embed(view: &ListView) -> CreateEmbed {
    let mut embed = CreateEmbed::new()
        .title(view.title.clone())
        .description(view.description())
        .color(LIST_COLOR);
    if let Some(footer) = &view.footer {
        embed = embed.footer(CreateEmbedFooter::new(footer.clone()));
    }
    embed
}

/// [`Messenger`] backed by the Discord REST API.
pub struct SerenityMessenger {
    http: Arc<Http>,
}

impl SerenityMessenger {
    pub fn new(http: Arc<Http>) -> Self {
        Self { http }
    }
}

/// Discord caps reaction user pages at 100.
const REACTORS_PAGE: u8 = 100;

#[async_trait]
impl Messenger for SerenityMessenger {
    async fn send_message(
        &self,
        channel_id: u64,
        message: Outgoing,
    ) -> anyhow::Result<MessageHandle> {
        let builder = match message {
            Outgoing::Text {
                content,
                mention_users,
            } => CreateMessage::new()
                .content(content)
                .allowed_mentions(allowed_mentions(&mention_users)),
            Outgoing::List(view) => CreateMessage::new()
                .embed(list_embed(&view))
                .allowed_mentions(allowed_mentions(&[])),
        };
        let sent = ChannelId::new(channel_id)
            .send_message(&self.http, builder)
            .await?;
        Ok(MessageHandle::from(&sent))
    }

    async fn edit_message(&self, handle: MessageHandle, message: Outgoing) -> anyhow::Result<()> {
        let builder = match message {
            Outgoing::Text {
                content,
                mention_users,
            } => EditMessage::new()
                .content(content)
                .allowed_mentions(allowed_mentions(&mention_users)),
            Outgoing::List(view) => EditMessage::new()
                .embed(list_embed(&view))
                .allowed_mentions(allowed_mentions(&[])),
        };
        ChannelId::new(handle.channel_id)
            .edit_message(&self.http, MessageId::new(handle.message_id), builder)
            .await?;
        Ok(())
    }

    async fn add_reaction(&self, handle: MessageHandle, symbol: &str) -> anyhow::Result<()> {
        ChannelId::new(handle.channel_id)
            .create_reaction(
                &self.http,
                MessageId::new(handle.message_id),
                ReactionType::Unicode(symbol.to_string()),
            )
            .await?;
        Ok(())
    }

    async fn fetch_reactors(
        &self,
        handle: MessageHandle,
        symbol: &str,
    ) -> anyhow::Result<Vec<Reactor>> {
        let channel = ChannelId::new(handle.channel_id);
        let mut reactors = Vec::new();
        let mut after: Option<UserId> = None;

        loop {
            let page = channel
                .reaction_users(
                    &self.http,
                    MessageId::new(handle.message_id),
                    ReactionType::Unicode(symbol.to_string()),
                    Some(REACTORS_PAGE),
                    after,
                )
                .await?;
            let full_page = page.len() == REACTORS_PAGE as usize;
            after = page.last().map(|u| u.id);
            reactors.extend(page.into_iter().map(|u| Reactor {
                user_id: u.id.get(),
                bot: u.bot,
            }));
            if !full_page {
                break;
            }
        }

        debug!(
            "Fetched {} reactors for {} on message {}",
            reactors.len(),
            symbol,
            handle.message_id
        );
        Ok(reactors)
    }

    async fn delete_message(&self, handle: MessageHandle) -> anyhow::Result<()> {
        ChannelId::new(handle.channel_id)
            .delete_message(&self.http, MessageId::new(handle.message_id))
            .await?;
        Ok(())
    }
}
