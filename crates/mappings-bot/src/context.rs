//! serenity-backed [`ChatContext`] for prefix-command messages.

use std::sync::Arc;

use anyhow::{Context as _, Result};
use mappings_command::{ChatContext, Embed, PaginatedMessage, SentMessage};
use serenity::builder::CreateMessage;
use serenity::http::{Http, Typing};
use serenity::model::channel::Message;
use serenity::model::id::{ChannelId, GuildId, MessageId};
use serenity::model::permissions::Permissions;
use serenity::prelude::Context;

use crate::paginator::{self, Paginators};

/// The channel a command message arrived in, plus who sent it.
pub struct MessageContext {
    http: Arc<Http>,
    channel_id: ChannelId,
    guild_id: Option<GuildId>,
    permissions: Permissions,
    paginators: Paginators,
}

impl MessageContext {
    pub fn new(ctx: &Context, msg: &Message, paginators: Paginators) -> Self {
        Self {
            http: ctx.http.clone(),
            channel_id: msg.channel_id,
            guild_id: msg.guild_id,
            // Uncached guilds resolve to no permissions
            permissions: msg.author_permissions(&ctx.cache).unwrap_or_else(Permissions::empty),
            paginators,
        }
    }

    async fn send(&self, builder: CreateMessage) -> Result<SentMessage> {
        let msg = self
            .channel_id
            .send_message(&*self.http, builder)
            .await
            .with_context(|| format!("Failed to send message to channel {}", self.channel_id))?;
        Ok(SentMessage {
            channel_id: msg.channel_id.get(),
            message_id: msg.id.get(),
        })
    }
}

/// Stops the typing indicator when dropped.
pub struct TypingGuard(Option<Typing>);

impl Drop for TypingGuard {
    fn drop(&mut self) {
        if let Some(typing) = self.0.take() {
            typing.stop();
        }
    }
}

impl ChatContext for MessageContext {
    type Typing = TypingGuard;

    fn guild_id(&self) -> Option<u64> {
        self.guild_id.map(|id| id.get())
    }

    fn author_permissions(&self) -> Permissions {
        self.permissions
    }

    fn start_typing(&self) -> TypingGuard {
        TypingGuard(Some(self.channel_id.start_typing(&self.http)))
    }

    async fn reply(&self, content: &str) -> Result<SentMessage> {
        self.send(CreateMessage::new().content(content)).await
    }

    async fn reply_embed(&self, embed: Embed) -> Result<SentMessage> {
        self.send(CreateMessage::new().embed(paginator::to_create_embed(&embed)))
            .await
    }

    async fn send_paginated(&self, message: PaginatedMessage) -> Result<SentMessage> {
        let pages = message.into_pages();
        let first = pages.first().context("Paginated message has no pages")?;
        let builder = CreateMessage::new()
            .embed(paginator::to_create_embed(first))
            .components(paginator::controls());

        let sent = self.send(builder).await?;
        self.paginators.track(sent.message_id, pages).await;
        Ok(sent)
    }

    async fn delete(&self, message: SentMessage) -> Result<()> {
        ChannelId::new(message.channel_id)
            .delete_message(&*self.http, MessageId::new(message.message_id))
            .await
            .with_context(|| format!("Failed to delete message {}", message.message_id))
    }
}
