//! Chat surface the command replies through.

use serenity::model::permissions::Permissions;

use crate::render::{Embed, PaginatedMessage};

/// Handle to a message the bot sent, used to retract it later.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SentMessage {
    pub channel_id: u64,
    pub message_id: u64,
}

/// Where an invocation came from and how to answer it.
///
/// `start_typing` returns a guard: the indicator stays on until the guard is
/// dropped, on every exit path.
#[allow(async_fn_in_trait)]
pub trait ChatContext: Send + Sync {
    type Typing: Send;

    /// `None` in private channels
    fn guild_id(&self) -> Option<u64>;

    fn is_private(&self) -> bool {
        self.guild_id().is_none()
    }

    /// Effective permissions of the invoking user in the invoking channel.
    fn author_permissions(&self) -> Permissions;

    fn start_typing(&self) -> Self::Typing;

    async fn reply(&self, content: &str) -> anyhow::Result<SentMessage>;

    async fn reply_embed(&self, embed: Embed) -> anyhow::Result<SentMessage>;

    /// Send a multi-page message; navigation belongs to the implementation.
    async fn send_paginated(&self, message: PaginatedMessage) -> anyhow::Result<SentMessage>;

    async fn delete(&self, message: SentMessage) -> anyhow::Result<()>;
}
