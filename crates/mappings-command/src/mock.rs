//! Recording test doubles for [`ChatContext`] and [`MappingDownloader`].

use std::collections::{BTreeMap, BTreeSet};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

use futures::future::BoxFuture;
use serenity::model::permissions::Permissions;
use tokio::time::Duration;

use crate::context::{ChatContext, SentMessage};
use crate::downloader::{LookupRequest, LookupResponse, MappingDownloader};
use crate::mapping::MappingEntry;
use crate::render::{Embed, PaginatedMessage};

/// Everything a [`MockContext`] was asked to do, in order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ContextEvent {
    TypingStarted,
    TypingStopped,
    Reply(String),
    Embed(Embed),
    Paginated(PaginatedMessage),
    Deleted(u64),
}

/// In-memory chat context that records every call.
///
/// # Example
/// ```rust,ignore
/// let ctx = MockContext::in_guild(10).with_permissions(Permissions::MANAGE_GUILD);
/// variant.process(&ctx, invocation).await?;
/// assert_eq!(ctx.replies(), vec!["Set default version for this guild to 1.12.2"]);
/// ```
#[derive(Clone)]
pub struct MockContext {
    guild_id: Option<u64>,
    permissions: Permissions,
    fail_sends: bool,
    events: Arc<Mutex<Vec<ContextEvent>>>,
    next_message_id: Arc<AtomicU64>,
}

/// Typing guard that records when it is released.
pub struct MockTyping {
    events: Arc<Mutex<Vec<ContextEvent>>>,
}

impl Drop for MockTyping {
    fn drop(&mut self) {
        self.events.lock().unwrap().push(ContextEvent::TypingStopped);
    }
}

impl MockContext {
    pub fn in_guild(guild_id: u64) -> Self {
        Self::new(Some(guild_id))
    }

    pub fn private() -> Self {
        Self::new(None)
    }

    fn new(guild_id: Option<u64>) -> Self {
        Self {
            guild_id,
            permissions: Permissions::SEND_MESSAGES,
            fail_sends: false,
            events: Arc::new(Mutex::new(Vec::new())),
            next_message_id: Arc::new(AtomicU64::new(1)),
        }
    }

    pub fn with_permissions(mut self, permissions: Permissions) -> Self {
        self.permissions = permissions;
        self
    }

    /// Make every send fail, as if the channel had been deleted.
    pub fn failing_sends(mut self) -> Self {
        self.fail_sends = true;
        self
    }

    pub fn events(&self) -> Vec<ContextEvent> {
        self.events.lock().unwrap().clone()
    }

    /// Text replies only, in send order.
    pub fn replies(&self) -> Vec<String> {
        self.events()
            .into_iter()
            .filter_map(|e| match e {
                ContextEvent::Reply(text) => Some(text),
                _ => None,
            })
            .collect()
    }

    pub fn embeds(&self) -> Vec<Embed> {
        self.events()
            .into_iter()
            .filter_map(|e| match e {
                ContextEvent::Embed(embed) => Some(embed),
                _ => None,
            })
            .collect()
    }

    pub fn paginated(&self) -> Vec<PaginatedMessage> {
        self.events()
            .into_iter()
            .filter_map(|e| match e {
                ContextEvent::Paginated(msg) => Some(msg),
                _ => None,
            })
            .collect()
    }

    pub fn deleted(&self) -> Vec<u64> {
        self.events()
            .into_iter()
            .filter_map(|e| match e {
                ContextEvent::Deleted(id) => Some(id),
                _ => None,
            })
            .collect()
    }

    pub fn typing_started(&self) -> usize {
        self.count(|e| matches!(e, ContextEvent::TypingStarted))
    }

    /// True when every typing guard handed out has been released.
    pub fn typing_released(&self) -> bool {
        self.typing_started() == self.count(|e| matches!(e, ContextEvent::TypingStopped))
    }

    pub fn is_silent(&self) -> bool {
        self.events.lock().unwrap().is_empty()
    }

    fn count(&self, pred: impl Fn(&ContextEvent) -> bool) -> usize {
        self.events.lock().unwrap().iter().filter(|e| pred(e)).count()
    }

    fn record(&self, event: ContextEvent) -> anyhow::Result<SentMessage> {
        if self.fail_sends {
            anyhow::bail!("mock send failure");
        }
        self.events.lock().unwrap().push(event);
        Ok(SentMessage {
            channel_id: 1,
            message_id: self.next_message_id.fetch_add(1, Ordering::SeqCst),
        })
    }
}

impl ChatContext for MockContext {
    type Typing = MockTyping;

    fn guild_id(&self) -> Option<u64> {
        self.guild_id
    }

    fn author_permissions(&self) -> Permissions {
        self.permissions
    }

    fn start_typing(&self) -> MockTyping {
        self.events.lock().unwrap().push(ContextEvent::TypingStarted);
        MockTyping {
            events: Arc::clone(&self.events),
        }
    }

    async fn reply(&self, content: &str) -> anyhow::Result<SentMessage> {
        self.record(ContextEvent::Reply(content.to_string()))
    }

    async fn reply_embed(&self, embed: Embed) -> anyhow::Result<SentMessage> {
        self.record(ContextEvent::Embed(embed))
    }

    async fn send_paginated(&self, message: PaginatedMessage) -> anyhow::Result<SentMessage> {
        self.record(ContextEvent::Paginated(message))
    }

    async fn delete(&self, message: SentMessage) -> anyhow::Result<()> {
        self.events
            .lock()
            .unwrap()
            .push(ContextEvent::Deleted(message.message_id));
        Ok(())
    }
}

/// Downloader serving canned responses after an optional delay.
///
/// Versions registered with [`MockDownloader::with_version`] are known;
/// anything else answers `NoSuchVersion`.
#[derive(Clone)]
pub struct MockDownloader {
    latest: String,
    versions: BTreeMap<String, Vec<MappingEntry>>,
    delay: Duration,
    failure: Option<String>,
    requests: Arc<Mutex<Vec<LookupRequest>>>,
}

impl MockDownloader {
    pub fn new(latest: impl Into<String>) -> Self {
        Self {
            latest: latest.into(),
            versions: BTreeMap::new(),
            delay: Duration::ZERO,
            failure: None,
            requests: Arc::new(Mutex::new(Vec::new())),
        }
    }

    pub fn with_version(mut self, version: impl Into<String>, entries: Vec<MappingEntry>) -> Self {
        self.versions.insert(version.into(), entries);
        self
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    /// Fail every lookup (after the delay) with `message`.
    pub fn failing(mut self, message: impl Into<String>) -> Self {
        self.failure = Some(message.into());
        self
    }

    pub fn requests(&self) -> Vec<LookupRequest> {
        self.requests.lock().unwrap().clone()
    }
}

impl MappingDownloader for MockDownloader {
    fn latest_version(&self) -> String {
        self.latest.clone()
    }

    fn known_versions(&self) -> BTreeSet<String> {
        self.versions.keys().cloned().collect()
    }

    fn lookup(&self, request: LookupRequest) -> BoxFuture<'static, anyhow::Result<LookupResponse>> {
        self.requests.lock().unwrap().push(request.clone());
        let delay = self.delay;
        let failure = self.failure.clone();
        let entries = self.versions.get(&request.version).cloned();

        Box::pin(async move {
            if !delay.is_zero() {
                tokio::time::sleep(delay).await;
            }
            if let Some(message) = failure {
                anyhow::bail!(message);
            }
            Ok(match entries {
                Some(entries) => LookupResponse::Mappings(entries),
                None => LookupResponse::NoSuchVersion,
            })
        })
    }
}
