//! Command entry point: resolve the version, then either update the guild
//! default or look up and reply.

use tracing::{debug, info};

use crate::context::ChatContext;
use crate::downloader::LookupRequest;
use crate::error::{CommandError, Result};
use crate::family::CommandVariant;
use crate::invocation::Invocation;
use crate::lookup;
use crate::permissions::DEFAULT_VERSION_PERMS;
use crate::render::{self, TYPING_THRESHOLD};
use crate::store::GuildStorage;

/// Flag value that clears a guild's default version.
pub const LATEST: &str = "latest";

/// What a successful invocation did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommandOutcome {
    /// A lookup reply was sent.
    Replied,
    /// The guild's default version changed; storage should be persisted.
    DefaultVersionChanged,
}

impl CommandVariant {
    pub async fn process<C: ChatContext>(&self, ctx: &C, invocation: Invocation) -> Result<CommandOutcome> {
        let family = self.family();
        let storage = family
            .storage()
            .ok_or_else(|| CommandError::NotInitialized(self.name()))?;

        if let Some(value) = invocation.default_version {
            return self.set_default_version(ctx, storage, value).await;
        }

        let name = invocation.name.ok_or(CommandError::MissingArgument("name"))?;
        let version = match invocation.version {
            Some(explicit) => explicit,
            None => self.default_version(ctx, storage).await,
        };

        let request = LookupRequest {
            name,
            version: version.clone(),
            kind: self.kind(),
        };
        let mappings = lookup::resolve(ctx, family.downloader(), request).await?;

        let _typing = (mappings.len() > TYPING_THRESHOLD).then(|| ctx.start_typing());
        let reply = render::shape(family.name(), family.color(), &version, mappings);
        render::send(ctx, reply).await?;

        Ok(CommandOutcome::Replied)
    }

    /// Version to use when none was given: the guild's stored default, or
    /// the downloader's latest in private channels and unset guilds.
    pub async fn default_version<C: ChatContext>(&self, ctx: &C, storage: &GuildStorage) -> String {
        let stored = match ctx.guild_id() {
            Some(guild_id) if !ctx.is_private() => storage.get(guild_id).await,
            _ => None,
        };
        match stored.filter(|v| !v.is_empty()) {
            Some(version) => version,
            None => self.family().downloader().latest_version(),
        }
    }

    async fn set_default_version<C: ChatContext>(
        &self,
        ctx: &C,
        storage: &GuildStorage,
        value: String,
    ) -> Result<CommandOutcome> {
        if !DEFAULT_VERSION_PERMS.matches(ctx.author_permissions()) {
            return Err(CommandError::PermissionDenied);
        }
        let guild_id = ctx.guild_id().ok_or(CommandError::NotInGuild)?;

        let stored = if value == LATEST {
            None
        } else if self.family().downloader().known_versions().contains(&value) {
            Some(value.clone())
        } else {
            return Err(CommandError::InvalidVersion(value));
        };

        debug!("Setting default version for guild {} to {:?}", guild_id, stored);
        storage.put(guild_id, stored).await;
        info!("Default '{}' version for guild {} is now {}", self.name(), guild_id, value);

        ctx.reply(&format!("Set default version for this guild to {}", value))
            .await
            .map_err(CommandError::Reply)?;
        Ok(CommandOutcome::DefaultVersionChanged)
    }
}

#[path = "command_tests.rs"]
mod command_tests;
