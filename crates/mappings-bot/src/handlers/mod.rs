//! Serenity event handler implementation

use std::sync::Arc;

use mappings_command::{CommandOutcome, CommandVariant, Invocation};
use serenity::async_trait;
use serenity::model::application::Interaction;
use serenity::model::channel::Message;
use serenity::model::gateway::Ready;
use serenity::prelude::*;
use tracing::{debug, error, info};

use crate::context::MessageContext;
use crate::errors;
use crate::health::AppState;
use crate::paginator;
use crate::registry::CommandRegistry;

pub struct Handler;

async fn registry(ctx: &Context) -> Option<Arc<CommandRegistry>> {
    let data = ctx.data.read().await;
    data.get::<CommandRegistry>().cloned()
}

/// Parse and run one command, persisting storage when the guild default moved.
async fn dispatch(ctx: &MessageContext, registry: &CommandRegistry, variant: &CommandVariant, args: &str) {
    let name = variant.name();
    let invocation = match Invocation::parse(args) {
        Ok(invocation) => invocation,
        Err(e) => {
            errors::report(ctx, &name, e).await;
            return;
        }
    };

    match variant.process(ctx, invocation).await {
        Ok(CommandOutcome::Replied) => {}
        Ok(CommandOutcome::DefaultVersionChanged) => {
            if let Err(e) = variant.persist(&registry.persistence, &registry.data_dir).await {
                error!("Failed to persist default versions for '{}': {:#}", name, e);
            }
        }
        Err(e) => errors::report(ctx, &name, e).await,
    }
}

#[async_trait]
impl EventHandler for Handler {
    async fn ready(&self, ctx: Context, ready: Ready) {
        info!(
            "Discord bot connected as {}#{:04}",
            ready.user.name,
            ready.user.discriminator.map_or(0, |d| d.get())
        );

        let data = ctx.data.read().await;
        if let Some(health) = data.get::<AppState>() {
            health.set_bot_username(ready.user.name.clone()).await;
        }
    }

    async fn message(&self, ctx: Context, msg: Message) {
        // Skip bot messages
        if msg.author.bot {
            return;
        }

        let Some(registry) = registry(&ctx).await else {
            error!("CommandRegistry not found in context data");
            return;
        };

        let Some((variant, args)) = registry.route(&msg.content) else {
            return;
        };

        debug!(
            "Running '{}' for user {} in channel {}",
            variant.name(),
            msg.author.id,
            msg.channel_id
        );

        let chat = MessageContext::new(&ctx, &msg, registry.paginators.clone());
        dispatch(&chat, &registry, variant, args).await;
    }

    async fn interaction_create(&self, ctx: Context, interaction: Interaction) {
        let Interaction::Component(comp) = interaction else {
            return;
        };

        let Some(registry) = registry(&ctx).await else {
            return;
        };

        match paginator::handle_component(&ctx, &comp, &registry.paginators).await {
            Ok(true) => {}
            Ok(false) => debug!("Ignoring component {}", comp.data.custom_id),
            Err(e) => error!("Failed to turn page: {:#}", e),
        }
    }
}
