//! Button navigation for paginated mapping listings.
//!
//! Sent listings are tracked by message id. Prev/next buttons arrive as
//! component interactions and swap the embed in place.

use std::collections::HashMap;
use std::sync::Arc;

use anyhow::Result;
use mappings_command::Embed;
use serenity::builder::{
    CreateActionRow, CreateButton, CreateEmbed, CreateEmbedFooter, CreateInteractionResponse,
    CreateInteractionResponseMessage,
};
use serenity::model::application::{ButtonStyle, ComponentInteraction};
use serenity::prelude::*;
use tokio::sync::RwLock;
use tokio::time::Instant;
use tracing::debug;

pub const PREV_ID: &str = "mappings-page-prev";
pub const NEXT_ID: &str = "mappings-page-next";

/// Listings tracked at once; the oldest is dropped beyond this.
const MAX_TRACKED: usize = 256;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Prev,
    Next,
}

impl Direction {
    pub fn from_custom_id(id: &str) -> Option<Self> {
        match id {
            PREV_ID => Some(Self::Prev),
            NEXT_ID => Some(Self::Next),
            _ => None,
        }
    }
}

/// Pages of one sent listing and the page currently shown.
pub(crate) struct PageState {
    pages: Vec<Embed>,
    current: usize,
    created: Instant,
}

impl PageState {
    fn new(pages: Vec<Embed>) -> Self {
        Self {
            pages,
            current: 0,
            created: Instant::now(),
        }
    }

    /// Move one page, stopping at either end.
    fn turn(&mut self, direction: Direction) -> Option<&Embed> {
        let last = self.pages.len().checked_sub(1)?;
        self.current = match direction {
            Direction::Prev => self.current.saturating_sub(1),
            Direction::Next => (self.current + 1).min(last),
        };
        self.pages.get(self.current)
    }
}

/// Shared map: `message_id → PageState`
#[derive(Clone, Default)]
pub struct Paginators {
    inner: Arc<RwLock<HashMap<u64, PageState>>>,
}

impl Paginators {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn track(&self, message_id: u64, pages: Vec<Embed>) {
        let mut map = self.inner.write().await;
        if map.len() >= MAX_TRACKED {
            let oldest = map
                .iter()
                .min_by_key(|(_, state)| state.created)
                .map(|(id, _)| *id);
            if let Some(id) = oldest {
                map.remove(&id);
                debug!("Stopped tracking listing {}", id);
            }
        }
        map.insert(message_id, PageState::new(pages));
    }

    /// The page to show after turning, or `None` for untracked messages.
    pub async fn turn(&self, message_id: u64, direction: Direction) -> Option<Embed> {
        let mut map = self.inner.write().await;
        map.get_mut(&message_id)?.turn(direction).cloned()
    }

    #[cfg(test)]
    async fn len(&self) -> usize {
        self.inner.read().await.len()
    }
}

/// Prev/next buttons attached to every paginated listing.
pub fn controls() -> Vec<CreateActionRow> {
    vec![CreateActionRow::Buttons(vec![
        CreateButton::new(PREV_ID).label("◀").style(ButtonStyle::Secondary),
        CreateButton::new(NEXT_ID).label("▶").style(ButtonStyle::Secondary),
    ])]
}

pub fn to_create_embed(embed: &Embed) -> CreateEmbed {
    let mut builder = CreateEmbed::new()
        .description(&embed.description)
        .colour(embed.color);
    if let Some(title) = &embed.title {
        builder = builder.title(title);
    }
    if let Some(footer) = &embed.footer {
        builder = builder.footer(CreateEmbedFooter::new(footer));
    }
    builder
}

/// Handle a button press. Returns `false` if the interaction is not ours.
pub async fn handle_component(ctx: &Context, comp: &ComponentInteraction, paginators: &Paginators) -> Result<bool> {
    let Some(direction) = Direction::from_custom_id(&comp.data.custom_id) else {
        return Ok(false);
    };

    let message_id = comp.message.id.get();
    let response = match paginators.turn(message_id, direction).await {
        Some(page) => CreateInteractionResponse::UpdateMessage(
            CreateInteractionResponseMessage::new().embed(to_create_embed(&page)),
        ),
        None => {
            debug!("Listing {} is no longer tracked", message_id);
            CreateInteractionResponse::Acknowledge
        }
    };
    comp.create_response(ctx, response).await?;
    Ok(true)
}
