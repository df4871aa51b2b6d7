//! Reply shaping: plain text, a compact embed, or a paginated listing.

use serde::{Deserialize, Serialize};

use crate::context::ChatContext;
use crate::error::{CommandError, Result};
use crate::mapping::MappingEntry;

/// Entries per page of a mappings listing.
pub const PAGE_SIZE: usize = 5;

/// Result sets larger than this keep the typing indicator on while rendering.
pub const TYPING_THRESHOLD: usize = 20;

pub const NO_RESULTS: &str = "No information found!";

/// Transport-neutral embed.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct Embed {
    pub title: Option<String>,
    pub description: String,
    pub color: u32,
    pub footer: Option<String>,
}

/// Pages of a listing, in order. Always holds at least one page.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct PaginatedMessage {
    pages: Vec<Embed>,
}

impl PaginatedMessage {
    pub fn pages(&self) -> &[Embed] {
        &self.pages
    }

    pub fn page(&self, index: usize) -> Option<&Embed> {
        self.pages.get(index)
    }

    pub fn len(&self) -> usize {
        self.pages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pages.is_empty()
    }

    /// True when there is more than one page to navigate.
    pub fn is_interactive(&self) -> bool {
        self.pages.len() > 1
    }

    pub fn into_pages(self) -> Vec<Embed> {
        self.pages
    }
}

/// Builds a [`PaginatedMessage`] out of a list of items.
pub struct ListMessageBuilder<T> {
    title: String,
    objects: Vec<T>,
    objects_per_page: usize,
    show_index: bool,
    color: u32,
}

impl<T> ListMessageBuilder<T> {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            objects: Vec::new(),
            objects_per_page: PAGE_SIZE,
            show_index: true,
            color: 0,
        }
    }

    pub fn objects_per_page(mut self, count: usize) -> Self {
        self.objects_per_page = count.max(1);
        self
    }

    pub fn show_index(mut self, show: bool) -> Self {
        self.show_index = show;
        self
    }

    pub fn color(mut self, color: u32) -> Self {
        self.color = color;
        self
    }

    pub fn add_objects(mut self, objects: impl IntoIterator<Item = T>) -> Self {
        self.objects.extend(objects);
        self
    }

    /// Lay the items out in insertion order, `stringify` rendering each one.
    pub fn build(self, stringify: impl Fn(&T) -> String) -> PaginatedMessage {
        let chunks: Vec<&[T]> = self.objects.chunks(self.objects_per_page).collect();
        let total = chunks.len().max(1);

        let mut pages = Vec::with_capacity(total);
        for (page, chunk) in chunks.iter().enumerate() {
            let first = page * self.objects_per_page;
            let description = chunk
                .iter()
                .enumerate()
                .map(|(i, object)| {
                    if self.show_index {
                        format!("{}) {}", first + i + 1, stringify(object))
                    } else {
                        stringify(object)
                    }
                })
                .collect::<Vec<_>>()
                .join("\n");
            pages.push(Embed {
                title: Some(self.title.clone()),
                description,
                color: self.color,
                footer: (total > 1).then(|| format!("Page {}/{}", page + 1, total)),
            });
        }

        if pages.is_empty() {
            pages.push(Embed {
                title: Some(self.title),
                description: String::new(),
                color: self.color,
                footer: None,
            });
        }

        PaginatedMessage { pages }
    }
}

/// A shaped reply, ready to send.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Reply {
    Text(String),
    Embed(Embed),
    Paginated(PaginatedMessage),
}

/// Decide how to present `mappings` found for `version`.
pub fn shape(title: &str, color: u32, version: &str, mappings: Vec<MappingEntry>) -> Reply {
    if mappings.is_empty() {
        return Reply::Text(NO_RESULTS.to_string());
    }

    let fits_one_page = mappings.len() <= PAGE_SIZE;
    let message = ListMessageBuilder::new(format!("{} Mappings", title))
        .objects_per_page(PAGE_SIZE)
        .show_index(false)
        .color(color)
        .add_objects(mappings)
        .build(|m| m.format(version));

    if fits_one_page {
        let mut embed = message.into_pages().into_iter().next().unwrap_or_default();
        embed.title = None;
        embed.footer = None;
        Reply::Embed(embed)
    } else {
        Reply::Paginated(message)
    }
}

pub async fn send<C: ChatContext>(ctx: &C, reply: Reply) -> Result<()> {
    match reply {
        Reply::Text(text) => ctx.reply(&text).await,
        Reply::Embed(embed) => ctx.reply_embed(embed).await,
        Reply::Paginated(message) => ctx.send_paginated(message).await,
    }
    .map(|_| ())
    .map_err(CommandError::Reply)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mapping::MappingType;

    fn entries(n: usize) -> Vec<MappingEntry> {
        (0..n)
            .map(|i| MappingEntry::new(MappingType::Field, format!("field{}", i), format!("field_{}_a", i)))
            .collect()
    }

    #[test]
    fn test_empty_is_text() {
        assert_eq!(
            shape("MCP", 0, "1.12", vec![]),
            Reply::Text("No information found!".to_string())
        );
    }

    #[test]
    fn test_up_to_page_size_is_single_untitled_embed() {
        for n in 1..=PAGE_SIZE {
            match shape("MCP", 0x00ff00, "1.12", entries(n)) {
                Reply::Embed(embed) => {
                    assert!(embed.title.is_none());
                    assert!(embed.footer.is_none());
                    assert_eq!(embed.color, 0x00ff00);
                    assert_eq!(embed.description.matches("**MC 1.12:").count(), n);
                }
                other => panic!("expected single embed for {} entries, got {:?}", n, other),
            }
        }
    }

    #[test]
    fn test_over_page_size_is_paginated() {
        for n in [PAGE_SIZE + 1, 12, 26] {
            match shape("MCP", 0, "1.12", entries(n)) {
                Reply::Paginated(msg) => {
                    assert!(msg.is_interactive());
                    assert_eq!(msg.len(), n.div_ceil(PAGE_SIZE));
                    assert_eq!(msg.page(0).unwrap().title.as_deref(), Some("MCP Mappings"));
                }
                other => panic!("expected paginated reply for {} entries, got {:?}", n, other),
            }
        }
    }

    #[test]
    fn test_order_preserved() {
        let mut list = entries(7);
        list.reverse();
        let Reply::Paginated(msg) = shape("MCP", 0, "1.12", list) else {
            panic!("expected paginated reply");
        };
        let text: String = msg.pages().iter().map(|p| p.description.clone()).collect();
        let positions: Vec<usize> = (0..7)
            .rev()
            .map(|i| text.find(&format!("`field{}`", i)).unwrap())
            .collect();
        assert!(positions.windows(2).all(|w| w[0] < w[1]));
    }

    #[test]
    fn test_builder_footer_and_index() {
        let msg = ListMessageBuilder::new("Things")
            .objects_per_page(2)
            .add_objects(vec!["a", "b", "c"])
            .build(|s| s.to_string());
        assert_eq!(msg.len(), 2);
        assert_eq!(msg.page(0).unwrap().description, "1) a\n2) b");
        assert_eq!(msg.page(1).unwrap().description, "3) c");
        assert_eq!(msg.page(1).unwrap().footer.as_deref(), Some("Page 2/2"));
    }

    #[test]
    fn test_builder_single_page_has_no_footer() {
        let msg = ListMessageBuilder::new("Things")
            .show_index(false)
            .add_objects(vec!["a"])
            .build(|s| s.to_string());
        assert!(!msg.is_interactive());
        assert!(msg.page(0).unwrap().footer.is_none());
        assert_eq!(msg.page(0).unwrap().description, "a");
    }
}
