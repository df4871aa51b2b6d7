//! Mapping types and resolved mapping entries

use std::fmt;

use serde::{Deserialize, Serialize};

/// Kind of symbol a mapping describes.
///
/// Declaration order is significant: the root command builds its typed
/// children in the order of [`MappingType::ALL`].
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum MappingType {
    Class,
    Method,
    Field,
    Param,
}

impl MappingType {
    pub const ALL: [MappingType; 4] = [Self::Class, Self::Method, Self::Field, Self::Param];

    /// Single-character key appended to the family prefix to name the
    /// typed command (`mcp` + `m` = `mcpm`).
    pub fn key(self) -> char {
        match self {
            Self::Class => 'c',
            Self::Method => 'm',
            Self::Field => 'f',
            Self::Param => 'p',
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Class => "class",
            Self::Method => "method",
            Self::Field => "field",
            Self::Param => "param",
        }
    }
}

impl fmt::Display for MappingType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single resolved mapping, as produced by a [`crate::MappingDownloader`].
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct MappingEntry {
    pub kind: MappingType,
    /// Readable name, e.g. `getBlockState`
    pub name: String,
    /// Identifier stable across releases, e.g. `func_180495_p`
    pub intermediate: String,
    /// Obfuscated name in the shipped release, e.g. `a`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub original: Option<String>,
    /// Owning class for members
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub owner: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl MappingEntry {
    pub fn new(kind: MappingType, name: impl Into<String>, intermediate: impl Into<String>) -> Self {
        Self {
            kind,
            name: name.into(),
            intermediate: intermediate.into(),
            original: None,
            owner: None,
            description: None,
        }
    }

    pub fn with_original(mut self, original: impl Into<String>) -> Self {
        self.original = Some(original.into());
        self
    }

    pub fn with_owner(mut self, owner: impl Into<String>) -> Self {
        self.owner = Some(owner.into());
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Render the entry for display against the given version.
    pub fn format(&self, version: &str) -> String {
        let qualified = match &self.owner {
            Some(owner) => format!("{}.{}", owner, self.name),
            None => self.name.clone(),
        };
        let mut out = format!("**MC {}: {}**\n", version, qualified);

        out.push_str("__Name__: ");
        if let Some(original) = &self.original {
            out.push_str(&format!("`{}` => ", original));
        }
        out.push_str(&format!("`{}` => `{}`", self.intermediate, self.name));

        if let Some(description) = self.description.as_deref().filter(|d| !d.is_empty()) {
            out.push_str(&format!("\n__Comment__: `{}`", description));
        }
        out
    }

    /// Best-effort match of a user query against this entry.
    ///
    /// Matches the readable, intermediate or obfuscated name ignoring ASCII
    /// case, or the numeric part of the intermediate id (`1234` and
    /// `method_1234` both match `func_1234_a`).
    pub fn matches(&self, query: &str) -> bool {
        let query = query.trim();
        if query.is_empty() {
            return false;
        }
        if self.name.eq_ignore_ascii_case(query)
            || self.intermediate.eq_ignore_ascii_case(query)
            || self
                .original
                .as_deref()
                .is_some_and(|o| o.eq_ignore_ascii_case(query))
        {
            return true;
        }
        match (numeric_id(&self.intermediate), numeric_id(query)) {
            (Some(ours), Some(theirs)) => ours == theirs,
            _ => false,
        }
    }
}

/// Longest digit run among the `_`-separated segments of an identifier.
///
/// A segment may carry one leading letter (`i45678` in constructor params
/// like `p_i45678_1_`), so the parameter index never wins over the id.
fn numeric_id(id: &str) -> Option<&str> {
    id.split('_')
        .filter_map(|segment| {
            let digits = match segment.as_bytes().first() {
                Some(b) if b.is_ascii_alphabetic() => &segment[1..],
                _ => segment,
            };
            (!digits.is_empty() && digits.bytes().all(|b| b.is_ascii_digit())).then_some(digits)
        })
        .fold(None, |best: Option<&str>, digits| match best {
            Some(best) if best.len() >= digits.len() => Some(best),
            _ => Some(digits),
        })
}
