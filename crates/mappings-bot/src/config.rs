//! Configuration management for mappings-bot

#[path = "config_tests.rs"]
mod config_tests;

use std::fs;
use std::path::PathBuf;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

/// Complete bot configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub discord: DiscordBotConfig,
    #[serde(default)]
    pub mappings: MappingsConfig,
    #[serde(default)]
    pub storage: StorageConfig,
}

/// Discord connection settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DiscordBotConfig {
    /// Bot token from the Discord developer portal
    #[serde(default)]
    pub bot_token: String,
    /// Prefix that marks a message as a command, e.g. `!mcp`
    #[serde(default = "default_command_prefix")]
    pub command_prefix: String,
}

/// The mapping command family served by this bot
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MappingsConfig {
    /// Display name, e.g. "MCP"
    #[serde(default = "default_name")]
    pub name: String,
    /// Command name prefix; typed variants append a one-letter key
    #[serde(default = "default_prefix")]
    pub prefix: String,
    /// Embed accent colour as 0xRRGGBB
    #[serde(default = "default_color")]
    pub color: u32,
    /// Directory of `<version>.json` catalogs
    #[serde(default = "default_catalog_dir")]
    pub catalog_dir: PathBuf,
    /// Overrides the highest version found in the catalog
    #[serde(default)]
    pub latest_version: Option<String>,
}

/// Where per-guild defaults are persisted
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,
}

impl Default for MappingsConfig {
    fn default() -> Self {
        Self {
            name: default_name(),
            prefix: default_prefix(),
            color: default_color(),
            catalog_dir: default_catalog_dir(),
            latest_version: None,
        }
    }
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
        }
    }
}

/// Source of environment variables.
pub trait ReadEnv {
    fn var(&self, key: &str) -> Option<String>;
}

/// Reads the process environment.
pub struct SystemEnv;

impl ReadEnv for SystemEnv {
    fn var(&self, key: &str) -> Option<String> {
        std::env::var(key).ok()
    }
}

impl Config {
    /// Load configuration from a TOML file
    pub fn from_file(path: &str) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path))?;

        let config: Config = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path))?;

        Ok(config)
    }

    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        Self::from_env_with(&SystemEnv)
    }

    pub fn from_env_with<E: ReadEnv>(env: &E) -> Result<Self> {
        let bot_token = env.var("DISCORD_BOT_TOKEN").context("DISCORD_BOT_TOKEN not set")?;

        let color = match env.var("MAPPINGS_COLOR") {
            Some(raw) => parse_color(&raw)
                .with_context(|| format!("MAPPINGS_COLOR is not a colour: {}", raw))?,
            None => default_color(),
        };

        Ok(Config {
            discord: DiscordBotConfig {
                bot_token,
                command_prefix: env
                    .var("MAPPINGS_COMMAND_PREFIX")
                    .unwrap_or_else(default_command_prefix),
            },
            mappings: MappingsConfig {
                name: env.var("MAPPINGS_NAME").unwrap_or_else(default_name),
                prefix: env.var("MAPPINGS_PREFIX").unwrap_or_else(default_prefix),
                color,
                catalog_dir: env
                    .var("MAPPINGS_CATALOG_DIR")
                    .map(PathBuf::from)
                    .unwrap_or_else(default_catalog_dir),
                latest_version: env.var("MAPPINGS_LATEST_VERSION").filter(|v| !v.is_empty()),
            },
            storage: StorageConfig {
                data_dir: env
                    .var("MAPPINGS_DATA_DIR")
                    .map(PathBuf::from)
                    .unwrap_or_else(default_data_dir),
            },
        })
    }
}

fn default_command_prefix() -> String {
    "!".to_string()
}

fn default_name() -> String {
    "MCP".to_string()
}

fn default_prefix() -> String {
    "mcp".to_string()
}

fn default_color() -> u32 {
    0x810000
}

fn default_catalog_dir() -> PathBuf {
    PathBuf::from("mappings")
}

fn default_data_dir() -> PathBuf {
    PathBuf::from("data")
}

/// Accepts `0xRRGGBB`, `#RRGGBB` or a decimal integer.
fn parse_color(raw: &str) -> Option<u32> {
    let raw = raw.trim();
    let hex = raw
        .strip_prefix("0x")
        .or_else(|| raw.strip_prefix("0X"))
        .or_else(|| raw.strip_prefix('#'));
    let value = match hex {
        Some(hex) => u32::from_str_radix(hex, 16).ok()?,
        None => raw.parse().ok()?,
    };
    (value <= 0xFFFFFF).then_some(value)
}
