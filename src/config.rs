use anyhow::{bail, Context, Result};
use chrono::format::{Item, StrftimeItems};
use serde::{Deserialize, Serialize};

use crate::render::highlight::{available_themes, theme_exists, DEFAULT_THEME};
use crate::render::timestamp::{DisplayZone, DEFAULT_TIME_FORMAT};
use crate::state::DEFAULT_MAX_ACTIVE_TOOLS;
use crate::util::{env_var_trimmed, parse_bool_str};

const TIME_FORMAT_ENV: &str = "TOOLVIEW_TIME_FORMAT";
const TIMEZONE_ENV: &str = "TOOLVIEW_TIMEZONE";
const HIGHLIGHT_ENV: &str = "TOOLVIEW_HIGHLIGHT";
const THEME_ENV: &str = "TOOLVIEW_THEME";
const MAX_ACTIVE_TOOLS_ENV: &str = "TOOLVIEW_MAX_ACTIVE_TOOLS";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RendererConfig {
    pub time_format: String,
    pub timezone: String,
    pub highlight: bool,
    pub theme: String,
    /// 0 disables eviction.
    pub max_active_tools: usize,
}

impl Default for RendererConfig {
    fn default() -> Self {
        Self {
            time_format: DEFAULT_TIME_FORMAT.to_string(),
            timezone: "local".to_string(),
            highlight: true,
            theme: DEFAULT_THEME.to_string(),
            max_active_tools: DEFAULT_MAX_ACTIVE_TOOLS,
        }
    }
}

impl RendererConfig {
    pub fn load() -> Result<Self> {
        let defaults = Self::default();

        let highlight = match env_var_trimmed(HIGHLIGHT_ENV) {
            Some(raw) => match parse_bool_str(&raw) {
                Some(value) => value,
                None => bail!("Invalid {HIGHLIGHT_ENV} '{raw}': expected true/false"),
            },
            None => defaults.highlight,
        };

        let max_active_tools = match env_var_trimmed(MAX_ACTIVE_TOOLS_ENV) {
            Some(raw) => raw
                .parse::<usize>()
                .with_context(|| format!("Invalid {MAX_ACTIVE_TOOLS_ENV} '{raw}'"))?,
            None => defaults.max_active_tools,
        };

        Ok(Self {
            time_format: std::env::var(TIME_FORMAT_ENV)
                .ok()
                .filter(|v| !v.trim().is_empty())
                .unwrap_or(defaults.time_format),
            timezone: env_var_trimmed(TIMEZONE_ENV).unwrap_or(defaults.timezone),
            highlight,
            theme: env_var_trimmed(THEME_ENV).unwrap_or(defaults.theme),
            max_active_tools,
        })
    }

    pub fn validate(&self) -> Result<()> {
        if self.time_format.trim().is_empty() {
            bail!("Time format must not be empty");
        }
        if StrftimeItems::new(&self.time_format).any(|item| matches!(item, Item::Error)) {
            bail!("Invalid time format '{}'", self.time_format);
        }

        if self.display_zone().is_none() {
            bail!(
                "Invalid timezone '{}': expected 'local', 'utc', or an offset like '+05:30'",
                self.timezone
            );
        }

        if self.highlight && !theme_exists(&self.theme) {
            bail!(
                "Unknown highlight theme '{}'. Available: {}",
                self.theme,
                available_themes().join(", ")
            );
        }

        Ok(())
    }

    pub fn display_zone(&self) -> Option<DisplayZone> {
        DisplayZone::parse(&self.timezone)
    }
}
