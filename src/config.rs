//! Environment-driven configuration.
//!
//! Everything is read once at start-up.  [`Config::from_lookup`] takes the
//! lookup as a closure so tests can feed a map instead of mutating the
//! process environment.

use std::env;

use thiserror::Error;

use crate::lang;
use crate::notify::Identity;

pub const ARXIV_BASE_URL: &str = "ARXIV_BASE_URL";
pub const ARXIV_SUBJECT: &str = "ARXIV_SUBJECT";
pub const DEST_LANG: &str = "DEST_LANG";
pub const ARXIV_VANITY_BASE_URL: &str = "ARXIV_VANITY_BASE_URL";
pub const SLACK_WEBHOOK_URL: &str = "SLACK_WEBHOOK_URL";
pub const SLACK_USERNAME: &str = "SLACK_USERNAME";
pub const SLACK_ICON_EMOJI: &str = "SLACK_ICON_EMOJI";
pub const SLACK_CHANNEL: &str = "SLACK_CHANNEL";

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{0} is not set in env.")]
    Missing(&'static str),

    #[error("DEST_LANG: {0} is not supported.")]
    UnsupportedLanguage(String),
}

#[derive(Clone, Debug)]
pub struct Config {
    /// Base URL and subject joined verbatim.
    pub feed_url: String,
    pub dest_lang: String,
    /// Mirror site root; `None` disables mirror links.
    pub vanity_base_url: Option<String>,
    pub webhook_url: String,
    pub identity: Identity,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let required = |key: &'static str| {
            lookup(key)
                .and_then(non_empty)
                .ok_or(ConfigError::Missing(key))
        };
        let optional = |key: &str| lookup(key).and_then(non_empty);

        let feed_url = format!("{}{}", required(ARXIV_BASE_URL)?, required(ARXIV_SUBJECT)?);

        let dest_lang = required(DEST_LANG)?;
        if !lang::is_supported(&dest_lang) {
            return Err(ConfigError::UnsupportedLanguage(dest_lang));
        }

        let vanity_base_url = optional(ARXIV_VANITY_BASE_URL);
        let webhook_url = required(SLACK_WEBHOOK_URL)?;

        let identity = Identity {
            username: optional(SLACK_USERNAME),
            icon_emoji: optional(SLACK_ICON_EMOJI),
            channel: optional(SLACK_CHANNEL),
        };

        Ok(Self {
            feed_url,
            dest_lang,
            vanity_base_url,
            webhook_url,
            identity,
        })
    }
}

fn non_empty(s: String) -> Option<String> {
    if s.is_empty() {
        None
    } else {
        Some(s)
    }
}
