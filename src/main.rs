//! arxiv-slack — posts new arXiv papers, translated, to a Slack channel.
//!
//! ## Architecture overview
//!
//! ```text
//! ┌───────────┐ FeedSnapshot ┌──────────┐ PaperInfo ┌───────────┐ text ┌───────────┐
//! │ source/   │ ───────────► │ paper.rs │ ────────► │ format.rs │ ───► │ notify.rs │
//! │ (RSS GET) │              │          │           │  (pure)   │      │ (webhook) │
//! └───────────┘              └──────────┘           └───────────┘      └───────────┘
//!                                 │ translate()
//!                            ┌──────────────┐
//!                            │ translate.rs │
//!                            └──────────────┘
//! ```
//!
//! * **`config`** — reads and validates the environment.
//! * **`source/`** — the `FeedSource` trait and the arXiv RSS fetcher.
//! * **`paper`** — turns one raw entry into a `PaperInfo`, or skips it.
//! * **`translate`** — the `Translator` trait and the Google implementation.
//! * **`format`** — renders a `PaperInfo` as Slack mrkdwn.
//! * **`notify`** — the `Notifier` trait and the Slack webhook.
//! * **`poll`** — ties it together on a fixed interval.
//! * **`main`** — wires everything and turns fatal errors into the exit code.

mod config;
mod format;
mod http;
mod lang;
mod logging;
mod notify;
mod paper;
mod poll;
mod source;
mod translate;

use std::process;

use anyhow::Result;
use log::{error, info};

use config::Config;
use notify::SlackWebhook;
use paper::TransformSettings;
use poll::Poller;
use source::{ArxivFeed, FeedError};
use translate::GoogleTranslator;

/// Exit status for bad configuration and unusable feeds.
const FATAL_EXIT_CODE: i32 = 255;

fn main() -> Result<()> {
    logging::init();

    let config = Config::from_env().unwrap_or_else(|e| {
        error!("{e}");
        process::exit(FATAL_EXIT_CODE);
    });

    info!(
        "polling {} every {} minutes, translating into {} ({})",
        config.feed_url,
        poll::POLL_INTERVAL.as_secs() / 60,
        lang::name_of(&config.dest_lang).unwrap_or("unknown"),
        config.dest_lang,
    );

    let client = http::client()?;
    let mut poller = Poller::new(
        ArxivFeed::new(&config.feed_url, client.clone()),
        GoogleTranslator::new(client.clone()),
        SlackWebhook::new(&config.webhook_url, client),
        TransformSettings {
            dest_lang: config.dest_lang,
            vanity_base_url: config.vanity_base_url,
        },
        config.identity,
    );

    let Err(err) = poller.run();

    if let Some(feed_err) = err.downcast_ref::<FeedError>() {
        let status = feed_err
            .status()
            .map_or_else(|| "none".to_string(), |s| s.to_string());
        error!("{feed_err}");
        error!("{} (HTTP status: {status})", feed_err.detail());
        process::exit(FATAL_EXIT_CODE);
    }

    Err(err)
}
