//! Slack webhook delivery.

use anyhow::{Context, Result};
use log::debug;
use serde::Serialize;

/// Optional sender display overrides merged into every payload.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Identity {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub icon_emoji: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub channel: Option<String>,
}

/// Webhook body: `{"text": ..., "username": ..., ...}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OutboundMessage {
    pub text: String,
    #[serde(flatten)]
    pub identity: Identity,
}

pub trait Notifier {
    /// Deliver one message.  No retries; the response is not acted on.
    fn send(&self, message: &OutboundMessage) -> Result<()>;
}

impl<N: Notifier + ?Sized> Notifier for &N {
    fn send(&self, message: &OutboundMessage) -> Result<()> {
        (**self).send(message)
    }
}

pub struct SlackWebhook {
    url: String,
    client: reqwest::blocking::Client,
}

impl SlackWebhook {
    pub fn new(url: impl Into<String>, client: reqwest::blocking::Client) -> Self {
        Self {
            url: url.into(),
            client,
        }
    }
}

impl Notifier for SlackWebhook {
    fn send(&self, message: &OutboundMessage) -> Result<()> {
        let response = self
            .client
            .post(&self.url)
            .json(message)
            .send()
            .context("failed to post to the Slack webhook")?;
        debug!("webhook answered {}", response.status());
        Ok(())
    }
}
