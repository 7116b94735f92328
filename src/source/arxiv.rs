//! arXiv feed source.
//!
//! Fetches the listing with the shared blocking client and parses it with
//! the [`rss`] crate, which reads both the RSS 2.0 feeds arXiv serves today
//! and the older RSS 1.0 (RDF) layout.  Bodies that are not RSS get a second
//! chance as Atom (arXiv's `/atom/` listings) through [`atom_syndication`].

use reqwest::header::LAST_MODIFIED;
use reqwest::StatusCode;
use thiserror::Error;

use super::{FeedError, FeedSnapshot, FeedSource, RawEntry};

/// An arXiv subject feed, e.g. `http://export.arxiv.org/rss/cs.LG`.
pub struct ArxivFeed {
    pub url: String,
    client: reqwest::blocking::Client,
}

/// The body parsed neither as RSS nor as Atom.
#[derive(Debug, Error)]
#[error("not RSS ({rss}) and not Atom ({atom})")]
pub struct NotAFeed {
    rss: rss::Error,
    atom: atom_syndication::Error,
}

impl ArxivFeed {
    pub fn new(url: impl Into<String>, client: reqwest::blocking::Client) -> Self {
        Self {
            url: url.into(),
            client,
        }
    }

    /// Parse a response body, RSS first, then Atom.
    ///
    /// `last_modified` is the response's `Last-Modified` header; when present
    /// it is the snapshot's marker, otherwise the feed's own dates are used.
    pub fn parse_body(
        body: &[u8],
        status: StatusCode,
        last_modified: Option<&str>,
    ) -> Result<FeedSnapshot, NotAFeed> {
        let mut snapshot = match rss::Channel::read_from(body) {
            Ok(channel) => Self::parse_channel(&channel, status),
            Err(rss) => match atom_syndication::Feed::read_from(body) {
                Ok(feed) => Self::parse_atom(&feed, status),
                Err(atom) => return Err(NotAFeed { rss, atom }),
            },
        };

        if let Some(modified) = last_modified {
            snapshot.updated = modified.to_string();
        }
        Ok(snapshot)
    }

    /// Turn an already-parsed [`rss::Channel`] into a snapshot.
    ///
    /// Pure, so the entry mapping and marker selection are testable without
    /// the network.
    pub fn parse_channel(channel: &rss::Channel, status: StatusCode) -> FeedSnapshot {
        let entries = channel
            .items()
            .iter()
            .map(|item| RawEntry {
                link: item.link().unwrap_or_default().to_string(),
                title: item.title().unwrap_or_default().to_string(),
                summary: item.description().unwrap_or_default().to_string(),
            })
            .collect();

        FeedSnapshot {
            status: Some(status.as_u16()),
            updated: updated_marker(channel),
            entries,
        }
    }

    /// Same as [`ArxivFeed::parse_channel`] for an Atom feed.
    pub fn parse_atom(feed: &atom_syndication::Feed, status: StatusCode) -> FeedSnapshot {
        let entries = feed
            .entries()
            .iter()
            .map(|entry| {
                // Prefer the HTML abstract page over the PDF link.
                let link = entry
                    .links()
                    .iter()
                    .find(|l| l.rel() == "alternate")
                    .or_else(|| entry.links().first())
                    .map(|l| l.href().to_string())
                    .unwrap_or_default();

                RawEntry {
                    link,
                    title: entry.title().value.clone(),
                    summary: entry
                        .summary()
                        .map(|s| s.value.clone())
                        .unwrap_or_default(),
                }
            })
            .collect();

        FeedSnapshot {
            status: Some(status.as_u16()),
            updated: feed.updated().to_rfc3339(),
            entries,
        }
    }
}

/// Pick the channel's version stamp: `lastBuildDate`, then `pubDate`, then
/// the first Dublin Core `dc:date`.  Empty when the feed carries none.
fn updated_marker(channel: &rss::Channel) -> String {
    channel
        .last_build_date()
        .or_else(|| channel.pub_date())
        .or_else(|| {
            channel
                .dublin_core_ext()
                .and_then(|dc| dc.dates().first())
                .map(String::as_str)
        })
        .unwrap_or_default()
        .to_string()
}

impl FeedSource for ArxivFeed {
    fn fetch(&self) -> Result<FeedSnapshot, FeedError> {
        let response = self
            .client
            .get(&self.url)
            .send()
            .map_err(|e| FeedError::unreachable(&self.url, e))?;

        // The status only explains a failure; a valid feed is taken as is.
        let status = response.status();
        let last_modified = response
            .headers()
            .get(LAST_MODIFIED)
            .and_then(|v| v.to_str().ok())
            .map(String::from);

        let body = response
            .bytes()
            .map_err(|e| FeedError::classify(&self.url, Some(status), e))?;

        Self::parse_body(&body, status, last_modified.as_deref())
            .map_err(|e| FeedError::classify(&self.url, Some(status), e))
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
