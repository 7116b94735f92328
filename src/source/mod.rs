//! Feed source abstraction.
//!
//! This module defines the [`FeedSource`] trait, the [`FeedSnapshot`] one
//! poll produces, and the [`FeedError`] classification the entry point uses
//! to print its diagnostics.  The arXiv RSS implementation lives in
//! [`arxiv`].
//!
//! ## For contributors
//!
//! The poll loop only sees [`FeedSource`], so tests (and any other feed
//! format) plug in by implementing the trait.  Keep `fetch()` free of
//! retries: a failed fetch is fatal for the process.

mod arxiv;

pub use arxiv::ArxivFeed;

use std::error::Error as StdError;

use reqwest::StatusCode;
use thiserror::Error;

/// One feed item as delivered by the parser, before any cleanup.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawEntry {
    pub link: String,
    /// May end with the `] UPDATED)` repost marker.
    pub title: String,
    /// Still wrapped in the feed's `<p>` ... `</p>` decoration.
    pub summary: String,
}

/// The result of one successful fetch.
///
/// Created fresh every cycle and dropped once its entries are delivered.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FeedSnapshot {
    pub status: Option<u16>,
    /// Opaque version stamp; only ever compared for equality.
    pub updated: String,
    /// Entries in feed order.
    pub entries: Vec<RawEntry>,
}

/// Underlying cause carried by every [`FeedError`].
pub type Cause = Box<dyn StdError + Send + Sync + 'static>;

/// Why a fetch did not produce a well-formed feed.
///
/// The variant is picked from how far the server got (see
/// [`FeedError::classify`]).  The `Display` text is the one-line
/// diagnostic; [`FeedError::detail`] carries the underlying cause.
#[derive(Debug, Error)]
pub enum FeedError {
    /// No HTTP status is available: connect, TLS or timeout failure.
    #[error("unreachable to the server")]
    Unreachable {
        url: String,
        #[source]
        source: Cause,
    },

    #[error("reachable but not OK(200)")]
    Status {
        url: String,
        status: StatusCode,
        #[source]
        source: Cause,
    },

    #[error("OK(200) but not a valid feed")]
    Malformed {
        url: String,
        #[source]
        source: Cause,
    },
}

impl FeedError {
    /// Map a failed fetch to its diagnostic from the status seen, if any.
    ///
    /// Only called once the body failed to read or parse; a well-formed
    /// feed is accepted whatever the status.
    pub fn classify(
        url: impl Into<String>,
        status: Option<StatusCode>,
        source: impl Into<Cause>,
    ) -> Self {
        let url = url.into();
        let source = source.into();
        match status {
            None => Self::Unreachable { url, source },
            Some(status) if status == StatusCode::OK => Self::Malformed { url, source },
            Some(status) => Self::Status {
                url,
                status,
                source,
            },
        }
    }

    pub fn unreachable(url: impl Into<String>, source: impl Into<Cause>) -> Self {
        Self::classify(url, None, source)
    }

    /// The HTTP status seen, if the server answered at all.
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            Self::Unreachable { .. } => None,
            Self::Status { status, .. } => Some(*status),
            Self::Malformed { .. } => Some(StatusCode::OK),
        }
    }

    pub fn detail(&self) -> String {
        match self {
            Self::Unreachable { url, source } => format!("{url}: {source}"),
            Self::Status {
                url,
                status,
                source,
            } => format!("{url}: HTTP status {status}: {source}"),
            Self::Malformed { url, source } => format!("{url}: {source}"),
        }
    }
}

/// Something that can be polled for a feed snapshot.
pub trait FeedSource {
    /// Fetch and parse the feed once.
    ///
    /// Any error means the feed was not well-formed this cycle; callers
    /// treat it as fatal.
    fn fetch(&self) -> Result<FeedSnapshot, FeedError>;
}
