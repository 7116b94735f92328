//! The poll loop.
//!
//! Runs on the main thread: fetch the feed, and if its `updated` marker moved
//! since the last cycle, transform and format every entry, then deliver the
//! messages one by one.  Sleep, repeat.
//!
//! ## For contributors
//!
//! The poller is intentionally simple: everything is sequential and every
//! error ends the loop.  [`Poller::cycle`] is the unit tests drive; [`Poller::run`]
//! only adds the sleep.

use std::convert::Infallible;
use std::thread;
use std::time::Duration;

use anyhow::Result;
use log::{debug, info};

use crate::format::format_message;
use crate::notify::{Identity, Notifier, OutboundMessage};
use crate::paper::{self, TransformSettings};
use crate::source::FeedSource;
use crate::translate::Translator;

/// How long to wait between fetches, whether or not anything changed.
pub const POLL_INTERVAL: Duration = Duration::from_secs(10 * 60);

/// What one cycle did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CycleOutcome {
    /// The marker matched the previous cycle; no entries were looked at.
    Unchanged,
    /// New marker; this many messages were sent.
    Delivered(usize),
}

pub struct Poller<S, T, N> {
    source: S,
    translator: T,
    notifier: N,
    settings: TransformSettings,
    identity: Identity,
    /// `None` until the first successful fetch, so that fetch is always
    /// processed, even when the feed's marker is the empty string.
    last_updated: Option<String>,
}

impl<S, T, N> Poller<S, T, N>
where
    S: FeedSource,
    T: Translator,
    N: Notifier,
{
    pub fn new(
        source: S,
        translator: T,
        notifier: N,
        settings: TransformSettings,
        identity: Identity,
    ) -> Self {
        Self {
            source,
            translator,
            notifier,
            settings,
            identity,
            last_updated: None,
        }
    }

    /// Poll forever.  Only returns on a fatal error.
    pub fn run(&mut self) -> Result<Infallible> {
        loop {
            match self.cycle()? {
                CycleOutcome::Unchanged => debug!("feed unchanged"),
                CycleOutcome::Delivered(n) => info!("delivered {n} papers"),
            }
            thread::sleep(POLL_INTERVAL);
        }
    }

    /// One fetch-compare-deliver pass.
    pub fn cycle(&mut self) -> Result<CycleOutcome> {
        let snapshot = self.source.fetch()?;
        debug!(
            "fetched {} entries (status {:?}, updated {:?})",
            snapshot.entries.len(),
            snapshot.status,
            snapshot.updated
        );

        if self.last_updated.as_deref() == Some(snapshot.updated.as_str()) {
            return Ok(CycleOutcome::Unchanged);
        }
        info!("updated at {}", snapshot.updated);
        self.last_updated = Some(snapshot.updated);

        // Build every message before sending any.
        let mut outbox = Vec::with_capacity(snapshot.entries.len());
        for entry in &snapshot.entries {
            let Some(paper) = paper::transform(entry, &self.translator, &self.settings)? else {
                debug!("skipping repost {}", entry.link);
                continue;
            };
            outbox.push(OutboundMessage {
                text: format_message(&paper),
                identity: self.identity.clone(),
            });
        }

        for message in &outbox {
            self.notifier.send(message)?;
        }

        Ok(CycleOutcome::Delivered(outbox.len()))
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::collections::VecDeque;
    use std::io;

    use crate::source::{FeedError, FeedSnapshot, RawEntry};

    /// Hands out queued fetch results, one per call.
    struct ScriptedFeed {
        results: RefCell<VecDeque<Result<FeedSnapshot, FeedError>>>,
    }

    impl ScriptedFeed {
        fn new(results: Vec<Result<FeedSnapshot, FeedError>>) -> Self {
            Self {
                results: RefCell::new(results.into()),
            }
        }
    }

    impl FeedSource for ScriptedFeed {
        fn fetch(&self) -> Result<FeedSnapshot, FeedError> {
            self.results
                .borrow_mut()
                .pop_front()
                .expect("no more scripted fetches")
        }
    }

    struct Echo;

    impl Translator for Echo {
        fn translate(&self, text: &str, _: &str, _: &str) -> Result<String> {
            Ok(text.to_string())
        }
    }

    /// Upper-cases text and counts calls.
    #[derive(Default)]
    struct Shouting {
        calls: RefCell<usize>,
    }

    impl Translator for Shouting {
        fn translate(&self, text: &str, _: &str, _: &str) -> Result<String> {
            *self.calls.borrow_mut() += 1;
            Ok(text.to_uppercase())
        }
    }

    #[derive(Default)]
    struct Recorder {
        sent: RefCell<Vec<OutboundMessage>>,
    }

    impl Notifier for Recorder {
        fn send(&self, message: &OutboundMessage) -> Result<()> {
            self.sent.borrow_mut().push(message.clone());
            Ok(())
        }
    }

    struct BrokenWebhook;

    impl Notifier for BrokenWebhook {
        fn send(&self, _: &OutboundMessage) -> Result<()> {
            anyhow::bail!("connection reset")
        }
    }

    fn entry(id: &str, title: &str) -> RawEntry {
        RawEntry {
            link: format!("https://arxiv.org/abs/{id}"),
            title: format!("{title} (arXiv:{id} [cs.LG])"),
            summary: format!("<p>Abstract of {title}.\nSecond line.</p>"),
        }
    }

    fn repost(id: &str) -> RawEntry {
        RawEntry {
            link: format!("https://arxiv.org/abs/{id}"),
            title: format!("Old paper (arXiv:{id}v2 [cs.LG] UPDATED)"),
            summary: "<p>ignored</p>".into(),
        }
    }

    fn snapshot(updated: &str, entries: Vec<RawEntry>) -> Result<FeedSnapshot, FeedError> {
        Ok(FeedSnapshot {
            status: Some(200),
            updated: updated.into(),
            entries,
        })
    }

    fn settings(vanity: Option<&str>) -> TransformSettings {
        TransformSettings {
            dest_lang: "es".into(),
            vanity_base_url: vanity.map(String::from),
        }
    }

    #[test]
    fn delivers_entries_in_feed_order_and_skips_reposts() {
        let feed = ScriptedFeed::new(vec![snapshot(
            "Mon, 01 Jan 2024",
            vec![entry("2101.00001", "A"), repost("2012.09999"), entry("2101.00002", "B")],
        )]);
        let recorder = Recorder::default();
        let mut poller = Poller::new(feed, Echo, &recorder, settings(None), Identity::default());

        assert_eq!(poller.cycle().unwrap(), CycleOutcome::Delivered(2));

        let sent = recorder.sent.borrow();
        assert_eq!(sent.len(), 2);
        assert!(sent[0].text.starts_with("*A | A*\n"));
        assert!(sent[1].text.starts_with("*B | B*\n"));
        assert!(sent.iter().all(|m| !m.text.contains("Old paper")));
    }

    #[test]
    fn same_marker_sends_nothing_the_second_time() {
        let entries = vec![entry("2101.00001", "A")];
        let feed = ScriptedFeed::new(vec![
            snapshot("v1", entries.clone()),
            snapshot("v1", entries.clone()),
            snapshot("v2", entries),
        ]);
        let recorder = Recorder::default();
        let mut poller = Poller::new(feed, Echo, &recorder, settings(None), Identity::default());

        assert_eq!(poller.cycle().unwrap(), CycleOutcome::Delivered(1));
        assert_eq!(poller.cycle().unwrap(), CycleOutcome::Unchanged);
        assert_eq!(recorder.sent.borrow().len(), 1);

        assert_eq!(poller.cycle().unwrap(), CycleOutcome::Delivered(1));
        assert_eq!(recorder.sent.borrow().len(), 2);
    }

    #[test]
    fn empty_marker_is_processed_once() {
        let feed = ScriptedFeed::new(vec![
            snapshot("", vec![entry("2101.00001", "A")]),
            snapshot("", vec![entry("2101.00001", "A")]),
        ]);
        let recorder = Recorder::default();
        let mut poller = Poller::new(feed, Echo, &recorder, settings(None), Identity::default());

        assert_eq!(poller.cycle().unwrap(), CycleOutcome::Delivered(1));
        assert_eq!(poller.cycle().unwrap(), CycleOutcome::Unchanged);
    }

    #[test]
    fn unchanged_cycle_does_not_translate() {
        let feed = ScriptedFeed::new(vec![
            snapshot("v1", vec![entry("2101.00001", "A")]),
            snapshot("v1", vec![entry("2101.00001", "A")]),
        ]);
        let recorder = Recorder::default();
        let translator = Shouting::default();
        let mut poller = Poller::new(feed, &translator, &recorder, settings(None), Identity::default());

        poller.cycle().unwrap();
        poller.cycle().unwrap();

        assert_eq!(*translator.calls.borrow(), 2);
    }

    #[test]
    fn messages_carry_translation_mirror_and_identity() {
        let feed = ScriptedFeed::new(vec![snapshot("v1", vec![entry("2101.00001", "graph nets")])]);
        let recorder = Recorder::default();
        let identity = Identity {
            username: Some("arXiv".into()),
            icon_emoji: None,
            channel: Some("#papers".into()),
        };
        let mut poller = Poller::new(
            feed,
            Shouting::default(),
            &recorder,
            settings(Some("https://mirror.test/papers/")),
            identity.clone(),
        );

        poller.cycle().unwrap();

        let sent = recorder.sent.borrow();
        assert_eq!(sent[0].identity, identity);
        assert_eq!(
            sent[0].text,
            "*GRAPH NETS | graph nets*\n\
             ABSTRACT OF GRAPH NETS. SECOND LINE.\n\
             [<https://arxiv.org/abs/2101.00001|arXiv>] \
             [<https://mirror.test/papers/2101.00001/|arXiv Vanity>]"
        );
    }

    #[test]
    fn unreachable_feed_is_fatal_and_sends_nothing() {
        let feed = ScriptedFeed::new(vec![Err(FeedError::unreachable(
            "http://feed.test/rss",
            io::Error::new(io::ErrorKind::TimedOut, "timed out"),
        ))]);
        let recorder = Recorder::default();
        let mut poller = Poller::new(feed, Echo, &recorder, settings(None), Identity::default());

        let err = poller.cycle().unwrap_err();
        let feed_err = err.downcast_ref::<FeedError>().expect("feed error is preserved");

        assert!(feed_err.status().is_none());
        assert_eq!(feed_err.to_string(), "unreachable to the server");
        assert!(recorder.sent.borrow().is_empty());
    }

    #[test]
    fn translation_error_aborts_before_any_delivery() {
        struct FailsOnSecondEntry(RefCell<usize>);

        impl Translator for FailsOnSecondEntry {
            fn translate(&self, text: &str, _: &str, _: &str) -> Result<String> {
                *self.0.borrow_mut() += 1;
                if *self.0.borrow() > 2 {
                    anyhow::bail!("quota exceeded");
                }
                Ok(text.to_string())
            }
        }

        let feed = ScriptedFeed::new(vec![snapshot(
            "v1",
            vec![entry("2101.00001", "A"), entry("2101.00002", "B")],
        )]);
        let recorder = Recorder::default();
        let mut poller = Poller::new(
            feed,
            FailsOnSecondEntry(RefCell::new(0)),
            &recorder,
            settings(None),
            Identity::default(),
        );

        assert!(poller.cycle().is_err());
        assert!(recorder.sent.borrow().is_empty());
    }

    #[test]
    fn run_returns_only_with_the_fatal_error() {
        let feed = ScriptedFeed::new(vec![Err(FeedError::unreachable(
            "http://feed.test/rss",
            io::Error::new(io::ErrorKind::ConnectionRefused, "connection refused"),
        ))]);
        let recorder = Recorder::default();
        let mut poller = Poller::new(feed, Echo, &recorder, settings(None), Identity::default());

        let Err(err) = poller.run();
        assert!(err.downcast_ref::<FeedError>().is_some());
        assert!(recorder.sent.borrow().is_empty());
    }

    #[test]
    fn delivery_error_propagates() {
        let feed = ScriptedFeed::new(vec![snapshot("v1", vec![entry("2101.00001", "A")])]);
        let mut poller = Poller::new(feed, Echo, BrokenWebhook, settings(None), Identity::default());

        let err = poller.cycle().unwrap_err();
        assert!(err.to_string().contains("connection reset"));
    }
}
