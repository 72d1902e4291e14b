use crate::error::FetchError;
use crate::report::Item;
use anyhow::Result;
use chrono::{DateTime, Local};
use std::sync::mpsc::{channel, Receiver, RecvTimeoutError, Sender};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};
use tracing::{debug, info};

/// Something that can produce the current list of reports.
pub trait Source: Send + Sync + 'static {
    fn fetch(&self) -> Result<Vec<Item>, FetchError>;
}

/// The result of one triggered fetch, tagged with the generation it was
/// started under.
#[derive(Debug)]
pub struct Completion {
    pub generation: u64,
    pub result: Result<Vec<Item>, FetchError>,
}

#[derive(Debug, PartialEq, Eq)]
pub enum Outcome {
    Updated(usize),
    Failed(String),
    /// A newer fetch already finished before this one.
    Stale,
}

/// The displayed list of reports. Owned by the presentation thread and only
/// changed through [`Feed::apply`].
#[derive(Debug, Default)]
pub struct Feed {
    items: Vec<Item>,
    updated_at: Option<DateTime<Local>>,
    last_error: Option<String>,
    started: u64,
    settled: u64,
}

impl Feed {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn items(&self) -> &[Item] {
        &self.items
    }

    pub fn updated_at(&self) -> Option<DateTime<Local>> {
        self.updated_at
    }

    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    /// Start a new generation for a fetch about to be triggered.
    pub fn begin(&mut self) -> u64 {
        self.started += 1;
        self.started
    }

    /// True while the newest started fetch has not reported back.
    pub fn is_pending(&self) -> bool {
        self.started > self.settled
    }

    /// Apply a completion unless a newer generation already settled. The
    /// displayed list never moves back to older data.
    pub fn apply(&mut self, completion: Completion) -> Outcome {
        if completion.generation <= self.settled {
            debug!(
                "Discarding fetch {}, already showing {}",
                completion.generation, self.settled
            );
            return Outcome::Stale;
        }
        self.settled = completion.generation;
        match completion.result {
            Ok(items) => {
                let len = items.len();
                self.items = items;
                self.updated_at = Some(Local::now());
                self.last_error = None;
                info!("Displaying {len} reports");
                Outcome::Updated(len)
            }
            Err(err) => {
                let reason = err.to_string();
                debug!("Fetch failed, keeping {} reports", self.items.len());
                self.last_error = Some(reason.clone());
                Outcome::Failed(reason)
            }
        }
    }
}

/// Runs each triggered fetch on its own thread and funnels the results back
/// to whoever owns the [`Feed`].
pub struct Dispatcher<S: Source> {
    source: Arc<S>,
    sender: Sender<Completion>,
    receiver: Receiver<Completion>,
}

impl<S: Source> Dispatcher<S> {
    pub fn new(source: S) -> Self {
        let (sender, receiver) = channel();
        Self {
            source: Arc::new(source),
            sender,
            receiver,
        }
    }

    /// Start a fetch in the background. Exactly one [`Completion`] is sent
    /// for it.
    pub fn trigger(&self, generation: u64) -> JoinHandle<()> {
        let source = Arc::clone(&self.source);
        let sender = self.sender.clone();
        debug!("Starting fetch {generation}");
        thread::spawn(move || {
            let result = source.fetch();
            // The receiver lives as long as the dispatcher. Nothing to do if
            // it has already gone away.
            let _ = sender.send(Completion { generation, result });
        })
    }

    /// Wait for the next completion.
    pub fn recv(&self) -> Option<Completion> {
        self.receiver.recv().ok()
    }

    /// Wait up to `timeout` for the next completion.
    pub fn recv_timeout(&self, timeout: Duration) -> Option<Completion> {
        match self.receiver.recv_timeout(timeout) {
            Ok(completion) => Some(completion),
            Err(RecvTimeoutError::Timeout) | Err(RecvTimeoutError::Disconnected) => None,
        }
    }

    /// Trigger a fetch and block until its own completion arrives, applying
    /// any other completions that turn up first.
    pub fn fetch_into(&self, feed: &mut Feed) -> Outcome {
        let generation = feed.begin();
        self.trigger(generation);
        while let Some(completion) = self.recv() {
            let is_ours = completion.generation == generation;
            let outcome = feed.apply(completion);
            if is_ours {
                return outcome;
            }
        }
        Outcome::Stale
    }

    /// Trigger a fetch every `interval` and hand each applied completion to
    /// `on_outcome` as it arrives. A tick is skipped while the previous fetch
    /// is still running. Runs forever unless `ticks` is given.
    pub fn watch<F>(
        &self,
        feed: &mut Feed,
        interval: Duration,
        ticks: Option<usize>,
        mut on_outcome: F,
    ) -> Result<()>
    where
        F: FnMut(&Feed, Outcome) -> Result<()>,
    {
        let mut tick = 0;
        while ticks.map_or(true, |ticks| tick < ticks) {
            tick += 1;
            if feed.is_pending() {
                debug!("Fetch {} still running, skipping tick", feed.started);
            } else {
                self.trigger(feed.begin());
            }
            let started = Instant::now();
            while let Some(remaining) = interval.checked_sub(started.elapsed()) {
                if let Some(completion) = self.recv_timeout(remaining) {
                    let outcome = feed.apply(completion);
                    on_outcome(feed, outcome)?;
                }
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::report::decode;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    fn items(n: usize) -> Vec<Item> {
        let sample = decode(include_str!("../tests/data/eew.json")).unwrap();
        sample.items.into_iter().take(n).collect()
    }

    fn ok(generation: u64, n: usize) -> Completion {
        Completion {
            generation,
            result: Ok(items(n)),
        }
    }

    fn failed(generation: u64) -> Completion {
        Completion {
            generation,
            result: Err(FetchError::Transport("connection refused".into())),
        }
    }

    #[test]
    fn success_replaces_items() {
        let mut feed = Feed::new();
        let generation = feed.begin();
        assert_eq!(feed.apply(ok(generation, 3)), Outcome::Updated(3));
        assert_eq!(feed.items().len(), 3);
        assert!(feed.updated_at().is_some());

        let generation = feed.begin();
        assert_eq!(feed.apply(ok(generation, 0)), Outcome::Updated(0));
        assert!(feed.items().is_empty());
    }

    #[test]
    fn failure_keeps_previous_items() {
        let mut feed = Feed::new();
        let generation = feed.begin();
        feed.apply(ok(generation, 2));
        let updated_at = feed.updated_at();

        let generation = feed.begin();
        let outcome = feed.apply(failed(generation));
        assert_eq!(
            outcome,
            Outcome::Failed("request failed: connection refused".into())
        );
        assert_eq!(feed.items().len(), 2);
        assert_eq!(feed.updated_at(), updated_at);
        assert_eq!(feed.last_error(), Some("request failed: connection refused"));
    }

    #[test]
    fn older_fetch_never_overwrites_newer() {
        let mut feed = Feed::new();
        let first = feed.begin();
        let second = feed.begin();
        assert_eq!(feed.apply(ok(second, 1)), Outcome::Updated(1));
        assert_eq!(feed.apply(ok(first, 3)), Outcome::Stale);
        assert_eq!(feed.items().len(), 1);
    }

    #[test]
    fn older_fetch_shown_until_newer_arrives() {
        let mut feed = Feed::new();
        let first = feed.begin();
        let second = feed.begin();
        assert_eq!(feed.apply(ok(first, 3)), Outcome::Updated(3));
        assert!(feed.is_pending());
        assert_eq!(feed.apply(ok(second, 2)), Outcome::Updated(2));
        assert!(!feed.is_pending());
    }

    #[test]
    fn older_success_after_newer_failure_is_discarded() {
        let mut feed = Feed::new();
        let first = feed.begin();
        let second = feed.begin();
        assert!(matches!(feed.apply(failed(second)), Outcome::Failed(_)));
        assert_eq!(feed.apply(ok(first, 3)), Outcome::Stale);
        assert!(feed.items().is_empty());
    }

    /// Hands out queued results in order, one per fetch.
    struct Scripted(Mutex<Vec<Result<Vec<Item>, FetchError>>>);

    impl Source for Scripted {
        fn fetch(&self) -> Result<Vec<Item>, FetchError> {
            self.0.lock().unwrap().remove(0)
        }
    }

    #[test]
    fn dispatcher_delivers_to_feed() {
        let source = Scripted(Mutex::new(vec![
            Ok(items(3)),
            Err(FetchError::Transport("dns error".into())),
        ]));
        let dispatcher = Dispatcher::new(source);
        let mut feed = Feed::new();

        assert_eq!(dispatcher.fetch_into(&mut feed), Outcome::Updated(3));
        let outcome = dispatcher.fetch_into(&mut feed);
        assert!(matches!(outcome, Outcome::Failed(reason) if reason.contains("dns error")));
        assert_eq!(feed.items().len(), 3);
    }

    #[test]
    fn trigger_does_not_block_caller() {
        struct Slow;
        impl Source for Slow {
            fn fetch(&self) -> Result<Vec<Item>, FetchError> {
                thread::sleep(Duration::from_millis(200));
                Ok(Vec::new())
            }
        }
        let dispatcher = Dispatcher::new(Slow);
        let mut feed = Feed::new();
        let generation = feed.begin();
        dispatcher.trigger(generation);
        assert!(dispatcher.recv_timeout(Duration::from_millis(1)).is_none());
        let completion = dispatcher.recv().unwrap();
        assert_eq!(completion.generation, generation);
        assert_eq!(feed.apply(completion), Outcome::Updated(0));
    }

    /// Takes longer than a poll interval and counts its calls.
    struct Sluggish {
        delay: Duration,
        calls: AtomicUsize,
    }

    impl Source for Sluggish {
        fn fetch(&self) -> Result<Vec<Item>, FetchError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            thread::sleep(self.delay);
            Ok(items(1))
        }
    }

    #[test]
    fn watch_shows_fetches_slower_than_interval() {
        let dispatcher = Dispatcher::new(Sluggish {
            delay: Duration::from_millis(300),
            calls: AtomicUsize::new(0),
        });
        let mut feed = Feed::new();
        let (mut updated, mut stale) = (0, 0);
        dispatcher
            .watch(&mut feed, Duration::from_millis(100), Some(10), |_, outcome| {
                match outcome {
                    Outcome::Updated(_) => updated += 1,
                    Outcome::Stale => stale += 1,
                    Outcome::Failed(reason) => panic!("unexpected failure {reason}"),
                }
                Ok(())
            })
            .unwrap();
        assert!(updated >= 2, "only {updated} updates");
        assert_eq!(stale, 0);
        assert!(feed.updated_at().is_some());
        // Ticks are skipped while a fetch is running
        assert!(dispatcher.source.calls.load(Ordering::SeqCst) <= 4);
    }

    #[test]
    fn watch_reports_failures_and_keeps_going() {
        let source = Scripted(Mutex::new(vec![
            Ok(items(2)),
            Err(FetchError::Transport("timed out".into())),
            Ok(items(3)),
        ]));
        let dispatcher = Dispatcher::new(source);
        let mut feed = Feed::new();
        let mut outcomes = Vec::new();
        dispatcher
            .watch(&mut feed, Duration::from_millis(50), Some(3), |feed, outcome| {
                outcomes.push((outcome, feed.items().len()));
                Ok(())
            })
            .unwrap();
        assert_eq!(
            outcomes,
            vec![
                (Outcome::Updated(2), 2),
                (Outcome::Failed("request failed: timed out".into()), 2),
                (Outcome::Updated(3), 3),
            ]
        );
    }
}
