//! Debounce policy for free-text search input.
//!
//! Keystrokes are held back until the input has been quiet for the configured
//! delay; only then is the text committed to the filters.

use std::time::Duration;

use tokio::sync::mpsc;
use tokio::time::{sleep_until, Instant};
use tracing::debug;

use crate::controller::SearchController;
use crate::filters::FilterUpdate;
use crate::sources::ListingSource;

/// Quiet period a search box waits before committing its text
pub const DEFAULT_SEARCH_DEBOUNCE: Duration = Duration::from_secs(1);

/// Keeps the latest value and releases it once `delay` has passed without a newer one
#[derive(Debug)]
pub struct Debouncer<T> {
    delay: Duration,
    pending: Option<(T, Instant)>,
}

impl<T> Debouncer<T> {
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            pending: None,
        }
    }

    /// Replace the pending value and restart the quiet period.
    pub fn push(&mut self, value: T, at: Instant) {
        self.pending = Some((value, at + self.delay));
    }

    pub fn deadline(&self) -> Option<Instant> {
        self.pending.as_ref().map(|(_, deadline)| *deadline)
    }

    /// The pending value, if its quiet period is over at `now`.
    pub fn poll(&mut self, now: Instant) -> Option<T> {
        match self.deadline() {
            Some(deadline) if deadline <= now => self.flush(),
            _ => None,
        }
    }

    /// Release the pending value regardless of the deadline.
    pub fn flush(&mut self) -> Option<T> {
        self.pending.take().map(|(value, _)| value)
    }
}

/// Commit debounced search text from `input` to the controller's filters.
///
/// Runs until `input` closes; text still pending at that point is committed.
/// Fetches run on their own tasks, so input keeps flowing while a page loads.
pub async fn forward_search<S>(
    mut input: mpsc::Receiver<String>,
    delay: Duration,
    controller: SearchController<S>,
) where
    S: ListingSource + ?Sized + 'static,
{
    let mut debouncer = Debouncer::new(delay);
    loop {
        let deadline = debouncer.deadline();
        tokio::select! {
            received = input.recv() => match received {
                Some(text) => debouncer.push(text, Instant::now()),
                None => {
                    if let Some(text) = debouncer.flush() {
                        commit(&controller, text).await;
                    }
                    break;
                }
            },
            _ = sleep_until(deadline.unwrap_or_else(Instant::now)), if deadline.is_some() => {
                if let Some(text) = debouncer.poll(Instant::now()) {
                    commit(&controller, text).await;
                }
            }
        }
    }
}

async fn commit<S>(controller: &SearchController<S>, text: String)
where
    S: ListingSource + ?Sized + 'static,
{
    debug!("Committing search text {:?}", text);
    controller
        .submit_filters(FilterUpdate::new().search(text))
        .await;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::SearchSession;
    use crate::testing::{page, ScriptedSource};
    use std::sync::Arc;
    use tokio::time::sleep;

    #[test]
    fn releases_latest_value_after_quiet_period() {
        let start = Instant::now();
        let mut debouncer = Debouncer::new(Duration::from_millis(1000));
        debouncer.push("s", start);
        debouncer.push("se", start + Duration::from_millis(400));

        assert_eq!(debouncer.poll(start + Duration::from_millis(1000)), None);
        assert_eq!(debouncer.poll(start + Duration::from_millis(1400)), Some("se"));
        assert_eq!(debouncer.poll(start + Duration::from_millis(5000)), None);
    }

    #[tokio::test(start_paused = true)]
    async fn typing_burst_commits_once() {
        let source = Arc::new(ScriptedSource::new());
        source.respond(None, 0, Ok(page(&["a"], 1)));
        let controller = SearchController::new(SearchSession::default(), Arc::clone(&source));

        let (tx, rx) = mpsc::channel(8);
        let task = tokio::spawn(forward_search(rx, DEFAULT_SEARCH_DEBOUNCE, controller.clone()));

        for text in ["s", "se", "sea"] {
            tx.send(text.to_string()).await.unwrap();
            sleep(Duration::from_millis(300)).await;
        }
        assert!(source.calls().is_empty());

        sleep(Duration::from_millis(800)).await;
        let calls = source.calls();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].search.as_deref(), Some("sea"));
        assert_eq!(controller.filters().await.search, "sea");

        drop(tx);
        task.await.unwrap();
    }

    #[tokio::test(start_paused = true)]
    async fn slow_fetch_does_not_hold_back_newer_text() {
        let source = Arc::new(ScriptedSource::new());
        let gate = source.gate(None, 0);
        let controller = SearchController::new(SearchSession::default(), Arc::clone(&source));

        let (tx, rx) = mpsc::channel(8);
        let task = tokio::spawn(forward_search(rx, DEFAULT_SEARCH_DEBOUNCE, controller.clone()));

        tx.send("villa".to_string()).await.unwrap();
        sleep(Duration::from_millis(1500)).await;
        assert_eq!(controller.filters().await.search, "villa");

        tx.send("villa bopal".to_string()).await.unwrap();
        sleep(Duration::from_secs(5)).await;
        assert_eq!(controller.filters().await.search, "villa bopal");
        let searches: Vec<Option<String>> =
            source.calls().into_iter().map(|p| p.search).collect();
        assert_eq!(
            searches,
            [Some("villa".to_string()), Some("villa bopal".to_string())]
        );

        drop(tx);
        task.await.unwrap();
        gate.notify_waiters();
    }
}
