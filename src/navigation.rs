//! Navigation and wait conditions on a live page.

use crate::{CaptureError, Result};
use chromiumoxide::cdp::browser_protocol::network::{
    EventLoadingFailed, EventLoadingFinished, EventRequestWillBeSent,
};
use chromiumoxide::listeners::EventStream;
use chromiumoxide::Page;
use futures::{Future, Stream, StreamExt};
use std::collections::HashSet;
use std::time::{Duration, Instant};
use tokio::time::{sleep, timeout};
use tracing::debug;

/// Interval between selector lookups.
pub const SELECTOR_POLL_INTERVAL: Duration = Duration::from_millis(100);

/// Request ids seen on the wire, in whatever order their events arrive.
///
/// Events from separate listeners are not ordered relative to each other, so
/// a request may be reported finished before it is reported started. Such
/// ids are remembered as settled and cancel the later start.
#[derive(Debug, Default)]
pub struct InFlightRequests {
    pending: HashSet<String>,
    settled: HashSet<String>,
}

impl InFlightRequests {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn started(&mut self, id: String) {
        if !self.settled.remove(&id) {
            self.pending.insert(id);
        }
    }

    /// Record a request that finished or failed.
    pub fn finished(&mut self, id: String) {
        if !self.pending.remove(&id) {
            self.settled.insert(id);
        }
    }

    pub fn is_idle(&self) -> bool {
        self.pending.is_empty()
    }

    pub fn len(&self) -> usize {
        self.pending.len()
    }
}

/// Resolve once no request has been in flight for `quiet`.
///
/// Also resolves when every stream has ended.
pub async fn wait_until_quiet<S, F, X>(started: S, finished: F, failed: X, quiet: Duration)
where
    S: Stream<Item = String>,
    F: Stream<Item = String>,
    X: Stream<Item = String>,
{
    futures::pin_mut!(started, finished, failed);
    let mut requests = InFlightRequests::new();

    loop {
        tokio::select! {
            biased;

            Some(id) = started.next() => requests.started(id),
            Some(id) = finished.next() => requests.finished(id),
            Some(id) = failed.next() => requests.finished(id),
            _ = sleep(quiet), if requests.is_idle() => return,
            else => {
                debug!("Network event streams closed with {} requests pending", requests.len());
                return;
            }
        }
    }
}

/// Network listeners for one page.
///
/// Must be created before navigation starts, otherwise the first requests
/// are never seen.
pub struct NetworkIdle {
    started: EventStream<EventRequestWillBeSent>,
    finished: EventStream<EventLoadingFinished>,
    failed: EventStream<EventLoadingFailed>,
}

impl NetworkIdle {
    pub async fn subscribe(page: &Page) -> Result<Self> {
        Ok(Self {
            started: page.event_listener::<EventRequestWillBeSent>().await?,
            finished: page.event_listener::<EventLoadingFinished>().await?,
            failed: page.event_listener::<EventLoadingFailed>().await?,
        })
    }

    pub async fn wait(self, quiet: Duration) {
        wait_until_quiet(
            self.started.map(|e| e.request_id.inner().clone()),
            self.finished.map(|e| e.request_id.inner().clone()),
            self.failed.map(|e| e.request_id.inner().clone()),
            quiet,
        )
        .await
    }
}

/// Navigate `page` to `url` and wait for the network to go quiet, all
/// within `limit`.
pub async fn navigate(page: &Page, url: &str, limit: Duration, quiet: Duration) -> Result<()> {
    let navigation_error = |reason: String| CaptureError::Navigation {
        url: url.to_string(),
        reason,
    };

    let idle = NetworkIdle::subscribe(page).await?;
    let load = async {
        page.goto(url).await.map_err(|e| navigation_error(e.to_string()))?;
        idle.wait(quiet).await;
        Ok::<_, CaptureError>(())
    };

    match timeout(limit, load).await {
        Ok(result) => result,
        Err(_) => Err(navigation_error(format!("timed out after {limit:?}"))),
    }
}

/// Poll for `selector` until it matches an element or `limit` expires.
pub async fn wait_for_selector(page: &Page, selector: &str, limit: Duration) -> Result<()> {
    let found = poll_until(limit, SELECTOR_POLL_INTERVAL, || async move {
        match page.find_element(selector).await {
            Ok(_) => true,
            Err(e) => {
                debug!("Selector {} not found yet: {}", selector, e);
                false
            }
        }
    })
    .await;

    if found {
        Ok(())
    } else {
        Err(CaptureError::SelectorTimeout {
            selector: selector.to_string(),
            timeout: limit,
        })
    }
}

/// Run `check` every `interval` until it returns `true`. Returns `false`
/// once `limit` has elapsed without a match.
pub async fn poll_until<P, Fut>(limit: Duration, interval: Duration, mut check: P) -> bool
where
    P: FnMut() -> Fut,
    Fut: Future<Output = bool>,
{
    let start = Instant::now();

    loop {
        if check().await {
            return true;
        }

        if start.elapsed() >= limit {
            return false;
        }

        sleep(interval).await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures::channel::mpsc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn ids(prefix: &str, count: usize) -> Vec<String> {
        (0..count).map(|i| format!("{prefix}.{i}")).collect()
    }

    #[test]
    fn test_empty_page_is_idle() {
        assert!(InFlightRequests::new().is_idle());
    }

    #[test]
    fn test_started_then_finished() {
        let mut requests = InFlightRequests::new();
        requests.started("1000.1".to_string());
        requests.started("1000.2".to_string());
        assert_eq!(requests.len(), 2);

        requests.finished("1000.1".to_string());
        assert!(!requests.is_idle());

        requests.finished("1000.2".to_string());
        assert!(requests.is_idle());
    }

    #[test]
    fn test_finished_before_started() {
        let mut requests = InFlightRequests::new();
        requests.finished("1000.7".to_string());
        requests.started("1000.7".to_string());

        assert!(requests.is_idle());
    }

    #[test]
    fn test_failed_request_counts_as_done() {
        let mut requests = InFlightRequests::new();
        requests.started("1000.3".to_string());
        requests.started("1000.4".to_string());
        requests.finished("1000.3".to_string());
        // loadingFailed, e.g. a blocked tracker
        requests.finished("1000.4".to_string());

        assert!(requests.is_idle());
    }

    #[test]
    fn test_unfinished_request_keeps_page_busy() {
        let mut requests = InFlightRequests::new();
        requests.started("1000.5".to_string());
        requests.finished("1000.6".to_string());

        assert!(!requests.is_idle());
        assert_eq!(requests.len(), 1);
    }

    #[tokio::test]
    async fn test_wait_resolves_with_buffered_events_in_any_order() {
        for _ in 0..50 {
            let (started_tx, started_rx) = mpsc::unbounded();
            let (finished_tx, finished_rx) = mpsc::unbounded();
            let (failed_tx, failed_rx) = mpsc::unbounded::<String>();

            // Everything is already buffered by the time the wait begins,
            // completions queued ahead of their starts.
            for id in ids("finished", 5) {
                finished_tx.unbounded_send(id).unwrap();
            }
            for id in ids("failed", 2) {
                failed_tx.unbounded_send(id).unwrap();
            }
            for id in ids("finished", 5).into_iter().chain(ids("failed", 2)) {
                started_tx.unbounded_send(id).unwrap();
            }

            let wait = wait_until_quiet(
                started_rx,
                finished_rx,
                failed_rx,
                Duration::from_millis(20),
            );
            tokio_test::assert_ok!(tokio::time::timeout(Duration::from_secs(2), wait).await);

            // Open senders keep the streams from ending early.
            drop((started_tx, finished_tx, failed_tx));
        }
    }

    #[tokio::test]
    async fn test_wait_blocks_while_request_pending() {
        let (started_tx, started_rx) = mpsc::unbounded();
        let (_finished_tx, finished_rx) = mpsc::unbounded::<String>();
        let (_failed_tx, failed_rx) = mpsc::unbounded::<String>();

        started_tx.unbounded_send("1000.1".to_string()).unwrap();

        let wait = wait_until_quiet(started_rx, finished_rx, failed_rx, Duration::from_millis(10));
        let outcome = tokio::time::timeout(Duration::from_millis(200), wait).await;

        assert!(outcome.is_err());
        drop(started_tx);
    }

    #[tokio::test]
    async fn test_wait_with_no_traffic_resolves_after_quiet_period() {
        let (_started_tx, started_rx) = mpsc::unbounded::<String>();
        let (_finished_tx, finished_rx) = mpsc::unbounded::<String>();
        let (_failed_tx, failed_rx) = mpsc::unbounded::<String>();

        let start = Instant::now();
        wait_until_quiet(started_rx, finished_rx, failed_rx, Duration::from_millis(30)).await;

        assert!(start.elapsed() >= Duration::from_millis(30));
    }

    #[tokio::test]
    async fn test_poll_until_gives_up_after_limit() {
        let counter = AtomicUsize::new(0);
        let calls = &counter;
        let start = Instant::now();

        let found = poll_until(Duration::from_millis(150), Duration::from_millis(20), || async move {
            calls.fetch_add(1, Ordering::SeqCst);
            false
        })
        .await;

        assert!(!found);
        assert!(start.elapsed() >= Duration::from_millis(150));
        assert!(calls.load(Ordering::SeqCst) > 1);
    }

    #[tokio::test]
    async fn test_poll_until_stops_on_first_match() {
        let counter = AtomicUsize::new(0);
        let calls = &counter;

        let found = poll_until(Duration::from_secs(5), Duration::from_millis(5), || async move {
            calls.fetch_add(1, Ordering::SeqCst) >= 2
        })
        .await;

        assert!(found);
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }
}
