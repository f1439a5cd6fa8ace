//! Per-request completion watch.
//!
//! Each pending `txt2img` request gets a detached task that polls the
//! completion log on a fixed interval until an unconsumed locator line
//! appears, fetches the artifact behind it, marks the line consumed, and
//! resolves the waiting HTTP response through a oneshot channel.
//!
//! The watch outlives the response on purpose. A fetch failure answers the
//! current caller with a failure but re-arms the poll loop, so a completion
//! that shows up later is still consumed; the two lifetimes (HTTP response,
//! resolved at most once, and the log watch) are independent. Watches end
//! only on successful consumption or server shutdown.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::oneshot;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;

use sdrelay_store::CompletionLog;

use crate::artifact::ArtifactFetcher;

/// Terminal outcome delivered to the waiting HTTP handler.
#[derive(Debug)]
pub enum WatchOutcome {
    /// Artifact fetched and encoded; the log line is marked consumed.
    Resolved {
        /// Base64-encoded artifacts (one per consumed completion).
        images: Vec<String>,
    },
    /// The current response failed. The watch keeps polling in the
    /// background.
    Failed(String),
}

/// Spawn a detached task polling the log until a completion is consumed.
///
/// The returned receiver resolves at most once. Dropping it does not stop
/// the watch; only a successful consumption or `cancel` does.
pub fn spawn_completion_watch(
    log: Arc<CompletionLog>,
    fetcher: ArtifactFetcher,
    poll_interval: Duration,
    cancel: CancellationToken,
) -> oneshot::Receiver<WatchOutcome> {
    let (tx, rx) = oneshot::channel();
    tokio::spawn(watch_loop(log, fetcher, poll_interval, cancel, tx));
    rx
}

async fn watch_loop(
    log: Arc<CompletionLog>,
    fetcher: ArtifactFetcher,
    poll_interval: Duration,
    cancel: CancellationToken,
    tx: oneshot::Sender<WatchOutcome>,
) {
    // Becomes `None` once the HTTP response has been answered; the watch
    // itself carries on regardless.
    let mut response = Some(tx);

    let mut interval = tokio::time::interval(poll_interval);
    interval.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        tokio::select! {
            _ = cancel.cancelled() => {
                tracing::debug!("Completion watch cancelled");
                return;
            }
            _ = interval.tick() => {}
        }

        let locator = match log.read_last_unconsumed().await {
            Ok(Some(locator)) => locator,
            Ok(None) => continue,
            Err(e) => {
                tracing::error!(error = %e, "Completion watch could not read the log");
                fail(&mut response, format!("log read failed: {e}"));
                continue;
            }
        };

        tracing::info!(locator = %locator, "Unconsumed completion found");

        let encoded = match fetcher.fetch_base64(&locator).await {
            Ok(encoded) => encoded,
            Err(e) => {
                tracing::error!(locator = %locator, error = %e, "Artifact fetch failed; re-arming poll");
                fail(&mut response, format!("artifact fetch failed: {e}"));
                continue;
            }
        };

        // Only mark consumed once the artifact is safely in hand; the log
        // line is the only reference to it.
        if let Err(e) = log.mark_last_consumed().await {
            tracing::error!(locator = %locator, error = %e, "Could not mark completion consumed");
            fail(&mut response, format!("log write failed: {e}"));
            continue;
        }

        match response.take() {
            Some(tx) => {
                if tx
                    .send(WatchOutcome::Resolved {
                        images: vec![encoded],
                    })
                    .is_err()
                {
                    tracing::debug!(locator = %locator, "Caller gone; completion consumed anyway");
                }
            }
            None => {
                tracing::info!(
                    locator = %locator,
                    "Completion consumed after the response already failed"
                );
            }
        }
        return;
    }
}

/// Answer the waiting caller with a failure, if it is still waiting.
fn fail(response: &mut Option<oneshot::Sender<WatchOutcome>>, reason: String) {
    if let Some(tx) = response.take() {
        let _ = tx.send(WatchOutcome::Failed(reason));
    }
}
