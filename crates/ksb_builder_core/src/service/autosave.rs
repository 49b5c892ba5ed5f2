//! Interval-driven draft autosave.
//!
//! # Responsibility
//! - Fire `BuilderSession::autosave` on a fixed cadence until cancelled.
//!
//! # Invariants
//! - The session lock is held only for the synchronous autosave call.
//! - The first write happens one full interval after start, never at start.
//! - Late ticks are delayed, not bursted.
//! - A zero period never starts a loop; the task returns immediately.

use crate::repo::draft_repo::DraftRepository;
use crate::service::session::{AutosaveOutcome, BuilderSession};
use log::{debug, info, warn};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tokio::time::{interval_at, Instant, MissedTickBehavior};
use tokio_util::sync::CancellationToken;

/// Session shared between the UI event loop and the autosave task.
pub type SharedSession<R> = Arc<Mutex<BuilderSession<R>>>;

/// Spawns the autosave loop using the session's configured interval.
pub fn spawn_autosave<R>(session: SharedSession<R>, cancel: CancellationToken) -> JoinHandle<u64>
where
    R: DraftRepository + 'static,
{
    tokio::spawn(async move {
        let period = session.lock().await.config().autosave_interval();
        run_autosave(session, period, cancel).await
    })
}

/// Runs the autosave loop in the current task. Returns the number of
/// drafts written before cancellation, or `0` at once for a zero `period`.
pub async fn run_autosave<R>(
    session: SharedSession<R>,
    period: Duration,
    cancel: CancellationToken,
) -> u64
where
    R: DraftRepository,
{
    if period.is_zero() {
        warn!("event=autosave_start module=autosave status=error reason=zero_interval");
        return 0;
    }
    let mut ticker = interval_at(Instant::now() + period, period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
    let mut written = 0_u64;

    info!(
        "event=autosave_start module=autosave status=ok interval_secs={}",
        period.as_secs()
    );
    loop {
        tokio::select! {
            _ = cancel.cancelled() => break,
            _ = ticker.tick() => {
                let outcome = session.lock().await.autosave();
                if let AutosaveOutcome::Saved { saved_at } = outcome {
                    written += 1;
                    debug!("event=autosave_tick module=autosave status=ok saved_at={saved_at}");
                }
            }
        }
    }
    info!("event=autosave_stop module=autosave status=ok written={written}");
    written
}
