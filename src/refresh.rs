//! Periodic refresh of the administrator view.
//!
//! Workers change state from their own devices; the administrator side
//! re-reads the store on a fixed interval and tolerates stale reads in
//! between. Two forms are offered:
//!
//! - [`RefreshSchedule`] is stepped by the caller with explicit timestamps,
//!   so tests control time completely.
//! - [`spawn_refresh`] drives a callback from a tokio interval and returns a
//!   [`RefreshHandle`] that cancels it.

use std::future::Future;

use chrono::{Duration, NaiveDateTime};
use tokio::sync::oneshot;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{debug, warn};

/// A refresh interval stepped by caller-supplied time.
///
/// The first poll is due immediately. Missed ticks collapse into one.
///
/// # Example
///
/// ```
/// use chrono::{Duration, NaiveDate};
/// use shift_ledger::refresh::RefreshSchedule;
///
/// let t0 = NaiveDate::from_ymd_opt(2025, 3, 4).unwrap().and_hms_opt(9, 0, 0).unwrap();
/// let mut schedule = RefreshSchedule::new(Duration::seconds(5), t0);
///
/// assert!(schedule.poll(t0));
/// assert!(!schedule.poll(t0 + Duration::seconds(4)));
/// assert!(schedule.poll(t0 + Duration::seconds(5)));
///
/// schedule.cancel();
/// assert!(!schedule.poll(t0 + Duration::seconds(60)));
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RefreshSchedule {
    interval: Duration,
    next_due: NaiveDateTime,
    cancelled: bool,
}

impl RefreshSchedule {
    /// Creates a schedule whose first refresh is due at `start`.
    pub fn new(interval: Duration, start: NaiveDateTime) -> Self {
        Self {
            interval,
            next_due: start,
            cancelled: false,
        }
    }

    /// The refresh interval.
    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// When the next refresh is due, `None` once cancelled.
    pub fn next_due(&self) -> Option<NaiveDateTime> {
        (!self.cancelled).then_some(self.next_due)
    }

    /// Returns true if a refresh is due at `now`, and schedules the next one.
    pub fn poll(&mut self, now: NaiveDateTime) -> bool {
        if self.cancelled || now < self.next_due {
            return false;
        }
        self.next_due = now + self.interval;
        true
    }

    /// Stops the schedule. Later polls never fire.
    pub fn cancel(&mut self) {
        self.cancelled = true;
    }

    /// True once [`cancel`](Self::cancel) was called.
    pub fn is_cancelled(&self) -> bool {
        self.cancelled
    }
}

/// Cancels a refresh loop started by [`spawn_refresh`].
#[derive(Debug)]
pub struct RefreshHandle {
    cancel: oneshot::Sender<()>,
    task: JoinHandle<u64>,
}

impl RefreshHandle {
    /// Stops the loop and waits for it to exit. Returns the number of ticks run,
    /// or zero when the loop panicked.
    pub async fn cancel(self) -> u64 {
        let _ = self.cancel.send(());
        match self.task.await {
            Ok(ticks) => ticks,
            Err(err) => {
                warn!(error = %err, "Refresh loop ended abnormally");
                0
            }
        }
    }
}

/// Runs `on_tick` every `interval` until the returned handle is cancelled.
///
/// The first tick fires immediately.
pub fn spawn_refresh<F, Fut>(interval: std::time::Duration, mut on_tick: F) -> RefreshHandle
where
    F: FnMut() -> Fut + Send + 'static,
    Fut: Future<Output = ()> + Send + 'static,
{
    let (cancel, mut cancelled) = oneshot::channel::<()>();

    let task = tokio::spawn(async move {
        let mut ticker = tokio::time::interval(interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        let mut ticks = 0u64;
        loop {
            tokio::select! {
                biased;
                _ = &mut cancelled => break,
                _ = ticker.tick() => {
                    on_tick().await;
                    ticks += 1;
                }
            }
        }
        debug!(ticks, "Refresh loop stopped");
        ticks
    });

    RefreshHandle { cancel, task }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn t0() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2025, 3, 4)
            .unwrap()
            .and_hms_opt(9, 0, 0)
            .unwrap()
    }

    #[test]
    fn test_schedule_collapses_missed_ticks() {
        let mut schedule = RefreshSchedule::new(Duration::seconds(5), t0());
        assert!(schedule.poll(t0()));

        // a long pause yields a single refresh, then the cadence restarts
        let late = t0() + Duration::seconds(23);
        assert!(schedule.poll(late));
        assert!(!schedule.poll(late + Duration::seconds(1)));
        assert_eq!(schedule.next_due(), Some(late + Duration::seconds(5)));
    }

    #[test]
    fn test_cancelled_schedule_has_no_next_due() {
        let mut schedule = RefreshSchedule::new(Duration::seconds(5), t0());
        schedule.cancel();
        assert!(schedule.is_cancelled());
        assert_eq!(schedule.next_due(), None);
        assert!(!schedule.poll(t0()));
    }

    #[tokio::test(start_paused = true)]
    async fn test_spawned_refresh_ticks_until_cancelled() {
        let count = Arc::new(AtomicUsize::new(0));
        let seen = Arc::clone(&count);

        let handle = spawn_refresh(std::time::Duration::from_secs(5), move || {
            let seen = Arc::clone(&seen);
            async move {
                seen.fetch_add(1, Ordering::SeqCst);
            }
        });

        // ticks at 0s, 5s and 10s
        tokio::time::sleep(std::time::Duration::from_secs(11)).await;
        let ticks = handle.cancel().await;

        assert_eq!(ticks, 3);
        assert_eq!(count.load(Ordering::SeqCst), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn test_panicked_refresh_reports_zero_ticks() {
        let handle = spawn_refresh(std::time::Duration::from_secs(5), || async {
            let board_read_failed = true;
            assert!(!board_read_failed, "board read failed");
        });

        tokio::time::sleep(std::time::Duration::from_secs(1)).await;
        assert_eq!(handle.cancel().await, 0);
    }
}
