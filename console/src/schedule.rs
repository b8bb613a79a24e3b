//! Cancellable repeating tasks (status poll, dashboard auto refresh).

use std::future::Future;
use std::time::Duration;

use tokio::task::JoinHandle;
use tokio::time::{self, Instant, MissedTickBehavior};
use tokio_util::sync::CancellationToken;
use tracing::debug;

/// Handle to a task started by [`spawn_repeating`].
///
/// Stopping is idempotent and also happens on drop. A tick that is already
/// running is allowed to finish; no further ticks start.
#[derive(Debug)]
pub struct TaskHandle {
    name: &'static str,
    token: CancellationToken,
    join: JoinHandle<()>,
}

impl TaskHandle {
    pub fn stop(&self) {
        if !self.token.is_cancelled() {
            debug!("Stopping repeating task {}", self.name);
            self.token.cancel();
        }
    }

    pub fn is_stopped(&self) -> bool {
        self.token.is_cancelled()
    }

    /// True once the task has exited (after `stop` and any in-flight tick).
    pub fn is_finished(&self) -> bool {
        self.join.is_finished()
    }

    pub fn name(&self) -> &'static str {
        self.name
    }
}

impl Drop for TaskHandle {
    fn drop(&mut self) {
        self.token.cancel();
    }
}

/// Run `tick` every `period`, first one `period` after the call.
///
/// Ticks run one at a time on the spawned task; if a tick outlasts the
/// period the missed ticks are skipped rather than bunched up.
pub fn spawn_repeating<F, Fut>(name: &'static str, period: Duration, mut tick: F) -> TaskHandle
where
    F: FnMut() -> Fut + Send + 'static,
    Fut: Future<Output = ()> + Send + 'static,
{
    let token = CancellationToken::new();
    let cancelled = token.clone();

    let join = tokio::spawn(async move {
        let mut interval = time::interval_at(Instant::now() + period, period);
        interval.set_missed_tick_behavior(MissedTickBehavior::Skip);
        debug!("Repeating task {name} started (every {period:?})");

        loop {
            tokio::select! {
                _ = cancelled.cancelled() => break,
                _ = interval.tick() => {}
            }
            // stop() may have raced with the tick firing
            if cancelled.is_cancelled() {
                break;
            }
            tick().await;
        }

        debug!("Repeating task {name} exited");
    });

    TaskHandle { name, token, join }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    fn counting(period: Duration) -> (TaskHandle, Arc<AtomicUsize>) {
        let count = Arc::new(AtomicUsize::new(0));
        let c = count.clone();
        let handle = spawn_repeating("test", period, move || {
            let c = c.clone();
            async move {
                c.fetch_add(1, Ordering::SeqCst);
            }
        });
        (handle, count)
    }

    #[tokio::test(start_paused = true)]
    async fn test_first_tick_after_one_period() {
        let (handle, count) = counting(Duration::from_secs(1));

        time::sleep(Duration::from_millis(500)).await;
        assert_eq!(count.load(Ordering::SeqCst), 0);

        time::sleep(Duration::from_millis(600)).await;
        assert_eq!(count.load(Ordering::SeqCst), 1);

        time::sleep(Duration::from_secs(2)).await;
        assert_eq!(count.load(Ordering::SeqCst), 3);
        handle.stop();
    }

    #[tokio::test(start_paused = true)]
    async fn test_stop_is_idempotent_and_final() {
        let (handle, count) = counting(Duration::from_secs(1));
        time::sleep(Duration::from_millis(2500)).await;
        assert_eq!(count.load(Ordering::SeqCst), 2);

        handle.stop();
        handle.stop();
        assert!(handle.is_stopped());

        time::sleep(Duration::from_secs(5)).await;
        assert_eq!(count.load(Ordering::SeqCst), 2);
        assert!(handle.is_finished());
    }

    #[tokio::test(start_paused = true)]
    async fn test_drop_stops_task() {
        let (handle, count) = counting(Duration::from_secs(1));
        drop(handle);
        time::sleep(Duration::from_secs(5)).await;
        assert_eq!(count.load(Ordering::SeqCst), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_slow_tick_never_overlaps() {
        let running = Arc::new(AtomicUsize::new(0));
        let max_seen = Arc::new(AtomicUsize::new(0));
        let (r, m) = (running.clone(), max_seen.clone());

        let handle = spawn_repeating("slow", Duration::from_secs(1), move || {
            let (r, m) = (r.clone(), m.clone());
            async move {
                let now = r.fetch_add(1, Ordering::SeqCst) + 1;
                m.fetch_max(now, Ordering::SeqCst);
                time::sleep(Duration::from_millis(2500)).await;
                r.fetch_sub(1, Ordering::SeqCst);
            }
        });

        time::sleep(Duration::from_secs(10)).await;
        handle.stop();
        assert_eq!(max_seen.load(Ordering::SeqCst), 1);
    }
}
