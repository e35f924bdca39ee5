//! One-shot, deferrable, cancelable deadline timer.
//!
//! A [`TimeoutExecutor`] owns a dedicated watchdog thread parked on a
//! condition variable until the current deadline. Callers push the
//! deadline forward with [`TimeoutExecutor::defer`] before and after each
//! potentially unbounded unit of work, so the deadline measures time since
//! the last progress marker rather than total elapsed time. The watchdog
//! re-checks the deadline on every wake, which absorbs the race where the
//! deadline moved while it slept.
//!
//! Firing and cancellation are mutually exclusive terminal events: at most
//! one happens per instance, and a fired timer can never be rearmed.

use parking_lot::{Condvar, Mutex};
use std::sync::Arc;
use std::thread::JoinHandle;
use std::time::{Duration, Instant};

struct TimerState {
    deadline: Instant,
    fired: bool,
    cancelled: bool,
}

struct Inner {
    state: Mutex<TimerState>,
    signal: Condvar,
}

/// A deadline timer that runs an action exactly once unless deferred
/// forever or cancelled.
pub struct TimeoutExecutor {
    inner: Arc<Inner>,
    watchdog: Option<JoinHandle<()>>,
}

impl TimeoutExecutor {
    /// Start a watchdog that fires `action` once the initial duration
    /// elapses without a further [`defer`](Self::defer).
    pub fn new(action: impl FnOnce() + Send + 'static, initial: Duration) -> Self {
        let inner = Arc::new(Inner {
            state: Mutex::new(TimerState {
                deadline: Instant::now() + initial,
                fired: false,
                cancelled: false,
            }),
            signal: Condvar::new(),
        });
        let watchdog_inner = Arc::clone(&inner);
        let watchdog = std::thread::spawn(move || {
            let mut state = watchdog_inner.state.lock();
            loop {
                if state.cancelled {
                    return;
                }
                let deadline = state.deadline;
                if Instant::now() >= deadline {
                    state.fired = true;
                    break;
                }
                // Wakes on defer, cancel, or deadline expiry; loop re-checks.
                let _ = watchdog_inner.signal.wait_until(&mut state, deadline);
            }
            drop(state);
            action();
        });
        Self {
            inner,
            watchdog: Some(watchdog),
        }
    }

    /// Push the deadline to `duration` from now.
    ///
    /// Returns `false` if it is too late: the action has already fired.
    /// Deferring after cancellation returns `true` but has no effect.
    pub fn defer(&self, duration: Duration) -> bool {
        let mut state = self.inner.state.lock();
        if state.fired {
            return false;
        }
        if !state.cancelled {
            state.deadline = Instant::now() + duration;
            self.inner.signal.notify_one();
        }
        true
    }

    /// Permanently disable firing and stop the watchdog.
    ///
    /// Returns `false` if the action has already fired. Repeated
    /// cancellation is allowed and has no further effect.
    pub fn cancel(&self) -> bool {
        let mut state = self.inner.state.lock();
        if state.fired {
            return false;
        }
        state.cancelled = true;
        self.inner.signal.notify_one();
        true
    }

    /// Whether the action has fired.
    #[must_use]
    pub fn executed(&self) -> bool {
        self.inner.state.lock().fired
    }
}

impl Drop for TimeoutExecutor {
    fn drop(&mut self) {
        self.cancel();
        if let Some(handle) = self.watchdog.take() {
            let _ = handle.join();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::thread::sleep;

    fn counting_timer(initial_ms: u64) -> (TimeoutExecutor, Arc<AtomicUsize>) {
        let count = Arc::new(AtomicUsize::new(0));
        let count2 = Arc::clone(&count);
        let timer = TimeoutExecutor::new(
            move || {
                count2.fetch_add(1, Ordering::SeqCst);
            },
            Duration::from_millis(initial_ms),
        );
        (timer, count)
    }

    #[test]
    fn test_fires_after_duration() {
        let (timer, count) = counting_timer(20);
        sleep(Duration::from_millis(150));
        assert_eq!(count.load(Ordering::SeqCst), 1);
        assert!(timer.executed());
    }

    #[test]
    fn test_does_not_fire_before_duration() {
        let (timer, count) = counting_timer(500);
        sleep(Duration::from_millis(50));
        assert_eq!(count.load(Ordering::SeqCst), 0);
        assert!(!timer.executed());
        timer.cancel();
    }

    #[test]
    fn test_defer_pushes_deadline_forward() {
        let (timer, count) = counting_timer(80);
        sleep(Duration::from_millis(40));
        assert!(timer.defer(Duration::from_millis(400)));
        // Past the original deadline but well before the deferred one.
        sleep(Duration::from_millis(120));
        assert_eq!(count.load(Ordering::SeqCst), 0);
        timer.cancel();
    }

    #[test]
    fn test_deferred_deadline_eventually_fires() {
        let (timer, count) = counting_timer(30);
        assert!(timer.defer(Duration::from_millis(30)));
        sleep(Duration::from_millis(200));
        assert_eq!(count.load(Ordering::SeqCst), 1);
        assert!(!timer.defer(Duration::from_millis(30)));
    }

    #[test]
    fn test_cancel_prevents_firing() {
        let (timer, count) = counting_timer(40);
        assert!(timer.cancel());
        sleep(Duration::from_millis(150));
        assert_eq!(count.load(Ordering::SeqCst), 0);
        assert!(!timer.executed());
    }

    #[test]
    fn test_cancel_after_fire_returns_false() {
        let (timer, count) = counting_timer(10);
        sleep(Duration::from_millis(120));
        assert_eq!(count.load(Ordering::SeqCst), 1);
        assert!(!timer.cancel());
        assert!(!timer.defer(Duration::from_millis(10)));
    }

    #[test]
    fn test_cancel_is_idempotent() {
        let (timer, _count) = counting_timer(200);
        assert!(timer.cancel());
        assert!(timer.cancel());
    }

    #[test]
    fn test_defer_after_cancel_does_not_rearm() {
        let (timer, count) = counting_timer(200);
        assert!(timer.cancel());
        assert!(timer.defer(Duration::from_millis(10)));
        sleep(Duration::from_millis(100));
        assert_eq!(count.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_fires_exactly_once() {
        let (timer, count) = counting_timer(10);
        sleep(Duration::from_millis(150));
        assert_eq!(count.load(Ordering::SeqCst), 1);
        sleep(Duration::from_millis(50));
        assert_eq!(count.load(Ordering::SeqCst), 1);
        drop(timer);
        assert_eq!(count.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_repeated_defer_keeps_watchdog_quiet() {
        let (timer, count) = counting_timer(60);
        for _ in 0..5 {
            sleep(Duration::from_millis(25));
            assert!(timer.defer(Duration::from_millis(60)));
        }
        assert_eq!(count.load(Ordering::SeqCst), 0);
        timer.cancel();
    }
}
