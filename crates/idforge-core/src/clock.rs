use jiff::Timestamp;

pub trait Clock: Send + Sync {
    /// Returns the current time of the clock. Read fresh on every call.
    fn now(&self) -> Timestamp;
    /// Block until the clock reaches the target time.
    fn wait_until(&self, target: Timestamp);
}

/// The real wall clock.
///
/// It may move backwards (NTP step corrections); generators detect that and
/// refuse to issue ids rather than relying on the clock being monotonic.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Timestamp {
        Timestamp::now()
    }

    fn wait_until(&self, target: Timestamp) {
        // Spin re-reading the clock. Callers only wait for the next tick
        // (at most one second), and they hold their generator lock while
        // doing it, so every caller of that generator stalls with them.
        while Timestamp::now() < target {
            std::hint::spin_loop();
            std::thread::yield_now();
        }
    }
}

#[cfg(any(test, feature = "test-util"))]
pub mod test_clock {
    use crate::clock::Clock;
    use jiff::{SignedDuration, Timestamp};
    use std::sync::{Arc, Mutex};

    /// A clock that only moves when told to.
    ///
    /// Clones share the same time, so a test can keep a handle while the
    /// generator owns another.
    #[derive(Clone)]
    pub struct ManualClock {
        inner: Arc<Mutex<ManualClockState>>,
    }

    struct ManualClockState {
        now: Timestamp,
        waits: usize,
    }

    impl ManualClock {
        pub fn new(now: Timestamp) -> Self {
            Self {
                inner: Arc::new(Mutex::new(ManualClockState { now, waits: 0 })),
            }
        }

        /// Moves the clock to `now`, backwards or forwards.
        pub fn set(&self, now: Timestamp) {
            self.state().now = now;
        }

        pub fn advance(&self, by: SignedDuration) {
            let mut state = self.state();
            state.now = state
                .now
                .checked_add(by)
                .expect("manual clock should stay within the timestamp range");
        }

        /// Number of times a generator had to wait on this clock.
        pub fn waits(&self) -> usize {
            self.state().waits
        }

        fn state(&self) -> std::sync::MutexGuard<'_, ManualClockState> {
            self.inner
                .lock()
                .expect("manual clock lock should not be poisoned")
        }
    }

    impl Clock for ManualClock {
        fn now(&self) -> Timestamp {
            self.state().now
        }

        fn wait_until(&self, target: Timestamp) {
            let mut state = self.state();
            state.waits += 1;
            // jump straight to the target instead of blocking
            if target > state.now {
                state.now = target;
            }
        }
    }

    #[test]
    fn manual_clock_works() {
        let base = Timestamp::from_second(0).unwrap();
        let clock = ManualClock::new(base);
        assert_eq!(clock.now(), base);

        let target = Timestamp::from_second(1000).unwrap();
        clock.wait_until(target);
        assert_eq!(clock.now(), target);
        assert_eq!(clock.waits(), 1);

        clock.set(base);
        assert_eq!(clock.now(), base);

        clock.advance(SignedDuration::from_millis(1));
        assert_eq!(clock.now().as_millisecond(), 1);
    }

    #[test]
    fn clones_share_time() {
        let clock = ManualClock::new(Timestamp::from_second(5).unwrap());
        let handle = clock.clone();
        handle.set(Timestamp::from_second(9).unwrap());
        assert_eq!(clock.now().as_second(), 9);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn system_clock_waits_for_target() {
        let clock = SystemClock;
        let target = clock.now() + jiff::SignedDuration::from_millis(2);
        clock.wait_until(target);
        assert!(clock.now() >= target);
    }
}
