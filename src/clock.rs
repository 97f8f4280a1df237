use std::fmt;
use std::sync::Mutex;
use std::sync::MutexGuard;
use std::time::Duration;
use std::time::SystemTime;


/// Source of the wall-clock timestamps recorded on spans.
///
/// Abstracting the clock keeps time-dependent behaviour testable:
/// production tracers read a [`SystemClock`] while tests drive a
/// [`ManualClock`] forward by hand to observe exact durations.
pub trait Clock: fmt::Debug + Send + Sync {
    /// Returns the current time.
    fn now(&self) -> SystemTime;
}


/// Wall clock for production use.
#[derive(Clone, Copy, Debug, Default)]
pub struct SystemClock;

impl SystemClock {
    /// Creates a new wall clock.
    pub fn new() -> SystemClock {
        SystemClock
    }
}

impl Clock for SystemClock {
    fn now(&self) -> SystemTime {
        SystemTime::now()
    }
}


/// Clock that only advances when explicitly told to.
///
/// # Examples
///
/// ```
/// use std::time::Duration;
/// use std::time::SystemTime;
///
/// use tracelet::Clock;
/// use tracelet::ManualClock;
///
/// let clock = ManualClock::new(SystemTime::UNIX_EPOCH);
/// clock.advance(Duration::from_millis(10));
/// assert_eq!(clock.now(), SystemTime::UNIX_EPOCH + Duration::from_millis(10));
/// ```
#[derive(Debug)]
pub struct ManualClock {
    now: Mutex<SystemTime>,
}

impl ManualClock {
    /// Creates a clock stopped at the given time.
    pub fn new(start: SystemTime) -> ManualClock {
        ManualClock {
            now: Mutex::new(start),
        }
    }
}

impl ManualClock {
    /// Moves the clock forward by the given amount.
    pub fn advance(&self, by: Duration) {
        *self.lock() += by;
    }

    /// Moves the clock to the given time, forwards or backwards.
    pub fn set(&self, to: SystemTime) {
        *self.lock() = to;
    }

    fn lock(&self) -> MutexGuard<'_, SystemTime> {
        self.now.lock().unwrap_or_else(|err| err.into_inner())
    }
}

impl Clock for ManualClock {
    fn now(&self) -> SystemTime {
        *self.lock()
    }
}
