//! Wall-clock abstraction used to stamp `created_at` / `updated_at`.
//!
//! Entities read the time through [`now`], which consults the clock installed
//! for the current thread (the system clock unless a test installed another).
//! Timestamps are truncated to milliseconds so they survive an ISO-8601
//! round trip unchanged.

use std::cell::RefCell;
use std::sync::{Arc, Mutex};

use chrono::{DateTime, Duration, SubsecRound, Utc};

/// Source of the current time.
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

/// Real wall clock.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now().trunc_subsecs(3)
    }
}

/// Manually driven clock for tests.
#[derive(Debug)]
pub struct FixedClock {
    current: Mutex<DateTime<Utc>>,
}

impl FixedClock {
    pub fn new(at: DateTime<Utc>) -> Self {
        Self {
            current: Mutex::new(at.trunc_subsecs(3)),
        }
    }

    /// Clock pinned to 2024-01-01T00:00:00Z.
    pub fn epoch() -> Self {
        Self::new(DateTime::<Utc>::from_timestamp(1_704_067_200, 0).unwrap_or_default())
    }

    pub fn set(&self, at: DateTime<Utc>) {
        if let Ok(mut current) = self.current.lock() {
            *current = at.trunc_subsecs(3);
        }
    }

    pub fn advance(&self, by: Duration) {
        if let Ok(mut current) = self.current.lock() {
            *current += by;
        }
    }
}

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        self.current
            .lock()
            .map(|current| *current)
            .unwrap_or_else(|poisoned| *poisoned.into_inner())
    }
}

thread_local! {
    static CURRENT: RefCell<Option<Arc<dyn Clock>>> = const { RefCell::new(None) };
}

/// Current time according to the installed clock.
pub fn now() -> DateTime<Utc> {
    CURRENT.with(|current| match current.borrow().as_ref() {
        Some(clock) => clock.now(),
        None => SystemClock.now(),
    })
}

/// Install `clock` for the current thread until the guard is dropped.
pub fn install(clock: Arc<dyn Clock>) -> ClockGuard {
    let previous = CURRENT.with(|current| current.borrow_mut().replace(clock));
    ClockGuard { previous }
}

/// Restores the previously installed clock on drop.
#[must_use = "the clock is uninstalled when the guard is dropped"]
pub struct ClockGuard {
    previous: Option<Arc<dyn Clock>>,
}

impl Drop for ClockGuard {
    fn drop(&mut self) {
        let previous = self.previous.take();
        CURRENT.with(|current| *current.borrow_mut() = previous);
    }
}
