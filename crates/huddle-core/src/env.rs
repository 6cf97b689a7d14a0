//! Environment abstraction for deterministic testing.
//!
//! Decouples client logic from the system clock. Production code uses real
//! monotonic time and the local wall clock; simulation uses a virtual clock
//! that only moves when the test advances it, so decay windows can be
//! exercised without sleeping.

use std::{
    future::Future,
    ops::{Add, Sub},
    time::Duration,
};

use chrono::NaiveTime;

/// Abstract environment providing time and async sleep.
///
/// Implementations MUST guarantee that `now()` never goes backwards.
pub trait Environment: Clone + Send + Sync + 'static {
    /// The instant type used by this environment.
    ///
    /// Production environments use `std::time::Instant`, simulation uses a
    /// virtual instant.
    type Instant: Copy
        + Ord
        + Send
        + Sync
        + std::fmt::Debug
        + Add<Duration, Output = Self::Instant>
        + Sub<Output = Duration>;

    /// Current time (monotonic).
    fn now(&self) -> Self::Instant;

    /// Sleeps for the specified duration.
    ///
    /// Only driver code awaits this; the state machines never do.
    fn sleep(&self, duration: Duration) -> impl Future<Output = ()> + Send;

    /// Local wall-clock time of day, used to stamp outgoing messages.
    fn time_of_day(&self) -> NaiveTime;
}
