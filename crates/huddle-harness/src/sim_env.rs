//! Virtual-time environment.
//!
//! `SimEnv` implements [`Environment`] with a clock that only moves when a
//! test advances it. Clones share the clock, so a test can hold one handle
//! while the client under test holds another.

use std::{
    ops::{Add, Sub},
    sync::{
        Arc,
        atomic::{AtomicU64, Ordering},
    },
    time::Duration,
};

use huddle_core::{Environment, NaiveTime};

/// Wall-clock time of day at virtual time zero: 9:00:00 AM.
const START_OF_DAY_SECS: u32 = 9 * 60 * 60;

const SECS_PER_DAY: u64 = 24 * 60 * 60;

/// Point on the virtual clock, measured from simulation start.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct SimInstant(Duration);

impl SimInstant {
    /// Time elapsed since simulation start.
    pub fn since_start(self) -> Duration {
        self.0
    }
}

impl Add<Duration> for SimInstant {
    type Output = Self;

    fn add(self, rhs: Duration) -> Self {
        Self(self.0 + rhs)
    }
}

impl Sub for SimInstant {
    type Output = Duration;

    fn sub(self, rhs: Self) -> Duration {
        self.0.saturating_sub(rhs.0)
    }
}

/// Simulated environment with a shared virtual clock.
#[derive(Debug, Clone, Default)]
pub struct SimEnv {
    /// Nanoseconds since simulation start.
    nanos: Arc<AtomicU64>,
}

impl SimEnv {
    /// Create an environment at virtual time zero.
    pub fn new() -> Self {
        Self::default()
    }

    /// Move the clock forward.
    pub fn advance(&self, duration: Duration) {
        let nanos = u64::try_from(duration.as_nanos()).unwrap_or(u64::MAX);
        self.nanos.fetch_add(nanos, Ordering::SeqCst);
    }

    /// Time elapsed since simulation start.
    pub fn elapsed(&self) -> Duration {
        Duration::from_nanos(self.nanos.load(Ordering::SeqCst))
    }
}

impl Environment for SimEnv {
    type Instant = SimInstant;

    fn now(&self) -> SimInstant {
        SimInstant(self.elapsed())
    }

    /// Advances the virtual clock instead of waiting, then yields so other
    /// tasks get a turn.
    fn sleep(&self, duration: Duration) -> impl Future<Output = ()> + Send {
        self.advance(duration);
        tokio::task::yield_now()
    }

    fn time_of_day(&self) -> NaiveTime {
        let secs = (u64::from(START_OF_DAY_SECS) + self.elapsed().as_secs()) % SECS_PER_DAY;
        u32::try_from(secs)
            .ok()
            .and_then(|secs| NaiveTime::from_num_seconds_from_midnight_opt(secs, 0))
            .unwrap_or_default()
    }
}
