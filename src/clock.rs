use chrono::{Local, NaiveDateTime};

/// Source of the reference "now" used to resolve abbreviated dates.
///
/// Listings drop the century (OS/400, NT) or the whole year (recent Unix
/// entries), so every date resolution is relative to this value. Tests pin it
/// with [`FixedClock`].
pub trait Clock: Send + Sync {
    /// Current wall-clock time, in the same local frame as listing timestamps.
    fn now(&self) -> NaiveDateTime;
}

/// Local wall clock.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> NaiveDateTime {
        Local::now().naive_local()
    }
}

/// A clock frozen at a single instant.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FixedClock(pub NaiveDateTime);

impl Clock for FixedClock {
    fn now(&self) -> NaiveDateTime {
        self.0
    }
}
