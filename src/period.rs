// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2026 Vallés Puig, Ramon

//! Half-open time intervals.
//!
//! This module provides:
//! - [`Interval<T>`]: generic `[start, end)` interval over any [`TimeInstant`]
//! - [`UtcPeriod`]: alias for `Interval<DateTime<Utc>>`, used for disclosure
//!   band windows

use crate::config::duration_to_hours;
use crate::instant::TimeInstant;
use chrono::{DateTime, Utc};
use qtty::Hours;
use std::fmt;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Represents an interval between two instants.
///
/// Intervals are half-open: `start` is inside, `end` is not.
///
/// # Examples
///
/// ```
/// use chrono::{Duration, TimeZone, Utc};
/// use solarcapsule::UtcPeriod;
///
/// let start = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
/// let day = UtcPeriod::new(start, start + Duration::hours(24));
///
/// assert!(day.contains(&start));
/// assert!(!day.contains(&(start + Duration::hours(24))));
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Interval<T: TimeInstant> {
    pub start: T,
    pub end: T,
}

/// UTC interval alias.
pub type UtcPeriod = Interval<DateTime<Utc>>;

impl<T: TimeInstant> Interval<T> {
    /// Creates a new interval between two time instants.
    pub fn new(start: T, end: T) -> Self {
        Interval { start, end }
    }

    /// Returns the duration of the interval as the difference between end and start.
    pub fn duration(&self) -> T::Duration {
        self.end.difference(&self.start)
    }

    /// Whether `instant` lies in `[start, end)`.
    #[inline]
    pub fn contains(&self, instant: &T) -> bool {
        *instant >= self.start && *instant < self.end
    }
}

impl<T: TimeInstant + fmt::Display> fmt::Display for Interval<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} to {}", self.start, self.end)
    }
}

impl Interval<DateTime<Utc>> {
    /// Returns the duration in fractional hours.
    pub fn duration_hours(&self) -> Hours {
        duration_to_hours(self.duration())
    }

    /// Returns the duration in whole seconds.
    pub fn duration_seconds(&self) -> i64 {
        self.duration().num_seconds()
    }
}
