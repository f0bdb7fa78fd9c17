// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2026 Vallés Puig, Ramon

//! Solar-adjusted instants and the [`TimeInstant`] abstraction.
//!
//! [`SolarInstant`] is a UTC instant shifted by the longitude-dependent
//! offset of local mean solar time (`4 min` per degree). It keeps its own
//! naive wall clock, so its calendar fields (hour, minute, date) describe the
//! solar clock at that longitude and never the UTC clock. Zoning only ever
//! reads the time-of-day fields.
//!
//! The elapsed-time helpers at the bottom clamp clock skew: a `now` earlier
//! than a record's creation instant is treated as zero elapsed time.

use crate::config::{duration_to_hours, MINUTES_PER_DEGREE};
use crate::geo::normalize_longitude;
use chrono::{DateTime, Duration, NaiveDateTime, Timelike, Utc};
use qtty::{Degrees, Hours, Minutes};
use std::fmt;

// ═══════════════════════════════════════════════════════════════════════════
// TimeInstant trait
// ═══════════════════════════════════════════════════════════════════════════

/// Trait for types that represent a point in time.
///
/// Types implementing this trait can be used as endpoints of an
/// [`Interval`](crate::Interval).
pub trait TimeInstant: Copy + Clone + PartialEq + PartialOrd + Sized {
    /// The duration type used for arithmetic operations.
    type Duration;

    /// Compute the difference between two time instants.
    fn difference(&self, other: &Self) -> Self::Duration;
}

impl TimeInstant for DateTime<Utc> {
    type Duration = Duration;

    fn difference(&self, other: &Self) -> Self::Duration {
        *self - *other
    }
}

// ═══════════════════════════════════════════════════════════════════════════
// SolarInstant
// ═══════════════════════════════════════════════════════════════════════════

/// Local mean solar time at a longitude.
#[derive(Debug, Copy, Clone, PartialEq, PartialOrd)]
pub struct SolarInstant {
    wall_clock: NaiveDateTime,
    longitude: Degrees,
}

impl SolarInstant {
    /// Shift `at` by the solar offset of `longitude`.
    ///
    /// Longitudes outside `[-180, 180)` are wrapped first, so any finite value
    /// yields a valid wall clock. Non-finite longitudes behave as the prime
    /// meridian.
    pub fn from_utc(longitude: Degrees, at: DateTime<Utc>) -> Self {
        let longitude = normalize_longitude(longitude);
        let wall_clock = at.naive_utc() + solar_offset(longitude);
        Self {
            wall_clock,
            longitude,
        }
    }

    /// The solar wall clock (calendar fields belong to the solar clock).
    #[inline]
    pub fn wall_clock(&self) -> NaiveDateTime {
        self.wall_clock
    }

    /// The normalized longitude this instant was computed for.
    #[inline]
    pub fn longitude(&self) -> Degrees {
        self.longitude
    }

    /// Whole minutes since solar midnight (`0..1440`); seconds are discarded.
    #[inline]
    pub fn minutes_of_day(&self) -> Minutes {
        Minutes::new(f64::from(self.wall_clock.hour() * 60 + self.wall_clock.minute()))
    }

    /// Fractional solar hour of day (`0.0..24.0`), including seconds.
    pub fn hour_of_day(&self) -> Hours {
        let seconds = self.wall_clock.num_seconds_from_midnight();
        Hours::new(f64::from(seconds) / 3600.0)
    }
}

impl fmt::Display for SolarInstant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} (solar, {:+.2}°)",
            self.wall_clock.format("%Y-%m-%d %H:%M:%S"),
            self.longitude.value()
        )
    }
}

/// Clock offset of local mean solar time from UTC, at millisecond resolution.
pub fn solar_offset(longitude: Degrees) -> Duration {
    let minutes = longitude.value() * MINUTES_PER_DEGREE;
    Duration::milliseconds((minutes * 60_000.0).round() as i64)
}

// ═══════════════════════════════════════════════════════════════════════════
// Elapsed time
// ═══════════════════════════════════════════════════════════════════════════

/// Time elapsed from `since` to `now`, clamped at zero.
pub fn elapsed_since(since: DateTime<Utc>, now: DateTime<Utc>) -> Duration {
    if now < since {
        tracing::debug!(%since, %now, "clock skew: now precedes creation, clamping to zero");
        return Duration::zero();
    }
    now - since
}

/// [`elapsed_since`] expressed in fractional hours.
#[inline]
pub fn hours_elapsed(since: DateTime<Utc>, now: DateTime<Utc>) -> Hours {
    duration_to_hours(elapsed_since(since, now))
}

// ═══════════════════════════════════════════════════════════════════════════
// Tests
// ═══════════════════════════════════════════════════════════════════════════
