// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2026 Vallés Puig, Ramon

//! # Solar clock — zone assignment and sub-solar point
//!
//! A **solar zone** is one of `total_zones` equal slices of the local mean
//! solar day. Two people share a zone when their solar clocks read roughly
//! the same time of day, wherever they are. The zone of a location is a pure
//! function of `(longitude, instant)`:
//!
//! ```text
//! solar      = at + longitude · 4 min
//! minutes    = solar.hour · 60 + solar.minute        (0 ..= 1439)
//! zone_width = 1440 / total_zones                    (≈28.235 min for 51)
//! zone       = floor(minutes / zone_width) mod total_zones
//! ```
//!
//! Only the solar time of day matters; the calendar day the solar clock
//! falls on is discarded.
//!
//! ## Sub-solar point
//!
//! [`subsolar_point`] approximates where the Sun is overhead using the
//! fractional-year Fourier series for the Equation of Time and the solar
//! declination (Spencer 1971, as popularised by NOAA). It feeds day/night
//! shading only and is accurate to a fraction of a degree; no discovery or
//! unlock decision depends on it.

use crate::config::EngineConfig;
use crate::geo::{normalize_longitude, DayPhase};
use crate::instant::SolarInstant;
use chrono::{DateTime, Datelike, Timelike, Utc};
use qtty::{Degrees, Minutes};
use std::f64::consts::PI;
use std::fmt;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Index of a solar zone, always in `[0, total_zones)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(transparent))]
pub struct SolarZone(u32);

impl SolarZone {
    /// Wraps `index` into the zone ring of `config`.
    #[inline]
    pub fn new(index: u32, config: &EngineConfig) -> Self {
        Self(index % config.total_zones.max(1))
    }

    /// The raw zone index.
    #[inline]
    pub const fn index(&self) -> u32 {
        self.0
    }

    /// Solar minute of day at which this zone begins.
    pub fn start_minute(&self, config: &EngineConfig) -> Minutes {
        Minutes::new(f64::from(self.0) * config.zone_width().value())
    }

    /// Solar minutes `[start, end)` covered by this zone.
    pub fn span(&self, config: &EngineConfig) -> (Minutes, Minutes) {
        let start = self.start_minute(config);
        (start, Minutes::new(start.value() + config.zone_width().value()))
    }

    /// The zone a location moves into next as the Earth turns.
    #[inline]
    pub fn next(&self, config: &EngineConfig) -> Self {
        Self::new(self.0 + 1, config)
    }
}

impl fmt::Display for SolarZone {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "zone {}", self.0)
    }
}

/// Solar zone of `longitude` at instant `at`.
///
/// Any finite longitude is accepted; values outside `[-180, 180]` wrap.
pub fn zone_index(longitude: Degrees, at: DateTime<Utc>, config: &EngineConfig) -> SolarZone {
    let solar = SolarInstant::from_utc(longitude, at);
    zone_of(&solar, config)
}

/// [`zone_index`] with the default 51-zone configuration.
#[inline]
pub fn zone_for(longitude: Degrees, at: DateTime<Utc>) -> SolarZone {
    zone_index(longitude, at, &EngineConfig::default())
}

/// Solar zone of an already shifted solar instant.
pub fn zone_of(solar: &SolarInstant, config: &EngineConfig) -> SolarZone {
    let minutes = solar.minutes_of_day().value();
    let slot = (minutes / config.zone_width().value()).floor() as u32;
    SolarZone::new(slot, config)
}

/// Coarse phase of the solar day at `longitude`.
pub fn day_phase(longitude: Degrees, at: DateTime<Utc>) -> DayPhase {
    let solar = SolarInstant::from_utc(longitude, at);
    DayPhase::from_solar_hour(solar.hour_of_day().value())
}

/// Geographic point where the Sun is at the zenith.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct SubsolarPoint {
    #[cfg_attr(feature = "serde", serde(with = "crate::serde_units::degrees"))]
    pub longitude: Degrees,
    /// Equals the solar declination.
    #[cfg_attr(feature = "serde", serde(with = "crate::serde_units::degrees"))]
    pub latitude: Degrees,
}

/// Equation of Time in minutes for fractional-year angle `gamma` (radians).
fn equation_of_time(gamma: f64) -> f64 {
    229.18
        * (0.000075 + 0.001868 * gamma.cos()
            - 0.032077 * gamma.sin()
            - 0.014615 * (2.0 * gamma).cos()
            - 0.040849 * (2.0 * gamma).sin())
}

/// Solar declination in radians for fractional-year angle `gamma` (radians).
fn declination(gamma: f64) -> f64 {
    0.006918 - 0.399912 * gamma.cos() + 0.070257 * gamma.sin()
        - 0.006758 * (2.0 * gamma).cos()
        + 0.000907 * (2.0 * gamma).sin()
        - 0.002697 * (3.0 * gamma).cos()
        + 0.00148 * (3.0 * gamma).sin()
}

/// Approximate sub-solar point at `at`.
pub fn subsolar_point(at: DateTime<Utc>) -> SubsolarPoint {
    let day_of_year = f64::from(at.ordinal());
    let hour = f64::from(at.hour());
    let gamma = (2.0 * PI / 365.0) * (day_of_year - 1.0 + (hour - 12.0) / 24.0);

    let eot_minutes = equation_of_time(gamma);
    let utc_hours = hour + f64::from(at.minute()) / 60.0 + f64::from(at.second()) / 3600.0;
    let longitude = 180.0 - (utc_hours + eot_minutes / 60.0) * 15.0;

    SubsolarPoint {
        longitude: normalize_longitude(Degrees::new(longitude)),
        latitude: Degrees::new(declination(gamma).to_degrees()),
    }
}
