// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2026 Vallés Puig, Ramon

//! Engine constants injected into every computation.
//!
//! [`EngineConfig::default()`] carries the product values:
//!
//! | Field | Default | Meaning |
//! |-------|---------|---------|
//! | `total_zones` | 51 | solar zones per solar day (≈28.235 min each) |
//! | `drift_rate` | 15° | westward drift per elapsed hour |
//! | `band_width` | 24 h | width of one disclosure band |
//! | `lifetime` | 7 d | capsule lifetime (`expires_at − created_at`) |
//!
//! With the `serde` feature a config can be loaded from RON; missing fields
//! fall back to the defaults:
//!
//! ```text
//! (total_zones: 24, band_width: 12.0)
//! ```

use crate::error::{EngineError, EngineResult};
use chrono::Duration;
use qtty::{Days, Degrees, Hour, Hours, Minutes};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Minutes in one (solar) day.
pub const MINUTES_PER_DAY: f64 = 1440.0;

/// Minutes of clock time per degree of longitude (`1440 / 360`).
pub const MINUTES_PER_DEGREE: f64 = 4.0;

/// Upper bound on `lifetime / band_width`.
pub const MAX_BAND_COUNT: u32 = 10_000;

const MILLIS_PER_HOUR: f64 = 3_600_000.0;

/// Tunable constants of the zoning, drift and disclosure models.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct EngineConfig {
    /// Number of solar zones a solar day is split into.
    pub total_zones: u32,
    /// Degrees of westward drift per elapsed hour.
    #[cfg_attr(feature = "serde", serde(with = "crate::serde_units::degrees"))]
    pub drift_rate: Degrees,
    /// Width of one disclosure band; also the author's reply delay.
    #[cfg_attr(feature = "serde", serde(with = "crate::serde_units::hours"))]
    pub band_width: Hours,
    /// Time between capsule creation and expiry.
    #[cfg_attr(feature = "serde", serde(with = "crate::serde_units::days"))]
    pub lifetime: Days,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            total_zones: 51,
            drift_rate: Degrees::new(15.0),
            band_width: Hours::new(24.0),
            lifetime: Days::new(7.0),
        }
    }
}

impl EngineConfig {
    pub fn with_total_zones(mut self, total_zones: u32) -> Self {
        self.total_zones = total_zones;
        self
    }

    pub fn with_drift_rate(mut self, drift_rate: Degrees) -> Self {
        self.drift_rate = drift_rate;
        self
    }

    pub fn with_band_width(mut self, band_width: Hours) -> Self {
        self.band_width = band_width;
        self
    }

    pub fn with_lifetime(mut self, lifetime: Days) -> Self {
        self.lifetime = lifetime;
        self
    }

    /// Checks the invariants every consumer of the config relies on.
    ///
    /// # Errors
    /// Returns [`EngineError::InvalidConfig`] when there are no zones, when the
    /// drift rate is not finite, when the band width is under one millisecond,
    /// when the lifetime is shorter than one band or spans more than
    /// [`MAX_BAND_COUNT`] bands, or when the lifetime does not fit a
    /// millisecond duration.
    pub fn validate(&self) -> EngineResult<()> {
        if self.total_zones == 0 {
            return Err(EngineError::InvalidConfig(
                "total_zones must be at least 1".to_string(),
            ));
        }
        if !self.drift_rate.value().is_finite() {
            return Err(EngineError::InvalidConfig(format!(
                "drift_rate must be finite, got {}",
                self.drift_rate
            )));
        }
        let band_hours = self.band_width.value();
        if !band_hours.is_finite() || band_hours * MILLIS_PER_HOUR < 1.0 {
            return Err(EngineError::InvalidConfig(format!(
                "band_width must be positive, got {}",
                self.band_width
            )));
        }
        let lifetime_hours = self.lifetime_hours().value();
        if !lifetime_hours.is_finite() || lifetime_hours < band_hours {
            return Err(EngineError::InvalidConfig(format!(
                "lifetime must cover at least one band, got {}",
                self.lifetime
            )));
        }
        let bands = lifetime_hours / band_hours;
        if bands > f64::from(MAX_BAND_COUNT) + 1e-9 {
            return Err(EngineError::InvalidConfig(format!(
                "lifetime spans {bands:.0} bands, at most {MAX_BAND_COUNT} allowed"
            )));
        }
        let lifetime_ms = lifetime_hours * MILLIS_PER_HOUR;
        if lifetime_ms >= i64::MAX as f64 || Duration::try_milliseconds(lifetime_ms.round() as i64).is_none() {
            return Err(EngineError::InvalidConfig(format!(
                "lifetime {} does not fit a millisecond duration",
                self.lifetime
            )));
        }
        Ok(())
    }

    /// Parses a RON document and validates the result.
    #[cfg(feature = "serde")]
    pub fn from_ron_str(text: &str) -> EngineResult<Self> {
        let config: Self = ron::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    /// Width of one solar zone.
    #[inline]
    pub fn zone_width(&self) -> Minutes {
        Minutes::new(MINUTES_PER_DAY / f64::from(self.total_zones))
    }

    /// The lifetime expressed in hours.
    #[inline]
    pub fn lifetime_hours(&self) -> Hours {
        self.lifetime.to::<Hour>()
    }

    /// Number of disclosure bands covering the lifetime (7 by default).
    pub fn band_count(&self) -> u32 {
        let ratio = self.lifetime_hours().value() / self.band_width.value();
        // 1e-9 absorbs float noise such as 7 d / 24 h = 7.000000000000001.
        (ratio - 1e-9).ceil().max(1.0) as u32
    }

    /// The band width as a chrono duration (millisecond resolution).
    #[inline]
    pub fn band_duration(&self) -> Duration {
        hours_to_duration(self.band_width)
    }

    /// The lifetime as a chrono duration (millisecond resolution).
    #[inline]
    pub fn lifetime_duration(&self) -> Duration {
        hours_to_duration(self.lifetime_hours())
    }
}

/// Converts an hour quantity to a chrono duration, rounded to the millisecond.
pub fn hours_to_duration(hours: Hours) -> Duration {
    Duration::milliseconds((hours.value() * MILLIS_PER_HOUR).round() as i64)
}

/// Converts a chrono duration to fractional hours.
pub fn duration_to_hours(duration: Duration) -> Hours {
    Hours::new(duration.num_milliseconds() as f64 / MILLIS_PER_HOUR)
}
