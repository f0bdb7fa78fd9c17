// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2026 Vallés Puig, Ramon

//! Geographic helpers shared by the clock, drift and presentation layers.

use qtty::Degrees;

/// Mean Earth radius used by [`great_circle_distance`], in kilometres.
pub const EARTH_RADIUS_KM: f64 = 6371.0;

/// Wraps any longitude into `[-180, 180)`.
///
/// Uses `((lon + 180) mod 360 + 360) mod 360 − 180`, so `180` maps to `-180`.
/// Values already in range are returned bit-for-bit. Non-finite input maps to
/// the prime meridian.
#[inline]
pub fn normalize_longitude(longitude: Degrees) -> Degrees {
    let lon = longitude.value();
    if !lon.is_finite() {
        return Degrees::new(0.0);
    }
    if (-180.0..180.0).contains(&lon) {
        return longitude;
    }
    let wrapped = ((lon + 180.0) % 360.0 + 360.0) % 360.0 - 180.0;
    Degrees::new(wrapped)
}

/// Haversine distance between two `(latitude, longitude)` points, in kilometres.
pub fn great_circle_distance(
    lat1: Degrees,
    lon1: Degrees,
    lat2: Degrees,
    lon2: Degrees,
) -> f64 {
    let phi1 = lat1.value().to_radians();
    let phi2 = lat2.value().to_radians();
    let d_phi = (lat2.value() - lat1.value()).to_radians();
    let d_lambda = (lon2.value() - lon1.value()).to_radians();

    let a = (d_phi / 2.0).sin().powi(2) + phi1.cos() * phi2.cos() * (d_lambda / 2.0).sin().powi(2);
    let central_angle = 2.0 * a.sqrt().atan2((1.0 - a).sqrt());
    central_angle * EARTH_RADIUS_KM
}

/// Formats a distance as whole kilometres with thousands separators: `"8,234 km"`.
pub fn format_distance(km: f64) -> String {
    let rounded = km.round() as i64;
    let digits = rounded.unsigned_abs().to_string();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3 + 4);
    if rounded < 0 {
        grouped.push('-');
    }
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }
    grouped.push_str(" km");
    grouped
}

/// Formats a position with hemisphere letters: `"39.9°N, 116.4°E"`.
pub fn format_coordinates(latitude: Degrees, longitude: Degrees) -> String {
    let lat = latitude.value();
    let lon = longitude.value();
    format!(
        "{:.1}°{}, {:.1}°{}",
        lat.abs(),
        if lat >= 0.0 { 'N' } else { 'S' },
        lon.abs(),
        if lon >= 0.0 { 'E' } else { 'W' }
    )
}

/// Coarse phase of the local solar day.
///
/// Boundaries assume a nominal 06:00 sunrise and 18:00 sunset in solar time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum DayPhase {
    /// 05:00 – 07:00
    Dawn,
    /// 07:00 – 12:00
    Morning,
    /// 12:00 – 14:00
    Noon,
    /// 14:00 – 17:00
    Afternoon,
    /// 17:00 – 19:00
    Dusk,
    /// 19:00 – 05:00
    Night,
}

impl DayPhase {
    const SUNRISE: f64 = 6.0;
    const SUNSET: f64 = 18.0;

    /// Classifies a solar hour of day (fractional, `0.0..24.0`).
    pub fn from_solar_hour(hour: f64) -> Self {
        let hour = hour.rem_euclid(24.0);
        if (Self::SUNRISE - 1.0..Self::SUNRISE + 1.0).contains(&hour) {
            Self::Dawn
        } else if (Self::SUNRISE + 1.0..12.0).contains(&hour) {
            Self::Morning
        } else if (12.0..14.0).contains(&hour) {
            Self::Noon
        } else if (14.0..Self::SUNSET - 1.0).contains(&hour) {
            Self::Afternoon
        } else if (Self::SUNSET - 1.0..Self::SUNSET + 1.0).contains(&hour) {
            Self::Dusk
        } else {
            Self::Night
        }
    }

    /// Lower-case label for display.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Dawn => "dawn",
            Self::Morning => "morning",
            Self::Noon => "noon",
            Self::Afternoon => "afternoon",
            Self::Dusk => "dusk",
            Self::Night => "night",
        }
    }
}

impl std::fmt::Display for DayPhase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}
