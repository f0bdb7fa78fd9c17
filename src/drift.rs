// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2026 Vallés Puig, Ramon

//! Westward drift of a capsule's displayed longitude.
//!
//! A capsule is pinned to the solar clock that was current where it was
//! dropped. As the planet turns, that moment moves west at the drift rate
//! (15° per hour by default), so after `h` hours the capsule is drawn at
//!
//! ```text
//! normalize(origin − h · drift_rate)      ∈ [-180, 180)
//! ```
//!
//! The drifted longitude is presentational only. It is never fed back into
//! zone assignment: a capsule's [`SolarZone`](crate::SolarZone) is fixed at
//! creation and stored on the record, while the drifted longitude is derived
//! fresh on every read.

use crate::config::EngineConfig;
use crate::instant::hours_elapsed;
use chrono::{DateTime, Utc};
use qtty::Degrees;

pub use crate::geo::normalize_longitude;

/// Displayed longitude of a point dropped at `origin` at `created_at`, seen at `now`.
///
/// Clock skew (`now < created_at`) yields the normalized origin.
pub fn drifted_longitude(
    origin: Degrees,
    created_at: DateTime<Utc>,
    now: DateTime<Utc>,
    config: &EngineConfig,
) -> Degrees {
    let hours = hours_elapsed(created_at, now).value();
    let raw = origin.value() - hours * config.drift_rate.value();
    normalize_longitude(Degrees::new(raw))
}
