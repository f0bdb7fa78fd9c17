// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2026 Vallés Puig, Ramon

//! Solar-time capsule engine
//!
//! Short messages ("capsules") are dropped at a place and an instant and can
//! be discovered only by people whose local **solar** clock currently reads
//! the same time of day. Replies reach the capsule's author in daily batches.
//!
//! # Core pieces
//!
//! - [`SolarInstant`] — UTC shifted by `longitude · 4 min`.
//! - [`zone_index`] — solar zone (one of 51 by default) of a longitude at an instant.
//! - [`subsolar_point`] — approximate point where the Sun is overhead.
//! - [`drifted_longitude`] — where a capsule is drawn as the planet turns.
//! - [`VisibilityFilter`] — discovery predicate (current zone ∪ own capsules).
//! - [`unlock_state`] / [`summarize_inbox`] — progressive reply disclosure.
//! - [`CapsuleService`] — creation and read flows over a [`CapsuleStore`].
//! - [`Interval<T>`] / [`UtcPeriod`] — half-open time windows.
//!
//! # Constants
//!
//! Every computation takes an [`EngineConfig`]; its default carries the
//! product values:
//!
//! | Constant | Default |
//! |----------|---------|
//! | zones per solar day | 51 |
//! | drift rate | 15° / h |
//! | disclosure band | 24 h |
//! | capsule lifetime | 7 d |
//!
//! # Time
//!
//! No function reads the system clock. The current instant is always an
//! explicit `DateTime<Utc>` argument, and a `now` earlier than a record's
//! creation is treated as zero elapsed time.
//!
//! ```
//! use chrono::{TimeZone, Utc};
//! use qtty::Degrees;
//! use solarcapsule::zone_for;
//!
//! // 04:00 UTC at 120°E is solar noon.
//! let at = Utc.with_ymd_and_hms(2024, 7, 1, 4, 0, 0).unwrap();
//! assert_eq!(zone_for(Degrees::new(120.0), at).index(), 25);
//! ```

mod config;
pub mod disclosure;
mod drift;
mod error;
pub mod geo;
pub(crate) mod instant;
pub mod lifecycle;
pub mod logging;
mod model;
mod period;
#[cfg(feature = "serde")]
mod serde_units;
mod solar_clock;
pub mod store;
mod zone_matcher;

// ── Re-exports ────────────────────────────────────────────────────────────

pub use config::{duration_to_hours, hours_to_duration, EngineConfig, MAX_BAND_COUNT, MINUTES_PER_DAY, MINUTES_PER_DEGREE};
pub use disclosure::{
    is_unlocked_for_author, summarize_inbox, unlock_state, DisclosureBand, InboxEntry, InboxItem,
    InboxSummary, ReplyPreview, UnlockState, Viewer,
};
pub use drift::{drifted_longitude, normalize_longitude};
pub use error::{EngineError, EngineResult, StoreError, StoreResult};
pub use geo::{great_circle_distance, DayPhase};
pub use instant::{elapsed_since, hours_elapsed, solar_offset, SolarInstant, TimeInstant};
pub use lifecycle::{CapsuleDetail, CapsuleService, GlobeMarker};
pub use model::{
    Capsule, CapsuleDraft, CapsuleId, Coordinates, NewCapsule, NewReply, Reply, ReplyDraft, ReplyId,
    UserId,
};
pub use period::{Interval, UtcPeriod};
pub use solar_clock::{day_phase, subsolar_point, zone_for, zone_index, zone_of, SolarZone, SubsolarPoint};
pub use store::{CapsuleStore, MemoryStore};
pub use zone_matcher::{visible_capsules, CapsuleFilter, CapsuleOrder, ReplyOrder, VisibilityFilter};
