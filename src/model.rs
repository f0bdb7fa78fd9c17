// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2026 Vallés Puig, Ramon

//! Capsule and reply records, their identifiers, and creation requests.
//!
//! Records are immutable once stored. A [`CapsuleDraft`] / [`ReplyDraft`] is
//! the fully-derived record minus its id; the store assigns the id and turns
//! the draft into a [`Capsule`] / [`Reply`].

use crate::error::{EngineError, EngineResult};
use crate::solar_clock::SolarZone;
use chrono::{DateTime, Utc};
use qtty::Degrees;
use std::fmt;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

// ── Identifiers ─────────────────────────────────────────────────────────────

/// Identifier of a stored capsule.
#[derive(Debug, Clone, Copy, Hash, Eq, PartialEq, Ord, PartialOrd)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(transparent))]
pub struct CapsuleId(u64);

/// Identifier of a stored reply.
#[derive(Debug, Clone, Copy, Hash, Eq, PartialEq, Ord, PartialOrd)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(transparent))]
pub struct ReplyId(u64);

/// Identifier of a user, as handed over by the session layer.
#[derive(Debug, Clone, Copy, Hash, Eq, PartialEq, Ord, PartialOrd)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(transparent))]
pub struct UserId(u64);

macro_rules! impl_numeric_id {
    ($T:ident) => {
        impl $T {
            #[inline]
            pub const fn new(raw: u64) -> Self {
                Self(raw)
            }

            /// The raw numeric value.
            #[inline]
            pub const fn get(&self) -> u64 {
                self.0
            }
        }

        impl From<u64> for $T {
            fn from(raw: u64) -> Self {
                Self(raw)
            }
        }

        impl From<$T> for u64 {
            fn from(id: $T) -> u64 {
                id.0
            }
        }

        impl fmt::Display for $T {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "#{}", self.0)
            }
        }
    };
}

impl_numeric_id!(CapsuleId);
impl_numeric_id!(ReplyId);
impl_numeric_id!(UserId);

// ── Coordinates ─────────────────────────────────────────────────────────────

/// A geographic position in degrees.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Coordinates {
    #[cfg_attr(feature = "serde", serde(with = "crate::serde_units::degrees"))]
    pub latitude: Degrees,
    #[cfg_attr(feature = "serde", serde(with = "crate::serde_units::degrees"))]
    pub longitude: Degrees,
}

impl Coordinates {
    /// Builds a position, rejecting anything outside latitude `[-90, 90]` and
    /// longitude `[-180, 180]`. Out-of-range values are never clamped.
    ///
    /// # Errors
    /// [`EngineError::InvalidCoordinate`] for non-finite or out-of-range input.
    pub fn new(latitude: Degrees, longitude: Degrees) -> EngineResult<Self> {
        let coords = Self {
            latitude,
            longitude,
        };
        coords.validate()?;
        Ok(coords)
    }

    /// Re-checks the ranges enforced by [`Coordinates::new`].
    pub fn validate(&self) -> EngineResult<()> {
        let lat = self.latitude.value();
        let lon = self.longitude.value();
        let valid = lat.is_finite()
            && lon.is_finite()
            && (-90.0..=90.0).contains(&lat)
            && (-180.0..=180.0).contains(&lon);
        if valid {
            Ok(())
        } else {
            Err(EngineError::InvalidCoordinate {
                latitude: lat,
                longitude: lon,
            })
        }
    }
}

impl fmt::Display for Coordinates {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&crate::geo::format_coordinates(self.latitude, self.longitude))
    }
}

// ── Records ─────────────────────────────────────────────────────────────────

/// A stored capsule.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Capsule {
    pub id: CapsuleId,
    pub author_id: UserId,
    pub content_text: String,
    pub image_ref: Option<String>,
    pub audio_ref: Option<String>,
    pub origin: Coordinates,
    /// Fixed at creation from the origin longitude and `created_at`.
    pub solar_zone: SolarZone,
    pub created_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}

impl Capsule {
    /// Whether the capsule is still discoverable at `now`.
    #[inline]
    pub fn is_live(&self, now: DateTime<Utc>) -> bool {
        self.expires_at > now
    }

    #[inline]
    pub fn is_authored_by(&self, user: UserId) -> bool {
        self.author_id == user
    }
}

/// A stored reply.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Reply {
    pub id: ReplyId,
    pub capsule_id: CapsuleId,
    pub author_id: UserId,
    pub content_text: String,
    pub created_at: DateTime<Utc>,
}

// ── Requests and drafts ─────────────────────────────────────────────────────

/// What a client submits to drop a capsule.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct NewCapsule {
    pub author_id: UserId,
    pub content_text: String,
    pub image_ref: Option<String>,
    pub audio_ref: Option<String>,
    #[cfg_attr(feature = "serde", serde(with = "crate::serde_units::degrees"))]
    pub latitude: Degrees,
    #[cfg_attr(feature = "serde", serde(with = "crate::serde_units::degrees"))]
    pub longitude: Degrees,
}

impl NewCapsule {
    pub fn new(author_id: UserId, content_text: impl Into<String>, latitude: f64, longitude: f64) -> Self {
        Self {
            author_id,
            content_text: content_text.into(),
            image_ref: None,
            audio_ref: None,
            latitude: Degrees::new(latitude),
            longitude: Degrees::new(longitude),
        }
    }

    pub fn with_image(mut self, image_ref: impl Into<String>) -> Self {
        self.image_ref = Some(image_ref.into());
        self
    }

    pub fn with_audio(mut self, audio_ref: impl Into<String>) -> Self {
        self.audio_ref = Some(audio_ref.into());
        self
    }
}

/// What a client submits to answer a capsule.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct NewReply {
    pub capsule_id: CapsuleId,
    pub author_id: UserId,
    pub content_text: String,
}

impl NewReply {
    pub fn new(capsule_id: CapsuleId, author_id: UserId, content_text: impl Into<String>) -> Self {
        Self {
            capsule_id,
            author_id,
            content_text: content_text.into(),
        }
    }
}

/// A validated capsule waiting for an id.
#[derive(Debug, Clone, PartialEq)]
pub struct CapsuleDraft {
    pub author_id: UserId,
    pub content_text: String,
    pub image_ref: Option<String>,
    pub audio_ref: Option<String>,
    pub origin: Coordinates,
    pub solar_zone: SolarZone,
    pub created_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}

impl CapsuleDraft {
    pub fn into_capsule(self, id: CapsuleId) -> Capsule {
        Capsule {
            id,
            author_id: self.author_id,
            content_text: self.content_text,
            image_ref: self.image_ref,
            audio_ref: self.audio_ref,
            origin: self.origin,
            solar_zone: self.solar_zone,
            created_at: self.created_at,
            expires_at: self.expires_at,
        }
    }
}

/// A validated reply waiting for an id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReplyDraft {
    pub capsule_id: CapsuleId,
    pub author_id: UserId,
    pub content_text: String,
    pub created_at: DateTime<Utc>,
}

impl ReplyDraft {
    pub fn into_reply(self, id: ReplyId) -> Reply {
        Reply {
            id,
            capsule_id: self.capsule_id,
            author_id: self.author_id,
            content_text: self.content_text,
            created_at: self.created_at,
        }
    }
}
