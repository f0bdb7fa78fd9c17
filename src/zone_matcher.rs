// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2026 Vallés Puig, Ramon

//! Discovery: which capsules a viewer may see on the globe.
//!
//! A live capsule is visible when it was dropped in the viewer's current
//! solar zone, or when the viewer wrote it. Own capsules stay visible from
//! any zone until they expire.
//!
//! The filter is a plain value. A store can translate it into a query, and
//! [`VisibilityFilter::apply`] evaluates it in memory with the canonical
//! newest-first order.

use crate::model::{Capsule, Reply, UserId};
use crate::solar_clock::SolarZone;
use chrono::{DateTime, Utc};
use std::cmp::Ordering;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Ordering requested from the persistence collaborator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum CapsuleOrder {
    /// Descending `created_at`, ties by descending id.
    #[default]
    NewestFirst,
    /// Ascending `created_at`, ties by ascending id.
    OldestFirst,
}

impl CapsuleOrder {
    pub fn compare(&self, a: &Capsule, b: &Capsule) -> Ordering {
        let oldest_first = a.created_at.cmp(&b.created_at).then(a.id.cmp(&b.id));
        match self {
            Self::NewestFirst => oldest_first.reverse(),
            Self::OldestFirst => oldest_first,
        }
    }

    pub fn sort(&self, capsules: &mut [Capsule]) {
        capsules.sort_by(|a, b| self.compare(a, b));
    }
}

/// Ordering of replies within one capsule.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum ReplyOrder {
    #[default]
    OldestFirst,
    NewestFirst,
}

impl ReplyOrder {
    pub fn compare(&self, a: &Reply, b: &Reply) -> Ordering {
        let oldest_first = a.created_at.cmp(&b.created_at).then(a.id.cmp(&b.id));
        match self {
            Self::OldestFirst => oldest_first,
            Self::NewestFirst => oldest_first.reverse(),
        }
    }

    pub fn sort(&self, replies: &mut [Reply]) {
        replies.sort_by(|a, b| self.compare(a, b));
    }
}

/// Discovery predicate for one viewer at one instant.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct VisibilityFilter {
    pub zone: SolarZone,
    pub viewer: Option<UserId>,
    pub now: DateTime<Utc>,
}

impl VisibilityFilter {
    /// `expires_at > now && (solar_zone == zone || author_id == viewer)`.
    pub fn matches(&self, capsule: &Capsule) -> bool {
        if !capsule.is_live(self.now) {
            return false;
        }
        capsule.solar_zone == self.zone
            || self
                .viewer
                .is_some_and(|viewer| capsule.is_authored_by(viewer))
    }

    /// Keeps the matching capsules, newest first.
    pub fn apply<I>(&self, capsules: I) -> Vec<Capsule>
    where
        I: IntoIterator<Item = Capsule>,
    {
        let mut visible: Vec<Capsule> = capsules.into_iter().filter(|c| self.matches(c)).collect();
        CapsuleOrder::NewestFirst.sort(&mut visible);
        visible
    }
}

/// Builds the discovery filter for a viewer in `zone` at `now`.
pub fn visible_capsules(
    zone: SolarZone,
    viewer: Option<UserId>,
    now: DateTime<Utc>,
) -> VisibilityFilter {
    VisibilityFilter { zone, viewer, now }
}

/// Selection handed to [`CapsuleStore::find_capsules`](crate::store::CapsuleStore::find_capsules).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CapsuleFilter {
    /// Discovery for a viewer.
    Visible(VisibilityFilter),
    /// Live capsules written by one user.
    AuthoredBy {
        author: UserId,
        now: DateTime<Utc>,
    },
}

impl CapsuleFilter {
    pub fn matches(&self, capsule: &Capsule) -> bool {
        match self {
            Self::Visible(filter) => filter.matches(capsule),
            Self::AuthoredBy { author, now } => {
                capsule.is_live(*now) && capsule.is_authored_by(*author)
            }
        }
    }
}

impl From<VisibilityFilter> for CapsuleFilter {
    fn from(filter: VisibilityFilter) -> Self {
        Self::Visible(filter)
    }
}
