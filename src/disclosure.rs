// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2026 Vallés Puig, Ramon

//! # Progressive disclosure of replies
//!
//! Replies reach a capsule's author in daily batches. A reply becomes
//! readable to the author once it is one band width old (24 h by default);
//! every other viewer reads replies immediately.
//!
//! The capsule lifetime is cut into consecutive bands measured from the
//! capsule's creation instant:
//!
//! ```text
//! band d = [created_at + d·band, created_at + (d+1)·band)      d = 0 .. band_count
//! ```
//!
//! A band is *unlocked* once the whole band lies in the past. All arithmetic
//! runs on whole milliseconds so band boundaries are exact.
//!
//! Nothing here is cached. [`unlock_state`] and [`summarize_inbox`] are pure
//! functions of their inputs and are recomputed for every read.

use crate::config::{duration_to_hours, EngineConfig};
use crate::instant::elapsed_since;
use crate::model::{Capsule, CapsuleId, Reply, ReplyId, UserId};
use crate::period::UtcPeriod;
use chrono::{DateTime, Duration, Utc};
use qtty::Hours;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Longest reply preview shown in the inbox, in characters.
pub const PREVIEW_CHARS: usize = 50;

// ═══════════════════════════════════════════════════════════════════════════
// Viewer role
// ═══════════════════════════════════════════════════════════════════════════

/// How a viewer relates to the capsule being read.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum Viewer {
    /// The capsule's author; replies are released band by band.
    Author,
    /// Anyone else, including anonymous viewers; all replies are visible.
    Visitor,
}

impl Viewer {
    /// Role of `viewer` for a capsule written by `author`.
    ///
    /// An unknown viewer is treated as a visitor.
    pub fn resolve(viewer: Option<UserId>, author: UserId) -> Self {
        match viewer {
            Some(id) if id == author => Self::Author,
            Some(_) => Self::Visitor,
            None => {
                tracing::debug!(%author, "no viewer identity, applying visitor rules");
                Self::Visitor
            }
        }
    }
}

/// Whether the author may read a reply created at `reply_created_at`.
///
/// True iff `now − reply_created_at >= band_width`. A reply stamped in the
/// future stays locked.
pub fn is_unlocked_for_author(
    reply_created_at: DateTime<Utc>,
    now: DateTime<Utc>,
    config: &EngineConfig,
) -> bool {
    elapsed_since(reply_created_at, now) >= config.band_duration()
}

// ═══════════════════════════════════════════════════════════════════════════
// Unlock state
// ═══════════════════════════════════════════════════════════════════════════

/// One disclosure band of a capsule.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct DisclosureBand {
    /// Zero-based band number.
    pub day_index: u32,
    /// Band start, in hours after capsule creation.
    #[cfg_attr(feature = "serde", serde(with = "crate::serde_units::hours"))]
    pub start_hour: Hours,
    /// Band end (exclusive), in hours after capsule creation.
    #[cfg_attr(feature = "serde", serde(with = "crate::serde_units::hours"))]
    pub end_hour: Hours,
    /// Absolute `[start, end)` window.
    pub window: UtcPeriod,
    pub is_unlocked: bool,
    /// Replies created inside the window.
    pub count: usize,
}

/// Everything a capsule detail view needs about its replies at one instant.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct UnlockState {
    pub bands: Vec<DisclosureBand>,
    /// Time until the current band unlocks; zero when there are no replies.
    #[cfg_attr(feature = "serde", serde(with = "crate::serde_units::hours"))]
    pub next_unlock_in: Hours,
    /// Replies readable by the viewer, in input order.
    pub visible_replies: Vec<Reply>,
    pub total_replies: usize,
    #[cfg_attr(feature = "serde", serde(with = "crate::serde_units::hours"))]
    pub capsule_age: Hours,
}

impl UnlockState {
    /// Replies the viewer cannot read yet.
    #[inline]
    pub fn locked_replies(&self) -> usize {
        self.total_replies - self.visible_replies.len()
    }

    /// Number of unlocked bands.
    pub fn unlocked_bands(&self) -> usize {
        self.bands.iter().filter(|b| b.is_unlocked).count()
    }
}

/// Computes bands, countdown and visible replies for one capsule.
///
/// `replies` are the capsule's replies in any order; `visible_replies`
/// preserves that order. Replies falling before creation or after the last
/// band count toward `total_replies` but belong to no band.
pub fn unlock_state(
    capsule_created_at: DateTime<Utc>,
    replies: &[Reply],
    now: DateTime<Utc>,
    viewer: Viewer,
    config: &EngineConfig,
) -> UnlockState {
    let age = elapsed_since(capsule_created_at, now);
    let elapsed_ms = age.num_milliseconds();
    let band_ms = config.band_duration().num_milliseconds().max(1);

    let visible_replies: Vec<Reply> = match viewer {
        Viewer::Visitor => replies.to_vec(),
        Viewer::Author => replies
            .iter()
            .filter(|r| is_unlocked_for_author(r.created_at, now, config))
            .cloned()
            .collect(),
    };

    if replies.is_empty() {
        return UnlockState {
            bands: Vec::new(),
            next_unlock_in: Hours::new(0.0),
            visible_replies,
            total_replies: 0,
            capsule_age: duration_to_hours(age),
        };
    }

    let band_count = config.band_count() as usize;
    let mut counts = vec![0usize; band_count];
    for reply in replies {
        let offset_ms = (reply.created_at - capsule_created_at).num_milliseconds();
        let day = offset_ms.div_euclid(band_ms);
        if let Some(slot) = usize::try_from(day).ok().and_then(|d| counts.get_mut(d)) {
            *slot += 1;
        }
    }

    // Bands reached so far: ceil(elapsed / band).
    let reached = (elapsed_ms + band_ms - 1) / band_ms;
    let bands = counts
        .iter()
        .enumerate()
        .filter(|&(day, &count)| count > 0 || (day as i64) < reached)
        .map(|(day, &count)| {
            let start_ms = day as i64 * band_ms;
            let end_ms = start_ms + band_ms;
            DisclosureBand {
                day_index: day as u32,
                start_hour: duration_to_hours(Duration::milliseconds(start_ms)),
                end_hour: duration_to_hours(Duration::milliseconds(end_ms)),
                window: UtcPeriod::new(
                    capsule_created_at + Duration::milliseconds(start_ms),
                    capsule_created_at + Duration::milliseconds(end_ms),
                ),
                is_unlocked: elapsed_ms >= end_ms,
                count,
            }
        })
        .collect();

    let next_unlock_ms = (elapsed_ms / band_ms + 1) * band_ms - elapsed_ms;

    UnlockState {
        bands,
        next_unlock_in: duration_to_hours(Duration::milliseconds(next_unlock_ms.max(0))),
        visible_replies,
        total_replies: replies.len(),
        capsule_age: duration_to_hours(age),
    }
}

// ═══════════════════════════════════════════════════════════════════════════
// Inbox
// ═══════════════════════════════════════════════════════════════════════════

/// A capsule together with all of its replies, as loaded for the inbox.
#[derive(Debug, Clone, PartialEq)]
pub struct InboxEntry {
    pub capsule: Capsule,
    pub replies: Vec<Reply>,
}

/// Short excerpt of the newest reply.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ReplyPreview {
    pub reply_id: ReplyId,
    pub author_id: UserId,
    pub created_at: DateTime<Utc>,
    pub preview: String,
}

/// Inbox line for one capsule.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct InboxItem {
    pub capsule_id: CapsuleId,
    pub content_text: String,
    pub image_ref: Option<String>,
    pub created_at: DateTime<Utc>,
    pub total_replies: usize,
    pub unlocked_replies: usize,
    pub locked_replies: usize,
    /// Present only when the newest reply is already unlocked.
    pub latest_reply: Option<ReplyPreview>,
    #[cfg_attr(feature = "serde", serde(with = "crate::serde_units::hours"))]
    pub capsule_age: Hours,
}

#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct InboxSummary {
    pub items: Vec<InboxItem>,
    /// Sum of `unlocked_replies` over all items.
    pub total_unread: usize,
    /// Number of items (capsules with at least one reply).
    pub total_capsules: usize,
}

/// Truncates `text` to [`PREVIEW_CHARS`] characters, appending `...` when cut.
pub fn preview_text(text: &str) -> String {
    let mut chars = text.char_indices();
    match chars.nth(PREVIEW_CHARS) {
        Some((cut, _)) => format!("{}...", &text[..cut]),
        None => text.to_string(),
    }
}

/// Builds the author's inbox from their capsules.
///
/// Item order follows `entries`. Capsules without replies are skipped.
pub fn summarize_inbox<I>(entries: I, now: DateTime<Utc>, config: &EngineConfig) -> InboxSummary
where
    I: IntoIterator<Item = InboxEntry>,
{
    let items: Vec<InboxItem> = entries
        .into_iter()
        .filter(|entry| !entry.replies.is_empty())
        .map(|entry| inbox_item(entry, now, config))
        .collect();

    InboxSummary {
        total_unread: items.iter().map(|i| i.unlocked_replies).sum(),
        total_capsules: items.len(),
        items,
    }
}

fn inbox_item(entry: InboxEntry, now: DateTime<Utc>, config: &EngineConfig) -> InboxItem {
    let InboxEntry { capsule, replies } = entry;

    let unlocked_replies = replies
        .iter()
        .filter(|r| is_unlocked_for_author(r.created_at, now, config))
        .count();

    let latest_reply = replies
        .iter()
        .max_by(|a, b| a.created_at.cmp(&b.created_at).then(a.id.cmp(&b.id)))
        .filter(|r| is_unlocked_for_author(r.created_at, now, config))
        .map(|r| ReplyPreview {
            reply_id: r.id,
            author_id: r.author_id,
            created_at: r.created_at,
            preview: preview_text(&r.content_text),
        });

    InboxItem {
        capsule_id: capsule.id,
        content_text: capsule.content_text,
        image_ref: capsule.image_ref,
        created_at: capsule.created_at,
        total_replies: replies.len(),
        unlocked_replies,
        locked_replies: replies.len() - unlocked_replies,
        latest_reply,
        capsule_age: duration_to_hours(elapsed_since(capsule.created_at, now)),
    }
}
