// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2026 Vallés Puig, Ramon

//! # Capsule lifecycle
//!
//! [`CapsuleService`] ties the pure engine pieces to a [`CapsuleStore`].
//!
//! - **Create** writes immutable facts once: the solar zone of the origin at
//!   the creation instant and the expiry instant.
//! - **Read** recomputes everything derived (drifted longitude, disclosure
//!   bands, inbox counters) from the stored facts and the caller's `now`.
//!
//! There are no background jobs. Expired capsules simply stop matching.

use crate::config::EngineConfig;
use crate::disclosure::{summarize_inbox, unlock_state, InboxEntry, InboxSummary, UnlockState, Viewer};
use crate::drift::drifted_longitude;
use crate::error::{EngineError, EngineResult};
use crate::model::{
    Capsule, CapsuleDraft, CapsuleId, Coordinates, NewCapsule, NewReply, Reply, ReplyDraft, UserId,
};
use crate::solar_clock::{zone_index, SolarZone};
use crate::store::CapsuleStore;
use crate::zone_matcher::{visible_capsules, CapsuleFilter, CapsuleOrder, ReplyOrder};
use chrono::{DateTime, Utc};
use qtty::Degrees;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// A capsule as placed on the globe for one viewer.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct GlobeMarker {
    pub capsule: Capsule,
    /// Where the capsule is drawn now; its zone is unaffected.
    #[cfg_attr(feature = "serde", serde(with = "crate::serde_units::degrees"))]
    pub drifted_longitude: Degrees,
    pub reply_count: usize,
    pub is_own: bool,
}

/// A single capsule with its replies resolved for one viewer.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct CapsuleDetail {
    pub capsule: Capsule,
    pub viewer: Viewer,
    #[cfg_attr(feature = "serde", serde(with = "crate::serde_units::degrees"))]
    pub drifted_longitude: Degrees,
    pub unlock: UnlockState,
}

/// Creation and read flows over a [`CapsuleStore`].
#[derive(Debug)]
pub struct CapsuleService<S> {
    store: S,
    config: EngineConfig,
}

impl<S: CapsuleStore> CapsuleService<S> {
    /// Wraps `store`, validating `config` first.
    pub fn new(store: S, config: EngineConfig) -> EngineResult<Self> {
        config.validate()?;
        Ok(Self { store, config })
    }

    /// Service with the product defaults.
    pub fn with_defaults(store: S) -> Self {
        Self {
            store,
            config: EngineConfig::default(),
        }
    }

    #[inline]
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    #[inline]
    pub fn store(&self) -> &S {
        &self.store
    }

    /// Drops a new capsule at `now`.
    ///
    /// # Errors
    /// - [`EngineError::InvalidCoordinate`] for an out-of-range origin.
    /// - [`EngineError::EmptyContent`] for blank text.
    /// - [`EngineError::InvalidConfig`] when the expiry instant is not representable.
    /// - [`EngineError::Store`] when persisting fails.
    pub fn create_capsule(&self, request: NewCapsule, now: DateTime<Utc>) -> EngineResult<Capsule> {
        let origin = Coordinates::new(request.latitude, request.longitude)?;
        if request.content_text.trim().is_empty() {
            return Err(EngineError::EmptyContent);
        }

        let expires_at = now
            .checked_add_signed(self.config.lifetime_duration())
            .ok_or_else(|| {
                EngineError::InvalidConfig(format!("capsule lifetime from {now} overflows the calendar"))
            })?;
        let solar_zone = zone_index(origin.longitude, now, &self.config);
        let draft = CapsuleDraft {
            author_id: request.author_id,
            content_text: request.content_text,
            image_ref: request.image_ref.filter(|r| !r.is_empty()),
            audio_ref: request.audio_ref.filter(|r| !r.is_empty()),
            origin,
            solar_zone,
            created_at: now,
            expires_at,
        };

        let capsule = self.store.create_capsule(draft)?;
        tracing::info!(
            capsule = %capsule.id,
            author = %capsule.author_id,
            zone = capsule.solar_zone.index(),
            origin = %capsule.origin,
            expires_at = %capsule.expires_at,
            "capsule created"
        );
        Ok(capsule)
    }

    /// Answers a capsule at `now`.
    ///
    /// Replies are accepted for any existing capsule, expired or not.
    ///
    /// # Errors
    /// - [`EngineError::EmptyContent`] for blank text.
    /// - [`EngineError::CapsuleNotFound`] when the capsule does not exist.
    pub fn post_reply(&self, request: NewReply, now: DateTime<Utc>) -> EngineResult<Reply> {
        if request.content_text.trim().is_empty() {
            return Err(EngineError::EmptyContent);
        }
        if self.store.get_capsule(request.capsule_id)?.is_none() {
            return Err(EngineError::CapsuleNotFound(request.capsule_id));
        }

        let reply = self.store.create_reply(ReplyDraft {
            capsule_id: request.capsule_id,
            author_id: request.author_id,
            content_text: request.content_text,
            created_at: now,
        })?;
        tracing::info!(
            reply = %reply.id,
            capsule = %reply.capsule_id,
            author = %reply.author_id,
            "reply posted"
        );
        Ok(reply)
    }

    /// Solar zone a viewer at `longitude` belongs to at `now`.
    pub fn current_zone(&self, longitude: Degrees, now: DateTime<Utc>) -> SolarZone {
        zone_index(longitude, now, &self.config)
    }

    /// Live capsules visible from `zone`, newest first, with display longitudes.
    pub fn globe_view(
        &self,
        zone: SolarZone,
        viewer: Option<UserId>,
        now: DateTime<Utc>,
    ) -> EngineResult<Vec<GlobeMarker>> {
        let filter = CapsuleFilter::from(visible_capsules(zone, viewer, now));
        let capsules = self.store.find_capsules(&filter, CapsuleOrder::NewestFirst)?;
        tracing::debug!(%zone, found = capsules.len(), "globe view");

        capsules
            .into_iter()
            .map(|capsule| -> EngineResult<GlobeMarker> {
                let reply_count = self.store.count_replies(capsule.id)?;
                let drifted = drifted_longitude(
                    capsule.origin.longitude,
                    capsule.created_at,
                    now,
                    &self.config,
                );
                Ok(GlobeMarker {
                    is_own: viewer.is_some_and(|v| capsule.is_authored_by(v)),
                    drifted_longitude: drifted,
                    reply_count,
                    capsule,
                })
            })
            .collect()
    }

    /// [`globe_view`](Self::globe_view) for a viewer standing at `longitude`.
    pub fn discover(
        &self,
        longitude: Degrees,
        viewer: Option<UserId>,
        now: DateTime<Utc>,
    ) -> EngineResult<Vec<GlobeMarker>> {
        self.globe_view(self.current_zone(longitude, now), viewer, now)
    }

    /// One capsule with its replies filtered for `viewer`.
    ///
    /// # Errors
    /// [`EngineError::CapsuleNotFound`] when the capsule does not exist.
    pub fn capsule_detail(
        &self,
        capsule_id: CapsuleId,
        viewer: Option<UserId>,
        now: DateTime<Utc>,
    ) -> EngineResult<CapsuleDetail> {
        let capsule = self
            .store
            .get_capsule(capsule_id)?
            .ok_or(EngineError::CapsuleNotFound(capsule_id))?;
        let replies = self.store.find_replies(capsule_id, ReplyOrder::OldestFirst)?;

        let role = Viewer::resolve(viewer, capsule.author_id);
        let unlock = unlock_state(capsule.created_at, &replies, now, role, &self.config);
        let drifted = drifted_longitude(capsule.origin.longitude, capsule.created_at, now, &self.config);

        Ok(CapsuleDetail {
            capsule,
            viewer: role,
            drifted_longitude: drifted,
            unlock,
        })
    }

    /// Reply inbox of `viewer`'s live capsules, newest capsule first.
    ///
    /// Without a viewer identity the inbox is empty.
    pub fn inbox(&self, viewer: Option<UserId>, now: DateTime<Utc>) -> EngineResult<InboxSummary> {
        let Some(author) = viewer else {
            tracing::debug!("inbox requested without viewer identity");
            return Ok(InboxSummary::default());
        };

        let capsules = self
            .store
            .find_capsules_by_author(author, now, CapsuleOrder::NewestFirst)?;
        let entries = capsules
            .into_iter()
            .map(|capsule| -> EngineResult<InboxEntry> {
                let replies = self.store.find_replies(capsule.id, ReplyOrder::NewestFirst)?;
                Ok(InboxEntry { capsule, replies })
            })
            .collect::<EngineResult<Vec<_>>>()?;

        Ok(summarize_inbox(entries, now, &self.config))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;
    use chrono::{Duration, TimeZone};
    use qtty::Hours;

    fn t0() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 10, 5, 4, 0, 0).unwrap()
    }

    fn service() -> CapsuleService<MemoryStore> {
        CapsuleService::with_defaults(MemoryStore::new())
    }

    #[test]
    fn creation_fixes_zone_and_expiry() {
        let svc = service();
        let capsule = svc
            .create_capsule(NewCapsule::new(UserId::new(1), "noon in Beijing", 39.9, 120.0), t0())
            .unwrap();
        assert_eq!(capsule.solar_zone.index(), 25);
        assert_eq!(capsule.expires_at - capsule.created_at, Duration::days(7));
        assert_eq!(capsule.id, CapsuleId::new(1));
    }

    #[test]
    fn creation_rejects_bad_input() {
        let svc = service();
        let err = svc
            .create_capsule(NewCapsule::new(UserId::new(1), "x", 95.0, 0.0), t0())
            .unwrap_err();
        assert!(matches!(err, EngineError::InvalidCoordinate { .. }));

        let err = svc
            .create_capsule(NewCapsule::new(UserId::new(1), "   ", 0.0, 0.0), t0())
            .unwrap_err();
        assert!(matches!(err, EngineError::EmptyContent));
        assert_eq!(svc.store().capsule_count(), 0);
    }

    #[test]
    fn empty_media_refs_are_dropped() {
        let svc = service();
        let capsule = svc
            .create_capsule(
                NewCapsule::new(UserId::new(1), "photo", 0.0, 0.0)
                    .with_image("")
                    .with_audio("audio/1.ogg"),
                t0(),
            )
            .unwrap();
        assert_eq!(capsule.image_ref, None);
        assert_eq!(capsule.audio_ref.as_deref(), Some("audio/1.ogg"));
    }

    #[test]
    fn reply_requires_existing_capsule_and_text() {
        let svc = service();
        let err = svc
            .post_reply(NewReply::new(CapsuleId::new(3), UserId::new(2), "hey"), t0())
            .unwrap_err();
        assert!(matches!(err, EngineError::CapsuleNotFound(id) if id == CapsuleId::new(3)));

        let capsule = svc
            .create_capsule(NewCapsule::new(UserId::new(1), "hi", 0.0, 0.0), t0())
            .unwrap();
        let err = svc
            .post_reply(NewReply::new(capsule.id, UserId::new(2), ""), t0())
            .unwrap_err();
        assert!(matches!(err, EngineError::EmptyContent));
    }

    #[test]
    fn globe_view_marks_own_capsules_and_drifts() {
        let svc = service();
        let mine = svc
            .create_capsule(NewCapsule::new(UserId::new(1), "mine", 0.0, 120.0), t0())
            .unwrap();
        svc.post_reply(NewReply::new(mine.id, UserId::new(2), "nice"), t0())
            .unwrap();

        let now = t0() + Duration::hours(2);
        let markers = svc
            .globe_view(SolarZone::new(0, svc.config()), Some(UserId::new(1)), now)
            .unwrap();
        assert_eq!(markers.len(), 1);
        assert!(markers[0].is_own);
        assert_eq!(markers[0].reply_count, 1);
        assert_eq!(markers[0].drifted_longitude.value(), 90.0);
        assert_eq!(markers[0].capsule.solar_zone, mine.solar_zone);

        let anonymous = svc
            .globe_view(SolarZone::new(0, svc.config()), None, now)
            .unwrap();
        assert!(anonymous.is_empty());
    }

    #[test]
    fn detail_applies_author_delay() {
        let svc = service();
        let capsule = svc
            .create_capsule(NewCapsule::new(UserId::new(1), "hi", 0.0, 0.0), t0())
            .unwrap();
        svc.post_reply(
            NewReply::new(capsule.id, UserId::new(2), "first"),
            t0() + Duration::hours(2),
        )
        .unwrap();
        svc.post_reply(
            NewReply::new(capsule.id, UserId::new(3), "second"),
            t0() + Duration::hours(10),
        )
        .unwrap();

        let now = t0() + Duration::hours(30);
        let author = svc.capsule_detail(capsule.id, Some(UserId::new(1)), now).unwrap();
        assert_eq!(author.viewer, Viewer::Author);
        assert_eq!(author.unlock.visible_replies.len(), 1);
        assert_eq!(author.unlock.visible_replies[0].content_text, "first");
        assert_eq!(author.unlock.next_unlock_in, Hours::new(18.0));

        let visitor = svc.capsule_detail(capsule.id, None, now).unwrap();
        assert_eq!(visitor.viewer, Viewer::Visitor);
        assert_eq!(visitor.unlock.visible_replies.len(), 2);

        assert!(matches!(
            svc.capsule_detail(CapsuleId::new(99), None, now),
            Err(EngineError::CapsuleNotFound(_))
        ));
    }

    #[test]
    fn inbox_without_viewer_is_empty() {
        let svc = service();
        svc.create_capsule(NewCapsule::new(UserId::new(1), "hi", 0.0, 0.0), t0())
            .unwrap();
        assert_eq!(svc.inbox(None, t0()).unwrap(), InboxSummary::default());
    }

    #[test]
    fn inbox_skips_expired_and_unanswered_capsules() {
        let svc = service();
        let old = svc
            .create_capsule(NewCapsule::new(UserId::new(1), "old", 0.0, 0.0), t0())
            .unwrap();
        let fresh = svc
            .create_capsule(
                NewCapsule::new(UserId::new(1), "fresh", 0.0, 0.0),
                t0() + Duration::days(5),
            )
            .unwrap();
        svc.create_capsule(
            NewCapsule::new(UserId::new(1), "silent", 0.0, 0.0),
            t0() + Duration::days(5),
        )
        .unwrap();
        svc.post_reply(NewReply::new(old.id, UserId::new(2), "late"), t0() + Duration::days(1))
            .unwrap();
        svc.post_reply(
            NewReply::new(fresh.id, UserId::new(2), "welcome"),
            t0() + Duration::days(5) + Duration::hours(1),
        )
        .unwrap();

        let now = t0() + Duration::days(7) + Duration::hours(1);
        let inbox = svc.inbox(Some(UserId::new(1)), now).unwrap();
        assert_eq!(inbox.total_capsules, 1);
        assert_eq!(inbox.items[0].capsule_id, fresh.id);
        assert_eq!(inbox.total_unread, 1);
    }

    #[test]
    fn unrepresentable_expiry_is_an_error() {
        let svc = service();
        let err = svc
            .create_capsule(
                NewCapsule::new(UserId::new(1), "end of time", 0.0, 0.0),
                DateTime::<Utc>::MAX_UTC,
            )
            .unwrap_err();
        assert!(matches!(err, EngineError::InvalidConfig(_)));
        assert_eq!(svc.store().capsule_count(), 0);
    }

    #[test]
    fn oversized_lifetime_is_rejected_up_front() {
        let config = EngineConfig::default().with_lifetime(qtty::Days::new(1e9));
        assert!(matches!(
            CapsuleService::new(MemoryStore::new(), config),
            Err(EngineError::InvalidConfig(_))
        ));
    }

    #[test]
    fn invalid_config_is_rejected() {
        let config = EngineConfig::default().with_total_zones(0);
        assert!(matches!(
            CapsuleService::new(MemoryStore::new(), config),
            Err(EngineError::InvalidConfig(_))
        ));
    }
}
