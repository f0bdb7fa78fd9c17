// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2026 Vallés Puig, Ramon

//! Persistence collaborator.
//!
//! The engine never owns storage. [`CapsuleStore`] is the narrow interface it
//! consumes; [`MemoryStore`] is a thread-safe in-process implementation for
//! tests, demos and single-node deployments.

use crate::error::{StoreError, StoreResult};
use crate::model::{Capsule, CapsuleDraft, CapsuleId, Reply, ReplyDraft, ReplyId, UserId};
use crate::zone_matcher::{CapsuleFilter, CapsuleOrder, ReplyOrder};
use chrono::{DateTime, Utc};
use parking_lot::RwLock;
use std::collections::BTreeMap;
use std::sync::atomic::{AtomicU64, Ordering};

/// Storage operations the lifecycle service depends on.
///
/// Creation must be atomic per record: a created record is either fully
/// visible to subsequent reads or not at all.
pub trait CapsuleStore {
    /// Assigns an id and stores the capsule.
    fn create_capsule(&self, draft: CapsuleDraft) -> StoreResult<Capsule>;

    fn get_capsule(&self, id: CapsuleId) -> StoreResult<Option<Capsule>>;

    fn find_capsules(&self, filter: &CapsuleFilter, order: CapsuleOrder) -> StoreResult<Vec<Capsule>>;

    /// Assigns an id and stores the reply.
    ///
    /// # Errors
    /// [`StoreError::MissingCapsule`] when the parent capsule is unknown.
    fn create_reply(&self, draft: ReplyDraft) -> StoreResult<Reply>;

    fn find_replies(&self, capsule_id: CapsuleId, order: ReplyOrder) -> StoreResult<Vec<Reply>>;

    fn count_replies(&self, capsule_id: CapsuleId) -> StoreResult<usize>;

    /// Live capsules written by `author`.
    fn find_capsules_by_author(
        &self,
        author: UserId,
        now: DateTime<Utc>,
        order: CapsuleOrder,
    ) -> StoreResult<Vec<Capsule>> {
        self.find_capsules(&CapsuleFilter::AuthoredBy { author, now }, order)
    }
}

#[derive(Debug, Default)]
struct Tables {
    capsules: BTreeMap<CapsuleId, Capsule>,
    replies: BTreeMap<CapsuleId, Vec<Reply>>,
}

/// In-memory [`CapsuleStore`] guarded by a single reader-writer lock.
#[derive(Debug)]
pub struct MemoryStore {
    tables: RwLock<Tables>,
    next_capsule: AtomicU64,
    next_reply: AtomicU64,
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryStore {
    /// An empty store; ids start at 1.
    pub fn new() -> Self {
        Self {
            tables: RwLock::new(Tables::default()),
            next_capsule: AtomicU64::new(1),
            next_reply: AtomicU64::new(1),
        }
    }

    pub fn capsule_count(&self) -> usize {
        self.tables.read().capsules.len()
    }

    pub fn reply_count(&self) -> usize {
        self.tables.read().replies.values().map(Vec::len).sum()
    }
}

impl CapsuleStore for MemoryStore {
    fn create_capsule(&self, draft: CapsuleDraft) -> StoreResult<Capsule> {
        let id = CapsuleId::new(self.next_capsule.fetch_add(1, Ordering::Relaxed));
        let capsule = draft.into_capsule(id);
        self.tables.write().capsules.insert(id, capsule.clone());
        Ok(capsule)
    }

    fn get_capsule(&self, id: CapsuleId) -> StoreResult<Option<Capsule>> {
        Ok(self.tables.read().capsules.get(&id).cloned())
    }

    fn find_capsules(&self, filter: &CapsuleFilter, order: CapsuleOrder) -> StoreResult<Vec<Capsule>> {
        let mut found: Vec<Capsule> = self
            .tables
            .read()
            .capsules
            .values()
            .filter(|c| filter.matches(c))
            .cloned()
            .collect();
        order.sort(&mut found);
        Ok(found)
    }

    fn create_reply(&self, draft: ReplyDraft) -> StoreResult<Reply> {
        let mut tables = self.tables.write();
        if !tables.capsules.contains_key(&draft.capsule_id) {
            return Err(StoreError::MissingCapsule(draft.capsule_id));
        }
        let id = ReplyId::new(self.next_reply.fetch_add(1, Ordering::Relaxed));
        let reply = draft.into_reply(id);
        tables
            .replies
            .entry(reply.capsule_id)
            .or_default()
            .push(reply.clone());
        Ok(reply)
    }

    fn find_replies(&self, capsule_id: CapsuleId, order: ReplyOrder) -> StoreResult<Vec<Reply>> {
        let mut replies = self
            .tables
            .read()
            .replies
            .get(&capsule_id)
            .cloned()
            .unwrap_or_default();
        order.sort(&mut replies);
        Ok(replies)
    }

    fn count_replies(&self, capsule_id: CapsuleId) -> StoreResult<usize> {
        Ok(self
            .tables
            .read()
            .replies
            .get(&capsule_id)
            .map_or(0, Vec::len))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::EngineConfig;
    use crate::model::Coordinates;
    use crate::solar_clock::SolarZone;
    use crate::zone_matcher::visible_capsules;
    use chrono::{Duration, TimeZone};
    use qtty::Degrees;
    use std::sync::Arc;
    use std::thread;

    fn t0() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 8, 1, 0, 0, 0).unwrap()
    }

    fn draft(author: u64, zone: u32, created_at: DateTime<Utc>) -> CapsuleDraft {
        let config = EngineConfig::default();
        CapsuleDraft {
            author_id: UserId::new(author),
            content_text: "hi".to_string(),
            image_ref: None,
            audio_ref: None,
            origin: Coordinates::new(Degrees::new(0.0), Degrees::new(0.0)).unwrap(),
            solar_zone: SolarZone::new(zone, &config),
            created_at,
            expires_at: created_at + config.lifetime_duration(),
        }
    }

    fn reply_draft(capsule_id: CapsuleId, created_at: DateTime<Utc>) -> ReplyDraft {
        ReplyDraft {
            capsule_id,
            author_id: UserId::new(99),
            content_text: "re".to_string(),
            created_at,
        }
    }

    #[test]
    fn ids_are_assigned_monotonically() {
        let store = MemoryStore::new();
        let a = store.create_capsule(draft(1, 0, t0())).unwrap();
        let b = store.create_capsule(draft(1, 0, t0())).unwrap();
        assert_eq!(a.id, CapsuleId::new(1));
        assert_eq!(b.id, CapsuleId::new(2));
        assert_eq!(store.get_capsule(b.id).unwrap(), Some(b));
        assert_eq!(store.get_capsule(CapsuleId::new(42)).unwrap(), None);
    }

    #[test]
    fn reply_to_unknown_capsule_is_rejected() {
        let store = MemoryStore::new();
        let err = store
            .create_reply(reply_draft(CapsuleId::new(5), t0()))
            .unwrap_err();
        assert!(matches!(err, StoreError::MissingCapsule(id) if id == CapsuleId::new(5)));
        assert_eq!(store.reply_count(), 0);
    }

    #[test]
    fn replies_are_listed_in_requested_order() {
        let store = MemoryStore::new();
        let capsule = store.create_capsule(draft(1, 0, t0())).unwrap();
        let late = store
            .create_reply(reply_draft(capsule.id, t0() + Duration::hours(5)))
            .unwrap();
        let early = store
            .create_reply(reply_draft(capsule.id, t0() + Duration::hours(1)))
            .unwrap();

        let oldest = store.find_replies(capsule.id, ReplyOrder::OldestFirst).unwrap();
        assert_eq!(oldest, vec![early.clone(), late.clone()]);
        let newest = store.find_replies(capsule.id, ReplyOrder::NewestFirst).unwrap();
        assert_eq!(newest, vec![late, early]);
        assert_eq!(store.count_replies(capsule.id).unwrap(), 2);
        assert_eq!(store.count_replies(CapsuleId::new(77)).unwrap(), 0);
    }

    #[test]
    fn find_capsules_applies_filter_and_order() {
        let store = MemoryStore::new();
        let config = EngineConfig::default();
        store.create_capsule(draft(1, 4, t0())).unwrap();
        store.create_capsule(draft(2, 4, t0() + Duration::hours(1))).unwrap();
        store.create_capsule(draft(3, 9, t0() + Duration::hours(2))).unwrap();

        let filter = visible_capsules(SolarZone::new(4, &config), None, t0() + Duration::hours(3));
        let found = store
            .find_capsules(&filter.into(), CapsuleOrder::NewestFirst)
            .unwrap();
        let ids: Vec<u64> = found.iter().map(|c| c.id.get()).collect();
        assert_eq!(ids, vec![2, 1]);

        let own = store
            .find_capsules_by_author(UserId::new(3), t0(), CapsuleOrder::NewestFirst)
            .unwrap();
        assert_eq!(own.len(), 1);
    }

    #[test]
    fn concurrent_creation_yields_unique_ids() {
        let store = Arc::new(MemoryStore::new());
        let handles: Vec<_> = (0..8)
            .map(|n| {
                let store = Arc::clone(&store);
                thread::spawn(move || {
                    (0..25)
                        .map(|_| store.create_capsule(draft(n, 0, t0())).unwrap().id)
                        .collect::<Vec<_>>()
                })
            })
            .collect();

        let mut ids: Vec<CapsuleId> = handles
            .into_iter()
            .flat_map(|h| h.join().unwrap())
            .collect();
        ids.sort();
        ids.dedup();
        assert_eq!(ids.len(), 200);
        assert_eq!(store.capsule_count(), 200);
    }
}
