use chrono::{DateTime, Duration, TimeZone, Utc};
use qtty::{Degrees, Hours};
use solarcapsule::{
    drifted_longitude, normalize_longitude, unlock_state, zone_index, CapsuleService, EngineConfig,
    MemoryStore, NewCapsule, NewReply, SolarZone, UserId, Viewer,
};

fn utc(y: i32, mo: u32, d: u32, h: u32, mi: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(y, mo, d, h, mi, 0).unwrap()
}

#[test]
fn beijing_capsule_keeps_its_zone_while_drifting() {
    let svc = CapsuleService::with_defaults(MemoryStore::new());
    let created = utc(2024, 3, 1, 1, 0);
    let capsule = svc
        .create_capsule(NewCapsule::new(UserId::new(1), "晚安", 39.9, 116.4), created)
        .unwrap();

    let now = created + Duration::hours(72);
    let expected = normalize_longitude(Degrees::new(116.4 - 1080.0));
    let drifted = drifted_longitude(capsule.origin.longitude, capsule.created_at, now, svc.config());
    assert_eq!(drifted.value(), expected.value());
    assert!((drifted.value() - 116.4).abs() < 1e-9);

    let detail = svc.capsule_detail(capsule.id, None, now).unwrap();
    assert_eq!(detail.capsule.solar_zone, capsule.solar_zone);
    assert_eq!(
        capsule.solar_zone,
        zone_index(Degrees::new(116.4), created, svc.config())
    );
}

#[test]
fn viewer_in_zone_8_sees_own_capsule_from_zone_40() {
    let svc = CapsuleService::with_defaults(MemoryStore::new());
    let config = *svc.config();
    let author = UserId::new(7);

    // At midnight UTC this longitude's solar clock sits five minutes into zone 40.
    let created = utc(2024, 5, 20, 0, 0);
    let zone_40_lon = (40.0 * config.zone_width().value() + 5.0) / 4.0 - 360.0;
    let capsule = svc
        .create_capsule(NewCapsule::new(author, "from far away", 0.0, zone_40_lon), created)
        .unwrap();
    assert_eq!(capsule.solar_zone.index(), 40);

    let other = svc
        .create_capsule(NewCapsule::new(UserId::new(8), "not mine", 0.0, zone_40_lon), created)
        .unwrap();

    // An hour later this longitude's solar clock sits five minutes into zone 8.
    let local_at = created + Duration::hours(1);
    let zone_8_lon = (8.0 * config.zone_width().value() + 5.0 - 60.0) / 4.0;
    let local = svc
        .create_capsule(NewCapsule::new(UserId::new(9), "right here", 0.0, zone_8_lon), local_at)
        .unwrap();
    assert_eq!(local.solar_zone.index(), 8);

    let now = created + Duration::hours(3);
    let zone_8 = SolarZone::new(8, &config);
    let markers = svc.globe_view(zone_8, Some(author), now).unwrap();
    let ids: Vec<_> = markers.iter().map(|m| m.capsule.id).collect();
    assert_eq!(ids, vec![local.id, capsule.id]);
    assert!(!markers[0].is_own);
    assert!(markers[1].is_own);
    assert!(!ids.contains(&other.id));
}

#[test]
fn same_solar_time_matches_across_the_globe() {
    let svc = CapsuleService::with_defaults(MemoryStore::new());
    let at = utc(2024, 6, 15, 12, 0);

    // Solar noon in London and solar noon in Tokyo are nine hours apart in UTC.
    let london = svc
        .create_capsule(NewCapsule::new(UserId::new(1), "lunch", 51.5, 0.0), at)
        .unwrap();
    let tokyo_noon = at - Duration::hours(9);
    let tokyo_zone = svc.current_zone(Degrees::new(135.0), tokyo_noon);
    assert_eq!(tokyo_zone, london.solar_zone);

    let seen = svc
        .discover(Degrees::new(0.0), Some(UserId::new(2)), at + Duration::minutes(5))
        .unwrap();
    assert_eq!(seen.len(), 1);
    assert!(!seen[0].is_own);
}

#[test]
fn progressive_disclosure_end_to_end() {
    let svc = CapsuleService::with_defaults(MemoryStore::new());
    let author = UserId::new(1);
    let created = utc(2024, 1, 10, 6, 0);
    let capsule = svc
        .create_capsule(NewCapsule::new(author, "sunrise", 48.85, 2.35), created)
        .unwrap();

    for (i, hours) in [2i64, 10, 27].into_iter().enumerate() {
        svc.post_reply(
            NewReply::new(capsule.id, UserId::new(10 + i as u64), format!("reply {i}")),
            created + Duration::hours(hours),
        )
        .unwrap();
    }

    let at_30 = created + Duration::hours(30);
    let author_view = svc.capsule_detail(capsule.id, Some(author), at_30).unwrap();
    assert_eq!(author_view.viewer, Viewer::Author);
    assert_eq!(author_view.unlock.visible_replies.len(), 1);
    assert_eq!(author_view.unlock.total_replies, 3);
    assert_eq!(author_view.unlock.next_unlock_in, Hours::new(18.0));

    let inbox = svc.inbox(Some(author), at_30).unwrap();
    assert_eq!(inbox.total_unread, 1);
    assert_eq!(inbox.items[0].locked_replies, 2);
    assert!(inbox.items[0].latest_reply.is_none());

    let at_60 = created + Duration::hours(60);
    let author_view = svc.capsule_detail(capsule.id, Some(author), at_60).unwrap();
    assert_eq!(author_view.unlock.visible_replies.len(), 3);
    assert_eq!(author_view.unlock.unlocked_bands(), 2);

    let inbox = svc.inbox(Some(author), at_60).unwrap();
    assert_eq!(inbox.total_unread, 3);
    let preview = inbox.items[0].latest_reply.as_ref().unwrap();
    assert_eq!(preview.preview, "reply 2");
}

#[test]
fn expired_capsules_disappear_from_every_read() {
    let svc = CapsuleService::with_defaults(MemoryStore::new());
    let author = UserId::new(1);
    let created = utc(2024, 9, 1, 12, 0);
    let capsule = svc
        .create_capsule(NewCapsule::new(author, "brief", 0.0, 0.0), created)
        .unwrap();
    svc.post_reply(NewReply::new(capsule.id, UserId::new(2), "hi"), created)
        .unwrap();

    let after = capsule.expires_at;
    let zone = svc.current_zone(Degrees::new(0.0), created);
    assert!(svc.globe_view(zone, Some(author), after).unwrap().is_empty());
    assert_eq!(svc.inbox(Some(author), after).unwrap().total_capsules, 0);

    // The record itself is still addressable.
    assert!(svc.capsule_detail(capsule.id, Some(author), after).is_ok());
}

#[test]
fn custom_config_changes_band_width() {
    let config = EngineConfig::default().with_band_width(Hours::new(12.0));
    let created = utc(2024, 2, 1, 0, 0);
    let svc = CapsuleService::new(MemoryStore::new(), config).unwrap();
    let capsule = svc
        .create_capsule(NewCapsule::new(UserId::new(1), "half days", 0.0, 0.0), created)
        .unwrap();
    let reply = svc
        .post_reply(NewReply::new(capsule.id, UserId::new(2), "quick"), created)
        .unwrap();

    let state = unlock_state(
        created,
        &[reply],
        created + Duration::hours(12),
        Viewer::Author,
        &config,
    );
    assert_eq!(state.visible_replies.len(), 1);
    assert_eq!(state.next_unlock_in, Hours::new(12.0));
}

#[cfg(feature = "serde")]
#[test]
fn serialized_unlock_state_is_stable() {
    let svc = CapsuleService::with_defaults(MemoryStore::new());
    let created = utc(2024, 4, 4, 4, 4);
    let capsule = svc
        .create_capsule(NewCapsule::new(UserId::new(1), "stable", 10.0, 10.0), created)
        .unwrap();
    svc.post_reply(
        NewReply::new(capsule.id, UserId::new(2), "once"),
        created + Duration::hours(5),
    )
    .unwrap();

    let now = created + Duration::hours(40);
    let first = svc.capsule_detail(capsule.id, Some(UserId::new(1)), now).unwrap();
    let second = svc.capsule_detail(capsule.id, Some(UserId::new(1)), now).unwrap();
    let a = serde_json::to_string(&first).unwrap();
    let b = serde_json::to_string(&second).unwrap();
    assert_eq!(a, b);

    let value: serde_json::Value = serde_json::from_str(&a).unwrap();
    assert_eq!(value["viewer"], "author");
    assert_eq!(value["unlock"]["next_unlock_in"], 8.0);
    assert_eq!(value["capsule"]["solar_zone"], capsule.solar_zone.index());
}
