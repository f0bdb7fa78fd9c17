use chrono::{Duration, Utc};
use qtty::Degrees;
use solarcapsule::logging::{init_logging, DEFAULT_FILTER};
use solarcapsule::{
    day_phase, geo, subsolar_point, CapsuleService, EngineResult, MemoryStore, NewCapsule,
    NewReply, UserId,
};

fn main() -> EngineResult<()> {
    init_logging(DEFAULT_FILTER);

    let svc = CapsuleService::with_defaults(MemoryStore::new());
    let now = Utc::now();
    let alice = UserId::new(1);
    let bob = UserId::new(2);

    let sun = subsolar_point(now);
    println!(
        "Sun overhead at {}",
        geo::format_coordinates(sun.latitude, sun.longitude)
    );

    let capsule = svc.create_capsule(
        NewCapsule::new(alice, "The light here is gold right now.", 39.9, 116.4),
        now,
    )?;
    println!(
        "Alice dropped {} in {} ({})",
        capsule.id,
        capsule.solar_zone,
        day_phase(capsule.origin.longitude, now)
    );

    // Bob is wherever the same solar time is, nine hours later.
    let later = now + Duration::hours(9);
    let bob_longitude = Degrees::new(116.4 - 9.0 * 15.0);
    for marker in svc.discover(bob_longitude, Some(bob), later)? {
        println!(
            "Bob sees {} drifted to {:.1}°",
            marker.capsule.id,
            marker.drifted_longitude.value()
        );
        svc.post_reply(NewReply::new(marker.capsule.id, bob, "Same gold here."), later)?;
    }

    for hours in [12, 33, 60] {
        let at = now + Duration::hours(hours);
        let detail = svc.capsule_detail(capsule.id, Some(alice), at)?;
        println!(
            "+{hours:>2}h: Alice reads {}/{} replies, next batch in {:.1} h",
            detail.unlock.visible_replies.len(),
            detail.unlock.total_replies,
            detail.unlock.next_unlock_in.value()
        );
    }

    let inbox = svc.inbox(Some(alice), now + Duration::hours(60))?;
    println!("Alice's inbox: {} unread", inbox.total_unread);
    Ok(())
}
