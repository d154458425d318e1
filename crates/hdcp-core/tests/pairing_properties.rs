//! Property-based tests for the pairing cache.

use proptest::prelude::*;

use hdcp_core::pairing::{
    PairingCache, PairingEntry, ReceiverId, PAIRING_CAPACITY,
};

fn receiver_id() -> impl Strategy<Value = ReceiverId> {
    any::<[u8; 5]>()
        .prop_filter("zero id marks empty slots", |id| *id != [0; 5])
        .prop_map(ReceiverId)
}

fn entry_for(id: ReceiverId, tag: u8) -> PairingEntry {
    PairingEntry { receiver_id: id, km: [tag; 16], ..PairingEntry::default() }
}

proptest! {
    /// The most recent upsert is always retrievable, whatever came before.
    #[test]
    fn latest_upsert_is_always_retrievable(
        ids in prop::collection::vec(receiver_id(), 1..32),
    ) {
        let mut cache = PairingCache::new();
        for (tag, id) in ids.iter().enumerate() {
            cache.upsert(entry_for(*id, tag as u8));
        }
        let last = *ids.last().unwrap();
        let hit = cache.lookup(last).expect("latest entry evicted");
        prop_assert_eq!(hit.km, [(ids.len() - 1) as u8; 16]);
    }

    /// Re-pairing the same receiver replaces its entry rather than
    /// consuming another slot: a full cache of repeats still holds
    /// every other receiver.
    #[test]
    fn repeated_upserts_do_not_consume_slots(
        id in receiver_id(),
        others in prop::collection::hash_set(receiver_id(), PAIRING_CAPACITY - 1),
        repeats in 1usize..16,
    ) {
        prop_assume!(!others.contains(&id));
        let mut cache = PairingCache::new();
        for other in &others {
            cache.upsert(entry_for(*other, 1));
        }
        for tag in 0..repeats {
            cache.upsert(entry_for(id, tag as u8));
        }
        for other in &others {
            prop_assert!(cache.lookup(*other).is_some());
        }
        prop_assert!(cache.lookup(id).is_some());
    }

    /// Invalidation is total: the receiver cannot be found afterwards
    /// and untouched receivers are unaffected.
    #[test]
    fn invalidate_only_removes_the_named_receiver(
        ids in prop::collection::hash_set(receiver_id(), 2..=PAIRING_CAPACITY),
        pick in any::<prop::sample::Index>(),
    ) {
        let ids: Vec<_> = ids.into_iter().collect();
        let mut cache = PairingCache::new();
        for (tag, id) in ids.iter().enumerate() {
            cache.upsert(entry_for(*id, tag as u8));
        }
        let victim = ids[pick.index(ids.len())];
        cache.invalidate(victim);

        prop_assert!(cache.lookup(victim).is_none());
        for id in &ids {
            if *id != victim {
                prop_assert!(cache.lookup(*id).is_some());
            }
        }
    }
}
