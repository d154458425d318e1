//! Stored-Km pairing cache.
//!
//! A fixed array of pairing entries keyed by receiver identifier. A hit
//! lets a later attempt skip certificate verification and the full key
//! exchange by replaying the paired master key.

use hdcp_proto::messages::{CAPS_SIZE, KM_SIZE, NONCE_SIZE, RECEIVER_ID_SIZE};

/// Number of pairing slots.
pub const PAIRING_CAPACITY: usize = 8;

/// Receiver identifier from the certificate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct ReceiverId(pub [u8; RECEIVER_ID_SIZE]);

impl ReceiverId {
    /// The all-zero identifier, used as the empty-slot marker.
    pub fn is_zero(self) -> bool {
        self.0 == [0; RECEIVER_ID_SIZE]
    }
}

/// One cached pairing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PairingEntry {
    /// Receiver the pairing belongs to.
    pub receiver_id: ReceiverId,
    /// Transmitter nonce of the pairing session.
    pub rtx: [u8; NONCE_SIZE],
    /// Receiver nonce of the pairing session.
    pub rrx: [u8; NONCE_SIZE],
    /// Receiver capabilities of the pairing session.
    pub rx_caps: [u8; CAPS_SIZE],
    /// Master key of the pairing session.
    pub km: [u8; KM_SIZE],
    /// Receiver-wrapped master key from AKE_Send_Pairing_Info.
    pub e_kh_km: [u8; KM_SIZE],
}

/// Fixed-capacity pairing store. Mutated only by the engine.
#[derive(Debug, Clone)]
pub struct PairingCache {
    slots: [PairingEntry; PAIRING_CAPACITY],
}

impl PairingCache {
    /// A cache with every slot empty.
    pub fn new() -> Self {
        Self { slots: [PairingEntry::default(); PAIRING_CAPACITY] }
    }

    /// Finds the entry for `id`. The all-zero identifier never matches,
    /// even though empty slots carry it.
    pub fn lookup(&self, id: ReceiverId) -> Option<&PairingEntry> {
        if id.is_zero() {
            return None;
        }
        self.slots.iter().find(|entry| entry.receiver_id == id)
    }

    /// Inserts or replaces the entry for `entry.receiver_id`.
    ///
    /// An existing entry for the same receiver is updated in place.
    /// Otherwise the first empty slot is used; with all slots occupied,
    /// slot 0 is evicted.
    pub fn upsert(&mut self, entry: PairingEntry) {
        let slot = self
            .slots
            .iter()
            .position(|e| e.receiver_id == entry.receiver_id)
            .or_else(|| {
                self.slots.iter().position(|e| e.receiver_id.is_zero())
            })
            .unwrap_or(0);
        self.slots[slot] = entry;
    }

    /// Zeroes the entry for `id`, if present.
    pub fn invalidate(&mut self, id: ReceiverId) {
        if id.is_zero() {
            return;
        }
        for entry in &mut self.slots {
            if entry.receiver_id == id {
                *entry = PairingEntry::default();
            }
        }
    }

    /// Zeroes every slot.
    pub fn clear_all(&mut self) {
        self.slots = [PairingEntry::default(); PAIRING_CAPACITY];
    }
}

impl Default for PairingCache {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(id: u8) -> PairingEntry {
        PairingEntry {
            receiver_id: ReceiverId([id, id, id, id, id]),
            km: [id; KM_SIZE],
            ..PairingEntry::default()
        }
    }

    #[test]
    fn lookup_never_matches_the_zero_id() {
        let cache = PairingCache::new();
        assert!(cache.lookup(ReceiverId::default()).is_none());
    }

    #[test]
    fn upsert_updates_an_existing_receiver_in_place() {
        let mut cache = PairingCache::new();
        cache.upsert(entry(1));
        cache.upsert(entry(2));

        let mut updated = entry(1);
        updated.km = [0xFF; KM_SIZE];
        cache.upsert(updated);

        assert_eq!(
            cache.lookup(ReceiverId([1; 5])).map(|e| e.km),
            Some([0xFF; KM_SIZE])
        );
        assert!(cache.lookup(ReceiverId([2; 5])).is_some());
    }

    #[test]
    fn full_cache_evicts_slot_zero() {
        let mut cache = PairingCache::new();
        for id in 1..=PAIRING_CAPACITY as u8 {
            cache.upsert(entry(id));
        }
        cache.upsert(entry(9));

        assert!(cache.lookup(ReceiverId([1; 5])).is_none());
        assert!(cache.lookup(ReceiverId([9; 5])).is_some());
        for id in 2..=PAIRING_CAPACITY as u8 {
            assert!(cache.lookup(ReceiverId([id; 5])).is_some());
        }
    }

    #[test]
    fn invalidate_frees_the_slot_for_reuse() {
        let mut cache = PairingCache::new();
        for id in 1..=PAIRING_CAPACITY as u8 {
            cache.upsert(entry(id));
        }
        cache.invalidate(ReceiverId([3; 5]));
        assert!(cache.lookup(ReceiverId([3; 5])).is_none());

        cache.upsert(entry(9));
        // Reused the freed slot instead of evicting slot 0.
        assert!(cache.lookup(ReceiverId([1; 5])).is_some());
        assert!(cache.lookup(ReceiverId([9; 5])).is_some());
    }
}
