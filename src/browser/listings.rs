use crate::providers::ObjectEntry;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Mutex;

/// Latest listing snapshot per bucket.
///
/// Every listing request takes a sequence number up front, so a slow,
/// older listing can never replace a newer one.
#[derive(Debug, Default)]
pub(crate) struct Listings {
    next_seq: AtomicU64,
    snapshots: Mutex<HashMap<String, (u64, Vec<ObjectEntry>)>>,
}

impl Listings {
    pub fn begin(&self) -> u64 {
        self.next_seq.fetch_add(1, Ordering::SeqCst) + 1
    }

    /// Store `entries` unless a later listing of `bucket` already landed
    pub fn publish(&self, bucket: &str, seq: u64, entries: Vec<ObjectEntry>) -> bool {
        let mut snapshots = self.snapshots.lock().unwrap_or_else(|e| e.into_inner());
        match snapshots.get(bucket) {
            Some((current, _)) if *current > seq => false,
            _ => {
                snapshots.insert(bucket.to_string(), (seq, entries));
                true
            }
        }
    }

    pub fn get(&self, bucket: &str) -> Option<Vec<ObjectEntry>> {
        let snapshots = self.snapshots.lock().unwrap_or_else(|e| e.into_inner());
        snapshots.get(bucket).map(|(_, entries)| entries.clone())
    }

    /// Object size from the latest listing, if that listing reported one
    pub fn size_of(&self, bucket: &str, key: &str) -> Option<u64> {
        let snapshots = self.snapshots.lock().unwrap_or_else(|e| e.into_inner());
        snapshots
            .get(bucket)?
            .1
            .iter()
            .find(|entry| entry.key == key)
            .and_then(|entry| entry.size)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn later_listing_supersedes_earlier() {
        let listings = Listings::default();
        let first = listings.begin();
        let second = listings.begin();

        assert!(listings.publish("b", second, vec![ObjectEntry::object("new", Some(2))]));
        assert!(!listings.publish("b", first, vec![ObjectEntry::object("old", Some(1))]));

        let entries = listings.get("b").unwrap();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].key, "new");
        assert_eq!(listings.size_of("b", "new"), Some(2));
        assert_eq!(listings.size_of("b", "old"), None);
        assert_eq!(listings.get("other"), None);
    }
}
