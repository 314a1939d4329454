use std::{
    collections::HashMap,
    sync::{Arc, RwLock},
};

use chrono::{DateTime, Duration, Utc};

/// Time source for the cache. Injected so tests can run on a manual clock.
pub type Clock = Arc<dyn Fn() -> DateTime<Utc> + Send + Sync>;

struct CacheEntry<T> {
    value: T,
    created_at: DateTime<Utc>,
}

/// In-memory TTL cache, one entry per key, no size bound.
///
/// Expiry is lazy: an entry is only declared dead when `get` sees that its
/// age has reached the TTL. Nothing sweeps old entries; with a single key
/// per feed URL that never adds up to anything.
pub struct MemoryCache<T> {
    ttl: Duration,
    clock: Clock,
    entries: RwLock<HashMap<String, CacheEntry<T>>>,
}

impl<T: Clone> MemoryCache<T> {
    pub fn new(ttl: Duration) -> Self {
        Self::with_clock(ttl, Arc::new(Utc::now))
    }

    pub fn with_clock(ttl: Duration, clock: Clock) -> Self {
        Self {
            ttl,
            clock,
            entries: RwLock::new(HashMap::new()),
        }
    }

    /// Returns the entry for `key` if it exists and is still fresh.
    pub fn get(&self, key: &str) -> Option<T> {
        let entries = self.entries.read().unwrap();
        let entry = entries.get(key)?;

        if (self.clock)() - entry.created_at < self.ttl {
            Some(entry.value.clone())
        } else {
            None
        }
    }

    /// Inserts or overwrites, resetting the entry age.
    pub fn insert(&self, key: &str, value: T) {
        let entry = CacheEntry {
            value,
            created_at: (self.clock)(),
        };
        self.entries.write().unwrap().insert(key.to_string(), entry);
    }
}

/// Manual clock for tests: advance the returned handle to travel forward.
#[cfg(test)]
pub(crate) fn manual_clock(start: DateTime<Utc>) -> (Clock, Arc<RwLock<DateTime<Utc>>>) {
    let now = Arc::new(RwLock::new(start));
    let handle = now.clone();

    (Arc::new(move || *now.read().unwrap()), handle)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn start_time() -> DateTime<Utc> {
        DateTime::from_timestamp(1_700_000_000, 0).unwrap()
    }

    #[test]
    fn fresh_entry_is_returned() {
        let (clock, _) = manual_clock(start_time());
        let cache = MemoryCache::with_clock(Duration::seconds(3600), clock);

        cache.insert("de", vec![1, 2, 3]);
        assert_eq!(cache.get("de"), Some(vec![1, 2, 3]));
    }

    #[test]
    fn missing_key_is_none() {
        let cache: MemoryCache<u8> = MemoryCache::new(Duration::seconds(3600));
        assert_eq!(cache.get("nope"), None);
    }

    #[test]
    fn entry_expires_after_ttl() {
        let (clock, now) = manual_clock(start_time());
        let cache = MemoryCache::with_clock(Duration::seconds(3600), clock);

        cache.insert("de", "plan");
        *now.write().unwrap() = start_time() + Duration::seconds(3599);
        assert_eq!(cache.get("de"), Some("plan"));

        *now.write().unwrap() = start_time() + Duration::seconds(3600);
        assert_eq!(cache.get("de"), None);
    }

    #[test]
    fn overwrite_resets_entry_age() {
        let (clock, now) = manual_clock(start_time());
        let cache = MemoryCache::with_clock(Duration::seconds(3600), clock);

        cache.insert("de", "old");
        *now.write().unwrap() = start_time() + Duration::seconds(3599);
        cache.insert("de", "new");

        *now.write().unwrap() = start_time() + Duration::seconds(7000);
        assert_eq!(cache.get("de"), Some("new"));
    }

    #[test]
    fn keys_expire_independently() {
        let (clock, now) = manual_clock(start_time());
        let cache = MemoryCache::with_clock(Duration::seconds(3600), clock);

        cache.insert("de", "german");
        *now.write().unwrap() = start_time() + Duration::seconds(3000);
        cache.insert("en", "english");

        *now.write().unwrap() = start_time() + Duration::seconds(4000);
        assert_eq!(cache.get("de"), None);
        assert_eq!(cache.get("en"), Some("english"));
    }
}
