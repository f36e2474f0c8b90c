//! Session-scoped record cache.
//!
//! A bounded, sharded map from derived facet keys to cached records. The
//! cache is a pure performance optimization: a miss is always safely
//! resolvable from the authoritative store, so eviction is observable but
//! never semantically significant. Keys route to shards by hash, giving
//! per-key linearizability without a global lock; `put` racing `put` on
//! one key is last-write-wins at the key level (finer reconciliation is
//! the merge policy's job, applied by the caller before `put`).

use crate::{
    obs::{CacheEvent, CacheMetrics, CacheStats, CacheTraceSink, EvictionReason},
    record::Record,
};
use std::{
    collections::HashMap,
    hash::{BuildHasher, RandomState},
    sync::{Arc, Mutex, MutexGuard, atomic::{AtomicU64, Ordering}},
    time::{Duration, Instant},
};

///
/// CacheConfig
///

#[derive(Clone, Copy, Debug)]
pub struct CacheConfig {
    /// Total entry budget across all shards.
    pub capacity: usize,
    /// Access-expiry window: entries idle longer than this are dropped.
    pub idle_ttl: Duration,
    /// Shard count; clamped to at least one.
    pub shards: usize,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            capacity: 4096,
            idle_ttl: Duration::from_secs(300),
            shards: 16,
        }
    }
}

///
/// CacheSlot
///
/// A cached materialization: one record, or a record set for keys that
/// address a non-unique shape.
///

#[derive(Clone, Debug, PartialEq)]
pub enum CacheSlot {
    Record(Record),
    Records(Vec<Record>),
}

impl CacheSlot {
    #[must_use]
    pub const fn as_record(&self) -> Option<&Record> {
        match self {
            Self::Record(record) => Some(record),
            Self::Records(_) => None,
        }
    }
}

struct Entry {
    slot: Arc<CacheSlot>,
    last_access: Instant,
    // Monotonic recency tick; deterministic where Instant granularity
    // is too coarse to order two accesses.
    touched: u64,
}

#[derive(Default)]
struct Shard {
    entries: HashMap<String, Entry>,
}

///
/// SessionCache
///

pub struct SessionCache {
    shards: Box<[Mutex<Shard>]>,
    shard_capacity: usize,
    idle_ttl: Duration,
    hasher: RandomState,
    clock: AtomicU64,
    metrics: CacheMetrics,
    sink: Option<Arc<dyn CacheTraceSink>>,
}

impl Default for SessionCache {
    fn default() -> Self {
        Self::new(CacheConfig::default())
    }
}

impl SessionCache {
    #[must_use]
    pub fn new(config: CacheConfig) -> Self {
        let shard_count = config.shards.max(1);
        let shards = (0..shard_count)
            .map(|_| Mutex::new(Shard::default()))
            .collect();

        Self {
            shards,
            shard_capacity: config.capacity.div_ceil(shard_count).max(1),
            idle_ttl: config.idle_ttl,
            hasher: RandomState::new(),
            clock: AtomicU64::new(0),
            metrics: CacheMetrics::default(),
            sink: None,
        }
    }

    /// Attach an event sink. Sinks observe transitions only; they are
    /// invoked outside the shard locks.
    #[must_use]
    pub fn with_sink(mut self, sink: Arc<dyn CacheTraceSink>) -> Self {
        self.sink = Some(sink);
        self
    }

    /// Look up a key. Touches recency on hit; an entry past its idle
    /// window counts as a miss and is dropped.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<Arc<CacheSlot>> {
        #[derive(Clone, Copy)]
        enum Status {
            Absent,
            Expired,
            Live,
        }

        let mut events = Vec::new();
        let result = {
            let mut shard = self.shard(key);

            let status = match shard.entries.get(key) {
                None => Status::Absent,
                Some(entry) if entry.last_access.elapsed() > self.idle_ttl => Status::Expired,
                Some(_) => Status::Live,
            };

            match status {
                Status::Absent => {
                    events.push(CacheEvent::Miss {
                        key: key.to_string(),
                    });
                    self.metrics.record_miss();
                    None
                }
                Status::Expired => {
                    shard.entries.remove(key);
                    events.push(CacheEvent::Evict {
                        key: key.to_string(),
                        reason: EvictionReason::Expired,
                    });
                    events.push(CacheEvent::Miss {
                        key: key.to_string(),
                    });
                    self.metrics.record_evictions(1);
                    self.metrics.record_miss();
                    None
                }
                Status::Live => {
                    let tick = self.tick();
                    shard.entries.get_mut(key).map(|entry| {
                        entry.last_access = Instant::now();
                        entry.touched = tick;
                        events.push(CacheEvent::Hit {
                            key: key.to_string(),
                        });
                        self.metrics.record_hit();
                        Arc::clone(&entry.slot)
                    })
                }
            }
        };

        self.emit(&events);
        result
    }

    /// Insert or replace a key. Overflowing the shard budget drops expired
    /// entries first, then the least-recently-accessed survivors.
    pub fn put(&self, key: impl Into<String>, slot: CacheSlot) {
        let key = key.into();
        let mut events = vec![CacheEvent::Put { key: key.clone() }];

        {
            let mut shard = self.shard(&key);
            shard.entries.insert(
                key,
                Entry {
                    slot: Arc::new(slot),
                    last_access: Instant::now(),
                    touched: self.tick(),
                },
            );

            if shard.entries.len() > self.shard_capacity {
                self.evict_overflow(&mut shard, &mut events);
            }
        }

        self.metrics.record_put();
        self.emit(&events);
    }

    /// Drop a key. Absence is not an error.
    pub fn invalidate(&self, key: &str) -> bool {
        let removed = self.shard(key).entries.remove(key).is_some();

        if removed {
            self.metrics.record_invalidation();
            self.emit(&[CacheEvent::Invalidate {
                key: key.to_string(),
            }]);
        }

        removed
    }

    /// Drop every key in the iterator; the write/delete path uses this to
    /// retire all shapes of one record together.
    pub fn invalidate_all<I>(&self, keys: I)
    where
        I: IntoIterator,
        I::Item: AsRef<str>,
    {
        for key in keys {
            self.invalidate(key.as_ref());
        }
    }

    /// Drop everything without emitting per-key events.
    pub fn clear(&self) {
        for shard in &self.shards {
            shard
                .lock()
                .expect("session cache shard mutex poisoned")
                .entries
                .clear();
        }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.shards
            .iter()
            .map(|shard| {
                shard
                    .lock()
                    .expect("session cache shard mutex poisoned")
                    .entries
                    .len()
            })
            .sum()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    #[must_use]
    pub fn stats(&self) -> CacheStats {
        self.metrics.snapshot(self.len())
    }

    fn evict_overflow(&self, shard: &mut Shard, events: &mut Vec<CacheEvent>) {
        let expired: Vec<String> = shard
            .entries
            .iter()
            .filter(|(_, entry)| entry.last_access.elapsed() > self.idle_ttl)
            .map(|(key, _)| key.clone())
            .collect();
        for key in expired {
            shard.entries.remove(&key);
            events.push(CacheEvent::Evict {
                key,
                reason: EvictionReason::Expired,
            });
            self.metrics.record_evictions(1);
        }

        while shard.entries.len() > self.shard_capacity {
            let Some(coldest) = shard
                .entries
                .iter()
                .min_by_key(|(_, entry)| entry.touched)
                .map(|(key, _)| key.clone())
            else {
                break;
            };
            shard.entries.remove(&coldest);
            events.push(CacheEvent::Evict {
                key: coldest,
                reason: EvictionReason::Capacity,
            });
            self.metrics.record_evictions(1);
        }
    }

    fn shard(&self, key: &str) -> MutexGuard<'_, Shard> {
        let index = (self.hasher.hash_one(key) as usize) % self.shards.len();
        self.shards[index]
            .lock()
            .expect("session cache shard mutex poisoned")
    }

    fn tick(&self) -> u64 {
        self.clock.fetch_add(1, Ordering::Relaxed)
    }

    fn emit(&self, events: &[CacheEvent]) {
        if let Some(sink) = &self.sink {
            for event in events {
                sink.on_event(event);
            }
        }
    }
}

///
/// TESTS
///

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::EntityRegistry;
    use crate::record::AttrValue;
    use facetdb_schema::{
        node::{PropertySpec, RecordSpec},
        types::{Primitive, TypeSpec},
    };
    use std::sync::Mutex as StdMutex;

    fn sample_record(id: &str) -> Record {
        let registry = EntityRegistry::new();
        registry
            .register(
                RecordSpec::table("demo::Widget")
                    .name("widgets")
                    .property(
                        PropertySpec::new("id", TypeSpec::Primitive(Primitive::Uuid)).partition(0),
                    ),
            )
            .unwrap();
        Record::new(registry.describe("demo::Widget").unwrap())
            .with("id", AttrValue::Text(id.into()))
    }

    fn single_shard(capacity: usize) -> SessionCache {
        SessionCache::new(CacheConfig {
            capacity,
            idle_ttl: Duration::from_secs(300),
            shards: 1,
        })
    }

    #[derive(Default)]
    struct RecordingSink {
        events: StdMutex<Vec<CacheEvent>>,
    }

    impl CacheTraceSink for RecordingSink {
        fn on_event(&self, event: &CacheEvent) {
            self.events.lock().unwrap().push(event.clone());
        }
    }

    #[test]
    fn get_after_put_hits() {
        let cache = single_shard(8);
        cache.put("k1", CacheSlot::Record(sample_record("a")));

        let slot = cache.get("k1").unwrap();
        assert!(matches!(&*slot, CacheSlot::Record(_)));

        let stats = cache.stats();
        assert_eq!(stats.hits, 1);
        assert_eq!(stats.misses, 0);
        assert_eq!(stats.size, 1);
    }

    #[test]
    fn miss_is_not_an_error_and_is_counted() {
        let cache = single_shard(8);
        assert!(cache.get("absent").is_none());
        assert_eq!(cache.stats().misses, 1);
    }

    #[test]
    fn put_overwrites_at_key_level() {
        let cache = single_shard(8);
        cache.put("k1", CacheSlot::Record(sample_record("a")));
        cache.put("k1", CacheSlot::Record(sample_record("b")));

        let slot = cache.get("k1").unwrap();
        let CacheSlot::Record(record) = &*slot else {
            panic!("expected record slot");
        };
        assert_eq!(record.get("id"), Some(&AttrValue::Text("b".into())));
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn capacity_overflow_evicts_least_recently_accessed() {
        let cache = single_shard(2);
        cache.put("k1", CacheSlot::Record(sample_record("a")));
        cache.put("k2", CacheSlot::Record(sample_record("b")));

        // Touch k1 so k2 becomes the coldest entry.
        let _ = cache.get("k1");
        cache.put("k3", CacheSlot::Record(sample_record("c")));

        assert!(cache.get("k2").is_none());
        assert!(cache.get("k1").is_some());
        assert!(cache.get("k3").is_some());
        assert_eq!(cache.stats().evictions, 1);
    }

    #[test]
    fn idle_entries_expire_on_access() {
        let cache = SessionCache::new(CacheConfig {
            capacity: 8,
            idle_ttl: Duration::ZERO,
            shards: 1,
        });
        cache.put("k1", CacheSlot::Record(sample_record("a")));

        assert!(cache.get("k1").is_none());
        let stats = cache.stats();
        assert_eq!(stats.evictions, 1);
        assert_eq!(stats.misses, 1);
        assert_eq!(stats.size, 0);
    }

    #[test]
    fn invalidate_drops_the_key() {
        let cache = single_shard(8);
        cache.put("k1", CacheSlot::Record(sample_record("a")));

        assert!(cache.invalidate("k1"));
        assert!(!cache.invalidate("k1"));
        assert!(cache.get("k1").is_none());
    }

    #[test]
    fn invalidate_all_covers_the_key_set() {
        let cache = single_shard(8);
        cache.put("k1", CacheSlot::Record(sample_record("a")));
        cache.put("k2", CacheSlot::Record(sample_record("a")));
        cache.put("k3", CacheSlot::Record(sample_record("a")));

        cache.invalidate_all(["k1", "k2"]);
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn sink_observes_transitions_in_order() {
        let sink = Arc::new(RecordingSink::default());
        let cache = single_shard(8).with_sink(Arc::clone(&sink) as Arc<dyn CacheTraceSink>);

        cache.put("k1", CacheSlot::Record(sample_record("a")));
        let _ = cache.get("k1");
        cache.invalidate("k1");

        let events = sink.events.lock().unwrap();
        assert_eq!(
            *events,
            vec![
                CacheEvent::Put { key: "k1".into() },
                CacheEvent::Hit { key: "k1".into() },
                CacheEvent::Invalidate { key: "k1".into() },
            ]
        );
    }

    #[test]
    fn concurrent_readers_and_writers_do_not_corrupt_entries() {
        // Budget well above the insert count so eviction never races the
        // final length assertion.
        let cache = Arc::new(SessionCache::new(CacheConfig {
            capacity: 4096,
            idle_ttl: Duration::from_secs(300),
            shards: 8,
        }));

        std::thread::scope(|scope| {
            for worker in 0..4 {
                let cache = Arc::clone(&cache);
                scope.spawn(move || {
                    for i in 0..100 {
                        let key = format!("k{}", (worker * 100) + i);
                        cache.put(&key, CacheSlot::Record(sample_record("x")));
                        assert!(cache.get(&key).is_some());
                    }
                });
            }
        });

        assert_eq!(cache.len(), 400);
    }
}
