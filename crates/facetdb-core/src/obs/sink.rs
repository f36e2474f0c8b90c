use derive_more::Display;

///
/// EvictionReason
///

#[derive(Clone, Copy, Debug, Display, Eq, PartialEq)]
#[remain::sorted]
pub enum EvictionReason {
    /// Dropped to stay within shard capacity.
    Capacity,
    /// Idle longer than the access-expiry window.
    Expired,
}

///
/// CacheEvent
///
/// One observable cache transition. Eviction is diagnostics only; it is
/// never surfaced as a failure to the caller.
///

#[derive(Clone, Debug, Eq, PartialEq)]
#[remain::sorted]
pub enum CacheEvent {
    Evict { key: String, reason: EvictionReason },
    Hit { key: String },
    Invalidate { key: String },
    Miss { key: String },
    Put { key: String },
}

///
/// CacheTraceSink
///
/// Injected by the caller; optional; must not affect cache semantics.
///

pub trait CacheTraceSink: Send + Sync {
    fn on_event(&self, event: &CacheEvent);
}
