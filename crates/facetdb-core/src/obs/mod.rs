//! Observability: cache telemetry events and sink abstractions.
//!
//! Cache logic MUST NOT depend on sinks being present. All instrumentation
//! flows through [`CacheEvent`]; events are emitted outside the cache's
//! locks so a slow sink can never block the put/get path.

mod metrics;
mod sink;

pub use metrics::{CacheMetrics, CacheStats};
pub use sink::{CacheEvent, CacheTraceSink, EvictionReason};
