//! Core runtime for facetdb: entity descriptors, property paths, facet
//! derivation, the session cache, the merge policy, and the ergonomics
//! exported via the `prelude`.

pub mod cache;
pub mod error;
pub mod facet;
pub mod merge;
pub mod model;
pub mod obs;
pub mod path;
pub mod record;
pub mod session;

///
/// Prelude
///
/// Prelude contains only domain vocabulary. No errors, sinks, or helpers
/// are re-exported here.
///

pub mod prelude {
    pub use crate::{
        cache::{CacheConfig, CacheSlot, SessionCache},
        facet::{BoundFacet, UnboundFacet},
        model::{ColumnKind, DataType, EntityDescriptor, EntityRegistry, PropertyDescriptor},
        path::{PathBuilder, PropertyPathNode},
        record::{AttrValue, Record},
        session::SessionOps,
    };
}
