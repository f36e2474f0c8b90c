//! Declarative schema layer for facetdb: record/property specs, column tags,
//! store-facing type specs, and the naming policy.
//!
//! This crate defines *what exists*. The runtime descriptors built from these
//! specs live in `facetdb-core` and define *what runs*.

pub mod naming;
pub mod node;
pub mod types;

///
/// Prelude
///
/// Prelude contains only schema vocabulary.
///

pub mod prelude {
    pub use crate::{
        naming::NamingPolicy,
        node::{IndexSpec, PropertySpec, PropertyTag, RecordKind, RecordSpec, SortOrder},
        types::{CollectionKind, Primitive, StoreType, TypeSpec},
    };
}
