//! facetdb — declarative entity mapping and facet-keyed session caching
//! for column-oriented stores.
//!
//! This is the public meta-crate. Downstream users depend on **facetdb**
//! only. It re-exports the stable public API from:
//!   - `facetdb-schema` (declarative record/property specs)
//!   - `facetdb-core`   (descriptors, paths, facets, cache, merge)

pub use facetdb_core as core;
pub use facetdb_schema as schema;

use thiserror::Error as ThisError;

///
/// Error
///
/// Facade error: everything the runtime can refuse, in one place.
///

#[derive(Clone, Debug, Eq, PartialEq, ThisError)]
pub enum Error {
    #[error(transparent)]
    Core(#[from] facetdb_core::error::Error),
}

///
/// Prelude
///

pub mod prelude {
    pub use facetdb_core::prelude::*;
    pub use facetdb_schema::prelude::*;
}

///
/// TESTS
///
