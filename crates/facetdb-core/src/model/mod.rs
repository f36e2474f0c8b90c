//! Runtime entity model.
//!
//! Schema specs (`facetdb-schema`) define *what exists*; the descriptors in
//! this module define *what runs*. A descriptor is built once per record
//! path through an [`registry::EntityRegistry`] and shared immutably.

mod build;
mod descriptor;
mod error;
mod registry;

pub use descriptor::{ColumnKind, DataType, EntityDescriptor, PropertyDescriptor};
pub use error::MappingError;
pub use registry::{EntityRegistry, PropertyFilter};
