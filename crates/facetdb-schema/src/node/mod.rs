mod index;
mod property;
mod record;

pub use index::IndexSpec;
pub use property::{PropertySpec, PropertyTag, SortOrder};
pub use record::{RecordKind, RecordSpec};
