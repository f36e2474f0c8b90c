use crate::model::descriptor::ColumnKind;
use facetdb_schema::types::CollectionKind;
use thiserror::Error as ThisError;

///
/// MappingError
///
/// Malformed or ambiguous entity metadata. Always fatal to building the
/// descriptor; surfaced to the caller at first use and never retried.
///

#[derive(Clone, Debug, Eq, PartialEq, ThisError)]
pub enum MappingError {
    #[error("property '{property}' on '{path}' declares more than one column kind")]
    ConflictingKinds { path: String, property: String },

    #[error("cyclic record reference detected while resolving '{path}'")]
    CyclicRecordReference { path: String },

    #[error("record '{path}' is already registered")]
    DuplicateRecord { path: String },

    #[error("duplicate {kind} ordinal {ordinal} on '{path}'")]
    DuplicateOrdinal {
        path: String,
        kind: ColumnKind,
        ordinal: u32,
    },

    #[error("table record '{path}' declares no partition key")]
    MissingPartitionKey { path: String },

    #[error("tuple record '{path}' has non-contiguous ordinals: expected {expected}, found {found}")]
    NonContiguousOrdinals {
        path: String,
        expected: u32,
        found: u32,
    },

    #[error(
        "collection {kind} on '{path}.{property}' expects {expected} type parameter(s), found {found}"
    )]
    TypeParamArity {
        path: String,
        property: String,
        kind: CollectionKind,
        expected: usize,
        found: usize,
    },

    #[error("unknown property '{property}' on '{path}'")]
    UnknownProperty { path: String, property: String },

    #[error("unknown record '{path}'")]
    UnknownRecord { path: String },
}
