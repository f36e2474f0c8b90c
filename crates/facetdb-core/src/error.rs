use crate::{facet::FacetError, merge::MergeError, model::MappingError, path::PathError};
use thiserror::Error as ThisError;

///
/// Error
///
/// Aggregate over the runtime error taxonomy. None of these are retried
/// internally. The cache layer itself has no error path: a miss is not an
/// error and eviction is never reported as failure.
///

#[derive(Clone, Debug, Eq, PartialEq, ThisError)]
#[remain::sorted]
pub enum Error {
    #[error(transparent)]
    Facet(#[from] FacetError),

    #[error(transparent)]
    Mapping(#[from] MappingError),

    #[error(transparent)]
    Merge(#[from] MergeError),

    #[error(transparent)]
    Path(#[from] PathError),
}
