use crate::{node::IndexSpec, types::TypeSpec};
use derive_more::{Display, FromStr};
use serde::{Deserialize, Serialize};

///
/// SortOrder
///
/// Ordering direction for clustering columns. Meaningless on any other
/// column kind and ignored there.
///

#[derive(
    Clone, Copy, Debug, Default, Deserialize, Display, Eq, FromStr, PartialEq, Serialize,
)]
pub enum SortOrder {
    #[default]
    Asc,
    Desc,
}

///
/// PropertyTag
///
/// Declarative metadata attached to one property. Column-kind tags are
/// mutually exclusive; declaring more than one is a mapping error.
///

#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
#[remain::sorted]
pub enum PropertyTag {
    /// Clustering (ordering) key with position and direction.
    Clustering { ordinal: u32, order: SortOrder },

    /// Regular column with an explicit position (required for tuple records,
    /// where ordinals must run contiguously from zero).
    Column { ordinal: u32 },

    /// Secondary index declaration.
    Index(IndexSpec),

    /// Partition (identifying) key with position.
    Partition { ordinal: u32 },

    /// Shared across all rows of one partition.
    Static,

    /// Excluded from mapping entirely.
    Transient,
}

///
/// PropertySpec
///
/// One declared property of a record: ident, optional explicit column name,
/// declared value type, and tags.
///

#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
pub struct PropertySpec {
    pub ident: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub column: Option<String>,

    pub ty: TypeSpec,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<PropertyTag>,
}

impl PropertySpec {
    #[must_use]
    pub fn new(ident: impl Into<String>, ty: TypeSpec) -> Self {
        Self {
            ident: ident.into(),
            column: None,
            ty,
            tags: Vec::new(),
        }
    }

    #[must_use]
    pub fn column(mut self, name: impl Into<String>) -> Self {
        self.column = Some(name.into());
        self
    }

    #[must_use]
    pub fn tag(mut self, tag: PropertyTag) -> Self {
        self.tags.push(tag);
        self
    }

    /// Shorthand for a partition-key tag.
    #[must_use]
    pub fn partition(self, ordinal: u32) -> Self {
        self.tag(PropertyTag::Partition { ordinal })
    }

    /// Shorthand for a clustering tag.
    #[must_use]
    pub fn clustering(self, ordinal: u32, order: SortOrder) -> Self {
        self.tag(PropertyTag::Clustering { ordinal, order })
    }

    #[must_use]
    pub fn is_transient(&self) -> bool {
        self.tags.iter().any(|t| matches!(t, PropertyTag::Transient))
    }

    #[must_use]
    pub fn index(&self) -> Option<&IndexSpec> {
        self.tags.iter().find_map(|t| match t {
            PropertyTag::Index(spec) => Some(spec),
            _ => None,
        })
    }
}

///
/// TESTS
///
