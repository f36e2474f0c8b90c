use crate::facet::UnboundFacet;
use derive_more::Display;
use facetdb_schema::{
    node::{IndexSpec, RecordKind, SortOrder},
    types::StoreType,
};
use serde::Serialize;
use std::{
    fmt::{self, Display},
    sync::Arc,
};

///
/// ColumnKind
///
/// Exactly one per property. Partition keys identify a record; clustering
/// columns order it within its partition; static columns are shared across
/// a partition; everything else is a regular column.
///

#[derive(Clone, Copy, Debug, Display, Eq, PartialEq, Serialize)]
#[remain::sorted]
pub enum ColumnKind {
    ClusteringColumn,
    Column,
    PartitionKey,
    StaticColumn,
}

impl ColumnKind {
    /// Sort rank for the canonical (kind, ordinal) property ordering.
    #[must_use]
    pub const fn rank(self) -> u8 {
        match self {
            Self::PartitionKey => 0,
            Self::ClusteringColumn => 1,
            Self::StaticColumn => 2,
            Self::Column => 3,
        }
    }

    /// Whether the kind participates in record identity or ordering.
    /// Key columns are never touched by the merge policy.
    #[must_use]
    pub const fn is_key(self) -> bool {
        matches!(self, Self::PartitionKey | Self::ClusteringColumn)
    }
}

///
/// DataType
///
/// Resolved store-facing type of a property. Nested records and their
/// collections are frozen: the store treats them as one opaque cell.
///

#[derive(Clone, Debug, PartialEq, Serialize)]
#[remain::sorted]
pub enum DataType {
    List(Box<DataType>),

    Map(Box<DataType>, Box<DataType>),

    Record {
        name: String,
        frozen: bool,
        descriptor: Arc<EntityDescriptor>,
    },

    Scalar(StoreType),

    Set(Box<DataType>),

    Tuple(Vec<DataType>),
}

impl DataType {
    #[must_use]
    pub const fn is_collection(&self) -> bool {
        matches!(self, Self::List(_) | Self::Map(..) | Self::Set(_))
    }
}

impl Display for DataType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::List(element) => write!(f, "list<{element}>"),
            Self::Map(key, value) => write!(f, "map<{key}, {value}>"),
            Self::Record { name, frozen, .. } => {
                if *frozen {
                    write!(f, "frozen<{name}>")
                } else {
                    write!(f, "{name}")
                }
            }
            Self::Scalar(store) => write!(f, "{store}"),
            Self::Set(element) => write!(f, "set<{element}>"),
            Self::Tuple(elements) => {
                let parts: Vec<String> = elements.iter().map(ToString::to_string).collect();
                write!(f, "tuple<{}>", parts.join(", "))
            }
        }
    }
}

///
/// PropertyDescriptor
///
/// One mapped property: declared ident, resolved column name, column kind
/// with its ordinal, ordering direction (clustering only), resolved store
/// type, and any declared index.
///

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct PropertyDescriptor {
    pub ident: String,
    pub column: String,
    pub kind: ColumnKind,
    pub ordinal: u32,
    pub order: SortOrder,
    pub data_type: DataType,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub index: Option<IndexSpec>,
}

impl PropertyDescriptor {
    /// Nested descriptor, if this property resolves to a described record.
    #[must_use]
    pub const fn nested(&self) -> Option<&Arc<EntityDescriptor>> {
        match &self.data_type {
            DataType::Record { descriptor, .. } => Some(descriptor),
            _ => None,
        }
    }
}

impl Display for PropertyDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {} [{} #{}]",
            self.column, self.data_type, self.kind, self.ordinal
        )
    }
}

///
/// EntityDescriptor
///
/// Immutable runtime model of one record type: properties sorted by
/// (kind, ordinal) plus the identity facets derived from key membership
/// and unique indexes. Built once per record path and shared via `Arc`.
///

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct EntityDescriptor {
    pub path: String,
    pub name: String,
    pub kind: RecordKind,
    pub properties: Vec<PropertyDescriptor>,
    pub facets: Vec<UnboundFacet>,
}

impl EntityDescriptor {
    /// Look up a property by declared ident.
    #[must_use]
    pub fn property(&self, ident: &str) -> Option<&PropertyDescriptor> {
        self.properties.iter().find(|p| p.ident == ident)
    }

    /// Look up a property by resolved column name.
    #[must_use]
    pub fn column(&self, column: &str) -> Option<&PropertyDescriptor> {
        self.properties.iter().find(|p| p.column == column)
    }

    pub fn partition_keys(&self) -> impl Iterator<Item = &PropertyDescriptor> {
        self.properties
            .iter()
            .filter(|p| p.kind == ColumnKind::PartitionKey)
    }

    pub fn clustering_columns(&self) -> impl Iterator<Item = &PropertyDescriptor> {
        self.properties
            .iter()
            .filter(|p| p.kind == ColumnKind::ClusteringColumn)
    }

    /// Non-key columns: the merge policy's working set.
    pub fn value_columns(&self) -> impl Iterator<Item = &PropertyDescriptor> {
        self.properties.iter().filter(|p| !p.kind.is_key())
    }
}

impl Display for EntityDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} '{}' ({})", self.kind, self.name, self.path)
    }
}
