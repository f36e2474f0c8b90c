use derive_more::{Display, FromStr};
use serde::{Deserialize, Serialize};

///
/// Primitive
///
/// Declared scalar vocabulary for record properties. Each primitive has a
/// fixed store-facing mapping; anything not representable here must be
/// declared as a collection, tuple, or nested record.
///

#[derive(Clone, Copy, Debug, Deserialize, Display, Eq, FromStr, PartialEq, Serialize)]
#[remain::sorted]
pub enum Primitive {
    Blob,
    Bool,
    Date,
    Decimal,
    Float32,
    Float64,
    Inet,
    Int8,
    Int16,
    Int32,
    Int64,
    Text,
    Timestamp,
    Uuid,
}

impl Primitive {
    /// Fixed mapping into the store's native column types.
    #[must_use]
    pub const fn store_type(self) -> StoreType {
        match self {
            Self::Blob => StoreType::Blob,
            Self::Bool => StoreType::Boolean,
            Self::Date => StoreType::Date,
            Self::Decimal => StoreType::Decimal,
            Self::Float32 => StoreType::Float,
            Self::Float64 => StoreType::Double,
            Self::Inet => StoreType::Inet,
            Self::Int8 => StoreType::Tinyint,
            Self::Int16 => StoreType::Smallint,
            Self::Int32 => StoreType::Int,
            Self::Int64 => StoreType::Bigint,
            Self::Text => StoreType::Text,
            Self::Timestamp => StoreType::Timestamp,
            Self::Uuid => StoreType::Uuid,
        }
    }

    #[must_use]
    pub const fn is_numeric(self) -> bool {
        matches!(
            self,
            Self::Decimal
                | Self::Float32
                | Self::Float64
                | Self::Int8
                | Self::Int16
                | Self::Int32
                | Self::Int64
        )
    }
}

///
/// StoreType
///
/// Column types as the store spells them. Purely a projection target for
/// DDL generation; the runtime never interprets these.
///

#[derive(Clone, Copy, Debug, Deserialize, Display, Eq, FromStr, PartialEq, Serialize)]
#[remain::sorted]
pub enum StoreType {
    Bigint,
    Blob,
    Boolean,
    Date,
    Decimal,
    Double,
    Float,
    Inet,
    Int,
    Smallint,
    Text,
    Timestamp,
    Tinyint,
    Uuid,
}

///
/// CollectionKind
///

#[derive(Clone, Copy, Debug, Deserialize, Display, Eq, FromStr, PartialEq, Serialize)]
#[remain::sorted]
pub enum CollectionKind {
    List,
    Map,
    Set,
}

impl CollectionKind {
    /// Exact number of element type parameters the kind requires.
    #[must_use]
    pub const fn expected_params(self) -> usize {
        match self {
            Self::List | Self::Set => 1,
            Self::Map => 2,
        }
    }
}

///
/// TypeSpec
///
/// Declared value type of a property. Collections carry their element
/// parameters as a list so arity violations stay representable and are
/// rejected at descriptor-build time, not silently normalized.
///

#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
pub enum TypeSpec {
    Primitive(Primitive),

    Collection {
        kind: CollectionKind,
        params: Vec<TypeSpec>,
    },

    /// Reference to another described record, by registry path.
    Record(String),

    Tuple(Vec<TypeSpec>),
}

impl TypeSpec {
    #[must_use]
    pub fn list(element: Self) -> Self {
        Self::Collection {
            kind: CollectionKind::List,
            params: vec![element],
        }
    }

    #[must_use]
    pub fn set(element: Self) -> Self {
        Self::Collection {
            kind: CollectionKind::Set,
            params: vec![element],
        }
    }

    #[must_use]
    pub fn map(key: Self, value: Self) -> Self {
        Self::Collection {
            kind: CollectionKind::Map,
            params: vec![key, value],
        }
    }

    #[must_use]
    pub const fn is_collection(&self) -> bool {
        matches!(self, Self::Collection { .. })
    }
}

///
/// TESTS
///

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn primitive_store_mapping_is_total() {
        // Display/FromStr round-trip doubles as an exhaustiveness probe.
        for primitive in [
            Primitive::Blob,
            Primitive::Bool,
            Primitive::Date,
            Primitive::Decimal,
            Primitive::Float32,
            Primitive::Float64,
            Primitive::Inet,
            Primitive::Int8,
            Primitive::Int16,
            Primitive::Int32,
            Primitive::Int64,
            Primitive::Text,
            Primitive::Timestamp,
            Primitive::Uuid,
        ] {
            let parsed: Primitive = primitive.to_string().parse().unwrap();
            assert_eq!(parsed, primitive);
            let _ = primitive.store_type();
        }
    }

    #[test]
    fn collection_constructors_carry_exact_arity() {
        let spec = TypeSpec::map(
            TypeSpec::Primitive(Primitive::Text),
            TypeSpec::Primitive(Primitive::Int64),
        );
        let TypeSpec::Collection { kind, params } = spec else {
            panic!("expected collection");
        };
        assert_eq!(kind, CollectionKind::Map);
        assert_eq!(params.len(), kind.expected_params());
    }
}
