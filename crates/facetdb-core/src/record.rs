//! Materialized records at the store-I/O boundary: plain attribute maps
//! keyed by column name, with per-column write-time/TTL metadata traveling
//! under reserved keys inside the same map.

use crate::{
    facet::{BoundFacet, FacetError},
    model::EntityDescriptor,
};
use serde::{Deserialize, Serialize};
use std::{
    collections::BTreeMap,
    fmt::{self, Display},
    sync::Arc,
};

///
/// AttrValue
///
/// The value vocabulary crossing the store-I/O boundary. Maps are
/// normalized as pair lists; nested records are attribute maps themselves.
/// `Display` renders the facet-binding form.
///

#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
#[remain::sorted]
pub enum AttrValue {
    Blob(Vec<u8>),
    Bool(bool),
    Float(f64),
    Int(i64),
    List(Vec<AttrValue>),
    Map(Vec<(AttrValue, AttrValue)>),
    Record(BTreeMap<String, AttrValue>),
    Set(Vec<AttrValue>),
    Text(String),
    Timestamp(u64),
    Uint(u64),
}

impl Display for AttrValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Blob(bytes) => write!(f, "0x{}", hex(bytes)),
            Self::Bool(value) => write!(f, "{value}"),
            Self::Float(value) => write!(f, "{value}"),
            Self::Int(value) => write!(f, "{value}"),
            Self::List(items) | Self::Set(items) => {
                let parts: Vec<String> = items.iter().map(ToString::to_string).collect();
                write!(f, "[{}]", parts.join(", "))
            }
            Self::Map(pairs) => {
                let parts: Vec<String> = pairs
                    .iter()
                    .map(|(key, value)| format!("{key}: {value}"))
                    .collect();
                write!(f, "{{{}}}", parts.join(", "))
            }
            Self::Record(attrs) => {
                let parts: Vec<String> = attrs
                    .iter()
                    .map(|(column, value)| format!("{column}: {value}"))
                    .collect();
                write!(f, "{{{}}}", parts.join(", "))
            }
            Self::Text(value) => write!(f, "{value}"),
            Self::Timestamp(value) | Self::Uint(value) => write!(f, "{value}"),
        }
    }
}

fn hex(bytes: &[u8]) -> String {
    bytes.iter().map(|b| format!("{b:02x}")).collect()
}

/// Reserved attribute key carrying a column's last write time (microseconds).
#[must_use]
pub fn write_time_key(column: &str) -> String {
    format!("_{column}_writeTime")
}

/// Reserved attribute key carrying a column's remaining TTL (seconds).
#[must_use]
pub fn ttl_key(column: &str) -> String {
    format!("_{column}_ttl")
}

///
/// Record
///
/// One materialized instance: its descriptor plus the attribute map. The
/// cache and merge engines operate on this shape only; they never see the
/// store or the wire.
///

#[derive(Clone, Debug, PartialEq)]
pub struct Record {
    descriptor: Arc<EntityDescriptor>,
    attrs: BTreeMap<String, AttrValue>,
}

impl Record {
    #[must_use]
    pub const fn new(descriptor: Arc<EntityDescriptor>) -> Self {
        Self {
            descriptor,
            attrs: BTreeMap::new(),
        }
    }

    #[must_use]
    pub const fn descriptor(&self) -> &Arc<EntityDescriptor> {
        &self.descriptor
    }

    #[must_use]
    pub const fn attrs(&self) -> &BTreeMap<String, AttrValue> {
        &self.attrs
    }

    #[must_use]
    pub fn get(&self, column: &str) -> Option<&AttrValue> {
        self.attrs.get(column)
    }

    pub fn set(&mut self, column: impl Into<String>, value: AttrValue) -> Option<AttrValue> {
        self.attrs.insert(column.into(), value)
    }

    /// Builder-style attribute assignment for construction sites.
    #[must_use]
    pub fn with(mut self, column: impl Into<String>, value: AttrValue) -> Self {
        self.attrs.insert(column.into(), value);
        self
    }

    pub fn unset(&mut self, column: &str) -> Option<AttrValue> {
        self.attrs.remove(column)
    }

    #[must_use]
    pub fn write_time_of(&self, column: &str) -> Option<u64> {
        match self.attrs.get(&write_time_key(column)) {
            Some(AttrValue::Uint(value) | AttrValue::Timestamp(value)) => Some(*value),
            _ => None,
        }
    }

    pub fn set_write_time(&mut self, column: &str, micros: u64) {
        self.attrs
            .insert(write_time_key(column), AttrValue::Uint(micros));
    }

    pub fn clear_write_time(&mut self, column: &str) {
        self.attrs.remove(&write_time_key(column));
    }

    #[must_use]
    pub fn ttl_of(&self, column: &str) -> Option<u64> {
        match self.attrs.get(&ttl_key(column)) {
            Some(AttrValue::Uint(value) | AttrValue::Timestamp(value)) => Some(*value),
            _ => None,
        }
    }

    pub fn set_ttl(&mut self, column: &str, seconds: u64) {
        self.attrs.insert(ttl_key(column), AttrValue::Uint(seconds));
    }

    pub fn clear_ttl(&mut self, column: &str) {
        self.attrs.remove(&ttl_key(column));
    }

    /// Bind every derived facet of this record's entity against the current
    /// attribute values, prefixed by the fixed table-identity facet.
    #[must_use]
    pub fn bound_facets(&self) -> Vec<BoundFacet> {
        let mut bound = Vec::with_capacity(self.descriptor.facets.len() + 1);
        bound.push(BoundFacet::fixed("table", self.descriptor.name.clone()));

        for facet in &self.descriptor.facets {
            bound.push(facet.bind_with(|column| self.get(column).map(ToString::to_string)));
        }

        bound
    }

    /// The full cache-key set for this record's current attribute values.
    pub fn flat_keys(&self) -> Result<Vec<String>, FacetError> {
        crate::facet::flat_keys(&self.descriptor.name, &self.bound_facets())
    }
}

impl Display for Record {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let parts: Vec<String> = self
            .attrs
            .iter()
            .map(|(column, value)| format!("{column}={value}"))
            .collect();
        write!(f, "{}{{{}}}", self.descriptor.name, parts.join(", "))
    }
}

///
/// TESTS
///
