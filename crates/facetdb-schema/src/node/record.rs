use crate::{naming::NamingPolicy, node::PropertySpec};
use derive_more::{Display, FromStr};
use serde::{Deserialize, Serialize};

///
/// RecordKind
///
/// How a described record projects into the store: a top-level table, a
/// nested user-defined type, or a positional tuple type.
///

#[derive(
    Clone, Copy, Debug, Default, Deserialize, Display, Eq, FromStr, PartialEq, Serialize,
)]
pub enum RecordKind {
    #[default]
    Table,
    Tuple,
    Udt,
}

///
/// RecordSpec
///
/// Declarative description of one record type: its registry path, optional
/// explicit store name, kind, and property declarations.
///

#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
pub struct RecordSpec {
    /// Registry identity; stable across renames of the store name.
    pub path: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    pub kind: RecordKind,

    pub properties: Vec<PropertySpec>,
}

impl RecordSpec {
    #[must_use]
    pub fn new(path: impl Into<String>, kind: RecordKind) -> Self {
        Self {
            path: path.into(),
            name: None,
            kind,
            properties: Vec::new(),
        }
    }

    #[must_use]
    pub fn table(path: impl Into<String>) -> Self {
        Self::new(path, RecordKind::Table)
    }

    #[must_use]
    pub fn udt(path: impl Into<String>) -> Self {
        Self::new(path, RecordKind::Udt)
    }

    #[must_use]
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    #[must_use]
    pub fn property(mut self, property: PropertySpec) -> Self {
        self.properties.push(property);
        self
    }

    /// Resolve the store-facing name: the explicit name if tagged, otherwise
    /// the last path segment run through the naming policy.
    #[must_use]
    pub fn resolved_name(&self, policy: NamingPolicy) -> String {
        self.name.clone().unwrap_or_else(|| {
            let ident = self.path.rsplit("::").next().unwrap_or(&self.path);
            policy.column_name(ident)
        })
    }
}

///
/// TESTS
///
