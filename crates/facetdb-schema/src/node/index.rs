use serde::{Deserialize, Serialize};
use std::fmt::{self, Display};

///
/// IndexSpec
///
/// Declared secondary index on a single property. A unique index doubles as
/// an identity facet for cache-key derivation: `alone` permits the bound
/// value as a sole key, `combined` permits it alongside other facets.
///

#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub struct IndexSpec {
    pub name: String,
    pub unique: bool,
    pub alone: bool,
    pub combined: bool,
}

impl IndexSpec {
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            unique: false,
            alone: true,
            combined: true,
        }
    }

    #[must_use]
    pub fn unique(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            unique: true,
            alone: true,
            combined: true,
        }
    }

    #[must_use]
    pub const fn alone(mut self, alone: bool) -> Self {
        self.alone = alone;
        self
    }

    #[must_use]
    pub const fn combined(mut self, combined: bool) -> Self {
        self.combined = combined;
        self
    }
}

impl Display for IndexSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.unique {
            write!(f, "UNIQUE ({})", self.name)
        } else {
            write!(f, "({})", self.name)
        }
    }
}
