//! Facet-based cache-key derivation.
//!
//! A facet is a named set of properties that, once bound to concrete values,
//! can serve as (part of) a cache key. One bound record instance is stored
//! under *every* valid combination of its bound facets, so any identifying
//! lookup shape finds the same cached materialization.

use std::fmt::{self, Display};
use thiserror::Error as ThisError;

/// Hard bound on combination input size; subset count is `2^n - 1`.
pub const MAX_COMBINATION_ITEMS: usize = 20;

///
/// FacetError
///

#[derive(Clone, Debug, Eq, PartialEq, ThisError)]
pub enum FacetError {
    #[error("too many facet items for combination: {count} exceeds {MAX_COMBINATION_ITEMS}")]
    TooManyItems { count: usize },
}

///
/// UnboundFacet
///
/// A named property set not yet assigned values. `alone` permits the bound
/// facet as a sole cache key; `combined` permits it jointly with others.
///

#[derive(Clone, Debug, Eq, PartialEq, serde::Serialize)]
pub struct UnboundFacet {
    pub name: String,
    pub properties: Vec<String>,
    pub alone: bool,
    pub combined: bool,
}

impl UnboundFacet {
    #[must_use]
    pub fn new(name: impl Into<String>, properties: Vec<String>) -> Self {
        Self {
            name: name.into(),
            properties,
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

    /// Bind this facet against concrete attribute values. Member values are
    /// joined in property order; a facet with any absent member binds to no
    /// value and is skipped during key enumeration.
    #[must_use]
    pub fn bind_with(&self, lookup: impl Fn(&str) -> Option<String>) -> BoundFacet {
        let mut parts = Vec::with_capacity(self.properties.len());
        for property in &self.properties {
            match lookup(property) {
                Some(value) => parts.push(value),
                None => {
                    return BoundFacet {
                        name: self.name.clone(),
                        value: None,
                        fixed: false,
                        alone: self.alone,
                        combined: self.combined,
                    };
                }
            }
        }

        BoundFacet {
            name: self.name.clone(),
            value: Some(parts.join(":")),
            fixed: false,
            alone: self.alone,
            combined: self.combined,
        }
    }
}

///
/// BoundFacet
///
/// A facet with concrete values substituted. Displays as `name==value`,
/// the form used inside derived cache keys. A `fixed` facet (table
/// identity) is always present and never enters subset enumeration.
///

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct BoundFacet {
    pub name: String,
    pub value: Option<String>,
    pub fixed: bool,
    pub alone: bool,
    pub combined: bool,
}

impl BoundFacet {
    #[must_use]
    pub fn fixed(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: Some(value.into()),
            fixed: true,
            alone: true,
            combined: true,
        }
    }
}

impl Display for BoundFacet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.value {
            Some(value) => write!(f, "{}=={value}", self.name),
            None => write!(f, "{}==", self.name),
        }
    }
}

/// All non-empty subsets of `items`, preserving relative element order.
///
/// Output order across subset sizes is unspecified but deterministic for a
/// fixed input; callers comparing results should compare as sets.
pub fn combinations(items: &[String]) -> Result<Vec<Vec<String>>, FacetError> {
    if items.len() > MAX_COMBINATION_ITEMS {
        return Err(FacetError::TooManyItems { count: items.len() });
    }

    let mut out = Vec::new();
    for k in 1..=items.len() {
        let mut current = Vec::with_capacity(k);
        choose(items, k, 0, &mut current, &mut out);
    }

    Ok(out)
}

// Strictly-increasing index recursion: each level picks one position past
// the previous pick, so relative input order survives into every subset.
fn choose(
    items: &[String],
    k: usize,
    start: usize,
    current: &mut Vec<String>,
    out: &mut Vec<Vec<String>>,
) {
    if current.len() == k {
        out.push(current.clone());
        return;
    }

    for index in start..items.len() {
        current.push(items[index].clone());
        choose(items, k, index + 1, current, out);
        current.pop();
    }
}

/// Enumerate every valid cache-key combination from a bound facet list.
///
/// Fixed facets and facets without a bound value are excluded from the
/// universe. Per remaining facet: a facet that is not `alone` must not
/// become a singleton key, and a facet that is not `combined` must not
/// appear in any multi-element key. Filters are applied incrementally over
/// the whole set, facet by facet; application order does not change the
/// result (the filters commute).
pub fn flatten_facets(facets: &[BoundFacet]) -> Result<Vec<Vec<String>>, FacetError> {
    let bound: Vec<&BoundFacet> = facets
        .iter()
        .filter(|f| !f.fixed && f.value.is_some())
        .collect();

    let universe: Vec<String> = bound.iter().map(ToString::to_string).collect();
    let mut combos = combinations(&universe)?;

    for facet in &bound {
        let display = facet.to_string();

        if !facet.alone {
            combos.retain(|combo| !(combo.len() == 1 && combo[0] == display));
        }
        if !facet.combined {
            combos.retain(|combo| !(combo.len() > 1 && combo.contains(&display)));
        }
    }

    Ok(combos)
}

/// Derive the full cache-key set for one bound instance: one key per valid
/// combination, prefixed with the table identity. This is the exact set
/// under which the instance must be stored and invalidated together on
/// every write.
pub fn flat_keys(table: &str, facets: &[BoundFacet]) -> Result<Vec<String>, FacetError> {
    let combos = flatten_facets(facets)?;

    Ok(combos
        .iter()
        .map(|combo| format!("{table}.[{}]", combo.join(", ")))
        .collect())
}

///
/// TESTS
///
