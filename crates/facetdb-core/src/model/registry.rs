use crate::model::{build, descriptor::EntityDescriptor, error::MappingError};
use facetdb_schema::{
    naming::NamingPolicy,
    node::{PropertySpec, RecordSpec},
};
use std::{
    collections::{HashMap, HashSet},
    sync::{Arc, Mutex, MutexGuard},
};

///
/// PropertyFilter
///
/// Pluggable "is this declaration a mapped property" predicate. The default
/// admits everything not tagged transient.
///

pub type PropertyFilter = fn(&PropertySpec) -> bool;

fn mapped_properties(spec: &PropertySpec) -> bool {
    !spec.is_transient()
}

///
/// EntityRegistry
///
/// Explicit home for record specs and their memoized descriptors. Building
/// is lazy, at-most-once per record path, and guarded by a single mutex so
/// concurrent first callers observe one construction. Nested record
/// resolution recurses inside the held guard; an in-progress marker set
/// turns cyclic record graphs into a mapping error instead of unbounded
/// recursion.
///

pub struct EntityRegistry {
    naming: NamingPolicy,
    filter: PropertyFilter,
    inner: Mutex<Inner>,
}

#[derive(Default)]
pub(super) struct Inner {
    pub(super) specs: HashMap<String, RecordSpec>,
    pub(super) built: HashMap<String, Arc<EntityDescriptor>>,
    pub(super) resolving: HashSet<String>,
}

impl Default for EntityRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl EntityRegistry {
    #[must_use]
    pub fn new() -> Self {
        Self::with_naming(NamingPolicy::default())
    }

    #[must_use]
    pub fn with_naming(naming: NamingPolicy) -> Self {
        Self {
            naming,
            filter: mapped_properties,
            inner: Mutex::new(Inner::default()),
        }
    }

    #[must_use]
    pub fn with_filter(mut self, filter: PropertyFilter) -> Self {
        self.filter = filter;
        self
    }

    #[must_use]
    pub const fn naming(&self) -> NamingPolicy {
        self.naming
    }

    /// Register a record spec under its path.
    pub fn register(&self, spec: RecordSpec) -> Result<(), MappingError> {
        let mut inner = self.lock();

        if inner.specs.contains_key(&spec.path) {
            return Err(MappingError::DuplicateRecord { path: spec.path });
        }
        inner.specs.insert(spec.path.clone(), spec);

        Ok(())
    }

    /// Build, or fetch the memoized, descriptor for a registered record.
    /// Idempotent: repeated calls return the same `Arc`.
    pub fn describe(&self, path: &str) -> Result<Arc<EntityDescriptor>, MappingError> {
        let mut inner = self.lock();
        let result = build::describe(&mut inner, self.naming, self.filter, path);

        // A failed build must not leave in-progress markers behind.
        inner.resolving.clear();

        result
    }

    /// Number of descriptors built so far (diagnostics only).
    #[must_use]
    pub fn built_count(&self) -> usize {
        self.lock().built.len()
    }

    fn lock(&self) -> MutexGuard<'_, Inner> {
        self.inner.lock().expect("entity registry mutex poisoned")
    }
}

///
/// TESTS
///

#[cfg(test)]
mod tests {
    use super::*;
    use facetdb_schema::{node::PropertySpec, types::{Primitive, TypeSpec}};

    fn widget_spec() -> RecordSpec {
        RecordSpec::table("demo::Widget")
            .property(
                PropertySpec::new("id", TypeSpec::Primitive(Primitive::Uuid)).partition(0),
            )
            .property(PropertySpec::new("label", TypeSpec::Primitive(Primitive::Text)))
    }

    #[test]
    fn register_rejects_duplicate_paths() {
        let registry = EntityRegistry::new();
        registry.register(widget_spec()).unwrap();

        let err = registry.register(widget_spec()).unwrap_err();
        assert_eq!(
            err,
            MappingError::DuplicateRecord {
                path: "demo::Widget".into()
            }
        );
    }

    #[test]
    fn describe_is_memoized_per_path() {
        let registry = EntityRegistry::new();
        registry.register(widget_spec()).unwrap();

        let first = registry.describe("demo::Widget").unwrap();
        let second = registry.describe("demo::Widget").unwrap();
        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(registry.built_count(), 1);
    }

    #[test]
    fn describe_unknown_record_fails() {
        let registry = EntityRegistry::new();
        let err = registry.describe("demo::Missing").unwrap_err();
        assert_eq!(
            err,
            MappingError::UnknownRecord {
                path: "demo::Missing".into()
            }
        );
    }

    #[test]
    fn failed_build_leaves_registry_usable() {
        let registry = EntityRegistry::new();
        registry
            .register(
                RecordSpec::udt("demo::Node").property(PropertySpec::new(
                    "next",
                    TypeSpec::Record("demo::Node".into()),
                )),
            )
            .unwrap();
        registry.register(widget_spec()).unwrap();

        assert!(matches!(
            registry.describe("demo::Node").unwrap_err(),
            MappingError::CyclicRecordReference { .. }
        ));

        // The cycle above must not poison unrelated resolution.
        registry.describe("demo::Widget").unwrap();
    }
}
