//! Cache-facing half of the unit-of-work boundary.
//!
//! The transactional collaborator drives three flows: read (merge the
//! fresh materialization with any cached one, then re-store under every
//! identifying shape), write (invalidate the old shapes, store the new),
//! and delete (invalidate everything). Commit/abort sequencing itself
//! lives with the caller.

use crate::{
    cache::{CacheSlot, SessionCache},
    error::Error,
    merge,
    record::Record,
};
use std::sync::Arc;

///
/// SessionOps
///

pub struct SessionOps {
    cache: SessionCache,
}

impl SessionOps {
    #[must_use]
    pub const fn new(cache: SessionCache) -> Self {
        Self { cache }
    }

    #[must_use]
    pub const fn cache(&self) -> &SessionCache {
        &self.cache
    }

    /// Record read: probe the cache under every key shape of the freshly
    /// read record, merge a hit with the fresh value, and re-store the
    /// merged record under all shapes.
    pub fn cache_read(&self, fresh: Record) -> Result<Arc<Record>, Error> {
        let keys = fresh.flat_keys()?;

        let cached = keys.iter().find_map(|key| {
            self.cache
                .get(key)
                .and_then(|slot| slot.as_record().cloned())
                .map(Arc::new)
        });

        let fresh = Arc::new(fresh);
        let merged = merge::merge(cached, Some(Arc::clone(&fresh)))?.unwrap_or(fresh);

        for key in &keys {
            self.cache
                .put(key.clone(), CacheSlot::Record((*merged).clone()));
        }

        Ok(merged)
    }

    /// Record write: drop every shape derived from the old attribute
    /// values, then store the new record under all of its shapes.
    pub fn cache_write(&self, old: Option<&Record>, new: &Record) -> Result<(), Error> {
        if let Some(old) = old {
            self.cache.invalidate_all(old.flat_keys()?);
        }

        for key in new.flat_keys()? {
            self.cache.put(key, CacheSlot::Record(new.clone()));
        }

        Ok(())
    }

    /// Record delete: drop every shape for the record's current values.
    pub fn cache_delete(&self, record: &Record) -> Result<(), Error> {
        self.cache.invalidate_all(record.flat_keys()?);

        Ok(())
    }
}

///
/// TESTS
///

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{EntityDescriptor, EntityRegistry};
    use crate::record::AttrValue;
    use facetdb_schema::{
        node::{IndexSpec, PropertySpec, PropertyTag, RecordSpec},
        types::{Primitive, TypeSpec},
    };

    fn widget_descriptor() -> Arc<EntityDescriptor> {
        let registry = EntityRegistry::new();
        registry
            .register(
                RecordSpec::table("demo::Widget")
                    .name("widgets")
                    .property(
                        PropertySpec::new("id", TypeSpec::Primitive(Primitive::Uuid)).partition(0),
                    )
                    .property(
                        PropertySpec::new("serial", TypeSpec::Primitive(Primitive::Text))
                            .tag(PropertyTag::Index(IndexSpec::unique("serial_idx"))),
                    )
                    .property(PropertySpec::new(
                        "price",
                        TypeSpec::Primitive(Primitive::Int64),
                    )),
            )
            .unwrap();

        registry.describe("demo::Widget").unwrap()
    }

    fn widget(id: &str, serial: &str) -> Record {
        Record::new(widget_descriptor())
            .with("id", AttrValue::Text(id.into()))
            .with("serial", AttrValue::Text(serial.into()))
    }

    #[test]
    fn cache_read_stores_under_every_identifying_shape() {
        let ops = SessionOps::new(SessionCache::default());
        let fresh = widget("w1", "s1").with("price", AttrValue::Int(10));

        let keys = fresh.flat_keys().unwrap();
        ops.cache_read(fresh).unwrap();

        // id alone, serial alone, and both combined
        assert_eq!(keys.len(), 3);
        for key in keys {
            assert!(ops.cache().get(&key).is_some(), "missing shape {key}");
        }
    }

    #[test]
    fn cache_read_merges_with_an_existing_hit() {
        let ops = SessionOps::new(SessionCache::default());

        let mut cached = widget("w1", "s1").with("price", AttrValue::Int(10));
        cached.set_write_time("price", 200);
        ops.cache_read(cached).unwrap();

        // A stale read must not clobber the newer cached column.
        let mut stale = widget("w1", "s1").with("price", AttrValue::Int(7));
        stale.set_write_time("price", 100);
        let merged = ops.cache_read(stale).unwrap();

        assert_eq!(merged.get("price"), Some(&AttrValue::Int(10)));
        assert_eq!(merged.write_time_of("price"), Some(200));
    }

    #[test]
    fn cache_write_invalidates_old_shapes_and_stores_new() {
        let ops = SessionOps::new(SessionCache::default());

        let old = widget("w1", "s1");
        ops.cache_write(None, &old).unwrap();

        // Rename the serial: old serial shapes must disappear.
        let new = widget("w1", "s2");
        ops.cache_write(Some(&old), &new).unwrap();

        for key in old.flat_keys().unwrap() {
            if key.contains("serial==s1") {
                assert!(ops.cache().get(&key).is_none(), "stale shape {key}");
            }
        }
        for key in new.flat_keys().unwrap() {
            assert!(ops.cache().get(&key).is_some(), "missing shape {key}");
        }
    }

    #[test]
    fn cache_delete_drops_every_shape() {
        let ops = SessionOps::new(SessionCache::default());
        let record = widget("w1", "s1");

        ops.cache_write(None, &record).unwrap();
        ops.cache_delete(&record).unwrap();

        for key in record.flat_keys().unwrap() {
            assert!(ops.cache().get(&key).is_none());
        }
    }
}
