//! Property-path capture.
//!
//! A path identifies a (possibly nested or collection-indexed) property
//! reachable from a root entity, without string keys assembled at call
//! sites. The builder walks descriptors step by step: stepping into a
//! nested record continues from that record's descriptor, stepping into a
//! collection permits exactly one element access, and anything else is
//! sealed. Nodes chain leaf-to-root; the textual key form reads
//! root-to-leaf.

use crate::model::{DataType, EntityDescriptor, MappingError};
use std::{fmt, sync::Arc};
use thiserror::Error as ThisError;

///
/// PathError
///
/// Misuse of the path builder. Always a programming error, never retried.
///

#[derive(Clone, Debug, Eq, PartialEq, ThisError)]
pub enum PathError {
    #[error("collection property '{column}' supports a single element access only")]
    ExpectedElementAccess { column: String },

    #[error("no property selected: call get() before sealing the path")]
    EmptyPath,

    #[error("property '{column}' is not a collection; element access is invalid")]
    NotACollection { column: String },

    #[error("property '{column}' is a leaf; further navigation is invalid")]
    NotANestedRecord { column: String },

    #[error(transparent)]
    Mapping(#[from] MappingError),
}

///
/// PropertyPathNode
///
/// One resolved step: a property (or synthetic element name) plus the link
/// to its enclosing property. Iteration order is leaf-to-root.
///

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct PropertyPathNode {
    name: String,
    parent: Option<Arc<PropertyPathNode>>,
}

impl PropertyPathNode {
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub const fn parent(&self) -> Option<&Arc<PropertyPathNode>> {
        self.parent.as_ref()
    }

    /// Leaf-to-root iteration over property names.
    pub fn iter(&self) -> PathIter<'_> {
        PathIter {
            current: Some(self),
        }
    }

    /// Dotted root-to-leaf textual form, the order cache keys are built in.
    #[must_use]
    pub fn render(&self) -> String {
        let mut names: Vec<&str> = self.iter().map(PropertyPathNode::name).collect();
        names.reverse();
        names.join(".")
    }
}

impl fmt::Display for PropertyPathNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.render())
    }
}

///
/// PathIter
///

pub struct PathIter<'a> {
    current: Option<&'a PropertyPathNode>,
}

impl<'a> Iterator for PathIter<'a> {
    type Item = &'a PropertyPathNode;

    fn next(&mut self) -> Option<Self::Item> {
        let node = self.current?;
        self.current = node.parent.as_deref();
        Some(node)
    }
}

// What the builder may do next, driven by the last property's data type.
#[derive(Debug)]
enum Cursor {
    Entity(Arc<EntityDescriptor>),
    Collection { column: String },
    Leaf,
}

///
/// PathBuilder
///
/// Type-driven path composition. Each `get` consumes the builder and
/// returns the advanced one, so invalid continuations fail at the exact
/// step that misused them.
///

#[derive(Debug)]
pub struct PathBuilder {
    cursor: Cursor,
    node: Option<Arc<PropertyPathNode>>,
}

impl PathBuilder {
    /// Start a path at an entity's root.
    #[must_use]
    pub fn root(descriptor: &Arc<EntityDescriptor>) -> Self {
        Self {
            cursor: Cursor::Entity(Arc::clone(descriptor)),
            node: None,
        }
    }

    /// Step into a property by declared ident.
    pub fn get(self, ident: &str) -> Result<Self, PathError> {
        let descriptor = match &self.cursor {
            Cursor::Entity(descriptor) => Arc::clone(descriptor),
            Cursor::Collection { column } => {
                return Err(PathError::ExpectedElementAccess {
                    column: column.clone(),
                });
            }
            Cursor::Leaf => {
                return Err(PathError::NotANestedRecord {
                    column: self
                        .node
                        .as_ref()
                        .map_or_else(String::new, |n| n.name.clone()),
                });
            }
        };

        let property =
            descriptor
                .property(ident)
                .ok_or_else(|| MappingError::UnknownProperty {
                    path: descriptor.path.clone(),
                    property: ident.to_string(),
                })?;

        let node = Arc::new(PropertyPathNode {
            name: property.column.clone(),
            parent: self.node,
        });

        let cursor = match &property.data_type {
            DataType::Record { descriptor, .. } => Cursor::Entity(Arc::clone(descriptor)),
            data_type if data_type.is_collection() => Cursor::Collection {
                column: property.column.clone(),
            },
            _ => Cursor::Leaf,
        };

        Ok(Self {
            cursor,
            node: Some(node),
        })
    }

    /// Element access by map key: appends a synthetic named property.
    pub fn key(self, key: &str) -> Result<Self, PathError> {
        self.element(key.to_string())
    }

    /// Element access by list index: appends a synthetic named property.
    pub fn index(self, index: usize) -> Result<Self, PathError> {
        self.element(index.to_string())
    }

    /// Seal the path into its node chain.
    pub fn node(self) -> Result<Arc<PropertyPathNode>, PathError> {
        self.node.ok_or(PathError::EmptyPath)
    }

    fn element(self, name: String) -> Result<Self, PathError> {
        match &self.cursor {
            Cursor::Collection { .. } => {}
            Cursor::Entity(_) | Cursor::Leaf => {
                return Err(PathError::NotACollection {
                    column: self
                        .node
                        .as_ref()
                        .map_or_else(String::new, |n| n.name.clone()),
                });
            }
        }

        let node = Arc::new(PropertyPathNode {
            name,
            parent: self.node,
        });

        Ok(Self {
            cursor: Cursor::Leaf,
            node: Some(node),
        })
    }
}

///
/// TESTS
///

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::EntityRegistry;
    use facetdb_schema::{
        node::{PropertySpec, RecordSpec},
        types::{Primitive, TypeSpec},
    };

    fn person_descriptor() -> Arc<EntityDescriptor> {
        let registry = EntityRegistry::new();
        registry
            .register(
                RecordSpec::udt("demo::Address")
                    .property(PropertySpec::new(
                        "street",
                        TypeSpec::Primitive(Primitive::Text),
                    ))
                    .property(PropertySpec::new(
                        "geo",
                        TypeSpec::Record("demo::Geo".into()),
                    )),
            )
            .unwrap();
        registry
            .register(
                RecordSpec::udt("demo::Geo")
                    .property(PropertySpec::new("lat", TypeSpec::Primitive(Primitive::Float64)))
                    .property(PropertySpec::new("lon", TypeSpec::Primitive(Primitive::Float64))),
            )
            .unwrap();
        registry
            .register(
                RecordSpec::table("demo::Person")
                    .property(
                        PropertySpec::new("id", TypeSpec::Primitive(Primitive::Uuid)).partition(0),
                    )
                    .property(PropertySpec::new(
                        "homeAddress",
                        TypeSpec::Record("demo::Address".into()),
                    ))
                    .property(PropertySpec::new(
                        "attrs",
                        TypeSpec::map(
                            TypeSpec::Primitive(Primitive::Text),
                            TypeSpec::Primitive(Primitive::Text),
                        ),
                    ))
                    .property(PropertySpec::new(
                        "tags",
                        TypeSpec::list(TypeSpec::Primitive(Primitive::Text)),
                    )),
            )
            .unwrap();

        registry.describe("demo::Person").unwrap()
    }

    #[test]
    fn two_level_nested_path_renders_root_to_leaf() {
        let person = person_descriptor();
        let node = PathBuilder::root(&person)
            .get("homeAddress")
            .unwrap()
            .get("street")
            .unwrap()
            .node()
            .unwrap();

        assert_eq!(node.render(), "home_address.street");

        // Node chain iterates leaf-to-root.
        let names: Vec<&str> = node.iter().map(PropertyPathNode::name).collect();
        assert_eq!(names, vec!["street", "home_address"]);
    }

    #[test]
    fn three_level_chain_composes_through_nested_descriptors() {
        let person = person_descriptor();
        let node = PathBuilder::root(&person)
            .get("homeAddress")
            .unwrap()
            .get("geo")
            .unwrap()
            .get("lat")
            .unwrap()
            .node()
            .unwrap();

        assert_eq!(node.render(), "home_address.geo.lat");
    }

    #[test]
    fn map_key_access_appends_a_synthetic_property() {
        let person = person_descriptor();
        let node = PathBuilder::root(&person)
            .get("attrs")
            .unwrap()
            .key("color")
            .unwrap()
            .node()
            .unwrap();

        assert_eq!(node.render(), "attrs.color");
    }

    #[test]
    fn list_index_access_appends_a_synthetic_property() {
        let person = person_descriptor();
        let node = PathBuilder::root(&person)
            .get("tags")
            .unwrap()
            .index(3)
            .unwrap()
            .node()
            .unwrap();

        assert_eq!(node.render(), "tags.3");
    }

    #[test]
    fn collection_stand_in_rejects_everything_but_element_access() {
        let person = person_descriptor();
        let err = PathBuilder::root(&person)
            .get("attrs")
            .unwrap()
            .get("color")
            .unwrap_err();

        assert_eq!(
            err,
            PathError::ExpectedElementAccess {
                column: "attrs".into()
            }
        );
    }

    #[test]
    fn element_access_is_single_shot() {
        let person = person_descriptor();
        let err = PathBuilder::root(&person)
            .get("tags")
            .unwrap()
            .index(0)
            .unwrap()
            .index(1)
            .unwrap_err();

        assert_eq!(err, PathError::NotACollection { column: "0".into() });
    }

    #[test]
    fn leaf_properties_cannot_be_navigated() {
        let person = person_descriptor();
        let err = PathBuilder::root(&person)
            .get("id")
            .unwrap()
            .get("anything")
            .unwrap_err();

        assert_eq!(err, PathError::NotANestedRecord { column: "id".into() });
    }

    #[test]
    fn unknown_property_is_a_mapping_error() {
        let person = person_descriptor();
        let err = PathBuilder::root(&person).get("nope").unwrap_err();

        assert_eq!(
            err,
            PathError::Mapping(MappingError::UnknownProperty {
                path: "demo::Person".into(),
                property: "nope".into(),
            })
        );
    }

    #[test]
    fn sealing_an_empty_path_fails() {
        let person = person_descriptor();
        assert_eq!(
            PathBuilder::root(&person).node().unwrap_err(),
            PathError::EmptyPath
        );
    }
}
