//! Descriptor construction: the mapping algorithm from declarative specs to
//! runtime descriptors. Runs entirely inside the registry's guard.

use crate::{
    facet::UnboundFacet,
    model::{
        descriptor::{ColumnKind, DataType, EntityDescriptor, PropertyDescriptor},
        error::MappingError,
        registry::{Inner, PropertyFilter},
    },
};
use facetdb_schema::{
    naming::NamingPolicy,
    node::{PropertySpec, PropertyTag, RecordKind, RecordSpec, SortOrder},
    types::{CollectionKind, TypeSpec},
};
use std::{collections::HashSet, sync::Arc};

pub(super) fn describe(
    inner: &mut Inner,
    naming: NamingPolicy,
    filter: PropertyFilter,
    path: &str,
) -> Result<Arc<EntityDescriptor>, MappingError> {
    if let Some(built) = inner.built.get(path) {
        return Ok(Arc::clone(built));
    }

    // A path seen again before its build finished is a cycle.
    if !inner.resolving.insert(path.to_string()) {
        return Err(MappingError::CyclicRecordReference { path: path.into() });
    }

    let spec = inner
        .specs
        .get(path)
        .cloned()
        .ok_or_else(|| MappingError::UnknownRecord { path: path.into() })?;

    let descriptor = Arc::new(build_descriptor(inner, naming, filter, &spec)?);

    inner.resolving.remove(path);
    inner
        .built
        .insert(path.to_string(), Arc::clone(&descriptor));

    Ok(descriptor)
}

fn build_descriptor(
    inner: &mut Inner,
    naming: NamingPolicy,
    filter: PropertyFilter,
    spec: &RecordSpec,
) -> Result<EntityDescriptor, MappingError> {
    let mut properties = Vec::new();
    let mut static_ordinal = 0u32;
    let mut column_ordinal = 0u32;

    for prop in spec.properties.iter().filter(|p| filter(p)) {
        let (kind, ordinal, order) =
            resolve_kind(spec, prop, &mut static_ordinal, &mut column_ordinal)?;

        let column = prop
            .column
            .clone()
            .unwrap_or_else(|| naming.column_name(&prop.ident));

        let data_type = resolve_type(inner, naming, filter, spec, prop, &prop.ty)?;

        properties.push(PropertyDescriptor {
            ident: prop.ident.clone(),
            column,
            kind,
            ordinal,
            order,
            data_type,
            index: prop.index().cloned(),
        });
    }

    validate_ordinals(spec, &properties)?;

    if spec.kind == RecordKind::Table
        && !properties.iter().any(|p| p.kind == ColumnKind::PartitionKey)
    {
        return Err(MappingError::MissingPartitionKey {
            path: spec.path.clone(),
        });
    }

    properties.sort_by_key(|p| (p.kind.rank(), p.ordinal));

    let facets = derive_facets(&properties);

    Ok(EntityDescriptor {
        path: spec.path.clone(),
        name: spec.resolved_name(naming),
        kind: spec.kind,
        properties,
        facets,
    })
}

// Kind tags are checked in priority order: partition, clustering, static,
// explicit column. More than one kind tag on a property is a conflict.
fn resolve_kind(
    spec: &RecordSpec,
    prop: &PropertySpec,
    static_ordinal: &mut u32,
    column_ordinal: &mut u32,
) -> Result<(ColumnKind, u32, SortOrder), MappingError> {
    let kind_tags = prop
        .tags
        .iter()
        .filter(|tag| {
            matches!(
                tag,
                PropertyTag::Partition { .. }
                    | PropertyTag::Clustering { .. }
                    | PropertyTag::Static
                    | PropertyTag::Column { .. }
            )
        })
        .count();
    if kind_tags > 1 {
        return Err(MappingError::ConflictingKinds {
            path: spec.path.clone(),
            property: prop.ident.clone(),
        });
    }

    for tag in &prop.tags {
        match tag {
            PropertyTag::Partition { ordinal } => {
                return Ok((ColumnKind::PartitionKey, *ordinal, SortOrder::Asc));
            }
            PropertyTag::Clustering { ordinal, order } => {
                return Ok((ColumnKind::ClusteringColumn, *ordinal, *order));
            }
            PropertyTag::Static => {
                let ordinal = *static_ordinal;
                *static_ordinal += 1;
                return Ok((ColumnKind::StaticColumn, ordinal, SortOrder::Asc));
            }
            PropertyTag::Column { ordinal } => {
                *column_ordinal = (*column_ordinal).max(ordinal + 1);
                return Ok((ColumnKind::Column, *ordinal, SortOrder::Asc));
            }
            PropertyTag::Index(_) | PropertyTag::Transient => {}
        }
    }

    let ordinal = *column_ordinal;
    *column_ordinal += 1;

    Ok((ColumnKind::Column, ordinal, SortOrder::Asc))
}

fn resolve_type(
    inner: &mut Inner,
    naming: NamingPolicy,
    filter: PropertyFilter,
    spec: &RecordSpec,
    prop: &PropertySpec,
    ty: &TypeSpec,
) -> Result<DataType, MappingError> {
    match ty {
        TypeSpec::Primitive(primitive) => Ok(DataType::Scalar(primitive.store_type())),

        TypeSpec::Collection { kind, params } => {
            let expected = kind.expected_params();
            if params.len() != expected {
                return Err(MappingError::TypeParamArity {
                    path: spec.path.clone(),
                    property: prop.ident.clone(),
                    kind: *kind,
                    expected,
                    found: params.len(),
                });
            }

            let mut resolved = params
                .iter()
                .map(|param| resolve_type(inner, naming, filter, spec, prop, param))
                .collect::<Result<Vec<_>, _>>()?;

            Ok(match kind {
                CollectionKind::List => DataType::List(Box::new(resolved.remove(0))),
                CollectionKind::Set => DataType::Set(Box::new(resolved.remove(0))),
                CollectionKind::Map => {
                    let key = resolved.remove(0);
                    let value = resolved.remove(0);
                    DataType::Map(Box::new(key), Box::new(value))
                }
            })
        }

        // Nested described records resolve through the same registry pass
        // and are stored frozen.
        TypeSpec::Record(path) => {
            let descriptor = describe(inner, naming, filter, path)?;

            Ok(DataType::Record {
                name: descriptor.name.clone(),
                frozen: true,
                descriptor,
            })
        }

        TypeSpec::Tuple(elements) => {
            let resolved = elements
                .iter()
                .map(|element| resolve_type(inner, naming, filter, spec, prop, element))
                .collect::<Result<Vec<_>, _>>()?;

            Ok(DataType::Tuple(resolved))
        }
    }
}

fn validate_ordinals(
    spec: &RecordSpec,
    properties: &[PropertyDescriptor],
) -> Result<(), MappingError> {
    for kind in [ColumnKind::PartitionKey, ColumnKind::ClusteringColumn] {
        let mut seen = HashSet::new();
        for prop in properties.iter().filter(|p| p.kind == kind) {
            if !seen.insert(prop.ordinal) {
                return Err(MappingError::DuplicateOrdinal {
                    path: spec.path.clone(),
                    kind,
                    ordinal: prop.ordinal,
                });
            }
        }
    }

    // Tuple records are positional: ordinals must run 0..n without gaps.
    if spec.kind == RecordKind::Tuple {
        let mut ordinals: Vec<u32> = properties.iter().map(|p| p.ordinal).collect();
        ordinals.sort_unstable();

        for (position, ordinal) in ordinals.iter().enumerate() {
            let expected = u32::try_from(position).unwrap_or(u32::MAX);
            if *ordinal != expected {
                return Err(MappingError::NonContiguousOrdinals {
                    path: spec.path.clone(),
                    expected,
                    found: *ordinal,
                });
            }
        }
    }

    Ok(())
}

// Identity facets: all key columns fold into one compound facet; each
// unique index contributes its own, carrying the declared alone/combined
// flags.
fn derive_facets(properties: &[PropertyDescriptor]) -> Vec<UnboundFacet> {
    let mut facets = Vec::new();

    let keys: Vec<&PropertyDescriptor> =
        properties.iter().filter(|p| p.kind.is_key()).collect();
    if !keys.is_empty() {
        let name = keys
            .iter()
            .map(|p| p.column.as_str())
            .collect::<Vec<_>>()
            .join("+");
        let members = keys.iter().map(|p| p.column.clone()).collect();
        facets.push(UnboundFacet::new(name, members));
    }

    for prop in properties {
        if let Some(index) = &prop.index
            && index.unique
        {
            facets.push(
                UnboundFacet::new(prop.column.clone(), vec![prop.column.clone()])
                    .alone(index.alone)
                    .combined(index.combined),
            );
        }
    }

    facets
}

///
/// TESTS
///
