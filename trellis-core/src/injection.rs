//! Injection marker: fields declared for automatic wiring.
//!
//! Each marked field becomes an [`InjectionEdge`] from the owning type to
//! the field's declared type. The declared type is supplied by the caller
//! as a [`TypeKey`], so no runtime reflection is involved. Marking the
//! same field again replaces its edge.

use crate::logging::{debug, trace};
use crate::{MetadataKey, MetadataStore, Subject, TypeKey};
use serde::Serialize;
use std::collections::BTreeMap;

/// A declared field-to-type dependency
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize)]
pub struct InjectionEdge {
    pub owner: TypeKey,
    pub field: String,
    pub declared: TypeKey,
}

/// Declared dependencies of one type, keyed by field name
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct InjectionEdges {
    fields: BTreeMap<String, TypeKey>,
}

impl InjectionEdges {
    pub fn new() -> Self {
        Self::default()
    }

    /// Declared type of a field
    pub fn get(&self, field: &str) -> Option<TypeKey> {
        self.fields.get(field).copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, TypeKey)> {
        self.fields.iter().map(|(field, declared)| (field.as_str(), *declared))
    }

    /// Edges with their owner attached
    pub fn edges(&self, owner: TypeKey) -> Vec<InjectionEdge> {
        self.iter()
            .map(|(field, declared)| InjectionEdge {
                owner,
                field: field.to_string(),
                declared,
            })
            .collect()
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    fn insert(&mut self, field: String, declared: TypeKey) -> Option<TypeKey> {
        self.fields.insert(field, declared)
    }
}

/// Mark `field` of `owner` for wiring with a value of type `declared`
pub fn mark_field(store: &MetadataStore, owner: TypeKey, field: &str, declared: TypeKey) {
    let previous = store.update(
        Subject::Type(owner),
        MetadataKey::Injections,
        InjectionEdges::new,
        |edges: &mut InjectionEdges| edges.insert(field.to_string(), declared),
    );

    match previous {
        Some(old) if old != declared => debug!(
            owner = %owner,
            field,
            previous = %old,
            declared = %declared,
            "Injection field re-marked with a new type"
        ),
        _ => trace!(owner = %owner, field, declared = %declared, "Injection field marked"),
    }
}

/// Everything marked on `owner` so far
pub fn scan_injections(store: &MetadataStore, owner: TypeKey) -> InjectionEdges {
    store
        .get::<InjectionEdges>(&Subject::Type(owner), &MetadataKey::Injections)
        .unwrap_or_default()
}

/// A component seen by the injection scan
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct DependencyNode {
    pub component: TypeKey,
    /// Declared edges as of the latest scan
    pub edges: InjectionEdges,
    /// How many times registration scanned this component
    pub scans: usize,
}

/// Dependency graph description consumed by an external container
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct DependencyGraph {
    nodes: Vec<DependencyNode>,
}

impl DependencyGraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a scan of `component`, refreshing its edges
    pub fn record_scan(&mut self, component: TypeKey, edges: InjectionEdges) {
        match self.nodes.iter_mut().find(|node| node.component == component) {
            Some(node) => {
                node.edges = edges;
                node.scans += 1;
            }
            None => self.nodes.push(DependencyNode {
                component,
                edges,
                scans: 1,
            }),
        }
    }

    pub fn node(&self, component: TypeKey) -> Option<&DependencyNode> {
        self.nodes.iter().find(|node| node.component == component)
    }

    /// Nodes in first-scan order
    pub fn nodes(&self) -> &[DependencyNode] {
        &self.nodes
    }

    pub fn edges(&self) -> Vec<InjectionEdge> {
        self.nodes
            .iter()
            .flat_map(|node| node.edges.edges(node.component))
            .collect()
    }

    pub fn scans(&self, component: TypeKey) -> usize {
        self.node(component).map_or(0, |node| node.scans)
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }
}
