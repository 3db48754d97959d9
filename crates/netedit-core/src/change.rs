use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{ModelError, Result};
use crate::model::{Instance, Link, Model, Node, NodeProps, Region};
use crate::types::{InstanceId, LinkId, NodeId, Rgb};

/// The replacement of one keyed value: `None` means absent.
///
/// Applying a delta requires the model to currently hold `before`; it then
/// holds `after`. The inverse swaps the two.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Delta<K, V> {
    pub key: K,
    pub before: Option<V>,
    pub after: Option<V>,
}

impl<K, V: PartialEq> Delta<K, V> {
    /// Build a delta, or `None` when nothing would change.
    #[must_use]
    pub fn new(key: K, before: Option<V>, after: Option<V>) -> Option<Self> {
        (before != after).then_some(Self { key, before, after })
    }
}

impl<K: Clone, V: Clone> Delta<K, V> {
    #[must_use]
    pub fn inverted(&self) -> Self {
        Self {
            key: self.key.clone(),
            before: self.after.clone(),
            after: self.before.clone(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ChangeKind {
    /// A node, link or instance of the network itself.
    Genome,
    /// Positions, colors and regions.
    Layout,
    /// State shared by the whole model, such as the palette.
    Global,
}

/// The entity a change record mutates.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EntityRef {
    Node(NodeId),
    Link(LinkId),
    Instance(InstanceId),
    NodeProps(NodeId),
    Region(String),
    PaletteEntry(String),
}

impl fmt::Display for EntityRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Node(id) => write!(f, "node '{id}'"),
            Self::Link(id) => write!(f, "link '{id}'"),
            Self::Instance(id) => write!(f, "instance '{id}'"),
            Self::NodeProps(id) => write!(f, "layout of node '{id}'"),
            Self::Region(name) => write!(f, "region '{name}'"),
            Self::PaletteEntry(name) => write!(f, "palette color '{name}'"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum GenomeChange {
    Node(Delta<NodeId, Node>),
    Link(Delta<LinkId, Link>),
    Instance(Delta<InstanceId, Instance>),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum LayoutChange {
    NodeProps(Delta<NodeId, NodeProps>),
    Region(Delta<String, Region>),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum GlobalChange {
    PaletteEntry(Delta<String, Rgb>),
}

/// One reversible mutation of one model entity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ChangeRecord {
    Genome(GenomeChange),
    Layout(LayoutChange),
    Global(GlobalChange),
}

impl ChangeRecord {
    #[must_use]
    pub fn kind(&self) -> ChangeKind {
        match self {
            Self::Genome(_) => ChangeKind::Genome,
            Self::Layout(_) => ChangeKind::Layout,
            Self::Global(_) => ChangeKind::Global,
        }
    }

    #[must_use]
    pub fn entity(&self) -> EntityRef {
        match self {
            Self::Genome(GenomeChange::Node(d)) => EntityRef::Node(d.key.clone()),
            Self::Genome(GenomeChange::Link(d)) => EntityRef::Link(d.key.clone()),
            Self::Genome(GenomeChange::Instance(d)) => EntityRef::Instance(d.key.clone()),
            Self::Layout(LayoutChange::NodeProps(d)) => EntityRef::NodeProps(d.key.clone()),
            Self::Layout(LayoutChange::Region(d)) => EntityRef::Region(d.key.clone()),
            Self::Global(GlobalChange::PaletteEntry(d)) => EntityRef::PaletteEntry(d.key.clone()),
        }
    }

    /// The record that undoes this one.
    #[must_use]
    pub fn inverted(&self) -> Self {
        match self {
            Self::Genome(GenomeChange::Node(d)) => Self::Genome(GenomeChange::Node(d.inverted())),
            Self::Genome(GenomeChange::Link(d)) => Self::Genome(GenomeChange::Link(d.inverted())),
            Self::Genome(GenomeChange::Instance(d)) => {
                Self::Genome(GenomeChange::Instance(d.inverted()))
            }
            Self::Layout(LayoutChange::NodeProps(d)) => {
                Self::Layout(LayoutChange::NodeProps(d.inverted()))
            }
            Self::Layout(LayoutChange::Region(d)) => {
                Self::Layout(LayoutChange::Region(d.inverted()))
            }
            Self::Global(GlobalChange::PaletteEntry(d)) => {
                Self::Global(GlobalChange::PaletteEntry(d.inverted()))
            }
        }
    }

    pub(crate) fn node(delta: Delta<NodeId, Node>) -> Self {
        Self::Genome(GenomeChange::Node(delta))
    }

    pub(crate) fn link(delta: Delta<LinkId, Link>) -> Self {
        Self::Genome(GenomeChange::Link(delta))
    }

    pub(crate) fn instance(delta: Delta<InstanceId, Instance>) -> Self {
        Self::Genome(GenomeChange::Instance(delta))
    }

    pub(crate) fn node_props(delta: Delta<NodeId, NodeProps>) -> Self {
        Self::Layout(LayoutChange::NodeProps(delta))
    }

    pub(crate) fn palette_entry(delta: Delta<String, Rgb>) -> Self {
        Self::Global(GlobalChange::PaletteEntry(delta))
    }
}

fn apply_delta<K: Ord + Clone, V: Clone + PartialEq>(
    map: &mut BTreeMap<K, V>,
    delta: &Delta<K, V>,
    entity: impl FnOnce() -> EntityRef,
) -> Result<()> {
    if map.get(&delta.key) != delta.before.as_ref() {
        return Err(ModelError::StaleChange { entity: entity() });
    }
    match &delta.after {
        Some(value) => {
            map.insert(delta.key.clone(), value.clone());
        }
        None => {
            map.remove(&delta.key);
        }
    }
    Ok(())
}

impl Model {
    /// Apply one change record.
    ///
    /// # Errors
    ///
    /// Returns `ModelError::StaleChange` if the entity does not currently hold
    /// the record's `before` value. The model is left unchanged in that case.
    pub fn apply(&mut self, record: &ChangeRecord) -> Result<()> {
        let entity = || record.entity();
        match record {
            ChangeRecord::Genome(GenomeChange::Node(d)) => apply_delta(&mut self.nodes, d, entity),
            ChangeRecord::Genome(GenomeChange::Link(d)) => apply_delta(&mut self.links, d, entity),
            ChangeRecord::Genome(GenomeChange::Instance(d)) => {
                apply_delta(&mut self.instances, d, entity)
            }
            ChangeRecord::Layout(LayoutChange::NodeProps(d)) => {
                apply_delta(&mut self.node_props, d, entity)
            }
            ChangeRecord::Layout(LayoutChange::Region(d)) => {
                apply_delta(&mut self.regions, d, entity)
            }
            ChangeRecord::Global(GlobalChange::PaletteEntry(d)) => {
                apply_delta(&mut self.palette, d, entity)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::ModelRead;
    use crate::types::NodeType;

    fn gene(id: &str, name: &str) -> Node {
        Node {
            id: NodeId::new(id),
            name: name.to_string(),
            node_type: NodeType::Gene,
        }
    }

    #[test]
    fn delta_without_difference_is_none() {
        let node = gene("a", "A");

        let delta = Delta::new(NodeId::new("a"), Some(node.clone()), Some(node));

        assert!(delta.is_none());
    }

    #[test]
    fn apply_then_inverse_restores_model() -> anyhow::Result<()> {
        let original = Model::new().with_node("a", "A", NodeType::Gene);
        let mut model = original.clone();
        let record = ChangeRecord::node(
            Delta::new(
                NodeId::new("a"),
                Some(gene("a", "A")),
                Some(gene("a", "Renamed")),
            )
            .expect("names differ"),
        );

        model.apply(&record)?;
        assert_eq!(
            model.node(&NodeId::new("a")).map(|n| n.name.as_str()),
            Some("Renamed")
        );

        model.apply(&record.inverted())?;
        assert_eq!(model, original);
        Ok(())
    }

    #[test]
    fn apply_removal_and_reinsertion() -> anyhow::Result<()> {
        let original = Model::new().with_node("a", "A", NodeType::Gene);
        let mut model = original.clone();
        let record = ChangeRecord::node(
            Delta::new(NodeId::new("a"), Some(gene("a", "A")), None).expect("removal"),
        );

        model.apply(&record)?;
        assert!(model.node(&NodeId::new("a")).is_none());

        model.apply(&record.inverted())?;
        assert_eq!(model, original);
        Ok(())
    }

    #[test]
    fn stale_record_is_rejected_without_mutation() {
        let original = Model::new().with_node("a", "Current", NodeType::Gene);
        let mut model = original.clone();
        let record = ChangeRecord::node(
            Delta::new(
                NodeId::new("a"),
                Some(gene("a", "Old")),
                Some(gene("a", "New")),
            )
            .expect("names differ"),
        );

        let err = model.apply(&record).expect_err("stale");

        assert!(matches!(
            err,
            ModelError::StaleChange {
                entity: EntityRef::Node(_)
            }
        ));
        assert_eq!(model, original);
    }

    #[test]
    fn record_reports_kind_and_entity() {
        let record = ChangeRecord::palette_entry(
            Delta::new("red".to_string(), None, Some(Rgb::new(255, 0, 0))).expect("insert"),
        );

        assert_eq!(record.kind(), ChangeKind::Global);
        assert_eq!(record.entity(), EntityRef::PaletteEntry("red".to_string()));
        assert_eq!(record.entity().to_string(), "palette color 'red'");
    }
}
