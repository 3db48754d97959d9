use std::collections::BTreeSet;

use netedit_core::{
    BuildInstruction, ChangeRecord, Delta, GenomeChange, GlobalChange, Instance, InstanceId,
    LayoutChange, Link, LinkId, Model, ModelRead, Node, NodeId, NodeProps, Region, Rgb,
};

/// The committed model overlaid with the records of an open transaction.
///
/// Lets later steps of an operation read the effect of earlier ones before
/// anything is committed.
#[derive(Debug, Clone, Copy)]
pub struct StagedView<'a> {
    model: &'a Model,
    records: &'a [ChangeRecord],
}

impl<'a> StagedView<'a> {
    #[must_use]
    pub fn new(model: &'a Model, records: &'a [ChangeRecord]) -> Self {
        Self { model, records }
    }

    /// A view with nothing staged.
    #[must_use]
    pub fn committed(model: &'a Model) -> Self {
        Self { model, records: &[] }
    }

    #[must_use]
    pub fn staged_len(&self) -> usize {
        self.records.len()
    }
}

/// Latest staged value for `key`: `Some(None)` if staged as removed, `None`
/// if nothing is staged for it.
fn latest<'r, K: PartialEq + 'r, V: 'r>(
    records: &'r [ChangeRecord],
    pick: impl Fn(&'r ChangeRecord) -> Option<&'r Delta<K, V>>,
    key: &K,
) -> Option<Option<&'r V>> {
    records
        .iter()
        .rev()
        .filter_map(pick)
        .find(|d| &d.key == key)
        .map(|d| d.after.as_ref())
}

fn merged_keys<'r, K: Ord + Clone + 'r, V: 'r>(
    base: Vec<K>,
    records: &'r [ChangeRecord],
    pick: impl Fn(&'r ChangeRecord) -> Option<&'r Delta<K, V>>,
) -> Vec<K> {
    let mut keys: BTreeSet<K> = base.into_iter().collect();
    for delta in records.iter().filter_map(pick) {
        if delta.after.is_some() {
            keys.insert(delta.key.clone());
        } else {
            keys.remove(&delta.key);
        }
    }
    keys.into_iter().collect()
}

fn pick_node(record: &ChangeRecord) -> Option<&Delta<NodeId, Node>> {
    match record {
        ChangeRecord::Genome(GenomeChange::Node(d)) => Some(d),
        _ => None,
    }
}

fn pick_link(record: &ChangeRecord) -> Option<&Delta<LinkId, Link>> {
    match record {
        ChangeRecord::Genome(GenomeChange::Link(d)) => Some(d),
        _ => None,
    }
}

fn pick_instance(record: &ChangeRecord) -> Option<&Delta<InstanceId, Instance>> {
    match record {
        ChangeRecord::Genome(GenomeChange::Instance(d)) => Some(d),
        _ => None,
    }
}

fn pick_node_props(record: &ChangeRecord) -> Option<&Delta<NodeId, NodeProps>> {
    match record {
        ChangeRecord::Layout(LayoutChange::NodeProps(d)) => Some(d),
        _ => None,
    }
}

fn pick_region(record: &ChangeRecord) -> Option<&Delta<String, Region>> {
    match record {
        ChangeRecord::Layout(LayoutChange::Region(d)) => Some(d),
        _ => None,
    }
}

fn pick_palette(record: &ChangeRecord) -> Option<&Delta<String, Rgb>> {
    match record {
        ChangeRecord::Global(GlobalChange::PaletteEntry(d)) => Some(d),
        _ => None,
    }
}

impl ModelRead for StagedView<'_> {
    fn node(&self, id: &NodeId) -> Option<&Node> {
        latest(self.records, pick_node, id).unwrap_or_else(|| self.model.node(id))
    }

    fn link(&self, id: &LinkId) -> Option<&Link> {
        latest(self.records, pick_link, id).unwrap_or_else(|| self.model.link(id))
    }

    fn instance(&self, id: &InstanceId) -> Option<&Instance> {
        latest(self.records, pick_instance, id).unwrap_or_else(|| self.model.instance(id))
    }

    fn node_props(&self, id: &NodeId) -> Option<&NodeProps> {
        latest(self.records, pick_node_props, id).unwrap_or_else(|| self.model.node_props(id))
    }

    fn region(&self, name: &str) -> Option<&Region> {
        latest(self.records, pick_region, &name.to_string())
            .unwrap_or_else(|| self.model.region(name))
    }

    fn palette_color(&self, name: &str) -> Option<&Rgb> {
        latest(self.records, pick_palette, &name.to_string())
            .unwrap_or_else(|| self.model.palette_color(name))
    }

    fn node_ids(&self) -> Vec<NodeId> {
        merged_keys(self.model.node_ids(), self.records, pick_node)
    }

    fn link_ids(&self) -> Vec<LinkId> {
        merged_keys(self.model.link_ids(), self.records, pick_link)
    }

    fn instance_ids(&self) -> Vec<InstanceId> {
        merged_keys(self.model.instance_ids(), self.records, pick_instance)
    }

    fn region_names(&self) -> Vec<String> {
        merged_keys(self.model.region_names(), self.records, pick_region)
    }

    fn build_instructions(&self) -> &[BuildInstruction] {
        self.model.build_instructions()
    }
}
