use std::collections::{BTreeMap, VecDeque};

use indexmap::IndexSet;
use serde::{Deserialize, Serialize};

use crate::error::{ModelError, Result};
use crate::types::{InstanceId, LinkId, LinkSign, NodeId, NodeType, Point, Rect, Rgb};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Node {
    pub id: NodeId,
    pub name: String,
    #[serde(default)]
    pub node_type: NodeType,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Link {
    pub id: LinkId,
    pub source: NodeId,
    pub target: NodeId,
    #[serde(default)]
    pub sign: LinkSign,
}

impl Link {
    #[must_use]
    pub fn touches(&self, node: &NodeId) -> bool {
        &self.source == node || &self.target == node
    }
}

/// One level of the model hierarchy: the subset of root nodes and links it shows.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Instance {
    pub id: InstanceId,
    #[serde(default)]
    pub parent: Option<InstanceId>,
    #[serde(default)]
    pub nodes: IndexSet<NodeId>,
    #[serde(default)]
    pub links: IndexSet<LinkId>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NodeProps {
    pub position: Point,
    pub color: String,
    #[serde(default)]
    pub region: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Region {
    pub name: String,
    pub bounds: Rect,
}

/// A recorded build instruction. Editing a node it mentions invalidates it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BuildInstruction {
    pub id: String,
    pub nodes: Vec<NodeId>,
}

/// The committed network model: genome, instance hierarchy, layout and palette.
///
/// Entity maps are ordered by key so that a model restored by undo compares
/// equal to, and serializes identically to, the model it was before.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(try_from = "ModelDocument", into = "ModelDocument")]
pub struct Model {
    pub(crate) nodes: BTreeMap<NodeId, Node>,
    pub(crate) links: BTreeMap<LinkId, Link>,
    pub(crate) instances: BTreeMap<InstanceId, Instance>,
    pub(crate) node_props: BTreeMap<NodeId, NodeProps>,
    pub(crate) regions: BTreeMap<String, Region>,
    pub(crate) palette: BTreeMap<String, Rgb>,
    pub(crate) build_instructions: Vec<BuildInstruction>,
}

impl Model {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_node(mut self, id: &str, name: &str, node_type: NodeType) -> Self {
        let id = NodeId::new(id);
        self.nodes.insert(
            id.clone(),
            Node {
                id,
                name: name.to_string(),
                node_type,
            },
        );
        self
    }

    #[must_use]
    pub fn with_link(mut self, id: &str, source: &str, target: &str, sign: LinkSign) -> Self {
        let id = LinkId::new(id);
        self.links.insert(
            id.clone(),
            Link {
                id,
                source: NodeId::new(source),
                target: NodeId::new(target),
                sign,
            },
        );
        self
    }

    #[must_use]
    pub fn with_instance(
        mut self,
        id: &str,
        parent: Option<&str>,
        nodes: &[&str],
        links: &[&str],
    ) -> Self {
        let id = InstanceId::new(id);
        self.instances.insert(
            id.clone(),
            Instance {
                id,
                parent: parent.map(InstanceId::new),
                nodes: nodes.iter().copied().map(NodeId::new).collect(),
                links: links.iter().copied().map(LinkId::new).collect(),
            },
        );
        self
    }

    #[must_use]
    pub fn with_node_props(mut self, node: &str, position: Point, color: &str) -> Self {
        self.node_props.insert(
            NodeId::new(node),
            NodeProps {
                position,
                color: color.to_string(),
                region: None,
            },
        );
        self
    }

    #[must_use]
    pub fn with_region(mut self, name: &str, bounds: Rect) -> Self {
        self.regions.insert(
            name.to_string(),
            Region {
                name: name.to_string(),
                bounds,
            },
        );
        self
    }

    #[must_use]
    pub fn with_palette_color(mut self, name: &str, color: Rgb) -> Self {
        self.palette.insert(name.to_string(), color);
        self
    }

    #[must_use]
    pub fn with_build_instruction(mut self, id: &str, nodes: &[&str]) -> Self {
        self.build_instructions.push(BuildInstruction {
            id: id.to_string(),
            nodes: nodes.iter().copied().map(NodeId::new).collect(),
        });
        self
    }

    #[must_use]
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    #[must_use]
    pub fn link_count(&self) -> usize {
        self.links.len()
    }

    /// Check referential integrity across genome, hierarchy and layout.
    ///
    /// # Errors
    ///
    /// Returns the first dangling reference found.
    pub fn validate(&self) -> Result<()> {
        for link in self.links.values() {
            for end in [&link.source, &link.target] {
                if !self.nodes.contains_key(end) {
                    return Err(ModelError::DanglingLink {
                        link: link.id.clone(),
                        node: end.clone(),
                    });
                }
            }
        }

        for instance in self.instances.values() {
            if let Some(parent) = &instance.parent
                && !self.instances.contains_key(parent)
            {
                return Err(ModelError::UnknownParent {
                    instance: instance.id.clone(),
                    parent: parent.clone(),
                });
            }
            if let Some(node) = instance.nodes.iter().find(|n| !self.nodes.contains_key(*n)) {
                return Err(ModelError::DanglingInstanceMember {
                    instance: instance.id.clone(),
                    kind: "node",
                    id: node.to_string(),
                });
            }
            if let Some(link) = instance.links.iter().find(|l| !self.links.contains_key(*l)) {
                return Err(ModelError::DanglingInstanceMember {
                    instance: instance.id.clone(),
                    kind: "link",
                    id: link.to_string(),
                });
            }
        }

        for (node, props) in &self.node_props {
            if !self.nodes.contains_key(node) {
                return Err(ModelError::UnknownNode(node.clone()));
            }
            if let Some(region) = &props.region
                && !self.regions.contains_key(region)
            {
                return Err(ModelError::UnknownRegion(region.clone()));
            }
        }

        Ok(())
    }
}

/// Read access shared by the committed model and staged views over it.
pub trait ModelRead {
    fn node(&self, id: &NodeId) -> Option<&Node>;
    fn link(&self, id: &LinkId) -> Option<&Link>;
    fn instance(&self, id: &InstanceId) -> Option<&Instance>;
    fn node_props(&self, id: &NodeId) -> Option<&NodeProps>;
    fn region(&self, name: &str) -> Option<&Region>;
    fn palette_color(&self, name: &str) -> Option<&Rgb>;
    fn node_ids(&self) -> Vec<NodeId>;
    fn link_ids(&self) -> Vec<LinkId>;
    fn instance_ids(&self) -> Vec<InstanceId>;
    fn region_names(&self) -> Vec<String>;
    fn build_instructions(&self) -> &[BuildInstruction];

    /// # Errors
    ///
    /// Returns `ModelError::UnknownNode` if the node does not exist.
    fn require_node(&self, id: &NodeId) -> Result<&Node> {
        self.node(id)
            .ok_or_else(|| ModelError::UnknownNode(id.clone()))
    }

    /// Find a node by display name, ignoring case and surrounding whitespace.
    fn node_by_name(&self, name: &str) -> Option<&Node> {
        let wanted = name.trim().to_lowercase();
        self.node_ids()
            .into_iter()
            .filter_map(|id| self.node(&id))
            .find(|node| node.name.trim().to_lowercase() == wanted)
    }

    fn links_touching(&self, nodes: &[NodeId]) -> Vec<LinkId> {
        self.link_ids()
            .into_iter()
            .filter(|id| {
                self.link(id)
                    .is_some_and(|link| nodes.iter().any(|n| link.touches(n)))
            })
            .collect()
    }

    /// Every instance, parents before their children; siblings in id order.
    fn instances_parent_first(&self) -> Vec<InstanceId> {
        let all = self.instance_ids();
        let mut ordered = Vec::with_capacity(all.len());
        let mut queue: VecDeque<InstanceId> = all
            .iter()
            .filter(|id| {
                self.instance(id)
                    .and_then(|i| i.parent.as_ref())
                    .is_none_or(|parent| self.instance(parent).is_none())
            })
            .cloned()
            .collect();

        while let Some(id) = queue.pop_front() {
            queue.extend(
                all.iter()
                    .filter(|child| {
                        self.instance(child)
                            .is_some_and(|i| i.parent.as_ref() == Some(&id))
                    })
                    .cloned(),
            );
            ordered.push(id);
        }
        ordered
    }

    fn instances_containing(&self, node: &NodeId) -> Vec<InstanceId> {
        self.instances_parent_first()
            .into_iter()
            .filter(|id| self.instance(id).is_some_and(|i| i.nodes.contains(node)))
            .collect()
    }

    /// The smallest region containing `point`, so nested regions win over their parents.
    fn region_at(&self, point: Point, tolerance: f64) -> Option<String> {
        self.region_names()
            .into_iter()
            .filter_map(|name| self.region(&name).map(|r| (name, r.bounds)))
            .filter(|(_, bounds)| bounds.contains(point, tolerance))
            .min_by(|(_, a), (_, b)| area(a).total_cmp(&area(b)))
            .map(|(name, _)| name)
    }

    fn build_instructions_mentioning(&self, nodes: &[NodeId]) -> Vec<&BuildInstruction> {
        self.build_instructions()
            .iter()
            .filter(|bi| bi.nodes.iter().any(|n| nodes.contains(n)))
            .collect()
    }
}

fn area(rect: &Rect) -> f64 {
    (rect.max_x - rect.min_x) * (rect.max_y - rect.min_y)
}

impl ModelRead for Model {
    fn node(&self, id: &NodeId) -> Option<&Node> {
        self.nodes.get(id)
    }

    fn link(&self, id: &LinkId) -> Option<&Link> {
        self.links.get(id)
    }

    fn instance(&self, id: &InstanceId) -> Option<&Instance> {
        self.instances.get(id)
    }

    fn node_props(&self, id: &NodeId) -> Option<&NodeProps> {
        self.node_props.get(id)
    }

    fn region(&self, name: &str) -> Option<&Region> {
        self.regions.get(name)
    }

    fn palette_color(&self, name: &str) -> Option<&Rgb> {
        self.palette.get(name)
    }

    fn node_ids(&self) -> Vec<NodeId> {
        self.nodes.keys().cloned().collect()
    }

    fn link_ids(&self) -> Vec<LinkId> {
        self.links.keys().cloned().collect()
    }

    fn instance_ids(&self) -> Vec<InstanceId> {
        self.instances.keys().cloned().collect()
    }

    fn region_names(&self) -> Vec<String> {
        self.regions.keys().cloned().collect()
    }

    fn build_instructions(&self) -> &[BuildInstruction] {
        &self.build_instructions
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct NodeLayout {
    node: NodeId,
    position: Point,
    color: String,
    #[serde(default)]
    region: Option<String>,
}

/// On-disk shape of a model: flat lists keyed by the ids they carry.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
struct ModelDocument {
    #[serde(default)]
    nodes: Vec<Node>,
    #[serde(default)]
    links: Vec<Link>,
    #[serde(default)]
    instances: Vec<Instance>,
    #[serde(default)]
    layout: Vec<NodeLayout>,
    #[serde(default)]
    regions: Vec<Region>,
    #[serde(default)]
    palette: BTreeMap<String, Rgb>,
    #[serde(default)]
    build_instructions: Vec<BuildInstruction>,
}

fn insert_unique<K: Ord + ToString, V>(
    map: &mut BTreeMap<K, V>,
    kind: &'static str,
    key: K,
    value: V,
) -> Result<()> {
    if map.contains_key(&key) {
        return Err(ModelError::DuplicateId {
            kind,
            id: key.to_string(),
        });
    }
    map.insert(key, value);
    Ok(())
}

impl TryFrom<ModelDocument> for Model {
    type Error = ModelError;

    fn try_from(doc: ModelDocument) -> Result<Self> {
        let mut model = Model {
            palette: doc.palette,
            build_instructions: doc.build_instructions,
            ..Model::default()
        };
        for node in doc.nodes {
            insert_unique(&mut model.nodes, "node", node.id.clone(), node)?;
        }
        for link in doc.links {
            insert_unique(&mut model.links, "link", link.id.clone(), link)?;
        }
        for instance in doc.instances {
            insert_unique(&mut model.instances, "instance", instance.id.clone(), instance)?;
        }
        for region in doc.regions {
            insert_unique(&mut model.regions, "region", region.name.clone(), region)?;
        }
        for entry in doc.layout {
            let props = NodeProps {
                position: entry.position,
                color: entry.color,
                region: entry.region,
            };
            insert_unique(&mut model.node_props, "layout", entry.node, props)?;
        }
        model.validate()?;
        Ok(model)
    }
}

impl From<Model> for ModelDocument {
    fn from(model: Model) -> Self {
        Self {
            nodes: model.nodes.into_values().collect(),
            links: model.links.into_values().collect(),
            instances: model.instances.into_values().collect(),
            layout: model
                .node_props
                .into_iter()
                .map(|(node, props)| NodeLayout {
                    node,
                    position: props.position,
                    color: props.color,
                    region: props.region,
                })
                .collect(),
            regions: model.regions.into_values().collect(),
            palette: model.palette,
            build_instructions: model.build_instructions,
        }
    }
}
