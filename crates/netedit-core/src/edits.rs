//! Mutation entry points.
//!
//! Each function reads the model through [`ModelRead`] and returns the
//! [`ChangeRecord`] that would perform the edit, or `None` when the model
//! already has the requested value. Nothing here mutates a model; records are
//! applied when the transaction that carries them is committed.

use crate::change::{ChangeRecord, Delta};
use crate::error::{ModelError, Result};
use crate::model::{ModelRead, NodeProps};
use crate::types::{InstanceId, LinkId, NodeId, NodeType, Point, Rgb};

/// # Errors
///
/// Returns `ModelError::UnknownNode` if the node does not exist.
pub fn set_node_type(
    model: &impl ModelRead,
    node: &NodeId,
    node_type: NodeType,
) -> Result<Option<ChangeRecord>> {
    let current = model.require_node(node)?;
    let mut updated = current.clone();
    updated.node_type = node_type;
    Ok(Delta::new(node.clone(), Some(current.clone()), Some(updated)).map(ChangeRecord::node))
}

/// # Errors
///
/// Returns `ModelError::EmptyName` for a blank name and
/// `ModelError::NameCollision` if another node already uses it.
pub fn rename_node(
    model: &impl ModelRead,
    node: &NodeId,
    name: &str,
) -> Result<Option<ChangeRecord>> {
    let name = name.trim();
    if name.is_empty() {
        return Err(ModelError::EmptyName);
    }
    let current = model.require_node(node)?;
    if let Some(other) = model.node_by_name(name)
        && &other.id != node
    {
        return Err(ModelError::NameCollision {
            name: name.to_string(),
            existing: other.id.clone(),
        });
    }
    let mut updated = current.clone();
    updated.name = name.to_string();
    Ok(Delta::new(node.clone(), Some(current.clone()), Some(updated)).map(ChangeRecord::node))
}

/// Remove a node from the genome. Links and instance membership are not
/// touched; callers rewrite or remove those first.
///
/// # Errors
///
/// Returns `ModelError::UnknownNode` if the node does not exist.
pub fn remove_node(model: &impl ModelRead, node: &NodeId) -> Result<Option<ChangeRecord>> {
    let current = model.require_node(node)?;
    Ok(Delta::new(node.clone(), Some(current.clone()), None).map(ChangeRecord::node))
}

/// Point every end of `link` that is one of `from` at `to` instead.
///
/// # Errors
///
/// Returns `ModelError::UnknownLink` if the link does not exist.
pub fn retarget_link(
    model: &impl ModelRead,
    link: &LinkId,
    from: &[NodeId],
    to: &NodeId,
) -> Result<Option<ChangeRecord>> {
    let current = model
        .link(link)
        .ok_or_else(|| ModelError::UnknownLink(link.clone()))?;
    let mut updated = current.clone();
    if from.contains(&updated.source) {
        updated.source = to.clone();
    }
    if from.contains(&updated.target) {
        updated.target = to.clone();
    }
    Ok(Delta::new(link.clone(), Some(current.clone()), Some(updated)).map(ChangeRecord::link))
}

/// Replace `from` members of an instance with `to`, keeping the position of
/// the first replaced member.
///
/// # Errors
///
/// Returns `ModelError::UnknownInstance` if the instance does not exist.
pub fn replace_instance_nodes(
    model: &impl ModelRead,
    instance: &InstanceId,
    from: &[NodeId],
    to: &NodeId,
) -> Result<Option<ChangeRecord>> {
    let current = model
        .instance(instance)
        .ok_or_else(|| ModelError::UnknownInstance(instance.clone()))?;
    let mut updated = current.clone();
    updated.nodes = current
        .nodes
        .iter()
        .map(|n| if from.contains(n) { to } else { n })
        .cloned()
        .collect();
    Ok(
        Delta::new(instance.clone(), Some(current.clone()), Some(updated))
            .map(ChangeRecord::instance),
    )
}

/// Drop a node's layout entry, if it has one.
#[must_use]
pub fn remove_node_props(model: &impl ModelRead, node: &NodeId) -> Option<ChangeRecord> {
    let current = model.node_props(node)?;
    Delta::new(node.clone(), Some(current.clone()), None).map(ChangeRecord::node_props)
}

/// # Errors
///
/// Returns `ModelError::MissingLayout` if the node has no layout entry and
/// `ModelError::UnknownColor` if the palette does not define `color`.
pub fn set_node_color(
    model: &impl ModelRead,
    node: &NodeId,
    color: &str,
) -> Result<Option<ChangeRecord>> {
    if model.palette_color(color).is_none() {
        return Err(ModelError::UnknownColor(color.to_string()));
    }
    let current = model
        .node_props(node)
        .ok_or_else(|| ModelError::MissingLayout(node.clone()))?;
    let updated = NodeProps {
        color: color.to_string(),
        ..current.clone()
    };
    Ok(
        Delta::new(node.clone(), Some(current.clone()), Some(updated))
            .map(ChangeRecord::node_props),
    )
}

/// Move a node to `position` and make it a member of `region`.
///
/// # Errors
///
/// Returns `ModelError::UnknownRegion` or `ModelError::MissingLayout`.
pub fn place_node(
    model: &impl ModelRead,
    node: &NodeId,
    region: &str,
    position: Point,
) -> Result<Option<ChangeRecord>> {
    if model.region(region).is_none() {
        return Err(ModelError::UnknownRegion(region.to_string()));
    }
    let current = model
        .node_props(node)
        .ok_or_else(|| ModelError::MissingLayout(node.clone()))?;
    let updated = NodeProps {
        position,
        region: Some(region.to_string()),
        ..current.clone()
    };
    Ok(
        Delta::new(node.clone(), Some(current.clone()), Some(updated))
            .map(ChangeRecord::node_props),
    )
}

/// Define or redefine a named palette color.
#[must_use]
pub fn set_palette_color(model: &impl ModelRead, name: &str, color: Rgb) -> Option<ChangeRecord> {
    let current = model.palette_color(name).copied();
    Delta::new(name.to_string(), current, Some(color)).map(ChangeRecord::palette_entry)
}
