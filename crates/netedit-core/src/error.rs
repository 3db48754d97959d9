use thiserror::Error;

use crate::change::EntityRef;
use crate::types::{InstanceId, LinkId, NodeId};

#[derive(Debug, Error)]
pub enum ModelError {
    #[error("unknown node '{0}'")]
    UnknownNode(NodeId),

    #[error("unknown link '{0}'")]
    UnknownLink(LinkId),

    #[error("unknown instance '{0}'")]
    UnknownInstance(InstanceId),

    #[error("unknown region '{0}'")]
    UnknownRegion(String),

    #[error("node '{0}' has no layout properties")]
    MissingLayout(NodeId),

    #[error("color '{0}' is not in the palette")]
    UnknownColor(String),

    #[error("invalid color '{0}' (expected #rrggbb)")]
    InvalidColor(String),

    #[error("invalid node type '{0}'")]
    InvalidNodeType(String),

    #[error("name '{name}' is already used by node '{existing}'")]
    NameCollision { name: String, existing: NodeId },

    #[error("node name cannot be empty")]
    EmptyName,

    #[error("duplicate {kind} id '{id}'")]
    DuplicateId { kind: &'static str, id: String },

    #[error("link '{link}' refers to unknown node '{node}'")]
    DanglingLink { link: LinkId, node: NodeId },

    #[error("instance '{instance}' refers to unknown {kind} '{id}'")]
    DanglingInstanceMember {
        instance: InstanceId,
        kind: &'static str,
        id: String,
    },

    #[error("instance '{instance}' has unknown parent '{parent}'")]
    UnknownParent {
        instance: InstanceId,
        parent: InstanceId,
    },

    #[error("change to {entity} does not match the current model")]
    StaleChange { entity: EntityRef },
}

pub type Result<T> = std::result::Result<T, ModelError>;
