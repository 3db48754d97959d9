mod change_node_type;
mod merge_nodes;
mod move_to_region;
mod rename_node;
mod set_node_color;

pub use change_node_type::{ChangeNodeType, ChangeTypePreload, ChangeTypeState, ChangeTypeStep};
pub use merge_nodes::{MergeNodes, MergePlan, MergePreload, MergeState, MergeStep};
pub use move_to_region::{MovePreload, MoveState, MoveStep, MoveToRegion};
pub use rename_node::{RenameNode, RenamePreload, RenameState, RenameStep};
pub use set_node_color::{ColorPreload, ColorState, ColorStep, SetNodeColor};

use netedit_core::{ModelRead, NodeId};

/// Ids of the build instructions that mention any of `nodes`.
pub(crate) fn instructions_mentioning(model: &impl ModelRead, nodes: &[NodeId]) -> Vec<String> {
    model
        .build_instructions_mentioning(nodes)
        .into_iter()
        .map(|b| b.id.clone())
        .collect()
}

pub(crate) fn build_instruction_warning(ids: &[String], action: &str) -> String {
    format!(
        "Build instructions {} refer to the affected nodes and will no longer match. {action} anyway?",
        ids.join(", ")
    )
}
