//! Hierarchical network model and the reversible change records that edit it.

pub mod change;
pub mod edits;
pub mod error;
pub mod model;
pub mod types;

pub use change::{ChangeKind, ChangeRecord, Delta, EntityRef, GenomeChange, GlobalChange, LayoutChange};
pub use error::{ModelError, Result};
pub use model::{BuildInstruction, Instance, Link, Model, ModelRead, Node, NodeProps, Region};
pub use types::{InstanceId, LinkId, LinkSign, NodeId, NodeType, Point, Rect, Rgb};
