use std::fmt;

use netedit_core::{LinkId, Model, NodeId, Point};
use netedit_journal::Session;

use crate::context::StepContext;
use crate::error::{EngineError, StepError};
use crate::result::StepResult;

/// What the user has selected when an operation is invoked interactively.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Selection {
    pub nodes: Vec<NodeId>,
    /// The item under the pointer, for operations started from a context menu.
    pub intersection: Option<Intersection>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Intersection {
    Node { node: NodeId, point: Point },
    Link { link: LinkId, point: Point },
    Canvas { point: Point },
}

impl Intersection {
    #[must_use]
    pub fn point(&self) -> Point {
        match self {
            Self::Node { point, .. } | Self::Link { point, .. } | Self::Canvas { point } => *point,
        }
    }
}

impl Selection {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn of_nodes<I, N>(nodes: I) -> Self
    where
        I: IntoIterator<Item = N>,
        N: Into<NodeId>,
    {
        Self {
            nodes: nodes.into_iter().map(Into::into).collect(),
            intersection: None,
        }
    }

    #[must_use]
    pub fn with_intersection(mut self, intersection: Intersection) -> Self {
        self.intersection = Some(intersection);
        self
    }

    /// The one node the operation should act on: the node under the pointer,
    /// else the only selected node.
    #[must_use]
    pub fn single_node(&self) -> Option<&NodeId> {
        if let Some(Intersection::Node { node, .. }) = &self.intersection {
            return Some(node);
        }
        match self.nodes.as_slice() {
            [only] => Some(only),
            _ => None,
        }
    }
}

/// Name of a step, for traces and logs.
pub trait StepId: Copy + Eq + fmt::Debug + Send + Sync + 'static {
    fn name(&self) -> &'static str;
}

/// The object-safe face of an operation: enough to list it and decide
/// whether it is enabled.
pub trait Descriptor: Send + Sync {
    fn name(&self) -> &'static str;

    fn description(&self) -> &'static str;

    /// Whether the operation applies to `selection`. Must be pure.
    fn is_valid(&self, selection: &Selection, model: &Model) -> bool;
}

/// A multi-step edit operation.
///
/// Implementations hold no per-invocation state; everything an invocation
/// accumulates lives in its [`StepContext`]. One descriptor value serves any
/// number of invocations.
pub trait Operation: Descriptor + Sized {
    type Step: StepId;
    type State: Clone + fmt::Debug + PartialEq + Send;
    /// Fields a programmatic caller supplies instead of a selection.
    type Preload;

    fn first_step(&self) -> Self::Step;

    /// Bind an interactive selection to initial state. `None` when the
    /// selection does not fit.
    fn bind_selection(&self, selection: &Selection, model: &Model) -> Option<Self::State>;

    fn bind_preload(&self, preload: Self::Preload) -> Self::State;

    /// Run one step.
    ///
    /// # Errors
    ///
    /// Model and journal errors end the operation with `StepResult::Error`;
    /// engine errors are returned from the dispatch loop unchanged.
    fn run_step(
        &self,
        step: Self::Step,
        cx: &mut StepContext<Self>,
        session: &mut Session,
    ) -> Result<StepResult, StepError>;

    /// A fresh context for an interactive invocation.
    ///
    /// # Errors
    ///
    /// Returns `EngineError::NotApplicable` if the operation does not apply
    /// to `selection`.
    fn initial_context(
        &self,
        selection: &Selection,
        model: &Model,
    ) -> Result<StepContext<Self>, EngineError> {
        StepContext::interactive(self, selection, model)
    }

    /// A fresh context for a programmatic invocation.
    fn preloaded_context(&self, preload: Self::Preload) -> StepContext<Self> {
        StepContext::preloaded(self, preload)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn single_node_prefers_intersection() {
        let selection = Selection::of_nodes(["a", "b"]).with_intersection(Intersection::Node {
            node: NodeId::new("c"),
            point: Point::new(0.0, 0.0),
        });

        assert_eq!(selection.single_node(), Some(&NodeId::new("c")));
    }

    #[test]
    fn single_node_requires_exactly_one() {
        assert_eq!(
            Selection::of_nodes(["a"]).single_node(),
            Some(&NodeId::new("a"))
        );
        assert_eq!(Selection::of_nodes(["a", "b"]).single_node(), None);
        assert_eq!(Selection::new().single_node(), None);
    }

    #[test]
    fn canvas_intersection_is_not_a_node() {
        let selection = Selection::new().with_intersection(Intersection::Canvas {
            point: Point::new(3.0, 4.0),
        });

        assert_eq!(selection.single_node(), None);
        assert_eq!(
            selection.intersection.map(|i| i.point()),
            Some(Point::new(3.0, 4.0))
        );
    }
}
