use std::slice;

use netedit_core::{Model, ModelRead, NodeId, NodeType, edits};
use netedit_engine::{
    Descriptor, DialogRequest, Operation, Reply, Selection, StepContext, StepError, StepId,
    StepResult,
};
use netedit_journal::{NotificationEvent, Session};
use serde::Deserialize;

use super::{build_instruction_warning, instructions_mentioning};

/// Change the type of one node, warning first if build instructions refer
/// to it.
#[derive(Debug, Default, Clone, Copy)]
pub struct ChangeNodeType;

impl ChangeNodeType {
    pub const NAME: &'static str = "change-node-type";
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChangeTypeStep {
    WarnIfBuildInstructions,
    ShowDialog,
    ApplyAndFinish,
    WillExit,
}

impl StepId for ChangeTypeStep {
    fn name(&self) -> &'static str {
        match self {
            Self::WarnIfBuildInstructions => "warn-if-build-instructions",
            Self::ShowDialog => "show-dialog",
            Self::ApplyAndFinish => "apply-and-finish",
            Self::WillExit => "will-exit",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ChangeTypeState {
    pub node: NodeId,
    /// Chosen in the dialog, or supplied up front by a preload.
    pub node_type: Option<NodeType>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(deny_unknown_fields, rename_all = "kebab-case")]
pub struct ChangeTypePreload {
    pub node: NodeId,
    #[serde(default)]
    pub node_type: Option<NodeType>,
}

impl Descriptor for ChangeNodeType {
    fn name(&self) -> &'static str {
        Self::NAME
    }

    fn description(&self) -> &'static str {
        "Change the type of a node"
    }

    fn is_valid(&self, selection: &Selection, model: &Model) -> bool {
        selection
            .single_node()
            .is_some_and(|n| model.node(n).is_some())
    }
}

impl Operation for ChangeNodeType {
    type Step = ChangeTypeStep;
    type State = ChangeTypeState;
    type Preload = ChangeTypePreload;

    fn first_step(&self) -> ChangeTypeStep {
        ChangeTypeStep::WarnIfBuildInstructions
    }

    fn bind_selection(&self, selection: &Selection, _model: &Model) -> Option<ChangeTypeState> {
        let node = selection.single_node()?.clone();
        Some(self.bind_preload(ChangeTypePreload {
            node,
            node_type: None,
        }))
    }

    fn bind_preload(&self, preload: ChangeTypePreload) -> ChangeTypeState {
        ChangeTypeState {
            node: preload.node,
            node_type: preload.node_type,
        }
    }

    fn run_step(
        &self,
        step: ChangeTypeStep,
        cx: &mut StepContext<Self>,
        session: &mut Session,
    ) -> Result<StepResult, StepError> {
        let node = cx.state().node.clone();
        match step {
            ChangeTypeStep::WarnIfBuildInstructions => {
                session.model().require_node(&node)?;
                let mentioned = instructions_mentioning(session.model(), slice::from_ref(&node));
                if mentioned.is_empty() {
                    cx.set_next(ChangeTypeStep::ShowDialog);
                    return Ok(StepResult::Continue);
                }
                match cx.take_confirmation()? {
                    None => Ok(StepResult::NeedConfirmation(build_instruction_warning(
                        &mentioned,
                        "Change the type",
                    ))),
                    Some(true) => {
                        cx.set_next(ChangeTypeStep::ShowDialog);
                        Ok(StepResult::Continue)
                    }
                    Some(false) => Ok(StepResult::Cancelled),
                }
            }
            ChangeTypeStep::ShowDialog => {
                if cx.state().node_type.is_some() {
                    cx.set_next(ChangeTypeStep::ApplyAndFinish);
                    return Ok(StepResult::Continue);
                }
                match cx.take_dialog()? {
                    None => {
                        let current = session.model().require_node(&node)?;
                        Ok(StepResult::NeedDialog(
                            DialogRequest::new(
                                "node-type",
                                format!("Change type of {}", current.name),
                            )
                            .field("type", current.node_type.to_string()),
                        ))
                    }
                    Some(Reply::NoResults) => Ok(StepResult::Cancelled),
                    Some(Reply::Given(values)) => {
                        let node_type: NodeType = values.text("type").unwrap_or_default().parse()?;
                        cx.state_mut().node_type = Some(node_type);
                        cx.set_next(ChangeTypeStep::ApplyAndFinish);
                        Ok(StepResult::Continue)
                    }
                }
            }
            ChangeTypeStep::ApplyAndFinish => {
                let Some(node_type) = cx.state().node_type else {
                    cx.set_next(ChangeTypeStep::ShowDialog);
                    return Ok(StepResult::Continue);
                };
                cx.open_transaction("Change node type")?;
                let record = edits::set_node_type(&cx.view(session), &node, node_type)?;
                if cx.record(record)? {
                    cx.notify(NotificationEvent::NodeChanged(node))?;
                    cx.notify(NotificationEvent::ModelChanged)?;
                }
                cx.finish(session)?;
                cx.set_next(ChangeTypeStep::WillExit);
                Ok(StepResult::Continue)
            }
            ChangeTypeStep::WillExit => Ok(StepResult::Done),
        }
    }
}

#[cfg(test)]
mod tests {
    use netedit_engine::{Answer, DialogValues, Dispatch, advance};

    use super::*;
    use crate::fixtures::sample_model;

    fn type_of(session: &Session, node: &str) -> Option<NodeType> {
        session.model().node(&NodeId::new(node)).map(|n| n.node_type)
    }

    #[test]
    fn walks_warning_dialog_apply_exit() -> anyhow::Result<()> {
        let mut session = Session::new(sample_model());
        let cx = ChangeNodeType.initial_context(&Selection::of_nodes(["a"]), session.model())?;

        let Dispatch::Suspended { request, context } =
            advance(&mut session, &ChangeNodeType, cx, None)?
        else {
            panic!("expected a warning");
        };
        assert!(matches!(request, StepResult::NeedConfirmation(_)));

        let Dispatch::Suspended { request, context } = advance(
            &mut session,
            &ChangeNodeType,
            context,
            Some(Answer::Confirm(true)),
        )?
        else {
            panic!("expected the dialog");
        };
        let StepResult::NeedDialog(dialog) = request else {
            panic!("expected a dialog request, got {request:?}");
        };
        assert_eq!(dialog.fields.text("type"), Some("gene"));

        let answer = Answer::Dialog(DialogValues::new().with("type", "Diamond"));
        let Dispatch::Finished(completion) =
            advance(&mut session, &ChangeNodeType, context, Some(answer))?
        else {
            panic!("expected the operation to finish");
        };

        assert_eq!(completion.result, StepResult::Done);
        assert_eq!(
            completion.trace.names(),
            vec![
                "warn-if-build-instructions",
                "warn-if-build-instructions",
                "show-dialog",
                "show-dialog",
                "apply-and-finish",
                "will-exit",
            ]
        );
        assert_eq!(type_of(&session, "a"), Some(NodeType::Diamond));
        assert_eq!(session.history().len(), 1);
        Ok(())
    }

    #[test]
    fn node_without_instructions_goes_straight_to_dialog() -> anyhow::Result<()> {
        let mut session = Session::new(sample_model());
        let cx = ChangeNodeType.preloaded_context(ChangeTypePreload {
            node: NodeId::new("b"),
            node_type: None,
        });

        let outcome = advance(&mut session, &ChangeNodeType, cx, None)?;

        assert!(matches!(outcome.result(), StepResult::NeedDialog(_)));
        Ok(())
    }

    #[test]
    fn preloaded_type_skips_dialog() -> anyhow::Result<()> {
        let mut session = Session::new(sample_model());
        let cx = ChangeNodeType.preloaded_context(ChangeTypePreload {
            node: NodeId::new("d"),
            node_type: Some(NodeType::Slash),
        });

        let outcome = advance(&mut session, &ChangeNodeType, cx, None)?;

        assert_eq!(outcome.result(), &StepResult::Done);
        assert_eq!(type_of(&session, "d"), Some(NodeType::Slash));
        Ok(())
    }

    #[test]
    fn same_type_leaves_no_undo_entry() -> anyhow::Result<()> {
        let mut session = Session::new(sample_model());
        let cx = ChangeNodeType.preloaded_context(ChangeTypePreload {
            node: NodeId::new("d"),
            node_type: Some(NodeType::Bubble),
        });

        let outcome = advance(&mut session, &ChangeNodeType, cx, None)?;

        assert_eq!(outcome.result(), &StepResult::Done);
        assert!(session.history().is_empty());
        Ok(())
    }

    #[test]
    fn unknown_type_name_ends_with_error() -> anyhow::Result<()> {
        let mut session = Session::new(sample_model());
        let original = session.model().clone();
        let cx = ChangeNodeType.preloaded_context(ChangeTypePreload {
            node: NodeId::new("b"),
            node_type: None,
        });
        let Dispatch::Suspended { context, .. } = advance(&mut session, &ChangeNodeType, cx, None)?
        else {
            panic!("expected the dialog");
        };

        let answer = Answer::Dialog(DialogValues::new().with("type", "hexagon"));
        let outcome = advance(&mut session, &ChangeNodeType, context, Some(answer))?;

        assert!(matches!(outcome.result(), StepResult::Error(m) if m.contains("hexagon")));
        assert_eq!(session.model(), &original);
        Ok(())
    }
}
