use netedit_core::{Model, ModelRead, NodeId, edits};
use netedit_engine::{
    Descriptor, DialogRequest, Operation, Reply, Selection, StepContext, StepError, StepId,
    StepResult,
};
use netedit_journal::{NotificationEvent, Session};
use serde::Deserialize;
use tracing::debug;

#[derive(Debug, Default, Clone, Copy)]
pub struct RenameNode;

impl RenameNode {
    pub const NAME: &'static str = "rename-node";
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RenameStep {
    ShowDialog,
    Validate,
    Apply,
}

impl StepId for RenameStep {
    fn name(&self) -> &'static str {
        match self {
            Self::ShowDialog => "show-dialog",
            Self::Validate => "validate",
            Self::Apply => "apply",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct RenameState {
    pub node: NodeId,
    pub name: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RenamePreload {
    pub node: NodeId,
    #[serde(default)]
    pub name: Option<String>,
}

impl Descriptor for RenameNode {
    fn name(&self) -> &'static str {
        Self::NAME
    }

    fn description(&self) -> &'static str {
        "Rename a node"
    }

    fn is_valid(&self, selection: &Selection, model: &Model) -> bool {
        selection
            .single_node()
            .is_some_and(|n| model.node(n).is_some())
    }
}

impl Operation for RenameNode {
    type Step = RenameStep;
    type State = RenameState;
    type Preload = RenamePreload;

    fn first_step(&self) -> RenameStep {
        RenameStep::ShowDialog
    }

    fn bind_selection(&self, selection: &Selection, _model: &Model) -> Option<RenameState> {
        Some(self.bind_preload(RenamePreload {
            node: selection.single_node()?.clone(),
            name: None,
        }))
    }

    fn bind_preload(&self, preload: RenamePreload) -> RenameState {
        RenameState {
            node: preload.node,
            name: preload.name,
        }
    }

    fn run_step(
        &self,
        step: RenameStep,
        cx: &mut StepContext<Self>,
        session: &mut Session,
    ) -> Result<StepResult, StepError> {
        let node = cx.state().node.clone();
        match step {
            RenameStep::ShowDialog => {
                if cx.state().name.is_some() {
                    cx.set_next(RenameStep::Validate);
                    return Ok(StepResult::Continue);
                }
                match cx.take_dialog()? {
                    None => {
                        let current = session.model().require_node(&node)?;
                        Ok(StepResult::NeedDialog(
                            DialogRequest::new("node-name", format!("Rename {}", current.name))
                                .field("name", current.name.as_str()),
                        ))
                    }
                    Some(Reply::NoResults) => Ok(StepResult::Cancelled),
                    Some(Reply::Given(values)) => {
                        cx.state_mut().name = Some(values.text("name").unwrap_or_default().to_string());
                        cx.set_next(RenameStep::Validate);
                        Ok(StepResult::Continue)
                    }
                }
            }
            RenameStep::Validate => {
                let Some(name) = cx.state().name.clone() else {
                    cx.set_next(RenameStep::ShowDialog);
                    return Ok(StepResult::Continue);
                };
                if edits::rename_node(session.model(), &node, &name)?.is_none() {
                    debug!(node = %node, "name unchanged");
                    return Ok(StepResult::Done);
                }
                cx.set_next(RenameStep::Apply);
                Ok(StepResult::Continue)
            }
            RenameStep::Apply => {
                let name = cx.state().name.clone().unwrap_or_default();
                cx.open_transaction(format!("Rename node {node}"))?;
                let record = edits::rename_node(&cx.view(session), &node, &name)?;
                cx.record(record)?;
                cx.notify(NotificationEvent::NodeChanged(node))?;
                cx.finish(session)?;
                Ok(StepResult::Done)
            }
        }
    }
}
