use indexmap::IndexSet;
use netedit_core::{InstanceId, LinkId, Model, ModelRead, NodeId, edits};
use netedit_engine::{
    Descriptor, Intersection, Operation, Selection, StepContext, StepError, StepId, StepResult,
};
use netedit_journal::{NotificationEvent, Session};
use serde::Deserialize;
use tracing::debug;

use super::{build_instruction_warning, instructions_mentioning};

/// Merge duplicate nodes into one. Links and instance memberships of the
/// absorbed nodes move to the kept node; the absorbed nodes and their layout
/// are removed. The whole merge is one undo entry.
#[derive(Debug, Default, Clone, Copy)]
pub struct MergeNodes;

impl MergeNodes {
    pub const NAME: &'static str = "merge-nodes";
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MergeStep {
    CheckBuildInstructions,
    AwaitWarningAnswer,
    PlanMerge,
    ApplyMerge,
}

impl StepId for MergeStep {
    fn name(&self) -> &'static str {
        match self {
            Self::CheckBuildInstructions => "check-build-instructions",
            Self::AwaitWarningAnswer => "await-warning-answer",
            Self::PlanMerge => "plan-merge",
            Self::ApplyMerge => "apply-merge",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct MergeState {
    pub keep: NodeId,
    pub absorb: Vec<NodeId>,
    pub warning: Option<String>,
    pub plan: Option<MergePlan>,
}

/// What the merge will rewrite, computed against the staged model.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct MergePlan {
    pub links: Vec<LinkId>,
    /// Instances showing an absorbed node, parent first.
    pub instances: Vec<InstanceId>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct MergePreload {
    pub keep: NodeId,
    pub absorb: Vec<NodeId>,
}

impl Descriptor for MergeNodes {
    fn name(&self) -> &'static str {
        Self::NAME
    }

    fn description(&self) -> &'static str {
        "Merge the selected nodes into the one under the pointer"
    }

    fn is_valid(&self, selection: &Selection, model: &Model) -> bool {
        let distinct: IndexSet<&NodeId> = selection.nodes.iter().collect();
        distinct.len() >= 2 && distinct.iter().all(|n| model.node(n).is_some())
    }
}

impl Operation for MergeNodes {
    type Step = MergeStep;
    type State = MergeState;
    type Preload = MergePreload;

    fn first_step(&self) -> MergeStep {
        MergeStep::CheckBuildInstructions
    }

    fn bind_selection(&self, selection: &Selection, _model: &Model) -> Option<MergeState> {
        let nodes: IndexSet<NodeId> = selection.nodes.iter().cloned().collect();
        let keep = match &selection.intersection {
            Some(Intersection::Node { node, .. }) if nodes.contains(node) => node.clone(),
            _ => nodes.first()?.clone(),
        };
        let absorb = nodes.into_iter().filter(|n| n != &keep).collect();
        Some(self.bind_preload(MergePreload { keep, absorb }))
    }

    fn bind_preload(&self, preload: MergePreload) -> MergeState {
        MergeState {
            keep: preload.keep,
            absorb: preload.absorb,
            warning: None,
            plan: None,
        }
    }

    fn run_step(
        &self,
        step: MergeStep,
        cx: &mut StepContext<Self>,
        session: &mut Session,
    ) -> Result<StepResult, StepError> {
        match step {
            MergeStep::CheckBuildInstructions => check_build_instructions(cx, session),
            MergeStep::AwaitWarningAnswer => match cx.take_confirmation()? {
                None => Ok(StepResult::NeedConfirmation(
                    cx.state().warning.clone().unwrap_or_default(),
                )),
                Some(true) => {
                    cx.set_next(MergeStep::PlanMerge);
                    Ok(StepResult::Continue)
                }
                Some(false) => Ok(StepResult::Cancelled),
            },
            MergeStep::PlanMerge => plan_merge(cx, session),
            MergeStep::ApplyMerge => apply_merge(cx, session),
        }
    }
}

fn check_build_instructions(
    cx: &mut StepContext<MergeNodes>,
    session: &mut Session,
) -> Result<StepResult, StepError> {
    let state = cx.state();
    if let Some(problem) = absorb_problem(&state.keep, &state.absorb) {
        debug!(keep = %state.keep, problem = %problem, "refusing merge");
        return Ok(StepResult::Error(problem));
    }
    let keep_name = session.model().require_node(&state.keep)?.name.clone();
    let mut involved = state.absorb.clone();
    involved.push(state.keep.clone());
    let mentioned = instructions_mentioning(session.model(), &involved);

    cx.open_transaction(format!("Merge nodes into {keep_name}"))?;
    if mentioned.is_empty() {
        cx.set_next(MergeStep::PlanMerge);
        return Ok(StepResult::Continue);
    }

    let warning = build_instruction_warning(&mentioned, "Merge");
    cx.state_mut().warning = Some(warning.clone());
    cx.set_next(MergeStep::AwaitWarningAnswer);
    Ok(StepResult::NeedConfirmation(warning))
}

/// Preloads bypass selection binding, so the absorbed list is checked here.
fn absorb_problem(keep: &NodeId, absorb: &[NodeId]) -> Option<String> {
    if absorb.is_empty() {
        return Some(format!("nothing to merge into node '{keep}'"));
    }
    if absorb.contains(keep) {
        return Some(format!("node '{keep}' cannot be merged into itself"));
    }
    let mut seen = IndexSet::new();
    absorb
        .iter()
        .find(|n| !seen.insert(*n))
        .map(|n| format!("node '{n}' is listed more than once"))
}

fn plan_merge(
    cx: &mut StepContext<MergeNodes>,
    session: &mut Session,
) -> Result<StepResult, StepError> {
    let plan = {
        let view = cx.view(session);
        let state = cx.state();
        view.require_node(&state.keep)?;
        for node in &state.absorb {
            view.require_node(node)?;
        }
        let instances = view
            .instances_parent_first()
            .into_iter()
            .filter(|id| {
                view.instance(id)
                    .is_some_and(|i| state.absorb.iter().any(|n| i.nodes.contains(n)))
            })
            .collect();
        MergePlan {
            links: view.links_touching(&state.absorb),
            instances,
        }
    };

    debug!(
        keep = %cx.state().keep,
        absorbed = cx.state().absorb.len(),
        links = plan.links.len(),
        instances = plan.instances.len(),
        "planned merge"
    );
    cx.state_mut().plan = Some(plan);
    cx.set_next(MergeStep::ApplyMerge);
    Ok(StepResult::Continue)
}

fn apply_merge(
    cx: &mut StepContext<MergeNodes>,
    session: &mut Session,
) -> Result<StepResult, StepError> {
    let MergeState {
        keep, absorb, plan, ..
    } = cx.state().clone();
    let Some(plan) = plan else {
        cx.set_next(MergeStep::PlanMerge);
        return Ok(StepResult::Continue);
    };

    for link in &plan.links {
        let record = edits::retarget_link(&cx.view(session), link, &absorb, &keep)?;
        cx.record(record)?;
    }
    for instance in &plan.instances {
        let record = edits::replace_instance_nodes(&cx.view(session), instance, &absorb, &keep)?;
        cx.record(record)?;
    }
    for node in &absorb {
        let layout = edits::remove_node_props(&cx.view(session), node);
        cx.record(layout)?;
        let removal = edits::remove_node(&cx.view(session), node)?;
        cx.record(removal)?;
    }

    cx.notify(NotificationEvent::ModelChanged)?;
    cx.notify(NotificationEvent::LayoutChanged)?;
    cx.notify(NotificationEvent::NodeChanged(keep))?;
    cx.notify(NotificationEvent::SelectionInvalidated)?;
    cx.finish(session)?;
    Ok(StepResult::Done)
}
