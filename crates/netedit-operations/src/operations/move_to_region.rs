use netedit_core::{Model, ModelRead, NodeId, Point, edits};
use netedit_engine::{
    ClickMode, Descriptor, Operation, Reply, Selection, StepContext, StepError, StepId, StepResult,
};
use netedit_journal::{NotificationEvent, Session};
use serde::Deserialize;
use tracing::debug;

/// Move a node to a clicked point and into the region under it.
#[derive(Debug, Default, Clone, Copy)]
pub struct MoveToRegion;

impl MoveToRegion {
    pub const NAME: &'static str = "move-to-region";
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MoveStep {
    AwaitClick,
    PlaceNode,
}

impl StepId for MoveStep {
    fn name(&self) -> &'static str {
        match self {
            Self::AwaitClick => "await-click",
            Self::PlaceNode => "place-node",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct MoveState {
    pub node: NodeId,
    pub point: Option<Point>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct MovePreload {
    pub node: NodeId,
    #[serde(default)]
    pub point: Option<Point>,
}

impl Descriptor for MoveToRegion {
    fn name(&self) -> &'static str {
        Self::NAME
    }

    fn description(&self) -> &'static str {
        "Move a node into the region under a click"
    }

    fn is_valid(&self, selection: &Selection, model: &Model) -> bool {
        !model.region_names().is_empty()
            && selection
                .single_node()
                .is_some_and(|n| model.node_props(n).is_some())
    }
}

impl Operation for MoveToRegion {
    type Step = MoveStep;
    type State = MoveState;
    type Preload = MovePreload;

    fn first_step(&self) -> MoveStep {
        MoveStep::AwaitClick
    }

    fn bind_selection(&self, selection: &Selection, _model: &Model) -> Option<MoveState> {
        Some(self.bind_preload(MovePreload {
            node: selection.single_node()?.clone(),
            point: None,
        }))
    }

    fn bind_preload(&self, preload: MovePreload) -> MoveState {
        MoveState {
            node: preload.node,
            point: preload.point,
        }
    }

    fn run_step(
        &self,
        step: MoveStep,
        cx: &mut StepContext<Self>,
        session: &mut Session,
    ) -> Result<StepResult, StepError> {
        match step {
            MoveStep::AwaitClick => {
                if cx.state().point.is_some() {
                    cx.set_next(MoveStep::PlaceNode);
                    return Ok(StepResult::Continue);
                }
                match cx.take_click()? {
                    None => Ok(StepResult::NeedClick(ClickMode::PickRegion)),
                    Some(Reply::NoResults) => Ok(StepResult::Cancelled),
                    Some(Reply::Given(click)) => {
                        cx.state_mut().point = Some(click.point());
                        cx.set_next(MoveStep::PlaceNode);
                        Ok(StepResult::Continue)
                    }
                }
            }
            MoveStep::PlaceNode => {
                let MoveState { node, point } = cx.state().clone();
                let Some(point) = point else {
                    cx.set_next(MoveStep::AwaitClick);
                    return Ok(StepResult::Continue);
                };
                let tolerance = session.config().click_tolerance();
                let Some(region) = cx.view(session).region_at(point, tolerance) else {
                    debug!(node = %node, x = point.x, y = point.y, "click missed every region");
                    return Ok(StepResult::Rejected);
                };

                cx.open_transaction(format!("Move {node} to {region}"))?;
                let record = edits::place_node(&cx.view(session), &node, &region, point)?;
                if cx.record(record)? {
                    cx.notify(NotificationEvent::LayoutChanged)?;
                    cx.notify(NotificationEvent::NodeChanged(node))?;
                }
                cx.finish(session)?;
                Ok(StepResult::Accepted)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use netedit_engine::{Answer, Click, Dispatch, advance};
    use netedit_journal::SessionConfig;

    use super::*;
    use crate::fixtures::sample_model;

    fn click_on(session: &mut Session, node: &str, click: Click) -> anyhow::Result<StepResult> {
        let cx = MoveToRegion.initial_context(&Selection::of_nodes([node]), session.model())?;
        let Dispatch::Suspended { request, context } =
            advance(session, &MoveToRegion, cx, None)?
        else {
            panic!("expected a click request");
        };
        assert_eq!(request, StepResult::NeedClick(ClickMode::PickRegion));
        let outcome = advance(session, &MoveToRegion, context, Some(Answer::Click(click)))?;
        Ok(outcome.result().clone())
    }

    #[test]
    fn click_inside_region_is_accepted() -> anyhow::Result<()> {
        let mut session = Session::new(sample_model());

        let result = click_on(&mut session, "a", Click::at(45.0, 45.0))?;

        assert_eq!(result, StepResult::Accepted);
        let props = session.model().node_props(&NodeId::new("a")).expect("layout");
        assert_eq!(props.region.as_deref(), Some("core"));
        assert_eq!(props.position, Point::new(45.0, 45.0));
        Ok(())
    }

    #[test]
    fn click_outside_every_region_is_rejected() -> anyhow::Result<()> {
        let original = sample_model();
        let mut session = Session::new(original.clone());

        let result = click_on(&mut session, "a", Click::at(25.0, 80.0))?;

        assert_eq!(result, StepResult::Rejected);
        assert_eq!(session.model(), &original);
        Ok(())
    }

    #[test]
    fn tolerance_comes_from_session_config() -> anyhow::Result<()> {
        let config = SessionConfig::default().with_click_tolerance(6.0);
        let mut session = Session::with_config(sample_model(), config);

        let result = click_on(&mut session, "b", Click::at(25.0, 10.0))?;

        assert_eq!(result, StepResult::Accepted);
        let props = session.model().node_props(&NodeId::new("b")).expect("layout");
        assert_eq!(props.region.as_deref(), Some("left"));
        Ok(())
    }

    #[test]
    fn preloaded_point_needs_no_click() -> anyhow::Result<()> {
        let mut session = Session::new(sample_model());
        let cx = MoveToRegion.preloaded_context(MovePreload {
            node: NodeId::new("c"),
            point: Some(Point::new(35.0, 10.0)),
        });

        let outcome = advance(&mut session, &MoveToRegion, cx, None)?;

        assert_eq!(outcome.result(), &StepResult::Accepted);
        assert_eq!(session.history().labels(), vec!["Move c to right"]);
        Ok(())
    }

    #[test]
    fn node_without_layout_is_not_applicable() {
        let model = sample_model().with_node("e", "Epsilon", netedit_core::NodeType::Gene);

        assert!(!MoveToRegion.is_valid(&Selection::of_nodes(["e"]), &model));
        assert!(MoveToRegion.is_valid(&Selection::of_nodes(["d"]), &model));
    }
}
