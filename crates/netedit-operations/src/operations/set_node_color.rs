use netedit_core::{Model, ModelRead, NodeId, Rgb, edits};
use netedit_engine::{
    Descriptor, DialogRequest, Operation, Reply, Selection, StepContext, StepError, StepId,
    StepResult,
};
use netedit_journal::{NotificationEvent, Session};
use serde::Deserialize;
use tracing::debug;

/// Recolor the selected nodes, optionally defining the color first.
///
/// The dialog has an "apply" button: each apply commits its own transaction
/// and shows the dialog again, so one invocation can leave several undo
/// entries. OK commits the last one and ends the operation; closing the
/// dialog keeps what was already applied.
#[derive(Debug, Default, Clone, Copy)]
pub struct SetNodeColor;

impl SetNodeColor {
    pub const NAME: &'static str = "set-node-color";
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColorStep {
    ShowDialog,
    Apply,
    Close,
}

impl StepId for ColorStep {
    fn name(&self) -> &'static str {
        match self {
            Self::ShowDialog => "show-dialog",
            Self::Apply => "apply",
            Self::Close => "close",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ColorState {
    pub nodes: Vec<NodeId>,
    pub color: Option<String>,
    /// Palette value to define for `color` before it is used.
    pub define: Option<Rgb>,
    /// The dialog's apply button was pressed: show it again after applying.
    pub keep_open: bool,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ColorPreload {
    pub nodes: Vec<NodeId>,
    pub color: String,
    #[serde(default)]
    pub rgb: Option<Rgb>,
}

impl Descriptor for SetNodeColor {
    fn name(&self) -> &'static str {
        Self::NAME
    }

    fn description(&self) -> &'static str {
        "Set the color of the selected nodes"
    }

    fn is_valid(&self, selection: &Selection, model: &Model) -> bool {
        !selection.nodes.is_empty()
            && selection
                .nodes
                .iter()
                .all(|n| model.node_props(n).is_some())
    }
}

impl Operation for SetNodeColor {
    type Step = ColorStep;
    type State = ColorState;
    type Preload = ColorPreload;

    fn first_step(&self) -> ColorStep {
        ColorStep::ShowDialog
    }

    fn bind_selection(&self, selection: &Selection, _model: &Model) -> Option<ColorState> {
        Some(ColorState {
            nodes: selection.nodes.clone(),
            color: None,
            define: None,
            keep_open: false,
        })
    }

    fn bind_preload(&self, preload: ColorPreload) -> ColorState {
        ColorState {
            nodes: preload.nodes,
            color: Some(preload.color),
            define: preload.rgb,
            keep_open: false,
        }
    }

    fn run_step(
        &self,
        step: ColorStep,
        cx: &mut StepContext<Self>,
        session: &mut Session,
    ) -> Result<StepResult, StepError> {
        match step {
            ColorStep::ShowDialog => show_dialog(cx, session),
            ColorStep::Apply => apply(cx, session),
            ColorStep::Close => Ok(StepResult::Done),
        }
    }
}

fn show_dialog(
    cx: &mut StepContext<SetNodeColor>,
    session: &mut Session,
) -> Result<StepResult, StepError> {
    if cx.state().color.is_some() {
        cx.set_next(ColorStep::Apply);
        return Ok(StepResult::Continue);
    }

    let values = match cx.take_dialog()? {
        None => {
            let nodes = &cx.state().nodes;
            let current = nodes
                .first()
                .and_then(|n| session.model().node_props(n))
                .map(|p| p.color.clone())
                .unwrap_or_default();
            return Ok(StepResult::NeedDialog(
                DialogRequest::new("node-color", format!("Color of {} node(s)", nodes.len()))
                    .field("color", current)
                    .field("rgb", "")
                    .field("apply", false),
            ));
        }
        Some(Reply::NoResults) => return Ok(StepResult::Cancelled),
        Some(Reply::Given(values)) => values,
    };

    let Some(color) = values.text("color").map(str::trim).filter(|c| !c.is_empty()) else {
        return Ok(StepResult::Error("no color was chosen".to_string()));
    };
    let define = match values.text("rgb").map(str::trim) {
        Some(hex) if !hex.is_empty() => Some(hex.parse::<Rgb>()?),
        _ => None,
    };

    let state = cx.state_mut();
    state.color = Some(color.to_string());
    state.define = define;
    state.keep_open = values.flag("apply");
    cx.set_next(ColorStep::Apply);
    Ok(StepResult::Continue)
}

fn apply(
    cx: &mut StepContext<SetNodeColor>,
    session: &mut Session,
) -> Result<StepResult, StepError> {
    let ColorState {
        nodes,
        color,
        define,
        keep_open,
    } = cx.state().clone();
    let Some(color) = color else {
        cx.set_next(ColorStep::ShowDialog);
        return Ok(StepResult::Continue);
    };

    cx.open_transaction(format!("Set color to {color}"))?;
    if let Some(rgb) = define {
        let record = edits::set_palette_color(&cx.view(session), &color, rgb);
        if cx.record(record)? {
            cx.notify(NotificationEvent::PaletteChanged)?;
        }
    }
    for node in &nodes {
        let record = edits::set_node_color(&cx.view(session), node, &color)?;
        cx.record(record)?;
    }
    cx.notify(NotificationEvent::LayoutChanged)?;
    let receipt = cx.finish(session)?;
    debug!(
        color = %color,
        committed = receipt.is_some(),
        keep_open,
        "applied color"
    );

    let state = cx.state_mut();
    state.color = None;
    state.define = None;
    state.keep_open = false;
    cx.set_next(if keep_open {
        ColorStep::ShowDialog
    } else {
        ColorStep::Close
    });
    Ok(StepResult::Continue)
}

#[cfg(test)]
mod tests {
    use netedit_engine::{Answer, DialogValues, Dispatch, advance};

    use super::*;
    use crate::fixtures::sample_model;

    fn color_of(session: &Session, node: &str) -> Option<String> {
        session
            .model()
            .node_props(&NodeId::new(node))
            .map(|p| p.color.clone())
    }

    fn suspended(
        dispatch: Dispatch<SetNodeColor>,
    ) -> (StepResult, StepContext<SetNodeColor>) {
        match dispatch {
            Dispatch::Suspended { request, context } => (request, context),
            Dispatch::Finished(c) => panic!("expected suspension, got {:?}", c.result),
        }
    }

    #[test]
    fn preload_applies_in_one_transaction() -> anyhow::Result<()> {
        let mut session = Session::new(sample_model());
        let cx = SetNodeColor.preloaded_context(ColorPreload {
            nodes: vec![NodeId::new("a"), NodeId::new("b")],
            color: "green".to_string(),
            rgb: None,
        });

        let outcome = advance(&mut session, &SetNodeColor, cx, None)?;

        assert_eq!(outcome.result(), &StepResult::Done);
        assert_eq!(color_of(&session, "a").as_deref(), Some("green"));
        assert_eq!(color_of(&session, "b").as_deref(), Some("green"));
        assert_eq!(session.history().len(), 1);
        Ok(())
    }

    #[test]
    fn new_color_is_defined_in_the_same_transaction() -> anyhow::Result<()> {
        let mut session = Session::new(sample_model());
        let cx = SetNodeColor.preloaded_context(ColorPreload {
            nodes: vec![NodeId::new("d")],
            color: "teal".to_string(),
            rgb: Some(Rgb::new(0, 128, 128)),
        });

        advance(&mut session, &SetNodeColor, cx, None)?;

        assert_eq!(
            session.model().palette_color("teal"),
            Some(&Rgb::new(0, 128, 128))
        );
        assert_eq!(color_of(&session, "d").as_deref(), Some("teal"));
        assert_eq!(session.history().peek_undo().map(|e| e.records.len()), Some(2));
        Ok(())
    }

    #[test]
    fn apply_button_shows_dialog_again() -> anyhow::Result<()> {
        let mut session = Session::new(sample_model());
        let cx = SetNodeColor.initial_context(&Selection::of_nodes(["a"]), session.model())?;
        let (_, cx) = suspended(advance(&mut session, &SetNodeColor, cx, None)?);

        let answer = Answer::Dialog(
            DialogValues::new()
                .with("color", "red")
                .with("apply", true),
        );
        let (request, cx) = suspended(advance(&mut session, &SetNodeColor, cx, Some(answer))?);

        assert!(matches!(request, StepResult::NeedDialog(_)));
        assert_eq!(color_of(&session, "a").as_deref(), Some("red"));
        assert_eq!(cx.committed().len(), 1);
        assert!(!cx.has_open_transaction());
        Ok(())
    }

    #[test]
    fn closing_after_apply_keeps_applied_color() -> anyhow::Result<()> {
        let mut session = Session::new(sample_model());
        let cx = SetNodeColor.initial_context(&Selection::of_nodes(["b"]), session.model())?;
        let (_, cx) = suspended(advance(&mut session, &SetNodeColor, cx, None)?);
        let answer = Answer::Dialog(
            DialogValues::new()
                .with("color", "green")
                .with("apply", true),
        );
        let (_, cx) = suspended(advance(&mut session, &SetNodeColor, cx, Some(answer))?);

        let outcome = advance(&mut session, &SetNodeColor, cx, Some(Answer::NoResults))?;

        let Dispatch::Finished(completion) = outcome else {
            panic!("expected the operation to finish");
        };
        assert_eq!(completion.result, StepResult::Cancelled);
        assert_eq!(completion.committed.len(), 1);
        assert_eq!(color_of(&session, "b").as_deref(), Some("green"));
        Ok(())
    }

    #[test]
    fn unknown_color_is_an_error_result() -> anyhow::Result<()> {
        let mut session = Session::new(sample_model());
        let cx = SetNodeColor.preloaded_context(ColorPreload {
            nodes: vec![NodeId::new("a")],
            color: "mauve".to_string(),
            rgb: None,
        });

        let outcome = advance(&mut session, &SetNodeColor, cx, None)?;

        assert_eq!(
            outcome.result(),
            &StepResult::Error("color 'mauve' is not in the palette".to_string())
        );
        assert!(session.history().is_empty());
        Ok(())
    }

    #[test]
    fn blank_color_in_dialog_is_an_error_result() -> anyhow::Result<()> {
        let mut session = Session::new(sample_model());
        let cx = SetNodeColor.initial_context(&Selection::of_nodes(["a"]), session.model())?;
        let (_, cx) = suspended(advance(&mut session, &SetNodeColor, cx, None)?);

        let answer = Answer::Dialog(DialogValues::new().with("color", " "));
        let outcome = advance(&mut session, &SetNodeColor, cx, Some(answer))?;

        assert_eq!(
            outcome.result(),
            &StepResult::Error("no color was chosen".to_string())
        );
        Ok(())
    }
}
