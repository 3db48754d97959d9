//! Sample models and observers for tests and demos.

use std::cell::RefCell;
use std::rc::Rc;

use netedit_core::{LinkSign, Model, NodeType, Point, Rect, Rgb};
use netedit_journal::{ChangeObserver, NotificationEvent};

/// A small two-level network with layout, regions, a palette and one build
/// instruction.
///
/// | node | name  | type   | layout         |
/// |------|-------|--------|----------------|
/// | a    | Alpha | gene   | (5, 5) black   |
/// | b    | Beta  | gene   | (15, 5) black  |
/// | c    | Gamma | box    | (5, 15) red    |
/// | d    | Delta | bubble | (50, 50) black |
///
/// Regions: `left` (0,0)-(20,20), `right` (30,0)-(60,60) and `core`
/// (40,40)-(55,55) inside `right`. Build instruction `bi-1` mentions `a`
/// and `c`.
#[must_use]
pub fn sample_model() -> Model {
    plain_model().with_build_instruction("bi-1", &["a", "c"])
}

/// [`sample_model`] without build instructions, for runs that should not
/// be interrupted by warnings.
#[must_use]
pub fn plain_model() -> Model {
    Model::new()
        .with_node("a", "Alpha", NodeType::Gene)
        .with_node("b", "Beta", NodeType::Gene)
        .with_node("c", "Gamma", NodeType::Box)
        .with_node("d", "Delta", NodeType::Bubble)
        .with_link("l1", "a", "c", LinkSign::Positive)
        .with_link("l2", "c", "a", LinkSign::Negative)
        .with_link("l3", "b", "d", LinkSign::Positive)
        .with_link("l4", "d", "a", LinkSign::Neutral)
        .with_instance("root", None, &["a", "b", "c", "d"], &["l1", "l2", "l3", "l4"])
        .with_instance("left", Some("root"), &["a", "c"], &["l1", "l2"])
        .with_instance("right", Some("root"), &["b", "d", "a"], &["l3", "l4"])
        .with_node_props("a", Point::new(5.0, 5.0), "black")
        .with_node_props("b", Point::new(15.0, 5.0), "black")
        .with_node_props("c", Point::new(5.0, 15.0), "red")
        .with_node_props("d", Point::new(50.0, 50.0), "black")
        .with_region("left", Rect::new(0.0, 0.0, 20.0, 20.0))
        .with_region("right", Rect::new(30.0, 0.0, 60.0, 60.0))
        .with_region("core", Rect::new(40.0, 40.0, 55.0, 55.0))
        .with_palette_color("black", Rgb::new(0, 0, 0))
        .with_palette_color("red", Rgb::new(255, 0, 0))
        .with_palette_color("green", Rgb::new(0, 170, 0))
}

/// Observer that keeps every event it is sent. Clones share one log.
#[derive(Debug, Clone, Default)]
pub struct RecordingObserver {
    events: Rc<RefCell<Vec<NotificationEvent>>>,
}

impl RecordingObserver {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn events(&self) -> Vec<NotificationEvent> {
        self.events.borrow().clone()
    }

    pub fn clear(&self) {
        self.events.borrow_mut().clear();
    }
}

impl ChangeObserver for RecordingObserver {
    fn notify(&self, event: &NotificationEvent, _model: &Model) {
        self.events.borrow_mut().push(event.clone());
    }
}

#[cfg(test)]
mod tests {
    use netedit_core::ModelRead;

    use super::*;

    #[test]
    fn sample_model_is_valid() -> anyhow::Result<()> {
        let model = sample_model();

        model.validate()?;
        assert_eq!(model.node_count(), 4);
        assert_eq!(model.build_instructions().len(), 1);
        Ok(())
    }

    #[test]
    fn plain_model_has_no_build_instructions() {
        assert!(plain_model().build_instructions().is_empty());
    }

    #[test]
    fn recording_observer_clones_share_log() {
        let observer = RecordingObserver::new();
        let handle = observer.clone();

        observer.notify(&NotificationEvent::LayoutChanged, &Model::new());

        assert_eq!(handle.events(), vec![NotificationEvent::LayoutChanged]);
    }
}
