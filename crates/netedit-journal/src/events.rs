use std::fmt;

use netedit_core::{Model, NodeId};

/// Declarative description of what observers must refresh after a commit.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
#[non_exhaustive]
pub enum NotificationEvent {
    /// The genome structure changed (nodes or links added, removed, rewired).
    ModelChanged,
    /// Properties of a single node changed.
    NodeChanged(NodeId),
    /// Positions, colors or region membership changed.
    LayoutChanged,
    PaletteChanged,
    /// The current selection may refer to entities that no longer exist.
    SelectionInvalidated,
}

impl fmt::Display for NotificationEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ModelChanged => write!(f, "model changed"),
            Self::NodeChanged(id) => write!(f, "node '{id}' changed"),
            Self::LayoutChanged => write!(f, "layout changed"),
            Self::PaletteChanged => write!(f, "palette changed"),
            Self::SelectionInvalidated => write!(f, "selection invalidated"),
        }
    }
}

/// Subscriber to committed changes.
///
/// `notify` is called once per event, after every record of the transaction
/// has been applied to `model`.
pub trait ChangeObserver {
    fn notify(&self, event: &NotificationEvent, model: &Model);
}

#[derive(Default)]
pub struct EventBus {
    observers: Vec<Box<dyn ChangeObserver>>,
}

impl EventBus {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn subscribe(&mut self, observer: Box<dyn ChangeObserver>) {
        self.observers.push(observer);
    }

    #[must_use]
    pub fn observer_count(&self) -> usize {
        self.observers.len()
    }

    pub(crate) fn dispatch(&self, events: &[NotificationEvent], model: &Model) {
        for event in events {
            for observer in &self.observers {
                observer.notify(event, model);
            }
        }
    }
}

impl fmt::Debug for EventBus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventBus")
            .field("observers", &self.observers.len())
            .finish()
    }
}
