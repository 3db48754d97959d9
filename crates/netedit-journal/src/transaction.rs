use netedit_core::{ChangeRecord, Model};
use tracing::debug;

use crate::events::NotificationEvent;
use crate::staged::StagedView;

/// An open undo transaction.
///
/// Records and events accumulate here, outside the model, until the
/// transaction is handed to [`Session::commit`](crate::Session::commit).
/// Dropping an open transaction discards it with no effect on the model.
#[derive(Debug, Clone, PartialEq)]
pub struct Transaction {
    label: String,
    records: Vec<ChangeRecord>,
    events: Vec<NotificationEvent>,
}

impl Transaction {
    #[must_use]
    pub fn open(label: impl Into<String>) -> Self {
        let label = label.into();
        debug!(label = %label, "opened transaction");
        Self {
            label,
            records: Vec::new(),
            events: Vec::new(),
        }
    }

    #[must_use]
    pub fn label(&self) -> &str {
        &self.label
    }

    #[must_use]
    pub fn records(&self) -> &[ChangeRecord] {
        &self.records
    }

    #[must_use]
    pub fn events(&self) -> &[NotificationEvent] {
        &self.events
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn add_change(&mut self, record: ChangeRecord) {
        debug!(
            label = %self.label,
            entity = %record.entity(),
            kind = ?record.kind(),
            "recorded change"
        );
        self.records.push(record);
    }

    /// Queue an event for delivery on commit. Duplicates are delivered once.
    pub fn add_event(&mut self, event: NotificationEvent) {
        if !self.events.contains(&event) {
            self.events.push(event);
        }
    }

    /// The committed model as it will look once this transaction commits.
    #[must_use]
    pub fn view<'a>(&'a self, model: &'a Model) -> StagedView<'a> {
        StagedView::new(model, &self.records)
    }

    pub(crate) fn into_parts(self) -> (String, Vec<ChangeRecord>, Vec<NotificationEvent>) {
        (self.label, self.records, self.events)
    }
}

#[cfg(test)]
mod tests {
    use netedit_core::{ModelRead, NodeId, NodeType, edits};

    use super::*;

    #[test]
    fn open_transaction_is_empty() {
        let txn = Transaction::open("Rename node");

        assert!(txn.is_empty());
        assert_eq!(txn.len(), 0);
        assert_eq!(txn.label(), "Rename node");
    }

    #[test]
    fn add_event_ignores_duplicates() {
        let mut txn = Transaction::open("t");

        txn.add_event(NotificationEvent::ModelChanged);
        txn.add_event(NotificationEvent::LayoutChanged);
        txn.add_event(NotificationEvent::ModelChanged);

        assert_eq!(
            txn.events(),
            &[NotificationEvent::ModelChanged, NotificationEvent::LayoutChanged]
        );
    }

    #[test]
    fn view_shows_staged_records_without_touching_model() -> anyhow::Result<()> {
        let model = Model::new().with_node("a", "A", NodeType::Gene);
        let mut txn = Transaction::open("Rename node");
        let record = edits::rename_node(&model, &NodeId::new("a"), "Renamed")?.expect("changes");

        txn.add_change(record);

        let staged = txn.view(&model);
        assert_eq!(
            staged.node(&NodeId::new("a")).map(|n| n.name.as_str()),
            Some("Renamed")
        );
        assert_eq!(
            model.node(&NodeId::new("a")).map(|n| n.name.as_str()),
            Some("A")
        );
        Ok(())
    }
}
