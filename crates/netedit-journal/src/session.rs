use netedit_core::{ChangeRecord, Model, ModelError};
use tracing::{debug, error, info};

use crate::config::SessionConfig;
use crate::error::{JournalError, Result};
use crate::events::{ChangeObserver, EventBus};
use crate::staged::StagedView;
use crate::transaction::Transaction;
use crate::undo_stack::{CommitReceipt, UndoStack};

/// One editing session: the model, its undo history and its observers.
///
/// Created when a model is opened and dropped (or [`end`](Self::end)ed) when
/// it is closed. Operations receive it explicitly; nothing reaches it through
/// global state.
#[derive(Debug)]
pub struct Session {
    model: Model,
    history: UndoStack,
    bus: EventBus,
    config: SessionConfig,
}

impl Session {
    #[must_use]
    pub fn new(model: Model) -> Self {
        Self::with_config(model, SessionConfig::default())
    }

    #[must_use]
    pub fn with_config(model: Model, config: SessionConfig) -> Self {
        Self {
            model,
            history: UndoStack::new(config.undo_depth()),
            bus: EventBus::new(),
            config,
        }
    }

    #[must_use]
    pub fn model(&self) -> &Model {
        &self.model
    }

    #[must_use]
    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    #[must_use]
    pub fn history(&self) -> &UndoStack {
        &self.history
    }

    /// The committed model overlaid with `transaction`, if one is open.
    #[must_use]
    pub fn staged<'a>(&'a self, transaction: Option<&'a Transaction>) -> StagedView<'a> {
        match transaction {
            Some(txn) => txn.view(&self.model),
            None => StagedView::committed(&self.model),
        }
    }

    pub fn subscribe(&mut self, observer: Box<dyn ChangeObserver>) {
        self.bus.subscribe(observer);
    }

    /// Commit a transaction: apply its records in order, push it as one undo
    /// entry, then notify observers.
    ///
    /// A transaction without records changes nothing and leaves no undo entry;
    /// `Ok(None)` is returned for it.
    ///
    /// # Errors
    ///
    /// Returns `JournalError::CommitFailed` if a record does not match the
    /// model. Records applied before the failing one are rolled back, so the
    /// model is unchanged and no observer is notified.
    pub fn commit(&mut self, transaction: Transaction) -> Result<Option<CommitReceipt>> {
        let (label, records, events) = transaction.into_parts();
        if records.is_empty() {
            debug!(label = %label, "discarding empty transaction");
            return Ok(None);
        }

        if let Err(source) = apply_all(&mut self.model, &records) {
            return Err(JournalError::CommitFailed { label, source });
        }

        self.bus.dispatch(&events, &self.model);
        let receipt = self.history.push_new(label, records, events);
        info!(
            id = %receipt.id,
            label = %receipt.label,
            records = receipt.records,
            "committed transaction"
        );
        Ok(Some(receipt))
    }

    /// Revert the most recent committed transaction.
    ///
    /// Returns `Ok(None)` when there is nothing to undo.
    ///
    /// # Errors
    ///
    /// Returns `JournalError::UndoFailed` if the model no longer matches the
    /// entry; the model and the history are left as they were.
    pub fn undo(&mut self) -> Result<Option<CommitReceipt>> {
        let Some(entry) = self.history.pop_done() else {
            return Ok(None);
        };

        let inverse: Vec<ChangeRecord> = entry
            .records
            .iter()
            .rev()
            .map(ChangeRecord::inverted)
            .collect();
        if let Err(source) = apply_all(&mut self.model, &inverse) {
            let label = entry.label.clone();
            self.history.restore_done(entry);
            return Err(JournalError::UndoFailed { label, source });
        }

        self.bus.dispatch(&entry.events, &self.model);
        let receipt = entry.receipt();
        info!(id = %receipt.id, label = %receipt.label, "undid transaction");
        self.history.restore_undone(entry);
        Ok(Some(receipt))
    }

    /// Reapply the most recently undone transaction.
    ///
    /// Returns `Ok(None)` when there is nothing to redo.
    ///
    /// # Errors
    ///
    /// Returns `JournalError::RedoFailed` if the model no longer matches the
    /// entry; the model and the history are left as they were.
    pub fn redo(&mut self) -> Result<Option<CommitReceipt>> {
        let Some(entry) = self.history.pop_undone() else {
            return Ok(None);
        };

        if let Err(source) = apply_all(&mut self.model, &entry.records) {
            let label = entry.label.clone();
            self.history.restore_undone(entry);
            return Err(JournalError::RedoFailed { label, source });
        }

        self.bus.dispatch(&entry.events, &self.model);
        let receipt = entry.receipt();
        info!(id = %receipt.id, label = %receipt.label, "redid transaction");
        self.history.restore_done(entry);
        Ok(Some(receipt))
    }

    pub fn clear_history(&mut self) {
        self.history.clear();
    }

    /// Close the session, dropping its history and observers.
    #[must_use]
    pub fn end(self) -> Model {
        self.model
    }
}

/// Apply records in order. On failure the applied prefix is reverted in
/// reverse order before the error is returned.
fn apply_all(model: &mut Model, records: &[ChangeRecord]) -> std::result::Result<(), ModelError> {
    for (index, record) in records.iter().enumerate() {
        if let Err(err) = model.apply(record) {
            roll_back(model, &records[..index]);
            return Err(err);
        }
    }
    Ok(())
}

fn roll_back(model: &mut Model, applied: &[ChangeRecord]) {
    for record in applied.iter().rev() {
        if let Err(err) = model.apply(&record.inverted()) {
            error!(entity = %record.entity(), error = %err, "rollback of applied record failed");
        }
    }
}
