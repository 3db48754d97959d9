use std::fmt;

use netedit_core::{ChangeRecord, Model};
use netedit_journal::{CommitReceipt, NotificationEvent, Session, StagedView, Transaction};
use tracing::debug;

use crate::error::{EngineError, StepError};
use crate::operation::{Operation, Selection, StepId};
use crate::result::{Answer, Click, DialogValues, Reply};
use crate::trace::StepTrace;

/// Everything one invocation of an operation carries between steps.
///
/// The context is the only place an invocation keeps state. Its open
/// transaction holds change records that have not reached the model yet, so
/// dropping a suspended context cancels the invocation with no effect on the
/// session.
pub struct StepContext<O: Operation> {
    operation: &'static str,
    next_step: O::Step,
    current_step: O::Step,
    state: O::State,
    pending_answer: Option<Answer>,
    transaction: Option<Transaction>,
    committed: Vec<CommitReceipt>,
    trace: StepTrace,
}

impl<O: Operation> StepContext<O> {
    pub(crate) fn new(operation: &O, state: O::State) -> Self {
        let first = operation.first_step();
        Self {
            operation: operation.name(),
            next_step: first,
            current_step: first,
            state,
            pending_answer: None,
            transaction: None,
            committed: Vec::new(),
            trace: StepTrace::new(),
        }
    }

    /// Bind an interactive selection.
    ///
    /// # Errors
    ///
    /// Returns `EngineError::NotApplicable` if the operation does not apply
    /// to `selection`.
    pub fn interactive(
        operation: &O,
        selection: &Selection,
        model: &Model,
    ) -> Result<Self, EngineError> {
        let not_applicable = || EngineError::NotApplicable {
            operation: operation.name(),
        };
        if !operation.is_valid(selection, model) {
            return Err(not_applicable());
        }
        let state = operation
            .bind_selection(selection, model)
            .ok_or_else(not_applicable)?;
        Ok(Self::new(operation, state))
    }

    pub fn preloaded(operation: &O, preload: O::Preload) -> Self {
        let state = operation.bind_preload(preload);
        Self::new(operation, state)
    }

    #[must_use]
    pub fn operation(&self) -> &'static str {
        self.operation
    }

    #[must_use]
    pub fn next_step(&self) -> O::Step {
        self.next_step
    }

    /// Choose the step the dispatch loop runs next.
    pub fn set_next(&mut self, step: O::Step) {
        self.next_step = step;
    }

    #[must_use]
    pub fn state(&self) -> &O::State {
        &self.state
    }

    pub fn state_mut(&mut self) -> &mut O::State {
        &mut self.state
    }

    #[must_use]
    pub fn pending_answer(&self) -> Option<&Answer> {
        self.pending_answer.as_ref()
    }

    #[must_use]
    pub fn transaction(&self) -> Option<&Transaction> {
        self.transaction.as_ref()
    }

    #[must_use]
    pub fn has_open_transaction(&self) -> bool {
        self.transaction.is_some()
    }

    /// Transactions this invocation has committed so far.
    #[must_use]
    pub fn committed(&self) -> &[CommitReceipt] {
        &self.committed
    }

    #[must_use]
    pub fn trace(&self) -> &StepTrace {
        &self.trace
    }

    pub fn take_answer(&mut self) -> Option<Answer> {
        self.pending_answer.take()
    }

    /// Take a pending yes/no answer. Dismissing the prompt reads as "no".
    ///
    /// # Errors
    ///
    /// Returns `EngineError::UnexpectedAnswer` for any other kind of answer.
    pub fn take_confirmation(&mut self) -> Result<Option<bool>, EngineError> {
        match self.pending_answer.take() {
            None => Ok(None),
            Some(Answer::Confirm(yes)) => Ok(Some(yes)),
            Some(Answer::NoResults) => Ok(Some(false)),
            Some(other) => Err(self.unexpected("confirm", &other)),
        }
    }

    /// Take pending dialog values.
    ///
    /// # Errors
    ///
    /// Returns `EngineError::UnexpectedAnswer` for any other kind of answer.
    pub fn take_dialog(&mut self) -> Result<Option<Reply<DialogValues>>, EngineError> {
        match self.pending_answer.take() {
            None => Ok(None),
            Some(Answer::Dialog(values)) => Ok(Some(Reply::Given(values))),
            Some(Answer::NoResults) => Ok(Some(Reply::NoResults)),
            Some(other) => Err(self.unexpected("dialog", &other)),
        }
    }

    /// Take a pending click.
    ///
    /// # Errors
    ///
    /// Returns `EngineError::UnexpectedAnswer` for any other kind of answer.
    pub fn take_click(&mut self) -> Result<Option<Reply<Click>>, EngineError> {
        match self.pending_answer.take() {
            None => Ok(None),
            Some(Answer::Click(click)) => Ok(Some(Reply::Given(click))),
            Some(Answer::NoResults) => Ok(Some(Reply::NoResults)),
            Some(other) => Err(self.unexpected("click", &other)),
        }
    }

    fn unexpected(&self, expected: &'static str, got: &Answer) -> EngineError {
        EngineError::UnexpectedAnswer {
            operation: self.operation,
            step: self.current_step.name(),
            expected,
            got: got.label(),
        }
    }

    /// Open a new transaction.
    ///
    /// # Errors
    ///
    /// Returns `EngineError::TransactionAlreadyOpen` if one is open already.
    pub fn open_transaction(&mut self, label: impl Into<String>) -> Result<(), EngineError> {
        if let Some(open) = &self.transaction {
            return Err(EngineError::TransactionAlreadyOpen {
                operation: self.operation,
                step: self.current_step.name(),
                open: open.label().to_string(),
            });
        }
        self.transaction = Some(Transaction::open(label));
        Ok(())
    }

    /// Open a transaction unless one is open already.
    pub fn ensure_transaction(&mut self, label: impl Into<String>) {
        if self.transaction.is_none() {
            self.transaction = Some(Transaction::open(label));
        }
    }

    /// Append a change record to the open transaction. `None` records (edits
    /// that turned out to be no-ops) are skipped; the return value says
    /// whether anything was recorded.
    ///
    /// # Errors
    ///
    /// Returns `EngineError::NoOpenTransaction` if no transaction is open.
    pub fn record(&mut self, record: Option<ChangeRecord>) -> Result<bool, EngineError> {
        let txn = self.open_mut()?;
        match record {
            Some(record) => {
                txn.add_change(record);
                Ok(true)
            }
            None => Ok(false),
        }
    }

    /// Queue an event for delivery when the open transaction finishes.
    ///
    /// # Errors
    ///
    /// Returns `EngineError::NoOpenTransaction` if no transaction is open.
    pub fn notify(&mut self, event: NotificationEvent) -> Result<(), EngineError> {
        self.open_mut()?.add_event(event);
        Ok(())
    }

    fn open_mut(&mut self) -> Result<&mut Transaction, EngineError> {
        let operation = self.operation;
        let step = self.current_step.name();
        self.transaction
            .as_mut()
            .ok_or(EngineError::NoOpenTransaction { operation, step })
    }

    /// The session's model as it will look once the open transaction
    /// finishes.
    #[must_use]
    pub fn view<'a>(&'a self, session: &'a Session) -> StagedView<'a> {
        session.staged(self.transaction.as_ref())
    }

    /// Commit the open transaction to the session.
    ///
    /// Returns `Ok(None)` if the transaction held no records; nothing is
    /// pushed on the undo stack in that case.
    ///
    /// # Errors
    ///
    /// Returns `StepError::Engine` if no transaction is open, and
    /// `StepError::Journal` if a record no longer matches the model.
    pub fn finish(&mut self, session: &mut Session) -> Result<Option<CommitReceipt>, StepError> {
        let Some(txn) = self.transaction.take() else {
            return Err(EngineError::FinishWithoutTransaction {
                operation: self.operation,
                step: self.current_step.name(),
            }
            .into());
        };
        let receipt = session.commit(txn)?;
        if let Some(receipt) = &receipt {
            self.committed.push(receipt.clone());
        }
        Ok(receipt)
    }

    pub(crate) fn attach_answer(&mut self, answer: Answer) {
        self.pending_answer = Some(answer);
    }

    pub(crate) fn clear_unread_answer(&mut self) {
        if let Some(answer) = self.pending_answer.take() {
            debug!(
                operation = self.operation,
                step = self.current_step.name(),
                answer = answer.label(),
                "dropping unread answer"
            );
        }
    }

    /// Mark `next_step` as running and return it.
    pub(crate) fn begin_step(&mut self) -> O::Step {
        self.current_step = self.next_step;
        self.trace.record_start(self.current_step.name());
        self.current_step
    }

    pub(crate) fn current_step(&self) -> O::Step {
        self.current_step
    }

    pub(crate) fn trace_mut(&mut self) -> &mut StepTrace {
        &mut self.trace
    }

    pub(crate) fn take_transaction(&mut self) -> Option<Transaction> {
        self.transaction.take()
    }

    pub(crate) fn into_outcome(self) -> (Vec<CommitReceipt>, StepTrace) {
        (self.committed, self.trace)
    }
}

impl<O: Operation> Clone for StepContext<O> {
    fn clone(&self) -> Self {
        Self {
            operation: self.operation,
            next_step: self.next_step,
            current_step: self.current_step,
            state: self.state.clone(),
            pending_answer: self.pending_answer.clone(),
            transaction: self.transaction.clone(),
            committed: self.committed.clone(),
            trace: self.trace.clone(),
        }
    }
}

impl<O: Operation> fmt::Debug for StepContext<O> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StepContext")
            .field("operation", &self.operation)
            .field("next_step", &self.next_step)
            .field("state", &self.state)
            .field("pending_answer", &self.pending_answer)
            .field("transaction", &self.transaction)
            .field("committed", &self.committed)
            .finish_non_exhaustive()
    }
}
