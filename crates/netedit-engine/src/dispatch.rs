use std::error::Error as _;

use netedit_journal::{CommitReceipt, Session, Transaction};
use tracing::{debug, error, info, warn};

use crate::context::StepContext;
use crate::error::{EngineError, StepError};
use crate::operation::{Descriptor, Operation, StepId};
use crate::result::{Answer, StepResult};
use crate::trace::StepTrace;

/// Where an operation stands after [`advance`] returns.
#[derive(Debug)]
pub enum Dispatch<O: Operation> {
    /// Waiting for a dialog, click or confirmation. Resume by passing
    /// `context` back to [`advance`] with the answer.
    Suspended {
        request: StepResult,
        context: StepContext<O>,
    },
    Finished(Completion),
}

impl<O: Operation> Dispatch<O> {
    #[must_use]
    pub fn result(&self) -> &StepResult {
        match self {
            Self::Suspended { request, .. } => request,
            Self::Finished(completion) => &completion.result,
        }
    }

    #[must_use]
    pub fn is_finished(&self) -> bool {
        matches!(self, Self::Finished(_))
    }
}

/// The end of one invocation.
#[derive(Debug, Clone)]
pub struct Completion {
    pub operation: &'static str,
    pub result: StepResult,
    /// Transactions the invocation committed, in order.
    pub committed: Vec<CommitReceipt>,
    /// A transaction that was still open when the invocation ended. It never
    /// reached the model.
    pub discarded: Option<Transaction>,
    pub trace: StepTrace,
}

impl Completion {
    /// Whether the invocation changed the model.
    #[must_use]
    pub fn changed_model(&self) -> bool {
        !self.committed.is_empty()
    }
}

/// Run an operation until it suspends or ends.
///
/// `answer`, if given, is what the previous suspension asked for. Steps run
/// one after another for as long as they return `Continue`. An answer no
/// step consumed is dropped before returning.
///
/// A model or journal error raised by a step ends the invocation with
/// `StepResult::Error`; its open transaction is discarded and the model is
/// left as the last finished transaction left it.
///
/// # Errors
///
/// Returns an `EngineError` when the operation misuses the engine: recording
/// without a transaction, reading the wrong kind of answer, ending
/// successfully with an unfinished transaction, or returning `Continue` more
/// than the session's `max-continue-steps` times in a row.
pub fn advance<O: Operation>(
    session: &mut Session,
    operation: &O,
    mut cx: StepContext<O>,
    answer: Option<Answer>,
) -> Result<Dispatch<O>, EngineError> {
    if let Some(answer) = answer {
        cx.attach_answer(answer);
    }
    let limit = session.config().max_continue_steps();
    let mut continues = 0_usize;

    let result = loop {
        let step = cx.begin_step();
        let result = match operation.run_step(step, &mut cx, session) {
            Ok(result) => result,
            Err(StepError::Engine(err)) => {
                cx.trace_mut().record_failure();
                error!(
                    operation = operation.name(),
                    step = step.name(),
                    error = %err,
                    "operation misused the engine"
                );
                return Err(err);
            }
            Err(err) => {
                let message = error_message(&err);
                warn!(
                    operation = operation.name(),
                    step = step.name(),
                    error = %message,
                    "step failed"
                );
                StepResult::Error(message)
            }
        };
        cx.trace_mut().record_result(&result);
        debug!(
            operation = operation.name(),
            step = step.name(),
            result = result.label(),
            "ran step"
        );

        if !result.is_continue() {
            break result;
        }
        continues += 1;
        if continues > limit {
            return Err(EngineError::RunawayStepChain {
                operation: operation.name(),
                step: step.name(),
                limit,
            });
        }
    };

    cx.clear_unread_answer();
    if result.is_suspension() {
        return Ok(Dispatch::Suspended {
            request: result,
            context: cx,
        });
    }
    complete(cx, result).map(Dispatch::Finished)
}

/// End a suspended invocation without resuming it, as when the user closes
/// the dialog it was waiting on. Its open transaction is discarded.
#[must_use]
pub fn abandon<O: Operation>(mut cx: StepContext<O>) -> Completion {
    let discarded = cx.take_transaction();
    info!(operation = cx.operation(), "abandoned operation");
    let operation = cx.operation();
    let (committed, trace) = cx.into_outcome();
    Completion {
        operation,
        result: StepResult::Cancelled,
        committed,
        discarded,
        trace,
    }
}

fn complete<O: Operation>(
    mut cx: StepContext<O>,
    result: StepResult,
) -> Result<Completion, EngineError> {
    if result.is_success()
        && let Some(txn) = cx.transaction()
        && !txn.is_empty()
    {
        return Err(EngineError::UnfinishedTransaction {
            operation: cx.operation(),
            step: cx.current_step().name(),
            result: result.label(),
            label: txn.label().to_string(),
        });
    }

    let discarded = cx.take_transaction();
    if let Some(txn) = &discarded
        && !txn.is_empty()
    {
        info!(
            operation = cx.operation(),
            label = %txn.label(),
            records = txn.len(),
            "discarded unfinished transaction"
        );
    }

    let operation = cx.operation();
    debug!(operation, result = result.label(), "operation finished");
    let (committed, trace) = cx.into_outcome();
    Ok(Completion {
        operation,
        result,
        committed,
        discarded,
        trace,
    })
}

/// The error and its sources, joined for display to the user.
fn error_message(err: &StepError) -> String {
    let mut message = err.to_string();
    let mut source = err.source();
    while let Some(cause) = source {
        let text = cause.to_string();
        if !message.contains(&text) {
            message.push_str(": ");
            message.push_str(&text);
        }
        source = cause.source();
    }
    message
}
