use std::sync::Arc;

use netedit_journal::Session;

use crate::context::StepContext;
use crate::dispatch::{Completion, Dispatch, abandon, advance};
use crate::error::Result;
use crate::operation::{Descriptor, Operation, StepId};
use crate::result::{Answer, StepResult};

/// A suspended invocation whose operation type has been erased, so a driver
/// can hold any operation while it waits for the user.
pub trait PendingOperation {
    fn operation(&self) -> &'static str;

    /// Name of the step that runs when the invocation is resumed.
    fn next_step(&self) -> &'static str;

    /// What the invocation is waiting for.
    fn request(&self) -> &StepResult;

    /// Resume with `answer`.
    ///
    /// # Errors
    ///
    /// Returns an `EngineError` if the operation misuses the engine.
    fn resume(self: Box<Self>, session: &mut Session, answer: Option<Answer>) -> Result<Progress>;

    /// Give up on the invocation, discarding its open transaction.
    fn abandon(self: Box<Self>) -> Completion;
}

/// Where a type-erased invocation stands.
pub enum Progress {
    Suspended(Box<dyn PendingOperation>),
    Finished(Completion),
}

impl Progress {
    #[must_use]
    pub fn result(&self) -> &StepResult {
        match self {
            Self::Suspended(pending) => pending.request(),
            Self::Finished(completion) => &completion.result,
        }
    }
}

impl std::fmt::Debug for Progress {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Suspended(pending) => f
                .debug_struct("Suspended")
                .field("operation", &pending.operation())
                .field("next_step", &pending.next_step())
                .field("request", pending.request())
                .finish(),
            Self::Finished(completion) => f.debug_tuple("Finished").field(completion).finish(),
        }
    }
}

struct Pending<O: Operation> {
    operation: Arc<O>,
    context: StepContext<O>,
    request: StepResult,
}

impl<O: Operation + 'static> PendingOperation for Pending<O> {
    fn operation(&self) -> &'static str {
        self.operation.name()
    }

    fn next_step(&self) -> &'static str {
        self.context.next_step().name()
    }

    fn request(&self) -> &StepResult {
        &self.request
    }

    fn resume(self: Box<Self>, session: &mut Session, answer: Option<Answer>) -> Result<Progress> {
        let Pending {
            operation, context, ..
        } = *self;
        drive(operation, context, session, answer)
    }

    fn abandon(self: Box<Self>) -> Completion {
        abandon(self.context)
    }
}

/// Run a fresh invocation until it first suspends or ends.
///
/// # Errors
///
/// Returns an `EngineError` if the operation misuses the engine.
pub fn start<O: Operation + 'static>(
    operation: Arc<O>,
    context: StepContext<O>,
    session: &mut Session,
) -> Result<Progress> {
    drive(operation, context, session, None)
}

fn drive<O: Operation + 'static>(
    operation: Arc<O>,
    context: StepContext<O>,
    session: &mut Session,
    answer: Option<Answer>,
) -> Result<Progress> {
    match advance(session, operation.as_ref(), context, answer)? {
        Dispatch::Suspended { request, context } => Ok(Progress::Suspended(Box::new(Pending {
            operation,
            context,
            request,
        }))),
        Dispatch::Finished(completion) => Ok(Progress::Finished(completion)),
    }
}

#[cfg(test)]
mod tests {
    use netedit_core::{Model, ModelRead, NodeId, NodeType, edits};

    use super::*;
    use crate::error::StepError;
    use crate::operation::Selection;
    use crate::result::{DialogRequest, Reply};

    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    enum Step {
        Ask,
        Apply,
    }

    impl StepId for Step {
        fn name(&self) -> &'static str {
            match self {
                Self::Ask => "ask",
                Self::Apply => "apply",
            }
        }
    }

    #[derive(Debug, Clone, PartialEq, Default)]
    struct State {
        name: Option<String>,
    }

    #[derive(Debug)]
    struct RenameA;

    impl Descriptor for RenameA {
        fn name(&self) -> &'static str {
            "rename-a"
        }

        fn description(&self) -> &'static str {
            "rename node a"
        }

        fn is_valid(&self, _selection: &Selection, _model: &Model) -> bool {
            true
        }
    }

    impl Operation for RenameA {
        type Step = Step;
        type State = State;
        type Preload = ();

        fn first_step(&self) -> Step {
            Step::Ask
        }

        fn bind_selection(&self, _selection: &Selection, _model: &Model) -> Option<State> {
            Some(State::default())
        }

        fn bind_preload(&self, (): ()) -> State {
            State::default()
        }

        fn run_step(
            &self,
            step: Step,
            cx: &mut StepContext<Self>,
            session: &mut Session,
        ) -> std::result::Result<StepResult, StepError> {
            match step {
                Step::Ask => match cx.take_dialog()? {
                    None => Ok(StepResult::NeedDialog(
                        DialogRequest::new("rename", "Rename").field("name", ""),
                    )),
                    Some(Reply::NoResults) => Ok(StepResult::Cancelled),
                    Some(Reply::Given(values)) => {
                        cx.state_mut().name = values.text("name").map(str::to_string);
                        cx.set_next(Step::Apply);
                        Ok(StepResult::Continue)
                    }
                },
                Step::Apply => {
                    let name = cx.state().name.clone().unwrap_or_default();
                    cx.open_transaction("Rename a")?;
                    let record = edits::rename_node(&cx.view(session), &NodeId::new("a"), &name)?;
                    cx.record(record)?;
                    cx.finish(session)?;
                    Ok(StepResult::Done)
                }
            }
        }
    }

    fn session() -> Session {
        Session::new(Model::new().with_node("a", "A", NodeType::Gene))
    }

    #[test]
    fn pending_operation_resumes_without_knowing_its_type() -> anyhow::Result<()> {
        let mut session = session();
        let op = Arc::new(RenameA);
        let cx = op.preloaded_context(());

        let Progress::Suspended(pending) = start(op, cx, &mut session)? else {
            panic!("expected suspension");
        };
        assert_eq!(pending.operation(), "rename-a");
        assert_eq!(pending.next_step(), "ask");
        assert!(matches!(pending.request(), StepResult::NeedDialog(_)));

        let answer = Answer::Dialog(crate::DialogValues::new().with("name", "Alpha"));
        let progress = pending.resume(&mut session, Some(answer))?;

        assert_eq!(progress.result(), &StepResult::Done);
        assert_eq!(
            session.model().node(&NodeId::new("a")).map(|n| n.name.as_str()),
            Some("Alpha")
        );
        Ok(())
    }

    #[test]
    fn abandoning_leaves_model_alone() -> anyhow::Result<()> {
        let mut session = session();
        let original = session.model().clone();
        let op = Arc::new(RenameA);
        let cx = op.preloaded_context(());

        let Progress::Suspended(pending) = start(op, cx, &mut session)? else {
            panic!("expected suspension");
        };
        let completion = pending.abandon();

        assert_eq!(completion.result, StepResult::Cancelled);
        assert_eq!(session.model(), &original);
        Ok(())
    }
}
