use netedit_core::ModelError;
use netedit_journal::JournalError;
use thiserror::Error;

/// Misuse of the engine by an operation or its caller.
///
/// These are bugs in an operation, not user-facing failures, and are
/// returned to the caller instead of being folded into a step result.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum EngineError {
    #[error("step '{step}' of '{operation}' recorded a change with no open transaction")]
    NoOpenTransaction {
        operation: &'static str,
        step: &'static str,
    },

    #[error("step '{step}' of '{operation}' finished a transaction that was never opened")]
    FinishWithoutTransaction {
        operation: &'static str,
        step: &'static str,
    },

    #[error(
        "step '{step}' of '{operation}' opened a transaction while '{open}' is still open"
    )]
    TransactionAlreadyOpen {
        operation: &'static str,
        step: &'static str,
        open: String,
    },

    #[error(
        "step '{step}' of '{operation}' ended with '{result}' but transaction '{label}' was never finished"
    )]
    UnfinishedTransaction {
        operation: &'static str,
        step: &'static str,
        result: &'static str,
        label: String,
    },

    #[error("'{operation}' ran more than {limit} steps without stopping (last step '{step}')")]
    RunawayStepChain {
        operation: &'static str,
        step: &'static str,
        limit: usize,
    },

    #[error("step '{step}' of '{operation}' expected a {expected} answer, got {got}")]
    UnexpectedAnswer {
        operation: &'static str,
        step: &'static str,
        expected: &'static str,
        got: &'static str,
    },

    #[error("'{operation}' does not apply to the current selection")]
    NotApplicable { operation: &'static str },

    #[error("operation '{0}' is already registered")]
    DuplicateOperation(&'static str),

    #[error("unknown operation '{0}'")]
    UnknownOperation(String),
}

/// Anything a step can fail with.
///
/// Model and journal failures end the operation with
/// [`StepResult::Error`](crate::StepResult::Error); engine errors are passed
/// through to the caller.
#[derive(Debug, Error)]
pub enum StepError {
    #[error(transparent)]
    Model(#[from] ModelError),

    #[error(transparent)]
    Journal(#[from] JournalError),

    #[error(transparent)]
    Engine(#[from] EngineError),
}

pub type Result<T> = std::result::Result<T, EngineError>;

#[cfg(test)]
mod tests {
    use netedit_core::NodeId;

    use super::*;

    #[test]
    fn unexpected_answer_names_step_and_kinds() {
        let err = EngineError::UnexpectedAnswer {
            operation: "rename-node",
            step: "collect-name",
            expected: "dialog",
            got: "click",
        };

        assert_eq!(
            err.to_string(),
            "step 'collect-name' of 'rename-node' expected a dialog answer, got click"
        );
    }

    #[test]
    fn step_error_is_transparent() {
        let err = StepError::from(ModelError::UnknownNode(NodeId::new("x")));

        assert_eq!(
            err.to_string(),
            ModelError::UnknownNode(NodeId::new("x")).to_string()
        );
    }

    #[test]
    fn runaway_chain_mentions_limit() {
        let err = EngineError::RunawayStepChain {
            operation: "loop",
            step: "again",
            limit: 8,
        };

        assert!(err.to_string().contains("more than 8 steps"));
    }
}
