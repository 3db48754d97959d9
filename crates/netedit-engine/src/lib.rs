//! Resumable step dispatch for multi-step edit operations.
//!
//! An [`Operation`] is a closed set of steps. [`advance`] runs them one after
//! another, carrying per-invocation state in a [`StepContext`], until a step
//! asks for user input or ends the operation. The caller resumes a suspended
//! invocation by passing its context back together with an [`Answer`].
//!
//! Edits go through the context's open transaction and reach the model only
//! when a step finishes that transaction, so an invocation that is cancelled
//! or fails leaves the session as it found it.

mod catalog;
mod context;
mod dispatch;
mod erased;
mod error;
mod operation;
mod result;
mod trace;

pub use catalog::OperationCatalog;
pub use context::StepContext;
pub use dispatch::{Completion, Dispatch, abandon, advance};
pub use erased::{PendingOperation, Progress, start};
pub use error::{EngineError, Result, StepError};
pub use operation::{Descriptor, Intersection, Operation, Selection, StepId};
pub use result::{
    Answer, Click, ClickMode, DialogRequest, DialogValues, FieldValue, Modifiers, Reply,
    StepResult,
};
pub use trace::{StepRecord, StepStatus, StepTrace};
