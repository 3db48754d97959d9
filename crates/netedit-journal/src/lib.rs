//! Undo transactions for netedit.
//!
//! Change records accumulate in an open [`Transaction`] without touching the
//! model. [`Session::commit`] applies them in order as one undo entry and then
//! notifies observers; a transaction that is dropped instead leaves no trace.
//! If a record fails to apply, the records applied before it are rolled back
//! in reverse order.

mod config;
mod error;
mod events;
mod session;
mod staged;
mod transaction;
mod undo_stack;

pub use config::SessionConfig;
pub use error::{JournalError, Result};
pub use events::{ChangeObserver, EventBus, NotificationEvent};
pub use session::Session;
pub use staged::StagedView;
pub use transaction::Transaction;
pub use undo_stack::{CommitReceipt, CommittedTransaction, TransactionId, UndoStack};
