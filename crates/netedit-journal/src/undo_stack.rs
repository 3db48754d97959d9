use std::collections::VecDeque;
use std::fmt;

use netedit_core::ChangeRecord;

use crate::events::NotificationEvent;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TransactionId(u64);

impl fmt::Display for TransactionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// A committed transaction: one undo/redo unit.
#[derive(Debug, Clone, PartialEq)]
pub struct CommittedTransaction {
    pub id: TransactionId,
    pub label: String,
    pub records: Vec<ChangeRecord>,
    pub events: Vec<NotificationEvent>,
}

impl CommittedTransaction {
    #[must_use]
    pub fn receipt(&self) -> CommitReceipt {
        CommitReceipt {
            id: self.id,
            label: self.label.clone(),
            records: self.records.len(),
        }
    }
}

/// Summary handed back when a transaction is committed, undone or redone.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommitReceipt {
    pub id: TransactionId,
    pub label: String,
    pub records: usize,
}

/// Undo and redo history of committed transactions.
#[derive(Debug)]
pub struct UndoStack {
    done: VecDeque<CommittedTransaction>,
    undone: Vec<CommittedTransaction>,
    max_depth: usize,
    next_id: u64,
}

impl UndoStack {
    #[must_use]
    pub fn new(max_depth: usize) -> Self {
        Self {
            done: VecDeque::new(),
            undone: Vec::new(),
            max_depth: max_depth.max(1),
            next_id: 1,
        }
    }

    /// Push a newly committed transaction. Clears the redo history and drops
    /// the oldest entry once `max_depth` is exceeded.
    pub(crate) fn push_new(
        &mut self,
        label: String,
        records: Vec<ChangeRecord>,
        events: Vec<NotificationEvent>,
    ) -> CommitReceipt {
        let entry = CommittedTransaction {
            id: TransactionId(self.next_id),
            label,
            records,
            events,
        };
        self.next_id += 1;
        let receipt = entry.receipt();
        self.undone.clear();
        self.done.push_back(entry);
        while self.done.len() > self.max_depth {
            self.done.pop_front();
        }
        receipt
    }

    pub(crate) fn pop_done(&mut self) -> Option<CommittedTransaction> {
        self.done.pop_back()
    }

    pub(crate) fn restore_done(&mut self, entry: CommittedTransaction) {
        self.done.push_back(entry);
    }

    pub(crate) fn pop_undone(&mut self) -> Option<CommittedTransaction> {
        self.undone.pop()
    }

    pub(crate) fn restore_undone(&mut self, entry: CommittedTransaction) {
        self.undone.push(entry);
    }

    #[must_use]
    pub fn can_undo(&self) -> bool {
        !self.done.is_empty()
    }

    #[must_use]
    pub fn can_redo(&self) -> bool {
        !self.undone.is_empty()
    }

    /// Number of entries that can be undone.
    #[must_use]
    pub fn len(&self) -> usize {
        self.done.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.done.is_empty()
    }

    #[must_use]
    pub fn redo_len(&self) -> usize {
        self.undone.len()
    }

    #[must_use]
    pub fn max_depth(&self) -> usize {
        self.max_depth
    }

    /// The entry the next undo would revert.
    #[must_use]
    pub fn peek_undo(&self) -> Option<&CommittedTransaction> {
        self.done.back()
    }

    #[must_use]
    pub fn peek_redo(&self) -> Option<&CommittedTransaction> {
        self.undone.last()
    }

    /// Labels of undoable entries, oldest first.
    #[must_use]
    pub fn labels(&self) -> Vec<&str> {
        self.done.iter().map(|e| e.label.as_str()).collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = &CommittedTransaction> {
        self.done.iter()
    }

    pub fn clear(&mut self) {
        self.done.clear();
        self.undone.clear();
    }
}
