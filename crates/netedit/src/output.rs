use std::fmt::Write as _;

use netedit_core::Model;
use netedit_engine::{Completion, OperationCatalog, Selection};
use netedit_journal::UndoStack;

pub(crate) fn format_catalog(catalog: &OperationCatalog, selection: &Selection, model: &Model) -> String {
    let mut output = String::new();
    let width = catalog.names().iter().map(|n| n.len()).max().unwrap_or(0);
    for descriptor in catalog.iter() {
        let marker = if descriptor.is_valid(selection, model) {
            "✓"
        } else {
            " "
        };
        let _ = writeln!(
            output,
            "{marker} {:<width$}  {}",
            descriptor.name(),
            descriptor.description()
        );
    }
    output
}

pub(crate) fn format_completion(index: usize, completion: &Completion, show_trace: bool) -> String {
    let mut output = format!(
        "[{index}] {}: {}\n",
        completion.operation, completion.result
    );
    for receipt in &completion.committed {
        let _ = writeln!(
            output,
            "    committed {} {} ({} records)",
            receipt.id, receipt.label, receipt.records
        );
    }
    if let Some(discarded) = completion.discarded.as_ref().filter(|t| !t.is_empty()) {
        let _ = writeln!(
            output,
            "    discarded {} ({} records)",
            discarded.label(),
            discarded.len()
        );
    }
    if show_trace {
        for line in completion.trace.summary().lines() {
            let _ = writeln!(output, "    {line}");
        }
    }
    output
}

pub(crate) fn format_history(history: &UndoStack) -> String {
    let mut output = String::from("Undo stack:\n");
    if history.is_empty() {
        output.push_str("  (empty)\n");
    }
    for entry in history.iter() {
        let _ = writeln!(output, "  {} {}", entry.id, entry.label);
    }
    if history.can_redo() {
        let _ = writeln!(output, "Redo available: {}", history.redo_len());
    }
    output
}
