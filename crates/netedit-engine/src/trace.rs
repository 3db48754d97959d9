use std::time::Instant;

use crate::result::StepResult;

/// How a step run ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[non_exhaustive]
pub enum StepStatus {
    /// The step is running.
    Running,
    /// The step returned `Continue`.
    Continued,
    /// The step asked for a dialog, click or confirmation.
    Suspended,
    /// The step ended the operation.
    Finished,
    /// The step reported an error.
    Failed,
}

/// One run of one step.
#[derive(Debug, Clone)]
pub struct StepRecord {
    pub name: &'static str,
    pub status: StepStatus,
    /// Label of the step's result, once it returned one.
    pub result: Option<&'static str>,
    pub started_at: Instant,
    pub completed_at: Option<Instant>,
}

/// Every step run of one operation, across all of its resumptions.
#[derive(Debug, Clone, Default)]
pub struct StepTrace {
    records: Vec<StepRecord>,
}

impl StepTrace {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn record_start(&mut self, name: &'static str) {
        self.records.push(StepRecord {
            name,
            status: StepStatus::Running,
            result: None,
            started_at: Instant::now(),
            completed_at: None,
        });
    }

    pub(crate) fn record_result(&mut self, result: &StepResult) {
        if let Some(record) = self.records.last_mut() {
            record.status = match result {
                StepResult::Continue => StepStatus::Continued,
                StepResult::Error(_) => StepStatus::Failed,
                r if r.is_suspension() => StepStatus::Suspended,
                _ => StepStatus::Finished,
            };
            record.result = Some(result.label());
            record.completed_at = Some(Instant::now());
        }
    }

    pub(crate) fn record_failure(&mut self) {
        if let Some(record) = self.records.last_mut() {
            record.status = StepStatus::Failed;
            record.completed_at = Some(Instant::now());
        }
    }

    #[must_use]
    pub fn records(&self) -> &[StepRecord] {
        &self.records
    }

    /// Step names in the order they ran.
    #[must_use]
    pub fn names(&self) -> Vec<&'static str> {
        self.records.iter().map(|r| r.name).collect()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// One line per step run, for display.
    #[must_use]
    pub fn summary(&self) -> String {
        let mut lines = Vec::new();
        for record in &self.records {
            let status = match record.status {
                StepStatus::Running => "…",
                StepStatus::Continued => "→",
                StepStatus::Suspended => "⏸",
                StepStatus::Finished => "✓",
                StepStatus::Failed => "✗",
            };
            match record.result {
                Some(result) => lines.push(format!("{status} {} ({result})", record.name)),
                None => lines.push(format!("{status} {}", record.name)),
            }
        }
        lines.join("\n")
    }
}
