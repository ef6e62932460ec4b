//! Per-record outcomes and the invocation summary built from them.

use std::fmt;

use crate::error::RelayError;

/// What happened to a single record.
#[derive(Debug)]
pub enum RelayOutcome {
    /// Forwarded and deleted from the source.
    Forwarded,
    /// Left untouched on the source without a forward attempt.
    Skipped(String),
    /// Something went wrong; see [`RelayError`] for whether a forward happened.
    Failed(RelayError),
}

impl RelayOutcome {
    /// True when the destination accepted the message, including the case
    /// where the following delete failed.
    pub fn is_forwarded(&self) -> bool {
        matches!(
            self,
            RelayOutcome::Forwarded | RelayOutcome::Failed(RelayError::Delete { .. })
        )
    }
}

#[derive(Debug)]
pub struct RecordReport {
    pub id: String,
    pub outcome: RelayOutcome,
}

/// Result of relaying one delivered batch.
#[derive(Debug, Default)]
pub struct BatchResult {
    pub reports: Vec<RecordReport>,
}

impl BatchResult {
    pub fn total(&self) -> usize {
        self.reports.len()
    }

    /// Records the destination accepted, whether or not the delete succeeded.
    pub fn forwarded(&self) -> usize {
        self.reports
            .iter()
            .filter(|r| r.outcome.is_forwarded())
            .count()
    }

    pub fn skipped(&self) -> usize {
        self.reports
            .iter()
            .filter(|r| matches!(r.outcome, RelayOutcome::Skipped(_)))
            .count()
    }

    pub fn failed(&self) -> usize {
        self.reports
            .iter()
            .filter(|r| matches!(r.outcome, RelayOutcome::Failed(_)))
            .count()
    }

    pub fn outcome(&self, id: &str) -> Option<&RelayOutcome> {
        self.reports
            .iter()
            .find(|r| r.id == id)
            .map(|r| &r.outcome)
    }
}

impl fmt::Display for BatchResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "processed {} records: {} forwarded, {} skipped, {} failed",
            self.total(),
            self.forwarded(),
            self.skipped(),
            self.failed()
        )
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "lowercase")]
pub enum InvocationStatus {
    Success,
    Failure,
}

/// What the relay returns to whoever invoked it.
///
/// `status` is `success` whenever the batch was iterated to completion;
/// record failures only show up in the summary and the logs.
#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InvocationResponse {
    pub status_code: u16,
    pub status: InvocationStatus,
    pub body: String,
}

impl InvocationResponse {
    pub fn completed(result: &BatchResult) -> Self {
        Self {
            status_code: 200,
            status: InvocationStatus::Success,
            body: result.to_string(),
        }
    }

    pub fn rejected(reason: impl fmt::Display) -> Self {
        Self {
            status_code: 400,
            status: InvocationStatus::Failure,
            body: reason.to_string(),
        }
    }
}
