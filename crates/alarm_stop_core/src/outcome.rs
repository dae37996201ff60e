use crate::alarm::AlarmState;
use crate::contract::BatchItemFailure;
use crate::error::{AggregateBatchError, RecordError};
use crate::identifier::InstanceId;
use crate::lifecycle::InstanceState;

/// How a record completed without error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecordDisposition {
    Stopped,
    AlreadyAtRest(InstanceState),
    Deferred(InstanceState),
    NotAlarm(AlarmState),
    MissingMessage,
}

impl RecordDisposition {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Stopped => "stopped",
            Self::AlreadyAtRest(_) => "already_at_rest",
            Self::Deferred(_) => "deferred",
            Self::NotAlarm(_) => "not_alarm",
            Self::MissingMessage => "missing_message",
        }
    }
}

#[derive(Debug)]
pub enum RecordResult {
    Completed(RecordDisposition),
    Failed(RecordError),
}

#[derive(Debug)]
pub struct RecordOutcome {
    pub index: usize,
    pub message_id: Option<String>,
    pub instance_id: Option<InstanceId>,
    pub result: RecordResult,
}

impl RecordOutcome {
    pub fn is_failure(&self) -> bool {
        matches!(self.result, RecordResult::Failed(_))
    }

    pub fn disposition(&self) -> Option<&RecordDisposition> {
        match &self.result {
            RecordResult::Completed(disposition) => Some(disposition),
            RecordResult::Failed(_) => None,
        }
    }

    pub fn failure_description(&self) -> Option<String> {
        let RecordResult::Failed(error) = &self.result else {
            return None;
        };

        Some(match &self.message_id {
            Some(message_id) => format!("record {} ({message_id}): {error}", self.index),
            None => format!("record {}: {error}", self.index),
        })
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BatchSummary {
    pub records: usize,
    pub stopped: usize,
    pub deferred: usize,
    pub skipped: usize,
}

/// Per-record results of one batch, in delivery order.
#[derive(Debug, Default)]
pub struct BatchOutcome {
    outcomes: Vec<RecordOutcome>,
}

impl BatchOutcome {
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            outcomes: Vec::with_capacity(capacity),
        }
    }

    pub fn push(&mut self, outcome: RecordOutcome) {
        self.outcomes.push(outcome);
    }

    pub fn outcomes(&self) -> &[RecordOutcome] {
        &self.outcomes
    }

    pub fn failures(&self) -> impl Iterator<Item = &RecordOutcome> {
        self.outcomes.iter().filter(|outcome| outcome.is_failure())
    }

    pub fn has_failures(&self) -> bool {
        self.failures().next().is_some()
    }

    pub fn summary(&self) -> BatchSummary {
        let mut summary = BatchSummary {
            records: self.outcomes.len(),
            ..BatchSummary::default()
        };
        for disposition in self.outcomes.iter().filter_map(RecordOutcome::disposition) {
            match disposition {
                RecordDisposition::Stopped => summary.stopped += 1,
                RecordDisposition::Deferred(_) => summary.deferred += 1,
                _ => summary.skipped += 1,
            }
        }
        summary
    }

    pub fn aggregate_error(&self) -> Option<AggregateBatchError> {
        let failures: Vec<String> = self
            .failures()
            .filter_map(RecordOutcome::failure_description)
            .collect();
        if failures.is_empty() {
            None
        } else {
            Some(AggregateBatchError { failures })
        }
    }

    /// Item failures for a partial batch response, or `None` when a failed
    /// record has no message id and cannot be reported individually.
    pub fn item_failures(&self) -> Option<Vec<BatchItemFailure>> {
        self.failures()
            .map(|outcome| {
                outcome.message_id.clone().map(|item_identifier| BatchItemFailure {
                    item_identifier,
                })
            })
            .collect()
    }

    pub fn into_result(self) -> Result<BatchSummary, AggregateBatchError> {
        match self.aggregate_error() {
            Some(error) => Err(error),
            None => Ok(self.summary()),
        }
    }
}
