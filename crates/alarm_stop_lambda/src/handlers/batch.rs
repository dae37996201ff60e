use alarm_stop_core::contract::{
    BatchAcknowledgement, BatchItemFailuresResponse, BatchResponse, QueueBatch, QueueRecord,
};
use alarm_stop_core::envelope::{unwrap_envelope, Envelope};
use alarm_stop_core::error::{AggregateBatchError, EnvelopeError, RecordError};
use alarm_stop_core::identifier::{IdentifierExtractor, InstanceId};
use alarm_stop_core::lifecycle::requires_state_check;
use alarm_stop_core::outcome::{BatchOutcome, RecordDisposition, RecordOutcome, RecordResult};
use serde_json::Value;
use thiserror::Error;
use tracing::{error, info, info_span, warn};

use crate::adapters::control_plane::InstanceControlPlane;
use crate::config::ReconcilerConfig;
use crate::handlers::lifecycle::reconcile_instance;

#[derive(Debug, Error)]
pub enum BatchError {
    #[error("invalid queue event: {0}")]
    InvalidEvent(#[source] serde_json::Error),

    #[error(transparent)]
    Records(#[from] AggregateBatchError),
}

/// Entry point for one queue delivery.
///
/// Every record is attempted. With item failure reporting disabled, any
/// failed record fails the whole call with an aggregate error so the queue
/// redelivers the full batch.
pub fn handle_alarm_batch(
    event: Value,
    config: &ReconcilerConfig,
    control_plane: &dyn InstanceControlPlane,
) -> Result<BatchResponse, BatchError> {
    let batch = QueueBatch::from_value(event).map_err(BatchError::InvalidEvent)?;
    info!(records = batch.len(), "alarm batch received");

    let outcome = reconcile_batch(&batch, &config.extractor(), control_plane);
    let summary = outcome.summary();

    if config.report_batch_item_failures {
        match outcome.item_failures() {
            Some(batch_item_failures) => {
                info!(
                    records = summary.records,
                    stopped = summary.stopped,
                    deferred = summary.deferred,
                    skipped = summary.skipped,
                    failed = batch_item_failures.len(),
                    "alarm batch completed"
                );
                return Ok(BatchResponse::ItemFailures(BatchItemFailuresResponse {
                    batch_item_failures,
                }));
            }
            None => warn!("failed record has no messageId; failing the whole batch"),
        }
    }

    match outcome.into_result() {
        Ok(summary) => {
            info!(
                records = summary.records,
                stopped = summary.stopped,
                deferred = summary.deferred,
                skipped = summary.skipped,
                "alarm batch completed"
            );
            Ok(BatchResponse::Acknowledged(BatchAcknowledgement::ok()))
        }
        Err(aggregate) => {
            error!(
                records = summary.records,
                failed = aggregate.failures.len(),
                "alarm batch failed"
            );
            Err(aggregate.into())
        }
    }
}

/// Processes records sequentially; a failed record never stops its siblings.
pub fn reconcile_batch(
    batch: &QueueBatch,
    extractor: &IdentifierExtractor,
    control_plane: &dyn InstanceControlPlane,
) -> BatchOutcome {
    let mut outcome = BatchOutcome::with_capacity(batch.len());
    for (index, record) in batch.records().iter().enumerate() {
        let span = info_span!(
            "record",
            record_index = index,
            message_id = record.message_id.as_deref().unwrap_or_default()
        );
        let _entered = span.enter();

        let record_outcome = process_record(index, record, extractor, control_plane);
        if let RecordResult::Failed(cause) = &record_outcome.result {
            error!(
                error = %cause,
                body = ?record.body,
                "failed to process record"
            );
        }
        outcome.push(record_outcome);
    }
    outcome
}

fn process_record(
    index: usize,
    record: &QueueRecord,
    extractor: &IdentifierExtractor,
    control_plane: &dyn InstanceControlPlane,
) -> RecordOutcome {
    let (instance_id, result) = match reconcile_record(record, extractor, control_plane) {
        Ok((instance_id, disposition)) => (instance_id, RecordResult::Completed(disposition)),
        Err(error) => {
            let instance_id = match &error {
                RecordError::ControlPlane(cause) => Some(cause.instance_id.clone()),
                _ => None,
            };
            (instance_id, RecordResult::Failed(error))
        }
    };

    RecordOutcome {
        index,
        message_id: record.message_id.clone(),
        instance_id,
        result,
    }
}

fn reconcile_record(
    record: &QueueRecord,
    extractor: &IdentifierExtractor,
    control_plane: &dyn InstanceControlPlane,
) -> Result<(Option<InstanceId>, RecordDisposition), RecordError> {
    let body = record.body_str().ok_or(EnvelopeError::MissingBody)?;

    let alarm = match unwrap_envelope(body)? {
        Envelope::Alarm(alarm) => alarm,
        Envelope::MissingMessage => {
            warn!(body, "queue body has no notification 'Message'; skipping");
            return Ok((None, RecordDisposition::MissingMessage));
        }
    };

    let alarm_state = alarm.state();
    info!(state = %alarm_state, "alarm notification parsed");
    if !requires_state_check(&alarm_state) {
        info!(state = %alarm_state, "skipping non-alarm transition");
        return Ok((None, RecordDisposition::NotAlarm(alarm_state)));
    }

    let resolved = extractor.extract(&alarm)?;
    info!(
        instance_id = %resolved.instance_id,
        source = resolved.source.as_str(),
        "instance identifier resolved"
    );

    let disposition = reconcile_instance(control_plane, &resolved.instance_id, &alarm_state)?;
    Ok((Some(resolved.instance_id), disposition))
}
