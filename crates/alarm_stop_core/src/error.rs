use std::fmt;

use thiserror::Error;

use crate::identifier::InstanceId;

/// Failure to recover an alarm payload from a queue record body.
#[derive(Debug, Error)]
pub enum EnvelopeError {
    #[error("record body is missing or not a string")]
    MissingBody,

    #[error("record body is not valid JSON: {0}")]
    InvalidBody(#[source] serde_json::Error),

    #[error("record body must be a JSON object")]
    BodyNotObject,

    #[error("notification 'Message' must be a JSON string")]
    MessageNotString,

    #[error("notification 'Message' is not valid JSON: {0}")]
    InvalidMessage(#[source] serde_json::Error),

    #[error("alarm payload has an unexpected shape: {0}")]
    InvalidAlarm(#[source] serde_json::Error),
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Could not determine InstanceId from alarm and no fallback provided.")]
pub struct IdentifierNotFoundError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControlPlaneOperation {
    DescribeState,
    Stop,
}

impl ControlPlaneOperation {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::DescribeState => "describe_state",
            Self::Stop => "stop",
        }
    }
}

impl fmt::Display for ControlPlaneOperation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("control plane {operation} failed for {instance_id}: {message}")]
pub struct ControlPlaneError {
    pub instance_id: InstanceId,
    pub operation: ControlPlaneOperation,
    pub message: String,
}

impl ControlPlaneError {
    pub fn describe(instance_id: &InstanceId, message: impl Into<String>) -> Self {
        Self {
            instance_id: instance_id.clone(),
            operation: ControlPlaneOperation::DescribeState,
            message: message.into(),
        }
    }

    pub fn stop(instance_id: &InstanceId, message: impl Into<String>) -> Self {
        Self {
            instance_id: instance_id.clone(),
            operation: ControlPlaneOperation::Stop,
            message: message.into(),
        }
    }
}

/// Everything that can fail while reconciling a single record.
#[derive(Debug, Error)]
pub enum RecordError {
    #[error(transparent)]
    Envelope(#[from] EnvelopeError),

    #[error(transparent)]
    IdentifierNotFound(#[from] IdentifierNotFoundError),

    #[error(transparent)]
    ControlPlane(#[from] ControlPlaneError),
}

/// Raised once per batch, after every record has been attempted.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("One or more records failed: {}", .failures.join("; "))]
pub struct AggregateBatchError {
    pub failures: Vec<String>,
}
