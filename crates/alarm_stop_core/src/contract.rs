use serde::{Deserialize, Serialize};
use serde_json::Value;

pub const STATUS_OK: &str = "ok";

/// Queue delivery event: `{"Records": [{"messageId": ..., "body": "..."}]}`.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct QueueBatch {
    #[serde(rename = "Records", default)]
    records: Option<Vec<QueueRecord>>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct QueueRecord {
    #[serde(rename = "messageId", default)]
    pub message_id: Option<String>,
    #[serde(default)]
    pub body: Option<Value>,
}

impl QueueBatch {
    pub fn from_value(event: Value) -> Result<Self, serde_json::Error> {
        serde_json::from_value(event)
    }

    pub fn records(&self) -> &[QueueRecord] {
        self.records.as_deref().unwrap_or_default()
    }

    pub fn len(&self) -> usize {
        self.records().len()
    }

    pub fn is_empty(&self) -> bool {
        self.records().is_empty()
    }
}

impl QueueRecord {
    pub fn body_str(&self) -> Option<&str> {
        self.body.as_ref().and_then(Value::as_str)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatchAcknowledgement {
    pub status: String,
}

impl BatchAcknowledgement {
    pub fn ok() -> Self {
        Self {
            status: STATUS_OK.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatchItemFailure {
    #[serde(rename = "itemIdentifier")]
    pub item_identifier: String,
}

/// Partial batch response understood by queue event source mappings that
/// report per-item failures.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatchItemFailuresResponse {
    #[serde(rename = "batchItemFailures")]
    pub batch_item_failures: Vec<BatchItemFailure>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum BatchResponse {
    Acknowledged(BatchAcknowledgement),
    ItemFailures(BatchItemFailuresResponse),
}
