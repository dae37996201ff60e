use serde_json::Value;

use crate::alarm::Alarm;
use crate::error::EnvelopeError;

/// Field of the notification relay wrapper that carries the alarm as a JSON string.
pub const MESSAGE_FIELD: &str = "Message";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Envelope {
    Alarm(Alarm),
    /// The body parsed but carries no `Message`; not an alarm notification.
    MissingMessage,
}

pub fn unwrap_envelope(body: &str) -> Result<Envelope, EnvelopeError> {
    let outer: Value = serde_json::from_str(body).map_err(EnvelopeError::InvalidBody)?;
    let Value::Object(mut fields) = outer else {
        return Err(EnvelopeError::BodyNotObject);
    };

    let Some(message) = fields.remove(MESSAGE_FIELD) else {
        return Ok(Envelope::MissingMessage);
    };
    let Value::String(text) = message else {
        return Err(EnvelopeError::MessageNotString);
    };

    let inner: Value = serde_json::from_str(&text).map_err(EnvelopeError::InvalidMessage)?;
    let alarm = Alarm::from_value(inner).map_err(EnvelopeError::InvalidAlarm)?;
    Ok(Envelope::Alarm(alarm))
}
