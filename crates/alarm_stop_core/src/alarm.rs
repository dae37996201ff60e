//! Typed view of a CloudWatch alarm state-change notification.
//!
//! Decoding is tolerant of the casing variants seen in practice
//! (`AlarmDescription`/`alarmDescription`, `Dimensions`/`dimensions`,
//! `name`/`Name`, `value`/`Value`) and of absent or null optional fields.

use std::fmt;

use serde::Deserialize;

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct Alarm {
    #[serde(rename = "NewStateValue", default)]
    pub new_state_value: Option<String>,
    #[serde(rename = "Trigger", default)]
    pub trigger: Option<Trigger>,
    #[serde(rename = "AlarmDescription", default)]
    alarm_description: Option<String>,
    #[serde(rename = "alarmDescription", default)]
    alarm_description_camel: Option<String>,
}

/// Both casings of a key may be present; the first non-empty one wins.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct Trigger {
    #[serde(rename = "Dimensions", default)]
    dimensions: Option<Vec<Dimension>>,
    #[serde(rename = "dimensions", default)]
    dimensions_lower: Option<Vec<Dimension>>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct Dimension {
    #[serde(default)]
    name: Option<String>,
    #[serde(rename = "Name", default)]
    name_pascal: Option<String>,
    #[serde(default)]
    value: Option<String>,
    #[serde(rename = "Value", default)]
    value_pascal: Option<String>,
}

impl Alarm {
    pub fn from_value(value: serde_json::Value) -> Result<Self, serde_json::Error> {
        serde_json::from_value(value)
    }

    pub fn state(&self) -> AlarmState {
        AlarmState::parse(self.new_state_value.as_deref().unwrap_or_default())
    }

    pub fn dimensions(&self) -> &[Dimension] {
        self.trigger
            .as_ref()
            .map(Trigger::dimensions)
            .unwrap_or_default()
    }

    pub fn description(&self) -> &str {
        first_non_empty(
            self.alarm_description.as_deref(),
            self.alarm_description_camel.as_deref(),
        )
        .unwrap_or_default()
    }
}

impl Trigger {
    pub fn dimensions(&self) -> &[Dimension] {
        [&self.dimensions, &self.dimensions_lower]
            .into_iter()
            .filter_map(|dimensions| dimensions.as_deref())
            .find(|dimensions| !dimensions.is_empty())
            .unwrap_or_default()
    }
}

impl Dimension {
    pub fn name(&self) -> Option<&str> {
        first_non_empty(self.name.as_deref(), self.name_pascal.as_deref())
    }

    pub fn value(&self) -> Option<&str> {
        first_non_empty(self.value.as_deref(), self.value_pascal.as_deref())
    }
}

fn first_non_empty<'a>(primary: Option<&'a str>, secondary: Option<&'a str>) -> Option<&'a str> {
    primary
        .filter(|value| !value.is_empty())
        .or_else(|| secondary.filter(|value| !value.is_empty()))
}

/// Alarm transition target, compared case-insensitively. Whitespace is significant.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AlarmState {
    Alarm,
    Ok,
    InsufficientData,
    Other(String),
}

impl AlarmState {
    pub fn parse(raw: &str) -> Self {
        let normalized = raw.to_ascii_uppercase();
        match normalized.as_str() {
            "ALARM" => Self::Alarm,
            "OK" => Self::Ok,
            "INSUFFICIENT_DATA" => Self::InsufficientData,
            _ => Self::Other(normalized),
        }
    }

    pub fn is_firing(&self) -> bool {
        matches!(self, Self::Alarm)
    }
}

impl fmt::Display for AlarmState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Alarm => f.write_str("ALARM"),
            Self::Ok => f.write_str("OK"),
            Self::InsufficientData => f.write_str("INSUFFICIENT_DATA"),
            Self::Other(value) => f.write_str(value),
        }
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn decodes_standard_casing() {
        let alarm = Alarm::from_value(json!({
            "AlarmName": "cpu-idle",
            "NewStateValue": "ALARM",
            "AlarmDescription": "stop i-0aaa when idle",
            "Trigger": {
                "MetricName": "CPUUtilization",
                "Dimensions": [{"name": "InstanceId", "value": "i-0123456789abcdef0"}]
            }
        }))
        .expect("alarm should decode");

        assert_eq!(alarm.state(), AlarmState::Alarm);
        assert_eq!(alarm.dimensions().len(), 1);
        assert_eq!(alarm.dimensions()[0].name(), Some("InstanceId"));
        assert_eq!(alarm.description(), "stop i-0aaa when idle");
    }

    #[test]
    fn decodes_alternate_casing() {
        let alarm = Alarm::from_value(json!({
            "NewStateValue": "alarm",
            "alarmDescription": "lowercase key",
            "Trigger": {
                "dimensions": [{"Name": "InstanceId", "Value": "i-0bbb"}]
            }
        }))
        .expect("alarm should decode");

        assert!(alarm.state().is_firing());
        assert_eq!(alarm.dimensions()[0].value(), Some("i-0bbb"));
        assert_eq!(alarm.description(), "lowercase key");
    }

    #[test]
    fn both_casings_present_prefer_first_non_empty() {
        let alarm = Alarm::from_value(json!({
            "NewStateValue": "ALARM",
            "AlarmDescription": null,
            "alarmDescription": "stop i-desc",
            "Trigger": {
                "Dimensions": [],
                "dimensions": [
                    {"name": "InstanceId", "Name": "InstanceId", "value": "i-dup", "Value": "i-other"},
                    {"name": "", "Name": "InstanceId", "value": "", "Value": "i-pascal"}
                ]
            }
        }))
        .expect("duplicate casings should decode");

        assert_eq!(alarm.description(), "stop i-desc");
        assert_eq!(alarm.dimensions().len(), 2);
        assert_eq!(alarm.dimensions()[0].value(), Some("i-dup"));
        assert_eq!(alarm.dimensions()[1].name(), Some("InstanceId"));
        assert_eq!(alarm.dimensions()[1].value(), Some("i-pascal"));
    }

    #[test]
    fn absent_and_null_fields_decode_as_empty() {
        let alarm = Alarm::from_value(json!({
            "Trigger": null,
            "AlarmDescription": null
        }))
        .expect("alarm should decode");

        assert_eq!(alarm.state(), AlarmState::Other(String::new()));
        assert!(alarm.dimensions().is_empty());
        assert_eq!(alarm.description(), "");
    }

    #[test]
    fn non_string_state_is_rejected() {
        let error = Alarm::from_value(json!({"NewStateValue": 3}));
        assert!(error.is_err());
    }

    #[test]
    fn state_parsing_is_case_insensitive() {
        assert_eq!(AlarmState::parse("ok"), AlarmState::Ok);
        assert_eq!(
            AlarmState::parse("insufficient_data"),
            AlarmState::InsufficientData
        );
        assert_eq!(
            AlarmState::parse("Pending"),
            AlarmState::Other("PENDING".to_string())
        );
        assert!(!AlarmState::parse("OK").is_firing());
    }

    #[test]
    fn padded_state_is_not_firing() {
        assert_eq!(
            AlarmState::parse(" ALARM "),
            AlarmState::Other(" ALARM ".to_string())
        );
        assert!(!AlarmState::parse("alarm\n").is_firing());
    }
}
