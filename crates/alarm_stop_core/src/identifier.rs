use std::fmt;

use serde::Serialize;

use crate::alarm::{Alarm, Dimension};
use crate::error::IdentifierNotFoundError;

pub const INSTANCE_ID_DIMENSION: &str = "InstanceId";
pub const INSTANCE_ID_PREFIX: &str = "i-";

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct InstanceId(String);

impl InstanceId {
    /// Returns `None` for blank input.
    pub fn parse(raw: &str) -> Option<Self> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            None
        } else {
            Some(Self(trimmed.to_string()))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for InstanceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IdentifierSource {
    Dimension,
    Description,
    Fallback,
}

impl IdentifierSource {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Dimension => "dimension",
            Self::Description => "description",
            Self::Fallback => "fallback",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedIdentifier {
    pub instance_id: InstanceId,
    pub source: IdentifierSource,
}

/// Resolves the instance an alarm refers to.
///
/// Precedence: `InstanceId` trigger dimension, then the first `i-` token in the
/// alarm description, then the configured fallback. The description is only
/// scanned when no dimension is named `InstanceId`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IdentifierExtractor {
    fallback: Option<InstanceId>,
}

impl IdentifierExtractor {
    pub fn new(fallback: Option<InstanceId>) -> Self {
        Self { fallback }
    }

    pub fn fallback(&self) -> Option<&InstanceId> {
        self.fallback.as_ref()
    }

    pub fn extract(&self, alarm: &Alarm) -> Result<ResolvedIdentifier, IdentifierNotFoundError> {
        match instance_dimension(alarm) {
            Some(dimension) => {
                // A matched dimension without a value skips the description scan.
                if let Some(instance_id) = dimension.value().and_then(InstanceId::parse) {
                    return Ok(ResolvedIdentifier {
                        instance_id,
                        source: IdentifierSource::Dimension,
                    });
                }
            }
            None => {
                if let Some(instance_id) = from_description(alarm.description()) {
                    return Ok(ResolvedIdentifier {
                        instance_id,
                        source: IdentifierSource::Description,
                    });
                }
            }
        }

        self.fallback
            .clone()
            .map(|instance_id| ResolvedIdentifier {
                instance_id,
                source: IdentifierSource::Fallback,
            })
            .ok_or(IdentifierNotFoundError)
    }
}

fn instance_dimension(alarm: &Alarm) -> Option<&Dimension> {
    alarm.dimensions().iter().find(|dimension| {
        dimension
            .name()
            .is_some_and(|name| name.eq_ignore_ascii_case(INSTANCE_ID_DIMENSION))
    })
}

fn from_description(description: &str) -> Option<InstanceId> {
    description
        .split(|c: char| c == ',' || c.is_whitespace())
        .find(|token| {
            token
                .strip_prefix(INSTANCE_ID_PREFIX)
                .is_some_and(|suffix| !suffix.is_empty())
        })
        .and_then(InstanceId::parse)
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn alarm(value: serde_json::Value) -> Alarm {
        Alarm::from_value(value).expect("alarm fixture should decode")
    }

    fn fallback(raw: &str) -> IdentifierExtractor {
        IdentifierExtractor::new(InstanceId::parse(raw))
    }

    #[test]
    fn dimension_match_wins_over_description() {
        let alarm = alarm(json!({
            "AlarmDescription": "idle check for i-fromtext",
            "Trigger": {"Dimensions": [
                {"name": "AutoScalingGroupName", "value": "web"},
                {"name": "InstanceId", "value": "i-fromdim"}
            ]}
        }));

        let resolved = fallback("i-fallback")
            .extract(&alarm)
            .expect("identifier should resolve");
        assert_eq!(resolved.instance_id.as_str(), "i-fromdim");
        assert_eq!(resolved.source, IdentifierSource::Dimension);
    }

    #[test]
    fn dimension_name_is_case_insensitive() {
        let alarm = alarm(json!({
            "Trigger": {"dimensions": [{"Name": "instanceid", "Value": "i-lower"}]}
        }));

        let resolved = IdentifierExtractor::default()
            .extract(&alarm)
            .expect("identifier should resolve");
        assert_eq!(resolved.instance_id.as_str(), "i-lower");
    }

    #[test]
    fn empty_dimension_value_skips_description() {
        let alarm = alarm(json!({
            "AlarmDescription": "see i-desc",
            "Trigger": {"Dimensions": [{"name": "InstanceId", "value": ""}]}
        }));

        let resolved = fallback("i-fb")
            .extract(&alarm)
            .expect("fallback should resolve");
        assert_eq!(resolved.instance_id.as_str(), "i-fb");
        assert_eq!(resolved.source, IdentifierSource::Fallback);

        let error = IdentifierExtractor::default()
            .extract(&alarm)
            .expect_err("description must not be scanned");
        assert_eq!(error, IdentifierNotFoundError);
    }

    #[test]
    fn first_instance_dimension_decides() {
        let alarm = alarm(json!({
            "Trigger": {"Dimensions": [
                {"name": "InstanceId", "value": null},
                {"name": "InstanceId", "value": "i-second"}
            ]}
        }));

        let resolved = fallback("i-fb")
            .extract(&alarm)
            .expect("fallback should resolve");
        assert_eq!(resolved.source, IdentifierSource::Fallback);
    }

    #[test]
    fn duplicate_key_casings_resolve_from_dimension() {
        let alarm = alarm(json!({
            "AlarmDescription": "stop i-desc",
            "alarmDescription": "ignored",
            "Trigger": {"Dimensions": [
                {"name": "InstanceId", "Name": "InstanceId", "value": "i-dup"}
            ]}
        }));

        let resolved = IdentifierExtractor::default()
            .extract(&alarm)
            .expect("identifier should resolve");
        assert_eq!(resolved.instance_id.as_str(), "i-dup");
        assert_eq!(resolved.source, IdentifierSource::Dimension);
    }

    #[test]
    fn description_scan_splits_on_commas() {
        let alarm = alarm(json!({
            "AlarmDescription": "targets:i-first,i-second, i-third"
        }));

        let resolved = IdentifierExtractor::default()
            .extract(&alarm)
            .expect("identifier should resolve");
        assert_eq!(resolved.instance_id.as_str(), "i-second");
    }

    #[test]
    fn bare_prefix_token_is_ignored() {
        let alarm = alarm(json!({"AlarmDescription": "i- is not an id"}));

        let error = IdentifierExtractor::default()
            .extract(&alarm)
            .expect_err("bare prefix should not resolve");
        assert_eq!(error, IdentifierNotFoundError);
    }

    #[test]
    fn fallback_used_when_alarm_has_no_identifier() {
        let alarm = alarm(json!({"NewStateValue": "ALARM"}));

        let resolved = fallback("  i-fallback  ")
            .extract(&alarm)
            .expect("fallback should resolve");
        assert_eq!(resolved.instance_id.as_str(), "i-fallback");
        assert_eq!(resolved.source, IdentifierSource::Fallback);
    }

    #[test]
    fn fails_without_any_source() {
        let alarm = alarm(json!({"AlarmDescription": "no identifiers here"}));

        let error = fallback("   ")
            .extract(&alarm)
            .expect_err("extraction should fail");
        assert_eq!(
            error.to_string(),
            "Could not determine InstanceId from alarm and no fallback provided."
        );
    }
}
