//! Stop decision state machine.
//!
//! The alarm transition is checked first so non-alarm notifications never
//! reach the control plane; the live instance state then selects the action.
//! Every outcome is idempotent under redelivery.

use std::fmt;

use crate::alarm::AlarmState;

/// Live instance state as reported by the control plane.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InstanceState {
    Pending,
    Running,
    Stopping,
    Stopped,
    ShuttingDown,
    Terminated,
    Other(String),
}

impl InstanceState {
    pub fn parse(raw: &str) -> Self {
        match raw.trim().to_ascii_lowercase().as_str() {
            "pending" => Self::Pending,
            "running" => Self::Running,
            "stopping" => Self::Stopping,
            "stopped" => Self::Stopped,
            "shutting-down" => Self::ShuttingDown,
            "terminated" => Self::Terminated,
            other => Self::Other(other.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            Self::Pending => "pending",
            Self::Running => "running",
            Self::Stopping => "stopping",
            Self::Stopped => "stopped",
            Self::ShuttingDown => "shutting-down",
            Self::Terminated => "terminated",
            Self::Other(value) => value,
        }
    }

    /// Already stopped or on its way there.
    pub fn is_at_rest(&self) -> bool {
        matches!(
            self,
            Self::Stopping | Self::Stopped | Self::ShuttingDown | Self::Terminated
        )
    }
}

impl fmt::Display for InstanceState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LifecycleAction {
    NoOp,
    Defer,
    Stop,
}

impl LifecycleAction {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::NoOp => "no_op",
            Self::Defer => "defer",
            Self::Stop => "stop",
        }
    }
}

/// Whether the live instance state must be fetched for this transition.
pub fn requires_state_check(alarm_state: &AlarmState) -> bool {
    alarm_state.is_firing()
}

pub fn decide_action(alarm_state: &AlarmState, instance_state: &InstanceState) -> LifecycleAction {
    if !requires_state_check(alarm_state) {
        return LifecycleAction::NoOp;
    }

    match instance_state {
        state if state.is_at_rest() => LifecycleAction::NoOp,
        InstanceState::Pending => LifecycleAction::Defer,
        _ => LifecycleAction::Stop,
    }
}
