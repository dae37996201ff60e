use alarm_stop_core::alarm::AlarmState;
use alarm_stop_core::error::ControlPlaneError;
use alarm_stop_core::identifier::InstanceId;
use alarm_stop_core::lifecycle::{decide_action, requires_state_check, LifecycleAction};
use alarm_stop_core::outcome::RecordDisposition;
use tracing::info;

use crate::adapters::control_plane::InstanceControlPlane;

/// Applies the stop decision for one alarm transition against live instance state.
///
/// The stop request is only issued once the decision is final; control plane
/// failures are returned as-is and never retried here.
pub fn reconcile_instance(
    control_plane: &dyn InstanceControlPlane,
    instance_id: &InstanceId,
    alarm_state: &AlarmState,
) -> Result<RecordDisposition, ControlPlaneError> {
    if !requires_state_check(alarm_state) {
        return Ok(RecordDisposition::NotAlarm(alarm_state.clone()));
    }

    let state = control_plane.describe_state(instance_id)?;
    let action = decide_action(alarm_state, &state);
    info!(
        instance_id = %instance_id,
        state = %state,
        action = action.as_str(),
        "instance state observed"
    );

    match action {
        LifecycleAction::NoOp => {
            info!(instance_id = %instance_id, state = %state, "no action needed");
            Ok(RecordDisposition::AlreadyAtRest(state))
        }
        LifecycleAction::Defer => {
            info!(instance_id = %instance_id, "instance is pending; cannot stop yet");
            Ok(RecordDisposition::Deferred(state))
        }
        LifecycleAction::Stop => {
            info!(instance_id = %instance_id, "stopping instance");
            control_plane.stop(instance_id)?;
            info!(instance_id = %instance_id, "stop requested");
            Ok(RecordDisposition::Stopped)
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use alarm_stop_core::lifecycle::InstanceState;

    use super::*;

    #[derive(Debug, Clone, PartialEq, Eq)]
    enum Call {
        Describe(String),
        Stop(String),
    }

    /// Tracks a single instance whose state moves to `stopping` after a stop.
    struct SingleInstance {
        state: Mutex<InstanceState>,
        calls: Mutex<Vec<Call>>,
        fail_stop: bool,
    }

    impl SingleInstance {
        fn new(state: InstanceState) -> Self {
            Self {
                state: Mutex::new(state),
                calls: Mutex::new(Vec::new()),
                fail_stop: false,
            }
        }

        fn calls(&self) -> Vec<Call> {
            self.calls.lock().expect("poisoned mutex").clone()
        }

        fn stop_calls(&self) -> usize {
            self.calls()
                .iter()
                .filter(|call| matches!(call, Call::Stop(_)))
                .count()
        }
    }

    impl InstanceControlPlane for SingleInstance {
        fn describe_state(
            &self,
            instance_id: &InstanceId,
        ) -> Result<InstanceState, ControlPlaneError> {
            self.calls
                .lock()
                .expect("poisoned mutex")
                .push(Call::Describe(instance_id.to_string()));
            Ok(self.state.lock().expect("poisoned mutex").clone())
        }

        fn stop(&self, instance_id: &InstanceId) -> Result<(), ControlPlaneError> {
            self.calls
                .lock()
                .expect("poisoned mutex")
                .push(Call::Stop(instance_id.to_string()));
            if self.fail_stop {
                return Err(ControlPlaneError::stop(instance_id, "IncorrectInstanceState"));
            }
            *self.state.lock().expect("poisoned mutex") = InstanceState::Stopping;
            Ok(())
        }
    }

    fn instance_id() -> InstanceId {
        InstanceId::parse("i-abc").expect("valid id")
    }

    #[test]
    fn non_alarm_transition_skips_control_plane() {
        let control_plane = SingleInstance::new(InstanceState::Running);
        let disposition = reconcile_instance(&control_plane, &instance_id(), &AlarmState::Ok)
            .expect("should succeed");

        assert_eq!(disposition, RecordDisposition::NotAlarm(AlarmState::Ok));
        assert!(control_plane.calls().is_empty());
    }

    #[test]
    fn running_instance_is_stopped_once() {
        let control_plane = SingleInstance::new(InstanceState::Running);
        let disposition = reconcile_instance(&control_plane, &instance_id(), &AlarmState::Alarm)
            .expect("should succeed");

        assert_eq!(disposition, RecordDisposition::Stopped);
        assert_eq!(
            control_plane.calls(),
            vec![
                Call::Describe("i-abc".to_string()),
                Call::Stop("i-abc".to_string())
            ]
        );
    }

    #[test]
    fn repeated_alarm_converges_without_second_stop() {
        let control_plane = SingleInstance::new(InstanceState::Running);

        let first = reconcile_instance(&control_plane, &instance_id(), &AlarmState::Alarm)
            .expect("first call should succeed");
        let second = reconcile_instance(&control_plane, &instance_id(), &AlarmState::Alarm)
            .expect("second call should succeed");

        assert_eq!(first, RecordDisposition::Stopped);
        assert_eq!(
            second,
            RecordDisposition::AlreadyAtRest(InstanceState::Stopping)
        );
        assert_eq!(control_plane.stop_calls(), 1);
    }

    #[test]
    fn resting_and_pending_states_issue_no_stop() {
        for state in [
            InstanceState::Stopped,
            InstanceState::Stopping,
            InstanceState::ShuttingDown,
            InstanceState::Terminated,
            InstanceState::Pending,
        ] {
            let control_plane = SingleInstance::new(state.clone());
            reconcile_instance(&control_plane, &instance_id(), &AlarmState::Alarm)
                .expect("should succeed");
            assert_eq!(control_plane.stop_calls(), 0, "state {state}");
        }
    }

    #[test]
    fn stop_failure_is_surfaced() {
        let mut control_plane = SingleInstance::new(InstanceState::Running);
        control_plane.fail_stop = true;

        let error = reconcile_instance(&control_plane, &instance_id(), &AlarmState::Alarm)
            .expect_err("stop failure should propagate");
        assert_eq!(error.instance_id, instance_id());
        assert!(error.to_string().contains("IncorrectInstanceState"));
    }
}
