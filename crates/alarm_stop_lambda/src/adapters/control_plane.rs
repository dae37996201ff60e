use alarm_stop_core::error::ControlPlaneError;
use alarm_stop_core::identifier::InstanceId;
use alarm_stop_core::lifecycle::InstanceState;

/// Compute control plane used to observe and stop instances.
///
/// State is always read live; implementations must not cache it.
pub trait InstanceControlPlane {
    fn describe_state(&self, instance_id: &InstanceId) -> Result<InstanceState, ControlPlaneError>;

    fn stop(&self, instance_id: &InstanceId) -> Result<(), ControlPlaneError>;
}
