use alarm_stop_core::contract::BatchResponse;
use alarm_stop_core::error::ControlPlaneError;
use alarm_stop_core::identifier::InstanceId;
use alarm_stop_core::lifecycle::InstanceState;
use alarm_stop_lambda::adapters::control_plane::InstanceControlPlane;
use alarm_stop_lambda::config::ReconcilerConfig;
use alarm_stop_lambda::handlers::batch::handle_alarm_batch;
use alarm_stop_lambda::logging::init_tracing;
use lambda_runtime::{service_fn, Error, LambdaEvent};
use serde_json::Value;
use tracing::info;

struct Ec2ControlPlane {
    ec2_client: aws_sdk_ec2::Client,
}

impl InstanceControlPlane for Ec2ControlPlane {
    fn describe_state(&self, instance_id: &InstanceId) -> Result<InstanceState, ControlPlaneError> {
        let client = self.ec2_client.clone();
        let target = instance_id.to_string();

        let output = tokio::task::block_in_place(|| {
            tokio::runtime::Handle::current().block_on(async move {
                client.describe_instances().instance_ids(target).send().await
            })
        })
        .map_err(|error| {
            ControlPlaneError::describe(instance_id, format!("failed to describe instance: {error}"))
        })?;

        let state_name = output
            .reservations()
            .first()
            .and_then(|reservation| reservation.instances().first())
            .and_then(|instance| instance.state())
            .and_then(|state| state.name())
            .ok_or_else(|| {
                ControlPlaneError::describe(instance_id, "describe response has no instance state")
            })?;

        Ok(InstanceState::parse(state_name.as_str()))
    }

    fn stop(&self, instance_id: &InstanceId) -> Result<(), ControlPlaneError> {
        let client = self.ec2_client.clone();
        let target = instance_id.to_string();

        tokio::task::block_in_place(|| {
            tokio::runtime::Handle::current().block_on(async move {
                client
                    .stop_instances()
                    .instance_ids(target)
                    .send()
                    .await
                    .map(|_| ())
            })
        })
        .map_err(|error| {
            ControlPlaneError::stop(instance_id, format!("failed to stop instance: {error}"))
        })
    }
}

async fn handle_request(
    event: LambdaEvent<Value>,
    config: &ReconcilerConfig,
    control_plane: &Ec2ControlPlane,
) -> Result<BatchResponse, Error> {
    info!(request_id = %event.context.request_id, "invocation started");
    handle_alarm_batch(event.payload, config, control_plane)
        .map_err(|error| Error::from(error.to_string()))
}

#[tokio::main]
async fn main() -> Result<(), Error> {
    let config = ReconcilerConfig::from_env()?;
    init_tracing(&config.log_level)?;
    info!(
        fallback_configured = config.fallback_instance_id.is_some(),
        report_batch_item_failures = config.report_batch_item_failures,
        "alarm stop runtime starting"
    );

    let aws_config = aws_config::load_defaults(aws_config::BehaviorVersion::latest()).await;
    let control_plane = Ec2ControlPlane {
        ec2_client: aws_sdk_ec2::Client::new(&aws_config),
    };

    let config = &config;
    let control_plane = &control_plane;
    lambda_runtime::run(service_fn(move |event: LambdaEvent<Value>| async move {
        handle_request(event, config, control_plane).await
    }))
    .await
}
