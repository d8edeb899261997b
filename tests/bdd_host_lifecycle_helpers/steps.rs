//! Given and When step definitions for host lifecycle BDD tests.

use hostcycle::config::ClientConfig;
use hostcycle::error::{ConfigError, HostcycleError};
use hostcycle::lifecycle::{HostLifecycleClient, HostRef};
use rstest_bdd_macros::{given, when};
use serde_json::json;
use wiremock::matchers::method;
use wiremock::{Mock, MockServer, ResponseTemplate};

use super::state::{
    ChangeOutcome, FleetBehaviour, HostLifecycleState, StatusReading, StepResult,
};

#[given("the lifecycle API answers host changes with status {status}")]
fn answers_host_changes(host_lifecycle_state: &HostLifecycleState, status: u16) {
    host_lifecycle_state
        .fleet
        .set(FleetBehaviour::ChangeStatus(status));
}

#[given("the lifecycle API answers status queries with status {status}")]
fn answers_status_queries(host_lifecycle_state: &HostLifecycleState, status: u16) {
    host_lifecycle_state
        .fleet
        .set(FleetBehaviour::StatusFailure(status));
}

#[given("the lifecycle API reports an empty status history")]
fn reports_empty_history(host_lifecycle_state: &HostLifecycleState) {
    host_lifecycle_state
        .fleet
        .set(FleetBehaviour::StatusHistory(json!([])));
}

#[given("the lifecycle API reports a newest status record marked for removal")]
fn reports_pending_history(host_lifecycle_state: &HostLifecycleState) {
    host_lifecycle_state
        .fleet
        .set(FleetBehaviour::StatusHistory(json!([
            {"pendingTerminate": true},
            {"pendingTerminate": false}
        ])));
}

#[given("a client whose default token is {token}")]
fn client_with_token(host_lifecycle_state: &HostLifecycleState, token: String) {
    host_lifecycle_state.token.set(Some(token));
}

#[given("a client without a default token")]
fn client_without_token(host_lifecycle_state: &HostLifecycleState) {
    host_lifecycle_state.token.set(None);
}

#[when("host {instance_id} in cluster {cluster_id} is terminated")]
fn terminate_host(
    host_lifecycle_state: &HostLifecycleState,
    instance_id: String,
    cluster_id: String,
) -> StepResult<()> {
    change_host(host_lifecycle_state, HostRef::new(instance_id, cluster_id), false)
}

#[when("host {instance_id} in cluster {cluster_id} is replaced")]
fn replace_host(
    host_lifecycle_state: &HostLifecycleState,
    instance_id: String,
    cluster_id: String,
) -> StepResult<()> {
    change_host(host_lifecycle_state, HostRef::new(instance_id, cluster_id), true)
}

#[when("the status of host {host_name} is checked")]
fn check_status(host_lifecycle_state: &HostLifecycleState, host_name: String) -> StepResult<()> {
    let runtime = runtime()?;
    runtime.block_on(async {
        let server = start_fleet(host_lifecycle_state).await?;
        let client = build_client(host_lifecycle_state, &server)?;
        let terminated = client
            .is_terminated(&host_name, None)
            .await
            .map_err(|e| format!("is_terminated failed: {e}"))?;
        let pending = client
            .is_pending_termination(&host_name, None)
            .await
            .map_err(|e| format!("is_pending_termination failed: {e}"))?;
        host_lifecycle_state
            .status
            .set(StatusReading { terminated, pending });
        record_requests(host_lifecycle_state, &server).await;
        Ok(())
    })
}

fn change_host(
    host_lifecycle_state: &HostLifecycleState,
    host: HostRef,
    replace: bool,
) -> StepResult<()> {
    let runtime = runtime()?;
    runtime.block_on(async {
        let server = start_fleet(host_lifecycle_state).await?;
        let client = build_client(host_lifecycle_state, &server)?;
        let result = if replace {
            client.replace_host(&host, None).await
        } else {
            client.terminate_host(&host, None).await
        };
        let outcome = match result {
            Ok(accepted) => ChangeOutcome::Accepted(accepted),
            Err(HostcycleError::Config(ConfigError::MissingToken)) => ChangeOutcome::MissingToken,
            Err(error) => ChangeOutcome::Failed {
                message: error.to_string(),
            },
        };
        host_lifecycle_state.change.set(outcome);
        record_requests(host_lifecycle_state, &server).await;
        Ok(())
    })
}

fn runtime() -> StepResult<tokio::runtime::Runtime> {
    tokio::runtime::Runtime::new().map_err(|e| format!("failed to create tokio runtime: {e}"))
}

async fn start_fleet(host_lifecycle_state: &HostLifecycleState) -> StepResult<MockServer> {
    let behaviour = host_lifecycle_state
        .fleet
        .get()
        .ok_or_else(|| String::from("fleet behaviour should be set"))?;
    let server = MockServer::start().await;
    let mock = match behaviour {
        FleetBehaviour::ChangeStatus(status) => {
            Mock::given(method("DELETE")).respond_with(ResponseTemplate::new(status))
        }
        FleetBehaviour::StatusHistory(body) => {
            Mock::given(method("GET")).respond_with(ResponseTemplate::new(200).set_body_json(body))
        }
        FleetBehaviour::StatusFailure(status) => {
            Mock::given(method("GET")).respond_with(ResponseTemplate::new(status))
        }
    };
    mock.mount(&server).await;
    Ok(server)
}

fn build_client(
    host_lifecycle_state: &HostLifecycleState,
    server: &MockServer,
) -> StepResult<HostLifecycleClient> {
    let token = host_lifecycle_state
        .token
        .get()
        .ok_or_else(|| String::from("client token should be set"))?;
    let config = ClientConfig {
        base_url: Some(server.uri()),
        environment: Some(String::from("prod")),
        token,
        ..ClientConfig::default()
    };
    HostLifecycleClient::from_config(&config).map_err(|e| format!("client build failed: {e}"))
}

async fn record_requests(host_lifecycle_state: &HostLifecycleState, server: &MockServer) {
    let count = server.received_requests().await.map_or(0, |r| r.len());
    host_lifecycle_state.requests.set(count);
}
