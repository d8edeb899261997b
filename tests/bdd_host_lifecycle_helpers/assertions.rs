//! Then step definitions for host lifecycle BDD tests.

use rstest_bdd_macros::then;

use super::state::{ChangeOutcome, HostLifecycleState, StatusReading, StepResult};

fn change_outcome(host_lifecycle_state: &HostLifecycleState) -> StepResult<ChangeOutcome> {
    host_lifecycle_state
        .change
        .get()
        .ok_or_else(|| String::from("change outcome should be set"))
}

fn status_reading(host_lifecycle_state: &HostLifecycleState) -> StepResult<StatusReading> {
    host_lifecycle_state
        .status
        .get()
        .ok_or_else(|| String::from("status reading should be set"))
}

fn expect_acceptance(host_lifecycle_state: &HostLifecycleState, expected: bool) -> StepResult<()> {
    match change_outcome(host_lifecycle_state)? {
        ChangeOutcome::Accepted(accepted) if accepted == expected => Ok(()),
        other => Err(format!("expected Accepted({expected}), got {other:?}")),
    }
}

#[then("the request is accepted")]
fn request_is_accepted(host_lifecycle_state: &HostLifecycleState) -> StepResult<()> {
    expect_acceptance(host_lifecycle_state, true)
}

#[then("the request is not accepted")]
fn request_is_not_accepted(host_lifecycle_state: &HostLifecycleState) -> StepResult<()> {
    expect_acceptance(host_lifecycle_state, false)
}

#[then("the call fails with a missing token error")]
fn fails_with_missing_token(host_lifecycle_state: &HostLifecycleState) -> StepResult<()> {
    match change_outcome(host_lifecycle_state)? {
        ChangeOutcome::MissingToken => Ok(()),
        other => Err(format!("expected missing token error, got {other:?}")),
    }
}

#[then("the lifecycle API received {count} requests")]
fn api_received_requests(
    host_lifecycle_state: &HostLifecycleState,
    count: usize,
) -> StepResult<()> {
    let received = host_lifecycle_state
        .requests
        .get()
        .ok_or_else(|| String::from("request count should be set"))?;
    if received == count {
        Ok(())
    } else {
        Err(format!("expected {count} requests, got {received}"))
    }
}

#[then("the host is terminated")]
fn host_is_terminated(host_lifecycle_state: &HostLifecycleState) -> StepResult<()> {
    expect_flag("terminated", status_reading(host_lifecycle_state)?.terminated, true)
}

#[then("the host is not terminated")]
fn host_is_not_terminated(host_lifecycle_state: &HostLifecycleState) -> StepResult<()> {
    expect_flag("terminated", status_reading(host_lifecycle_state)?.terminated, false)
}

#[then("the host is pending termination")]
fn host_is_pending(host_lifecycle_state: &HostLifecycleState) -> StepResult<()> {
    expect_flag("pending", status_reading(host_lifecycle_state)?.pending, true)
}

#[then("the host is not pending termination")]
fn host_is_not_pending(host_lifecycle_state: &HostLifecycleState) -> StepResult<()> {
    expect_flag("pending", status_reading(host_lifecycle_state)?.pending, false)
}

fn expect_flag(name: &str, actual: bool, expected: bool) -> StepResult<()> {
    if actual == expected {
        Ok(())
    } else {
        Err(format!("expected {name} to be {expected}, got {actual}"))
    }
}
