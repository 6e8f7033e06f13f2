//! Then steps for task lifecycle BDD scenarios.

use super::world::TaskLifecycleWorld;
use rstest_bdd_macros::then;
use task_cluster::task::domain::TaskStatus;

#[then("the command returns status {status:u16}")]
fn command_returns_status(world: &TaskLifecycleWorld, status: u16) -> Result<(), eyre::Report> {
    let response = world.response()?;
    eyre::ensure!(
        response.status.as_u16() == status,
        "expected status {status}, got {} with body {}",
        response.status,
        response.body
    );
    Ok(())
}

#[then(r#"the command fails with status {status:u16} and error "{error}""#)]
fn command_fails_with(
    world: &TaskLifecycleWorld,
    status: u16,
    error: String,
) -> Result<(), eyre::Report> {
    let response = world.response()?;
    eyre::ensure!(
        response.status.as_u16() == status,
        "expected status {status}, got {}",
        response.status
    );
    let kind = response
        .body
        .get("error")
        .and_then(serde_json::Value::as_str)
        .ok_or_else(|| eyre::eyre!("response body has no error kind: {}", response.body))?;
    eyre::ensure!(kind == error, "expected error {error}, got {kind}");
    Ok(())
}

#[then(r#"the task status is "{state}""#)]
fn task_status_is(world: &TaskLifecycleWorld, state: String) -> Result<(), eyre::Report> {
    let expected = TaskStatus::try_from(state.as_str())
        .map_err(|err| eyre::eyre!("invalid expected state in scenario: {err}"))?;
    let task = world.response()?.task_body()?;
    eyre::ensure!(
        task.status == expected,
        "expected status {expected}, found {}",
        task.status
    );
    Ok(())
}

#[then("the task priority is {priority:u8}")]
fn task_priority_is(world: &TaskLifecycleWorld, priority: u8) -> Result<(), eyre::Report> {
    let task = world.response()?.task_body()?;
    eyre::ensure!(
        task.priority == priority,
        "expected priority {priority}, found {}",
        task.priority
    );
    Ok(())
}
