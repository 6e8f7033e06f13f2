//! When steps for task lifecycle BDD scenarios.

use super::world::{TaskLifecycleWorld, run_async};
use rstest_bdd_macros::when;
use task_cluster::task::{
    adapters::api::{CreateTaskBody, UpdatePriorityBody},
    domain::TaskId,
};

#[when(r#"a task titled "{title}" is created with priority {priority:i64}"#)]
fn create_task(
    world: &mut TaskLifecycleWorld,
    title: String,
    priority: i64,
) -> Result<(), eyre::Report> {
    let body = CreateTaskBody {
        title,
        description: None,
        priority,
        due_by: None,
    };
    let response = run_async(world.api()?.create_task(body));
    if let Ok(task) = response.task_body() {
        world.current_task_id = Some(task.task_id);
    }
    world.last_response = Some(response);
    Ok(())
}

#[when("the task priority is changed to {priority:i64}")]
fn change_priority(world: &mut TaskLifecycleWorld, priority: i64) -> Result<(), eyre::Report> {
    let task_id = world.task_id()?;
    let response = run_async(
        world
            .api()?
            .update_task_priority(&task_id, UpdatePriorityBody { priority }),
    );
    world.last_response = Some(response);
    Ok(())
}

#[when("the task is cancelled")]
fn cancel_task(world: &mut TaskLifecycleWorld) -> Result<(), eyre::Report> {
    let task_id = world.task_id()?;
    let response = run_async(world.api()?.cancel_task(&task_id));
    world.last_response = Some(response);
    Ok(())
}

#[when("the task is fetched")]
fn fetch_task(world: &mut TaskLifecycleWorld) -> Result<(), eyre::Report> {
    let task_id = world.task_id()?;
    let response = run_async(world.api()?.get_task(&task_id));
    world.last_response = Some(response);
    Ok(())
}

#[when("an unknown task is fetched")]
fn fetch_unknown_task(world: &mut TaskLifecycleWorld) -> Result<(), eyre::Report> {
    let response = run_async(world.api()?.get_task(&TaskId::new().to_string()));
    world.last_response = Some(response);
    Ok(())
}
