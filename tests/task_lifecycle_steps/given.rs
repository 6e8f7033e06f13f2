//! Given steps for task lifecycle BDD scenarios.

use super::world::{TaskLifecycleWorld, run_async};
use chrono::Utc;
use eyre::WrapErr;
use rstest_bdd_macros::given;
use task_cluster::{
    config::{TaskClusterConfig, build_repository},
    task::domain::{PersistedTaskData, Priority, Task, TaskId, TaskStatus},
};

#[given(r#"a task service backed by "{backend}" storage"#)]
fn service_with_backend(
    world: &mut TaskLifecycleWorld,
    backend: String,
) -> Result<(), eyre::Report> {
    let config = TaskClusterConfig::from_lookup(|key| {
        (key == task_cluster::config::STORAGE_VAR).then(|| backend.clone())
    })
    .wrap_err("load scenario configuration")?;
    let repository = build_repository(&config).wrap_err("build scenario repository")?;
    world.install(repository);
    Ok(())
}

#[given(r#"a stored task in state "{state}""#)]
fn stored_task_in_state(world: &mut TaskLifecycleWorld, state: String) -> Result<(), eyre::Report> {
    let status = TaskStatus::try_from(state.as_str())
        .map_err(|err| eyre::eyre!("invalid state in scenario: {err}"))?;
    let repository = world
        .repository
        .clone()
        .ok_or_else(|| eyre::eyre!("scenario did not choose a storage backend"))?;
    let now = Utc::now();
    let task = Task::from_persisted(PersistedTaskData {
        task_id: TaskId::new(),
        title: "Seeded task".to_owned(),
        description: None,
        priority: Priority::new(4)?,
        due_by: None,
        status,
        created_at: now,
        updated_at: now,
    });

    let stored = run_async(repository.create(&task)).wrap_err("seed task")?;
    world.current_task_id = Some(stored.id().to_string());
    Ok(())
}
