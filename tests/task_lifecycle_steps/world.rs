//! Shared world state for task lifecycle BDD scenarios.

use std::sync::Arc;

use mockable::DefaultClock;
use rstest::fixture;
use task_cluster::task::{
    adapters::api::{ApiResponse, TaskApi},
    ports::TaskRepository,
    services::TaskLifecycleService,
};

/// Command layer type used by the BDD world.
pub type TestTaskApi = TaskApi<dyn TaskRepository, DefaultClock>;

/// Scenario world for task lifecycle behaviour tests.
#[derive(Default)]
pub struct TaskLifecycleWorld {
    pub repository: Option<Arc<dyn TaskRepository>>,
    pub api: Option<TestTaskApi>,
    pub current_task_id: Option<String>,
    pub last_response: Option<ApiResponse>,
}

impl TaskLifecycleWorld {
    /// Installs the repository and a command layer over it.
    pub fn install(&mut self, repository: Arc<dyn TaskRepository>) {
        let service = TaskLifecycleService::new(Arc::clone(&repository), Arc::new(DefaultClock));
        self.api = Some(TaskApi::new(service));
        self.repository = Some(repository);
    }

    /// Returns the command layer, failing when no backend was chosen.
    pub fn api(&self) -> Result<&TestTaskApi, eyre::Report> {
        self.api
            .as_ref()
            .ok_or_else(|| eyre::eyre!("scenario did not choose a storage backend"))
    }

    /// Returns the identifier of the task under test.
    pub fn task_id(&self) -> Result<String, eyre::Report> {
        self.current_task_id
            .clone()
            .ok_or_else(|| eyre::eyre!("missing task identifier in scenario world"))
    }

    /// Returns the most recent command response.
    pub fn response(&self) -> Result<&ApiResponse, eyre::Report> {
        self.last_response
            .as_ref()
            .ok_or_else(|| eyre::eyre!("no command has been issued"))
    }
}

/// Fixture that creates a new scenario world.
#[fixture]
pub fn world() -> TaskLifecycleWorld {
    TaskLifecycleWorld::default()
}

/// Runs an async operation within sync step definitions.
pub fn run_async<T>(future: impl std::future::Future<Output = T>) -> T {
    tokio::task::block_in_place(|| tokio::runtime::Handle::current().block_on(future))
}
