//! Transport-agnostic command layer for the task service.
//!
//! An HTTP front end decodes requests into the body types here, calls the
//! matching [`TaskApi`] method, and writes the returned [`ApiResponse`] back
//! verbatim. Routing and request parsing stay with that front end.

use crate::task::{
    domain::{Task, TaskId, TaskStatus},
    ports::TaskRepository,
    services::{CreateTaskRequest, TaskErrorKind, TaskLifecycleError, TaskLifecycleService},
};
use chrono::{DateTime, Utc};
use http::StatusCode;
use mockable::Clock;
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};

/// Body of a create-task command.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateTaskBody {
    /// Display title.
    pub title: String,
    /// Optional free text.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Requested priority, validated by the service.
    pub priority: i64,
    /// Optional deadline.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub due_by: Option<DateTime<Utc>>,
}

/// Body of a change-priority command.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpdatePriorityBody {
    /// Requested priority, validated by the service.
    pub priority: i64,
}

/// Wire representation of a task.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskResponse {
    /// Task identifier as a hyphenated UUID string.
    pub task_id: String,
    /// Display title.
    pub title: String,
    /// Optional free text.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Priority in `1..=10`.
    pub priority: u8,
    /// Lifecycle status.
    pub status: TaskStatus,
    /// Optional deadline.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub due_by: Option<DateTime<Utc>>,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Latest write timestamp.
    pub updated_at: DateTime<Utc>,
}

impl From<&Task> for TaskResponse {
    fn from(task: &Task) -> Self {
        Self {
            task_id: task.id().to_string(),
            title: task.title().to_owned(),
            description: task.description().map(str::to_owned),
            priority: task.priority().value(),
            status: task.status(),
            due_by: task.due_by(),
            created_at: task.created_at(),
            updated_at: task.updated_at(),
        }
    }
}

/// Wire representation of a failure.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorBody {
    /// Error kind name, for example `NotFound`.
    pub error: String,
    /// Human-readable detail.
    pub message: String,
}

/// Status code and JSON body produced for one command.
#[derive(Debug, Clone, PartialEq)]
pub struct ApiResponse {
    /// Transport status.
    pub status: StatusCode,
    /// JSON payload.
    pub body: Value,
}

impl ApiResponse {
    fn task(status: StatusCode, task: &Task) -> Self {
        Self::json(status, &TaskResponse::from(task))
    }

    fn error(kind: TaskErrorKind, message: impl Into<String>) -> Self {
        let body = ErrorBody {
            error: kind.as_str().to_owned(),
            message: message.into(),
        };
        Self::json(status_code(kind), &body)
    }

    fn json(status: StatusCode, payload: &impl Serialize) -> Self {
        match serde_json::to_value(payload) {
            Ok(body) => Self { status, body },
            Err(err) => {
                tracing::error!(error = %err, "failed to encode response body");
                Self {
                    status: StatusCode::INTERNAL_SERVER_ERROR,
                    body: json!({ "error": "Internal", "message": err.to_string() }),
                }
            }
        }
    }

    /// Decodes the body as a task, if it is one.
    ///
    /// # Errors
    ///
    /// Returns the decode error when the body is not a task.
    pub fn task_body(&self) -> Result<TaskResponse, serde_json::Error> {
        TaskResponse::deserialize(&self.body)
    }
}

/// Maps an error kind to its transport status.
#[must_use]
pub const fn status_code(kind: TaskErrorKind) -> StatusCode {
    match kind {
        TaskErrorKind::InvalidArgument => StatusCode::BAD_REQUEST,
        TaskErrorKind::NotFound => StatusCode::NOT_FOUND,
        TaskErrorKind::AlreadyExists
        | TaskErrorKind::InvalidTransition
        | TaskErrorKind::ConflictRetry => StatusCode::CONFLICT,
        TaskErrorKind::StorageUnavailable => StatusCode::SERVICE_UNAVAILABLE,
    }
}

/// Command handlers for create, get, change-priority, and cancel.
pub struct TaskApi<R, C>
where
    R: TaskRepository + ?Sized,
    C: Clock + Send + Sync,
{
    service: TaskLifecycleService<R, C>,
}

impl<R, C> TaskApi<R, C>
where
    R: TaskRepository + ?Sized,
    C: Clock + Send + Sync,
{
    /// Creates the command layer over a lifecycle service.
    #[must_use]
    pub const fn new(service: TaskLifecycleService<R, C>) -> Self {
        Self { service }
    }

    /// Handles a create command; `201` on success.
    pub async fn create_task(&self, body: CreateTaskBody) -> ApiResponse {
        let mut request = CreateTaskRequest::new(body.title, body.priority);
        if let Some(description) = body.description {
            request = request.with_description(description);
        }
        if let Some(due_by) = body.due_by {
            request = request.with_due_by(due_by);
        }

        match self.service.create(request).await {
            Ok(task) => ApiResponse::task(StatusCode::CREATED, &task),
            Err(err) => error_response(&err),
        }
    }

    /// Handles a fetch; malformed and unknown identifiers both yield `404`.
    pub async fn get_task(&self, task_id: &str) -> ApiResponse {
        let Some(id) = TaskId::parse(task_id) else {
            return unknown_id(task_id);
        };
        match self.service.get(id).await {
            Ok(Some(task)) => ApiResponse::task(StatusCode::OK, &task),
            Ok(None) => error_response(&TaskLifecycleError::NotFound(id)),
            Err(err) => error_response(&err),
        }
    }

    /// Handles a change-priority command; `200` on success.
    pub async fn update_task_priority(
        &self,
        task_id: &str,
        body: UpdatePriorityBody,
    ) -> ApiResponse {
        let Some(id) = TaskId::parse(task_id) else {
            return unknown_id(task_id);
        };
        match self.service.change_priority(id, body.priority).await {
            Ok(task) => ApiResponse::task(StatusCode::OK, &task),
            Err(err) => error_response(&err),
        }
    }

    /// Handles a cancel command; `200` on success.
    pub async fn cancel_task(&self, task_id: &str) -> ApiResponse {
        let Some(id) = TaskId::parse(task_id) else {
            return unknown_id(task_id);
        };
        match self.service.cancel(id).await {
            Ok(task) => ApiResponse::task(StatusCode::OK, &task),
            Err(err) => error_response(&err),
        }
    }
}

fn unknown_id(raw: &str) -> ApiResponse {
    ApiResponse::error(TaskErrorKind::NotFound, format!("task {raw} not found"))
}

fn error_response(err: &TaskLifecycleError) -> ApiResponse {
    let kind = err.kind();
    if kind == TaskErrorKind::StorageUnavailable {
        tracing::error!(error = %err, "task storage unavailable");
    }
    ApiResponse::error(kind, err.to_string())
}
