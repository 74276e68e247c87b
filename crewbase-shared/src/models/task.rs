/// Task model and database operations
///
/// This module provides the Task model: a work item with a pending /
/// in progress / completed status axis and an orthogonal soft/hard delete
/// axis.
///
/// # Delete axis
///
/// ```text
/// live → soft-deleted        (soft delete; deleted_at recorded)
/// live → gone                (hard delete)
/// soft-deleted → gone        (hard delete)
/// soft-deleted → soft-deleted  rejected by the lifecycle rules
/// ```
///
/// The database stores the pair `is_deleted BOOLEAN` + `deleted_at
/// TIMESTAMPTZ`, but the model decodes them into a tagged [`DeleteState`]
/// so that "soft-deleted implies a deletion timestamp" holds by
/// construction. A row that violates the pairing fails to decode.
///
/// # Schema
///
/// ```sql
/// CREATE TYPE task_status AS ENUM ('pending', 'in progress', 'completed');
/// CREATE TYPE task_priority AS ENUM ('low', 'medium', 'high');
///
/// CREATE TABLE tasks (
///     id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
///     title VARCHAR(255) NOT NULL,
///     description VARCHAR(255) NOT NULL,
///     status task_status NOT NULL,
///     priority task_priority NOT NULL,
///     due_date TIMESTAMPTZ NOT NULL,
///     is_deleted BOOLEAN NOT NULL DEFAULT FALSE,
///     deleted_at TIMESTAMPTZ,
///     user_id UUID NOT NULL REFERENCES users(id),
///     created_by UUID NOT NULL REFERENCES users(id),
///     updated_by UUID REFERENCES users(id),
///     deleted_by UUID REFERENCES users(id),
///     created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
///     updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
/// );
/// ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

/// Task progress status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "task_status", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum TaskStatus {
    /// Not yet started
    Pending,

    /// Being worked on
    #[sqlx(rename = "in progress")]
    #[serde(rename = "in progress")]
    InProgress,

    /// Done
    Completed,
}

impl TaskStatus {
    /// Converts status to its wire/database string
    pub fn as_str(&self) -> &'static str {
        match self {
            TaskStatus::Pending => "pending",
            TaskStatus::InProgress => "in progress",
            TaskStatus::Completed => "completed",
        }
    }
}

impl fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TaskStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(TaskStatus::Pending),
            "in progress" => Ok(TaskStatus::InProgress),
            "completed" => Ok(TaskStatus::Completed),
            _ => Err("Invalid Status: Use pending, in progress or completed".to_string()),
        }
    }
}

/// Task priority
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "task_priority", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum TaskPriority {
    Low,
    Medium,
    High,
}

impl TaskPriority {
    /// Converts priority to its wire/database string
    pub fn as_str(&self) -> &'static str {
        match self {
            TaskPriority::Low => "low",
            TaskPriority::Medium => "medium",
            TaskPriority::High => "high",
        }
    }
}

impl fmt::Display for TaskPriority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TaskPriority {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "low" => Ok(TaskPriority::Low),
            "medium" => Ok(TaskPriority::Medium),
            "high" => Ok(TaskPriority::High),
            _ => Err("Invalid Priority: Use low, medium or high".to_string()),
        }
    }
}

/// Soft-delete state of a task record
///
/// Hard-deleted tasks have no state: the row is gone. The enum carries the
/// deletion timestamp inside the `SoftDeleted` variant so a soft-deleted
/// task without a timestamp cannot be represented.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeleteState {
    /// Record is visible
    Live,

    /// Record is hidden but still stored
    SoftDeleted {
        /// When the soft delete happened
        deleted_at: DateTime<Utc>,
    },
}

impl DeleteState {
    /// Reassembles the state from its two database columns
    ///
    /// # Errors
    ///
    /// Returns a message when the columns disagree (`is_deleted` set without
    /// a timestamp, or a timestamp on a live row).
    pub fn from_columns(
        is_deleted: bool,
        deleted_at: Option<DateTime<Utc>>,
    ) -> Result<Self, String> {
        match (is_deleted, deleted_at) {
            (false, None) => Ok(DeleteState::Live),
            (true, Some(deleted_at)) => Ok(DeleteState::SoftDeleted { deleted_at }),
            (true, None) => Err("task marked deleted without deleted_at".to_string()),
            (false, Some(_)) => Err("live task carries a deleted_at timestamp".to_string()),
        }
    }

    /// True for the soft-deleted variant
    pub fn is_deleted(&self) -> bool {
        matches!(self, DeleteState::SoftDeleted { .. })
    }

    /// Deletion timestamp, if soft-deleted
    pub fn deleted_at(&self) -> Option<DateTime<Utc>> {
        match self {
            DeleteState::Live => None,
            DeleteState::SoftDeleted { deleted_at } => Some(*deleted_at),
        }
    }
}

/// Raw database row; decoded into [`Task`] via `TryFrom`
#[derive(Debug, Clone, sqlx::FromRow)]
struct TaskRow {
    id: Uuid,
    title: String,
    description: String,
    status: TaskStatus,
    priority: TaskPriority,
    due_date: DateTime<Utc>,
    is_deleted: bool,
    deleted_at: Option<DateTime<Utc>>,
    user_id: Uuid,
    created_by: Uuid,
    updated_by: Option<Uuid>,
    deleted_by: Option<Uuid>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

/// Task model
#[derive(Debug, Clone)]
pub struct Task {
    /// Unique task ID
    pub id: Uuid,

    /// Short title
    pub title: String,

    /// Longer description
    pub description: String,

    /// Progress status
    pub status: TaskStatus,

    /// Priority
    pub priority: TaskPriority,

    /// When the task is due
    pub due_date: DateTime<Utc>,

    /// Soft-delete state
    pub delete_state: DeleteState,

    /// Owning user
    pub user_id: Uuid,

    /// User who created the task (same as owner at creation time)
    pub created_by: Uuid,

    /// Last user to update the task, if any
    pub updated_by: Option<Uuid>,

    /// User who soft-deleted the task, if any
    pub deleted_by: Option<Uuid>,

    /// When the task was created
    pub created_at: DateTime<Utc>,

    /// When the task was last updated
    pub updated_at: DateTime<Utc>,
}

impl TryFrom<TaskRow> for Task {
    type Error = sqlx::Error;

    fn try_from(row: TaskRow) -> Result<Self, Self::Error> {
        let delete_state = DeleteState::from_columns(row.is_deleted, row.deleted_at)
            .map_err(|msg| sqlx::Error::Decode(msg.into()))?;

        Ok(Task {
            id: row.id,
            title: row.title,
            description: row.description,
            status: row.status,
            priority: row.priority,
            due_date: row.due_date,
            delete_state,
            user_id: row.user_id,
            created_by: row.created_by,
            updated_by: row.updated_by,
            deleted_by: row.deleted_by,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

/// Input for creating a new task
///
/// Owner and creator are both the authenticated actor; the lifecycle rules
/// validate the user-supplied fields before this struct is built.
#[derive(Debug, Clone)]
pub struct CreateTask {
    pub title: String,
    pub description: String,
    pub status: TaskStatus,
    pub priority: TaskPriority,
    pub due_date: DateTime<Utc>,

    /// Owning user (the authenticated actor)
    pub user_id: Uuid,

    /// Creator (the authenticated actor)
    pub created_by: Uuid,
}

/// Validated fields a task update may change
///
/// Produced by [`crate::lifecycle::validate_update`]; only `Some` fields are
/// written.
#[derive(Debug, Clone, Default)]
pub struct UpdateTaskFields {
    pub description: Option<String>,
    pub status: Option<TaskStatus>,
    pub priority: Option<TaskPriority>,
    pub due_date: Option<DateTime<Utc>>,
}

const TASK_COLUMNS: &str = "id, title, description, status, priority, due_date, is_deleted, \
                            deleted_at, user_id, created_by, updated_by, deleted_by, \
                            created_at, updated_at";

impl Task {
    /// Creates a new live task
    pub async fn create(pool: &PgPool, data: CreateTask) -> Result<Self, sqlx::Error> {
        let row = sqlx::query_as::<_, TaskRow>(&format!(
            r#"
            INSERT INTO tasks (title, description, status, priority, due_date, user_id, created_by)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING {TASK_COLUMNS}
            "#,
        ))
        .bind(data.title)
        .bind(data.description)
        .bind(data.status)
        .bind(data.priority)
        .bind(data.due_date)
        .bind(data.user_id)
        .bind(data.created_by)
        .fetch_one(pool)
        .await?;

        Task::try_from(row)
    }

    /// Finds a task by ID regardless of delete state
    ///
    /// Used by the delete flow, which must see soft-deleted rows.
    pub async fn find_by_id(pool: &PgPool, id: Uuid) -> Result<Option<Self>, sqlx::Error> {
        let row = sqlx::query_as::<_, TaskRow>(&format!(
            "SELECT {TASK_COLUMNS} FROM tasks WHERE id = $1",
        ))
        .bind(id)
        .fetch_optional(pool)
        .await?;

        row.map(Task::try_from).transpose()
    }

    /// Finds a live (non-soft-deleted) task by ID
    pub async fn find_live_by_id(pool: &PgPool, id: Uuid) -> Result<Option<Self>, sqlx::Error> {
        let row = sqlx::query_as::<_, TaskRow>(&format!(
            "SELECT {TASK_COLUMNS} FROM tasks WHERE id = $1 AND is_deleted = FALSE",
        ))
        .bind(id)
        .fetch_optional(pool)
        .await?;

        row.map(Task::try_from).transpose()
    }

    /// Lists all live tasks, newest first
    pub async fn list_live(pool: &PgPool) -> Result<Vec<Self>, sqlx::Error> {
        let rows = sqlx::query_as::<_, TaskRow>(&format!(
            "SELECT {TASK_COLUMNS} FROM tasks WHERE is_deleted = FALSE ORDER BY created_at DESC",
        ))
        .fetch_all(pool)
        .await?;

        rows.into_iter().map(Task::try_from).collect()
    }

    /// Counts every task row, soft-deleted ones included
    ///
    /// The list endpoint reports this as `total_count` even though the item
    /// list is filtered to live tasks; that asymmetry is part of the API
    /// contract and must not be "fixed" here.
    pub async fn count_all(pool: &PgPool) -> Result<i64, sqlx::Error> {
        let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM tasks")
            .fetch_one(pool)
            .await?;

        Ok(count)
    }

    /// Applies a validated update to a task
    ///
    /// Records `updated_by` and refreshes `updated_at`. Does NOT check the
    /// delete state; the route-level guard keeps soft-deleted tasks out of
    /// this path.
    ///
    /// # Returns
    ///
    /// The updated task if found, None if the id does not resolve
    pub async fn update(
        pool: &PgPool,
        id: Uuid,
        data: UpdateTaskFields,
        updated_by: Uuid,
    ) -> Result<Option<Self>, sqlx::Error> {
        // Build dynamic update query based on which fields are present
        let mut query = String::from("UPDATE tasks SET updated_at = NOW(), updated_by = $2");
        let mut bind_count = 2;

        if data.description.is_some() {
            bind_count += 1;
            query.push_str(&format!(", description = ${}", bind_count));
        }
        if data.status.is_some() {
            bind_count += 1;
            query.push_str(&format!(", status = ${}", bind_count));
        }
        if data.priority.is_some() {
            bind_count += 1;
            query.push_str(&format!(", priority = ${}", bind_count));
        }
        if data.due_date.is_some() {
            bind_count += 1;
            query.push_str(&format!(", due_date = ${}", bind_count));
        }

        query.push_str(&format!(" WHERE id = $1 RETURNING {TASK_COLUMNS}"));

        let mut q = sqlx::query_as::<_, TaskRow>(&query).bind(id).bind(updated_by);

        if let Some(description) = data.description {
            q = q.bind(description);
        }
        if let Some(status) = data.status {
            q = q.bind(status);
        }
        if let Some(priority) = data.priority {
            q = q.bind(priority);
        }
        if let Some(due_date) = data.due_date {
            q = q.bind(due_date);
        }

        let row = q.fetch_optional(pool).await?;

        row.map(Task::try_from).transpose()
    }

    /// Marks a task soft-deleted
    ///
    /// Callers must have planned the transition through
    /// [`crate::lifecycle::plan_delete`] first; this method just writes the
    /// outcome.
    ///
    /// # Returns
    ///
    /// The updated task if found, None if the id does not resolve
    pub async fn soft_delete(
        pool: &PgPool,
        id: Uuid,
        deleted_at: DateTime<Utc>,
        deleted_by: Uuid,
    ) -> Result<Option<Self>, sqlx::Error> {
        let row = sqlx::query_as::<_, TaskRow>(&format!(
            r#"
            UPDATE tasks
            SET is_deleted = TRUE, deleted_at = $2, deleted_by = $3, updated_at = NOW()
            WHERE id = $1
            RETURNING {TASK_COLUMNS}
            "#,
        ))
        .bind(id)
        .bind(deleted_at)
        .bind(deleted_by)
        .fetch_optional(pool)
        .await?;

        row.map(Task::try_from).transpose()
    }

    /// Permanently removes a task row
    ///
    /// # Returns
    ///
    /// True if a row was deleted, false if the task didn't exist
    pub async fn hard_delete(pool: &PgPool, id: Uuid) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM tasks WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}
