/// Task lifecycle rules: input validation and the delete-state machine
///
/// This module decides, as pure functions, what a task mutation is allowed
/// to do. Handlers parse the request, call a planner here, then write the
/// planned outcome through the model layer. Nothing in this module touches
/// the database.
///
/// # Delete-state machine
///
/// ```text
///                 soft delete
///        live ───────────────► soft-deleted
///          │                        │
///          │ hard delete            │ hard delete
///          ▼                        ▼
///         gone ◄──────────────── gone
/// ```
///
/// Soft-deleting an already soft-deleted task is rejected; hard delete is
/// accepted from either state and is terminal.

use chrono::{DateTime, Utc};

use crate::models::task::{DeleteState, TaskPriority, TaskStatus, UpdateTaskFields};
use crate::policy::FieldError;

/// Minimum length for task title and description
pub const TEXT_MIN: usize = 4;

/// Maximum length for task title and description
pub const TEXT_MAX: usize = 255;

/// Error type for lifecycle decisions
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LifecycleError {
    /// Soft delete requested on a task that is already soft-deleted
    #[error("Task already deleted")]
    AlreadyDeleted,

    /// The request used the wrong query parameter for the soft-delete intent
    #[error("Invalid query param. Use hard_delete=true")]
    InvalidDeleteParam,

    /// One or more fields violate the task validation rules
    #[error("Validation error")]
    Invalid(Vec<FieldError>),
}

/// Which delete the caller asked for
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeleteMode {
    /// Mark hidden, keep the row
    Soft,

    /// Remove the row permanently
    Hard,
}

/// The write the delete planner decided on
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeleteAction {
    /// Set is_deleted and record the timestamp
    SoftDelete {
        /// Timestamp to store in deleted_at
        deleted_at: DateTime<Utc>,
    },

    /// Remove the row
    HardDelete,
}

/// Resolves the delete mode from the request's query parameters
///
/// `hard_delete=true` (exactly the string "true") selects a hard delete;
/// anything else falls back to soft. A `soft_delete` key of any value is
/// rejected outright with a message naming the parameter that does exist.
pub fn delete_mode_from_query(
    hard_delete: Option<&str>,
    has_soft_delete_key: bool,
) -> Result<DeleteMode, LifecycleError> {
    if has_soft_delete_key {
        return Err(LifecycleError::InvalidDeleteParam);
    }

    if hard_delete == Some("true") {
        Ok(DeleteMode::Hard)
    } else {
        Ok(DeleteMode::Soft)
    }
}

/// Plans a delete against the task's current state
///
/// Hard delete succeeds from either state: it is the escape hatch for rows
/// that are already soft-deleted. Soft delete only applies to live rows.
pub fn plan_delete(
    state: DeleteState,
    mode: DeleteMode,
    now: DateTime<Utc>,
) -> Result<DeleteAction, LifecycleError> {
    match (mode, state) {
        (DeleteMode::Hard, _) => Ok(DeleteAction::HardDelete),
        (DeleteMode::Soft, DeleteState::Live) => Ok(DeleteAction::SoftDelete { deleted_at: now }),
        (DeleteMode::Soft, DeleteState::SoftDeleted { .. }) => Err(LifecycleError::AlreadyDeleted),
    }
}

fn check_text(field: &str, value: &str, errors: &mut Vec<FieldError>) {
    let len = value.chars().count();
    if len < TEXT_MIN {
        errors.push(FieldError::new(
            field,
            format!(
                "{} must be at least {} characters",
                capitalize(field),
                TEXT_MIN
            ),
        ));
    } else if len > TEXT_MAX {
        errors.push(FieldError::new(
            field,
            format!("{} must be less than {} characters", capitalize(field), TEXT_MAX),
        ));
    }
}

fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
        None => String::new(),
    }
}

/// Validates the fields of a task creation request
///
/// All failures are collected and reported together. The due date has no
/// relation to "now" at creation time; it only needs to be a parseable
/// timestamp, which the request decoding already guaranteed.
pub fn validate_create(
    title: &str,
    description: &str,
    status: &str,
    priority: &str,
) -> Result<(TaskStatus, TaskPriority), LifecycleError> {
    let mut errors = Vec::new();

    check_text("title", title, &mut errors);
    check_text("description", description, &mut errors);

    let status = match status.parse::<TaskStatus>() {
        Ok(status) => Some(status),
        Err(msg) => {
            errors.push(FieldError::new("status", msg));
            None
        }
    };

    let priority = match priority.parse::<TaskPriority>() {
        Ok(priority) => Some(priority),
        Err(msg) => {
            errors.push(FieldError::new("priority", msg));
            None
        }
    };

    if !errors.is_empty() {
        return Err(LifecycleError::Invalid(errors));
    }

    // Both are Some when no error was recorded
    Ok((status.unwrap(), priority.unwrap()))
}

/// Validates the fields of a task update request
///
/// Only description, status, priority and due_date may change; unknown
/// fields are rejected during request decoding before this runs. A supplied
/// due date must not lie in the future relative to `now`.
///
/// Does NOT look at the task's delete state: the route guard keeps
/// soft-deleted tasks out of the update path entirely.
pub fn validate_update(
    description: Option<&str>,
    status: Option<&str>,
    priority: Option<&str>,
    due_date: Option<DateTime<Utc>>,
    now: DateTime<Utc>,
) -> Result<UpdateTaskFields, LifecycleError> {
    let mut errors = Vec::new();
    let mut fields = UpdateTaskFields::default();

    if let Some(description) = description {
        check_text("description", description, &mut errors);
        fields.description = Some(description.to_string());
    }

    if let Some(status) = status {
        match status.parse::<TaskStatus>() {
            Ok(status) => fields.status = Some(status),
            Err(msg) => errors.push(FieldError::new("status", msg)),
        }
    }

    if let Some(priority) = priority {
        match priority.parse::<TaskPriority>() {
            Ok(priority) => fields.priority = Some(priority),
            Err(msg) => errors.push(FieldError::new("priority", msg)),
        }
    }

    if let Some(due_date) = due_date {
        if due_date > now {
            errors.push(FieldError::new("due_date", "Due date cannot be in the future"));
        } else {
            fields.due_date = Some(due_date);
        }
    }

    if !errors.is_empty() {
        return Err(LifecycleError::Invalid(errors));
    }

    Ok(fields)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    #[test]
    fn test_delete_mode_defaults_to_soft() {
        assert_eq!(delete_mode_from_query(None, false).unwrap(), DeleteMode::Soft);
        // Anything but the literal string "true" is not a hard delete
        assert_eq!(
            delete_mode_from_query(Some("1"), false).unwrap(),
            DeleteMode::Soft
        );
        assert_eq!(
            delete_mode_from_query(Some("TRUE"), false).unwrap(),
            DeleteMode::Soft
        );
    }

    #[test]
    fn test_delete_mode_hard() {
        assert_eq!(
            delete_mode_from_query(Some("true"), false).unwrap(),
            DeleteMode::Hard
        );
    }

    #[test]
    fn test_soft_delete_query_key_rejected_whatever_its_value() {
        let err = delete_mode_from_query(None, true).unwrap_err();
        assert_eq!(err, LifecycleError::InvalidDeleteParam);
        assert_eq!(err.to_string(), "Invalid query param. Use hard_delete=true");

        // Even together with a valid hard_delete flag
        let err = delete_mode_from_query(Some("true"), true).unwrap_err();
        assert_eq!(err, LifecycleError::InvalidDeleteParam);
    }

    #[test]
    fn test_plan_soft_delete_of_live_task() {
        let now = Utc::now();
        let action = plan_delete(DeleteState::Live, DeleteMode::Soft, now).unwrap();
        assert_eq!(action, DeleteAction::SoftDelete { deleted_at: now });
    }

    #[test]
    fn test_second_soft_delete_rejected() {
        let state = DeleteState::SoftDeleted { deleted_at: Utc::now() };
        let err = plan_delete(state, DeleteMode::Soft, Utc::now()).unwrap_err();
        assert_eq!(err, LifecycleError::AlreadyDeleted);
    }

    #[test]
    fn test_hard_delete_always_succeeds() {
        let now = Utc::now();
        assert_eq!(
            plan_delete(DeleteState::Live, DeleteMode::Hard, now).unwrap(),
            DeleteAction::HardDelete
        );
        assert_eq!(
            plan_delete(
                DeleteState::SoftDeleted { deleted_at: now },
                DeleteMode::Hard,
                now
            )
            .unwrap(),
            DeleteAction::HardDelete
        );
    }

    #[test]
    fn test_validate_create_happy_path() {
        let (status, priority) =
            validate_create("Write report", "Quarterly numbers", "pending", "high").unwrap();
        assert_eq!(status, TaskStatus::Pending);
        assert_eq!(priority, TaskPriority::High);
    }

    #[test]
    fn test_validate_create_collects_all_errors() {
        let err = validate_create("abc", "x", "done", "urgent").unwrap_err();
        let LifecycleError::Invalid(errors) = err else {
            panic!("expected Invalid");
        };

        let fields: Vec<&str> = errors.iter().map(|e| e.field.as_str()).collect();
        assert_eq!(fields, ["title", "description", "status", "priority"]);
    }

    #[test]
    fn test_validate_create_length_bounds() {
        // Exactly 4 characters is valid, 3 is not
        assert!(validate_create("abcd", "abcd", "pending", "low").is_ok());
        assert!(validate_create("abc", "abcd", "pending", "low").is_err());

        let long = "x".repeat(256);
        assert!(validate_create(&long, "abcd", "pending", "low").is_err());
        let max = "x".repeat(255);
        assert!(validate_create(&max, "abcd", "pending", "low").is_ok());
    }

    #[test]
    fn test_validate_update_allowed_fields() {
        let now = Utc::now();
        let fields = validate_update(
            Some("New description"),
            Some("completed"),
            Some("low"),
            Some(now - Duration::hours(1)),
            now,
        )
        .unwrap();

        assert_eq!(fields.description.as_deref(), Some("New description"));
        assert_eq!(fields.status, Some(TaskStatus::Completed));
        assert_eq!(fields.priority, Some(TaskPriority::Low));
        assert!(fields.due_date.is_some());
    }

    #[test]
    fn test_validate_update_rejects_future_due_date() {
        let now = Utc::now();
        let err = validate_update(None, None, None, Some(now + Duration::hours(1)), now)
            .unwrap_err();

        let LifecycleError::Invalid(errors) = err else {
            panic!("expected Invalid");
        };
        assert_eq!(errors[0].field, "due_date");
        assert_eq!(errors[0].message, "Due date cannot be in the future");
    }

    #[test]
    fn test_validate_update_empty_is_fine() {
        let now = Utc::now();
        let fields = validate_update(None, None, None, None, now).unwrap();
        assert!(fields.description.is_none());
        assert!(fields.status.is_none());
        assert!(fields.priority.is_none());
        assert!(fields.due_date.is_none());
    }

    #[test]
    fn test_validate_update_short_description() {
        let now = Utc::now();
        let err = validate_update(Some("abc"), None, None, None, now).unwrap_err();
        let LifecycleError::Invalid(errors) = err else {
            panic!("expected Invalid");
        };
        assert_eq!(errors[0].field, "description");
    }
}
