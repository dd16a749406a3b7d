//! Persistence boundary.
//!
//! Services only ever talk to a [`Store`]. Relationships are explicit foreign
//! keys (`Project::owner_id`, `Task::project_id`) plus the task-assignment
//! index, so no store ever hands out back-referencing object graphs.

pub mod memory;
pub mod postgres;

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::error::AppError;
use crate::models::{NewProject, NewTask, NewUser, PasswordResetToken, Project, Task, User};

pub use memory::MemoryStore;
pub use postgres::PgStore;

pub type StoreResult<T> = Result<T, AppError>;

#[async_trait]
pub trait Store: Send + Sync {
    /// Short name of the backend, reported by the health probe.
    fn backend(&self) -> &'static str;
    /// Fails when the backend cannot serve queries.
    async fn ping(&self) -> StoreResult<()>;

    // Credentials

    async fn insert_user(&self, user: NewUser) -> StoreResult<User>;
    async fn find_user_by_username(&self, username: &str) -> StoreResult<Option<User>>;
    async fn find_user_by_email(&self, email: &str) -> StoreResult<Option<User>>;
    async fn update_user_email(&self, user_id: i64, email: &str) -> StoreResult<()>;
    async fn update_user_password(&self, user_id: i64, password_hash: &str) -> StoreResult<()>;
    async fn update_user_personality(&self, user_id: i64, personality: &str) -> StoreResult<()>;
    /// Removes the user row along with its assignments and reset tokens.
    async fn delete_user(&self, user_id: i64) -> StoreResult<()>;

    // Projects

    async fn insert_project(&self, project: NewProject) -> StoreResult<Project>;
    async fn find_project(&self, id: i64) -> StoreResult<Option<Project>>;
    /// Owned projects ordered by priority, then id.
    async fn projects_by_owner(&self, owner_id: i64) -> StoreResult<Vec<Project>>;
    async fn update_project(&self, project: &Project) -> StoreResult<Project>;
    async fn delete_project(&self, id: i64) -> StoreResult<()>;

    // Tasks

    /// Inserts the task and assigns it to `assignee`.
    async fn insert_task(&self, task: NewTask, assignee: i64) -> StoreResult<Task>;
    async fn find_task(&self, id: i64) -> StoreResult<Option<Task>>;
    async fn tasks_for_user(&self, user_id: i64) -> StoreResult<Vec<Task>>;
    async fn tasks_in_project(&self, project_id: i64) -> StoreResult<Vec<Task>>;
    async fn is_assigned(&self, task_id: i64, user_id: i64) -> StoreResult<bool>;
    /// Users assigned to a task, ordered by id.
    async fn task_assignees(&self, task_id: i64) -> StoreResult<Vec<User>>;
    async fn update_task(&self, task: &Task) -> StoreResult<Task>;
    /// Removes every assignment of the task, then the task itself.
    async fn delete_task(&self, id: i64) -> StoreResult<()>;
    /// Tasks assigned to the user, optionally restricted to one project, that
    /// are open or were completed after `completed_after`; ordered by priority.
    async fn current_tasks(
        &self,
        user_id: i64,
        project_id: Option<i64>,
        completed_after: DateTime<Utc>,
    ) -> StoreResult<Vec<Task>>;

    // Password reset tokens

    /// Stores the token unless one with the same value already exists.
    /// Returns `false` on such a collision and leaves the existing token alone.
    async fn insert_reset_token(&self, token: &PasswordResetToken) -> StoreResult<bool>;
    async fn find_reset_token(&self, token: &str) -> StoreResult<Option<PasswordResetToken>>;
    async fn delete_reset_token(&self, token: &str) -> StoreResult<()>;
}
