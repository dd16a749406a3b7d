//! Postgres-backed store using runtime-checked `sqlx` queries.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use log::{debug, info};
use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;
use std::time::Duration;

use super::{Store, StoreResult};
use crate::models::{NewProject, NewTask, NewUser, PasswordResetToken, Project, Task, User};

const USER_COLUMNS: &str = "id, username, email, password_hash, personality, roles";
const PROJECT_COLUMNS: &str =
    "id, title, description, start_date, target_date, checked, priority, owner_id";
const TASK_COLUMNS: &str = "id, title, description, start_date, target_date, checked, \
     completed_on, priority, project_priority, project_id";

#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Connects and brings the schema up to date.
    pub async fn connect(database_url: &str) -> StoreResult<Self> {
        let pool = PgPoolOptions::new()
            .max_connections(10)
            .acquire_timeout(Duration::from_secs(30))
            .connect(database_url)
            .await?;
        sqlx::migrate!("./migrations").run(&pool).await?;
        info!("Database connection pool initialized and migrated");
        Ok(Self::new(pool))
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

#[async_trait]
impl Store for PgStore {
    fn backend(&self) -> &'static str {
        "postgres"
    }

    async fn ping(&self) -> StoreResult<()> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }

    async fn insert_user(&self, user: NewUser) -> StoreResult<User> {
        let roles: Vec<String> = user.roles.iter().map(|r| r.as_str().to_string()).collect();
        let stored = sqlx::query_as::<_, User>(&format!(
            "INSERT INTO users (username, email, password_hash, roles) \
             VALUES ($1, $2, $3, $4) RETURNING {}",
            USER_COLUMNS
        ))
        .bind(&user.username)
        .bind(&user.email)
        .bind(&user.password_hash)
        .bind(&roles)
        .fetch_one(&self.pool)
        .await?;
        debug!("Inserted user {}", stored.id);
        Ok(stored)
    }

    async fn find_user_by_username(&self, username: &str) -> StoreResult<Option<User>> {
        let user = sqlx::query_as::<_, User>(&format!(
            "SELECT {} FROM users WHERE username = $1",
            USER_COLUMNS
        ))
        .bind(username)
        .fetch_optional(&self.pool)
        .await?;
        Ok(user)
    }

    async fn find_user_by_email(&self, email: &str) -> StoreResult<Option<User>> {
        let user = sqlx::query_as::<_, User>(&format!(
            "SELECT {} FROM users WHERE email = $1",
            USER_COLUMNS
        ))
        .bind(email)
        .fetch_optional(&self.pool)
        .await?;
        Ok(user)
    }

    async fn update_user_email(&self, user_id: i64, email: &str) -> StoreResult<()> {
        sqlx::query("UPDATE users SET email = $1 WHERE id = $2")
            .bind(email)
            .bind(user_id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn update_user_password(&self, user_id: i64, password_hash: &str) -> StoreResult<()> {
        sqlx::query("UPDATE users SET password_hash = $1 WHERE id = $2")
            .bind(password_hash)
            .bind(user_id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn update_user_personality(&self, user_id: i64, personality: &str) -> StoreResult<()> {
        sqlx::query("UPDATE users SET personality = $1 WHERE id = $2")
            .bind(personality)
            .bind(user_id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn delete_user(&self, user_id: i64) -> StoreResult<()> {
        // Assignments, owned projects and reset tokens cascade.
        sqlx::query("DELETE FROM users WHERE id = $1")
            .bind(user_id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn insert_project(&self, project: NewProject) -> StoreResult<Project> {
        let stored = sqlx::query_as::<_, Project>(&format!(
            "INSERT INTO projects (title, description, start_date, target_date, checked, priority, owner_id) \
             VALUES ($1, $2, $3, $4, $5, $6, $7) RETURNING {}",
            PROJECT_COLUMNS
        ))
        .bind(&project.title)
        .bind(&project.description)
        .bind(project.start_date)
        .bind(project.target_date)
        .bind(project.checked)
        .bind(project.priority)
        .bind(project.owner_id)
        .fetch_one(&self.pool)
        .await?;
        Ok(stored)
    }

    async fn find_project(&self, id: i64) -> StoreResult<Option<Project>> {
        let project = sqlx::query_as::<_, Project>(&format!(
            "SELECT {} FROM projects WHERE id = $1",
            PROJECT_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(project)
    }

    async fn projects_by_owner(&self, owner_id: i64) -> StoreResult<Vec<Project>> {
        let projects = sqlx::query_as::<_, Project>(&format!(
            "SELECT {} FROM projects WHERE owner_id = $1 ORDER BY priority, id",
            PROJECT_COLUMNS
        ))
        .bind(owner_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(projects)
    }

    async fn update_project(&self, project: &Project) -> StoreResult<Project> {
        let stored = sqlx::query_as::<_, Project>(&format!(
            "UPDATE projects \
             SET title = $1, description = $2, start_date = $3, target_date = $4, checked = $5, priority = $6 \
             WHERE id = $7 RETURNING {}",
            PROJECT_COLUMNS
        ))
        .bind(&project.title)
        .bind(&project.description)
        .bind(project.start_date)
        .bind(project.target_date)
        .bind(project.checked)
        .bind(project.priority)
        .bind(project.id)
        .fetch_one(&self.pool)
        .await?;
        Ok(stored)
    }

    async fn delete_project(&self, id: i64) -> StoreResult<()> {
        sqlx::query("DELETE FROM projects WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn insert_task(&self, task: NewTask, assignee: i64) -> StoreResult<Task> {
        let mut tx = self.pool.begin().await?;
        let stored = sqlx::query_as::<_, Task>(&format!(
            "INSERT INTO tasks (title, description, start_date, target_date, checked, completed_on, priority, project_priority, project_id) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9) RETURNING {}",
            TASK_COLUMNS
        ))
        .bind(&task.title)
        .bind(&task.description)
        .bind(task.start_date)
        .bind(task.target_date)
        .bind(task.checked)
        .bind(task.completed_on)
        .bind(task.priority)
        .bind(task.project_priority)
        .bind(task.project_id)
        .fetch_one(&mut *tx)
        .await?;
        sqlx::query("INSERT INTO task_assignees (task_id, user_id) VALUES ($1, $2)")
            .bind(stored.id)
            .bind(assignee)
            .execute(&mut *tx)
            .await?;
        tx.commit().await?;
        Ok(stored)
    }

    async fn find_task(&self, id: i64) -> StoreResult<Option<Task>> {
        let task = sqlx::query_as::<_, Task>(&format!(
            "SELECT {} FROM tasks WHERE id = $1",
            TASK_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(task)
    }

    async fn tasks_for_user(&self, user_id: i64) -> StoreResult<Vec<Task>> {
        let tasks = sqlx::query_as::<_, Task>(&format!(
            "SELECT {} FROM tasks t \
             INNER JOIN task_assignees ta ON ta.task_id = t.id \
             WHERE ta.user_id = $1 ORDER BY t.id",
            prefixed_task_columns()
        ))
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(tasks)
    }

    async fn tasks_in_project(&self, project_id: i64) -> StoreResult<Vec<Task>> {
        let tasks = sqlx::query_as::<_, Task>(&format!(
            "SELECT {} FROM tasks WHERE project_id = $1 ORDER BY id",
            TASK_COLUMNS
        ))
        .bind(project_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(tasks)
    }

    async fn is_assigned(&self, task_id: i64, user_id: i64) -> StoreResult<bool> {
        let (assigned,) = sqlx::query_as::<_, (bool,)>(
            "SELECT EXISTS (SELECT 1 FROM task_assignees WHERE task_id = $1 AND user_id = $2)",
        )
        .bind(task_id)
        .bind(user_id)
        .fetch_one(&self.pool)
        .await?;
        Ok(assigned)
    }

    async fn task_assignees(&self, task_id: i64) -> StoreResult<Vec<User>> {
        let users = sqlx::query_as::<_, User>(
            "SELECT u.id, u.username, u.email, u.password_hash, u.personality, u.roles \
             FROM users u INNER JOIN task_assignees ta ON ta.user_id = u.id \
             WHERE ta.task_id = $1 ORDER BY u.id",
        )
        .bind(task_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(users)
    }

    async fn update_task(&self, task: &Task) -> StoreResult<Task> {
        let stored = sqlx::query_as::<_, Task>(&format!(
            "UPDATE tasks \
             SET title = $1, description = $2, start_date = $3, target_date = $4, checked = $5, \
                 completed_on = $6, priority = $7, project_priority = $8 \
             WHERE id = $9 RETURNING {}",
            TASK_COLUMNS
        ))
        .bind(&task.title)
        .bind(&task.description)
        .bind(task.start_date)
        .bind(task.target_date)
        .bind(task.checked)
        .bind(task.completed_on)
        .bind(task.priority)
        .bind(task.project_priority)
        .bind(task.id)
        .fetch_one(&self.pool)
        .await?;
        Ok(stored)
    }

    async fn delete_task(&self, id: i64) -> StoreResult<()> {
        let mut tx = self.pool.begin().await?;
        sqlx::query("DELETE FROM task_assignees WHERE task_id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;
        sqlx::query("DELETE FROM tasks WHERE id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;
        tx.commit().await?;
        Ok(())
    }

    async fn current_tasks(
        &self,
        user_id: i64,
        project_id: Option<i64>,
        completed_after: DateTime<Utc>,
    ) -> StoreResult<Vec<Task>> {
        let tasks = sqlx::query_as::<_, Task>(&format!(
            "SELECT {} FROM tasks t \
             INNER JOIN task_assignees ta ON ta.task_id = t.id \
             WHERE ta.user_id = $1 \
               AND ($2::BIGINT IS NULL OR t.project_id = $2) \
               AND (t.checked IS NULL OR t.completed_on > $3) \
             ORDER BY t.priority, t.id",
            prefixed_task_columns()
        ))
        .bind(user_id)
        .bind(project_id)
        .bind(completed_after)
        .fetch_all(&self.pool)
        .await?;
        Ok(tasks)
    }

    async fn insert_reset_token(&self, token: &PasswordResetToken) -> StoreResult<bool> {
        let result = sqlx::query(
            "INSERT INTO password_reset_tokens (token, user_id, expiry_date) VALUES ($1, $2, $3) \
             ON CONFLICT (token) DO NOTHING",
        )
        .bind(&token.token)
        .bind(token.user_id)
        .bind(token.expiry_date)
        .execute(&self.pool)
        .await?;
        Ok(result.rows_affected() == 1)
    }

    async fn find_reset_token(&self, token: &str) -> StoreResult<Option<PasswordResetToken>> {
        let found = sqlx::query_as::<_, PasswordResetToken>(
            "SELECT token, user_id, expiry_date FROM password_reset_tokens WHERE token = $1",
        )
        .bind(token)
        .fetch_optional(&self.pool)
        .await?;
        Ok(found)
    }

    async fn delete_reset_token(&self, token: &str) -> StoreResult<()> {
        sqlx::query("DELETE FROM password_reset_tokens WHERE token = $1")
            .bind(token)
            .execute(&self.pool)
            .await?;
        Ok(())
    }
}

fn prefixed_task_columns() -> String {
    TASK_COLUMNS
        .split(", ")
        .map(|column| format!("t.{}", column.trim()))
        .collect::<Vec<_>>()
        .join(", ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prefixed_task_columns() {
        let columns = prefixed_task_columns();
        assert!(columns.starts_with("t.id, t.title"));
        assert!(columns.ends_with("t.project_id"));
        assert!(!columns.contains("  "));
    }
}
