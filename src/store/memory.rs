//! In-memory store.
//!
//! Backs the server when no `DATABASE_URL` is configured and backs the test
//! suite. All maps sit behind one lock that is never held across an `.await`.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use log::debug;
use parking_lot::RwLock;
use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::sync::Arc;

use super::{Store, StoreResult};
use crate::error::AppError;
use crate::models::{
    NewProject, NewTask, NewUser, PasswordResetToken, Project, Task, User, DEFAULT_PERSONALITY,
};

#[derive(Default)]
struct State {
    next_user_id: i64,
    next_project_id: i64,
    next_task_id: i64,
    users: BTreeMap<i64, User>,
    projects: BTreeMap<i64, Project>,
    tasks: BTreeMap<i64, Task>,
    /// user id -> assigned task ids
    assignments: HashMap<i64, BTreeSet<i64>>,
    reset_tokens: HashMap<String, PasswordResetToken>,
}

impl State {
    fn next_id(counter: &mut i64) -> i64 {
        *counter += 1;
        *counter
    }

    fn unassign_task(&mut self, task_id: i64) {
        for tasks in self.assignments.values_mut() {
            tasks.remove(&task_id);
        }
    }

    fn user_mut(&mut self, user_id: i64) -> StoreResult<&mut User> {
        self.users
            .get_mut(&user_id)
            .ok_or_else(|| AppError::NotFound(format!("No user with id {}", user_id)))
    }
}

#[derive(Clone, Default)]
pub struct MemoryStore {
    state: Arc<RwLock<State>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl Store for MemoryStore {
    fn backend(&self) -> &'static str {
        "memory"
    }

    async fn ping(&self) -> StoreResult<()> {
        Ok(())
    }

    async fn insert_user(&self, user: NewUser) -> StoreResult<User> {
        let mut state = self.state.write();
        if state
            .users
            .values()
            .any(|u| u.username == user.username || u.email == user.email)
        {
            return Err(AppError::BadRequest(
                "Username or email already registered".into(),
            ));
        }
        let id = State::next_id(&mut state.next_user_id);
        let stored = User {
            id,
            username: user.username,
            email: user.email,
            password_hash: user.password_hash,
            personality: DEFAULT_PERSONALITY.to_string(),
            roles: user.roles.iter().map(|r| r.as_str().to_string()).collect(),
        };
        state.users.insert(id, stored.clone());
        debug!("memory store: inserted user {}", id);
        Ok(stored)
    }

    async fn find_user_by_username(&self, username: &str) -> StoreResult<Option<User>> {
        let state = self.state.read();
        Ok(state.users.values().find(|u| u.username == username).cloned())
    }

    async fn find_user_by_email(&self, email: &str) -> StoreResult<Option<User>> {
        let state = self.state.read();
        Ok(state.users.values().find(|u| u.email == email).cloned())
    }

    async fn update_user_email(&self, user_id: i64, email: &str) -> StoreResult<()> {
        let mut state = self.state.write();
        if state
            .users
            .values()
            .any(|u| u.id != user_id && u.email == email)
        {
            return Err(AppError::BadRequest("Email already registered".into()));
        }
        state.user_mut(user_id)?.email = email.to_string();
        Ok(())
    }

    async fn update_user_password(&self, user_id: i64, password_hash: &str) -> StoreResult<()> {
        let mut state = self.state.write();
        state.user_mut(user_id)?.password_hash = password_hash.to_string();
        Ok(())
    }

    async fn update_user_personality(&self, user_id: i64, personality: &str) -> StoreResult<()> {
        let mut state = self.state.write();
        state.user_mut(user_id)?.personality = personality.to_string();
        Ok(())
    }

    async fn delete_user(&self, user_id: i64) -> StoreResult<()> {
        let mut state = self.state.write();
        state.users.remove(&user_id);
        state.assignments.remove(&user_id);
        state.reset_tokens.retain(|_, t| t.user_id != user_id);
        Ok(())
    }

    async fn insert_project(&self, project: NewProject) -> StoreResult<Project> {
        let mut state = self.state.write();
        let id = State::next_id(&mut state.next_project_id);
        let stored = Project {
            id,
            title: project.title,
            description: project.description,
            start_date: project.start_date,
            target_date: project.target_date,
            checked: project.checked,
            priority: project.priority,
            owner_id: project.owner_id,
        };
        state.projects.insert(id, stored.clone());
        Ok(stored)
    }

    async fn find_project(&self, id: i64) -> StoreResult<Option<Project>> {
        Ok(self.state.read().projects.get(&id).cloned())
    }

    async fn projects_by_owner(&self, owner_id: i64) -> StoreResult<Vec<Project>> {
        let state = self.state.read();
        let mut projects: Vec<Project> = state
            .projects
            .values()
            .filter(|p| p.owner_id == owner_id)
            .cloned()
            .collect();
        projects.sort_by_key(|p| (p.priority, p.id));
        Ok(projects)
    }

    async fn update_project(&self, project: &Project) -> StoreResult<Project> {
        let mut state = self.state.write();
        match state.projects.get_mut(&project.id) {
            Some(stored) => {
                *stored = project.clone();
                Ok(stored.clone())
            }
            None => Err(AppError::NotFound(format!("No project with id {}", project.id))),
        }
    }

    async fn delete_project(&self, id: i64) -> StoreResult<()> {
        let mut state = self.state.write();
        let orphaned: Vec<i64> = state
            .tasks
            .values()
            .filter(|t| t.project_id == Some(id))
            .map(|t| t.id)
            .collect();
        for task_id in orphaned {
            state.unassign_task(task_id);
            state.tasks.remove(&task_id);
        }
        state.projects.remove(&id);
        Ok(())
    }

    async fn insert_task(&self, task: NewTask, assignee: i64) -> StoreResult<Task> {
        let mut state = self.state.write();
        let id = State::next_id(&mut state.next_task_id);
        let stored = Task {
            id,
            title: task.title,
            description: task.description,
            start_date: task.start_date,
            target_date: task.target_date,
            checked: task.checked,
            completed_on: task.completed_on,
            priority: task.priority,
            project_priority: task.project_priority,
            project_id: task.project_id,
        };
        state.tasks.insert(id, stored.clone());
        state.assignments.entry(assignee).or_default().insert(id);
        Ok(stored)
    }

    async fn find_task(&self, id: i64) -> StoreResult<Option<Task>> {
        Ok(self.state.read().tasks.get(&id).cloned())
    }

    async fn tasks_for_user(&self, user_id: i64) -> StoreResult<Vec<Task>> {
        let state = self.state.read();
        Ok(state
            .assignments
            .get(&user_id)
            .map(|ids| ids.iter().filter_map(|id| state.tasks.get(id).cloned()).collect())
            .unwrap_or_default())
    }

    async fn tasks_in_project(&self, project_id: i64) -> StoreResult<Vec<Task>> {
        let state = self.state.read();
        Ok(state
            .tasks
            .values()
            .filter(|t| t.project_id == Some(project_id))
            .cloned()
            .collect())
    }

    async fn is_assigned(&self, task_id: i64, user_id: i64) -> StoreResult<bool> {
        let state = self.state.read();
        Ok(state
            .assignments
            .get(&user_id)
            .map_or(false, |ids| ids.contains(&task_id)))
    }

    async fn task_assignees(&self, task_id: i64) -> StoreResult<Vec<User>> {
        let state = self.state.read();
        let mut users: Vec<User> = state
            .assignments
            .iter()
            .filter(|(_, ids)| ids.contains(&task_id))
            .filter_map(|(user_id, _)| state.users.get(user_id).cloned())
            .collect();
        users.sort_by_key(|u| u.id);
        Ok(users)
    }

    async fn update_task(&self, task: &Task) -> StoreResult<Task> {
        let mut state = self.state.write();
        match state.tasks.get_mut(&task.id) {
            Some(stored) => {
                *stored = task.clone();
                Ok(stored.clone())
            }
            None => Err(AppError::NotFound(format!("No task with id {}", task.id))),
        }
    }

    async fn delete_task(&self, id: i64) -> StoreResult<()> {
        let mut state = self.state.write();
        state.unassign_task(id);
        state.tasks.remove(&id);
        Ok(())
    }

    async fn current_tasks(
        &self,
        user_id: i64,
        project_id: Option<i64>,
        completed_after: DateTime<Utc>,
    ) -> StoreResult<Vec<Task>> {
        let state = self.state.read();
        let mut tasks: Vec<Task> = state
            .assignments
            .get(&user_id)
            .into_iter()
            .flatten()
            .filter_map(|id| state.tasks.get(id))
            .filter(|t| project_id.map_or(true, |p| t.project_id == Some(p)))
            .filter(|t| t.is_current(completed_after))
            .cloned()
            .collect();
        tasks.sort_by_key(|t| (t.priority, t.id));
        Ok(tasks)
    }

    async fn insert_reset_token(&self, token: &PasswordResetToken) -> StoreResult<bool> {
        let mut state = self.state.write();
        if state.reset_tokens.contains_key(&token.token) {
            return Ok(false);
        }
        state.reset_tokens.insert(token.token.clone(), token.clone());
        Ok(true)
    }

    async fn find_reset_token(&self, token: &str) -> StoreResult<Option<PasswordResetToken>> {
        Ok(self.state.read().reset_tokens.get(token).cloned())
    }

    async fn delete_reset_token(&self, token: &str) -> StoreResult<()> {
        self.state.write().reset_tokens.remove(token);
        Ok(())
    }
}
