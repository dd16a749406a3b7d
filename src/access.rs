//! Ownership checks.
//!
//! Every task and project operation goes through the same gate: resolve the
//! acting user from the token subject, load the resource, then decide
//! [`Access::Allowed`], [`Access::Denied`] or [`Access::NotFound`].
//! A project is reachable only by its owner; a task only by its assignees.

use async_trait::async_trait;
use log::warn;

use crate::auth::Actor;
use crate::error::AppError;
use crate::models::{Project, Task, User};
use crate::store::{Store, StoreResult};

#[derive(Debug, PartialEq)]
pub enum Access<T> {
    Allowed(T),
    Denied,
    NotFound,
}

/// A resource kind the gate knows how to load and check.
#[async_trait]
pub trait Guarded: Sized + Send + Sync {
    fn kind() -> &'static str;
    async fn load(store: &dyn Store, id: i64) -> StoreResult<Option<Self>>;
    async fn permits(&self, store: &dyn Store, actor: &User) -> StoreResult<bool>;
    fn denied() -> AppError;
    fn missing(id: i64) -> AppError;
}

#[async_trait]
impl Guarded for Project {
    fn kind() -> &'static str {
        "project"
    }

    async fn load(store: &dyn Store, id: i64) -> StoreResult<Option<Self>> {
        store.find_project(id).await
    }

    async fn permits(&self, _store: &dyn Store, actor: &User) -> StoreResult<bool> {
        Ok(self.owner_id == actor.id)
    }

    fn denied() -> AppError {
        AppError::AccessDenied("you do not have access to this project".to_string())
    }

    fn missing(id: i64) -> AppError {
        AppError::NoSuchProject(format!("Project Not Found with project id {}", id))
    }
}

#[async_trait]
impl Guarded for Task {
    fn kind() -> &'static str {
        "task"
    }

    async fn load(store: &dyn Store, id: i64) -> StoreResult<Option<Self>> {
        store.find_task(id).await
    }

    async fn permits(&self, store: &dyn Store, actor: &User) -> StoreResult<bool> {
        store.is_assigned(self.id, actor.id).await
    }

    fn denied() -> AppError {
        AppError::AccessDenied("you do not have access to this task".to_string())
    }

    fn missing(id: i64) -> AppError {
        AppError::NoSuchTask(format!("Task Not Found with task id {}", id))
    }
}

impl<T: Guarded> Access<T> {
    pub fn into_result(self, id: i64) -> Result<T, AppError> {
        match self {
            Access::Allowed(resource) => Ok(resource),
            Access::Denied => Err(T::denied()),
            Access::NotFound => Err(T::missing(id)),
        }
    }
}

pub async fn check<T: Guarded>(store: &dyn Store, actor: &User, id: i64) -> StoreResult<Access<T>> {
    let resource = match T::load(store, id).await? {
        Some(resource) => resource,
        None => return Ok(Access::NotFound),
    };

    if resource.permits(store, actor).await? {
        Ok(Access::Allowed(resource))
    } else {
        warn!("{} was denied access to {} {}", actor.username, T::kind(), id);
        Ok(Access::Denied)
    }
}

/// Loads the resource if the actor may touch it.
pub async fn authorize<T: Guarded>(store: &dyn Store, actor: &User, id: i64) -> Result<T, AppError> {
    check::<T>(store, actor, id).await?.into_result(id)
}

/// Maps the token subject back to a stored user.
pub async fn resolve_actor(store: &dyn Store, actor: &Actor) -> Result<User, AppError> {
    store
        .find_user_by_username(actor.username())
        .await?
        .ok_or_else(|| {
            AppError::UsernameNotFound(format!("User Not Found with username {}", actor.username()))
        })
}
