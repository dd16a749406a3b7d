use chrono::{DateTime, Utc};
use futures::future::try_join_all;
use log::info;

use crate::access::{authorize, resolve_actor};
use crate::auth::Actor;
use crate::error::AppError;
use crate::models::{
    NewProject, NewTask, PriorityUpdate, Project, ProjectRequest, ProjectView, Task, TaskRequest,
};
use crate::services::{sorting, tasks};
use crate::store::Store;

async fn view(store: &dyn Store, project: Project) -> Result<ProjectView, AppError> {
    let tasks = store.tasks_in_project(project.id).await?;
    Ok(ProjectView { project, tasks })
}

pub async fn create(
    store: &dyn Store,
    actor: &Actor,
    request: ProjectRequest,
) -> Result<ProjectView, AppError> {
    let user = resolve_actor(store, actor).await?;
    let project = store
        .insert_project(NewProject::from_request(request, user.id))
        .await?;
    info!("{} created project {}", user.username, project.id);
    Ok(ProjectView {
        project,
        tasks: Vec::new(),
    })
}

pub async fn get(store: &dyn Store, actor: &Actor, id: i64) -> Result<ProjectView, AppError> {
    let user = resolve_actor(store, actor).await?;
    let project = authorize::<Project>(store, &user, id).await?;
    view(store, project).await
}

/// Owned projects by ascending priority.
pub async fn all(store: &dyn Store, actor: &Actor) -> Result<Vec<ProjectView>, AppError> {
    let user = resolve_actor(store, actor).await?;
    let owned = store.projects_by_owner(user.id).await?;
    try_join_all(owned.into_iter().map(|project| view(store, project))).await
}

pub async fn all_sorted(
    store: &dyn Store,
    actor: &Actor,
    now: DateTime<Utc>,
) -> Result<Vec<ProjectView>, AppError> {
    let user = resolve_actor(store, actor).await?;
    sorting::sorted_projects(store, &user, now).await
}

/// The actor's current tasks in one project.
pub async fn current_tasks(
    store: &dyn Store,
    actor: &Actor,
    id: i64,
    now: DateTime<Utc>,
) -> Result<Vec<Task>, AppError> {
    let user = resolve_actor(store, actor).await?;
    let project = authorize::<Project>(store, &user, id).await?;
    sorting::current_tasks(store, user.id, Some(project.id), now).await
}

pub async fn update(
    store: &dyn Store,
    actor: &Actor,
    id: i64,
    request: ProjectRequest,
) -> Result<ProjectView, AppError> {
    let user = resolve_actor(store, actor).await?;
    let mut project = authorize::<Project>(store, &user, id).await?;
    project.merge(request);
    let project = store.update_project(&project).await?;
    view(store, project).await
}

/// Applies the updates in order. The first update that fails aborts the
/// batch; the ones before it stay applied.
pub async fn set_priorities(
    store: &dyn Store,
    actor: &Actor,
    updates: Vec<PriorityUpdate>,
) -> Result<Vec<ProjectView>, AppError> {
    let user = resolve_actor(store, actor).await?;
    let mut updated = Vec::with_capacity(updates.len());
    for update in updates {
        let mut project = authorize::<Project>(store, &user, update.id).await?;
        project.priority = update.priority;
        let project = store.update_project(&project).await?;
        updated.push(view(store, project).await?);
    }
    Ok(updated)
}

/// Deletes the project and every task in it. Returns the project as it was.
pub async fn delete(store: &dyn Store, actor: &Actor, id: i64) -> Result<ProjectView, AppError> {
    let user = resolve_actor(store, actor).await?;
    let project = authorize::<Project>(store, &user, id).await?;
    let removed = remove(store, project).await?;
    info!(
        "{} deleted project {} with {} task(s)",
        user.username,
        removed.project.id,
        removed.tasks.len()
    );
    Ok(removed)
}

/// Project deletion path shared with account removal.
pub(crate) async fn remove(store: &dyn Store, project: Project) -> Result<ProjectView, AppError> {
    let removed = view(store, project).await?;
    for task in &removed.tasks {
        tasks::remove(store, task).await?;
    }
    store.delete_project(removed.project.id).await?;
    Ok(removed)
}

/// Creates a task inside the project, assigned to the actor.
pub async fn add_task(
    store: &dyn Store,
    actor: &Actor,
    id: i64,
    request: TaskRequest,
) -> Result<ProjectView, AppError> {
    let user = resolve_actor(store, actor).await?;
    let project = authorize::<Project>(store, &user, id).await?;
    store
        .insert_task(NewTask::from_request(request, Some(project.id)), user.id)
        .await?;
    view(store, project).await
}
