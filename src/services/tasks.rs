use chrono::{DateTime, Utc};
use log::{debug, info};

use crate::access::{authorize, resolve_actor};
use crate::auth::Actor;
use crate::error::AppError;
use crate::models::{NewTask, Task, TaskRequest};
use crate::services::sorting;
use crate::store::Store;

/// Creates a headless task assigned to the actor.
pub async fn create(store: &dyn Store, actor: &Actor, request: TaskRequest) -> Result<Task, AppError> {
    let user = resolve_actor(store, actor).await?;
    let task = store
        .insert_task(NewTask::from_request(request, None), user.id)
        .await?;
    info!("{} created task {}", user.username, task.id);
    Ok(task)
}

pub async fn get(store: &dyn Store, actor: &Actor, id: i64) -> Result<Task, AppError> {
    let user = resolve_actor(store, actor).await?;
    authorize::<Task>(store, &user, id).await
}

/// Every task assigned to the actor.
pub async fn all(store: &dyn Store, actor: &Actor) -> Result<Vec<Task>, AppError> {
    let user = resolve_actor(store, actor).await?;
    store.tasks_for_user(user.id).await
}

/// Open tasks and tasks completed within the last year, by priority.
pub async fn all_sorted(
    store: &dyn Store,
    actor: &Actor,
    now: DateTime<Utc>,
) -> Result<Vec<Task>, AppError> {
    let user = resolve_actor(store, actor).await?;
    sorting::current_tasks(store, user.id, None, now).await
}

/// Usernames of everyone assigned to the task.
pub async fn users(store: &dyn Store, actor: &Actor, id: i64) -> Result<Vec<String>, AppError> {
    let user = resolve_actor(store, actor).await?;
    let task = authorize::<Task>(store, &user, id).await?;
    Ok(store
        .task_assignees(task.id)
        .await?
        .into_iter()
        .map(|u| u.username)
        .collect())
}

pub async fn update(
    store: &dyn Store,
    actor: &Actor,
    id: i64,
    request: TaskRequest,
) -> Result<Task, AppError> {
    let user = resolve_actor(store, actor).await?;
    let mut task = authorize::<Task>(store, &user, id).await?;
    task.merge(request);
    store.update_task(&task).await
}

pub async fn complete(
    store: &dyn Store,
    actor: &Actor,
    id: i64,
    now: DateTime<Utc>,
) -> Result<Task, AppError> {
    let user = resolve_actor(store, actor).await?;
    let mut task = authorize::<Task>(store, &user, id).await?;
    task.mark_complete(now);
    store.update_task(&task).await
}

pub async fn uncomplete(store: &dyn Store, actor: &Actor, id: i64) -> Result<Task, AppError> {
    let user = resolve_actor(store, actor).await?;
    let mut task = authorize::<Task>(store, &user, id).await?;
    task.mark_incomplete();
    store.update_task(&task).await
}

/// Deletes the task and returns it as it was.
pub async fn delete(store: &dyn Store, actor: &Actor, id: i64) -> Result<Task, AppError> {
    let user = resolve_actor(store, actor).await?;
    let task = authorize::<Task>(store, &user, id).await?;
    remove(store, &task).await?;
    info!("{} deleted task {}", user.username, task.id);
    Ok(task)
}

/// The single deletion path for tasks: assignments first, then the row.
pub(crate) async fn remove(store: &dyn Store, task: &Task) -> Result<(), AppError> {
    debug!("Removing task {}", task.id);
    store.delete_task(task.id).await
}
