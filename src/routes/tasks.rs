use crate::{
    auth::{Actor, MessageResponse},
    error::AppError,
    models::TaskRequest,
    services::tasks,
    state::AppState,
};
use actix_web::{delete, get, post, put, web, HttpResponse, Responder};
use chrono::Utc;
use validator::Validate;

/// Creates a new task for the authenticated user.
///
/// The task has no project and is assigned to the caller only.
///
/// ## Request Body:
/// A JSON object matching `TaskRequest`:
/// - `title`: 1 to 100 characters (required).
/// - `description`, `startDate`, `targetDate`, `priority`, `projectPriority` (optional).
///
/// ## Responses:
/// - `200 OK`: the created task.
/// - `400 Bad Request`: missing or invalid bearer token.
/// - `422 Unprocessable Entity`: the title failed validation.
#[post("/new")]
pub async fn create_task(
    state: web::Data<AppState>,
    actor: Actor,
    task_data: web::Json<TaskRequest>,
) -> Result<impl Responder, AppError> {
    task_data.validate()?;

    let task = tasks::create(state.store.as_ref(), &actor, task_data.into_inner()).await?;
    Ok(HttpResponse::Ok().json(task))
}

/// Open tasks and tasks finished within the last year, by ascending priority.
#[get("/all/sorted")]
pub async fn get_sorted_tasks(
    state: web::Data<AppState>,
    actor: Actor,
) -> Result<impl Responder, AppError> {
    let tasks = tasks::all_sorted(state.store.as_ref(), &actor, Utc::now()).await?;
    Ok(HttpResponse::Ok().json(tasks))
}

#[get("/all")]
pub async fn get_tasks(
    state: web::Data<AppState>,
    actor: Actor,
) -> Result<impl Responder, AppError> {
    let tasks = tasks::all(state.store.as_ref(), &actor).await?;
    Ok(HttpResponse::Ok().json(tasks))
}

/// Usernames of the users assigned to the task.
#[get("/users/{id}")]
pub async fn get_task_users(
    state: web::Data<AppState>,
    actor: Actor,
    path: web::Path<i64>,
) -> Result<impl Responder, AppError> {
    let users = tasks::users(state.store.as_ref(), &actor, path.into_inner()).await?;
    Ok(HttpResponse::Ok().json(users))
}

/// Marks the task done today.
#[put("/complete/{id}")]
pub async fn complete_task(
    state: web::Data<AppState>,
    actor: Actor,
    path: web::Path<i64>,
) -> Result<impl Responder, AppError> {
    let task = tasks::complete(state.store.as_ref(), &actor, path.into_inner(), Utc::now()).await?;
    Ok(HttpResponse::Ok().json(task))
}

#[put("/unComplete/{id}")]
pub async fn uncomplete_task(
    state: web::Data<AppState>,
    actor: Actor,
    path: web::Path<i64>,
) -> Result<impl Responder, AppError> {
    let task = tasks::uncomplete(state.store.as_ref(), &actor, path.into_inner()).await?;
    Ok(HttpResponse::Ok().json(task))
}

/// ## Responses:
/// - `200 OK`: the task.
/// - `204 No Content`: no task with this id.
/// - `401 Unauthorized`: the caller is not assigned to the task.
#[get("/{id}")]
pub async fn get_task(
    state: web::Data<AppState>,
    actor: Actor,
    path: web::Path<i64>,
) -> Result<impl Responder, AppError> {
    let task = tasks::get(state.store.as_ref(), &actor, path.into_inner()).await?;
    Ok(HttpResponse::Ok().json(task))
}

/// Updates the task. Fields left out of the body keep their stored value.
#[put("/{id}")]
pub async fn update_task(
    state: web::Data<AppState>,
    actor: Actor,
    path: web::Path<i64>,
    task_data: web::Json<TaskRequest>,
) -> Result<impl Responder, AppError> {
    task_data.validate()?;

    let task = tasks::update(
        state.store.as_ref(),
        &actor,
        path.into_inner(),
        task_data.into_inner(),
    )
    .await?;
    Ok(HttpResponse::Ok().json(task))
}

#[delete("/{id}")]
pub async fn delete_task(
    state: web::Data<AppState>,
    actor: Actor,
    path: web::Path<i64>,
) -> Result<impl Responder, AppError> {
    let task = tasks::delete(state.store.as_ref(), &actor, path.into_inner()).await?;
    Ok(HttpResponse::Ok().json(MessageResponse::new(format!("{} deleted", task.title))))
}
