use crate::{
    auth::Actor,
    error::AppError,
    models::{PriorityUpdateList, ProjectRequest, TaskRequest},
    services::projects,
    state::AppState,
};
use actix_web::{delete, get, post, put, web, HttpResponse, Responder};
use chrono::Utc;
use validator::Validate;

/// Creates a project owned by the caller.
///
/// ## Responses:
/// - `200 OK`: the new project, with an empty `tasks` list.
/// - `400 Bad Request`: missing or invalid bearer token.
/// - `422 Unprocessable Entity`: the title is empty or longer than 100 characters.
#[post("/new")]
pub async fn create_project(
    state: web::Data<AppState>,
    actor: Actor,
    project_data: web::Json<ProjectRequest>,
) -> Result<impl Responder, AppError> {
    project_data.validate()?;

    let project = projects::create(state.store.as_ref(), &actor, project_data.into_inner()).await?;
    Ok(HttpResponse::Ok().json(project))
}

/// Owned projects in priority order, each with the caller's current tasks.
#[get("/all/sorted")]
pub async fn get_sorted_projects(
    state: web::Data<AppState>,
    actor: Actor,
) -> Result<impl Responder, AppError> {
    let projects = projects::all_sorted(state.store.as_ref(), &actor, Utc::now()).await?;
    Ok(HttpResponse::Ok().json(projects))
}

#[get("/all")]
pub async fn get_projects(
    state: web::Data<AppState>,
    actor: Actor,
) -> Result<impl Responder, AppError> {
    let projects = projects::all(state.store.as_ref(), &actor).await?;
    Ok(HttpResponse::Ok().json(projects))
}

/// Bulk priority update.
///
/// Expects `{"priorityUpdates": [{"id": 1, "priority": 2}, ...]}`. Updates are
/// applied in order; the first one that fails ends the request with its error.
#[put("/priority")]
pub async fn set_priorities(
    state: web::Data<AppState>,
    actor: Actor,
    updates: web::Json<PriorityUpdateList>,
) -> Result<impl Responder, AppError> {
    let projects = projects::set_priorities(
        state.store.as_ref(),
        &actor,
        updates.into_inner().priority_updates,
    )
    .await?;
    Ok(HttpResponse::Ok().json(projects))
}

/// Adds a new task to the project and returns the project with its tasks.
#[put("/addTask/{id}")]
pub async fn add_task(
    state: web::Data<AppState>,
    actor: Actor,
    path: web::Path<i64>,
    task_data: web::Json<TaskRequest>,
) -> Result<impl Responder, AppError> {
    task_data.validate()?;

    let project = projects::add_task(
        state.store.as_ref(),
        &actor,
        path.into_inner(),
        task_data.into_inner(),
    )
    .await?;
    Ok(HttpResponse::Ok().json(project))
}

#[get("/{id}/tasks")]
pub async fn get_project_tasks(
    state: web::Data<AppState>,
    actor: Actor,
    path: web::Path<i64>,
) -> Result<impl Responder, AppError> {
    let tasks =
        projects::current_tasks(state.store.as_ref(), &actor, path.into_inner(), Utc::now()).await?;
    Ok(HttpResponse::Ok().json(tasks))
}

/// ## Responses:
/// - `200 OK`: the project with its tasks.
/// - `204 No Content`: no project with this id.
/// - `401 Unauthorized`: the caller does not own the project.
#[get("/{id}")]
pub async fn get_project(
    state: web::Data<AppState>,
    actor: Actor,
    path: web::Path<i64>,
) -> Result<impl Responder, AppError> {
    let project = projects::get(state.store.as_ref(), &actor, path.into_inner()).await?;
    Ok(HttpResponse::Ok().json(project))
}

#[put("/{id}")]
pub async fn update_project(
    state: web::Data<AppState>,
    actor: Actor,
    path: web::Path<i64>,
    project_data: web::Json<ProjectRequest>,
) -> Result<impl Responder, AppError> {
    project_data.validate()?;

    let project = projects::update(
        state.store.as_ref(),
        &actor,
        path.into_inner(),
        project_data.into_inner(),
    )
    .await?;
    Ok(HttpResponse::Ok().json(project))
}

/// Deletes the project and all of its tasks; responds with the deleted project.
#[delete("/{id}")]
pub async fn delete_project(
    state: web::Data<AppState>,
    actor: Actor,
    path: web::Path<i64>,
) -> Result<impl Responder, AppError> {
    let project = projects::delete(state.store.as_ref(), &actor, path.into_inner()).await?;
    Ok(HttpResponse::Ok().json(project))
}
