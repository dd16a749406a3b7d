use crate::{
    auth::Actor,
    error::AppError,
    motivation::Motivation,
    routes::text,
    services::{accounts, motivation},
    state::AppState,
};
use actix_web::{get, post, web, HttpResponse, Responder};

fn reply(content: Option<String>) -> HttpResponse {
    match content {
        Some(content) => text(content),
        None => HttpResponse::NoContent().body("No response"),
    }
}

/// Encouragement to finish one of the caller's tasks, in the caller's chosen personality.
#[get("/encourage/{id}")]
pub async fn encourage(
    state: web::Data<AppState>,
    actor: Actor,
    path: web::Path<i64>,
) -> Result<impl Responder, AppError> {
    let content = motivation::encourage(
        state.store.as_ref(),
        state.motivator.as_ref(),
        &actor,
        path.into_inner(),
    )
    .await?;
    Ok(reply(content))
}

#[post("/congratulate")]
pub async fn congratulate(
    state: web::Data<AppState>,
    _actor: Actor,
    body: web::Json<Motivation>,
) -> Result<impl Responder, AppError> {
    let content = motivation::congratulate(state.motivator.as_ref(), &body).await?;
    Ok(reply(content))
}

#[post("/personality/{personality}")]
pub async fn change_personality(
    state: web::Data<AppState>,
    actor: Actor,
    path: web::Path<String>,
) -> Result<impl Responder, AppError> {
    let message = accounts::change_personality(state.store.as_ref(), &actor, &path).await?;
    Ok(text(message))
}
