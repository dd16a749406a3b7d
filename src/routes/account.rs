use crate::{auth::Actor, error::AppError, routes::text, services::accounts, state::AppState};
use actix_web::{delete, get, post, put, web, Responder};

/// Delete the caller's account.
///
/// Tasks only the caller is assigned to and every project the caller owns go
/// with it. Responds with `"<username> successfully deleted"`.
#[delete("")]
pub async fn delete_account(
    state: web::Data<AppState>,
    actor: Actor,
) -> Result<impl Responder, AppError> {
    let message = accounts::delete_account(state.store.as_ref(), &actor).await?;
    Ok(text(message))
}

#[put("/email/{email}")]
pub async fn change_email(
    state: web::Data<AppState>,
    actor: Actor,
    path: web::Path<String>,
) -> Result<impl Responder, AppError> {
    let message = accounts::change_email(state.store.as_ref(), &actor, &path).await?;
    Ok(text(message))
}

/// Answers only when the bearer token is valid.
#[get("/loggedin")]
pub async fn logged_in(_actor: Actor) -> impl Responder {
    text("you're logged in")
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
