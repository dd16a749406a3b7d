pub mod account;
pub mod auth;
pub mod health;
pub mod motivation;
pub mod projects;
pub mod tasks;

use actix_web::{web, HttpResponse};

/// Wires every `/api` scope. Literal segments are registered before `{id}`
/// patterns so that e.g. `/project/priority` never reaches the id handler.
pub fn config(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/auth")
            .service(auth::signup)
            .service(auth::signin)
            .service(auth::request_reset_password)
            .service(auth::reset_password)
            .service(auth::reset_form),
    )
    .service(
        web::scope("/account")
            .service(account::delete_account)
            .service(account::change_email)
            .service(account::logged_in)
            .service(account::change_personality),
    )
    .service(
        web::scope("/project")
            .service(projects::create_project)
            .service(projects::get_sorted_projects)
            .service(projects::get_projects)
            .service(projects::set_priorities)
            .service(projects::add_task)
            .service(projects::get_project_tasks)
            .service(projects::get_project)
            .service(projects::update_project)
            .service(projects::delete_project),
    )
    .service(
        web::scope("/task")
            .service(tasks::create_task)
            .service(tasks::get_sorted_tasks)
            .service(tasks::get_tasks)
            .service(tasks::get_task_users)
            .service(tasks::complete_task)
            .service(tasks::uncomplete_task)
            .service(tasks::get_task)
            .service(tasks::update_task)
            .service(tasks::delete_task),
    )
    .service(
        web::scope("/motivation")
            .service(motivation::encourage)
            .service(motivation::congratulate)
            .service(motivation::change_personality),
    );
}

/// A 200 response with a plain-text body.
pub(crate) fn text(body: impl Into<String>) -> HttpResponse {
    HttpResponse::Ok()
        .content_type("text/plain; charset=utf-8")
        .body(body.into())
}
