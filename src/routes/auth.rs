use crate::{
    auth::{LoginRequest, MessageResponse, SignupRequest},
    error::AppError,
    models::{NewPasswordRequest, PasswordResetRequest},
    routes::text,
    services::{
        accounts::{self, Registration},
        password_reset,
    },
    state::AppState,
};
use actix_web::{get, post, web, HttpResponse, Responder};
use chrono::Utc;
use validator::Validate;

/// Register a new user
///
/// Creates an account with the `ROLE_USER` role.
///
/// ## Responses:
/// - `200 OK`: `{"message": "User registered successfully!"}`
/// - `400 Bad Request`: the username or email is already taken.
/// - `422 Unprocessable Entity`: the payload failed validation.
#[post("/signup")]
pub async fn signup(
    state: web::Data<AppState>,
    signup_data: web::Json<SignupRequest>,
) -> Result<impl Responder, AppError> {
    signup_data.validate()?;

    let registration =
        accounts::register(state.store.as_ref(), &state.hasher, signup_data.into_inner()).await?;

    let response = match registration {
        Registration::Created => {
            HttpResponse::Ok().json(MessageResponse::new("User registered successfully!"))
        }
        Registration::UsernameTaken => HttpResponse::BadRequest()
            .json(MessageResponse::new("Error: Username is already taken!")),
        Registration::EmailTaken => {
            HttpResponse::BadRequest().json(MessageResponse::new("Error: Email is already in use!"))
        }
    };
    Ok(response)
}

/// Sign in
///
/// Returns a bearer token together with the account's id, username, email and roles.
#[post("/signin")]
pub async fn signin(
    state: web::Data<AppState>,
    login_data: web::Json<LoginRequest>,
) -> Result<impl Responder, AppError> {
    login_data.validate()?;

    let response =
        accounts::authenticate(state.store.as_ref(), &state.hasher, &state.tokens, &login_data).await?;
    Ok(HttpResponse::Ok().json(response))
}

/// Request a password reset code by email.
#[post("/requestresetpassword")]
pub async fn request_reset_password(
    state: web::Data<AppState>,
    reset_data: web::Json<PasswordResetRequest>,
) -> Result<HttpResponse, AppError> {
    reset_data.validate()?;
    let result = password_reset::request_reset(
        state.store.as_ref(),
        state.mailer.as_ref(),
        &reset_data.email,
        Utc::now(),
    )
    .await;

    match result {
        Ok(true) => Ok(text("Please check your email for a reset code")),
        Ok(false) => Ok(HttpResponse::InternalServerError().body("internal server error")),
        Err(AppError::UsernameNotFound(_)) => {
            Ok(HttpResponse::Unauthorized().body("email not recognized"))
        }
        Err(e) => Err(e),
    }
}

/// Set a new password using an emailed reset code.
///
/// Accepts a JSON body or the form posted by `GET /auth/reset/{token}`.
#[post("/resetPassword")]
pub async fn reset_password(
    state: web::Data<AppState>,
    body: web::Either<web::Json<NewPasswordRequest>, web::Form<NewPasswordRequest>>,
) -> Result<impl Responder, AppError> {
    let request = match body {
        web::Either::Left(json) => json.into_inner(),
        web::Either::Right(form) => form.into_inner(),
    };
    request.validate()?;

    password_reset::complete_reset(state.store.as_ref(), &state.hasher, &request, Utc::now())
        .await
        .map_err(|e| match e {
            AppError::UsernameNotFound(msg) => AppError::Unauthorized(msg),
            other => other,
        })?;
    Ok(text("Password successfully reset"))
}

/// A minimal HTML form for completing a reset from the emailed link.
#[get("/reset/{token}")]
pub async fn reset_form(path: web::Path<String>) -> impl Responder {
    HttpResponse::Ok()
        .content_type("text/html; charset=utf-8")
        .body(render_reset_form(&path.into_inner()))
}

fn render_reset_form(token: &str) -> String {
    format!(
        r#"<!DOCTYPE html>
<html>
<head><title>Reset your password</title></head>
<body>
<form method="post" action="/api/auth/resetPassword">
  <input type="hidden" name="token" value="{}">
  <label>Email <input type="email" name="email" required></label>
  <label>New password <input type="password" name="password" maxlength="40" required></label>
  <button type="submit">Reset password</button>
</form>
</body>
</html>
"#,
        escape_html(token)
    )
}

fn escape_html(raw: &str) -> String {
    let mut escaped = String::with_capacity(raw.len());
    for c in raw.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            _ => escaped.push(c),
        }
    }
    escaped
}
