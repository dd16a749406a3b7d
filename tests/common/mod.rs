#![allow(dead_code)]

use actix_web::body::MessageBody;
use actix_web::dev::{Service, ServiceResponse};
use actix_web::http::{header, StatusCode};
use actix_web::test;
use chrono::Duration;
use lazytodo::auth::TokenService;
use lazytodo::AppState;
use serde_json::{json, Value};

pub const PASSWORD: &str = "Password123!";

/// Builds the full application around the given `AppState`, wired the way `main` wires it.
macro_rules! test_app {
    ($state:expr) => {
        actix_web::test::init_service(
            actix_web::App::new()
                .app_data(actix_web::web::Data::new($state))
                .wrap(
                    actix_cors::Cors::default()
                        .allow_any_origin()
                        .allow_any_method()
                        .allow_any_header()
                        .max_age(3600),
                )
                .wrap(actix_web::middleware::Logger::default())
                .service(lazytodo::routes::health::health)
                .service(actix_web::web::scope("/api").configure(lazytodo::routes::config)),
        )
        .await
    };
}

pub fn state() -> AppState {
    AppState::in_memory(TokenService::new(
        "integration-test-secret",
        Duration::hours(1),
    ))
}

pub fn bearer(token: &str) -> (header::HeaderName, String) {
    (header::AUTHORIZATION, format!("bearer:{}", token))
}

/// Sends the request and returns the status with the body as text.
pub async fn call<S, B>(app: &S, req: actix_http::Request) -> (StatusCode, String)
where
    S: Service<actix_http::Request, Response = ServiceResponse<B>, Error = actix_web::Error>,
    B: MessageBody,
{
    let resp = test::call_service(app, req).await;
    let status = resp.status();
    let body = test::read_body(resp).await;
    (status, String::from_utf8_lossy(&body).into_owned())
}

pub fn json_body(body: &str) -> Value {
    serde_json::from_str(body).unwrap_or_else(|e| panic!("not JSON ({}): {}", e, body))
}

pub async fn signup<S, B>(app: &S, username: &str, email: &str) -> (StatusCode, String)
where
    S: Service<actix_http::Request, Response = ServiceResponse<B>, Error = actix_web::Error>,
    B: MessageBody,
{
    let req = test::TestRequest::post()
        .uri("/api/auth/signup")
        .set_json(json!({
            "username": username,
            "email": email,
            "password": PASSWORD
        }))
        .to_request();
    call(app, req).await
}

pub async fn signin<S, B>(app: &S, username: &str, password: &str) -> (StatusCode, String)
where
    S: Service<actix_http::Request, Response = ServiceResponse<B>, Error = actix_web::Error>,
    B: MessageBody,
{
    let req = test::TestRequest::post()
        .uri("/api/auth/signin")
        .set_json(json!({ "username": username, "password": password }))
        .to_request();
    call(app, req).await
}

/// Registers `username` and returns a bearer token for it.
pub async fn register_and_sign_in<S, B>(app: &S, username: &str) -> String
where
    S: Service<actix_http::Request, Response = ServiceResponse<B>, Error = actix_web::Error>,
    B: MessageBody,
{
    let (status, body) = signup(app, username, &format!("{}@example.com", username)).await;
    assert_eq!(status, StatusCode::OK, "signup failed: {}", body);

    let (status, body) = signin(app, username, PASSWORD).await;
    assert_eq!(status, StatusCode::OK, "signin failed: {}", body);
    json_body(&body)["token"]
        .as_str()
        .expect("token in signin response")
        .to_string()
}
