use actix_web::dev::Payload;
use actix_web::http::header;
use actix_web::{web, Error as ActixError, FromRequest, HttpRequest};
use std::future::{ready, Ready};

use crate::error::AppError;
use crate::state::AppState;

const AUTH_ERROR: &str = "JWT authentication error";

/// The acting user, identified by the verified subject of the bearer token.
///
/// Handlers receive the actor explicitly and pass it into every service call;
/// nothing about the caller is kept in ambient state. The header form is
/// `Authorization: bearer:<token>`; `Bearer <token>` is accepted too.
///
/// A missing header, a malformed value or a token that fails verification
/// yields `AppError::Authentication` (HTTP 400).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Actor(pub String);

impl Actor {
    pub fn username(&self) -> &str {
        &self.0
    }
}

/// Strips the 7-character scheme prefix from an authorization header value.
pub fn bearer_token(value: &str) -> Option<&str> {
    let prefix = value.get(..7)?;
    if prefix.eq_ignore_ascii_case("bearer:") || prefix.eq_ignore_ascii_case("bearer ") {
        let token = value[7..].trim();
        (!token.is_empty()).then_some(token)
    } else {
        None
    }
}

impl FromRequest for Actor {
    type Error = ActixError;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        let state = match req.app_data::<web::Data<AppState>>() {
            Some(state) => state,
            None => {
                return ready(Err(AppError::InternalServerError(
                    "Application state is not configured".to_string(),
                )
                .into()))
            }
        };

        let token = req
            .headers()
            .get(header::AUTHORIZATION)
            .and_then(|value| value.to_str().ok())
            .and_then(bearer_token);

        let result = match token {
            Some(token) => state.tokens.subject(token).map(Actor).map_err(|e| {
                log::debug!("Rejected bearer token on {}: {}", req.path(), e);
                AppError::Authentication(AUTH_ERROR.to_string())
            }),
            None => Err(AppError::Authentication(AUTH_ERROR.to_string())),
        };
        ready(result.map_err(Into::into))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::TokenService;
    use actix_web::http::StatusCode;
    use actix_web::test::TestRequest;
    use chrono::Duration;

    fn state() -> web::Data<AppState> {
        web::Data::new(AppState::in_memory(TokenService::new(
            "extractor-secret",
            Duration::hours(1),
        )))
    }

    #[test]
    fn test_bearer_token_prefixes() {
        assert_eq!(bearer_token("bearer:abc.def.ghi"), Some("abc.def.ghi"));
        assert_eq!(bearer_token("Bearer abc.def.ghi"), Some("abc.def.ghi"));
        assert_eq!(bearer_token("bearer:"), None);
        assert_eq!(bearer_token("Basic dXNlcjpwdw=="), None);
        assert_eq!(bearer_token("short"), None);
    }

    #[actix_rt::test]
    async fn test_actor_extractor_success() {
        let state = state();
        let token = state.tokens.issue("alice").unwrap();
        let req = TestRequest::default()
            .app_data(state.clone())
            .insert_header((header::AUTHORIZATION, format!("bearer:{}", token)))
            .to_http_request();

        let actor = Actor::from_request(&req, &mut Payload::None).await.unwrap();
        assert_eq!(actor.username(), "alice");
    }

    #[actix_rt::test]
    async fn test_actor_extractor_failure() {
        let req = TestRequest::default()
            .app_data(state())
            .insert_header((header::AUTHORIZATION, "bearer:not-a-token"))
            .to_http_request();

        let err = Actor::from_request(&req, &mut Payload::None)
            .await
            .unwrap_err();
        assert_eq!(err.error_response().status(), StatusCode::BAD_REQUEST);

        let missing = TestRequest::default()
            .app_data(state())
            .to_http_request();
        assert!(Actor::from_request(&missing, &mut Payload::None).await.is_err());
    }
}
