use log::info;

use crate::access::resolve_actor;
use crate::auth::{Actor, JwtResponse, LoginRequest, PasswordHasher, SignupRequest, TokenService};
use crate::error::AppError;
use crate::models::{NewUser, Role};
use crate::services::{projects, tasks};
use crate::store::Store;

const BAD_CREDENTIALS: &str = "Bad credentials";

/// Outcome of a signup attempt.
#[derive(Debug, PartialEq)]
pub enum Registration {
    Created,
    UsernameTaken,
    EmailTaken,
}

/// Creates the account with `ROLE_USER`; roles in the request are ignored.
pub async fn register(
    store: &dyn Store,
    hasher: &PasswordHasher,
    request: SignupRequest,
) -> Result<Registration, AppError> {
    if store.find_user_by_username(&request.username).await?.is_some() {
        return Ok(Registration::UsernameTaken);
    }
    if store.find_user_by_email(&request.email).await?.is_some() {
        return Ok(Registration::EmailTaken);
    }

    let user = store
        .insert_user(NewUser {
            username: request.username,
            email: request.email,
            password_hash: hasher.hash(&request.password)?,
            roles: vec![Role::User],
        })
        .await?;
    info!("Registered user {} ({})", user.username, user.id);
    Ok(Registration::Created)
}

/// Verifies the credentials and issues a bearer token.
///
/// Unknown usernames and wrong passwords fail the same way.
pub async fn authenticate(
    store: &dyn Store,
    hasher: &PasswordHasher,
    tokens: &TokenService,
    request: &LoginRequest,
) -> Result<JwtResponse, AppError> {
    let user = store
        .find_user_by_username(&request.username)
        .await?
        .ok_or_else(|| AppError::Authentication(BAD_CREDENTIALS.to_string()))?;

    if !hasher.verify(&request.password, &user.password_hash)? {
        return Err(AppError::Authentication(BAD_CREDENTIALS.to_string()));
    }

    let token = tokens.issue(&user.username)?;
    info!("User {} signed in", user.username);
    Ok(JwtResponse::bearer(token, &user))
}

/// Removes the actor's account: tasks nobody else is assigned to, then every
/// owned project with its tasks, then the user.
pub async fn delete_account(store: &dyn Store, actor: &Actor) -> Result<String, AppError> {
    let user = resolve_actor(store, actor).await?;

    for task in store.tasks_for_user(user.id).await? {
        let assignees = store.task_assignees(task.id).await?;
        if assignees.iter().all(|a| a.id == user.id) {
            tasks::remove(store, &task).await?;
        }
    }
    for project in store.projects_by_owner(user.id).await? {
        projects::remove(store, project).await?;
    }
    store.delete_user(user.id).await?;

    info!("Deleted account {}", user.username);
    Ok(format!("{} successfully deleted", user.username))
}

pub async fn change_email(store: &dyn Store, actor: &Actor, email: &str) -> Result<String, AppError> {
    if !validator::validate_email(email) || email.len() > 50 {
        return Err(AppError::ValidationError(format!("{} is not a valid email", email)));
    }

    let user = resolve_actor(store, actor).await?;
    if let Some(existing) = store.find_user_by_email(email).await? {
        if existing.id != user.id {
            return Err(AppError::BadRequest("Error: Email is already in use!".to_string()));
        }
    }

    store.update_user_email(user.id, email).await?;
    Ok(format!("email changed to {}", email))
}

pub async fn change_personality(
    store: &dyn Store,
    actor: &Actor,
    personality: &str,
) -> Result<String, AppError> {
    let personality = personality.trim();
    if personality.is_empty() {
        return Err(AppError::BadRequest("personality must not be blank".to_string()));
    }

    let user = resolve_actor(store, actor).await?;
    store.update_user_personality(user.id, personality).await?;
    Ok(format!("personality changed to {}", personality))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{NewProject, NewTask, ProjectRequest, TaskRequest, DEFAULT_PERSONALITY};
    use crate::services::testing::user;
    use crate::store::MemoryStore;
    use chrono::Duration;

    fn hasher() -> PasswordHasher {
        PasswordHasher::new(4)
    }

    fn signup(username: &str, email: &str) -> SignupRequest {
        SignupRequest {
            username: username.to_string(),
            email: email.to_string(),
            password: "pw".to_string(),
            role: Some(vec!["admin".to_string()]),
        }
    }

    #[actix_rt::test]
    async fn test_register_rejects_duplicates() {
        let store = MemoryStore::new();

        let first = register(&store, &hasher(), signup("alice", "a@x.com")).await.unwrap();
        assert_eq!(first, Registration::Created);

        let same_name = register(&store, &hasher(), signup("alice", "other@x.com"))
            .await
            .unwrap();
        assert_eq!(same_name, Registration::UsernameTaken);

        let same_email = register(&store, &hasher(), signup("alice2", "a@x.com"))
            .await
            .unwrap();
        assert_eq!(same_email, Registration::EmailTaken);

        let alice = store.find_user_by_username("alice").await.unwrap().unwrap();
        assert_eq!(alice.roles, vec![Role::User.as_str().to_string()]);
        assert_eq!(alice.personality, DEFAULT_PERSONALITY);
        assert_ne!(alice.password_hash, "pw");
    }

    #[actix_rt::test]
    async fn test_authenticate() {
        let store = MemoryStore::new();
        let tokens = TokenService::new("accounts-secret", Duration::hours(1));
        register(&store, &hasher(), signup("alice", "a@x.com")).await.unwrap();

        let login = LoginRequest {
            username: "alice".to_string(),
            password: "pw".to_string(),
        };
        let response = authenticate(&store, &hasher(), &tokens, &login).await.unwrap();
        assert_eq!(response.username, "alice");
        assert_eq!(response.token_type, "Bearer");
        assert_eq!(response.roles, vec!["ROLE_USER".to_string()]);
        assert_eq!(tokens.subject(&response.token).unwrap(), "alice");

        for (username, password) in [("alice", "wrong"), ("nobody", "pw")] {
            let login = LoginRequest {
                username: username.to_string(),
                password: password.to_string(),
            };
            match authenticate(&store, &hasher(), &tokens, &login).await {
                Err(AppError::Authentication(msg)) => assert_eq!(msg, "Bad credentials"),
                other => panic!("expected bad credentials, got {:?}", other.map(|r| r.username)),
            }
        }
    }

    #[actix_rt::test]
    async fn test_delete_account_keeps_shared_tasks() {
        let store = MemoryStore::new();
        let alice = user(&store, "alice").await;
        let bob = user(&store, "bob").await;

        let solo = store
            .insert_task(NewTask::from_request(TaskRequest::titled("solo"), None), alice.id)
            .await
            .unwrap();
        let bobs = store
            .insert_task(NewTask::from_request(TaskRequest::titled("bob's"), None), bob.id)
            .await
            .unwrap();
        let project = store
            .insert_project(NewProject::from_request(
                ProjectRequest {
                    title: "Garden".to_string(),
                    ..ProjectRequest::default()
                },
                alice.id,
            ))
            .await
            .unwrap();
        let in_project = store
            .insert_task(
                NewTask::from_request(TaskRequest::titled("dig"), Some(project.id)),
                alice.id,
            )
            .await
            .unwrap();

        let message = delete_account(&store, &Actor("alice".to_string())).await.unwrap();

        assert_eq!(message, "alice successfully deleted");
        assert!(store.find_user_by_username("alice").await.unwrap().is_none());
        assert!(store.find_task(solo.id).await.unwrap().is_none());
        assert!(store.find_task(in_project.id).await.unwrap().is_none());
        assert!(store.find_project(project.id).await.unwrap().is_none());
        assert!(store.find_task(bobs.id).await.unwrap().is_some());
    }

    #[actix_rt::test]
    async fn test_change_email() {
        let store = MemoryStore::new();
        user(&store, "alice").await;
        user(&store, "bob").await;
        let alice = Actor("alice".to_string());

        assert_eq!(
            change_email(&store, &alice, "alice@new.com").await.unwrap(),
            "email changed to alice@new.com"
        );
        assert!(store.find_user_by_email("alice@new.com").await.unwrap().is_some());

        assert!(matches!(
            change_email(&store, &alice, "not-an-email").await,
            Err(AppError::ValidationError(_))
        ));
        assert!(matches!(
            change_email(&store, &alice, "bob@example.com").await,
            Err(AppError::BadRequest(_))
        ));
    }

    #[actix_rt::test]
    async fn test_change_personality() {
        let store = MemoryStore::new();
        user(&store, "alice").await;
        let alice = Actor("alice".to_string());

        change_personality(&store, &alice, "a pirate").await.unwrap();
        let stored = store.find_user_by_username("alice").await.unwrap().unwrap();
        assert_eq!(stored.personality, "a pirate");

        assert!(change_personality(&store, &alice, "  ").await.is_err());
        assert!(matches!(
            change_personality(&store, &Actor("ghost".to_string()), "x").await,
            Err(AppError::UsernameNotFound(_))
        ));
    }
}
