//! Store tests against a live Postgres. Run with
//! `DATABASE_URL=postgres://... cargo test --test postgres -- --ignored`.

use chrono::{Duration, Utc};
use dotenv::dotenv;
use lazytodo::models::{
    NewProject, NewTask, NewUser, PasswordResetToken, ProjectRequest, Role, TaskRequest,
};
use lazytodo::store::{PgStore, Store};
use lazytodo::AppError;
use pretty_assertions::assert_eq;

async fn connect() -> PgStore {
    dotenv().ok();
    let url = std::env::var("DATABASE_URL").expect("DATABASE_URL must be set");
    PgStore::connect(&url)
        .await
        .expect("Failed to connect to Postgres")
}

/// Usernames stay within the 20 character limit and never collide between runs.
fn unique(prefix: &str) -> String {
    let nanos = Utc::now().timestamp_nanos_opt().unwrap_or_default();
    format!("{}{}", prefix, nanos % 1_000_000_000_000)
}

fn new_user(username: &str) -> NewUser {
    NewUser {
        username: username.to_string(),
        email: format!("{}@example.com", username),
        password_hash: "hash".to_string(),
        roles: vec![Role::User],
    }
}

#[actix_rt::test]
#[ignore]
async fn test_pg_user_uniqueness() {
    let store = connect().await;
    let name = unique("pgu");
    let user = store.insert_user(new_user(&name)).await.unwrap();
    assert_eq!(user.roles, vec!["ROLE_USER".to_string()]);

    let duplicate = store.insert_user(new_user(&name)).await;
    assert!(matches!(duplicate, Err(AppError::BadRequest(_))));

    let by_email = store
        .find_user_by_email(&format!("{}@example.com", name))
        .await
        .unwrap();
    assert_eq!(by_email.map(|u| u.id), Some(user.id));

    store.delete_user(user.id).await.unwrap();
    assert!(store.find_user_by_username(&name).await.unwrap().is_none());
}

#[actix_rt::test]
#[ignore]
async fn test_pg_project_and_task_lifecycle() {
    let store = connect().await;
    let owner = store.insert_user(new_user(&unique("pgp"))).await.unwrap();

    let project = store
        .insert_project(NewProject::from_request(
            ProjectRequest {
                title: "Garden".to_string(),
                priority: Some(2),
                ..ProjectRequest::default()
            },
            owner.id,
        ))
        .await
        .unwrap();
    assert_eq!(store.projects_by_owner(owner.id).await.unwrap(), vec![project.clone()]);

    let task = store
        .insert_task(
            NewTask::from_request(TaskRequest::titled("dig"), Some(project.id)),
            owner.id,
        )
        .await
        .unwrap();
    assert!(store.is_assigned(task.id, owner.id).await.unwrap());
    assert_eq!(store.tasks_in_project(project.id).await.unwrap(), vec![task.clone()]);

    let now = Utc::now();
    let mut done = task.clone();
    done.mark_complete(now - Duration::days(400));
    store.update_task(&done).await.unwrap();
    let current = store
        .current_tasks(owner.id, Some(project.id), now - Duration::days(365))
        .await
        .unwrap();
    assert!(current.is_empty());

    store.delete_task(task.id).await.unwrap();
    assert!(store.find_task(task.id).await.unwrap().is_none());
    store.delete_project(project.id).await.unwrap();
    store.delete_user(owner.id).await.unwrap();
}

#[actix_rt::test]
#[ignore]
async fn test_pg_reset_tokens() {
    let store = connect().await;
    let user = store.insert_user(new_user(&unique("pgr"))).await.unwrap();
    let token = PasswordResetToken::issue(unique("t"), user.id, Utc::now());

    assert!(store.insert_reset_token(&token).await.unwrap());
    let duplicate = PasswordResetToken::issue(token.token.clone(), user.id, Utc::now());
    assert!(!store.insert_reset_token(&duplicate).await.unwrap());
    let found = store.find_reset_token(&token.token).await.unwrap().unwrap();
    assert_eq!(found.user_id, user.id);

    store.delete_reset_token(&token.token).await.unwrap();
    assert!(store.find_reset_token(&token.token).await.unwrap().is_none());
    store.delete_user(user.id).await.unwrap();
}
