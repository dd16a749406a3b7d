use chrono::{DateTime, Utc};
use futures::future::try_join_all;

use crate::error::AppError;
use crate::models::task::current_since;
use crate::models::{ProjectView, Task, User};
use crate::store::Store;

/// Tasks assigned to the user that are open or were completed within the
/// last year, optionally limited to one project, lowest priority value first.
pub async fn current_tasks(
    store: &dyn Store,
    user_id: i64,
    project_id: Option<i64>,
    now: DateTime<Utc>,
) -> Result<Vec<Task>, AppError> {
    store
        .current_tasks(user_id, project_id, current_since(now))
        .await
}

/// Every project the user owns, in priority order, each with its current tasks.
pub async fn sorted_projects(
    store: &dyn Store,
    user: &User,
    now: DateTime<Utc>,
) -> Result<Vec<ProjectView>, AppError> {
    let owned = store.projects_by_owner(user.id).await?;
    try_join_all(owned.into_iter().map(|project| async move {
        let tasks = current_tasks(store, user.id, Some(project.id), now).await?;
        Ok::<_, AppError>(ProjectView { project, tasks })
    }))
    .await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{NewProject, NewTask, ProjectRequest, TaskRequest};
    use crate::services::testing::user;
    use crate::store::MemoryStore;
    use chrono::Duration;

    #[actix_rt::test]
    async fn test_sorted_projects() {
        let store = MemoryStore::new();
        let alice = user(&store, "alice").await;
        let now = Utc::now();

        let later = store
            .insert_project(NewProject::from_request(
                ProjectRequest {
                    title: "later".to_string(),
                    priority: Some(3),
                    ..ProjectRequest::default()
                },
                alice.id,
            ))
            .await
            .unwrap();
        let first = store
            .insert_project(NewProject::from_request(
                ProjectRequest {
                    title: "first".to_string(),
                    priority: Some(1),
                    ..ProjectRequest::default()
                },
                alice.id,
            ))
            .await
            .unwrap();

        let open = store
            .insert_task(
                NewTask::from_request(
                    TaskRequest {
                        priority: Some(2),
                        ..TaskRequest::titled("open")
                    },
                    Some(first.id),
                ),
                alice.id,
            )
            .await
            .unwrap();
        let mut stale = store
            .insert_task(NewTask::from_request(TaskRequest::titled("stale"), Some(first.id)), alice.id)
            .await
            .unwrap();
        stale.mark_complete(now - Duration::days(400));
        store.update_task(&stale).await.unwrap();

        let views = sorted_projects(&store, &alice, now).await.unwrap();

        assert_eq!(views.len(), 2);
        assert_eq!(views[0].project.id, first.id);
        assert_eq!(views[0].tasks, vec![open]);
        assert_eq!(views[1].project.id, later.id);
        assert!(views[1].tasks.is_empty());
    }
}
