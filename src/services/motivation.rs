use crate::access::{authorize, resolve_actor};
use crate::auth::Actor;
use crate::error::AppError;
use crate::models::Task;
use crate::motivation::{congratulate_prompt, encourage_prompt, Motivation, Motivator};
use crate::store::Store;

/// Encouragement for one of the actor's tasks, voiced by the actor's personality.
pub async fn encourage(
    store: &dyn Store,
    motivator: &dyn Motivator,
    actor: &Actor,
    task_id: i64,
) -> Result<Option<String>, AppError> {
    let user = resolve_actor(store, actor).await?;
    let task = authorize::<Task>(store, &user, task_id).await?;
    motivator
        .complete(&encourage_prompt(&task.title, &user.personality))
        .await
}

pub async fn congratulate(
    motivator: &dyn Motivator,
    motivation: &Motivation,
) -> Result<Option<String>, AppError> {
    motivator
        .complete(&congratulate_prompt(&motivation.title, &motivation.personality))
        .await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{NewTask, TaskRequest};
    use crate::motivation::CannedMotivator;
    use crate::services::testing::user;
    use crate::store::MemoryStore;

    #[actix_rt::test]
    async fn test_encourage_uses_task_and_personality() {
        let store = MemoryStore::new();
        let alice = user(&store, "alice").await;
        store.update_user_personality(alice.id, "a pirate").await.unwrap();
        let task = store
            .insert_task(NewTask::from_request(TaskRequest::titled("laundry"), None), alice.id)
            .await
            .unwrap();
        let motivator = CannedMotivator::replying("Arr, fold them sails!");

        let reply = encourage(&store, &motivator, &Actor("alice".to_string()), task.id)
            .await
            .unwrap();

        assert_eq!(reply.as_deref(), Some("Arr, fold them sails!"));
        assert_eq!(
            motivator.prompts(),
            vec![encourage_prompt("laundry", "a pirate")]
        );
    }

    #[actix_rt::test]
    async fn test_encourage_requires_assignment() {
        let store = MemoryStore::new();
        let alice = user(&store, "alice").await;
        user(&store, "bob").await;
        let task = store
            .insert_task(NewTask::from_request(TaskRequest::titled("laundry"), None), alice.id)
            .await
            .unwrap();
        let motivator = CannedMotivator::replying("hi");

        let result = encourage(&store, &motivator, &Actor("bob".to_string()), task.id).await;
        assert!(matches!(result, Err(AppError::AccessDenied(_))));
        assert!(motivator.prompts().is_empty());
    }

    #[actix_rt::test]
    async fn test_congratulate() {
        let motivator = CannedMotivator::silent();
        let motivation = Motivation {
            title: "taxes".to_string(),
            personality: "a wizard".to_string(),
        };

        assert!(congratulate(&motivator, &motivation).await.unwrap().is_none());
        assert_eq!(
            motivator.prompts(),
            vec![congratulate_prompt("taxes", "a wizard")]
        );
    }
}
