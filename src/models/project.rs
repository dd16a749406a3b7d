use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::Validate;

use super::task::Task;

/// Payload for creating or updating a project.
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct ProjectRequest {
    #[validate(length(min = 1, max = 100))]
    pub title: String,
    pub description: Option<String>,
    pub start_date: Option<NaiveDate>,
    pub target_date: Option<NaiveDate>,
    pub checked: Option<NaiveDate>,
    pub priority: Option<i32>,
}

/// One entry of a bulk priority update.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PriorityUpdate {
    pub id: i64,
    pub priority: i32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PriorityUpdateList {
    pub priority_updates: Vec<PriorityUpdate>,
}

/// A project row. The owner id is never sent to clients.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Project {
    pub id: i64,
    pub title: String,
    pub description: Option<String>,
    pub start_date: Option<NaiveDate>,
    pub target_date: Option<NaiveDate>,
    pub checked: Option<NaiveDate>,
    pub priority: i32,
    #[serde(skip_serializing)]
    pub owner_id: i64,
}

impl Project {
    /// Field-level merge; `id` and `owner_id` never change.
    pub fn merge(&mut self, request: ProjectRequest) {
        self.title = request.title;
        if request.description.is_some() {
            self.description = request.description;
        }
        if request.start_date.is_some() {
            self.start_date = request.start_date;
        }
        if request.target_date.is_some() {
            self.target_date = request.target_date;
        }
        if request.checked.is_some() {
            self.checked = request.checked;
        }
        if let Some(priority) = request.priority {
            self.priority = priority;
        }
    }
}

#[derive(Debug, Clone)]
pub struct NewProject {
    pub title: String,
    pub description: Option<String>,
    pub start_date: Option<NaiveDate>,
    pub target_date: Option<NaiveDate>,
    pub checked: Option<NaiveDate>,
    pub priority: i32,
    pub owner_id: i64,
}

impl NewProject {
    pub fn from_request(request: ProjectRequest, owner_id: i64) -> Self {
        Self {
            title: request.title,
            description: request.description,
            start_date: request.start_date,
            target_date: request.target_date,
            checked: request.checked,
            priority: request.priority.unwrap_or_default(),
            owner_id,
        }
    }
}

/// A project together with its tasks, the shape every project endpoint returns.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProjectView {
    #[serde(flatten)]
    pub project: Project,
    pub tasks: Vec<Task>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_project_request_validation() {
        let valid = ProjectRequest {
            title: "Garden".to_string(),
            ..ProjectRequest::default()
        };
        assert!(valid.validate().is_ok());

        let too_long = ProjectRequest {
            title: "p".repeat(101),
            ..ProjectRequest::default()
        };
        assert!(too_long.validate().is_err());
    }

    #[test]
    fn test_view_flattens_project_and_hides_owner() {
        let view = ProjectView {
            project: Project {
                id: 4,
                title: "Garden".to_string(),
                description: None,
                start_date: None,
                target_date: None,
                checked: None,
                priority: 2,
                owner_id: 9,
            },
            tasks: vec![],
        };
        let json = serde_json::to_value(&view).unwrap();
        assert_eq!(json["id"], 4);
        assert_eq!(json["title"], "Garden");
        assert!(json["tasks"].as_array().unwrap().is_empty());
        assert!(json.get("ownerId").is_none());
    }

    #[test]
    fn test_priority_update_list_shape() {
        let list: PriorityUpdateList = serde_json::from_str(
            r#"{"priorityUpdates":[{"id":1,"priority":3},{"id":2,"priority":1}]}"#,
        )
        .unwrap();
        assert_eq!(list.priority_updates.len(), 2);
        assert_eq!(list.priority_updates[1].priority, 1);
    }
}
