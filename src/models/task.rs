use chrono::{DateTime, Duration, Months, NaiveDate, NaiveTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::Validate;

/// Completions after this instant still count as "current": the same moment
/// twelve calendar months before `now`.
pub fn current_since(now: DateTime<Utc>) -> DateTime<Utc> {
    now.checked_sub_months(Months::new(12))
        .unwrap_or(now - Duration::days(365))
}

/// Completion instant for a date supplied directly in a request.
fn completed_at(day: NaiveDate) -> DateTime<Utc> {
    day.and_time(NaiveTime::MIN).and_utc()
}

/// Payload for creating or updating a task.
///
/// On update every field except `title` is optional; fields left out keep
/// the value already stored.
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct TaskRequest {
    /// The title of the task, between 1 and 100 characters.
    #[validate(length(min = 1, max = 100))]
    pub title: String,
    pub description: Option<String>,
    pub start_date: Option<NaiveDate>,
    pub target_date: Option<NaiveDate>,
    /// Completion date, normally set through the complete endpoint.
    pub checked: Option<NaiveDate>,
    pub priority: Option<i32>,
    pub project_priority: Option<i32>,
}

impl TaskRequest {
    pub fn titled(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            ..Self::default()
        }
    }
}

/// A task as stored and returned by the API.
///
/// Assigned users are not part of the row; they live in the assignment index
/// (see `Store::task_assignees`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    pub id: i64,
    pub title: String,
    pub description: Option<String>,
    pub start_date: Option<NaiveDate>,
    pub target_date: Option<NaiveDate>,
    pub checked: Option<NaiveDate>,
    pub completed_on: Option<DateTime<Utc>>,
    pub priority: i32,
    pub project_priority: i32,
    /// `None` for a headless task.
    pub project_id: Option<i64>,
}

impl Task {
    /// Field-level merge of an update request. Identity and project are left
    /// alone. A new `checked` date also stamps the completion at the start of
    /// that day.
    pub fn merge(&mut self, request: TaskRequest) {
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
        if let Some(day) = request.checked {
            if self.checked != Some(day) || self.completed_on.is_none() {
                self.checked = Some(day);
                self.completed_on = Some(completed_at(day));
            }
        }
        if let Some(priority) = request.priority {
            self.priority = priority;
        }
        if let Some(project_priority) = request.project_priority {
            self.project_priority = project_priority;
        }
    }

    pub fn mark_complete(&mut self, now: DateTime<Utc>) {
        self.checked = Some(now.date_naive());
        self.completed_on = Some(now);
    }

    pub fn mark_incomplete(&mut self) {
        self.checked = None;
        self.completed_on = None;
    }

    /// Open, or completed after `completed_after`.
    pub fn is_current(&self, completed_after: DateTime<Utc>) -> bool {
        match (self.checked, self.completed_on) {
            (None, _) => true,
            (Some(_), Some(completed)) => completed > completed_after,
            (Some(_), None) => false,
        }
    }
}

/// A task about to be inserted.
#[derive(Debug, Clone)]
pub struct NewTask {
    pub title: String,
    pub description: Option<String>,
    pub start_date: Option<NaiveDate>,
    pub target_date: Option<NaiveDate>,
    pub checked: Option<NaiveDate>,
    pub completed_on: Option<DateTime<Utc>>,
    pub priority: i32,
    pub project_priority: i32,
    pub project_id: Option<i64>,
}

impl NewTask {
    pub fn from_request(request: TaskRequest, project_id: Option<i64>) -> Self {
        Self {
            title: request.title,
            description: request.description,
            start_date: request.start_date,
            target_date: request.target_date,
            checked: request.checked,
            completed_on: request.checked.map(completed_at),
            priority: request.priority.unwrap_or_default(),
            project_priority: request.project_priority.unwrap_or_default(),
            project_id,
        }
    }
}
