use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{min_chars, optional_date, optional_text, optional_uuid, FieldErrors, Validate};
use crate::database::models::Priority;

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default, rename_all = "camelCase")]
pub struct TaskInput {
    pub title: String,
    pub description: Option<String>,
    pub due_date: Option<String>,
    pub priority: Option<String>,
    pub completed: Option<bool>,
    pub client_id: Option<String>,
    pub opportunity_id: Option<String>,
}

/// Column values for the tasks table
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TaskFields {
    pub client_id: Option<Uuid>,
    pub opportunity_id: Option<Uuid>,
    pub title: String,
    pub description: Option<String>,
    pub due_date: Option<NaiveDate>,
    /// Absent leaves the stored flag alone; the column defaults to false
    #[serde(skip_serializing_if = "Option::is_none")]
    pub completed: Option<bool>,
    pub priority: Priority,
}

impl Validate for TaskInput {
    type Output = TaskFields;

    fn validate(&self) -> Result<TaskFields, FieldErrors> {
        let mut errors = FieldErrors::new();

        let title = self.title.trim().to_string();
        errors.check("title", min_chars(&title, 2, "Title must be at least 2 characters"));

        let priority = match optional_text(&self.priority) {
            None => Priority::default(),
            Some(p) => p.parse().unwrap_or_else(|_| {
                errors.add("priority", "Priority must be one of low, medium, high");
                Priority::default()
            }),
        };

        let due_date = optional_date(&self.due_date)
            .map_err(|message| errors.add("dueDate", message))
            .unwrap_or(None);
        let client_id = optional_uuid(&self.client_id)
            .map_err(|message| errors.add("clientId", message))
            .unwrap_or(None);
        let opportunity_id = optional_uuid(&self.opportunity_id)
            .map_err(|message| errors.add("opportunityId", message))
            .unwrap_or(None);

        errors.finish(TaskFields {
            client_id,
            opportunity_id,
            title,
            description: optional_text(&self.description),
            due_date,
            completed: self.completed,
            priority,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn input(v: serde_json::Value) -> TaskInput {
        serde_json::from_value(v).unwrap()
    }

    #[test]
    fn defaults_priority_and_completion() {
        let fields = input(json!({ "title": "Call Ana" })).validate().unwrap();
        assert_eq!(fields.priority, Priority::Medium);
        assert_eq!(fields.completed, None);
        assert_eq!(fields.client_id, None);
    }

    #[test]
    fn omitted_completion_is_left_out_of_the_row() {
        let fields = input(json!({ "title": "Call Ana" })).validate().unwrap();
        let row = serde_json::to_value(&fields).unwrap();
        assert!(row.get("completed").is_none());

        let fields = input(json!({ "title": "Call Ana", "completed": true })).validate().unwrap();
        assert_eq!(serde_json::to_value(&fields).unwrap()["completed"], true);
    }

    #[test]
    fn blank_client_is_none_but_garbage_is_rejected() {
        assert_eq!(input(json!({ "title": "Call", "clientId": "" })).validate().unwrap().client_id, None);
        let errors = input(json!({ "title": "Call", "clientId": "abc" })).validate().unwrap_err();
        assert_eq!(errors.get("clientId"), Some("Must be a valid id"));
    }

    #[test]
    fn rejects_unknown_priority_and_bad_due_date() {
        let errors = input(json!({ "title": "C", "priority": "urgent", "dueDate": "05/01/2024" }))
            .validate()
            .unwrap_err();
        assert!(errors.get("title").is_some());
        assert!(errors.get("priority").is_some());
        assert!(errors.get("dueDate").is_some());
    }
}
