//! Account-scoped Basecamp endpoints

use reqwest::Method;
use serde_json::{Map, Value, json};

use super::client::ApiClient;
use super::pagination::{PageRequest, PageStyle};
use crate::errors::{BasecampError, Result};
use crate::models::{AccessChange, RecordingQuery, RecordingStatus, SearchQuery};

/// Endpoints under `/{account_id}/`
pub struct Account<'a> {
    client: &'a ApiClient,
    id: u64,
}

impl ApiClient {
    pub fn account(&self, id: u64) -> Account<'_> {
        Account { client: self, id }
    }
}

impl Account<'_> {
    fn path(&self, rest: &str) -> String {
        format!("/{}/{}", self.id, rest)
    }

    async fn get(&self, rest: &str) -> Result<Value> {
        self.client
            .request(Method::GET, &self.path(rest), &[], None)
            .await
    }

    // Projects

    pub fn projects(&self) -> PageRequest {
        PageRequest::get(self.path("projects.json"))
    }

    pub async fn project(&self, project_id: u64) -> Result<Value> {
        self.get(&format!("projects/{}.json", project_id)).await
    }

    pub async fn create_project(&self, name: &str, description: Option<&str>) -> Result<Value> {
        let mut body = Map::new();
        body.insert("name".to_string(), json!(name));
        if let Some(description) = description.filter(|d| !d.is_empty()) {
            body.insert("description".to_string(), json!(description));
        }
        self.client
            .request(
                Method::POST,
                &self.path("projects.json"),
                &[],
                Some(&Value::Object(body)),
            )
            .await
    }

    /// At least one of `name` or `description` must be given
    pub async fn update_project(
        &self,
        project_id: u64,
        name: Option<&str>,
        description: Option<&str>,
    ) -> Result<Value> {
        let mut body = Map::new();
        if let Some(name) = name {
            body.insert("name".to_string(), json!(name));
        }
        if let Some(description) = description {
            body.insert("description".to_string(), json!(description));
        }
        if body.is_empty() {
            return Err(BasecampError::invalid_argument(
                "at least one of name or description must be provided",
            ));
        }
        self.client
            .request(
                Method::PUT,
                &self.path(&format!("projects/{}.json", project_id)),
                &[],
                Some(&Value::Object(body)),
            )
            .await
    }

    /// Moves the project to the trash
    pub async fn delete_project(&self, project_id: u64) -> Result<()> {
        self.client
            .request(
                Method::DELETE,
                &self.path(&format!("projects/{}.json", project_id)),
                &[],
                None,
            )
            .await?;
        Ok(())
    }

    // Todos

    pub fn todos(&self, project_id: u64, todo_set_id: u64) -> PageRequest {
        PageRequest::get(self.path(&format!(
            "projects/{}/todosets/{}/todos.json",
            project_id, todo_set_id
        )))
    }

    pub async fn create_todo(
        &self,
        project_id: u64,
        todo_set_id: u64,
        content: &str,
        assignee_ids: &[u64],
    ) -> Result<Value> {
        let mut body = json!({ "content": content });
        if !assignee_ids.is_empty() {
            body["assignee_ids"] = json!(assignee_ids);
        }
        self.client
            .request(
                Method::POST,
                &self.path(&format!(
                    "projects/{}/todosets/{}/todos.json",
                    project_id, todo_set_id
                )),
                &[],
                Some(&body),
            )
            .await
    }

    // Recordings

    pub fn recordings(&self, query: &RecordingQuery) -> PageRequest {
        PageRequest::get(self.path("projects/recordings.json")).with_params(query.to_params())
    }

    /// Trash, archive or reactivate a recording
    pub async fn set_recording_status(
        &self,
        project_id: u64,
        recording_id: u64,
        status: RecordingStatus,
    ) -> Result<()> {
        self.client
            .request(
                Method::PUT,
                &self.path(&format!(
                    "buckets/{}/recordings/{}/status/{}.json",
                    project_id,
                    recording_id,
                    status.as_str()
                )),
                &[],
                None,
            )
            .await?;
        Ok(())
    }

    // Search

    pub fn search(&self, query: &SearchQuery) -> PageRequest {
        PageRequest::get(self.path("search.json"))
            .with_params(query.to_params())
            .with_style(PageStyle::PageNumber {
                per_page: query.per_page,
            })
    }

    /// Filter values the search endpoint accepts
    pub async fn search_metadata(&self) -> Result<Value> {
        self.get("searches/metadata.json").await
    }

    // People

    /// Everyone visible to the caller, or only those on `project_id`
    pub fn people(&self, project_id: Option<u64>) -> PageRequest {
        match project_id {
            Some(project_id) => {
                PageRequest::get(self.path(&format!("projects/{}/people.json", project_id)))
            }
            None => PageRequest::get(self.path("people.json")),
        }
    }

    pub async fn person(&self, person_id: u64) -> Result<Value> {
        self.get(&format!("people/{}.json", person_id)).await
    }

    pub async fn my_profile(&self) -> Result<Value> {
        self.get("my/profile.json").await
    }

    /// People who can be pinged, not paginated
    pub async fn pingable_people(&self) -> Result<Value> {
        self.get("circles/people.json").await
    }

    /// Grant, revoke or invite people on a project
    pub async fn update_project_access(
        &self,
        project_id: u64,
        change: &AccessChange,
    ) -> Result<Value> {
        if change.is_empty() {
            return Err(BasecampError::invalid_argument(
                "at least one of grant, revoke or create must be provided",
            ));
        }
        let body = serde_json::to_value(change)?;
        self.client
            .request(
                Method::PUT,
                &self.path(&format!("projects/{}/people/users.json", project_id)),
                &[],
                Some(&body),
            )
            .await
    }
}
