//! Query and payload models for Basecamp resources

use serde::Serialize;
use serde_json::Value;

/// Recording types accepted by the recordings endpoint
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum RecordingType {
    #[value(name = "Comment")]
    Comment,
    #[value(name = "Document")]
    Document,
    #[value(name = "Kanban::Card")]
    KanbanCard,
    #[value(name = "Kanban::Step")]
    KanbanStep,
    #[value(name = "Message")]
    Message,
    #[value(name = "Question::Answer")]
    QuestionAnswer,
    #[value(name = "Schedule::Entry")]
    ScheduleEntry,
    #[value(name = "Todo")]
    Todo,
    #[value(name = "Todolist")]
    Todolist,
    #[value(name = "Upload")]
    Upload,
    #[value(name = "Vault")]
    Vault,
}

impl RecordingType {
    /// Name the API expects in the `type` parameter
    pub fn api_name(self) -> &'static str {
        match self {
            RecordingType::Comment => "Comment",
            RecordingType::Document => "Document",
            RecordingType::KanbanCard => "Kanban::Card",
            RecordingType::KanbanStep => "Kanban::Step",
            RecordingType::Message => "Message",
            RecordingType::QuestionAnswer => "Question::Answer",
            RecordingType::ScheduleEntry => "Schedule::Entry",
            RecordingType::Todo => "Todo",
            RecordingType::Todolist => "Todolist",
            RecordingType::Upload => "Upload",
            RecordingType::Vault => "Vault",
        }
    }
}

/// Lifecycle state shared by every recording
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum RecordingStatus {
    Active,
    Archived,
    Trashed,
}

impl RecordingStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            RecordingStatus::Active => "active",
            RecordingStatus::Archived => "archived",
            RecordingStatus::Trashed => "trashed",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum SortField {
    #[value(name = "created_at")]
    CreatedAt,
    #[value(name = "updated_at")]
    UpdatedAt,
}

impl SortField {
    pub fn as_str(self) -> &'static str {
        match self {
            SortField::CreatedAt => "created_at",
            SortField::UpdatedAt => "updated_at",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum SortDirection {
    Asc,
    Desc,
}

impl SortDirection {
    pub fn as_str(self) -> &'static str {
        match self {
            SortDirection::Asc => "asc",
            SortDirection::Desc => "desc",
        }
    }
}

/// Filters for listing recordings across projects
#[derive(Debug, Clone)]
pub struct RecordingQuery {
    pub recording_type: RecordingType,
    /// Single project id or a comma separated list
    pub bucket: Option<String>,
    pub status: RecordingStatus,
    pub sort: SortField,
    pub direction: SortDirection,
}

impl RecordingQuery {
    pub fn new(recording_type: RecordingType) -> Self {
        Self {
            recording_type,
            bucket: None,
            status: RecordingStatus::Active,
            sort: SortField::CreatedAt,
            direction: SortDirection::Desc,
        }
    }

    pub fn to_params(&self) -> Vec<(String, String)> {
        let mut params = vec![("type".to_string(), self.recording_type.api_name().to_string())];
        if let Some(bucket) = &self.bucket {
            params.push(("bucket".to_string(), bucket.clone()));
        }
        params.push(("status".to_string(), self.status.as_str().to_string()));
        params.push(("sort".to_string(), self.sort.as_str().to_string()));
        params.push(("direction".to_string(), self.direction.as_str().to_string()));
        params
    }
}

/// Full-text search parameters
#[derive(Debug, Clone)]
pub struct SearchQuery {
    pub query: String,
    pub recording_type: Option<String>,
    pub bucket_id: Option<u64>,
    pub creator_id: Option<u64>,
    pub file_type: Option<String>,
    pub exclude_chat: bool,
    pub page: u32,
    pub per_page: u32,
}

impl SearchQuery {
    pub const DEFAULT_PER_PAGE: u32 = 50;

    pub fn new(query: impl Into<String>) -> Self {
        Self {
            query: query.into(),
            recording_type: None,
            bucket_id: None,
            creator_id: None,
            file_type: None,
            exclude_chat: false,
            page: 1,
            per_page: Self::DEFAULT_PER_PAGE,
        }
    }

    pub fn to_params(&self) -> Vec<(String, String)> {
        let mut params = vec![("q".to_string(), self.query.clone())];
        if let Some(kind) = &self.recording_type {
            params.push(("type".to_string(), kind.clone()));
        }
        if let Some(bucket_id) = self.bucket_id {
            params.push(("bucket_id".to_string(), bucket_id.to_string()));
        }
        if let Some(creator_id) = self.creator_id {
            params.push(("creator_id".to_string(), creator_id.to_string()));
        }
        if let Some(file_type) = &self.file_type {
            params.push(("file_type".to_string(), file_type.clone()));
        }
        if self.exclude_chat {
            params.push(("exclude_chat".to_string(), "1".to_string()));
        }
        params.push(("page".to_string(), self.page.to_string()));
        params.push(("per_page".to_string(), self.per_page.to_string()));
        params
    }
}

/// Body of a project access update
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct AccessChange {
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub grant: Vec<u64>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub revoke: Vec<u64>,
    /// New people to invite: `name`, `email_address`, optional `title` and `company_name`
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub create: Vec<Value>,
}

impl AccessChange {
    pub fn is_empty(&self) -> bool {
        self.grant.is_empty() && self.revoke.is_empty() && self.create.is_empty()
    }
}

/// Parse `"1, 2,3"` into ids. Blank input yields an empty list.
pub fn parse_id_list(raw: &str) -> Result<Vec<u64>, String> {
    raw.split(',')
        .map(str::trim)
        .filter(|part| !part.is_empty())
        .map(|part| {
            part.parse::<u64>()
                .map_err(|_| format!("'{}' is not a valid id", part))
        })
        .collect()
}
